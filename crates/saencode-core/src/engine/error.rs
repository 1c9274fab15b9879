use super::config::ConfigError;
use crate::core::alignment::kabsch::AlignError;
use crate::core::alphabet::library::LibraryLoadError;
use crate::core::information::mutual_information::InformationError;
use crate::core::io::export::ExportError;
use crate::core::linalg::sqrtm::LinalgError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Shape mismatch: expected {expected} elements, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Frame {frame} has {atoms} atoms, fewer than the window width of {window}")]
    InsufficientLength {
        frame: usize,
        atoms: usize,
        window: usize,
    },

    #[error("Fragment contains non-finite coordinates")]
    NonFiniteCoordinates,

    #[error("Reference library contains no entries")]
    EmptyLibrary,

    #[error("Matrix overlap is undefined: both matrices have zero trace")]
    DivisionByZero,

    #[error("Matrix is not positive semi-definite (smallest eigenvalue {min_eigenvalue:e})")]
    NonPositiveSemiDefinite { min_eigenvalue: f64 },

    #[error("Cannot compare a {left:?} matrix with a {right:?} matrix")]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("Matrix must be square, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },

    #[error("Matrix is not symmetric (largest asymmetry {max_asymmetry:e})")]
    NotSymmetric { max_asymmetry: f64 },

    #[error("Matrix contains non-finite entries")]
    NonFinite,

    #[error("Reference library error: {0}")]
    Library(LibraryLoadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Operation cancelled during phase '{phase}'")]
    Cancelled { phase: &'static str },

    #[error("Time limit of {limit:?} exceeded during phase '{phase}'")]
    TimedOut {
        phase: &'static str,
        limit: Duration,
    },
}

impl From<AlignError> for EngineError {
    fn from(e: AlignError) -> Self {
        match e {
            AlignError::ShapeMismatch { reference, target } => EngineError::ShapeMismatch {
                expected: reference,
                found: target,
            },
            AlignError::Empty => EngineError::ShapeMismatch {
                expected: crate::core::models::fragment::FRAGMENT_LENGTH,
                found: 0,
            },
        }
    }
}

impl From<InformationError> for EngineError {
    fn from(e: InformationError) -> Self {
        match e {
            InformationError::LengthMismatch { left, right } => EngineError::ShapeMismatch {
                expected: left,
                found: right,
            },
        }
    }
}

impl From<LibraryLoadError> for EngineError {
    fn from(e: LibraryLoadError) -> Self {
        match e {
            LibraryLoadError::Empty => EngineError::EmptyLibrary,
            other => EngineError::Library(other),
        }
    }
}

impl From<LinalgError> for EngineError {
    fn from(e: LinalgError) -> Self {
        match e {
            LinalgError::NotSquare { rows, cols } => EngineError::NonSquareMatrix { rows, cols },
            LinalgError::NotSymmetric { max_asymmetry } => {
                EngineError::NotSymmetric { max_asymmetry }
            }
            LinalgError::NonFinite => EngineError::NonFinite,
            LinalgError::NonPositiveSemiDefinite { min_eigenvalue } => {
                EngineError::NonPositiveSemiDefinite { min_eigenvalue }
            }
        }
    }
}
