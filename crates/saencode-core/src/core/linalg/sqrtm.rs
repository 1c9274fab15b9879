use nalgebra::{DMatrix, DVector, SymmetricEigen};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LinalgError {
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
    #[error("Matrix is not symmetric (largest asymmetry {max_asymmetry:e})")]
    NotSymmetric { max_asymmetry: f64 },
    #[error("Matrix contains non-finite entries")]
    NonFinite,
    #[error("Matrix is not positive semi-definite (smallest eigenvalue {min_eigenvalue:e})")]
    NonPositiveSemiDefinite { min_eigenvalue: f64 },
}

/// Fails unless `matrix` is square and `|A - Aᵀ| <= tolerance` element-wise.
pub fn check_symmetric(matrix: &DMatrix<f64>, tolerance: f64) -> Result<(), LinalgError> {
    let (rows, cols) = matrix.shape();
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(LinalgError::NonFinite);
    }
    let max_asymmetry = (0..rows)
        .flat_map(|i| (i + 1..cols).map(move |j| (i, j)))
        .map(|(i, j)| (matrix[(i, j)] - matrix[(j, i)]).abs())
        .fold(0.0, f64::max);
    if max_asymmetry > tolerance {
        return Err(LinalgError::NotSymmetric { max_asymmetry });
    }
    Ok(())
}

/// Principal square root of a symmetric positive semi-definite matrix.
///
/// Computed from the eigendecomposition `A = V Λ Vᵀ` as `V Λ^½ Vᵀ`. Eigenvalues
/// in `[-psd_tolerance * max(1, |λ|max), 0)` are rounding noise and are clamped
/// to zero; anything more negative means no real square root exists.
///
/// Only the lower triangle of `matrix` is read; callers that cannot guarantee
/// symmetry should run [`check_symmetric`] first.
///
/// # Errors
///
/// Returns [`LinalgError::NotSquare`], [`LinalgError::NonFinite`] or
/// [`LinalgError::NonPositiveSemiDefinite`].
pub fn symmetric_sqrt(matrix: &DMatrix<f64>, psd_tolerance: f64) -> Result<DMatrix<f64>, LinalgError> {
    let (rows, cols) = matrix.shape();
    if rows != cols {
        return Err(LinalgError::NotSquare { rows, cols });
    }
    if rows == 0 {
        return Ok(DMatrix::zeros(0, 0));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(LinalgError::NonFinite);
    }

    let eigen = SymmetricEigen::new(matrix.clone());
    let min_eigenvalue = eigen.eigenvalues.min();
    let scale = eigen.eigenvalues.amax().max(1.0);
    if min_eigenvalue < -psd_tolerance * scale {
        return Err(LinalgError::NonPositiveSemiDefinite { min_eigenvalue });
    }

    let roots = DVector::from_iterator(
        rows,
        eigen.eigenvalues.iter().map(|&lambda| lambda.max(0.0).sqrt()),
    );
    let vectors = &eigen.eigenvectors;
    let root = vectors * DMatrix::from_diagonal(&roots) * vectors.transpose();

    Ok((&root + root.transpose()) * 0.5)
}
