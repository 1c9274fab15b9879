use crate::core::linalg::sqrtm::{check_symmetric, symmetric_sqrt};
use crate::engine::config::ComparisonConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::DMatrix;
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const PHASE: &str = "overlap";

/// A validated matrix with its principal square root and trace, ready to be
/// compared against any number of other blocks.
#[derive(Debug, Clone)]
struct PreparedBlock {
    root: DMatrix<f64>,
    trace: f64,
}

impl PreparedBlock {
    fn new(matrix: &DMatrix<f64>, config: &ComparisonConfig) -> Result<Self, EngineError> {
        check_symmetric(matrix, config.symmetry_tolerance)?;
        Ok(Self {
            root: symmetric_sqrt(matrix, config.psd_tolerance)?,
            trace: matrix.trace(),
        })
    }
}

fn prepared_overlap(a: &PreparedBlock, b: &PreparedBlock) -> Result<f64, EngineError> {
    let denominator = a.trace + b.trace;
    if denominator <= 0.0 {
        return Err(EngineError::DivisionByZero);
    }
    let diff = &a.root - &b.root;
    let distance = (&diff * &diff).trace().max(0.0).sqrt();
    Ok(1.0 - distance / denominator.sqrt())
}

/// Network overlap with the default comparison tolerances.
pub fn overlap(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<f64, EngineError> {
    overlap_with(a, b, &ComparisonConfig::default())
}

/// Similarity of two symmetric positive semi-definite matrices,
/// `1 - sqrt(tr((√A - √B)²)) / sqrt(tr A + tr B)`.
///
/// The value is 1 for identical matrices and decreases as their square roots
/// diverge.
///
/// # Errors
///
/// * `DimensionMismatch` if the shapes differ.
/// * `NonSquareMatrix`, `NotSymmetric` or `NonFinite` for malformed input.
/// * `NonPositiveSemiDefinite` if either matrix has a significantly negative
///   eigenvalue.
/// * `DivisionByZero` if `tr A + tr B` is not positive.
pub fn overlap_with(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    config: &ComparisonConfig,
) -> Result<f64, EngineError> {
    if a.shape() != b.shape() {
        return Err(EngineError::DimensionMismatch {
            left: a.shape(),
            right: b.shape(),
        });
    }
    let a = PreparedBlock::new(a, config)?;
    let b = PreparedBlock::new(b, config)?;
    prepared_overlap(&a, &b)
}

/// Pairwise overlap of every block with every other, default tolerances.
pub fn overlap_matrix(blocks: &[DMatrix<f64>]) -> Result<DMatrix<f64>, EngineError> {
    run(blocks, &ComparisonConfig::default(), &ProgressReporter::new())
}

/// Builds the `K x K` matrix `O[k, l] = overlap(blocks[k], blocks[l])`.
///
/// Every block's square root is computed once up front. All ordered pairs are
/// then evaluated, so the diagonal and both triangles come from the same
/// formula.
#[instrument(skip_all, name = "overlap_task")]
pub fn run(
    blocks: &[DMatrix<f64>],
    config: &ComparisonConfig,
    reporter: &ProgressReporter,
) -> Result<DMatrix<f64>, EngineError> {
    let k = blocks.len();
    info!(blocks = k, "Comparing dependency networks.");

    if let Some(first) = blocks.first() {
        if let Some((index, other)) = blocks
            .iter()
            .enumerate()
            .find(|(_, b)| b.shape() != first.shape())
        {
            warn!(block = index, "Block shape differs from block 0.");
            return Err(EngineError::DimensionMismatch {
                left: first.shape(),
                right: other.shape(),
            });
        }
    }

    reporter.report(Progress::TaskStart {
        total_steps: (k * k) as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = blocks.iter().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = blocks.par_iter().enumerate();

    let prepared: Vec<PreparedBlock> = iterator
        .map(|(index, block)| {
            reporter.checkpoint(PHASE)?;
            PreparedBlock::new(block, config).inspect_err(|e| {
                warn!(block = index, error = %e, "Block cannot be compared.");
            })
        })
        .collect::<Result<_, EngineError>>()?;

    let pairs: Vec<(usize, usize)> = (0..k).flat_map(|i| (0..k).map(move |j| (i, j))).collect();

    #[cfg(not(feature = "parallel"))]
    let pair_iterator = pairs.iter();

    #[cfg(feature = "parallel")]
    let pair_iterator = pairs.par_iter();

    let values: Vec<f64> = pair_iterator
        .map(|&(i, j)| {
            reporter.checkpoint(PHASE)?;
            let value = prepared_overlap(&prepared[i], &prepared[j])?;
            reporter.report(Progress::TaskIncrement);
            Ok(value)
        })
        .collect::<Result<_, EngineError>>()?;

    reporter.report(Progress::TaskFinish);

    info!("Overlap matrix complete.");
    Ok(DMatrix::from_row_iterator(k, k, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::progress::CancellationToken;
    use nalgebra::DVector;

    const TOLERANCE: f64 = 1e-10;

    fn diag(values: &[f64]) -> DMatrix<f64> {
        DMatrix::from_diagonal(&DVector::from_row_slice(values))
    }

    fn spd() -> DMatrix<f64> {
        DMatrix::from_row_slice(3, 3, &[2.0, 0.5, 0.1, 0.5, 1.5, 0.3, 0.1, 0.3, 1.0])
    }

    #[test]
    fn identical_matrices_overlap_perfectly() {
        let a = DMatrix::<f64>::identity(2, 2);
        assert!((overlap(&a, &a).unwrap() - 1.0).abs() < TOLERANCE);
        let s = spd();
        assert!((overlap(&s, &s).unwrap() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn scaled_identity_has_known_overlap() {
        // √A = I, √B = 2I, tr((√A - √B)²) = 2, tr A + tr B = 10
        let a = DMatrix::<f64>::identity(2, 2);
        let b = diag(&[4.0, 4.0]);
        let expected = 1.0 - 0.2_f64.sqrt();
        assert!((overlap(&a, &b).unwrap() - expected).abs() < TOLERANCE);
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = spd();
        let b = diag(&[1.0, 3.0, 0.5]);
        let ab = overlap(&a, &b).unwrap();
        let ba = overlap(&b, &a).unwrap();
        assert!((ab - ba).abs() < TOLERANCE);
        assert!(ab < 1.0);
    }

    #[test]
    fn zero_matrix_against_nonzero_matrix_has_zero_overlap() {
        // distance = sqrt(tr B), denominator = sqrt(tr B)
        let a = DMatrix::<f64>::zeros(2, 2);
        let b = diag(&[1.0, 3.0]);
        assert!(overlap(&a, &b).unwrap().abs() < TOLERANCE);
    }

    #[test]
    fn indefinite_matrix_is_rejected() {
        let a = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);
        let b = DMatrix::<f64>::identity(2, 2);
        assert!(matches!(
            overlap(&a, &b),
            Err(EngineError::NonPositiveSemiDefinite { .. })
        ));
    }

    #[test]
    fn zero_matrices_have_undefined_overlap() {
        let z = DMatrix::<f64>::zeros(3, 3);
        assert!(matches!(overlap(&z, &z), Err(EngineError::DivisionByZero)));
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let a = DMatrix::<f64>::identity(2, 2);
        let b = DMatrix::<f64>::identity(3, 3);
        assert!(matches!(
            overlap(&a, &b),
            Err(EngineError::DimensionMismatch {
                left: (2, 2),
                right: (3, 3)
            })
        ));
    }

    #[test]
    fn asymmetric_matrix_is_rejected() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.2, 0.0, 1.0]);
        assert!(matches!(
            overlap(&a, &a),
            Err(EngineError::NotSymmetric { .. })
        ));
    }

    #[test]
    fn non_square_matrix_is_rejected() {
        let a = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(
            overlap(&a, &a),
            Err(EngineError::NonSquareMatrix { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn overlap_matrix_has_unit_diagonal_and_is_symmetric() {
        let blocks = vec![spd(), diag(&[1.0, 3.0, 0.5]), DMatrix::identity(3, 3)];
        let o = overlap_matrix(&blocks).unwrap();
        assert_eq!(o.shape(), (3, 3));
        for k in 0..3 {
            assert!((o[(k, k)] - 1.0).abs() < TOLERANCE);
            for l in 0..3 {
                assert!((o[(k, l)] - o[(l, k)]).abs() < TOLERANCE);
                let direct = overlap(&blocks[k], &blocks[l]).unwrap();
                assert!((o[(k, l)] - direct).abs() < TOLERANCE);
            }
        }
    }

    #[test]
    fn overlap_matrix_of_no_blocks_is_empty() {
        assert_eq!(overlap_matrix(&[]).unwrap().shape(), (0, 0));
    }

    #[test]
    fn overlap_matrix_rejects_blocks_of_different_size() {
        let blocks = vec![DMatrix::identity(2, 2), DMatrix::identity(3, 3)];
        assert!(matches!(
            overlap_matrix(&blocks),
            Err(EngineError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn overlap_matrix_propagates_invalid_block() {
        let blocks = vec![
            DMatrix::identity(2, 2),
            DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]),
        ];
        assert!(matches!(
            overlap_matrix(&blocks),
            Err(EngineError::NonPositiveSemiDefinite { .. })
        ));
    }

    #[test]
    fn cancelled_comparison_stops() {
        let token = CancellationToken::new();
        token.cancel();
        let reporter = ProgressReporter::new().with_cancellation(token);
        let blocks = vec![DMatrix::identity(2, 2)];
        assert!(matches!(
            run(&blocks, &ComparisonConfig::default(), &reporter),
            Err(EngineError::Cancelled { phase: "overlap" })
        ));
    }
}
