use crate::core::information::mutual_information::{ColumnProfile, normalized_mi};
use crate::core::models::encoding::Encoding;
use crate::engine::config::SelfPairConvention;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use itertools::Itertools;
use nalgebra::DMatrix;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const PHASE: &str = "dependency";

/// Dependency matrix of an encoding without progress reporting.
pub fn dependency_matrix(
    encoding: &Encoding,
    self_pairs: SelfPairConvention,
) -> Result<DMatrix<f64>, EngineError> {
    run(encoding, self_pairs, &ProgressReporter::new())
}

/// Builds the symmetric `M x M` matrix of normalised mutual information
/// between every pair of alphabet positions in `encoding`.
///
/// Each column is profiled once. Only the upper triangle is evaluated; the
/// lower triangle is mirrored from it so `D[i, j]` and `D[j, i]` are
/// bit-identical. The diagonal follows `self_pairs`.
#[instrument(skip_all, name = "dependency_task")]
pub fn run(
    encoding: &Encoding,
    self_pairs: SelfPairConvention,
    reporter: &ProgressReporter,
) -> Result<DMatrix<f64>, EngineError> {
    let m = encoding.num_positions();
    info!(
        frames = encoding.num_frames(),
        positions = m,
        "Estimating positional dependencies."
    );

    let profiles: Vec<ColumnProfile> = encoding.columns().map(ColumnProfile::new).collect();
    let pairs: Vec<(usize, usize)> = (0..m).tuple_combinations().collect();
    debug!(pairs = pairs.len(), "Column profiles built.");

    reporter.report(Progress::TaskStart {
        total_steps: pairs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let values: Vec<f64> = {
        let mut scratch = Vec::new();
        pairs
            .iter()
            .map(|&(i, j)| {
                reporter.checkpoint(PHASE)?;
                let value = normalized_mi(&profiles[i], &profiles[j], &mut scratch);
                reporter.report(Progress::TaskIncrement);
                Ok(value)
            })
            .collect::<Result<_, EngineError>>()?
    };

    #[cfg(feature = "parallel")]
    let values: Vec<f64> = pairs
        .par_iter()
        .map_init(Vec::new, |scratch, &(i, j)| {
            reporter.checkpoint(PHASE)?;
            let value = normalized_mi(&profiles[i], &profiles[j], scratch);
            reporter.report(Progress::TaskIncrement);
            Ok(value)
        })
        .collect::<Result<_, EngineError>>()?;

    reporter.report(Progress::TaskFinish);

    let mut matrix = DMatrix::zeros(m, m);
    for (&(i, j), &value) in pairs.iter().zip(&values) {
        matrix[(i, j)] = value;
        matrix[(j, i)] = value;
    }

    let mut scratch = Vec::new();
    for (i, profile) in profiles.iter().enumerate() {
        matrix[(i, i)] = match self_pairs {
            SelfPairConvention::Formula => normalized_mi(profile, profile, &mut scratch),
            SelfPairConvention::Identity if profile.entropy() > 0.0 => 1.0,
            SelfPairConvention::Identity => 0.0,
        };
    }

    info!("Dependency matrix complete.");
    Ok(matrix)
}
