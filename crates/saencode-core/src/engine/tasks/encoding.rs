use super::classify::classify;
use crate::core::alphabet::library::ReferenceLibrary;
use crate::core::models::encoding::Encoding;
use crate::core::models::fragment::FRAGMENT_LENGTH;
use crate::core::models::letter::Letter;
use crate::core::models::trajectory::Trajectory;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::{DMatrix, Point3};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const PHASE: &str = "encoding";

/// Encodes every frame of a trajectory into structural alphabet letters.
///
/// Equivalent to [`run`] without progress reporting or cancellation.
pub fn encode(trajectory: &Trajectory, library: &ReferenceLibrary) -> Result<Encoding, EngineError> {
    run(trajectory, library, &ProgressReporter::new())
}

#[instrument(skip_all, name = "encoding_task")]
pub fn run(
    trajectory: &Trajectory,
    library: &ReferenceLibrary,
    reporter: &ProgressReporter,
) -> Result<Encoding, EngineError> {
    let num_frames = trajectory.num_frames();
    let atoms = trajectory.atoms_per_frame();
    if num_frames > 0 && atoms < FRAGMENT_LENGTH {
        return Err(EngineError::InsufficientLength {
            frame: 0,
            atoms,
            window: FRAGMENT_LENGTH,
        });
    }
    let num_positions = atoms.saturating_sub(FRAGMENT_LENGTH - 1);

    info!(
        frames = num_frames,
        positions = num_positions,
        letters = library.len(),
        "Encoding trajectory."
    );
    reporter.report(Progress::TaskStart {
        total_steps: num_frames as u64,
    });

    let frames: Vec<&[Point3<f64>]> = trajectory.frames().collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = frames.iter();

    #[cfg(feature = "parallel")]
    let iterator = frames.par_iter();

    let rows: Vec<Vec<Letter>> = iterator
        .map(|frame| {
            reporter.checkpoint(PHASE)?;
            let row = encode_frame(frame, library)?;
            reporter.report(Progress::TaskIncrement);
            Ok(row)
        })
        .collect::<Result<_, EngineError>>()?;

    reporter.report(Progress::TaskFinish);

    let letters = DMatrix::from_row_iterator(num_frames, num_positions, rows.into_iter().flatten());
    info!("Trajectory encoding complete.");
    Ok(Encoding::from(letters))
}

/// Classifies every width-4, stride-1 window of one frame.
fn encode_frame(frame: &[Point3<f64>], library: &ReferenceLibrary) -> Result<Vec<Letter>, EngineError> {
    frame
        .windows(FRAGMENT_LENGTH)
        .map(|window| classify(window, library))
        .collect()
}
