use crate::core::alphabet::library::ReferenceLibrary;
use crate::core::models::encoding::Encoding;
use crate::core::models::trajectory::Trajectory;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks;
use nalgebra::DMatrix;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// The full trajectory encoding, one row per frame.
    pub encoding: Encoding,
    /// One dependency matrix per frame block, in block order.
    pub dependency_blocks: Vec<DMatrix<f64>>,
    /// `overlap[(k, l)]` compares `dependency_blocks[k]` with `dependency_blocks[l]`.
    pub overlap: DMatrix<f64>,
}

#[instrument(skip_all, name = "analysis_workflow")]
pub fn run(
    trajectory: &Trajectory,
    library: &ReferenceLibrary,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<AnalysisResult, EngineError> {
    let reporter = reporter.scoped(config.time_limit);
    info!(
        frames = trajectory.num_frames(),
        atoms = trajectory.atoms_per_frame(),
        "Starting structural alphabet analysis."
    );

    // === Phase 1: Encode every frame ===
    reporter.report(Progress::PhaseStart { name: "Encoding" });
    let encoding = tasks::encoding::run(trajectory, library, &reporter)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Split into blocks ===
    let blocks = split_blocks(&encoding, config, &reporter);

    // === Phase 3: Dependency network per block ===
    let dependency_blocks = estimate_dependencies(&blocks, config, &reporter)?;

    // === Phase 4: Compare networks ===
    reporter.report(Progress::PhaseStart {
        name: "Network Comparison",
    });
    let overlap = tasks::overlap::run(&dependency_blocks, &config.comparison, &reporter)?;
    reporter.report(Progress::PhaseFinish);

    info!(blocks = dependency_blocks.len(), "Analysis complete.");
    Ok(AnalysisResult {
        encoding,
        dependency_blocks,
        overlap,
    })
}

fn split_blocks(
    encoding: &Encoding,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Vec<Encoding> {
    let Some(frames) = config.frames_per_block else {
        return vec![encoding.clone()];
    };
    let blocks = encoding.blocks(frames);
    let dropped = encoding.num_frames() - blocks.len() * frames;
    if blocks.is_empty() {
        warn!(
            frames = encoding.num_frames(),
            frames_per_block = frames,
            "Trajectory is shorter than one block; no networks will be compared."
        );
        reporter.report(Progress::Message(format!(
            "Trajectory has {} frames, fewer than one block of {frames}",
            encoding.num_frames()
        )));
    } else if dropped > 0 {
        debug!(dropped, "Trailing frames do not fill a block and are ignored.");
        reporter.report(Progress::Message(format!(
            "Ignoring {dropped} trailing frames that do not fill a block"
        )));
    }
    blocks
}

fn estimate_dependencies(
    blocks: &[Encoding],
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<DMatrix<f64>>, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Dependency Estimation",
    });
    let matrices = blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            debug!(block = index, frames = block.num_frames(), "Estimating block network.");
            tasks::dependency::run(block, config.self_pairs, reporter)
        })
        .collect::<Result<Vec<_>, _>>()?;
    reporter.report(Progress::PhaseFinish);
    Ok(matrices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::fragment::Fragment;
    use crate::core::models::letter::Letter;
    use crate::engine::config::SelfPairConvention;
    use crate::engine::progress::CancellationToken;
    use nalgebra::Point3;
    use std::sync::Mutex;
    use std::time::Duration;

    const TOLERANCE: f64 = 1e-12;
    const ATOMS: usize = 7;

    fn letter(c: char) -> Letter {
        Letter::new(c).unwrap()
    }

    /// Every window of a regular helix is congruent to every other.
    fn helix(atoms: usize) -> Vec<Point3<f64>> {
        (0..atoms)
            .map(|i| {
                let t = i as f64 * 100f64.to_radians();
                Point3::new(2.3 * t.cos(), 2.3 * t.sin(), 1.5 * i as f64)
            })
            .collect()
    }

    fn line(atoms: usize) -> Vec<Point3<f64>> {
        (0..atoms).map(|i| Point3::new(3.8 * i as f64, 0.0, 0.0)).collect()
    }

    fn fragment(points: &[Point3<f64>]) -> Fragment {
        Fragment::try_from(&points[..4]).unwrap()
    }

    /// `H` matches every helix window exactly, `L` every straight window.
    fn library() -> ReferenceLibrary {
        ReferenceLibrary::new([
            (letter('H'), fragment(&helix(4))),
            (letter('L'), fragment(&line(4))),
        ])
        .unwrap()
    }

    /// Builds frames from a pattern such as `"LHHL"`.
    fn trajectory(pattern: &str) -> Trajectory {
        let frames = pattern
            .chars()
            .map(|c| match c {
                'H' => helix(ATOMS),
                _ => line(ATOMS),
            })
            .collect();
        Trajectory::from_frames(frames).unwrap()
    }

    fn assert_all_close(matrix: &DMatrix<f64>, value: f64) {
        for &v in matrix.iter() {
            assert!((v - value).abs() < TOLERANCE, "expected {value}, got {v}");
        }
    }

    #[test]
    fn two_frame_trajectory_encodes_analyzes_and_self_compares() {
        let library = library();
        let traj = trajectory("LH");

        let encoding = tasks::encoding::encode(&traj, &library).unwrap();
        assert_eq!(encoding.shape(), (2, 4));
        assert_eq!(encoding.row(0), Some(vec![letter('L'); 4]));
        assert_eq!(encoding.row(1), Some(vec![letter('H'); 4]));

        // Every column is [L, H]: H = Hij = 1 bit, e = (2 - 2 - 2 + 1) / 4
        let d = tasks::dependency::dependency_matrix(&encoding, SelfPairConvention::Formula)
            .unwrap();
        assert_eq!(d.shape(), (4, 4));
        assert_all_close(&d, 1.25);

        let score = tasks::overlap::overlap(&d, &d).unwrap();
        assert!((score - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn whole_trajectory_is_one_block_by_default() {
        let traj = trajectory("LHHL");
        let result = run(&traj, &library(), &AnalysisConfig::default(), &ProgressReporter::new())
            .unwrap();

        assert_eq!(result.encoding.shape(), (4, 4));
        assert_eq!(result.dependency_blocks.len(), 1);
        // N = 4, two balanced letters: e = -1/8
        assert_all_close(&result.dependency_blocks[0], 1.125);
        assert_eq!(result.overlap.shape(), (1, 1));
        assert!((result.overlap[(0, 0)] - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn blocks_with_equal_networks_overlap_everywhere() {
        let traj = trajectory("LHHLLLHHL");
        let config = AnalysisConfig::builder().frames_per_block(4).build().unwrap();

        let result = run(&traj, &library(), &config, &ProgressReporter::new()).unwrap();

        assert_eq!(result.dependency_blocks.len(), 2);
        assert_eq!(result.dependency_blocks[0], result.dependency_blocks[1]);
        assert_eq!(result.overlap.shape(), (2, 2));
        assert_all_close(&result.overlap, 1.0);
    }

    #[test]
    fn identity_convention_can_produce_non_psd_networks() {
        // Off-diagonal 1.125 with a unit diagonal has eigenvalue 1 - 1.125
        let traj = trajectory("LHHL");
        let config = AnalysisConfig::builder()
            .self_pairs(SelfPairConvention::Identity)
            .build()
            .unwrap();

        let result = run(&traj, &library(), &config, &ProgressReporter::new());

        assert!(matches!(
            result,
            Err(EngineError::NonPositiveSemiDefinite { min_eigenvalue })
                if (min_eigenvalue + 0.125).abs() < 1e-9
        ));
    }

    #[test]
    fn dependency_blocks_match_direct_estimation() {
        let traj = trajectory("LHLLHHLH");
        let config = AnalysisConfig::builder().frames_per_block(4).build().unwrap();
        let library = library();
        let encoding = tasks::encoding::encode(&traj, &library).unwrap();
        let expected: Vec<_> = encoding
            .blocks(4)
            .iter()
            .map(|b| tasks::dependency::dependency_matrix(b, SelfPairConvention::Formula).unwrap())
            .collect();

        let reporter = ProgressReporter::new();
        let blocks = split_blocks(&encoding, &config, &reporter);
        let matrices = estimate_dependencies(&blocks, &config, &reporter).unwrap();

        assert_eq!(matrices, expected);
    }

    #[test]
    fn trailing_frames_are_reported_as_a_message() {
        let messages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| {
            if let Progress::Message(text) = p {
                messages.lock().unwrap().push(text);
            }
        }));
        let encoding = tasks::encoding::encode(&trajectory("LHHLL"), &library()).unwrap();
        let config = AnalysisConfig::builder().frames_per_block(2).build().unwrap();

        let blocks = split_blocks(&encoding, &config, &reporter);
        drop(reporter);

        assert_eq!(blocks.len(), 2);
        let messages = messages.into_inner().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("1 trailing frames"));
    }

    #[test]
    fn trajectory_shorter_than_a_block_gives_empty_comparison() {
        let traj = trajectory("LHL");
        let config = AnalysisConfig::builder().frames_per_block(5).build().unwrap();
        let result = run(&traj, &library(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(result.encoding.shape(), (3, 4));
        assert!(result.dependency_blocks.is_empty());
        assert_eq!(result.overlap.shape(), (0, 0));
    }

    #[test]
    fn short_frames_abort_the_workflow() {
        let traj = Trajectory::from_frames(vec![line(3), line(3)]).unwrap();
        let result = run(&traj, &library(), &AnalysisConfig::default(), &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::InsufficientLength { .. })));
    }

    #[test]
    fn phases_are_reported_in_order() {
        let phases = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| {
            if let Progress::PhaseStart { name } = p {
                phases.lock().unwrap().push(name);
            }
        }));
        let traj = trajectory("LHL");
        let config = AnalysisConfig::builder().frames_per_block(5).build().unwrap();

        run(&traj, &library(), &config, &reporter).unwrap();
        drop(reporter);

        assert_eq!(
            phases.into_inner().unwrap(),
            vec!["Encoding", "Dependency Estimation", "Network Comparison"]
        );
    }

    #[test]
    fn expired_time_limit_aborts_with_timeout() {
        let config = AnalysisConfig::builder()
            .time_limit(Duration::from_nanos(1))
            .build()
            .unwrap();
        let traj = trajectory("LHHL");
        let result = run(&traj, &library(), &config, &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(EngineError::TimedOut {
                phase: "encoding",
                ..
            })
        ));
    }

    #[test]
    fn caller_deadline_is_not_extended_by_config() {
        let config = AnalysisConfig::builder()
            .time_limit(Duration::from_secs(3600))
            .build()
            .unwrap();
        let reporter = ProgressReporter::new()
            .with_cancellation(CancellationToken::with_time_limit(Duration::ZERO));
        let traj = trajectory("LHHL");
        let result = run(&traj, &library(), &config, &reporter);
        assert!(matches!(result, Err(EngineError::TimedOut { .. })));
    }

    #[test]
    fn huge_time_limit_from_config_file_does_not_abort() {
        let config = AnalysisConfig::from_toml_str("time-limit-secs = 1e19").unwrap();
        let traj = trajectory("LH");
        let result = run(&traj, &library(), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(result.encoding.shape(), (2, 4));
    }
}
