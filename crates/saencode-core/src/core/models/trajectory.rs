use nalgebra::Point3;
use thiserror::Error;

/// Backbone coordinates of a molecular dynamics trajectory.
///
/// Coordinates are stored frame-major in one contiguous buffer; every frame has
/// the same number of atoms (one representative backbone atom per residue).
/// Coordinates are taken as given; they must share the length unit of the
/// reference library used to encode them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    num_frames: usize,
    atoms_per_frame: usize,
    coords: Vec<Point3<f64>>,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TrajectoryError {
    #[error("Frame {frame} has {found} atoms, but the first frame has {expected}")]
    InconsistentFrame {
        frame: usize,
        expected: usize,
        found: usize,
    },
    #[error(
        "Coordinate buffer of length {len} does not match {frames} frames x {atoms} atoms x 3"
    )]
    BufferLength {
        len: usize,
        frames: usize,
        atoms: usize,
    },
}

impl Trajectory {
    pub fn from_frames(frames: Vec<Vec<Point3<f64>>>) -> Result<Self, TrajectoryError> {
        let num_frames = frames.len();
        let atoms_per_frame = frames.first().map_or(0, Vec::len);
        let mut coords = Vec::with_capacity(frames.len() * atoms_per_frame);
        for (index, frame) in frames.into_iter().enumerate() {
            if frame.len() != atoms_per_frame {
                return Err(TrajectoryError::InconsistentFrame {
                    frame: index,
                    expected: atoms_per_frame,
                    found: frame.len(),
                });
            }
            coords.extend(frame);
        }
        Ok(Self {
            num_frames,
            atoms_per_frame,
            coords,
        })
    }

    /// Builds a trajectory from a flat `frames x atoms x 3` buffer (C order).
    pub fn from_flat(frames: usize, atoms: usize, data: &[f64]) -> Result<Self, TrajectoryError> {
        let expected = frames.checked_mul(atoms).and_then(|n| n.checked_mul(3));
        if expected != Some(data.len()) {
            return Err(TrajectoryError::BufferLength {
                len: data.len(),
                frames,
                atoms,
            });
        }
        let coords = data
            .chunks_exact(3)
            .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
            .collect();
        Ok(Self {
            num_frames: frames,
            atoms_per_frame: atoms,
            coords,
        })
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    #[inline]
    pub fn atoms_per_frame(&self) -> usize {
        self.atoms_per_frame
    }

    pub fn frame(&self, index: usize) -> Option<&[Point3<f64>]> {
        if index >= self.num_frames {
            return None;
        }
        let start = index * self.atoms_per_frame;
        self.coords.get(start..start + self.atoms_per_frame)
    }

    pub fn frames(&self) -> impl ExactSizeIterator<Item = &[Point3<f64>]> {
        (0..self.num_frames).map(move |index| {
            let start = index * self.atoms_per_frame;
            &self.coords[start..start + self.atoms_per_frame]
        })
    }
}
