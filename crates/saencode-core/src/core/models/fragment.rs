use nalgebra::Point3;
use thiserror::Error;

/// Number of consecutive backbone atoms in one fragment (the encoding window width).
pub const FRAGMENT_LENGTH: usize = 4;

/// A window of consecutive backbone atom coordinates describing local geometry.
///
/// Fragments are value types; they are copied freely and never mutated after
/// construction. Sliding windows over a frame are handled as borrowed
/// `&[Point3<f64>]` slices instead, so encoding never has to build one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    points: [Point3<f64>; FRAGMENT_LENGTH],
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("A fragment requires exactly {} points, got {found}", FRAGMENT_LENGTH)]
pub struct FragmentLengthError {
    pub found: usize,
}

impl Fragment {
    pub fn new(points: [Point3<f64>; FRAGMENT_LENGTH]) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }
}

impl TryFrom<&[Point3<f64>]> for Fragment {
    type Error = FragmentLengthError;

    fn try_from(points: &[Point3<f64>]) -> Result<Self, Self::Error> {
        let points: [Point3<f64>; FRAGMENT_LENGTH] =
            points.try_into().map_err(|_| FragmentLengthError {
                found: points.len(),
            })?;
        Ok(Self { points })
    }
}

impl From<[[f64; 3]; FRAGMENT_LENGTH]> for Fragment {
    fn from(coords: [[f64; 3]; FRAGMENT_LENGTH]) -> Self {
        Self {
            points: coords.map(|[x, y, z]| Point3::new(x, y, z)),
        }
    }
}
