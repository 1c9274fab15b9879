//! Discrete information theory over encoding columns.
//!
//! - [`distribution`] - empirical distributions from observed samples
//! - [`entropy`] - Shannon entropy with the zero-probability convention
//! - [`mutual_information`] - raw and bias-corrected normalised mutual information

pub mod distribution;
pub mod entropy;
pub mod mutual_information;
