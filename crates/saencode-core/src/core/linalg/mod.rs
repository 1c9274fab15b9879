//! Dense symmetric-matrix helpers used by network comparison.

pub mod sqrtm;
