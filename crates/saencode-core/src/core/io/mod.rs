//! File I/O around the numerical core.
//!
//! - [`pdb`] - per-letter PDB reference files of a structural alphabet
//! - [`export`] - CSV export of encodings and real matrices

pub mod export;
pub mod pdb;
