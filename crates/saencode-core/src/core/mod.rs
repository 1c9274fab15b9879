//! # Core Module
//!
//! Stateless building blocks of structural alphabet analysis: the value types
//! that flow through the pipeline, the reference alphabet, and the pure
//! numerical kernels that the [`crate::engine`] tasks fan out over.
//!
//! - **Data Models** ([`models`]) - fragments, letters, trajectories and encodings
//! - **Reference Alphabet** ([`alphabet`]) - the immutable letter to fragment library
//! - **Superposition** ([`alignment`]) - Kabsch RMSD between fragments
//! - **Information Theory** ([`information`]) - entropy and normalised mutual information
//! - **Linear Algebra** ([`linalg`]) - symmetric matrix square roots
//! - **File I/O** ([`io`]) - PDB alphabet loading and CSV export

pub mod alignment;
pub mod alphabet;
pub mod information;
pub mod io;
pub mod linalg;
pub mod models;
pub(crate) mod utils;
