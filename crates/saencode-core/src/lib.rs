//! # SAEncode Core Library
//!
//! Structural alphabet encoding of molecular dynamics trajectories and
//! information-theoretic analysis of the resulting letter sequences.
//!
//! Every overlapping four-atom fragment of every frame is superposed onto a
//! small library of reference fragments and replaced by the letter of the
//! closest one. Normalised mutual information between alphabet positions then
//! gives a dependency network per block of frames, and networks are compared
//! through a matrix overlap score.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Value types (`Fragment`, `Letter`,
//!   `Trajectory`, `Encoding`), the reference alphabet, Kabsch superposition,
//!   entropy and mutual information, symmetric matrix square roots and file I/O.
//!
//! - **[`engine`]: The Logic Core.** Configuration, errors, progress reporting
//!   with cancellation, and the parallel tasks that implement each pipeline stage.
//!
//! - **[`workflows`]: The Public API.** The complete analysis from trajectory
//!   to overlap matrix.

pub mod core;
pub mod engine;
pub mod workflows;
