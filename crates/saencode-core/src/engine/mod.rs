//! Computational tasks built on the core primitives.
//!
//! Each task in [`tasks`] is a self-contained step of the pipeline (fragment
//! classification, trajectory encoding, dependency estimation and network
//! comparison) that reports progress through a [`progress::ProgressReporter`]
//! and fails with an [`error::EngineError`].

pub mod config;
pub mod error;
pub mod progress;
pub mod tasks;
