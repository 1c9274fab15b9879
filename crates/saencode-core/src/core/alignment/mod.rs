//! Optimal rigid-body superposition of fragments.

pub mod kabsch;
