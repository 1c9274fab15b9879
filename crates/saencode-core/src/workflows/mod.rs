//! # Workflows Module
//!
//! End-to-end procedures that tie the [`crate::engine`] tasks together.
//!
//! - **Analysis Workflow** ([`analyze`]) - encodes a trajectory, splits the
//!   encoding into frame blocks, estimates one dependency network per block
//!   and compares every network with every other.

pub mod analyze;
