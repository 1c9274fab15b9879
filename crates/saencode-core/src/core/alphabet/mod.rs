//! Structural alphabet reference geometries.

pub mod library;
