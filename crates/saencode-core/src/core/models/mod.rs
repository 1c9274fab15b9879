//! Value types flowing through the encoding pipeline.
//!
//! - [`fragment`] - four-point backbone windows and the window width constant
//! - [`letter`] - structural alphabet symbols
//! - [`trajectory`] - frames of backbone coordinates supplied by the caller
//! - [`encoding`] - the frames x positions letter matrix produced by encoding

pub mod encoding;
pub mod fragment;
pub mod letter;
pub mod trajectory;
