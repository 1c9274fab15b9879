pub mod classify;
pub mod dependency;
pub mod encoding;
pub mod overlap;
