//! Helpers shared across resources.
pub mod fs;
