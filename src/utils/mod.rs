//! Utility functions shared by the analyzers.

pub mod stats;

pub use stats::{pearson, round_to};
