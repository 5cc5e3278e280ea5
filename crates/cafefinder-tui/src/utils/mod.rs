//! Utility functions for display formatting.

pub mod format;

pub use format::{format_coordinate, format_distance, truncate_string};
