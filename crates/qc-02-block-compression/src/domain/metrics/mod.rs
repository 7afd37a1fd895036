//! # Metrics Module
//!
//! Counters for chunk migration, restoration and lookup paths.

mod collector;


// Re-export public types
pub use collector::{CompressionMetrics, MetricsSnapshot};
