//! # Integration Tests
//!
//! Full `CompressionModule` runs over the in-memory adapters.

pub mod compression_flows;
pub mod fixture;
