//! # Domain Layer
//!
//! Compression engine logic for the Block Compression subsystem. Storage and
//! chain access go through the port traits only.
//!
//! ## Modules
//!
//! - `config` - Bounded module configuration
//! - `errors` - Domain error types
//! - `codec` - Zstd block compressor with bounded decompression
//! - `chunk` - Chunk items, ranges and blob encoding
//! - `schema` - Per-data-kind key layout and `nextNum` cursor
//! - `context` - Chunk accumulation state machine and native compaction
//! - `cache` - Two-level item/chunk LRU cache
//! - `metrics` - Lock-free counters and Prometheus export

pub mod cache;
pub mod chunk;
pub mod codec;
pub mod config;
pub mod context;
pub mod errors;
pub mod metrics;
pub mod schema;
