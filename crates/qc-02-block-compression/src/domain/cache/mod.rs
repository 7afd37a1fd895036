//! # Cache Module
//!
//! Two-level decompression-avoidance cache owned by one schema of one
//! module instance.

mod chunk_cache;


// Re-export public types
pub use chunk_cache::{chunk_item, CacheLookup, CacheStats, ChunkCache};
