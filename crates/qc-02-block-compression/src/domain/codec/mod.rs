//! # Codec Module
//!
//! Zstd compression of opaque chunk payloads.

mod compressor;
pub mod security;


// Re-export public types
pub use compressor::{BlockCompressor, CodecConfig, NoOpCompressor, ZstdCompressor};
