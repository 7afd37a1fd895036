//! # Chunk Module
//!
//! `ChunkItem` (one block's record of one kind) and the encoding of an
//! ordered item list into a single compressed blob.

mod item;


// Re-export public types
pub use item::{decode_chunk, encode_chunk, ChunkItem, ChunkRange};
