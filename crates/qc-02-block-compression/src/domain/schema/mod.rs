//! # Schema Module
//!
//! Per-data-kind binding of key encodings and storage handles.
//!
//! ## On-disk Format
//!
//! | Keyspace | Key | Value |
//! |----------|-----|-------|
//! | native | `prefix \|\| num(8B BE) \|\| hash(32B)` | raw item bytes |
//! | compressed | `prefix \|\| to(8B BE) \|\| from(8B BE)` | chunk blob |
//! | cursor | `next-num key` | `nextNum` (8B BE) |
//!
//! Putting `to` before `from` means a forward seek to `prefix || n` lands on
//! the first chunk with `to >= n`; a `from <= n` check then confirms it.

mod kinds;
mod keys;


// Re-export public types
pub use keys::{
    compressed_key, decode_next_num, encode_next_num, native_key, parse_compressed_key,
    COMPRESSED_KEY_SUFFIX_LEN, NATIVE_KEY_SUFFIX_LEN,
};
pub use kinds::{BodySchema, DataKind, HeaderSchema, ReceiptsSchema, Schema, SchemaStores};
