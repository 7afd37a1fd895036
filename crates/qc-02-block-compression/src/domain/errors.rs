//! # Domain Errors
//!
//! Error types for the Block Compression subsystem.
//!
//! ## Design Principles
//!
//! - Each error maps to a specific failure class of the engine
//! - Lookups report "not found" as `Ok(None)`, never as an error
//! - No panics in domain logic (use Result instead)

use shared_types::BlockNumber;
use std::io;
use thiserror::Error;

/// Invalid configuration detected at `init`. Fatal to initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Retention outside the supported window.
    #[error("retention {value} out of range [{min}, {max}]")]
    RetentionOutOfRange { value: u64, min: u64, max: u64 },

    /// Chunk item cap outside the supported window.
    #[error("chunk item cap {value} out of range [{min}, {max}]")]
    ChunkItemCapOutOfRange { value: usize, min: usize, max: usize },

    /// Chunk byte cap outside the supported window.
    #[error("chunk byte cap {value} out of range [{min}, {max}]")]
    ChunkByteCapOutOfRange { value: usize, min: usize, max: usize },

    /// A cache must hold at least one entry.
    #[error("{cache} cache capacity must be at least 1")]
    InvalidCacheCapacity { cache: &'static str },

    /// An interval must be non-zero.
    #[error("{name} must be greater than zero")]
    InvalidInterval { name: &'static str },

    /// Zstd level outside 1..=22.
    #[error("zstd level {level} out of range [1, 22]")]
    InvalidCodecLevel { level: i32 },
}

/// Compression / decompression failure.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Encoder failed.
    #[error("compression failed: {0}")]
    CompressFailed(#[source] io::Error),

    /// Decoder failed (corrupt or truncated stream, bad checksum).
    #[error("decompression failed: {0}")]
    DecompressFailed(#[source] io::Error),

    /// Decoded output exceeds the hard limit.
    #[error("decompressed output exceeds {limit} bytes")]
    DecompressedTooLarge { limit: usize },

    /// Chunk items could not be serialized.
    #[error("chunk serialization failed: {0}")]
    Serialize(String),

    /// Chunk payload could not be decoded or does not match its key range.
    #[error("chunk deserialization failed: {0}")]
    Deserialize(String),
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },

    /// Operation not supported by this backend.
    #[error("KV store does not support {operation}")]
    Unsupported { operation: &'static str },
}

/// Errors surfaced by the compression module.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// Invalid configuration.
    #[error("invalid compression config: {0}")]
    Config(#[from] ConfigError),

    /// Codec failure on the compress or decompress path.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Plain storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] KVStoreError),

    /// A write expected to always succeed did not; the schema cannot continue.
    #[error("fatal storage failure in {schema}: {reason}")]
    StorageFatal {
        schema: &'static str,
        reason: String,
    },

    /// The chain reader knows no canonical block at this height.
    #[error("no canonical hash for block #{number}")]
    MissingCanonicalHash { number: BlockNumber },

    /// The canonical block's record is absent from the native keyspace.
    #[error("{schema} #{number} missing from native keyspace")]
    MissingNativeItem {
        schema: &'static str,
        number: BlockNumber,
    },

    /// Operation requires the background drivers to be stopped.
    #[error("compression drivers are running; stop them first")]
    AlreadyRunning,

    /// The backend lacks range iteration; compression is off.
    #[error("compression is disabled for this backend")]
    Disabled,
}

impl CompressionError {
    /// Wrap any displayable failure as `StorageFatal` for `schema`.
    pub fn fatal(schema: &'static str, reason: impl ToString) -> Self {
        CompressionError::StorageFatal {
            schema,
            reason: reason.to_string(),
        }
    }

    /// True for failures that must abort the triggering operation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CompressionError::StorageFatal { .. } | CompressionError::Storage(_)
        )
    }
}
