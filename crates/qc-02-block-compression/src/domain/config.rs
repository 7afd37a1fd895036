//! # Compression Configuration
//!
//! Retention window, chunk caps, cache sizes and driver timing.
//!
//! Every numeric field is bounded; `validate()` is called by
//! `CompressionModule::init` and rejects anything out of range.

use crate::domain::codec::CodecConfig;
use crate::domain::errors::ConfigError;
use std::time::Duration;

/// Minimum number of blocks always kept uncompressed.
pub const MIN_RETENTION: u64 = 128;
/// Maximum retention window.
pub const MAX_RETENTION: u64 = 100_000_000;
/// Default retention (two days of one-second blocks).
pub const DEFAULT_RETENTION: u64 = 172_800;

/// Minimum number of items per chunk.
pub const MIN_CHUNK_ITEM_CAP: usize = 10;
/// Maximum number of items per chunk.
pub const MAX_CHUNK_ITEM_CAP: usize = 1_000_000;
/// Default number of items per chunk.
pub const DEFAULT_CHUNK_ITEM_CAP: usize = 10_000;

/// Minimum raw byte size that closes a chunk.
pub const MIN_CHUNK_BYTE_CAP: usize = 1024;
/// Maximum raw byte size that closes a chunk.
pub const MAX_CHUNK_BYTE_CAP: usize = 1024 * 1024 * 1024;
/// Default raw byte size that closes a chunk.
pub const DEFAULT_CHUNK_BYTE_CAP: usize = 10 * 1024 * 1024;

/// Env var overriding `retention`.
pub const ENV_RETENTION: &str = "QC_COMPRESS_RETENTION";
/// Env var overriding `chunk_item_cap`.
pub const ENV_CHUNK_ITEM_CAP: &str = "QC_COMPRESS_CHUNK_ITEM_CAP";
/// Env var overriding `chunk_byte_cap`.
pub const ENV_CHUNK_BYTE_CAP: &str = "QC_COMPRESS_CHUNK_BYTE_CAP";

/// Configuration for the compression module.
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// Number of most-recent blocks that always stay in the native keyspace.
    pub retention: u64,
    /// A chunk closes once it buffers this many items.
    pub chunk_item_cap: usize,
    /// A chunk closes once its buffered payloads reach this many bytes.
    pub chunk_byte_cap: usize,
    /// Capacity of the per-schema item cache.
    pub item_cache_capacity: usize,
    /// Capacity of the per-schema decompressed chunk cache.
    pub chunk_cache_capacity: usize,
    /// Driver sleep once caught up to the retention boundary.
    pub idle_interval: Duration,
    /// Native keyspace compaction is requested every this many blocks.
    pub compaction_interval: u64,
    /// Codec settings.
    pub codec: CodecConfig,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            retention: DEFAULT_RETENTION,
            chunk_item_cap: DEFAULT_CHUNK_ITEM_CAP,
            chunk_byte_cap: DEFAULT_CHUNK_BYTE_CAP,
            item_cache_capacity: 4096,
            chunk_cache_capacity: 64,
            idle_interval: Duration::from_secs(1),
            compaction_interval: 100_000,
            codec: CodecConfig::default(),
        }
    }
}

impl CompressionConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `QC_COMPRESS_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_RETENTION) {
            match raw.parse() {
                Ok(v) => config.retention = v,
                Err(_) => tracing::warn!("[qc-02] ignoring {}={:?}", ENV_RETENTION, raw),
            }
        }
        if let Some(raw) = lookup(ENV_CHUNK_ITEM_CAP) {
            match raw.parse() {
                Ok(v) => config.chunk_item_cap = v,
                Err(_) => tracing::warn!("[qc-02] ignoring {}={:?}", ENV_CHUNK_ITEM_CAP, raw),
            }
        }
        if let Some(raw) = lookup(ENV_CHUNK_BYTE_CAP) {
            match raw.parse() {
                Ok(v) => config.chunk_byte_cap = v,
                Err(_) => tracing::warn!("[qc-02] ignoring {}={:?}", ENV_CHUNK_BYTE_CAP, raw),
            }
        }

        config
    }

    /// Set the retention window.
    pub fn with_retention(mut self, retention: u64) -> Self {
        self.retention = retention;
        self
    }

    /// Set the chunk item cap.
    pub fn with_chunk_item_cap(mut self, cap: usize) -> Self {
        self.chunk_item_cap = cap;
        self
    }

    /// Set the chunk byte cap.
    pub fn with_chunk_byte_cap(mut self, cap: usize) -> Self {
        self.chunk_byte_cap = cap;
        self
    }

    /// Set both cache capacities.
    pub fn with_cache_capacity(mut self, items: usize, chunks: usize) -> Self {
        self.item_cache_capacity = items;
        self.chunk_cache_capacity = chunks;
        self
    }

    /// Set the driver idle interval.
    pub fn with_idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }

    /// Set the native compaction period in blocks.
    pub fn with_compaction_interval(mut self, blocks: u64) -> Self {
        self.compaction_interval = blocks;
        self
    }

    /// Set the codec configuration.
    pub fn with_codec(mut self, codec: CodecConfig) -> Self {
        self.codec = codec;
        self
    }

    /// Check every bounded field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_RETENTION..=MAX_RETENTION).contains(&self.retention) {
            return Err(ConfigError::RetentionOutOfRange {
                value: self.retention,
                min: MIN_RETENTION,
                max: MAX_RETENTION,
            });
        }
        if !(MIN_CHUNK_ITEM_CAP..=MAX_CHUNK_ITEM_CAP).contains(&self.chunk_item_cap) {
            return Err(ConfigError::ChunkItemCapOutOfRange {
                value: self.chunk_item_cap,
                min: MIN_CHUNK_ITEM_CAP,
                max: MAX_CHUNK_ITEM_CAP,
            });
        }
        if !(MIN_CHUNK_BYTE_CAP..=MAX_CHUNK_BYTE_CAP).contains(&self.chunk_byte_cap) {
            return Err(ConfigError::ChunkByteCapOutOfRange {
                value: self.chunk_byte_cap,
                min: MIN_CHUNK_BYTE_CAP,
                max: MAX_CHUNK_BYTE_CAP,
            });
        }
        if self.item_cache_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity { cache: "item" });
        }
        if self.chunk_cache_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity { cache: "chunk" });
        }
        if self.idle_interval.is_zero() {
            return Err(ConfigError::InvalidInterval {
                name: "idle_interval",
            });
        }
        if self.compaction_interval == 0 {
            return Err(ConfigError::InvalidInterval {
                name: "compaction_interval",
            });
        }
        self.codec.validate()
    }
}
