//! # Block Compression Engine (qc-02)
//!
//! Migrates aging block headers, bodies and receipts out of the per-block
//! native keyspace into zstd-compressed chunks, while keeping the most recent
//! `retention` blocks uncompressed.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────── CompressionModule ────────────┐
//!  start/stop ──→ │ driver(header)  driver(body)  driver(rcpt) │
//!                 │      │              │             │        │
//!                 │      └──── CompressionContext ────┘        │
//!                 │                   │ flush                  │
//!  find_* ──────→ │ native → item cache → chunk cache → seek   │
//!  rewind_* ────→ │ restore chunks with to >= num              │
//!                 └───────────────────┬───────────────────────┘
//!                                     ↓
//!                          KeyValueStore (host DB)
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | No Gaps | Every block below the head is native or inside exactly one chunk |
//! | 2 | Retention | Blocks above `head - retention` are never compressed |
//! | 3 | Write Before Delete | Chunk and `nextNum` land before native deletes |
//! | 4 | Genesis | Block 0 is never compressed |
//! | 5 | Contiguous Chunks | A chunk covers `[from, to]` with no holes |
//! | 6 | Stopped Rewind | Rewind runs only while drivers are stopped |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Config, codec, chunk format, schemas, context, cache, metrics
//! - `ports/` - Port traits (inbound API, outbound SPI)
//! - `adapters/` - In-memory KV store and chain reader
//! - `service/` - `CompressionModule`: lifecycle, driver, finder, rewind
//!
//! ## Usage
//!
//! ```ignore
//! use qc_02_block_compression::{
//!     CompressedBlockReader, CompressionConfig, CompressionModule, SchemaStores,
//! };
//!
//! let module = CompressionModule::init(
//!     CompressionConfig::from_env(),
//!     SchemaStores::shared(store),
//!     chain,
//! )?;
//! module.start().await?;
//!
//! let body = module.find_compressed_body(number, &hash)?;
//!
//! // Before a reorg
//! module.stop().await;
//! module.rewind_delete(&hash, number)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export key types for convenience
pub use adapters::{InMemoryChain, InMemoryKVStore};
pub use domain::cache::{CacheLookup, CacheStats, ChunkCache};
pub use domain::chunk::{ChunkItem, ChunkRange};
pub use domain::codec::{BlockCompressor, CodecConfig, NoOpCompressor, ZstdCompressor};
pub use domain::config::CompressionConfig;
pub use domain::context::{CompactionGuard, CompressionContext, ContextDeps};
pub use domain::errors::{CodecError, CompressionError, ConfigError, KVStoreError};
pub use domain::metrics::{CompressionMetrics, MetricsSnapshot};
pub use domain::schema::{
    BodySchema, DataKind, HeaderSchema, ReceiptsSchema, Schema, SchemaStores,
};
pub use ports::inbound::{CompressedBlockReader, ReorgCompensator};
pub use ports::outbound::{BatchOperation, ChainReader, KeyValueStore};
pub use service::{CompressionModule, SchemaStatus};
