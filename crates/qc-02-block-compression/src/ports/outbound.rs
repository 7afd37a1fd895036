//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the compression engine. The host node implements
//! these over its storage driver and chain index.

use crate::domain::errors::KVStoreError;
use shared_types::{BlockNumber, Hash};

/// A key/value pair yielded by range iteration.
pub type KvEntry = (Vec<u8>, Vec<u8>);

/// Ascending, prefix-bounded iterator. Dropping it releases the iterator.
pub type KvIterator<'a> = Box<dyn Iterator<Item = Result<KvEntry, KVStoreError>> + Send + 'a>;

/// Abstract interface for ordered key-value database operations.
///
/// All methods take `&self`: implementations synchronize internally so the
/// driver tasks and lookup callers can share one handle.
///
/// Production: a LevelDB/RocksDB/Pebble driver owned by the host node.
/// Testing: `InMemoryKVStore` (adapters).
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Iterate keys starting with `prefix`, in ascending order, beginning at
    /// the first key `>= prefix || start`.
    fn iter_from<'a>(&'a self, prefix: &[u8], start: &[u8])
        -> Result<KvIterator<'a>, KVStoreError>;

    /// Whether `iter_from` is usable on this backend.
    ///
    /// Resolved once at module init; compression is disabled when false.
    fn supports_range_iteration(&self) -> bool {
        true
    }

    /// Reclaim space held by deleted keys in `[start, end)`.
    fn compact_range(&self, _start: &[u8], _end: &[u8]) -> Result<(), KVStoreError> {
        Ok(())
    }
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Read access to the canonical chain.
pub trait ChainReader: Send + Sync {
    /// Number of the current chain head.
    fn current_head(&self) -> BlockNumber;

    /// Hash of the canonical block at `number`, if known.
    fn canonical_hash(&self, number: BlockNumber) -> Option<Hash>;
}
