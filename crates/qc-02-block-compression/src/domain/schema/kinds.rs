//! # Schema Kinds
//!
//! `Schema` is the capability the engine is generic over. Header, body and
//! receipts share all logic and differ only in their key prefixes.

use super::keys::{compressed_key, decode_next_num, encode_next_num, native_key};
use crate::domain::chunk::ChunkRange;
use crate::domain::errors::{CompressionError, KVStoreError};
use crate::ports::outbound::KeyValueStore;
use shared_types::{BlockNumber, Hash};
use std::fmt;
use std::sync::Arc;

/// The three data kinds migrated into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Header,
    Body,
    Receipts,
}

impl DataKind {
    /// Lower-case label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Header => "header",
            DataKind::Body => "body",
            DataKind::Receipts => "receipts",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage handles a schema reads and writes.
///
/// Native and compressed keyspaces may live in different databases; tests
/// usually pass the same store for both.
#[derive(Clone)]
pub struct SchemaStores {
    pub native: Arc<dyn KeyValueStore>,
    pub compressed: Arc<dyn KeyValueStore>,
}

impl SchemaStores {
    /// Both keyspaces in one store.
    pub fn shared(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            native: Arc::clone(&store),
            compressed: store,
        }
    }
}

/// Per-data-kind binding of key encodings and storage handles.
pub trait Schema: Send + Sync + 'static {
    /// Which kind of record this schema migrates.
    fn kind(&self) -> DataKind;

    /// Store holding the live per-item keyspace.
    fn native_store(&self) -> &dyn KeyValueStore;

    /// Store holding chunks and the `nextNum` cursor.
    fn compressed_store(&self) -> &dyn KeyValueStore;

    /// Prefix of the live per-item keyspace.
    fn native_prefix(&self) -> &'static [u8];

    /// Prefix of the chunk keyspace.
    fn compressed_key_prefix(&self) -> &'static [u8];

    /// Key of the persisted `nextNum` cursor.
    fn next_num_key(&self) -> &'static [u8];

    /// Schema name for logs and errors.
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn native_key(&self, num: BlockNumber, hash: &Hash) -> Vec<u8> {
        native_key(self.native_prefix(), num, hash)
    }

    fn compressed_key(&self, range: ChunkRange) -> Vec<u8> {
        compressed_key(self.compressed_key_prefix(), range)
    }

    /// Persisted cursor, or `None` before first initialization.
    fn read_next_num(&self) -> Result<Option<BlockNumber>, CompressionError> {
        match self.compressed_store().get(self.next_num_key())? {
            None => Ok(None),
            Some(raw) => decode_next_num(&raw).map(Some).ok_or_else(|| {
                CompressionError::Storage(KVStoreError::CorruptionError {
                    message: format!("{} next-num cursor is {} bytes", self.name(), raw.len()),
                })
            }),
        }
    }

    /// Persist the cursor. Failure here is unrecoverable for the schema.
    fn write_next_num(&self, num: BlockNumber) -> Result<(), CompressionError> {
        self.compressed_store()
            .put(self.next_num_key(), &encode_next_num(num))
            .map_err(|e| CompressionError::fatal(self.name(), format!("persist nextNum: {e}")))
    }
}

/// Block headers.
pub struct HeaderSchema {
    stores: SchemaStores,
}

impl HeaderSchema {
    pub fn new(stores: SchemaStores) -> Self {
        Self { stores }
    }
}

impl Schema for HeaderSchema {
    fn kind(&self) -> DataKind {
        DataKind::Header
    }
    fn native_store(&self) -> &dyn KeyValueStore {
        self.stores.native.as_ref()
    }
    fn compressed_store(&self) -> &dyn KeyValueStore {
        self.stores.compressed.as_ref()
    }
    fn native_prefix(&self) -> &'static [u8] {
        b"h"
    }
    fn compressed_key_prefix(&self) -> &'static [u8] {
        b"Ch"
    }
    fn next_num_key(&self) -> &'static [u8] {
        b"CompressNext-h"
    }
}

/// Block bodies (transaction lists).
pub struct BodySchema {
    stores: SchemaStores,
}

impl BodySchema {
    pub fn new(stores: SchemaStores) -> Self {
        Self { stores }
    }
}

impl Schema for BodySchema {
    fn kind(&self) -> DataKind {
        DataKind::Body
    }
    fn native_store(&self) -> &dyn KeyValueStore {
        self.stores.native.as_ref()
    }
    fn compressed_store(&self) -> &dyn KeyValueStore {
        self.stores.compressed.as_ref()
    }
    fn native_prefix(&self) -> &'static [u8] {
        b"b"
    }
    fn compressed_key_prefix(&self) -> &'static [u8] {
        b"Cb"
    }
    fn next_num_key(&self) -> &'static [u8] {
        b"CompressNext-b"
    }
}

/// Block receipts.
pub struct ReceiptsSchema {
    stores: SchemaStores,
}

impl ReceiptsSchema {
    pub fn new(stores: SchemaStores) -> Self {
        Self { stores }
    }
}

impl Schema for ReceiptsSchema {
    fn kind(&self) -> DataKind {
        DataKind::Receipts
    }
    fn native_store(&self) -> &dyn KeyValueStore {
        self.stores.native.as_ref()
    }
    fn compressed_store(&self) -> &dyn KeyValueStore {
        self.stores.compressed.as_ref()
    }
    fn native_prefix(&self) -> &'static [u8] {
        b"r"
    }
    fn compressed_key_prefix(&self) -> &'static [u8] {
        b"Cr"
    }
    fn next_num_key(&self) -> &'static [u8] {
        b"CompressNext-r"
    }
}
