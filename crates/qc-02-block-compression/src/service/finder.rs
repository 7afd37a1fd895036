//! # Compressed Lookup
//!
//! Native keyspace first, then the two cache levels, then one seek into the
//! chunk keyspace. Decoded chunks populate both cache levels.
//!
//! A cached chunk whose item disagrees with the requested hash is dropped
//! and the lookup falls through to storage: a lookup racing a rewind can
//! re-cache a chunk that storage no longer holds.

use super::{CompressionModule, SchemaHandle};
use crate::domain::cache::{chunk_item, CacheLookup};
use crate::domain::chunk::decode_chunk;
use crate::domain::errors::{CompressionError, KVStoreError};
use crate::domain::schema::{parse_compressed_key, Schema};
use crate::ports::inbound::CompressedBlockReader;
use shared_types::{BlockNumber, Hash};
use std::sync::Arc;

impl CompressionModule {
    pub(crate) fn find<S: Schema>(
        &self,
        handle: &SchemaHandle<S>,
        num: BlockNumber,
        hash: &Hash,
    ) -> Result<Option<Vec<u8>>, CompressionError> {
        let schema = handle.schema.as_ref();

        if let Some(payload) = schema.native_store().get(&schema.native_key(num, hash))? {
            self.metrics.record_native_hit();
            return Ok(Some(payload));
        }
        if !self.enabled {
            return Ok(self.not_found());
        }

        match handle.cache.lookup(num, hash) {
            CacheLookup::Item(payload) => {
                self.metrics.record_item_cache_hit();
                return Ok(Some(payload));
            }
            CacheLookup::Chunk(payload) => {
                self.metrics.record_chunk_cache_hit();
                return Ok(Some(payload));
            }
            CacheLookup::Stale(range) => handle.cache.invalidate(range),
            CacheLookup::Miss => {}
        }

        self.metrics.record_range_query();
        let prefix = schema.compressed_key_prefix();
        let first = schema
            .compressed_store()
            .iter_from(prefix, &num.to_be_bytes())?
            .next()
            .transpose()?;
        let Some((key, blob)) = first else {
            return Ok(self.not_found());
        };

        let range = parse_compressed_key(prefix, &key).ok_or_else(|| KVStoreError::CorruptionError {
            message: format!("malformed {} chunk key 0x{}", schema.name(), hex::encode(&key)),
        })?;
        if !range.contains(num) {
            return Ok(self.not_found());
        }

        let items = Arc::new(decode_chunk(self.codec.as_ref(), range, &blob)?);
        handle.cache.put_chunk(range, Arc::clone(&items));

        match chunk_item(&items, range, num, hash) {
            Some(item) => {
                handle.cache.put_item(num, *hash, item.payload.clone());
                Ok(Some(item.payload.clone()))
            }
            None => Ok(self.not_found()),
        }
    }

    fn not_found(&self) -> Option<Vec<u8>> {
        self.metrics.record_not_found();
        None
    }
}

impl CompressedBlockReader for CompressionModule {
    fn find_compressed_header(
        &self,
        num: BlockNumber,
        hash: &Hash,
    ) -> Result<Option<Vec<u8>>, CompressionError> {
        self.find(&self.header, num, hash)
    }

    fn find_compressed_body(
        &self,
        num: BlockNumber,
        hash: &Hash,
    ) -> Result<Option<Vec<u8>>, CompressionError> {
        self.find(&self.body, num, hash)
    }

    fn find_compressed_receipts(
        &self,
        num: BlockNumber,
        hash: &Hash,
    ) -> Result<Option<Vec<u8>>, CompressionError> {
        self.find(&self.receipts, num, hash)
    }
}
