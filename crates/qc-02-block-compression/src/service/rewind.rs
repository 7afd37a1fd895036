//! # Reorg Compensation
//!
//! A rewind below `nextNum` moves every chunk with `to >= num` back into the
//! native keyspace and pulls `nextNum` down to the lowest restored `from`.
//! Chunks are restored whole; they cannot be partially decompressed.
//!
//! ## Write Order
//!
//! 1. Missing native items are written in one batch per chunk
//! 2. Chunk deletions and the new `nextNum` go in one batch on the compressed store
//!
//! A crash between the two leaves both copies, never neither.

use super::{CompressionModule, SchemaHandle};
use crate::domain::chunk::{decode_chunk, ChunkRange};
use crate::domain::errors::CompressionError;
use crate::domain::schema::{encode_next_num, parse_compressed_key, Schema};
use crate::ports::inbound::ReorgCompensator;
use crate::ports::outbound::BatchOperation;
use shared_types::{BlockId, BlockNumber, Hash};

impl CompressionModule {
    fn ensure_stopped(&self) -> Result<(), CompressionError> {
        if self.is_started() || self.drivers_live() {
            return Err(CompressionError::AlreadyRunning);
        }
        Ok(())
    }

    pub(crate) fn rewind_schema<S: Schema>(
        &self,
        handle: &SchemaHandle<S>,
        num: BlockNumber,
    ) -> Result<(), CompressionError> {
        let schema = handle.schema.as_ref();
        let name = schema.name();

        let Some(next_num) = schema.read_next_num()? else {
            return Ok(());
        };
        if num == 0 || num >= next_num {
            return Ok(());
        }

        let prefix = schema.compressed_key_prefix();
        let mut chunks: Vec<(ChunkRange, Vec<u8>)> = Vec::new();
        for entry in schema
            .compressed_store()
            .iter_from(prefix, &num.to_be_bytes())
            .map_err(|e| CompressionError::fatal(name, format!("seek chunk for #{num}: {e}")))?
        {
            let (key, blob) =
                entry.map_err(|e| CompressionError::fatal(name, format!("scan chunks: {e}")))?;
            let range = parse_compressed_key(prefix, &key).ok_or_else(|| {
                CompressionError::fatal(name, format!("malformed chunk key 0x{}", hex::encode(&key)))
            })?;
            chunks.push((range, blob));
        }

        let Some(new_next_num) = chunks.iter().map(|(range, _)| range.from).min() else {
            return Ok(());
        };

        let mut cursor_batch = Vec::with_capacity(chunks.len() + 1);
        for (range, blob) in &chunks {
            let written = self.restore_chunk(handle, *range, blob)?;
            cursor_batch.push(BatchOperation::delete(schema.compressed_key(*range)));
            self.metrics.record_chunk_restored(written);
            tracing::info!(
                schema = name,
                from = range.from,
                to = range.to,
                restored = written,
                "[qc-02] ♻️ chunk restored to native keyspace"
            );
        }
        cursor_batch.push(BatchOperation::put(
            schema.next_num_key(),
            encode_next_num(new_next_num).as_slice(),
        ));
        schema
            .compressed_store()
            .atomic_batch_write(cursor_batch)
            .map_err(|e| CompressionError::fatal(name, format!("drop restored chunks: {e}")))?;

        for (range, _) in &chunks {
            handle.cache.invalidate(*range);
        }
        tracing::info!(
            schema = name,
            next_num = new_next_num,
            "[qc-02] rewind moved compression cursor back from #{}",
            next_num
        );
        Ok(())
    }

    /// Write back every item of one chunk that is not already native.
    fn restore_chunk<S: Schema>(
        &self,
        handle: &SchemaHandle<S>,
        range: ChunkRange,
        blob: &[u8],
    ) -> Result<u64, CompressionError> {
        let schema = handle.schema.as_ref();
        let name = schema.name();

        let items = decode_chunk(self.codec.as_ref(), range, blob)
            .map_err(|e| CompressionError::fatal(name, format!("decode chunk {range}: {e}")))?;

        let mut puts = Vec::new();
        for item in items {
            let key = schema.native_key(item.num, &item.hash);
            let existing = schema
                .native_store()
                .get(&key)
                .map_err(|e| CompressionError::fatal(name, format!("read #{}: {e}", item.num)))?;
            match existing {
                None => puts.push(BatchOperation::put(key, item.payload)),
                Some(native) if native == item.payload => {}
                Some(_) => {
                    return Err(CompressionError::fatal(
                        name,
                        format!("native #{} differs from chunk {range} copy", item.num),
                    ))
                }
            }
        }

        let written = puts.len() as u64;
        if !puts.is_empty() {
            schema
                .native_store()
                .atomic_batch_write(puts)
                .map_err(|e| CompressionError::fatal(name, format!("restore chunk {range}: {e}")))?;
        }
        Ok(written)
    }
}

impl ReorgCompensator for CompressionModule {
    fn rewind_to(&self, new_head: BlockNumber) -> Result<(), CompressionError> {
        self.ensure_stopped()?;
        tracing::info!("[qc-02] rewind to #{} announced", new_head);
        Ok(())
    }

    fn rewind_delete(&self, hash: &Hash, num: BlockNumber) -> Result<(), CompressionError> {
        self.ensure_stopped()?;
        if !self.enabled {
            return Ok(());
        }
        tracing::debug!("[qc-02] rewind delete {}", BlockId::new(num, *hash));

        self.rewind_schema(&self.header, num)?;
        self.rewind_schema(&self.body, num)?;
        self.rewind_schema(&self.receipts, num)
    }
}
