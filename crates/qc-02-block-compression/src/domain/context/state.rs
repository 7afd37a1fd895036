//! # Chunk Accumulation
//!
//! `CompressionContext` walks a schema's native keyspace forward from
//! `nextNum`, buffering items until either cap is reached, then flushes the
//! buffer as one chunk.

use super::compaction::CompactionGuard;
use crate::domain::chunk::{encode_chunk, ChunkItem, ChunkRange};
use crate::domain::codec::BlockCompressor;
use crate::domain::config::CompressionConfig;
use crate::domain::errors::CompressionError;
use crate::domain::metrics::CompressionMetrics;
use crate::domain::schema::{encode_next_num, Schema};
use crate::ports::outbound::{BatchOperation, ChainReader};
use shared_types::BlockNumber;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A progress line is logged every this many processed blocks.
pub const PROGRESS_LOG_INTERVAL: u64 = 10_000;

/// Collaborators a context needs.
pub struct ContextDeps<S: Schema> {
    pub schema: Arc<S>,
    pub chain: Arc<dyn ChainReader>,
    pub codec: Arc<dyn BlockCompressor>,
    pub metrics: Arc<CompressionMetrics>,
    pub compactor: Arc<CompactionGuard>,
}

/// Observable state of the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Nothing buffered.
    Idle,
    /// Items buffered, caps not reached.
    Accumulating,
}

/// Result of one `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Item appended, chunk still open.
    Buffered,
    /// Item appended and the chunk closed and was flushed.
    Flushed(ChunkRange),
}

/// Why `until` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UntilOutcome {
    /// Every block up to the target has been consumed.
    Reached,
    /// The cancel flag was raised.
    Cancelled,
}

/// Per-run cursor over one schema.
///
/// Rebuilt from the persisted `nextNum` each time a driver starts; the
/// buffer itself is never persisted.
pub struct CompressionContext<S: Schema> {
    deps: ContextDeps<S>,
    item_cap: usize,
    byte_cap: usize,
    compaction_interval: u64,
    from_num: BlockNumber,
    curr_num: BlockNumber,
    buffer: Vec<ChunkItem>,
    buffered_bytes: usize,
    processed: u64,
    compacted_up_to: BlockNumber,
}

impl<S: Schema> CompressionContext<S> {
    /// Resume from the persisted `nextNum`, initializing it to 1 if absent.
    pub fn resume(deps: ContextDeps<S>, config: &CompressionConfig) -> Result<Self, CompressionError> {
        let next_num = match deps.schema.read_next_num()? {
            Some(n) => n.max(1),
            None => {
                deps.schema.write_next_num(1)?;
                1
            }
        };

        Ok(Self {
            deps,
            item_cap: config.chunk_item_cap,
            byte_cap: config.chunk_byte_cap,
            compaction_interval: config.compaction_interval,
            from_num: next_num,
            curr_num: next_num,
            buffer: Vec::with_capacity(config.chunk_item_cap.min(4096)),
            buffered_bytes: 0,
            processed: 0,
            compacted_up_to: next_num,
        })
    }

    pub fn state(&self) -> ContextState {
        if self.buffer.is_empty() {
            ContextState::Idle
        } else {
            ContextState::Accumulating
        }
    }

    /// First block of the open chunk.
    pub fn from_num(&self) -> BlockNumber {
        self.from_num
    }

    /// Next block `step` will read.
    pub fn curr_num(&self) -> BlockNumber {
        self.curr_num
    }

    pub fn buffered_items(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffered_bytes
    }

    /// Consume the native item at `curr_num`.
    pub fn step(&mut self) -> Result<StepOutcome, CompressionError> {
        let schema = &self.deps.schema;
        let num = self.curr_num;

        let hash = self
            .deps
            .chain
            .canonical_hash(num)
            .ok_or(CompressionError::MissingCanonicalHash { number: num })?;
        let payload = schema
            .native_store()
            .get(&schema.native_key(num, &hash))?
            .ok_or(CompressionError::MissingNativeItem {
                schema: schema.name(),
                number: num,
            })?;

        self.buffered_bytes += payload.len();
        self.buffer.push(ChunkItem::new(num, hash, payload));

        let outcome = if self.buffer.len() >= self.item_cap || self.buffered_bytes >= self.byte_cap {
            match self.flush() {
                Ok(range) => StepOutcome::Flushed(range),
                Err(e) => {
                    // Un-read the item so a retried step starts from the same block.
                    if let Some(item) = self.buffer.pop() {
                        self.buffered_bytes -= item.payload.len();
                    }
                    return Err(e);
                }
            }
        } else {
            StepOutcome::Buffered
        };

        self.curr_num = num + 1;
        self.processed += 1;
        if self.processed % PROGRESS_LOG_INTERVAL == 0 {
            tracing::info!(
                schema = self.deps.schema.name(),
                "[qc-02] 🗜️ compression progress: block #{} ({} processed this run)",
                num,
                self.processed
            );
        }
        if num % self.compaction_interval == 0 {
            self.request_compaction(num);
        }

        Ok(outcome)
    }

    /// Step while `curr_num <= target`, checking `cancel` before each step.
    pub fn until(
        &mut self,
        target: BlockNumber,
        cancel: &AtomicBool,
    ) -> Result<UntilOutcome, CompressionError> {
        while self.curr_num <= target {
            if cancel.load(Ordering::Acquire) {
                return Ok(UntilOutcome::Cancelled);
            }
            self.step()?;
        }
        Ok(UntilOutcome::Reached)
    }

    /// Close the buffered chunk `[from_num, curr_num]`.
    ///
    /// On a codec error the buffer is left intact and nothing is written.
    fn flush(&mut self) -> Result<ChunkRange, CompressionError> {
        let schema = Arc::clone(&self.deps.schema);
        let name = schema.name();
        let range = ChunkRange::new(self.from_num, self.curr_num);

        let blob = encode_chunk(self.deps.codec.as_ref(), &self.buffer)?;

        // Phase 1: chunk and cursor land together.
        schema
            .compressed_store()
            .atomic_batch_write(vec![
                BatchOperation::put(schema.compressed_key(range), blob.as_slice()),
                BatchOperation::put(schema.next_num_key(), encode_next_num(range.to + 1).as_slice()),
            ])
            .map_err(|e| CompressionError::fatal(name, format!("write chunk {range}: {e}")))?;

        // Phase 2: only now drop the native originals.
        let deletes: Vec<BatchOperation> = self
            .buffer
            .iter()
            .map(|item| BatchOperation::delete(schema.native_key(item.num, &item.hash)))
            .collect();
        schema
            .native_store()
            .atomic_batch_write(deletes)
            .map_err(|e| CompressionError::fatal(name, format!("delete natives {range}: {e}")))?;

        self.deps.metrics.record_chunk_written(
            self.buffer.len() as u64,
            self.buffered_bytes as u64,
            blob.len() as u64,
        );
        tracing::debug!(
            schema = name,
            from = range.from,
            to = range.to,
            items = self.buffer.len(),
            raw_bytes = self.buffered_bytes,
            compressed_bytes = blob.len(),
            "[qc-02] chunk written"
        );

        self.buffer.clear();
        self.buffered_bytes = 0;
        self.from_num = range.to + 1;
        Ok(range)
    }

    fn request_compaction(&mut self, num: BlockNumber) {
        let schema = &self.deps.schema;
        let prefix = schema.native_prefix();
        let mut start = prefix.to_vec();
        start.extend_from_slice(&self.compacted_up_to.to_be_bytes());
        let mut end = prefix.to_vec();
        end.extend_from_slice(&(num + 1).to_be_bytes());

        let schema: Arc<dyn Schema> = Arc::clone(&self.deps.schema) as Arc<dyn Schema>;
        if self.deps.compactor.try_spawn(schema, start, end) {
            self.deps.metrics.record_compaction_triggered();
            self.compacted_up_to = num + 1;
        }
    }
}
