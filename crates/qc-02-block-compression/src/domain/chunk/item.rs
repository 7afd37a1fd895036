//! # Chunk Items
//!
//! A chunk blob is `compress(bincode(Vec<ChunkItem>))` covering a contiguous
//! `[from, to]` range of block numbers.

use crate::domain::codec::BlockCompressor;
use crate::domain::errors::CodecError;
use serde::{Deserialize, Serialize};
use shared_types::{BlockNumber, Hash};
use std::fmt;

/// One block's data of one kind, tagged for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkItem {
    /// Block number.
    pub num: BlockNumber,
    /// Block hash.
    pub hash: Hash,
    /// Raw record bytes as stored in the native keyspace.
    pub payload: Vec<u8>,
}

impl ChunkItem {
    /// Create a new item.
    pub fn new(num: BlockNumber, hash: Hash, payload: Vec<u8>) -> Self {
        Self { num, hash, payload }
    }

    /// True if this item is the record for `(num, hash)`.
    pub fn matches(&self, num: BlockNumber, hash: &Hash) -> bool {
        self.num == num && &self.hash == hash
    }
}

/// Inclusive block-number range covered by one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRange {
    pub from: BlockNumber,
    pub to: BlockNumber,
}

impl ChunkRange {
    pub fn new(from: BlockNumber, to: BlockNumber) -> Self {
        Self { from, to }
    }

    /// `from <= num <= to`
    pub fn contains(&self, num: BlockNumber) -> bool {
        self.from <= num && num <= self.to
    }

    /// Number of blocks in the range.
    pub fn block_count(&self) -> u64 {
        self.to - self.from + 1
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

/// Serialize and compress an ordered item list.
pub fn encode_chunk(
    codec: &dyn BlockCompressor,
    items: &[ChunkItem],
) -> Result<Vec<u8>, CodecError> {
    let raw = bincode::serialize(items).map_err(|e| CodecError::Serialize(e.to_string()))?;
    codec.compress(&raw)
}

/// Decompress and deserialize a chunk blob, checking it covers `range` exactly.
pub fn decode_chunk(
    codec: &dyn BlockCompressor,
    range: ChunkRange,
    blob: &[u8],
) -> Result<Vec<ChunkItem>, CodecError> {
    let raw = codec.decompress(blob)?;
    let items: Vec<ChunkItem> =
        bincode::deserialize(&raw).map_err(|e| CodecError::Deserialize(e.to_string()))?;

    if items.len() as u64 != range.block_count() {
        return Err(CodecError::Deserialize(format!(
            "chunk {} holds {} items",
            range,
            items.len()
        )));
    }
    for (expected, item) in (range.from..=range.to).zip(items.iter()) {
        if item.num != expected {
            return Err(CodecError::Deserialize(format!(
                "chunk {} has item #{} at position of #{}",
                range, item.num, expected
            )));
        }
    }

    Ok(items)
}
