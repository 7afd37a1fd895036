//! # Chunk Cache
//!
//! ## Levels
//!
//! - item level: `(num, hash) -> payload`
//! - chunk level: `(from, to) -> decompressed item list`
//!
//! Both are `lru::LruCache` behind `parking_lot::Mutex`: O(1) amortized
//! get/put, memory bounded by the configured capacities. The chunk level
//! keeps a `to -> range` index beside the LRU so finding the chunk that
//! covers a height is one `BTreeMap` range lookup.

use crate::domain::chunk::{ChunkItem, ChunkRange};
use lru::LruCache;
use parking_lot::Mutex;
use shared_types::{BlockNumber, Hash};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Where a cached lookup was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Item-level hit.
    Item(Vec<u8>),
    /// Chunk-level hit; the item was promoted into the item level.
    Chunk(Vec<u8>),
    /// A cached chunk covers `num` but holds a different hash there.
    /// The entry may predate a rewind; storage decides.
    Stale(ChunkRange),
    /// Neither level knows `num`.
    Miss,
}

/// Cache occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub items: usize,
    pub item_capacity: usize,
    pub chunks: usize,
    pub chunk_capacity: usize,
}

/// Decoded chunks plus an index of their ranges by end height.
struct ChunkLevel {
    lru: LruCache<ChunkRange, Arc<Vec<ChunkItem>>>,
    by_end: BTreeMap<BlockNumber, ChunkRange>,
}

impl ChunkLevel {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            lru: LruCache::new(capacity),
            by_end: BTreeMap::new(),
        }
    }

    /// The cached range with the lowest `to >= num`, if it covers `num`.
    fn covering(&self, num: BlockNumber) -> Option<ChunkRange> {
        self.by_end
            .range(num..)
            .next()
            .map(|(_, range)| *range)
            .filter(|range| range.contains(num))
    }

    fn insert(&mut self, range: ChunkRange, items: Arc<Vec<ChunkItem>>) {
        if let Some((evicted, _)) = self.lru.push(range, items) {
            if evicted != range {
                self.unindex(evicted);
            }
        }
        self.by_end.insert(range.to, range);
    }

    fn remove(&mut self, range: ChunkRange) {
        self.lru.pop(&range);
        self.unindex(range);
    }

    fn unindex(&mut self, range: ChunkRange) {
        if self.by_end.get(&range.to) == Some(&range) {
            self.by_end.remove(&range.to);
        }
    }

    fn clear(&mut self) {
        self.lru.clear();
        self.by_end.clear();
    }
}

/// Item `num` of a decoded chunk, if it carries `hash`.
///
/// Decoded chunks are contiguous from `range.from`, so the item sits at a
/// fixed offset.
pub fn chunk_item<'a>(
    items: &'a [ChunkItem],
    range: ChunkRange,
    num: BlockNumber,
    hash: &Hash,
) -> Option<&'a ChunkItem> {
    let offset = usize::try_from(num.checked_sub(range.from)?).ok()?;
    items.get(offset).filter(|item| item.matches(num, hash))
}

pub struct ChunkCache {
    items: Mutex<LruCache<(BlockNumber, Hash), Vec<u8>>>,
    chunks: Mutex<ChunkLevel>,
}

fn capacity(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

impl ChunkCache {
    /// Capacities of 0 are treated as 1.
    pub fn new(item_capacity: usize, chunk_capacity: usize) -> Self {
        Self {
            items: Mutex::new(LruCache::new(capacity(item_capacity))),
            chunks: Mutex::new(ChunkLevel::new(capacity(chunk_capacity))),
        }
    }

    /// Check the item level, then the cached chunk covering `num`.
    pub fn lookup(&self, num: BlockNumber, hash: &Hash) -> CacheLookup {
        if let Some(payload) = self.items.lock().get(&(num, *hash)) {
            return CacheLookup::Item(payload.clone());
        }

        let cached = {
            let mut chunks = self.chunks.lock();
            chunks
                .covering(num)
                .and_then(|range| chunks.lru.get(&range).map(|items| (range, Arc::clone(items))))
        };
        let Some((range, items)) = cached else {
            return CacheLookup::Miss;
        };

        match chunk_item(&items, range, num, hash) {
            Some(item) => {
                self.put_item(num, *hash, item.payload.clone());
                CacheLookup::Chunk(item.payload.clone())
            }
            None => CacheLookup::Stale(range),
        }
    }

    pub fn put_item(&self, num: BlockNumber, hash: Hash, payload: Vec<u8>) {
        self.items.lock().put((num, hash), payload);
    }

    pub fn put_chunk(&self, range: ChunkRange, items: Arc<Vec<ChunkItem>>) {
        self.chunks.lock().insert(range, items);
    }

    /// Drop a chunk and every cached item inside its range.
    pub fn invalidate(&self, range: ChunkRange) {
        self.chunks.lock().remove(range);

        let mut items = self.items.lock();
        let stale: Vec<(BlockNumber, Hash)> = items
            .iter()
            .filter(|((num, _), _)| range.contains(*num))
            .map(|(key, _)| *key)
            .collect();
        for key in stale {
            items.pop(&key);
        }
    }

    pub fn clear(&self) {
        self.items.lock().clear();
        self.chunks.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let items = self.items.lock();
        let chunks = self.chunks.lock();
        CacheStats {
            items: items.len(),
            item_capacity: items.cap().get(),
            chunks: chunks.lru.len(),
            chunk_capacity: chunks.lru.cap().get(),
        }
    }

    /// True if the chunk level holds `range`. Does not touch recency.
    pub fn contains_chunk(&self, range: ChunkRange) -> bool {
        self.chunks.lock().lru.contains(&range)
    }
}
