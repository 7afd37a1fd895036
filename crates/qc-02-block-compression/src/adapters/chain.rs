//! # In-Memory Chain
//!
//! Canonical `number -> hash` index plus head pointer. Stands in for the
//! host node's chain index in tests and simulations.

use crate::ports::outbound::ChainReader;
use parking_lot::RwLock;
use shared_types::{BlockNumber, Hash};
use std::collections::BTreeMap;

#[derive(Default)]
pub struct InMemoryChain {
    canonical: RwLock<BTreeMap<BlockNumber, Hash>>,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append or replace the canonical block at `number`.
    pub fn insert(&self, number: BlockNumber, hash: Hash) {
        self.canonical.write().insert(number, hash);
    }

    /// Drop every canonical entry above `new_head`.
    pub fn truncate_above(&self, new_head: BlockNumber) {
        let _discarded = self
            .canonical
            .write()
            .split_off(&new_head.saturating_add(1));
    }
}

impl ChainReader for InMemoryChain {
    fn current_head(&self) -> BlockNumber {
        self.canonical
            .read()
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
    }

    fn canonical_hash(&self, number: BlockNumber) -> Option<Hash> {
        self.canonical.read().get(&number).copied()
    }
}
