//! # Test Chain Fixture
//!
//! A synthetic chain in the in-memory store, shared by the integration
//! scenarios and the benchmarks.

use qc_02_block_compression::{
    BodySchema, CompressionConfig, CompressionModule, HeaderSchema, InMemoryChain,
    InMemoryKVStore, KeyValueStore, ReceiptsSchema, Schema, SchemaStores,
};
use shared_types::{sha256, BlockNumber, Hash};
use std::sync::Arc;
use std::time::Duration;

pub fn block_hash(num: BlockNumber) -> Hash {
    sha256(&num.to_be_bytes())
}

pub fn header_bytes(num: BlockNumber) -> Vec<u8> {
    let mut header = block_hash(num.saturating_sub(1)).to_vec();
    header.extend_from_slice(&num.to_be_bytes());
    header.extend_from_slice(&[0x11; 64]);
    header
}

/// A body with `num % 10` transactions of 120 bytes each.
pub fn body_bytes(num: BlockNumber) -> Vec<u8> {
    let mut body = num.to_be_bytes().to_vec();
    for tx in 0..num % 10 {
        let mut raw = vec![(tx as u8).wrapping_mul(7); 120];
        raw[..8].copy_from_slice(&num.to_le_bytes());
        body.extend_from_slice(&raw);
    }
    body
}

pub fn receipts_bytes(num: BlockNumber) -> Vec<u8> {
    let mut receipts = vec![0x01; (num % 10) as usize * 40];
    receipts.extend_from_slice(&num.to_be_bytes());
    receipts
}

/// Store, chain and the schema key layouts for direct inspection.
pub struct TestChain {
    pub store: Arc<InMemoryKVStore>,
    pub chain: Arc<InMemoryChain>,
    pub header: HeaderSchema,
    pub body: BodySchema,
    pub receipts: ReceiptsSchema,
}

impl Default for TestChain {
    fn default() -> Self {
        Self::new()
    }
}

impl TestChain {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryKVStore::new());
        let stores = SchemaStores::shared(store.clone());
        Self {
            chain: Arc::new(InMemoryChain::new()),
            header: HeaderSchema::new(stores.clone()),
            body: BodySchema::new(stores.clone()),
            receipts: ReceiptsSchema::new(stores),
            store,
        }
    }

    /// Canonical blocks `0..=head` with all three records.
    pub fn with_blocks(head: BlockNumber) -> Self {
        let chain = Self::new();
        for num in 0..=head {
            chain.insert_block(num);
        }
        chain
    }

    pub fn insert_block(&self, num: BlockNumber) {
        let hash = block_hash(num);
        self.chain.insert(num, hash);
        let records: [(&dyn Schema, Vec<u8>); 3] = [
            (&self.header, header_bytes(num)),
            (&self.body, body_bytes(num)),
            (&self.receipts, receipts_bytes(num)),
        ];
        for (schema, payload) in records {
            if let Err(e) = self.store.put(&schema.native_key(num, &hash), &payload) {
                panic!("in-memory put failed: {e}");
            }
        }
    }

    /// Drop blocks above `new_head` the way the host's block storage does.
    pub fn discard_above(&self, new_head: BlockNumber, old_head: BlockNumber) {
        for num in new_head + 1..=old_head {
            let hash = block_hash(num);
            for schema in [&self.header as &dyn Schema, &self.body, &self.receipts] {
                let _ = self.store.delete(&schema.native_key(num, &hash));
            }
        }
        self.chain.truncate_above(new_head);
    }

    pub fn is_native(&self, schema: &dyn Schema, num: BlockNumber) -> bool {
        matches!(self.store.exists(&schema.native_key(num, &block_hash(num))), Ok(true))
    }

    pub fn module(&self, config: CompressionConfig) -> CompressionModule {
        match CompressionModule::init(
            config,
            SchemaStores::shared(self.store.clone()),
            self.chain.clone(),
        ) {
            Ok(module) => module,
            Err(e) => panic!("init failed: {e}"),
        }
    }
}

/// Smallest legal retention, the given item cap, 1 MB byte cap.
pub fn scenario_config(item_cap: usize) -> CompressionConfig {
    CompressionConfig::new()
        .with_retention(128)
        .with_chunk_item_cap(item_cap)
        .with_chunk_byte_cap(1_000_000)
        .with_idle_interval(Duration::from_millis(10))
}

/// Lowest persisted cursor across schemas.
pub fn min_next_num(module: &CompressionModule) -> BlockNumber {
    match module.status() {
        Ok(status) => status
            .iter()
            .map(|s| s.next_num.unwrap_or(0))
            .min()
            .unwrap_or(0),
        Err(e) => panic!("status failed: {e}"),
    }
}

/// Poll until every schema's cursor reaches `target`.
pub async fn wait_for_next_num(module: &CompressionModule, target: BlockNumber) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    while min_next_num(module) < target {
        if tokio::time::Instant::now() > deadline {
            panic!(
                "compression stalled below #{target}: {:?}",
                module.status()
            );
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
