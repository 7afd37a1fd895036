use crate::adapters::{InMemoryChain, InMemoryKVStore};
use crate::domain::codec::{BlockCompressor, CodecConfig};
use crate::domain::config::CompressionConfig;
use crate::domain::context::{CompactionGuard, CompressionContext, ContextDeps};
use crate::domain::metrics::CompressionMetrics;
use crate::domain::schema::{BodySchema, HeaderSchema, ReceiptsSchema, Schema, SchemaStores};
use crate::ports::outbound::KeyValueStore;
use shared_types::{sha256, BlockNumber, Hash};
use std::sync::Arc;

/// Deterministic canonical hash for test block `num`.
pub fn block_hash(num: BlockNumber) -> Hash {
    sha256(&num.to_be_bytes())
}

pub fn header_bytes(num: BlockNumber) -> Vec<u8> {
    format!("header-{num:08}").into_bytes()
}

/// Body with `num % 10` fake transactions.
pub fn body_bytes(num: BlockNumber) -> Vec<u8> {
    let mut body = format!("body-{num:08}:").into_bytes();
    for tx in 0..num % 10 {
        body.extend_from_slice(format!("tx{tx}-of-{num};").as_bytes());
    }
    body
}

pub fn receipts_bytes(num: BlockNumber) -> Vec<u8> {
    format!("receipts-{num:08}-status-ok").into_bytes()
}

/// Hash of block `num` on the competing branch after a reorg.
pub fn fork_hash(num: BlockNumber) -> Hash {
    let mut seed = num.to_be_bytes().to_vec();
    seed.extend_from_slice(b"fork");
    sha256(&seed)
}

pub fn fork_body_bytes(num: BlockNumber) -> Vec<u8> {
    format!("fork-body-{num:08}").into_bytes()
}

/// One store, one chain, and all three schemas bound to them.
pub struct Fixture {
    pub store: Arc<InMemoryKVStore>,
    pub chain: Arc<InMemoryChain>,
    pub header: Arc<HeaderSchema>,
    pub body: Arc<BodySchema>,
    pub receipts: Arc<ReceiptsSchema>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_store(InMemoryKVStore::new())
    }

    pub fn with_store(store: InMemoryKVStore) -> Self {
        let store = Arc::new(store);
        let stores = SchemaStores::shared(store.clone());
        Self {
            chain: Arc::new(InMemoryChain::new()),
            header: Arc::new(HeaderSchema::new(stores.clone())),
            body: Arc::new(BodySchema::new(stores.clone())),
            receipts: Arc::new(ReceiptsSchema::new(stores)),
            store,
        }
    }

    pub fn stores(&self) -> SchemaStores {
        SchemaStores::shared(self.store.clone())
    }

    /// Insert canonical blocks `0..=head` with header, body and receipts.
    pub fn fill_blocks(&self, head: BlockNumber) {
        self.fill_range(0, head);
    }

    pub fn fill_range(&self, from: BlockNumber, to: BlockNumber) {
        for num in from..=to {
            let hash = block_hash(num);
            self.chain.insert(num, hash);
            self.store
                .put(&self.header.native_key(num, &hash), &header_bytes(num))
                .unwrap();
            self.store
                .put(&self.body.native_key(num, &hash), &body_bytes(num))
                .unwrap();
            self.store
                .put(&self.receipts.native_key(num, &hash), &receipts_bytes(num))
                .unwrap();
        }
    }

    /// Replace blocks `from..=old_head` with a competing branch up to
    /// `new_head`, the way the host's block storage applies a reorg.
    pub fn reorg(&self, from: BlockNumber, old_head: BlockNumber, new_head: BlockNumber) {
        for num in from..=old_head {
            let hash = block_hash(num);
            self.store.delete(&self.header.native_key(num, &hash)).unwrap();
            self.store.delete(&self.body.native_key(num, &hash)).unwrap();
            self.store.delete(&self.receipts.native_key(num, &hash)).unwrap();
        }
        self.chain.truncate_above(from - 1);
        for num in from..=new_head {
            let hash = fork_hash(num);
            self.chain.insert(num, hash);
            self.store
                .put(&self.header.native_key(num, &hash), &header_bytes(num))
                .unwrap();
            self.store
                .put(&self.body.native_key(num, &hash), &fork_body_bytes(num))
                .unwrap();
            self.store
                .put(&self.receipts.native_key(num, &hash), &receipts_bytes(num))
                .unwrap();
        }
    }

    pub fn native_body(&self, num: BlockNumber) -> Option<Vec<u8>> {
        self.store
            .get(&self.body.native_key(num, &block_hash(num)))
            .unwrap()
    }

    /// Number of chunks stored for `schema`.
    pub fn chunk_count(&self, schema: &dyn Schema) -> usize {
        self.store.count_prefix(schema.compressed_key_prefix())
    }

    /// A context over the body schema with fresh metrics.
    pub fn body_context(
        &self,
        config: &CompressionConfig,
    ) -> (CompressionContext<BodySchema>, Arc<CompressionMetrics>) {
        let metrics = Arc::new(CompressionMetrics::new());
        let deps = ContextDeps {
            schema: self.body.clone(),
            chain: self.chain.clone(),
            codec: test_codec(),
            metrics: metrics.clone(),
            compactor: Arc::new(CompactionGuard::new("body")),
        };
        let ctx = CompressionContext::resume(deps, config).unwrap();
        (ctx, metrics)
    }
}

pub fn test_codec() -> Arc<dyn BlockCompressor> {
    CodecConfig::for_testing().build()
}

/// Smallest legal caps and retention, cheap driver timing.
pub fn small_config(item_cap: usize) -> CompressionConfig {
    CompressionConfig::new()
        .with_retention(128)
        .with_chunk_item_cap(item_cap)
        .with_chunk_byte_cap(1024 * 1024)
        .with_idle_interval(std::time::Duration::from_millis(10))
        .with_codec(CodecConfig::for_testing())
}
