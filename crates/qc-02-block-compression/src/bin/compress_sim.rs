//! # Compression Simulator
//!
//! Writes a synthetic chain into the in-memory store, runs the compression
//! drivers until they catch up with the retention boundary, spot-checks
//! lookups, then rewinds the tip and reports status.
//!
//! ```text
//! RUST_LOG=debug QC_SIM_BLOCKS=20000 QC_COMPRESS_CHUNK_ITEM_CAP=500 qc-compress-sim
//! ```

use anyhow::{bail, ensure, Context, Result};
use qc_02_block_compression::domain::config::{
    ENV_CHUNK_ITEM_CAP, ENV_RETENTION, MIN_RETENTION,
};
use qc_02_block_compression::{
    BodySchema, ChainReader, CompressedBlockReader, CompressionConfig, CompressionModule,
    DataKind, HeaderSchema, InMemoryChain, InMemoryKVStore, KeyValueStore, ReceiptsSchema,
    ReorgCompensator, Schema, SchemaStores,
};
use rand::{Rng, RngCore};
use shared_types::{sha256, BlockId, BlockNumber};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_BLOCKS: u64 = 5_000;
const SIM_CHUNK_ITEM_CAP: usize = 100;
const CATCH_UP_TIMEOUT: Duration = Duration::from_secs(120);

fn sim_config() -> CompressionConfig {
    let mut config = CompressionConfig::from_env();
    if std::env::var(ENV_RETENTION).is_err() {
        config = config.with_retention(MIN_RETENTION);
    }
    if std::env::var(ENV_CHUNK_ITEM_CAP).is_err() {
        config = config.with_chunk_item_cap(SIM_CHUNK_ITEM_CAP);
    }
    config.with_idle_interval(Duration::from_millis(100))
}

fn block_count() -> u64 {
    match std::env::var("QC_SIM_BLOCKS") {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("QC_SIM_BLOCKS={:?} is not a number, using {}", raw, DEFAULT_BLOCKS);
            DEFAULT_BLOCKS
        }),
        Err(_) => DEFAULT_BLOCKS,
    }
}

/// Fill `0..=head` with random-length header, body and receipts records.
fn populate(
    store: &InMemoryKVStore,
    chain: &InMemoryChain,
    schemas: &[&dyn Schema],
    head: BlockNumber,
) -> Result<()> {
    let mut rng = rand::thread_rng();
    for num in 0..=head {
        let hash = sha256(&num.to_be_bytes());
        chain.insert(num, hash);
        for schema in schemas {
            let len = match schema.kind() {
                DataKind::Header => 500,
                DataKind::Body => rng.gen_range(100..4_000),
                DataKind::Receipts => rng.gen_range(50..1_500),
            };
            // Half random, half repeated, so the codec has something to do
            let mut payload = vec![num as u8; len];
            rng.fill_bytes(&mut payload[..len / 2]);
            store
                .put(&schema.native_key(num, &hash), &payload)
                .with_context(|| format!("writing {} #{}", schema.name(), num))?;
        }
    }
    Ok(())
}

async fn wait_for_catch_up(module: &CompressionModule, target: BlockNumber) -> Result<()> {
    let started = Instant::now();
    loop {
        let status = module.status()?;
        if status.iter().all(|s| s.next_num.unwrap_or(0) >= target) {
            return Ok(());
        }
        if status.iter().any(|s| !s.running) {
            bail!("a compression driver exited early: {status:?}");
        }
        if started.elapsed() > CATCH_UP_TIMEOUT {
            bail!("drivers did not reach #{target} within {CATCH_UP_TIMEOUT:?}");
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = sim_config();
    let head = block_count();
    let store = Arc::new(InMemoryKVStore::new());
    let chain = Arc::new(InMemoryChain::new());
    let stores = SchemaStores::shared(store.clone());

    {
        let header = HeaderSchema::new(stores.clone());
        let body = BodySchema::new(stores.clone());
        let receipts = ReceiptsSchema::new(stores.clone());
        let schemas: [&dyn Schema; 3] = [&header, &body, &receipts];
        populate(&store, &chain, &schemas, head)?;
    }
    info!("populated {} blocks ({} keys)", head + 1, store.len());

    let retention = config.retention;
    let item_cap = config.chunk_item_cap as u64;
    let module = CompressionModule::init(config, stores, chain.clone())?;

    let boundary = head.saturating_sub(retention);
    // Last cursor value reachable with full chunks only
    let target = (boundary / item_cap) * item_cap + 1;

    module.start().await?;
    wait_for_catch_up(&module, target).await?;
    module.stop().await;

    let metrics = module.metrics();
    info!(
        chunks = metrics.chunks_written,
        items = metrics.items_compressed,
        ratio = metrics.compression_ratio(),
        "compression caught up with #{}",
        boundary
    );

    let mut rng = rand::thread_rng();
    for _ in 0..10 {
        let num = rng.gen_range(1..target.max(2));
        let id = BlockId::new(num, sha256(&num.to_be_bytes()));
        let body = module.find_compressed_body(id.number, &id.hash)?;
        ensure!(body.is_some(), "body of {id} missing after compression");
    }

    // Simulate a reorg that discards the top of the compressed range.
    let new_head = target.saturating_sub(item_cap * 3 / 2).max(1);
    module.rewind_to(new_head)?;
    for num in (new_head + 1..=chain.current_head()).rev() {
        let hash = sha256(&num.to_be_bytes());
        module.rewind_delete(&hash, num)?;
    }
    chain.truncate_above(new_head);

    for status in module.status()? {
        info!(
            schema = status.schema,
            next_num = status.next_num,
            cached_chunks = status.cache.chunks,
            "post-rewind status"
        );
        ensure!(
            status.next_num.unwrap_or(0) <= new_head + 1,
            "{} cursor not rewound",
            status.schema
        );
    }
    println!("{}", module.export_metrics());
    Ok(())
}
