//! # Block Compression Service
//!
//! `CompressionModule` owns the three schema pipelines (header, body,
//! receipts) and exposes the lifecycle, lookup and reorg entry points.
//!
//! ## Architecture
//!
//! This service:
//! 1. Validates configuration and resolves the range-iteration capability once at `init`
//! 2. Runs one background driver per schema (`start` / `stop`)
//! 3. Implements `CompressedBlockReader` over native keyspace, caches and chunks
//! 4. Implements `ReorgCompensator`, restoring chunks the rewind reaches into
//!
//! All methods take `&self`; hosts share the module behind an `Arc`.

mod driver;
mod finder;
mod rewind;

use crate::domain::cache::{CacheStats, ChunkCache};
use crate::domain::codec::BlockCompressor;
use crate::domain::config::CompressionConfig;
use crate::domain::context::{CompactionGuard, ContextDeps};
use crate::domain::errors::CompressionError;
use crate::domain::metrics::{CompressionMetrics, MetricsSnapshot};
use crate::domain::schema::{BodySchema, HeaderSchema, ReceiptsSchema, Schema, SchemaStores};
use crate::ports::outbound::ChainReader;
use parking_lot::Mutex;
use shared_types::BlockNumber;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;

/// One schema plus the state the module keeps for it.
pub struct SchemaHandle<S: Schema> {
    pub(crate) schema: Arc<S>,
    pub(crate) cache: ChunkCache,
    pub(crate) compactor: Arc<CompactionGuard>,
    /// Set while this schema's driver loop is live.
    pub(crate) running: Arc<AtomicBool>,
}

impl<S: Schema> SchemaHandle<S> {
    fn new(schema: S, config: &CompressionConfig) -> Self {
        let label = schema.name();
        Self {
            schema: Arc::new(schema),
            cache: ChunkCache::new(config.item_cache_capacity, config.chunk_cache_capacity),
            compactor: Arc::new(CompactionGuard::new(label)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    fn status(&self) -> Result<SchemaStatus, CompressionError> {
        Ok(SchemaStatus {
            schema: self.schema.name(),
            next_num: self.schema.read_next_num()?,
            running: self.running.load(Ordering::Acquire),
            compaction_running: self.compactor.is_running(),
            cache: self.cache.stats(),
        })
    }
}

/// Point-in-time view of one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatus {
    pub schema: &'static str,
    /// Persisted cursor; `None` before the first driver run.
    pub next_num: Option<BlockNumber>,
    pub running: bool,
    pub compaction_running: bool,
    pub cache: CacheStats,
}

/// The block compression module.
pub struct CompressionModule {
    pub(crate) config: CompressionConfig,
    /// False when the backend cannot range-iterate; resolved at `init`.
    pub(crate) enabled: bool,
    pub(crate) chain: Arc<dyn ChainReader>,
    pub(crate) codec: Arc<dyn BlockCompressor>,
    pub(crate) header: SchemaHandle<HeaderSchema>,
    pub(crate) body: SchemaHandle<BodySchema>,
    pub(crate) receipts: SchemaHandle<ReceiptsSchema>,
    pub(crate) metrics: Arc<CompressionMetrics>,
    pub(crate) quit: Arc<AtomicBool>,
    /// `Some` between `start` and `stop`.
    pub(crate) drivers: Mutex<Option<JoinSet<()>>>,
}

impl CompressionModule {
    /// Validate `config`, build its codec and bind the three schemas to `stores`.
    pub fn init(
        config: CompressionConfig,
        stores: SchemaStores,
        chain: Arc<dyn ChainReader>,
    ) -> Result<Self, CompressionError> {
        config.validate()?;
        let codec = config.codec.build();

        let enabled = stores.compressed.supports_range_iteration();
        if enabled {
            tracing::info!(
                retention = config.retention,
                chunk_item_cap = config.chunk_item_cap,
                chunk_byte_cap = config.chunk_byte_cap,
                zstd = codec.is_enabled(),
                "[qc-02] 🗜️ block compression initialized"
            );
        } else {
            tracing::warn!("[qc-02] storage backend has no range iteration, block compression disabled");
        }

        Ok(Self {
            header: SchemaHandle::new(HeaderSchema::new(stores.clone()), &config),
            body: SchemaHandle::new(BodySchema::new(stores.clone()), &config),
            receipts: SchemaHandle::new(ReceiptsSchema::new(stores), &config),
            config,
            enabled,
            chain,
            codec,
            metrics: Arc::new(CompressionMetrics::new()),
            quit: Arc::new(AtomicBool::new(false)),
            drivers: Mutex::new(None),
        })
    }

    /// Whether the backend supports compression at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True between `start` and `stop`.
    pub fn is_started(&self) -> bool {
        self.drivers.lock().is_some()
    }

    /// True while any driver thread is still inside its loop.
    ///
    /// Outlives `is_started` when a `stop` future is dropped mid-join:
    /// blocking drivers cannot be aborted and exit on their next quit poll.
    pub fn drivers_live(&self) -> bool {
        [&self.header.running, &self.body.running, &self.receipts.running]
            .iter()
            .any(|running| running.load(Ordering::Acquire))
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Launch one driver per schema.
    ///
    /// Fails with `AlreadyRunning` if drivers are live, including drivers
    /// still draining after an interrupted `stop`, and with `Disabled` if the
    /// backend cannot range-iterate.
    pub async fn start(&self) -> Result<(), CompressionError> {
        if !self.enabled {
            return Err(CompressionError::Disabled);
        }
        let mut drivers = self.drivers.lock();
        if drivers.is_some() || self.drivers_live() {
            return Err(CompressionError::AlreadyRunning);
        }

        self.quit.store(false, Ordering::Release);
        let mut set = JoinSet::new();
        self.spawn_driver(&mut set, &self.header);
        self.spawn_driver(&mut set, &self.body);
        self.spawn_driver(&mut set, &self.receipts);
        *drivers = Some(set);

        tracing::info!("[qc-02] ▶️ compression drivers started");
        Ok(())
    }

    /// Raise the quit flag and wait for every driver to exit.
    ///
    /// Stopping an idle module is a no-op.
    pub async fn stop(&self) {
        let Some(mut set) = self.drivers.lock().take() else {
            return;
        };

        self.quit.store(true, Ordering::Release);
        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                tracing::error!("[qc-02] compression driver did not exit cleanly: {}", e);
            }
        }
        tracing::info!("[qc-02] ⏹️ compression drivers stopped");
    }

    /// Cursor, liveness and cache occupancy of each schema.
    pub fn status(&self) -> Result<Vec<SchemaStatus>, CompressionError> {
        Ok(vec![
            self.header.status()?,
            self.body.status()?,
            self.receipts.status()?,
        ])
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Prometheus text for the module counters.
    pub fn export_metrics(&self) -> String {
        self.metrics.export_prometheus()
    }

    /// Block until any in-flight native compaction finishes.
    pub fn wait_for_compactions(&self) {
        self.header.compactor.wait();
        self.body.compactor.wait();
        self.receipts.compactor.wait();
    }

    fn spawn_driver<S: Schema>(&self, set: &mut JoinSet<()>, handle: &SchemaHandle<S>) {
        let deps = ContextDeps {
            schema: Arc::clone(&handle.schema),
            chain: Arc::clone(&self.chain),
            codec: Arc::clone(&self.codec),
            metrics: Arc::clone(&self.metrics),
            compactor: Arc::clone(&handle.compactor),
        };
        let config = self.config.clone();
        let quit = Arc::clone(&self.quit);
        let live = driver::LiveFlag::raise(Arc::clone(&handle.running));

        set.spawn_blocking(move || driver::run(deps, config, quit, live));
    }
}
