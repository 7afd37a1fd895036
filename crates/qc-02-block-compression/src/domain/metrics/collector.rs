//! # Compression Metrics
//!
//! Lock-free counters shared by the driver tasks and lookup callers.
//!
//! ## Metrics Exported
//!
//! - Chunks written / restored
//! - Raw vs compressed bytes
//! - Cache hits per level and range-query fallbacks
//! - Compactions triggered and loop failures

use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// COMPRESSION METRICS
// =============================================================================

/// Counters for one module instance (all schemas combined).
#[derive(Debug, Default)]
pub struct CompressionMetrics {
    chunks_written: AtomicU64,
    items_compressed: AtomicU64,
    raw_bytes: AtomicU64,
    compressed_bytes: AtomicU64,
    chunks_restored: AtomicU64,
    items_restored: AtomicU64,
    native_hits: AtomicU64,
    item_cache_hits: AtomicU64,
    chunk_cache_hits: AtomicU64,
    range_queries: AtomicU64,
    not_found: AtomicU64,
    compactions_triggered: AtomicU64,
    loop_failures: AtomicU64,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub chunks_written: u64,
    pub items_compressed: u64,
    pub raw_bytes: u64,
    pub compressed_bytes: u64,
    pub chunks_restored: u64,
    pub items_restored: u64,
    pub native_hits: u64,
    pub item_cache_hits: u64,
    pub chunk_cache_hits: u64,
    pub range_queries: u64,
    pub not_found: u64,
    pub compactions_triggered: u64,
    pub loop_failures: u64,
}

impl MetricsSnapshot {
    /// compressed / raw, or 0.0 before the first chunk.
    pub fn compression_ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            return 0.0;
        }
        self.compressed_bytes as f64 / self.raw_bytes as f64
    }
}

impl CompressionMetrics {
    /// Create new metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a flushed chunk
    pub fn record_chunk_written(&self, items: u64, raw_bytes: u64, compressed_bytes: u64) {
        self.chunks_written.fetch_add(1, Ordering::Relaxed);
        self.items_compressed.fetch_add(items, Ordering::Relaxed);
        self.raw_bytes.fetch_add(raw_bytes, Ordering::Relaxed);
        self.compressed_bytes
            .fetch_add(compressed_bytes, Ordering::Relaxed);
    }

    /// Record a chunk moved back to the native keyspace
    pub fn record_chunk_restored(&self, items_written: u64) {
        self.chunks_restored.fetch_add(1, Ordering::Relaxed);
        self.items_restored
            .fetch_add(items_written, Ordering::Relaxed);
    }

    pub fn record_native_hit(&self) {
        self.native_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_item_cache_hit(&self) {
        self.item_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chunk_cache_hit(&self) {
        self.chunk_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_range_query(&self) {
        self.range_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compaction_triggered(&self) {
        self.compactions_triggered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_loop_failure(&self) {
        self.loop_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            chunks_written: self.chunks_written.load(Ordering::Relaxed),
            items_compressed: self.items_compressed.load(Ordering::Relaxed),
            raw_bytes: self.raw_bytes.load(Ordering::Relaxed),
            compressed_bytes: self.compressed_bytes.load(Ordering::Relaxed),
            chunks_restored: self.chunks_restored.load(Ordering::Relaxed),
            items_restored: self.items_restored.load(Ordering::Relaxed),
            native_hits: self.native_hits.load(Ordering::Relaxed),
            item_cache_hits: self.item_cache_hits.load(Ordering::Relaxed),
            chunk_cache_hits: self.chunk_cache_hits.load(Ordering::Relaxed),
            range_queries: self.range_queries.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            compactions_triggered: self.compactions_triggered.load(Ordering::Relaxed),
            loop_failures: self.loop_failures.load(Ordering::Relaxed),
        }
    }

    /// Export as Prometheus-style metrics string
    pub fn export_prometheus(&self) -> String {
        let s = self.snapshot();
        let counters: [(&str, &str, u64); 13] = [
            ("chunks_written", "Chunks flushed to the compressed keyspace", s.chunks_written),
            ("items_compressed", "Items absorbed into chunks", s.items_compressed),
            ("raw_bytes", "Payload bytes absorbed into chunks", s.raw_bytes),
            ("compressed_bytes", "Chunk blob bytes written", s.compressed_bytes),
            ("chunks_restored", "Chunks restored by rewind", s.chunks_restored),
            ("items_restored", "Items written back by rewind", s.items_restored),
            ("native_hits", "Lookups served by the native keyspace", s.native_hits),
            ("item_cache_hits", "Lookups served by the item cache", s.item_cache_hits),
            ("chunk_cache_hits", "Lookups served by the chunk cache", s.chunk_cache_hits),
            ("range_queries", "Lookups that seeked the chunk keyspace", s.range_queries),
            ("not_found", "Lookups that found nothing", s.not_found),
            ("compactions_triggered", "Native compactions started", s.compactions_triggered),
            ("loop_failures", "Driver loops terminated by errors", s.loop_failures),
        ];

        let mut out = String::new();
        for (name, help, value) in counters {
            out.push_str(&format!(
                "# HELP qc02_compress_{name} {help}\n\
                 # TYPE qc02_compress_{name} counter\n\
                 qc02_compress_{name} {value}\n"
            ));
        }
        out
    }
}
