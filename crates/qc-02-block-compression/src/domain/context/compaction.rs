//! # Background Compaction
//!
//! Detached, single-flight compaction of a schema's native keyspace.
//!
//! The flag is claimed with `compare_exchange`; a second request while one
//! is running is rejected instead of queued. Outcome and liveness stay
//! observable through `is_running`, `last_error` and `wait`.

use crate::domain::errors::KVStoreError;
use crate::domain::schema::Schema;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Clears the running flag when the worker exits, even on panic.
struct ReleaseOnDrop(Arc<AtomicBool>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single-flight guard around one schema's native compaction.
pub struct CompactionGuard {
    label: &'static str,
    running: Arc<AtomicBool>,
    completed: Arc<AtomicU64>,
    last_error: Arc<Mutex<Option<KVStoreError>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CompactionGuard {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            running: Arc::new(AtomicBool::new(false)),
            completed: Arc::new(AtomicU64::new(0)),
            last_error: Arc::new(Mutex::new(None)),
            handle: Mutex::new(None),
        }
    }

    /// Start compacting `[start, end)` unless a run is already in flight.
    ///
    /// Returns `true` if a worker was started.
    pub fn try_spawn(&self, schema: Arc<dyn Schema>, start: Vec<u8>, end: Vec<u8>) -> bool {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("[qc-02] {} compaction already running, skipped", self.label);
            return false;
        }

        let release = ReleaseOnDrop(Arc::clone(&self.running));
        let completed = Arc::clone(&self.completed);
        let last_error = Arc::clone(&self.last_error);
        let label = self.label;

        let spawned = std::thread::Builder::new()
            .name(format!("qc02-compact-{label}"))
            .spawn(move || {
                let _release = release;
                let started = std::time::Instant::now();
                match schema.native_store().compact_range(&start, &end) {
                    Ok(()) => {
                        *last_error.lock() = None;
                        tracing::info!(
                            "[qc-02] 🧹 {} native compaction done in {:?}",
                            label,
                            started.elapsed()
                        );
                    }
                    Err(e) => {
                        tracing::error!("[qc-02] {} native compaction failed: {}", label, e);
                        *last_error.lock() = Some(e);
                    }
                }
                completed.fetch_add(1, Ordering::Relaxed);
            });

        match spawned {
            Ok(handle) => {
                // The previous worker already released the flag.
                if let Some(previous) = self.handle.lock().replace(handle) {
                    let _ = previous.join();
                }
                true
            }
            Err(e) => {
                // The closure (and its release guard) was dropped with the error.
                tracing::error!("[qc-02] cannot spawn {} compaction: {}", label, e);
                *self.last_error.lock() = Some(KVStoreError::IOError {
                    message: e.to_string(),
                });
                false
            }
        }
    }

    /// Whether a compaction worker is live.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Number of finished runs, successful or not.
    pub fn completed_runs(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Error of the most recent run, if it failed.
    pub fn last_error(&self) -> Option<KVStoreError> {
        self.last_error.lock().clone()
    }

    /// Block until the current worker (if any) exits.
    pub fn wait(&self) {
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("[qc-02] {} compaction worker panicked", self.label);
            }
        }
    }
}
