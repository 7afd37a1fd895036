//! # Background Driver
//!
//! One blocking task per schema. Each pass computes the retention boundary
//! from the current head, runs the context up to it, then idles until the
//! head has moved on.
//!
//! A failure ends only the loop that hit it; the other schemas keep going.

use crate::domain::config::CompressionConfig;
use crate::domain::context::{CompressionContext, ContextDeps, UntilOutcome};
use crate::domain::errors::CompressionError;
use crate::domain::schema::Schema;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest single sleep while idling, so `stop` is observed promptly.
const QUIT_POLL: Duration = Duration::from_millis(50);

/// Holds a schema's `running` flag up from spawn until the task is gone,
/// whether it ran to completion or was cancelled before it started.
pub(super) struct LiveFlag(Arc<AtomicBool>);

impl LiveFlag {
    pub(super) fn raise(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for LiveFlag {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub(super) fn run<S: Schema>(
    deps: ContextDeps<S>,
    config: CompressionConfig,
    quit: Arc<AtomicBool>,
    _live: LiveFlag,
) {
    let name = deps.schema.name();
    let metrics = Arc::clone(&deps.metrics);

    tracing::info!(schema = name, "[qc-02] compression driver started");
    match drive(deps, &config, &quit) {
        Ok(()) => tracing::info!(schema = name, "[qc-02] compression driver exited"),
        Err(e) => {
            metrics.record_loop_failure();
            tracing::error!(
                schema = name,
                "[qc-02] ❌ compression loop terminated: {}",
                e
            );
        }
    }
}

fn drive<S: Schema>(
    deps: ContextDeps<S>,
    config: &CompressionConfig,
    quit: &AtomicBool,
) -> Result<(), CompressionError> {
    let chain = Arc::clone(&deps.chain);
    let mut ctx = CompressionContext::resume(deps, config)?;

    loop {
        let end_num = chain.current_head().saturating_sub(config.retention);
        match ctx.until(end_num, quit)? {
            UntilOutcome::Cancelled => return Ok(()),
            UntilOutcome::Reached => {
                if idle(config.idle_interval, quit) {
                    return Ok(());
                }
            }
        }
    }
}

/// Sleep for `interval`, returning early (with `true`) once `quit` is raised.
fn idle(interval: Duration, quit: &AtomicBool) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if quit.load(Ordering::Acquire) {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        std::thread::sleep((deadline - now).min(QUIT_POLL));
    }
}
