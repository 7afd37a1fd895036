//! # Compression Context
//!
//! The per-schema chunk-accumulation state machine and the detached
//! native-keyspace compaction it triggers.
//!
//! ## States
//!
//! ```text
//!            step (below caps)
//!   Idle ──────────────────────→ Accumulating ──┐ step (below caps)
//!    ↑                               │  ↑───────┘
//!    │        flush                  │ step (cap reached)
//!    └────────────────────────── CapReached
//! ```
//!
//! ## Crash Safety
//!
//! A flush writes the chunk and the advanced `nextNum` in one atomic batch,
//! and only then deletes the native originals. A crash between the two
//! leaves duplicates, never gaps; the next run re-reads from `nextNum`.

mod compaction;
mod state;


// Re-export public types
pub use compaction::CompactionGuard;
pub use state::{
    CompressionContext, ContextDeps, ContextState, StepOutcome, UntilOutcome,
    PROGRESS_LOG_INTERVAL,
};
