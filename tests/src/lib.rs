//! # Quantum-Chain Block Compression Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion benchmarks for the compression engine
//! │   └── qc_02_block_compression.rs
//! │
//! └── integration/      # End-to-end compression / lookup / rewind flows
//!     ├── fixture.rs
//!     └── compression_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

pub mod benchmarks;
pub mod integration;
