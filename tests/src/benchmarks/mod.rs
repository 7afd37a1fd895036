//! # Quantum-Chain Benchmarks
//!
//! Codec, flush and lookup throughput of the compression engine.

pub mod qc_02_block_compression;
