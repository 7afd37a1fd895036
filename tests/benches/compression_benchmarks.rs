//! # Quantum-Chain Block Compression Benchmarks
//!
//! | Area | Expectation |
//! |------|-------------|
//! | Chunk codec | encode/decode throughput per chunk size |
//! | Lookup | native, item cache, chunk seek |
//! | Driver | catch-up over 10 000 blocks |

use criterion::{criterion_group, criterion_main, Criterion};
use qc_tests::benchmarks::qc_02_block_compression;

fn bench_block_compression(c: &mut Criterion) {
    qc_02_block_compression::register_benchmarks(c);
}

criterion_group!(benches, bench_block_compression);
criterion_main!(benches);
