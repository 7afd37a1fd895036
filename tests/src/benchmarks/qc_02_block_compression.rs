//! # QC-02 Block Compression Benchmarks
//!
//! Performance expectations:
//! - Chunk encode of 1 000 bodies: well under the driver idle interval
//! - Lookup served by the item cache: sub-microsecond
//! - Lookup that seeks and decodes a chunk: bounded by one zstd frame
//! - Driver catch-up over 10 000 blocks with chunks of 100

use crate::integration::fixture::{
    block_hash, body_bytes, scenario_config, wait_for_next_num, TestChain,
};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use qc_02_block_compression::domain::chunk::{decode_chunk, encode_chunk};
use qc_02_block_compression::{ChunkItem, ChunkRange, CompressedBlockReader, ZstdCompressor};
use rand::Rng;
use std::time::Duration;

fn body_items(count: u64) -> Vec<ChunkItem> {
    (1..=count)
        .map(|num| ChunkItem::new(num, block_hash(num), body_bytes(num)))
        .collect()
}

pub fn bench_chunk_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-02-chunk-codec");
    let codec = ZstdCompressor::default_compressor();

    for count in [10u64, 100, 1_000] {
        let items = body_items(count);
        let raw: u64 = items.iter().map(|i| i.payload.len() as u64).sum();
        group.throughput(Throughput::Bytes(raw));

        group.bench_with_input(BenchmarkId::new("encode", count), &items, |b, items| {
            b.iter(|| black_box(encode_chunk(&codec, items)))
        });

        let blob = match encode_chunk(&codec, &items) {
            Ok(blob) => blob,
            Err(e) => panic!("encode failed: {e}"),
        };
        let range = ChunkRange::new(1, count);
        group.bench_with_input(BenchmarkId::new("decode", count), &blob, |b, blob| {
            b.iter(|| black_box(decode_chunk(&codec, range, blob)))
        });
    }

    group.finish();
}

pub fn bench_lookup_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-02-lookup");
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => panic!("runtime: {e}"),
    };

    let chain = TestChain::with_blocks(5_000);
    let module = chain.module(scenario_config(100));
    runtime.block_on(async {
        let _ = module.start().await;
        wait_for_next_num(&module, 4_801).await;
        module.stop().await;
    });

    group.bench_function("native", |b| {
        b.iter(|| black_box(module.find_compressed_body(4_900, &block_hash(4_900))))
    });

    let _ = module.find_compressed_body(250, &block_hash(250));
    group.bench_function("item_cache", |b| {
        b.iter(|| black_box(module.find_compressed_body(250, &block_hash(250))))
    });

    group.bench_function("random_compressed", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| {
            let num = rng.gen_range(1..4_800);
            black_box(module.find_compressed_body(num, &block_hash(num)))
        })
    });

    group.finish();
}

pub fn bench_driver_catch_up(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-02-driver");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => panic!("runtime: {e}"),
    };

    group.throughput(Throughput::Elements(10_000));
    group.bench_function("catch_up_10k", |b| {
        b.iter_with_setup(
            || TestChain::with_blocks(10_128),
            |chain| {
                let module = chain.module(scenario_config(100));
                runtime.block_on(async {
                    let _ = module.start().await;
                    wait_for_next_num(&module, 10_001).await;
                    module.stop().await;
                });
                black_box(module.metrics().chunks_written)
            },
        )
    });

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_chunk_codec(c);
    bench_lookup_paths(c);
    bench_driver_catch_up(c);
}
