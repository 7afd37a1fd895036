//! # Compression Flows
//!
//! End-to-end scenarios over one `CompressionModule`:
//!
//! 1. **Steady state**: 1 000 blocks, retention 128, chunks of 10
//! 2. **Reorg**: stop, rewind 999 down to 777, no gaps, compression resumes
//! 3. **Concurrent lookups**: random reads while the drivers are flushing
//! 4. **Cache eviction**: a one-entry chunk cache falls back to range seeks

#[cfg(test)]
mod tests {
    use super::super::fixture::{
        block_hash, body_bytes, header_bytes, min_next_num, receipts_bytes, scenario_config,
        wait_for_next_num, TestChain,
    };
    use qc_02_block_compression::{
        CompressedBlockReader, CompressionError, CompressionModule, ReorgCompensator, Schema,
    };
    use rand::Rng;
    use std::sync::Arc;

    const HEAD: u64 = 999;

    fn assert_retrievable(module: &CompressionModule, num: u64) {
        let hash = block_hash(num);
        assert_eq!(
            module.find_compressed_header(num, &hash).unwrap(),
            Some(header_bytes(num)),
            "header #{num}"
        );
        assert_eq!(
            module.find_compressed_body(num, &hash).unwrap(),
            Some(body_bytes(num)),
            "body #{num}"
        );
        assert_eq!(
            module.find_compressed_receipts(num, &hash).unwrap(),
            Some(receipts_bytes(num)),
            "receipts #{num}"
        );
    }

    async fn steady_state() -> (TestChain, CompressionModule) {
        let chain = TestChain::with_blocks(HEAD);
        let module = chain.module(scenario_config(10));
        module.start().await.unwrap();
        wait_for_next_num(&module, 871).await;
        module.stop().await;
        (chain, module)
    }

    // =========================================================================
    // SCENARIO A: STEADY STATE
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_steady_state_compression() {
        let (chain, module) = steady_state().await;

        let next_num = min_next_num(&module);
        assert!(next_num <= HEAD - 128 + 1, "nextNum {next_num} inside retention");
        assert_eq!(next_num, 871);

        for num in 1..next_num {
            assert!(!chain.is_native(&chain.body, num), "body #{num} still native");
            assert!(!chain.is_native(&chain.header, num));
            assert!(!chain.is_native(&chain.receipts, num));
        }
        for num in next_num..=HEAD {
            assert!(chain.is_native(&chain.body, num), "body #{num} dropped");
        }
        assert!(chain.is_native(&chain.body, 0));

        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let num = rng.gen_range(0..=HEAD);
            assert_retrievable(&module, num);
        }
    }

    // =========================================================================
    // SCENARIO B: REORG
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rewind_leaves_no_gaps_and_compression_resumes() {
        let (chain, module) = steady_state().await;

        module.rewind_to(776).unwrap();
        for num in (777..=HEAD).rev() {
            module.rewind_delete(&block_hash(num), num).unwrap();
        }
        assert!(min_next_num(&module) <= 777);
        assert_eq!(min_next_num(&module), 771);

        chain.discard_above(776, HEAD);
        for num in 0..=776 {
            assert_retrievable(&module, num);
        }
        assert_eq!(
            module.find_compressed_body(900, &block_hash(900)).unwrap(),
            None
        );

        // The chain grows again past the old head
        for num in 777..=1_100 {
            chain.insert_block(num);
        }
        module.start().await.unwrap();
        wait_for_next_num(&module, 971).await;
        module.stop().await;

        for num in (1..=1_100).step_by(7) {
            assert_retrievable(&module, num);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rewind_tolerates_leftover_native_duplicates() {
        let (chain, module) = steady_state().await;
        // Natives left behind by a crash between chunk write and native delete
        for num in 501..=510 {
            chain.insert_block(num);
        }

        module.rewind_delete(&block_hash(505), 505).unwrap();

        assert_eq!(min_next_num(&module), 501);
        for num in 501..=870 {
            assert!(chain.is_native(&chain.receipts, num));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rewind_requires_stopped_drivers() {
        let chain = TestChain::with_blocks(HEAD);
        let module = chain.module(scenario_config(10));
        module.start().await.unwrap();

        let result = module.rewind_delete(&block_hash(HEAD), HEAD);
        module.stop().await;

        assert!(matches!(result, Err(CompressionError::AlreadyRunning)));
    }

    // =========================================================================
    // SCENARIO C: CONCURRENT LOOKUPS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_lookups_during_compression() {
        const BIG_HEAD: u64 = 20_000;
        let chain = TestChain::with_blocks(BIG_HEAD);
        let module = Arc::new(chain.module(scenario_config(10)));

        module.start().await.unwrap();
        let mut readers = Vec::new();
        for _ in 0..100 {
            let module = Arc::clone(&module);
            readers.push(tokio::task::spawn_blocking(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..20 {
                    let num = rng.gen_range(0..=BIG_HEAD);
                    let body = module.find_compressed_body(num, &block_hash(num));
                    assert_eq!(body.unwrap(), Some(body_bytes(num)), "body #{num}");
                }
            }));
        }
        for reader in readers {
            reader.await.unwrap();
        }

        wait_for_next_num(&module, BIG_HEAD - 128 - 9).await;
        module.stop().await;

        let metrics = module.metrics();
        assert_eq!(metrics.loop_failures, 0);
        assert_eq!(metrics.not_found, 0);
    }

    // =========================================================================
    // SCENARIO D: CACHE EVICTION
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_single_entry_chunk_cache_falls_back_to_seek() {
        let chain = TestChain::with_blocks(HEAD);
        let module = chain.module(scenario_config(10).with_cache_capacity(1, 1));
        module.start().await.unwrap();
        wait_for_next_num(&module, 871).await;
        module.stop().await;

        for num in [15, 25, 15, 25, 26] {
            assert_eq!(
                module.find_compressed_body(num, &block_hash(num)).unwrap(),
                Some(body_bytes(num))
            );
        }

        let metrics = module.metrics();
        // 15, 25, 15, 25 each evict the other chunk; 26 hits the cached [21, 30]
        assert_eq!(metrics.range_queries, 4);
        assert_eq!(metrics.chunk_cache_hits, 1);
        let body_status = module
            .status()
            .unwrap()
            .into_iter()
            .find(|s| s.schema == chain.body.name())
            .unwrap();
        assert_eq!(body_status.cache.chunks, 1);
        assert_eq!(body_status.cache.chunk_capacity, 1);
    }
}
