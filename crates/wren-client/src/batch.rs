//! # Batch Coordinator
//!
//! Fans a list of independent per-key lookups out in fixed-size chunks.
//!
//! Probing the status of every post in a freshly rendered feed means N
//! lookups; firing all N at once defeats the scheduler's throttling and
//! opens N connections. The coordinator dispatches the keys a chunk at a
//! time, runs each chunk's lookups concurrently, and idles between chunks.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::config::Config;
use crate::error::ClientResult;

/// Number of chunks needed to cover `total` items `chunk_size` at a time.
fn chunk_count(total: usize, chunk_size: usize) -> usize {
    total.div_ceil(chunk_size)
}

/// Chunked fan-out with an idle gap between chunks.
#[derive(Debug, Clone)]
pub struct BatchCoordinator {
    chunk_size: usize,
    inter_chunk_delay: Duration,
}

impl BatchCoordinator {
    /// Creates a coordinator from the orchestration config.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_tuning(config.chunk_size, config.inter_chunk_delay())
    }

    /// Creates a coordinator with explicit tuning.
    ///
    /// A `chunk_size` of zero is treated as one: a chunk must make progress.
    #[must_use]
    pub fn with_tuning(chunk_size: usize, inter_chunk_delay: Duration) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            inter_chunk_delay,
        }
    }

    /// Runs `per_key` for every key, at most `chunk_size` concurrently.
    ///
    /// Keys are split into consecutive chunks (the last may be short).
    /// Each chunk's lookups run concurrently and the chunk is awaited as a
    /// whole before the next one starts, with the configured idle time in
    /// between (none after the final chunk). Results come back in input
    /// key order regardless of completion order within a chunk.
    ///
    /// # Errors
    ///
    /// A chunk is all-or-nothing: one rejecting lookup fails its whole
    /// chunk and the batch. Callers wanting per-key failure tolerance wrap
    /// `per_key` so it captures errors as values.
    pub async fn run<K, T, F, Fut>(&self, keys: Vec<K>, per_key: F) -> ClientResult<Vec<T>>
    where
        F: Fn(K) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let total = keys.len();
        let chunks = chunk_count(total, self.chunk_size);
        let mut results = Vec::with_capacity(total);
        let mut remaining = keys.into_iter();

        for index in 0..chunks {
            if index > 0 && !self.inter_chunk_delay.is_zero() {
                sleep(self.inter_chunk_delay).await;
            }

            let chunk: Vec<K> = remaining.by_ref().take(self.chunk_size).collect();
            debug!(chunk = index, size = chunk.len(), total, "dispatching chunk");

            let settled =
                futures::future::try_join_all(chunk.into_iter().map(&per_key)).await?;
            results.extend(settled);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn coordinator(chunk_size: usize, delay_ms: u64) -> BatchCoordinator {
        BatchCoordinator::with_tuning(chunk_size, Duration::from_millis(delay_ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_bounded_by_chunk_size() {
        let batch = coordinator(3, 3_000);
        let concurrent = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let started = Instant::now();
        let results = batch
            .run((0..7u64).collect(), |key| {
                let concurrent = Arc::clone(&concurrent);
                let high_water = Arc::clone(&high_water);
                async move {
                    let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                    high_water.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    concurrent.fetch_sub(1, Ordering::SeqCst);
                    Ok(key)
                }
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 7);
        assert!(high_water.load(Ordering::SeqCst) <= 3);
        // 7 keys at chunk size 3 is 3 chunks, so 2 idle gaps of 3s each.
        assert!(started.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_preserve_key_order() {
        let batch = coordinator(3, 0);

        let results = batch
            .run(vec!["a", "b", "c"], |key| async move {
                // The middle key settles fastest.
                let latency = match key {
                    "b" => 1,
                    "a" => 50,
                    _ => 100,
                };
                tokio::time::sleep(Duration::from_millis(latency)).await;
                Ok(format!("result-{key}"))
            })
            .await
            .unwrap();

        assert_eq!(results, vec!["result-a", "result-b", "result-c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failing_key_fails_the_batch() {
        let batch = coordinator(3, 0);

        let outcome = batch
            .run(vec![1u64, 2, 3, 4], |key| async move {
                if key == 2 {
                    Err(ClientError::Api {
                        status: 500,
                        message: "boom".to_string(),
                    })
                } else {
                    Ok(key)
                }
            })
            .await;

        assert!(matches!(outcome, Err(ClientError::Api { status: 500, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_key_list_is_a_noop() {
        let batch = coordinator(3, 3_000);
        let results = batch
            .run(Vec::<u64>::new(), |key| async move { Ok(key) })
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delay_after_final_chunk() {
        let batch = coordinator(2, 5_000);
        let started = Instant::now();

        batch
            .run(vec![1u64, 2, 3], |key| async move { Ok(key) })
            .await
            .unwrap();

        // 2 chunks means exactly one idle gap, not two.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(10));
    }

    #[test]
    fn test_chunk_count_reference_case() {
        assert_eq!(chunk_count(7, 3), 3);
        assert_eq!(chunk_count(6, 3), 2);
        assert_eq!(chunk_count(0, 3), 0);
        assert_eq!(chunk_count(1, 3), 1);
    }

    proptest! {
        #[test]
        fn prop_chunk_count_covers_all_keys(total in 0usize..10_000, size in 1usize..64) {
            let chunks = chunk_count(total, size);
            // Enough chunks to cover every key, but no chunk left empty.
            prop_assert!(chunks * size >= total);
            if total > 0 {
                prop_assert!((chunks - 1) * size < total);
            } else {
                prop_assert_eq!(chunks, 0);
            }
        }
    }
}
