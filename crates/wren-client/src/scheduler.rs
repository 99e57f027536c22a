//! # Request Scheduler
//!
//! Serializes outbound requests with a minimum gap between dispatches.
//!
//! Feed views fire a burst of per-post status probes on render; without a
//! gate those bursts hammer the backend and trip its rate limits. The
//! scheduler accepts asynchronous thunks, queues them FIFO, and guarantees
//! that no two thunks *start* executing less than the configured gap apart.
//! Exactly one thunk runs at a time: this is a throttle, not a pool.

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// A queued thunk, boxed so heterogeneous result types share one queue.
///
/// The thunk settles its caller through a oneshot captured inside the
/// closure; the drain loop only sees an opaque job to run to completion.
type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

struct QueuedRequest {
    id: u64,
    job: Job,
}

struct SchedulerState {
    pending: VecDeque<QueuedRequest>,
    /// True while a drain loop is running. Checked and set in the same
    /// critical section as the queue append so two loops can never start.
    is_draining: bool,
    /// Start time of the most recently dispatched request.
    last_dispatch_at: Option<Instant>,
    next_id: u64,
}

/// What the drain loop should do next, decided under the state lock.
enum Step {
    /// Queue is empty; the loop exits and clears `is_draining`.
    Finished,
    /// The minimum gap has not elapsed yet.
    Wait(Duration),
    /// Dispatch the head of the queue.
    Run(QueuedRequest),
}

/// Rate-limiting serializer for outbound requests.
///
/// Construct one per application (or per test) and share it via [`Arc`];
/// there is deliberately no global instance, so the throttling discipline
/// is explicit and each test gets a fresh queue.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use wren_client::{Config, RequestScheduler};
///
/// let scheduler = Arc::new(RequestScheduler::new(&Config::default()));
/// let status = scheduler.enqueue(|| async { client.like_status(post).await }).await?;
/// ```
pub struct RequestScheduler {
    state: Mutex<SchedulerState>,
    min_gap: Duration,
    request_timeout: Option<Duration>,
    max_pending: usize,
}

impl RequestScheduler {
    /// Creates a scheduler from the orchestration config.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_gap(
            config.min_request_gap(),
            config.request_timeout(),
            config.max_pending,
        )
    }

    /// Creates a scheduler with explicit tuning.
    ///
    /// A `min_gap` of zero disables throttling but still serializes:
    /// requests run one at a time in submission order.
    #[must_use]
    pub fn with_gap(
        min_gap: Duration,
        request_timeout: Option<Duration>,
        max_pending: usize,
    ) -> Self {
        Self {
            state: Mutex::new(SchedulerState {
                pending: VecDeque::new(),
                is_draining: false,
                last_dispatch_at: None,
                next_id: 0,
            }),
            min_gap,
            request_timeout,
            max_pending,
        }
    }

    /// Number of requests currently waiting for dispatch.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Enqueues a thunk for rate-limited execution.
    ///
    /// The returned future settles with the thunk's own result once the
    /// scheduler has dispatched it and it has run to completion. Thunks
    /// are dispatched FIFO, with at least the configured gap between
    /// consecutive dispatch starts. A failing thunk fails only its own
    /// caller; the queue keeps draining.
    ///
    /// # Errors
    ///
    /// * [`ClientError::QueueFull`] - the pending queue is at capacity
    /// * [`ClientError::Timeout`] - the thunk did not settle within the
    ///   configured deadline
    /// * any error the thunk itself produces, forwarded unchanged
    pub fn enqueue<T, F, Fut>(self: &Arc<Self>, thunk: F) -> impl Future<Output = ClientResult<T>>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel::<ClientResult<T>>();
        let mut start_drain = false;

        {
            let mut state = self.state.lock();
            if state.pending.len() >= self.max_pending {
                warn!(capacity = self.max_pending, "pending queue full, rejecting request");
                let _ = tx.send(Err(ClientError::QueueFull(self.max_pending)));
            } else {
                let id = state.next_id;
                state.next_id += 1;

                let deadline = self.request_timeout;
                let job: Job = Box::new(move || {
                    async move {
                        let result = match deadline {
                            Some(limit) => match tokio::time::timeout(limit, thunk()).await {
                                Ok(settled) => settled,
                                Err(_) => Err(ClientError::Timeout(limit)),
                            },
                            None => thunk().await,
                        };
                        // The caller may have gone away; that is not our problem.
                        let _ = tx.send(result);
                    }
                    .boxed()
                });

                state.pending.push_back(QueuedRequest { id, job });
                debug!(id, queued = state.pending.len(), "request enqueued");

                if !state.is_draining {
                    state.is_draining = true;
                    start_drain = true;
                }
            }
        }

        if start_drain {
            let scheduler = Arc::clone(self);
            tokio::spawn(async move {
                scheduler.drain().await;
            });
        }

        async move {
            match rx.await {
                Ok(result) => result,
                Err(_) => Err(ClientError::Dropped),
            }
        }
    }

    /// Drains the queue until it is empty, honoring the gap between starts.
    ///
    /// Only one drain loop runs at a time; `enqueue` calls made while it is
    /// running append to the queue and are picked up on the next iteration.
    async fn drain(self: Arc<Self>) {
        debug!("drain loop started");
        loop {
            let step = {
                let mut state = self.state.lock();
                if state.pending.is_empty() {
                    // Clearing the flag and observing the empty queue must
                    // happen in one critical section, otherwise an enqueue
                    // racing this check could be left stranded.
                    state.is_draining = false;
                    Step::Finished
                } else {
                    let wait = state
                        .last_dispatch_at
                        .map_or(Duration::ZERO, |at| self.min_gap.saturating_sub(at.elapsed()));
                    if wait.is_zero() {
                        match state.pending.pop_front() {
                            Some(request) => {
                                state.last_dispatch_at = Some(Instant::now());
                                Step::Run(request)
                            }
                            None => Step::Finished,
                        }
                    } else {
                        Step::Wait(wait)
                    }
                }
            };

            match step {
                Step::Finished => {
                    debug!("drain loop idle");
                    break;
                }
                Step::Wait(wait) => tokio::time::sleep(wait).await,
                Step::Run(request) => {
                    debug!(id = request.id, "dispatching request");
                    (request.job)().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scheduler(gap_ms: u64) -> Arc<RequestScheduler> {
        Arc::new(RequestScheduler::with_gap(
            Duration::from_millis(gap_ms),
            None,
            64,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_starts_respect_min_gap() {
        let scheduler = scheduler(2_000);
        let starts: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let starts = Arc::clone(&starts);
            handles.push(scheduler.enqueue(move || async move {
                starts.lock().push(Instant::now());
                Ok(())
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let starts = starts.lock();
        assert_eq!(starts.len(), 5);
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(2_000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fifo_dispatch_order() {
        let scheduler = scheduler(100);
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let slow = {
            let order = Arc::clone(&order);
            scheduler.enqueue(move || async move {
                order.lock().push("slow");
                tokio::time::sleep(Duration::from_millis(500)).await;
                Ok("slow")
            })
        };
        let fast = {
            let order = Arc::clone(&order);
            scheduler.enqueue(move || async move {
                order.lock().push("fast");
                Ok("fast")
            })
        };

        let (slow_result, fast_result) = tokio::join!(slow, fast);
        assert_eq!(slow_result.unwrap(), "slow");
        assert_eq!(fast_result.unwrap(), "fast");
        // The slow thunk was enqueued first, so its body starts first.
        assert_eq!(*order.lock(), vec!["slow", "fast"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_gap_still_serializes() {
        let scheduler = scheduler(0);
        let concurrent = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let concurrent = Arc::clone(&concurrent);
            let high_water = Arc::clone(&high_water);
            handles.push(scheduler.enqueue(move || async move {
                let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                high_water.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                concurrent.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(high_water.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_thunk_does_not_abort_queue() {
        let scheduler = scheduler(10);

        let failing = scheduler.enqueue(|| async {
            Err::<(), _>(ClientError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        });
        let following = scheduler.enqueue(|| async { Ok(7u64) });

        let (failed, followed) = tokio::join!(failing, following);
        assert!(matches!(failed, Err(ClientError::Api { status: 500, .. })));
        assert_eq!(followed.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_full_rejects_fast() {
        let scheduler = Arc::new(RequestScheduler::with_gap(
            Duration::from_secs(3_600),
            None,
            1,
        ));

        // Neither job has been dispatched yet: the drain task has not run,
        // so the first fills the single queue slot and the second bounces.
        let first = scheduler.enqueue(|| async { Ok(1u64) });
        let second = scheduler.enqueue(|| async { Ok(2u64) });

        assert!(matches!(second.await, Err(ClientError::QueueFull(1))));
        assert_eq!(first.await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_thunk_times_out() {
        let scheduler = Arc::new(RequestScheduler::with_gap(
            Duration::ZERO,
            Some(Duration::from_secs(1)),
            64,
        ));

        let stalled = scheduler.enqueue(|| async {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(())
        });
        let result = stalled.await;
        assert!(matches!(result, Err(ClientError::Timeout(_))));

        // The queue is released once the stalled request is timed out.
        let next = scheduler.enqueue(|| async { Ok(9u64) });
        assert_eq!(next.await.unwrap(), 9);
    }
}
