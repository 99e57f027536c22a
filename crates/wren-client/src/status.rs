//! # Status Service
//!
//! Per-post engagement probes, cached, rate-limited and chunked at once.
//!
//! This is where the layers compose: every probe key goes through
//! [`ResponseCache::get_or_fetch`], which on a miss routes the fetch
//! through [`RequestScheduler::enqueue`], and the whole sweep is fanned
//! out by [`BatchCoordinator::run`]. A feed of N posts therefore issues
//! at most N throttled requests on first render and near zero on the
//! next render within the freshness window.
//!
//! Probe failures never fail the sweep: a post whose probe errors (a 429
//! included) just keeps showing its default state.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use wren_types::{EngagementKind, EngagementStatus, PostId};

use crate::api::WrenClient;
use crate::batch::BatchCoordinator;
use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::ClientResult;
use crate::scheduler::RequestScheduler;

/// Cached, throttled, batched engagement probes for feed views.
pub struct StatusService {
    client: WrenClient,
    scheduler: Arc<RequestScheduler>,
    cache: ResponseCache<bool>,
    batch: BatchCoordinator,
    ttl: Duration,
}

impl StatusService {
    /// Creates a status service with its own scheduler and cache.
    #[must_use]
    pub fn new(client: WrenClient, config: &Config) -> Self {
        Self::with_scheduler(client, Arc::new(RequestScheduler::new(config)), config)
    }

    /// Creates a status service sharing an existing scheduler.
    ///
    /// Use this when other request paths (e.g. mutations) should be
    /// throttled through the same queue as status probes.
    #[must_use]
    pub fn with_scheduler(
        client: WrenClient,
        scheduler: Arc<RequestScheduler>,
        config: &Config,
    ) -> Self {
        Self {
            client,
            scheduler,
            cache: ResponseCache::new(),
            batch: BatchCoordinator::new(config),
            ttl: config.status_ttl(),
        }
    }

    /// The scheduler this service throttles through.
    #[must_use]
    pub fn scheduler(&self) -> &Arc<RequestScheduler> {
        &self.scheduler
    }

    /// Drops all cached probe results, forcing the next sweep to refetch.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    /// Like status for each post, in input order.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures (a dropped scheduler queue) surface;
    /// per-post probe failures degrade to the default `false`.
    pub async fn like_statuses(&self, posts: &[PostId]) -> ClientResult<Vec<bool>> {
        self.sweep(posts, EngagementKind::Like, |client, post| async move {
            client.like_status(post).await
        })
        .await
    }

    /// Bookmark status for each post, in input order.
    ///
    /// # Errors
    ///
    /// As [`StatusService::like_statuses`].
    pub async fn bookmark_statuses(&self, posts: &[PostId]) -> ClientResult<Vec<bool>> {
        self.sweep(posts, EngagementKind::Bookmark, |client, post| async move {
            client.bookmark_status(post).await
        })
        .await
    }

    /// Full engagement snapshot for each post, in input order.
    ///
    /// # Errors
    ///
    /// As [`StatusService::like_statuses`].
    pub async fn engagement_for(&self, posts: &[PostId]) -> ClientResult<Vec<EngagementStatus>> {
        let liked = self.like_statuses(posts).await?;
        let bookmarked = self.bookmark_statuses(posts).await?;

        // TODO: probe repost status once the node exposes
        // GET /api/posts/{id}/repost for reads.
        Ok(liked
            .into_iter()
            .zip(bookmarked)
            .map(|(liked, bookmarked)| EngagementStatus {
                liked,
                bookmarked,
                reposted: false,
            })
            .collect())
    }

    /// Runs one probe per post through cache, scheduler and batch.
    ///
    /// Errors are captured as values inside the per-key future so a single
    /// failing probe cannot fail its chunk; the post falls back to `false`.
    async fn sweep<P, Fut>(
        &self,
        posts: &[PostId],
        kind: EngagementKind,
        probe: P,
    ) -> ClientResult<Vec<bool>>
    where
        P: Fn(WrenClient, PostId) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = ClientResult<bool>> + Send + 'static,
    {
        self.batch
            .run(posts.to_vec(), |post| {
                let key = kind.status_key(post);
                let cache = self.cache.clone();
                let scheduler = Arc::clone(&self.scheduler);
                let client = self.client.clone();
                let probe = probe.clone();
                let ttl = self.ttl;
                async move {
                    let fetched = cache
                        .get_or_fetch(&key, ttl, move || {
                            scheduler.enqueue(move || probe(client, post))
                        })
                        .await;
                    match fetched {
                        Ok(status) => Ok(status),
                        Err(err) if err.is_rate_limited() => {
                            debug!(%post, kind = kind.as_str(), "probe rate limited, keeping last-known state");
                            Ok(false)
                        }
                        Err(err) => {
                            warn!(%post, kind = kind.as_str(), error = %err, "probe failed, keeping last-known state");
                            Ok(false)
                        }
                    }
                }
            })
            .await
    }
}
