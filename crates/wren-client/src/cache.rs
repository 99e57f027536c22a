//! # Response Cache
//!
//! Time-windowed cache that collapses repeated status probes.
//!
//! A feed render asks for the same per-post statuses every time the list
//! scrolls back into view; re-issuing those requests within a minute is
//! pure waste. Entries are keyed by a caller-supplied string (see
//! [`wren_types::EngagementKind::status_key`] for the convention) and are
//! valid for a caller-supplied TTL. Concurrent misses for one key are
//! single-flight: they share the in-flight fetch instead of issuing
//! duplicates. Expired entries are overwritten lazily on the next lookup,
//! never proactively purged. Errors are never cached.

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// A fetch shared between the leader and any waiters that joined it.
type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, Arc<ClientError>>>>;

enum Slot<T> {
    /// A settled value and when it was stored.
    Ready { value: T, stored_at: Instant },
    /// A fetch is in flight; later callers await this instead of fetching.
    Pending(SharedFetch<T>),
}

/// TTL cache with single-flight fetches.
///
/// Cheaply cloneable; clones share the same entry table.
pub struct ResponseCache<T> {
    slots: Arc<Mutex<HashMap<String, Slot<T>>>>,
}

impl<T> Clone for ResponseCache<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T> Default for ResponseCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResponseCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cached value for `key`, fetching it if absent or stale.
    ///
    /// A fresh entry (younger than `ttl`) is returned without invoking
    /// `fetch`. If a fetch for `key` is already in flight the caller joins
    /// it and receives the same result. Otherwise `fetch` is invoked once;
    /// its success is stored under `key`, its failure removes the slot so
    /// the next call retries.
    ///
    /// # Errors
    ///
    /// [`ClientError::Shared`] wrapping the fetch's error. Every caller
    /// awaiting the fetch, including the one that started it, observes
    /// the same wrapped failure.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> ClientResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let shared = {
            let mut slots = self.slots.lock();
            match slots.get(key) {
                Some(Slot::Ready { value, stored_at }) if stored_at.elapsed() < ttl => {
                    debug!(key, "cache hit");
                    return Ok(value.clone());
                }
                Some(Slot::Pending(shared)) => {
                    debug!(key, "joining in-flight fetch");
                    shared.clone()
                }
                _ => {
                    debug!(key, "cache miss");
                    let slots_handle = Arc::clone(&self.slots);
                    let owned_key = key.to_string();
                    let fut = fetch();
                    let shared: SharedFetch<T> = async move {
                        match fut.await {
                            Ok(value) => {
                                slots_handle.lock().insert(
                                    owned_key,
                                    Slot::Ready {
                                        value: value.clone(),
                                        stored_at: Instant::now(),
                                    },
                                );
                                Ok(value)
                            }
                            Err(err) => {
                                // Never cache a failure; the next call retries.
                                slots_handle.lock().remove(&owned_key);
                                Err(Arc::new(err))
                            }
                        }
                    }
                    .boxed()
                    .shared();
                    slots.insert(key.to_string(), Slot::Pending(shared.clone()));
                    shared
                }
            }
        };

        shared.await.map_err(ClientError::Shared)
    }

    /// Removes the entry for `key`, forcing the next lookup to fetch.
    pub fn invalidate(&self, key: &str) {
        self.slots.lock().remove(key);
    }

    /// Removes every entry.
    pub fn invalidate_all(&self) {
        self.slots.lock().clear();
    }

    /// Number of entries currently in the table, including stale ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns true if the table holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}
