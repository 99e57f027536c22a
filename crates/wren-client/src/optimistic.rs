//! # Optimistic Mutations
//!
//! Instant local feedback for toggle-style actions, reconciled with
//! server truth.
//!
//! Clicking like, bookmark, repost or a poll option flips the control
//! immediately; the remote call confirms or reverts it later. Each
//! entity+action pair is a tiny state machine: `Idle` (showing the
//! committed value) moves to `Pending` (showing the speculative value)
//! on trigger, then back to `Idle` when the call settles. A second
//! trigger while `Pending` is ignored: there is no way to cancel the
//! in-flight call, so re-entrancy is guarded here instead of producing
//! a double toggle.

use std::future::Future;
use tracing::debug;

use crate::error::ClientResult;

/// How a triggered mutation settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server confirmed; committed state now reflects server truth.
    Confirmed,
    /// The call failed; committed state was restored untouched.
    RolledBack,
    /// A mutation was already pending; this trigger did nothing.
    Ignored,
}

/// Committed plus speculative state for one mutable UI value.
#[derive(Debug, Clone)]
pub struct Optimistic<T> {
    committed: T,
    pending: Option<T>,
}

impl<T: Clone> Optimistic<T> {
    /// Wraps an initial committed value.
    #[must_use]
    pub fn new(committed: T) -> Self {
        Self {
            committed,
            pending: None,
        }
    }

    /// The value the UI should display: speculative if a mutation is in
    /// flight, committed otherwise.
    #[must_use]
    pub fn displayed(&self) -> &T {
        self.pending.as_ref().unwrap_or(&self.committed)
    }

    /// The last value confirmed by the server (or the initial value).
    #[must_use]
    pub fn committed(&self) -> &T {
        &self.committed
    }

    /// Returns true while a mutation is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts showing `speculative`; returns false (and does nothing)
    /// if a mutation is already in flight.
    pub fn begin(&mut self, speculative: T) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(speculative);
        true
    }

    /// Settles the in-flight mutation with the server's value.
    pub fn confirm(&mut self, server_truth: T) {
        self.committed = server_truth;
        self.pending = None;
    }

    /// Reverts to the pre-mutation committed value, exactly as it was.
    pub fn rollback(&mut self) {
        self.pending = None;
    }
}

/// Displayed state of a toggle control with an attached counter
/// (like + like count, repost + repost count).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    /// Whether the toggle is on for the current user.
    pub active: bool,
    /// The associated public counter.
    pub count: u64,
}

impl ToggleState {
    /// Creates a toggle state.
    #[must_use]
    pub fn new(active: bool, count: u64) -> Self {
        Self { active, count }
    }

    /// The speculative state after the user flips the toggle: the flag
    /// inverts and the counter moves by exactly one. Decrements clamp at
    /// zero rather than underflowing on a rapid toggle-off of an
    /// already-zero counter.
    #[must_use]
    pub fn flipped(&self) -> Self {
        if self.active {
            Self {
                active: false,
                count: self.count.saturating_sub(1),
            }
        } else {
            Self {
                active: true,
                count: self.count + 1,
            }
        }
    }

    /// Applies the server's authoritative reply. The server's flag always
    /// wins; the counter is taken from the server when echoed, otherwise
    /// the speculative counter stands.
    #[must_use]
    pub fn reconciled(&self, active: bool, count: Option<u64>) -> Self {
        Self {
            active,
            count: count.unwrap_or(self.count),
        }
    }
}

/// The server's reply to a toggle mutation, reduced to what
/// reconciliation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleReceipt {
    /// The authoritative toggle flag.
    pub active: bool,
    /// The authoritative counter, when the endpoint echoes one.
    pub count: Option<u64>,
}

/// An optimistic toggle for one entity+action pair.
///
/// # Examples
///
/// ```rust,ignore
/// let mut like = OptimisticToggle::new(false, 10);
/// let outcome = like
///     .apply(|_speculative| async { client.like(post).await.map(Into::into) })
///     .await;
/// // On success `like.displayed()` reflects server truth; on failure it
/// // snapped back to (false, 10).
/// ```
#[derive(Debug, Clone)]
pub struct OptimisticToggle {
    inner: Optimistic<ToggleState>,
}

impl OptimisticToggle {
    /// Creates a toggle from the data source's initial values.
    #[must_use]
    pub fn new(active: bool, count: u64) -> Self {
        Self {
            inner: Optimistic::new(ToggleState::new(active, count)),
        }
    }

    /// The state the UI should render right now.
    #[must_use]
    pub fn displayed(&self) -> ToggleState {
        *self.inner.displayed()
    }

    /// Returns true while a mutation is in flight; the control should be
    /// disabled in that window.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.is_pending()
    }

    /// Flips the toggle optimistically and drives the remote call.
    ///
    /// The speculative state is shown before `call` is awaited. On `Ok`
    /// the receipt is reconciled into committed state; on `Err` the
    /// pre-trigger state is restored exactly. Errors are consumed here,
    /// not rethrown: the outcome tells the UI what happened.
    pub async fn apply<F, Fut>(&mut self, call: F) -> MutationOutcome
    where
        F: FnOnce(ToggleState) -> Fut,
        Fut: Future<Output = ClientResult<ToggleReceipt>>,
    {
        let speculative = self.inner.displayed().flipped();
        if !self.inner.begin(speculative) {
            debug!("mutation already pending, trigger ignored");
            return MutationOutcome::Ignored;
        }

        match call(speculative).await {
            Ok(receipt) => {
                let settled = speculative.reconciled(receipt.active, receipt.count);
                self.inner.confirm(settled);
                MutationOutcome::Confirmed
            }
            Err(err) => {
                debug!(error = %err, "mutation failed, rolling back");
                self.inner.rollback();
                MutationOutcome::RolledBack
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    fn boom() -> ClientError {
        ClientError::Api {
            status: 500,
            message: "boom".to_string(),
        }
    }

    #[tokio::test]
    async fn test_rollback_restores_exact_pre_state() {
        let mut like = OptimisticToggle::new(false, 10);

        let outcome = like.apply(|_| async { Err(boom()) }).await;

        assert_eq!(outcome, MutationOutcome::RolledBack);
        assert_eq!(like.displayed(), ToggleState::new(false, 10));
        assert!(!like.is_pending());
    }

    #[tokio::test]
    async fn test_reconciliation_without_echoed_count() {
        let mut like = OptimisticToggle::new(false, 10);

        let outcome = like
            .apply(|_| async {
                Ok(ToggleReceipt {
                    active: true,
                    count: None,
                })
            })
            .await;

        assert_eq!(outcome, MutationOutcome::Confirmed);
        // The server confirmed the flag but echoed no count, so the
        // speculative increment stands.
        assert_eq!(like.displayed(), ToggleState::new(true, 11));
    }

    #[tokio::test]
    async fn test_echoed_count_is_authoritative() {
        let mut like = OptimisticToggle::new(false, 10);

        like.apply(|_| async {
            Ok(ToggleReceipt {
                active: true,
                count: Some(14),
            })
        })
        .await;

        // Someone else liked the post meanwhile; the server's count wins.
        assert_eq!(like.displayed(), ToggleState::new(true, 14));
    }

    #[tokio::test]
    async fn test_speculative_state_is_shown_before_settlement() {
        let mut like = OptimisticToggle::new(false, 10);

        like.apply(|speculative| async move {
            // The call observes the already-flipped state.
            assert_eq!(speculative, ToggleState::new(true, 11));
            Ok(ToggleReceipt {
                active: true,
                count: None,
            })
        })
        .await;
    }

    #[test]
    fn test_second_trigger_while_pending_is_ignored() {
        let mut state = Optimistic::new(ToggleState::new(false, 3));
        assert!(state.begin(ToggleState::new(true, 4)));
        assert!(!state.begin(ToggleState::new(false, 3)));
        assert_eq!(*state.displayed(), ToggleState::new(true, 4));
    }

    #[test]
    fn test_toggle_off_clamps_counter_at_zero() {
        let state = ToggleState::new(true, 0);
        assert_eq!(state.flipped(), ToggleState::new(false, 0));
    }

    #[test]
    fn test_flip_moves_counter_by_one() {
        assert_eq!(
            ToggleState::new(false, 10).flipped(),
            ToggleState::new(true, 11)
        );
        assert_eq!(
            ToggleState::new(true, 11).flipped(),
            ToggleState::new(false, 10)
        );
    }
}
