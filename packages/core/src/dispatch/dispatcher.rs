//! Mutation dispatcher
//!
//! The only component that talks to both the store and the cache. It takes
//! the diffs and plans produced by the ordering engine, applies them
//! optimistically to the cache for immediate visual feedback, persists them,
//! and then invalidates the affected container(s) so the next read refetches
//! the server's authoritative order.
//!
//! Failures are never fatal: the same invalidation runs, a user-visible
//! [`DispatchEvent`] is broadcast, and the UI self-heals to the backend's
//! last known-good state on the next fetch. No partial rollback of the
//! optimistic view is attempted.

use crate::models::Item;
use crate::ordering::{MovePlan, ReorderOutcome};
use crate::store::ItemStore;
use crate::tree::ChildCache;
use crate::dispatch::error::DispatchError;
use crate::dispatch::queue::{reorder_with_retry, ContainerLocks};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity for dispatch events.
const DISPATCH_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Default bounded retry budget for conflicting reorders.
const DEFAULT_MAX_RETRIES: usize = 3;

/// User-facing notifications emitted by the dispatcher.
///
/// The rendering layer subscribes to these to show transient toasts
/// ("failed to reorder", "failed to move") and to refresh affected views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DispatchEvent {
    #[serde(rename_all = "camelCase")]
    ReorderApplied {
        container_id: String,
        changed: usize,
    },

    #[serde(rename_all = "camelCase")]
    ReorderFailed {
        container_id: String,
        reason: String,
    },

    #[serde(rename_all = "camelCase")]
    MoveApplied {
        item_id: String,
        origin_id: String,
        destination_id: String,
    },

    #[serde(rename_all = "camelCase")]
    MoveFailed {
        item_id: String,
        destination_id: String,
        reason: String,
    },
}

/// Issues persistence calls for reorder diffs and move plans, and keeps the
/// child cache reconciled with the backend's responses.
pub struct MutationDispatcher {
    store: Arc<dyn ItemStore>,
    cache: ChildCache,
    locks: ContainerLocks,
    events: broadcast::Sender<DispatchEvent>,
    max_retries: usize,
}

impl MutationDispatcher {
    pub fn new(store: Arc<dyn ItemStore>, cache: ChildCache) -> Self {
        let (events, _) = broadcast::channel(DISPATCH_EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            cache,
            locks: ContainerLocks::new(),
            events,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Dispatcher with a custom conflict-retry budget (0 = single attempt).
    pub fn with_max_retries(store: Arc<dyn ItemStore>, cache: ChildCache, max_retries: usize) -> Self {
        let mut dispatcher = Self::new(store, cache);
        dispatcher.max_retries = max_retries;
        dispatcher
    }

    /// Subscribe to user-facing dispatch notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: DispatchEvent) {
        // Send only fails when nobody is listening, which is fine.
        let _ = self.events.send(event);
    }

    /// Persist a same-parent reorder diff.
    ///
    /// An empty diff (item dropped onto itself) issues no persistence call
    /// at all. Otherwise: optimistic cache apply, serialized persist with
    /// conflict retry, then invalidation of the container whatever the
    /// outcome.
    pub async fn dispatch_reorder(
        &self,
        container_id: &str,
        outcome: &ReorderOutcome,
    ) -> Result<(), DispatchError> {
        if outcome.is_noop() {
            tracing::debug!(container_id, "reorder produced no changes, skipping");
            return Ok(());
        }

        self.cache
            .apply_order(container_id, outcome.order.clone())
            .await;

        let lock = self.locks.for_container(container_id);
        let result = {
            let _guard = lock.lock().await;
            reorder_with_retry(
                &self.store,
                container_id,
                outcome.changes.clone(),
                &outcome.candidate_ids(),
                self.max_retries,
            )
            .await
        };

        // Authoritative order comes from the next fetch, success or not.
        self.cache.invalidate(container_id).await;

        match result {
            Ok(_) => {
                self.emit(DispatchEvent::ReorderApplied {
                    container_id: container_id.to_string(),
                    changed: outcome.changes.len(),
                });
                Ok(())
            }
            Err(err) => {
                tracing::warn!(container_id, error = %err, "reorder failed, container invalidated");
                self.emit(DispatchEvent::ReorderFailed {
                    container_id: container_id.to_string(),
                    reason: err.to_string(),
                });
                if err.is_retriable() {
                    // Still conflicting after the whole retry budget.
                    Err(DispatchError::retries_exhausted(
                        container_id,
                        self.max_retries + 1,
                    ))
                } else {
                    Err(err.into())
                }
            }
        }
    }

    /// Persist a cross-parent move (append semantics).
    ///
    /// Both the origin and destination caches are invalidated on success and
    /// on failure: the origin lost a member and must close its gap, the
    /// destination gained one at a position only the backend knows.
    pub async fn dispatch_move(&self, plan: MovePlan) -> Result<Item, DispatchError> {
        if plan.origin_id == plan.destination_id {
            tracing::debug!(item_id = %plan.item.id, "move within same container, skipping");
            return Ok(plan.item);
        }

        let item_id = plan.item.id.clone();
        let origin_id = plan.origin_id.clone();
        let destination_id = plan.destination_id.clone();

        self.cache.remove_member(&origin_id, &item_id).await;

        let lock = self.locks.for_container(&destination_id);
        let result = {
            let _guard = lock.lock().await;
            self.store.update(&item_id, plan.into_patch()).await
        };

        self.cache.invalidate(&origin_id).await;
        self.cache.invalidate(&destination_id).await;

        match result {
            Ok(item) => {
                self.emit(DispatchEvent::MoveApplied {
                    item_id,
                    origin_id,
                    destination_id,
                });
                Ok(item)
            }
            Err(err) => {
                tracing::warn!(
                    item_id = %item_id,
                    destination_id = %destination_id,
                    error = %err,
                    "move failed, containers invalidated"
                );
                self.emit(DispatchEvent::MoveFailed {
                    item_id,
                    destination_id,
                    reason: err.to_string(),
                });
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod dispatcher_test;
