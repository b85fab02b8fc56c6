//! Per-container mutation serialization with conflict retry
//!
//! Reorders against the same container are prone to sequence conflicts when
//! a second drag lands before the first mutation's refetch completes.
//! Instead of relying on refetch-after-failure as the only repair path, this
//! queue serializes mutations per container and retries conflicting reorders
//! with exponential backoff, recomputing the sparse diff from the drag's
//! intended order against a fresh authoritative fetch on each attempt.

use crate::models::SequenceChange;
use crate::ordering::diff_against_candidate;
use crate::store::{ItemStore, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Duration;

/// Lazily created per-container locks.
///
/// Holding a container's lock for the duration of a mutation serializes
/// writes to that container without blocking mutations elsewhere in the
/// tree.
#[derive(Default)]
pub struct ContainerLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ContainerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the lock guarding `container_id`.
    pub fn for_container(&self, container_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.inner.lock().expect("container lock map poisoned");
        locks
            .entry(container_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

/// Persist a reorder diff with automatic retry on sequence conflicts.
///
/// The caller must already hold the container's lock. Each retry fetches
/// the authoritative list and recomputes the diff from `candidate_ids`
/// (the drag's intended id order); a recomputed empty diff means the
/// backend already reflects the intended order and counts as success.
///
/// # Retry behavior
///
/// - Retries on `StoreError::SequenceConflict` only
/// - Exponential backoff: 10ms, 20ms, 40ms, ...
/// - `max_retries = 0` means a single attempt
pub(crate) async fn reorder_with_retry(
    store: &Arc<dyn ItemStore>,
    parent_id: &str,
    mut changes: Vec<SequenceChange>,
    candidate_ids: &[String],
    max_retries: usize,
) -> Result<usize, StoreError> {
    let mut attempt = 0;

    loop {
        if changes.is_empty() {
            // The backend already matches the intended order.
            return Ok(attempt);
        }

        match store.reorder(parent_id, &changes).await {
            Ok(()) => {
                if attempt > 0 {
                    tracing::debug!(
                        container_id = parent_id,
                        attempt,
                        "reorder succeeded after retry"
                    );
                }
                return Ok(attempt);
            }

            Err(err @ StoreError::SequenceConflict { .. }) if attempt < max_retries => {
                tracing::debug!(
                    container_id = parent_id,
                    attempt = attempt + 1,
                    budget = max_retries + 1,
                    error = %err,
                    "sequence conflict, refetching and retrying"
                );

                let backoff_ms = 10u64 * (1 << attempt);
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;

                let fresh = store.list(parent_id).await?;
                changes = diff_against_candidate(&fresh, candidate_ids);
                attempt += 1;
            }

            Err(err) => {
                if matches!(err, StoreError::SequenceConflict { .. }) {
                    tracing::warn!(
                        container_id = parent_id,
                        max_retries,
                        "reorder retry budget exhausted"
                    );
                }
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_container_shares_a_lock() {
        let locks = ContainerLocks::new();
        let a = locks.for_container("node-1");
        let b = locks.for_container("node-1");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_different_containers_do_not_share() {
        let locks = ContainerLocks::new();
        let a = locks.for_container("node-1");
        let b = locks.for_container("node-2");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_lock_serializes() {
        let locks = ContainerLocks::new();
        let lock = locks.for_container("node-1");

        let guard = lock.lock().await;
        assert!(locks.for_container("node-1").try_lock().is_err());
        drop(guard);
        assert!(locks.for_container("node-1").try_lock().is_ok());
    }
}
