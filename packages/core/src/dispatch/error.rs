//! Dispatch Error Types

use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by the mutation dispatcher
///
/// Every failure here has already been recovered locally (the affected
/// container caches are invalidated and a user-visible event is emitted
/// before the error is returned); there is no fatal class — the worst case
/// is a forced resync.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Persistence call failed
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    /// Reorder kept conflicting after the bounded retry budget
    #[error("Reorder for container '{container_id}' still conflicting after {attempts} attempt(s)")]
    RetriesExhausted {
        container_id: String,
        attempts: usize,
    },
}

impl DispatchError {
    /// Create a retries exhausted error
    pub fn retries_exhausted(container_id: impl Into<String>, attempts: usize) -> Self {
        Self::RetriesExhausted {
            container_id: container_id.into(),
            attempts,
        }
    }
}
