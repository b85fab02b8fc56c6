//! Store Error Types
//!
//! Error types for the persistence contract. More specific business-rule
//! failures are handled by the dispatch layer.

use thiserror::Error;

/// Persistence operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced item does not exist
    #[error("Item not found: {id}")]
    ItemNotFound { id: String },

    /// Referenced container does not exist
    #[error("Container not found: {parent_id}")]
    ParentNotFound { parent_id: String },

    /// Applying a reorder diff would break sequence contiguity/uniqueness,
    /// or the diff was computed against a stale view of the container.
    ///
    /// Retriable: the caller should refetch and recompute the diff.
    #[error("Sequence conflict in container '{parent_id}': {reason}")]
    SequenceConflict { parent_id: String, reason: String },

    /// Backend unreachable or request failed in transport
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create an item not found error
    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::ItemNotFound { id: id.into() }
    }

    /// Create a parent not found error
    pub fn parent_not_found(parent_id: impl Into<String>) -> Self {
        Self::ParentNotFound {
            parent_id: parent_id.into(),
        }
    }

    /// Create a sequence conflict error
    pub fn sequence_conflict(parent_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SequenceConflict {
            parent_id: parent_id.into(),
            reason: reason.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Whether a retry with fresh data can succeed
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::SequenceConflict { .. })
    }
}
