//! Persistence contract
//!
//! The remote store is an external collaborator reached through a
//! CRUD-style contract keyed by parent id. The trait is kind-agnostic; the
//! application instantiates one store per container kind (topics, lesson
//! nodes, activities) or one polymorphic store for all three.
//!
//! Contract obligations the engine relies on:
//!
//! - `list` returns items sorted by sequence number ascending
//! - `create` appends: the store assigns the next sequence number
//! - `reorder` applies a sparse diff and rejects results that would violate
//!   per-container contiguity or uniqueness
//! - `update` with a `parent_id` and no `sequence_number` appends to the
//!   destination and closes the origin's gap
//! - `delete` closes the sequence gap among the remaining siblings

use crate::models::{CreateItemParams, Item, ItemPatch, SequenceChange};
use crate::store::error::StoreError;
use async_trait::async_trait;

/// CRUD contract for ordered child lists.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// List a container's items, sorted by sequence number ascending.
    async fn list(&self, parent_id: &str) -> Result<Vec<Item>, StoreError>;

    /// Create an item appended to the end of its container's run.
    async fn create(&self, params: CreateItemParams) -> Result<Item, StoreError>;

    /// Apply a sparse reorder diff to a container.
    ///
    /// # Errors
    ///
    /// `SequenceConflict` if the resulting sequence set would not be exactly
    /// `{0..n-1}`; the caller should refetch and recompute.
    async fn reorder(&self, parent_id: &str, changes: &[SequenceChange]) -> Result<(), StoreError>;

    /// Partially update an item. A `parent_id` change with no
    /// `sequence_number` appends to the destination.
    async fn update(&self, item_id: &str, patch: ItemPatch) -> Result<Item, StoreError>;

    /// Delete an item; remaining siblings are resequenced store-side.
    async fn delete(&self, item_id: &str) -> Result<(), StoreError>;
}
