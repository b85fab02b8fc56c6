//! In-memory reference store
//!
//! Implements the full `ItemStore` contract over a `HashMap`, including the
//! store-side responsibilities the engine depends on: append-to-end on
//! create, contiguity validation on reorder, and gap closure on delete and
//! cross-container moves. Used by the test suites and as the executable
//! definition of the backend contract.

use crate::models::{CreateItemParams, Item, ItemPatch, SequenceChange};
use crate::store::backend::ItemStore;
use crate::store::error::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory `ItemStore` implementation.
#[derive(Default)]
pub struct InMemoryStore {
    items: RwLock<HashMap<String, Item>>,
    /// Container ids known to exist even when currently empty. Containers
    /// are created implicitly the first time an item lands in them.
    containers: RwLock<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container id so empty containers can be listed and used
    /// as move destinations.
    pub async fn register_container(&self, parent_id: impl Into<String>) {
        self.containers.write().await.insert(parent_id.into());
    }

    fn children_of(items: &HashMap<String, Item>, parent_id: &str) -> Vec<Item> {
        let mut children: Vec<Item> = items
            .values()
            .filter(|item| item.parent_id == parent_id)
            .cloned()
            .collect();
        children.sort_by_key(|item| item.sequence_number);
        children
    }

    /// Close the sequence gap in a container after a removal.
    fn resequence(items: &mut HashMap<String, Item>, parent_id: &str) {
        let mut ids: Vec<(String, i64)> = items
            .values()
            .filter(|item| item.parent_id == parent_id)
            .map(|item| (item.id.clone(), item.sequence_number))
            .collect();
        ids.sort_by_key(|(_, sequence)| *sequence);

        for (index, (id, _)) in ids.into_iter().enumerate() {
            if let Some(item) = items.get_mut(&id) {
                item.sequence_number = index as i64;
            }
        }
    }

    fn next_sequence(items: &HashMap<String, Item>, parent_id: &str) -> i64 {
        items
            .values()
            .filter(|item| item.parent_id == parent_id)
            .map(|item| item.sequence_number + 1)
            .max()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn list(&self, parent_id: &str) -> Result<Vec<Item>, StoreError> {
        let items = self.items.read().await;
        let known = self.containers.read().await.contains(parent_id);

        let children = Self::children_of(&items, parent_id);
        if children.is_empty() && !known {
            return Err(StoreError::parent_not_found(parent_id));
        }
        Ok(children)
    }

    async fn create(&self, params: CreateItemParams) -> Result<Item, StoreError> {
        let mut items = self.items.write().await;

        let sequence = Self::next_sequence(&items, &params.parent_id);
        let item = match params.id {
            Some(id) => Item::new_with_id(
                id,
                params.kind,
                params.title,
                params.parent_id.clone(),
                sequence,
                params.properties,
            ),
            None => Item::new(
                params.kind,
                params.title,
                params.parent_id.clone(),
                sequence,
                params.properties,
            ),
        };
        item.validate()
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        self.containers.write().await.insert(params.parent_id);
        items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn reorder(&self, parent_id: &str, changes: &[SequenceChange]) -> Result<(), StoreError> {
        let mut items = self.items.write().await;

        let current = Self::children_of(&items, parent_id);
        if current.is_empty() {
            return Err(StoreError::parent_not_found(parent_id));
        }

        // Validate the diff against the current run before touching anything.
        let mut sequences: HashMap<String, i64> = current
            .iter()
            .map(|item| (item.id.clone(), item.sequence_number))
            .collect();
        for change in changes {
            if !sequences.contains_key(&change.id) {
                return Err(StoreError::sequence_conflict(
                    parent_id,
                    format!("item '{}' is not a member of this container", change.id),
                ));
            }
            sequences.insert(change.id.clone(), change.sequence_number);
        }

        let mut resulting: Vec<i64> = sequences.values().copied().collect();
        resulting.sort_unstable();
        let contiguous = resulting
            .iter()
            .enumerate()
            .all(|(index, &sequence)| sequence == index as i64);
        if !contiguous {
            return Err(StoreError::sequence_conflict(
                parent_id,
                "diff would leave a gap or duplicate in the sequence run",
            ));
        }

        for change in changes {
            if let Some(item) = items.get_mut(&change.id) {
                item.sequence_number = change.sequence_number;
                item.modified_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn update(&self, item_id: &str, patch: ItemPatch) -> Result<Item, StoreError> {
        let mut items = self.items.write().await;

        let current = items
            .get(item_id)
            .cloned()
            .ok_or_else(|| StoreError::item_not_found(item_id))?;
        let origin_id = current.parent_id.clone();

        let moving = patch
            .parent_id
            .as_ref()
            .is_some_and(|destination| destination != &origin_id);

        let mut updated = current;
        if let Some(title) = patch.title {
            updated.title = title;
        }
        if let Some(properties) = patch.properties {
            updated.properties = properties;
        }
        if let Some(destination) = patch.parent_id {
            updated.parent_id = destination;
        }
        match patch.sequence_number {
            Some(sequence) => updated.sequence_number = sequence,
            // Parent changed without an explicit position: append to the
            // destination's run.
            None if moving => {
                updated.sequence_number = items
                    .values()
                    .filter(|item| item.parent_id == updated.parent_id && item.id != updated.id)
                    .map(|item| item.sequence_number + 1)
                    .max()
                    .unwrap_or(0);
            }
            None => {}
        }
        updated.modified_at = Utc::now();
        updated
            .validate()
            .map_err(|e| StoreError::unavailable(e.to_string()))?;

        self.containers
            .write()
            .await
            .insert(updated.parent_id.clone());
        items.insert(updated.id.clone(), updated.clone());

        if moving {
            Self::resequence(&mut items, &origin_id);
        }
        Ok(updated)
    }

    async fn delete(&self, item_id: &str) -> Result<(), StoreError> {
        let mut items = self.items.write().await;

        let removed = items
            .remove(item_id)
            .ok_or_else(|| StoreError::item_not_found(item_id))?;
        Self::resequence(&mut items, &removed.parent_id);
        Ok(())
    }
}
