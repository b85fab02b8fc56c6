//! Subtree loader
//!
//! Drives lazy loading of the tree: children are fetched per container when
//! the author expands a branch, never eagerly for the whole curriculum.
//! Collapse keeps the expand bookkeeping honest but does not evict cached
//! children; whether a re-expand refetches is decided by the cache's TTL.

use crate::drag::DragSession;
use crate::models::Item;
use crate::store::{ItemStore, StoreError};
use crate::tree::cache::ChildCache;
use crate::tree::compose::{compose_tree, DragFlags, TreeNode};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maintains the expand set and the lazily populated child cache.
pub struct SubtreeLoader {
    store: Arc<dyn ItemStore>,
    cache: ChildCache,
    expanded: RwLock<HashSet<String>>,
}

impl SubtreeLoader {
    pub fn new(store: Arc<dyn ItemStore>, cache: ChildCache) -> Self {
        Self {
            store,
            cache,
            expanded: RwLock::new(HashSet::new()),
        }
    }

    /// The shared cache (the dispatcher holds a clone of the same cache).
    pub fn cache(&self) -> &ChildCache {
        &self.cache
    }

    /// Expand a container and fetch its children if absent or stale.
    pub async fn toggle_expand(&self, container_id: &str) -> Result<Vec<Item>, StoreError> {
        {
            let mut expanded = self.expanded.write().await;
            expanded.insert(container_id.to_string());
        }
        self.ensure_loaded(container_id).await
    }

    /// Collapse a container. Cached children are retained; a later
    /// re-expand reuses them if still within the cache TTL.
    pub async fn toggle_collapse(&self, container_id: &str) {
        let mut expanded = self.expanded.write().await;
        expanded.remove(container_id);
    }

    pub async fn is_expanded(&self, container_id: &str) -> bool {
        self.expanded.read().await.contains(container_id)
    }

    /// Fetch-if-absent: return fresh cached children or load from the store.
    pub async fn ensure_loaded(&self, container_id: &str) -> Result<Vec<Item>, StoreError> {
        if let Some(children) = self.cache.get_fresh(container_id).await {
            return Ok(children);
        }

        tracing::debug!(container_id, "loading children");
        let children = self.store.list(container_id).await?;
        self.cache.store_children(container_id, children.clone()).await;
        Ok(children)
    }

    /// Compose the renderer-facing tree for `root_id` from the current
    /// caches, expand set, and drag session.
    pub async fn compose(&self, root_id: &str, session: &DragSession) -> TreeNode {
        let snapshot = self.cache.snapshot().await;
        let expanded = self.expanded.read().await.clone();
        let drag = DragFlags {
            dragging: session.dragged_item().map(|item| item.id.clone()),
            over: session.hover_target_id().map(str::to_string),
        };
        compose_tree(root_id, &snapshot, &expanded, &drag)
    }
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;
