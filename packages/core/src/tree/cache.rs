//! Per-container child cache
//!
//! A transient, client-held projection of the backend's ordered child lists,
//! keyed by container id and populated only for containers the author has
//! expanded. Not an authoritative source: any mutation affecting a container
//! ends with `invalidate(container_id)` and the next read refetches.
//!
//! # Cache contract
//!
//! - Reads trigger fetch-if-absent (enforced by the `SubtreeLoader`, which
//!   owns this cache).
//! - Writes happen through exactly three entry points: fetch completion
//!   (`store_children`), the dispatcher's optimistic apply
//!   (`apply_order` / `remove_member`), and explicit `invalidate`.
//!   The reorder engine and move reconciler never write here.
//! - A TTL bounds reuse of cached lists on re-expand; optimistic entries
//!   are never considered fresh, so the post-mutation refetch always wins.
//!
//! Subscribers (the rendering layer) observe changes through a broadcast
//! channel of [`CacheEvent`]s.

use crate::models::Item;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, RwLock};

/// Broadcast channel capacity for cache events.
///
/// 128 gives headroom for bursts (bulk invalidation after a move touching
/// two containers plus the refetches) while keeping memory bounded.
/// Subscriber lag is acceptable: the tree is recomposed from the cache on
/// every event, not replayed from history.
const CACHE_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Events emitted when the cache changes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CacheEvent {
    /// A container's children were (re)loaded from the backend
    #[serde(rename_all = "camelCase")]
    ContainerLoaded { container_id: String },

    /// A container's cached children were invalidated
    #[serde(rename_all = "camelCase")]
    ContainerInvalidated { container_id: String },
}

#[derive(Debug, Clone)]
struct CacheEntry {
    children: Vec<Item>,
    loaded_at: Instant,
    /// Set by the dispatcher's optimistic writes; never treated as fresh
    optimistic: bool,
}

/// Shared per-container child cache.
///
/// Cheap to clone; clones share the same underlying map and event channel.
#[derive(Clone)]
pub struct ChildCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    events: broadcast::Sender<CacheEvent>,
    ttl: Duration,
}

impl Default for ChildCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ChildCache {
    /// Create a cache with the default 60 second TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(60))
    }

    /// Create a cache with a custom TTL (primarily for testing).
    pub fn with_ttl(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(CACHE_EVENT_CHANNEL_CAPACITY);
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            events,
            ttl,
        }
    }

    /// Subscribe to cache change events.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Cached children if present and fresh (non-optimistic and within TTL).
    pub async fn get_fresh(&self, container_id: &str) -> Option<Vec<Item>> {
        let entries = self.entries.read().await;
        entries.get(container_id).and_then(|entry| {
            if !entry.optimistic && entry.loaded_at.elapsed() <= self.ttl {
                Some(entry.children.clone())
            } else {
                None
            }
        })
    }

    /// Cached children regardless of freshness, for tree composition.
    /// Optimistic entries are visible here so the UI reflects a drag
    /// immediately while the write is in flight.
    pub async fn peek(&self, container_id: &str) -> Option<Vec<Item>> {
        let entries = self.entries.read().await;
        entries
            .get(container_id)
            .map(|entry| entry.children.clone())
    }

    /// Snapshot of every cached container, for tree composition.
    pub async fn snapshot(&self) -> HashMap<String, Vec<Item>> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.children.clone()))
            .collect()
    }

    /// Fetch-completion entry point: store an authoritative child list.
    pub async fn store_children(&self, container_id: &str, children: Vec<Item>) {
        {
            let mut entries = self.entries.write().await;
            entries.insert(
                container_id.to_string(),
                CacheEntry {
                    children,
                    loaded_at: Instant::now(),
                    optimistic: false,
                },
            );
        }
        let _ = self.events.send(CacheEvent::ContainerLoaded {
            container_id: container_id.to_string(),
        });
    }

    /// Dispatcher entry point: optimistically replace a container's order
    /// ahead of the persistence round-trip. No-op if the container was
    /// never loaded.
    pub async fn apply_order(&self, container_id: &str, order: Vec<Item>) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(container_id) {
            entry.children = order;
            entry.optimistic = true;
        }
    }

    /// Dispatcher entry point: optimistically drop a member from its origin
    /// container during a cross-parent move, closing the visual gap.
    pub async fn remove_member(&self, container_id: &str, item_id: &str) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(container_id) {
            entry.children.retain(|item| item.id != item_id);
            for (index, item) in entry.children.iter_mut().enumerate() {
                item.sequence_number = index as i64;
            }
            entry.optimistic = true;
        }
    }

    /// Drop a container's cached children; the next read refetches.
    pub async fn invalidate(&self, container_id: &str) {
        let removed = {
            let mut entries = self.entries.write().await;
            entries.remove(container_id).is_some()
        };
        if removed {
            let _ = self.events.send(CacheEvent::ContainerInvalidated {
                container_id: container_id.to_string(),
            });
        }
    }

    /// Cache statistics (for debugging/monitoring)
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        CacheStats {
            containers: entries.len(),
            total_items: entries.values().map(|entry| entry.children.len()).sum(),
            optimistic_containers: entries.values().filter(|entry| entry.optimistic).count(),
        }
    }
}

/// Statistics about the child cache
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of containers with a cached child list
    pub containers: usize,
    /// Total cached items across containers
    pub total_items: usize,
    /// Containers currently holding an optimistic (unconfirmed) list
    pub optimistic_containers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;
    use serde_json::json;

    fn activity(id: &str, parent: &str, sequence: i64) -> Item {
        Item::new_with_id(
            id.to_string(),
            ItemKind::Activity,
            format!("Activity {}", id),
            parent.to_string(),
            sequence,
            json!({}),
        )
    }

    #[tokio::test]
    async fn test_store_and_get_fresh() {
        let cache = ChildCache::new();
        cache
            .store_children("node-1", vec![activity("a", "node-1", 0)])
            .await;

        let children = cache.get_fresh("node-1").await.unwrap();
        assert_eq!(children.len(), 1);
        assert!(cache.get_fresh("node-2").await.is_none());
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache = ChildCache::with_ttl(Duration::from_millis(0));
        cache
            .store_children("node-1", vec![activity("a", "node-1", 0)])
            .await;

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get_fresh("node-1").await.is_none());
        // Still visible for composition
        assert!(cache.peek("node-1").await.is_some());
    }

    #[tokio::test]
    async fn test_optimistic_entries_are_not_fresh() {
        let cache = ChildCache::new();
        cache
            .store_children("node-1", vec![activity("a", "node-1", 0)])
            .await;
        cache
            .apply_order("node-1", vec![activity("a", "node-1", 0)])
            .await;

        assert!(cache.get_fresh("node-1").await.is_none());
        assert!(cache.peek("node-1").await.is_some());
        assert_eq!(cache.stats().await.optimistic_containers, 1);
    }

    #[tokio::test]
    async fn test_apply_order_requires_loaded_entry() {
        let cache = ChildCache::new();
        cache
            .apply_order("never-loaded", vec![activity("a", "never-loaded", 0)])
            .await;
        assert!(cache.peek("never-loaded").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_member_closes_visual_gap() {
        let cache = ChildCache::new();
        cache
            .store_children(
                "node-1",
                vec![
                    activity("a", "node-1", 0),
                    activity("b", "node-1", 1),
                    activity("c", "node-1", 2),
                ],
            )
            .await;

        cache.remove_member("node-1", "b").await;

        let children = cache.peek("node-1").await.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].id, "a");
        assert_eq!(children[0].sequence_number, 0);
        assert_eq!(children[1].id, "c");
        assert_eq!(children[1].sequence_number, 1);
    }

    #[tokio::test]
    async fn test_invalidate_emits_event() {
        let cache = ChildCache::new();
        let mut events = cache.subscribe();

        cache
            .store_children("node-1", vec![activity("a", "node-1", 0)])
            .await;
        cache.invalidate("node-1").await;

        assert!(matches!(
            events.recv().await.unwrap(),
            CacheEvent::ContainerLoaded { .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            CacheEvent::ContainerInvalidated { container_id } if container_id == "node-1"
        ));
        assert!(cache.peek("node-1").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_unknown_container_is_silent() {
        let cache = ChildCache::new();
        let mut events = cache.subscribe();

        cache.invalidate("ghost").await;

        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
