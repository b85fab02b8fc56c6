//! Subtree Loader / Tree Composer
//!
//! Lazy, per-container child caching driven by expand/collapse, and pure
//! composition of the flat caches into the nested tree the renderer
//! consumes.

pub mod cache;
pub mod compose;
pub mod loader;

pub use cache::{CacheEvent, CacheStats, ChildCache};
pub use compose::{compose_tree, ChildrenState, DragFlags, TreeNode};
pub use loader::SubtreeLoader;
