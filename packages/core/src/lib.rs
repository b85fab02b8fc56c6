//! CourseTree Core Ordering Layer
//!
//! This crate provides the sequenced-list data model, reorder/move
//! computation, drag gesture classification, and lazy subtree loading for
//! the CourseTree curriculum authoring dashboard.
//!
//! # Architecture
//!
//! - **Dense sequence numbers**: Every container holds exactly the run
//!   `{0..n-1}`; appends, deletes, and moves keep it gap-free
//! - **Minimal diffs**: Reorders persist only the items whose position
//!   changed, never the full sibling list
//! - **Optimistic, invalidate-and-refetch**: Mutations update the cached
//!   view immediately, then invalidate so the backend's order wins
//! - **Append-only cross-container moves**: A moved item joins the end of
//!   its destination; index-accurate insertion is not supported
//!
//! # Modules
//!
//! - [`models`] - Items, sequence diffs, and update patches
//! - [`ordering`] - Pure reorder engine and move planner
//! - [`drag`] - Drag session state machine and gesture classification
//! - [`tree`] - Child cache, lazy subtree loader, and tree composition
//! - [`store`] - Persistence trait and in-memory reference backend
//! - [`dispatch`] - Mutation dispatch with optimistic apply and retry

pub mod models;
pub mod ordering;
pub mod drag;
pub mod tree;
pub mod store;
pub mod dispatch;

// Re-export commonly used types
pub use models::*;
pub use ordering::*;
pub use drag::*;
pub use dispatch::{DispatchError, DispatchEvent, MutationDispatcher};
pub use store::{InMemoryStore, ItemStore, StoreError};
pub use tree::{ChildCache, ChildrenState, SubtreeLoader, TreeNode};
