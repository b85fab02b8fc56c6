//! Data Model
//!
//! The sequenced-list contract shared by every layer: ordered items, sparse
//! sequence diffs, and partial update patches.

pub mod item;

pub use item::{CreateItemParams, Item, ItemKind, ItemPatch, SequenceChange, ValidationError};
