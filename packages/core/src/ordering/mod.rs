//! Ordering Engine
//!
//! Pure computations over sibling lists: the same-parent reorder engine and
//! the cross-container move reconciler. Nothing here touches the cache or
//! the store; these functions produce diffs and plans for the dispatcher.

pub mod move_plan;
pub mod reorder;

pub use move_plan::{plan_move, MovePlan};
pub use reorder::{
    apply_changes, diff_against_candidate, diff_sequences, is_contiguous, reorder_siblings,
    ReorderOutcome,
};
