//! Cross-container move reconciliation
//!
//! Planning half of a cross-parent drag: an item dropped into a different
//! container keeps nothing of its old position. The plan reassigns the
//! parent reference and deliberately leaves the sequence number to the
//! destination (append semantics), because the client may never have loaded
//! the destination's current run.
//!
//! Index-accurate cross-parent insertion is intentionally unsupported.

use crate::models::{Item, ItemPatch};

/// A planned cross-container move, ready for the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    /// The item being relocated (payload snapshot from the drag session)
    pub item: Item,
    /// Container the item is leaving
    pub origin_id: String,
    /// Container the item is joining
    pub destination_id: String,
}

impl MovePlan {
    /// The sparse update to persist: new parent, no sequence number.
    ///
    /// Omitting the sequence number tells the backend to append at the end
    /// of the destination's run.
    pub fn into_patch(self) -> ItemPatch {
        ItemPatch::new().with_parent_id(self.destination_id)
    }
}

/// Plan a move of `item` into `destination_id`.
///
/// Returns `None` when the destination is the item's current container.
/// This guards against redundant writes when a drag ends over the item's
/// own container header.
pub fn plan_move(item: &Item, destination_id: &str) -> Option<MovePlan> {
    if item.parent_id == destination_id {
        return None;
    }

    Some(MovePlan {
        item: item.clone(),
        origin_id: item.parent_id.clone(),
        destination_id: destination_id.to_string(),
    })
}
