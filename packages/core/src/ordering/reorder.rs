//! Same-parent reorder engine
//!
//! Pure functions over an ordered sibling list. Given a drag gesture
//! (source item, target item) the engine produces the fully reordered
//! candidate list plus the *minimal* sparse diff of items whose sequence
//! number actually changed. The diff, not the full list, is what gets
//! persisted, so a one-slot drag in a long list stays a two-write operation.
//!
//! These functions are total over well-formed lists: unknown ids and
//! self-drops yield an unchanged order and an empty diff rather than an
//! error.

use crate::models::{Item, SequenceChange};
use std::collections::HashMap;

/// Result of a same-parent reorder computation
#[derive(Debug, Clone)]
pub struct ReorderOutcome {
    /// The fully reordered candidate list with recomputed sequence numbers
    pub order: Vec<Item>,
    /// Minimal diff: only items whose sequence number differs from the
    /// pre-drag list, aligned by id
    pub changes: Vec<SequenceChange>,
}

impl ReorderOutcome {
    /// True when the drag left every position untouched (e.g. an item
    /// dropped onto itself). No persistence call should be issued.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    /// The candidate order as a list of ids, used by the retry path to
    /// recompute a diff against a freshly fetched list.
    pub fn candidate_ids(&self) -> Vec<String> {
        self.order.iter().map(|item| item.id.clone()).collect()
    }
}

/// Reorder a sibling list after a drag of `source_id` onto `target_id`.
///
/// Array-move semantics: the source is removed from its current index and
/// reinserted at the target's index in the original list. Moving an item one
/// slot down therefore behaves as "insert after target", not "swap".
/// Sequence numbers are recomputed as the 0-based index in the resulting
/// array.
///
/// Unknown source/target ids and `source_id == target_id` produce an
/// unchanged order with an empty diff.
pub fn reorder_siblings(items: &[Item], source_id: &str, target_id: &str) -> ReorderOutcome {
    let source_index = items.iter().position(|item| item.id == source_id);
    let target_index = items.iter().position(|item| item.id == target_id);

    let mut order: Vec<Item> = items.to_vec();

    if let (Some(from), Some(to)) = (source_index, target_index) {
        if from != to {
            let dragged = order.remove(from);
            // `to` is the target's index in the original list; after the
            // removal this lands the source after the target when moving
            // down and before it when moving up.
            let insert_at = to.min(order.len());
            order.insert(insert_at, dragged);
        }
    }

    for (index, item) in order.iter_mut().enumerate() {
        item.sequence_number = index as i64;
    }

    let changes = diff_sequences(items, &order);

    ReorderOutcome { order, changes }
}

/// Compute the minimal sequence diff between a pre-drag list and a candidate
/// order, aligned by id.
///
/// An item appears in the diff only if its sequence number differs from its
/// value in `before`. Items present only in `after` (should not happen for a
/// same-parent reorder) are included with their new position.
pub fn diff_sequences(before: &[Item], after: &[Item]) -> Vec<SequenceChange> {
    let previous: HashMap<&str, i64> = before
        .iter()
        .map(|item| (item.id.as_str(), item.sequence_number))
        .collect();

    after
        .iter()
        .filter(|item| previous.get(item.id.as_str()) != Some(&item.sequence_number))
        .map(|item| SequenceChange::new(item.id.clone(), item.sequence_number))
        .collect()
}

/// Reorder an already-fetched list so its ids follow `candidate_ids`, then
/// diff against the fetched order.
///
/// Used by the conflict-retry path: the drag's intended order (as ids) is
/// replayed against a fresh authoritative fetch. Ids missing from the fresh
/// list are skipped; fresh items unknown to the candidate keep their relative
/// position at the end.
pub fn diff_against_candidate(fresh: &[Item], candidate_ids: &[String]) -> Vec<SequenceChange> {
    let mut by_id: HashMap<&str, &Item> =
        fresh.iter().map(|item| (item.id.as_str(), item)).collect();

    let mut order: Vec<Item> = Vec::with_capacity(fresh.len());
    for id in candidate_ids {
        if let Some(item) = by_id.remove(id.as_str()) {
            order.push(item.clone());
        }
    }
    // Items that appeared since the drag started go after the candidate run,
    // keeping their fetched relative order.
    let mut remainder: Vec<Item> = by_id.into_values().cloned().collect();
    remainder.sort_by_key(|item| item.sequence_number);
    order.extend(remainder);

    for (index, item) in order.iter_mut().enumerate() {
        item.sequence_number = index as i64;
    }

    diff_sequences(fresh, &order)
}

/// Apply a sparse diff to a copy of a sibling list and re-sort by sequence
/// number.
///
/// This mirrors what the backend does with a reorder payload, and is what
/// the dispatcher uses for the optimistic cache write.
pub fn apply_changes(items: &[Item], changes: &[SequenceChange]) -> Vec<Item> {
    let new_positions: HashMap<&str, i64> = changes
        .iter()
        .map(|change| (change.id.as_str(), change.sequence_number))
        .collect();

    let mut applied: Vec<Item> = items
        .iter()
        .cloned()
        .map(|mut item| {
            if let Some(&sequence) = new_positions.get(item.id.as_str()) {
                item.sequence_number = sequence;
            }
            item
        })
        .collect();

    applied.sort_by_key(|item| item.sequence_number);
    applied
}

/// Check that a sibling list's sequence numbers form exactly `{0..n-1}`.
pub fn is_contiguous(items: &[Item]) -> bool {
    let mut sequences: Vec<i64> = items.iter().map(|item| item.sequence_number).collect();
    sequences.sort_unstable();
    sequences
        .iter()
        .enumerate()
        .all(|(index, &sequence)| sequence == index as i64)
}
