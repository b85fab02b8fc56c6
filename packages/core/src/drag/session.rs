//! Drag session state machine
//!
//! Wraps raw pointer gestures into three high-level events — start, hover,
//! end — and classifies the end event into no-op, same-parent reorder, or
//! cross-parent move.
//!
//! Rows are also clickable for selection, so a press does not start a drag
//! by itself: the session arms on press and only promotes to dragging once
//! pointer movement exceeds [`DRAG_THRESHOLD`]. The dragged item's full
//! payload is snapshotted at press time because the origin container may be
//! unmounted by the time the drag ends.
//!
//! `end` always clears the session, whatever the classification, so the UI
//! can never get stuck mid-drag on a failed drop.

use crate::models::{Item, ItemKind};
use serde::{Deserialize, Serialize};

/// Minimum pointer travel (in logical pixels) before a press becomes a drag.
///
/// Below this, the gesture is treated as a click/selection, not a drag.
pub const DRAG_THRESHOLD: f32 = 4.0;

/// A pointer position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance_to(&self, other: &PointerPosition) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// What the pointer is currently over (or released over).
///
/// The renderer registers drop targets, so it knows each target item's
/// parent and each container's accepted child kind; the session only
/// classifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DragTarget {
    /// A sibling (or foreign) item row
    #[serde(rename_all = "camelCase")]
    Item {
        id: String,
        parent_id: String,
        kind: ItemKind,
    },
    /// A container header / drop zone
    #[serde(rename_all = "camelCase")]
    Container { id: String, accepts: ItemKind },
}

impl DragTarget {
    fn id(&self) -> &str {
        match self {
            DragTarget::Item { id, .. } => id,
            DragTarget::Container { id, .. } => id,
        }
    }
}

/// Classified result of a completed drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Nothing to do: no target, invalid target, or redundant drop
    None,
    /// Same-parent reorder; feed to the reorder engine
    Reorder {
        container_id: String,
        source_id: String,
        target_id: String,
    },
    /// Cross-parent move with append semantics; feed to `plan_move`
    Move { item: Item, destination_id: String },
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    /// Pressed but not yet past the movement threshold
    Armed {
        item: Item,
        pressed_at: PointerPosition,
    },
    Dragging {
        item: Item,
        hover: Option<DragTarget>,
    },
}

/// The drag session controller.
///
/// One instance per authoring view; single-threaded, mutated only from the
/// UI event loop.
#[derive(Debug)]
pub struct DragSession {
    state: State,
    threshold: f32,
}

impl Default for DragSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            threshold: DRAG_THRESHOLD,
        }
    }

    /// Session with a custom activation threshold (primarily for testing).
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            state: State::Idle,
            threshold,
        }
    }

    /// Pointer pressed on an item row. Arms the session; the drag starts
    /// only once the pointer travels past the threshold.
    pub fn press(&mut self, item: Item, at: PointerPosition) {
        self.state = State::Armed {
            item,
            pressed_at: at,
        };
    }

    /// Pointer moved. Promotes an armed session to dragging when movement
    /// exceeds the threshold. Returns `true` if a drag is now active.
    pub fn pointer_moved(&mut self, at: PointerPosition) -> bool {
        if let State::Armed { item, pressed_at } = &self.state {
            if pressed_at.distance_to(&at) > self.threshold {
                tracing::debug!(item_id = %item.id, "drag started");
                self.state = State::Dragging {
                    item: item.clone(),
                    hover: None,
                };
            }
        }
        self.is_dragging()
    }

    /// Pointer entered a candidate drop target. Pure hover bookkeeping for
    /// visual feedback; no effect on data.
    pub fn over(&mut self, target: DragTarget) {
        if let State::Dragging { hover, .. } = &mut self.state {
            *hover = Some(target);
        }
    }

    /// Pointer left the current candidate target.
    pub fn leave(&mut self) {
        if let State::Dragging { hover, .. } = &mut self.state {
            *hover = None;
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, State::Dragging { .. })
    }

    /// The item snapshotted at press time, while a drag is active.
    pub fn dragged_item(&self) -> Option<&Item> {
        match &self.state {
            State::Dragging { item, .. } => Some(item),
            _ => None,
        }
    }

    /// Id of the current hover target, while a drag is active.
    pub fn hover_target_id(&self) -> Option<&str> {
        match &self.state {
            State::Dragging {
                hover: Some(target),
                ..
            } => Some(target.id()),
            _ => None,
        }
    }

    /// Whether `target_id` is the current hover target (drives `isOver`).
    pub fn is_over(&self, target_id: &str) -> bool {
        match &self.state {
            State::Dragging {
                hover: Some(target),
                ..
            } => target.id() == target_id,
            _ => false,
        }
    }

    /// Pointer released. Classifies the gesture and always resets to idle.
    pub fn end(&mut self, target: Option<DragTarget>) -> DragOutcome {
        let state = std::mem::replace(&mut self.state, State::Idle);

        let item = match state {
            State::Dragging { item, .. } => item,
            // A press that never crossed the threshold is a click, and an
            // end without a press is spurious; both are no-ops.
            State::Armed { .. } | State::Idle => return DragOutcome::None,
        };

        let Some(target) = target else {
            return DragOutcome::None;
        };

        match target {
            DragTarget::Item {
                id,
                parent_id,
                kind,
            } => {
                if kind != item.kind {
                    // Mixed-kind drops are invalid targets, discarded
                    // silently.
                    return DragOutcome::None;
                }
                if parent_id == item.parent_id {
                    DragOutcome::Reorder {
                        container_id: parent_id,
                        source_id: item.id.clone(),
                        target_id: id,
                    }
                } else {
                    // Dropping on a foreign sibling relocates into that
                    // sibling's container (append; see DESIGN.md).
                    DragOutcome::Move {
                        item,
                        destination_id: parent_id,
                    }
                }
            }
            DragTarget::Container { id, accepts } => {
                if accepts != item.kind || id == item.parent_id {
                    return DragOutcome::None;
                }
                DragOutcome::Move {
                    item,
                    destination_id: id,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activity(id: &str, parent: &str) -> Item {
        Item::new_with_id(
            id.to_string(),
            ItemKind::Activity,
            format!("Activity {}", id),
            parent.to_string(),
            0,
            json!({}),
        )
    }

    fn item_target(id: &str, parent: &str) -> DragTarget {
        DragTarget::Item {
            id: id.to_string(),
            parent_id: parent.to_string(),
            kind: ItemKind::Activity,
        }
    }

    fn start_drag(session: &mut DragSession, item: Item) {
        session.press(item, PointerPosition::new(0.0, 0.0));
        assert!(session.pointer_moved(PointerPosition::new(10.0, 0.0)));
    }

    #[test]
    fn test_press_below_threshold_is_not_a_drag() {
        let mut session = DragSession::new();
        session.press(activity("x", "node-a"), PointerPosition::new(0.0, 0.0));

        assert!(!session.pointer_moved(PointerPosition::new(1.0, 1.0)));
        assert!(!session.is_dragging());

        // Releasing a tap classifies as a no-op even over a valid target.
        let outcome = session.end(Some(item_target("y", "node-a")));
        assert_eq!(outcome, DragOutcome::None);
    }

    #[test]
    fn test_threshold_crossing_starts_drag() {
        let mut session = DragSession::new();
        session.press(activity("x", "node-a"), PointerPosition::new(0.0, 0.0));

        assert!(session.pointer_moved(PointerPosition::new(0.0, 8.0)));
        assert!(session.is_dragging());
        assert_eq!(session.dragged_item().unwrap().id, "x");
    }

    #[test]
    fn test_over_is_bookkeeping_only() {
        let mut session = DragSession::new();
        start_drag(&mut session, activity("x", "node-a"));

        session.over(item_target("y", "node-a"));
        assert!(session.is_over("y"));
        assert!(!session.is_over("z"));

        session.leave();
        assert!(!session.is_over("y"));
    }

    #[test]
    fn test_end_without_target_is_noop_and_clears() {
        let mut session = DragSession::new();
        start_drag(&mut session, activity("x", "node-a"));

        assert_eq!(session.end(None), DragOutcome::None);
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_same_parent_drop_classifies_as_reorder() {
        let mut session = DragSession::new();
        start_drag(&mut session, activity("x", "node-a"));

        let outcome = session.end(Some(item_target("y", "node-a")));
        assert_eq!(
            outcome,
            DragOutcome::Reorder {
                container_id: "node-a".to_string(),
                source_id: "x".to_string(),
                target_id: "y".to_string(),
            }
        );
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_foreign_sibling_drop_classifies_as_move() {
        let mut session = DragSession::new();
        start_drag(&mut session, activity("x", "node-a"));

        let outcome = session.end(Some(item_target("y", "node-b")));
        match outcome {
            DragOutcome::Move {
                item,
                destination_id,
            } => {
                assert_eq!(item.id, "x");
                assert_eq!(destination_id, "node-b");
            }
            other => panic!("expected Move, got {:?}", other),
        }
    }

    #[test]
    fn test_container_drop_classifies_as_move() {
        let mut session = DragSession::new();
        start_drag(&mut session, activity("x", "node-a"));

        let outcome = session.end(Some(DragTarget::Container {
            id: "node-b".to_string(),
            accepts: ItemKind::Activity,
        }));
        match outcome {
            DragOutcome::Move { destination_id, .. } => assert_eq!(destination_id, "node-b"),
            other => panic!("expected Move, got {:?}", other),
        }
    }

    #[test]
    fn test_own_container_drop_is_noop() {
        let mut session = DragSession::new();
        start_drag(&mut session, activity("x", "node-a"));

        let outcome = session.end(Some(DragTarget::Container {
            id: "node-a".to_string(),
            accepts: ItemKind::Activity,
        }));
        assert_eq!(outcome, DragOutcome::None);
    }

    #[test]
    fn test_kind_mismatch_is_noop() {
        let mut session = DragSession::new();
        start_drag(&mut session, activity("x", "node-a"));

        // An activity dropped on a topic container is silently discarded.
        let outcome = session.end(Some(DragTarget::Container {
            id: "curriculum-1".to_string(),
            accepts: ItemKind::Topic,
        }));
        assert_eq!(outcome, DragOutcome::None);

        start_drag(&mut session, activity("x", "node-a"));
        let outcome = session.end(Some(DragTarget::Item {
            id: "topic-1".to_string(),
            parent_id: "curriculum-1".to_string(),
            kind: ItemKind::Topic,
        }));
        assert_eq!(outcome, DragOutcome::None);
    }

    #[test]
    fn test_end_always_clears_state() {
        let mut session = DragSession::new();

        // Cleared after a classified drop
        start_drag(&mut session, activity("x", "node-a"));
        session.end(Some(item_target("y", "node-a")));
        assert!(!session.is_dragging());
        assert!(session.dragged_item().is_none());

        // Cleared after an invalid drop
        start_drag(&mut session, activity("x", "node-a"));
        session.end(Some(DragTarget::Container {
            id: "curriculum-1".to_string(),
            accepts: ItemKind::Topic,
        }));
        assert!(!session.is_dragging());
    }

    #[test]
    fn test_payload_snapshot_survives_origin_changes() {
        // The classification uses the payload captured at press time, not
        // whatever the origin list looks like at drop time.
        let mut session = DragSession::new();
        let item = activity("x", "node-a");
        start_drag(&mut session, item.clone());

        let outcome = session.end(Some(DragTarget::Container {
            id: "node-b".to_string(),
            accepts: ItemKind::Activity,
        }));
        match outcome {
            DragOutcome::Move { item: moved, .. } => {
                assert_eq!(moved, item);
            }
            other => panic!("expected Move, got {:?}", other),
        }
    }
}
