//! Tree composition
//!
//! Pure construction of the nested tree value consumed by the renderer from
//! (a) the flat per-container caches and (b) the expand set. Recomposition
//! is always derived fresh from those inputs; nothing is patched in place,
//! so the composed tree can never retain stale nested structure across cache
//! updates.
//!
//! The crucial distinction is "children unknown" versus "children empty": a
//! container can be expanded before its parent has loaded (deep-linking), so
//! a missing cache entry composes as [`ChildrenState::Unknown`] (a loading
//! placeholder), never as an empty list.

use crate::models::Item;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Children of a composed node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "nodes", rename_all = "camelCase")]
pub enum ChildrenState {
    /// Container is collapsed; children not shown
    Collapsed,
    /// Container is expanded but its children are not loaded yet;
    /// render a loading placeholder, never an empty list
    Unknown,
    /// Container is expanded and its children are cached
    Loaded(Vec<TreeNode>),
}

impl ChildrenState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ChildrenState::Loaded(_))
    }
}

/// A composed tree node, ready for the renderer.
///
/// `item` is `None` for the root container (the curriculum itself), which is
/// not an item in anyone's sibling list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    pub is_dragging: bool,
    pub is_over: bool,
    pub children: ChildrenState,
}

/// Drag state projected into the composed tree (per-node `isDragging` /
/// `isOver` flags).
#[derive(Debug, Clone, Default)]
pub struct DragFlags {
    /// Id of the item currently being dragged, if any
    pub dragging: Option<String>,
    /// Id of the current hover target, if any
    pub over: Option<String>,
}

/// Compose the nested tree for `root_id` from the flat caches.
///
/// - `snapshot`: container id → cached ordered children
/// - `expanded`: containers the author has expanded
/// - `drag`: current drag session state for visual flags
///
/// Expanded containers missing from `snapshot` compose as
/// [`ChildrenState::Unknown`]. Collapsed containers never recurse, so a
/// fully collapsed tree composes in O(1) regardless of cache size.
pub fn compose_tree(
    root_id: &str,
    snapshot: &HashMap<String, Vec<Item>>,
    expanded: &HashSet<String>,
    drag: &DragFlags,
) -> TreeNode {
    TreeNode {
        id: root_id.to_string(),
        item: None,
        is_dragging: drag.dragging.as_deref() == Some(root_id),
        is_over: drag.over.as_deref() == Some(root_id),
        children: compose_children(root_id, snapshot, expanded, drag),
    }
}

fn compose_children(
    container_id: &str,
    snapshot: &HashMap<String, Vec<Item>>,
    expanded: &HashSet<String>,
    drag: &DragFlags,
) -> ChildrenState {
    if !expanded.contains(container_id) {
        return ChildrenState::Collapsed;
    }

    match snapshot.get(container_id) {
        None => ChildrenState::Unknown,
        Some(children) => ChildrenState::Loaded(
            children
                .iter()
                .map(|item| TreeNode {
                    id: item.id.clone(),
                    item: Some(item.clone()),
                    is_dragging: drag.dragging.as_deref() == Some(item.id.as_str()),
                    is_over: drag.over.as_deref() == Some(item.id.as_str()),
                    children: compose_children(&item.id, snapshot, expanded, drag),
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemKind;
    use serde_json::json;

    fn item(id: &str, kind: ItemKind, parent: &str, sequence: i64) -> Item {
        Item::new_with_id(
            id.to_string(),
            kind,
            format!("Item {}", id),
            parent.to_string(),
            sequence,
            json!({}),
        )
    }

    fn expanded(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_collapsed_root() {
        let tree = compose_tree(
            "curriculum-1",
            &HashMap::new(),
            &HashSet::new(),
            &DragFlags::default(),
        );

        assert_eq!(tree.id, "curriculum-1");
        assert!(tree.item.is_none());
        assert_eq!(tree.children, ChildrenState::Collapsed);
    }

    #[test]
    fn test_expanded_but_unloaded_is_unknown_not_empty() {
        let tree = compose_tree(
            "curriculum-1",
            &HashMap::new(),
            &expanded(&["curriculum-1"]),
            &DragFlags::default(),
        );

        assert_eq!(tree.children, ChildrenState::Unknown);
    }

    #[test]
    fn test_expanded_and_loaded_empty_is_loaded_empty() {
        let mut snapshot = HashMap::new();
        snapshot.insert("curriculum-1".to_string(), vec![]);

        let tree = compose_tree(
            "curriculum-1",
            &snapshot,
            &expanded(&["curriculum-1"]),
            &DragFlags::default(),
        );

        assert_eq!(tree.children, ChildrenState::Loaded(vec![]));
    }

    #[test]
    fn test_nested_composition() {
        let mut snapshot = HashMap::new();
        snapshot.insert(
            "curriculum-1".to_string(),
            vec![item("topic-1", ItemKind::Topic, "curriculum-1", 0)],
        );
        snapshot.insert(
            "topic-1".to_string(),
            vec![
                item("node-1", ItemKind::LessonNode, "topic-1", 0),
                item("node-2", ItemKind::LessonNode, "topic-1", 1),
            ],
        );

        let tree = compose_tree(
            "curriculum-1",
            &snapshot,
            &expanded(&["curriculum-1", "topic-1", "node-1"]),
            &DragFlags::default(),
        );

        let ChildrenState::Loaded(topics) = &tree.children else {
            panic!("expected loaded root children");
        };
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].id, "topic-1");

        let ChildrenState::Loaded(nodes) = &topics[0].children else {
            panic!("expected loaded topic children");
        };
        assert_eq!(nodes.len(), 2);
        // node-1 is expanded but its activities were never fetched
        assert_eq!(nodes[0].children, ChildrenState::Unknown);
        // node-2 is collapsed
        assert_eq!(nodes[1].children, ChildrenState::Collapsed);
    }

    #[test]
    fn test_deep_link_expansion_before_parent_loads() {
        // topic-1 is expanded and loaded, but the curriculum itself was
        // never fetched: the root must be Unknown, not an empty list that
        // would flash an incorrect empty state.
        let mut snapshot = HashMap::new();
        snapshot.insert(
            "topic-1".to_string(),
            vec![item("node-1", ItemKind::LessonNode, "topic-1", 0)],
        );

        let tree = compose_tree(
            "curriculum-1",
            &snapshot,
            &expanded(&["curriculum-1", "topic-1"]),
            &DragFlags::default(),
        );

        assert_eq!(tree.children, ChildrenState::Unknown);
    }

    #[test]
    fn test_drag_flags_projected() {
        let mut snapshot = HashMap::new();
        snapshot.insert(
            "node-1".to_string(),
            vec![
                item("a", ItemKind::Activity, "node-1", 0),
                item("b", ItemKind::Activity, "node-1", 1),
            ],
        );

        let drag = DragFlags {
            dragging: Some("a".to_string()),
            over: Some("b".to_string()),
        };
        let tree = compose_tree("node-1", &snapshot, &expanded(&["node-1"]), &drag);

        let ChildrenState::Loaded(children) = &tree.children else {
            panic!("expected loaded children");
        };
        assert!(children[0].is_dragging);
        assert!(!children[0].is_over);
        assert!(children[1].is_over);
        assert!(!children[1].is_dragging);
    }

    #[test]
    fn test_recomposition_reflects_cache_updates() {
        let exp = expanded(&["node-1"]);
        let mut snapshot = HashMap::new();
        snapshot.insert(
            "node-1".to_string(),
            vec![item("a", ItemKind::Activity, "node-1", 0)],
        );

        let first = compose_tree("node-1", &snapshot, &exp, &DragFlags::default());

        snapshot.insert(
            "node-1".to_string(),
            vec![
                item("b", ItemKind::Activity, "node-1", 0),
                item("a", ItemKind::Activity, "node-1", 1),
            ],
        );
        let second = compose_tree("node-1", &snapshot, &exp, &DragFlags::default());

        // Derived fresh each time: no stale nesting carried over
        let ChildrenState::Loaded(first_children) = first.children else {
            panic!()
        };
        let ChildrenState::Loaded(second_children) = second.children else {
            panic!()
        };
        assert_eq!(first_children.len(), 1);
        assert_eq!(second_children.len(), 2);
        assert_eq!(second_children[0].id, "b");
    }

    #[test]
    fn test_serialization_shape() {
        let mut snapshot = HashMap::new();
        snapshot.insert(
            "node-1".to_string(),
            vec![item("a", ItemKind::Activity, "node-1", 0)],
        );

        let tree = compose_tree(
            "node-1",
            &snapshot,
            &expanded(&["node-1"]),
            &DragFlags::default(),
        );
        let value = serde_json::to_value(&tree).unwrap();

        assert_eq!(value["children"]["state"], "loaded");
        assert_eq!(value["children"]["nodes"][0]["id"], "a");
        assert_eq!(value["children"]["nodes"][0]["isDragging"], false);
        assert_eq!(
            value["children"]["nodes"][0]["children"]["state"],
            "collapsed"
        );
    }
}
