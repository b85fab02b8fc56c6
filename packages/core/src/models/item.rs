//! Item Data Structures
//!
//! This module defines the sequenced-list data contract used by the ordering
//! engine: every item belongs to exactly one container (its `parent_id`) and
//! carries an integer `sequence_number` that defines its position among
//! siblings.
//!
//! # Invariants
//!
//! - Sequence numbers are 0-based, unique, and contiguous per container after
//!   any completed mutation.
//! - An item belongs to exactly one container at a time; a cross-container
//!   move changes `parent_id` and receives a new sequence number assigned by
//!   the destination.
//! - Ordering never depends on creation time, only on `sequence_number`.
//!
//! # Examples
//!
//! ```rust
//! use coursetree_core::models::{Item, ItemKind};
//! use serde_json::json;
//!
//! // An activity owned by a lesson node, appended at position 0
//! let activity = Item::new(
//!     ItemKind::Activity,
//!     "Warm-up quiz".to_string(),
//!     "node-123".to_string(),
//!     0,
//!     json!({ "activityType": "multipleChoice" }),
//! );
//! assert_eq!(activity.sequence_number, 0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for Item operations
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid sequence number: {0}")]
    InvalidSequence(i64),

    #[error("Properties validation failed: {0}")]
    InvalidProperties(String),
}

/// Kind of child record a container owns.
///
/// The hierarchy is fixed: a curriculum owns topics, a topic owns lesson
/// nodes, a lesson node owns activities. Drop targets only accept items of
/// the kind they own, so the kind participates in drag classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    /// Topic under a curriculum
    Topic,
    /// Lesson node under a topic
    LessonNode,
    /// Activity under a lesson node
    Activity,
}

impl ItemKind {
    /// Human-readable label, used in log lines and failure notifications
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Topic => "topic",
            ItemKind::LessonNode => "lesson node",
            ItemKind::Activity => "activity",
        }
    }
}

/// A single ordered child record (topic, lesson node, or activity).
///
/// Kind-specific payload (instruction text, activity configuration) lives in
/// `properties` and is opaque to the ordering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier, stable across moves
    pub id: String,

    /// Child kind (topic, lesson node, activity)
    pub kind: ItemKind,

    /// Display title
    pub title: String,

    /// Id of the container currently owning this item
    pub parent_id: String,

    /// 0-based position among siblings sharing the same `parent_id`
    pub sequence_number: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,

    /// Kind-specific payload, opaque to the ordering engine
    pub properties: serde_json::Value,
}

impl Item {
    /// Create a new Item with an auto-generated UUID
    pub fn new(
        kind: ItemKind,
        title: String,
        parent_id: String,
        sequence_number: i64,
        properties: serde_json::Value,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            title,
            parent_id,
            sequence_number,
            created_at: now,
            modified_at: now,
            properties,
        }
    }

    /// Create a new Item with a caller-provided id
    ///
    /// The authoring frontend pre-generates UUIDs so optimistic UI state can
    /// track items before the create round-trip resolves.
    pub fn new_with_id(
        id: String,
        kind: ItemKind,
        title: String,
        parent_id: String,
        sequence_number: i64,
        properties: serde_json::Value,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            kind,
            title,
            parent_id,
            sequence_number,
            created_at: now,
            modified_at: now,
            properties,
        }
    }

    /// Validate item structure and required fields
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id` or `parent_id` is empty
    /// - `sequence_number` is negative
    /// - `properties` is not a JSON object
    /// - the item references itself as parent
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if self.parent_id.is_empty() {
            return Err(ValidationError::MissingField("parent_id".to_string()));
        }

        if self.sequence_number < 0 {
            return Err(ValidationError::InvalidSequence(self.sequence_number));
        }

        if !self.properties.is_object() {
            return Err(ValidationError::InvalidProperties(
                "properties must be a JSON object".to_string(),
            ));
        }

        if self.parent_id == self.id {
            return Err(ValidationError::InvalidParent(
                "Item cannot be its own parent".to_string(),
            ));
        }

        Ok(())
    }

    /// Update the item's title
    pub fn set_title(&mut self, title: String) {
        self.title = title;
        self.modified_at = Utc::now();
    }

    /// Update the item's payload
    pub fn set_properties(&mut self, properties: serde_json::Value) {
        self.properties = properties;
        self.modified_at = Utc::now();
    }
}

/// A single element of a reorder diff: the item whose sequence number changed
/// and its new value.
///
/// The reorder engine emits the minimal set of these; items whose position is
/// unaffected by a drag never appear in the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceChange {
    /// Id of the item whose position changed
    pub id: String,
    /// New 0-based sequence number
    pub sequence_number: i64,
}

impl SequenceChange {
    pub fn new(id: impl Into<String>, sequence_number: i64) -> Self {
        Self {
            id: id.into(),
            sequence_number,
        }
    }
}

/// Partial item update for PATCH-style operations
///
/// All fields are optional; only provided fields are applied. A cross-parent
/// move sets `parent_id` and deliberately omits `sequence_number` so the
/// destination assigns an append position (the client may not hold a fresh
/// view of the destination's current run).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    /// Update the display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Reassign the owning container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Explicit new position; omitted together with a `parent_id` change
    /// means "append to destination"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<i64>,

    /// Replace the kind-specific payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

impl ItemPatch {
    /// Create a new empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a title update
    pub fn with_title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    /// Set a parent reassignment (cross-container move)
    pub fn with_parent_id(mut self, parent_id: String) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set an explicit sequence number
    pub fn with_sequence_number(mut self, sequence_number: i64) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }

    /// Set a payload replacement
    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Check if the patch contains any changes
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.parent_id.is_none()
            && self.sequence_number.is_none()
            && self.properties.is_none()
    }
}

/// Parameters for creating an item
///
/// The `id` field is optional: the authoring frontend pre-generates UUIDs
/// for optimistic tracking, while server-side callers leave it `None` and
/// receive a generated id. The store always assigns the sequence number
/// (append-to-end semantics).
#[derive(Debug, Clone)]
pub struct CreateItemParams {
    /// Optional caller-provided id; auto-generated when `None`
    pub id: Option<String>,
    /// Child kind
    pub kind: ItemKind,
    /// Display title
    pub title: String,
    /// Owning container id
    pub parent_id: String,
    /// Kind-specific payload as JSON
    pub properties: serde_json::Value,
}
