//! Drag Session Controller
//!
//! A small state machine turning raw pointer gestures into classified
//! ordering operations (no-op, same-parent reorder, cross-parent move).

pub mod session;

pub use session::{
    DragOutcome, DragSession, DragTarget, PointerPosition, DRAG_THRESHOLD,
};
