//! Mutation dispatch
//!
//! Bridges the pure ordering computations to the persistence layer:
//! optimistic cache writes, per-container serialization, conflict retry,
//! and invalidate-and-refetch reconciliation.

pub mod dispatcher;
pub mod error;
pub mod queue;

pub use dispatcher::{DispatchEvent, MutationDispatcher};
pub use error::DispatchError;
pub use queue::ContainerLocks;
