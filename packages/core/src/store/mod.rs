//! Store Layer
//!
//! The persistence backend is an external collaborator reached through the
//! kind-agnostic [`ItemStore`] CRUD contract. [`InMemoryStore`] is the
//! reference implementation used by the test suites; it encodes the
//! store-side obligations (append on create, contiguity enforcement on
//! reorder, gap closure on delete/move) the rest of the crate relies on.

mod backend;
mod error;
mod memory;

pub use backend::ItemStore;
pub use error::StoreError;
pub use memory::InMemoryStore;
