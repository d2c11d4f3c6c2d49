//! Document persistence boundary.
//!
//! Services read a whole document, decide, and replace it. The trait makes no
//! storage assumptions; the in-memory collection backs tests and development.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryCollection;
pub use r#trait::{
    Collection, Document, Filter, ReplaceOptions, ReplaceOutcome, StoreError, by_id,
};
