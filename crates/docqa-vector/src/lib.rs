//! docqa-vector
//!
//! `index` holds the in-memory nearest-neighbour index a session queries.
//! `store` persists built indexes as LanceDB tables so the CLI can build in
//! one process and query in another.

pub mod index;
pub mod schema;
pub mod store;
pub mod table;

pub use index::VectorIndex;
pub use store::{IndexStore, StoredIndex};
