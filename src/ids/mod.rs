//! Sortable identifier generation and encoding.

pub mod generator;
pub mod sortable_id;

pub use generator::IdGenerator;
pub use sortable_id::{ParseSortableIdError, SortableId};
