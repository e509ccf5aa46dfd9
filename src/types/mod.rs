//! Leaf value and metadata types: storage type tags, field descriptors, and
//! the closed domain value set.

pub mod data_type;
pub mod field;
pub mod value;

pub use data_type::DataType;
pub use field::{FieldDescriptor, FieldFlag, FieldFlags, FieldType};
pub use value::Value;
