pub mod decl;
pub mod error;
pub mod leaf;
pub mod registry;
pub mod sync_type;
pub mod type_schema;
pub mod value;
