//! Database access: schema introspection and row browsing

pub mod inspector;
pub mod rows;

pub use inspector::MySqlInspector;
pub use rows::FieldOption;
