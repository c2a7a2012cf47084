//! cppmeta mapping database.
//!
//! This crate defines [`MappingDatabase`], the interface the builder uses to
//! query type-system rules, and [`TypeDatabase`], an in-memory
//! implementation.

mod database;
mod modification;
mod type_database;

pub use database::MappingDatabase;
pub use modification::{FunctionModification, ModificationKind};
pub use type_database::{BUILTIN_PRIMITIVES, TypeDatabase};
