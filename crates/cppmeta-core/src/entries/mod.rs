//! Mapping database entry types.
//!
//! - [`TypeEntry`] - one C++ type as known to the mapping database
//! - [`TypeEntryKind`] - tagged kind with kind-specific metadata
//! - [`ContainerKind`], [`PointerContainerKind`] - container shapes

mod container;
mod type_entry;

pub use container::{ContainerKind, PointerContainerKind};
pub use type_entry::{CodeGeneration, TypeEntry, TypeEntryKind};
