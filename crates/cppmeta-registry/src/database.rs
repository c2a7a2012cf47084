//! The mapping database interface.
//!
//! The builder only ever sees a `&dyn MappingDatabase`. Embedders back it
//! with whatever reads their type-system files; [`TypeDatabase`] is the
//! in-memory implementation shipped with this crate.
//!
//! [`TypeDatabase`]: crate::TypeDatabase

use std::sync::Arc;

use cppmeta_core::{TypeEntry, TypeEntryKind};

use crate::FunctionModification;

/// Read-only queries the builder makes against the type system.
///
/// Only [`find_type`](Self::find_type) and the rejection/modification
/// queries are required; the kind-filtered lookups have default
/// implementations on top of `find_type`.
pub trait MappingDatabase {
    /// Entry with this fully qualified name.
    fn find_type(&self, name: &str) -> Option<Arc<TypeEntry>>;

    /// Value, object, namespace or global entry.
    fn find_complex_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.find_type(name).filter(|e| e.is_complex())
    }

    fn find_flags_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.find_type(name).filter(|e| e.is_flags())
    }

    fn find_container_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.find_type(name).filter(|e| e.is_container())
    }

    fn find_pointer_container_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.find_type(name).filter(|e| e.is_pointer_container())
    }

    fn find_functional_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.find_type(name).filter(|e| e.is_functional())
    }

    /// Target expression of a type-system alias.
    fn find_alias(&self, name: &str) -> Option<String> {
        match self.find_type(name)?.kind {
            TypeEntryKind::Alias { ref target } => Some(target.clone()),
            _ => None,
        }
    }

    fn is_class_rejected(&self, class: &str) -> bool;

    /// `function` is either a bare name or a minimal signature.
    fn is_function_rejected(&self, class: &str, function: &str) -> bool;

    fn is_field_rejected(&self, class: &str, field: &str) -> bool;

    fn is_enum_rejected(&self, class: &str, enum_name: &str) -> bool;

    /// Modifications matching a minimal signature in a class, in
    /// declaration order.
    fn function_modifications(&self, class: &str, signature: &str) -> Vec<FunctionModification>;

    /// Explicit instantiation requests (argument type lists) for a function
    /// template.
    fn function_instantiations(&self, class: &str, function: &str) -> Vec<Vec<String>>;

    /// Whether a free function belongs on the global class.
    fn accepts_global_function(&self, name: &str) -> bool;
}
