//! TypeDatabase - in-memory mapping database.
//!
//! # Storage Model
//!
//! - **Entries**: one `Arc<TypeEntry>` per qualified name; re-registering a
//!   name fails with [`RegistrationError::DuplicateEntry`].
//! - **Rejections**: class, function, field and enum rules. A function rule
//!   matches either the bare name or a minimal signature; the class `*`
//!   matches every class.
//! - **Modifications**: kept in declaration order and filtered per query.
//!
//! The database is populated single-threaded before a build and only read
//! during it.
//!
//! # Example
//!
//! ```
//! use cppmeta_registry::{MappingDatabase, TypeDatabase};
//! use cppmeta_core::TypeEntry;
//!
//! let mut db = TypeDatabase::with_builtin_primitives();
//! db.add_entry(TypeEntry::value("QPoint")).unwrap();
//! db.reject_function("QPoint", "rx");
//!
//! assert!(db.find_complex_type("QPoint").is_some());
//! assert!(db.find_type("int").is_some_and(|e| e.is_primitive()));
//! assert!(db.is_function_rejected("QPoint", "rx"));
//! ```

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use cppmeta_core::{RegistrationError, TypeEntry, TypeEntryKind};

use crate::{FunctionModification, MappingDatabase};

/// Built-in scalar types known to every database.
pub const BUILTIN_PRIMITIVES: &[&str] = &[
    "void",
    "bool",
    "char",
    "signed char",
    "unsigned char",
    "short",
    "unsigned short",
    "int",
    "unsigned int",
    "long",
    "unsigned long",
    "long long",
    "unsigned long long",
    "float",
    "double",
    "long double",
    "wchar_t",
    "char16_t",
    "char32_t",
    "std::nullptr_t",
    "auto",
    "int8_t",
    "uint8_t",
    "int16_t",
    "uint16_t",
    "int32_t",
    "uint32_t",
    "int64_t",
    "uint64_t",
    "size_t",
    "std::size_t",
    "intptr_t",
    "uintptr_t",
    "ptrdiff_t",
    "qint8",
    "quint8",
    "qint16",
    "quint16",
    "qint32",
    "quint32",
    "qint64",
    "quint64",
    "qlonglong",
    "qulonglong",
    "qsizetype",
    "uchar",
    "ushort",
    "uint",
    "ulong",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RuleKind {
    Function,
    Field,
    Enum,
}

/// In-memory [`MappingDatabase`].
#[derive(Debug, Default)]
pub struct TypeDatabase {
    entries: FxHashMap<String, Arc<TypeEntry>>,
    /// Registration order, for deterministic iteration.
    order: Vec<String>,
    rejected_classes: FxHashSet<String>,
    /// (kind, class pattern, member name or signature)
    member_rules: FxHashSet<(RuleKind, String, String)>,
    modifications: Vec<FunctionModification>,
    /// (class, function) -> argument lists
    function_instantiations: FxHashMap<(String, String), Vec<Vec<String>>>,
    global_functions: FxHashSet<String>,
}

impl TypeDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a database holding [`BUILTIN_PRIMITIVES`].
    pub fn with_builtin_primitives() -> Self {
        let mut db = Self::new();
        for name in BUILTIN_PRIMITIVES {
            db.insert(TypeEntry::primitive(*name));
        }
        db
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register an entry, returning the shared handle.
    pub fn add_entry(&mut self, entry: TypeEntry) -> Result<Arc<TypeEntry>, RegistrationError> {
        validate(&entry)?;
        if self.entries.contains_key(&entry.qualified_name) {
            return Err(RegistrationError::DuplicateEntry(entry.qualified_name));
        }
        trace!(name = %entry.qualified_name, kind = entry.kind_name(), "registered type entry");
        Ok(self.insert(entry))
    }

    /// Register several entries, stopping at the first failure.
    pub fn add_entries(
        &mut self,
        entries: impl IntoIterator<Item = TypeEntry>,
    ) -> Result<(), RegistrationError> {
        for entry in entries {
            self.add_entry(entry)?;
        }
        Ok(())
    }

    fn insert(&mut self, entry: TypeEntry) -> Arc<TypeEntry> {
        let name = entry.qualified_name.clone();
        let entry = Arc::new(entry);
        self.order.push(name.clone());
        self.entries.insert(name, Arc::clone(&entry));
        entry
    }

    pub fn reject_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        debug!(%class, "class rejected by type system");
        self.rejected_classes.insert(class);
    }

    /// Reject a function by bare name or minimal signature.
    pub fn reject_function(&mut self, class: impl Into<String>, function: impl Into<String>) {
        self.member_rules
            .insert((RuleKind::Function, class.into(), function.into()));
    }

    pub fn reject_field(&mut self, class: impl Into<String>, field: impl Into<String>) {
        self.member_rules
            .insert((RuleKind::Field, class.into(), field.into()));
    }

    pub fn reject_enum(&mut self, class: impl Into<String>, enum_name: impl Into<String>) {
        self.member_rules
            .insert((RuleKind::Enum, class.into(), enum_name.into()));
    }

    pub fn add_modification(&mut self, modification: FunctionModification) {
        self.modifications.push(modification);
    }

    /// Request an instantiation of a function template with concrete
    /// argument types.
    pub fn add_function_instantiation<S: Into<String>>(
        &mut self,
        class: impl Into<String>,
        function: impl Into<String>,
        arguments: impl IntoIterator<Item = S>,
    ) {
        self.function_instantiations
            .entry((class.into(), function.into()))
            .or_default()
            .push(arguments.into_iter().map(Into::into).collect());
    }

    /// Accept a free function (by name) onto the global class.
    pub fn accept_global_function(&mut self, name: impl Into<String>) {
        self.global_functions.insert(name.into());
    }

    // ==========================================================================
    // Iteration
    // ==========================================================================

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<TypeEntry>> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    fn member_rejected(&self, kind: RuleKind, class: &str, member: &str) -> bool {
        let key = |pattern: &str| (kind, pattern.to_string(), member.to_string());
        self.member_rules.contains(&key(class)) || self.member_rules.contains(&key("*"))
    }
}

fn validate(entry: &TypeEntry) -> Result<(), RegistrationError> {
    let invalid = |reason: &str| {
        Err(RegistrationError::InvalidEntry {
            name: entry.qualified_name.clone(),
            reason: reason.to_string(),
        })
    };
    if entry.qualified_name.trim().is_empty() {
        return invalid("empty name");
    }
    match &entry.kind {
        TypeEntryKind::Flags { enum_name } if enum_name.is_empty() => {
            invalid("flags entry without an enum")
        }
        TypeEntryKind::Alias { target } if target.is_empty() => invalid("alias without a target"),
        TypeEntryKind::Alias { target } if *target == entry.qualified_name => {
            invalid("alias refers to itself")
        }
        _ => Ok(()),
    }
}

impl MappingDatabase for TypeDatabase {
    fn find_type(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.entries.get(name).cloned()
    }

    fn is_class_rejected(&self, class: &str) -> bool {
        self.rejected_classes.contains(class)
    }

    fn is_function_rejected(&self, class: &str, function: &str) -> bool {
        self.member_rejected(RuleKind::Function, class, function)
    }

    fn is_field_rejected(&self, class: &str, field: &str) -> bool {
        self.member_rejected(RuleKind::Field, class, field)
    }

    fn is_enum_rejected(&self, class: &str, enum_name: &str) -> bool {
        self.member_rejected(RuleKind::Enum, class, enum_name)
    }

    fn function_modifications(&self, class: &str, signature: &str) -> Vec<FunctionModification> {
        self.modifications
            .iter()
            .filter(|m| m.matches(class, signature))
            .cloned()
            .collect()
    }

    fn function_instantiations(&self, class: &str, function: &str) -> Vec<Vec<String>> {
        self.function_instantiations
            .get(&(class.to_string(), function.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn accepts_global_function(&self, name: &str) -> bool {
        self.global_functions.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModificationKind;
    use cppmeta_core::{Access, ContainerKind};

    #[test]
    fn duplicate_entries_are_rejected() {
        let mut db = TypeDatabase::new();
        db.add_entry(TypeEntry::value("QPoint")).unwrap();
        let err = db.add_entry(TypeEntry::object("QPoint")).unwrap_err();
        assert_eq!(err, RegistrationError::DuplicateEntry("QPoint".into()));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn builtin_primitive_is_singleton() {
        let db = TypeDatabase::with_builtin_primitives();
        let a = db.find_type("int").unwrap();
        let b = db.find_type("int").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn invalid_entries() {
        let mut db = TypeDatabase::new();
        assert!(matches!(
            db.add_entry(TypeEntry::flags("Qt::Alignment", "")),
            Err(RegistrationError::InvalidEntry { .. })
        ));
        assert!(db.add_entry(TypeEntry::alias("qreal", "qreal")).is_err());
        assert!(db.add_entry(TypeEntry::value(" ")).is_err());
    }

    #[test]
    fn kind_filtered_lookups() {
        let mut db = TypeDatabase::new();
        db.add_entries([
            TypeEntry::container("QList", ContainerKind::List),
            TypeEntry::flags("Qt::Alignment", "Qt::AlignmentFlag"),
            TypeEntry::alias("qreal", "double"),
            TypeEntry::value("QPoint"),
        ])
        .unwrap();
        assert!(db.find_container_type("QList").is_some());
        assert!(db.find_complex_type("QList").is_none());
        assert!(db.find_flags_type("Qt::Alignment").is_some());
        assert_eq!(db.find_alias("qreal").as_deref(), Some("double"));
        assert_eq!(db.find_alias("QPoint"), None);
    }

    #[test]
    fn member_rejections_with_wildcard() {
        let mut db = TypeDatabase::new();
        db.reject_function("*", "metaObject");
        db.reject_field("QPoint", "xp");
        db.reject_enum("QWidget", "RenderFlag");
        assert!(db.is_function_rejected("QWidget", "metaObject"));
        assert!(db.is_field_rejected("QPoint", "xp"));
        assert!(!db.is_field_rejected("QSize", "xp"));
        assert!(db.is_enum_rejected("QWidget", "RenderFlag"));
    }

    #[test]
    fn modifications_filtered_by_signature() {
        let mut db = TypeDatabase::new();
        db.add_modification(FunctionModification::new(
            "QLabel",
            "setText(QString)",
            ModificationKind::Access(Access::Protected),
        ));
        db.add_modification(FunctionModification::new("*", "setText(QString)", ModificationKind::Remove));
        assert_eq!(db.function_modifications("QLabel", "setText(QString)").len(), 2);
        assert_eq!(db.function_modifications("QButton", "setText(QString)").len(), 1);
        assert!(db.function_modifications("QLabel", "text()const").is_empty());
    }

    #[test]
    fn function_instantiation_requests() {
        let mut db = TypeDatabase::new();
        db.add_function_instantiation("QVariant", "value", ["int"]);
        db.add_function_instantiation("QVariant", "value", ["QString"]);
        assert_eq!(
            db.function_instantiations("QVariant", "value"),
            vec![vec!["int".to_string()], vec!["QString".to_string()]]
        );
        assert!(db.function_instantiations("QVariant", "toInt").is_empty());
    }

    #[test]
    fn entries_in_registration_order() {
        let mut db = TypeDatabase::new();
        db.add_entries([TypeEntry::value("B"), TypeEntry::value("A")]).unwrap();
        let names: Vec<_> = db.entries().map(|e| e.qualified_name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }
}
