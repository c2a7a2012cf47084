//! TypeEntry: the mapping database's description of one C++ type.
//!
//! Exactly one entry exists per fully qualified C++ name inside a database.
//! Entries are shared (`Arc`) by every [`MetaType`](crate::MetaType) that
//! refers to them and are never owned by the metamodel.

use super::{ContainerKind, PointerContainerKind};

/// How much code the downstream generator emits for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CodeGeneration {
    /// Generate the full binding.
    #[default]
    GenerateAll,
    /// Known to the type system, but nothing is generated.
    GenerateNothing,
    /// Only generated where subclasses need it.
    GenerateForSubclass,
}

/// Kind-specific data of a type entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeEntryKind {
    /// Built-in scalar type (`int`, `double`, `bool`, `void`, ...).
    Primitive,
    /// Enumeration, optionally paired with a flags wrapper.
    Enum {
        /// Name of the `QFlags<...>` type wrapping this enum.
        flags: Option<String>,
    },
    /// `QFlags<Enum>` wrapper type.
    Flags {
        /// Qualified name of the wrapped enum.
        enum_name: String,
    },
    /// Class copied by value.
    Value {
        /// Maps to the target language's string type.
        is_string: bool,
    },
    /// Class with identity, passed by pointer or reference.
    Object {
        /// Derives from `QObject`.
        is_qobject: bool,
        /// Mapped to an interface in the target language.
        is_interface: bool,
    },
    /// Generic container.
    Container {
        /// Container shape.
        kind: ContainerKind,
    },
    /// Smart pointer wrapping one element.
    PointerContainer {
        /// Pointer shape.
        kind: PointerContainerKind,
    },
    /// Iterator over a container.
    Iterator {
        /// Qualified name of the iterated container.
        container: String,
        /// `const_iterator` rather than `iterator`.
        is_const: bool,
    },
    /// Function pointer or `std::function` typedef.
    Functional {
        /// Normalized signature, e.g. `void(int,bool)`.
        signature: Option<String>,
    },
    /// Unbound template parameter.
    TemplateArgument {
        /// Position in the owning template's parameter list.
        ordinal: usize,
    },
    /// Fixed-size native array.
    Array {
        /// Qualified name of the element type.
        element: String,
        /// Array length expression, `None` when unspecified.
        length: Option<String>,
    },
    /// Namespace whose free functions become a synthetic class.
    Namespace,
    /// Pseudo-type receiving accepted global functions.
    Global,
    /// Template parameter that has been bound to a concrete type.
    InstantiatedTemplateArgument {
        /// Position in the owning template's parameter list.
        ordinal: usize,
        /// C++ signature of the bound type.
        bound_to: String,
    },
    /// Type-system typedef (`qreal` -> `double`).
    Alias {
        /// Type expression the alias stands for.
        target: String,
    },
}

/// A named, singleton description of one C++ type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    /// Fully qualified C++ name.
    pub qualified_name: String,
    /// Name used by the generated binding.
    pub target_name: String,
    /// Kind and kind-specific metadata.
    pub kind: TypeEntryKind,
    /// Generation policy.
    pub generation: CodeGeneration,
    /// Entry to retarget to when instantiated with `void` (e.g. `QFuture<void>`).
    pub void_specialization: Option<String>,
    /// Instantiation argument list -> specialized entry name.
    pub specializations: Vec<(Vec<String>, String)>,
}

impl TypeEntry {
    /// Create a new entry with default generation policy.
    pub fn new(qualified_name: impl Into<String>, kind: TypeEntryKind) -> Self {
        let qualified_name = qualified_name.into();
        let target_name = default_target_name(&qualified_name);
        Self {
            qualified_name,
            target_name,
            kind,
            generation: CodeGeneration::GenerateAll,
            void_specialization: None,
            specializations: Vec::new(),
        }
    }

    /// Primitive type entry.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self::new(name, TypeEntryKind::Primitive)
    }

    /// Value type entry.
    pub fn value(name: impl Into<String>) -> Self {
        Self::new(name, TypeEntryKind::Value { is_string: false })
    }

    /// String-like value type entry (`QString`, `std::string`).
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, TypeEntryKind::Value { is_string: true })
    }

    /// Object type entry.
    pub fn object(name: impl Into<String>) -> Self {
        Self::new(
            name,
            TypeEntryKind::Object {
                is_qobject: false,
                is_interface: false,
            },
        )
    }

    /// QObject-derived type entry.
    pub fn qobject(name: impl Into<String>) -> Self {
        Self::new(
            name,
            TypeEntryKind::Object {
                is_qobject: true,
                is_interface: false,
            },
        )
    }

    /// Interface type entry.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(
            name,
            TypeEntryKind::Object {
                is_qobject: false,
                is_interface: true,
            },
        )
    }

    /// Enum type entry.
    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, TypeEntryKind::Enum { flags: None })
    }

    /// Flags type entry wrapping `enum_name`.
    pub fn flags(name: impl Into<String>, enum_name: impl Into<String>) -> Self {
        Self::new(
            name,
            TypeEntryKind::Flags {
                enum_name: enum_name.into(),
            },
        )
    }

    /// Container type entry.
    pub fn container(name: impl Into<String>, kind: ContainerKind) -> Self {
        Self::new(name, TypeEntryKind::Container { kind })
    }

    /// Smart-pointer type entry.
    pub fn pointer_container(name: impl Into<String>, kind: PointerContainerKind) -> Self {
        Self::new(name, TypeEntryKind::PointerContainer { kind })
    }

    /// Iterator entry for `container`.
    pub fn iterator(container: impl Into<String>, is_const: bool) -> Self {
        let container = container.into();
        let suffix = if is_const { "const_iterator" } else { "iterator" };
        Self::new(
            format!("{container}::{suffix}"),
            TypeEntryKind::Iterator {
                container,
                is_const,
            },
        )
    }

    /// Functional type entry.
    pub fn functional(name: impl Into<String>, signature: Option<String>) -> Self {
        Self::new(name, TypeEntryKind::Functional { signature })
    }

    /// Unbound template parameter entry.
    pub fn template_argument(name: impl Into<String>, ordinal: usize) -> Self {
        Self::new(name, TypeEntryKind::TemplateArgument { ordinal })
    }

    /// Template parameter bound to `bound_to`.
    pub fn instantiated_template_argument(
        name: impl Into<String>,
        ordinal: usize,
        bound_to: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            TypeEntryKind::InstantiatedTemplateArgument {
                ordinal,
                bound_to: bound_to.into(),
            },
        )
    }

    /// Native array entry.
    pub fn array(element: impl Into<String>, length: Option<String>) -> Self {
        let element = element.into();
        let name = format!("{element}[{}]", length.as_deref().unwrap_or(""));
        Self::new(name, TypeEntryKind::Array { element, length })
    }

    /// Namespace entry.
    pub fn namespace(name: impl Into<String>) -> Self {
        Self::new(name, TypeEntryKind::Namespace)
    }

    /// Global pseudo-type entry.
    pub fn global(name: impl Into<String>) -> Self {
        Self::new(name, TypeEntryKind::Global)
    }

    /// Type-system alias entry.
    pub fn alias(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(
            name,
            TypeEntryKind::Alias {
                target: target.into(),
            },
        )
    }

    // === Builder Methods ===

    /// Set the generation policy.
    pub fn with_generation(mut self, generation: CodeGeneration) -> Self {
        self.generation = generation;
        self
    }

    /// Set the binding-side name.
    pub fn with_target_name(mut self, target_name: impl Into<String>) -> Self {
        self.target_name = target_name.into();
        self
    }

    /// Pair an enum entry with its flags wrapper.
    pub fn with_flags(mut self, flags_name: impl Into<String>) -> Self {
        if let TypeEntryKind::Enum { flags } = &mut self.kind {
            *flags = Some(flags_name.into());
        }
        self
    }

    /// Set the entry used when instantiated with `void`.
    pub fn with_void_specialization(mut self, entry_name: impl Into<String>) -> Self {
        self.void_specialization = Some(entry_name.into());
        self
    }

    /// Map an instantiation argument list to a specialized entry.
    pub fn with_specialization<S: Into<String>>(
        mut self,
        args: impl IntoIterator<Item = S>,
        entry_name: impl Into<String>,
    ) -> Self {
        let args = args.into_iter().map(Into::into).collect();
        self.specializations.push((args, entry_name.into()));
        self
    }

    // === Query Methods ===

    /// Simple (last segment) name.
    pub fn name(&self) -> &str {
        self.qualified_name
            .rsplit("::")
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Short kind label used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeEntryKind::Primitive => "primitive",
            TypeEntryKind::Enum { .. } => "enum",
            TypeEntryKind::Flags { .. } => "flags",
            TypeEntryKind::Value { .. } => "value",
            TypeEntryKind::Object { .. } => "object",
            TypeEntryKind::Container { .. } => "container",
            TypeEntryKind::PointerContainer { .. } => "pointer-container",
            TypeEntryKind::Iterator { .. } => "iterator",
            TypeEntryKind::Functional { .. } => "functional",
            TypeEntryKind::TemplateArgument { .. } => "template-argument",
            TypeEntryKind::Array { .. } => "array",
            TypeEntryKind::Namespace => "namespace",
            TypeEntryKind::Global => "global",
            TypeEntryKind::InstantiatedTemplateArgument { .. } => "instantiated-template-argument",
            TypeEntryKind::Alias { .. } => "alias",
        }
    }

    /// Value, object, namespace or global entry: something a class can map to.
    pub fn is_complex(&self) -> bool {
        matches!(
            self.kind,
            TypeEntryKind::Value { .. }
                | TypeEntryKind::Object { .. }
                | TypeEntryKind::Namespace
                | TypeEntryKind::Global
        )
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Primitive)
    }

    pub fn is_void(&self) -> bool {
        self.is_primitive() && self.qualified_name == "void"
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Enum { .. })
    }

    pub fn is_flags(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Flags { .. })
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Value { .. })
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Value { is_string: true })
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Object { .. })
    }

    pub fn is_qobject(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Object { is_qobject: true, .. })
    }

    pub fn is_interface(&self) -> bool {
        matches!(
            self.kind,
            TypeEntryKind::Object {
                is_interface: true,
                ..
            }
        )
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Container { .. })
    }

    pub fn is_pointer_container(&self) -> bool {
        matches!(self.kind, TypeEntryKind::PointerContainer { .. })
    }

    pub fn is_iterator(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Iterator { .. })
    }

    pub fn is_functional(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Functional { .. })
    }

    /// Unbound template parameter.
    pub fn is_template_argument(&self) -> bool {
        matches!(self.kind, TypeEntryKind::TemplateArgument { .. })
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, TypeEntryKind::Namespace)
    }

    /// Container shape, for container entries.
    pub fn container_kind(&self) -> Option<ContainerKind> {
        match self.kind {
            TypeEntryKind::Container { kind } => Some(kind),
            _ => None,
        }
    }

    /// Find the specialized entry name for an instantiation argument list.
    pub fn specialization_for(&self, args: &[String]) -> Option<&str> {
        self.specializations
            .iter()
            .find(|(key, _)| key.as_slice() == args)
            .map(|(_, entry)| entry.as_str())
    }

    /// Whether the generator emits anything for this entry.
    pub fn generates_code(&self) -> bool {
        self.generation != CodeGeneration::GenerateNothing
    }
}

fn default_target_name(qualified_name: &str) -> String {
    let base = qualified_name.split('<').next().unwrap_or(qualified_name);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_name_defaults_to_simple_name() {
        let entry = TypeEntry::object("QtCore::QTimer");
        assert_eq!(entry.target_name, "QTimer");
        assert_eq!(entry.name(), "QTimer");
    }

    #[test]
    fn enum_with_flags() {
        let entry = TypeEntry::enumeration("Qt::AlignmentFlag").with_flags("Qt::Alignment");
        assert!(entry.is_enum());
        assert_eq!(
            entry.kind,
            TypeEntryKind::Enum {
                flags: Some("Qt::Alignment".to_string())
            }
        );
    }

    #[test]
    fn complex_entries() {
        assert!(TypeEntry::value("QPoint").is_complex());
        assert!(TypeEntry::qobject("QObject").is_complex());
        assert!(TypeEntry::namespace("Qt").is_complex());
        assert!(!TypeEntry::primitive("int").is_complex());
        assert!(!TypeEntry::container("QList", ContainerKind::List).is_complex());
    }

    #[test]
    fn iterator_entry_name() {
        let entry = TypeEntry::iterator("QList", true);
        assert_eq!(entry.qualified_name, "QList::const_iterator");
        assert!(entry.is_iterator());
    }

    #[test]
    fn specialization_lookup() {
        let entry = TypeEntry::value("QFuture")
            .with_void_specialization("QFutureVoid")
            .with_specialization(["QString"], "QFutureString");
        assert_eq!(entry.specialization_for(&["QString".to_string()]), Some("QFutureString"));
        assert_eq!(entry.specialization_for(&["int".to_string()]), None);
        assert_eq!(entry.void_specialization.as_deref(), Some("QFutureVoid"));
    }

    #[test]
    fn generation_policy() {
        let entry = TypeEntry::value("QPrivate").with_generation(CodeGeneration::GenerateNothing);
        assert!(!entry.generates_code());
        assert!(TypeEntry::value("QPoint").generates_code());
    }

    #[test]
    fn template_target_name_drops_arguments() {
        assert_eq!(TypeEntry::value("Box<Int32>").target_name, "Box");
    }
}
