//! Class records.
//!
//! Classes live in an arena owned by the builder and refer to each other by
//! [`ClassId`]. Base classes, enclosing classes and the template a class was
//! instantiated from are all non-owning id references.

use std::fmt;
use std::sync::Arc;

use crate::entries::TypeEntry;
use crate::model::{
    ClassAttributes, MetaEnum, MetaField, MetaFunction, MetaFunctional, MetaProperty,
    MetaTemplateParameter, OperatorKind,
};
use crate::{Access, MetaType};

/// Index of a class in the class arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A declared base class, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseClassName {
    /// Name as written, possibly a template-id (`Container<K,V>`).
    pub name: String,
    pub access: Access,
}

impl BaseClassName {
    pub fn new(name: impl Into<String>, access: Access) -> Self {
        Self {
            name: name.into(),
            access,
        }
    }
}

/// Strategy chosen for the synthesized "comparable" capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonStrategy {
    /// `operator<=>`.
    ThreeWay,
    /// `operator<` together with `operator==`.
    LessAndEquals,
    /// `operator<=` together with `operator>=`.
    LessEqualAndGreaterEqual,
    /// A lone ordering operator.
    Single(OperatorKind),
}

/// Capabilities synthesized from operators and member shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassCapabilities {
    pub has_equals_operator: bool,
    pub has_clone_operator: bool,
    pub comparison: Option<ComparisonStrategy>,
    /// Minimal signatures of `begin()`-style functions.
    pub begin_functions: Vec<String>,
    /// Minimal signatures of `end()`-style functions.
    pub end_functions: Vec<String>,
}

impl ClassCapabilities {
    pub fn is_comparable(&self) -> bool {
        self.comparison.is_some()
    }

    /// Has a matching `begin()`/`end()` pair.
    pub fn is_iterable(&self) -> bool {
        !self.begin_functions.is_empty() && !self.end_functions.is_empty()
    }
}

/// A class, struct, namespace class or global class.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaClass {
    pub qualified_name: String,
    pub entry: Arc<TypeEntry>,
    pub attributes: ClassAttributes,
    /// Declared bases in declaration order.
    pub base_class_names: Vec<BaseClassName>,

    // === Resolved relations ===
    pub base_class: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub enclosing_class: Option<ClassId>,
    pub inner_classes: Vec<ClassId>,

    // === Members ===
    pub functions: Vec<MetaFunction>,
    /// Functions whose types failed to translate.
    pub invalid_functions: Vec<MetaFunction>,
    /// Functions with unbound template parameters.
    pub template_functions: Vec<MetaFunction>,
    pub fields: Vec<MetaField>,
    pub enums: Vec<MetaEnum>,
    pub functionals: Vec<MetaFunctional>,
    pub properties: Vec<MetaProperty>,

    // === Templates ===
    pub template_parameters: Vec<MetaTemplateParameter>,
    /// Generic template this class was flattened or instantiated from.
    pub template_base_class: Option<ClassId>,
    pub template_base_instantiations: Vec<MetaType>,
    /// Concrete container a synthesized iterator class belongs to.
    pub iterator_container: Option<ClassId>,

    pub capabilities: ClassCapabilities,
    pub source_file: String,
}

impl MetaClass {
    pub fn new(entry: Arc<TypeEntry>) -> Self {
        Self {
            qualified_name: entry.qualified_name.clone(),
            entry,
            attributes: ClassAttributes::PUBLIC,
            base_class_names: Vec::new(),
            base_class: None,
            interfaces: Vec::new(),
            enclosing_class: None,
            inner_classes: Vec::new(),
            functions: Vec::new(),
            invalid_functions: Vec::new(),
            template_functions: Vec::new(),
            fields: Vec::new(),
            enums: Vec::new(),
            functionals: Vec::new(),
            properties: Vec::new(),
            template_parameters: Vec::new(),
            template_base_class: None,
            template_base_instantiations: Vec::new(),
            iterator_container: None,
            capabilities: ClassCapabilities::default(),
            source_file: String::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: ClassAttributes) -> Self {
        self.attributes |= attributes;
        self
    }

    /// Simple name, without scope or template arguments.
    pub fn name(&self) -> &str {
        let base = self
            .qualified_name
            .split('<')
            .next()
            .unwrap_or(&self.qualified_name);
        base.rsplit("::").next().unwrap_or(base)
    }

    pub fn is_template(&self) -> bool {
        !self.template_parameters.is_empty()
    }

    pub fn is_fake(&self) -> bool {
        self.attributes.contains(ClassAttributes::FAKE)
    }

    pub fn is_namespace(&self) -> bool {
        self.entry.is_namespace()
    }

    pub fn is_interface(&self) -> bool {
        self.entry.is_interface()
    }

    /// Functions visible to the generator.
    pub fn emitted_functions(&self) -> impl Iterator<Item = &MetaFunction> {
        self.functions.iter().filter(|f| f.is_emitted())
    }

    pub fn find_function(&self, name: &str) -> Option<&MetaFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MetaFunction> {
        self.functions.iter().filter(move |f| f.name == name)
    }

    pub fn has_function_signature(&self, minimal_signature: &str) -> bool {
        self.functions
            .iter()
            .any(|f| f.minimal_signature() == minimal_signature)
    }

    pub fn find_field(&self, name: &str) -> Option<&MetaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Option<&MetaEnum> {
        self.enums
            .iter()
            .find(|e| e.qualified_name == name || e.name() == name)
    }

    pub fn has_constructors(&self) -> bool {
        self.functions.iter().any(MetaFunction::is_constructor)
    }
}
