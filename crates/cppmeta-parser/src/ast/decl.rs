//! Declaration nodes of the input AST.
//!
//! The AST is produced by an external C++ front end. Every node carries its
//! raw type expressions as strings; they are parsed later with
//! [`parse_type`](crate::parse_type). All nodes offer `with_*` builder
//! methods so front ends and tests can assemble trees fluently.

use bitflags::bitflags;
use cppmeta_core::Access;

bitflags! {
    /// Qualifiers of a function declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionQualifiers: u32 {
        const VIRTUAL = 1 << 0;
        const STATIC = 1 << 1;
        const CONST = 1 << 2;
        const FINAL = 1 << 3;
        const OVERRIDE = 1 << 4;
        /// `= 0`
        const PURE_VIRTUAL = 1 << 5;
        const EXPLICIT = 1 << 6;
        /// `= delete`
        const DELETED = 1 << 7;
        const NOEXCEPT = 1 << 8;
        const DEPRECATED = 1 << 9;
        const INLINE = 1 << 10;
    }
}

/// Meta-object role of a member function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FunctionRole {
    #[default]
    Normal,
    Signal,
    Slot,
    Invokable,
}

/// A namespace, or the translation unit's global scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamespaceDecl {
    /// Simple name; empty for the global scope.
    pub name: String,
    pub namespaces: Vec<NamespaceDecl>,
    pub classes: Vec<ClassDecl>,
    pub functions: Vec<FunctionDecl>,
    pub enums: Vec<EnumDecl>,
    pub typedefs: Vec<TypedefDecl>,
    pub fields: Vec<FieldDecl>,
}

impl NamespaceDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The unnamed global scope.
    pub fn global() -> Self {
        Self::default()
    }

    pub fn is_global(&self) -> bool {
        self.name.is_empty()
    }

    pub fn with_namespace(mut self, namespace: NamespaceDecl) -> Self {
        self.namespaces.push(namespace);
        self
    }

    pub fn with_class(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_enum(mut self, decl: EnumDecl) -> Self {
        self.enums.push(decl);
        self
    }

    pub fn with_typedef(mut self, typedef: TypedefDecl) -> Self {
        self.typedefs.push(typedef);
        self
    }

    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }
}

/// A base-class specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseSpec {
    /// Name as written, possibly a template-id.
    pub name: String,
    pub access: Access,
}

impl BaseSpec {
    pub fn new(name: impl Into<String>, access: Access) -> Self {
        Self {
            name: name.into(),
            access,
        }
    }

    pub fn public(name: impl Into<String>) -> Self {
        Self::new(name, Access::Public)
    }

    pub fn is_public(&self) -> bool {
        self.access.is_public()
    }
}

/// A template parameter declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateParamDecl {
    pub name: String,
    pub default: Option<String>,
    /// `typename T` rather than `int N`.
    pub is_type: bool,
}

impl TemplateParamDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            is_type: true,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn non_type(mut self) -> Self {
        self.is_type = false;
        self
    }
}

/// A class, struct or union.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDecl {
    pub name: String,
    pub access: Access,
    pub is_struct: bool,
    pub is_final: bool,
    /// Only forward-declared.
    pub is_declaration_only: bool,
    /// Declares `Q_OBJECT`/`Q_GADGET`.
    pub has_meta_object: bool,
    pub is_deprecated: bool,
    pub bases: Vec<BaseSpec>,
    pub template_parameters: Vec<TemplateParamDecl>,
    pub classes: Vec<ClassDecl>,
    pub functions: Vec<FunctionDecl>,
    pub enums: Vec<EnumDecl>,
    pub typedefs: Vec<TypedefDecl>,
    pub fields: Vec<FieldDecl>,
    pub properties: Vec<PropertyDecl>,
    pub source_file: String,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_base(mut self, base: BaseSpec) -> Self {
        self.bases.push(base);
        self
    }

    pub fn with_template_parameter(mut self, param: TemplateParamDecl) -> Self {
        self.template_parameters.push(param);
        self
    }

    pub fn with_class(mut self, class: ClassDecl) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_function(mut self, function: FunctionDecl) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_enum(mut self, decl: EnumDecl) -> Self {
        self.enums.push(decl);
        self
    }

    pub fn with_typedef(mut self, typedef: TypedefDecl) -> Self {
        self.typedefs.push(typedef);
        self
    }

    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_property(mut self, property: PropertyDecl) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_meta_object(mut self) -> Self {
        self.has_meta_object = true;
        self
    }

    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_source_file(mut self, file: impl Into<String>) -> Self {
        self.source_file = file.into();
        self
    }

    pub fn is_template(&self) -> bool {
        !self.template_parameters.is_empty()
    }
}

/// A function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDecl {
    pub name: String,
    pub type_expression: String,
    pub default_expression: Option<String>,
}

impl ArgumentDecl {
    pub fn new(name: impl Into<String>, type_expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_expression: type_expression.into(),
            default_expression: None,
        }
    }

    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default_expression = Some(expression.into());
        self
    }
}

/// A function or member function.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionDecl {
    pub name: String,
    /// Empty for constructors and destructors.
    pub return_type: String,
    pub arguments: Vec<ArgumentDecl>,
    pub access: Access,
    pub qualifiers: FunctionQualifiers,
    pub role: FunctionRole,
    pub template_parameters: Vec<TemplateParamDecl>,
    pub source_file: String,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            ..Self::default()
        }
    }

    pub fn with_argument(mut self, argument: ArgumentDecl) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_qualifiers(mut self, qualifiers: FunctionQualifiers) -> Self {
        self.qualifiers |= qualifiers;
        self
    }

    pub fn with_role(mut self, role: FunctionRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_template_parameter(mut self, param: TemplateParamDecl) -> Self {
        self.template_parameters.push(param);
        self
    }

    pub fn with_source_file(mut self, file: impl Into<String>) -> Self {
        self.source_file = file.into();
        self
    }

    pub fn is_const(&self) -> bool {
        self.qualifiers.contains(FunctionQualifiers::CONST)
    }
}

/// One enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratorDecl {
    pub name: String,
    /// Initializer, `None` when implicit.
    pub expression: Option<String>,
    pub is_deprecated: bool,
}

impl EnumeratorDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: None,
            is_deprecated: false,
        }
    }

    pub fn with_value(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}

/// An enum declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumDecl {
    /// Empty for anonymous enums.
    pub name: String,
    /// Declared underlying type.
    pub underlying_type: Option<String>,
    /// `enum class`.
    pub is_scoped: bool,
    pub access: Access,
    pub enumerators: Vec<EnumeratorDecl>,
    pub source_file: String,
}

impl EnumDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_underlying_type(mut self, ty: impl Into<String>) -> Self {
        self.underlying_type = Some(ty.into());
        self
    }

    pub fn with_enumerator(mut self, enumerator: EnumeratorDecl) -> Self {
        self.enumerators.push(enumerator);
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn scoped(mut self) -> Self {
        self.is_scoped = true;
        self
    }
}

/// A typedef or alias declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefDecl {
    pub name: String,
    pub type_expression: String,
    pub access: Access,
}

impl TypedefDecl {
    pub fn new(name: impl Into<String>, type_expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_expression: type_expression.into(),
            access: Access::Public,
        }
    }
}

/// A data member or namespace-scope variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub type_expression: String,
    pub access: Access,
    pub is_static: bool,
    pub is_mutable: bool,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, type_expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_expression: type_expression.into(),
            access: Access::Public,
            is_static: false,
            is_mutable: false,
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// A `Q_PROPERTY` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyDecl {
    pub name: String,
    pub type_expression: String,
    pub read: Option<String>,
    pub write: Option<String>,
    pub reset: Option<String>,
    pub notify: Option<String>,
    pub member: Option<String>,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, type_expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_expression: type_expression.into(),
            ..Self::default()
        }
    }

    pub fn with_read(mut self, function: impl Into<String>) -> Self {
        self.read = Some(function.into());
        self
    }

    pub fn with_write(mut self, function: impl Into<String>) -> Self {
        self.write = Some(function.into());
        self
    }

    pub fn with_reset(mut self, function: impl Into<String>) -> Self {
        self.reset = Some(function.into());
        self
    }

    pub fn with_notify(mut self, function: impl Into<String>) -> Self {
        self.notify = Some(function.into());
        self
    }
}
