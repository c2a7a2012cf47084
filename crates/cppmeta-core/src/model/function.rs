//! Function records.
//!
//! A [`MetaFunction`] is created by the registration pass for every
//! declared function, cloned by template flattening and function template
//! instantiation, and annotated by the later passes (defaults, hiding,
//! property roles). Constructors and destructors never carry a return
//! type: [`MetaFunction::set_return_type`] drops it for those kinds.

use std::fmt;

use crate::meta_type::ReferenceType;
use crate::model::{FunctionAttributes, MetaTemplateParameter, OperatorKind};
use crate::{Access, ClassId, MetaType};

/// Classification of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FunctionKind {
    #[default]
    Normal,
    Constructor,
    Destructor,
    Signal,
    /// Signal carrying a trailing `QPrivateSignal` tag.
    PrivateSignal,
    Slot,
    /// Free function promoted onto a class; the first argument is `this`.
    GlobalScopeFunction,
    /// Synthesized `as<Base>()` accessor for a secondary base.
    BaseClassDelegate,
}

impl FunctionKind {
    pub fn is_signal(self) -> bool {
        matches!(self, FunctionKind::Signal | FunctionKind::PrivateSignal)
    }

    pub fn is_constructor_or_destructor(self) -> bool {
        matches!(self, FunctionKind::Constructor | FunctionKind::Destructor)
    }
}

/// A default argument after translation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefaultValue {
    Integer(i64),
    /// Qualified enumerator name.
    EnumConstant(String),
    /// Kept verbatim.
    Expression(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Integer(v) => write!(f, "{v}"),
            DefaultValue::EnumConstant(name) => write!(f, "{name}"),
            DefaultValue::Expression(expr) => write!(f, "{expr}"),
        }
    }
}

/// One function argument.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaArgument {
    pub name: String,
    pub ty: MetaType,
    /// Default expression as written.
    pub original_default: Option<String>,
    /// Default after the default-argument pass.
    pub default_value: Option<DefaultValue>,
}

impl MetaArgument {
    pub fn new(name: impl Into<String>, ty: MetaType) -> Self {
        Self {
            name: name.into(),
            ty,
            original_default: None,
            default_value: None,
        }
    }

    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.original_default = Some(expression.into());
        self
    }

    pub fn has_default(&self) -> bool {
        self.original_default.is_some()
    }
}

/// A class member function, free function or synthesized function.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaFunction {
    /// Name after modifications.
    pub name: String,
    /// Name as declared.
    pub original_name: String,
    pub kind: FunctionKind,
    pub attributes: FunctionAttributes,
    pub operator: Option<OperatorKind>,
    return_type: Option<MetaType>,
    pub arguments: Vec<MetaArgument>,
    pub template_parameters: Vec<MetaTemplateParameter>,
    /// Template function this was instantiated from, by minimal signature.
    pub template_origin: Option<String>,
    pub declaring_class: Option<ClassId>,
    pub implementing_class: Option<ClassId>,
    pub source_file: String,
}

impl MetaFunction {
    pub fn new(name: impl Into<String>, kind: FunctionKind) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            operator: OperatorKind::from_function_name(&name),
            name,
            kind,
            attributes: FunctionAttributes::PUBLIC,
            return_type: None,
            arguments: Vec::new(),
            template_parameters: Vec::new(),
            template_origin: None,
            declaring_class: None,
            implementing_class: None,
            source_file: String::new(),
        }
    }

    // === Builder Methods ===

    pub fn with_attributes(mut self, attributes: FunctionAttributes) -> Self {
        self.attributes |= attributes;
        self
    }

    pub fn with_return_type(mut self, ty: MetaType) -> Self {
        self.set_return_type(Some(ty));
        self
    }

    pub fn with_argument(mut self, argument: MetaArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    // === Return type ===

    pub fn return_type(&self) -> Option<&MetaType> {
        self.return_type.as_ref()
    }

    pub fn return_type_mut(&mut self) -> Option<&mut MetaType> {
        self.return_type.as_mut()
    }

    /// Set the return type. `void`, constructors and destructors store none.
    pub fn set_return_type(&mut self, ty: Option<MetaType>) {
        self.return_type = match ty {
            Some(_) if self.kind.is_constructor_or_destructor() => None,
            Some(ty) if ty.is_void() => None,
            other => other,
        };
    }

    /// Change the kind, dropping any return type a constructor or
    /// destructor may not have.
    pub fn set_kind(&mut self, kind: FunctionKind) {
        self.kind = kind;
        if kind.is_constructor_or_destructor() {
            self.return_type = None;
        }
    }

    // === Queries ===

    pub fn access(&self) -> Access {
        self.attributes.access()
    }

    pub fn is_invalid(&self) -> bool {
        self.attributes.contains(FunctionAttributes::INVALID)
    }

    pub fn is_const(&self) -> bool {
        self.attributes.contains(FunctionAttributes::CONST)
    }

    pub fn is_static(&self) -> bool {
        self.attributes.contains(FunctionAttributes::STATIC)
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes.contains(FunctionAttributes::HIDDEN)
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == FunctionKind::Constructor
    }

    /// Has unbound template parameters.
    pub fn is_template(&self) -> bool {
        !self.template_parameters.is_empty()
    }

    /// Visible in the emitted class surface.
    pub fn is_emitted(&self) -> bool {
        !self.is_invalid()
            && !self.attributes.contains(FunctionAttributes::REMOVED)
            && !self.is_template()
    }

    /// Whether any argument or the return type still mentions an unbound
    /// template parameter.
    pub fn contains_template_arguments(&self) -> bool {
        self.return_type
            .as_ref()
            .is_some_and(MetaType::contains_template_arguments)
            || self
                .arguments
                .iter()
                .any(|a| a.ty.contains_template_arguments())
    }

    /// Normalized `name(type,type)` signature used for matching
    /// modifications and detecting duplicates.
    pub fn minimal_signature(&self) -> String {
        let mut out = format!("{}(", self.original_name);
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&argument_signature(&arg.ty));
        }
        out.push(')');
        if self.is_const() {
            out.push_str("const");
        }
        out
    }

    /// Like [`minimal_signature`](Self::minimal_signature) but with the
    /// current (possibly renamed) name.
    pub fn signature(&self) -> String {
        let minimal = self.minimal_signature();
        match minimal.strip_prefix(self.original_name.as_str()) {
            Some(rest) => format!("{}{rest}", self.name),
            None => minimal,
        }
    }

    /// Copy-constructor shaped: a constructor taking one reference to its own
    /// class.
    pub fn is_copy_constructor_of(&self, class_name: &str) -> bool {
        self.kind == FunctionKind::Constructor
            && self.arguments.len() == 1
            && {
                let ty = &self.arguments[0].ty;
                ty.reference() == ReferenceType::LValue
                    && ty.indirections().is_empty()
                    && ty.entry().qualified_name == class_name
            }
    }
}

/// By-value-equivalent spelling of an argument type: `const T&` reads as `T`.
fn argument_signature(ty: &MetaType) -> String {
    let by_value_equivalent = ty.indirections().is_empty()
        && (ty.reference() == ReferenceType::NoReference
            || (ty.is_constant() && ty.reference() == ReferenceType::LValue));
    if by_value_equivalent {
        ty.minimal_signature()
    } else {
        ty.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::TypeEntry;

    fn ty(name: &str) -> MetaType {
        MetaType::new(Arc::new(TypeEntry::value(name)))
    }

    #[test]
    fn constructors_never_have_return_types() {
        let mut ctor = MetaFunction::new("QPoint", FunctionKind::Constructor);
        ctor.set_return_type(Some(ty("QPoint")));
        assert!(ctor.return_type().is_none());

        let mut func = MetaFunction::new("make", FunctionKind::Normal).with_return_type(ty("QPoint"));
        assert!(func.return_type().is_some());
        func.set_kind(FunctionKind::Destructor);
        assert!(func.return_type().is_none());
    }

    #[test]
    fn void_return_is_dropped() {
        let void = MetaType::new(Arc::new(TypeEntry::primitive("void")));
        let func = MetaFunction::new("clear", FunctionKind::Normal).with_return_type(void);
        assert!(func.return_type().is_none());
    }

    #[test]
    fn minimal_signature_normalizes_const_refs() {
        let func = MetaFunction::new("setText", FunctionKind::Normal)
            .with_argument(MetaArgument::new(
                "text",
                ty("QString")
                    .with_constant(true)
                    .with_reference(ReferenceType::LValue),
            ))
            .with_argument(MetaArgument::new("out", ty("QPoint").with_reference(ReferenceType::LValue)));
        assert_eq!(func.minimal_signature(), "setText(QString,QPoint&)");
    }

    #[test]
    fn renamed_signature_keeps_arguments() {
        let mut func = MetaFunction::new("size", FunctionKind::Normal)
            .with_attributes(FunctionAttributes::CONST);
        func.name = "length".into();
        assert_eq!(func.minimal_signature(), "size()const");
        assert_eq!(func.signature(), "length()const");
    }

    #[test]
    fn operator_detected_from_name() {
        let func = MetaFunction::new("operator==", FunctionKind::Normal);
        assert_eq!(func.operator, Some(OperatorKind::Equals));
    }

    #[test]
    fn copy_constructor_shape() {
        let ctor = MetaFunction::new("QPoint", FunctionKind::Constructor).with_argument(
            MetaArgument::new(
                "other",
                ty("QPoint")
                    .with_constant(true)
                    .with_reference(ReferenceType::LValue),
            ),
        );
        assert!(ctor.is_copy_constructor_of("QPoint"));
        assert!(!ctor.is_copy_constructor_of("QSize"));
    }
}
