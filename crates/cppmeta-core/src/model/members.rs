//! Field, functional, property and template-parameter records.

use std::sync::Arc;

use crate::entries::TypeEntry;
use crate::model::{FieldAttributes, MetaArgument};
use crate::{Access, ClassId, MetaType};

/// A data member.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaField {
    pub name: String,
    pub ty: MetaType,
    pub attributes: FieldAttributes,
    pub declaring_class: Option<ClassId>,
    pub source_file: String,
}

impl MetaField {
    pub fn new(name: impl Into<String>, ty: MetaType) -> Self {
        Self {
            name: name.into(),
            ty,
            attributes: FieldAttributes::PUBLIC,
            declaring_class: None,
            source_file: String::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: FieldAttributes) -> Self {
        self.attributes |= attributes;
        self
    }

    pub fn access(&self) -> Access {
        self.attributes.access()
    }

    pub fn is_static(&self) -> bool {
        self.attributes.contains(FieldAttributes::STATIC)
    }
}

/// A function-pointer or `std::function` typedef mapped to a functional
/// type entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaFunctional {
    pub qualified_name: String,
    pub entry: Arc<TypeEntry>,
    pub return_type: Option<MetaType>,
    pub arguments: Vec<MetaArgument>,
    pub enclosing_class: Option<ClassId>,
}

impl MetaFunctional {
    /// Normalized `R(A,B)` signature.
    pub fn signature(&self) -> String {
        let ret = self
            .return_type
            .as_ref()
            .map_or_else(|| "void".to_string(), MetaType::to_string);
        let args: Vec<String> = self.arguments.iter().map(|a| a.ty.to_string()).collect();
        format!("{ret}({})", args.join(","))
    }
}

/// A `Q_PROPERTY` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetaProperty {
    pub name: String,
    /// Type expression as declared.
    pub type_expression: String,
    /// Translated type, `None` when it failed to translate.
    pub ty: Option<MetaType>,
    pub read: Option<String>,
    pub write: Option<String>,
    pub reset: Option<String>,
    pub notify: Option<String>,
    pub member: Option<String>,
}

impl MetaProperty {
    pub fn is_writable(&self) -> bool {
        self.write.is_some() || self.member.is_some()
    }
}

/// A template parameter of a class or function template.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaTemplateParameter {
    pub name: String,
    pub ordinal: usize,
    /// Template-argument entry standing in for the parameter.
    pub entry: Arc<TypeEntry>,
    /// Default argument expression.
    pub default: Option<String>,
    /// Type parameter (`typename T`) rather than non-type (`int N`).
    pub is_type: bool,
}

impl MetaTemplateParameter {
    pub fn new(name: impl Into<String>, ordinal: usize) -> Self {
        let name = name.into();
        Self {
            entry: Arc::new(TypeEntry::template_argument(name.clone(), ordinal)),
            name,
            ordinal,
            default: None,
            is_type: true,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Can be left to its declared default.
    pub fn is_implicit(&self) -> bool {
        self.default.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UsagePattern;

    #[test]
    fn template_parameter_entry() {
        let param = MetaTemplateParameter::new("T", 1).with_default("int");
        assert!(param.entry.is_template_argument());
        assert!(param.is_implicit());
        let ty = MetaType::new(param.entry.clone());
        assert_eq!(ty.usage_pattern(), UsagePattern::TemplateArgument);
    }

    #[test]
    fn functional_signature() {
        let int = MetaType::new(Arc::new(TypeEntry::primitive("int")));
        let functional = MetaFunctional {
            qualified_name: "Callback".into(),
            entry: Arc::new(TypeEntry::functional("Callback", None)),
            return_type: None,
            arguments: vec![MetaArgument::new("a", int.clone()), MetaArgument::new("b", int)],
            enclosing_class: None,
        };
        assert_eq!(functional.signature(), "void(int,int)");
    }
}
