//! Error and warning types.
//!
//! ## Error Hierarchy
//!
//! ```text
//! TranslateError      - a type expression could not become a MetaType
//! RegistrationError   - the mapping database rejected an entry
//! BuildWarning        - non-fatal structural problems found while building
//! ```
//!
//! Nothing here aborts a build. A `TranslateError` marks one member invalid;
//! a `BuildWarning` is collected and the build continues with a fallback.

use thiserror::Error;

// ============================================================================
// Translation Errors
// ============================================================================

/// Failure to translate a type expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The expression did not parse.
    #[error("malformed type expression '{0}'")]
    BustedExpression(String),

    /// No entry matched in any scope.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// One template argument failed; the whole type fails with it.
    #[error("template argument {index} of '{ty}' failed: {source}")]
    TemplateArgument {
        ty: String,
        index: usize,
        #[source]
        source: Box<TranslateError>,
    },

    /// Wrong number of template arguments for a container.
    #[error("'{ty}' expects {expected} template arguments, found {found}")]
    ArgumentCount {
        ty: String,
        expected: usize,
        found: usize,
    },

    /// Shape the translator does not support (e.g. `void` by value).
    #[error("unsupported type '{ty}': {reason}")]
    Unsupported { ty: String, reason: String },
}

impl TranslateError {
    /// Innermost failing type name.
    pub fn root_type(&self) -> &str {
        match self {
            TranslateError::BustedExpression(ty) | TranslateError::UnknownType(ty) => ty,
            TranslateError::TemplateArgument { source, .. } => source.root_type(),
            TranslateError::ArgumentCount { ty, .. } | TranslateError::Unsupported { ty, .. } => ty,
        }
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating a mapping database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// An entry with this qualified name already exists.
    #[error("duplicate type entry: {0}")]
    DuplicateEntry(String),

    /// The entry is structurally invalid.
    #[error("invalid type entry '{name}': {reason}")]
    InvalidEntry { name: String, reason: String },
}

// ============================================================================
// Build Warnings
// ============================================================================

/// Structural problems reported while building; each has a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildWarning {
    #[error("enum '{enum_name}': '{value_name}' duplicates the value of '{previous}'")]
    DuplicateEnumValue {
        enum_name: String,
        value_name: String,
        previous: String,
    },

    #[error("class '{class}' has multiple primary bases; '{delegated}' is reached through a delegate")]
    MultiplePrimaryBases { class: String, delegated: String },

    #[error("class '{class}': ambiguous {operator} mapping, keeping '{kept}'")]
    AmbiguousOperator {
        class: String,
        operator: String,
        kept: String,
    },

    #[error("'{function}': template parameter '{parameter}' left unbound")]
    UnboundTemplateParameter { function: String, parameter: String },

    #[error("enum value '{value}' could not be resolved from '{expression}'")]
    UnresolvedEnumValue { value: String, expression: String },

    #[error("cyclic class dependency involving '{class}'")]
    CyclicDependency { class: String },

    #[error("class '{class}': base class '{base}' not found")]
    UnresolvedBaseClass { class: String, base: String },

    #[error("class '{class}' inherits from itself")]
    CyclicInheritance { class: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_type_walks_nested_failures() {
        let err = TranslateError::TemplateArgument {
            ty: "QList<QMap<int,Foo>>".into(),
            index: 0,
            source: Box::new(TranslateError::TemplateArgument {
                ty: "QMap<int,Foo>".into(),
                index: 1,
                source: Box::new(TranslateError::UnknownType("Foo".into())),
            }),
        };
        assert_eq!(err.root_type(), "Foo");
        assert!(err.to_string().contains("QList<QMap<int,Foo>>"));
    }

    #[test]
    fn warning_messages() {
        let warning = BuildWarning::UnresolvedEnumValue {
            value: "E1".into(),
            expression: "E2 + 1".into(),
        };
        assert_eq!(
            warning.to_string(),
            "enum value 'E1' could not be resolved from 'E2 + 1'"
        );
    }
}
