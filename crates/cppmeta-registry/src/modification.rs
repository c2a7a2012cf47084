//! Per-function modifications declared in the type system.

use cppmeta_core::Access;

/// What a modification does to the matched function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModificationKind {
    /// Rename in the generated binding.
    Rename(String),
    /// Drop from the generated binding.
    Remove,
    /// Change visibility.
    Access(Access),
    /// Replace the type of the argument at `index` (0-based).
    ReplaceArgumentType { index: usize, type_expression: String },
    /// Replace the default expression of the argument at `index`.
    ReplaceDefault { index: usize, expression: String },
    /// Remove the default expression of the argument at `index`.
    RemoveDefault { index: usize },
}

/// A modification bound to a class pattern and a minimal signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionModification {
    /// Qualified class name, or `*` for every class.
    pub class_pattern: String,
    /// Minimal signature, e.g. `setText(QString)`.
    pub signature: String,
    pub kind: ModificationKind,
}

impl FunctionModification {
    pub fn new(
        class_pattern: impl Into<String>,
        signature: impl Into<String>,
        kind: ModificationKind,
    ) -> Self {
        Self {
            class_pattern: class_pattern.into(),
            signature: signature.into(),
            kind,
        }
    }

    /// Whether this modification applies to `signature` in `class`.
    pub fn matches(&self, class: &str, signature: &str) -> bool {
        (self.class_pattern == "*" || self.class_pattern == class) && self.signature == signature
    }
}
