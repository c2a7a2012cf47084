//! MetaType - a resolved use of a type entry at one syntactic site.
//!
//! A `MetaType` combines a shared [`TypeEntry`] with the decorations of one
//! use site: constness, pointer levels, reference kind and template
//! instantiations. Its [`UsagePattern`] is never set directly; every
//! constructor and mutator re-runs [`decide_usage_pattern`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use cppmeta_core::{Indirection, MetaType, ReferenceType, TypeEntry, UsagePattern};
//!
//! let object = Arc::new(TypeEntry::object("QPainter"));
//! let mut ty = MetaType::new(object);
//! assert_eq!(ty.usage_pattern(), UsagePattern::Object);
//!
//! ty.push_indirection(Indirection::Pointer);
//! assert_eq!(ty.usage_pattern(), UsagePattern::ObjectPointer);
//! assert_eq!(ty.to_string(), "QPainter*");
//! ```

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::entries::{TypeEntry, TypeEntryKind};
use crate::usage::{UsagePattern, decide_usage_pattern};

/// Reference kind of a type use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceType {
    /// Not a reference.
    #[default]
    NoReference,
    /// `T&`
    LValue,
    /// `T&&`
    RValue,
}

impl Display for ReferenceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceType::NoReference => Ok(()),
            ReferenceType::LValue => write!(f, "&"),
            ReferenceType::RValue => write!(f, "&&"),
        }
    }
}

/// One pointer level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indirection {
    /// `*`
    Pointer,
    /// `* const`
    ConstPointer,
}

/// A resolved type use.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaType {
    entry: Arc<TypeEntry>,
    is_constant: bool,
    is_volatile: bool,
    reference: ReferenceType,
    indirections: Vec<Indirection>,
    instantiations: Vec<MetaType>,
    usage_pattern: UsagePattern,
}

impl MetaType {
    /// Create an undecorated use of `entry`.
    pub fn new(entry: Arc<TypeEntry>) -> Self {
        let mut ty = Self {
            entry,
            is_constant: false,
            is_volatile: false,
            reference: ReferenceType::NoReference,
            indirections: Vec::new(),
            instantiations: Vec::new(),
            usage_pattern: UsagePattern::Invalid,
        };
        ty.decide_usage_pattern();
        ty
    }

    // === Builder Methods ===

    /// Set constness.
    pub fn with_constant(mut self, is_constant: bool) -> Self {
        self.set_constant(is_constant);
        self
    }

    /// Set volatility.
    pub fn with_volatile(mut self, is_volatile: bool) -> Self {
        self.is_volatile = is_volatile;
        self
    }

    /// Set the reference kind.
    pub fn with_reference(mut self, reference: ReferenceType) -> Self {
        self.set_reference(reference);
        self
    }

    /// Set the pointer levels.
    pub fn with_indirections(mut self, indirections: Vec<Indirection>) -> Self {
        self.set_indirections(indirections);
        self
    }

    /// Set the template instantiations.
    pub fn with_instantiations(mut self, instantiations: Vec<MetaType>) -> Self {
        self.set_instantiations(instantiations);
        self
    }

    // === Accessors ===

    /// The referenced type entry.
    pub fn entry(&self) -> &Arc<TypeEntry> {
        &self.entry
    }

    pub fn is_constant(&self) -> bool {
        self.is_constant
    }

    pub fn is_volatile(&self) -> bool {
        self.is_volatile
    }

    pub fn reference(&self) -> ReferenceType {
        self.reference
    }

    pub fn indirections(&self) -> &[Indirection] {
        &self.indirections
    }

    pub fn instantiations(&self) -> &[MetaType] {
        &self.instantiations
    }

    /// Current usage pattern.
    pub fn usage_pattern(&self) -> UsagePattern {
        self.usage_pattern
    }

    /// `void` without indirections.
    pub fn is_void(&self) -> bool {
        self.entry.is_void() && self.indirections.is_empty()
    }

    /// Unbound template parameter at this site.
    pub fn is_template_argument(&self) -> bool {
        self.entry.is_template_argument()
    }

    /// Whether an unbound template parameter appears anywhere in this type.
    pub fn contains_template_arguments(&self) -> bool {
        self.is_template_argument()
            || self
                .instantiations
                .iter()
                .any(MetaType::contains_template_arguments)
    }

    // === Mutators (each re-classifies) ===

    /// Retarget to another entry.
    pub fn set_entry(&mut self, entry: Arc<TypeEntry>) {
        self.entry = entry;
        self.decide_usage_pattern();
    }

    pub fn set_constant(&mut self, is_constant: bool) {
        self.is_constant = is_constant;
        self.decide_usage_pattern();
    }

    pub fn set_reference(&mut self, reference: ReferenceType) {
        self.reference = reference;
        self.decide_usage_pattern();
    }

    pub fn set_indirections(&mut self, indirections: Vec<Indirection>) {
        self.indirections = indirections;
        self.decide_usage_pattern();
    }

    pub fn push_indirection(&mut self, indirection: Indirection) {
        self.indirections.push(indirection);
        self.decide_usage_pattern();
    }

    pub fn set_instantiations(&mut self, instantiations: Vec<MetaType>) {
        self.instantiations = instantiations;
        self.decide_usage_pattern();
    }

    /// Mutable access to instantiations; the pattern is recomputed when the
    /// closure returns.
    pub fn edit_instantiations<R>(&mut self, edit: impl FnOnce(&mut Vec<MetaType>) -> R) -> R {
        let result = edit(&mut self.instantiations);
        self.decide_usage_pattern();
        result
    }

    /// Re-run classification.
    ///
    /// Idempotent: running it on an unchanged type never changes the tag.
    pub fn decide_usage_pattern(&mut self) {
        self.usage_pattern = decide_usage_pattern(
            &self.entry,
            self.indirections.len(),
            self.reference,
            self.is_constant,
        );
    }

    // === Signatures ===

    /// Canonical C++ spelling, e.g. `const QList<int>&`.
    pub fn cpp_signature(&self) -> String {
        self.to_string()
    }

    /// Signature without top-level `const` and reference, as used in
    /// minimal function signatures for by-value-equivalent parameters.
    pub fn minimal_signature(&self) -> String {
        let mut out = String::new();
        self.write_base(&mut out);
        for indirection in &self.indirections {
            out.push_str(match indirection {
                Indirection::Pointer => "*",
                Indirection::ConstPointer => "*const",
            });
        }
        out
    }

    fn write_base(&self, out: &mut String) {
        match &self.entry.kind {
            TypeEntryKind::Iterator {
                container,
                is_const,
            } => {
                out.push_str(container);
                self.write_instantiations(out);
                out.push_str(if *is_const {
                    "::const_iterator"
                } else {
                    "::iterator"
                });
            }
            TypeEntryKind::Array { length, .. } => {
                if let Some(element) = self.instantiations.first() {
                    out.push_str(&element.to_string());
                }
                out.push('[');
                out.push_str(length.as_deref().unwrap_or(""));
                out.push(']');
            }
            _ => {
                out.push_str(&self.entry.qualified_name);
                self.write_instantiations(out);
            }
        }
    }

    fn write_instantiations(&self, out: &mut String) {
        if self.instantiations.is_empty() {
            return;
        }
        out.push('<');
        for (i, arg) in self.instantiations.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&arg.to_string());
        }
        out.push('>');
    }
}

impl Display for MetaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_constant {
            write!(f, "const ")?;
        }
        if self.is_volatile {
            write!(f, "volatile ")?;
        }
        write!(f, "{}{}", self.minimal_signature(), self.reference)
    }
}
