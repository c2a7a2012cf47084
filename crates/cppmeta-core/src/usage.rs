//! Usage pattern classification.
//!
//! A [`UsagePattern`] tells the generator how a resolved type is marshalled.
//! It is a pure function of the entry kind, the indirection count, the
//! reference kind and the constness, computed by [`decide_usage_pattern`].
//! [`MetaType`](crate::MetaType) re-runs it on every structural edit, so the
//! stored tag always matches the current structure.

use crate::entries::{TypeEntry, TypeEntryKind};
use crate::meta_type::ReferenceType;

/// How a resolved type is used at one syntactic site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsagePattern {
    /// Scalar passed by value.
    Primitive,
    /// String-like value type.
    String,
    /// Enum passed by value.
    Enum,
    /// Flags wrapper passed by value.
    Flags,
    /// Value type by value or by reference.
    Value,
    /// Value type by pointer.
    ValuePointer,
    /// Object type by value or by reference.
    Object,
    /// Object type by pointer.
    ObjectPointer,
    /// QObject-derived type by pointer or reference.
    QObject,
    /// Generic container.
    Container,
    /// Smart pointer.
    PointerContainer,
    /// Container iterator.
    Iterator,
    /// Function pointer or functor.
    Functional,
    /// Native array.
    Array,
    /// Raw pointer the binding cannot map structurally.
    NativePointer,
    /// Rvalue reference to a class type.
    RValue,
    /// Unbound or bound template parameter.
    TemplateArgument,
    /// `std::nullptr_t`.
    Nullptr,
    /// `auto`.
    Auto,
    /// Entry kinds that never appear at a use site (namespaces, aliases).
    Invalid,
}

/// Classify a type use.
///
/// Total over every entry kind; the same inputs always give the same tag.
pub fn decide_usage_pattern(
    entry: &TypeEntry,
    indirections: usize,
    reference: ReferenceType,
    is_constant: bool,
) -> UsagePattern {
    // A non-const lvalue reference to a scalar is an out-parameter.
    let mutable_reference = reference == ReferenceType::LValue && !is_constant;

    match &entry.kind {
        TypeEntryKind::TemplateArgument { .. }
        | TypeEntryKind::InstantiatedTemplateArgument { .. } => UsagePattern::TemplateArgument,
        TypeEntryKind::Namespace | TypeEntryKind::Global | TypeEntryKind::Alias { .. } => {
            UsagePattern::Invalid
        }
        TypeEntryKind::Array { .. } => by_value_or_pointer(indirections, UsagePattern::Array),
        TypeEntryKind::Primitive => match entry.qualified_name.as_str() {
            "std::nullptr_t" | "nullptr_t" if indirections == 0 => UsagePattern::Nullptr,
            "auto" if indirections == 0 => UsagePattern::Auto,
            _ if indirections == 0 && !mutable_reference => UsagePattern::Primitive,
            _ => UsagePattern::NativePointer,
        },
        _ if indirections == 0 && reference == ReferenceType::RValue => UsagePattern::RValue,
        TypeEntryKind::Enum { .. } if indirections == 0 && !mutable_reference => {
            UsagePattern::Enum
        }
        TypeEntryKind::Flags { .. } if indirections == 0 && !mutable_reference => {
            UsagePattern::Flags
        }
        TypeEntryKind::Enum { .. } | TypeEntryKind::Flags { .. } => UsagePattern::NativePointer,
        TypeEntryKind::Value { is_string } => match indirections {
            0 if *is_string && !mutable_reference => UsagePattern::String,
            0 => UsagePattern::Value,
            1 => UsagePattern::ValuePointer,
            _ => UsagePattern::NativePointer,
        },
        TypeEntryKind::Object { is_qobject, .. } => match indirections {
            0 | 1 if *is_qobject => UsagePattern::QObject,
            0 => UsagePattern::Object,
            1 => UsagePattern::ObjectPointer,
            _ => UsagePattern::NativePointer,
        },
        TypeEntryKind::Container { .. } => by_value_or_pointer(indirections, UsagePattern::Container),
        TypeEntryKind::PointerContainer { .. } => {
            by_value_or_pointer(indirections, UsagePattern::PointerContainer)
        }
        TypeEntryKind::Iterator { .. } => by_value_or_pointer(indirections, UsagePattern::Iterator),
        TypeEntryKind::Functional { .. } => {
            by_value_or_pointer(indirections, UsagePattern::Functional)
        }
    }
}

fn by_value_or_pointer(indirections: usize, pattern: UsagePattern) -> UsagePattern {
    if indirections == 0 {
        pattern
    } else {
        UsagePattern::NativePointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::{ContainerKind, PointerContainerKind};

    fn all_entries() -> Vec<TypeEntry> {
        vec![
            TypeEntry::primitive("int"),
            TypeEntry::primitive("void"),
            TypeEntry::primitive("std::nullptr_t"),
            TypeEntry::primitive("auto"),
            TypeEntry::enumeration("Qt::Key"),
            TypeEntry::flags("Qt::Alignment", "Qt::AlignmentFlag"),
            TypeEntry::value("QPoint"),
            TypeEntry::string("QString"),
            TypeEntry::object("QPainter"),
            TypeEntry::qobject("QObject"),
            TypeEntry::interface("QPaintDevice"),
            TypeEntry::container("QList", ContainerKind::List),
            TypeEntry::pointer_container("QSharedPointer", PointerContainerKind::SharedPointer),
            TypeEntry::iterator("QList", false),
            TypeEntry::functional("Callback", None),
            TypeEntry::template_argument("T", 0),
            TypeEntry::instantiated_template_argument("T", 0, "int"),
            TypeEntry::array("int", Some("4".into())),
            TypeEntry::namespace("Qt"),
            TypeEntry::global("Global"),
            TypeEntry::alias("qreal", "double"),
        ]
    }

    #[test]
    fn classification_is_total_and_stable() {
        let references = [
            ReferenceType::NoReference,
            ReferenceType::LValue,
            ReferenceType::RValue,
        ];
        for entry in all_entries() {
            for indirections in 0..3 {
                for reference in references {
                    for is_constant in [false, true] {
                        let first = decide_usage_pattern(&entry, indirections, reference, is_constant);
                        let second = decide_usage_pattern(&entry, indirections, reference, is_constant);
                        assert_eq!(first, second, "{} not stable", entry.qualified_name);
                    }
                }
            }
        }
    }

    #[test]
    fn primitive_patterns() {
        let int = TypeEntry::primitive("int");
        assert_eq!(
            decide_usage_pattern(&int, 0, ReferenceType::NoReference, false),
            UsagePattern::Primitive
        );
        assert_eq!(
            decide_usage_pattern(&int, 0, ReferenceType::LValue, true),
            UsagePattern::Primitive
        );
        assert_eq!(
            decide_usage_pattern(&int, 0, ReferenceType::LValue, false),
            UsagePattern::NativePointer
        );
        assert_eq!(
            decide_usage_pattern(&int, 1, ReferenceType::NoReference, false),
            UsagePattern::NativePointer
        );
    }

    #[test]
    fn object_patterns() {
        let painter = TypeEntry::object("QPainter");
        assert_eq!(
            decide_usage_pattern(&painter, 0, ReferenceType::LValue, false),
            UsagePattern::Object
        );
        assert_eq!(
            decide_usage_pattern(&painter, 1, ReferenceType::NoReference, false),
            UsagePattern::ObjectPointer
        );
        let object = TypeEntry::qobject("QObject");
        assert_eq!(
            decide_usage_pattern(&object, 1, ReferenceType::NoReference, false),
            UsagePattern::QObject
        );
        assert_eq!(
            decide_usage_pattern(&object, 2, ReferenceType::NoReference, false),
            UsagePattern::NativePointer
        );
    }

    #[test]
    fn string_and_rvalue_patterns() {
        let string = TypeEntry::string("QString");
        assert_eq!(
            decide_usage_pattern(&string, 0, ReferenceType::LValue, true),
            UsagePattern::String
        );
        assert_eq!(
            decide_usage_pattern(&string, 0, ReferenceType::LValue, false),
            UsagePattern::Value
        );
        assert_eq!(
            decide_usage_pattern(&string, 0, ReferenceType::RValue, false),
            UsagePattern::RValue
        );
    }

    #[test]
    fn special_primitives() {
        let nullptr = TypeEntry::primitive("std::nullptr_t");
        assert_eq!(
            decide_usage_pattern(&nullptr, 0, ReferenceType::NoReference, false),
            UsagePattern::Nullptr
        );
        let auto = TypeEntry::primitive("auto");
        assert_eq!(
            decide_usage_pattern(&auto, 0, ReferenceType::NoReference, false),
            UsagePattern::Auto
        );
    }

    #[test]
    fn non_use_site_entries_are_invalid() {
        let ns = TypeEntry::namespace("Qt");
        assert_eq!(
            decide_usage_pattern(&ns, 0, ReferenceType::NoReference, false),
            UsagePattern::Invalid
        );
    }
}
