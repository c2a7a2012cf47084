//! Enum records and their values.
//!
//! An enumerator starts out [`EnumValue::Unresolved`] holding its raw
//! initializer expression. The enum-value pass resolves it exactly once;
//! after that [`MetaEnumValue::resolve`] refuses further writes.

use std::fmt;
use std::sync::Arc;

use crate::entries::TypeEntry;
use crate::{Access, ClassId};

/// Integral width of an enum's underlying type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum IntegerWidth {
    W8,
    W16,
    #[default]
    W32,
    W64,
}

impl IntegerWidth {
    /// Width of a C++ integral type name, `None` for non-integral names.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let width = match name.trim() {
            "char" | "signed char" | "unsigned char" | "uchar" | "qint8" | "quint8" | "int8_t"
            | "uint8_t" | "std::int8_t" | "std::uint8_t" | "bool" => IntegerWidth::W8,
            "short" | "short int" | "unsigned short" | "ushort" | "qint16" | "quint16"
            | "int16_t" | "uint16_t" | "std::int16_t" | "std::uint16_t" | "char16_t" => {
                IntegerWidth::W16
            }
            "int" | "signed" | "signed int" | "unsigned" | "unsigned int" | "uint" | "qint32"
            | "quint32" | "int32_t" | "uint32_t" | "std::int32_t" | "std::uint32_t"
            | "char32_t" | "wchar_t" => IntegerWidth::W32,
            "long" | "long int" | "unsigned long" | "ulong" | "long long" | "unsigned long long"
            | "qint64" | "quint64" | "qlonglong" | "qulonglong" | "int64_t" | "uint64_t"
            | "std::int64_t" | "std::uint64_t" | "size_t" | "std::size_t" | "qsizetype" => {
                IntegerWidth::W64
            }
            _ => return None,
        };
        Some(width)
    }

    pub const fn bits(self) -> u32 {
        match self {
            IntegerWidth::W8 => 8,
            IntegerWidth::W16 => 16,
            IntegerWidth::W32 => 32,
            IntegerWidth::W64 => 64,
        }
    }

    /// Smallest width holding `value` as a signed integer.
    pub fn fitting(value: i64) -> Self {
        if i8::try_from(value).is_ok() {
            IntegerWidth::W8
        } else if i16::try_from(value).is_ok() {
            IntegerWidth::W16
        } else if i32::try_from(value).is_ok() {
            IntegerWidth::W32
        } else {
            IntegerWidth::W64
        }
    }
}

/// Value of one enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnumValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    /// Placeholder holding the expression still to be evaluated.
    Unresolved(String),
}

impl EnumValue {
    /// Store `value` at `width`, truncating like a C++ conversion to the
    /// underlying type.
    pub fn from_i64(width: IntegerWidth, value: i64) -> Self {
        match width {
            IntegerWidth::W8 => EnumValue::Int8(value as i8),
            IntegerWidth::W16 => EnumValue::Int16(value as i16),
            IntegerWidth::W32 => EnumValue::Int32(value as i32),
            IntegerWidth::W64 => EnumValue::Int64(value),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            EnumValue::Int8(v) => Some(v.into()),
            EnumValue::Int16(v) => Some(v.into()),
            EnumValue::Int32(v) => Some(v.into()),
            EnumValue::Int64(v) => Some(v),
            EnumValue::Unresolved(_) => None,
        }
    }

    pub fn width(&self) -> Option<IntegerWidth> {
        match self {
            EnumValue::Int8(_) => Some(IntegerWidth::W8),
            EnumValue::Int16(_) => Some(IntegerWidth::W16),
            EnumValue::Int32(_) => Some(IntegerWidth::W32),
            EnumValue::Int64(_) => Some(IntegerWidth::W64),
            EnumValue::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, EnumValue::Unresolved(_))
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumValue::Unresolved(expr) => write!(f, "<unresolved {expr}>"),
            other => match other.as_i64() {
                Some(v) => write!(f, "{v}"),
                None => Ok(()),
            },
        }
    }
}

/// One enumerator.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaEnumValue {
    pub name: String,
    /// Initializer as written, empty when implicit.
    pub expression: String,
    value: EnumValue,
    /// Qualified name of the owning enum.
    pub enum_name: String,
    pub deprecated: bool,
}

impl MetaEnumValue {
    /// Create an unresolved enumerator.
    pub fn new(
        name: impl Into<String>,
        expression: impl Into<String>,
        enum_name: impl Into<String>,
    ) -> Self {
        let expression = expression.into();
        Self {
            name: name.into(),
            value: EnumValue::Unresolved(expression.clone()),
            expression,
            enum_name: enum_name.into(),
            deprecated: false,
        }
    }

    pub fn value(&self) -> &EnumValue {
        &self.value
    }

    /// Write the resolved value. Returns `false` and leaves the value alone
    /// when it was already resolved.
    pub fn resolve(&mut self, value: EnumValue) -> bool {
        if self.value.is_resolved() || !value.is_resolved() {
            return false;
        }
        self.value = value;
        true
    }
}

/// An enum declared in a class, namespace or the global scope.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaEnum {
    /// Fully qualified name.
    pub qualified_name: String,
    pub entry: Arc<TypeEntry>,
    /// Width of the underlying type.
    pub width: IntegerWidth,
    /// `enum class`.
    pub is_scoped: bool,
    pub is_anonymous: bool,
    pub access: Access,
    pub enclosing_class: Option<ClassId>,
    pub values: Vec<MetaEnumValue>,
    pub source_file: String,
}

impl MetaEnum {
    pub fn new(qualified_name: impl Into<String>, entry: Arc<TypeEntry>, width: IntegerWidth) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            entry,
            width,
            is_scoped: false,
            is_anonymous: false,
            access: Access::Public,
            enclosing_class: None,
            values: Vec::new(),
            source_file: String::new(),
        }
    }

    /// Simple name.
    pub fn name(&self) -> &str {
        self.qualified_name
            .rsplit("::")
            .next()
            .unwrap_or(&self.qualified_name)
    }

    pub fn find_value(&self, name: &str) -> Option<&MetaEnumValue> {
        self.values.iter().find(|v| v.name == name)
    }

    /// All values are concrete.
    pub fn is_resolved(&self) -> bool {
        self.values.iter().all(|v| v.value().is_resolved())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_from_type_names() {
        assert_eq!(IntegerWidth::from_type_name("quint8"), Some(IntegerWidth::W8));
        assert_eq!(IntegerWidth::from_type_name("unsigned short"), Some(IntegerWidth::W16));
        assert_eq!(IntegerWidth::from_type_name("long long"), Some(IntegerWidth::W64));
        assert_eq!(IntegerWidth::from_type_name("QString"), None);
    }

    #[test]
    fn values_truncate_to_width() {
        assert_eq!(EnumValue::from_i64(IntegerWidth::W8, 0x1ff), EnumValue::Int8(-1));
        assert_eq!(EnumValue::from_i64(IntegerWidth::W32, 7).as_i64(), Some(7));
        assert_eq!(IntegerWidth::fitting(300), IntegerWidth::W16);
    }

    #[test]
    fn enumerator_resolves_once() {
        let mut value = MetaEnumValue::new("B", "A | 2", "Flags");
        assert!(!value.value().is_resolved());
        assert!(!value.resolve(EnumValue::Unresolved("x".into())));
        assert!(value.resolve(EnumValue::Int8(2)));
        assert!(!value.resolve(EnumValue::Int8(3)));
        assert_eq!(value.value().as_i64(), Some(2));
    }
}
