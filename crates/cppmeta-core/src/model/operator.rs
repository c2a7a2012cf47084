//! C++ operator classification.
//!
//! Operator functions are recognised by name (`operator==`, `operator<<=`,
//! `operator int`). [`OperatorKind::from_function_name`] maps a function name
//! to its operator, with every non-symbolic suffix treated as a conversion
//! operator.

use std::fmt;

/// Operator implemented by a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    // === Assignment ===
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,

    // === Arithmetic and bitwise ===
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    BitNot,

    // === Logical ===
    Not,
    LogicalAnd,
    LogicalOr,

    // === Comparison ===
    Equals,
    NotEquals,
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    /// `<=>`
    ThreeWay,

    // === Increment/decrement ===
    Increment,
    Decrement,

    // === Access ===
    Subscript,
    Call,
    Arrow,
    Comma,

    // === Memory ===
    New,
    Delete,

    /// `operator T()`
    Conversion,
}

impl OperatorKind {
    /// Classify a function name, `None` for ordinary functions.
    pub fn from_function_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("operator")?;
        // `operatorFoo` is an identifier, not an operator.
        if rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return None;
        }
        let symbol = rest.trim();
        if symbol.is_empty() {
            return None;
        }
        Some(Self::from_symbol(symbol).unwrap_or(OperatorKind::Conversion))
    }

    /// Classify an operator symbol such as `==` or `[]`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let kind = match symbol {
            "=" => OperatorKind::Assign,
            "+=" => OperatorKind::AddAssign,
            "-=" => OperatorKind::SubAssign,
            "*=" => OperatorKind::MulAssign,
            "/=" => OperatorKind::DivAssign,
            "%=" => OperatorKind::ModAssign,
            "&=" => OperatorKind::AndAssign,
            "|=" => OperatorKind::OrAssign,
            "^=" => OperatorKind::XorAssign,
            "<<=" => OperatorKind::ShlAssign,
            ">>=" => OperatorKind::ShrAssign,
            "+" => OperatorKind::Add,
            "-" => OperatorKind::Sub,
            "*" => OperatorKind::Mul,
            "/" => OperatorKind::Div,
            "%" => OperatorKind::Mod,
            "&" => OperatorKind::BitAnd,
            "|" => OperatorKind::BitOr,
            "^" => OperatorKind::BitXor,
            "<<" => OperatorKind::Shl,
            ">>" => OperatorKind::Shr,
            "~" => OperatorKind::BitNot,
            "!" => OperatorKind::Not,
            "&&" => OperatorKind::LogicalAnd,
            "||" => OperatorKind::LogicalOr,
            "==" => OperatorKind::Equals,
            "!=" => OperatorKind::NotEquals,
            "<" => OperatorKind::Less,
            ">" => OperatorKind::Greater,
            "<=" => OperatorKind::LessEquals,
            ">=" => OperatorKind::GreaterEquals,
            "<=>" => OperatorKind::ThreeWay,
            "++" => OperatorKind::Increment,
            "--" => OperatorKind::Decrement,
            "[]" => OperatorKind::Subscript,
            "()" => OperatorKind::Call,
            "->" => OperatorKind::Arrow,
            "," => OperatorKind::Comma,
            "new" | "new[]" => OperatorKind::New,
            "delete" | "delete[]" => OperatorKind::Delete,
            _ => {
                let compact: String = symbol.chars().filter(|c| !c.is_whitespace()).collect();
                if compact != symbol {
                    return Self::from_symbol(&compact);
                }
                return None;
            }
        };
        Some(kind)
    }

    /// C++ spelling of the operator symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            OperatorKind::Assign => "=",
            OperatorKind::AddAssign => "+=",
            OperatorKind::SubAssign => "-=",
            OperatorKind::MulAssign => "*=",
            OperatorKind::DivAssign => "/=",
            OperatorKind::ModAssign => "%=",
            OperatorKind::AndAssign => "&=",
            OperatorKind::OrAssign => "|=",
            OperatorKind::XorAssign => "^=",
            OperatorKind::ShlAssign => "<<=",
            OperatorKind::ShrAssign => ">>=",
            OperatorKind::Add => "+",
            OperatorKind::Sub => "-",
            OperatorKind::Mul => "*",
            OperatorKind::Div => "/",
            OperatorKind::Mod => "%",
            OperatorKind::BitAnd => "&",
            OperatorKind::BitOr => "|",
            OperatorKind::BitXor => "^",
            OperatorKind::Shl => "<<",
            OperatorKind::Shr => ">>",
            OperatorKind::BitNot => "~",
            OperatorKind::Not => "!",
            OperatorKind::LogicalAnd => "&&",
            OperatorKind::LogicalOr => "||",
            OperatorKind::Equals => "==",
            OperatorKind::NotEquals => "!=",
            OperatorKind::Less => "<",
            OperatorKind::Greater => ">",
            OperatorKind::LessEquals => "<=",
            OperatorKind::GreaterEquals => ">=",
            OperatorKind::ThreeWay => "<=>",
            OperatorKind::Increment => "++",
            OperatorKind::Decrement => "--",
            OperatorKind::Subscript => "[]",
            OperatorKind::Call => "()",
            OperatorKind::Arrow => "->",
            OperatorKind::Comma => ",",
            OperatorKind::New => "new",
            OperatorKind::Delete => "delete",
            OperatorKind::Conversion => "",
        }
    }

    /// `==` or `!=`.
    pub const fn is_equality(self) -> bool {
        matches!(self, OperatorKind::Equals | OperatorKind::NotEquals)
    }

    /// Ordering operators, including `<=>`.
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            OperatorKind::Less
                | OperatorKind::Greater
                | OperatorKind::LessEquals
                | OperatorKind::GreaterEquals
                | OperatorKind::ThreeWay
        )
    }

    pub const fn is_comparison(self) -> bool {
        self.is_equality() || self.is_ordering()
    }

    /// Compound or plain assignment.
    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            OperatorKind::Assign
                | OperatorKind::AddAssign
                | OperatorKind::SubAssign
                | OperatorKind::MulAssign
                | OperatorKind::DivAssign
                | OperatorKind::ModAssign
                | OperatorKind::AndAssign
                | OperatorKind::OrAssign
                | OperatorKind::XorAssign
                | OperatorKind::ShlAssign
                | OperatorKind::ShrAssign
        )
    }

    /// Operators that may be declared as free functions and promoted onto
    /// their first argument's class.
    pub const fn is_promotable(self) -> bool {
        !matches!(
            self,
            OperatorKind::Assign
                | OperatorKind::Subscript
                | OperatorKind::Call
                | OperatorKind::Arrow
                | OperatorKind::New
                | OperatorKind::Delete
                | OperatorKind::Conversion
        )
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::Conversion => write!(f, "operator <conversion>"),
            other => write!(f, "operator{}", other.symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_symbolic_operators() {
        assert_eq!(OperatorKind::from_function_name("operator=="), Some(OperatorKind::Equals));
        assert_eq!(OperatorKind::from_function_name("operator <=>"), Some(OperatorKind::ThreeWay));
        assert_eq!(OperatorKind::from_function_name("operator[]"), Some(OperatorKind::Subscript));
        assert_eq!(OperatorKind::from_function_name("operator ( )"), Some(OperatorKind::Call));
        assert_eq!(OperatorKind::from_function_name("operator<<="), Some(OperatorKind::ShlAssign));
    }

    #[test]
    fn classify_conversion_operators() {
        assert_eq!(OperatorKind::from_function_name("operator int"), Some(OperatorKind::Conversion));
        assert_eq!(
            OperatorKind::from_function_name("operator const char *"),
            Some(OperatorKind::Conversion)
        );
    }

    #[test]
    fn identifiers_are_not_operators() {
        assert_eq!(OperatorKind::from_function_name("operatorName"), None);
        assert_eq!(OperatorKind::from_function_name("size"), None);
        assert_eq!(OperatorKind::from_function_name("operator"), None);
    }

    #[test]
    fn comparison_groups() {
        assert!(OperatorKind::Equals.is_equality());
        assert!(OperatorKind::ThreeWay.is_ordering());
        assert!(!OperatorKind::Add.is_comparison());
        assert!(OperatorKind::AddAssign.is_assignment());
        assert!(!OperatorKind::Subscript.is_promotable());
    }
}
