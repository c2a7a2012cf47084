//! Structured form of a parsed type expression.

use std::fmt;

use cppmeta_core::ReferenceType;

/// A parsed C++ type expression.
///
/// Created fresh by [`parse`](super::parse) for one string and never
/// mutated by the parser afterwards. When the text was malformed the
/// descriptor is *busted*: callers must check [`is_busted`](Self::is_busted)
/// before using any other field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeDescriptor {
    /// Qualified-name segments without template arguments.
    pub qualified_name: Vec<String>,
    /// Segment carrying [`arguments`](Self::arguments), usually the last one.
    /// `QList<int>::iterator` has its arguments on segment 0.
    pub arguments_segment: usize,
    pub is_constant: bool,
    pub is_volatile: bool,
    pub reference: ReferenceType,
    /// One flag per pointer level; `true` for `* const`.
    pub indirections: Vec<bool>,
    /// Array dimensions, empty string for `[]`.
    pub arrays: Vec<String>,
    /// Template arguments, or parameter types of a function type.
    pub arguments: Vec<TypeDescriptor>,
    /// `R (*)(A, B)`.
    pub is_function_pointer: bool,
    /// Return type of a function type (`R(A,B)` or `R (*)(A,B)`).
    pub function_return: Option<Box<TypeDescriptor>>,
    pub(crate) busted: bool,
}

impl TypeDescriptor {
    /// A descriptor for a plain qualified name.
    pub fn named(name: &str) -> Self {
        let qualified_name = cppmeta_core::split_scopes(name);
        Self {
            arguments_segment: qualified_name.len().saturating_sub(1),
            qualified_name,
            ..Self::default()
        }
    }

    pub(crate) fn busted() -> Self {
        Self {
            busted: true,
            ..Self::default()
        }
    }

    /// The text did not parse.
    pub fn is_busted(&self) -> bool {
        self.busted
    }

    /// Function type or function pointer.
    pub fn is_function_type(&self) -> bool {
        self.function_return.is_some()
    }

    /// Has template arguments on some segment.
    pub fn has_template_arguments(&self) -> bool {
        !self.is_function_type() && !self.arguments.is_empty()
    }

    /// Qualified name without template arguments.
    pub fn name(&self) -> String {
        self.qualified_name.join("::")
    }

    /// Qualified name with template arguments, without cv/pointer/reference
    /// decorations.
    pub fn name_with_arguments(&self) -> String {
        let mut out = String::new();
        self.write_name(&mut out);
        out
    }

    /// Last segment.
    pub fn simple_name(&self) -> &str {
        self.qualified_name.last().map_or("", String::as_str)
    }

    /// Indirection count.
    pub fn indirection_count(&self) -> usize {
        self.indirections.len()
    }

    /// No decorations: not const, no pointer, reference or array.
    pub fn is_plain(&self) -> bool {
        !self.is_constant
            && !self.is_volatile
            && self.reference == ReferenceType::NoReference
            && self.indirections.is_empty()
            && self.arrays.is_empty()
    }

    /// Array whose outermost dimension has a known size.
    pub fn is_sized_array(&self) -> bool {
        self.arrays.first().is_some_and(|d| !d.is_empty())
    }

    /// Copy of this descriptor with the qualified name replaced.
    pub fn with_name(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.qualified_name = cppmeta_core::split_scopes(name);
        copy.arguments_segment = copy.qualified_name.len().saturating_sub(1);
        copy
    }

    /// Copy with the outermost array dimension removed.
    pub fn without_outer_array(&self) -> Self {
        let mut copy = self.clone();
        if !copy.arrays.is_empty() {
            copy.arrays.remove(0);
        }
        copy
    }

    /// Copy with cv-qualifiers, pointers, reference and arrays removed.
    pub fn undecorated(&self) -> Self {
        let mut copy = self.clone();
        copy.is_constant = false;
        copy.is_volatile = false;
        copy.reference = ReferenceType::NoReference;
        copy.indirections.clear();
        copy.arrays.clear();
        copy
    }

    fn write_name(&self, out: &mut String) {
        for (i, segment) in self.qualified_name.iter().enumerate() {
            if i > 0 {
                out.push_str("::");
            }
            out.push_str(segment);
            if i == self.arguments_segment && !self.is_function_type() && !self.arguments.is_empty() {
                out.push('<');
                push_list(out, &self.arguments);
                out.push('>');
            }
        }
    }
}

fn push_list(out: &mut String, items: &[TypeDescriptor]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&item.to_string());
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.busted {
            return write!(f, "<busted>");
        }
        let mut out = String::new();
        if self.is_constant {
            out.push_str("const ");
        }
        if self.is_volatile {
            out.push_str("volatile ");
        }
        if let Some(ret) = &self.function_return {
            out.push_str(&ret.to_string());
            if self.is_function_pointer {
                out.push_str("(*)");
            }
            out.push('(');
            push_list(&mut out, &self.arguments);
            out.push(')');
        } else {
            self.write_name(&mut out);
        }
        for is_const in &self.indirections {
            out.push_str(if *is_const { "*const" } else { "*" });
        }
        out.push_str(&self.reference.to_string());
        for dim in &self.arrays {
            out.push('[');
            out.push_str(dim);
            out.push(']');
        }
        f.write_str(&out)
    }
}
