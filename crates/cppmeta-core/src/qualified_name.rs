use std::fmt;

/// A `::`-separated C++ name split into its scope path and simple name.
///
/// # Examples
///
/// ```
/// use cppmeta_core::QualifiedName;
///
/// let name = QualifiedName::from_qualified_string("QtCore::QObject::Connection");
/// assert_eq!(name.simple_name(), "Connection");
/// assert_eq!(name.scope_string(), "QtCore::QObject");
/// assert_eq!(name.to_string(), "QtCore::QObject::Connection");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Simple name (e.g. `QObject`).
    pub name: String,
    /// Enclosing namespaces and classes, outermost first.
    pub scope: Vec<String>,
}

impl QualifiedName {
    /// Create a qualified name from a scope path and a simple name.
    pub fn new(name: impl Into<String>, scope: Vec<String>) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }

    /// Create a name in the global scope.
    pub fn global(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Split a `::`-separated string.
    ///
    /// Separators nested inside template brackets are kept with their
    /// segment: `QList<Qt::Key>::iterator` splits into `QList<Qt::Key>` and
    /// `iterator`. A leading `::` is dropped.
    pub fn from_qualified_string(s: &str) -> Self {
        let mut parts = split_scopes(s);
        match parts.pop() {
            Some(name) => Self::new(name, parts),
            None => Self::global(""),
        }
    }

    /// Check if this name lives in the global scope.
    pub fn is_global(&self) -> bool {
        self.scope.is_empty()
    }

    /// Get the simple (unqualified) name.
    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// Get the scope joined with `::`.
    pub fn scope_string(&self) -> String {
        self.scope.join("::")
    }

    /// Create a child name within this one.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut scope = self.scope.clone();
        scope.push(self.name.clone());
        Self::new(name, scope)
    }

    /// The enclosing scope as a name, if any.
    pub fn parent(&self) -> Option<Self> {
        let (last, rest) = self.scope.split_last()?;
        Some(Self::new(last.clone(), rest.to_vec()))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.scope {
            write!(f, "{segment}::")?;
        }
        write!(f, "{}", self.name)
    }
}

/// Split a name on top-level `::` separators.
pub fn split_scopes(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ':' if depth == 0 && chars.peek() == Some(&':') => {
                chars.next();
                if !current.trim().is_empty() {
                    parts.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Join a scope path and a simple name with `::`, skipping an empty scope.
pub fn join_scope(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}::{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_name() {
        let name = QualifiedName::global("QString");
        assert!(name.is_global());
        assert_eq!(name.to_string(), "QString");
        assert!(name.parent().is_none());
    }

    #[test]
    fn from_string_with_template_scope() {
        let name = QualifiedName::from_qualified_string("QList<Qt::Key>::iterator");
        assert_eq!(name.name, "iterator");
        assert_eq!(name.scope, vec!["QList<Qt::Key>".to_string()]);
    }

    #[test]
    fn leading_separator_is_dropped() {
        let name = QualifiedName::from_qualified_string("::Qt::Alignment");
        assert_eq!(name.to_string(), "Qt::Alignment");
    }

    #[test]
    fn child_and_parent() {
        let object = QualifiedName::from_qualified_string("QtCore::QObject");
        let child = object.child("Connection");
        assert_eq!(child.to_string(), "QtCore::QObject::Connection");
        assert_eq!(child.parent(), Some(object));
    }

    #[test]
    fn join_scope_skips_empty() {
        assert_eq!(join_scope("", "Foo"), "Foo");
        assert_eq!(join_scope("Qt", "Key"), "Qt::Key");
    }
}
