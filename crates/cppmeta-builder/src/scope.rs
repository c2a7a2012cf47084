//! Scope-aware name resolution.
//!
//! Names in C++ declarations are written relative to the scope they appear
//! in. [`ScopeResolver`] turns such a name into a fully qualified one that
//! the mapping database or the typedef table knows, trying in order:
//!
//! 1. the name exactly as written
//! 2. every enclosing scope, innermost first (type, then typedef)
//! 3. the base classes of the enclosing classes, breadth first
//! 4. the configured fallback namespace
//!
//! The first hit wins. A type-system entry shadows a typedef of the same
//! name, and a typedef only counts when its target differs from the name
//! being resolved.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tracing::trace;

use cppmeta_core::{ClassId, QualifiedName, join_scope, split_scopes};

use crate::context::BuildContext;

/// What a name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A type known to the database or interned by the builder.
    Type(String),
    /// A typedef; `target` is the aliased expression as written.
    Typedef { name: String, target: String },
}

/// `a::b::c` -> `["a::b::c", "a::b", "a", ""]`.
pub fn scope_chain(scope: &str) -> Vec<String> {
    let segments = split_scopes(scope);
    let mut chain: Vec<String> = (1..=segments.len())
        .rev()
        .map(|n| segments[..n].join("::"))
        .collect();
    chain.push(String::new());
    chain
}

/// Scope enclosing a qualified name; empty for top-level names.
pub fn parent_scope(qualified_name: &str) -> String {
    QualifiedName::from_qualified_string(qualified_name).scope_string()
}

/// Resolves names against a read-only view of the build context.
pub struct ScopeResolver<'a, 'db> {
    ctx: &'a BuildContext<'db>,
}

impl<'a, 'db> ScopeResolver<'a, 'db> {
    pub fn new(ctx: &'a BuildContext<'db>) -> Self {
        Self { ctx }
    }

    /// Resolve `name` as written inside `scope`, optionally inside `class`.
    pub fn resolve(&self, name: &str, scope: &str, class: Option<ClassId>) -> Option<Resolution> {
        if self.is_known(name) {
            return Some(Resolution::Type(name.to_string()));
        }

        for s in scope_chain(scope) {
            if let Some(found) = self.probe(&s, name) {
                trace!(name, scope = %s, "resolved in enclosing scope");
                return Some(found);
            }
        }

        for base in self.enclosing_base_classes(scope, class) {
            let base_name = &self.ctx.class(base).qualified_name;
            if let Some(found) = self.probe(base_name, name) {
                trace!(name, base = %base_name, "resolved through base class");
                return Some(found);
            }
        }

        if let Some(fallback) = &self.ctx.config.fallback_namespace {
            if let Some(found) = self.probe(fallback, name) {
                trace!(name, fallback = %fallback, "resolved in fallback namespace");
                return Some(found);
            }
        }

        trace!(name, scope, "unresolved");
        None
    }

    /// Innermost typedef visible from `scope` whose target differs from
    /// `name`.
    pub fn resolve_typedef(&self, name: &str, scope: &str) -> Option<(String, String)> {
        scope_chain(scope).into_iter().find_map(|s| {
            let qualified = join_scope(&s, name);
            self.typedef_target(&qualified, name)
                .map(|target| (qualified, target.to_string()))
        })
    }

    /// Every class reachable through public base-class edges from `class`,
    /// breadth first, each visited once. `class` itself is not included.
    pub fn base_class_closure(&self, class: ClassId) -> Vec<ClassId> {
        let mut visited = FxHashSet::default();
        visited.insert(class);
        let mut order = Vec::new();
        let mut queue = VecDeque::from([class]);

        while let Some(current) = queue.pop_front() {
            let public_bases = self
                .ctx
                .class(current)
                .base_class_names
                .iter()
                .filter(|base| base.access.is_public());
            for base_name in public_bases {
                let Some(base) = self.ctx.resolve_base_class(current, base_name) else {
                    continue;
                };
                if visited.insert(base) {
                    order.push(base);
                    queue.push_back(base);
                }
            }
        }
        order
    }

    // === Internals ===

    fn is_known(&self, name: &str) -> bool {
        self.ctx.lookup_entry(name).is_some()
    }

    fn probe(&self, scope: &str, name: &str) -> Option<Resolution> {
        let qualified = join_scope(scope, name);
        if !scope.is_empty() && self.is_known(&qualified) {
            return Some(Resolution::Type(qualified));
        }
        self.typedef_target(&qualified, name)
            .map(|target| Resolution::Typedef {
                name: qualified.clone(),
                target: target.to_string(),
            })
    }

    fn typedef_target(&self, qualified: &str, name: &str) -> Option<&'a str> {
        self.ctx
            .typedefs
            .get(qualified)
            .map(String::as_str)
            .filter(|target| *target != name && *target != qualified)
    }

    /// Bases of `class` and of every class enclosing `scope`.
    fn enclosing_base_classes(&self, scope: &str, class: Option<ClassId>) -> Vec<ClassId> {
        let mut starts: Vec<ClassId> = Vec::new();
        let mut current = class;
        while let Some(id) = current {
            starts.push(id);
            current = self.ctx.class(id).enclosing_class;
        }
        for s in scope_chain(scope) {
            if let Some(id) = self.ctx.find_class(&s) {
                if !starts.contains(&id) {
                    starts.push(id);
                }
            }
        }

        let mut seen: FxHashSet<ClassId> = starts.iter().copied().collect();
        let mut bases = Vec::new();
        for start in starts {
            for base in self.base_class_closure(start) {
                if seen.insert(base) {
                    bases.push(base);
                }
            }
        }
        bases
    }
}
