//! The finished metamodel.
//!
//! [`MetaModel`] is what a build hands to a generator. It only exposes shared
//! accessors; nothing in it changes after [`MetaBuilder::build`] returns.
//!
//! Generic class templates are kept apart from the emitted classes: they are
//! reachable through [`MetaModel::templates`] but never through
//! [`MetaModel::classes`].
//!
//! [`MetaBuilder::build`]: crate::MetaBuilder::build

use rustc_hash::FxHashMap;

use cppmeta_core::{BuildWarning, ClassId, MetaClass};

use crate::constant::EnumConstantTable;
use crate::context::BuildContext;
use crate::reject_log::RejectLog;

/// Read-only result of a build.
#[derive(Debug, Clone)]
pub struct MetaModel {
    classes: Vec<MetaClass>,
    class_index: FxHashMap<String, ClassId>,
    global_class: Option<ClassId>,
    dependency_order: Vec<ClassId>,
    typedefs: FxHashMap<String, String>,
    enum_constants: EnumConstantTable,
    reject_log: RejectLog,
    warnings: Vec<BuildWarning>,
}

impl MetaModel {
    pub(crate) fn freeze(ctx: BuildContext<'_>, dependency_order: Vec<ClassId>) -> Self {
        Self {
            classes: ctx.classes,
            class_index: ctx.class_index,
            global_class: ctx.global_class,
            dependency_order,
            typedefs: ctx.typedefs,
            enum_constants: ctx.enum_constants,
            reject_log: ctx.reject_log,
            warnings: ctx.warnings,
        }
    }

    // === Classes ===

    /// Emitted classes in registration order. Templates are excluded.
    pub fn classes(&self) -> impl Iterator<Item = &MetaClass> {
        self.classes.iter().filter(|c| !c.is_template())
    }

    /// Generic class templates.
    pub fn templates(&self) -> impl Iterator<Item = &MetaClass> {
        self.classes.iter().filter(|c| c.is_template())
    }

    pub fn class(&self, id: ClassId) -> Option<&MetaClass> {
        self.classes.get(id.index())
    }

    /// Find a class or template by qualified name or typedef alias.
    pub fn find_class(&self, name: &str) -> Option<&MetaClass> {
        self.class_index.get(name).and_then(|id| self.class(*id))
    }

    pub fn find_class_id(&self, name: &str) -> Option<ClassId> {
        self.class_index.get(name).copied()
    }

    /// The synthetic class holding accepted global functions, if any were.
    pub fn global_class(&self) -> Option<&MetaClass> {
        self.global_class.and_then(|id| self.class(id))
    }

    /// Emitted classes with every base before the classes deriving from it.
    ///
    /// Falls back to registration order when the class graph has a cycle;
    /// the build then reports [`BuildWarning::CyclicDependency`].
    pub fn classes_in_dependency_order(&self) -> impl Iterator<Item = &MetaClass> {
        self.dependency_order
            .iter()
            .filter_map(|id| self.class(*id))
    }

    // === Name tables ===

    /// Type expression a typedef was declared with.
    pub fn typedef(&self, qualified_name: &str) -> Option<&str> {
        self.typedefs.get(qualified_name).map(String::as_str)
    }

    /// Value of a resolved enumerator, by qualified name.
    pub fn enum_constant(&self, qualified_name: &str) -> Option<i64> {
        self.enum_constants.get(qualified_name)
    }

    // === Diagnostics ===

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    pub fn reject_log(&self) -> &RejectLog {
        &self.reject_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuilderConfig;
    use cppmeta_core::{MetaTemplateParameter, TypeEntry};
    use cppmeta_registry::TypeDatabase;
    use std::sync::Arc;

    #[test]
    fn templates_are_kept_apart() {
        let db = TypeDatabase::new();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let mut list = MetaClass::new(Arc::new(TypeEntry::value("QList")));
        list.template_parameters.push(MetaTemplateParameter::new("T", 0));
        ctx.add_class(list);
        let strings = ctx.add_class(MetaClass::new(Arc::new(TypeEntry::value("QStringList"))));
        ctx.alias_class("StringList", strings);

        let model = MetaModel::freeze(ctx, vec![strings]);

        let names: Vec<&str> = model.classes().map(|c| c.qualified_name.as_str()).collect();
        assert_eq!(names, vec!["QStringList"]);
        assert_eq!(model.templates().count(), 1);
        assert_eq!(model.find_class("QList").map(MetaClass::is_template), Some(true));
        assert_eq!(model.find_class_id("StringList"), Some(strings));
        assert!(model.global_class().is_none());
        assert_eq!(model.classes_in_dependency_order().count(), 1);
    }
}
