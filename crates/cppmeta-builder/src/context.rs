//! Build context shared by all passes.
//!
//! [`BuildContext`] owns the class arena and every piece of state the passes
//! hand to each other: the typedef table, builder-interned type entries, the
//! reject log, collected warnings and the template instance cache. Passes
//! borrow it mutably one at a time; nothing inside is shared or locked.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::warn;

use cppmeta_core::{
    BaseClassName, BuildWarning, ClassId, MetaClass, MetaTemplateParameter, RejectCategory,
    RejectReason, TypeEntry, join_scope,
};
use cppmeta_registry::MappingDatabase;

use crate::BuilderConfig;
use crate::constant::EnumConstantTable;
use crate::reject_log::RejectLog;
use crate::scope::{parent_scope, scope_chain};
use crate::template::{ClassTemplateRequest, TemplateInstanceCache};

/// Where a type expression is being translated.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    /// Lexical scope, e.g. `ns::Outer::Inner`. Empty for the global scope.
    pub scope: String,
    /// Class whose members are being translated.
    pub class: Option<ClassId>,
    /// Template parameters of the function being translated.
    pub function_template_parameters: Vec<MetaTemplateParameter>,
}

impl TypeContext {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn in_scope(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ..Self::default()
        }
    }

    pub fn for_class(id: ClassId, class: &MetaClass) -> Self {
        Self {
            scope: class.qualified_name.clone(),
            class: Some(id),
            function_template_parameters: Vec::new(),
        }
    }

    pub fn with_function_template_parameters(mut self, params: Vec<MetaTemplateParameter>) -> Self {
        self.function_template_parameters = params;
        self
    }
}

/// Mutable state of one build.
pub struct BuildContext<'db> {
    pub db: &'db dyn MappingDatabase,
    pub config: BuilderConfig,

    // === Class arena ===
    /// Every class, template and instance, in registration order.
    pub classes: Vec<MetaClass>,
    pub(crate) class_index: FxHashMap<String, ClassId>,
    pub global_class: Option<ClassId>,

    // === Name tables ===
    /// Qualified typedef name -> type expression as written.
    pub typedefs: FxHashMap<String, String>,
    /// Entries created by the builder (iterators, arrays, functionals).
    interned: FxHashMap<String, Arc<TypeEntry>>,
    /// Resolved enum constants by qualified name.
    pub enum_constants: EnumConstantTable,

    // === Templates ===
    pub template_cache: TemplateInstanceCache,
    pub class_template_requests: Vec<ClassTemplateRequest>,

    // === Diagnostics ===
    pub reject_log: RejectLog,
    pub warnings: Vec<BuildWarning>,
}

impl<'db> BuildContext<'db> {
    pub fn new(db: &'db dyn MappingDatabase, config: BuilderConfig) -> Self {
        Self {
            db,
            config,
            classes: Vec::new(),
            class_index: FxHashMap::default(),
            global_class: None,
            typedefs: FxHashMap::default(),
            interned: FxHashMap::default(),
            enum_constants: EnumConstantTable::default(),
            template_cache: TemplateInstanceCache::new(),
            class_template_requests: Vec::new(),
            reject_log: RejectLog::new(),
            warnings: Vec::new(),
        }
    }

    // === Classes ===

    /// Add a class to the arena and index it by qualified name.
    pub fn add_class(&mut self, class: MetaClass) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.class_index
            .entry(class.qualified_name.clone())
            .or_insert(id);
        self.classes.push(class);
        id
    }

    /// Make `id` findable under an additional name.
    pub fn alias_class(&mut self, name: impl Into<String>, id: ClassId) {
        self.class_index.entry(name.into()).or_insert(id);
    }

    pub fn class(&self, id: ClassId) -> &MetaClass {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut MetaClass {
        &mut self.classes[id.index()]
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + use<> {
        (0..self.classes.len() as u32).map(ClassId)
    }

    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.class_index.get(name).copied()
    }

    /// Find a class named `name` as seen from `scope`, innermost scope first.
    pub fn find_class_in_scope(&self, name: &str, scope: &str) -> Option<ClassId> {
        scope_chain(scope)
            .iter()
            .find_map(|s| self.find_class(&join_scope(s, name)))
    }

    /// Resolve a base-class name written inside `class`.
    ///
    /// An instance class registered under the full spelling
    /// (`Box<Int32>`) wins over the template it was built from.
    pub fn resolve_base_class(&self, class: ClassId, base: &BaseClassName) -> Option<ClassId> {
        let scope = parent_scope(&self.class(class).qualified_name);
        if base.name.contains('<') {
            if let Some(id) = self.find_class_in_scope(&base.name, &scope) {
                return Some(id);
            }
        }
        let template_name = base.name.split('<').next().unwrap_or(&base.name);
        self.find_class_in_scope(template_name, &scope)
            .filter(|id| *id != class)
    }

    // === Entries ===

    /// Database entry, or one the builder interned.
    pub fn lookup_entry(&self, name: &str) -> Option<Arc<TypeEntry>> {
        self.db
            .find_type(name)
            .or_else(|| self.interned.get(name).cloned())
    }

    /// Intern a builder-created entry. Returns the existing one if the name
    /// is already known.
    pub fn intern(&mut self, entry: TypeEntry) -> Arc<TypeEntry> {
        if let Some(existing) = self.db.find_type(&entry.qualified_name) {
            return existing;
        }
        self.interned
            .entry(entry.qualified_name.clone())
            .or_insert_with(|| Arc::new(entry))
            .clone()
    }

    // === Diagnostics ===

    pub fn warn(&mut self, warning: BuildWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    pub fn reject(
        &mut self,
        category: RejectCategory,
        signature: impl Into<String>,
        file: impl Into<String>,
        reason: RejectReason,
    ) {
        self.reject_log.record(category, signature, file, reason);
    }
}
