//! Build entry point.
//!
//! [`MetaBuilder`] collects translation units and runs the passes over one
//! [`BuildContext`]:
//!
//! 1. Registration: classes, members, enums, typedefs
//! 2. Class templates requested by typedefs; member types spelled as
//!    their template-ids are linked to the instances
//! 3. Inheritance: bases, interfaces, delegates, hidden template bases
//! 4. Member function templates
//! 5. Enum values, to a bounded fixpoint
//! 6. Default arguments
//! 7. Capabilities: equality, comparison, clone, iteration
//! 8. Dependency order
//!
//! Nothing here fails. Members that cannot be translated are marked invalid
//! or rejected, and structural problems become warnings on the model.

use tracing::info;

use cppmeta_parser::NamespaceDecl;
use cppmeta_registry::MappingDatabase;

use crate::BuilderConfig;
use crate::context::BuildContext;
use crate::model::MetaModel;
use crate::order::dependency_order;
use crate::passes::{
    CapabilitiesPass, DefaultArgsPass, EnumValuesPass, FunctionTemplatesPass, InheritancePass,
    RegistrationPass,
};
use crate::template::{instantiate_requested_templates, link_instance_types};

/// Builds a [`MetaModel`] from parsed declarations and a mapping database.
pub struct MetaBuilder<'db> {
    db: &'db dyn MappingDatabase,
    config: BuilderConfig,
    units: Vec<NamespaceDecl>,
}

impl<'db> MetaBuilder<'db> {
    pub fn new(db: &'db dyn MappingDatabase) -> Self {
        Self {
            db,
            config: BuilderConfig::default(),
            units: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Add the global namespace of one parsed header.
    pub fn add_translation_unit(&mut self, unit: NamespaceDecl) -> &mut Self {
        self.units.push(unit);
        self
    }

    pub fn with_translation_unit(mut self, unit: NamespaceDecl) -> Self {
        self.units.push(unit);
        self
    }

    /// Run every pass and freeze the result.
    pub fn build(self) -> MetaModel {
        let mut ctx = BuildContext::new(self.db, self.config);

        let registration = RegistrationPass::new(&mut ctx).run(&self.units);
        info!(
            classes = registration.classes_registered,
            functions = registration.functions_registered,
            invalid = registration.invalid_functions,
            rejected = registration.rejected,
            "registration complete"
        );

        let instances = instantiate_requested_templates(&mut ctx);
        let linked = link_instance_types(&mut ctx);
        info!(instances, linked, "class templates instantiated");

        let inheritance = InheritancePass::new(&mut ctx).run();
        info!(
            primary_bases = inheritance.primary_bases,
            interfaces = inheritance.interfaces,
            delegates = inheritance.delegates,
            "inheritance resolved"
        );

        let function_templates = FunctionTemplatesPass::new(&mut ctx).run();
        info!(
            instantiated = function_templates.instantiated,
            unbound = function_templates.unbound,
            "function templates instantiated"
        );

        EnumValuesPass::new(&mut ctx).run();

        let defaults = DefaultArgsPass::new(&mut ctx).run();
        info!(
            integers = defaults.integers,
            enum_constants = defaults.enum_constants,
            expressions = defaults.expressions,
            "default arguments translated"
        );

        let capabilities = CapabilitiesPass::new(&mut ctx).run();
        info!(
            comparable = capabilities.comparable,
            clonable = capabilities.clonable,
            iterable = capabilities.iterable,
            "capabilities derived"
        );

        let order = dependency_order(&mut ctx);
        info!(
            classes = order.len(),
            warnings = ctx.warnings.len(),
            rejected = ctx.reject_log.len(),
            "build complete"
        );

        MetaModel::freeze(ctx, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppmeta_core::{BuildWarning, EnumValue, TypeEntry};
    use cppmeta_parser::{ClassDecl, EnumDecl, EnumeratorDecl, FunctionDecl};
    use cppmeta_registry::TypeDatabase;

    fn database() -> TypeDatabase {
        let mut db = TypeDatabase::with_builtin_primitives();
        db.add_entries([
            TypeEntry::qobject("QObject"),
            TypeEntry::qobject("QTimer"),
            TypeEntry::enumeration("QTimer::State"),
        ])
        .unwrap();
        db
    }

    fn timer() -> NamespaceDecl {
        NamespaceDecl::global()
            .with_class(
                ClassDecl::new("QTimer")
                    .with_base(cppmeta_parser::BaseSpec::public("QObject"))
                    .with_enum(
                        EnumDecl::new("State")
                            .with_enumerator(EnumeratorDecl::new("Stopped"))
                            .with_enumerator(EnumeratorDecl::new("Running").with_value("Stopped + 4")),
                    )
                    .with_function(FunctionDecl::new("start", "void")),
            )
            .with_class(ClassDecl::new("QObject").with_function(FunctionDecl::new("deleteLater", "void")))
    }

    #[test]
    fn builds_every_unit() {
        let db = database();
        let mut builder = MetaBuilder::new(&db);
        builder.add_translation_unit(timer());
        let model = builder.build();

        let timer = model.find_class("QTimer").unwrap();
        let object = model.find_class_id("QObject").unwrap();
        assert_eq!(timer.base_class, Some(object));
        let values: Vec<EnumValue> = timer
            .find_enum("State")
            .unwrap()
            .values
            .iter()
            .map(|v| v.value().clone())
            .collect();
        assert_eq!(values, vec![EnumValue::Int32(0), EnumValue::Int32(4)]);

        let order: Vec<&str> = model
            .classes_in_dependency_order()
            .map(|c| c.qualified_name.as_str())
            .collect();
        assert_eq!(order, vec!["QObject", "QTimer"]);
        assert!(model.warnings().is_empty());
    }

    #[test]
    fn unresolved_base_is_a_warning() {
        let db = database();
        let unit = NamespaceDecl::global().with_class(
            ClassDecl::new("QTimer").with_base(cppmeta_parser::BaseSpec::public("QMissing")),
        );
        let model = MetaBuilder::new(&db)
            .with_config(BuilderConfig::default().with_fallback_namespace(None))
            .with_translation_unit(unit)
            .build();

        assert!(model.warnings().iter().any(|w| matches!(
            w,
            BuildWarning::UnresolvedBaseClass { base, .. } if base == "QMissing"
        )));
    }
}
