//! Inheritance Pass - resolve base classes.
//!
//! ## Responsibilities
//!
//! - Resolve each class's declared base names to classes in the graph
//! - Pick at most one primary base; interfaces are collected separately
//! - Reach further non-interface bases through a synthesized
//!   [`FunctionKind::BaseClassDelegate`] function
//! - Flatten template bases (`class QStringList : public QList<QString>`) into
//!   the subclass, see [`inherit_template_members`]
//!
//! The walk is depth first and memoized, so every base is set up before the
//! classes deriving from it. A base that is still being set up closes a
//! cycle; it is reported as [`BuildWarning::CyclicInheritance`] and skipped.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use cppmeta_core::{
    BaseClassName, BuildWarning, ClassId, FunctionAttributes, FunctionKind, Indirection,
    MetaFunction, MetaType, TranslateError,
};
use cppmeta_parser::parse_type;

use crate::context::{BuildContext, TypeContext};
use crate::template::inherit_template_members;
use crate::type_translator::TypeTranslator;

/// Output of the inheritance pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InheritanceOutput {
    pub primary_bases: usize,
    pub interfaces: usize,
    pub delegates: usize,
    pub template_bases_flattened: usize,
    /// Members copied from flattened template bases.
    pub members_inherited: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

pub struct InheritancePass<'a, 'db> {
    ctx: &'a mut BuildContext<'db>,
    output: InheritanceOutput,
    visits: FxHashMap<ClassId, Visit>,
}

impl<'a, 'db> InheritancePass<'a, 'db> {
    pub fn new(ctx: &'a mut BuildContext<'db>) -> Self {
        Self {
            ctx,
            output: InheritanceOutput::default(),
            visits: FxHashMap::default(),
        }
    }

    pub fn run(mut self) -> InheritanceOutput {
        for id in self.ctx.class_ids() {
            self.setup(id);
        }
        self.output
    }

    fn setup(&mut self, id: ClassId) {
        if self.visits.contains_key(&id) {
            return;
        }
        self.visits.insert(id, Visit::InProgress);

        let class = self.ctx.class(id);
        let class_name = class.qualified_name.clone();
        let is_template = class.is_template();
        let base_names = class.base_class_names.clone();
        let mut has_primary = class.base_class.is_some();

        for base_name in &base_names {
            if !base_name.access.is_public() {
                debug!(class = %class_name, base = %base_name.name, "skipping non-public base");
                continue;
            }
            let Some(base) = self.ctx.resolve_base_class(id, base_name) else {
                self.ctx.warn(BuildWarning::UnresolvedBaseClass {
                    class: class_name.clone(),
                    base: base_name.name.clone(),
                });
                continue;
            };
            if self.visits.get(&base) == Some(&Visit::InProgress) {
                self.ctx.warn(BuildWarning::CyclicInheritance {
                    class: class_name.clone(),
                });
                continue;
            }
            self.setup(base);

            let base_class = self.ctx.class(base);
            if base_class.is_template() && !is_template && base_name.name.contains('<') {
                self.flatten(id, base, base_name);
            } else if base_class.is_interface() {
                self.ctx.class_mut(id).interfaces.push(base);
                self.output.interfaces += 1;
            } else if !has_primary {
                self.ctx.class_mut(id).base_class = Some(base);
                has_primary = true;
                self.output.primary_bases += 1;
            } else {
                self.add_delegate(id, base);
            }
        }

        self.visits.insert(id, Visit::Done);
    }

    fn flatten(&mut self, id: ClassId, template_id: ClassId, base_name: &BaseClassName) {
        match self.template_arguments(id, &base_name.name) {
            Ok(args) => match inherit_template_members(self.ctx, id, template_id, &args) {
                Ok(added) => {
                    self.output.template_bases_flattened += 1;
                    self.output.members_inherited += added;
                }
                Err(err) => {
                    warn!(class = %self.ctx.class(id).qualified_name, base = %base_name.name, error = %err, "cannot flatten template base");
                }
            },
            Err(err) => {
                warn!(class = %self.ctx.class(id).qualified_name, base = %base_name.name, error = %err, "cannot translate template base arguments");
            }
        }
    }

    /// Arguments of a template base, translated where the subclass is
    /// declared.
    fn template_arguments(&mut self, id: ClassId, base: &str) -> Result<Vec<MetaType>, TranslateError> {
        let desc = parse_type(base);
        let tc = TypeContext::for_class(id, self.ctx.class(id));
        let mut translator = TypeTranslator::new(&mut *self.ctx);
        desc.arguments
            .iter()
            .map(|arg| translator.translate(arg, &tc))
            .collect()
    }

    /// `asBase()` returning `Base*`, standing in for a second primary base.
    fn add_delegate(&mut self, id: ClassId, base: ClassId) {
        let base_class = self.ctx.class(base);
        let name = format!("as{}", base_class.name());
        let return_type =
            MetaType::new(base_class.entry.clone()).with_indirections(vec![Indirection::Pointer]);
        let delegated = base_class.qualified_name.clone();

        let class = self.ctx.class_mut(id);
        if class.find_function(&name).is_some() {
            return;
        }
        let mut function = MetaFunction::new(name, FunctionKind::BaseClassDelegate)
            .with_attributes(FunctionAttributes::PUBLIC)
            .with_return_type(return_type);
        function.declaring_class = Some(id);
        function.implementing_class = Some(id);
        function.source_file = class.source_file.clone();
        class.functions.push(function);
        let class_name = class.qualified_name.clone();

        self.ctx.warn(BuildWarning::MultiplePrimaryBases {
            class: class_name,
            delegated,
        });
        self.output.delegates += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuilderConfig;
    use crate::passes::RegistrationPass;
    use cppmeta_core::{Access, ClassAttributes, ContainerKind, FieldAttributes, TypeEntry};
    use cppmeta_parser::{
        ArgumentDecl, BaseSpec, ClassDecl, FieldDecl, FunctionDecl, FunctionQualifiers,
        NamespaceDecl, TemplateParamDecl,
    };
    use cppmeta_registry::TypeDatabase;

    fn database(names: &[&str]) -> TypeDatabase {
        let mut db = TypeDatabase::with_builtin_primitives();
        for name in names {
            db.add_entry(TypeEntry::object(*name)).unwrap();
        }
        db
    }

    fn build<'db>(db: &'db TypeDatabase, unit: NamespaceDecl) -> (BuildContext<'db>, InheritanceOutput) {
        let mut ctx = BuildContext::new(db, BuilderConfig::default());
        RegistrationPass::new(&mut ctx).run(&[unit]);
        let output = InheritancePass::new(&mut ctx).run();
        (ctx, output)
    }

    fn derived(name: &str, bases: &[&str]) -> ClassDecl {
        bases
            .iter()
            .fold(ClassDecl::new(name), |class, base| class.with_base(BaseSpec::public(*base)))
    }

    #[test]
    fn resolves_primary_base() {
        let db = database(&["QObject", "QWidget"]);
        let unit = NamespaceDecl::global()
            .with_class(derived("QWidget", &["QObject"]))
            .with_class(derived("QObject", &[]));
        let (ctx, output) = build(&db, unit);

        let widget = ctx.class(ctx.find_class("QWidget").unwrap());
        assert_eq!(widget.base_class, ctx.find_class("QObject"));
        assert_eq!(output.primary_bases, 1);
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn extra_bases_become_delegates() {
        let mut db = database(&["QObject", "QPaintDevice", "QWidget"]);
        db.add_entry(TypeEntry::interface("QLayoutItem")).unwrap();
        let unit = NamespaceDecl::global()
            .with_class(derived("QObject", &[]))
            .with_class(derived("QPaintDevice", &[]))
            .with_class(derived("QLayoutItem", &[]))
            .with_class(derived("QWidget", &["QObject", "QLayoutItem", "QPaintDevice"]));
        let (ctx, output) = build(&db, unit);

        let widget = ctx.class(ctx.find_class("QWidget").unwrap());
        assert_eq!(widget.base_class, ctx.find_class("QObject"));
        assert_eq!(widget.interfaces, vec![ctx.find_class("QLayoutItem").unwrap()]);

        let delegate = widget.find_function("asQPaintDevice").unwrap();
        assert_eq!(delegate.kind, FunctionKind::BaseClassDelegate);
        assert_eq!(delegate.return_type().unwrap().to_string(), "QPaintDevice*");
        assert_eq!(output.delegates, 1);
        assert!(matches!(
            ctx.warnings.as_slice(),
            [BuildWarning::MultiplePrimaryBases { delegated, .. }] if delegated == "QPaintDevice"
        ));
    }

    #[test]
    fn reports_unresolved_and_skips_private_bases() {
        let db = database(&["QObject", "QWidget"]);
        let unit = NamespaceDecl::global()
            .with_class(derived("QObject", &[]))
            .with_class(
                ClassDecl::new("QWidget")
                    .with_base(BaseSpec::new("QObject", Access::Private))
                    .with_base(BaseSpec::public("QMissing")),
            );
        let (ctx, _) = build(&db, unit);

        let widget = ctx.class(ctx.find_class("QWidget").unwrap());
        assert!(widget.base_class.is_none());
        assert!(matches!(
            ctx.warnings.as_slice(),
            [BuildWarning::UnresolvedBaseClass { base, .. }] if base == "QMissing"
        ));
    }

    #[test]
    fn cyclic_inheritance_terminates() {
        let db = database(&["A", "B"]);
        let unit = NamespaceDecl::global()
            .with_class(derived("A", &["B"]))
            .with_class(derived("B", &["A"]));
        let (ctx, _) = build(&db, unit);

        let a = ctx.find_class("A").unwrap();
        assert_eq!(ctx.class(a).base_class, ctx.find_class("B"));
        assert!(ctx.class(ctx.find_class("B").unwrap()).base_class.is_none());
        assert!(matches!(
            ctx.warnings.as_slice(),
            [BuildWarning::CyclicInheritance { class }] if class == "B"
        ));
    }

    #[test]
    fn diamond_keeps_first_branch() {
        let db = database(&["Top", "Left", "Right", "Bottom"]);
        let unit = NamespaceDecl::global()
            .with_class(derived("Top", &[]))
            .with_class(derived("Left", &["Top"]))
            .with_class(derived("Right", &["Top"]))
            .with_class(derived("Bottom", &["Left", "Right"]));
        let (ctx, output) = build(&db, unit);

        let bottom = ctx.class(ctx.find_class("Bottom").unwrap());
        assert_eq!(bottom.base_class, ctx.find_class("Left"));
        assert!(bottom.find_function("asRight").is_some());
        assert_eq!(output.primary_bases, 3);
    }

    #[test]
    fn flattens_template_base() {
        let mut db = TypeDatabase::with_builtin_primitives();
        db.add_entries([
            TypeEntry::container("QList", ContainerKind::List),
            TypeEntry::string("QString"),
            TypeEntry::value("QStringList"),
        ])
        .unwrap();
        let list = ClassDecl::new("QList")
            .with_template_parameter(TemplateParamDecl::new("T"))
            .with_function(FunctionDecl::new("QList", ""))
            .with_function(
                FunctionDecl::new("append", "void").with_argument(ArgumentDecl::new("value", "const T &")),
            )
            .with_function(
                FunctionDecl::new("at", "const T &")
                    .with_argument(ArgumentDecl::new("i", "int"))
                    .with_qualifiers(FunctionQualifiers::CONST),
            )
            .with_field(FieldDecl::new("first", "T"));
        let string_list = derived("QStringList", &["QList<QString>"]).with_function(
            FunctionDecl::new("append", "void").with_argument(ArgumentDecl::new("value", "const QString &")),
        );
        let unit = NamespaceDecl::global().with_class(list).with_class(string_list);
        let (ctx, output) = build(&db, unit);

        let class = ctx.class(ctx.find_class("QStringList").unwrap());
        assert_eq!(output.template_bases_flattened, 1);
        assert!(class.attributes.contains(ClassAttributes::HAS_HIDDEN_BASE));
        assert!(class.base_class.is_none());
        assert_eq!(class.template_base_class, ctx.find_class("QList"));

        assert_eq!(class.functions_named("append").count(), 1);
        let at = class.find_function("at").unwrap();
        assert_eq!(at.return_type().unwrap().to_string(), "const QString&");
        assert!(at.attributes.contains(FunctionAttributes::INHERITED_FROM_TEMPLATE));
        assert!(class.find_function("QList").is_none());

        let first = class.find_field("first").unwrap();
        assert!(first.attributes.contains(FieldAttributes::INHERITED_FROM_TEMPLATE));
        assert_eq!(first.ty.to_string(), "QString");
    }
}
