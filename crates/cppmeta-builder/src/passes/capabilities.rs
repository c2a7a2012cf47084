//! Capabilities Pass - derive equality, comparison, clone and iteration.
//!
//! ## Responsibilities
//!
//! - `operator==` on the class's own type: the "equals" capability
//! - ordering operators: the "comparable" capability, choosing the first
//!   available of `<=>`, the `<`/`==` pair, the `<=`/`>=` pair, or a single
//!   ordering operator
//! - a public copy constructor: the "clone" capability
//! - `begin()`/`end()` style functions: iteration
//!
//! Operators folded into a capability are hidden from the generator: marked
//! [`FunctionAttributes::HIDDEN`] and made private. Each function is hidden
//! at most once, keyed by its minimal signature.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use cppmeta_core::{
    Access, BuildWarning, ClassCapabilities, ClassId, ComparisonStrategy, FunctionAttributes,
    MetaClass, MetaFunction, OperatorKind,
};

use crate::context::BuildContext;

const BEGIN_FUNCTIONS: &[&str] = &["begin", "cbegin", "constBegin"];
const END_FUNCTIONS: &[&str] = &["end", "cend", "constEnd"];

/// Comparison operators, in reporting order.
const COMPARISONS: [OperatorKind; 7] = [
    OperatorKind::Equals,
    OperatorKind::NotEquals,
    OperatorKind::ThreeWay,
    OperatorKind::Less,
    OperatorKind::Greater,
    OperatorKind::LessEquals,
    OperatorKind::GreaterEquals,
];

/// Output of the capabilities pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapabilitiesOutput {
    pub equals: usize,
    pub comparable: usize,
    pub clonable: usize,
    pub iterable: usize,
    /// Operator functions hidden by this run.
    pub hidden: usize,
}

pub struct CapabilitiesPass<'a, 'db> {
    ctx: &'a mut BuildContext<'db>,
    output: CapabilitiesOutput,
    hidden: FxHashSet<(ClassId, String)>,
}

impl<'a, 'db> CapabilitiesPass<'a, 'db> {
    pub fn new(ctx: &'a mut BuildContext<'db>) -> Self {
        Self {
            ctx,
            output: CapabilitiesOutput::default(),
            hidden: FxHashSet::default(),
        }
    }

    pub fn run(mut self) -> CapabilitiesOutput {
        for id in self.ctx.class_ids() {
            let class = self.ctx.class(id);
            if class.is_template() || class.is_fake() {
                continue;
            }
            self.synthesize(id);
        }
        self.output
    }

    fn synthesize(&mut self, id: ClassId) {
        let class = self.ctx.class(id);
        let operators = own_type_operators(class);
        let mut capabilities = ClassCapabilities::default();
        let mut to_hide: Vec<usize> = Vec::new();
        let mut warnings = Vec::new();

        for op in COMPARISONS {
            if let Some(indices) = operators.get(&op).filter(|indices| indices.len() > 1) {
                warnings.push(BuildWarning::AmbiguousOperator {
                    class: class.qualified_name.clone(),
                    operator: op.symbol().to_string(),
                    kept: class.functions[indices[0]].minimal_signature(),
                });
            }
        }
        let has = |op: OperatorKind| operators.contains_key(&op);
        let all = |ops: &[OperatorKind]| {
            ops.iter()
                .filter_map(|op| operators.get(op))
                .flatten()
                .copied()
                .collect::<Vec<_>>()
        };

        // 1. Equality
        if has(OperatorKind::Equals) {
            capabilities.has_equals_operator = true;
            to_hide.extend(all(&[OperatorKind::Equals, OperatorKind::NotEquals]));
        }

        // 2. Ordering
        capabilities.comparison = if has(OperatorKind::ThreeWay) {
            Some(ComparisonStrategy::ThreeWay)
        } else if has(OperatorKind::Less) && has(OperatorKind::Equals) {
            Some(ComparisonStrategy::LessAndEquals)
        } else if has(OperatorKind::LessEquals) && has(OperatorKind::GreaterEquals) {
            Some(ComparisonStrategy::LessEqualAndGreaterEqual)
        } else {
            COMPARISONS
                .into_iter()
                .filter(|op| op.is_ordering())
                .find(|op| has(*op))
                .map(ComparisonStrategy::Single)
        };
        if capabilities.comparison.is_some() {
            let ordering: Vec<OperatorKind> =
                COMPARISONS.into_iter().filter(|op| op.is_ordering()).collect();
            to_hide.extend(all(&ordering));
        }

        // 3. Clone
        capabilities.has_clone_operator = class.functions.iter().any(|f| {
            (f.attributes.contains(FunctionAttributes::COPY_CONSTRUCTOR)
                || f.is_copy_constructor_of(&class.qualified_name))
                && f.access().is_public()
                && !f.attributes.contains(FunctionAttributes::DELETED)
                && f.is_emitted()
        });

        // 4. Iteration
        capabilities.begin_functions = iteration_functions(class, BEGIN_FUNCTIONS);
        capabilities.end_functions = iteration_functions(class, END_FUNCTIONS);

        debug!(class = %class.qualified_name, ?capabilities, "synthesized capabilities");
        self.output.equals += usize::from(capabilities.has_equals_operator);
        self.output.comparable += usize::from(capabilities.is_comparable());
        self.output.clonable += usize::from(capabilities.has_clone_operator);
        self.output.iterable += usize::from(capabilities.is_iterable());
        for warning in warnings {
            self.ctx.warn(warning);
        }

        let class = self.ctx.class_mut(id);
        for index in to_hide {
            let function = &mut class.functions[index];
            if function.is_hidden() || !self.hidden.insert((id, function.minimal_signature())) {
                continue;
            }
            function.attributes |= FunctionAttributes::HIDDEN;
            function.attributes.set_access(Access::Private);
            self.output.hidden += 1;
        }
        class.capabilities = capabilities;
    }
}

/// Comparison operators whose arguments are all the class itself, by
/// operator, in declaration order.
fn own_type_operators(class: &MetaClass) -> FxHashMap<OperatorKind, Vec<usize>> {
    let is_own = |function: &MetaFunction| {
        !function.arguments.is_empty()
            && function.arguments.iter().all(|a| {
                a.ty.indirections().is_empty() && a.ty.entry().qualified_name == class.entry.qualified_name
            })
    };

    let mut operators: FxHashMap<OperatorKind, Vec<usize>> = FxHashMap::default();
    for (index, function) in class.functions.iter().enumerate() {
        let Some(op) = function.operator.filter(|op| op.is_comparison()) else {
            continue;
        };
        if function.is_emitted() && is_own(function) {
            operators.entry(op).or_default().push(index);
        }
    }
    operators
}

fn iteration_functions(class: &MetaClass, names: &[&str]) -> Vec<String> {
    class
        .functions
        .iter()
        .filter(|f| f.is_emitted() && f.arguments.is_empty() && names.contains(&f.name.as_str()))
        .map(MetaFunction::minimal_signature)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuilderConfig;
    use crate::passes::RegistrationPass;
    use cppmeta_core::TypeEntry;
    use cppmeta_parser::{
        ArgumentDecl, ClassDecl, FunctionDecl, FunctionQualifiers, NamespaceDecl,
    };
    use cppmeta_registry::TypeDatabase;

    fn member(op: &str, arg: &str) -> FunctionDecl {
        FunctionDecl::new(format!("operator{op}"), "bool")
            .with_argument(ArgumentDecl::new("other", arg))
            .with_qualifiers(FunctionQualifiers::CONST)
    }

    fn free(op: &str, class: &str) -> FunctionDecl {
        let arg = format!("const {class} &");
        FunctionDecl::new(format!("operator{op}"), "bool")
            .with_argument(ArgumentDecl::new("a", arg.clone()))
            .with_argument(ArgumentDecl::new("b", arg))
    }

    fn database() -> TypeDatabase {
        let mut db = TypeDatabase::with_builtin_primitives();
        for name in ["QPoint", "QDate", "QTime", "QSize", "QList"] {
            db.add_entry(TypeEntry::value(name)).unwrap();
        }
        db
    }

    fn run(db: &TypeDatabase, unit: NamespaceDecl) -> (BuildContext<'_>, CapabilitiesOutput) {
        let mut ctx = BuildContext::new(db, BuilderConfig::default());
        RegistrationPass::new(&mut ctx).run(&[unit]);
        let output = CapabilitiesPass::new(&mut ctx).run();
        (ctx, output)
    }

    fn class<'c>(ctx: &'c BuildContext<'_>, name: &str) -> &'c MetaClass {
        ctx.class(ctx.find_class(name).unwrap())
    }

    #[test]
    fn equality_hides_operators() {
        let db = database();
        let unit = NamespaceDecl::global()
                .with_class(
                    ClassDecl::new("QPoint")
                        .with_function(member("==", "const QPoint &"))
                        .with_function(member("==", "int")),
                )
                .with_function(free("!=", "QPoint"));
        let (ctx, output) = run(&db, unit);

        let point = class(&ctx, "QPoint");
        assert!(point.capabilities.has_equals_operator);
        assert!(point.capabilities.comparison.is_none());
        assert_eq!(output.hidden, 2);

        let hidden: Vec<String> = point
            .functions
            .iter()
            .filter(|f| f.is_hidden())
            .map(MetaFunction::minimal_signature)
            .collect();
        assert_eq!(hidden, vec!["operator==(QPoint)const", "operator!=(QPoint,QPoint)const"]);
        assert!(point.functions.iter().filter(|f| f.is_hidden()).all(|f| f.access() == Access::Private));
        assert!(point
            .functions
            .iter()
            .any(|f| f.minimal_signature() == "operator==(int)const" && !f.is_hidden()));
    }

    #[test]
    fn comparison_strategy_priority() {
        let db = database();
        let unit = NamespaceDecl::global()
                .with_class(
                    ClassDecl::new("QDate")
                        .with_function(member("<", "const QDate &"))
                        .with_function(member("==", "const QDate &"))
                        .with_function(member("<=", "const QDate &"))
                        .with_function(member(">=", "const QDate &")),
                )
                .with_class(
                    ClassDecl::new("QTime")
                        .with_function(member("<", "const QTime &"))
                        .with_function(member("<=>", "const QTime &")),
                )
                .with_class(
                    ClassDecl::new("QSize")
                        .with_function(member("<=", "const QSize &"))
                        .with_function(member(">=", "const QSize &")),
                )
                .with_class(ClassDecl::new("QList").with_function(member(">", "const QList &")));
        let (ctx, output) = run(&db, unit);

        assert_eq!(
            class(&ctx, "QDate").capabilities.comparison,
            Some(ComparisonStrategy::LessAndEquals)
        );
        assert_eq!(
            class(&ctx, "QTime").capabilities.comparison,
            Some(ComparisonStrategy::ThreeWay)
        );
        assert_eq!(
            class(&ctx, "QSize").capabilities.comparison,
            Some(ComparisonStrategy::LessEqualAndGreaterEqual)
        );
        assert_eq!(
            class(&ctx, "QList").capabilities.comparison,
            Some(ComparisonStrategy::Single(OperatorKind::Greater))
        );
        assert_eq!(output.comparable, 4);
    }

    #[test]
    fn duplicate_equality_is_ambiguous() {
        let db = database();
        let unit = NamespaceDecl::global()
                .with_class(ClassDecl::new("QPoint").with_function(member("==", "const QPoint &")))
                .with_function(free("==", "QPoint"));
        let (ctx, _) = run(&db, unit);

        assert!(matches!(
            ctx.warnings.as_slice(),
            [BuildWarning::AmbiguousOperator { operator, kept, .. }]
                if operator == "==" && kept == "operator==(QPoint)const"
        ));
        assert!(class(&ctx, "QPoint").functions.iter().all(MetaFunction::is_hidden));
    }

    #[test]
    fn clone_and_iteration() {
        let deleted = FunctionDecl::new("QSize", "")
            .with_argument(ArgumentDecl::new("other", "const QSize &"))
            .with_qualifiers(FunctionQualifiers::DELETED);
        let db = database();
        let unit = NamespaceDecl::global()
                .with_class(
                    ClassDecl::new("QList")
                        .with_function(FunctionDecl::new("QList", "").with_argument(ArgumentDecl::new("other", "const QList &")))
                        .with_function(FunctionDecl::new("begin", "int"))
                        .with_function(FunctionDecl::new("constBegin", "int").with_qualifiers(FunctionQualifiers::CONST))
                        .with_function(FunctionDecl::new("end", "int"))
                        .with_function(FunctionDecl::new("begin", "int").with_argument(ArgumentDecl::new("i", "int"))),
                )
                .with_class(ClassDecl::new("QSize").with_function(deleted));
        let (ctx, output) = run(&db, unit);

        let list = class(&ctx, "QList");
        assert!(list.capabilities.has_clone_operator);
        assert_eq!(list.capabilities.begin_functions, vec!["begin()", "constBegin()const"]);
        assert_eq!(list.capabilities.end_functions, vec!["end()"]);
        assert!(list.capabilities.is_iterable());
        assert!(!class(&ctx, "QSize").capabilities.has_clone_operator);
        assert_eq!(output.clonable, 1);
        assert_eq!(output.iterable, 1);
    }

    #[test]
    fn rerun_hides_nothing_new() {
        let db = database();
        let unit = NamespaceDecl::global().with_class(ClassDecl::new("QPoint").with_function(member("==", "const QPoint &")));
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        RegistrationPass::new(&mut ctx).run(&[unit]);
        let first = CapabilitiesPass::new(&mut ctx).run();
        let second = CapabilitiesPass::new(&mut ctx).run();

        assert_eq!(first.hidden, 1);
        assert_eq!(second.hidden, 0);
        assert!(class(&ctx, "QPoint").capabilities.has_equals_operator);
    }
}
