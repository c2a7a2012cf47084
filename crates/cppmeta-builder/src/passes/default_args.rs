//! Default Args Pass - translate default argument expressions.
//!
//! Runs after enum values are resolved. Each default becomes one of:
//!
//! - [`DefaultValue::EnumConstant`]: a bare enumerator, qualified
//!   (`AlignLeft` -> `Qt::AlignLeft`)
//! - [`DefaultValue::Integer`]: a constant expression on an integral, enum or
//!   flags argument
//! - [`DefaultValue::Expression`]: anything else, kept as written
//!
//! Enumerators are looked up beside the argument type's enum first, then
//! inside it, then around the class, its public bases and the fallback
//! namespace. Running the pass again recomputes every default.

use tracing::debug;

use cppmeta_core::{ClassId, DefaultValue, IntegerWidth, MetaType, TypeEntryKind};
use cppmeta_parser::{is_ident_continue, is_ident_start};

use crate::constant::{ConstantEvaluator, EnumConstantTable};
use crate::context::BuildContext;
use crate::scope::{ScopeResolver, parent_scope, scope_chain};

/// Output of the default args pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DefaultArgsOutput {
    pub integers: usize,
    pub enum_constants: usize,
    pub expressions: usize,
}

pub struct DefaultArgsPass<'a, 'db> {
    ctx: &'a mut BuildContext<'db>,
    output: DefaultArgsOutput,
}

impl<'a, 'db> DefaultArgsPass<'a, 'db> {
    pub fn new(ctx: &'a mut BuildContext<'db>) -> Self {
        Self {
            ctx,
            output: DefaultArgsOutput::default(),
        }
    }

    pub fn run(mut self) -> DefaultArgsOutput {
        for id in self.ctx.class_ids() {
            if self.ctx.class(id).is_template() {
                continue;
            }
            let updates = self.translate_class(id);
            let class = self.ctx.class_mut(id);
            for (function, argument, value) in updates {
                class.functions[function].arguments[argument].default_value = Some(value);
            }
        }
        self.output
    }

    fn translate_class(&mut self, id: ClassId) -> Vec<(usize, usize, DefaultValue)> {
        let ctx = &*self.ctx;
        let class = ctx.class(id);

        let mut class_scopes = scope_chain(&class.qualified_name);
        class_scopes.extend(
            ScopeResolver::new(ctx)
                .base_class_closure(id)
                .into_iter()
                .map(|base| ctx.class(base).qualified_name.clone()),
        );
        class_scopes.extend(ctx.config.fallback_namespace.iter().cloned());

        let mut updates = Vec::new();
        for (f, function) in class.functions.iter().enumerate() {
            for (a, argument) in function.arguments.iter().enumerate() {
                let Some(expression) = argument.original_default.as_deref() else {
                    continue;
                };
                let mut scopes = type_scopes(&argument.ty);
                scopes.extend(class_scopes.iter().cloned());

                let value = translate_default(&ctx.enum_constants, expression.trim(), &argument.ty, &scopes);
                match &value {
                    DefaultValue::Integer(_) => self.output.integers += 1,
                    DefaultValue::EnumConstant(_) => self.output.enum_constants += 1,
                    DefaultValue::Expression(_) => self.output.expressions += 1,
                }
                debug!(function = %function.name, argument = %argument.name, default = %value, "translated default");
                updates.push((f, a, value));
            }
        }
        updates
    }
}

fn translate_default(
    table: &EnumConstantTable,
    expression: &str,
    ty: &MetaType,
    scopes: &[String],
) -> DefaultValue {
    if is_symbol(expression) {
        if let Some((qualified, _)) = table.lookup_in_scopes(expression.trim_start_matches("::"), scopes) {
            return DefaultValue::EnumConstant(qualified);
        }
    }
    if is_integral(ty) {
        let evaluator = ConstantEvaluator::new(|symbol: &str| {
            table.lookup_in_scopes(symbol, scopes).map(|(_, v)| v)
        });
        if let Ok(v) = evaluator.evaluate(expression) {
            return DefaultValue::Integer(v);
        }
    }
    DefaultValue::Expression(expression.to_string())
}

/// Scopes holding the enumerators of an enum or flags argument type. The
/// enclosing scope comes first: unscoped enumerators are published there
/// and that is how C++ spells them. Scoped ones only exist in the enum.
fn type_scopes(ty: &MetaType) -> Vec<String> {
    let entry = ty.entry();
    let enum_name = match &entry.kind {
        TypeEntryKind::Enum { .. } => entry.qualified_name.as_str(),
        TypeEntryKind::Flags { enum_name } => enum_name.as_str(),
        _ => return Vec::new(),
    };
    vec![parent_scope(enum_name), enum_name.to_string()]
}

fn is_integral(ty: &MetaType) -> bool {
    let entry = ty.entry();
    ty.indirections().is_empty()
        && (entry.is_enum()
            || entry.is_flags()
            || (entry.is_primitive()
                && entry.qualified_name != "bool"
                && IntegerWidth::from_type_name(&entry.qualified_name).is_some()))
}

/// A plain, possibly qualified identifier.
fn is_symbol(expression: &str) -> bool {
    let name = expression.trim_start_matches("::");
    name.chars().next().is_some_and(is_ident_start)
        && name.chars().all(|c| is_ident_continue(c) || c == ':')
}
