//! Enum Values Pass - evaluate enumerator expressions to a fixpoint.
//!
//! ## Responsibilities
//!
//! - Evaluate each enumerator's initializer, or previous value + 1 when it
//!   has none
//! - Publish resolved values to the [`EnumConstantTable`](crate::EnumConstantTable)
//!   so later enums and default arguments can refer to them
//! - Retry forward references for a bounded number of rounds
//! - Report values left unresolved and values that duplicate an earlier one
//!
//! ## Symbol lookup
//!
//! A symbol in an initializer is looked up in the enum's own values first,
//! then in the constant table under these scopes, in order:
//!
//! 1. the scopes enclosing the enum, innermost first
//! 2. the base classes of the class owning the enum, breadth first
//! 3. the configured fallback namespace

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use cppmeta_core::{BuildWarning, ClassId, EnumValue, MetaEnum, join_scope};

use crate::constant::ConstantEvaluator;
use crate::context::BuildContext;
use crate::scope::{ScopeResolver, parent_scope, scope_chain};

/// Output of the enum values pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnumValuesOutput {
    pub rounds: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub duplicates: usize,
}

/// One enum and the scopes its initializers are looked up in.
struct EnumTarget {
    class: ClassId,
    index: usize,
    scopes: Vec<String>,
}

pub struct EnumValuesPass<'a, 'db> {
    ctx: &'a mut BuildContext<'db>,
    output: EnumValuesOutput,
}

impl<'a, 'db> EnumValuesPass<'a, 'db> {
    pub fn new(ctx: &'a mut BuildContext<'db>) -> Self {
        Self {
            ctx,
            output: EnumValuesOutput::default(),
        }
    }

    pub fn run(mut self) -> EnumValuesOutput {
        let targets = self.collect_targets();
        let max_rounds = 1 + self.ctx.config.enum_retry_rounds;

        for round in 1..=max_rounds {
            let mut progress = 0;
            let mut pending = 0;
            for target in &targets {
                let (resolved, left) = self.resolve_round(target);
                progress += resolved;
                pending += left;
            }
            self.output.rounds = round;
            self.output.resolved += progress;
            debug!(round, progress, pending, "enum value round");
            if pending == 0 || progress == 0 {
                break;
            }
        }

        for target in &targets {
            self.report(target);
        }
        info!(
            resolved = self.output.resolved,
            unresolved = self.output.unresolved,
            rounds = self.output.rounds,
            "enum values resolved"
        );
        self.output
    }

    fn collect_targets(&self) -> Vec<EnumTarget> {
        let resolver = ScopeResolver::new(&*self.ctx);
        let mut targets = Vec::new();
        for class in self.ctx.class_ids() {
            let meta_class = self.ctx.class(class);
            if meta_class.is_template() || meta_class.enums.is_empty() {
                continue;
            }
            let bases: Vec<String> = resolver
                .base_class_closure(class)
                .into_iter()
                .map(|base| self.ctx.class(base).qualified_name.clone())
                .collect();
            for (index, meta_enum) in meta_class.enums.iter().enumerate() {
                let mut scopes = scope_chain(&parent_scope(&meta_enum.qualified_name));
                scopes.extend(bases.iter().cloned());
                scopes.extend(self.ctx.config.fallback_namespace.iter().cloned());
                let mut seen = Vec::with_capacity(scopes.len());
                scopes.retain(|s| {
                    let fresh = !seen.contains(s);
                    seen.push(s.clone());
                    fresh
                });
                targets.push(EnumTarget {
                    class,
                    index,
                    scopes,
                });
            }
        }
        targets
    }

    /// One pass over the values of one enum. Returns the number of values
    /// resolved now and the number still unresolved.
    fn resolve_round(&mut self, target: &EnumTarget) -> (usize, usize) {
        let meta_enum = &self.ctx.class(target.class).enums[target.index];
        if meta_enum.is_resolved() {
            return (0, 0);
        }

        let mut own: FxHashMap<&str, i64> = meta_enum
            .values
            .iter()
            .filter_map(|v| v.value().as_i64().map(|known| (v.name.as_str(), known)))
            .collect();
        let mut computed: Vec<(usize, i64)> = Vec::new();
        let mut previous = Some(-1);
        for (position, value) in meta_enum.values.iter().enumerate() {
            if let Some(known) = value.value().as_i64() {
                previous = Some(known);
                continue;
            }
            let result = if value.expression.trim().is_empty() {
                previous.map(|p| p.wrapping_add(1))
            } else {
                let evaluator = ConstantEvaluator::new(|symbol: &str| {
                    own.get(symbol)
                        .copied()
                        .or_else(|| own_qualified(meta_enum, symbol).and_then(|n| own.get(n).copied()))
                        .or_else(|| {
                            self.ctx
                                .enum_constants
                                .lookup_in_scopes(symbol, &target.scopes)
                                .map(|(_, v)| v)
                        })
                });
                evaluator.evaluate(&value.expression).ok()
            };
            // Later references and the constant table see the stored width
            let result = result.map(|v| EnumValue::from_i64(meta_enum.width, v).as_i64().unwrap_or(v));
            if let Some(v) = result {
                own.insert(value.name.as_str(), v);
                computed.push((position, v));
            }
            previous = result;
        }

        let pending = meta_enum.values.len() - own.len();
        let resolved = computed.len();
        self.store(target, computed);
        (resolved, pending)
    }

    fn store(&mut self, target: &EnumTarget, computed: Vec<(usize, i64)>) {
        let meta_enum = &mut self.ctx.class_mut(target.class).enums[target.index];
        let width = meta_enum.width;
        let qualified = meta_enum.qualified_name.clone();
        let parent = parent_scope(&qualified);
        let visible_in_parent = !meta_enum.is_scoped || meta_enum.is_anonymous;
        let is_anonymous = meta_enum.is_anonymous;

        let mut keys = Vec::with_capacity(computed.len() * 2);
        for (position, v) in computed {
            let value = &mut meta_enum.values[position];
            value.resolve(EnumValue::from_i64(width, v));
            if !is_anonymous {
                keys.push((join_scope(&qualified, &value.name), v));
            }
            if visible_in_parent {
                keys.push((join_scope(&parent, &value.name), v));
            }
        }
        for (key, v) in keys {
            self.ctx.enum_constants.insert(key, v);
        }
    }

    fn report(&mut self, target: &EnumTarget) {
        let meta_enum = self.ctx.class(target.class).enums[target.index].clone();
        let mut seen: FxHashMap<i64, &str> = FxHashMap::default();
        for value in &meta_enum.values {
            let Some(v) = value.value().as_i64() else {
                self.ctx.warn(BuildWarning::UnresolvedEnumValue {
                    value: join_scope(&meta_enum.qualified_name, &value.name),
                    expression: value.expression.clone(),
                });
                self.output.unresolved += 1;
                continue;
            };
            match seen.get(&v) {
                Some(previous) if !is_alias_of(&value.expression, previous) => {
                    self.ctx.warn(BuildWarning::DuplicateEnumValue {
                        enum_name: meta_enum.qualified_name.clone(),
                        value_name: value.name.clone(),
                        previous: previous.to_string(),
                    });
                    self.output.duplicates += 1;
                }
                Some(_) => {}
                None => {
                    seen.insert(v, value.name.as_str());
                }
            }
        }
    }
}

/// `Mode::Fast` or `QWidget::Mode::Fast` inside enum `QWidget::Mode` -> `Fast`.
fn own_qualified<'e>(meta_enum: &MetaEnum, symbol: &'e str) -> Option<&'e str> {
    let (scope, name) = symbol.rsplit_once("::")?;
    (scope == meta_enum.qualified_name || scope == meta_enum.name()).then_some(name)
}

/// `Default = Normal` restates a value on purpose.
fn is_alias_of(expression: &str, previous: &str) -> bool {
    let expression = expression.trim();
    expression == previous
        || expression
            .strip_suffix(previous)
            .is_some_and(|scope| scope.ends_with("::"))
}
