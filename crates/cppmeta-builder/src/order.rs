//! Dependency order of the finished class graph.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: every non-template class, in arena order
//! - Edges: base -> derived, for the primary base and each interface
//!
//! A topological sort yields bases before the classes that extend them. A
//! cycle cannot be ordered; it is reported and the arena order is used.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use tracing::error;

use cppmeta_core::{BuildWarning, ClassId};

use crate::context::BuildContext;

/// Order the emitted classes base-first.
pub fn dependency_order(ctx: &mut BuildContext<'_>) -> Vec<ClassId> {
    let ids: Vec<ClassId> = ctx
        .class_ids()
        .filter(|id| !ctx.class(*id).is_template())
        .collect();

    let mut graph: DiGraph<ClassId, ()> = DiGraph::with_capacity(ids.len(), ids.len());
    let nodes: FxHashMap<ClassId, NodeIndex> =
        ids.iter().map(|id| (*id, graph.add_node(*id))).collect();

    for id in &ids {
        let class = ctx.class(*id);
        let derived = nodes[id];
        for base in class.base_class.iter().chain(&class.interfaces) {
            if let Some(&base) = nodes.get(base) {
                graph.add_edge(base, derived, ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(sorted) => sorted.into_iter().map(|node| graph[node]).collect(),
        Err(cycle) => {
            let class = ctx.class(graph[cycle.node_id()]).qualified_name.clone();
            error!(class = %class, "class graph has a cycle, keeping declaration order");
            ctx.warn(BuildWarning::CyclicDependency { class });
            ids
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuilderConfig;
    use cppmeta_core::{MetaClass, TypeEntry};
    use cppmeta_registry::TypeDatabase;
    use std::sync::Arc;

    fn add(ctx: &mut BuildContext<'_>, entry: TypeEntry) -> ClassId {
        ctx.add_class(MetaClass::new(Arc::new(entry)))
    }

    fn position(order: &[ClassId], id: ClassId) -> usize {
        order.iter().position(|c| *c == id).unwrap()
    }

    #[test]
    fn bases_come_first() {
        let db = TypeDatabase::new();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let button = add(&mut ctx, TypeEntry::qobject("QPushButton"));
        let widget = add(&mut ctx, TypeEntry::qobject("QWidget"));
        let device = add(&mut ctx, TypeEntry::interface("QPaintDevice"));
        let object = add(&mut ctx, TypeEntry::qobject("QObject"));
        ctx.class_mut(button).base_class = Some(widget);
        ctx.class_mut(widget).base_class = Some(object);
        ctx.class_mut(widget).interfaces.push(device);

        let order = dependency_order(&mut ctx);

        assert_eq!(order.len(), 4);
        assert!(position(&order, object) < position(&order, widget));
        assert!(position(&order, device) < position(&order, widget));
        assert!(position(&order, widget) < position(&order, button));
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn templates_are_left_out() {
        let db = TypeDatabase::new();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let list = add(&mut ctx, TypeEntry::value("QList"));
        ctx.class_mut(list)
            .template_parameters
            .push(cppmeta_core::MetaTemplateParameter::new("T", 0));
        let strings = add(&mut ctx, TypeEntry::value("QStringList"));

        assert_eq!(dependency_order(&mut ctx), vec![strings]);
    }

    #[test]
    fn cycle_falls_back_to_declaration_order() {
        let db = TypeDatabase::new();
        let mut ctx = BuildContext::new(&db, BuilderConfig::default());
        let a = add(&mut ctx, TypeEntry::object("A"));
        let b = add(&mut ctx, TypeEntry::object("B"));
        ctx.class_mut(a).base_class = Some(b);
        ctx.class_mut(b).base_class = Some(a);

        assert_eq!(dependency_order(&mut ctx), vec![a, b]);
        assert!(
            ctx.warnings
                .iter()
                .any(|w| matches!(w, BuildWarning::CyclicDependency { .. }))
        );
    }
}
