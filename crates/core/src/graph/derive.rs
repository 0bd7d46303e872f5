#![forbid(unsafe_code)]

use super::types::*;
use crate::model::{Framework, fields};
use crate::refs::{CompatRef, parent_of};
use std::collections::BTreeSet;

/// Insertion-ordered edge list that refuses a second edge for a `(from, to)` pair.
#[derive(Default)]
struct EdgeSet {
    seen: BTreeSet<(String, String)>,
    edges: Vec<RelationEdge>,
}

impl EdgeSet {
    fn push(&mut self, from: &str, to: &str, strength: EdgeStrength) {
        if to.is_empty() {
            return;
        }
        if !self.seen.insert((from.to_string(), to.to_string())) {
            return;
        }
        self.edges.push(RelationEdge {
            from: from.to_string(),
            to: to.to_string(),
            strength,
        });
    }
}

/// Derives the philosophy -> conception -> design edge set.
///
/// Passes run in a fixed order (preferred conceptions, conception design
/// types, philosophy design types) and the first edge for a pair wins.
pub fn derive_edges(framework: &Framework) -> Vec<RelationEdge> {
    let mut set = EdgeSet::default();

    for philosophy in &framework.philosophies {
        for raw in philosophy.compatibility(fields::CONCEPTIONS_PREFERRED) {
            let reference = CompatRef::parse(raw);
            let strength = if reference.qualified {
                EdgeStrength::Often
            } else {
                EdgeStrength::Strong
            };
            set.push(&philosophy.id, &reference.target, strength);
        }
    }

    for conception in &framework.conceptions {
        for raw in conception.compatibility(fields::DESIGN_TYPES) {
            set.push(&conception.id, parent_of(raw), EdgeStrength::Often);
        }
    }

    for philosophy in &framework.philosophies {
        for raw in philosophy.compatibility(fields::DESIGN_TYPES_OFTEN) {
            set.push(&philosophy.id, parent_of(raw), EdgeStrength::Contextual);
        }
    }

    set.edges
}

pub fn flow_nodes(framework: &Framework) -> Vec<FlowNode> {
    framework
        .philosophies
        .iter()
        .chain(framework.conceptions.iter())
        .chain(framework.design_types.iter())
        .map(|entity| FlowNode {
            id: entity.id.clone(),
            label: entity.label.clone(),
            column: FlowColumn::for_kind(entity.kind),
            tensions: entity.common_tensions.clone(),
        })
        .collect()
}

/// Nodes, edges and the integrity warnings for edges with unknown targets.
///
/// Dangling edges stay in the edge list; the warning is how callers learn
/// about them.
pub fn build_relation_graph(framework: &Framework) -> RelationGraph {
    let nodes = flow_nodes(framework);
    let edges = derive_edges(framework);
    let known = nodes.iter().map(|n| n.id.as_str()).collect::<BTreeSet<_>>();
    let warnings = edges
        .iter()
        .filter(|edge| !known.contains(edge.to.as_str()))
        .map(|edge| IntegrityWarning::DanglingTarget {
            from: edge.from.clone(),
            to: edge.to.clone(),
        })
        .collect();
    RelationGraph {
        nodes,
        edges,
        warnings,
    }
}
