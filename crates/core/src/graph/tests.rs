use super::*;
use crate::model::{Entity, EntityKind, Framework, fields};

fn with_compat(mut entity: Entity, relation: &str, refs: &[&str]) -> Entity {
    entity.compatibilities.insert(
        relation.to_string(),
        refs.iter().map(|r| r.to_string()).collect(),
    );
    entity
}

fn scenario() -> Framework {
    let p1 = Entity::new("P1", "P1", EntityKind::Philosophy);
    let p1 = with_compat(p1, fields::CONCEPTIONS_PREFERRED, &["C1 (moderate)"]);
    let p1 = with_compat(p1, fields::DESIGN_TYPES_OFTEN, &["D1>sub1"]);
    let c1 = with_compat(
        Entity::new("C1", "C1", EntityKind::Conception),
        fields::DESIGN_TYPES,
        &["D1>sub1"],
    );
    Framework {
        philosophies: vec![p1],
        conceptions: vec![c1],
        ..Framework::default()
    }
}

fn edge(from: &str, to: &str, strength: EdgeStrength) -> RelationEdge {
    RelationEdge {
        from: from.to_string(),
        to: to.to_string(),
        strength,
    }
}

#[test]
fn scenario_yields_three_stripped_edges() {
    let edges = derive_edges(&scenario());
    assert_eq!(
        edges,
        vec![
            edge("P1", "C1", EdgeStrength::Often),
            edge("C1", "D1", EdgeStrength::Often),
            edge("P1", "D1", EdgeStrength::Contextual),
        ]
    );
    assert_eq!(
        edges.iter().map(|e| e.strength.weight()).collect::<Vec<_>>(),
        vec![2, 2, 1]
    );
}

#[test]
fn unqualified_preference_is_strong() {
    let p = with_compat(
        Entity::new("p", "p", EntityKind::Philosophy),
        fields::CONCEPTIONS_PREFERRED,
        &["c"],
    );
    let fw = Framework {
        philosophies: vec![p],
        ..Framework::default()
    };
    assert_eq!(derive_edges(&fw), vec![edge("p", "c", EdgeStrength::Strong)]);
}

#[test]
fn derivation_is_deterministic_and_pairs_are_unique() {
    let p = Entity::new("p", "p", EntityKind::Philosophy);
    let p = with_compat(
        p,
        fields::CONCEPTIONS_PREFERRED,
        &["c", "c (weak)", "d"],
    );
    // `design_types_often` repeats a pair the first pass already produced.
    let p = with_compat(p, fields::DESIGN_TYPES_OFTEN, &["x>a", "x>b", "d"]);
    let c = with_compat(
        Entity::new("c", "c", EntityKind::Conception),
        fields::DESIGN_TYPES,
        &["x>a", "x>b", "x"],
    );
    let fw = Framework {
        philosophies: vec![p],
        conceptions: vec![c],
        ..Framework::default()
    };

    let first = derive_edges(&fw);
    let second = derive_edges(&fw);
    assert_eq!(first, second);

    let mut pairs = first
        .iter()
        .map(|e| (e.from.clone(), e.to.clone()))
        .collect::<Vec<_>>();
    let total = pairs.len();
    pairs.sort();
    pairs.dedup();
    assert_eq!(pairs.len(), total);

    // First edge for a pair wins.
    assert!(first.contains(&edge("p", "c", EdgeStrength::Strong)));
    assert!(first.contains(&edge("p", "d", EdgeStrength::Strong)));
    assert!(first.contains(&edge("c", "x", EdgeStrength::Often)));
    assert!(first.contains(&edge("p", "x", EdgeStrength::Contextual)));
    assert_eq!(first.len(), 4);
}

#[test]
fn graph_reports_dangling_targets_without_dropping_them() {
    let graph = build_relation_graph(&scenario());
    assert_eq!(graph.edges.len(), 3);
    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(
        graph.warnings,
        vec![
            IntegrityWarning::DanglingTarget {
                from: "C1".to_string(),
                to: "D1".to_string()
            },
            IntegrityWarning::DanglingTarget {
                from: "P1".to_string(),
                to: "D1".to_string()
            },
        ]
    );
}

#[test]
fn nodes_cover_parent_design_types_only() {
    let mut design = Entity::new("D1", "Design One", EntityKind::Design);
    let mut sub = Entity::new("sub1", "Sub", EntityKind::Design);
    sub.parent_id = Some("D1".to_string());
    design.subtypes.push(sub);
    let mut fw = scenario();
    fw.design_types.push(design);

    let graph = build_relation_graph(&fw);
    let columns = graph
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.column))
        .collect::<Vec<_>>();
    assert_eq!(
        columns,
        vec![
            ("P1", FlowColumn::Charter),
            ("C1", FlowColumn::Brief),
            ("D1", FlowColumn::Scheme),
        ]
    );
    assert!(graph.warnings.is_empty());
}
