#![forbid(unsafe_code)]

use cc_core::graph::{IntegrityWarning, RelationGraph};
use cc_core::lens::LensPreference;
use cc_core::{Actor, Entity, Framework, PracticeExample, Site};
use cc_storage::{DocumentKind, DocumentSource, EntityAnnotation, FrameworkRepository, LoadState};
use serde_json::{Value, json};

pub(super) fn entity_summary(entity: &Entity) -> Value {
    json!({
        "id": entity.id,
        "label": entity.label,
        "kind": entity.kind.as_str(),
        "parent_id": entity.parent_id,
        "definition": entity.definition,
    })
}

pub(super) fn entity_detail(entity: &Entity) -> Value {
    json!({
        "id": entity.id,
        "label": entity.label,
        "kind": entity.kind.as_str(),
        "parent_id": entity.parent_id,
        "definition": entity.definition,
        "text_fields": entity.text_fields,
        "list_fields": entity.list_fields,
        "common_tensions": entity.common_tensions,
        "compatibilities": entity.compatibilities,
        "practice_examples": entity
            .practice_examples
            .iter()
            .map(practice_example)
            .collect::<Vec<_>>(),
        "subtypes": entity.subtypes.iter().map(entity_summary).collect::<Vec<_>>(),
    })
}

fn practice_example(example: &PracticeExample) -> Value {
    json!({
        "id": example.id,
        "title": example.title,
        "one_liner": example.one_liner,
        "planning": example.planning,
        "instruction": example.instruction,
        "assessment": example.assessment,
        "planning_practices": example.planning_practices,
        "instruction_practices": example.instruction_practices,
        "assessment_practices": example.assessment_practices,
        "signals": example.signals,
        "tradeoff": example.tradeoff,
    })
}

pub(super) fn actor(actor: &Actor) -> Value {
    json!({
        "id": actor.id,
        "label": actor.label,
        "level": actor.level.as_str(),
        "typical_power": actor.typical_power,
        "primary_concerns": actor.primary_concerns,
        "typical_artifacts": actor.typical_artifacts,
    })
}

fn site(site: &Site) -> Value {
    json!({
        "key": site.key,
        "level": site.level.map(|level| level.as_str()),
        "label": site.label,
        "description": site.description,
    })
}

pub(super) fn framework_overview(framework: &Framework) -> Value {
    json!({
        "meta": {
            "name": framework.meta.name,
            "version": framework.meta.version,
            "notes": framework.meta.notes,
            "updated_at": framework.meta.updated_at,
        },
        "premise": framework.premise,
        "key_principles": framework.key_principles,
        "relationship_notes": framework.relationship_notes,
        "sites": framework.sites.iter().map(site).collect::<Vec<_>>(),
        "counts": {
            "philosophies": framework.philosophies.len(),
            "conceptions": framework.conceptions.len(),
            "design_types": framework.design_types.len(),
            "subtypes": framework.subtypes().count(),
            "actors": framework.actors.len(),
        },
    })
}

pub(super) fn graph(graph: &RelationGraph) -> Value {
    let nodes = graph
        .nodes
        .iter()
        .map(|node| {
            json!({
                "id": node.id,
                "label": node.label,
                "column": node.column.as_str(),
                "tensions": node.tensions,
            })
        })
        .collect::<Vec<_>>();
    let edges = graph
        .edges
        .iter()
        .map(|edge| {
            json!({
                "from": edge.from,
                "to": edge.to,
                "strength": edge.strength.as_str(),
                "weight": edge.strength.weight(),
            })
        })
        .collect::<Vec<_>>();
    let warnings = graph.warnings.iter().map(warning).collect::<Vec<_>>();
    json!({ "nodes": nodes, "edges": edges, "warnings": warnings })
}

fn warning(warning: &IntegrityWarning) -> Value {
    match warning {
        IntegrityWarning::DanglingTarget { from, to } => json!({
            "kind": "dangling_target",
            "from": from,
            "to": to,
            "message": warning.message(),
        }),
    }
}

pub(super) fn preference(pref: LensPreference) -> Value {
    json!({
        "mode": pref.mode().as_str(),
        "actors_visible": pref.actors_visible(),
    })
}

pub(super) fn annotation(prefix: &str, annotation: &EntityAnnotation) -> Value {
    json!({
        "prefix": prefix,
        "posthuman_reading": annotation.posthuman_reading,
        "hidden_actors": annotation.hidden_actors,
    })
}

pub(super) fn documents<S: DocumentSource>(repo: &FrameworkRepository<S>) -> Value {
    let mut out = serde_json::Map::new();
    for kind in DocumentKind::ALL {
        let state = repo.state(kind);
        let error = match &state {
            LoadState::Failed(message) => Some(message.clone()),
            LoadState::Pending | LoadState::Ready => None,
        };
        out.insert(
            kind.as_str().to_string(),
            json!({
                "path": kind.relative_path(),
                "state": state.as_str(),
                "fingerprint": repo.fingerprint(kind),
                "error": error,
            }),
        );
    }
    Value::Object(out)
}
