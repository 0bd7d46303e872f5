#![forbid(unsafe_code)]

//! Raw taxonomy JSON -> typed `cc_core::Framework`.
//!
//! Parsing is lenient below the top level: a missing or mistyped section reads
//! as empty and a mistyped field inside a record reads as absent.

use crate::error::LoadError;
use crate::source::DocumentKind;
use cc_core::{
    Actor, Entity, EntityKind, Framework, FrameworkMeta, Level, PracticeExample, Site,
    actor_label_from_id, infer_actor_level,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const UNNAMED: &str = "Unnamed";

// Entity keys with dedicated slots on `Entity`.
const RESERVED_ENTITY_KEYS: &[&str] = &[
    "id",
    "label",
    "definition",
    "common_tensions",
    "compatibilities",
    "practice_examples",
    "subtypes",
];

pub fn parse_framework_bytes(bytes: &[u8]) -> Result<Framework, LoadError> {
    let raw: Value = serde_json::from_slice(bytes).map_err(|source| LoadError::Parse {
        document: DocumentKind::Framework,
        source,
    })?;
    parse_framework(&raw)
}

pub fn parse_framework(raw: &Value) -> Result<Framework, LoadError> {
    let Some(root) = raw.as_object() else {
        return Err(LoadError::NotAnObject {
            document: DocumentKind::Framework,
        });
    };

    let entities = object_at(root, "entities");
    let axis_a = object_at(root, "axis_A_conceptual");
    let axis_b = object_at(root, "axis_B_curriculum_making");

    let parse_kind = |key: &str, kind: EntityKind| {
        objects_at(entities, key)
            .map(|raw| parse_entity(raw, kind, None))
            .collect::<Vec<_>>()
    };

    Ok(Framework {
        meta: parse_meta(object_at(root, "meta")),
        philosophies: parse_kind("educational_philosophies", EntityKind::Philosophy),
        conceptions: parse_kind("curriculum_conceptions", EntityKind::Conception),
        design_types: parse_kind("curriculum_design_types", EntityKind::Design),
        actors: objects_at(axis_b, "actor_types").map(parse_actor).collect(),
        sites: parse_sites(axis_b),
        premise: str_at(axis_b, "premise"),
        key_principles: strings_at(axis_b, "key_principles"),
        relationship_notes: strings_at(axis_a, "relationship_notes"),
    })
}

fn parse_meta(raw: Option<&Map<String, Value>>) -> FrameworkMeta {
    let defaults = FrameworkMeta::default();
    FrameworkMeta {
        name: non_empty_str_at(raw, "name").unwrap_or(defaults.name),
        version: non_empty_str_at(raw, "version").unwrap_or(defaults.version),
        notes: strings_at(raw, "notes"),
        updated_at: str_at(raw, "updated_at"),
    }
}

fn parse_entity(raw: &Map<String, Value>, kind: EntityKind, parent_id: Option<&str>) -> Entity {
    let id = str_at(Some(raw), "id").unwrap_or_default();
    let label = non_empty_str_at(Some(raw), "label")
        .or_else(|| Some(id.clone()).filter(|id| !id.is_empty()))
        .unwrap_or_else(|| UNNAMED.to_string());

    let mut entity = Entity::new(id, label, kind);
    entity.parent_id = parent_id.map(str::to_string);
    entity.definition = str_at(Some(raw), "definition");
    entity.common_tensions = strings_at(Some(raw), "common_tensions");
    entity.compatibilities = parse_compatibilities(object_at(raw, "compatibilities"));
    entity.practice_examples = objects_at(Some(raw), "practice_examples")
        .map(parse_practice_example)
        .collect();

    for (key, value) in raw {
        if RESERVED_ENTITY_KEYS.contains(&key.as_str()) {
            continue;
        }
        match value {
            Value::String(text) => {
                entity.text_fields.insert(key.clone(), text.clone());
            }
            Value::Array(items) => {
                entity
                    .list_fields
                    .insert(key.clone(), strings_of(items));
            }
            _ => {}
        }
    }

    // Nesting is one level deep; subtypes of subtypes are not read.
    if kind == EntityKind::Design && parent_id.is_none() {
        let parent = entity.id.clone();
        entity.subtypes = objects_at(Some(raw), "subtypes")
            .map(|sub| parse_entity(sub, EntityKind::Design, Some(&parent)))
            .collect();
    }
    entity
}

fn parse_compatibilities(raw: Option<&Map<String, Value>>) -> BTreeMap<String, Vec<String>> {
    raw.into_iter()
        .flatten()
        .filter_map(|(relation, refs)| {
            refs.as_array()
                .map(|items| (relation.clone(), strings_of(items)))
        })
        .collect()
}

fn parse_practice_example(raw: &Map<String, Value>) -> PracticeExample {
    let raw = Some(raw);
    PracticeExample {
        id: str_at(raw, "id").unwrap_or_default(),
        title: str_at(raw, "title"),
        one_liner: str_at(raw, "one_liner"),
        planning: str_at(raw, "planning"),
        instruction: str_at(raw, "instruction"),
        assessment: str_at(raw, "assessment"),
        planning_practices: strings_at(raw, "planning_practices"),
        instruction_practices: strings_at(raw, "instruction_practices"),
        assessment_practices: strings_at(raw, "assessment_practices"),
        signals: strings_at(raw, "signals"),
        tradeoff: str_at(raw, "tradeoff"),
    }
}

fn parse_actor(raw: &Map<String, Value>) -> Actor {
    let raw = Some(raw);
    let id = non_empty_str_at(raw, "actor")
        .or_else(|| str_at(raw, "id"))
        .unwrap_or_default();
    let level = str_at(raw, "level")
        .and_then(|level| Level::parse(&level).ok())
        .unwrap_or_else(|| infer_actor_level(&id));
    let label = non_empty_str_at(raw, "label").unwrap_or_else(|| actor_label_from_id(&id));
    Actor {
        label,
        level,
        typical_power: str_at(raw, "typical_power"),
        primary_concerns: strings_at(raw, "primary_concerns"),
        typical_artifacts: strings_at(raw, "typical_artifacts"),
        id,
    }
}

fn parse_sites(axis_b: Option<&Map<String, Value>>) -> Vec<Site> {
    let mut sites = match object_at_opt(axis_b, "sites") {
        Some(map) => map
            .iter()
            .map(|(key, value)| site(key, value.as_object()))
            .collect::<Vec<_>>(),
        None => objects_at(axis_b, "sites_of_activity")
            .filter_map(|raw| {
                let key = non_empty_str_at(Some(raw), "site")
                    .or_else(|| non_empty_str_at(Some(raw), "id"))?;
                Some(site(&key, Some(raw)))
            })
            .collect(),
    };
    // Known levels first in level order, then the rest by key.
    sites.sort_by(|a, b| {
        let rank = |s: &Site| s.level.map_or(usize::MAX, Level::order);
        rank(a).cmp(&rank(b)).then_with(|| a.key.cmp(&b.key))
    });
    sites
}

fn site(key: &str, raw: Option<&Map<String, Value>>) -> Site {
    Site {
        key: key.to_string(),
        level: Level::parse(key).ok(),
        label: non_empty_str_at(raw, "label").unwrap_or_else(|| key.to_string()),
        description: str_at(raw, "description").unwrap_or_default(),
    }
}

fn object_at<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

fn object_at_opt<'a>(
    map: Option<&'a Map<String, Value>>,
    key: &str,
) -> Option<&'a Map<String, Value>> {
    map.and_then(|map| object_at(map, key))
}

fn objects_at<'a>(
    map: Option<&'a Map<String, Value>>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    map.and_then(|map| map.get(key))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn str_at(map: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    map.and_then(|map| map.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn non_empty_str_at(map: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    str_at(map, key).filter(|value| !value.is_empty())
}

fn strings_at(map: Option<&Map<String, Value>>, key: &str) -> Vec<String> {
    map.and_then(|map| map.get(key))
        .and_then(Value::as_array)
        .map(|items| strings_of(items))
        .unwrap_or_default()
}

/// Non-string items are dropped.
fn strings_of(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
