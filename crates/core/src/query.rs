#![forbid(unsafe_code)]

use crate::level::Level;
use crate::model::{Actor, Entity, EntityKind, Framework, fields};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchScope {
    Entities,
    Actors,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResults<'a> {
    Entities(Vec<&'a Entity>),
    Actors(Vec<&'a Actor>),
}

impl SearchResults<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Entities(items) => items.len(),
            Self::Actors(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn search<'a>(framework: &'a Framework, query: &str, scope: SearchScope) -> SearchResults<'a> {
    match scope {
        SearchScope::Entities => SearchResults::Entities(search_entities(framework, query)),
        SearchScope::Actors => SearchResults::Actors(search_actors(framework, query)),
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn any_contains_ci(values: &[String], needle_lower: &str) -> bool {
    values.iter().any(|value| contains_ci(value, needle_lower))
}

fn entity_matches(entity: &Entity, needle_lower: &str) -> bool {
    contains_ci(&entity.label, needle_lower)
        || entity
            .definition
            .as_deref()
            .is_some_and(|d| contains_ci(d, needle_lower))
        || any_contains_ci(entity.list(fields::AIMS), needle_lower)
        || any_contains_ci(entity.list(fields::ENDS), needle_lower)
        || entity
            .text(fields::PRIMARY_FUNCTION)
            .is_some_and(|f| contains_ci(f, needle_lower))
}

fn actor_matches(actor: &Actor, needle_lower: &str) -> bool {
    contains_ci(&actor.label, needle_lower)
        || any_contains_ci(&actor.primary_concerns, needle_lower)
        || any_contains_ci(&actor.typical_artifacts, needle_lower)
}

/// Blank queries return every entity in `Framework::all_entities` order.
pub fn search_entities<'a>(framework: &'a Framework, query: &str) -> Vec<&'a Entity> {
    let query = query.trim();
    if query.is_empty() {
        return framework.all_entities().collect();
    }
    let needle = query.to_lowercase();
    framework
        .all_entities()
        .filter(|entity| entity_matches(entity, &needle))
        .collect()
}

/// Blank queries return the full roster in document order.
pub fn search_actors<'a>(framework: &'a Framework, query: &str) -> Vec<&'a Actor> {
    let query = query.trim();
    if query.is_empty() {
        return framework.actors.iter().collect();
    }
    let needle = query.to_lowercase();
    framework
        .actors
        .iter()
        .filter(|actor| actor_matches(actor, &needle))
        .collect()
}

/// Partitions actors into all five level buckets; empty buckets are kept.
pub fn group_actors_by_level<'a, I>(actors: I) -> BTreeMap<Level, Vec<&'a Actor>>
where
    I: IntoIterator<Item = &'a Actor>,
{
    let mut groups = Level::ALL
        .into_iter()
        .map(|level| (level, Vec::new()))
        .collect::<BTreeMap<_, _>>();
    for actor in actors {
        groups.entry(actor.level).or_default().push(actor);
    }
    groups
}

/// Partitions entities into all three kind buckets; empty buckets are kept.
pub fn group_entities_by_kind<'a, I>(entities: I) -> BTreeMap<EntityKind, Vec<&'a Entity>>
where
    I: IntoIterator<Item = &'a Entity>,
{
    let mut groups = EntityKind::ALL
        .into_iter()
        .map(|kind| (kind, Vec::new()))
        .collect::<BTreeMap<_, _>>();
    for entity in entities {
        groups.entry(entity.kind).or_default().push(entity);
    }
    groups
}

/// Top-level list first; design lookups then fall through to every subtype list.
pub fn find_by_id<'a>(framework: &'a Framework, kind: EntityKind, id: &str) -> Option<&'a Entity> {
    if let Some(found) = framework.entities_of(kind).iter().find(|e| e.id == id) {
        return Some(found);
    }
    if kind != EntityKind::Design {
        return None;
    }
    framework.subtypes().find(|sub| sub.id == id)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindFilter {
    All,
    Only(EntityKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelFilter {
    All,
    Only(Level),
}

pub fn filter_entities_by_kind<'a>(entities: Vec<&'a Entity>, filter: KindFilter) -> Vec<&'a Entity> {
    match filter {
        KindFilter::All => entities,
        KindFilter::Only(kind) => entities.into_iter().filter(|e| e.kind == kind).collect(),
    }
}

pub fn filter_actors_by_level<'a>(actors: Vec<&'a Actor>, filter: LevelFilter) -> Vec<&'a Actor> {
    match filter {
        LevelFilter::All => actors,
        LevelFilter::Only(level) => actors.into_iter().filter(|a| a.level == level).collect(),
    }
}
