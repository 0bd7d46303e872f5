#![forbid(unsafe_code)]

use crate::level::Level;
use std::collections::BTreeMap;

/// Raw field names the query layer and the comparison export read.
pub mod fields {
    pub const AIMS: &str = "aims";
    pub const ENDS: &str = "ends";
    pub const PRIMARY_FUNCTION: &str = "primary_function";
    pub const PHILOSOPHICAL_BASIS: &str = "philosophical_basis";
    pub const PEDAGOGY_BIAS: &str = "pedagogy_bias";
    pub const EVIDENCE_STANDARD: &str = "evidence_standard";

    pub const CONCEPTIONS_PREFERRED: &str = "curriculum_conceptions_preferred";
    pub const DESIGN_TYPES_OFTEN: &str = "design_types_often";
    pub const DESIGN_TYPES: &str = "design_types";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Philosophy,
    Conception,
    Design,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Philosophy,
        EntityKind::Conception,
        EntityKind::Design,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Philosophy => "philosophy",
            EntityKind::Conception => "conception",
            EntityKind::Design => "design",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "philosophy" | "philosophies" => Some(Self::Philosophy),
            "conception" | "conceptions" => Some(Self::Conception),
            "design" | "design_type" | "design_types" => Some(Self::Design),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            EntityKind::Philosophy => "Philosophy",
            EntityKind::Conception => "Conception",
            EntityKind::Design => "Design",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PracticeExample {
    pub id: String,
    pub title: Option<String>,
    pub one_liner: Option<String>,
    pub planning: Option<String>,
    pub instruction: Option<String>,
    pub assessment: Option<String>,
    pub planning_practices: Vec<String>,
    pub instruction_practices: Vec<String>,
    pub assessment_practices: Vec<String>,
    pub signals: Vec<String>,
    pub tradeoff: Option<String>,
}

/// A taxonomy node. Built once by the normalization layer and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: String,
    pub label: String,
    pub kind: EntityKind,
    /// Set on design subtypes only.
    pub parent_id: Option<String>,
    pub definition: Option<String>,
    pub text_fields: BTreeMap<String, String>,
    pub list_fields: BTreeMap<String, Vec<String>>,
    pub common_tensions: Vec<String>,
    pub compatibilities: BTreeMap<String, Vec<String>>,
    pub practice_examples: Vec<PracticeExample>,
    pub subtypes: Vec<Entity>,
}

impl Entity {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            parent_id: None,
            definition: None,
            text_fields: BTreeMap::new(),
            list_fields: BTreeMap::new(),
            common_tensions: Vec::new(),
            compatibilities: BTreeMap::new(),
            practice_examples: Vec::new(),
            subtypes: Vec::new(),
        }
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.text_fields.get(field).map(String::as_str)
    }

    /// Missing list fields read as empty.
    pub fn list(&self, field: &str) -> &[String] {
        self.list_fields
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn compatibility(&self, relation: &str) -> &[String] {
        self.compatibilities
            .get(relation)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub label: String,
    pub level: Level,
    pub typical_power: Option<String>,
    pub primary_concerns: Vec<String>,
    pub typical_artifacts: Vec<String>,
}

/// `teachers_unions` -> `Teachers Unions`.
pub fn actor_label_from_id(actor_id: &str) -> String {
    actor_id
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Site {
    pub key: String,
    pub level: Option<Level>,
    pub label: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameworkMeta {
    pub name: String,
    pub version: String,
    pub notes: Vec<String>,
    pub updated_at: Option<String>,
}

impl Default for FrameworkMeta {
    fn default() -> Self {
        Self {
            name: "Framework".to_string(),
            version: "0.0".to_string(),
            notes: Vec::new(),
            updated_at: None,
        }
    }
}

/// The canonical, normalized taxonomy and actor roster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Framework {
    pub meta: FrameworkMeta,
    pub philosophies: Vec<Entity>,
    pub conceptions: Vec<Entity>,
    pub design_types: Vec<Entity>,
    pub actors: Vec<Actor>,
    pub sites: Vec<Site>,
    pub premise: Option<String>,
    pub key_principles: Vec<String>,
    pub relationship_notes: Vec<String>,
}

impl Framework {
    pub fn entities_of(&self, kind: EntityKind) -> &[Entity] {
        match kind {
            EntityKind::Philosophy => &self.philosophies,
            EntityKind::Conception => &self.conceptions,
            EntityKind::Design => &self.design_types,
        }
    }

    /// Every subtype of every design type, parents in document order.
    pub fn subtypes(&self) -> impl Iterator<Item = &Entity> {
        self.design_types
            .iter()
            .flat_map(|design| design.subtypes.iter())
    }

    /// Flat view: philosophies, conceptions, design types, then every subtype.
    ///
    /// Subtypes are yielded by reference from their parent's list, so the flat
    /// and nested views always show the same record.
    pub fn all_entities(&self) -> impl Iterator<Item = &Entity> {
        self.philosophies
            .iter()
            .chain(self.conceptions.iter())
            .chain(self.design_types.iter())
            .chain(self.subtypes())
    }

    pub fn entity_count(&self) -> usize {
        self.all_entities().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_label_title_cases_words() {
        assert_eq!(actor_label_from_id("policy_makers"), "Policy Makers");
        assert_eq!(actor_label_from_id("students"), "Students");
        assert_eq!(actor_label_from_id("__odd__id"), "Odd Id");
        assert_eq!(actor_label_from_id(""), "");
    }

    #[test]
    fn kind_parses_singular_and_plural() {
        assert_eq!(EntityKind::parse("philosophies"), Some(EntityKind::Philosophy));
        assert_eq!(EntityKind::parse("design_type"), Some(EntityKind::Design));
        assert_eq!(EntityKind::parse("actor"), None);
    }

    #[test]
    fn flat_view_appends_subtypes_after_parents() {
        let mut design = Entity::new("learner_centered", "Learner-centered", EntityKind::Design);
        let mut sub = Entity::new("child_centered", "Child-centered", EntityKind::Design);
        sub.parent_id = Some("learner_centered".to_string());
        design.subtypes.push(sub);

        let framework = Framework {
            philosophies: vec![Entity::new("p", "P", EntityKind::Philosophy)],
            conceptions: vec![Entity::new("c", "C", EntityKind::Conception)],
            design_types: vec![design],
            ..Framework::default()
        };

        let ids = framework
            .all_entities()
            .map(|e| e.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["p", "c", "learner_centered", "child_centered"]);

        let flat_sub = framework.all_entities().last().unwrap();
        let nested_sub = &framework.design_types[0].subtypes[0];
        assert!(std::ptr::eq(flat_sub, nested_sub));
    }
}
