#![forbid(unsafe_code)]

use crate::model::{Entity, EntityKind, fields};
use std::fmt::Write as _;

pub const MIN_COMPARE: usize = 2;
pub const MAX_COMPARE: usize = 4;

const DISCUSSION_QUESTIONS: &[&str] = &[
    "What similarities do you notice across these conceptual approaches?",
    "What tensions might arise when trying to combine these in practice?",
    "Which approach best aligns with your current context and constraints?",
    "What bridging moves might help integrate elements from multiple approaches?",
];

const CLOSING_NOTE: &str =
    "This is a conceptual lens, not a diagnostic tool. Real curriculum often involves hybridization.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompareError {
    TooFew { count: usize },
    TooMany { count: usize },
    MixedKinds,
}

impl CompareError {
    pub fn message(&self) -> String {
        match self {
            Self::TooFew { count } => {
                format!("select at least {MIN_COMPARE} entities to compare (got {count})")
            }
            Self::TooMany { count } => {
                format!("select at most {MAX_COMPARE} entities to compare (got {count})")
            }
            Self::MixedKinds => "compared entities must share one kind".to_string(),
        }
    }
}

/// Two to four entities of one kind, side by side.
#[derive(Clone, Debug)]
pub struct Comparison<'a> {
    kind: EntityKind,
    entities: Vec<&'a Entity>,
}

impl<'a> Comparison<'a> {
    pub fn new(entities: Vec<&'a Entity>) -> Result<Self, CompareError> {
        let count = entities.len();
        if count < MIN_COMPARE {
            return Err(CompareError::TooFew { count });
        }
        if count > MAX_COMPARE {
            return Err(CompareError::TooMany { count });
        }
        let kind = entities[0].kind;
        if entities.iter().any(|e| e.kind != kind) {
            return Err(CompareError::MixedKinds);
        }
        Ok(Self { kind, entities })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn entities(&self) -> &[&'a Entity] {
        &self.entities
    }

    /// Renders the comparison as a shareable markdown document.
    pub fn to_markdown(&self, generated_on: &str) -> String {
        let mut md = String::new();
        let _ = writeln!(md, "# Curriculum Concept Comparison\n");
        let _ = writeln!(md, "_Generated: {generated_on}_\n");
        let _ = writeln!(md, "---\n");
        let _ = writeln!(md, "## {} Comparison\n", self.kind.title());

        for entity in &self.entities {
            let _ = writeln!(md, "### {}\n", entity.label);
            if let Some(definition) = entity.definition.as_deref() {
                let _ = writeln!(md, "**Definition:** {definition}\n");
            }
            push_list(&mut md, "Aims", entity.list(fields::AIMS));
            if let Some(function) = entity.text(fields::PRIMARY_FUNCTION) {
                let _ = writeln!(md, "**Primary Function:** {function}\n");
            }
            push_list(&mut md, "Pedagogy Bias", entity.list(fields::PEDAGOGY_BIAS));
            push_list(
                &mut md,
                "Evidence Standard",
                entity.list(fields::EVIDENCE_STANDARD),
            );
            let _ = writeln!(md, "---\n");
        }

        let _ = writeln!(md, "## Discussion Questions\n");
        for (idx, question) in DISCUSSION_QUESTIONS.iter().enumerate() {
            let _ = writeln!(md, "{}. {question}", idx + 1);
        }
        let _ = writeln!(md, "\n---\n");
        let _ = writeln!(md, "_{CLOSING_NOTE}_");
        md
    }
}

fn push_list(md: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(md, "**{title}:**");
    for item in items {
        let _ = writeln!(md, "- {item}");
    }
    md.push('\n');
}
