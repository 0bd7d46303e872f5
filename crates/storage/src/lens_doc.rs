#![forbid(unsafe_code)]

//! The posthuman lens document. Every section is optional on the wire.

use crate::error::LoadError;
use crate::source::DocumentKind;
use crate::transform::{TextTransform, TransformRule};
use cc_core::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensDocument {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub meta: LensMeta,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub main_view: MainView,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub philosophical_orientation: PhilosophicalOrientation,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub posthuman_actors: Vec<PosthumanActor>,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub language_transforms: LanguageTransforms,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub entity_annotations: EntityAnnotations,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub design_implications: DesignImplications,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub ui_guidance: UiGuidance,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensMeta {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub name: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub version: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub description: String,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub notes: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainView {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub title: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub subtitle: String,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub declarations: Vec<Declaration>,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub exploratory_questions: Vec<String>,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub closing_reflection: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Declaration {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub statement: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub elaboration: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhilosophicalOrientation {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub core_principle: String,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub key_shifts: Vec<TransformRule>,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub curriculum_as: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosthumanCategory {
    Material,
    Technological,
    Temporal,
    Affective,
    Ecological,
    #[default]
    #[serde(other)]
    Other,
}

/// A non-human influence on curriculum: tools, time, place, feeling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosthumanActor {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub id: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub category: PosthumanCategory,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub label: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub icon: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub color: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub definition: String,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub examples: Vec<String>,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub agency_framing: String,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub common_influences: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageTransforms {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub instructions: String,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub transforms: Vec<TransformRule>,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub phrasing_guidance: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityAnnotation {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub posthuman_reading: String,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub hidden_actors: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityAnnotations {
    #[serde(deserialize_with = "crate::lenient::map")]
    pub philosophies: BTreeMap<String, EntityAnnotation>,
    #[serde(deserialize_with = "crate::lenient::map")]
    pub conceptions: BTreeMap<String, EntityAnnotation>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignImplications {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub principle: String,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub guidance: Vec<String>,
    #[serde(deserialize_with = "crate::lenient::list")]
    pub questions_for_designers: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensToggleLabels {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub default_label: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub posthuman_label: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub tooltip: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiGuidance {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub lens_toggle: LensToggleLabels,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub annotation_prefix: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub actor_section_title: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub disclaimer: String,
}

impl LensDocument {
    /// Design types carry no annotations.
    pub fn annotation(&self, kind: EntityKind, id: &str) -> Option<&EntityAnnotation> {
        match kind {
            EntityKind::Philosophy => self.entity_annotations.philosophies.get(id),
            EntityKind::Conception => self.entity_annotations.conceptions.get(id),
            EntityKind::Design => None,
        }
    }

    pub fn text_transform(&self) -> TextTransform {
        TextTransform::new(&self.language_transforms.transforms)
    }
}

pub fn parse_lens_bytes(bytes: &[u8]) -> Result<LensDocument, LoadError> {
    let raw: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|source| LoadError::Parse {
            document: DocumentKind::Lens,
            source,
        })?;
    if !raw.is_object() {
        return Err(LoadError::NotAnObject {
            document: DocumentKind::Lens,
        });
    }
    serde_json::from_value(raw).map_err(|source| LoadError::Parse {
        document: DocumentKind::Lens,
        source,
    })
}
