#![forbid(unsafe_code)]

use cc_core::lens::LensMode;
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// One `from -> to` phrase rewrite as it appears in the lens document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformRule {
    #[serde(deserialize_with = "crate::lenient::value")]
    pub from: String,
    #[serde(deserialize_with = "crate::lenient::value")]
    pub to: String,
}

/// Ordered phrase rewrites applied under the posthuman lens.
///
/// Each `from` is matched literally and case-insensitively; later rules see the
/// output of earlier ones.
#[derive(Clone, Debug, Default)]
pub struct TextTransform {
    rules: Vec<(Regex, String)>,
}

impl TextTransform {
    pub fn new(rules: &[TransformRule]) -> Self {
        let rules = rules
            .iter()
            .filter(|rule| !rule.from.is_empty())
            .filter_map(|rule| {
                match RegexBuilder::new(&regex::escape(&rule.from))
                    .case_insensitive(true)
                    .build()
                {
                    Ok(pattern) => Some((pattern, rule.to.clone())),
                    Err(err) => {
                        tracing::warn!(from = %rule.from, error = %err, "skipping text transform rule");
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn apply(&self, text: &str, mode: LensMode) -> String {
        if !mode.is_posthuman() {
            return text.to_string();
        }
        self.rules
            .iter()
            .fold(text.to_string(), |acc, (pattern, replacement)| {
                pattern
                    .replace_all(&acc, NoExpand(replacement.as_str()))
                    .into_owned()
            })
    }
}
