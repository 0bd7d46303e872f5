#![forbid(unsafe_code)]

/// A parsed compatibility reference such as `"learner_centered>child_centered"`
/// or `"social_reconstruction (moderate)"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompatRef {
    pub target: String,
    pub child: Option<String>,
    pub qualified: bool,
}

impl CompatRef {
    pub fn parse(raw: &str) -> Self {
        let qualified = raw.contains('(');
        let cleaned = strip_qualifiers(raw);
        match cleaned.split_once('>') {
            Some((parent, child)) => Self {
                target: parent.trim().to_string(),
                child: Some(child.trim().to_string()).filter(|c| !c.is_empty()),
                qualified,
            },
            None => Self {
                target: cleaned,
                child: None,
                qualified,
            },
        }
    }
}

/// Removes every parenthetical group (and the whitespace before it), then trims.
///
/// An unclosed `(` is left in place.
pub fn strip_qualifiers(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('(') {
        let Some(close_rel) = rest[open..].find(')') else {
            break;
        };
        out.push_str(rest[..open].trim_end());
        rest = &rest[open + close_rel + 1..];
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// `"parent>child"` -> `"parent"`; plain references are returned trimmed.
pub fn parent_of(raw: &str) -> &str {
    match raw.split_once('>') {
        Some((parent, _)) => parent.trim(),
        None => raw.trim(),
    }
}
