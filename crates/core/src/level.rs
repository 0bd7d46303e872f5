#![forbid(unsafe_code)]

/// Organizational scope an actor works at, ordered from widest to narrowest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Supra,
    Macro,
    Meso,
    Micro,
    Nano,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Supra,
        Level::Macro,
        Level::Meso,
        Level::Micro,
        Level::Nano,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Supra => "supra",
            Level::Macro => "macro",
            Level::Meso => "meso",
            Level::Micro => "micro",
            Level::Nano => "nano",
        }
    }

    /// Display order used for rails and site lists.
    pub fn order(self) -> usize {
        match self {
            Level::Supra => 0,
            Level::Macro => 1,
            Level::Meso => 2,
            Level::Micro => 3,
            Level::Nano => 4,
        }
    }

    pub fn parse(value: &str) -> Result<Self, LevelParseError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LevelParseError::Empty);
        }
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or(LevelParseError::Unknown)
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelParseError {
    Empty,
    Unknown,
}

impl LevelParseError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "level must not be empty",
            Self::Unknown => "level must be one of supra|macro|meso|micro|nano",
        }
    }
}

// Evaluated top to bottom; the first matching needle decides.
const LEVEL_RULES: &[(&[&str], Level)] = &[
    (&["policy", "assessment_bodies"], Level::Macro),
    (&["system_leaders"], Level::Macro),
    (&["school_leaders"], Level::Meso),
    (&["teachers"], Level::Micro),
    (&["students"], Level::Nano),
    (&["families"], Level::Nano),
    (&["publishers"], Level::Meso),
];

const DEFAULT_LEVEL: Level = Level::Meso;

/// Infers the level of an actor from its identifier.
///
/// This is the only classification rule in the workspace: normalization, the
/// relationship graph and the viewer all call it, so one actor never lands in
/// two different buckets.
pub fn infer_actor_level(actor_id: &str) -> Level {
    for (needles, level) in LEVEL_RULES {
        if needles.iter().any(|needle| actor_id.contains(needle)) {
            return *level;
        }
    }
    DEFAULT_LEVEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_follows_priority_order() {
        assert_eq!(infer_actor_level("policy_makers"), Level::Macro);
        assert_eq!(infer_actor_level("assessment_bodies"), Level::Macro);
        assert_eq!(infer_actor_level("system_leaders"), Level::Macro);
        assert_eq!(infer_actor_level("school_leaders"), Level::Meso);
        assert_eq!(infer_actor_level("teachers"), Level::Micro);
        assert_eq!(infer_actor_level("students"), Level::Nano);
        assert_eq!(infer_actor_level("families"), Level::Nano);
        assert_eq!(infer_actor_level("textbook_publishers"), Level::Meso);
        assert_eq!(infer_actor_level("unknown_role_xyz"), Level::Meso);
        assert_eq!(infer_actor_level(""), Level::Meso);
    }

    #[test]
    fn earlier_rules_win_over_later_ones() {
        // "policy" is tested before "teachers".
        assert_eq!(infer_actor_level("teachers_policy_group"), Level::Macro);
        // "teachers" is tested before "students".
        assert_eq!(infer_actor_level("student_teachers"), Level::Micro);
    }

    #[test]
    fn inference_is_deterministic() {
        for id in ["policy_makers", "students", "families", "unknown_role_xyz"] {
            assert_eq!(infer_actor_level(id), infer_actor_level(id));
        }
    }

    #[test]
    fn parse_accepts_known_levels_case_insensitively() {
        assert_eq!(Level::parse("MACRO").unwrap(), Level::Macro);
        assert_eq!(Level::parse(" nano ").unwrap(), Level::Nano);
        assert_eq!(Level::parse("").unwrap_err(), LevelParseError::Empty);
        assert_eq!(Level::parse("mega").unwrap_err(), LevelParseError::Unknown);
    }

    #[test]
    fn levels_are_ordered_widest_first() {
        let mut shuffled = vec![Level::Nano, Level::Supra, Level::Meso, Level::Micro, Level::Macro];
        shuffled.sort();
        assert_eq!(shuffled, Level::ALL.to_vec());
        assert!(Level::ALL.iter().enumerate().all(|(i, l)| l.order() == i));
    }
}
