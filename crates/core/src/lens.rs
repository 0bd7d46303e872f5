#![forbid(unsafe_code)]

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LensMode {
    #[default]
    HumanCentered,
    Posthuman,
}

impl LensMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HumanCentered => "human-centered",
            Self::Posthuman => "posthuman",
        }
    }

    pub fn parse(value: &str) -> Result<Self, LensModeParseError> {
        match value.trim() {
            "human-centered" => Ok(Self::HumanCentered),
            "posthuman" => Ok(Self::Posthuman),
            "" => Err(LensModeParseError::Empty),
            _ => Err(LensModeParseError::Unknown),
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::HumanCentered => Self::Posthuman,
            Self::Posthuman => Self::HumanCentered,
        }
    }

    pub fn is_posthuman(self) -> bool {
        self == Self::Posthuman
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LensModeParseError {
    Empty,
    Unknown,
}

impl LensModeParseError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "mode must not be empty",
            Self::Unknown => "mode must be human-centered|posthuman",
        }
    }
}

/// The only durable client state: active lens plus the alternate-actor flag.
///
/// Entering posthuman mode always reveals the alternate actors. Leaving it does
/// not hide them again; only `set_actors_visible` clears the flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LensPreference {
    mode: LensMode,
    actors_visible: bool,
}

impl LensPreference {
    /// Restores a persisted pair verbatim; no coupling rule is applied.
    pub fn restore(mode: LensMode, actors_visible: bool) -> Self {
        Self {
            mode,
            actors_visible,
        }
    }

    pub fn mode(&self) -> LensMode {
        self.mode
    }

    pub fn actors_visible(&self) -> bool {
        self.actors_visible
    }

    pub fn is_posthuman(&self) -> bool {
        self.mode.is_posthuman()
    }

    pub fn set_mode(&mut self, mode: LensMode) {
        self.mode = mode;
        if mode.is_posthuman() {
            self.actors_visible = true;
        }
    }

    pub fn toggle(&mut self) -> LensMode {
        self.set_mode(self.mode.flipped());
        self.mode
    }

    pub fn set_actors_visible(&mut self, visible: bool) {
        self.actors_visible = visible;
    }
}
