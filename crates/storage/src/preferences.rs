#![forbid(unsafe_code)]

use crate::error::StoreError;
use crate::store::SqliteStore;
use cc_core::lens::{LensMode, LensPreference};
use serde_json::{Value, json};

/// Local-storage key of the persisted lens record.
pub const LENS_STORAGE_KEY: &str = "curriculum-city-lens";

/// Lens preference backed by the local store.
///
/// Every transition persists the new pair. A failed write is logged and the
/// in-memory transition still stands.
#[derive(Debug)]
pub struct LensPreferences {
    store: SqliteStore,
    current: LensPreference,
}

impl LensPreferences {
    /// Restores the saved record; any read or decode failure yields defaults.
    pub fn load(store: SqliteStore) -> Self {
        let current = match store.local_get(LENS_STORAGE_KEY) {
            Ok(Some(raw)) => decode_record(&raw),
            Ok(None) => LensPreference::default(),
            Err(err) => {
                tracing::debug!(error = %err, "lens preference unreadable; using defaults");
                LensPreference::default()
            }
        };
        tracing::debug!(
            mode = current.mode().as_str(),
            actors_visible = current.actors_visible(),
            "lens preference restored"
        );
        Self { store, current }
    }

    pub fn current(&self) -> LensPreference {
        self.current
    }

    pub fn toggle(&mut self) -> LensMode {
        let mode = self.current.toggle();
        self.persist();
        mode
    }

    pub fn set_mode(&mut self, mode: LensMode) {
        self.current.set_mode(mode);
        self.persist();
    }

    pub fn set_actors_visible(&mut self, visible: bool) {
        self.current.set_actors_visible(visible);
        self.persist();
    }

    fn persist(&mut self) {
        tracing::info!(
            mode = self.current.mode().as_str(),
            actors_visible = self.current.actors_visible(),
            "lens preference changed"
        );
        if let Err(err) = self.write() {
            tracing::warn!(error = %err, "failed to persist lens preference");
        }
    }

    fn write(&mut self) -> Result<(), StoreError> {
        self.store
            .local_set(LENS_STORAGE_KEY, &encode_record(&self.current))
    }
}

pub fn encode_record(pref: &LensPreference) -> String {
    json!({
        "mode": pref.mode().as_str(),
        "actorsVisible": pref.actors_visible(),
    })
    .to_string()
}

/// Each field is read on its own: only `"posthuman"` switches the mode and
/// only a literal `true` reveals the actors.
pub fn decode_record(raw: &str) -> LensPreference {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return LensPreference::default();
    };
    let mode = match value.get("mode").and_then(Value::as_str) {
        Some(mode) if LensMode::parse(mode) == Ok(LensMode::Posthuman) => LensMode::Posthuman,
        _ => LensMode::HumanCentered,
    };
    let actors_visible = value.get("actorsVisible").and_then(Value::as_bool) == Some(true);
    LensPreference::restore(mode, actors_visible)
}
