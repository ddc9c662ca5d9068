//! Player progress save (versioned JSON envelope)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{ResultSink, RunOutcome, RunResult};
use crate::consts::SAVE_VERSION;
use crate::error::PersistenceError;
use crate::sim::RunMode;

/// Versioned wrapper around any saved payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope<T> {
    pub version: u32,
    pub payload: T,
}

impl<T: Serialize + DeserializeOwned> SaveEnvelope<T> {
    pub fn encode(payload: &T) -> Result<String, PersistenceError>
    where
        T: Clone,
    {
        let envelope = SaveEnvelope {
            version: SAVE_VERSION,
            payload: payload.clone(),
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    pub fn decode(json: &str) -> Result<T, PersistenceError> {
        let envelope: SaveEnvelope<T> = serde_json::from_str(json)?;
        if envelope.version != SAVE_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: envelope.version,
                expected: SAVE_VERSION,
            });
        }
        Ok(envelope.payload)
    }
}

/// What carries over between sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Number of levels cleared at least once
    pub levels_cleared: u32,
    pub legend_unlocked: bool,
    /// Best score per 0-based level index
    pub best_scores: BTreeMap<u32, u64>,
    pub legend_best: u64,
}

impl Progress {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "salt_droppee_progress";

    /// Fold a finished run in. Returns true when anything improved.
    pub fn record(&mut self, result: &RunResult) -> bool {
        let mut changed = false;
        match result.mode {
            RunMode::Normal => {
                let best = self.best_scores.entry(result.level_index).or_insert(0);
                if result.score > *best {
                    *best = result.score;
                    changed = true;
                }
                if result.outcome == RunOutcome::Cleared
                    && result.level_index + 1 > self.levels_cleared
                {
                    self.levels_cleared = result.level_index + 1;
                    changed = true;
                }
            }
            RunMode::Legend => {
                if result.score > self.legend_best {
                    self.legend_best = result.score;
                    changed = true;
                }
            }
        }
        changed
    }

    pub fn unlock_legend(&mut self) -> bool {
        let changed = !self.legend_unlocked;
        self.legend_unlocked = true;
        changed
    }

    pub fn encode(&self) -> Result<String, PersistenceError> {
        SaveEnvelope::encode(self)
    }

    pub fn decode(json: &str) -> Result<Self, PersistenceError> {
        SaveEnvelope::<Progress>::decode(json)
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::decode(&json) {
                    Ok(progress) => {
                        log::info!("Loaded progress ({} levels cleared)", progress.levels_cleared);
                        return progress;
                    }
                    Err(e) => log::warn!("Discarding saved progress: {e}"),
                }
            }
        }

        log::info!("No saved progress, starting fresh");
        Self::default()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.encode() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Progress saved");
                }
                Err(e) => log::warn!("Failed to encode progress: {e}"),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl ResultSink for Progress {
    fn submit(&mut self, result: &RunResult) {
        self.record(result);
    }
}
