//! Local leaderboards
//!
//! Level runs and Legend runs rank separately. Persisted to LocalStorage,
//! each board keeps its top 10.

use serde::{Deserialize, Serialize};

use crate::persistence::{ResultSink, RunResult};
use crate::sim::RunMode;

/// Maximum number of entries kept per board
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreEntry {
    pub score: u64,
    /// 0-based level the run was played on
    pub level_index: u32,
    pub duration_sec: f32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// One ranked board, sorted by score descending
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<HighScoreEntry>,
}

impl Leaderboard {
    /// Check if a score qualifies for the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert an entry if it qualifies; returns the rank achieved
    pub fn add(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Ties keep the older entry ahead
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Level-run and Legend boards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub levels: Leaderboard,
    pub legend: Leaderboard,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "salt_droppee_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self, mode: RunMode) -> &Leaderboard {
        match mode {
            RunMode::Normal => &self.levels,
            RunMode::Legend => &self.legend,
        }
    }

    /// Record a finished run on the matching board
    pub fn add_result(&mut self, result: &RunResult, timestamp: f64) -> Option<usize> {
        let entry = HighScoreEntry {
            score: result.score,
            level_index: result.level_index,
            duration_sec: result.duration_sec,
            timestamp,
        };
        let board = match result.mode {
            RunMode::Normal => &mut self.levels,
            RunMode::Legend => &mut self.legend,
        };
        let rank = board.add(entry);
        if let Some(rank) = rank {
            log::info!("New {:?} high score #{rank}: {}", result.mode, result.score);
        }
        rank
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!(
                        "Loaded {} level / {} legend high scores",
                        scores.levels.entries.len(),
                        scores.legend.entries.len()
                    );
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

impl ResultSink for HighScores {
    fn submit(&mut self, result: &RunResult) {
        self.add_result(result, now_ms());
    }
}
