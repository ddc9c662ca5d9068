//! Run results and progress persistence
//!
//! The simulation never talks to storage. When a run ends it produces a
//! plain `RunResult`; the host hands that to a `ResultSink` (local
//! leaderboard, remote backend, test recorder). Progress between sessions
//! lives in a versioned JSON envelope (see `progress`).

pub mod progress;

use serde::{Deserialize, Serialize};

pub use progress::{Progress, SaveEnvelope};

use crate::sim::RunMode;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunOutcome {
    /// Timer ran out with lives left
    Cleared,
    /// Last life lost
    Lost,
}

/// Everything a persistence collaborator needs about a finished run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub mode: RunMode,
    pub outcome: RunOutcome,
    /// Floored final score
    pub score: u64,
    /// 0-based level index the run was played on
    pub level_index: u32,
    /// Seconds of play (pauses excluded)
    pub duration_sec: f32,
}

/// Receiver for finished runs
pub trait ResultSink {
    fn submit(&mut self, result: &RunResult);
}

/// Keeps every submitted result in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub results: Vec<RunResult>,
}

impl ResultSink for MemorySink {
    fn submit(&mut self, result: &RunResult) {
        self.results.push(*result);
    }
}

impl<T: ResultSink + ?Sized> ResultSink for &mut T {
    fn submit(&mut self, result: &RunResult) {
        (**self).submit(result);
    }
}
