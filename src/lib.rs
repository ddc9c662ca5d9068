//! Salt Droppee - catch falling coins with your wallet
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, scoring, run lifecycle)
//! - `config`: Data-driven tuning table, validated once at construction
//! - `persistence`: Run results hand-off and versioned progress saves
//! - `highscores`: Local leaderboards for level runs and Legend runs
//! - `web`: wasm-bindgen host bindings (wasm32 only)

pub mod config;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::Config;
pub use error::{ConfigError, PersistenceError, TransitionError};
pub use highscores::HighScores;
pub use persistence::{ResultSink, RunOutcome, RunResult};

/// Engine constants that are not gameplay tuning
pub mod consts {
    /// Fallback frame step used by hosts that have no clock yet
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;
    /// Save format version for persisted progress
    pub const SAVE_VERSION: u32 = 1;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Quadratic ease-in (accelerating fall)
#[inline]
pub fn ease_in_quad(t: f32) -> f32 {
    t * t
}

/// Make a host-supplied frame delta safe to integrate with.
///
/// NaN, infinite and negative values become 0; large steps (tab
/// backgrounding, slow frames) are capped at `max_dt`.
#[inline]
pub fn sanitize_dt(dt: f32, max_dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_dt)
}
