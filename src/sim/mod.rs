//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Frame-driven, `dt` sanitized before use
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or storage dependencies

pub mod collision;
pub mod combo;
pub mod effects;
pub mod item;
pub mod rng;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod wallet;

pub use collision::{Aabb, resolve_collisions, sweep_misses};
pub use combo::ComboState;
pub use effects::{Bonus, Effects, Shield, TimedEffect};
pub use item::{FallingItem, ItemKind, ItemState, Subtype};
pub use rng::SimRng;
pub use spawner::{RampStatus, SpawnScheduler};
pub use state::{Game, GameEvent, GamePhase, RunMode, RunState, Snapshot};
pub use tick::{TickInput, tick};
pub use wallet::Wallet;
