//! Game state and run lifecycle
//!
//! `Game` is the single owner of everything a run mutates: run counters,
//! combo, wallet, live items, effects, spawner and RNG. Subsystems get
//! `&mut` access to the pieces they need from `tick`; hosts only read.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combo::{ComboState, display_score};
use super::effects::{Bonus, Effects};
use super::item::{FallingItem, Subtype};
use super::rng::SimRng;
use super::spawner::{RampStatus, SpawnScheduler};
use super::wallet::Wallet;
use crate::config::Config;
use crate::error::{ConfigError, TransitionError};
use crate::persistence::{RunOutcome, RunResult};

/// Current phase of the game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    /// Menu, nothing running
    #[default]
    Title,
    /// Active gameplay
    Playing,
    /// Frozen mid-run
    Paused,
    /// Level cleared, waiting for next/retry
    InterLevel,
    /// Legend run finished
    LegendResult,
    /// Normal run lost
    GameOver,
}

/// Which rules the current run uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunMode {
    #[default]
    Normal,
    Legend,
}

/// Per-run counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub phase: GamePhase,
    pub mode: RunMode,
    pub level_index: u32,
    /// Authoritative score; floored only for display and results
    pub score: f64,
    pub lives: u32,
    /// Seconds remaining; meaningless when `timed` is false
    pub time_left: f32,
    /// False for endless Legend runs
    pub timed: bool,
    /// Seconds of play so far
    pub elapsed: f32,
    /// Divides fall durations for this run
    pub fall_speed_mult: f32,
    pub combo: ComboState,
}

/// Fire-and-forget notifications for audio, particles and HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    GoodCatch { subtype: Subtype, score_delta: f64 },
    BadHit { subtype: Subtype },
    ShieldAbsorb { subtype: Subtype },
    BonusActivate { subtype: Subtype },
    BonusExpire { bonus: Bonus },
    Miss { subtype: Subtype },
    ComboTier { multiplier: f64 },
    ComboBroken,
    LifeLost { lives_left: u32 },
    TimeBonus { seconds: f32 },
    ControlsInverted { seconds: f32 },
    ControlsRestored,
    LevelComplete { level_index: u32 },
    LegendUnlocked,
    RunEnded { result: RunResult },
}

/// Read-only view handed to renderers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub run: &'a RunState,
    pub score: u64,
    pub multiplier: f64,
    pub controls_inverted: bool,
    pub wallet: &'a Wallet,
    pub items: &'a [FallingItem],
    pub effects: &'a Effects,
    pub spawn: RampStatus,
}

/// Complete game (single owner of all run state)
#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) config: Config,
    pub(crate) run: RunState,
    pub(crate) wallet: Wallet,
    pub(crate) items: Vec<FallingItem>,
    pub(crate) effects: Effects,
    pub(crate) spawner: SpawnScheduler,
    pub(crate) rng: SimRng,
    pub(crate) events: Vec<GameEvent>,
    spawn_origin: Option<Vec2>,
    legend_unlocked: bool,
    last_result: Option<RunResult>,
    next_id: u32,
}

impl Game {
    /// Validate the config and sit on the title screen
    pub fn new(config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let spawner = SpawnScheduler::new(&config, config.level(0).spawn_rate_mult)?;
        let wallet = Wallet::new(&config);
        Ok(Self {
            run: RunState {
                lives: config.run.starting_lives,
                fall_speed_mult: 1.0,
                ..Default::default()
            },
            wallet,
            items: Vec::new(),
            effects: Effects::default(),
            spawner,
            rng: SimRng::new(seed),
            events: Vec::new(),
            spawn_origin: None,
            legend_unlocked: false,
            last_result: None,
            next_id: 1,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn phase(&self) -> GamePhase {
        self.run.phase
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Live items in spawn order
    pub fn items(&self) -> &[FallingItem] {
        &self.items
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Floored score for display
    pub fn score(&self) -> u64 {
        display_score(self.run.score)
    }

    pub fn multiplier(&self) -> f64 {
        self.run.combo.multiplier(&self.config.combo)
    }

    pub fn controls_are_inverted(&self) -> bool {
        self.effects.controls_inverted()
    }

    /// Apply control inversion to a raw input axis
    pub fn effective_axis(&self, raw: f32) -> f32 {
        if self.controls_are_inverted() { -raw } else { raw }
    }

    pub fn spawn_status(&self) -> RampStatus {
        self.spawner.status()
    }

    /// Externally animated spawn point (e.g. the dropping hand); `None`
    /// falls back to random x along the top of the field
    pub fn set_spawn_origin(&mut self, origin: Option<Vec2>) {
        self.spawn_origin = origin;
    }

    pub fn spawn_origin(&self) -> Option<Vec2> {
        self.spawn_origin
    }

    pub fn legend_unlocked(&self) -> bool {
        self.legend_unlocked
    }

    /// Restore the unlock from saved progress
    pub fn unlock_legend(&mut self) {
        self.legend_unlocked = true;
    }

    /// Result of the most recently finished run
    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            run: &self.run,
            score: self.score(),
            multiplier: self.multiplier(),
            controls_inverted: self.controls_are_inverted(),
            wallet: &self.wallet,
            items: &self.items,
            effects: &self.effects,
            spawn: self.spawner.status(),
        }
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn require(&self, allowed: &[GamePhase], action: &'static str) -> Result<(), TransitionError> {
        if allowed.contains(&self.run.phase) {
            Ok(())
        } else {
            Err(TransitionError::InvalidPhase {
                from: self.run.phase,
                action,
            })
        }
    }

    /// Begin a normal run on the first level
    pub fn start_run(&mut self) -> Result<(), TransitionError> {
        self.start_level(0)
    }

    /// Begin a normal run on any level (level select)
    pub fn start_level(&mut self, level_index: u32) -> Result<(), TransitionError> {
        self.require(
            &[
                GamePhase::Title,
                GamePhase::InterLevel,
                GamePhase::GameOver,
                GamePhase::LegendResult,
            ],
            "start a level",
        )?;
        self.enter_playing(RunMode::Normal, level_index);
        Ok(())
    }

    pub fn start_legend(&mut self) -> Result<(), TransitionError> {
        self.require(
            &[
                GamePhase::Title,
                GamePhase::InterLevel,
                GamePhase::GameOver,
                GamePhase::LegendResult,
            ],
            "start legend",
        )?;
        if !self.legend_unlocked {
            return Err(TransitionError::LegendLocked);
        }
        // Legend results are filed under the level that unlocks it
        self.enter_playing(RunMode::Legend, self.config.legend.unlock_level);
        Ok(())
    }

    /// Continue after a cleared level
    pub fn next_level(&mut self) -> Result<(), TransitionError> {
        self.require(&[GamePhase::InterLevel], "advance level")?;
        let next = self.run.level_index.saturating_add(1);
        self.enter_playing(RunMode::Normal, next);
        Ok(())
    }

    /// Replay the same level (or Legend) after it ended
    pub fn retry(&mut self) -> Result<(), TransitionError> {
        self.require(
            &[
                GamePhase::InterLevel,
                GamePhase::GameOver,
                GamePhase::LegendResult,
            ],
            "retry",
        )?;
        self.enter_playing(self.run.mode, self.run.level_index);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TransitionError> {
        self.require(&[GamePhase::Playing], "pause")?;
        self.run.phase = GamePhase::Paused;
        log::info!("Paused at {:.2}s", self.run.elapsed);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TransitionError> {
        self.require(&[GamePhase::Paused], "resume")?;
        self.run.phase = GamePhase::Playing;
        log::info!("Resumed at {:.2}s", self.run.elapsed);
        Ok(())
    }

    /// Back to the menu; an unfinished run is abandoned without a result
    pub fn to_title(&mut self) {
        if matches!(self.run.phase, GamePhase::Playing | GamePhase::Paused) {
            log::info!("Run abandoned at {:.2}s", self.run.elapsed);
        }
        self.items.clear();
        self.run.phase = GamePhase::Title;
    }

    /// Reset everything a run owns and start playing
    fn enter_playing(&mut self, mode: RunMode, level_index: u32) {
        let (duration, rate_mult, fall_mult, lives) = match mode {
            RunMode::Normal => {
                let level = self.config.level(level_index);
                (
                    Some(level.duration_sec),
                    level.spawn_rate_mult,
                    level.fall_speed_mult,
                    self.config.run.starting_lives,
                )
            }
            RunMode::Legend => {
                let legend = &self.config.legend;
                (
                    legend.duration_sec,
                    legend.spawn_rate_mult,
                    legend.fall_speed_mult,
                    legend.starting_lives,
                )
            }
        };

        self.run = RunState {
            phase: GamePhase::Playing,
            mode,
            level_index,
            score: 0.0,
            lives,
            time_left: duration.unwrap_or(0.0),
            timed: duration.is_some(),
            elapsed: 0.0,
            fall_speed_mult: fall_mult,
            combo: ComboState::default(),
        };
        self.wallet = Wallet::new(&self.config);
        self.items.clear();
        self.effects = Effects::default();
        self.spawner.reset(&self.config, rate_mult);
        self.last_result = None;

        log::info!(
            "Run started: {:?} level {} ({}), lives {}",
            mode,
            level_index,
            duration.map_or_else(|| "endless".to_string(), |d| format!("{d:.0}s")),
            lives
        );
    }

    /// Single terminal transition out of Playing
    pub(crate) fn end_run(&mut self, outcome: RunOutcome) {
        if self.run.phase != GamePhase::Playing {
            return;
        }

        self.run.phase = match (self.run.mode, outcome) {
            (RunMode::Legend, _) => GamePhase::LegendResult,
            (RunMode::Normal, RunOutcome::Cleared) => GamePhase::InterLevel,
            (RunMode::Normal, RunOutcome::Lost) => GamePhase::GameOver,
        };

        if self.run.mode == RunMode::Normal && outcome == RunOutcome::Cleared {
            self.events.push(GameEvent::LevelComplete {
                level_index: self.run.level_index,
            });
            if !self.legend_unlocked && self.run.level_index >= self.config.legend.unlock_level {
                self.legend_unlocked = true;
                self.events.push(GameEvent::LegendUnlocked);
                log::info!("Legend mode unlocked");
            }
        }

        let result = RunResult {
            mode: self.run.mode,
            outcome,
            score: display_score(self.run.score),
            level_index: self.run.level_index,
            duration_sec: self.run.elapsed,
        };
        log::info!(
            "Run ended: {:?} {:?} level {} score {} after {:.1}s",
            result.mode,
            result.outcome,
            result.level_index,
            result.score,
            result.duration_sec
        );
        self.last_result = Some(result);
        self.events.push(GameEvent::RunEnded { result });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(Config::default(), 12345).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let mut config = Config::default();
        config.levels.clear();
        assert_eq!(Game::new(config, 1).unwrap_err(), ConfigError::NoLevels);
    }

    #[test]
    fn test_start_run_resets_state() {
        let mut game = game();
        assert_eq!(game.phase(), GamePhase::Title);
        game.start_run().unwrap();
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.run().lives, game.config().run.starting_lives);
        assert_eq!(game.run().time_left, game.config().levels[0].duration_sec);
        assert_eq!(game.run().score, 0.0);
        assert!(game.items().is_empty());
    }

    #[test]
    fn test_pause_resume_transitions() {
        let mut game = game();
        assert!(game.pause().is_err());
        game.start_run().unwrap();
        game.pause().unwrap();
        assert_eq!(game.phase(), GamePhase::Paused);
        assert!(game.pause().is_err());
        game.resume().unwrap();
        assert_eq!(game.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_next_level_only_after_clear() {
        let mut game = game();
        assert_eq!(
            game.next_level(),
            Err(TransitionError::InvalidPhase {
                from: GamePhase::Title,
                action: "advance level"
            })
        );
        game.start_run().unwrap();
        game.end_run(RunOutcome::Cleared);
        assert_eq!(game.phase(), GamePhase::InterLevel);
        game.next_level().unwrap();
        assert_eq!(game.run().level_index, 1);
        assert_eq!(game.run().time_left, game.config().levels[1].duration_sec);
    }

    #[test]
    fn test_end_run_fires_once() {
        let mut game = game();
        game.start_run().unwrap();
        game.end_run(RunOutcome::Lost);
        game.end_run(RunOutcome::Lost);
        game.end_run(RunOutcome::Cleared);
        let ended = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::RunEnded { .. }))
            .count();
        assert_eq!(ended, 1);
        assert_eq!(game.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_legend_locked_until_unlock_level_cleared() {
        let mut game = game();
        assert_eq!(game.start_legend(), Err(TransitionError::LegendLocked));

        let unlock = game.config().legend.unlock_level;
        game.start_level(unlock).unwrap();
        game.end_run(RunOutcome::Cleared);
        assert!(game.legend_unlocked());
        assert!(game.drain_events().contains(&GameEvent::LegendUnlocked));

        game.start_legend().unwrap();
        assert_eq!(game.run().mode, RunMode::Legend);
        assert_eq!(game.run().level_index, unlock);
        assert_eq!(game.run().lives, game.config().legend.starting_lives);
        game.end_run(RunOutcome::Lost);
        assert_eq!(game.phase(), GamePhase::LegendResult);
        assert_eq!(game.last_result().map(|r| r.mode), Some(RunMode::Legend));
    }

    #[test]
    fn test_legend_level_index_independent_of_last_level() {
        let mut game = game();
        game.unlock_legend();
        game.start_level(4).unwrap();
        game.end_run(RunOutcome::Lost);
        game.start_legend().unwrap();
        game.end_run(RunOutcome::Lost);
        let unlock = game.config().legend.unlock_level;
        assert_eq!(game.last_result().map(|r| r.level_index), Some(unlock));
    }

    #[test]
    fn test_endless_legend_is_untimed() {
        let mut config = Config::default();
        config.legend.duration_sec = None;
        let mut game = Game::new(config, 9).unwrap();
        game.unlock_legend();
        game.start_legend().unwrap();
        assert!(!game.run().timed);
    }

    #[test]
    fn test_effective_axis_follows_inversion() {
        let mut game = game();
        assert_eq!(game.effective_axis(1.0), 1.0);
        game.effects.inversion.refresh(3.0);
        assert!(game.controls_are_inverted());
        assert_eq!(game.effective_axis(1.0), -1.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut game = game();
        game.start_run().unwrap();
        let json = serde_json::to_string(&game.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"playing\""));
        assert!(json.contains("\"controlsInverted\":false"));
    }
}
