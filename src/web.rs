//! Browser host bindings
//!
//! Thin wasm-bindgen wrapper around `Game`. The page owns the render loop
//! and input; it calls `tick` once per animation frame, then reads the
//! snapshot and drains events as JSON. Finished runs are submitted to the
//! LocalStorage leaderboards and progress save here.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::config::Config;
use crate::highscores::HighScores;
use crate::persistence::{Progress, ResultSink};
use crate::sim::{Game, GameEvent, GamePhase, TickInput, tick};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Salt Droppee core loaded");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    high_scores: HighScores,
    progress: Progress,
}

#[wasm_bindgen]
impl WebGame {
    /// Build from an optional JSON config; `None` uses the built-in table
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64, config_json: Option<String>) -> Result<WebGame, JsValue> {
        let config = match config_json {
            Some(json) => Config::from_json_str(&json).map_err(js_err)?,
            None => Config::default(),
        };
        let mut game = Game::new(config, seed as u64).map_err(js_err)?;
        let progress = Progress::load();
        if progress.legend_unlocked {
            game.unlock_legend();
        }
        Ok(WebGame {
            game,
            high_scores: HighScores::load(),
            progress,
        })
    }

    /// One frame. `axis` is the raw input; inversion is applied here.
    pub fn tick(&mut self, axis: f32, dash: bool, pause: bool, dt: f32) {
        let was_playing = self.game.phase() == GamePhase::Playing;
        let input = TickInput {
            axis: self.game.effective_axis(axis),
            dash,
            pause,
        };
        tick(&mut self.game, &input, dt);

        let ended = matches!(
            self.game.phase(),
            GamePhase::InterLevel | GamePhase::GameOver | GamePhase::LegendResult
        );
        if was_playing && ended {
            self.record_finished_run();
        }
    }

    fn record_finished_run(&mut self) {
        let Some(result) = self.game.last_result().copied() else {
            return;
        };
        self.high_scores.submit(&result);
        self.high_scores.save();

        self.progress.submit(&result);
        if self.game.legend_unlocked() {
            self.progress.unlock_legend();
        }
        self.progress.save();
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.game.phase())
    }

    pub fn start_run(&mut self) -> Result<(), JsValue> {
        self.game.start_run().map_err(js_err)
    }

    pub fn start_level(&mut self, level_index: u32) -> Result<(), JsValue> {
        self.game.start_level(level_index).map_err(js_err)
    }

    pub fn start_legend(&mut self) -> Result<(), JsValue> {
        self.game.start_legend().map_err(js_err)
    }

    pub fn next_level(&mut self) -> Result<(), JsValue> {
        self.game.next_level().map_err(js_err)
    }

    pub fn retry(&mut self) -> Result<(), JsValue> {
        self.game.retry().map_err(js_err)
    }

    pub fn pause(&mut self) -> Result<(), JsValue> {
        self.game.pause().map_err(js_err)
    }

    pub fn resume(&mut self) -> Result<(), JsValue> {
        self.game.resume().map_err(js_err)
    }

    pub fn to_title(&mut self) {
        self.game.to_title();
    }

    /// Pin spawns to the animated dropper position
    pub fn set_spawn_origin(&mut self, x: f32, y: f32) {
        self.game.set_spawn_origin(Some(Vec2::new(x, y)));
    }

    pub fn clear_spawn_origin(&mut self) {
        self.game.set_spawn_origin(None);
    }

    pub fn controls_inverted(&self) -> bool {
        self.game.controls_are_inverted()
    }

    pub fn legend_unlocked(&self) -> bool {
        self.game.legend_unlocked()
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.snapshot()).map_err(js_err)
    }

    /// Events since the last call, oldest first
    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        let events: Vec<GameEvent> = self.game.drain_events();
        serde_json::to_string(&events).map_err(js_err)
    }

    pub fn high_scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.high_scores).map_err(js_err)
    }

    pub fn progress_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.progress).map_err(js_err)
    }
}
