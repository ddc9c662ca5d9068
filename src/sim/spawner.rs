//! Spawn scheduling and difficulty ramp

use std::collections::BTreeMap;

use glam::Vec2;
use serde::Serialize;

use super::item::{ItemKind, Subtype};
use super::rng::SimRng;
use crate::config::{Config, FieldConfig};
use crate::error::ConfigError;

/// Weighted subtype tables, checked once when the scheduler is built
#[derive(Debug, Clone)]
pub struct SpawnTables {
    good: Vec<(Subtype, f32)>,
    bad: Vec<(Subtype, f32)>,
    power: Vec<(Subtype, f32)>,
}

impl SpawnTables {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            good: Self::table("rarity", &config.rarity, ItemKind::Good)?,
            bad: Self::table("badWeights", &config.bad_weights, ItemKind::Bad)?,
            power: Self::table("powerWeights", &config.power_weights, ItemKind::Power)?,
        })
    }

    fn table(
        name: &'static str,
        weights: &BTreeMap<Subtype, f32>,
        kind: ItemKind,
    ) -> Result<Vec<(Subtype, f32)>, ConfigError> {
        let mut entries = Vec::new();
        for subtype in Subtype::ALL.into_iter().filter(|s| s.kind() == kind) {
            let &weight = weights
                .get(&subtype)
                .ok_or(ConfigError::MissingEntry { table: name, subtype })?;
            if !weight.is_finite() {
                return Err(ConfigError::NonFinite { field: name });
            }
            entries.push((subtype, weight));
        }
        if !entries.iter().any(|&(_, w)| w > 0.0) {
            return Err(ConfigError::EmptyTable { table: name });
        }
        Ok(entries)
    }

    pub fn for_kind(&self, kind: ItemKind) -> &[(Subtype, f32)] {
        match kind {
            ItemKind::Good => &self.good,
            ItemKind::Bad => &self.bad,
            ItemKind::Power => &self.power,
        }
    }
}

/// Ramp state, exposed for HUD/debug readouts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RampStatus {
    pub rate_per_sec: f32,
    pub ramp_steps: u32,
    pub elapsed: f32,
}

/// Decides when to spawn and what
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    base_rate: f32,
    ramp_every: f32,
    ramp_factor: f32,
    max_rate: f32,
    max_per_tick: u32,
    bad_chance: f32,
    power_chance: f32,
    tables: SpawnTables,
    ramp_timer: f32,
    ramp_steps: u32,
    accumulator: f32,
    elapsed: f32,
}

impl SpawnScheduler {
    /// Build for a run whose level scales the base rate by `rate_mult`
    pub fn new(config: &Config, rate_mult: f32) -> Result<Self, ConfigError> {
        let spawn = &config.spawn;
        Ok(Self {
            base_rate: spawn.base_per_sec * rate_mult,
            ramp_every: spawn.ramp_every_sec,
            ramp_factor: spawn.ramp_factor,
            max_rate: spawn.max_per_sec * rate_mult.max(1.0),
            max_per_tick: spawn.max_per_tick,
            bad_chance: spawn.bad_chance,
            power_chance: spawn.power_chance,
            tables: SpawnTables::from_config(config)?,
            ramp_timer: 0.0,
            ramp_steps: 0,
            accumulator: 0.0,
            elapsed: 0.0,
        })
    }

    /// Fresh ramp for a new run
    pub fn reset(&mut self, config: &Config, rate_mult: f32) {
        self.base_rate = config.spawn.base_per_sec * rate_mult;
        self.max_rate = config.spawn.max_per_sec * rate_mult.max(1.0);
        self.ramp_timer = 0.0;
        self.ramp_steps = 0;
        self.accumulator = 0.0;
        self.elapsed = 0.0;
    }

    /// Spawns per second right now: `base * factor^steps`, capped
    pub fn effective_rate(&self) -> f32 {
        let exponent = self.ramp_steps.min(i32::MAX as u32) as i32;
        (self.base_rate * self.ramp_factor.powi(exponent)).min(self.max_rate)
    }

    pub fn status(&self) -> RampStatus {
        RampStatus {
            rate_per_sec: self.effective_rate(),
            ramp_steps: self.ramp_steps,
            elapsed: self.elapsed,
        }
    }

    /// Advance play time; returns how many items are due this tick
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.elapsed += dt;
        self.ramp_timer += dt;
        while self.ramp_timer >= self.ramp_every {
            self.ramp_timer -= self.ramp_every;
            self.ramp_steps += 1;
            log::debug!("spawn ramp step {} -> {:.2}/s", self.ramp_steps, self.effective_rate());
        }

        self.accumulator += self.effective_rate() * dt;
        let mut due = 0;
        while self.accumulator >= 1.0 && due < self.max_per_tick {
            self.accumulator -= 1.0;
            due += 1;
        }
        // Backlog past the per-tick cap is dropped rather than burst later
        if self.accumulator >= 1.0 {
            self.accumulator = self.accumulator.fract();
        }
        due
    }

    /// Roll kind by the fixed split, then subtype by weight
    pub fn pick_subtype(&self, rng: &mut SimRng, power_allowed: bool) -> Subtype {
        let power_chance = if power_allowed { self.power_chance } else { 0.0 };
        let roll = rng.next_f32();
        let kind = if roll < power_chance {
            ItemKind::Power
        } else if roll < power_chance + self.bad_chance {
            ItemKind::Bad
        } else {
            ItemKind::Good
        };
        let table = self.tables.for_kind(kind);
        rng.weighted_choice(table)
            .or_else(|| table.first().map(|&(s, _)| s))
            .unwrap_or(Subtype::Bronze)
    }

    /// Spawn point: the external origin if given, else a random x along the top
    pub fn pick_origin(&self, rng: &mut SimRng, field: &FieldConfig, origin: Option<Vec2>) -> Vec2 {
        let lo = field.spawn_margin;
        let hi = field.width - field.spawn_margin;
        match origin {
            Some(p) if p.is_finite() => Vec2::new(p.x.clamp(lo, hi), p.y.min(field.catch_line_y)),
            _ => Vec2::new(rng.range(lo, hi), field.spawn_y),
        }
    }
}
