//! Data-driven game tuning
//!
//! Every gameplay number the simulation uses lives here. A `Config` is
//! validated once when a `Game` is built; the per-tick code trusts it.
//! JSON uses camelCase keys and every field is required, so a missing value
//! is a parse error rather than a silently substituted default. The one
//! exception is `HazardEffect`: its components are optional and default to
//! zero, meaning "not part of this hazard".

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::{ItemKind, Subtype};

/// Playfield geometry (logical pixels, y grows downward)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    /// Where items appear when no spawn origin is supplied
    pub spawn_y: f32,
    /// Vertical center of the wallet; items finish their fall here
    pub catch_line_y: f32,
    /// Horizontal margin kept free of spawns
    pub spawn_margin: f32,
    /// How far the wallet may hang past either edge
    pub wallet_overflow: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Fallback level duration (seconds)
    pub duration_sec: f32,
    pub starting_lives: u32,
    /// Largest frame step the simulation integrates in one tick
    pub max_dt: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnConfig {
    pub base_per_sec: f32,
    pub ramp_every_sec: f32,
    /// Compounding multiplier applied once per ramp interval
    pub ramp_factor: f32,
    /// Ceiling on the effective rate
    pub max_per_sec: f32,
    pub max_per_tick: u32,
    /// Probability a spawn is a hazard
    pub bad_chance: f32,
    /// Probability a spawn is a power-up (once unlocked)
    pub power_chance: f32,
    /// First level index (0-based) that spawns power-ups
    pub power_min_level: u32,
}

/// Fall durations per item class and scale growth
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallConfig {
    pub good_sec: f32,
    pub bad_sec: f32,
    pub power_sec: f32,
    pub spawn_scale: f32,
    pub max_scale: f32,
}

impl FallConfig {
    pub fn duration_for(&self, kind: ItemKind) -> f32 {
        match kind {
            ItemKind::Good => self.good_sec,
            ItemKind::Bad => self.bad_sec,
            ItemKind::Power => self.power_sec,
        }
    }
}

/// Fraction of the wallet sprite that actually catches
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitboxConfig {
    pub width_scale: f32,
    pub height_scale: f32,
    /// Trimmed from both sides
    pub pad_x: f32,
    /// Trimmed from the top edge
    pub pad_top: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConfig {
    pub width: f32,
    /// Sprite height / width
    pub sprite_aspect: f32,
    /// Cap on the aspect so tall sprites don't grow the catch area
    pub max_aspect: f32,
    pub speed: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    /// Movement speed multiplier while slowed
    pub slow_factor: f32,
    pub impact_sec: f32,
    pub hitbox: HitboxConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboTier {
    pub min_streak: u32,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboConfig {
    /// Ascending by `min_streak`; the first tier must start at 0
    pub tiers: Vec<ComboTier>,
    pub max_mult: f64,
    /// Whether letting a good item fall breaks the streak
    pub miss_breaks_combo: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerConfig {
    pub magnet_sec: f32,
    pub x2_sec: f32,
    pub x2_multiplier: f64,
    pub shield_charges: u32,
    pub shield_max_charges: u32,
    /// Seconds added to the run timer by a time shard
    pub time_shard_sec: f32,
    pub magnet_strength: f32,
    pub magnet_damping: f32,
    pub magnet_max_speed: f32,
}

/// What a hazard does when it lands in an unshielded wallet.
/// Components combine; zero means "not part of this hazard".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HazardEffect {
    pub score_penalty: f64,
    /// Percentage of the current score removed (result floored)
    pub score_percent: f64,
    pub lives: u32,
    pub slow_sec: f32,
    pub invert_sec: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDef {
    pub duration_sec: f32,
    pub spawn_rate_mult: f32,
    /// Divides every fall duration (higher = faster falls)
    pub fall_speed_mult: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendConfig {
    /// Winning this level index unlocks Legend
    pub unlock_level: u32,
    /// `None` runs until the last life is gone
    pub duration_sec: Option<f32>,
    pub starting_lives: u32,
    pub spawn_rate_mult: f32,
    pub fall_speed_mult: f32,
}

/// Full tuning table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub field: FieldConfig,
    pub run: RunConfig,
    pub spawn: SpawnConfig,
    pub fall: FallConfig,
    pub wallet: WalletConfig,
    pub combo: ComboConfig,
    pub power: PowerConfig,
    /// Base points per good subtype
    pub score_values: BTreeMap<Subtype, f64>,
    /// Good-item rarity weights
    pub rarity: BTreeMap<Subtype, f32>,
    pub bad_weights: BTreeMap<Subtype, f32>,
    pub power_weights: BTreeMap<Subtype, f32>,
    pub hazards: BTreeMap<Subtype, HazardEffect>,
    /// Full-scale side length of each subtype's bounds
    pub item_sizes: BTreeMap<Subtype, f32>,
    pub levels: Vec<LevelDef>,
    pub legend: LegendConfig,
}

impl Default for Config {
    fn default() -> Self {
        use Subtype::*;

        let score_values = BTreeMap::from([
            (Bronze, 10.0),
            (Silver, 25.0),
            (Gold, 50.0),
            (Diamond, 100.0),
        ]);
        let rarity = BTreeMap::from([(Bronze, 50.0), (Silver, 28.0), (Gold, 15.0), (Diamond, 5.0)]);
        let bad_weights = BTreeMap::from([
            (Bomb, 20.0),
            (Shitcoin, 35.0),
            (Anvil, 20.0),
            (Rugpull, 10.0),
            (FakeAirdrop, 15.0),
        ]);
        let power_weights =
            BTreeMap::from([(Magnet, 30.0), (X2, 30.0), (Shield, 25.0), (TimeShard, 15.0)]);
        let hazards = BTreeMap::from([
            (
                Bomb,
                HazardEffect {
                    lives: 1,
                    ..Default::default()
                },
            ),
            (
                Shitcoin,
                HazardEffect {
                    score_penalty: 20.0,
                    ..Default::default()
                },
            ),
            (
                Anvil,
                HazardEffect {
                    score_penalty: 10.0,
                    slow_sec: 2.0,
                    ..Default::default()
                },
            ),
            (
                Rugpull,
                HazardEffect {
                    score_percent: 30.0,
                    ..Default::default()
                },
            ),
            (
                FakeAirdrop,
                HazardEffect {
                    invert_sec: 5.0,
                    ..Default::default()
                },
            ),
        ]);
        let item_sizes = BTreeMap::from([
            (Bronze, 34.0),
            (Silver, 36.0),
            (Gold, 38.0),
            (Diamond, 40.0),
            (Bomb, 42.0),
            (Shitcoin, 36.0),
            (Anvil, 46.0),
            (Rugpull, 40.0),
            (FakeAirdrop, 40.0),
            (Magnet, 38.0),
            (X2, 38.0),
            (Shield, 38.0),
            (TimeShard, 36.0),
        ]);

        Self {
            field: FieldConfig {
                width: 360.0,
                height: 640.0,
                spawn_y: 40.0,
                catch_line_y: 560.0,
                spawn_margin: 24.0,
                wallet_overflow: 12.0,
            },
            run: RunConfig {
                duration_sec: 60.0,
                starting_lives: 3,
                max_dt: 0.033,
            },
            spawn: SpawnConfig {
                base_per_sec: 1.2,
                ramp_every_sec: 10.0,
                ramp_factor: 1.12,
                max_per_sec: 4.0,
                max_per_tick: 3,
                bad_chance: 0.25,
                power_chance: 0.06,
                power_min_level: 0,
            },
            fall: FallConfig {
                good_sec: 2.6,
                bad_sec: 2.3,
                power_sec: 2.8,
                spawn_scale: 0.45,
                max_scale: 1.0,
            },
            wallet: WalletConfig {
                width: 88.0,
                sprite_aspect: 0.8,
                max_aspect: 0.75,
                speed: 420.0,
                dash_speed: 1400.0,
                dash_duration: 0.1,
                dash_cooldown: 0.9,
                slow_factor: 0.45,
                impact_sec: 0.18,
                hitbox: HitboxConfig {
                    width_scale: 0.8,
                    height_scale: 0.55,
                    pad_x: 4.0,
                    pad_top: 6.0,
                },
            },
            combo: ComboConfig {
                tiers: vec![
                    ComboTier { min_streak: 0, multiplier: 1.0 },
                    ComboTier { min_streak: 5, multiplier: 1.5 },
                    ComboTier { min_streak: 10, multiplier: 2.0 },
                    ComboTier { min_streak: 20, multiplier: 3.0 },
                    ComboTier { min_streak: 35, multiplier: 4.0 },
                ],
                max_mult: 4.0,
                miss_breaks_combo: true,
            },
            power: PowerConfig {
                magnet_sec: 6.0,
                x2_sec: 8.0,
                x2_multiplier: 2.0,
                shield_charges: 1,
                shield_max_charges: 3,
                time_shard_sec: 5.0,
                magnet_strength: 6.0,
                magnet_damping: 4.0,
                magnet_max_speed: 520.0,
            },
            score_values,
            rarity,
            bad_weights,
            power_weights,
            hazards,
            item_sizes,
            levels: vec![
                LevelDef { duration_sec: 60.0, spawn_rate_mult: 1.0, fall_speed_mult: 1.0 },
                LevelDef { duration_sec: 60.0, spawn_rate_mult: 1.15, fall_speed_mult: 1.08 },
                LevelDef { duration_sec: 70.0, spawn_rate_mult: 1.3, fall_speed_mult: 1.15 },
                LevelDef { duration_sec: 75.0, spawn_rate_mult: 1.45, fall_speed_mult: 1.22 },
                LevelDef { duration_sec: 90.0, spawn_rate_mult: 1.6, fall_speed_mult: 1.3 },
            ],
            legend: LegendConfig {
                unlock_level: 2,
                duration_sec: Some(120.0),
                starting_lives: 3,
                spawn_rate_mult: 1.8,
                fall_speed_mult: 1.35,
            },
        }
    }
}

/// Check a value is finite and at least `min`
fn check_min(field: &'static str, value: f32, min: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value < min {
        return Err(ConfigError::OutOfRange { field, value: value as f64 });
    }
    Ok(())
}

/// Check a value is finite and strictly positive
fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    check_min(field, value, 0.0)?;
    if value == 0.0 {
        return Err(ConfigError::OutOfRange { field, value: 0.0 });
    }
    Ok(())
}

fn check_unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    check_min(field, value, 0.0)?;
    if value > 1.0 {
        return Err(ConfigError::OutOfRange { field, value: value as f64 });
    }
    Ok(())
}

fn check_min_f64(field: &'static str, value: f64, min: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value < min {
        return Err(ConfigError::OutOfRange { field, value });
    }
    Ok(())
}

/// Every subtype of `kind` must be present and nothing else may be
fn check_table<V>(
    table: &'static str,
    map: &BTreeMap<Subtype, V>,
    kind: Option<ItemKind>,
) -> Result<(), ConfigError> {
    for subtype in Subtype::ALL {
        let belongs = kind.is_none_or(|k| subtype.kind() == k);
        match (belongs, map.contains_key(&subtype)) {
            (true, false) => return Err(ConfigError::MissingEntry { table, subtype }),
            (false, true) => return Err(ConfigError::ForeignEntry { table, subtype }),
            _ => {}
        }
    }
    Ok(())
}

fn check_weights(
    table: &'static str,
    map: &BTreeMap<Subtype, f32>,
    kind: ItemKind,
) -> Result<(), ConfigError> {
    check_table(table, map, Some(kind))?;
    for &w in map.values() {
        check_min(table, w, 0.0)?;
    }
    if !map.values().any(|&w| w > 0.0) {
        return Err(ConfigError::EmptyTable { table });
    }
    Ok(())
}

impl Config {
    /// Parse and validate a JSON tuning table
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject any table that could produce NaN state or unreachable subtypes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.field;
        check_positive("field.width", f.width)?;
        check_positive("field.height", f.height)?;
        check_min("field.spawnY", f.spawn_y, 0.0)?;
        check_positive("field.catchLineY", f.catch_line_y)?;
        if f.catch_line_y <= f.spawn_y {
            return Err(ConfigError::OutOfRange {
                field: "field.catchLineY",
                value: f.catch_line_y as f64,
            });
        }
        check_min("field.spawnMargin", f.spawn_margin, 0.0)?;
        if f.spawn_margin * 2.0 >= f.width {
            return Err(ConfigError::OutOfRange {
                field: "field.spawnMargin",
                value: f.spawn_margin as f64,
            });
        }
        check_min("field.walletOverflow", f.wallet_overflow, 0.0)?;

        check_positive("run.durationSec", self.run.duration_sec)?;
        if self.run.starting_lives == 0 {
            return Err(ConfigError::OutOfRange { field: "run.startingLives", value: 0.0 });
        }
        check_positive("run.maxDt", self.run.max_dt)?;

        let s = &self.spawn;
        check_positive("spawn.basePerSec", s.base_per_sec)?;
        check_positive("spawn.rampEverySec", s.ramp_every_sec)?;
        check_min("spawn.rampFactor", s.ramp_factor, 1.0)?;
        check_min("spawn.maxPerSec", s.max_per_sec, s.base_per_sec)?;
        if s.max_per_tick == 0 {
            return Err(ConfigError::OutOfRange { field: "spawn.maxPerTick", value: 0.0 });
        }
        check_unit("spawn.badChance", s.bad_chance)?;
        check_unit("spawn.powerChance", s.power_chance)?;
        check_unit("spawn.badChance+powerChance", s.bad_chance + s.power_chance)?;

        let fall = &self.fall;
        check_positive("fall.goodSec", fall.good_sec)?;
        check_positive("fall.badSec", fall.bad_sec)?;
        check_positive("fall.powerSec", fall.power_sec)?;
        check_positive("fall.spawnScale", fall.spawn_scale)?;
        check_min("fall.maxScale", fall.max_scale, fall.spawn_scale)?;

        let w = &self.wallet;
        check_positive("wallet.width", w.width)?;
        check_positive("wallet.spriteAspect", w.sprite_aspect)?;
        check_positive("wallet.maxAspect", w.max_aspect)?;
        check_min("wallet.speed", w.speed, 0.0)?;
        check_min("wallet.dashSpeed", w.dash_speed, 0.0)?;
        check_min("wallet.dashDuration", w.dash_duration, 0.0)?;
        check_min("wallet.dashCooldown", w.dash_cooldown, 0.0)?;
        check_unit("wallet.slowFactor", w.slow_factor)?;
        check_min("wallet.impactSec", w.impact_sec, 0.0)?;
        let hb = &w.hitbox;
        check_positive("wallet.hitbox.widthScale", hb.width_scale)?;
        check_positive("wallet.hitbox.heightScale", hb.height_scale)?;
        check_min("wallet.hitbox.padX", hb.pad_x, 0.0)?;
        check_min("wallet.hitbox.padTop", hb.pad_top, 0.0)?;

        self.validate_combo()?;

        let p = &self.power;
        check_positive("power.magnetSec", p.magnet_sec)?;
        check_positive("power.x2Sec", p.x2_sec)?;
        check_min_f64("power.x2Multiplier", p.x2_multiplier, 1.0)?;
        if p.shield_charges == 0 || p.shield_max_charges < p.shield_charges {
            return Err(ConfigError::OutOfRange {
                field: "power.shieldCharges",
                value: p.shield_charges as f64,
            });
        }
        check_min("power.timeShardSec", p.time_shard_sec, 0.0)?;
        check_min("power.magnetStrength", p.magnet_strength, 0.0)?;
        check_min("power.magnetDamping", p.magnet_damping, 0.0)?;
        check_min("power.magnetMaxSpeed", p.magnet_max_speed, 0.0)?;

        check_table("scoreValues", &self.score_values, Some(ItemKind::Good))?;
        for &v in self.score_values.values() {
            check_min_f64("scoreValues", v, 0.0)?;
        }
        check_weights("rarity", &self.rarity, ItemKind::Good)?;
        check_weights("badWeights", &self.bad_weights, ItemKind::Bad)?;
        check_weights("powerWeights", &self.power_weights, ItemKind::Power)?;
        check_table("hazards", &self.hazards, Some(ItemKind::Bad))?;
        for h in self.hazards.values() {
            check_min_f64("hazards.scorePenalty", h.score_penalty, 0.0)?;
            check_min_f64("hazards.scorePercent", h.score_percent, 0.0)?;
            if h.score_percent > 100.0 {
                return Err(ConfigError::OutOfRange {
                    field: "hazards.scorePercent",
                    value: h.score_percent,
                });
            }
            check_min("hazards.slowSec", h.slow_sec, 0.0)?;
            check_min("hazards.invertSec", h.invert_sec, 0.0)?;
        }
        check_table("itemSizes", &self.item_sizes, None)?;
        for &size in self.item_sizes.values() {
            check_positive("itemSizes", size)?;
        }

        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        for level in &self.levels {
            check_positive("levels.durationSec", level.duration_sec)?;
            check_positive("levels.spawnRateMult", level.spawn_rate_mult)?;
            check_positive("levels.fallSpeedMult", level.fall_speed_mult)?;
        }

        let legend = &self.legend;
        if let Some(duration) = legend.duration_sec {
            check_positive("legend.durationSec", duration)?;
        }
        if legend.starting_lives == 0 {
            return Err(ConfigError::OutOfRange { field: "legend.startingLives", value: 0.0 });
        }
        check_positive("legend.spawnRateMult", legend.spawn_rate_mult)?;
        check_positive("legend.fallSpeedMult", legend.fall_speed_mult)?;

        Ok(())
    }

    fn validate_combo(&self) -> Result<(), ConfigError> {
        let combo = &self.combo;
        check_min_f64("combo.maxMult", combo.max_mult, 1.0)?;
        let Some(first) = combo.tiers.first() else {
            return Err(ConfigError::NonMonotonicTiers { index: 0 });
        };
        if first.min_streak != 0 {
            return Err(ConfigError::NonMonotonicTiers { index: 0 });
        }
        for (index, tier) in combo.tiers.iter().enumerate() {
            check_min_f64("combo.tiers.multiplier", tier.multiplier, 0.0)?;
            if index > 0 {
                let prev = &combo.tiers[index - 1];
                if tier.min_streak <= prev.min_streak || tier.multiplier < prev.multiplier {
                    return Err(ConfigError::NonMonotonicTiers { index });
                }
            }
        }
        Ok(())
    }

    /// Level definition for `index`; indices past the table reuse the last entry
    pub fn level(&self, index: u32) -> LevelDef {
        self.levels
            .get(index as usize)
            .or(self.levels.last())
            .copied()
            .unwrap_or(LevelDef {
                duration_sec: self.run.duration_sec,
                spawn_rate_mult: 1.0,
                fall_speed_mult: 1.0,
            })
    }

    pub fn score_value(&self, subtype: Subtype) -> f64 {
        self.score_values.get(&subtype).copied().unwrap_or(0.0)
    }

    pub fn hazard(&self, subtype: Subtype) -> HazardEffect {
        self.hazards.get(&subtype).copied().unwrap_or_default()
    }

    pub fn item_size(&self, subtype: Subtype) -> f32 {
        self.item_sizes.get(&subtype).copied().unwrap_or(0.0)
    }

    /// Wallet height derived from the capped sprite aspect ratio
    pub fn wallet_height(&self) -> f32 {
        self.wallet.width * self.wallet.sprite_aspect.min(self.wallet.max_aspect)
    }
}
