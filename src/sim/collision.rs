//! Collision detection and outcome dispatch
//!
//! Once per tick, after motion: every live item is tested against the
//! wallet's catch rectangle and resolved exactly once. Items are visited
//! in spawn order and all of them are processed, except that a hit taking
//! the last life ends resolution: later items stay live and untouched.

use glam::Vec2;

use super::combo::{catch_delta, fixed_penalty, percent_penalty};
use super::effects::Effects;
use super::item::{FallingItem, ItemKind, ItemState, Subtype};
use super::state::{GameEvent, RunState};
use super::wallet::Wallet;
use crate::config::Config;

/// Axis-aligned box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; boxes that only touch edges don't collide
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Test and resolve every live item against the wallet.
/// Returns the number of items that collided this tick.
pub fn resolve_collisions(
    items: &mut [FallingItem],
    wallet: &mut Wallet,
    run: &mut RunState,
    effects: &mut Effects,
    config: &Config,
    events: &mut Vec<GameEvent>,
) -> u32 {
    let hitbox = wallet.hitbox(&config.wallet.hitbox);
    let mut hits = 0;

    for item in items.iter_mut() {
        if !item.is_live() {
            continue;
        }
        if !item.bounds(config.item_size(item.subtype)).overlaps(&hitbox) {
            continue;
        }
        if !item.finish(ItemState::Collided) {
            continue;
        }

        hits += 1;
        wallet.trigger_impact(config.wallet.impact_sec);
        match item.kind() {
            ItemKind::Good => apply_catch(item.subtype, run, effects, config, events),
            ItemKind::Bad => apply_hazard(item.subtype, wallet, run, effects, config, events),
            ItemKind::Power => apply_power(item.subtype, run, effects, config, events),
        }
        if run.lives == 0 {
            break;
        }
    }

    hits
}

/// Good catch: score with the multiplier in force *before* this catch
fn apply_catch(
    subtype: Subtype,
    run: &mut RunState,
    effects: &Effects,
    config: &Config,
    events: &mut Vec<GameEvent>,
) {
    let combo_mult = run.combo.multiplier(&config.combo);
    let bonus_mult = if effects.x2.active {
        config.power.x2_multiplier
    } else {
        1.0
    };
    let delta = catch_delta(config.score_value(subtype), combo_mult, bonus_mult);
    run.score += delta;
    events.push(GameEvent::GoodCatch {
        subtype,
        score_delta: delta,
    });

    if let Some(multiplier) = run.combo.register_catch(&config.combo) {
        events.push(GameEvent::ComboTier { multiplier });
    }
}

/// Hazard: a shield charge absorbs it outright, otherwise every component
/// of the subtype's effect applies and the streak breaks
fn apply_hazard(
    subtype: Subtype,
    wallet: &mut Wallet,
    run: &mut RunState,
    effects: &mut Effects,
    config: &Config,
    events: &mut Vec<GameEvent>,
) {
    if effects.shield.absorb() {
        events.push(GameEvent::ShieldAbsorb { subtype });
        return;
    }

    events.push(GameEvent::BadHit { subtype });
    let hazard = config.hazard(subtype);

    if hazard.score_penalty > 0.0 {
        run.score = fixed_penalty(run.score, hazard.score_penalty);
    }
    if hazard.score_percent > 0.0 {
        run.score = percent_penalty(run.score, hazard.score_percent);
    }
    if hazard.lives > 0 {
        run.lives = run.lives.saturating_sub(hazard.lives);
        events.push(GameEvent::LifeLost {
            lives_left: run.lives,
        });
    }
    if hazard.slow_sec > 0.0 {
        wallet.apply_slow(hazard.slow_sec);
    }
    if hazard.invert_sec > 0.0 {
        effects.inversion.refresh(hazard.invert_sec);
        events.push(GameEvent::ControlsInverted {
            seconds: effects.inversion.time_left,
        });
    }

    if run.combo.reset() {
        events.push(GameEvent::ComboBroken);
    }
}

fn apply_power(
    subtype: Subtype,
    run: &mut RunState,
    effects: &mut Effects,
    config: &Config,
    events: &mut Vec<GameEvent>,
) {
    let power = &config.power;
    match subtype {
        Subtype::Magnet => {
            effects.magnet.activate(power.magnet_sec);
        }
        Subtype::X2 => {
            effects.x2.activate(power.x2_sec);
        }
        Subtype::Shield => {
            effects.shield.add(power.shield_charges, power.shield_max_charges);
        }
        Subtype::TimeShard => {
            // Endless runs have no clock to extend
            if run.timed {
                run.time_left += power.time_shard_sec;
                events.push(GameEvent::TimeBonus {
                    seconds: power.time_shard_sec,
                });
            }
        }
        _ => return,
    }
    events.push(GameEvent::BonusActivate { subtype });
}

/// Items that reached the catch line untouched are missed.
/// Returns the number of misses this tick.
pub fn sweep_misses(
    items: &mut [FallingItem],
    run: &mut RunState,
    config: &Config,
    events: &mut Vec<GameEvent>,
) -> u32 {
    let mut misses = 0;
    for item in items.iter_mut() {
        if !item.landed() || !item.finish(ItemState::Missed) {
            continue;
        }
        misses += 1;
        events.push(GameEvent::Miss {
            subtype: item.subtype,
        });
        if item.kind() == ItemKind::Good && config.combo.miss_breaks_combo && run.combo.reset() {
            events.push(GameEvent::ComboBroken);
        }
    }
    misses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combo::ComboState;

    struct Rig {
        config: Config,
        wallet: Wallet,
        run: RunState,
        effects: Effects,
        events: Vec<GameEvent>,
    }

    impl Rig {
        fn new() -> Self {
            let config = Config::default();
            let wallet = Wallet::new(&config);
            Self {
                run: RunState {
                    lives: config.run.starting_lives,
                    timed: true,
                    time_left: 60.0,
                    ..Default::default()
                },
                wallet,
                effects: Effects::default(),
                events: Vec::new(),
                config,
            }
        }

        /// Full-grown item sitting on the wallet
        fn item_on_wallet(&self, id: u32, subtype: Subtype) -> FallingItem {
            let mut item = FallingItem::new(
                id,
                subtype,
                Vec2::new(self.wallet.x, self.wallet.y),
                self.config.field.catch_line_y,
                2.0,
                1.0,
            );
            item.progress = 0.99;
            item
        }

        fn resolve(&mut self, items: &mut [FallingItem]) -> u32 {
            resolve_collisions(
                items,
                &mut self.wallet,
                &mut self.run,
                &mut self.effects,
                &self.config,
                &mut self.events,
            )
        }
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_center(Vec2::new(15.0, 0.0), Vec2::splat(10.0));
        let c = Aabb::from_center(Vec2::new(20.0, 0.0), Vec2::splat(10.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_clean_catch() {
        let mut rig = Rig::new();
        let mut items = vec![rig.item_on_wallet(1, Subtype::Gold)];
        assert_eq!(rig.resolve(&mut items), 1);
        assert_eq!(rig.run.score, 50.0);
        assert_eq!(rig.run.combo.streak, 1);
        assert_eq!(items[0].state, ItemState::Collided);
        assert!(rig.wallet.impact_timer > 0.0);
    }

    #[test]
    fn test_multiplier_read_before_increment() {
        let mut rig = Rig::new();
        rig.run.combo.streak = 4;
        let mut items = vec![rig.item_on_wallet(1, Subtype::Bronze)];
        rig.resolve(&mut items);
        // streak 4 is still tier 1.0; the catch itself moves it to 5 (tier 1.5)
        assert_eq!(rig.run.score, 10.0);
        assert_eq!(rig.run.combo.streak, 5);
        assert!(rig.events.contains(&GameEvent::ComboTier { multiplier: 1.5 }));

        let mut items = vec![rig.item_on_wallet(2, Subtype::Bronze)];
        rig.resolve(&mut items);
        assert_eq!(rig.run.score, 25.0);
    }

    #[test]
    fn test_x2_doubles_catch() {
        let mut rig = Rig::new();
        rig.effects.x2.activate(5.0);
        let mut items = vec![rig.item_on_wallet(1, Subtype::Silver)];
        rig.resolve(&mut items);
        assert_eq!(rig.run.score, 50.0);
    }

    #[test]
    fn test_item_resolved_once() {
        let mut rig = Rig::new();
        let mut items = vec![rig.item_on_wallet(1, Subtype::Gold)];
        rig.resolve(&mut items);
        assert_eq!(rig.resolve(&mut items), 0);
        assert_eq!(rig.run.score, 50.0);
        assert_eq!(rig.run.combo.streak, 1);
    }

    #[test]
    fn test_all_overlapping_items_processed() {
        let mut rig = Rig::new();
        let mut items = vec![
            rig.item_on_wallet(1, Subtype::Gold),
            rig.item_on_wallet(2, Subtype::Bronze),
            rig.item_on_wallet(3, Subtype::Magnet),
        ];
        assert_eq!(rig.resolve(&mut items), 3);
        assert_eq!(rig.run.score, 60.0);
        assert!(rig.effects.magnet.active);
    }

    #[test]
    fn test_item_away_from_wallet_ignored() {
        let mut rig = Rig::new();
        let mut item = rig.item_on_wallet(1, Subtype::Gold);
        item.pos.x = rig.wallet.x + rig.wallet.width * 2.0;
        let mut items = vec![item];
        assert_eq!(rig.resolve(&mut items), 0);
        assert!(items[0].is_live());
    }

    #[test]
    fn test_hitbox_is_forgiving() {
        let mut rig = Rig::new();
        // Inside the sprite's side edge but outside the trimmed catch box
        let sprite = rig.wallet.bounds();
        let hitbox = rig.wallet.hitbox(&rig.config.wallet.hitbox);
        let half = rig.config.item_size(Subtype::Bronze) / 2.0;
        let mut item = rig.item_on_wallet(1, Subtype::Bronze);
        item.pos.x = hitbox.max.x + half + 1.0;
        assert!(item.pos.x - half < sprite.max.x);
        let mut items = vec![item];
        assert_eq!(rig.resolve(&mut items), 0);
    }

    #[test]
    fn test_combo_reset_on_unshielded_hit() {
        let mut rig = Rig::new();
        rig.run.combo = ComboState { streak: 12 };
        let mut items = vec![rig.item_on_wallet(1, Subtype::Shitcoin)];
        rig.run.score = 100.0;
        rig.resolve(&mut items);
        assert_eq!(rig.run.combo.streak, 0);
        assert_eq!(rig.run.combo.multiplier(&rig.config.combo), 1.0);
        assert_eq!(rig.run.score, 80.0);
        assert!(rig.events.contains(&GameEvent::ComboBroken));
    }

    #[test]
    fn test_shield_absorbs_hit() {
        let mut rig = Rig::new();
        rig.effects.shield.count = 1;
        rig.run.combo.streak = 7;
        let lives = rig.run.lives;
        let mut items = vec![rig.item_on_wallet(1, Subtype::Bomb)];
        rig.resolve(&mut items);
        assert_eq!(rig.effects.shield.count, 0);
        assert_eq!(rig.run.lives, lives);
        assert_eq!(rig.run.combo.streak, 7);
        assert_eq!(items[0].state, ItemState::Collided);
        assert_eq!(
            rig.events,
            vec![GameEvent::ShieldAbsorb {
                subtype: Subtype::Bomb
            }]
        );
    }

    #[test]
    fn test_shield_absorbs_one_hit_only() {
        let mut rig = Rig::new();
        rig.effects.shield.count = 1;
        let lives = rig.run.lives;
        let mut items = vec![
            rig.item_on_wallet(1, Subtype::Bomb),
            rig.item_on_wallet(2, Subtype::Bomb),
        ];
        rig.resolve(&mut items);
        assert_eq!(rig.run.lives, lives - 1);
    }

    #[test]
    fn test_rugpull_takes_percentage() {
        let mut rig = Rig::new();
        rig.run.score = 100.0;
        let mut items = vec![rig.item_on_wallet(1, Subtype::Rugpull)];
        rig.resolve(&mut items);
        assert_eq!(rig.run.score, 70.0);
    }

    #[test]
    fn test_bomb_costs_life() {
        let mut rig = Rig::new();
        let mut items = vec![rig.item_on_wallet(1, Subtype::Bomb)];
        rig.resolve(&mut items);
        assert_eq!(rig.run.lives, rig.config.run.starting_lives - 1);
        assert!(rig.events.contains(&GameEvent::LifeLost {
            lives_left: rig.config.run.starting_lives - 1
        }));
    }

    #[test]
    fn test_fatal_hit_stops_resolution() {
        let mut rig = Rig::new();
        rig.run.lives = 1;
        let mut items = vec![
            rig.item_on_wallet(1, Subtype::Bomb),
            rig.item_on_wallet(2, Subtype::Bomb),
            rig.item_on_wallet(3, Subtype::Gold),
        ];
        assert_eq!(rig.resolve(&mut items), 1);
        assert_eq!(rig.run.lives, 0);
        assert_eq!(rig.run.score, 0.0);
        assert_eq!(rig.run.combo.streak, 0);
        assert!(items[1].is_live());
        assert!(items[2].is_live());
        let lives_lost = rig
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::LifeLost { .. }))
            .count();
        assert_eq!(lives_lost, 1);
    }

    #[test]
    fn test_anvil_slows_wallet() {
        let mut rig = Rig::new();
        let mut items = vec![rig.item_on_wallet(1, Subtype::Anvil)];
        rig.resolve(&mut items);
        assert!(rig.wallet.is_slowed());
    }

    #[test]
    fn test_fake_airdrop_inverts_controls() {
        let mut rig = Rig::new();
        let mut items = vec![rig.item_on_wallet(1, Subtype::FakeAirdrop)];
        rig.resolve(&mut items);
        assert!(rig.effects.controls_inverted());
        assert_eq!(rig.effects.inversion.time_left, 5.0);
    }

    #[test]
    fn test_power_pickups() {
        let mut rig = Rig::new();
        let mut items = vec![
            rig.item_on_wallet(1, Subtype::X2),
            rig.item_on_wallet(2, Subtype::Shield),
            rig.item_on_wallet(3, Subtype::TimeShard),
        ];
        rig.resolve(&mut items);
        assert!(rig.effects.x2.active);
        assert_eq!(rig.effects.shield.count, 1);
        assert_eq!(rig.run.time_left, 65.0);
        // pickups don't touch the streak
        assert_eq!(rig.run.combo.streak, 0);
    }

    #[test]
    fn test_second_x2_pickup_stacks() {
        let mut rig = Rig::new();
        rig.effects.x2.activate(2.0);
        let mut items = vec![rig.item_on_wallet(1, Subtype::X2)];
        rig.resolve(&mut items);
        assert_eq!(rig.effects.x2.time_left, 2.0 + rig.config.power.x2_sec);
    }

    #[test]
    fn test_good_miss_breaks_combo_when_enabled() {
        let mut rig = Rig::new();
        rig.run.combo.streak = 3;
        let mut item = rig.item_on_wallet(1, Subtype::Gold);
        item.progress = 1.0;
        let mut items = vec![item];
        assert_eq!(sweep_misses(&mut items, &mut rig.run, &rig.config, &mut rig.events), 1);
        assert_eq!(rig.run.combo.streak, 0);
        assert_eq!(rig.run.score, 0.0);
        assert_eq!(items[0].state, ItemState::Missed);
    }

    #[test]
    fn test_good_miss_keeps_combo_when_disabled() {
        let mut rig = Rig::new();
        rig.config.combo.miss_breaks_combo = false;
        rig.run.combo.streak = 3;
        let mut item = rig.item_on_wallet(1, Subtype::Gold);
        item.progress = 1.0;
        let mut items = vec![item];
        sweep_misses(&mut items, &mut rig.run, &rig.config, &mut rig.events);
        assert_eq!(rig.run.combo.streak, 3);
        assert!(rig.events.contains(&GameEvent::Miss {
            subtype: Subtype::Gold
        }));
    }

    #[test]
    fn test_missed_hazard_is_harmless() {
        let mut rig = Rig::new();
        rig.run.combo.streak = 3;
        let mut item = rig.item_on_wallet(1, Subtype::Bomb);
        item.progress = 1.0;
        let mut items = vec![item];
        sweep_misses(&mut items, &mut rig.run, &rig.config, &mut rig.events);
        assert_eq!(rig.run.combo.streak, 3);
        assert_eq!(rig.run.lives, rig.config.run.starting_lives);
    }
}
