//! Frame-driven simulation tick
//!
//! Advances a run by one host frame. Order within a tick is fixed:
//! spawner, item motion, wallet, collisions and misses, timers, run clock.
//! Losing the last life ends the run on the spot.

use super::collision::{resolve_collisions, sweep_misses};
use super::item::{FallingItem, MagnetPull, MotionParams};
use super::state::{Game, GameEvent, GamePhase, RunMode};
use crate::persistence::RunOutcome;
use crate::sanitize_dt;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Horizontal axis in [-1, 1]; inversion is already applied by the host
    pub axis: f32,
    /// Dash in the direction of travel (or facing when idle)
    pub dash: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game by `dt` seconds of wall time
pub fn tick(game: &mut Game, input: &TickInput, dt: f32) {
    if input.pause {
        match game.run.phase {
            GamePhase::Playing => {
                game.run.phase = GamePhase::Paused;
                log::info!("Paused at {:.2}s", game.run.elapsed);
                return;
            }
            GamePhase::Paused => {
                game.run.phase = GamePhase::Playing;
                log::info!("Resumed at {:.2}s", game.run.elapsed);
            }
            _ => {}
        }
    }

    if game.run.phase != GamePhase::Playing {
        return;
    }

    let max_dt = game.config.run.max_dt;
    let dt = sanitize_dt(dt, max_dt);
    if dt == max_dt {
        log::debug!("frame step clamped to {max_dt:.3}s");
    }

    spawn_items(game, dt);
    move_items(game, dt);

    game.wallet
        .update(input.axis, input.dash, dt, &game.config.wallet);

    resolve_collisions(
        &mut game.items,
        &mut game.wallet,
        &mut game.run,
        &mut game.effects,
        &game.config,
        &mut game.events,
    );
    if game.run.lives == 0 {
        // The fatal frame still counts as played
        game.run.elapsed += dt;
        game.end_run(RunOutcome::Lost);
        return;
    }
    sweep_misses(&mut game.items, &mut game.run, &game.config, &mut game.events);
    game.items.retain(FallingItem::is_live);

    let expired = game.effects.tick(dt);
    for bonus in expired.bonuses {
        game.events.push(GameEvent::BonusExpire { bonus });
    }
    if expired.inversion {
        game.events.push(GameEvent::ControlsRestored);
    }
    game.wallet.tick_timers(dt);

    game.run.elapsed += dt;
    if game.run.timed {
        game.run.time_left = (game.run.time_left - dt).max(0.0);
        if game.run.time_left <= 0.0 {
            game.end_run(RunOutcome::Cleared);
        }
    }
}

fn spawn_items(game: &mut Game, dt: f32) {
    let due = game.spawner.advance(dt);
    if due == 0 {
        return;
    }

    let power_allowed = game.run.mode == RunMode::Legend
        || game.run.level_index >= game.config.spawn.power_min_level;
    let fall_mult = game.run.fall_speed_mult.max(f32::EPSILON);
    let hint = game.spawn_origin();

    for _ in 0..due {
        let subtype = game.spawner.pick_subtype(&mut game.rng, power_allowed);
        let origin = game
            .spawner
            .pick_origin(&mut game.rng, &game.config.field, hint);
        let fall_duration = game.config.fall.duration_for(subtype.kind()) / fall_mult;
        let id = game.next_entity_id();
        game.items.push(FallingItem::new(
            id,
            subtype,
            origin,
            game.config.field.catch_line_y,
            fall_duration,
            game.config.fall.spawn_scale,
        ));
        log::debug!("spawned {subtype:?} #{id} at x={:.0}", origin.x);
    }
}

fn move_items(game: &mut Game, dt: f32) {
    let motion = MotionParams {
        spawn_scale: game.config.fall.spawn_scale,
        max_scale: game.config.fall.max_scale,
        field_width: game.config.field.width,
    };
    let power = &game.config.power;
    let magnet = game.effects.magnet.active.then(|| MagnetPull {
        target_x: game.wallet.x,
        strength: power.magnet_strength,
        damping: power.magnet_damping,
        max_speed: power.magnet_max_speed,
    });

    for item in &mut game.items {
        item.update(dt, &motion, magnet.as_ref());
    }
}
