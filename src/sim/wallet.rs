//! The player's wallet (catcher)

use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::config::{Config, HitboxConfig, WalletConfig};
use glam::Vec2;

/// Player-controlled catcher sitting on the catch line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// Horizontal center
    pub x: f32,
    /// Vertical center (the catch line)
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Last non-zero movement direction (-1 or 1), used for idle dashes
    pub facing: f32,
    /// Seconds until the next dash is allowed
    pub dash_cd: f32,
    /// Seconds of hazard slow remaining
    pub slow_timer: f32,
    /// Squash animation timer; visual only, triggered by every collision
    pub impact_timer: f32,
    min_x: f32,
    max_x: f32,
}

impl Wallet {
    /// Centered wallet sized from the capped sprite aspect
    pub fn new(config: &Config) -> Self {
        let width = config.wallet.width;
        let half = width / 2.0;
        let overflow = config.field.wallet_overflow;
        let min_x = half - overflow;
        // Fields narrower than the wallet collapse the band onto the center
        let max_x = (config.field.width - half + overflow).max(min_x);
        Self {
            x: config.field.width / 2.0,
            y: config.field.catch_line_y,
            width,
            height: config.wallet_height(),
            facing: 1.0,
            dash_cd: 0.0,
            slow_timer: 0.0,
            impact_timer: 0.0,
            min_x,
            max_x,
        }
    }

    /// Allowed range for the center x
    pub fn x_band(&self) -> (f32, f32) {
        (self.min_x, self.max_x)
    }

    pub fn set_x(&mut self, x: f32) {
        if x.is_finite() {
            self.x = x.clamp(self.min_x, self.max_x);
        }
    }

    #[inline]
    pub fn is_slowed(&self) -> bool {
        self.slow_timer > 0.0
    }

    /// Full sprite box
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(
            Vec2::new(self.x, self.y),
            Vec2::new(self.width / 2.0, self.height / 2.0),
        )
    }

    /// The forgiving catch rectangle: a fraction of the sprite box, trimmed
    /// by the pixel padding on the sides and the top
    pub fn hitbox(&self, hitbox: &HitboxConfig) -> Aabb {
        let w = (self.width * hitbox.width_scale - 2.0 * hitbox.pad_x).max(0.0);
        let h = self.height * hitbox.height_scale;
        let min = Vec2::new(self.x - w / 2.0, self.y - h / 2.0 + hitbox.pad_top);
        let max = Vec2::new(self.x + w / 2.0, self.y + h / 2.0);
        Aabb {
            min: min.min(max),
            max,
        }
    }

    /// Instant dash of `dash_speed * dash_duration` pixels. Ignored while
    /// the cooldown is running.
    pub fn try_dash(&mut self, direction: f32, config: &WalletConfig) -> bool {
        if self.dash_cd > 0.0 {
            return false;
        }
        let dir = if direction != 0.0 {
            direction.signum()
        } else {
            self.facing
        };
        self.set_x(self.x + dir * config.dash_speed * config.dash_duration);
        self.facing = dir;
        self.dash_cd = config.dash_cooldown;
        true
    }

    /// Move from a normalized axis in [-1, 1]. Returns true if a dash fired.
    pub fn update(&mut self, axis: f32, dash: bool, dt: f32, config: &WalletConfig) -> bool {
        let axis = if axis.is_finite() { axis.clamp(-1.0, 1.0) } else { 0.0 };
        if axis != 0.0 {
            self.facing = axis.signum();
        }

        let dashed = dash && self.try_dash(axis, config);

        let speed = if self.is_slowed() {
            config.speed * config.slow_factor
        } else {
            config.speed
        };
        self.set_x(self.x + axis * speed * dt);
        dashed
    }

    /// Hazard slow; a longer remaining slow is kept
    pub fn apply_slow(&mut self, seconds: f32) {
        self.slow_timer = self.slow_timer.max(seconds);
    }

    pub fn trigger_impact(&mut self, seconds: f32) {
        self.impact_timer = seconds;
    }

    /// Decay dash cooldown, slow and impact timers
    pub fn tick_timers(&mut self, dt: f32) {
        self.dash_cd = (self.dash_cd - dt).max(0.0);
        self.slow_timer = (self.slow_timer - dt).max(0.0);
        self.impact_timer = (self.impact_timer - dt).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dash_displaces_and_cools_down() {
        let config = Config::default();
        let mut wallet = Wallet::new(&config);
        let start = wallet.x;

        assert!(wallet.update(0.0, true, 0.0, &config.wallet));
        let expected = (start + config.wallet.dash_speed * config.wallet.dash_duration)
            .min(wallet.x_band().1);
        assert!((wallet.x - expected).abs() < 1e-3);
        assert!(wallet.dash_cd > 0.0);

        let after_first = wallet.x;
        wallet.tick_timers(0.1);
        assert!(!wallet.update(0.0, true, 0.0, &config.wallet));
        assert_eq!(wallet.x, after_first);
    }

    #[test]
    fn test_dash_bounded_by_field() {
        let config = Config::default();
        let mut wallet = Wallet::new(&config);
        wallet.set_x(wallet.x_band().1 - 5.0);
        wallet.try_dash(1.0, &config.wallet);
        assert_eq!(wallet.x, wallet.x_band().1);
    }

    #[test]
    fn test_dash_available_after_cooldown() {
        let config = Config::default();
        let mut wallet = Wallet::new(&config);
        assert!(wallet.try_dash(-1.0, &config.wallet));
        wallet.tick_timers(config.wallet.dash_cooldown);
        assert!(wallet.try_dash(1.0, &config.wallet));
    }

    #[test]
    fn test_slow_reduces_speed() {
        let config = Config::default();
        let mut normal = Wallet::new(&config);
        let mut slowed = Wallet::new(&config);
        slowed.apply_slow(2.0);

        normal.update(1.0, false, 0.02, &config.wallet);
        slowed.update(1.0, false, 0.02, &config.wallet);
        let start = config.field.width / 2.0;
        let normal_moved = normal.x - start;
        let slowed_moved = slowed.x - start;
        assert!((slowed_moved - normal_moved * config.wallet.slow_factor).abs() < 1e-3);
    }

    #[test]
    fn test_hitbox_is_inside_sprite() {
        let config = Config::default();
        let wallet = Wallet::new(&config);
        let sprite = wallet.bounds();
        let hit = wallet.hitbox(&config.wallet.hitbox);
        assert!(hit.min.x > sprite.min.x && hit.max.x < sprite.max.x);
        assert!(hit.min.y > sprite.min.y && hit.max.y <= sprite.max.y);
    }

    proptest! {
        #[test]
        fn x_stays_in_band(moves in proptest::collection::vec((-1.0f32..=1.0, any::<bool>()), 1..300)) {
            let config = Config::default();
            let mut wallet = Wallet::new(&config);
            let (lo, hi) = wallet.x_band();
            for (axis, dash) in moves {
                wallet.update(axis, dash, 0.033, &config.wallet);
                wallet.tick_timers(0.033);
                prop_assert!(wallet.x >= lo && wallet.x <= hi);
            }
        }
    }
}
