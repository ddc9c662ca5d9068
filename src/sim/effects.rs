//! Power-up and hazard effect registry
//!
//! Timed bonuses (magnet, x2) and the control-inversion hazard share one
//! timer shape. The shield is charge-based and has its own counter.

use serde::{Deserialize, Serialize};

/// Timed effect: `time_left > 0` implies `active`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub active: bool,
    pub time_left: f32,
}

impl TimedEffect {
    /// Pickup: start at full duration, or stack onto the remaining time.
    /// Returns true when the effect was inactive before.
    pub fn activate(&mut self, duration: f32) -> bool {
        let was_active = self.active;
        if was_active {
            self.time_left += duration;
        } else {
            self.time_left = duration;
        }
        self.active = self.time_left > 0.0;
        !was_active && self.active
    }

    /// Hazard re-trigger: keep whichever of remaining and new time is longer.
    /// Returns true when the effect was inactive before.
    pub fn refresh(&mut self, duration: f32) -> bool {
        let was_active = self.active;
        self.time_left = if was_active {
            self.time_left.max(duration)
        } else {
            duration
        };
        self.active = self.time_left > 0.0;
        !was_active && self.active
    }

    /// Count down; returns true on the one tick the effect expires
    pub fn decay(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.time_left -= dt;
        if self.time_left <= 0.0 {
            self.time_left = 0.0;
            self.active = false;
            return true;
        }
        false
    }
}

/// Charge-based shield: each charge absorbs one hazard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shield {
    pub count: u32,
}

impl Shield {
    #[inline]
    pub fn active(&self) -> bool {
        self.count > 0
    }

    pub fn add(&mut self, charges: u32, max: u32) {
        self.count = self.count.saturating_add(charges).min(max);
    }

    /// Spend one charge if any; returns true when a charge was spent
    pub fn absorb(&mut self) -> bool {
        if self.count == 0 {
            return false;
        }
        self.count -= 1;
        true
    }
}

/// Timed bonus identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bonus {
    Magnet,
    X2,
}

/// What changed while decaying timers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expired {
    pub bonuses: Vec<Bonus>,
    pub inversion: bool,
}

/// All effects owned by a run; reset at run start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    pub magnet: TimedEffect,
    pub x2: TimedEffect,
    pub shield: Shield,
    pub inversion: TimedEffect,
}

impl Effects {
    pub fn bonus(&self, bonus: Bonus) -> &TimedEffect {
        match bonus {
            Bonus::Magnet => &self.magnet,
            Bonus::X2 => &self.x2,
        }
    }

    pub fn bonus_mut(&mut self, bonus: Bonus) -> &mut TimedEffect {
        match bonus {
            Bonus::Magnet => &mut self.magnet,
            Bonus::X2 => &mut self.x2,
        }
    }

    #[inline]
    pub fn controls_inverted(&self) -> bool {
        self.inversion.active
    }

    /// Decay every timer once
    pub fn tick(&mut self, dt: f32) -> Expired {
        let mut expired = Expired::default();
        for bonus in [Bonus::Magnet, Bonus::X2] {
            if self.bonus_mut(bonus).decay(dt) {
                expired.bonuses.push(bonus);
            }
        }
        expired.inversion = self.inversion.decay(dt);
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pickup_stacks_by_addition() {
        let mut x2 = TimedEffect {
            active: true,
            time_left: 2.0,
        };
        assert!(!x2.activate(5.0));
        assert!(x2.active);
        assert_eq!(x2.time_left, 7.0);
    }

    #[test]
    fn test_activate_from_inactive() {
        let mut magnet = TimedEffect::default();
        assert!(magnet.activate(6.0));
        assert_eq!(magnet.time_left, 6.0);
    }

    #[test]
    fn test_expires_exactly_once() {
        let mut magnet = TimedEffect::default();
        magnet.activate(0.05);
        assert!(!magnet.decay(0.03));
        assert!(magnet.decay(0.03));
        assert!(!magnet.active);
        assert_eq!(magnet.time_left, 0.0);
        for _ in 0..10 {
            assert!(!magnet.decay(0.03));
            assert!(!magnet.active);
        }
    }

    #[test]
    fn test_refresh_keeps_longer_time() {
        let mut inv = TimedEffect::default();
        assert!(inv.refresh(5.0));
        inv.decay(1.0);
        assert!(!inv.refresh(2.0));
        assert_eq!(inv.time_left, 4.0);
        inv.refresh(6.0);
        assert_eq!(inv.time_left, 6.0);
    }

    #[test]
    fn test_shield_charges() {
        let mut shield = Shield::default();
        assert!(!shield.active());
        assert!(!shield.absorb());
        shield.add(1, 3);
        shield.add(5, 3);
        assert_eq!(shield.count, 3);
        assert!(shield.absorb());
        assert_eq!(shield.count, 2);
        assert!(shield.active());
    }

    #[test]
    fn test_tick_reports_expiries() {
        let mut effects = Effects::default();
        effects.magnet.activate(0.01);
        effects.x2.activate(10.0);
        effects.inversion.refresh(0.01);
        let expired = effects.tick(0.02);
        assert_eq!(expired.bonuses, vec![Bonus::Magnet]);
        assert!(expired.inversion);
        assert!(!effects.controls_inverted());
        assert!(effects.x2.active);
    }
}
