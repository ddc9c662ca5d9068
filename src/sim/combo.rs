//! Combo streak and score arithmetic

use serde::{Deserialize, Serialize};

use crate::config::ComboConfig;

/// Consecutive good catches since the last combo-breaking event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboState {
    pub streak: u32,
}

impl ComboState {
    /// Highest tier whose threshold the streak has reached, capped at `max_mult`
    pub fn multiplier(&self, config: &ComboConfig) -> f64 {
        config
            .tiers
            .iter()
            .rev()
            .find(|tier| tier.min_streak <= self.streak)
            .map_or(1.0, |tier| tier.multiplier)
            .min(config.max_mult)
    }

    /// Count a catch. Returns the new multiplier when it changed tier.
    pub fn register_catch(&mut self, config: &ComboConfig) -> Option<f64> {
        let before = self.multiplier(config);
        self.streak = self.streak.saturating_add(1);
        let after = self.multiplier(config);
        (after != before).then_some(after)
    }

    /// Break the streak. Returns true if there was a streak to break.
    pub fn reset(&mut self) -> bool {
        let had_streak = self.streak > 0;
        self.streak = 0;
        had_streak
    }
}

/// Points for a catch: base value times combo multiplier times x2 (if active)
#[inline]
pub fn catch_delta(base: f64, combo_mult: f64, bonus_mult: f64) -> f64 {
    base * combo_mult * bonus_mult
}

/// Remove a fixed amount, never going below zero
#[inline]
pub fn fixed_penalty(score: f64, amount: f64) -> f64 {
    (score - amount).max(0.0)
}

/// Remove `percent` of the score; the result is floored
#[inline]
pub fn percent_penalty(score: f64, percent: f64) -> f64 {
    (score * (100.0 - percent) / 100.0).floor().max(0.0)
}

/// Integer score shown to the player and stored with results
#[inline]
pub fn display_score(score: f64) -> u64 {
    if score.is_finite() && score > 0.0 {
        score.floor() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_tier_lookup() {
        let config = Config::default().combo;
        let mut combo = ComboState::default();
        assert_eq!(combo.multiplier(&config), 1.0);
        combo.streak = 4;
        assert_eq!(combo.multiplier(&config), 1.0);
        combo.streak = 5;
        assert_eq!(combo.multiplier(&config), 1.5);
        combo.streak = 1000;
        assert_eq!(combo.multiplier(&config), 4.0);
    }

    #[test]
    fn test_max_mult_caps_tiers() {
        let mut config = Config::default().combo;
        config.max_mult = 2.5;
        let combo = ComboState { streak: 50 };
        assert_eq!(combo.multiplier(&config), 2.5);
    }

    #[test]
    fn test_register_catch_reports_tier_change() {
        let config = Config::default().combo;
        let mut combo = ComboState { streak: 3 };
        assert_eq!(combo.register_catch(&config), None);
        assert_eq!(combo.register_catch(&config), Some(1.5));
        assert_eq!(combo.streak, 5);
    }

    #[test]
    fn test_reset_returns_to_base_tier() {
        let config = Config::default().combo;
        let mut combo = ComboState { streak: 12 };
        assert!(combo.reset());
        assert_eq!(combo.streak, 0);
        assert_eq!(combo.multiplier(&config), 1.0);
        assert!(!combo.reset());
    }

    #[test]
    fn test_percent_penalty_floors() {
        assert_eq!(percent_penalty(100.0, 30.0), 70.0);
        assert_eq!(percent_penalty(15.0, 30.0), 10.0);
        assert_eq!(percent_penalty(0.0, 30.0), 0.0);
    }

    #[test]
    fn test_fixed_penalty_never_negative() {
        assert_eq!(fixed_penalty(15.0, 20.0), 0.0);
        assert_eq!(fixed_penalty(50.0, 20.0), 30.0);
    }

    #[test]
    fn test_display_score_floors() {
        assert_eq!(display_score(74.9), 74);
        assert_eq!(display_score(f64::NAN), 0);
    }
}
