//! Falling items: coins, hazards and power-ups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::{ease_in_quad, lerp};

/// Item family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    /// Collectible coin, scores on catch
    Good,
    /// Hazard, penalizes on catch
    Bad,
    /// Power-up pickup
    Power,
}

/// Concrete item type. Serialized camelCase (`fakeAirdrop`, `x2`, `timeShard`)
/// so it can key the JSON tuning tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subtype {
    Bronze,
    Silver,
    Gold,
    Diamond,
    Bomb,
    Shitcoin,
    Anvil,
    Rugpull,
    FakeAirdrop,
    Magnet,
    X2,
    Shield,
    TimeShard,
}

impl Subtype {
    pub const ALL: [Subtype; 13] = [
        Subtype::Bronze,
        Subtype::Silver,
        Subtype::Gold,
        Subtype::Diamond,
        Subtype::Bomb,
        Subtype::Shitcoin,
        Subtype::Anvil,
        Subtype::Rugpull,
        Subtype::FakeAirdrop,
        Subtype::Magnet,
        Subtype::X2,
        Subtype::Shield,
        Subtype::TimeShard,
    ];

    pub fn kind(self) -> ItemKind {
        match self {
            Subtype::Bronze | Subtype::Silver | Subtype::Gold | Subtype::Diamond => ItemKind::Good,
            Subtype::Bomb
            | Subtype::Shitcoin
            | Subtype::Anvil
            | Subtype::Rugpull
            | Subtype::FakeAirdrop => ItemKind::Bad,
            Subtype::Magnet | Subtype::X2 | Subtype::Shield | Subtype::TimeShard => ItemKind::Power,
        }
    }
}

/// Lifecycle of an item. Leaving `Falling` happens exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemState {
    Falling,
    /// Touched the wallet (caught, hit, absorbed or collected)
    Collided,
    /// Reached the catch line untouched
    Missed,
}

/// Per-tick motion parameters shared by every item
#[derive(Debug, Clone, Copy)]
pub struct MotionParams {
    pub spawn_scale: f32,
    pub max_scale: f32,
    pub field_width: f32,
}

/// Magnet pull applied to good items while the bonus is active
#[derive(Debug, Clone, Copy)]
pub struct MagnetPull {
    /// Wallet center x
    pub target_x: f32,
    pub strength: f32,
    pub damping: f32,
    pub max_speed: f32,
}

/// A falling entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: u32,
    pub subtype: Subtype,
    pub pos: Vec2,
    pub spawn_y: f32,
    pub catch_y: f32,
    /// Seconds from spawn to catch line
    pub fall_duration: f32,
    pub elapsed: f32,
    /// 0 at spawn, 1 at the catch line
    pub progress: f32,
    pub scale: f32,
    /// Horizontal drift velocity (magnet)
    pub vx: f32,
    pub state: ItemState,
}

impl FallingItem {
    pub fn new(
        id: u32,
        subtype: Subtype,
        origin: Vec2,
        catch_y: f32,
        fall_duration: f32,
        spawn_scale: f32,
    ) -> Self {
        Self {
            id,
            subtype,
            pos: origin,
            spawn_y: origin.y,
            catch_y,
            fall_duration,
            elapsed: 0.0,
            progress: 0.0,
            scale: spawn_scale,
            vx: 0.0,
            state: ItemState::Falling,
        }
    }

    #[inline]
    pub fn kind(&self) -> ItemKind {
        self.subtype.kind()
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.state == ItemState::Falling
    }

    /// Reached the catch line
    #[inline]
    pub fn landed(&self) -> bool {
        self.progress >= 1.0
    }

    /// Advance fall, growth and magnet drift. Dead items are left untouched.
    pub fn update(&mut self, dt: f32, motion: &MotionParams, magnet: Option<&MagnetPull>) {
        if !self.is_live() {
            return;
        }

        self.elapsed += dt;
        let raw = if self.fall_duration > 0.0 {
            (self.elapsed / self.fall_duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.progress = self.progress.max(raw);
        self.pos.y = lerp(self.spawn_y, self.catch_y, ease_in_quad(self.progress));

        let grown = lerp(motion.spawn_scale, motion.max_scale, self.progress).min(motion.max_scale);
        self.scale = self.scale.max(grown).min(motion.max_scale);

        if self.kind() == ItemKind::Good {
            if let Some(pull) = magnet {
                self.vx += (pull.target_x - self.pos.x) * pull.strength * dt;
                self.vx *= (-pull.damping * dt).exp();
                self.vx = self.vx.clamp(-pull.max_speed, pull.max_speed);
                self.pos.x = (self.pos.x + self.vx * dt).clamp(0.0, motion.field_width);
            }
        }
    }

    /// Move to a terminal state. Returns false if the item was already dead.
    pub fn finish(&mut self, state: ItemState) -> bool {
        if !self.is_live() || state == ItemState::Falling {
            return false;
        }
        self.state = state;
        true
    }

    /// World bounds given the subtype's full-scale size
    pub fn bounds(&self, base_size: f32) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(base_size * self.scale * 0.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MOTION: MotionParams = MotionParams {
        spawn_scale: 0.45,
        max_scale: 1.0,
        field_width: 360.0,
    };

    fn gold() -> FallingItem {
        FallingItem::new(1, Subtype::Gold, Vec2::new(100.0, 40.0), 560.0, 2.0, 0.45)
    }

    #[test]
    fn test_subtype_kinds() {
        assert_eq!(Subtype::Diamond.kind(), ItemKind::Good);
        assert_eq!(Subtype::FakeAirdrop.kind(), ItemKind::Bad);
        assert_eq!(Subtype::TimeShard.kind(), ItemKind::Power);
    }

    #[test]
    fn test_eased_fall() {
        let mut item = gold();
        item.update(1.0, &MOTION, None);
        assert_eq!(item.progress, 0.5);
        // progress² = 0.25 of the way down
        assert!((item.pos.y - (40.0 + 520.0 * 0.25)).abs() < 1e-3);
        item.update(1.0, &MOTION, None);
        assert!(item.landed());
        assert_eq!(item.pos.y, 560.0);
        assert!((item.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_finish_is_single_transition() {
        let mut item = gold();
        assert!(item.finish(ItemState::Collided));
        assert!(!item.finish(ItemState::Missed));
        assert_eq!(item.state, ItemState::Collided);

        let frozen = item.clone();
        item.update(1.0, &MOTION, None);
        assert_eq!(item.elapsed, frozen.elapsed);
        assert_eq!(item.pos, frozen.pos);
    }

    #[test]
    fn test_magnet_pulls_good_items_only() {
        let pull = MagnetPull {
            target_x: 300.0,
            strength: 6.0,
            damping: 4.0,
            max_speed: 520.0,
        };
        let mut coin = gold();
        coin.update(0.016, &MOTION, Some(&pull));
        assert!(coin.vx > 0.0);
        assert!(coin.pos.x > 100.0);

        let mut bomb = FallingItem::new(2, Subtype::Bomb, Vec2::new(100.0, 40.0), 560.0, 2.0, 0.45);
        bomb.update(0.016, &MOTION, Some(&pull));
        assert_eq!(bomb.vx, 0.0);
        assert_eq!(bomb.pos.x, 100.0);
    }

    #[test]
    fn test_magnet_speed_clamped() {
        let pull = MagnetPull {
            target_x: 10_000.0,
            strength: 1000.0,
            damping: 0.0,
            max_speed: 50.0,
        };
        let mut coin = gold();
        for _ in 0..10 {
            coin.update(0.033, &MOTION, Some(&pull));
            assert!(coin.vx.abs() <= 50.0);
            assert!((0.0..=360.0).contains(&coin.pos.x));
        }
    }

    proptest! {
        #[test]
        fn progress_is_monotonic_and_bounded(steps in proptest::collection::vec(0.0f32..0.5, 1..200)) {
            let mut item = gold();
            let mut prev = item.progress;
            for dt in steps {
                item.update(dt, &MOTION, None);
                prop_assert!(item.progress >= prev);
                prop_assert!((0.0..=1.0).contains(&item.progress));
                prev = item.progress;
            }
        }

        #[test]
        fn scale_never_exceeds_max(
            steps in proptest::collection::vec(0.0f32..10.0, 1..50),
            spawn_scale in 0.1f32..1.0,
        ) {
            let mut item = FallingItem::new(1, Subtype::Silver, Vec2::new(50.0, 0.0), 500.0, 1.5, spawn_scale);
            let motion = MotionParams { spawn_scale, ..MOTION };
            let mut prev = item.scale;
            for dt in steps {
                item.update(dt, &motion, None);
                prop_assert!(item.scale <= motion.max_scale);
                prop_assert!(item.scale >= prev);
                prev = item.scale;
            }
        }
    }
}
