//! Bubbles - the timed collectibles.
//!
//! A bubble shrinks as its life runs out, so collecting a fresh one is worth
//! more than collecting one that is about to pop. Powerups share the same
//! lifecycle but buy extra play time instead of points.

use std::ops::RangeInclusive;

use bevy::prelude::*;
use rand::Rng;

/// Side of a bubble's bounding box at full size, in pixels.
pub const BUBBLE_SIZE: f32 = 32.0;

/// Points for a bubble collected the moment it appears.
pub const MAX_BUBBLE_POINTS: u32 = 20;

/// How long a freshly spawned bubble lives, in milliseconds.
pub const LIFETIME_MS: RangeInclusive<u32> = 1000..=7000;

/// Whole seconds a powerup adds to the clock.
const POWERUP_BONUS_SECONDS: RangeInclusive<u32> = 5..=15;

/// Rotation speed limit, in degrees per frame.
const MAX_ROTATION: f32 = 2.0;

/// The different kinds of bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BubbleKind {
    #[default]
    Normal,
    Powerup,
}

impl BubbleKind {
    /// Roll the kind of a new bubble; one in eleven is a powerup.
    pub fn random(rng: &mut impl Rng) -> Self {
        if rng.random_range(0..=10) == 0 {
            BubbleKind::Powerup
        } else {
            BubbleKind::Normal
        }
    }
}

/// What collecting a bubble gives the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reward {
    Points(u32),
    /// Extra play time in milliseconds.
    BonusTime(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    /// Stable id used to pair the bubble with its sprite.
    pub id: u64,
    pub kind: BubbleKind,
    pub center: Vec2,
    /// Total life in milliseconds.
    pub lifetime: f32,
    /// Life left in milliseconds, never above `lifetime` or below zero.
    pub life_remaining: f32,
    /// Current rotation in degrees.
    pub angle: f32,
    /// Degrees added to `angle` every update.
    pub rotation: f32,
}

impl Bubble {
    pub fn new(id: u64, kind: BubbleKind, center: Vec2, lifetime: f32, rng: &mut impl Rng) -> Self {
        Self {
            id,
            kind,
            center,
            lifetime,
            life_remaining: lifetime,
            angle: rng.random_range(0.0..360.0),
            rotation: rng.random_range(-MAX_ROTATION..=MAX_ROTATION),
        }
    }

    /// Spawn a bubble with a random lifetime.
    pub fn spawn(id: u64, kind: BubbleKind, center: Vec2, rng: &mut impl Rng) -> Self {
        let lifetime = rng.random_range(LIFETIME_MS) as f32;
        Self::new(id, kind, center, lifetime, rng)
    }

    /// Fraction of life left, used as the draw scale.
    pub fn scale(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (self.life_remaining / self.lifetime).clamp(0.0, 1.0)
    }

    /// The shrunken box the bubble currently occupies.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, Vec2::splat(BUBBLE_SIZE * self.scale()))
    }

    pub fn check_collision(&self, rect: Rect) -> bool {
        !self.bounds().intersect(rect).is_empty()
    }

    /// Tick the bubble. Returns false once its life has run out.
    pub fn update(&mut self, delta_ms: f32) -> bool {
        self.angle = (self.angle + self.rotation).rem_euclid(360.0);
        self.life_remaining = (self.life_remaining - delta_ms).max(0.0);
        self.life_remaining > 0.0
    }

    /// Points for collecting a normal bubble right now, at least one.
    pub fn points(&self) -> u32 {
        let points = (self.scale() * MAX_BUBBLE_POINTS as f32).floor() as u32;
        points.max(1)
    }

    pub fn reward(&self, rng: &mut impl Rng) -> Reward {
        match self.kind {
            BubbleKind::Normal => Reward::Points(self.points()),
            BubbleKind::Powerup => {
                let seconds = rng.random_range(POWERUP_BONUS_SECONDS);
                Reward::BonusTime(seconds as f32 * 1000.0)
            }
        }
    }
}
