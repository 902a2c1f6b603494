//! A single 30 second round of play.
//!
//! [`GameContext`] owns everything the gameplay screen needs: the worm, its
//! steering, the live bubbles, the score and the clocks. It is rebuilt from
//! scratch every time a round starts.

use std::ops::RangeInclusive;

use bevy::prelude::*;
use rand::Rng;

use super::{
    bubble::{Bubble, BubbleKind, Reward},
    player::Player,
    spawn::find_spawn_point,
};
use crate::screens::Screen;

/// Length of a round in milliseconds.
pub const GAME_DURATION_MS: f32 = 30_000.0;

/// Speed at which the speed meter is full and clicks stop adding speed.
pub const MAX_SPEED: f32 = 5.0;

/// Delay before the first bubble of a round.
const FIRST_SPAWN_MS: RangeInclusive<u32> = 1500..=5000;
/// Delay between later bubbles.
const SPAWN_INTERVAL_MS: RangeInclusive<u32> = 500..=2000;

/// Speed added by every click.
const SPEED_BOOST: f32 = 0.8;
/// Per-frame speed multiplier while gliding toward the click.
const GLIDE_FACTOR: f32 = 0.98;
/// Per-frame speed multiplier once the click point is reached.
const BRAKE_FACTOR: f32 = 0.9;
/// Squared distance at which the click point counts as reached.
const ARRIVAL_DISTANCE_SQ: f32 = 2.0;
/// Speeds below this snap to a standstill.
const STOP_SPEED: f32 = 0.06;

/// Things that happened during a gameplay tick, for sound and logging.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    BubbleSpawned { id: u64, kind: BubbleKind },
    /// No free spot was found for the bubble due this tick.
    SpawnSkipped,
    BubbleCollected { id: u64, reward: Reward },
    BubbleExpired { id: u64 },
    MovementStarted,
    MovementStopped,
    TimeUp,
}

#[derive(Resource, Debug, Clone)]
pub struct GameContext {
    pub player: Player,
    pub score: u32,
    pub bubbles: Vec<Bubble>,
    /// Milliseconds until the next bubble spawns.
    pub next_bubble: f32,
    /// Milliseconds left in the round.
    pub time_remaining: f32,
    pub speed_factor: f32,
    /// Unit steering direction, or zero before the first click.
    pub direction: Vec2,
    /// Pixels per frame.
    pub speed: f32,
    /// Speed at the end of the previous tick.
    pub old_speed: f32,
    /// The last clicked point.
    pub destination: Option<Vec2>,
    next_id: u64,
}

impl GameContext {
    /// Build a fresh round with the worm at a random spot.
    pub fn start(rng: &mut impl Rng) -> Self {
        Self::with_player(Player::random_start(rng), rng)
    }

    pub fn with_player(player: Player, rng: &mut impl Rng) -> Self {
        Self {
            player,
            score: 0,
            bubbles: Vec::new(),
            next_bubble: rng.random_range(FIRST_SPAWN_MS) as f32,
            time_remaining: GAME_DURATION_MS,
            speed_factor: GLIDE_FACTOR,
            direction: Vec2::ZERO,
            speed: 0.0,
            old_speed: 0.0,
            destination: None,
            next_id: 0,
        }
    }

    /// Steer toward a clicked point and speed up.
    pub fn click(&mut self, target: Vec2) {
        self.destination = Some(target);
        self.direction = (target - self.player.head()).normalize_or_zero();
        self.speed_factor = GLIDE_FACTOR;
        if self.speed <= MAX_SPEED {
            self.speed += SPEED_BOOST;
        }
    }

    /// Whole seconds left, as shown on the HUD.
    pub fn seconds_left(&self) -> i32 {
        (self.time_remaining / 1000.0).floor() as i32
    }

    /// Volume of the movement sound, proportional to speed.
    pub fn movement_volume(&self) -> f32 {
        (self.speed / MAX_SPEED).clamp(0.0, 1.0)
    }

    /// Advance the round by `delta_ms` milliseconds.
    ///
    /// Returns the screen to switch to once the clock runs out.
    pub fn update(
        &mut self,
        delta_ms: f32,
        rng: &mut impl Rng,
        events: &mut Vec<GameEvent>,
    ) -> Option<Screen> {
        self.tick_spawner(delta_ms, rng, events);
        self.move_player();
        self.tick_bubbles(delta_ms, rng, events);

        if self.speed > 0.0 && self.old_speed == 0.0 {
            events.push(GameEvent::MovementStarted);
        } else if self.speed == 0.0 && self.old_speed > 0.0 {
            events.push(GameEvent::MovementStopped);
        }

        self.time_remaining -= delta_ms;
        if self.time_remaining <= 0.0 {
            events.push(GameEvent::MovementStopped);
            events.push(GameEvent::TimeUp);
            return Some(Screen::GameOver);
        }

        self.old_speed = self.speed;
        None
    }

    fn tick_spawner(&mut self, delta_ms: f32, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
        self.next_bubble -= delta_ms;
        if self.next_bubble > 0.0 {
            return;
        }
        self.next_bubble = rng.random_range(SPAWN_INTERVAL_MS) as f32;

        let kind = BubbleKind::random(rng);
        let Some(center) = find_spawn_point(rng, &self.bubbles, self.player.head()) else {
            events.push(GameEvent::SpawnSkipped);
            return;
        };

        let id = self.next_id;
        self.next_id += 1;
        self.bubbles.push(Bubble::spawn(id, kind, center, rng));
        events.push(GameEvent::BubbleSpawned { id, kind });
    }

    fn move_player(&mut self) {
        self.direction = self.player.update(self.direction, self.speed);

        if let Some(destination) = self.destination
            && destination.distance_squared(self.player.head()) <= ARRIVAL_DISTANCE_SQ
        {
            self.speed_factor = BRAKE_FACTOR;
        }

        if self.speed > 0.0 {
            self.speed *= self.speed_factor;
            if self.speed < STOP_SPEED {
                self.speed = 0.0;
            }
        }
    }

    fn tick_bubbles(&mut self, delta_ms: f32, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
        let player_rect = self.player.rect();
        let mut rewards = Vec::new();

        self.bubbles.retain_mut(|bubble| {
            if bubble.check_collision(player_rect) {
                let reward = bubble.reward(rng);
                rewards.push(reward);
                events.push(GameEvent::BubbleCollected { id: bubble.id, reward });
                return false;
            }
            if !bubble.update(delta_ms) {
                events.push(GameEvent::BubbleExpired { id: bubble.id });
                return false;
            }
            true
        });

        for reward in rewards {
            self.apply(reward);
        }
    }

    fn apply(&mut self, reward: Reward) {
        match reward {
            Reward::Points(points) => self.score += points,
            Reward::BonusTime(ms) => self.time_remaining += ms,
        }
    }
}
