//! The player - a five segment worm.
//!
//! The head moves along the steering direction and bounces off the playfield
//! border. Every other segment eases toward the one in front of it and is then
//! kept between [`MIN_DIST`] and [`MAX_DIST`] away from it, which gives the
//! body its springy trailing look.

use bevy::prelude::*;
use rand::Rng;

use super::playfield::GAME_AREA;

pub const SEGMENT_COUNT: usize = 5;

/// Closest a segment may sit to the one in front of it.
pub const MIN_DIST: f32 = 10.0;
/// Farthest a segment may trail behind the one in front of it.
pub const MAX_DIST: f32 = 20.0;

/// Side of the head's bounding box, in pixels.
pub const HEAD_SIZE: f32 = 24.0;

/// Draw scale of each segment, head first.
pub const SEGMENT_SCALES: [f32; SEGMENT_COUNT] = [1.0, 0.8, 0.64, 0.51, 0.40];

/// Horizontal offset of each segment from the head at spawn.
const SPAWN_OFFSETS: [f32; SEGMENT_COUNT] = [0.0, 18.0, 28.0, 38.0, 48.0];

/// Gap kept between the head and the playfield border.
const EDGE_MARGIN: f32 = 2.0;

/// Fraction of the way a segment moves toward its leader every frame.
const EASE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Segment centers, head first.
    pub segments: [Vec2; SEGMENT_COUNT],
}

impl Player {
    /// Place the head at `head` with the body trailing off to the right.
    pub fn new(head: Vec2) -> Self {
        Self {
            segments: SPAWN_OFFSETS.map(|offset| head + Vec2::new(offset, 0.0)),
        }
    }

    /// Place the player somewhere well inside the playfield.
    pub fn random_start(rng: &mut impl Rng) -> Self {
        let x = rng.random_range(90..=550) as f32;
        let y = rng.random_range(70..=410) as f32;
        Self::new(Vec2::new(x, y))
    }

    pub fn head(&self) -> Vec2 {
        self.segments[0]
    }

    /// The head's bounding box, used for bubble collisions.
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.head(), Vec2::splat(HEAD_SIZE))
    }

    /// Move the worm one frame along `direction` at `speed` pixels per frame.
    ///
    /// Returns the direction after bouncing off the border, which the caller
    /// should keep steering with.
    pub fn update(&mut self, direction: Vec2, speed: f32) -> Vec2 {
        self.segments[0] += direction * speed;
        let direction = self.bounce(direction, speed);
        self.follow();
        direction
    }

    fn bounce(&mut self, mut direction: Vec2, speed: f32) -> Vec2 {
        let inset = Vec2::splat(EDGE_MARGIN + HEAD_SIZE / 2.0);
        let min = GAME_AREA.min + inset;
        let max = GAME_AREA.max - inset;

        let head = &mut self.segments[0];
        if head.x < min.x || head.x > max.x {
            direction.x = -direction.x;
            *head += direction * speed;
        }
        if head.y < min.y || head.y > max.y {
            direction.y = -direction.y;
            *head += direction * speed;
        }
        *head = head.clamp(min, max);
        direction
    }

    fn follow(&mut self) {
        for i in 1..SEGMENT_COUNT {
            let leader = self.segments[i - 1];
            let eased = self.segments[i].lerp(leader, EASE);
            let offset = leader - eased;
            let length = offset.length();

            self.segments[i] = if length > MAX_DIST {
                leader - offset / length * MAX_DIST
            } else if length < MIN_DIST {
                // Segments sitting on top of each other fall back to trailing right.
                let towards_leader = if length > f32::EPSILON {
                    offset / length
                } else {
                    Vec2::NEG_X
                };
                leader - towards_leader * MIN_DIST
            } else {
                eased
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    const TOLERANCE: f32 = 1e-3;

    fn assert_chain_spacing(player: &Player) {
        for pair in player.segments.windows(2) {
            let distance = pair[0].distance(pair[1]);
            assert!(
                (MIN_DIST - TOLERANCE..=MAX_DIST + TOLERANCE).contains(&distance),
                "segments {:?} are {} apart",
                pair,
                distance
            );
        }
    }

    #[test]
    fn test_spawn_spacing_is_valid() {
        let player = Player::new(Vec2::new(200.0, 200.0));
        assert_chain_spacing(&player);
    }

    #[test]
    fn test_chain_spacing_holds_while_steering() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut player = Player::random_start(&mut rng);
        let mut direction = Vec2::new(1.0, 0.3).normalize();
        for frame in 0..2000 {
            if frame % 40 == 0 {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                direction = Vec2::from_angle(angle);
            }
            let speed = rng.random_range(0.0..6.0);
            direction = player.update(direction, speed);
            assert_chain_spacing(&player);
        }
    }

    #[test]
    fn test_coincident_segments_are_pushed_apart() {
        let mut player = Player {
            segments: [Vec2::new(300.0, 200.0); SEGMENT_COUNT],
        };
        player.update(Vec2::ZERO, 0.0);
        assert_chain_spacing(&player);
        assert!(player.segments[1].x > player.segments[0].x);
    }

    #[test]
    fn test_head_bounces_off_right_edge() {
        let mut player = Player::new(Vec2::new(623.0, 200.0));
        let direction = player.update(Vec2::X, 5.0);
        assert_eq!(direction, Vec2::NEG_X);
        assert!(player.rect().max.x <= GAME_AREA.max.x - EDGE_MARGIN + TOLERANCE);
    }

    #[test]
    fn test_head_bounces_off_top_edge_keeping_x() {
        let mut player = Player::new(Vec2::new(300.0, 56.0));
        let direction = player.update(Vec2::new(0.6, -0.8), 5.0);
        assert_eq!(direction, Vec2::new(0.6, 0.8));
        assert!(player.rect().min.y >= GAME_AREA.min.y + EDGE_MARGIN - TOLERANCE);
    }

    #[test]
    fn test_head_stays_inside_at_high_speed() {
        let mut player = Player::new(Vec2::new(320.0, 240.0));
        let mut direction = Vec2::new(0.7, 0.7).normalize();
        for _ in 0..500 {
            direction = player.update(direction, 40.0);
            let rect = player.rect();
            assert!(rect.min.x >= GAME_AREA.min.x + EDGE_MARGIN - TOLERANCE);
            assert!(rect.max.x <= GAME_AREA.max.x - EDGE_MARGIN + TOLERANCE);
            assert!(rect.min.y >= GAME_AREA.min.y + EDGE_MARGIN - TOLERANCE);
            assert!(rect.max.y <= GAME_AREA.max.y - EDGE_MARGIN + TOLERANCE);
        }
    }
}
