//! Where new bubbles may appear.
//!
//! A candidate point is drawn uniformly inside the spawn area and rejected
//! when it would overlap another bubble or land right next to the player.

use std::ops::RangeInclusive;

use bevy::prelude::*;
use rand::Rng;

use super::bubble::Bubble;

/// Minimum distance between the centers of two bubbles.
pub const BUBBLE_CLEARANCE: f32 = 40.0;
/// Minimum distance between a new bubble and the player's head.
pub const PLAYER_CLEARANCE: f32 = 60.0;

/// Candidates tried before a spawn is given up for this tick.
pub const MAX_SPAWN_ATTEMPTS: usize = 100;

const SPAWN_X: RangeInclusive<i32> = 50..=590;
const SPAWN_Y: RangeInclusive<i32> = 50..=430;

/// Check a candidate against the existing bubbles and the player.
pub fn is_clear(candidate: Vec2, bubbles: &[Bubble], player: Vec2) -> bool {
    let bubble_clearance_sq = BUBBLE_CLEARANCE * BUBBLE_CLEARANCE;
    let player_clearance_sq = PLAYER_CLEARANCE * PLAYER_CLEARANCE;

    bubbles
        .iter()
        .all(|bubble| candidate.distance_squared(bubble.center) >= bubble_clearance_sq)
        && candidate.distance_squared(player) >= player_clearance_sq
}

fn sample(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.random_range(SPAWN_X) as f32,
        rng.random_range(SPAWN_Y) as f32,
    )
}

/// Find a free spot for a new bubble, or `None` when the playfield is too
/// crowded to find one within [`MAX_SPAWN_ATTEMPTS`] tries.
pub fn find_spawn_point(rng: &mut impl Rng, bubbles: &[Bubble], player: Vec2) -> Option<Vec2> {
    (0..MAX_SPAWN_ATTEMPTS)
        .map(|_| sample(rng))
        .find(|candidate| is_clear(*candidate, bubbles, player))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::game::bubble::BubbleKind;

    fn bubble_at(id: u64, center: Vec2) -> Bubble {
        let mut rng = StdRng::seed_from_u64(id);
        Bubble::new(id, BubbleKind::Normal, center, 5000.0, &mut rng)
    }

    #[test]
    fn test_candidate_near_bubble_is_rejected() {
        let bubbles = [bubble_at(0, Vec2::new(200.0, 200.0))];
        let player = Vec2::new(500.0, 400.0);
        assert!(!is_clear(Vec2::new(239.0, 200.0), &bubbles, player));
        assert!(is_clear(Vec2::new(240.0, 200.0), &bubbles, player));
    }

    #[test]
    fn test_candidate_near_player_is_rejected() {
        let player = Vec2::new(300.0, 300.0);
        assert!(!is_clear(Vec2::new(300.0, 241.0), &[], player));
        assert!(is_clear(Vec2::new(300.0, 240.0), &[], player));
    }

    #[test]
    fn test_accepted_points_keep_their_distance() {
        let mut rng = StdRng::seed_from_u64(1234);
        let player = Vec2::new(320.0, 240.0);
        let mut bubbles = Vec::new();

        for id in 0..400 {
            let Some(point) = find_spawn_point(&mut rng, &bubbles, player) else {
                continue;
            };
            assert!(point.distance(player) >= PLAYER_CLEARANCE);
            for bubble in &bubbles {
                assert!(point.distance(bubble.center) >= BUBBLE_CLEARANCE);
            }
            assert!((50.0..=590.0).contains(&point.x));
            assert!((50.0..=430.0).contains(&point.y));
            bubbles.push(bubble_at(id, point));
        }
        assert!(!bubbles.is_empty());
    }

    #[test]
    fn test_crowded_playfield_gives_up() {
        let mut bubbles = Vec::new();
        let mut id = 0;
        for x in (0..=640).step_by(20) {
            for y in (0..=480).step_by(20) {
                bubbles.push(bubble_at(id, Vec2::new(x as f32, y as f32)));
                id += 1;
            }
        }
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(find_spawn_point(&mut rng, &bubbles, Vec2::ZERO), None);
    }
}
