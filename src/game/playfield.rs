//! Playfield geometry.
//!
//! Gameplay runs in window pixels with the origin at the top-left corner and
//! `y` growing downward. Rendering converts to Bevy world space, where the
//! origin is the window center and `y` grows upward.

use bevy::prelude::*;

pub const SCREEN_WIDTH: f32 = 640.0;
pub const SCREEN_HEIGHT: f32 = 480.0;

/// The bordered area the player moves in.
pub const GAME_AREA: Rect = Rect {
    min: Vec2::new(0.0, 40.0),
    max: Vec2::new(639.0, 440.0),
};

/// Convert a playfield point to a world-space translation at depth `z`.
pub fn to_world(point: Vec2, z: f32) -> Vec3 {
    Vec3::new(
        point.x - SCREEN_WIDTH / 2.0,
        SCREEN_HEIGHT / 2.0 - point.y,
        z,
    )
}

/// Convert a world-space point back into playfield pixels.
pub fn from_world(point: Vec2) -> Vec2 {
    Vec2::new(point.x + SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0 - point.y)
}

/// Convert a playfield rectangle to its world-space center.
pub fn rect_center_world(rect: Rect) -> Vec2 {
    to_world(rect.center(), 0.0).truncate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_left_corner_maps_to_upper_left_of_world() {
        let world = to_world(Vec2::ZERO, 0.0);
        assert_eq!(world, Vec3::new(-320.0, 240.0, 0.0));
        assert_eq!(from_world(world.truncate()), Vec2::ZERO);
    }

    #[test]
    fn test_game_area_is_centered_below_hud() {
        let center = rect_center_world(GAME_AREA);
        assert!((center.x - -0.5).abs() < 1e-4);
        assert!((center.y - 0.0).abs() < 1e-4);
    }
}
