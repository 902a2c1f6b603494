//! Debug visualization for spawning and the follow-chain.
//!
//! Toggle with the 'D' key during gameplay.
//! Shows:
//! - The clearance circle around every bubble
//! - The clearance circle around the player's head
//! - The links of the follow-chain and the head's bounding box
//! - The last clicked destination

use bevy::{color::palettes::css, input::common_conditions::input_just_pressed, prelude::*};

use super::{
    playfield::to_world,
    player::HEAD_SIZE,
    session::GameContext,
    spawn::{BUBBLE_CLEARANCE, PLAYER_CLEARANCE},
};
use crate::{AppSystems, screens::Screen};

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugOverlayVisible>();

    app.add_systems(
        Update,
        toggle_debug
            .in_set(AppSystems::RecordInput)
            .run_if(in_state(Screen::Gameplay).and(input_just_pressed(KeyCode::KeyD))),
    );

    app.add_systems(
        Update,
        draw_debug_overlay
            .in_set(AppSystems::Draw)
            .run_if(in_state(Screen::Gameplay).and(debug_visible).and(resource_exists::<GameContext>)),
    );
}

/// Resource to track if the debug overlay is visible.
#[derive(Resource, Default)]
pub struct DebugOverlayVisible(pub bool);

fn debug_visible(debug: Res<DebugOverlayVisible>) -> bool {
    debug.0
}

fn toggle_debug(mut debug: ResMut<DebugOverlayVisible>) {
    debug.0 = !debug.0;
    let state = if debug.0 { "ON" } else { "OFF" };
    info!("Debug overlay: {}", state);
}

fn draw_debug_overlay(mut gizmos: Gizmos, game: Res<GameContext>) {
    let world = |point: Vec2| to_world(point, 0.0).truncate();

    for bubble in &game.bubbles {
        gizmos.circle_2d(world(bubble.center), BUBBLE_CLEARANCE, css::WHITE.with_alpha(0.2));
    }

    let head = world(game.player.head());
    gizmos.circle_2d(head, PLAYER_CLEARANCE, css::INDIAN_RED.with_alpha(0.4));
    gizmos.rect_2d(
        Isometry2d::from_translation(head),
        Vec2::splat(HEAD_SIZE),
        css::LIMEGREEN.with_alpha(0.8),
    );

    for pair in game.player.segments.windows(2) {
        gizmos.line_2d(world(pair[0]), world(pair[1]), css::AQUA.with_alpha(0.8));
    }

    if let Some(destination) = game.destination {
        gizmos.cross_2d(
            Isometry2d::from_translation(world(destination)),
            8.0,
            css::GOLD,
        );
    }
}
