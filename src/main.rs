// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

mod asset_tracking;
mod audio;
mod game;
mod screens;
mod theme;

use bevy::{asset::AssetMetaCheck, prelude::*, window::WindowResolution};

use crate::game::playfield::{SCREEN_HEIGHT, SCREEN_WIDTH};

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        // Add Bevy plugins.
        app.add_plugins(
            DefaultPlugins
                .set(AssetPlugin {
                    // Wasm builds will check for meta files (that don't exist) if this isn't set.
                    meta_check: AssetMetaCheck::Never,
                    ..default()
                })
                .set(WindowPlugin {
                    primary_window: Window {
                        title: "ÄH!".to_string(),
                        resolution: WindowResolution::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32),
                        resizable: false,
                        ..default()
                    }
                    .into(),
                    ..default()
                }),
        );

        app.insert_resource(ClearColor(theme::palette::BACKGROUND));

        // Add other plugins.
        app.add_plugins((
            asset_tracking::plugin,
            audio::plugin,
            game::plugin,
            screens::plugin,
            theme::plugin,
        ));

        // Input is recorded into the active screen's context before the screen
        // updates, and drawing only ever sees the updated context.
        app.configure_sets(
            Update,
            (AppSystems::RecordInput, AppSystems::Update, AppSystems::Draw).chain(),
        );

        // Spawn the main camera.
        app.add_systems(Startup, spawn_camera);
    }
}

/// High-level groupings of systems for the app in the `Update` schedule.
#[derive(SystemSet, Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
enum AppSystems {
    /// Feed mouse and keyboard input to the active screen.
    RecordInput,
    /// Advance the active screen, possibly requesting a transition.
    Update,
    /// Mirror the active screen's context into sprites, text and gizmos.
    Draw,
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Name::new("Camera"), Camera2d));
}
