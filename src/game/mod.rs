//! The gameplay rules.
//!
//! This module contains the parts of the game that don't care which screen is
//! showing:
//! - Playfield geometry
//! - Bubbles and powerups
//! - The worm and its follow-chain
//! - Spawn placement
//! - A round of play ([`session::GameContext`])
//! - High score persistence

mod debug;
pub mod bubble;
pub mod highscore;
pub mod playfield;
pub mod player;
pub mod session;
pub mod spawn;

use bevy::prelude::*;

use crate::asset_tracking::LoadResource;

pub(super) fn plugin(app: &mut App) {
    app.add_message::<session::GameEvent>();
    app.load_resource::<GameAssets>();

    app.add_plugins((highscore::plugin, debug::plugin));
}

/// Background music, played in rotation.
pub const SONGS: [&str; 5] = [
    "audio/music/bouncing-around-in-pixel-town.ogg",
    "audio/music/carefree-days-in-groovyville.ogg",
    "audio/music/city-of-tomorrow.ogg",
    "audio/music/pelican-bay-tiki-party.ogg",
    "audio/music/trouble-in-a-digital-city.ogg",
];

/// Played once the end jingle of a round has finished.
pub const GAME_OVER_SONG: &str = "audio/music/cyber-teen.ogg";

/// Every image and sound the game uses, loaded once at startup.
#[derive(Resource, Asset, Clone, Reflect)]
#[reflect(Resource)]
pub struct GameAssets {
    #[dependency]
    pub bubble_image: Handle<Image>,
    #[dependency]
    pub powerup_image: Handle<Image>,
    #[dependency]
    pub slimeball_image: Handle<Image>,
    #[dependency]
    pub pick_sound: Handle<AudioSource>,
    #[dependency]
    pub bubble_sound: Handle<AudioSource>,
    #[dependency]
    pub end_sound: Handle<AudioSource>,
    #[dependency]
    pub player_sound: Handle<AudioSource>,
    #[dependency]
    pub songs: Vec<Handle<AudioSource>>,
    #[dependency]
    pub game_over_song: Handle<AudioSource>,
}

impl FromWorld for GameAssets {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();
        Self {
            bubble_image: assets.load("images/normal_ball.png"),
            powerup_image: assets.load("images/special.png"),
            slimeball_image: assets.load("images/slimeball.png"),
            pick_sound: assets.load("audio/sfx/pick.ogg"),
            bubble_sound: assets.load("audio/sfx/bubble.ogg"),
            end_sound: assets.load("audio/sfx/end.ogg"),
            player_sound: assets.load("audio/sfx/player.ogg"),
            songs: SONGS.iter().map(|path| assets.load(*path)).collect(),
            game_over_song: assets.load(GAME_OVER_SONG),
        }
    }
}
