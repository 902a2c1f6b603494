//! Colors, font and text helpers shared by every screen.

pub mod palette;
pub mod widget;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<GameFont>();
}

/// The one font all text is set in.
#[derive(Resource)]
pub struct GameFont(pub Handle<Font>);

impl FromWorld for GameFont {
    fn from_world(world: &mut World) -> Self {
        let assets = world.resource::<AssetServer>();
        Self(assets.load("fonts/notosanshk-black.otf"))
    }
}
