//! A loading screen during which game assets are loaded.

use bevy::{prelude::*, sprite::Anchor};

use crate::{
    asset_tracking::ResourceHandles,
    screens::Screen,
    theme::{GameFont, widget},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Loading), spawn_loading_screen);

    app.add_systems(
        Update,
        enter_title_screen.run_if(in_state(Screen::Loading).and(all_assets_loaded)),
    );
}

fn spawn_loading_screen(mut commands: Commands, font: Res<GameFont>) {
    commands.spawn((
        widget::label("LOADING...", font.0.clone(), 40.0),
        widget::placed(Vec2::new(320.0, 240.0), Anchor::CENTER),
        DespawnOnExit(Screen::Loading),
    ));
}

fn enter_title_screen(mut next_screen: ResMut<NextState<Screen>>) {
    info!("All assets loaded");
    next_screen.set(Screen::Title);
}

fn all_assets_loaded(resource_handles: Res<ResourceHandles>) -> bool {
    resource_handles.is_all_done()
}
