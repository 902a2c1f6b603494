//! The title screen that appears after loading and after every game over.

use bevy::{prelude::*, sprite::Anchor};

use super::{game_over::GameOverContext, mouse_clicked, screen_settled};
use crate::{
    AppSystems,
    screens::Screen,
    theme::{GameFont, widget},
};

const INSTRUCTIONS: &str = "You are the green worm trying to catch the appearing\n\
    bubbles by clicking towards them with your mouse.\n\
    The faster you click, the faster your worm moves.\n\
    Be quick, you have only 30 seconds.\n\n\
    Press ESC to quit.";

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Title), (start_title, spawn_title_screen));

    app.add_systems(
        Update,
        (
            record_click
                .in_set(AppSystems::RecordInput)
                .run_if(mouse_clicked),
            update_title.in_set(AppSystems::Update).run_if(screen_settled),
        )
            .run_if(in_state(Screen::Title).and(resource_exists::<TitleContext>)),
    );
}

/// The title screen only waits for a click.
#[derive(Resource, Debug, Default)]
pub struct TitleContext {
    done: bool,
}

impl TitleContext {
    pub fn click(&mut self) {
        self.done = true;
    }

    pub fn update(&mut self) -> Option<Screen> {
        if self.done {
            self.done = false;
            return Some(Screen::Countdown);
        }
        None
    }
}

pub(super) fn start_title(mut commands: Commands) {
    commands.remove_resource::<GameOverContext>();
    commands.insert_resource(TitleContext::default());
}

fn spawn_title_screen(mut commands: Commands, font: Res<GameFont>) {
    commands.spawn((
        Name::new("Title Screen"),
        Transform::default(),
        Visibility::default(),
        DespawnOnExit(Screen::Title),
        children![
            (
                widget::label("ÄH!", font.0.clone(), 150.0),
                widget::placed(Vec2::new(320.0, 20.0), Anchor::TOP_CENTER),
            ),
            (
                widget::label("CLICK MOUSE BUTTON\nTO BEGIN", font.0.clone(), 40.0),
                widget::placed(Vec2::new(320.0, 240.0), Anchor::CENTER),
            ),
            (
                widget::paragraph(INSTRUCTIONS, font.0.clone(), 18.0),
                widget::placed(Vec2::new(320.0, 475.0), Anchor::BOTTOM_CENTER),
            ),
        ],
    ));
}

fn record_click(mut title: ResMut<TitleContext>) {
    title.click();
}

pub(super) fn update_title(
    mut title: ResMut<TitleContext>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if let Some(screen) = title.update() {
        next_screen.set(screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waits_for_click() {
        let mut title = TitleContext::default();
        assert_eq!(title.update(), None);
        assert_eq!(title.update(), None);
    }

    #[test]
    fn test_click_starts_countdown_once() {
        let mut title = TitleContext::default();
        title.click();
        assert_eq!(title.update(), Some(Screen::Countdown));
        assert_eq!(title.update(), None);
    }
}
