//! A short countdown between the title screen and the game.

use bevy::{prelude::*, sprite::Anchor};

use super::{screen_settled, title::TitleContext};
use crate::{
    AppSystems,
    screens::Screen,
    theme::{GameFont, widget},
};

/// Length of the countdown in milliseconds.
pub const COUNTDOWN_MS: f32 = 4000.0;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::Countdown), start_countdown);

    app.add_systems(
        Update,
        (
            tick_countdown.in_set(AppSystems::Update),
            draw_countdown.in_set(AppSystems::Draw),
        )
            .run_if(
                in_state(Screen::Countdown)
                    .and(resource_exists::<CountdownContext>)
                    .and(screen_settled),
            ),
    );
}

#[derive(Resource, Debug, Clone)]
pub struct CountdownContext {
    /// Milliseconds left.
    pub count: f32,
    /// What the screen shows right now.
    pub text: String,
}

impl Default for CountdownContext {
    fn default() -> Self {
        Self {
            count: COUNTDOWN_MS,
            text: String::new(),
        }
    }
}

impl CountdownContext {
    pub fn update(&mut self, delta_ms: f32) -> Option<Screen> {
        self.count -= delta_ms;
        let seconds = (self.count / 1000.0).floor() as i32;
        self.text = if seconds == 0 {
            "GO!".to_string()
        } else {
            seconds.to_string()
        };

        (self.count < 0.0).then_some(Screen::Gameplay)
    }
}

#[derive(Component)]
struct CountdownText;

pub(super) fn start_countdown(mut commands: Commands, font: Res<GameFont>) {
    commands.remove_resource::<TitleContext>();
    commands.insert_resource(CountdownContext::default());

    commands.spawn((
        widget::label("", font.0.clone(), 40.0),
        widget::placed(Vec2::new(320.0, 240.0), Anchor::CENTER),
        CountdownText,
        DespawnOnExit(Screen::Countdown),
    ));
}

fn tick_countdown(
    time: Res<Time>,
    mut countdown: ResMut<CountdownContext>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if let Some(screen) = countdown.update(time.delta_secs() * 1000.0) {
        next_screen.set(screen);
    }
}

fn draw_countdown(
    countdown: Res<CountdownContext>,
    mut text_query: Query<&mut Text2d, With<CountdownText>>,
) {
    for mut text in &mut text_query {
        if text.0 != countdown.text {
            text.0.clone_from(&countdown.text);
        }
    }
}
