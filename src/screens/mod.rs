//! The game's main screen states and transitions between them.
//!
//! Every screen keeps its state in a context resource. The screen's update
//! system returns the next [`Screen`] when it is done, and the `OnEnter`
//! system of that screen builds its own context out of the previous one.

mod countdown;
mod game_over;
mod gameplay;
mod loading;
mod title;

use bevy::{input::common_conditions::input_just_pressed, prelude::*};

pub(super) fn plugin(app: &mut App) {
    app.init_state::<Screen>();

    app.add_plugins((
        countdown::plugin,
        game_over::plugin,
        gameplay::plugin,
        loading::plugin,
        title::plugin,
    ));

    app.add_systems(Update, quit.run_if(input_just_pressed(KeyCode::Escape)));
}

/// The game's main screen states.
#[derive(States, Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Screen {
    #[default]
    Loading,
    Title,
    Countdown,
    Gameplay,
    GameOver,
}

/// False from the moment a screen asks for a transition until the
/// transition has happened, so a finished screen is not drawn or ticked again.
pub fn screen_settled(next: Res<NextState<Screen>>) -> bool {
    matches!(*next, NextState::Unchanged)
}

/// True on frames where any mouse button went down.
pub fn mouse_clicked(buttons: Res<ButtonInput<MouseButton>>) -> bool {
    buttons.get_just_pressed().next().is_some()
}

fn quit(mut app_exit: MessageWriter<AppExit>) {
    info!("Escape pressed, quitting");
    app_exit.write(AppExit::Success);
}
