//! The game over screen: final score, name entry for a new high score and a
//! scrolling high score table.

use bevy::{
    input::{
        ButtonState,
        keyboard::{Key, KeyboardInput},
    },
    prelude::*,
    sprite::Anchor,
    text::LineHeight,
};

use super::{mouse_clicked, screen_settled};
use crate::{
    AppSystems,
    audio::{Jukebox, JukeboxMode, Music, music, sound_effect, stop_music},
    game::{
        GameAssets,
        highscore::{HighScores, ScoreEntry},
        session::GameContext,
    },
    screens::Screen,
    theme::{
        GameFont,
        palette::{AMBER, BACKGROUND},
        widget,
    },
};

/// How long the screen stays up without a click.
pub const GAME_OVER_MS: f32 = 60_000.0;
/// Clicks are ignored for this long so a frantic last click doesn't skip the screen.
const CLICK_GRACE_MS: f32 = 10_000.0;
/// The end jingle starts this long after the screen appears.
const JINGLE_DELAY_MS: f32 = 250.0;

pub const MAX_NAME_LEN: usize = 8;

/// Scroll speed of the table, half a pixel per 60 Hz frame.
const SCROLL_PX_PER_MS: f32 = 0.5 * 60.0 / 1000.0;
const TABLE_TOP: f32 = 200.0;
const TABLE_WINDOW_HEIGHT: f32 = 160.0;
const TABLE_LINE_HEIGHT: f32 = 24.0;
/// Height in pixels of the fade bands at the top and bottom of the table.
const FADER_ROWS: usize = 20;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(Screen::GameOver), (start_game_over, spawn_game_over_screen).chain());
    app.add_systems(OnExit(Screen::GameOver), resume_playlist);

    app.add_systems(
        Update,
        (
            (record_click.run_if(mouse_clicked), record_keys).in_set(AppSystems::RecordInput),
            (update_game_over, start_game_over_song)
                .chain()
                .in_set(AppSystems::Update),
            draw_game_over.in_set(AppSystems::Draw),
        )
            .run_if(
                in_state(Screen::GameOver)
                    .and(resource_exists::<GameOverContext>)
                    .and(screen_settled),
            ),
    );
}

/// Sounds the game over screen asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCue {
    EndJingle,
    GameOverSong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JinglePhase {
    Waiting,
    Playing,
    Finished,
}

/// A key press while typing a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKey {
    Char(char),
    Backspace,
    Enter,
}

#[derive(Resource, Debug, Clone)]
pub struct GameOverContext {
    /// Milliseconds until the screen returns to the title.
    pub count: f32,
    pub score: u32,
    /// True while the player is typing a name for a new high score.
    pub entering_name: bool,
    pub name: String,
    /// How far the table has scrolled, in pixels.
    pub scroll_top: f32,
    /// The table text, twice over so the scroll can wrap seamlessly.
    pub table: String,
    /// Height of a single copy of the table.
    pub table_height: f32,
    pub jingle: JinglePhase,
}

impl GameOverContext {
    pub fn start(score: u32, high_scores: &HighScores) -> Self {
        let mut context = Self {
            count: GAME_OVER_MS,
            score,
            entering_name: high_scores.is_high_score(score),
            name: String::new(),
            scroll_top: 0.0,
            table: String::new(),
            table_height: 0.0,
            jingle: JinglePhase::Waiting,
        };
        context.build_table(high_scores);
        context
    }

    fn build_table(&mut self, high_scores: &HighScores) {
        let lines: Vec<String> = high_scores.lines().collect();
        let block = lines.join("\n");
        self.table = format!("{block}\n{block}");
        self.table_height = lines.len() as f32 * TABLE_LINE_HEIGHT;
        self.scroll_top = 0.0;
    }

    /// Whether a click returns to the title yet.
    pub fn can_restart(&self) -> bool {
        self.count < GAME_OVER_MS - CLICK_GRACE_MS
    }

    pub fn click(&mut self) {
        if self.can_restart() {
            self.count = 0.0;
        }
    }

    /// Feed a key press to the name entry. Returns true when the name was
    /// committed to `high_scores`.
    pub fn key(&mut self, key: NameKey, high_scores: &mut HighScores) -> bool {
        if !self.entering_name {
            return false;
        }

        match key {
            NameKey::Backspace => {
                self.name.pop();
            }
            NameKey::Enter => {
                high_scores.insert(ScoreEntry::new(self.score, self.name.clone()));
                self.entering_name = false;
                self.build_table(high_scores);
                return true;
            }
            NameKey::Char(c) => {
                if c.is_alphanumeric() && self.name.chars().count() < MAX_NAME_LEN {
                    self.name.extend(c.to_uppercase());
                }
            }
        }
        false
    }

    pub fn update(&mut self, delta_ms: f32, cues: &mut Vec<GameOverCue>) -> Option<Screen> {
        self.count -= delta_ms;

        if !self.entering_name {
            self.scroll_top += SCROLL_PX_PER_MS * delta_ms;
            if self.scroll_top.floor() >= self.table_height {
                self.scroll_top = 0.0;
            }
        }

        if self.jingle == JinglePhase::Waiting && self.count < GAME_OVER_MS - JINGLE_DELAY_MS {
            self.jingle = JinglePhase::Playing;
            cues.push(GameOverCue::EndJingle);
        }

        (self.count <= 0.0).then_some(Screen::Title)
    }

    /// The end jingle stopped playing.
    pub fn jingle_ended(&mut self) -> Option<GameOverCue> {
        if self.jingle != JinglePhase::Playing {
            return None;
        }
        self.jingle = JinglePhase::Finished;
        Some(GameOverCue::GameOverSong)
    }

    /// The score line, with the name being typed and a cursor after it.
    pub fn score_line(&self) -> String {
        if self.entering_name {
            format!("SCORE: {:05}   {}\u{258E}", self.score, self.name)
        } else {
            format!("SCORE: {:05}", self.score)
        }
    }
}

#[derive(Component)]
struct EndJingle;

#[derive(Component)]
struct ScoreLine;

#[derive(Component)]
struct NamePrompt;

#[derive(Component)]
struct RestartHint;

/// The clipping window the table scrolls in.
#[derive(Component)]
struct TableWindow;

#[derive(Component)]
struct TableText;

pub(super) fn start_game_over(
    mut commands: Commands,
    game: Option<Res<GameContext>>,
    high_scores: Res<HighScores>,
    mut jukebox: ResMut<Jukebox>,
    music_query: Query<Entity, With<Music>>,
) {
    let score = game.map_or(0, |game| game.score);
    commands.remove_resource::<GameContext>();

    let context = GameOverContext::start(score, &high_scores);
    info!(
        "Game over with score {}{}",
        score,
        if context.entering_name { ", a new high score" } else { "" }
    );
    commands.insert_resource(context);

    jukebox.mode = JukeboxMode::Held;
    stop_music(&mut commands, &music_query);
}

fn spawn_game_over_screen(mut commands: Commands, font: Res<GameFont>) {
    commands.spawn((
        Name::new("Game Over Screen"),
        Transform::default(),
        Visibility::default(),
        DespawnOnExit(Screen::GameOver),
        children![
            (
                widget::label("GAME OVER", font.0.clone(), 60.0),
                widget::placed(Vec2::new(320.0, 60.0), Anchor::CENTER),
            ),
            (
                widget::label("YOU MADE HIGH SCORE!\nENTER YOUR NAME BELOW:", font.0.clone(), 18.0),
                widget::placed(Vec2::new(320.0, 100.0), Anchor::TOP_CENTER),
                Visibility::Hidden,
                NamePrompt,
            ),
            (
                widget::label("", font.0.clone(), 18.0),
                widget::placed(Vec2::new(320.0, 150.0), Anchor::TOP_CENTER),
                ScoreLine,
            ),
            (
                widget::label("PRESS MOUSE BUTTON TO RESTART", font.0.clone(), 18.0),
                widget::placed(Vec2::new(320.0, 475.0), Anchor::BOTTOM_CENTER),
                Visibility::Hidden,
                RestartHint,
            ),
        ],
    ));

    commands.spawn((
        Name::new("High Score Table"),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(TABLE_TOP),
            width: Val::Percent(100.0),
            height: Val::Px(TABLE_WINDOW_HEIGHT),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::FlexStart,
            overflow: Overflow::clip(),
            ..default()
        },
        Visibility::Hidden,
        TableWindow,
        DespawnOnExit(Screen::GameOver),
        children![(
            Name::new("High Score Lines"),
            Node::default(),
            Text::new(""),
            TextFont {
                font: font.0.clone(),
                font_size: 18.0,
                line_height: LineHeight::Px(TABLE_LINE_HEIGHT),
                ..default()
            },
            TextColor(AMBER),
            TableText,
        )],
    ))
    .with_children(|window| {
        for at_top in [true, false] {
            window
                .spawn((
                    Name::new("Table Fader"),
                    Node {
                        position_type: PositionType::Absolute,
                        top: if at_top { Val::Px(0.0) } else { Val::Auto },
                        bottom: if at_top { Val::Auto } else { Val::Px(0.0) },
                        width: Val::Percent(100.0),
                        height: Val::Px(FADER_ROWS as f32),
                        flex_direction: FlexDirection::Column,
                        ..default()
                    },
                    ZIndex(1),
                ))
                .with_children(|band| {
                    for row in 0..FADER_ROWS {
                        band.spawn((
                            Node {
                                width: Val::Percent(100.0),
                                height: Val::Px(1.0),
                                ..default()
                            },
                            BackgroundColor(BACKGROUND.with_alpha(fader_alpha(row, at_top))),
                        ));
                    }
                });
        }
    });
}

/// Opacity of one pixel row of a table fader. The band is opaque at the
/// window edge and clear toward the middle.
fn fader_alpha(row: usize, at_top: bool) -> f32 {
    let steps = if at_top { FADER_ROWS - row } else { row + 1 };
    steps as f32 / FADER_ROWS as f32
}

fn record_click(mut game_over: ResMut<GameOverContext>) {
    game_over.click();
}

fn record_keys(
    mut keyboard: MessageReader<KeyboardInput>,
    mut game_over: ResMut<GameOverContext>,
    mut high_scores: ResMut<HighScores>,
) {
    // Keys pressed before this screen appeared are not part of the name.
    if game_over.is_added() {
        keyboard.clear();
        return;
    }

    for input in keyboard.read() {
        if input.state != ButtonState::Pressed {
            continue;
        }
        let key = match &input.logical_key {
            Key::Enter => NameKey::Enter,
            Key::Backspace => NameKey::Backspace,
            Key::Character(text) => {
                let Some(c) = text.chars().next() else {
                    continue;
                };
                NameKey::Char(c)
            }
            _ => continue,
        };

        if game_over.key(key, &mut high_scores) {
            info!("High score entered: {} {}", game_over.score, game_over.name);
            high_scores.save();
        }
    }
}

fn update_game_over(
    mut commands: Commands,
    time: Res<Time>,
    mut game_over: ResMut<GameOverContext>,
    mut next_screen: ResMut<NextState<Screen>>,
    assets: Option<Res<GameAssets>>,
) {
    let mut cues = Vec::new();
    let next = game_over.update(time.delta_secs() * 1000.0, &mut cues);

    if let Some(assets) = assets {
        for cue in cues {
            play_cue(&mut commands, &assets, cue);
        }
    }

    if let Some(screen) = next {
        next_screen.set(screen);
    }
}

fn start_game_over_song(
    mut commands: Commands,
    mut ended: RemovedComponents<EndJingle>,
    mut game_over: ResMut<GameOverContext>,
    mut jukebox: ResMut<Jukebox>,
    assets: Option<Res<GameAssets>>,
) {
    if ended.read().next().is_none() {
        return;
    }
    let Some(cue) = game_over.jingle_ended() else {
        return;
    };
    if let Some(assets) = assets {
        play_cue(&mut commands, &assets, cue);
    }
    // The playlist picks up again once the game over song ends.
    jukebox.mode = JukeboxMode::Playlist;
}

fn play_cue(commands: &mut Commands, assets: &GameAssets, cue: GameOverCue) {
    match cue {
        GameOverCue::EndJingle => {
            commands.spawn((
                Name::new("End Jingle"),
                sound_effect(assets.end_sound.clone()),
                EndJingle,
                DespawnOnExit(Screen::GameOver),
            ));
        }
        GameOverCue::GameOverSong => {
            info!("Playing the game over song");
            commands.spawn((Name::new("Music"), music(assets.game_over_song.clone())));
        }
    }
}

fn draw_game_over(
    game_over: Res<GameOverContext>,
    mut score_line: Query<&mut Text2d, With<ScoreLine>>,
    mut prompt: Query<&mut Visibility, (With<NamePrompt>, Without<RestartHint>, Without<TableWindow>)>,
    mut hint: Query<&mut Visibility, (With<RestartHint>, Without<NamePrompt>, Without<TableWindow>)>,
    mut window: Query<&mut Visibility, (With<TableWindow>, Without<NamePrompt>, Without<RestartHint>)>,
    mut table: Query<(&mut Text, &mut Node), With<TableText>>,
) {
    let shown = |visible: bool| {
        if visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        }
    };

    for mut text in &mut score_line {
        text.0 = game_over.score_line();
    }
    for mut visibility in &mut prompt {
        visibility.set_if_neq(shown(game_over.entering_name));
    }
    for mut visibility in &mut hint {
        visibility.set_if_neq(shown(game_over.can_restart()));
    }
    for mut visibility in &mut window {
        visibility.set_if_neq(shown(!game_over.entering_name));
    }
    for (mut text, mut node) in &mut table {
        if text.0 != game_over.table {
            text.0.clone_from(&game_over.table);
        }
        node.top = Val::Px(-game_over.scroll_top.floor());
    }
}

fn resume_playlist(
    mut commands: Commands,
    mut jukebox: ResMut<Jukebox>,
    music_query: Query<Entity, With<Music>>,
) {
    stop_music(&mut commands, &music_query);
    jukebox.mode = JukeboxMode::Playlist;
}

#[cfg(test)]
mod tests {
    use bevy::input::keyboard::KeyCode;

    use super::*;
    use crate::game::SONGS;

    const FRAME_MS: f32 = 1000.0 / 60.0;

    fn placeholder_assets() -> GameAssets {
        GameAssets {
            bubble_image: Handle::default(),
            powerup_image: Handle::default(),
            slimeball_image: Handle::default(),
            pick_sound: Handle::default(),
            bubble_sound: Handle::default(),
            end_sound: Handle::default(),
            player_sound: Handle::default(),
            songs: vec![Handle::default(); SONGS.len()],
            game_over_song: Handle::default(),
        }
    }

    fn music_count(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query_filtered::<(), With<Music>>().iter(world).count()
    }

    fn key_press(c: char) -> KeyboardInput {
        let text: String = c.into();
        KeyboardInput {
            key_code: KeyCode::KeyA,
            logical_key: Key::Character(text.as_str().into()),
            state: ButtonState::Pressed,
            text: Some(text.as_str().into()),
            repeat: false,
            window: Entity::PLACEHOLDER,
        }
    }

    #[test]
    fn test_low_score_shows_table() {
        let context = GameOverContext::start(5, &HighScores::default());
        assert!(!context.entering_name);
        assert_eq!(context.table_height, 20.0 * TABLE_LINE_HEIGHT);
        assert!(context.table.starts_with("0200  JANU\n0190  JANU"));
        assert_eq!(context.table.lines().count(), 40);
    }

    #[test]
    fn test_name_entry() {
        let mut high_scores = HighScores::default();
        let mut context = GameOverContext::start(155, &high_scores);
        assert!(context.entering_name);

        for c in "wor-m 1".chars() {
            context.key(NameKey::Char(c), &mut high_scores);
        }
        assert_eq!(context.name, "WORM1");
        context.key(NameKey::Backspace, &mut high_scores);
        assert_eq!(context.name, "WORM");
        assert_eq!(context.score_line(), "SCORE: 00155   WORM\u{258E}");

        assert!(context.key(NameKey::Enter, &mut high_scores));
        assert!(!context.entering_name);
        assert_eq!(high_scores.entries[5], ScoreEntry::new(155, "WORM"));
        assert_eq!(high_scores.entries.len(), 20);
        assert!(context.table.contains("0155  WORM"));

        // Further keys do nothing once committed.
        assert!(!context.key(NameKey::Enter, &mut high_scores));
        assert_eq!(high_scores.entries.len(), 20);
    }

    #[test]
    fn test_name_is_capped() {
        let mut high_scores = HighScores::default();
        let mut context = GameOverContext::start(500, &high_scores);
        for c in "abcdefghijk".chars() {
            context.key(NameKey::Char(c), &mut high_scores);
        }
        assert_eq!(context.name, "ABCDEFGH");
    }

    #[test]
    fn test_click_ignored_during_grace() {
        let mut context = GameOverContext::start(0, &HighScores::default());
        let mut cues = Vec::new();

        context.update(9_000.0, &mut cues);
        context.click();
        assert_eq!(context.update(FRAME_MS, &mut cues), None);

        context.update(1_000.0, &mut cues);
        context.click();
        assert_eq!(context.update(FRAME_MS, &mut cues), Some(Screen::Title));
    }

    #[test]
    fn test_returns_to_title_after_a_minute() {
        let mut context = GameOverContext::start(0, &HighScores::default());
        let mut cues = Vec::new();
        for _ in 0..59 {
            assert_eq!(context.update(1000.0, &mut cues), None);
        }
        assert_eq!(context.update(1000.0, &mut cues), Some(Screen::Title));
    }

    #[test]
    fn test_jingle_then_song() {
        let mut context = GameOverContext::start(0, &HighScores::default());
        let mut cues = Vec::new();

        assert_eq!(context.jingle_ended(), None);
        context.update(200.0, &mut cues);
        assert!(cues.is_empty());
        context.update(100.0, &mut cues);
        context.update(100.0, &mut cues);
        assert_eq!(cues, [GameOverCue::EndJingle]);

        assert_eq!(context.jingle_ended(), Some(GameOverCue::GameOverSong));
        assert_eq!(context.jingle_ended(), None);
    }

    #[test]
    fn test_table_scrolls_and_wraps() {
        let mut context = GameOverContext::start(0, &HighScores::default());
        let mut cues = Vec::new();

        context.update(FRAME_MS, &mut cues);
        assert!((context.scroll_top - 0.5).abs() < 1e-4);

        context.scroll_top = context.table_height - 0.25;
        context.update(FRAME_MS, &mut cues);
        assert_eq!(context.scroll_top, 0.0);
    }

    #[test]
    fn test_table_holds_still_while_typing() {
        let mut context = GameOverContext::start(999, &HighScores::default());
        let mut cues = Vec::new();
        context.update(1000.0, &mut cues);
        assert_eq!(context.scroll_top, 0.0);
    }

    #[test]
    fn test_faders_are_opaque_at_the_window_edges() {
        assert_eq!(fader_alpha(0, true), 1.0);
        assert_eq!(fader_alpha(FADER_ROWS - 1, true), 1.0 / FADER_ROWS as f32);
        assert_eq!(fader_alpha(0, false), 1.0 / FADER_ROWS as f32);
        assert_eq!(fader_alpha(FADER_ROWS - 1, false), 1.0);
        for row in 1..FADER_ROWS {
            assert!(fader_alpha(row, true) < fader_alpha(row - 1, true));
            assert!(fader_alpha(row, false) > fader_alpha(row - 1, false));
        }
    }

    #[test]
    fn test_keys_pressed_before_the_screen_are_not_typed() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<KeyboardInput>();
        let high_scores = HighScores::default();
        app.insert_resource(GameOverContext::start(500, &high_scores));
        app.insert_resource(high_scores);
        app.add_systems(Update, record_keys);

        // Left over from the debug toggle during gameplay.
        app.world_mut().write_message(key_press('d'));
        app.update();
        assert_eq!(app.world().resource::<GameOverContext>().name, "");

        app.world_mut().write_message(key_press('a'));
        app.update();
        assert_eq!(app.world().resource::<GameOverContext>().name, "A");
    }

    #[test]
    fn test_game_over_song_is_the_only_music_after_the_jingle() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, crate::audio::plugin));
        app.configure_sets(
            Update,
            (AppSystems::RecordInput, AppSystems::Update, AppSystems::Draw).chain(),
        );
        app.add_systems(Update, start_game_over_song.in_set(AppSystems::Update));
        app.insert_resource(placeholder_assets());

        let mut context = GameOverContext::start(0, &HighScores::default());
        context.jingle = JinglePhase::Playing;
        app.insert_resource(context);
        app.world_mut().resource_mut::<Jukebox>().mode = JukeboxMode::Held;

        let jingle = app.world_mut().spawn(EndJingle).id();
        app.update();
        assert_eq!(music_count(&mut app), 0);

        app.world_mut().despawn(jingle);
        app.update();
        assert_eq!(music_count(&mut app), 1);
        assert_eq!(app.world().resource::<Jukebox>().mode, JukeboxMode::Playlist);
        assert_eq!(
            app.world().resource::<GameOverContext>().jingle,
            JinglePhase::Finished
        );

        // The playlist waits for the game over song to end.
        app.update();
        assert_eq!(music_count(&mut app), 1);
    }
}
