//! The screen where the worm chases bubbles.
//!
//! The round itself lives in [`GameContext`] and ticks at a fixed 60 Hz. The
//! systems here feed it clicks, play its sounds and mirror it into sprites.

use bevy::{audio::Volume, prelude::*, sprite::Anchor, window::PrimaryWindow};

use super::{countdown::CountdownContext, mouse_clicked, screen_settled};
use crate::{
    AppSystems,
    audio::{looping_sound_effect, sound_effect},
    game::{
        GameAssets,
        bubble::{BUBBLE_SIZE, Bubble, BubbleKind},
        playfield::{GAME_AREA, from_world, rect_center_world, to_world},
        player::{HEAD_SIZE, SEGMENT_COUNT, SEGMENT_SCALES},
        session::{GameContext, GameEvent, MAX_SPEED},
    },
    screens::Screen,
    theme::{GameFont, palette::AMBER, widget},
};

/// The physics of a round are defined per frame at this rate.
const TICK_HZ: f64 = 60.0;

/// Full width of the speed meter.
const SPEED_METER_WIDTH: f32 = 630.0;
const SPEED_METER_HEIGHT: f32 = 20.0;
const SPEED_METER_POSITION: Vec2 = Vec2::new(5.0, 445.0);

const BUBBLE_Z: f32 = 1.0;
const PLAYER_Z: f32 = 2.0;

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ));

    app.add_systems(OnEnter(Screen::Gameplay), (start_game, spawn_hud).chain());

    app.add_systems(
        Update,
        record_click
            .in_set(AppSystems::RecordInput)
            .run_if(
                in_state(Screen::Gameplay)
                    .and(resource_exists::<GameContext>)
                    .and(mouse_clicked),
            ),
    );

    app.add_systems(
        FixedUpdate,
        tick_game.run_if(
            in_state(Screen::Gameplay)
                .and(resource_exists::<GameContext>)
                .and(screen_settled),
        ),
    );

    app.add_systems(
        Update,
        (play_game_sounds, update_movement_volume)
            .chain()
            .in_set(AppSystems::Update)
            .run_if(in_state(Screen::Gameplay).and(resource_exists::<GameAssets>)),
    );

    app.add_systems(
        Update,
        (sync_bubbles, draw_player, draw_hud, draw_border)
            .in_set(AppSystems::Draw)
            .run_if(
                in_state(Screen::Gameplay)
                    .and(resource_exists::<GameContext>)
                    .and(resource_exists::<GameAssets>)
                    .and(screen_settled),
            ),
    );
}

/// A sprite showing the bubble with this id.
#[derive(Component, Debug)]
struct BubbleSprite(u64);

/// A sprite showing the worm segment at this index, head first.
#[derive(Component, Debug)]
struct SegmentSprite(usize);

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct TimeText;

#[derive(Component)]
struct SpeedMeter;

/// The looping sound that plays while the worm moves.
#[derive(Component)]
struct MovementSound;

pub(super) fn start_game(mut commands: Commands) {
    commands.remove_resource::<CountdownContext>();

    let game = GameContext::start(&mut rand::rng());
    info!("Round started at {:?}", game.player.head());
    commands.insert_resource(game);
}

fn spawn_hud(mut commands: Commands, font: Res<GameFont>, assets: Option<Res<GameAssets>>) {
    commands.spawn((
        widget::paragraph("SCORE: 00000", font.0.clone(), 18.0),
        widget::placed(Vec2::new(5.0, 5.0), Anchor::TOP_LEFT),
        ScoreText,
        DespawnOnExit(Screen::Gameplay),
    ));
    commands.spawn((
        widget::paragraph("TIME LEFT: 30", font.0.clone(), 18.0),
        widget::placed(Vec2::new(500.0, 5.0), Anchor::TOP_LEFT),
        TimeText,
        DespawnOnExit(Screen::Gameplay),
    ));
    commands.spawn((
        Name::new("Speed Meter"),
        Sprite::from_color(AMBER, Vec2::new(0.0, SPEED_METER_HEIGHT)),
        Anchor::TOP_LEFT,
        Transform::from_translation(to_world(SPEED_METER_POSITION, PLAYER_Z)),
        SpeedMeter,
        DespawnOnExit(Screen::Gameplay),
    ));

    let Some(assets) = assets else {
        warn!("Game assets missing, the worm will not be drawn");
        return;
    };
    // Tail first so the head ends up on top.
    for index in (0..SEGMENT_COUNT).rev() {
        commands.spawn((
            Name::new(format!("Worm Segment {index}")),
            Sprite {
                image: assets.slimeball_image.clone(),
                custom_size: Some(Vec2::splat(HEAD_SIZE)),
                ..default()
            },
            Transform::from_scale(Vec3::splat(SEGMENT_SCALES[index])),
            SegmentSprite(index),
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

fn record_click(
    window_query: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    mut game: ResMut<GameContext>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    let Some(cursor_pos) = window
        .cursor_position()
        .and_then(|p| camera.viewport_to_world_2d(camera_transform, p).ok())
    else {
        return;
    };

    game.click(from_world(cursor_pos));
}

fn tick_game(
    time: Res<Time>,
    mut game: ResMut<GameContext>,
    mut game_events: MessageWriter<GameEvent>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    let mut events = Vec::new();
    let next = game.update(time.delta_secs() * 1000.0, &mut rand::rng(), &mut events);

    for event in &events {
        match event {
            GameEvent::BubbleSpawned { id, kind } => debug!("Spawned {:?} bubble {}", kind, id),
            GameEvent::SpawnSkipped => warn!("No free spot for a bubble, skipping this spawn"),
            GameEvent::BubbleCollected { id, reward } => {
                debug!("Collected bubble {} for {:?}", id, reward);
            }
            GameEvent::BubbleExpired { id } => debug!("Bubble {} popped", id),
            _ => {}
        }
    }
    game_events.write_batch(events);

    if let Some(screen) = next {
        info!("Time up, final score {}", game.score);
        next_screen.set(screen);
    }
}

fn play_game_sounds(
    mut commands: Commands,
    mut game_events: MessageReader<GameEvent>,
    movement_sounds: Query<Entity, With<MovementSound>>,
    assets: Res<GameAssets>,
) {
    for event in game_events.read() {
        match event {
            GameEvent::BubbleSpawned { .. } => {
                commands.spawn(sound_effect(assets.bubble_sound.clone()));
            }
            GameEvent::BubbleCollected { .. } => {
                commands.spawn(sound_effect(assets.pick_sound.clone()));
            }
            GameEvent::MovementStarted => {
                commands.spawn((
                    Name::new("Movement Sound"),
                    looping_sound_effect(assets.player_sound.clone(), 0.0),
                    MovementSound,
                    DespawnOnExit(Screen::Gameplay),
                ));
            }
            GameEvent::MovementStopped => {
                for entity in &movement_sounds {
                    commands.entity(entity).despawn();
                }
            }
            GameEvent::SpawnSkipped
            | GameEvent::BubbleExpired { .. }
            | GameEvent::TimeUp => {}
        }
    }
}

fn update_movement_volume(
    game: Option<Res<GameContext>>,
    global_volume: Res<GlobalVolume>,
    mut sinks: Query<&mut AudioSink, With<MovementSound>>,
) {
    let Some(game) = game else {
        return;
    };
    for mut sink in &mut sinks {
        sink.set_volume(global_volume.volume * Volume::Linear(game.movement_volume()));
    }
}

fn sync_bubbles(
    mut commands: Commands,
    game: Res<GameContext>,
    assets: Res<GameAssets>,
    mut sprites: Query<(Entity, &BubbleSprite, &mut Transform)>,
) {
    let mut shown = Vec::new();

    for (entity, sprite, mut transform) in &mut sprites {
        let Some(bubble) = game.bubbles.iter().find(|bubble| bubble.id == sprite.0) else {
            commands.entity(entity).despawn();
            continue;
        };
        *transform = bubble_transform(bubble);
        shown.push(sprite.0);
    }

    for bubble in game.bubbles.iter().filter(|bubble| !shown.contains(&bubble.id)) {
        let image = match bubble.kind {
            BubbleKind::Normal => assets.bubble_image.clone(),
            BubbleKind::Powerup => assets.powerup_image.clone(),
        };
        commands.spawn((
            Name::new(format!("Bubble {}", bubble.id)),
            Sprite {
                image,
                custom_size: Some(Vec2::splat(BUBBLE_SIZE)),
                ..default()
            },
            bubble_transform(bubble),
            BubbleSprite(bubble.id),
            DespawnOnExit(Screen::Gameplay),
        ));
    }
}

fn bubble_transform(bubble: &Bubble) -> Transform {
    Transform::from_translation(to_world(bubble.center, BUBBLE_Z))
        .with_rotation(Quat::from_rotation_z(bubble.angle.to_radians()))
        .with_scale(Vec3::splat(bubble.scale()))
}

fn draw_player(game: Res<GameContext>, mut segments: Query<(&SegmentSprite, &mut Transform)>) {
    for (segment, mut transform) in &mut segments {
        let Some(position) = game.player.segments.get(segment.0) else {
            continue;
        };
        // Lower indices sit closer to the camera.
        let z = PLAYER_Z + (SEGMENT_COUNT - segment.0) as f32 * 0.01;
        transform.translation = to_world(*position, z);
    }
}

fn draw_hud(
    game: Res<GameContext>,
    mut score_text: Query<&mut Text2d, (With<ScoreText>, Without<TimeText>)>,
    mut time_text: Query<&mut Text2d, (With<TimeText>, Without<ScoreText>)>,
    mut meter: Query<&mut Sprite, With<SpeedMeter>>,
) {
    for mut text in &mut score_text {
        text.0 = format!("SCORE: {:05}", game.score);
    }
    for mut text in &mut time_text {
        text.0 = format!("TIME LEFT: {}", game.seconds_left());
    }
    for mut sprite in &mut meter {
        let width = SPEED_METER_WIDTH * game.speed / MAX_SPEED;
        sprite.custom_size = Some(Vec2::new(width, SPEED_METER_HEIGHT));
    }
}

fn draw_border(mut gizmos: Gizmos) {
    gizmos.rect_2d(
        Isometry2d::from_translation(rect_center_world(GAME_AREA)),
        GAME_AREA.size(),
        AMBER,
    );
}
