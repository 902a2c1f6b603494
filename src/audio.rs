//! Music and sound effects.
//!
//! Background music comes from a small rotating playlist. When the playlist
//! runs out it is reshuffled so the track that just ended never plays again
//! straight away.

use bevy::{audio::Volume, prelude::*};
use rand::{Rng, seq::SliceRandom};

use crate::{AppSystems, game::GameAssets};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Music>();
    app.register_type::<SoundEffect>();
    app.init_resource::<Jukebox>();

    // Runs after the screens so music they spawned this frame is already in
    // the world.
    app.add_systems(
        Update,
        keep_music_playing
            .in_set(AppSystems::Draw)
            .run_if(resource_exists::<GameAssets>),
    );
}

/// Marker for background music entities.
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct Music;

/// A music track that despawns when it ends, which is how the jukebox knows
/// to move on to the next one.
pub fn music(handle: Handle<AudioSource>) -> impl Bundle {
    (AudioPlayer(handle), PlaybackSettings::DESPAWN, Music)
}

/// Marker for sound effect entities.
#[derive(Component, Reflect, Default)]
#[reflect(Component)]
pub struct SoundEffect;

pub fn sound_effect(handle: Handle<AudioSource>) -> impl Bundle {
    (AudioPlayer(handle), PlaybackSettings::DESPAWN, SoundEffect)
}

/// A looping sound effect that plays until its entity is despawned.
pub fn looping_sound_effect(handle: Handle<AudioSource>, volume: f32) -> impl Bundle {
    (
        AudioPlayer(handle),
        PlaybackSettings::LOOP.with_volume(Volume::Linear(volume)),
        SoundEffect,
    )
}

/// Stop all background music, e.g. when a screen brings its own.
pub fn stop_music(commands: &mut Commands, music: &Query<Entity, With<Music>>) {
    for entity in music {
        commands.entity(entity).despawn();
    }
}

// =============================================================================
// PLAYLIST
// =============================================================================

/// Play order over a fixed list of tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    order: Vec<usize>,
    index: usize,
}

impl Playlist {
    pub fn new(track_count: usize) -> Self {
        Self {
            order: (0..track_count).collect(),
            index: 0,
        }
    }

    /// The track to play now, or `None` for an empty playlist.
    pub fn current(&self) -> Option<usize> {
        self.order.get(self.index).copied()
    }

    /// Move on to the next track.
    ///
    /// At the end of the list the last track is set aside, the rest are
    /// shuffled and the set-aside track goes back in somewhere in the middle
    /// half before starting over from the top.
    pub fn advance(&mut self, rng: &mut impl Rng) -> Option<usize> {
        self.index += 1;
        if self.index >= self.order.len() {
            if let Some(last) = self.order.pop() {
                self.order.shuffle(rng);
                let len = self.order.len();
                let at = if len == 0 {
                    0
                } else {
                    rng.random_range(len / 4..=len - len / 4 - 1)
                };
                self.order.insert(at, last);
            }
            self.index = 0;
        }
        self.current()
    }
}

/// Whether the jukebox should keep the playlist going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JukeboxMode {
    #[default]
    Playlist,
    /// Something else owns the music channel.
    Held,
}

#[derive(Resource, Debug)]
pub struct Jukebox {
    pub playlist: Playlist,
    pub mode: JukeboxMode,
    started: bool,
}

impl Default for Jukebox {
    fn default() -> Self {
        Self {
            playlist: Playlist::new(crate::game::SONGS.len()),
            mode: JukeboxMode::default(),
            started: false,
        }
    }
}

impl Jukebox {
    /// Pick the track to play now that nothing is playing.
    fn next_track(&mut self, rng: &mut impl Rng) -> Option<usize> {
        if self.started {
            self.playlist.advance(rng)
        } else {
            self.started = true;
            self.playlist.current()
        }
    }
}

fn keep_music_playing(
    mut commands: Commands,
    mut jukebox: ResMut<Jukebox>,
    music_query: Query<(), With<Music>>,
    assets: Res<GameAssets>,
) {
    if jukebox.mode == JukeboxMode::Held || !music_query.is_empty() {
        return;
    }

    let Some(track) = jukebox.next_track(&mut rand::rng()) else {
        return;
    };
    let Some(handle) = assets.songs.get(track) else {
        warn!("Playlist points at missing track {}", track);
        return;
    };

    info!("Playing track {} ({})", track, crate::game::SONGS[track]);
    commands.spawn((Name::new("Music"), music(handle.clone())));
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_plays_in_order_first_time_through() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut playlist = Playlist::new(5);
        assert_eq!(playlist.current(), Some(0));
        for expected in 1..5 {
            assert_eq!(playlist.advance(&mut rng), Some(expected));
        }
    }

    #[test]
    fn test_reshuffle_never_repeats_the_last_track() {
        let mut rng = StdRng::seed_from_u64(77);
        let mut playlist = Playlist::new(5);
        let mut last = playlist.current();

        for _ in 0..500 {
            let wrapping = playlist.index == playlist.order.len() - 1;
            let next = playlist.advance(&mut rng);
            if wrapping {
                assert_ne!(next, last);
                let position = playlist.order.iter().position(|&t| Some(t) == last);
                // Reinserted into [1, 2] of the four remaining tracks.
                assert!(matches!(position, Some(1..=2)));
            }
            last = next;
        }
    }

    #[test]
    fn test_reshuffle_keeps_every_track() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut playlist = Playlist::new(5);
        for _ in 0..23 {
            playlist.advance(&mut rng);
        }
        let mut order = playlist.order.clone();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_tiny_playlists() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty = Playlist::new(0);
        assert_eq!(empty.current(), None);
        assert_eq!(empty.advance(&mut rng), None);

        let mut single = Playlist::new(1);
        assert_eq!(single.advance(&mut rng), Some(0));
        assert_eq!(single.advance(&mut rng), Some(0));
    }
}
