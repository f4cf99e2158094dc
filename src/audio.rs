//! Sound playback driven by game events
//!
//! The sound manager owns no audio data. It maps each `SoundType` to a
//! resource id and asks an `AudioBackend` to play or stop it. Music is
//! looped and only one music track plays at a time.

use crate::game::GameEvent;
use crate::resources::{ResourceDatabase, ResourceId, ResourceType};

/// Base volume of every source before master/music/sfx scaling
pub const SOURCE_VOLUME: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundType {
    Death,
    KeyCollect,
    Win,
    FailInput,
    UiClick,
    UiNavigate,
    UiTransition,
    TileRoad,
    TilePavement,
    Ambiance,
    Hub,
}

impl SoundType {
    pub const COUNT: usize = 11;

    pub const ALL: [SoundType; Self::COUNT] = [
        SoundType::Death,
        SoundType::KeyCollect,
        SoundType::Win,
        SoundType::FailInput,
        SoundType::UiClick,
        SoundType::UiNavigate,
        SoundType::UiTransition,
        SoundType::TileRoad,
        SoundType::TilePavement,
        SoundType::Ambiance,
        SoundType::Hub,
    ];

    pub fn is_music(&self) -> bool {
        matches!(self, SoundType::Ambiance | SoundType::Hub)
    }

    pub fn resource(&self) -> ResourceType {
        match self {
            SoundType::Death => ResourceType::SoundDeath,
            SoundType::KeyCollect => ResourceType::SoundKeyCollect,
            SoundType::Win => ResourceType::SoundWin,
            SoundType::FailInput => ResourceType::SoundFailInput,
            SoundType::UiClick => ResourceType::SoundUiClick,
            SoundType::UiNavigate => ResourceType::SoundUiNavigate,
            SoundType::UiTransition => ResourceType::SoundUiTransition,
            SoundType::TileRoad => ResourceType::SoundTileRoad,
            SoundType::TilePavement => ResourceType::SoundTilePavement,
            SoundType::Ambiance => ResourceType::MusicAmbiance,
            SoundType::Hub => ResourceType::MusicHub,
        }
    }
}

/// Fire-and-forget audio output
pub trait AudioBackend {
    fn play(&mut self, id: ResourceId, volume: f32, looped: bool);
    fn stop(&mut self, id: ResourceId);
}

pub struct SoundManager {
    entries: [Option<ResourceId>; SoundType::COUNT],
    current_music: Option<SoundType>,
    master_volume: f32,
    music_volume: f32,
    sfx_volume: f32,
}

impl SoundManager {
    pub fn new(resources: &ResourceDatabase) -> Self {
        let mut entries = [None; SoundType::COUNT];
        for sound in SoundType::ALL {
            entries[sound as usize] = resources.get(sound.resource());
            if entries[sound as usize].is_none() {
                log::warn!("No audio loaded for {:?}, it will stay silent", sound);
            }
        }

        log::trace!("Initialized sound manager");
        Self {
            entries,
            current_music: None,
            master_volume: 1.0,
            music_volume: 1.0,
            sfx_volume: 1.0,
        }
    }

    pub fn set_volumes(&mut self, master: f32, music: f32, sfx: f32) {
        self.master_volume = master;
        self.music_volume = music;
        self.sfx_volume = sfx;
    }

    pub fn current_music(&self) -> Option<SoundType> {
        self.current_music
    }

    fn volume_of(&self, sound: SoundType) -> f32 {
        let channel = if sound.is_music() { self.music_volume } else { self.sfx_volume };
        SOURCE_VOLUME * self.master_volume * channel
    }

    pub fn play(&mut self, backend: &mut dyn AudioBackend, sound: SoundType) {
        let Some(id) = self.entries[sound as usize] else { return };
        backend.play(id, self.volume_of(sound), false);
    }

    pub fn stop(&mut self, backend: &mut dyn AudioBackend, sound: SoundType) {
        if let Some(id) = self.entries[sound as usize] {
            backend.stop(id);
        }
        if self.current_music == Some(sound) {
            self.current_music = None;
        }
    }

    /// Loop `music`, stopping whatever track was playing before.
    pub fn play_music(&mut self, backend: &mut dyn AudioBackend, music: SoundType) {
        if let Some(previous) = self.current_music {
            if previous == music {
                return;
            }
            self.stop(backend, previous);
        }

        self.current_music = Some(music);
        let Some(id) = self.entries[music as usize] else { return };
        backend.play(id, self.volume_of(music), true);
    }

    /// Restart the current track at the current volume.
    pub fn refresh_music(&mut self, backend: &mut dyn AudioBackend) {
        if let Some(music) = self.current_music.take() {
            self.stop(backend, music);
            self.play_music(backend, music);
        }
    }

    /// Returns true when the event was one the sound manager reacts to.
    pub fn handle_event(&mut self, backend: &mut dyn AudioBackend, event: &GameEvent) -> bool {
        match *event {
            GameEvent::SoundPlayed(sound) => self.play(backend, sound),
            GameEvent::MusicPlayed(music) => self.play_music(backend, music),
            GameEvent::LevelWon => {
                self.stop(backend, SoundType::Ambiance);
                self.play(backend, SoundType::Win);
            }
            GameEvent::LevelLost => {
                self.stop(backend, SoundType::Ambiance);
                self.play(backend, SoundType::Death);
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum AudioCall {
        Play { id: ResourceId, volume: f32, looped: bool },
        Stop(ResourceId),
    }

    /// Records every backend call
    #[derive(Default)]
    pub struct RecordingAudio {
        pub calls: Vec<AudioCall>,
    }

    impl AudioBackend for RecordingAudio {
        fn play(&mut self, id: ResourceId, volume: f32, looped: bool) {
            self.calls.push(AudioCall::Play { id, volume, looped });
        }

        fn stop(&mut self, id: ResourceId) {
            self.calls.push(AudioCall::Stop(id));
        }
    }
}
