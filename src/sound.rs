//! Named audio cues and the manager that plays them in response to events.
//!
//! Actual playback is delegated to an [`AudioSink`]; the terminal front end
//! only rings the bell, tests record what was asked for.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::{SoundConfig, SoundCue};
use crate::entities::ProjectileOwner;
use crate::events::{GameEvent, GameEventListener};

pub const CUE_PROJECTILE: &str = "Projectile";
pub const CUE_EXPLOSION: &str = "Explosion";
pub const CUE_PLAYER_HIT: &str = "PlayerHit";
pub const CUE_BACKGROUND_MUSIC: &str = "BackgroundMusic";

/// String-keyed cue lookup.
#[derive(Clone, Debug, Default)]
pub struct SoundBank {
    cues: HashMap<String, SoundCue>,
}

impl SoundBank {
    pub fn from_config(config: &SoundConfig) -> Self {
        SoundBank {
            cues: config
                .cues
                .iter()
                .map(|(key, cue)| (key.clone(), cue.clone()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SoundCue> {
        let cue = self.cues.get(key);
        if cue.is_none() {
            log::warn!("Sound cue '{}' not found in sound bank", key);
        }
        cue
    }

    pub fn add(&mut self, key: impl Into<String>, cue: SoundCue) {
        self.cues.insert(key.into(), cue);
    }

    pub fn clear(&mut self) {
        self.cues.clear();
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

pub trait AudioSink {
    fn play(&mut self, key: &str, cue: &SoundCue, volume: f32, looping: bool);
    fn stop(&mut self, key: &str);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _key: &str, _cue: &SoundCue, _volume: f32, _looping: bool) {}
    fn stop(&mut self, _key: &str) {}
}

/// Shared handle to the process audio output, registered as a service.
#[derive(Clone)]
pub struct AudioOutput(pub Rc<RefCell<dyn AudioSink>>);

impl AudioOutput {
    pub fn new(sink: impl AudioSink + 'static) -> Self {
        AudioOutput(Rc::new(RefCell::new(sink)))
    }
}

pub struct SoundManager {
    bank: Rc<SoundBank>,
    output: AudioOutput,
    sfx_volume: f32,
    music_volume: f32,
    sfx_enabled: bool,
    music_enabled: bool,
    sound_enabled: bool,
    music: Option<String>,
}

impl SoundManager {
    pub fn new(bank: Rc<SoundBank>, output: AudioOutput, config: &SoundConfig) -> Self {
        SoundManager {
            bank,
            output,
            sfx_volume: config.sfx_volume.clamp(0.0, 1.0),
            music_volume: config.music_volume.clamp(0.0, 1.0),
            sfx_enabled: true,
            music_enabled: true,
            sound_enabled: true,
            music: None,
        }
    }

    fn effective_sfx_volume(&self, requested: Option<f32>, cue: &SoundCue) -> f32 {
        if self.sfx_enabled && self.sound_enabled {
            requested.unwrap_or(cue.volume * self.sfx_volume)
        } else {
            0.0
        }
    }

    fn effective_music_volume(&self) -> f32 {
        if self.music_enabled && self.sound_enabled {
            self.music_volume
        } else {
            0.0
        }
    }

    /// Play a cue by key. Unknown keys are logged and skipped.
    pub fn play_effect(&mut self, key: &str, volume: Option<f32>) -> bool {
        let Some(cue) = self.bank.get(key) else {
            return false;
        };
        let volume = self.effective_sfx_volume(volume, cue);
        self.output.0.borrow_mut().play(key, cue, volume, false);
        true
    }

    pub fn stop_effect(&mut self, key: &str) {
        self.output.0.borrow_mut().stop(key);
    }

    pub fn play_music(&mut self, key: &str) -> bool {
        let Some(cue) = self.bank.get(key) else {
            return false;
        };
        let volume = self.effective_music_volume();
        self.output.0.borrow_mut().play(key, cue, volume, true);
        self.music = Some(key.to_string());
        true
    }

    pub fn stop_music(&mut self) {
        if let Some(key) = self.music.take() {
            self.output.0.borrow_mut().stop(&key);
        }
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume.clamp(0.0, 1.0);
        self.restart_music();
    }

    pub fn toggle_sfx(&mut self, enabled: bool) {
        self.sfx_enabled = enabled;
    }

    pub fn toggle_music(&mut self, enabled: bool) {
        self.music_enabled = enabled;
        self.restart_music();
    }

    /// Master switch for both music and effects.
    pub fn toggle_sound(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
        self.restart_music();
    }

    pub fn is_sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    // Re-issue the music cue so the sink picks up the new volume.
    fn restart_music(&mut self) {
        if let Some(key) = self.music.clone() {
            self.play_music(&key);
        }
    }
}

impl GameEventListener for SoundManager {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ProjectileFired {
                owner: ProjectileOwner::Player,
            } => {
                self.play_effect(CUE_PROJECTILE, None);
            }
            GameEvent::EnemyKilled { .. } | GameEvent::ObstacleHit => {
                self.play_effect(CUE_EXPLOSION, Some(0.8));
            }
            GameEvent::PlayerHit { .. } => {
                self.play_effect(CUE_PLAYER_HIT, None);
            }
            GameEvent::WaveStarted { .. } if self.music.is_none() => {
                self.play_music(CUE_BACKGROUND_MUSIC);
            }
            GameEvent::PlayerWon | GameEvent::PlayerLost => self.stop_music(),
            _ => {}
        }
    }
}
