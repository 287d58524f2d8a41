//! Thin facades the presentation layer talks to.
//!
//! [`SoundControls`] is the everyday surface: play, volume, mute and a
//! readiness flag. [`LegacySoundService`] keeps the older call style (named
//! triggers, 0-100 volume) and mirrors an external settings store through
//! [`apply_settings`], which the caller invokes whenever those settings
//! change.

use tracing::error;

use crate::{catalog::SoundEventId, engine::SoundEngine};

/// Copyable view of the controls for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsSnapshot {
    pub volume: f32,
    pub muted: bool,
    pub initialized: bool,
}

pub struct SoundControls {
    engine: SoundEngine,
    initialized: bool,
}

impl SoundControls {
    pub fn new(engine: SoundEngine) -> Self {
        Self {
            initialized: engine.is_initialized(),
            engine,
        }
    }

    /// Open audio output. Returns the readiness flag; failures are logged.
    pub fn initialize(&mut self) -> bool {
        match self.engine.initialize() {
            Ok(()) => self.initialized = true,
            Err(e) => error!("sound system failed to initialize: {e}"),
        }
        self.initialized
    }

    /// True once [`initialize`](Self::initialize) has succeeded.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    pub fn play(&mut self, id: SoundEventId) {
        self.engine.play(id);
    }

    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.engine.set_volume(volume);
    }

    pub fn muted(&self) -> bool {
        self.engine.is_muted()
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.engine.set_muted(muted);
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.engine.toggle_muted()
    }

    pub fn snapshot(&self) -> ControlsSnapshot {
        ControlsSnapshot {
            volume: self.volume(),
            muted: self.muted(),
            initialized: self.initialized,
        }
    }

    pub fn engine(&self) -> &SoundEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SoundEngine {
        &mut self.engine
    }
}

/// The two sound preferences owned by the application's settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsSnapshot {
    pub sound_enabled: bool,
    /// Percent, 0..=100. Larger values are treated as 100.
    pub effects_volume: u8,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            effects_volume: 80,
        }
    }
}

/// Push settings-store values into the engine. Only values that differ are
/// written, so calling this on every store notification is cheap.
pub fn apply_settings(engine: &mut SoundEngine, settings: &SettingsSnapshot) {
    let volume = f32::from(settings.effects_volume.min(100)) / 100.0;
    if (engine.volume() - volume).abs() > f32::EPSILON {
        engine.set_volume(volume);
    }

    let muted = !settings.sound_enabled;
    if engine.is_muted() != muted {
        engine.set_muted(muted);
    }
}

/// Older facade with one method per sound.
pub struct LegacySoundService {
    engine: SoundEngine,
}

impl LegacySoundService {
    pub fn new(engine: SoundEngine) -> Self {
        Self { engine }
    }

    /// Mirror the settings store. Call on startup and on every change.
    pub fn sync(&mut self, settings: &SettingsSnapshot) {
        apply_settings(&mut self.engine, settings);
    }

    pub fn enabled(&self) -> bool {
        !self.engine.is_muted()
    }

    /// Volume as a rounded percentage.
    pub fn volume_percent(&self) -> u8 {
        (self.engine.volume() * 100.0).round() as u8
    }

    /// Settings to write back to the store after enabling or disabling.
    pub fn set_enabled(&mut self, enabled: bool) -> SettingsSnapshot {
        self.engine.set_muted(!enabled);
        self.settings()
    }

    /// Settings to write back to the store after a volume change.
    pub fn set_volume_percent(&mut self, percent: u8) -> SettingsSnapshot {
        self.engine
            .set_volume(f32::from(percent.min(100)) / 100.0);
        self.settings()
    }

    pub fn settings(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            sound_enabled: self.enabled(),
            effects_volume: self.volume_percent(),
        }
    }

    pub fn play_pop(&mut self) {
        self.engine.play(SoundEventId::LetterReveal);
    }

    pub fn play_success(&mut self) {
        self.engine.play(SoundEventId::CorrectAnswer);
    }

    pub fn play_error(&mut self) {
        self.engine.play(SoundEventId::WrongAnswer);
    }

    pub fn play_whoosh(&mut self) {
        self.engine.play(SoundEventId::Skip);
    }

    pub fn play_tick(&mut self) {
        self.engine.play(SoundEventId::TimeWarning);
    }

    pub fn play_fanfare(&mut self) {
        self.engine.play(SoundEventId::Win);
    }

    pub fn play_click(&mut self) {
        self.engine.play(SoundEventId::ButtonClick);
    }

    pub fn engine(&self) -> &SoundEngine {
        &self.engine
    }
}
