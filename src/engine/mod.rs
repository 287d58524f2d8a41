//! The sound engine: owns the output context, the master gain and the
//! persisted volume/mute settings, and turns catalog lookups into scheduled
//! node graphs.
//!
//! Construct one [`SoundEngine`] at startup and pass it (or a facade over it)
//! to whoever needs to play sounds. Construction only reads the settings
//! store; the audio context is opened lazily by [`SoundEngine::initialize`]
//! or the first [`SoundEngine::play`].
//!
//! Audio is an enhancement, never a dependency: every public method except
//! [`SoundEngine::initialize`] and [`SoundEngine::try_play`] logs failures
//! and carries on in silence.

pub mod config;
pub mod playback;

use tracing::{debug, error, info, warn};

use crate::{
    catalog::{self, SoundEventId},
    error::EngineError,
    graph::{make_gain, GainHandle, NodeId},
    host::{AudioContext, AudioHost, ContextState},
    store::KeyValueStore,
};

pub use config::{EngineConfig, MUTED_KEY, VOLUME_KEY};
pub use playback::{Playback, PlaybackState, Voice};

struct Output {
    ctx: Box<dyn AudioContext>,
    master: GainHandle,
}

impl Output {
    /// Make sure the context is rendering, resuming it if the platform left
    /// it suspended.
    fn ensure_running(&mut self) -> Result<(), EngineError> {
        match self.ctx.state() {
            ContextState::Running => Ok(()),
            ContextState::Suspended => {
                debug!("resuming suspended audio context");
                self.ctx.resume()
            }
            ContextState::Closed => Err(EngineError::ContextClosed),
        }
    }
}

pub struct SoundEngine {
    host: Box<dyn AudioHost>,
    store: Box<dyn KeyValueStore>,
    config: EngineConfig,
    output: Option<Output>,
    /// Set when the host reported no audio output; plays are skipped until
    /// an explicit `initialize` or `dispose`.
    unsupported: bool,
}

impl SoundEngine {
    pub fn new(host: Box<dyn AudioHost>, store: Box<dyn KeyValueStore>) -> Self {
        let config = EngineConfig::load(store.as_ref());
        debug!(
            volume = config.master_volume,
            muted = config.muted,
            "loaded sound settings"
        );
        Self {
            host,
            store,
            config,
            output: None,
            unsupported: false,
        }
    }

    /// Open the output context and wire `master gain → destination`.
    ///
    /// Idempotent. A context that was closed underneath us is replaced. An
    /// explicit call also retries a host that previously had no output.
    pub fn initialize(&mut self) -> Result<(), EngineError> {
        self.unsupported = false;
        self.open_output()
    }

    fn open_output(&mut self) -> Result<(), EngineError> {
        if let Some(output) = &self.output {
            if output.ctx.state() != ContextState::Closed {
                return Ok(());
            }
            warn!("audio context was closed, reopening");
            self.output = None;
        }

        let mut ctx = match self.host.open() {
            Ok(ctx) => ctx,
            Err(e) => {
                self.unsupported = matches!(e, EngineError::UnsupportedPlatform(_));
                return Err(e);
            }
        };
        let master = make_gain(ctx.as_mut(), self.config.effective_level());
        ctx.connect(master.node(), NodeId::DESTINATION);

        info!(
            sample_rate = ctx.sample_rate(),
            state = ?ctx.state(),
            "sound engine initialized"
        );
        self.output = Some(Output { ctx, master });
        Ok(())
    }

    /// True once an output context is open.
    pub fn is_initialized(&self) -> bool {
        self.output.is_some()
    }

    /// Play `id` now. Silent (and allocation-free) while muted; any audio
    /// failure is logged and swallowed.
    pub fn play(&mut self, id: SoundEventId) {
        if let Err(e) = self.try_play(id) {
            warn!(sound = %id, "sound not played: {e}");
        }
    }

    /// Like [`play`](Self::play) but reports what happened. `Ok(None)` means
    /// nothing was scheduled: the engine is muted, or the host already said
    /// it has no audio output.
    pub fn try_play(&mut self, id: SoundEventId) -> Result<Option<Playback>, EngineError> {
        if self.config.muted || self.unsupported {
            return Ok(None);
        }

        self.open_output()?;
        let peak = self.config.master_volume;
        let output = self.output.as_mut().ok_or(EngineError::ContextClosed)?;
        output.ensure_running()?;

        let recipe = catalog::recipe(id);
        let needed = playback::command_count(recipe);
        if !output.ctx.can_accept(needed) {
            return Err(EngineError::OutputBusy { needed });
        }

        let t0 = output.ctx.current_time();
        let voices = playback::schedule(output.ctx.as_mut(), output.master, recipe, t0, peak);

        debug!(sound = %id, t0, voices = voices.len(), "scheduled sound");
        Ok(Some(Playback { event: id, voices }))
    }

    /// Play a sound by its catalog name. Unknown names are a caller bug and
    /// are logged, not played.
    pub fn play_named(&mut self, name: &str) {
        match name.parse::<SoundEventId>() {
            Ok(id) => self.play(id),
            Err(e) => error!("{e}"),
        }
    }

    /// Set the stored level (clamped into [0, 1]) and persist it. While muted
    /// the output stays silent.
    pub fn set_volume(&mut self, level: f32) {
        if level.is_nan() {
            warn!("ignoring NaN volume");
            return;
        }
        self.config.master_volume = level.clamp(0.0, 1.0);
        self.apply_master();
        self.persist();
    }

    pub fn volume(&self) -> f32 {
        self.config.master_volume
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.config.muted = muted;
        self.apply_master();
        self.persist();
    }

    pub fn is_muted(&self) -> bool {
        self.config.muted
    }

    /// Flip the mute flag and return the new state.
    pub fn toggle_muted(&mut self) -> bool {
        self.set_muted(!self.config.muted);
        self.config.muted
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Sample rate of the open context, if any.
    pub fn sample_rate(&self) -> Option<f32> {
        self.output.as_ref().map(|o| o.ctx.sample_rate())
    }

    /// Current context time, if a context is open.
    pub fn current_time(&self) -> Option<f64> {
        self.output.as_ref().map(|o| o.ctx.current_time())
    }

    /// Close the output context. A later `play` or `initialize` opens a new
    /// one.
    pub fn dispose(&mut self) {
        self.unsupported = false;
        if let Some(mut output) = self.output.take() {
            output.ctx.close();
            info!("sound engine disposed");
        }
    }

    fn apply_master(&mut self) {
        let level = self.config.effective_level();
        if let Some(output) = self.output.as_mut() {
            output.master.set_level(output.ctx.as_mut(), level);
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            warn!("continuing with unsaved sound settings: {e}");
        }
    }

    fn try_persist(&mut self) -> Result<(), EngineError> {
        self.config.save(self.store.as_mut())?;
        Ok(())
    }
}
