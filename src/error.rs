//! Error types shared across the crate.
//!
//! None of these ever reach the presentation layer: the engine's public
//! methods log them and fall back to silence. They are returned from the
//! internal helpers (and from [`SoundEngine::try_play`]) so the failure paths
//! stay visible and testable.
//!
//! [`SoundEngine::try_play`]: crate::engine::SoundEngine::try_play

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The host has no usable audio output.
    #[error("no audio output available: {0}")]
    UnsupportedPlatform(String),

    /// The output context exists but is suspended and could not be resumed.
    #[error("audio context is suspended: {0}")]
    ContextSuspended(String),

    /// The output context was closed underneath the engine.
    #[error("audio context is closed")]
    ContextClosed,

    /// The output cannot queue a whole sound right now; nothing was sent.
    #[error("audio output is busy, {needed} commands would not fit")]
    OutputBusy { needed: usize },

    /// A sound name did not resolve to a catalog entry.
    #[error("no sound recipe named `{0}`")]
    CatalogMiss(String),

    /// Reading or writing the persisted configuration failed.
    #[error("settings persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),

    /// The backing storage cannot be used at all (no config directory,
    /// poisoned lock, ...).
    #[error("settings storage unavailable: {0}")]
    Unavailable(String),
}
