pub mod binding; // Presentation-layer facades
pub mod catalog; // The fixed table of UI sounds
pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph; // Declarative node graph and block renderer
pub mod host; // Audio output backends
pub mod store; // Persisted settings

pub use catalog::SoundEventId;
pub use engine::SoundEngine;
pub use error::{EngineError, StoreError};

/// Largest block the renderers process at once.
pub const MAX_BLOCK_SIZE: usize = 2048;
