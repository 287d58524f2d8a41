//! Low-level DSP used by the render graph.
//!
//! The kernels here know nothing about scheduling: oscillators and filters
//! take their (possibly automated) frequency per sample, and the envelope
//! module turns ADSR parameters into automation breakpoints.

/// ADSR parameters, presets and the envelope shaper.
pub mod envelope;
/// State-variable filter with multiple responses.
pub mod filter;
/// White-noise buffer generation.
pub mod noise;
/// Periodic waveforms.
pub mod oscillator;

pub use envelope::{apply_envelope, EnvelopeParams};
pub use filter::FilterType;
pub use oscillator::WaveformKind;
