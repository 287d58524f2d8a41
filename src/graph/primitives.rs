//! Factories for the raw, unshaped nodes every sound is built from.
//!
//! Each call allocates exactly one node on `ctx` and returns a typed handle.
//! Nothing is connected or started here; wiring and scheduling are the
//! caller's job.

use std::sync::Arc;

use crate::{
    dsp::{noise, FilterType, WaveformKind},
    graph::node::{FilterHandle, GainHandle, NodeSpec, NoiseHandle, OscillatorHandle},
    host::AudioContext,
};

/// Periodic generator of the given shape at a fixed frequency.
///
/// A frequency at or below zero yields an undefined (silent or DC) tone,
/// not an error.
pub fn make_oscillator(
    ctx: &mut dyn AudioContext,
    waveform: WaveformKind,
    frequency: f32,
) -> OscillatorHandle {
    OscillatorHandle(ctx.create_node(NodeSpec::Oscillator {
        waveform,
        frequency,
    }))
}

/// One-shot white-noise source lasting `duration` seconds.
///
/// The buffer is drawn fresh on every call.
pub fn make_noise(ctx: &mut dyn AudioContext, duration: f32) -> NoiseHandle {
    let len = noise::buffer_len(duration, ctx.sample_rate());
    let samples: Arc<[f32]> = noise::white_noise(len).into();
    NoiseHandle(ctx.create_node(NodeSpec::Noise { samples }))
}

/// Frequency-selective stage. Sweeps are scheduled separately through
/// [`FilterHandle::sweep`].
pub fn make_filter(
    ctx: &mut dyn AudioContext,
    kind: FilterType,
    frequency: f32,
    q: f32,
) -> FilterHandle {
    FilterHandle(ctx.create_node(NodeSpec::Filter { kind, frequency, q }))
}

/// Scalar amplitude stage whose level can be automated.
pub fn make_gain(ctx: &mut dyn AudioContext, level: f32) -> GainHandle {
    GainHandle(ctx.create_node(NodeSpec::Gain { level }))
}
