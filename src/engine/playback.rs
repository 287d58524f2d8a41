use crate::{
    catalog::{FilterSpec, SoundEventId, SoundRecipe, Strategy},
    dsp::{apply_envelope, envelope::BREAKPOINTS, EnvelopeParams, WaveformKind},
    graph::{make_filter, make_gain, make_noise, make_oscillator, GainHandle, NodeId, SourceHandle},
    host::AudioContext,
};

/*
Playback
========

One `play` call turns one recipe into a private set of nodes. Nothing here
outlives the call on the control side: the nodes belong to the context, which
drops them when their source ends.

  Single tone      osc ──→ gain(env) ──→ master
  Melody           osc ──→ gain(env) ──→ master     one chain per note,
                   osc ──→ gain(env) ──→ master     started at t0 + delay
                   ...
  Filtered noise   noise ──→ filter(sweep) ──→ gain(env) ──→ master

Each chain registers its filter and gain for release when the source stops,
so repeated plays never accumulate nodes.

There is no per-sound state on the engine. A `Playback` only remembers when
its voices start and stop, which is enough to answer where it is in

  Idle → Scheduled → Playing → Finished

for any instant on the context clock.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Scheduled,
    Playing,
    Finished,
}

/// One started source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub source: NodeId,
    /// Oscillator pitch; `None` for noise.
    pub frequency: Option<f32>,
    pub start: f64,
    pub stop: f64,
}

/// What a single `play` scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    pub event: SoundEventId,
    pub voices: Vec<Voice>,
}

impl Playback {
    pub fn start(&self) -> Option<f64> {
        self.voices.iter().map(|v| v.start).reduce(f64::min)
    }

    pub fn end(&self) -> Option<f64> {
        self.voices.iter().map(|v| v.stop).reduce(f64::max)
    }

    pub fn state_at(&self, now: f64) -> PlaybackState {
        match (self.start(), self.end()) {
            (Some(start), _) if now < start => PlaybackState::Scheduled,
            (_, Some(end)) if now < end => PlaybackState::Playing,
            (Some(_), Some(_)) => PlaybackState::Finished,
            _ => PlaybackState::Idle,
        }
    }
}

/// Commands [`schedule`] submits for `recipe`.
pub fn command_count(recipe: &SoundRecipe) -> usize {
    // create x2, connect x2, start, stop, release
    const TONE: usize = 7 + BREAKPOINTS;
    // create x3, connect x3, start, stop, release
    const NOISE: usize = 9 + BREAKPOINTS;
    const SWEEP: usize = 2;

    match recipe.strategy() {
        Strategy::Single { .. } => TONE,
        Strategy::Melody { notes } => notes.len() * TONE,
        Strategy::FilteredNoise { filter } if filter.end_frequency.is_some() => NOISE + SWEEP,
        Strategy::FilteredNoise { .. } => NOISE,
    }
}

/// Build and start every node `recipe` needs, feeding `master`, beginning at
/// `t0`. Envelopes peak at `peak`.
pub fn schedule(
    ctx: &mut dyn AudioContext,
    master: GainHandle,
    recipe: &SoundRecipe,
    t0: f64,
    peak: f32,
) -> Vec<Voice> {
    match recipe.strategy() {
        Strategy::Single { frequency } => vec![tone(
            ctx,
            master,
            recipe.waveform,
            frequency,
            &recipe.envelope,
            t0,
            recipe.duration,
            peak,
        )],
        Strategy::Melody { notes } => notes
            .iter()
            .map(|note| {
                tone(
                    ctx,
                    master,
                    recipe.waveform,
                    note.frequency,
                    &recipe.envelope,
                    t0 + note.delay as f64,
                    note.duration,
                    peak,
                )
            })
            .collect(),
        Strategy::FilteredNoise { filter } => vec![filtered_noise(
            ctx,
            master,
            &filter,
            &recipe.envelope,
            t0,
            recipe.duration,
            peak,
        )],
    }
}

#[allow(clippy::too_many_arguments)]
fn tone(
    ctx: &mut dyn AudioContext,
    master: GainHandle,
    waveform: WaveformKind,
    frequency: f32,
    envelope: &EnvelopeParams,
    t0: f64,
    duration: f32,
    peak: f32,
) -> Voice {
    let osc = make_oscillator(ctx, waveform, frequency);
    let gain = make_gain(ctx, 0.0);
    ctx.connect(osc.node(), gain.node());
    ctx.connect(gain.node(), master.node());

    apply_envelope(ctx, gain, envelope, t0, duration, peak);

    let stop = t0 + duration as f64;
    osc.start(ctx, t0);
    osc.stop(ctx, stop);
    osc.release_on_end(ctx, &[gain.node()]);

    Voice {
        source: osc.node(),
        frequency: Some(frequency),
        start: t0,
        stop,
    }
}

fn filtered_noise(
    ctx: &mut dyn AudioContext,
    master: GainHandle,
    spec: &FilterSpec,
    envelope: &EnvelopeParams,
    t0: f64,
    duration: f32,
    peak: f32,
) -> Voice {
    let stop = t0 + duration as f64;

    let noise = make_noise(ctx, duration);
    let filter = make_filter(ctx, spec.kind, spec.start_frequency, spec.q);
    if let Some(end_frequency) = spec.end_frequency {
        filter.sweep(ctx, spec.start_frequency, end_frequency, t0, stop);
    }
    let gain = make_gain(ctx, 0.0);

    ctx.connect(noise.node(), filter.node());
    ctx.connect(filter.node(), gain.node());
    ctx.connect(gain.node(), master.node());

    apply_envelope(ctx, gain, envelope, t0, duration, peak);

    noise.start(ctx, t0);
    noise.stop(ctx, stop);
    noise.release_on_end(ctx, &[filter.node(), gain.node()]);

    Voice {
        source: noise.node(),
        frequency: None,
        start: t0,
        stop,
    }
}
