use crate::{
    graph::{node::GainHandle, param::ParamEvent},
    host::AudioContext,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Shaper
====================

Rather than stepping an envelope sample by sample, we describe the whole
amplitude curve up front as automation on a gain parameter. The host clock
then plays it back on the render thread; the control side only schedules.

Vocabulary
----------

  t0        When the sound starts on the context clock (seconds).
  duration  Total length of the sound; the source stops at t0 + duration.
  peak      Level reached at the end of the attack.
  sustain   Fraction of `peak` held between decay and release.


The Shape: Linear Ramps
-----------------------

  Level
   peak ┐     ╱╲
        │    ╱  ╲___________
 peak·S │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        t0  A   D    hold      R  t0+duration

Five breakpoints, applied in order:

  1. set     0          at t0
  2. linear  peak       at t0 + attack
  3. linear  peak·S     at t0 + attack + decay
  4. set     peak·S     at hold_end          (start of release)
  5. linear  0          at release_end


Short Sounds
------------

When duration < attack + decay + release there is no room for the hold. The
naive `t0 + duration - release` would land *before* the decay finishes and
the automation timeline would run backwards. We clamp instead:

  hold_end    = max(t0 + duration - release, decay_end)
  release_end = max(t0 + duration,          hold_end)

Attack and decay always play out in full. The release is shortened to
whatever remains of the duration (down to an instant drop at the decay end
when even attack + decay overrun). Every timestamp is non-decreasing.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    /// Seconds from silence to peak.
    pub attack: f32,
    /// Seconds from peak down to the sustain level.
    pub decay: f32,
    /// Held level as a fraction of peak, in [0, 1].
    pub sustain: f32,
    /// Seconds from the sustain level back to silence.
    pub release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.1,
        }
    }
}

/// Points in every scheduled envelope, and so automation events per gain.
pub const BREAKPOINTS: usize = 5;

/// One point on a scheduled amplitude curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    pub time: f64,
    pub level: f32,
    /// Ramp linearly from the previous point instead of jumping.
    pub ramp: bool,
}

impl EnvelopeParams {
    /// Quick pop (letter reveal).
    pub const POP: Self = Self::adsr(0.01, 0.05, 0.3, 0.04);
    /// Musical note with medium sustain (correct answer jingle).
    pub const MUSICAL: Self = Self::adsr(0.05, 0.1, 0.7, 0.3);
    /// Sharp buzz (wrong answer).
    pub const ERROR: Self = Self::adsr(0.01, 0.1, 0.5, 0.15);
    /// Smooth whoosh (skip).
    pub const WHOOSH: Self = Self::adsr(0.02, 0.05, 0.6, 0.1);
    /// Very short click (buttons, timer tick).
    pub const CLICK: Self = Self::adsr(0.005, 0.01, 0.2, 0.02);
    /// Slow, bright fanfare (win).
    pub const FANFARE: Self = Self::adsr(0.1, 0.2, 0.8, 0.5);

    pub const fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// True when attack, decay and release all fit inside `duration`.
    pub fn fits(&self, duration: f32) -> bool {
        self.attack + self.decay + self.release <= duration
    }

    /// The five breakpoints of the curve starting at `t0`.
    pub fn breakpoints(&self, t0: f64, duration: f32, peak: f32) -> [Breakpoint; BREAKPOINTS] {
        let attack = self.attack.max(0.0) as f64;
        let decay = self.decay.max(0.0) as f64;
        let release = self.release.max(0.0) as f64;
        let duration = duration.max(0.0) as f64;
        let sustain_level = peak * self.sustain.clamp(0.0, 1.0);

        let attack_end = t0 + attack;
        let decay_end = attack_end + decay;
        let hold_end = (t0 + duration - release).max(decay_end);
        let release_end = (t0 + duration).max(hold_end);

        [
            Breakpoint { time: t0, level: 0.0, ramp: false },
            Breakpoint { time: attack_end, level: peak, ramp: true },
            Breakpoint { time: decay_end, level: sustain_level, ramp: true },
            Breakpoint { time: hold_end, level: sustain_level, ramp: false },
            Breakpoint { time: release_end, level: 0.0, ramp: true },
        ]
    }
}

/// Schedule the envelope on `gain` as automation events.
pub fn apply_envelope(
    ctx: &mut dyn AudioContext,
    gain: GainHandle,
    envelope: &EnvelopeParams,
    t0: f64,
    duration: f32,
    peak: f32,
) {
    for point in envelope.breakpoints(t0, duration, peak) {
        let event = if point.ramp {
            ParamEvent::LinearRamp {
                end: point.time,
                value: point.level,
            }
        } else {
            ParamEvent::SetValue {
                time: point.time,
                value: point.level,
            }
        };
        gain.automate(ctx, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn curve_follows_adsr_phases() {
        let env = EnvelopeParams::adsr(0.1, 0.2, 0.5, 0.3);
        let points = env.breakpoints(1.0, 1.0, 0.8);

        assert_close(points[0].time, 1.0);
        assert_eq!(points[0].level, 0.0);
        assert_close(points[1].time, 1.1);
        assert_eq!(points[1].level, 0.8);
        assert_close(points[2].time, 1.3);
        assert!((points[2].level - 0.4).abs() < 1e-6);
        assert_close(points[3].time, 1.7);
        assert!((points[3].level - 0.4).abs() < 1e-6);
        assert_close(points[4].time, 2.0);
        assert_eq!(points[4].level, 0.0);
    }

    #[test]
    fn short_sound_clamps_hold_to_decay_end() {
        // attack + decay + release = 0.1 > 0.05
        let env = EnvelopeParams::POP;
        let points = env.breakpoints(0.0, 0.05, 1.0);

        for pair in points.windows(2) {
            assert!(pair[1].time >= pair[0].time, "timeline ran backwards");
        }
        let decay_end = (env.attack + env.decay) as f64;
        assert_close(points[3].time, decay_end);
        assert_close(points[4].time, decay_end);
        assert!(!env.fits(0.05));
    }

    #[test]
    fn partial_overrun_shortens_release() {
        // attack + decay end at 0.06, release would start at 0.04
        let env = EnvelopeParams::adsr(0.01, 0.05, 0.3, 0.06);
        let points = env.breakpoints(0.0, 0.1, 1.0);

        assert_close(points[3].time, 0.06);
        assert_close(points[4].time, 0.1);
    }

    #[test]
    fn sustain_is_clamped_into_unit_range() {
        let env = EnvelopeParams::adsr(0.0, 0.0, 1.5, 0.0);
        let points = env.breakpoints(0.0, 1.0, 0.5);
        assert_eq!(points[2].level, 0.5);
    }

    #[test]
    fn presets_are_well_formed() {
        for env in [
            EnvelopeParams::POP,
            EnvelopeParams::MUSICAL,
            EnvelopeParams::ERROR,
            EnvelopeParams::WHOOSH,
            EnvelopeParams::CLICK,
            EnvelopeParams::FANFARE,
            EnvelopeParams::default(),
        ] {
            assert!((0.0..=1.0).contains(&env.sustain));
            assert!(env.attack >= 0.0 && env.decay >= 0.0 && env.release >= 0.0);
        }
    }

    #[test]
    fn default_supports_partial_construction() {
        let env = EnvelopeParams {
            attack: 0.2,
            ..EnvelopeParams::default()
        };
        assert_eq!(env.attack, 0.2);
        assert_eq!(env.sustain, 0.7);
    }
}
