use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Periodic Oscillator
===================

A phase accumulator: `phase` walks from 0.0 to 1.0 once per cycle and each
waveform is a pure function of that phase.

  phase += frequency / sample_rate      (wrapped back into [0, 1))

  Sine      sin(2π · phase)
  Square    +1 for the first half cycle, -1 for the second
  Sawtooth  2 · phase - 1               (ramps -1 → +1, then drops)
  Triangle  4 · |phase - 0.5| - 1       (starts at +1, dips to -1 mid-cycle)

These are the naive (non band-limited) shapes and alias above a few kHz.

Frequency is passed per sample rather than stored so an automated frequency
parameter can drive the oscillator without extra plumbing.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveformKind {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl WaveformKind {
    pub fn name(&self) -> &'static str {
        match self {
            WaveformKind::Sine => "sine",
            WaveformKind::Square => "square",
            WaveformKind::Sawtooth => "sawtooth",
            WaveformKind::Triangle => "triangle",
        }
    }

    /// Evaluate the waveform at `phase` in [0, 1).
    #[inline]
    pub fn sample(&self, phase: f32) -> f32 {
        match self {
            WaveformKind::Sine => (TAU * phase).sin(),
            WaveformKind::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            WaveformKind::Sawtooth => 2.0 * phase - 1.0,
            WaveformKind::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
        }
    }
}

pub struct OscillatorBlock {
    waveform: WaveformKind,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: WaveformKind) -> Self {
        Self { waveform, phase: 0.0 }
    }

    pub fn waveform(&self) -> WaveformKind {
        self.waveform
    }

    /// Restart the cycle; called when the owning source starts.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let value = self.waveform.sample(self.phase);
        self.phase += frequency / sample_rate;
        self.phase -= self.phase.floor();
        value
    }

    /// Fill `out` at a constant frequency.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let freq = 440.0;
        let mut osc = OscillatorBlock::new(WaveformKind::Sine);

        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, freq, sample_rate);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * freq * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn square_flips_each_half_cycle() {
        // 100 Hz at 1 kHz: 10 samples per cycle
        let mut osc = OscillatorBlock::new(WaveformKind::Square);
        let mut buffer = vec![0.0f32; 10];
        osc.render(&mut buffer, 100.0, 1_000.0);

        assert!(buffer[..5].iter().all(|&s| s == 1.0));
        assert!(buffer[5..].iter().all(|&s| s == -1.0));
    }

    #[test]
    fn shapes_stay_in_unit_range() {
        for waveform in [
            WaveformKind::Sine,
            WaveformKind::Square,
            WaveformKind::Sawtooth,
            WaveformKind::Triangle,
        ] {
            let mut osc = OscillatorBlock::new(waveform);
            let mut buffer = vec![0.0f32; 1024];
            osc.render(&mut buffer, 1_234.5, 44_100.0);
            assert!(
                buffer.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{} left [-1, 1]",
                waveform.name()
            );
        }
    }

    #[test]
    fn reset_restarts_the_cycle() {
        let mut osc = OscillatorBlock::new(WaveformKind::Sawtooth);
        let first = osc.next_sample(440.0, 48_000.0);
        osc.next_sample(440.0, 48_000.0);
        osc.reset();
        assert_eq!(osc.next_sample(440.0, 48_000.0), first);
    }
}
