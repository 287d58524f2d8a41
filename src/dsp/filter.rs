use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type              | passes          | rejects      |
| ----------------- | --------------- | ------------ |
| low-pass          | below cutoff    | above cutoff |
| high-pass         | above cutoff    | below cutoff |
| band-pass         | around cutoff   | both sides   |
| notch / band-stop | outside         | around       |

Topology-preserving-transform state-variable filter. All four responses fall
out of the same two integrators; `filter_type` only picks which tap we read.

Resonance is expressed as Q (the Web-Audio-style knob recipes are written
in). The SVF wants a damping factor instead:

    k = 1 / Q

Q = 0.707 is the flat Butterworth response, Q = 1 gives a slight bump at the
cutoff, large Q rings. Q is floored so k stays finite.
*/

const MIN_Q: f32 = 0.025;
/// Fraction of Nyquist the cutoff may reach before the prewarp blows up.
const MAX_CUTOFF_RATIO: f32 = 0.49;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q,
            filter_type,
        }
    }

    #[inline]
    fn compute_g(cutoff_hz: f32, sample_rate: f32) -> f32 {
        let cutoff = cutoff_hz.clamp(1.0, sample_rate * MAX_CUTOFF_RATIO);
        (TAU * cutoff / (2.0 * sample_rate)).tan()
    }

    #[inline]
    fn damping(&self) -> f32 {
        1.0 / self.q.max(MIN_Q)
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    /// Filter one sample with the cutoff given for this instant.
    ///
    /// Used when the cutoff is automated and may change every sample.
    #[inline]
    pub fn process(&mut self, sample: f32, cutoff_hz: f32, sample_rate: f32) -> f32 {
        self.cutoff_hz = cutoff_hz;
        let g = Self::compute_g(cutoff_hz, sample_rate);
        let k = self.damping();
        let outputs = self.next_sample(sample, k, g);
        self.select(outputs)
    }

    /// Filter a block in place at the current fixed cutoff.
    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        let g = Self::compute_g(self.cutoff_hz, sample_rate);
        let k = self.damping();

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);
            *sample = self.select(outputs);
        }
    }

    #[inline]
    fn select(&self, outputs: FilterOutputs) -> f32 {
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass,
            FilterType::Notch => outputs.notch,
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::{OscillatorBlock, WaveformKind};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        let mut osc = OscillatorBlock::new(WaveformKind::Sine);
        let mut buffer = vec![0.0f32; len];
        osc.render(&mut buffer, freq, SAMPLE_RATE);
        buffer
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(32);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = SVFilter::new(FilterType::LowPass, 500.0, 1.0);
        let mut buffer = vec![1.0; 512];
        filter.render(&mut buffer, SAMPLE_RATE);
        assert!(buffer[511] > 0.99);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut filter = SVFilter::new(FilterType::HighPass, 500.0, 1.0);
        let mut buffer = vec![1.0; 512];
        filter.render(&mut buffer, SAMPLE_RATE);
        assert!(buffer[511].abs() < 0.01);
    }

    #[test]
    fn lowpass_attenuates_high_frequencies() {
        let mut filter = SVFilter::new(FilterType::LowPass, 500.0, 1.0);
        let mut buffer = sine(5_000.0, 512);
        filter.render(&mut buffer, SAMPLE_RATE);

        let peak = peak_after_transient(&buffer);
        assert!(peak < 0.3, "expected attenuation, got peak {peak}");
    }

    #[test]
    fn bandpass_emphasizes_cutoff_frequency() {
        let cutoff = 1_000.0;
        let mut filter = SVFilter::new(FilterType::BandPass, cutoff, 2.0);

        let mut on = sine(cutoff, 1024);
        filter.render(&mut on, SAMPLE_RATE);
        let on_peak = peak_after_transient(&on);

        filter.reset();
        let mut off = sine(150.0, 1024);
        filter.render(&mut off, SAMPLE_RATE);
        let off_peak = peak_after_transient(&off);

        assert!(
            on_peak > off_peak * 2.0,
            "on_peak={on_peak}, off_peak={off_peak}"
        );
    }

    #[test]
    fn higher_q_rings_louder_at_cutoff() {
        let cutoff = 1_000.0;

        let mut gentle = SVFilter::new(FilterType::LowPass, cutoff, 0.5);
        let mut buffer = sine(cutoff, 1024);
        gentle.render(&mut buffer, SAMPLE_RATE);
        let gentle_peak = peak_after_transient(&buffer);

        let mut resonant = SVFilter::new(FilterType::LowPass, cutoff, 4.0);
        let mut buffer = sine(cutoff, 1024);
        resonant.render(&mut buffer, SAMPLE_RATE);
        let resonant_peak = peak_after_transient(&buffer);

        assert!(
            resonant_peak > gentle_peak * 1.5,
            "resonant={resonant_peak}, gentle={gentle_peak}"
        );
    }

    #[test]
    fn per_sample_cutoff_matches_block_render() {
        let mut block = SVFilter::new(FilterType::LowPass, 800.0, 1.0);
        let mut expected = sine(3_000.0, 256);
        block.render(&mut expected, SAMPLE_RATE);

        let mut stepped = SVFilter::new(FilterType::LowPass, 800.0, 1.0);
        let actual: Vec<f32> = sine(3_000.0, 256)
            .into_iter()
            .map(|s| stepped.process(s, 800.0, SAMPLE_RATE))
            .collect();

        for (a, e) in actual.iter().zip(&expected) {
            assert!((a - e).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_q_and_extreme_cutoff_stay_finite() {
        let mut filter = SVFilter::new(FilterType::Notch, 1_000.0, 0.0);
        let mut buffer = sine(440.0, 256);
        for sample in buffer.iter_mut() {
            *sample = filter.process(*sample, 90_000.0, SAMPLE_RATE);
        }
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
