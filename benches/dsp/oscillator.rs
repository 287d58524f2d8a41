//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sfx_synth::dsp::oscillator::{OscillatorBlock, WaveformKind};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for waveform in [
            WaveformKind::Sine,
            WaveformKind::Square,
            WaveformKind::Sawtooth,
            WaveformKind::Triangle,
        ] {
            let mut osc = OscillatorBlock::new(waveform);
            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), black_box(440.0), 48_000.0);
                })
            });
        }
    }

    group.finish();
}
