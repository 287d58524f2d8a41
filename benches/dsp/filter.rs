//! Benchmarks for the state-variable filter, fixed and swept.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sfx_synth::dsp::filter::{FilterType, SVFilter};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Fixed cutoff - coefficients computed once per block
        let mut filter = SVFilter::new(FilterType::LowPass, 1000.0, 1.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("fixed", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), SAMPLE_RATE);
            })
        });

        // Swept cutoff - tan() per sample
        let mut filter = SVFilter::new(FilterType::LowPass, 2000.0, 1.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("swept", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let cutoff = 2000.0 * (0.1f32).powf(i as f32 / size as f32);
                    *sample = filter.process(*sample, cutoff, SAMPLE_RATE);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
