//! Benchmarks for parameter timeline evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sfx_synth::{dsp::EnvelopeParams, graph::ParamEvent, graph::ParamTimeline};

use crate::BLOCK_SIZES;

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");

    // an envelope's worth of breakpoints
    let mut timeline = ParamTimeline::new(0.0);
    for point in EnvelopeParams::MUSICAL.breakpoints(0.0, 1.0, 0.7) {
        timeline.schedule(if point.ramp {
            ParamEvent::LinearRamp {
                end: point.time,
                value: point.level,
            }
        } else {
            ParamEvent::SetValue {
                time: point.time,
                value: point.level,
            }
        });
    }

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("envelope", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    *sample = timeline.value_at(black_box(i as f64 / 48_000.0 + 0.02));
                }
            })
        });
    }

    group.finish();
}
