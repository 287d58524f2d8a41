//! Many sounds at once: the first block of N overlapping clicks and jingles.

use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion};
use sfx_synth::{
    host::{OfflineHost, OfflineRenderer},
    store::MemoryStore,
    SoundEngine, SoundEventId,
};

/// An engine with `plays` sounds scheduled and nothing rendered yet.
fn scheduled(plays: usize) -> (SoundEngine, OfflineRenderer) {
    let host = OfflineHost::new(48_000.0);
    let renderer = host.renderer();
    let mut engine = SoundEngine::new(Box::new(host), Box::new(MemoryStore::new()));

    for i in 0..plays {
        let id = if i % 2 == 0 {
            SoundEventId::ButtonClick
        } else {
            SoundEventId::CorrectAnswer
        };
        engine.play(id);
    }
    (engine, renderer)
}

pub fn bench_overlap(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/overlap");

    for &plays in &[1usize, 8, 32] {
        group.bench_with_input(BenchmarkId::new("plays", plays), &plays, |b, &plays| {
            b.iter_batched(
                || scheduled(plays),
                |(engine, renderer)| {
                    black_box(renderer.render(512));
                    engine
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}
