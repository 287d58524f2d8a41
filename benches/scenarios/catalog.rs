//! Render every catalog sound from scheduling to cleanup.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sfx_synth::{host::OfflineHost, store::MemoryStore, SoundEngine, SoundEventId};

pub fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/catalog");
    group.sample_size(20);

    for id in SoundEventId::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(id.name()), &id, |b, &id| {
            let host = OfflineHost::new(48_000.0);
            let renderer = host.renderer();
            let mut engine = SoundEngine::new(Box::new(host), Box::new(MemoryStore::new()));
            engine.initialize().expect("offline host always opens");

            b.iter(|| {
                engine.play(id);
                black_box(renderer.render_until_idle(48_000 * 2));
            })
        });
    }

    group.finish();
}
