use std::time::Duration;

use bevy::math::Vec2;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use lemmings_core::{FeedbackSinks, LevelCatalog, Simulation, SimulationConfig};

const FRAME: Duration = Duration::from_millis(16);

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for agents in [1usize, 16, 64, 256] {
        group.bench_with_input(BenchmarkId::new("agents", agents), &agents, |b, &agents| {
            b.iter_batched(
                || {
                    let mut sim = Simulation::new(
                        SimulationConfig::default(),
                        LevelCatalog::builtin(),
                        FeedbackSinks::silent(),
                    )
                    .expect("default simulation should build");
                    for idx in 0..agents {
                        sim.spawn_agent_at(Vec2::new(20.0 + (idx % 32) as f32 * 20.0, 0.0));
                    }
                    sim
                },
                |mut sim| {
                    for _ in 0..60 {
                        sim.tick(FRAME);
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(tick_benches, bench_tick);
criterion_main!(tick_benches);
