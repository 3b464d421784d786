use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use glam::IVec2;
use ironfront_core::ai::pathing::plan_path;
use ironfront_core::{Direction, GameConfig, Intent, PlayerSlot, Simulation};

fn bench_step_opening(c: &mut Criterion) {
    c.bench_function("step_opening", |b| {
        b.iter_batched(
            || Simulation::new(7),
            |mut sim| {
                for _ in 0..60 {
                    sim.step();
                }
                sim
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_step_busy(c: &mut Criterion) {
    // Two players firing, full enemy cap on the field
    let config = GameConfig {
        two_player: true,
        enemy_spawn_delay: 1,
        ..GameConfig::default()
    };
    let mut sim = Simulation::with_config(config, 7).unwrap();
    sim.set_intent(PlayerSlot::One, Intent::drive(Direction::Up).firing());
    sim.set_intent(PlayerSlot::Two, Intent::drive(Direction::Left).firing());
    for _ in 0..300 {
        sim.step();
    }

    c.bench_function("step_busy", |b| {
        b.iter(|| {
            sim.step();
            black_box(sim.tick())
        });
    });
}

fn bench_plan_path(c: &mut Criterion) {
    let sim = Simulation::new(1);
    let grid = sim.arena().grid();

    c.bench_function("plan_path_across_map", |b| {
        b.iter(|| plan_path(grid, black_box(IVec2::new(20, 20)), black_box(IVec2::new(620, 620))));
    });
}

criterion_group!(benches, bench_step_opening, bench_step_busy, bench_plan_path);
criterion_main!(benches);
