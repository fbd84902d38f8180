// Point location: search DAG walk vs compiled machine, plus one solver step.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cavern_water::{Bounds, FluidParams, FluidSolver, MapBuilder, PointLocationMachine, SegmentInput, TrapezoidalMap};

const RING_SIZES: &[usize] = &[16, 128, 1024];

/// Regular polygon around (512, 512) with `n` edges.
fn ring(n: usize) -> TrapezoidalMap<u32> {
    let corners: Vec<Vec2> = (0..n)
        .map(|i| {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            Vec2::new(512.0 + 400.0 * a.cos(), 512.0 + 400.0 * a.sin())
        })
        .collect();
    let inputs = (0..n)
        .map(|i| SegmentInput::new(corners[i], corners[(i + 1) % n], i as u32))
        .collect();

    let mut builder = MapBuilder::new(Bounds::new([0.0, 0.0], [1024.0, 1024.0])).unwrap();
    builder.insert_shuffled(inputs, &mut StdRng::seed_from_u64(0)).unwrap();
    builder.freeze()
}

fn queries(count: usize) -> Vec<Vec2> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| Vec2::new(rng.gen_range(0.0..1024.0), rng.gen_range(0.0..1024.0)))
        .collect()
}

fn bench_point_location(c: &mut Criterion) {
    let points = queries(1000);
    let mut group = c.benchmark_group("point_location");

    for &n in RING_SIZES {
        let map = ring(n);
        let machine = PointLocationMachine::new(&map);

        group.bench_with_input(BenchmarkId::new("dag", n), &n, |b, _| {
            b.iter(|| {
                let mut inside = 0;
                for &p in &points {
                    if map.find(black_box(p)).map_or(false, |l| l.is_inside()) {
                        inside += 1;
                    }
                }
                black_box(inside)
            });
        });

        group.bench_with_input(BenchmarkId::new("machine", n), &n, |b, _| {
            b.iter(|| {
                let mut inside = 0;
                for &p in &points {
                    if machine.find(black_box(p)).map_or(false, |l| l.is_inside()) {
                        inside += 1;
                    }
                }
                black_box(inside)
            });
        });
    }

    group.finish();
}

fn bench_solver_step(c: &mut Criterion) {
    let mut solver = FluidSolver::new(FluidParams::default()).unwrap();
    for y in 0..32 {
        for x in 0..32 {
            solver.add_particle(Vec2::new(100.0 + x as f32 * 8.0, 100.0 + y as f32 * 8.0), 1.0, None);
        }
    }

    c.bench_function("solver_step_1024", |b| {
        b.iter(|| {
            solver.update(black_box(0.01));
        });
    });
}

criterion_group!(benches, bench_point_location, bench_solver_step);
criterion_main!(benches);
