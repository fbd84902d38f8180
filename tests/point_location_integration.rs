//! Point location over a cave outline with an island: winding parity, DAG
//! and machine agreement, and concurrent queries.

use cavern_water::{Bounds, MapBuilder, Point, PointLocationMachine, SegmentInput, TrapezoidalMap};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Outer cave wall (concave) and a rock island inside it
const OUTER: [[f32; 2]; 6] = [
    [100.0, 120.0],
    [880.0, 90.0],
    [910.0, 870.0],
    [520.0, 640.0],
    [130.0, 905.0],
    [60.0, 470.0],
];
const ISLAND: [[f32; 2]; 4] = [[300.0, 310.0], [460.0, 290.0], [480.0, 450.0], [320.0, 470.0]];

fn ring(points: &[[f32; 2]], first_id: u32) -> Vec<SegmentInput<u32>> {
    (0..points.len())
        .map(|i| SegmentInput::new(points[i], points[(i + 1) % points.len()], first_id + i as u32))
        .collect()
}

fn cave(seed: u64) -> TrapezoidalMap<u32> {
    let mut segments = ring(&OUTER, 1);
    segments.extend(ring(&ISLAND, 100));

    let mut builder = MapBuilder::new(Bounds::new([0.0, 0.0], [1024.0, 1024.0])).unwrap();
    builder.insert_shuffled(segments, &mut StdRng::seed_from_u64(seed)).unwrap();
    builder.freeze()
}

#[test]
fn open_space_is_odd_rock_is_even() {
    for seed in 0..5 {
        let map = cave(seed);
        assert_eq!(map.segment_count(), 10);

        for p in [[200.3, 250.7], [700.1, 400.2], [520.4, 300.9], [250.2, 760.6]] {
            let found = map.find(p).unwrap();
            assert!(found.is_inside(), "seed {} {:?} score {}", seed, p, found.score);
        }
        for p in [[400.5, 380.5], [30.5, 30.5], [520.5, 800.5], [1000.5, 500.5]] {
            let found = map.find(p).unwrap();
            assert!(!found.is_inside(), "seed {} {:?} score {}", seed, p, found.score);
        }
    }
}

#[test]
fn machine_matches_dag_everywhere() {
    let mut rng = StdRng::seed_from_u64(9);
    for seed in 0..4 {
        let map = cave(seed);
        let machine = PointLocationMachine::new(&map);
        assert!(!machine.is_empty());

        for _ in 0..2000 {
            let p = Point::new(rng.gen_range(0.0..1024.0), rng.gen_range(0.0..1024.0));
            let dag = map.find(p).unwrap();
            let flat = machine.find(p).unwrap();
            assert_eq!(dag.score, flat.score, "seed {} at {}", seed, p);
            assert_eq!(dag.top, flat.top, "seed {} at {}", seed, p);
            assert_eq!(dag.bottom, flat.bottom, "seed {} at {}", seed, p);
            assert_eq!(dag.corners, flat.corners, "seed {} at {}", seed, p);
        }
    }
}

#[test]
fn parity_does_not_depend_on_insertion_order() {
    let reference = cave(0);
    let mut rng = StdRng::seed_from_u64(3);
    let probes: Vec<Point> = (0..500)
        .map(|_| Point::new(rng.gen_range(1.0..1023.0), rng.gen_range(1.0..1023.0)))
        .collect();

    for seed in 1..6 {
        let map = cave(seed);
        for &p in &probes {
            let a = reference.find(p).unwrap();
            let b = map.find(p).unwrap();
            assert_eq!(a.is_inside(), b.is_inside(), "seed {} at {}", seed, p);
        }
    }
}

#[test]
fn frozen_machine_serves_parallel_queries() {
    let map = cave(2);
    let machine = PointLocationMachine::new(&map);

    let probes: Vec<Point> = (0..64)
        .flat_map(|y| (0..64).map(move |x| Point::new(x as f32 * 16.0 + 0.5, y as f32 * 16.0 + 0.5)))
        .collect();

    let sequential: Vec<i32> = probes.iter().map(|&p| machine.find(p).map_or(i32::MIN, |l| l.score)).collect();
    let parallel: Vec<i32> = probes
        .par_iter()
        .map(|&p| machine.find(p).map_or(i32::MIN, |l| l.score))
        .collect();
    assert_eq!(sequential, parallel);
}

#[test]
fn map_inspection() {
    let map = cave(1);
    // exterior scores 0, open space +-1 depending on wall orientation
    assert!(map.lowest_score() <= 0 && 0 <= map.highest_score());
    assert_ne!(map.lowest_score(), map.highest_score());
    assert_eq!(map.trapezoids().count(), map.trapezoid_count());
    assert!(map.node_count() > map.trapezoid_count());

    let mut dot = Vec::new();
    map.write_dot(&mut dot).unwrap();
    let dot = String::from_utf8(dot).unwrap();
    assert!(dot.starts_with("digraph"));
}
