use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Vec2;

use super::*;

fn quiet_params() -> FluidParams {
    FluidParams {
        damping: 1.0,
        gravity: Vec2::ZERO,
        pressure_balance_coefficient: 0.0,
        pressure_repulsive_coefficient: 0.0,
        ..FluidParams::default()
    }
}

fn positions(solver: &FluidSolver) -> Vec<Vec2> {
    solver.iter().map(|p| p.position).collect()
}

/// A square block of resting particles spaced 10 world units apart
fn block(solver: &mut FluidSolver, n: usize) {
    for y in 0..n {
        for x in 0..n {
            solver.add_particle(Vec2::new(200.0 + x as f32 * 10.0, 200.0 + y as f32 * 10.0), 1.0, None);
        }
    }
}

struct Steered {
    alive: AtomicBool,
    push: Vec2,
    max_speed: f32,
}

impl ParticleOwner for Steered {
    fn constrain_velocity(&self, velocity: Vec2) -> Vec2 {
        velocity.clamp_length_max(self.max_speed)
    }

    fn desired_move(&self, _position: Vec2) -> Vec2 {
        self.push
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }
}

#[test]
fn test_resting_pair_without_pressure_keeps_distance() {
    let mut solver = FluidSolver::new(quiet_params()).unwrap();
    solver.add_particle(Vec2::new(100.0, 100.0), 1.0, None);
    solver.add_particle(Vec2::new(125.0, 100.0), 1.0, None);

    solver.update(0.01);

    let p = positions(&solver);
    assert_eq!(p[1].x - p[0].x, 25.0);
    assert_eq!(p[0], Vec2::new(100.0, 100.0));
}

#[test]
fn test_repulsion_separates_close_particles() {
    let params = FluidParams {
        pressure_repulsive_coefficient: 5.0,
        ..quiet_params()
    };
    let mut solver = FluidSolver::new(params).unwrap();
    solver.add_particle(Vec2::new(100.0, 100.0), 1.0, None);
    solver.add_particle(Vec2::new(125.0, 100.0), 1.0, None);

    solver.update(0.01);

    let p = positions(&solver);
    assert!(p[1].distance(p[0]) > 25.0);
    assert!(solver.max_displacement() == 0.0);
}

#[test]
fn test_relaxation_conserves_momentum() {
    let params = FluidParams {
        pressure_balance_coefficient: 0.5,
        pressure_repulsive_coefficient: 5.0,
        ..quiet_params()
    };
    let mut solver = FluidSolver::new(params).unwrap();
    block(&mut solver, 8);

    let before = positions(&solver);
    solver.update(0.01);
    let after = positions(&solver);

    // particles start at rest, so every change comes from relaxation
    let mut drift = [0.0f64; 2];
    let mut travelled = 0.0f64;
    for (a, b) in before.iter().zip(&after) {
        let d = *b - *a;
        drift[0] += d.x as f64;
        drift[1] += d.y as f64;
        travelled += d.length() as f64;
    }
    assert!(travelled > 1.0, "travelled {}", travelled);
    assert!(drift[0].abs() < 0.05 && drift[1].abs() < 0.05, "drift {:?}", drift);
}

#[test]
fn test_block_edges_are_boundary() {
    let mut solver = FluidSolver::new(FluidParams::default()).unwrap();
    block(&mut solver, 7);
    solver.update(0.01);

    let views: Vec<_> = solver.iter().collect();
    // corner particle has the fewest neighbours
    assert!(views[0].is_boundary());
    // the centre of the block is surrounded on every side
    let centre = views[3 * 7 + 3];
    assert!(centre.boundariness > views[0].boundariness);
    assert!(views.iter().all(|v| v.density_plain > 0.0));
}

#[test]
fn test_correction_source_changes_densities() {
    let run = |source| {
        let params = FluidParams {
            correction_source: source,
            ..FluidParams::default()
        };
        let mut solver = FluidSolver::new(params).unwrap();
        block(&mut solver, 6);
        solver.update(0.01);
        solver.iter().map(|p| p.density_balance).collect::<Vec<_>>()
    };
    let boundary = run(CorrectionSource::BoundaryNeighbors);
    let interior = run(CorrectionSource::InteriorNeighbors);
    assert_eq!(boundary.len(), interior.len());
    assert!(boundary.iter().zip(&interior).any(|(a, b)| a != b));
    assert!(boundary.iter().chain(&interior).all(|d| d.is_finite() && *d > 0.0));
}

#[test]
fn test_gravity_accelerates_free_particle() {
    let params = FluidParams {
        gravity: Vec2::new(0.0, 9800.0),
        ..quiet_params()
    };
    let mut solver = FluidSolver::new(params).unwrap();
    solver.add_particle(Vec2::new(300.0, 100.0), 1.0, None);

    solver.update(0.01);
    let first = positions(&solver)[0].y - 100.0;
    solver.update(0.01);
    let second = positions(&solver)[0].y - 100.0 - first;

    assert!(first > 0.0);
    assert!(second > first);
    assert!(solver.max_displacement() > 0.0);
}

#[test]
fn test_owner_steers_and_clamps() {
    let owner = Arc::new(Steered {
        alive: AtomicBool::new(true),
        push: Vec2::new(1.0e6, 0.0),
        max_speed: 100.0,
    });
    let mut solver = FluidSolver::new(quiet_params()).unwrap();
    solver.add_particle(Vec2::new(100.0, 100.0), 1.0, Some(owner.clone()));

    for _ in 0..5 {
        solver.update(0.01);
    }
    let moved = positions(&solver)[0] - Vec2::new(100.0, 100.0);
    assert!(moved.x > 0.0);
    // 100 units/s for five 10ms steps
    assert!(moved.x <= 5.0 + 1e-3, "moved {}", moved.x);
    assert!(moved.y.abs() < 1e-4);
}

#[test]
fn test_dead_owner_particles_are_discarded() {
    let owner = Arc::new(Steered {
        alive: AtomicBool::new(true),
        push: Vec2::ZERO,
        max_speed: 10.0,
    });
    let mut solver = FluidSolver::new(quiet_params()).unwrap();
    solver.add_particle(Vec2::new(10.0, 10.0), 1.0, Some(owner.clone()));
    solver.add_particle(Vec2::new(500.0, 10.0), 1.0, None);

    assert_eq!(solver.discard_dead_owners(), 0);
    owner.alive.store(false, Ordering::Relaxed);
    assert_eq!(solver.discard_dead_owners(), 1);
    assert_eq!(solver.len(), 1);
    assert!(solver.iter().all(|p| p.owner.is_none()));
}

#[test]
fn test_discard_by_predicate() {
    let mut solver = FluidSolver::new(quiet_params()).unwrap();
    block(&mut solver, 3);
    let removed = solver.discard(|p| p.position.x > 205.0);
    assert_eq!(removed, 6);
    assert!(solver.iter().all(|p| p.position.x <= 205.0));
}

#[test]
fn test_constraint_projects_every_particle() {
    let mut solver = FluidSolver::new(quiet_params()).unwrap();
    block(&mut solver, 4);
    solver.constraint(|p| Vec2::new(p.x.min(215.0), p.y));
    assert!(solver.iter().all(|p| p.position.x <= 215.0 + 1e-3));
    assert_eq!(solver.len(), 16);
}

#[test]
fn test_pick_returns_nearest_within_range() {
    let mut solver = FluidSolver::new(quiet_params()).unwrap();
    let a = solver.add_particle(Vec2::new(0.0, 0.0), 1.0, None);
    let b = solver.add_particle(Vec2::new(20.0, 0.0), 1.0, None);

    assert_eq!(solver.pick(Vec2::new(3.0, 0.0), 5.0), Some(a));
    assert_eq!(solver.pick(Vec2::new(18.0, 1.0), 5.0), Some(b));
    assert_eq!(solver.pick(Vec2::new(10.0, 30.0), 5.0), None);
}

#[test]
fn test_tunables_and_bad_input() {
    let mut solver = FluidSolver::new(quiet_params()).unwrap();
    solver.set_ideal_density(9.0);
    solver.set_damping(0.5);
    assert_eq!(solver.ideal_density(), 9.0);
    assert_eq!(solver.damping(), 0.5);

    solver.add_particle(Vec2::new(1.0, 1.0), f32::NAN, None);
    solver.update(-1.0);
    solver.update(0.01);
    assert!(solver.iter().all(|p| p.mass == 1.0 && p.position.is_finite()));

    let bad = FluidParams {
        search_radius: 0.0,
        ..FluidParams::default()
    };
    assert!(FluidSolver::new(bad).is_err());
}
