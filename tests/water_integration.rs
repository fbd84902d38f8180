//! Water inside a compiled cave: constraint, owners and long-run stability.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cavern_water::terrain::{Cell, Site};
use cavern_water::{
    BoundaryConstraint, FluidParams, ParticleOwner, SimConfig, TerrainConfig, TerrainDocument, TerrainIndex, Water,
};
use glam::Vec2;

/// Square cave (100,100)-(400,400) around a horizontal floor site at y = 250.
fn cave() -> Arc<TerrainIndex> {
    let doc = TerrainDocument {
        vertices: vec![
            Vec2::new(100.0, 100.0),
            Vec2::new(400.0, 100.0),
            Vec2::new(400.0, 400.0),
            Vec2::new(100.0, 400.0),
            Vec2::new(150.0, 250.0),
            Vec2::new(350.0, 250.0),
        ],
        sites: vec![Site::Segment { p0: 4, p1: 5 }],
        cells: vec![Cell {
            site: 0,
            vertices: vec![0, 1, 2, 3],
        }],
    };
    Arc::new(TerrainIndex::build(doc, &TerrainConfig::default()).unwrap())
}

fn positions(water: &Water) -> Vec<Vec2> {
    let mut out = Vec::new();
    water.foreach(|p| out.push(p.position));
    out
}

struct Bucket {
    alive: AtomicBool,
}

impl ParticleOwner for Bucket {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }
}

#[test]
fn particle_on_the_site_stays_put() {
    let params = FluidParams {
        damping: 1.0,
        ..FluidParams::default()
    };
    let mut water = Water::new(params).unwrap();
    water.set_constraint(Box::new(BoundaryConstraint::new(cave())));
    water.add_particle(Vec2::new(200.0, 250.0), 1.0, None);

    for _ in 0..10 {
        water.update();
    }
    assert_eq!(positions(&water), vec![Vec2::new(200.0, 250.0)]);
}

#[test]
fn constrained_block_stays_in_the_clamp_box() {
    let config = SimConfig::from_toml_str("[fluid]\ngravity = [0.0, 9800.0]\n").unwrap();
    let mut water = Water::new(config.fluid).unwrap();
    water.set_constraint(Box::new(BoundaryConstraint::new(cave())));

    for y in 0..10 {
        for x in 0..10 {
            water.add_particle(Vec2::new(180.0 + x as f32 * 8.0, 120.0 + y as f32 * 8.0), 1.0, None);
        }
    }

    for _ in 0..200 {
        water.update();
    }

    assert_eq!(water.len(), 100);
    assert_eq!(water.steps(), 200);
    for p in positions(&water) {
        assert!(p.is_finite(), "{}", p);
        // positions round-trip through the solver's normalized units
        assert!((0.99..=511.01).contains(&p.x) && (0.99..=511.01).contains(&p.y), "{}", p);
    }
}

#[test]
fn constraint_pulls_water_towards_the_site() {
    let params = FluidParams {
        damping: 0.5,
        ..FluidParams::default()
    };
    let mut water = Water::new(params).unwrap();
    water.set_constraint(Box::new(BoundaryConstraint::new(cave())));
    water.add_particle(Vec2::new(250.0, 130.0), 1.0, None);

    let start = (positions(&water)[0].y - 250.0).abs();
    for _ in 0..5 {
        water.update();
    }
    let end = (positions(&water)[0].y - 250.0).abs();
    assert!(end < start * 0.5, "start {} end {}", start, end);
}

#[test]
fn dead_owner_particles_leave_after_the_step() {
    let bucket = Arc::new(Bucket {
        alive: AtomicBool::new(true),
    });
    let mut water = Water::new(FluidParams::default()).unwrap();
    for i in 0..5 {
        water.add_particle(Vec2::new(100.0 + i as f32 * 30.0, 100.0), 1.0, Some(bucket.clone()));
    }
    water.add_particle(Vec2::new(300.0, 300.0), 1.0, None);

    water.update();
    assert_eq!(water.len(), 6);

    bucket.alive.store(false, Ordering::Relaxed);
    water.update();
    assert_eq!(water.len(), 1);
    assert!(water.pick(Vec2::new(300.0, 300.0), 1.0).is_some());
}
