/// Headless water run in a square cave
///
/// Usage: cave_water [config.toml] [steps]
use std::sync::Arc;

use anyhow::Context;
use cavern_water::terrain::{Cell, Site};
use cavern_water::{BoundaryConstraint, SimConfig, TerrainDocument, TerrainIndex, Water};
use glam::Vec2;

/// One cell spanning the whole cave, pulled towards a floor segment.
fn square_cave() -> TerrainDocument {
    TerrainDocument {
        vertices: vec![
            Vec2::new(20.0, 20.0),
            Vec2::new(490.0, 20.0),
            Vec2::new(490.0, 490.0),
            Vec2::new(20.0, 490.0),
            Vec2::new(80.0, 420.0),
            Vec2::new(430.0, 420.0),
        ],
        sites: vec![Site::Segment { p0: 4, p1: 5 }],
        cells: vec![Cell {
            site: 0,
            vertices: vec![0, 1, 2, 3],
        }],
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => SimConfig::default(),
    };
    let steps: u64 = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid step count {:?}", raw))?,
        None => 500,
    };

    let index = TerrainIndex::build(square_cave(), &config.terrain).context("building terrain index")?;
    log::info!(
        "[cave_water] score range {}..{}, {} DAG nodes",
        index.map().lowest_score(),
        index.map().highest_score(),
        index.map().node_count()
    );

    let mut water = Water::new(config.fluid).context("creating water")?;
    water.set_constraint(Box::new(BoundaryConstraint::new(Arc::new(index))));

    for y in 0..12 {
        for x in 0..12 {
            water.add_particle(Vec2::new(150.0 + x as f32 * 8.0, 100.0 + y as f32 * 8.0), 1.0, None);
        }
    }
    log::info!("[cave_water] {} particles, {} steps", water.len(), steps);

    for step in 1..=steps {
        water.update();

        if step % 50 == 0 || step == steps {
            let mut centroid = Vec2::ZERO;
            let mut boundary = 0usize;
            water.foreach(|p| {
                centroid += p.position;
                if p.is_boundary() {
                    boundary += 1;
                }
            });
            centroid /= water.len().max(1) as f32;
            log::info!(
                "[cave_water] step {}: centroid ({:.1}, {:.1}), {} boundary particles, max displacement {:.3}",
                step,
                centroid.x,
                centroid.y,
                boundary,
                water.max_displacement()
            );
        }
    }

    Ok(())
}
