//! Terrain compilation into the point-location index.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::document::TerrainDocument;
use super::TerrainError;
use crate::constants::defaults;
use crate::trapezoidal_map::{Bounds, MapBuilder, PointLocationMachine, SegmentInput, TrapezoidalMap};

/// Cells on either side of a boundary segment.
///
/// `lower` is the cell below the segment (larger y), `upper` the cell above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellPair {
    pub upper: Option<u32>,
    pub lower: Option<u32>,
}

/// Where the terrain index lives and how it is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub map_min: Vec2,
    pub map_max: Vec2,
    /// Positions are clamped into this box before point location
    pub clamp_min: Vec2,
    pub clamp_max: Vec2,
    pub shuffle_seed: u64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            map_min: Vec2::from(defaults::MAP_MIN),
            map_max: Vec2::from(defaults::MAP_MAX),
            clamp_min: Vec2::from(defaults::CLAMP_MIN),
            clamp_max: Vec2::from(defaults::CLAMP_MAX),
            shuffle_seed: defaults::SHUFFLE_SEED,
        }
    }
}

impl TerrainConfig {
    pub fn map_bounds(&self) -> Bounds {
        Bounds::new(self.map_min, self.map_max)
    }

    pub fn clamp_bounds(&self) -> Bounds {
        Bounds::new(self.clamp_min, self.clamp_max)
    }
}

/// Undirected boundary edges of every cell, each tagged with the cells on
/// its two sides. Shared edges appear once, sorted by vertex indices.
pub fn boundary_edges(doc: &TerrainDocument) -> Vec<((u32, u32), CellPair)> {
    let mut edges: FxHashMap<(u32, u32), CellPair> = FxHashMap::default();

    for (i, cell) in doc.cells.iter().enumerate() {
        let n = cell.vertices.len();
        for j in 0..n {
            let i0 = cell.vertices[j];
            let i1 = cell.vertices[(j + 1) % n];
            let (Some(v0), Some(v1)) = (doc.vertex(i0), doc.vertex(i1)) else {
                continue;
            };

            // edges running right-to-left have the cell above them
            let invert = !lexicographic_less(v0, v1);
            let pair = edges.entry((i0.min(i1), i0.max(i1))).or_default();
            if invert {
                pair.upper = Some(i as u32);
            } else {
                pair.lower = Some(i as u32);
            }
        }
    }

    let mut edges: Vec<_> = edges.into_iter().collect();
    edges.sort_unstable_by_key(|&(key, _)| key);
    edges
}

#[inline]
fn lexicographic_less(a: Vec2, b: Vec2) -> bool {
    a.x < b.x || (a.x == b.x && a.y < b.y)
}

/// Compiled terrain: the document, its trapezoidal map and the flattened
/// point-location machine.
#[derive(Debug, Clone)]
pub struct TerrainIndex {
    document: TerrainDocument,
    map: TrapezoidalMap<CellPair>,
    machine: PointLocationMachine<CellPair>,
    clamp: Bounds,
}

impl TerrainIndex {
    pub fn build(document: TerrainDocument, config: &TerrainConfig) -> Result<Self, TerrainError> {
        document.validate()?;
        let clamp = config.clamp_bounds();
        clamp.validate()?;

        let inputs: Vec<_> = boundary_edges(&document)
            .into_iter()
            .map(|((i0, i1), cells)| {
                SegmentInput::new(document.vertices[i0 as usize], document.vertices[i1 as usize], cells)
            })
            .collect();
        let edge_count = inputs.len();

        let mut builder = MapBuilder::new(config.map_bounds())?;
        let mut rng = StdRng::seed_from_u64(config.shuffle_seed);
        builder.insert_shuffled(inputs, &mut rng)?;

        let map = builder.freeze();
        let machine = PointLocationMachine::new(&map);
        log::info!(
            "[TerrainIndex] {} cells, {} boundary edges, {} trapezoids, {} instructions",
            document.cells.len(),
            edge_count,
            map.trapezoid_count(),
            machine.len()
        );

        Ok(Self {
            document,
            map,
            machine,
            clamp,
        })
    }

    pub fn document(&self) -> &TerrainDocument {
        &self.document
    }

    pub fn map(&self) -> &TrapezoidalMap<CellPair> {
        &self.map
    }

    pub fn machine(&self) -> &PointLocationMachine<CellPair> {
        &self.machine
    }

    pub fn clamp_bounds(&self) -> Bounds {
        self.clamp
    }

    /// Cell containing `position`, read from the segment above the located
    /// trapezoid, or failing that from the segment below it.
    pub fn cell_at(&self, position: Vec2) -> Option<u32> {
        let location = self.machine.find(position)?;
        location.top.lower.or(location.bottom.upper)
    }
}
