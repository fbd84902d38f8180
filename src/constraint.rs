//! Position constraints applied to every particle after a solver step.

use std::sync::Arc;

use glam::Vec2;

use crate::terrain::TerrainIndex;

/// Remaps a particle position (world units). Implementations are called from
/// several threads at once and must not keep per-call state.
pub trait PositionConstraint: Send + Sync {
    fn apply(&self, position: Vec2) -> Vec2;
}

impl<F> PositionConstraint for F
where
    F: Fn(Vec2) -> Vec2 + Send + Sync,
{
    fn apply(&self, position: Vec2) -> Vec2 {
        self(position)
    }
}

/// Soft terrain boundary.
///
/// Positions are clamped into the index's clamp box, then pulled halfway
/// towards the nearest point on the site of the cell they fall in. Positions
/// outside every cell are only clamped.
#[derive(Debug, Clone)]
pub struct BoundaryConstraint {
    index: Arc<TerrainIndex>,
}

impl BoundaryConstraint {
    pub fn new(index: Arc<TerrainIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &TerrainIndex {
        &self.index
    }
}

impl PositionConstraint for BoundaryConstraint {
    fn apply(&self, position: Vec2) -> Vec2 {
        let q = self.index.clamp_bounds().clamp(position);

        let target = self
            .index
            .cell_at(q)
            .and_then(|cell| self.index.document().nearest_on_site(cell, q));

        match target {
            Some(target) => q + (target - q) * 0.5,
            None => q,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{Cell, Site, TerrainConfig, TerrainDocument};

    /// One square cell (100,100)-(400,400) around a horizontal segment site.
    fn corridor() -> BoundaryConstraint {
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
        let index = TerrainIndex::build(doc, &TerrainConfig::default()).unwrap();
        BoundaryConstraint::new(Arc::new(index))
    }

    #[test]
    fn test_point_on_site_is_fixed() {
        let constraint = corridor();
        for x in [150.0, 200.0, 250.0, 350.0] {
            let p = Vec2::new(x, 250.0);
            assert_eq!(constraint.apply(p), p);
        }
    }

    #[test]
    fn test_pulls_halfway_to_site() {
        let constraint = corridor();
        assert_eq!(constraint.apply(Vec2::new(200.0, 150.0)), Vec2::new(200.0, 200.0));
        assert_eq!(constraint.apply(Vec2::new(390.0, 350.0)), Vec2::new(370.0, 300.0));
    }

    #[test]
    fn test_outside_cells_only_clamps() {
        let constraint = corridor();
        assert_eq!(constraint.apply(Vec2::new(50.0, 60.0)), Vec2::new(50.0, 60.0));
        assert_eq!(constraint.apply(Vec2::new(-30.0, 700.0)), Vec2::new(1.0, 511.0));
        assert_eq!(constraint.apply(Vec2::new(600.0, 0.0)), Vec2::new(511.0, 1.0));
    }

    #[test]
    fn test_closures_are_constraints() {
        let floor = |p: Vec2| Vec2::new(p.x, p.y.min(10.0));
        let c: &dyn PositionConstraint = &floor;
        assert_eq!(c.apply(Vec2::new(3.0, 20.0)), Vec2::new(3.0, 10.0));
    }
}
