use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::TerrainError;

/// Generator of a terrain cell: every point of the cell is closer to its
/// site than to any other site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Site {
    Point { vertex: u32 },
    Segment { p0: u32, p1: u32 },
}

/// Polygonal region of open space, listed as vertex indices in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub site: u32,
    pub vertices: Vec<u32>,
}

/// Cave terrain: shared vertices, the sites and the cells built around them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainDocument {
    pub vertices: Vec<Vec2>,
    pub sites: Vec<Site>,
    pub cells: Vec<Cell>,
}

impl TerrainDocument {
    /// Checks every index the document carries.
    pub fn validate(&self) -> Result<(), TerrainError> {
        let vertex_count = self.vertices.len();
        let check_vertex = |index: u32| -> Result<(), TerrainError> {
            if (index as usize) < vertex_count {
                Ok(())
            } else {
                Err(TerrainError::VertexIndex { index, vertex_count })
            }
        };

        for (i, v) in self.vertices.iter().enumerate() {
            if !v.is_finite() {
                return Err(TerrainError::NonFiniteVertex { index: i as u32 });
            }
        }

        for site in &self.sites {
            match *site {
                Site::Point { vertex } => check_vertex(vertex)?,
                Site::Segment { p0, p1 } => {
                    check_vertex(p0)?;
                    check_vertex(p1)?;
                }
            }
        }

        for (i, cell) in self.cells.iter().enumerate() {
            let cell_index = i as u32;
            if cell.vertices.len() < 3 {
                return Err(TerrainError::TooFewVertices {
                    cell: cell_index,
                    count: cell.vertices.len(),
                });
            }
            if cell.site as usize >= self.sites.len() {
                return Err(TerrainError::SiteIndex {
                    cell: cell_index,
                    site: cell.site,
                });
            }
            for &index in &cell.vertices {
                check_vertex(index)?;
            }
        }

        Ok(())
    }

    #[inline]
    pub fn vertex(&self, index: u32) -> Option<Vec2> {
        self.vertices.get(index as usize).copied()
    }

    /// Closest point to `q` on the site of `cell`.
    pub fn nearest_on_site(&self, cell: u32, q: Vec2) -> Option<Vec2> {
        let cell = self.cells.get(cell as usize)?;
        match *self.sites.get(cell.site as usize)? {
            Site::Point { vertex } => self.vertex(vertex),
            Site::Segment { p0, p1 } => Some(nearest_point_on_segment(self.vertex(p0)?, self.vertex(p1)?, q)),
        }
    }
}

/// Projection of `q` onto the segment `p0`-`p1`, clamped to its endpoints.
pub fn nearest_point_on_segment(p0: Vec2, p1: Vec2, q: Vec2) -> Vec2 {
    let d = p1 - p0;
    let a = d.length_squared();
    if a == 0.0 {
        return p0;
    }
    let t = (d.dot(q - p0) / a).clamp(0.0, 1.0);
    p0 + d * t
}
