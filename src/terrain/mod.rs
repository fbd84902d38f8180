/// Cave terrain and its compiled point-location index
///
/// A terrain document describes open space as polygonal cells around point
/// or segment sites. Cell edges become the boundary segments of a
/// trapezoidal map; each segment carries the cells on its two sides so a
/// located point can be traced back to its cell and site.

mod document;
mod index;

pub use document::{nearest_point_on_segment, Cell, Site, TerrainDocument};
pub use index::{boundary_edges, CellPair, TerrainConfig, TerrainIndex};

use crate::trapezoidal_map::MapError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    #[error("Vertex index {index} out of range ({vertex_count} vertices)")]
    VertexIndex { index: u32, vertex_count: usize },

    #[error("Vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: u32 },

    #[error("Cell {cell} refers to missing site {site}")]
    SiteIndex { cell: u32, site: u32 },

    #[error("Cell {cell} has {count} vertices, at least 3 are required")]
    TooFewVertices { cell: u32, count: usize },

    #[error("Boundary segments rejected: {0}")]
    Map(#[from] MapError),
}
