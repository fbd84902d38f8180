//! Cavern Water
//!
//! 2D particle water for cave terrain: a double-density relaxation fluid
//! solver over a uniform grid hash, held inside the cave by a soft boundary
//! constraint backed by a trapezoidal-map point-location index.

pub mod config;
pub mod constants;
pub mod constraint;
pub mod error;
pub mod fluid;
pub mod spatial_hash;
pub mod terrain;
pub mod trapezoidal_map;
pub mod water;

pub use config::SimConfig;
pub use constraint::{BoundaryConstraint, PositionConstraint};
pub use error::{SimError, SimResult};
pub use fluid::{CorrectionSource, FluidParams, FluidSolver, OwnerHandle, ParticleId, ParticleOwner, ParticleView};
pub use spatial_hash::{GridHash, Pair};
pub use terrain::{CellPair, TerrainConfig, TerrainDocument, TerrainError, TerrainIndex};
pub use trapezoidal_map::{
    Bounds, Location, MapBuilder, MapError, Point, PointLocationMachine, SegmentInput, TrapezoidalMap,
};
pub use water::Water;
