/// Planar point location over boundary segments
///
/// A trapezoidal decomposition of a bounding box, built by randomized
/// incremental insertion of non-crossing segments:
/// - `MapBuilder` inserts segments and owns the mutable search DAG
/// - `TrapezoidalMap` is the frozen result, with winding scores assigned
/// - `PointLocationMachine` is the DAG compiled into a flat instruction array
///
/// Coordinates use screen orientation (y grows downwards); "above" means a
/// smaller y.

mod arena;
mod builder;
mod error;
mod geometry;
mod machine;
mod map;
mod winding;

pub use builder::{MapBuilder, SegmentInput};
pub use error::{MapError, MapResult};
pub use geometry::{Bounds, Point, SegmentGeometry};
pub use machine::{Instruction, PointLocationMachine, TrapezoidRecord};
pub use map::{Location, TrapezoidOutline, TrapezoidalMap};
