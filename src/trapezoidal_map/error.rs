/// Point-location index error handling
///
/// Invalid or adversarial geometry is reported here instead of tripping an
/// assertion halfway through an insertion. Every check runs before the map
/// is mutated, so a failed insertion leaves the map unchanged.

use super::geometry::{Bounds, Point};

/// Map-specific result type
pub type MapResult<T> = Result<T, MapError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("Invalid bounding box: {bounds:?}")]
    InvalidBounds { bounds: Bounds },

    #[error("Segment has a non-finite endpoint: {p0} - {p1}")]
    NonFinite { p0: Point, p1: Point },

    #[error("Zero-length segment at {point}")]
    DegenerateSegment { point: Point },

    #[error("Segment {p0} - {p1} leaves the bounding box")]
    OutOfBounds { p0: Point, p1: Point },

    #[error("Segment {}-{} overlaps existing segment {}-{}", inserted.0, inserted.1, existing.0, existing.1)]
    OverlappingSegments {
        existing: (Point, Point),
        inserted: (Point, Point),
    },

    #[error("Segment {}-{} intersects existing segment {}-{}", inserted.0, inserted.1, existing.0, existing.1)]
    IntersectingSegments {
        existing: (Point, Point),
        inserted: (Point, Point),
    },

    #[error("Segment {p0} - {p1} crosses another segment while walking the map")]
    BrokenWalk { p0: Point, p1: Point },
}
