use std::cmp::Ordering;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::error::{MapError, MapResult};

/// Immutable 2D coordinate.
///
/// Points are ordered lexicographically (x first, then y). This order is the
/// tie-break used by every vertical split in the map.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.x.partial_cmp(&other.x)? {
            Ordering::Equal => self.y.partial_cmp(&other.y),
            ordering => Some(ordering),
        }
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<[f32; 2]> for Point {
    fn from(a: [f32; 2]) -> Self {
        Self::new(a[0], a[1])
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned box covered by the map. Queries outside it find nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn new(min: impl Into<Point>, max: impl Into<Point>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn validate(&self) -> MapResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(MapError::InvalidBounds { bounds: *self });
        }
        if self.max.x <= self.min.x || self.max.y <= self.min.y {
            return Err(MapError::InvalidBounds { bounds: *self });
        }
        Ok(())
    }

    /// Inclusive containment; NaN coordinates are never contained.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }

    /// Clamp a point into the box.
    pub fn clamp(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            v.x.clamp(self.min.x, self.max.x),
            v.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// Endpoints and line coefficients of a segment.
///
/// Shared verbatim by the DAG and the compiled machine so both evaluate the
/// same arithmetic. The map uses screen orientation: "above" means smaller y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentGeometry {
    /// Lexicographically smaller endpoint
    pub p0: Point,
    /// Lexicographically larger endpoint
    pub p1: Point,
    /// Slope, zero for vertical segments
    pub a: f32,
    /// Intercept, zero for vertical segments
    pub b: f32,
}

impl SegmentGeometry {
    /// `p0` must already be lexicographically smaller than `p1`.
    pub fn new(p0: Point, p1: Point) -> Self {
        let (a, b) = if p0.x != p1.x {
            let a = (p1.y - p0.y) / (p1.x - p0.x);
            (a, p0.y - a * p0.x)
        } else {
            (0.0, 0.0)
        };
        Self { p0, p1, a, b }
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.p0.x == self.p1.x
    }

    /// Line height at `x`. Endpoints are returned exactly; vertical
    /// segments report their lower endpoint.
    #[inline]
    pub fn y_at(&self, x: f32) -> f32 {
        if x == self.p0.x {
            self.p0.y
        } else if x == self.p1.x {
            self.p1.y
        } else {
            self.a * x + self.b
        }
    }

    /// Whether `p` lies strictly above the segment.
    ///
    /// A point on a vertical segment counts as above it unless it sits at or
    /// past the far endpoint.
    #[inline]
    pub fn is_point_above(&self, p: Point) -> bool {
        if self.is_vertical() {
            p.y < self.p1.y
        } else {
            p.y < self.y_at(p.x)
        }
    }
}

/// A boundary edge stored in the map.
#[derive(Debug, Clone, Copy)]
pub struct Segment<P> {
    pub geometry: SegmentGeometry,
    /// The caller supplied the endpoints right-to-left
    pub swapped: bool,
    /// Bounding-box edges are not borders and never change the winding score
    pub border: bool,
    pub property: P,
}

impl<P: Copy> Segment<P> {
    /// Orders the endpoints lexicographically, remembering whether they
    /// had to be swapped.
    pub fn new(p0: Point, p1: Point, border: bool, property: P) -> MapResult<Self> {
        if !p0.is_finite() || !p1.is_finite() {
            return Err(MapError::NonFinite { p0, p1 });
        }
        if p0 == p1 {
            return Err(MapError::DegenerateSegment { point: p0 });
        }

        let swapped = p1 < p0;
        let (p0, p1) = if swapped { (p1, p0) } else { (p0, p1) };
        Ok(Self {
            geometry: SegmentGeometry::new(p0, p1),
            swapped,
            border,
            property,
        })
    }

    #[inline]
    pub fn p0(&self) -> Point {
        self.geometry.p0
    }

    #[inline]
    pub fn p1(&self) -> Point {
        self.geometry.p1
    }

    /// Routing test used while inserting `other`: does `other` start above
    /// this segment?
    ///
    /// Fails when the two segments overlap or cross, which the
    /// decomposition cannot represent.
    pub fn is_segment_above(&self, other: &SegmentGeometry) -> MapResult<bool> {
        let own = &self.geometry;
        if own.is_vertical() {
            if other.is_vertical() {
                if other.p1.y <= own.p0.y {
                    return Ok(true);
                }
                if own.p1.y <= other.p0.y {
                    return Ok(false);
                }
                return Err(MapError::OverlappingSegments {
                    existing: (own.p0, own.p1),
                    inserted: (other.p0, other.p1),
                });
            }
            if other.p0.y <= own.p0.y {
                return Ok(true);
            }
            if own.p1.y <= other.p0.y {
                return Ok(false);
            }
            return Err(MapError::IntersectingSegments {
                existing: (own.p0, own.p1),
                inserted: (other.p0, other.p1),
            });
        }

        if other.is_vertical() {
            let y = own.y_at(other.p0.x);
            if other.p1.y <= y {
                return Ok(true);
            }
            if y <= other.p0.y {
                return Ok(false);
            }
            return Err(MapError::IntersectingSegments {
                existing: (own.p0, own.p1),
                inserted: (other.p0, other.p1),
            });
        }

        if own.p0 == other.p0 {
            if own.a == other.a {
                return Err(MapError::OverlappingSegments {
                    existing: (own.p0, own.p1),
                    inserted: (other.p0, other.p1),
                });
            }
            return Ok(other.a < own.a);
        }
        Ok(other.p0.y < own.y_at(other.p0.x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_order_is_lexicographic() {
        assert!(Point::new(0.0, 5.0) < Point::new(1.0, 0.0));
        assert!(Point::new(1.0, 0.0) < Point::new(1.0, 0.5));
        assert!(!(Point::new(1.0, 0.5) < Point::new(1.0, 0.5)));
    }

    #[test]
    fn test_segment_endpoints_are_ordered() {
        let s = Segment::new(Point::new(4.0, 1.0), Point::new(0.0, 1.0), true, ()).unwrap();
        assert!(s.swapped);
        assert_eq!(s.p0(), Point::new(0.0, 1.0));
        assert_eq!(s.p1(), Point::new(4.0, 1.0));

        let v = Segment::new(Point::new(2.0, 0.0), Point::new(2.0, 3.0), true, ()).unwrap();
        assert!(!v.swapped);
        assert!(v.geometry.is_vertical());
    }

    #[test]
    fn test_zero_length_segment_is_rejected() {
        let p = Point::new(3.0, 3.0);
        assert!(matches!(
            Segment::new(p, p, true, ()),
            Err(MapError::DegenerateSegment { .. })
        ));
        assert!(matches!(
            Segment::new(p, Point::new(f32::NAN, 0.0), true, ()),
            Err(MapError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_y_at_returns_exact_endpoints() {
        let g = SegmentGeometry::new(Point::new(0.1, 0.3), Point::new(0.7, 0.9));
        assert_eq!(g.y_at(0.1), 0.3);
        assert_eq!(g.y_at(0.7), 0.9);
        assert!((g.y_at(0.4) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_point_above_uses_screen_orientation() {
        let g = SegmentGeometry::new(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        assert!(g.is_point_above(Point::new(3.0, 1.0)));
        assert!(!g.is_point_above(Point::new(3.0, 9.0)));
        assert!(!g.is_point_above(Point::new(3.0, 5.0)));
    }

    #[test]
    fn test_crossing_vertical_segment_is_reported() {
        let s = Segment::new(Point::new(0.0, 5.0), Point::new(10.0, 5.0), true, ()).unwrap();
        let crossing = SegmentGeometry::new(Point::new(5.0, 0.0), Point::new(5.0, 10.0));
        assert!(matches!(
            s.is_segment_above(&crossing),
            Err(MapError::IntersectingSegments { .. })
        ));
    }

    #[test]
    fn test_shared_left_endpoint_orders_by_slope() {
        let s = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0), true, ()).unwrap();
        let flatter = SegmentGeometry::new(Point::new(0.0, 0.0), Point::new(10.0, 2.0));
        assert_eq!(s.is_segment_above(&flatter).unwrap(), true);
        let steeper = SegmentGeometry::new(Point::new(0.0, 0.0), Point::new(2.0, 10.0));
        assert_eq!(s.is_segment_above(&steeper).unwrap(), false);
    }
}
