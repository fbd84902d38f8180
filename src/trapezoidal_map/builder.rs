//! Randomized incremental construction of the trapezoidal map.

use rand::seq::SliceRandom;
use rand::Rng;

use super::arena::{Arena, Node, NodeId, SegmentId, TrapezoidId};
use super::error::{MapError, MapResult};
use super::geometry::{Bounds, Point, Segment};
use super::map::TrapezoidalMap;

/// A segment waiting to be inserted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentInput<P> {
    pub p0: Point,
    pub p1: Point,
    pub border: bool,
    pub property: P,
}

impl<P> SegmentInput<P> {
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>, property: P) -> Self {
        Self {
            p0: p0.into(),
            p1: p1.into(),
            border: true,
            property,
        }
    }
}

/// Mutable trapezoidal map under construction.
///
/// Segments are inserted one at a time. The expected size and depth of the
/// search structure are O(n) and O(log n) only when the insertion order is
/// random, so bulk loads should go through [`MapBuilder::insert_shuffled`].
/// [`MapBuilder::freeze`] finishes construction and hands out the read-only
/// [`TrapezoidalMap`].
#[derive(Debug, Clone)]
pub struct MapBuilder<P> {
    pub(crate) bounds: Bounds,
    pub(crate) arena: Arena,
    pub(crate) segments: Vec<Segment<P>>,
    pub(crate) root: NodeId,
}

impl<P: Copy + Default> MapBuilder<P> {
    /// Starts with a single trapezoid covering `bounds`.
    pub fn new(bounds: Bounds) -> MapResult<Self> {
        bounds.validate()?;

        let top_left = bounds.min;
        let top_right = Point::new(bounds.max.x, bounds.min.y);
        let bottom_left = Point::new(bounds.min.x, bounds.max.y);
        let bottom_right = bounds.max;

        let segments = vec![
            Segment::new(top_left, top_right, false, P::default())?,
            Segment::new(bottom_left, bottom_right, false, P::default())?,
        ];

        let mut arena = Arena::new();
        let whole = arena.add_trapezoid(SegmentId(0), SegmentId(1), bottom_left, top_right);
        let root = arena.trap(whole).parent;

        Ok(Self {
            bounds,
            arena,
            segments,
            root,
        })
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of inserted boundary segments, excluding the box edges.
    pub fn segment_count(&self) -> usize {
        self.segments.len() - 2
    }

    /// Inserts a border segment.
    pub fn insert_segment(
        &mut self,
        p0: impl Into<Point>,
        p1: impl Into<Point>,
        property: P,
    ) -> MapResult<()> {
        self.insert(SegmentInput::new(p0, p1, property))
    }

    /// Shuffles `segments` with `rng` and inserts them in that order.
    ///
    /// Any seed gives the same final geometry; the shuffle only guards the
    /// expected structure size against adversarial input order.
    pub fn insert_shuffled<R: Rng + ?Sized>(
        &mut self,
        mut segments: Vec<SegmentInput<P>>,
        rng: &mut R,
    ) -> MapResult<()> {
        segments.shuffle(rng);
        for input in segments {
            self.insert(input)?;
        }
        Ok(())
    }

    /// Inserts one segment.
    ///
    /// All validation (bounds, degeneracy, overlap and crossing detected
    /// during location) runs before the structure is touched.
    pub fn insert(&mut self, input: SegmentInput<P>) -> MapResult<()> {
        let segment = Segment::new(input.p0, input.p1, input.border, input.property)?;
        if !self.bounds.contains(segment.p0()) || !self.bounds.contains(segment.p1()) {
            return Err(MapError::OutOfBounds {
                p0: input.p0,
                p1: input.p1,
            });
        }

        let first = self.locate_segment(&segment)?;
        let crossed = self.follow_segment(&segment, first)?;

        let s = SegmentId(self.segments.len() as u32);
        self.segments.push(segment);

        if crossed.len() == 1 {
            self.split_single(s, first);
        } else {
            self.split_many(s, &crossed);
        }
        Ok(())
    }

    /// Finishes construction: stitches opposite links and scores every
    /// trapezoid.
    pub fn freeze(mut self) -> TrapezoidalMap<P> {
        self.suture(self.root, None, None);
        let (lowest_score, highest_score) = self.assign_scores();
        log::debug!(
            "[MapBuilder] froze map: {} segments, {} trapezoids, {} nodes, scores {}..={}",
            self.segment_count(),
            self.arena.live_trapezoid_count(),
            self.arena.live_node_count(),
            lowest_score,
            highest_score,
        );
        TrapezoidalMap::from_parts(self, lowest_score, highest_score)
    }

    #[inline]
    pub(crate) fn segment(&self, id: SegmentId) -> &Segment<P> {
        &self.segments[id.index()]
    }

    /// Walks the DAG with the segment's left endpoint, breaking ties at
    /// shared endpoints with the segment's direction.
    fn locate_segment(&self, segment: &Segment<P>) -> MapResult<TrapezoidId> {
        let p0 = segment.p0();
        let mut current = self.root;
        loop {
            current = match self.arena.node(current) {
                Node::SplitX { point, left, right } => {
                    if p0 < point {
                        left
                    } else {
                        right
                    }
                }
                Node::SplitSegment {
                    segment: stored,
                    above,
                    below,
                } => {
                    if self.segment(stored).is_segment_above(&segment.geometry)? {
                        above
                    } else {
                        below
                    }
                }
                Node::Link { child } => child,
                Node::Leaf(id) => return Ok(id),
                Node::Vacant => unreachable!("search reached a vacant node"),
            };
        }
    }

    /// Collects, left to right, every trapezoid the segment crosses.
    fn follow_segment(
        &self,
        segment: &Segment<P>,
        first: TrapezoidId,
    ) -> MapResult<Vec<TrapezoidId>> {
        let geometry = &segment.geometry;
        let mut crossed = Vec::new();
        let mut current = first;
        loop {
            self.check_clearance(segment, current)?;
            crossed.push(current);

            let trap = self.arena.trap(current);
            if geometry.p1.x <= trap.right.x {
                break;
            }
            let next = if geometry.is_point_above(trap.right) {
                trap.lower_right
            } else {
                trap.upper_right
            };
            current = next.ok_or(MapError::BrokenWalk {
                p0: geometry.p0,
                p1: geometry.p1,
            })?;
        }
        Ok(crossed)
    }

    /// Rejects a segment that leaves the band between the top and bottom of
    /// a trapezoid it crosses, or runs along one of them. Both lines are
    /// linear over the shared x range, so comparing at its two ends suffices.
    fn check_clearance(&self, segment: &Segment<P>, id: TrapezoidId) -> MapResult<()> {
        let geometry = &segment.geometry;
        let inserted = (geometry.p0, geometry.p1);
        let trap = self.arena.trap(id);
        let lo = geometry.p0.x.max(trap.left.x);
        let hi = geometry.p1.x.min(trap.right.x);

        for (bound, is_top) in [(trap.top, true), (trap.bottom, false)] {
            let bounding = self.segment(bound);
            let other = &bounding.geometry;
            if other.is_vertical() {
                continue;
            }
            let existing = (other.p0, other.p1);

            let (own_lo, own_hi) = if geometry.is_vertical() {
                (geometry.p0.y, geometry.p1.y)
            } else {
                (geometry.y_at(lo), geometry.y_at(hi))
            };
            let (other_lo, other_hi) = (other.y_at(lo), other.y_at(hi));

            let escapes = if is_top {
                own_lo < other_lo || own_hi < other_hi
            } else {
                other_lo < own_lo || other_hi < own_hi
            };
            if escapes {
                return Err(MapError::IntersectingSegments { existing, inserted });
            }
            if bounding.border && lo < hi && own_lo == other_lo && own_hi == other_hi {
                return Err(MapError::OverlappingSegments { existing, inserted });
            }
        }
        Ok(())
    }

    /// The segment lies inside one trapezoid: split it into up to four.
    fn split_single(&mut self, s: SegmentId, t: TrapezoidId) {
        let (p0, p1) = (self.segment(s).p0(), self.segment(s).p1());
        let old = *self.arena.trap(t);

        let a = (p0 != old.left).then(|| self.arena.add_trapezoid(old.top, old.bottom, old.left, p0));
        let b = (p1 != old.right).then(|| self.arena.add_trapezoid(old.top, old.bottom, p1, old.right));
        let c = self.arena.add_trapezoid(old.top, s, p0, p1);
        let d = self.arena.add_trapezoid(s, old.bottom, p0, p1);

        match a {
            Some(a) => {
                let ta = self.arena.trap_mut(a);
                ta.upper_left = old.upper_left;
                ta.lower_left = old.lower_left;
                ta.upper_right = Some(c);
                ta.lower_right = Some(d);
                self.arena.trap_mut(c).upper_left = Some(a);
                self.arena.trap_mut(d).lower_left = Some(a);
            }
            None => {
                self.arena.trap_mut(c).upper_left = old.upper_left;
                self.arena.trap_mut(d).lower_left = old.lower_left;
            }
        }

        match b {
            Some(b) => {
                let tb = self.arena.trap_mut(b);
                tb.upper_left = Some(c);
                tb.lower_left = Some(d);
                tb.upper_right = old.upper_right;
                tb.lower_right = old.lower_right;
                self.arena.trap_mut(c).upper_right = Some(b);
                self.arena.trap_mut(d).lower_right = Some(b);
            }
            None => {
                self.arena.trap_mut(c).upper_right = old.upper_right;
                self.arena.trap_mut(d).lower_right = old.lower_right;
            }
        }

        if let Some(n) = old.upper_left {
            self.arena.trap_mut(n).upper_right = Some(a.unwrap_or(c));
        }
        if let Some(n) = old.lower_left {
            self.arena.trap_mut(n).lower_right = Some(a.unwrap_or(d));
        }
        if let Some(n) = old.upper_right {
            self.arena.trap_mut(n).upper_left = Some(b.unwrap_or(c));
        }
        if let Some(n) = old.lower_right {
            self.arena.trap_mut(n).lower_left = Some(b.unwrap_or(d));
        }

        let mut subtree = self.arena.add_node(Node::SplitSegment {
            segment: s,
            above: self.arena.trap(c).parent,
            below: self.arena.trap(d).parent,
        });
        if let Some(b) = b {
            subtree = self.arena.add_node(Node::SplitX {
                point: p1,
                left: subtree,
                right: self.arena.trap(b).parent,
            });
        }
        if let Some(a) = a {
            subtree = self.arena.add_node(Node::SplitX {
                point: p0,
                left: self.arena.trap(a).parent,
                right: subtree,
            });
        }

        self.arena.replace(t, subtree);
        self.arena.retire(t);
    }

    /// The segment crosses several trapezoids: split the two ends and merge
    /// the pieces above and below the segment into two strips.
    fn split_many(&mut self, s: SegmentId, crossed: &[TrapezoidId]) {
        let (p0, p1) = (self.segment(s).p0(), self.segment(s).p1());

        // left end
        let t = crossed[0];
        let first = *self.arena.trap(t);
        let mut u = self.arena.add_trapezoid(first.top, s, p0, p0);
        let mut d = self.arena.add_trapezoid(s, first.bottom, p0, p0);
        let mut su = self.arena.trap(u).parent;
        let mut sd = self.arena.trap(d).parent;

        if first.left == p0 {
            self.arena.trap_mut(u).upper_left = first.upper_left;
            self.arena.trap_mut(d).lower_left = first.lower_left;
            if let Some(n) = first.upper_left {
                self.arena.trap_mut(n).upper_right = Some(u);
            }
            if let Some(n) = first.lower_left {
                self.arena.trap_mut(n).lower_right = Some(d);
            }
            let split = self.arena.add_node(Node::SplitSegment {
                segment: s,
                above: su,
                below: sd,
            });
            self.arena.replace(t, split);
        } else {
            let l = self.arena.add_trapezoid(first.top, first.bottom, first.left, p0);
            {
                let tl = self.arena.trap_mut(l);
                tl.upper_left = first.upper_left;
                tl.lower_left = first.lower_left;
                tl.upper_right = Some(u);
                tl.lower_right = Some(d);
            }
            self.arena.trap_mut(u).upper_left = Some(l);
            self.arena.trap_mut(d).lower_left = Some(l);
            if let Some(n) = first.upper_left {
                self.arena.trap_mut(n).upper_right = Some(l);
            }
            if let Some(n) = first.lower_left {
                self.arena.trap_mut(n).lower_right = Some(l);
            }
            let split = self.arena.add_node(Node::SplitSegment {
                segment: s,
                above: su,
                below: sd,
            });
            let wall = self.arena.add_node(Node::SplitX {
                point: p0,
                left: self.arena.trap(l).parent,
                right: split,
            });
            self.arena.replace(t, wall);
        }

        // interior: close one strip at every wall the segment passes
        for i in 1..crossed.len() {
            let t = crossed[i];
            let prev = crossed[i - 1];

            if self.arena.trap(prev).upper_right == Some(t) {
                // the wall rises above the segment: the lower strip ends here
                let cur = *self.arena.trap(t);
                let k = self.arena.add_trapezoid(s, cur.bottom, cur.left, cur.left);

                let prev_lower_right = self.arena.trap(prev).lower_right;
                {
                    let td = self.arena.trap_mut(d);
                    td.upper_right = Some(k);
                    td.lower_right = prev_lower_right;
                    td.right = cur.left;
                }
                if let Some(n) = prev_lower_right {
                    self.arena.trap_mut(n).lower_left = Some(d);
                }
                {
                    let tk = self.arena.trap_mut(k);
                    tk.upper_left = Some(d);
                    tk.lower_left = cur.lower_left;
                }
                if let Some(n) = cur.lower_left {
                    self.arena.trap_mut(n).lower_right = Some(k);
                }
                if let Some(n) = cur.upper_right {
                    self.arena.trap_mut(n).upper_left = Some(k);
                }
                if let Some(n) = cur.lower_right {
                    self.arena.trap_mut(n).lower_left = Some(k);
                }
                d = k;
                sd = self.arena.trap(k).parent;
            } else {
                // the wall drops below the segment: the upper strip ends here
                let cur = *self.arena.trap(t);
                let k = self.arena.add_trapezoid(cur.top, s, cur.left, cur.left);

                let prev_upper_right = self.arena.trap(prev).upper_right;
                {
                    let tu = self.arena.trap_mut(u);
                    tu.upper_right = prev_upper_right;
                    tu.lower_right = Some(k);
                    tu.right = cur.left;
                }
                if let Some(n) = prev_upper_right {
                    self.arena.trap_mut(n).upper_left = Some(u);
                }
                {
                    let tk = self.arena.trap_mut(k);
                    tk.upper_left = cur.upper_left;
                    tk.lower_left = Some(u);
                }
                if let Some(n) = cur.upper_left {
                    self.arena.trap_mut(n).upper_right = Some(k);
                }
                if let Some(n) = cur.upper_right {
                    self.arena.trap_mut(n).upper_left = Some(k);
                }
                if let Some(n) = cur.lower_right {
                    self.arena.trap_mut(n).lower_left = Some(k);
                }
                u = k;
                su = self.arena.trap(k).parent;
            }

            if i < crossed.len() - 1 {
                let split = self.arena.add_node(Node::SplitSegment {
                    segment: s,
                    above: su,
                    below: sd,
                });
                self.arena.replace(t, split);
            }
        }

        // right end
        let t = crossed[crossed.len() - 1];
        let last = *self.arena.trap(t);
        self.arena.trap_mut(u).right = p1;
        self.arena.trap_mut(d).right = p1;

        if last.right == p1 {
            {
                let tu = self.arena.trap_mut(u);
                tu.upper_right = last.upper_right;
                tu.lower_right = None;
            }
            {
                let td = self.arena.trap_mut(d);
                td.upper_right = None;
                td.lower_right = last.lower_right;
            }
            if let Some(n) = last.upper_right {
                self.arena.trap_mut(n).upper_left = Some(u);
            }
            if let Some(n) = last.lower_right {
                self.arena.trap_mut(n).lower_left = Some(d);
            }
            let split = self.arena.add_node(Node::SplitSegment {
                segment: s,
                above: su,
                below: sd,
            });
            self.arena.replace(t, split);
        } else {
            let r = self.arena.add_trapezoid(last.top, last.bottom, p1, last.right);
            {
                let tu = self.arena.trap_mut(u);
                tu.upper_right = Some(r);
                tu.lower_right = None;
            }
            {
                let td = self.arena.trap_mut(d);
                td.upper_right = None;
                td.lower_right = Some(r);
            }
            {
                let tr = self.arena.trap_mut(r);
                tr.upper_left = Some(u);
                tr.lower_left = Some(d);
                tr.upper_right = last.upper_right;
                tr.lower_right = last.lower_right;
            }
            if let Some(n) = last.upper_right {
                self.arena.trap_mut(n).upper_left = Some(r);
            }
            if let Some(n) = last.lower_right {
                self.arena.trap_mut(n).lower_left = Some(r);
            }
            let split = self.arena.add_node(Node::SplitSegment {
                segment: s,
                above: su,
                below: sd,
            });
            let wall = self.arena.add_node(Node::SplitX {
                point: p1,
                left: split,
                right: self.arena.trap(r).parent,
            });
            self.arena.replace(t, wall);
        }

        for &t in crossed {
            self.arena.retire(t);
        }
    }
}
