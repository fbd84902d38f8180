//! The frozen, read-only trapezoidal map.

use std::io::{self, Write};

use super::arena::{Arena, Node, NodeId, TrapezoidId};
use super::builder::MapBuilder;
use super::geometry::{Bounds, Point, Segment, SegmentGeometry};

/// Result of a point-location query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location<P> {
    /// Top-left, top-right, bottom-right, bottom-left
    pub corners: [Point; 4],
    /// Winding score of the trapezoid
    pub score: i32,
    /// Property of the segment bounding the trapezoid from above
    pub top: P,
    /// Property of the segment bounding the trapezoid from below
    pub bottom: P,
}

impl<P> Location<P> {
    /// Odd winding score: inside the boundary
    pub fn is_inside(&self) -> bool {
        self.score % 2 != 0
    }
}

/// Outline of one trapezoid, for debug drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidOutline {
    pub corners: [Point; 4],
    pub score: i32,
}

/// Corners of the trapezoid between `top` and `bottom` over `[left_x, right_x]`.
pub(crate) fn corners(
    top: &SegmentGeometry,
    bottom: &SegmentGeometry,
    left_x: f32,
    right_x: f32,
) -> [Point; 4] {
    [
        Point::new(left_x, top.y_at(left_x)),
        Point::new(right_x, top.y_at(right_x)),
        Point::new(right_x, bottom.y_at(right_x)),
        Point::new(left_x, bottom.y_at(left_x)),
    ]
}

/// Planar point-location index over a set of non-crossing segments.
///
/// Built with [`MapBuilder`]; immutable afterwards and safe to query from
/// many threads at once.
#[derive(Debug, Clone)]
pub struct TrapezoidalMap<P> {
    pub(crate) bounds: Bounds,
    pub(crate) arena: Arena,
    pub(crate) segments: Vec<Segment<P>>,
    pub(crate) root: NodeId,
    lowest_score: i32,
    highest_score: i32,
}

impl<P: Copy + Default> TrapezoidalMap<P> {
    pub(crate) fn from_parts(builder: MapBuilder<P>, lowest_score: i32, highest_score: i32) -> Self {
        Self {
            bounds: builder.bounds,
            arena: builder.arena,
            segments: builder.segments,
            root: builder.root,
            lowest_score,
            highest_score,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Locates `point` by walking the search DAG. `None` outside the box.
    pub fn find(&self, point: impl Into<Point>) -> Option<Location<P>> {
        let point = point.into();
        if !self.bounds.contains(point) {
            return None;
        }
        let id = self.find_trapezoid(point)?;
        Some(self.location(id))
    }

    fn find_trapezoid(&self, point: Point) -> Option<TrapezoidId> {
        let mut current = self.root;
        loop {
            current = match self.arena.node(current) {
                Node::SplitX { point: at, left, right } => {
                    if point < at {
                        left
                    } else {
                        right
                    }
                }
                Node::SplitSegment { segment, above, below } => {
                    if self.segments[segment.index()].geometry.is_point_above(point) {
                        above
                    } else {
                        below
                    }
                }
                Node::Link { child } => child,
                Node::Leaf(id) => return Some(id),
                Node::Vacant => return None,
            };
        }
    }

    fn location(&self, id: TrapezoidId) -> Location<P> {
        let trap = self.arena.trap(id);
        let top = &self.segments[trap.top.index()];
        let bottom = &self.segments[trap.bottom.index()];
        Location {
            corners: corners(&top.geometry, &bottom.geometry, trap.left.x, trap.right.x),
            score: trap.score,
            top: top.property,
            bottom: bottom.property,
        }
    }

    /// Every trapezoid of the decomposition, in storage order.
    pub fn trapezoids(&self) -> impl Iterator<Item = TrapezoidOutline> + '_ {
        self.arena.live_trapezoids().map(move |id| {
            let trap = self.arena.trap(id);
            TrapezoidOutline {
                corners: corners(
                    &self.segments[trap.top.index()].geometry,
                    &self.segments[trap.bottom.index()].geometry,
                    trap.left.x,
                    trap.right.x,
                ),
                score: trap.score,
            }
        })
    }

    pub fn lowest_score(&self) -> i32 {
        self.lowest_score
    }

    pub fn highest_score(&self) -> i32 {
        self.highest_score
    }

    pub fn trapezoid_count(&self) -> usize {
        self.arena.live_trapezoid_count()
    }

    pub fn node_count(&self) -> usize {
        self.arena.live_node_count()
    }

    /// Number of inserted segments, excluding the box edges.
    pub fn segment_count(&self) -> usize {
        self.segments.len() - 2
    }

    /// Writes the search DAG in Graphviz dot format.
    pub fn write_dot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "digraph {{")?;
        writeln!(out, "  node [shape = record];")?;

        let mut seen = vec![false; self.arena.nodes.len()];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            match self.arena.node(id) {
                Node::SplitX { point, left, right } => {
                    writeln!(
                        out,
                        "  N{}[label = \"{{ X{}\\n({}, {}) | {{ <left>left | <right>right }} }}\"];",
                        id.0, id.0, point.x, point.y
                    )?;
                    writeln!(out, "  N{}:left -> N{};", id.0, left.0)?;
                    writeln!(out, "  N{}:right -> N{};", id.0, right.0)?;
                    stack.push(right);
                    stack.push(left);
                }
                Node::SplitSegment { segment, above, below } => {
                    let g = &self.segments[segment.index()].geometry;
                    writeln!(
                        out,
                        "  N{}[label = \"{{ Y{}\\n({}, {})-({}, {}) | {{ <upper>upper | <lower>lower }} }}\"];",
                        id.0, id.0, g.p0.x, g.p0.y, g.p1.x, g.p1.y
                    )?;
                    writeln!(out, "  N{}:upper -> N{};", id.0, above.0)?;
                    writeln!(out, "  N{}:lower -> N{};", id.0, below.0)?;
                    stack.push(below);
                    stack.push(above);
                }
                Node::Link { child } => {
                    writeln!(out, "  N{}[label = \"S{}\"];", id.0, id.0)?;
                    writeln!(out, "  N{} -> N{};", id.0, child.0)?;
                    stack.push(child);
                }
                Node::Leaf(trap) => {
                    let score = self.arena.trap(trap).score;
                    writeln!(out, "  N{}[label = \"L{} ({})\"];", id.0, trap.0, score)?;
                }
                Node::Vacant => {}
            }
        }

        writeln!(out, "}}")
    }
}
