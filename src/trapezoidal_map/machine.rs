//! Flat, index-addressed form of the search DAG.
//!
//! The frozen DAG is compiled once into a `Vec` of fixed-shape instructions.
//! Indirection nodes disappear, every other node gets one slot in depth-first
//! pre-order (the root is slot 0), and children are referenced by slot index.
//! Queries then run as a tight loop over the array with no pointer chasing.

use rustc_hash::FxHashMap;

use super::arena::{Node, NodeId};
use super::geometry::{Bounds, Point, SegmentGeometry};
use super::map::{corners, Location, TrapezoidalMap};

/// Terminal record: everything a query needs about one trapezoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidRecord<P> {
    pub top: SegmentGeometry,
    pub bottom: SegmentGeometry,
    pub left_x: f32,
    pub right_x: f32,
    pub score: i32,
    pub top_property: P,
    pub bottom_property: P,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction<P> {
    /// Go to `left` when the query is lexicographically smaller than `point`
    SplitX { point: Point, left: u32, right: u32 },
    /// Go to `above` when the query is above `segment`
    SplitSegment {
        segment: SegmentGeometry,
        above: u32,
        below: u32,
    },
    Trapezoid(TrapezoidRecord<P>),
}

/// Compiled point-location index.
#[derive(Debug, Clone)]
pub struct PointLocationMachine<P> {
    bounds: Bounds,
    code: Vec<Instruction<P>>,
}

impl<P: Copy + Default> PointLocationMachine<P> {
    /// Compiles a frozen map.
    pub fn new(map: &TrapezoidalMap<P>) -> Self {
        let resolve = |mut id: NodeId| loop {
            match map.arena.node(id) {
                Node::Link { child } => id = child,
                _ => return id,
            }
        };

        // pass 1: slot assignment
        let mut slots: FxHashMap<NodeId, u32> = FxHashMap::default();
        let mut order: Vec<NodeId> = Vec::new();
        let mut stack = vec![resolve(map.root)];
        while let Some(id) = stack.pop() {
            if slots.contains_key(&id) {
                continue;
            }
            slots.insert(id, order.len() as u32);
            order.push(id);
            match map.arena.node(id) {
                Node::SplitX { left, right, .. } => {
                    stack.push(resolve(right));
                    stack.push(resolve(left));
                }
                Node::SplitSegment { above, below, .. } => {
                    stack.push(resolve(below));
                    stack.push(resolve(above));
                }
                _ => {}
            }
        }

        // pass 2: emit
        let slot = |id: NodeId| slots[&resolve(id)];
        let code: Vec<Instruction<P>> = order
            .iter()
            .filter_map(|&id| match map.arena.node(id) {
                Node::SplitX { point, left, right } => Some(Instruction::SplitX {
                    point,
                    left: slot(left),
                    right: slot(right),
                }),
                Node::SplitSegment { segment, above, below } => Some(Instruction::SplitSegment {
                    segment: map.segments[segment.index()].geometry,
                    above: slot(above),
                    below: slot(below),
                }),
                Node::Leaf(trap) => {
                    let trap = map.arena.trap(trap);
                    let top = &map.segments[trap.top.index()];
                    let bottom = &map.segments[trap.bottom.index()];
                    Some(Instruction::Trapezoid(TrapezoidRecord {
                        top: top.geometry,
                        bottom: bottom.geometry,
                        left_x: trap.left.x,
                        right_x: trap.right.x,
                        score: trap.score,
                        top_property: top.property,
                        bottom_property: bottom.property,
                    }))
                }
                Node::Link { .. } | Node::Vacant => None,
            })
            .collect();

        log::debug!(
            "[PointLocationMachine] compiled {} instructions from {} nodes",
            code.len(),
            map.node_count()
        );

        Self {
            bounds: map.bounds,
            code,
        }
    }

    /// Locates `point`. `None` outside the bounding box.
    pub fn find(&self, point: impl Into<Point>) -> Option<Location<P>> {
        let q = point.into();
        if !self.bounds.contains(q) {
            return None;
        }

        let mut pc = 0usize;
        loop {
            match self.code.get(pc)? {
                Instruction::SplitX { point, left, right } => {
                    pc = (if q < *point { *left } else { *right }) as usize;
                }
                Instruction::SplitSegment { segment, above, below } => {
                    pc = (if segment.is_point_above(q) { *above } else { *below }) as usize;
                }
                Instruction::Trapezoid(t) => {
                    return Some(Location {
                        corners: corners(&t.top, &t.bottom, t.left_x, t.right_x),
                        score: t.score,
                        top: t.top_property,
                        bottom: t.bottom_property,
                    });
                }
            }
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn instructions(&self) -> &[Instruction<P>] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
