//! Finishing passes run by `freeze`: opposite-side links and winding scores.

use rustc_hash::FxHashSet;

use super::arena::{Node, NodeId, TrapezoidId};
use super::builder::MapBuilder;
use super::geometry::{Point, SegmentGeometry};

/// Height of a bounding segment at a trapezoid's right wall. A vertical
/// segment only bounds the sliver between its endpoints, whose right wall is
/// the far endpoint.
#[inline]
fn wall_height(segment: &SegmentGeometry, wall: Point) -> f32 {
    if segment.is_vertical() {
        segment.p1.y
    } else {
        segment.y_at(wall.x)
    }
}

impl<P: Copy + Default> MapBuilder<P> {
    /// Records, for every trapezoid, the leftmost trapezoid directly across
    /// its top and its bottom segment.
    pub(crate) fn suture(
        &mut self,
        root: NodeId,
        upper: Option<TrapezoidId>,
        lower: Option<TrapezoidId>,
    ) {
        let mut seen = FxHashSet::default();
        let mut stack = vec![(root, upper, lower)];

        while let Some(entry) = stack.pop() {
            if !seen.insert(entry) {
                continue;
            }
            let (node, upper, lower) = entry;
            match self.arena.node(node) {
                Node::SplitX { left, right, .. } => {
                    stack.push((right, upper, lower));
                    stack.push((left, upper, lower));
                }
                Node::SplitSegment { above, below, .. } => {
                    let across_below = self.top_leftmost(below);
                    let across_above = self.bottom_leftmost(above);
                    stack.push((below, across_above, lower));
                    stack.push((above, upper, across_below));
                }
                Node::Link { child } => stack.push((child, upper, lower)),
                Node::Leaf(id) => {
                    let trap = self.arena.trap_mut(id);
                    trap.upper_opposite_left = upper;
                    trap.lower_opposite_left = lower;
                }
                Node::Vacant => {}
            }
        }
    }

    /// Leftmost trapezoid along the top edge of the region under `node`.
    fn top_leftmost(&self, mut node: NodeId) -> Option<TrapezoidId> {
        loop {
            node = match self.arena.node(node) {
                Node::SplitX { left, .. } => left,
                Node::SplitSegment { above, .. } => above,
                Node::Link { child } => child,
                Node::Leaf(mut id) => {
                    while let Some(next) = self.arena.trap(id).upper_left {
                        id = next;
                    }
                    return Some(id);
                }
                Node::Vacant => return None,
            };
        }
    }

    /// Leftmost trapezoid along the bottom edge of the region under `node`.
    fn bottom_leftmost(&self, mut node: NodeId) -> Option<TrapezoidId> {
        loop {
            node = match self.arena.node(node) {
                Node::SplitX { left, .. } => left,
                Node::SplitSegment { below, .. } => below,
                Node::Link { child } => child,
                Node::Leaf(mut id) => {
                    while let Some(next) = self.arena.trap(id).lower_left {
                        id = next;
                    }
                    return Some(id);
                }
                Node::Vacant => return None,
            };
        }
    }

    /// Trapezoid touching the left edge of the box at height `y`.
    fn leftmost(&self, y: f32) -> Option<TrapezoidId> {
        let mut node = self.root;
        loop {
            node = match self.arena.node(node) {
                Node::SplitX { left, .. } => left,
                Node::SplitSegment {
                    segment,
                    above,
                    below,
                } => {
                    if y < self.segment(segment).p0().y {
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

    /// Scores every trapezoid by sweeping horizontal lines across the map.
    ///
    /// One line runs through the middle of every band between consecutive
    /// distinct segment heights. A trapezoid that no band line reaches (a
    /// wedge under a horizontal edge, for one) gets its own line through
    /// its centre. Zero-width slivers beside vertical segments are only
    /// scored when a line passes through them.
    ///
    /// Returns the lowest and highest score seen.
    pub(crate) fn assign_scores(&mut self) -> (i32, i32) {
        let mut range = (0, 0);

        let mut heights: Vec<f32> = self.segments[2..]
            .iter()
            .flat_map(|s| [s.p0().y, s.p1().y])
            .collect();
        if heights.is_empty() {
            return range;
        }
        heights.sort_by(|a, b| a.total_cmp(b));
        heights.dedup();

        let mut visited = vec![false; self.arena.trapezoids.len()];

        for band in heights.windows(2) {
            let cy = (band[0] + band[1]) * 0.5;
            if cy == band[0] || cy == band[1] {
                continue;
            }
            self.sweep(cy, &mut visited, &mut range);
        }

        let missed: Vec<TrapezoidId> = self
            .arena
            .live_trapezoids()
            .filter(|id| !visited[id.index()])
            .collect();
        for id in missed {
            if visited[id.index()] {
                continue;
            }
            if let Some(cy) = self.centre_height(id) {
                self.sweep(cy, &mut visited, &mut range);
            }
            if !visited[id.index()] {
                let trap = self.arena.trap(id);
                if trap.left.x < trap.right.x {
                    log::warn!("[MapBuilder] trapezoid {:?} was not reached by any score sweep", id);
                }
            }
        }

        range
    }

    /// Height halfway between the top and bottom of a trapezoid at its
    /// horizontal centre. `None` for zero-width slivers.
    fn centre_height(&self, id: TrapezoidId) -> Option<f32> {
        let trap = self.arena.trap(id);
        if !(trap.left.x < trap.right.x) {
            return None;
        }
        let x = (trap.left.x + trap.right.x) * 0.5;
        let top = self.segment(trap.top).geometry.y_at(x);
        let bottom = self.segment(trap.bottom).geometry.y_at(x);
        let cy = (top + bottom) * 0.5;
        (top < cy && cy < bottom).then_some(cy)
    }

    /// Walks the line `y = cy` from the left edge of the box, scoring every
    /// trapezoid it passes through. Each border crossing adds +1 or -1
    /// depending on the segment's inserted direction.
    fn sweep(&mut self, cy: f32, visited: &mut [bool], range: &mut (i32, i32)) {
        let step_limit = self.arena.trapezoids.len() + 1;
        let mut score = 0;
        let mut current = self.leftmost(cy);
        let mut steps = 0;

        while let Some(id) = current {
            steps += 1;
            if steps > step_limit {
                log::warn!("[MapBuilder] score sweep at y={} did not terminate", cy);
                break;
            }

            self.arena.trap_mut(id).score = score;
            visited[id.index()] = true;
            range.0 = range.0.min(score);
            range.1 = range.1.max(score);

            let trap = *self.arena.trap(id);
            if trap.upper_right.is_none()
                && trap.lower_right.is_none()
                && trap.upper_opposite_left.is_none()
                && trap.lower_opposite_left.is_none()
            {
                break;
            }

            let top = self.segment(trap.top);
            let bottom = self.segment(trap.bottom);

            current = if cy < wall_height(&top.geometry, trap.right) {
                if top.border {
                    score += if top.swapped { 1 } else { -1 };
                }
                // walk right along the bottom side of the segment above
                let mut q = trap.upper_opposite_left;
                while let Some(qid) = q {
                    let qt = self.arena.trap(qid);
                    if wall_height(&self.segment(qt.bottom).geometry, qt.right) < cy {
                        q = qt.lower_right;
                    } else {
                        break;
                    }
                }
                q
            } else if wall_height(&bottom.geometry, trap.right) < cy {
                if bottom.border {
                    score -= if bottom.swapped { 1 } else { -1 };
                }
                // walk right along the top side of the segment below
                let mut q = trap.lower_opposite_left;
                while let Some(qid) = q {
                    let qt = self.arena.trap(qid);
                    if cy < wall_height(&self.segment(qt.top).geometry, qt.right) {
                        q = qt.upper_right;
                    } else {
                        break;
                    }
                }
                q
            } else if trap.right == bottom.p1() {
                trap.upper_right
            } else if trap.right == top.p1() {
                trap.lower_right
            } else if cy < trap.right.y {
                trap.upper_right
            } else if trap.right.y < cy {
                trap.lower_right
            } else {
                // the line runs exactly through the right wall point
                match trap.upper_right {
                    Some(ur) if 0.0 < self.segment(self.arena.trap(ur).bottom).geometry.a => trap.lower_right,
                    Some(ur) => Some(ur),
                    None => trap.lower_right,
                }
            };
        }
    }
}
