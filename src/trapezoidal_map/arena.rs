//! Node and trapezoid storage for the search structure.
//!
//! The DAG and the trapezoid neighbour mesh form a graph with cycles, so
//! everything lives in growable vectors addressed by integer handles.
//! Retired slots go on a free list and are reused by later insertions.

use super::geometry::Point;

/// Handle of a node in the search DAG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

/// Handle of a trapezoid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrapezoidId(pub(crate) u32);

/// Handle of a stored segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl TrapezoidId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl SegmentId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Search DAG node
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Node {
    /// Branch on lexicographic order against `point`
    SplitX {
        point: Point,
        left: NodeId,
        right: NodeId,
    },
    /// Branch on whether the query is above `segment`
    SplitSegment {
        segment: SegmentId,
        above: NodeId,
        below: NodeId,
    },
    /// Single-child redirection. Every trapezoid hangs under exactly one
    /// link, so a trapezoid can be swapped for a subtree in place.
    Link { child: NodeId },
    /// Terminal region
    Leaf(TrapezoidId),
    /// Free-list slot
    Vacant,
}

/// Region bounded by two segments and two x coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Trapezoid {
    pub top: SegmentId,
    pub bottom: SegmentId,
    /// Point defining the left wall
    pub left: Point,
    /// Point defining the right wall
    pub right: Point,

    pub upper_left: Option<TrapezoidId>,
    pub lower_left: Option<TrapezoidId>,
    pub upper_right: Option<TrapezoidId>,
    pub lower_right: Option<TrapezoidId>,

    /// Leftmost trapezoid on the far side of `top`, set by `freeze`
    pub upper_opposite_left: Option<TrapezoidId>,
    /// Leftmost trapezoid on the far side of `bottom`, set by `freeze`
    pub lower_opposite_left: Option<TrapezoidId>,

    /// Link node pointing at this trapezoid's leaf
    pub parent: NodeId,
    /// Leaf node of this trapezoid
    pub leaf: NodeId,

    pub score: i32,
    pub retired: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Arena {
    pub nodes: Vec<Node>,
    pub trapezoids: Vec<Trapezoid>,
    free_nodes: Vec<NodeId>,
    free_trapezoids: Vec<TrapezoidId>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Node {
        self.nodes[id.index()]
    }

    #[inline]
    pub fn trap(&self, id: TrapezoidId) -> &Trapezoid {
        &self.trapezoids[id.index()]
    }

    #[inline]
    pub fn trap_mut(&mut self, id: TrapezoidId) -> &mut Trapezoid {
        &mut self.trapezoids[id.index()]
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        match self.free_nodes.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId((self.nodes.len() - 1) as u32)
            }
        }
    }

    /// Creates a trapezoid with no neighbours, together with its leaf and
    /// the link node above the leaf.
    pub fn add_trapezoid(
        &mut self,
        top: SegmentId,
        bottom: SegmentId,
        left: Point,
        right: Point,
    ) -> TrapezoidId {
        let id = match self.free_trapezoids.pop() {
            Some(id) => id,
            None => {
                self.trapezoids.push(Trapezoid::placeholder());
                TrapezoidId((self.trapezoids.len() - 1) as u32)
            }
        };

        let leaf = self.add_node(Node::Leaf(id));
        let parent = self.add_node(Node::Link { child: leaf });
        self.trapezoids[id.index()] = Trapezoid {
            top,
            bottom,
            left,
            right,
            upper_left: None,
            lower_left: None,
            upper_right: None,
            lower_right: None,
            upper_opposite_left: None,
            lower_opposite_left: None,
            parent,
            leaf,
            score: 0,
            retired: false,
        };
        id
    }

    /// Hangs `subtree` where trapezoid `id` used to be.
    pub fn replace(&mut self, id: TrapezoidId, subtree: NodeId) {
        let parent = self.trap(id).parent;
        self.nodes[parent.index()] = Node::Link { child: subtree };
    }

    /// Returns a replaced trapezoid and its leaf to the free lists. The
    /// link node stays alive because it now holds the replacement subtree.
    pub fn retire(&mut self, id: TrapezoidId) {
        let leaf = self.trap(id).leaf;
        self.nodes[leaf.index()] = Node::Vacant;
        self.free_nodes.push(leaf);

        let trap = self.trap_mut(id);
        trap.retired = true;
        trap.upper_left = None;
        trap.lower_left = None;
        trap.upper_right = None;
        trap.lower_right = None;
        self.free_trapezoids.push(id);
    }

    pub fn live_trapezoids(&self) -> impl Iterator<Item = TrapezoidId> + '_ {
        self.trapezoids
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.retired)
            .map(|(i, _)| TrapezoidId(i as u32))
    }

    pub fn live_trapezoid_count(&self) -> usize {
        self.trapezoids.len() - self.free_trapezoids.len()
    }

    pub fn live_node_count(&self) -> usize {
        self.nodes.len() - self.free_nodes.len()
    }
}

impl Trapezoid {
    fn placeholder() -> Self {
        Self {
            top: SegmentId(0),
            bottom: SegmentId(0),
            left: Point::default(),
            right: Point::default(),
            upper_left: None,
            lower_left: None,
            upper_right: None,
            lower_right: None,
            upper_opposite_left: None,
            lower_opposite_left: None,
            parent: NodeId(0),
            leaf: NodeId(0),
            score: 0,
            retired: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retired_slots_are_reused() {
        let mut arena = Arena::new();
        let a = arena.add_trapezoid(SegmentId(0), SegmentId(1), Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert_eq!(arena.live_trapezoid_count(), 1);

        let x = arena.add_node(Node::Link { child: arena.trap(a).leaf });
        arena.replace(a, x);
        arena.retire(a);
        assert_eq!(arena.live_trapezoid_count(), 0);

        let b = arena.add_trapezoid(SegmentId(0), SegmentId(1), Point::new(0.0, 0.0), Point::new(2.0, 0.0));
        assert_eq!(a, b);
        assert!(!arena.trap(b).retired);
        assert_eq!(arena.live_trapezoids().count(), 1);
    }
}
