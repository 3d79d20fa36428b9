//! # Per-tick Quadtree (2D)
//!
//! Spatial partition used by the Barnes–Hut force solver. The tree is rebuilt
//! from scratch every tick from the current body positions and lives in a
//! node arena (`Vec<QuadNode>`) owned by the simulation. Clearing the arena
//! keeps its capacity, so steady-state ticks do not reallocate.
//!
//! ## Layout
//!
//! - Node `0` is the root and covers the world bounds.
//! - Every node keeps the **full** list of body indices inside its rectangle,
//!   not only the bodies of its leaves. A parent's list is therefore a
//!   superset of each child's list, and the aggregate of any node can be
//!   computed from its own list alone.
//! - Children are created lazily, only for quadrants that receive a body.
//! - Parent and child links are arena indices. The node id is its index.
//!
//! ## Quadrant encoding
//!
//! Same bit layout as the octant encoding of 3D trees, restricted to two axes:
//!
//! - Bit 0 (value 1): X axis, 0 for `x < mid.x`, 1 for `x >= mid.x`
//! - Bit 1 (value 2): Y axis, 0 for `y < mid.y`, 1 for `y >= mid.y`
//!
//! Lower bounds are inclusive and upper bounds exclusive, so a body on a
//! midline belongs to exactly one quadrant.

use log::trace;

use crate::error::{Result, SimError};
use crate::simulation::params::MAX_DEPTH_LIMIT;
use crate::simulation::states::{Body, Bounds, NVec2};

pub type NodeId = usize;

/// Total mass, total charge and mass-weighted centroid of a node's members.
///
/// `centroid` is `None` for a node without members.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    pub mass: f64,
    pub charge: f64,
    pub centroid: Option<NVec2>,
}

impl Aggregate {
    /// Aggregate over `members`, indices into `bodies`
    pub fn from_members(members: &[usize], bodies: &[Body]) -> Self {
        if members.is_empty() {
            return Self { mass: 0.0, charge: 0.0, centroid: None };
        }

        let mut mass = 0.0;
        let mut charge = 0.0;
        let mut weighted = NVec2::zeros();
        let mut plain = NVec2::zeros();

        for &i in members {
            let b = &bodies[i];
            mass += b.m;
            charge += b.c;
            weighted += b.x * b.m;
            plain += b.x;
        }

        // masses are validated positive; the plain mean only guards hand-built input
        let centroid = if mass > 0.0 {
            weighted / mass
        } else {
            plain / members.len() as f64
        };

        Self { mass, charge, centroid: Some(centroid) }
    }
}

/// A single quadtree node.
#[derive(Debug, Clone)]
pub struct QuadNode {
    pub id: NodeId,
    pub bounds: Bounds,
    pub members: Vec<usize>, // every body inside `bounds`, in insertion order
    pub children: [Option<NodeId>; 4],
    pub parent: Option<NodeId>,
    pub depth: usize,
    aggregate: Option<Aggregate>, // None until the aggregate pass has run
}

impl QuadNode {
    fn new(id: NodeId, bounds: Bounds, parent: Option<NodeId>, depth: usize) -> Self {
        Self {
            id,
            bounds,
            members: Vec::new(),
            children: [None; 4],
            parent,
            depth,
            aggregate: None,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| c.is_none())
    }

    /// Aggregate for this tick.
    ///
    /// Fails with [`SimError::AggregateNotComputed`] when read before
    /// [`QuadTree::aggregate_all`] has run for this tree.
    pub fn aggregate(&self) -> Result<&Aggregate> {
        self.aggregate
            .as_ref()
            .ok_or(SimError::AggregateNotComputed { node: self.id })
    }

    pub fn has_aggregate(&self) -> bool {
        self.aggregate.is_some()
    }

    fn compute_aggregate(&mut self, bodies: &[Body]) {
        self.aggregate = Some(Aggregate::from_members(&self.members, bodies));
    }
}

/// Arena-backed quadtree for one tick.
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
    leaf_of: Vec<Option<NodeId>>, // terminal leaf of each body, None if excluded
    escaped: Vec<usize>, // bodies outside the root bounds this tick
    max_depth: usize,
}

impl Default for QuadTree {
    fn default() -> Self {
        Self::new(32)
    }
}

impl QuadTree {
    /// Empty arena with the given subdivision cap, clamped to
    /// [`MAX_DEPTH_LIMIT`] since `divide` recurses once per level
    pub fn new(max_depth: usize) -> Self {
        Self {
            nodes: Vec::new(),
            leaf_of: Vec::new(),
            escaped: Vec::new(),
            max_depth: max_depth.min(MAX_DEPTH_LIMIT),
        }
    }

    /// Build a fresh tree over `bodies` inside `bounds`.
    pub fn build(bounds: Bounds, bodies: &[Body], max_depth: usize) -> Self {
        let mut tree = Self::new(max_depth);
        tree.rebuild(bounds, bodies);
        tree
    }

    /// Drop all nodes from the previous tick, keeping the allocations.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.leaf_of.clear();
        self.escaped.clear();
    }

    /// Rebuild the tree in place for the current body positions.
    ///
    /// 1. Clears the arena.
    /// 2. Creates the root over `bounds` holding every body inside it.
    ///    Bodies outside are recorded in [`QuadTree::escaped`] and left out.
    /// 3. Recursively subdivides every node with more than one member.
    ///
    /// Aggregates are not computed here; see [`QuadTree::aggregate_all`].
    pub fn rebuild(&mut self, bounds: Bounds, bodies: &[Body]) {
        self.clear();
        self.leaf_of.resize(bodies.len(), None);

        let mut root = QuadNode::new(0, bounds, None, 0);
        for (i, b) in bodies.iter().enumerate() {
            if bounds.contains(&b.x) {
                root.members.push(i);
            } else {
                self.escaped.push(i);
            }
        }
        self.nodes.push(root);

        self.divide(0, bodies);
        trace!("quadtree built: {} nodes, {} escaped", self.nodes.len(), self.escaped.len());
    }

    /// Compute and store the aggregate of every node.
    ///
    /// Each node only reads its own member list, so the order does not matter.
    pub fn aggregate_all(&mut self, bodies: &[Body]) {
        for node in self.nodes.iter_mut() {
            node.compute_aggregate(bodies);
        }
    }

    pub fn root(&self) -> Option<&QuadNode> {
        self.nodes.first()
    }

    pub fn node(&self, id: NodeId) -> &QuadNode {
        &self.nodes[id]
    }

    /// All nodes in creation order, root first
    pub fn nodes(&self) -> &[QuadNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Terminal leaf holding body `i`, `None` if the body was excluded
    pub fn leaf_of(&self, i: usize) -> Option<NodeId> {
        self.leaf_of.get(i).copied().flatten()
    }

    pub fn escaped(&self) -> &[usize] {
        &self.escaped
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    // helpers ==============================================================================

    /// Split `node_id` into quadrants and recurse into every child created.
    ///
    /// A node with at most one member, or one at the depth cap, is a leaf and
    /// records itself as the terminal node of its members. Children are
    /// appended to the arena in first-use order before any recursion, so the
    /// node list is deterministic for a given input.
    fn divide(&mut self, node_id: NodeId, bodies: &[Body]) {
        let bounds = self.nodes[node_id].bounds;
        let depth = self.nodes[node_id].depth;

        if self.nodes[node_id].len() <= 1 || depth >= self.max_depth {
            for &i in &self.nodes[node_id].members {
                self.leaf_of[i] = Some(node_id);
            }
            return;
        }

        let mid = bounds.center();
        // members are not moved: the parent keeps its full list
        let members = self.nodes[node_id].members.clone();

        for i in members {
            let pos = bodies[i].x;
            if !bounds.contains(&pos) {
                continue;
            }

            let q = quadrant_for_point(&pos, &mid);
            let child_id = match self.nodes[node_id].children[q] {
                Some(id) => id,
                None => {
                    let id = self.nodes.len();
                    let child = QuadNode::new(id, quadrant_bounds(&bounds, q), Some(node_id), depth + 1);
                    self.nodes.push(child);
                    self.nodes[node_id].children[q] = Some(id);
                    id
                }
            };
            self.nodes[child_id].members.push(i);
        }

        let children = self.nodes[node_id].children;
        for child in children.iter().flatten() {
            self.divide(*child, bodies);
        }
    }
}

// helpers ===========================================================================

/// Quadrant index in `0..4` of `p` relative to the midpoint `mid`.
fn quadrant_for_point(p: &NVec2, mid: &NVec2) -> usize {
    let mut idx = 0;

    if p.x >= mid.x { idx |= 1; } // bit 0
    if p.y >= mid.y { idx |= 2; } // bit 1

    idx
}

/// Rectangle of quadrant `q` of `parent`, split at its center.
fn quadrant_bounds(parent: &Bounds, q: usize) -> Bounds {
    let mid = parent.center();

    let mut min = parent.min;
    let mut max = parent.max;

    // x: bit 0
    if (q & 1) == 0 {
        max.x = mid.x;
    } else {
        min.x = mid.x;
    }

    // y: bit 1
    if (q & 2) == 0 {
        max.y = mid.y;
    } else {
        min.y = mid.y;
    }

    Bounds::new(min, max)
}
