//! Force contributors for the 2D engine
//!
//! Defines the shared pair force law, the Barnes–Hut solver that walks the
//! per-tick quadtree from each body's leaf up to the root, and a direct
//! O(N²) summation used as the exact reference

use crate::error::Result;
use crate::simulation::params::Parameters;
use crate::simulation::quad_tree::{NodeId, QuadTree};
use crate::simulation::states::{Body, NVec2};

/// Trait for force sources operating on the body list
/// Implementations add their contribution into each body's `f` accumulator
pub trait ForceModel {
    fn accumulate_forces(&self, tree: &QuadTree, bodies: &mut [Body]) -> Result<()>;
}

/// Inverse-square attraction of `target` toward a source point.
///
/// `F = G * m_target * q_source * r / |r|^3` with `r = source - target`.
/// Returns zero when `|r|^2` is below `softening2`, so near-coincident
/// points never produce a singular force.
#[allow(non_snake_case)]
pub fn pair_force(target: &Body, source: NVec2, source_charge: f64, G: f64, softening2: f64) -> NVec2 {
    let r = source - target.x;
    let r2 = r.dot(&r);

    // also covers r2 == 0 when softening is zero
    if r2 < softening2 || r2 == 0.0 {
        return NVec2::zeros();
    }

    let inv_r = r2.sqrt().recip();
    let inv_r3 = inv_r * inv_r * inv_r;

    G * target.m * source_charge * inv_r3 * r
}

/// Exact force on every body by direct pairwise summation
#[allow(non_snake_case)]
pub fn direct_forces(bodies: &[Body], G: f64, softening2: f64) -> Vec<NVec2> {
    let all: Vec<usize> = (0..bodies.len()).collect();
    direct_forces_among(bodies, &all, G, softening2)
}

/// Direct summation restricted to the bodies listed in `active`.
/// Bodies not listed neither feel nor exert force.
#[allow(non_snake_case)]
pub fn direct_forces_among(bodies: &[Body], active: &[usize], G: f64, softening2: f64) -> Vec<NVec2> {
    let mut out = vec![NVec2::zeros(); bodies.len()];

    // Loop over each unordered pair (i, j) of active bodies
    for (k, &i) in active.iter().enumerate() {
        let bi = &bodies[i];
        for &j in &active[k + 1..] {
            let bj = &bodies[j];
            // charges may differ from masses, so the two sides are computed separately
            out[i] += pair_force(bi, bj.x, bj.c, G, softening2);
            out[j] += pair_force(bj, bi.x, bi.c, G, softening2);
        }
    }

    out
}

/// Gravity by direct summation over the bodies inside this tick's tree.
/// Escaped bodies are left out exactly as the tree solver leaves them out.
#[allow(non_snake_case)]
pub struct DirectGravity {
    pub G: f64,
    pub softening: f64,
}

impl ForceModel for DirectGravity {
    fn accumulate_forces(&self, tree: &QuadTree, bodies: &mut [Body]) -> Result<()> {
        let active: Vec<usize> = (0..bodies.len())
            .filter(|i| !tree.escaped().contains(i))
            .collect();

        let forces = direct_forces_among(bodies, &active, self.G, self.softening * self.softening);
        for (b, f) in bodies.iter_mut().zip(forces) {
            b.f += f;
        }
        Ok(())
    }
}

// =========================================================================================
// Barnes-Hut
// =========================================================================================

/// Gravity evaluated over the quadtree with opening angle `theta`
#[allow(non_snake_case)]
pub struct BarnesHutGravity {
    pub G: f64,
    pub softening: f64,
    pub theta: f64,
}

impl BarnesHutGravity {
    pub fn from_parameters(p: &Parameters) -> Self {
        Self {
            G: p.G,
            softening: p.softening,
            theta: p.theta,
        }
    }

    /// Net force on body `i`.
    ///
    /// Starts at the body's leaf and climbs to the root. At every ancestor the
    /// children other than the one the walk came from are evaluated with
    /// [`BarnesHutGravity::accumulate_subtree`]; the subtree holding the body
    /// is never revisited, so each other body is counted exactly once.
    ///
    /// Bodies excluded from the tree (outside the world bounds) get zero.
    /// Co-members of a depth-capped leaf interact directly.
    pub fn force_on_body(&self, tree: &QuadTree, bodies: &[Body], i: usize) -> Result<NVec2> {
        let mut f = NVec2::zeros();
        let Some(leaf) = tree.leaf_of(i) else {
            return Ok(f);
        };

        let target = &bodies[i];
        let softening2 = self.softening * self.softening;

        for &j in &tree.node(leaf).members {
            if j != i {
                f += pair_force(target, bodies[j].x, bodies[j].c, self.G, softening2);
            }
        }

        let mut from = leaf;
        while let Some(parent) = tree.node(from).parent {
            for &child in tree.node(parent).children.iter().flatten() {
                if child == from {
                    continue;
                }
                self.accumulate_subtree(tree, bodies, i, child, &mut f)?;
            }
            from = parent;
        }

        Ok(f)
    }

    /// Force on body `i` from the subtree rooted at `node_id`.
    ///
    /// - empty subtree: no contribution
    /// - `s / d < theta`: monopole at the subtree centroid
    /// - otherwise: refine into the children, or apply each member directly
    ///   when the node has none
    ///
    /// `s` is the larger side of the node rectangle and `d` the distance from
    /// the body to the node centroid. A zero distance counts as infinitely
    /// close and always refines.
    fn accumulate_subtree(&self, tree: &QuadTree, bodies: &[Body], i: usize, node_id: NodeId, f: &mut NVec2) -> Result<()> {
        let node = tree.node(node_id);
        if node.is_empty() {
            return Ok(());
        }

        let agg = node.aggregate()?;
        let Some(centroid) = agg.centroid else {
            return Ok(());
        };

        let target = &bodies[i];
        let softening2 = self.softening * self.softening;

        let d = (centroid - target.x).norm();
        let s_over_d = if d > 0.0 { node.bounds.size() / d } else { f64::INFINITY };

        if s_over_d < self.theta {
            *f += pair_force(target, centroid, agg.charge, self.G, softening2);
            return Ok(());
        }

        if node.is_leaf() {
            for &j in &node.members {
                if j != i {
                    *f += pair_force(target, bodies[j].x, bodies[j].c, self.G, softening2);
                }
            }
            return Ok(());
        }

        for &child in node.children.iter().flatten() {
            self.accumulate_subtree(tree, bodies, i, child, f)?;
        }
        Ok(())
    }
}

impl ForceModel for BarnesHutGravity {
    /// Solve every body against the aggregated tree, then add the results
    /// into the accumulators. The tree and positions are read-only while
    /// solving.
    fn accumulate_forces(&self, tree: &QuadTree, bodies: &mut [Body]) -> Result<()> {
        let forces = (0..bodies.len())
            .map(|i| self.force_on_body(tree, bodies, i))
            .collect::<Result<Vec<_>>>()?;

        for (b, f) in bodies.iter_mut().zip(forces) {
            b.f += f;
        }
        Ok(())
    }
}
