use std::time::Instant;

use crate::error::Result;

use crate::simulation::forces::{direct_forces, BarnesHutGravity};
use crate::simulation::params::Parameters;
use crate::simulation::quad_tree::QuadTree;
use crate::simulation::states::{Body, Bounds, NVec2};

/// Helper to build a deterministic body set of size `n` inside `world`
fn make_bodies(n: usize, world: &Bounds) -> Vec<Body> {
    let c = world.center();
    let half = world.size() * 0.45;

    (0..n)
        .map(|i| {
            let i_f = i as f64;
            // deterministic positions, no rand needed
            let x = NVec2::new(
                c.x + (i_f * 0.37).sin() * half,
                c.y + (i_f * 0.13).cos() * half,
            );
            Body::at_rest(x, 1.0, 1.0)
        })
        .collect()
}

/// Build, aggregate and solve every body against a fresh tree
fn tree_forces(world: Bounds, bodies: &[Body], params: &Parameters) -> Result<Vec<NVec2>> {
    let bh = BarnesHutGravity::from_parameters(params);
    let mut tree = QuadTree::build(world, bodies, params.max_depth);
    tree.aggregate_all(bodies);
    (0..bodies.len())
        .map(|i| bh.force_on_body(&tree, bodies, i))
        .collect()
}

/// Time one force evaluation by direct summation and by the quadtree solver
/// (build + aggregate + solve) for growing `n`.
/// Prints CSV, paste output directly into a spreadsheet to graph
pub fn bench_solver() -> Result<()> {
    let world = Bounds::new(NVec2::new(0.0, 0.0), NVec2::new(600.0, 600.0));
    let params = Parameters {
        theta: 0.7,
        ..Parameters::default()
    };

    println!("N,direct_ms,bh_ms,max_rel_err");

    for n in [200, 400, 800, 1600, 3200, 6400] {
        let bodies = make_bodies(n, &world);

        let t0 = Instant::now();
        let exact = direct_forces(&bodies, params.G, params.softening2());
        let ms_direct = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        let approx = tree_forces(world, &bodies, &params)?;
        let ms_bh = t1.elapsed().as_secs_f64() * 1000.0;

        let max_rel_err = exact
            .iter()
            .zip(approx.iter())
            .filter(|(e, _)| e.norm() > 0.0)
            .map(|(e, a)| (e - a).norm() / e.norm())
            .fold(0.0, f64::max);

        println!("{},{:.6},{:.6},{:.3e}", n, ms_direct, ms_bh, max_rel_err);
    }

    Ok(())
}
