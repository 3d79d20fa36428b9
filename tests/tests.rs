use quadsim::{
    direct_forces, generate_bodies, pair_force, BarnesHutGravity, Body, Bounds, Control, Engine, GenerateConfig,
    NVec2, Parameters, Phase, QuadTree, Scenario, ScenarioConfig, SimError, Simulation, SolverConfig,
    MAX_DEPTH_LIMIT,
};

/// World used by most tests, large enough for every hand-placed body
pub fn world() -> Bounds {
    Bounds::new(NVec2::new(-50.0, -50.0), NVec2::new(50.0, 50.0))
}

/// Default physics parameters for tests
pub fn test_params(theta: f64) -> Parameters {
    Parameters {
        dt: 1.0,
        softening: 0.01,
        G: 1.0,
        theta,
        max_depth: 32,
        seed: 7,
    }
}

pub fn body(x: f64, y: f64) -> Body {
    Body::at_rest(NVec2::new(x, y), 1.0, 1.0)
}

/// Seeded random bodies inside `world()`
pub fn random_bodies(n: usize, seed: u64) -> Vec<Body> {
    let gen = GenerateConfig { count: n, mass: 1.0, charge: 1.0 };
    generate_bodies(&world(), &gen, seed)
}

/// Build, aggregate and solve every body against the tree
pub fn tree_forces(bodies: &[Body], p: &Parameters) -> Vec<NVec2> {
    let mut tree = QuadTree::build(world(), bodies, p.max_depth);
    tree.aggregate_all(bodies);
    let bh = BarnesHutGravity::from_parameters(p);
    (0..bodies.len()).map(|i| bh.force_on_body(&tree, bodies, i).unwrap()).collect()
}

pub fn simulation(bodies: Vec<Body>, p: Parameters) -> Simulation {
    let scenario = Scenario::from_bodies(world(), p, Engine::default(), bodies).unwrap();
    Simulation::new(scenario)
}

fn close(a: NVec2, b: NVec2, tol: f64) -> bool {
    (a - b).norm() <= tol * (1.0 + b.norm())
}

// ==================================================================================
// Tree tests
// ==================================================================================

#[test]
fn tree_build_is_deterministic() {
    let bodies = random_bodies(80, 3);
    let a = QuadTree::build(world(), &bodies, 32);
    let b = QuadTree::build(world(), &bodies, 32);

    assert_eq!(a.len(), b.len());
    for (na, nb) in a.nodes().iter().zip(b.nodes()) {
        assert_eq!(na.bounds, nb.bounds);
        assert_eq!(na.members, nb.members);
        assert_eq!(na.children, nb.children);
        assert_eq!(na.parent, nb.parent);
    }
}

#[test]
fn every_body_in_root_once_and_in_one_leaf() {
    let bodies = random_bodies(120, 11);
    let tree = QuadTree::build(world(), &bodies, 32);
    let root = tree.root().unwrap();

    for i in 0..bodies.len() {
        assert_eq!(root.members.iter().filter(|&&m| m == i).count(), 1);

        let leaves: Vec<_> = tree
            .nodes()
            .iter()
            .filter(|n| n.is_leaf() && n.members.contains(&i))
            .map(|n| n.id)
            .collect();
        assert_eq!(leaves, vec![tree.leaf_of(i).unwrap()]);
    }
}

#[test]
fn only_multi_member_nodes_subdivide() {
    let bodies = random_bodies(64, 5);
    let tree = QuadTree::build(world(), &bodies, 32);

    for node in tree.nodes() {
        if node.len() <= 1 {
            assert!(node.is_leaf());
        } else {
            assert!(!node.is_leaf());
        }
    }
}

#[test]
fn centroid_matches_members_every_tick() {
    let mut bodies = random_bodies(30, 9);
    for (i, b) in bodies.iter_mut().enumerate() {
        b.m = 1.0 + i as f64;
    }
    let mut tree = QuadTree::build(world(), &bodies, 32);
    tree.aggregate_all(&bodies);

    for node in tree.nodes() {
        let agg = node.aggregate().unwrap();
        let mass: f64 = node.members.iter().map(|&i| bodies[i].m).sum();
        let weighted = node.members.iter().fold(NVec2::zeros(), |acc, &i| acc + bodies[i].x * bodies[i].m);

        assert!((agg.mass - mass).abs() < 1e-9);
        assert!(close(agg.centroid.unwrap(), weighted / mass, 1e-12));
    }
}

// ==================================================================================
// Solver tests
// ==================================================================================

#[test]
fn zero_theta_matches_direct_summation() {
    let bodies = random_bodies(60, 21);
    let p = test_params(0.0);

    let approx = tree_forces(&bodies, &p);
    let exact = direct_forces(&bodies, p.G, p.softening2());

    for (a, e) in approx.iter().zip(exact.iter()) {
        assert!(close(*a, *e, 1e-9), "tree {:?} vs direct {:?}", a, e);
    }
}

#[test]
fn infinite_theta_uses_sibling_monopoles() {
    // body 0 alone in the south-west quadrant, a cluster in the north-east one
    let bodies = vec![body(-30.0, -30.0), body(10.0, 10.0), body(40.0, 20.0), body(20.0, 40.0)];
    let p = test_params(f64::INFINITY);

    let f = tree_forces(&bodies, &p)[0];

    let centroid = (bodies[1].x + bodies[2].x + bodies[3].x) / 3.0;
    let monopole = pair_force(&bodies[0], centroid, 3.0, p.G, p.softening2());
    assert!(close(f, monopole, 1e-12));

    let exact = direct_forces(&bodies, p.G, p.softening2())[0];
    assert!((f - exact).norm() > 1e-9, "monopole should differ from the exact force");
}

#[test]
fn smaller_theta_is_more_accurate() {
    let bodies = random_bodies(200, 13);
    let exact = direct_forces(&bodies, 1.0, test_params(0.0).softening2());

    let err = |theta: f64| -> f64 {
        tree_forces(&bodies, &test_params(theta))
            .iter()
            .zip(exact.iter())
            .map(|(a, e)| (a - e).norm())
            .sum()
    };

    let coarse = err(2.0);
    let fine = err(0.3);
    assert!(fine < coarse, "theta 0.3 error {} not below theta 2.0 error {}", fine, coarse);
}

#[test]
fn zero_charge_body_exerts_no_force() {
    let mut bodies = vec![body(0.0, 0.0), body(10.0, 0.0), body(-20.0, 30.0)];
    bodies[0].c = 0.0;

    for theta in [0.0, 0.5, f64::INFINITY] {
        let only_pair = vec![bodies[0].clone(), bodies[1].clone()];
        let f = tree_forces(&only_pair, &test_params(theta));
        assert_eq!(f[1], NVec2::zeros());
        assert!(f[0].norm() > 0.0);

        let all = tree_forces(&bodies, &test_params(theta));
        let without = tree_forces(&bodies[1..], &test_params(theta));
        assert!(close(all[1], without[0], 1e-12));
    }
}

#[test]
fn coincident_bodies_stay_finite() {
    let bodies = vec![body(5.0, 5.0), body(5.0, 5.0), body(-20.0, 10.0)];
    let mut p = test_params(0.5);
    p.softening = 1.0;

    let f = tree_forces(&bodies, &p);
    for v in &f {
        assert!(v.x.is_finite() && v.y.is_finite());
    }

    let mut sim = simulation(bodies, p);
    let snap = sim.step().unwrap();
    for x in &snap.positions {
        assert!(x.x.is_finite() && x.y.is_finite());
    }
}

#[test]
fn solver_requires_aggregates() {
    let bodies = vec![body(-10.0, -10.0), body(10.0, 10.0)];
    let tree = QuadTree::build(world(), &bodies, 32);
    let bh = BarnesHutGravity::from_parameters(&test_params(0.5));

    let err = bh.force_on_body(&tree, &bodies, 0).unwrap_err();
    assert!(matches!(err, SimError::AggregateNotComputed { .. }));
}

// ==================================================================================
// Simulation tests
// ==================================================================================

#[test]
fn two_body_tick_obeys_third_law() {
    let bodies = vec![body(0.0, 0.0), body(10.0, 0.0)];
    let mut sim = simulation(bodies, test_params(0.0));

    let snap = sim.step().unwrap();

    let v0 = sim.store.bodies[0].v;
    let v1 = sim.store.bodies[1].v;
    assert!((v0 + v1).norm() < 1e-15);
    assert!((v0.x - 0.01).abs() < 1e-12, "expected G m c / d^2 = 0.01, got {}", v0.x);
    assert_eq!(v0.y, 0.0);
    assert_eq!(v1.y, 0.0);

    assert!(snap.positions[0].x > 0.0);
    assert!(snap.positions[1].x < 10.0);
    assert_eq!(sim.store.bodies[0].f, NVec2::zeros());
}

#[test]
fn symmetric_start_keeps_zero_momentum() {
    // invariant under quarter turns about the world center, nothing on a midline
    let bodies = vec![
        body(20.0, 10.0),
        body(-10.0, 20.0),
        body(-20.0, -10.0),
        body(10.0, -20.0),
        body(35.0, 5.0),
        body(-5.0, 35.0),
        body(-35.0, -5.0),
        body(5.0, -35.0),
    ];
    let mut sim = simulation(bodies, test_params(0.5));
    sim.step().unwrap();

    assert!(sim.store.momentum().norm() < 1e-12);
}

#[test]
fn random_start_momentum_bounded_by_theta() {
    let bodies = random_bodies(100, 17);

    let mut exact = simulation(bodies.clone(), test_params(0.0));
    exact.step().unwrap();
    assert!(exact.store.momentum().norm() < 1e-9);

    let mut approx = simulation(bodies, test_params(0.3));
    approx.step().unwrap();
    let scale: f64 = approx.store.bodies.iter().map(|b| b.m * b.v.norm()).sum();
    assert!(approx.store.momentum().norm() < 0.05 * scale);
}

#[test]
fn escaped_body_is_excluded_and_counted() {
    let bodies = vec![body(0.0, 0.0), body(10.0, 0.0), body(80.0, 0.0)];
    let mut sim = simulation(bodies, test_params(0.0));

    let snap = sim.step().unwrap();

    assert_eq!(snap.escaped, 1);
    assert_eq!(sim.store.bodies[2].v, NVec2::zeros());
    // the escaped body does not pull on the others either
    let v0 = sim.store.bodies[0].v;
    assert!((v0 + sim.store.bodies[1].v).norm() < 1e-15);
}

#[test]
fn snapshot_exposes_tree_nodes() {
    let bodies = random_bodies(20, 1);
    let mut sim = simulation(bodies, test_params(0.5));

    let snap = sim.step().unwrap();

    assert_eq!(snap.tick, 1);
    assert_eq!(snap.positions.len(), 20);
    assert_eq!(snap.nodes[0].min, world().min);
    assert_eq!(snap.nodes[0].max, world().max);
    assert_eq!(snap.nodes[0].members, 20);
    assert!(snap.nodes.iter().all(|n| n.centroid.is_some() == (n.members > 0)));
    assert_eq!(sim.phase(), Phase::Idle);
}

#[test]
fn run_stops_on_signal_at_tick_boundary() {
    let mut sim = simulation(random_bodies(10, 2), test_params(0.5));

    let ticks = sim.run(|snap| if snap.tick == 3 { Control::Stop } else { Control::Continue }).unwrap();

    assert_eq!(ticks, 3);
    assert_eq!(sim.phase(), Phase::Stopped);
    assert_eq!(sim.step().unwrap_err(), SimError::Stopped);
}

#[test]
fn run_honors_tick_limit() {
    let scenario = Scenario::from_bodies(
        world(),
        test_params(0.5),
        Engine { solver: SolverConfig::BarnesHut, max_ticks: Some(5) },
        random_bodies(10, 4),
    )
    .unwrap();
    let mut sim = Simulation::new(scenario);

    let ticks = sim.run(|_| Control::Continue).unwrap();
    assert_eq!(ticks, 5);
}

#[test]
fn direct_solver_matches_zero_theta_tick() {
    let bodies = random_bodies(40, 8);

    let mut tree_sim = simulation(bodies.clone(), test_params(0.0));
    let scenario = Scenario::from_bodies(
        world(),
        test_params(0.0),
        Engine { solver: SolverConfig::Direct, max_ticks: None },
        bodies,
    )
    .unwrap();
    let mut direct_sim = Simulation::new(scenario);

    let a = tree_sim.step().unwrap();
    let b = direct_sim.step().unwrap();
    for (pa, pb) in a.positions.iter().zip(b.positions.iter()) {
        assert!(close(*pa, *pb, 1e-9));
    }
}

#[test]
fn direct_solver_skips_escaped_bodies() {
    let bodies = vec![body(0.0, 0.0), body(10.0, 0.0), body(80.0, 0.0)];
    let scenario = Scenario::from_bodies(
        world(),
        test_params(0.0),
        Engine { solver: SolverConfig::Direct, max_ticks: None },
        bodies.clone(),
    )
    .unwrap();
    let mut direct_sim = Simulation::new(scenario);
    let mut tree_sim = simulation(bodies, test_params(0.0));

    let snap = direct_sim.step().unwrap();
    tree_sim.step().unwrap();

    assert_eq!(snap.escaped, 1);
    assert_eq!(direct_sim.store.bodies[2].v, NVec2::zeros());
    assert!((direct_sim.store.bodies[0].v + direct_sim.store.bodies[1].v).norm() < 1e-15);
    for (a, b) in direct_sim.store.bodies.iter().zip(tree_sim.store.bodies.iter()) {
        assert!(close(a.x, b.x, 1e-12));
        assert!(close(a.v, b.v, 1e-12));
    }
}

#[test]
fn failed_tick_leaves_bodies_untouched() {
    let mut sim = simulation(vec![body(-10.0, 0.0), body(0.0, 5.0), body(10.0, 0.0)], test_params(0.5));
    let mut fresh = simulation(vec![body(-10.0, 0.0), body(0.0, 5.0), body(10.0, 0.0)], test_params(0.5));

    sim.store.bodies[1].m = 0.0;
    let before = sim.store.bodies.clone();

    let err = sim.step().unwrap_err();
    assert_eq!(err, SimError::NonPositiveMass { index: 1, mass: 0.0 });
    assert_eq!(sim.store.bodies, before);
    assert_eq!(sim.tick(), 0);
    assert_eq!(sim.phase(), Phase::Idle);

    // once repaired, the tick is the one it would have been
    sim.store.bodies[1].m = 1.0;
    let a = sim.step().unwrap();
    let b = fresh.step().unwrap();
    assert_eq!(a.positions, b.positions);
}

// ==================================================================================
// Configuration tests
// ==================================================================================

#[test]
fn yaml_scenario_loads_with_defaults() {
    let yaml = r#"
world:
  min: [0.0, 0.0]
  max: [600.0, 600.0]
parameters:
  theta: 0.7
generate:
  count: 25
"#;
    let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
    let scenario = Scenario::build_scenario(cfg).unwrap();

    assert_eq!(scenario.store.len(), 25);
    assert_eq!(scenario.parameters.theta, 0.7);
    assert_eq!(scenario.engine.solver, SolverConfig::BarnesHut);
    assert!(scenario.store.bodies.iter().all(|b| scenario.world.contains(&b.x)));
    assert!(scenario.store.bodies.iter().all(|b| b.v == NVec2::zeros()));
}

#[test]
fn same_seed_same_placement() {
    let a = random_bodies(10, 99);
    let b = random_bodies(10, 99);
    let c = random_bodies(10, 100);

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn explicit_bodies_replace_generation() {
    let yaml = r#"
engine:
  solver: "direct"
bodies:
  - x: [100.0, 100.0]
    m: 2.0
  - x: [200.0, 100.0]
    v: [0.0, 1.0]
    m: 1.0
    c: 0.0
"#;
    let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
    let scenario = Scenario::build_scenario(cfg).unwrap();

    assert_eq!(scenario.store.len(), 2);
    assert_eq!(scenario.store.bodies[0].c, 2.0);
    assert_eq!(scenario.store.bodies[1].c, 0.0);
    assert_eq!(scenario.store.bodies[1].v, NVec2::new(0.0, 1.0));
    assert_eq!(scenario.engine.solver, SolverConfig::Direct);
}

#[test]
fn zero_body_count_is_rejected() {
    let mut cfg = ScenarioConfig::default();
    cfg.generate.count = 0;

    assert_eq!(Scenario::build_scenario(cfg).unwrap_err(), SimError::NonPositiveBodyCount(0));
}

#[test]
fn non_positive_mass_is_rejected() {
    let mut cfg = ScenarioConfig::default();
    cfg.generate.mass = 0.0;

    assert!(matches!(Scenario::build_scenario(cfg), Err(SimError::NonPositiveMass { index: 0, .. })));
}

#[test]
fn degenerate_world_is_rejected() {
    let mut cfg = ScenarioConfig::default();
    cfg.world.max = [600.0, 0.0];

    assert!(matches!(Scenario::build_scenario(cfg), Err(SimError::DegenerateBounds { .. })));
}

#[test]
fn negative_theta_is_rejected() {
    let mut cfg = ScenarioConfig::default();
    cfg.parameters.theta = -1.0;

    assert!(matches!(Scenario::build_scenario(cfg), Err(SimError::InvalidParameter(_))));
}

#[test]
fn oversized_depth_cap_is_rejected() {
    let p = Parameters { max_depth: 1_000_000, ..test_params(0.5) };
    assert!(matches!(p.validate(), Err(SimError::InvalidParameter(_))));
    assert!(matches!(
        Scenario::from_bodies(world(), p, Engine::default(), vec![body(0.0, 0.0), body(0.0, 0.0)]),
        Err(SimError::InvalidParameter(_))
    ));

    let mut cfg = ScenarioConfig::default();
    cfg.parameters.max_depth = MAX_DEPTH_LIMIT;
    assert!(Scenario::build_scenario(cfg).is_ok());
}
