pub mod error;
pub mod simulation;
pub mod configuration;
#[cfg(feature = "viewer")]
pub mod visualization;
pub mod benchmark;

pub use error::{Result, SimError};

pub use simulation::states::{Body, BodyStore, Bounds, NVec2};
pub use simulation::params::{Parameters, MAX_DEPTH_LIMIT};
pub use simulation::engine::Engine;
pub use simulation::quad_tree::{Aggregate, NodeId, QuadNode, QuadTree};
pub use simulation::forces::{pair_force, direct_forces, direct_forces_among, ForceModel, BarnesHutGravity, DirectGravity};
pub use simulation::integrator::{check_masses, euler_integrator, integrate_body};
pub use simulation::scenario::{Scenario, generate_bodies};
pub use simulation::runner::{Simulation, Snapshot, NodeView, Phase, Control};

pub use configuration::config::{ScenarioConfig, WorldConfig, EngineConfig, ParametersConfig, GenerateConfig, BodyConfig, SolverConfig};

#[cfg(feature = "viewer")]
pub use visualization::viewer2d::run_2d;

pub use benchmark::benchmark::bench_solver;
