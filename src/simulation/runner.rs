//! Tick loop for the simulation.
//!
//! One tick walks `Idle → Building → Aggregating → Solving → Integrating`
//! and back to `Idle`, then hands a read-only [`Snapshot`] to whoever drives
//! the loop. The driver answers with a [`Control`]; a stop is only honored
//! between ticks.

use log::{debug, info, warn};

use crate::configuration::config::SolverConfig;
use crate::error::{Result, SimError};
use crate::simulation::engine::Engine;
use crate::simulation::forces::{BarnesHutGravity, DirectGravity, ForceModel};
use crate::simulation::integrator::{check_masses, euler_integrator};
use crate::simulation::params::Parameters;
use crate::simulation::quad_tree::QuadTree;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{BodyStore, Bounds, NVec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Building,
    Aggregating,
    Solving,
    Integrating,
    Stopped,
}

/// Answer of the loop driver after each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop,
}

/// Boundary of one tree node as seen by the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub min: NVec2,
    pub max: NVec2,
    pub members: usize,
    pub centroid: Option<NVec2>, // None when the node has no valid aggregate
}

/// Read-only state handed out once per tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub positions: Vec<NVec2>,
    pub nodes: Vec<NodeView>,
    pub escaped: usize, // bodies left out of this tick's tree
}

pub struct Simulation {
    pub world: Bounds,
    pub engine: Engine,
    pub parameters: Parameters,
    pub store: BodyStore,
    tree: QuadTree,
    forces: Box<dyn ForceModel + Send + Sync>,
    phase: Phase,
}

impl Simulation {
    pub fn new(scenario: Scenario) -> Self {
        let Scenario { world, engine, parameters, store } = scenario;

        let forces: Box<dyn ForceModel + Send + Sync> = match engine.solver {
            SolverConfig::BarnesHut => Box::new(BarnesHutGravity::from_parameters(&parameters)),
            SolverConfig::Direct => Box::new(DirectGravity {
                G: parameters.G,
                softening: parameters.softening,
            }),
        };

        info!(
            "simulation ready: {} bodies, solver {:?}, theta {}, softening {}",
            store.len(),
            engine.solver,
            parameters.theta,
            parameters.softening
        );

        Self {
            world,
            engine,
            tree: QuadTree::new(parameters.max_depth),
            parameters,
            store,
            forces,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick(&self) -> u64 {
        self.store.tick
    }

    /// Snapshot of the current positions with no tree overlay
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.store.tick,
            positions: self.store.positions(),
            nodes: Vec::new(),
            escaped: 0,
        }
    }

    /// Honored at the next tick boundary, which is now since ticks never
    /// suspend
    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
    }

    /// Run one full tick and return its snapshot.
    ///
    /// Positions in the snapshot are post-integration; node views describe
    /// the tree the forces were solved on. On error no body has changed and
    /// the phase is back to `Idle`.
    pub fn step(&mut self) -> Result<Snapshot> {
        if self.phase == Phase::Stopped {
            return Err(SimError::Stopped);
        }

        let result = self.run_phases();
        if result.is_err() {
            // a failed tick leaves the bodies as they were before it
            self.tree.clear();
            self.phase = Phase::Idle;
        }
        result
    }

    fn run_phases(&mut self) -> Result<Snapshot> {
        // checked before any accumulator is touched
        check_masses(&self.store.bodies)?;

        self.phase = Phase::Building;
        self.tree.rebuild(self.world, &self.store.bodies);
        let escaped = self.tree.escaped().len();
        if escaped > 0 {
            warn!("tick {}: {} bodies outside the world bounds", self.store.tick, escaped);
        }

        self.phase = Phase::Aggregating;
        self.tree.aggregate_all(&self.store.bodies);

        self.phase = Phase::Solving;
        self.forces.accumulate_forces(&self.tree, &mut self.store.bodies)?;

        self.phase = Phase::Integrating;
        euler_integrator(&mut self.store, self.parameters.dt)?;
        self.store.tick += 1;

        let snapshot = Snapshot {
            tick: self.store.tick,
            positions: self.store.positions(),
            nodes: self.node_views(),
            escaped,
        };
        debug!("tick {}: {} nodes", snapshot.tick, snapshot.nodes.len());

        self.tree.clear();
        self.phase = Phase::Idle;
        Ok(snapshot)
    }

    /// Drive ticks until `control` returns [`Control::Stop`] or the engine's
    /// tick limit is reached. Returns the number of completed ticks.
    pub fn run<F>(&mut self, mut control: F) -> Result<u64>
    where
        F: FnMut(&Snapshot) -> Control,
    {
        loop {
            if let Some(max) = self.engine.max_ticks {
                if self.store.tick >= max {
                    break;
                }
            }

            let snapshot = self.step()?;
            if control(&snapshot) == Control::Stop {
                self.stop();
                break;
            }
        }

        info!("simulation finished after {} ticks", self.store.tick);
        Ok(self.store.tick)
    }

    fn node_views(&self) -> Vec<NodeView> {
        self.tree
            .nodes()
            .iter()
            .map(|n| NodeView {
                min: n.bounds.min,
                max: n.bounds.max,
                members: n.len(),
                centroid: n.aggregate().ok().and_then(|a| a.centroid),
            })
            .collect()
    }
}
