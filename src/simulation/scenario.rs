//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - world bounds (`Bounds`)
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - body store (bodies at tick 0)
//!
//! Every configuration error is caught here, before a simulation starts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{BodyConfig, GenerateConfig, ScenarioConfig};
use crate::error::{Result, SimError};
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, BodyStore, Bounds, NVec2};

/// Validated runtime bundle constructed from a [`ScenarioConfig`]
#[derive(Debug, Clone)]
pub struct Scenario {
    pub world: Bounds,
    pub engine: Engine,
    pub parameters: Parameters,
    pub store: BodyStore,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // World bounds
        let world = Bounds::new(
            NVec2::new(cfg.world.min[0], cfg.world.min[1]),
            NVec2::new(cfg.world.max[0], cfg.world.max[1]),
        );
        if world.is_degenerate() {
            return Err(SimError::DegenerateBounds { min: cfg.world.min, max: cfg.world.max });
        }

        // Parameters (runtime) from ParametersConfig
        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            dt: p_cfg.dt,
            softening: p_cfg.softening,
            G: p_cfg.G,
            theta: p_cfg.theta,
            max_depth: p_cfg.max_depth,
            seed: p_cfg.seed,
        };
        parameters.validate()?;

        // Engine (runtime) from EngineConfig
        let engine = Engine {
            solver: cfg.engine.solver,
            max_ticks: cfg.engine.max_ticks,
        };

        // Bodies: explicit list wins over random generation
        let bodies = if cfg.bodies.is_empty() {
            generate_bodies(&world, &cfg.generate, parameters.seed)
        } else {
            cfg.bodies.iter().map(body_from_config).collect()
        };
        validate_bodies(&bodies)?;

        Ok(Self {
            world,
            engine,
            parameters,
            store: BodyStore::new(bodies),
        })
    }

    /// Scenario over an explicit body list, validated like a loaded one
    pub fn from_bodies(world: Bounds, parameters: Parameters, engine: Engine, bodies: Vec<Body>) -> Result<Self> {
        if world.is_degenerate() {
            return Err(SimError::DegenerateBounds {
                min: [world.min.x, world.min.y],
                max: [world.max.x, world.max.y],
            });
        }
        parameters.validate()?;
        validate_bodies(&bodies)?;

        Ok(Self {
            world,
            engine,
            parameters,
            store: BodyStore::new(bodies),
        })
    }
}

/// Place `gen.count` bodies at rest, uniformly inside `world`
pub fn generate_bodies(world: &Bounds, gen: &GenerateConfig, seed: u64) -> Vec<Body> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..gen.count)
        .map(|_| {
            let x = rng.gen_range(world.min.x..world.max.x);
            let y = rng.gen_range(world.min.y..world.max.y);
            Body::at_rest(NVec2::new(x, y), gen.mass, gen.charge)
        })
        .collect()
}

fn body_from_config(bc: &BodyConfig) -> Body {
    Body {
        x: NVec2::new(bc.x[0], bc.x[1]),
        v: NVec2::new(bc.v[0], bc.v[1]),
        f: NVec2::zeros(),
        m: bc.m,
        c: bc.c.unwrap_or(bc.m),
    }
}

fn validate_bodies(bodies: &[Body]) -> Result<()> {
    if bodies.is_empty() {
        return Err(SimError::NonPositiveBodyCount(0));
    }

    for (index, b) in bodies.iter().enumerate() {
        if !(b.m > 0.0) || !b.m.is_finite() {
            return Err(SimError::NonPositiveMass { index, mass: b.m });
        }
        if !(b.c >= 0.0) {
            return Err(SimError::NegativeCharge { index, charge: b.c });
        }
    }
    Ok(())
}
