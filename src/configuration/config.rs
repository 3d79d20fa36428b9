//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`WorldConfig`]      – the rectangular world bounds
//! - [`EngineConfig`]     – force solver selection and run length
//! - [`ParametersConfig`] – numerical parameters and physical constants
//! - [`GenerateConfig`]   – how many random bodies to place, and their mass/charge
//! - [`BodyConfig`]       – explicit initial state for a body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! world:
//!   min: [0.0, 0.0]
//!   max: [600.0, 600.0]
//!
//! engine:
//!   solver: "barnes_hut"    # or "direct"
//!   max_ticks: 2000         # optional, runs until stopped when absent
//!
//! parameters:
//!   dt: 1.0                 # step size, one tick
//!   theta: 0.5              # opening angle
//!   softening: 1.0          # pair forces closer than this are skipped
//!   G: 1.0                  # gravitational constant
//!   seed: 42                # placement seed
//!   max_depth: 32           # quadtree subdivision cap
//!
//! generate:
//!   count: 50
//!   mass: 1.0
//!   charge: 1.0
//!
//! bodies:                   # optional, replaces `generate` when non-empty
//!   - x: [100.0, 300.0]
//!     v: [0.0, 0.0]
//!     m: 1.0
//!     c: 1.0
//! ```
//!
//! The engine then maps this configuration into its runtime scenario,
//! validating it on the way.

use serde::Deserialize;

/// Which force solver the engine uses
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverConfig {
    #[serde(rename = "barnes_hut")] // quadtree with opening-angle approximation
    #[default]
    BarnesHut,

    #[serde(rename = "direct")] // exact O(N^2) pairwise summation
    Direct,
}

/// World rectangle, `min` is the start corner and `max` the end corner
#[derive(Deserialize, Debug, Clone)]
pub struct WorldConfig {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            min: [0.0, 0.0],
            max: [600.0, 600.0],
        }
    }
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub solver: SolverConfig, // force solver
    pub max_ticks: Option<u64>, // stop after this many ticks
}

/// Global numerical and physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub dt: f64,        // time step size
    pub theta: f64,     // opening angle
    pub softening: f64, // prevent singular forces at very small separations
    pub G: f64,         // gravitational constant
    pub seed: u64,      // deterministic seed to make runs reproducable
    pub max_depth: usize, // subdivision cap
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            theta: 0.5,
            softening: 1.0,
            G: 1.0,
            seed: 42,
            max_depth: 32,
        }
    }
}

/// Random placement of `count` bodies at rest inside the world bounds
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GenerateConfig {
    pub count: usize,
    pub mass: f64,
    pub charge: f64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            count: 50,
            mass: 1.0,
            charge: 1.0,
        }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: [f64; 2], // initial position
    #[serde(default)]
    pub v: [f64; 2], // initial velocity
    pub m: f64,      // mass
    pub c: Option<f64>, // charge, defaults to the mass
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub world: WorldConfig,
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub generate: GenerateConfig,
    pub bodies: Vec<BodyConfig>,
}
