//! High-level runtime engine settings
//!
//! Selects the force solver and how long the loop runs

use crate::configuration::config::SolverConfig;

#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub solver: SolverConfig, // barnes-hut or direct summation
    pub max_ticks: Option<u64>, // None = run until stopped
}
