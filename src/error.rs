//! Error types for the simulation core.
//!
//! Configuration problems are fatal at startup; the remaining variants are
//! contract violations surfaced while a tick runs.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("body count must be positive, got {0}")]
    NonPositiveBodyCount(usize),

    #[error("body {index} has non-positive mass {mass}")]
    NonPositiveMass { index: usize, mass: f64 },

    #[error("body {index} has negative charge {charge}")]
    NegativeCharge { index: usize, charge: f64 },

    #[error("degenerate world bounds: min {min:?}, max {max:?}")]
    DegenerateBounds { min: [f64; 2], max: [f64; 2] },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("aggregate of node {node} read before it was computed")]
    AggregateNotComputed { node: usize },

    #[error("simulation was stopped")]
    Stopped,
}

pub type Result<T> = std::result::Result<T, SimError>;
