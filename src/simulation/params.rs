//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - step size `dt` (one tick by default),
//! - softening distance and gravitational constant,
//! - opening angle `theta` and the subdivision depth cap,
//! - random seed used for initial placement

use crate::error::{Result, SimError};

/// Deepest subdivision accepted, tree building recurses once per level
pub const MAX_DEPTH_LIMIT: usize = 64;

#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64, // step size
    pub softening: f64, // pair contributions closer than this are skipped
    pub G: f64, // gravitational constant
    pub theta: f64, // opening angle threshold
    pub max_depth: usize, // subdivision cap
    pub seed: u64, // deterministic seed
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            dt: 1.0,
            softening: 1.0,
            G: 1.0,
            theta: 0.5,
            max_depth: 32,
            seed: 42,
        }
    }
}

impl Parameters {
    /// Squared softening distance as compared against squared separations
    pub fn softening2(&self) -> f64 {
        self.softening * self.softening
    }

    /// Reject parameter sets the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(SimError::InvalidParameter(format!("dt must be positive, got {}", self.dt)));
        }
        if !(self.softening >= 0.0) {
            return Err(SimError::InvalidParameter(format!("softening must be non-negative, got {}", self.softening)));
        }
        if !(self.theta >= 0.0) {
            return Err(SimError::InvalidParameter(format!("theta must be non-negative, got {}", self.theta)));
        }
        if !self.G.is_finite() {
            return Err(SimError::InvalidParameter(format!("G must be finite, got {}", self.G)));
        }
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH_LIMIT {
            return Err(SimError::InvalidParameter(format!(
                "max_depth must be in 1..={}, got {}",
                MAX_DEPTH_LIMIT, self.max_depth
            )));
        }
        Ok(())
    }
}
