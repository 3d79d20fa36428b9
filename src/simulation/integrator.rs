//! Fixed-step semi-implicit Euler integrator
//!
//! Consumes the force accumulated during the solve phase:
//! `v += F / m * dt`, then `x += v * dt`, then `F = 0`

use crate::error::{Result, SimError};
use super::states::{Body, BodyStore, NVec2};

/// Advance a single body by `dt` and clear its force accumulator.
/// `index` is only used to report a non-positive mass.
pub fn integrate_body(index: usize, b: &mut Body, dt: f64) -> Result<()> {
    if !(b.m > 0.0) {
        return Err(SimError::NonPositiveMass { index, mass: b.m });
    }

    // Kick with the accumulated force, then drift with the updated velocity
    b.v += b.f / b.m * dt;
    b.x += b.v * dt;
    b.f = NVec2::zeros();
    Ok(())
}

/// First body with a non-positive mass, if any
pub fn check_masses(bodies: &[Body]) -> Result<()> {
    match bodies.iter().position(|b| !(b.m > 0.0)) {
        Some(index) => Err(SimError::NonPositiveMass { index, mass: bodies[index].m }),
        None => Ok(()),
    }
}

/// Advance every body in the store by one step.
/// Masses are checked up front, so on error no body has moved.
pub fn euler_integrator(store: &mut BodyStore, dt: f64) -> Result<()> {
    check_masses(&store.bodies)?;
    for (i, b) in store.bodies.iter_mut().enumerate() {
        integrate_body(i, b, dt)?;
    }
    Ok(())
}
