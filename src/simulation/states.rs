//! Core state types for the 2D simulation.
//!
//! - `Body` holds position, velocity, the force accumulator, mass and charge
//! - `BodyStore` owns the fixed body list and the tick counter
//! - `Bounds` is the axis-aligned rectangle used for the world and tree nodes

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub f: NVec2, // accumulated force, cleared by the integrator
    pub m: f64, // mass
    pub c: f64, // charge, weight this body exerts on others
}

impl Body {
    /// Body at rest with an empty force accumulator
    pub fn at_rest(x: NVec2, m: f64, c: f64) -> Self {
        Self {
            x,
            v: NVec2::zeros(),
            f: NVec2::zeros(),
            m,
            c,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BodyStore {
    pub bodies: Vec<Body>, // fixed for the whole run
    pub tick: u64, // completed ticks
}

impl BodyStore {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, tick: 0 }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn positions(&self) -> Vec<NVec2> {
        self.bodies.iter().map(|b| b.x).collect()
    }

    /// Total linear momentum, sum of m * v
    pub fn momentum(&self) -> NVec2 {
        self.bodies.iter().fold(NVec2::zeros(), |p, b| p + b.v * b.m)
    }
}

/// Axis-aligned rectangle from `min` (start corner) to `max` (end corner)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: NVec2,
    pub max: NVec2,
}

impl Bounds {
    pub fn new(min: NVec2, max: NVec2) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> NVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Larger side length, the size metric used by the opening-angle test
    pub fn size(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0) || !self.width().is_finite() || !self.height().is_finite()
    }

    /// Closed containment test, edges included
    pub fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}
