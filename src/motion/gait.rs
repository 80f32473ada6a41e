// src/motion/gait.rs
use serde::{Deserialize, Serialize};

/// Shape parameters of the undulation curve for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GaitParameters {
    /// Amplitude of the bend (rad)
    pub a: f64,
    /// Spatial frequency coefficient (rad per length-unit travelled)
    pub b: f64,
    /// Phase-rate coefficient, a constant turning bias (rad per length-unit travelled)
    pub c: f64,
}

impl GaitParameters {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite()
    }
}

impl Default for GaitParameters {
    fn default() -> Self {
        Self {
            a: std::f64::consts::FRAC_PI_3,
            b: std::f64::consts::FRAC_PI_2,
            c: 0.0,
        }
    }
}

/// A gait change waiting for a segment to reach the distance the head was at
/// when the change was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingChange {
    pub gait: GaitParameters,
    pub trigger_distance: f64,
}

impl PendingChange {
    pub fn is_due(&self, distance_traveled: f64) -> bool {
        self.trigger_distance <= distance_traveled
    }
}
