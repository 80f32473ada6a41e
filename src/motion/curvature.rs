// src/motion/curvature.rs
//! Backbone curvature from per-segment gait parameters and accumulated phase.
//!
//! `theta[i] = a[i] * cos(B[i]) + C[i]`, where `B` and `C` integrate `b` and `c`
//! over the distance each segment has travelled.

use nalgebra::{DVector, Vector2};

use super::gait::GaitParameters;

#[derive(Debug, Clone)]
pub struct CurvatureModel {
    gait: Vec<GaitParameters>,
    /// Accumulated spatial phase `B`
    phase: Vec<f64>,
    /// Accumulated bias `C`
    bias: Vec<f64>,
}

impl CurvatureModel {
    /// Start every segment on `initial`, with phase already integrated over the
    /// (negative) distance that puts each segment behind the head.
    pub fn new(initial: GaitParameters, distances: &[f64]) -> Self {
        Self {
            gait: vec![initial; distances.len()],
            phase: distances.iter().map(|d| initial.b * d).collect(),
            bias: distances.iter().map(|d| initial.c * d).collect(),
        }
    }

    /// Integrate phase over one tick. Must run after queued changes are applied so
    /// a fresh change only affects accumulation from this tick on.
    pub fn accumulate(&mut self, delta_distance: f64) {
        for ((phase, bias), gait) in self.phase.iter_mut().zip(self.bias.iter_mut()).zip(&self.gait) {
            *phase += gait.b * delta_distance;
            *bias += gait.c * delta_distance;
        }
    }

    fn angle(&self, segment: usize) -> f64 {
        self.gait[segment].a * self.phase[segment].cos() + self.bias[segment]
    }

    /// Joint curvature for segments `1..=N`.
    pub fn thetas(&self) -> DVector<f64> {
        DVector::from_iterator(self.gait.len() - 1, (1..self.gait.len()).map(|i| self.angle(i)))
    }

    /// Commanded heading angle of the head reference point.
    pub fn head_angle(&self) -> f64 {
        self.angle(0)
    }

    /// Unit vector along the commanded head heading.
    pub fn head_heading(&self) -> Vector2<f64> {
        let theta0 = self.head_angle();
        Vector2::new(theta0.cos(), theta0.sin())
    }

    pub fn gait(&self, segment: usize) -> Option<&GaitParameters> {
        self.gait.get(segment)
    }

    pub(crate) fn gait_mut(&mut self) -> &mut [GaitParameters] {
        &mut self.gait
    }

    pub fn phase(&self) -> &[f64] {
        &self.phase
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }
}
