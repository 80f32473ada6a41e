// src/motion/mod.rs - Lateral undulation pipeline

pub mod controller;
pub mod curvature;
pub mod gait;
pub mod integrator;
pub mod kinematics;
pub mod propagation;

pub use controller::{SnakeJoints, TickReport};
pub use gait::{GaitParameters, PendingChange};
pub use propagation::PropagationPolicy;

use thiserror::Error;

/// Errors surfaced by the joint-velocity model.
///
/// Every variant is fatal to the call that produced it; nothing is retried internally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotionError {
    #[error("Model has not been armed; call arm() before querying joint velocities")]
    Uninitialized,
    #[error("Clock went backwards: now = {now}s, last tick = {last}s")]
    Clock { now: f64, last: f64 },
    #[error("Linear algebra error: {0}")]
    LinearAlgebra(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
