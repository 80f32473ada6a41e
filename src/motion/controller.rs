// src/motion/controller.rs - Joint velocity model driving the snake's lateral undulation
use std::collections::VecDeque;

use nalgebra::{DVector, Vector2};

use super::curvature::CurvatureModel;
use super::gait::{GaitParameters, PendingChange};
use super::integrator::TimeIntegrator;
use super::kinematics::KinematicsSolver;
use super::propagation::{ParameterPropagationQueue, PropagationPolicy};
use super::MotionError;
use crate::config::SnakeConfig;
use crate::scheduler::ControlClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    /// Accepts configuration and gait requests, rejects velocity queries
    Unarmed,
    Armed,
}

/// Everything computed during one control tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub interval: f64,
    pub delta_distance: f64,
    /// Number of queued gait changes picked up this tick, across all segments
    pub applied_changes: usize,
    /// Curvature of segments `1..=N`
    pub thetas: DVector<f64>,
    pub head_angle: f64,
    pub heading: Vector2<f64>,
    /// Angular velocity commands for joints `1..N`
    pub phis: DVector<f64>,
}

/// Computes joint angular velocities for a snake robot of `segment_count` links.
///
/// Not internally synchronised: callers sharing one model between threads must
/// serialise access themselves.
#[derive(Debug, Clone)]
pub struct SnakeJoints {
    integrator: TimeIntegrator,
    propagation: ParameterPropagationQueue,
    curvature: CurvatureModel,
    solver: KinematicsSolver,
    state: ArmState,
    body_length: f64,
}

impl SnakeJoints {
    pub fn new(
        gait: GaitParameters,
        segment_count: usize,
        body_length: f64,
        target_speed: f64,
    ) -> Result<Self, MotionError> {
        Self::with_policy(gait, segment_count, body_length, target_speed, PropagationPolicy::default())
    }

    pub fn with_policy(
        gait: GaitParameters,
        segment_count: usize,
        body_length: f64,
        target_speed: f64,
        policy: PropagationPolicy,
    ) -> Result<Self, MotionError> {
        if !(body_length.is_finite() && body_length > 0.0) {
            return Err(MotionError::InvalidConfig(format!(
                "body length must be positive and finite, got {}",
                body_length
            )));
        }
        if !target_speed.is_finite() {
            return Err(MotionError::InvalidConfig(format!(
                "target speed must be finite, got {}",
                target_speed
            )));
        }
        if !gait.is_finite() {
            return Err(MotionError::InvalidConfig(format!(
                "gait parameters must be finite, got {:?}",
                gait
            )));
        }
        let length_per_segment = body_length / segment_count as f64;
        let solver = KinematicsSolver::new(segment_count, length_per_segment)?;
        let integrator = TimeIntegrator::new(segment_count, length_per_segment, target_speed);
        let curvature = CurvatureModel::new(gait, integrator.distances());

        tracing::debug!(
            "Created snake model: {} segments, {:.1} per segment, speed {:.1}, {:?} propagation",
            segment_count,
            length_per_segment,
            target_speed,
            policy
        );

        Ok(Self {
            integrator,
            propagation: ParameterPropagationQueue::new(segment_count + 1, policy),
            curvature,
            solver,
            state: ArmState::Unarmed,
            body_length,
        })
    }

    pub fn from_config(config: &SnakeConfig, gait: GaitParameters) -> Result<Self, MotionError> {
        Self::with_policy(
            gait,
            config.segment_count,
            config.body_length,
            config.target_speed,
            config.propagation,
        )
    }

    /// Start the control loop at `now`. Re-arming only moves the reference time.
    pub fn arm(&mut self, now: f64) {
        self.integrator.arm(now);
        self.state = ArmState::Armed;
        tracing::info!("Snake model armed at t={:.3}s", now);
    }

    pub fn arm_with<C: ControlClock + ?Sized>(&mut self, clock: &C) {
        self.arm(clock.now_seconds());
    }

    /// Queue a gait change. The head picks it up on the next tick; every other
    /// segment once it reaches the distance the head is at now.
    pub fn request_change(&mut self, a: f64, b: f64, c: f64) -> Result<(), MotionError> {
        self.request_gait(GaitParameters::new(a, b, c))
    }

    pub fn request_gait(&mut self, gait: GaitParameters) -> Result<(), MotionError> {
        if !gait.is_finite() {
            return Err(MotionError::InvalidConfig(format!(
                "gait parameters must be finite, got {:?}",
                gait
            )));
        }
        let head_distance = self.integrator.head_distance();
        self.propagation.request_change(gait, head_distance);
        tracing::debug!(
            "Queued gait a={:.4} b={:.4} c={:.4} at head distance {:.3}",
            gait.a,
            gait.b,
            gait.c,
            head_distance
        );
        Ok(())
    }

    /// Takes effect from the next tick.
    pub fn set_target_speed(&mut self, target_speed: f64) -> Result<(), MotionError> {
        if !target_speed.is_finite() {
            return Err(MotionError::InvalidConfig(format!(
                "target speed must be finite, got {}",
                target_speed
            )));
        }
        self.integrator.set_target_speed(target_speed);
        tracing::info!("Target speed set to {:.3}", target_speed);
        Ok(())
    }

    /// Run one full tick at `now` and return every intermediate result.
    ///
    /// Fails without touching any state when unarmed or when `now` is earlier
    /// than the previous tick.
    pub fn step(&mut self, now: f64) -> Result<TickReport, MotionError> {
        if self.state == ArmState::Unarmed {
            tracing::warn!("Joint velocity query rejected: model is not armed");
            return Err(MotionError::Uninitialized);
        }
        let advance = self.integrator.advance(now).inspect_err(|e| {
            tracing::warn!("Joint velocity query rejected: {}", e);
        })?;

        let applied_changes = self
            .propagation
            .apply_eligible(self.integrator.distances(), self.curvature.gait_mut());
        self.curvature.accumulate(advance.delta_distance);

        let thetas = self.curvature.thetas();
        let head_angle = self.curvature.head_angle();
        let heading = self.curvature.head_heading();
        let phis = self.solver.solve(&thetas, &heading).inspect_err(|e| {
            tracing::warn!("Joint velocity solve failed at t={:.3}s: {}", now, e);
        })?;

        tracing::debug!(
            "Tick t={:.3}s dt={:.4}s ds={:.3} head={:.3} applied={}",
            now,
            advance.interval,
            advance.delta_distance,
            self.integrator.head_distance(),
            applied_changes
        );

        Ok(TickReport {
            interval: advance.interval,
            delta_distance: advance.delta_distance,
            applied_changes,
            thetas,
            head_angle,
            heading,
            phis,
        })
    }

    /// Advance to `now` and return the `N-1` joint angular velocities.
    pub fn query_angular_velocities(&mut self, now: f64) -> Result<DVector<f64>, MotionError> {
        self.step(now).map(|report| report.phis)
    }

    pub fn query_with<C: ControlClock + ?Sized>(&mut self, clock: &C) -> Result<DVector<f64>, MotionError> {
        self.query_angular_velocities(clock.now_seconds())
    }

    pub fn is_armed(&self) -> bool {
        self.state == ArmState::Armed
    }

    pub fn state(&self) -> ArmState {
        self.state
    }

    pub fn segment_count(&self) -> usize {
        self.solver.segment_count()
    }

    pub fn body_length(&self) -> f64 {
        self.body_length
    }

    pub fn length_per_segment(&self) -> f64 {
        self.integrator.length_per_segment()
    }

    pub fn target_speed(&self) -> f64 {
        self.integrator.target_speed()
    }

    pub fn policy(&self) -> PropagationPolicy {
        self.propagation.policy()
    }

    /// Distance travelled per segment; index 0 is the head reference point.
    pub fn distances(&self) -> &[f64] {
        self.integrator.distances()
    }

    pub fn head_distance(&self) -> f64 {
        self.integrator.head_distance()
    }

    pub fn gait(&self, segment: usize) -> Option<&GaitParameters> {
        self.curvature.gait(segment)
    }

    pub fn pending_changes(&self, segment: usize) -> Option<&VecDeque<PendingChange>> {
        self.propagation.pending(segment)
    }

    pub fn thetas(&self) -> DVector<f64> {
        self.curvature.thetas()
    }

    pub fn head_heading(&self) -> Vector2<f64> {
        self.curvature.head_heading()
    }

    pub fn curvature(&self) -> &CurvatureModel {
        &self.curvature
    }

    pub fn solver(&self) -> &KinematicsSolver {
        &self.solver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3};

    fn reference_model() -> SnakeJoints {
        SnakeJoints::new(GaitParameters::new(FRAC_PI_3, FRAC_PI_2, 0.0), 12, 1500.0, 50.0).unwrap()
    }

    #[test]
    fn test_construction_defaults() {
        let snake = reference_model();
        assert_eq!(snake.segment_count(), 12);
        assert_eq!(snake.length_per_segment(), 125.0);
        assert_eq!(snake.distances().len(), 13);
        assert_eq!(snake.state(), ArmState::Unarmed);
        assert_eq!(snake.policy(), PropagationPolicy::SingleStep);
    }

    #[test]
    fn test_invalid_construction() {
        let gait = GaitParameters::default();
        assert!(matches!(SnakeJoints::new(gait, 1, 1500.0, 50.0), Err(MotionError::InvalidConfig(_))));
        assert!(matches!(SnakeJoints::new(gait, 12, 0.0, 50.0), Err(MotionError::InvalidConfig(_))));
        assert!(matches!(SnakeJoints::new(gait, 12, 1500.0, f64::NAN), Err(MotionError::InvalidConfig(_))));
        assert!(matches!(
            SnakeJoints::new(GaitParameters::new(f64::INFINITY, 0.0, 0.0), 12, 1500.0, 50.0),
            Err(MotionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_query_before_arm_leaves_state_untouched() {
        let mut snake = reference_model();
        snake.request_change(0.5, 1.0, 0.0).unwrap();
        let distances = snake.distances().to_vec();
        let thetas = snake.thetas();
        assert_eq!(snake.query_angular_velocities(3.0), Err(MotionError::Uninitialized));
        assert_eq!(snake.distances(), distances.as_slice());
        assert_eq!(snake.thetas(), thetas);
        assert_eq!(snake.pending_changes(0).unwrap().len(), 1);
        assert_eq!(snake.gait(0), Some(&GaitParameters::new(FRAC_PI_3, FRAC_PI_2, 0.0)));
    }

    #[test]
    fn test_reference_tick() {
        let mut snake = reference_model();
        snake.arm(0.0);
        let report = snake.step(0.0).unwrap();
        assert_eq!(report.phis.len(), 11);
        assert!(report.phis.iter().all(|phi| phi.is_finite()));
        assert!((report.head_angle - FRAC_PI_3).abs() < 1e-12);
        assert_eq!(report.delta_distance, 0.0);
    }

    #[test]
    fn test_clock_regression_is_rejected() {
        let mut snake = reference_model();
        snake.arm(10.0);
        snake.step(11.0).unwrap();
        let head = snake.head_distance();
        assert_eq!(
            snake.query_angular_velocities(10.5),
            Err(MotionError::Clock { now: 10.5, last: 11.0 })
        );
        assert_eq!(snake.head_distance(), head);
    }

    #[test]
    fn test_head_applies_change_on_next_tick() {
        let mut snake = reference_model();
        snake.arm(0.0);
        snake.request_change(0.25, 0.01, 0.0).unwrap();
        let report = snake.step(0.0).unwrap();
        assert_eq!(report.applied_changes, 1);
        assert_eq!(snake.gait(0), Some(&GaitParameters::new(0.25, 0.01, 0.0)));
        assert_eq!(snake.gait(1), Some(&GaitParameters::new(FRAC_PI_3, FRAC_PI_2, 0.0)));
    }

    #[test]
    fn test_subnormal_body_fails_with_non_finite_inverse() {
        let mut snake = SnakeJoints::new(GaitParameters::new(FRAC_PI_3, FRAC_PI_2, 0.0), 12, 1e-310, 50.0).unwrap();
        snake.arm(0.0);
        assert_eq!(
            snake.query_angular_velocities(0.0),
            Err(MotionError::LinearAlgebra("coupling matrix inverse is not finite".to_string()))
        );
    }

    #[test]
    fn test_overflowing_speed_leaves_model_usable() {
        let mut snake = reference_model();
        snake.set_target_speed(1e300).unwrap();
        snake.arm(0.0);
        assert!(matches!(snake.step(1e10), Err(MotionError::InvalidConfig(_))));
        assert_eq!(snake.head_distance(), 0.0);
        snake.set_target_speed(50.0).unwrap();
        let phis = snake.query_angular_velocities(1e10 + 1.0).unwrap();
        assert!(phis.iter().all(|phi| phi.is_finite()));
    }

    #[test]
    fn test_set_target_speed_rejects_non_finite() {
        let mut snake = reference_model();
        assert!(snake.set_target_speed(f64::NAN).is_err());
        assert_eq!(snake.target_speed(), 50.0);
        snake.set_target_speed(80.0).unwrap();
        assert_eq!(snake.target_speed(), 80.0);
    }

    #[test]
    fn test_request_change_rejects_non_finite() {
        let mut snake = reference_model();
        assert!(snake.request_change(f64::NAN, 0.0, 0.0).is_err());
        assert_eq!(snake.pending_changes(0).unwrap().len(), 0);
    }
}
