// src/motion/integrator.rs
//! Converts elapsed control-loop time into distance travelled along the body.
//!
//! Every segment advances by the same increment each tick, so the spacing
//! `distances[i] - distances[0] == -i * length_per_segment` never changes.

use super::MotionError;

/// Result of a single [`TimeIntegrator::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    /// Seconds since the previous tick
    pub interval: f64,
    /// Distance every segment moved during `interval`
    pub delta_distance: f64,
}

#[derive(Debug, Clone)]
pub struct TimeIntegrator {
    /// Distance travelled by each segment; index 0 is the head reference point
    distances: Vec<f64>,
    length_per_segment: f64,
    target_speed: f64,
    last_tick: Option<f64>,
}

impl TimeIntegrator {
    pub fn new(segment_count: usize, length_per_segment: f64, target_speed: f64) -> Self {
        let distances = (0..=segment_count)
            .map(|i| -(i as f64) * length_per_segment)
            .collect();
        Self {
            distances,
            length_per_segment,
            target_speed,
            last_tick: None,
        }
    }

    /// Record `now` as the reference time for the next advance.
    pub fn arm(&mut self, now: f64) {
        self.last_tick = Some(now);
    }

    pub fn is_armed(&self) -> bool {
        self.last_tick.is_some()
    }

    /// Validate `now` against the last tick without touching any state.
    pub fn interval_to(&self, now: f64) -> Result<f64, MotionError> {
        let last = self.last_tick.ok_or(MotionError::Uninitialized)?;
        if now < last || !now.is_finite() {
            return Err(MotionError::Clock { now, last });
        }
        Ok(now - last)
    }

    pub fn advance(&mut self, now: f64) -> Result<Advance, MotionError> {
        let interval = self.interval_to(now)?;
        let delta_distance = self.target_speed * interval;
        if !delta_distance.is_finite() || self.distances.iter().any(|d| !(d + delta_distance).is_finite()) {
            return Err(MotionError::InvalidConfig(format!(
                "travel over {}s at speed {} overflows",
                interval, self.target_speed
            )));
        }
        for distance in self.distances.iter_mut() {
            *distance += delta_distance;
        }
        self.last_tick = Some(now);
        Ok(Advance {
            interval,
            delta_distance,
        })
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn head_distance(&self) -> f64 {
        self.distances[0]
    }

    pub fn length_per_segment(&self) -> f64 {
        self.length_per_segment
    }

    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    pub fn set_target_speed(&mut self, target_speed: f64) {
        self.target_speed = target_speed;
    }

    pub fn last_tick(&self) -> Option<f64> {
        self.last_tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_spacing() {
        let integrator = TimeIntegrator::new(4, 100.0, 50.0);
        assert_eq!(integrator.distances(), &[0.0, -100.0, -200.0, -300.0, -400.0]);
        assert!(!integrator.is_armed());
    }

    #[test]
    fn test_advance_requires_arm() {
        let mut integrator = TimeIntegrator::new(4, 100.0, 50.0);
        assert_eq!(integrator.advance(1.0), Err(MotionError::Uninitialized));
        assert_eq!(integrator.head_distance(), 0.0);
    }

    #[test]
    fn test_advance_moves_every_segment() {
        let mut integrator = TimeIntegrator::new(3, 10.0, 50.0);
        integrator.arm(2.0);
        let step = integrator.advance(2.5).unwrap();
        assert!((step.interval - 0.5).abs() < 1e-12);
        assert!((step.delta_distance - 25.0).abs() < 1e-12);
        assert_eq!(integrator.distances(), &[25.0, 15.0, 5.0, -5.0]);
        assert_eq!(integrator.last_tick(), Some(2.5));
    }

    #[test]
    fn test_clock_regression_rejected_without_mutation() {
        let mut integrator = TimeIntegrator::new(3, 10.0, 50.0);
        integrator.arm(5.0);
        let err = integrator.advance(4.0).unwrap_err();
        assert_eq!(err, MotionError::Clock { now: 4.0, last: 5.0 });
        assert_eq!(integrator.distances(), &[0.0, -10.0, -20.0, -30.0]);
        assert_eq!(integrator.last_tick(), Some(5.0));
    }

    #[test]
    fn test_overflowing_travel_rejected_without_mutation() {
        let mut integrator = TimeIntegrator::new(3, 10.0, 1e300);
        integrator.arm(0.0);
        assert!(matches!(integrator.advance(1e10), Err(MotionError::InvalidConfig(_))));
        assert_eq!(integrator.distances(), &[0.0, -10.0, -20.0, -30.0]);
        assert_eq!(integrator.last_tick(), Some(0.0));
        integrator.set_target_speed(50.0);
        let step = integrator.advance(2.0).unwrap();
        assert_eq!(step.delta_distance, 100.0);
        assert_eq!(integrator.head_distance(), 100.0);
    }

    #[test]
    fn test_speed_change_applies_next_tick() {
        let mut integrator = TimeIntegrator::new(2, 10.0, 10.0);
        integrator.arm(0.0);
        integrator.advance(1.0).unwrap();
        integrator.set_target_speed(20.0);
        integrator.advance(2.0).unwrap();
        assert!((integrator.head_distance() - 30.0).abs() < 1e-12);
    }
}
