// src/motion/kinematics.rs
//! Joint angular velocities from body curvature and the commanded head heading.
//!
//! `phi = D · (M⁻¹ · (P · head))` where `D` differences adjacent joints, `M`
//! couples each link to every link ahead of it and `P` projects the head
//! direction onto each link's local frame.

use nalgebra::{DMatrix, DVector, Vector2};

use super::MotionError;

/// Solver for a chain of `segment_count` equal links.
#[derive(Debug, Clone, Copy)]
pub struct KinematicsSolver {
    segment_count: usize,
    length_per_segment: f64,
}

impl KinematicsSolver {
    pub fn new(segment_count: usize, length_per_segment: f64) -> Result<Self, MotionError> {
        if segment_count < 2 {
            return Err(MotionError::InvalidConfig(format!(
                "need at least 2 segments to form a joint, got {}",
                segment_count
            )));
        }
        if !(length_per_segment.is_finite() && length_per_segment > 0.0) {
            return Err(MotionError::InvalidConfig(format!(
                "segment length must be positive and finite, got {}",
                length_per_segment
            )));
        }
        Ok(Self {
            segment_count,
            length_per_segment,
        })
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// `(N-1, N)` operator with `+1` on the diagonal and `-1` just right of it.
    pub fn difference_operator(&self) -> DMatrix<f64> {
        let n = self.segment_count;
        DMatrix::from_fn(n - 1, n, |i, j| {
            if j == i {
                1.0
            } else if j == i + 1 {
                -1.0
            } else {
                0.0
            }
        })
    }

    /// Lower-triangular `(N, N)` coupling matrix.
    ///
    /// The diagonal is always `0.5 * L`, so `det(M) = (0.5 * L)^N`.
    pub fn coupling_matrix(&self, thetas: &DVector<f64>) -> DMatrix<f64> {
        let length = self.length_per_segment;
        DMatrix::from_fn(self.segment_count, self.segment_count, |i, j| {
            if i == j {
                0.5 * length
            } else if j < i {
                (thetas[i] - thetas[j]).cos() * length
            } else {
                0.0
            }
        })
    }

    /// `(N, 2)` matrix whose row `i` is the normal of link `i`.
    pub fn projection_matrix(&self, thetas: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(self.segment_count, 2, |i, j| match j {
            0 => -thetas[i].sin(),
            _ => thetas[i].cos(),
        })
    }

    /// Solve for the `N-1` joint angular velocities.
    pub fn solve(&self, thetas: &DVector<f64>, heading: &Vector2<f64>) -> Result<DVector<f64>, MotionError> {
        if thetas.len() != self.segment_count {
            return Err(MotionError::LinearAlgebra(format!(
                "expected {} curvature values, got {}",
                self.segment_count,
                thetas.len()
            )));
        }
        if thetas.iter().any(|t| !t.is_finite()) || heading.iter().any(|h| !h.is_finite()) {
            return Err(MotionError::LinearAlgebra(
                "non-finite curvature or heading".to_string(),
            ));
        }

        let coupling = self.coupling_matrix(thetas);
        let inverse = coupling.try_inverse().ok_or_else(|| {
            MotionError::LinearAlgebra("coupling matrix is singular".to_string())
        })?;
        if inverse.iter().any(|v| !v.is_finite()) {
            return Err(MotionError::LinearAlgebra(
                "coupling matrix inverse is not finite".to_string(),
            ));
        }

        let head = DVector::from_column_slice(heading.as_slice());
        let link_rates = inverse * (self.projection_matrix(thetas) * head);
        Ok(self.difference_operator() * link_rates)
    }
}
