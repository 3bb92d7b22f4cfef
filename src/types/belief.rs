//! The tracked belief
//!
//! Mean and covariance of the CTRV state `[px, py, v, yaw, yaw_rate]`.
//! A `Belief` is a plain value: prediction and correction take one and
//! return a new one, the filter owns the current one.

use nalgebra::{RealField, SVector};
use num_traits::Float;

use super::spaces::{StateCovariance, StateVector};

/// Dimension of the CTRV state.
pub const STATE_DIM: usize = 5;

/// Index of the x position (m).
pub const PX: usize = 0;
/// Index of the y position (m).
pub const PY: usize = 1;
/// Index of the speed magnitude (m/s).
pub const SPEED: usize = 2;
/// Index of the heading angle (rad, counter-clockwise from the x axis).
pub const YAW: usize = 3;
/// Index of the heading rate (rad/s).
pub const YAW_RATE: usize = 4;

/// CTRV state vector.
pub type CtrvState<T> = StateVector<T, STATE_DIM>;

/// CTRV state covariance.
pub type CtrvCovariance<T> = StateCovariance<T, STATE_DIM>;

/// State estimate of the tracked object.
///
/// Contains the mean and covariance of the state estimate. Units are SI:
/// meters, meters/second, radians, radians/second.
#[derive(Debug, Clone, PartialEq)]
pub struct Belief<T: RealField> {
    /// State estimate mean
    pub mean: CtrvState<T>,
    /// State estimate covariance
    pub covariance: CtrvCovariance<T>,
}

impl<T: RealField + Float + Copy> Belief<T> {
    /// Creates a new belief.
    #[inline]
    pub fn new(mean: CtrvState<T>, covariance: CtrvCovariance<T>) -> Self {
        Self { mean, covariance }
    }

    /// Creates a belief with diagonal covariance.
    #[inline]
    pub fn with_diagonal_covariance(mean: CtrvState<T>, diagonal: &SVector<T, STATE_DIM>) -> Self {
        Self {
            mean,
            covariance: CtrvCovariance::from_diagonal(diagonal),
        }
    }

    /// Returns `[px, py]`.
    #[inline]
    pub fn position(&self) -> [T; 2] {
        [*self.mean.index(PX), *self.mean.index(PY)]
    }

    /// Returns the speed magnitude.
    #[inline]
    pub fn speed(&self) -> T {
        *self.mean.index(SPEED)
    }

    /// Returns the heading angle.
    #[inline]
    pub fn heading(&self) -> T {
        *self.mean.index(YAW)
    }

    /// Returns the heading rate.
    #[inline]
    pub fn yaw_rate(&self) -> T {
        *self.mean.index(YAW_RATE)
    }

    /// Returns the Cartesian velocity `[vx, vy]` implied by speed and heading.
    #[inline]
    pub fn velocity(&self) -> [T; 2] {
        let v = self.speed();
        let yaw = self.heading();
        [v * Float::cos(yaw), v * Float::sin(yaw)]
    }

    /// Returns the trace of the covariance matrix (sum of variances).
    #[inline]
    pub fn uncertainty(&self) -> T {
        self.covariance.trace()
    }

    /// Checks that the covariance equals its transpose within `tolerance`.
    #[inline]
    pub fn is_symmetric(&self, tolerance: T) -> bool {
        self.covariance.asymmetry() <= tolerance
    }

    /// Returns true when every mean and covariance entry is finite.
    pub fn is_finite(&self) -> bool {
        self.mean.as_slice().iter().all(|v| Float::is_finite(*v))
            && self
                .covariance
                .as_matrix()
                .iter()
                .all(|v| Float::is_finite(*v))
    }
}
