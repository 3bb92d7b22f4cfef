//! Transition (motion) model for target dynamics
//!
//! Constant turn-rate and velocity (CTRV) with process noise carried as two
//! extra state components (longitudinal and yaw acceleration), so the noise
//! passes through the same nonlinear law as the state.

use nalgebra::{RealField, SMatrix, SVector};
use num_traits::{Float, ToPrimitive};

use crate::types::belief::{Belief, PX, PY, SPEED, STATE_DIM, YAW, YAW_RATE};
use crate::{FilterError, Result};

/// Dimension of the augmented state `[px, py, v, yaw, yaw_rate, nu_a, nu_yawdd]`.
pub const AUG_DIM: usize = STATE_DIM + 2;

/// Index of the longitudinal acceleration noise in the augmented state.
pub const NU_A: usize = 5;
/// Index of the yaw acceleration noise in the augmented state.
pub const NU_YAWDD: usize = 6;

/// Heading rates at or below this magnitude use the straight-line branch.
pub const MIN_TURN_RATE: f64 = 1e-3;

/// Process noise standard deviations of the CTRV model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessNoise<T: RealField> {
    std_a: T,
    std_yawdd: T,
}

impl<T: RealField + Float + Copy> ProcessNoise<T> {
    /// Creates process noise parameters.
    ///
    /// # Arguments
    /// - `std_a`: Longitudinal acceleration standard deviation in m/s² (must be > 0)
    /// - `std_yawdd`: Yaw acceleration standard deviation in rad/s² (must be > 0)
    ///
    /// # Errors
    /// Returns [`FilterError::InvalidNoise`] for a non-positive or non-finite value.
    pub fn new(std_a: T, std_yawdd: T) -> Result<Self> {
        Ok(Self {
            std_a: positive_sigma("std_a", std_a)?,
            std_yawdd: positive_sigma("std_yawdd", std_yawdd)?,
        })
    }

    /// Longitudinal acceleration standard deviation.
    #[inline]
    pub fn std_a(&self) -> T {
        self.std_a
    }

    /// Yaw acceleration standard deviation.
    #[inline]
    pub fn std_yawdd(&self) -> T {
        self.std_yawdd
    }
}

impl<T: RealField + Float + Copy> Default for ProcessNoise<T> {
    fn default() -> Self {
        Self {
            std_a: nalgebra::convert(0.7),
            std_yawdd: nalgebra::convert(0.9),
        }
    }
}

/// Validates a noise standard deviation.
pub(crate) fn positive_sigma<T: RealField + Float + Copy>(
    parameter: &'static str,
    value: T,
) -> Result<T> {
    if Float::is_finite(value) && value > T::zero() {
        Ok(value)
    } else {
        Err(FilterError::InvalidNoise {
            parameter,
            value: ToPrimitive::to_f64(&value).unwrap_or(f64::NAN),
        })
    }
}

/// Constant turn-rate and velocity model.
///
/// State: [px, py, v, yaw, yaw_rate]
#[derive(Debug, Clone)]
pub struct CtrvModel<T: RealField> {
    /// Process noise standard deviations
    pub noise: ProcessNoise<T>,
}

impl<T: RealField + Float + Copy> CtrvModel<T> {
    /// Creates a CTRV model with the given process noise.
    #[inline]
    pub fn new(noise: ProcessNoise<T>) -> Self {
        Self { noise }
    }

    /// Builds the augmented mean and covariance.
    ///
    /// The state is extended with two zero-mean noise components whose
    /// variances are the squared process noise deviations.
    pub fn augment(&self, belief: &Belief<T>) -> (SVector<T, AUG_DIM>, SMatrix<T, AUG_DIM, AUG_DIM>) {
        let mut mean = SVector::<T, AUG_DIM>::zeros();
        mean.fixed_rows_mut::<STATE_DIM>(0)
            .copy_from(belief.mean.as_svector());

        let mut cov = SMatrix::<T, AUG_DIM, AUG_DIM>::zeros();
        cov.fixed_view_mut::<STATE_DIM, STATE_DIM>(0, 0)
            .copy_from(belief.covariance.as_matrix());
        cov[(NU_A, NU_A)] = self.noise.std_a * self.noise.std_a;
        cov[(NU_YAWDD, NU_YAWDD)] = self.noise.std_yawdd * self.noise.std_yawdd;

        (mean, cov)
    }

    /// Propagates one augmented sigma point forward by `dt` seconds.
    ///
    /// No bound is enforced on `dt`; `dt = 0` returns the state part unchanged.
    pub fn predict_augmented(&self, point: &SVector<T, AUG_DIM>, dt: T) -> SVector<T, STATE_DIM> {
        let px = point[PX];
        let py = point[PY];
        let v = point[SPEED];
        let yaw = point[YAW];
        let yawd = point[YAW_RATE];
        let nu_a = point[NU_A];
        let nu_yawdd = point[NU_YAWDD];

        let (sin_yaw, cos_yaw) = Float::sin_cos(yaw);

        let (mut px_p, mut py_p) = if Float::abs(yawd) > nalgebra::convert::<f64, T>(MIN_TURN_RATE) {
            let yaw_end = yaw + yawd * dt;
            let r = v / yawd;
            (
                px + r * (Float::sin(yaw_end) - sin_yaw),
                py + r * (cos_yaw - Float::cos(yaw_end)),
            )
        } else {
            // Straight line, avoids dividing by a vanishing turn rate
            (px + v * dt * cos_yaw, py + v * dt * sin_yaw)
        };

        let half_dt2 = nalgebra::convert::<f64, T>(0.5) * dt * dt;

        px_p += half_dt2 * nu_a * cos_yaw;
        py_p += half_dt2 * nu_a * sin_yaw;
        let v_p = v + nu_a * dt;
        let yaw_p = yaw + yawd * dt + half_dt2 * nu_yawdd;
        let yawd_p = yawd + nu_yawdd * dt;

        SVector::<T, STATE_DIM>::from([px_p, py_p, v_p, yaw_p, yawd_p])
    }

    /// Propagates every column of an augmented sigma point matrix.
    pub fn predict_sigma_points<const S: usize>(
        &self,
        augmented: &SMatrix<T, AUG_DIM, S>,
        dt: T,
    ) -> SMatrix<T, STATE_DIM, S> {
        let mut predicted = SMatrix::<T, STATE_DIM, S>::zeros();
        for i in 0..S {
            let column = augmented.column(i).into_owned();
            predicted.set_column(i, &self.predict_augmented(&column, dt));
        }
        predicted
    }
}
