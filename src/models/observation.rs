//! Observation (sensor) models
//!
//! Describes how sensor measurements relate to the CTRV state. Both sensors
//! implement [`MeasurementModel`], so prediction of the measurement and the
//! correction that follows are written once for either sensor.

use nalgebra::{RealField, SVector};
use num_traits::Float;

use super::transition::positive_sigma;
use crate::filters::sigma::{recover_moments, SigmaMatrix, SigmaWeights, SIGMA_COUNT};
use crate::types::belief::{CtrvState, PX, PY, SPEED, STATE_DIM, YAW};
use crate::types::observation::SensorKind;
use crate::types::spaces::{Measurement, MeasurementCovariance};
use crate::Result;

/// Ranges below this are clamped before dividing by them.
pub const MIN_RANGE: f64 = 1e-4;

/// Index of the bearing in a range-sensor measurement.
pub const BEARING: usize = 1;

/// Measurement prediction for one sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedMeasurement<T: RealField, const M: usize> {
    /// Weighted mean of the measurement sigma points
    pub mean: Measurement<T, M>,
    /// The predicted state sigma points mapped into measurement space
    pub sigma_points: SigmaMatrix<T, M>,
    /// Innovation covariance S, sensor noise included
    pub covariance: MeasurementCovariance<T, M>,
}

/// Trait for nonlinear observation models.
///
/// Describes the measurement process:
/// z = h(x) + v
///
/// where v is zero-mean Gaussian measurement noise with covariance R.
pub trait MeasurementModel<T: RealField + Float + Copy, const M: usize> {
    /// The sensor this model describes.
    const KIND: SensorKind;

    /// Maps a state into measurement space, without noise.
    fn observe(&self, state: &CtrvState<T>) -> Measurement<T, M>;

    /// Returns the measurement noise covariance R.
    fn measurement_noise(&self) -> MeasurementCovariance<T, M>;

    /// Index of the measurement component that is an angle, if any.
    fn angle_index(&self) -> Option<usize> {
        None
    }

    /// Cartesian position implied by a single measurement.
    ///
    /// Used to seed the belief from the first observation.
    fn initial_position(&self, z: &Measurement<T, M>) -> [T; 2];

    /// Predicts the measurement from the predicted state sigma points.
    ///
    /// Every sigma point is mapped through [`observe`](Self::observe), then
    /// the weighted mean and covariance are recovered and R is added.
    fn predict_measurement(
        &self,
        sigma_points: &SigmaMatrix<T, STATE_DIM>,
        weights: &SigmaWeights<T>,
    ) -> PredictedMeasurement<T, M> {
        let mut z_sig = SigmaMatrix::<T, M>::zeros();
        for i in 0..SIGMA_COUNT {
            let state = CtrvState::from_svector(sigma_points.column(i).into_owned());
            z_sig.set_column(i, self.observe(&state).as_svector());
        }

        let (mean, cov) = recover_moments(&z_sig, weights, self.angle_index());
        let covariance = MeasurementCovariance::from_matrix(cov + self.measurement_noise().as_matrix());

        PredictedMeasurement {
            mean: Measurement::from_svector(mean),
            sigma_points: z_sig,
            covariance,
        }
    }
}

// ============================================================================
// Position Sensor
// ============================================================================

/// Cartesian position sensor.
///
/// Observes [px, py] from state [px, py, v, yaw, yaw_rate]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSensor<T: RealField> {
    std_px: T,
    std_py: T,
}

impl<T: RealField + Float + Copy> PositionSensor<T> {
    /// Creates a new position sensor.
    ///
    /// # Arguments
    /// - `std_px`: x position noise standard deviation in m (must be > 0)
    /// - `std_py`: y position noise standard deviation in m (must be > 0)
    pub fn new(std_px: T, std_py: T) -> Result<Self> {
        Ok(Self {
            std_px: positive_sigma("std_px", std_px)?,
            std_py: positive_sigma("std_py", std_py)?,
        })
    }

    /// Noise standard deviations `[x, y]`.
    #[inline]
    pub fn std_devs(&self) -> [T; 2] {
        [self.std_px, self.std_py]
    }
}

impl<T: RealField + Float + Copy> Default for PositionSensor<T> {
    fn default() -> Self {
        Self {
            std_px: nalgebra::convert(0.15),
            std_py: nalgebra::convert(0.15),
        }
    }
}

impl<T: RealField + Float + Copy> MeasurementModel<T, 2> for PositionSensor<T> {
    const KIND: SensorKind = SensorKind::Position;

    fn observe(&self, state: &CtrvState<T>) -> Measurement<T, 2> {
        Measurement::from_array([*state.index(PX), *state.index(PY)])
    }

    fn measurement_noise(&self) -> MeasurementCovariance<T, 2> {
        MeasurementCovariance::from_diagonal(&SVector::<T, 2>::from([
            self.std_px * self.std_px,
            self.std_py * self.std_py,
        ]))
    }

    fn initial_position(&self, z: &Measurement<T, 2>) -> [T; 2] {
        [*z.index(0), *z.index(1)]
    }
}

// ============================================================================
// Range Sensor
// ============================================================================

/// Range / bearing / range-rate sensor (radar-like), located at the origin.
///
/// Observes [range, bearing, range_rate]. The bearing is measured
/// counter-clockwise from the x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSensor<T: RealField> {
    std_range: T,
    std_bearing: T,
    std_range_rate: T,
}

impl<T: RealField + Float + Copy> RangeSensor<T> {
    /// Creates a new range sensor.
    ///
    /// # Arguments
    /// - `std_range`: Range noise standard deviation in m (must be > 0)
    /// - `std_bearing`: Bearing noise standard deviation in rad (must be > 0)
    /// - `std_range_rate`: Range-rate noise standard deviation in m/s (must be > 0)
    pub fn new(std_range: T, std_bearing: T, std_range_rate: T) -> Result<Self> {
        Ok(Self {
            std_range: positive_sigma("std_range", std_range)?,
            std_bearing: positive_sigma("std_bearing", std_bearing)?,
            std_range_rate: positive_sigma("std_range_rate", std_range_rate)?,
        })
    }

    /// Noise standard deviations `[range, bearing, range_rate]`.
    #[inline]
    pub fn std_devs(&self) -> [T; 3] {
        [self.std_range, self.std_bearing, self.std_range_rate]
    }
}

impl<T: RealField + Float + Copy> Default for RangeSensor<T> {
    fn default() -> Self {
        Self {
            std_range: nalgebra::convert(0.3),
            std_bearing: nalgebra::convert(0.03),
            std_range_rate: nalgebra::convert(0.3),
        }
    }
}

impl<T: RealField + Float + Copy> MeasurementModel<T, 3> for RangeSensor<T> {
    const KIND: SensorKind = SensorKind::Range;

    fn observe(&self, state: &CtrvState<T>) -> Measurement<T, 3> {
        let px = *state.index(PX);
        let py = *state.index(PY);
        let v = *state.index(SPEED);
        let yaw = *state.index(YAW);

        let range = Float::sqrt(px * px + py * py);
        let bearing = Float::atan2(py, px);

        // Range rate is singular at the sensor origin
        let denom = Float::max(range, nalgebra::convert::<f64, T>(MIN_RANGE));
        let (sin_yaw, cos_yaw) = Float::sin_cos(yaw);
        let range_rate = (px * v * cos_yaw + py * v * sin_yaw) / denom;

        Measurement::from_array([range, bearing, range_rate])
    }

    fn measurement_noise(&self) -> MeasurementCovariance<T, 3> {
        MeasurementCovariance::from_diagonal(&SVector::<T, 3>::from([
            self.std_range * self.std_range,
            self.std_bearing * self.std_bearing,
            self.std_range_rate * self.std_range_rate,
        ]))
    }

    fn angle_index(&self) -> Option<usize> {
        Some(BEARING)
    }

    fn initial_position(&self, z: &Measurement<T, 3>) -> [T; 2] {
        let range = *z.index(0);
        let (sin_b, cos_b) = Float::sin_cos(*z.index(BEARING));
        [range * cos_b, range * sin_b]
    }
}
