//! Filter configuration
//!
//! Noise parameters, sensor switches and initialization settings. A
//! configuration is fixed once handed to a [`FusionFilter`](super::fusion::FusionFilter).

use nalgebra::{RealField, SVector};
use num_traits::Float;

use crate::models::{positive_sigma, PositionSensor, ProcessNoise, RangeSensor};
use crate::types::belief::STATE_DIM;
use crate::Result;

/// Configuration of a [`FusionFilter`](super::fusion::FusionFilter).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig<T: RealField> {
    process: ProcessNoise<T>,
    position: PositionSensor<T>,
    range: RangeSensor<T>,
    position_enabled: bool,
    range_enabled: bool,
    symmetrize: bool,
    initial_variances: [T; STATE_DIM],
}

impl<T: RealField + Float + Copy> FilterConfig<T> {
    /// Creates a configuration with both sensors enabled.
    ///
    /// Default values:
    /// - initial variances: `[1, 1, 10, 50, 3]`
    /// - symmetrization: off
    pub fn new(process: ProcessNoise<T>, position: PositionSensor<T>, range: RangeSensor<T>) -> Self {
        Self {
            process,
            position,
            range,
            position_enabled: true,
            range_enabled: true,
            symmetrize: false,
            initial_variances: [1.0, 1.0, 10.0, 50.0, 3.0].map(nalgebra::convert::<f64, T>),
        }
    }

    /// Enables or disables corrections from the position sensor.
    pub fn with_position_enabled(mut self, enabled: bool) -> Self {
        self.position_enabled = enabled;
        self
    }

    /// Enables or disables corrections from the range sensor.
    pub fn with_range_enabled(mut self, enabled: bool) -> Self {
        self.range_enabled = enabled;
        self
    }

    /// Replaces each corrected covariance by (P + Pᵀ)/2 when set.
    pub fn with_symmetrization(mut self, enabled: bool) -> Self {
        self.symmetrize = enabled;
        self
    }

    /// Sets the diagonal of the covariance seeded on the first observation.
    ///
    /// # Errors
    /// Returns [`FilterError::InvalidNoise`](crate::FilterError::InvalidNoise)
    /// if a variance is non-positive or not finite.
    pub fn with_initial_variances(mut self, variances: [T; STATE_DIM]) -> Result<Self> {
        const NAMES: [&str; STATE_DIM] = ["var_px", "var_py", "var_v", "var_yaw", "var_yaw_rate"];
        for (name, value) in NAMES.iter().zip(variances.iter()) {
            positive_sigma(*name, *value)?;
        }
        self.initial_variances = variances;
        Ok(self)
    }

    /// Process noise of the motion model.
    #[inline]
    pub fn process_noise(&self) -> &ProcessNoise<T> {
        &self.process
    }

    /// Position sensor model.
    #[inline]
    pub fn position_sensor(&self) -> &PositionSensor<T> {
        &self.position
    }

    /// Range/bearing/range-rate sensor model.
    #[inline]
    pub fn range_sensor(&self) -> &RangeSensor<T> {
        &self.range
    }

    /// Whether position observations correct the belief.
    #[inline]
    pub fn position_enabled(&self) -> bool {
        self.position_enabled
    }

    /// Whether range observations correct the belief.
    #[inline]
    pub fn range_enabled(&self) -> bool {
        self.range_enabled
    }

    /// Whether the updated covariance is re-symmetrized.
    #[inline]
    pub fn symmetrize(&self) -> bool {
        self.symmetrize
    }

    /// Diagonal of the initial covariance.
    #[inline]
    pub fn initial_variances(&self) -> SVector<T, STATE_DIM> {
        SVector::from(self.initial_variances)
    }
}

impl<T: RealField + Float + Copy> Default for FilterConfig<T> {
    fn default() -> Self {
        Self::new(
            ProcessNoise::default(),
            PositionSensor::default(),
            RangeSensor::default(),
        )
    }
}
