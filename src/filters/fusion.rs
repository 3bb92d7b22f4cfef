//! Sensor-fusion orchestrator
//!
//! [`FusionFilter`] consumes a time-ordered stream of observations from
//! either sensor. The first observation seeds the belief; every later one
//! runs one prediction over the elapsed time followed by the correction of
//! the sensor that produced it.
//!
//! # Example
//!
//! ```
//! use ctrv_tracker::prelude::*;
//!
//! let config = FilterConfig::<f64>::default().with_range_enabled(false);
//! let mut filter = FusionFilter::new(config);
//!
//! filter.process(&Observation::position(1.0, 2.0, 0)).unwrap();
//! let outcome = filter.process(&Observation::range(2.2, 1.1, 0.0, 50_000)).unwrap();
//!
//! // Range sensor disabled: the belief is only predicted forward
//! assert!(matches!(outcome, StepOutcome::PredictedOnly { .. }));
//! assert_eq!(filter.last_timestamp(), Some(50_000));
//! ```

use nalgebra::RealField;
use num_traits::Float;
use tracing::{debug, warn};

use super::config::FilterConfig;
use super::sigma::{SigmaMatrix, SigmaWeights};
use super::ukf;
use crate::models::{CtrvModel, MeasurementModel};
use crate::types::belief::{Belief, CtrvState, STATE_DIM};
use crate::types::observation::{Observation, SensorKind, SensorReading};
use crate::{FilterError, Result};

/// Microseconds per second.
const MICROS_PER_SECOND: f64 = 1e6;

/// What one call to [`FusionFilter::process`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome<T: RealField> {
    /// The observation seeded the belief, nothing was predicted or corrected
    Initialized {
        /// Sensor of the seeding observation
        sensor: SensorKind,
    },
    /// The belief was predicted and corrected
    Corrected {
        /// Sensor whose measurement was applied
        sensor: SensorKind,
        /// Elapsed time in seconds
        dt: T,
        /// Normalized innovation squared of the correction
        nis: T,
    },
    /// The belief was predicted only, the sensor is disabled
    PredictedOnly {
        /// Sensor of the skipped measurement
        sensor: SensorKind,
        /// Elapsed time in seconds
        dt: T,
    },
}

impl<T: RealField + Copy> StepOutcome<T> {
    /// The sensor of the processed observation.
    pub fn sensor(&self) -> SensorKind {
        match self {
            StepOutcome::Initialized { sensor }
            | StepOutcome::Corrected { sensor, .. }
            | StepOutcome::PredictedOnly { sensor, .. } => *sensor,
        }
    }

    /// Returns true if a measurement correction was applied.
    pub fn is_corrected(&self) -> bool {
        matches!(self, StepOutcome::Corrected { .. })
    }

    /// Normalized innovation squared, if a correction was applied.
    pub fn nis(&self) -> Option<T> {
        match self {
            StepOutcome::Corrected { nis, .. } => Some(*nis),
            _ => None,
        }
    }
}

/// Lifecycle of the filter.
#[derive(Debug, Clone, PartialEq)]
enum Phase<T: RealField> {
    Uninitialized,
    Tracking {
        belief: Belief<T>,
        timestamp_us: u64,
        sigma_points: Option<SigmaMatrix<T, STATE_DIM>>,
    },
}

/// Single-target CTRV tracker fusing position and range observations.
///
/// Observations must arrive in non-decreasing timestamp order. A failing
/// call leaves the filter exactly as it was before the call.
#[derive(Debug, Clone)]
pub struct FusionFilter<T: RealField> {
    config: FilterConfig<T>,
    model: CtrvModel<T>,
    weights: SigmaWeights<T>,
    phase: Phase<T>,
}

impl<T: RealField + Float + Copy> FusionFilter<T> {
    /// Creates an uninitialized filter.
    pub fn new(config: FilterConfig<T>) -> Self {
        Self {
            model: CtrvModel::new(*config.process_noise()),
            weights: SigmaWeights::standard(),
            config,
            phase: Phase::Uninitialized,
        }
    }

    /// Processes one observation.
    ///
    /// # Errors
    /// - [`FilterError::TimestampRegression`] if the observation is older
    ///   than the last processed one
    /// - [`FilterError::NotPositiveDefinite`] or
    ///   [`FilterError::SingularInnovation`] if the estimate has diverged;
    ///   the caller should [`reset`](Self::reset) the filter
    pub fn process(&mut self, observation: &Observation<T>) -> Result<StepOutcome<T>> {
        let (belief, previous) = match &self.phase {
            Phase::Uninitialized => return Ok(self.initialize(observation)),
            Phase::Tracking {
                belief,
                timestamp_us,
                ..
            } => (belief, *timestamp_us),
        };

        let current = observation.timestamp_us;
        if current < previous {
            warn!(previous, current, "observation timestamp regressed");
            return Err(FilterError::TimestampRegression { previous, current });
        }

        let dt = nalgebra::convert::<f64, T>((current - previous) as f64 / MICROS_PER_SECOND);
        let sensor = observation.kind();

        let prediction = ukf::predict(belief, &self.model, &self.weights, dt)
            .inspect_err(|err| warn!(%err, "prediction failed"))?;

        let symmetrize = self.config.symmetrize();
        let corrected = match &observation.reading {
            SensorReading::Position(z) if self.config.position_enabled() => Some(ukf::correct(
                &prediction,
                self.config.position_sensor(),
                z,
                &self.weights,
                symmetrize,
            )
            .map(|c| (c.belief, c.nis))),
            SensorReading::Range(z) if self.config.range_enabled() => Some(ukf::correct(
                &prediction,
                self.config.range_sensor(),
                z,
                &self.weights,
                symmetrize,
            )
            .map(|c| (c.belief, c.nis))),
            _ => None,
        };

        let (belief, outcome) = match corrected {
            Some(Ok((belief, nis))) => (belief, StepOutcome::Corrected { sensor, dt, nis }),
            Some(Err(err)) => {
                warn!(%err, %sensor, "correction failed");
                return Err(err);
            }
            None => {
                debug!(%sensor, "sensor disabled, prediction only");
                (prediction.belief, StepOutcome::PredictedOnly { sensor, dt })
            }
        };

        self.phase = Phase::Tracking {
            belief,
            timestamp_us: current,
            sigma_points: Some(prediction.sigma_points),
        };
        Ok(outcome)
    }

    fn initialize(&mut self, observation: &Observation<T>) -> StepOutcome<T> {
        let [px, py] = match &observation.reading {
            SensorReading::Position(z) => self.config.position_sensor().initial_position(z),
            SensorReading::Range(z) => self.config.range_sensor().initial_position(z),
        };

        let zero = T::zero();
        let belief = Belief::with_diagonal_covariance(
            CtrvState::from_array([px, py, zero, zero, zero]),
            &self.config.initial_variances(),
        );

        let sensor = observation.kind();
        debug!(%sensor, px = ?px, py = ?py, "filter initialized");

        self.phase = Phase::Tracking {
            belief,
            timestamp_us: observation.timestamp_us,
            sigma_points: None,
        };
        StepOutcome::Initialized { sensor }
    }

    /// Returns the filter to its uninitialized state.
    pub fn reset(&mut self) {
        self.phase = Phase::Uninitialized;
    }

    /// Returns true once the first observation has been processed.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        matches!(self.phase, Phase::Tracking { .. })
    }

    /// The current belief, `None` before the first observation.
    pub fn belief(&self) -> Option<&Belief<T>> {
        match &self.phase {
            Phase::Tracking { belief, .. } => Some(belief),
            Phase::Uninitialized => None,
        }
    }

    /// Timestamp of the last processed observation in microseconds.
    pub fn last_timestamp(&self) -> Option<u64> {
        match &self.phase {
            Phase::Tracking { timestamp_us, .. } => Some(*timestamp_us),
            Phase::Uninitialized => None,
        }
    }

    /// Sigma points of the most recent prediction.
    ///
    /// `None` until the first prediction has run.
    pub fn predicted_sigma_points(&self) -> Option<&SigmaMatrix<T, STATE_DIM>> {
        match &self.phase {
            Phase::Tracking { sigma_points, .. } => sigma_points.as_ref(),
            Phase::Uninitialized => None,
        }
    }

    /// Configuration the filter was built with.
    #[inline]
    pub fn config(&self) -> &FilterConfig<T> {
        &self.config
    }
}
