//! CTRV-Tracker: Unscented Kalman filtering of a single maneuvering target
//!
//! Fuses asynchronous observations from a Cartesian position sensor and a
//! range/bearing/range-rate sensor into one belief over the state
//! `[px, py, v, yaw, yaw_rate]`, propagated with the constant turn-rate and
//! velocity (CTRV) motion model.
//!
//! # Features
//!
//! - **Augmented Unscented Transform**: process noise is sampled through the
//!   same nonlinear motion law as the state, no Jacobians required
//! - **Typed Spaces**: state vectors, measurements and innovations cannot be mixed
//! - **Explicit Failure**: a diverged covariance surfaces as [`FilterError`],
//!   never as NaN state
//! - **no_std Support**: disable the default `std` feature for embedded targets
//!
//! # Example
//!
//! ```
//! use ctrv_tracker::prelude::*;
//!
//! let mut filter = FusionFilter::new(FilterConfig::<f64>::default());
//!
//! // First observation only seeds the belief
//! let first = Observation::range(5.0, 0.0, 0.0, 0);
//! filter.process(&first).unwrap();
//! assert!((filter.belief().unwrap().position()[0] - 5.0).abs() < 1e-12);
//!
//! // Every later observation runs one predict + update cycle
//! let second = Observation::range(5.0, 0.0, 1.0, 1_000_000);
//! let outcome = filter.process(&second).unwrap();
//! assert!(outcome.is_corrected());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod filters;
pub mod models;
pub mod types;

pub mod prelude {
    pub use crate::filters::config::*;
    pub use crate::filters::fusion::*;
    pub use crate::models::*;
    pub use crate::types::belief::*;
    pub use crate::types::observation::*;
    pub use crate::{FilterError, Result};
}

use types::observation::SensorKind;

/// Error types for the library
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A noise standard deviation was non-positive or not finite
    InvalidNoise {
        /// Name of the offending parameter
        parameter: &'static str,
        /// The rejected value, widened to `f64` for reporting
        value: f64,
    },
    /// The augmented covariance is not positive (semi-)definite
    NotPositiveDefinite,
    /// The innovation covariance could not be inverted
    SingularInnovation,
    /// An observation is older than the filter's reference time
    TimestampRegression {
        /// Reference timestamp in microseconds
        previous: u64,
        /// Offending timestamp in microseconds
        current: u64,
    },
    /// A raw measurement has the wrong number of components for its sensor
    MeasurementLength {
        /// Sensor the measurement was tagged with
        sensor: SensorKind,
        /// Components the sensor produces
        expected: usize,
        /// Components supplied
        actual: usize,
    },
}

impl FilterError {
    /// Returns true for failures meaning the recursive estimate has diverged.
    pub fn is_divergence(&self) -> bool {
        matches!(
            self,
            FilterError::NotPositiveDefinite | FilterError::SingularInnovation
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FilterError {}

impl ::core::fmt::Display for FilterError {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        match self {
            FilterError::InvalidNoise { parameter, value } => {
                write!(f, "Noise parameter {} must be positive, got {}", parameter, value)
            }
            FilterError::NotPositiveDefinite => {
                write!(f, "Covariance matrix is not positive definite")
            }
            FilterError::SingularInnovation => write!(f, "Innovation covariance is singular"),
            FilterError::TimestampRegression { previous, current } => write!(
                f,
                "Timestamp {} us precedes reference time {} us",
                current, previous
            ),
            FilterError::MeasurementLength {
                sensor,
                expected,
                actual,
            } => write!(
                f,
                "{} measurement needs {} components, got {}",
                sensor, expected, actual
            ),
        }
    }
}

pub type Result<T> = ::core::result::Result<T, FilterError>;
