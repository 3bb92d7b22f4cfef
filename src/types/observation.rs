//! Timestamped sensor observations
//!
//! The input contract of the filter: a sensor tag, the raw measurement of
//! that sensor and a timestamp in microseconds.

use nalgebra::RealField;

use super::spaces::Measurement;
use crate::{FilterError, Result};

/// The two sensor modalities the filter fuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Cartesian position sensor reporting `[x, y]`
    Position,
    /// Polar sensor reporting `[range, bearing, range_rate]`
    Range,
}

impl SensorKind {
    /// Number of components in a raw measurement of this sensor.
    #[inline]
    pub const fn measurement_len(self) -> usize {
        match self {
            SensorKind::Position => 2,
            SensorKind::Range => 3,
        }
    }
}

impl ::core::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        match self {
            SensorKind::Position => write!(f, "position"),
            SensorKind::Range => write!(f, "range"),
        }
    }
}

/// A raw reading, typed by the sensor that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorReading<T: RealField> {
    /// `[x, y]` in meters
    Position(Measurement<T, 2>),
    /// `[range (m), bearing (rad), range_rate (m/s)]`
    Range(Measurement<T, 3>),
}

impl<T: RealField + Copy> SensorReading<T> {
    /// The sensor this reading came from.
    #[inline]
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorReading::Position(_) => SensorKind::Position,
            SensorReading::Range(_) => SensorKind::Range,
        }
    }
}

/// One observation of the tracked object.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<T: RealField> {
    /// The raw reading
    pub reading: SensorReading<T>,
    /// Acquisition time in microseconds, non-decreasing across a stream
    pub timestamp_us: u64,
}

impl<T: RealField + Copy> Observation<T> {
    /// Creates a position-sensor observation.
    #[inline]
    pub fn position(x: T, y: T, timestamp_us: u64) -> Self {
        Self {
            reading: SensorReading::Position(Measurement::from_array([x, y])),
            timestamp_us,
        }
    }

    /// Creates a range-sensor observation.
    #[inline]
    pub fn range(range: T, bearing: T, range_rate: T, timestamp_us: u64) -> Self {
        Self {
            reading: SensorReading::Range(Measurement::from_array([range, bearing, range_rate])),
            timestamp_us,
        }
    }

    /// Builds an observation from an untyped measurement slice.
    ///
    /// # Errors
    /// Returns [`FilterError::MeasurementLength`] if `values` does not have
    /// exactly as many components as `kind` produces.
    pub fn from_raw(kind: SensorKind, values: &[T], timestamp_us: u64) -> Result<Self> {
        let expected = kind.measurement_len();
        if values.len() != expected {
            return Err(FilterError::MeasurementLength {
                sensor: kind,
                expected,
                actual: values.len(),
            });
        }

        Ok(match kind {
            SensorKind::Position => Self::position(values[0], values[1], timestamp_us),
            SensorKind::Range => Self::range(values[0], values[1], values[2], timestamp_us),
        })
    }

    /// The sensor this observation came from.
    #[inline]
    pub fn kind(&self) -> SensorKind {
        self.reading.kind()
    }
}
