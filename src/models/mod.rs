//! Models of target dynamics and sensor characteristics
//!
//! The CTRV transition model with its process noise, and the two
//! measurement models behind the [`MeasurementModel`] trait.

mod observation;
mod transition;

pub use observation::*;
pub use transition::*;

pub(crate) use transition::positive_sigma;
