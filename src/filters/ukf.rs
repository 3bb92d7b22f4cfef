//! Unscented Kalman Filter steps for the CTRV model
//!
//! The recursion is split into two pure functions over [`Belief`] values:
//!
//! 1. [`predict`]: augment, generate 15 sigma points, push them through the
//!    CTRV law and recover the predicted belief. The predicted sigma points
//!    are kept, the corrector reuses them.
//! 2. [`correct`]: map the predicted sigma points into measurement space,
//!    form the innovation covariance and the cross-covariance, then apply
//!    the Kalman gain.
//!
//! Neither function touches filter state, so a failed step can simply be
//! discarded by the caller.

use nalgebra::RealField;
use num_traits::Float;
use tracing::trace;

use super::sigma::{
    augmented_sigma_points, cross_covariance, recover_moments, SigmaMatrix, SigmaWeights,
};
use crate::models::{CtrvModel, MeasurementModel};
use crate::types::belief::{Belief, CtrvCovariance, CtrvState, STATE_DIM, YAW};
use crate::types::spaces::{ComputeInnovation, Innovation, Measurement};
use crate::types::transforms::{
    invert_innovation_covariance, normalized_innovation_squared, KalmanGain,
};
use crate::{FilterError, Result};

/// Output of the prediction step.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction<T: RealField> {
    /// Predicted belief
    pub belief: Belief<T>,
    /// Predicted state sigma points, one column per point
    pub sigma_points: SigmaMatrix<T, STATE_DIM>,
}

/// Output of the correction step.
#[derive(Debug, Clone, PartialEq)]
pub struct Correction<T: RealField, const M: usize> {
    /// Corrected belief
    pub belief: Belief<T>,
    /// Measurement residual, angle components wrapped
    pub innovation: Innovation<T, M>,
    /// Normalized innovation squared yᵀS⁻¹y
    pub nis: T,
}

/// Predicts a belief `dt` seconds ahead.
///
/// # Errors
/// Returns [`FilterError::NotPositiveDefinite`] if the augmented covariance
/// has no square root.
pub fn predict<T: RealField + Float + Copy>(
    belief: &Belief<T>,
    model: &CtrvModel<T>,
    weights: &SigmaWeights<T>,
    dt: T,
) -> Result<Prediction<T>> {
    let augmented = augmented_sigma_points(belief, model, weights)?;
    let sigma_points = model.predict_sigma_points(&augmented, dt);
    let (mean, cov) = recover_moments(&sigma_points, weights, Some(YAW));

    trace!(dt = ?dt, "predicted belief");

    Ok(Prediction {
        belief: Belief::new(
            CtrvState::from_svector(mean),
            CtrvCovariance::from_matrix(cov),
        ),
        sigma_points,
    })
}

/// Corrects a predicted belief with one measurement.
///
/// With `symmetrize` set the corrected covariance is replaced by (P + Pᵀ)/2.
///
/// # Errors
/// Returns [`FilterError::SingularInnovation`] if the innovation covariance
/// cannot be inverted.
pub fn correct<T, S, const M: usize>(
    prediction: &Prediction<T>,
    sensor: &S,
    measurement: &Measurement<T, M>,
    weights: &SigmaWeights<T>,
    symmetrize: bool,
) -> Result<Correction<T, M>>
where
    T: RealField + Float + Copy,
    S: MeasurementModel<T, M>,
{
    let predicted = sensor.predict_measurement(&prediction.sigma_points, weights);

    let tc = cross_covariance(
        &prediction.sigma_points,
        prediction.belief.mean.as_svector(),
        Some(YAW),
        &predicted.sigma_points,
        predicted.mean.as_svector(),
        sensor.angle_index(),
        weights,
    );

    let s_inv =
        invert_innovation_covariance(&predicted.covariance).ok_or(FilterError::SingularInnovation)?;
    let gain = KalmanGain::from_cross_covariance(&tc, &s_inv);

    let innovation = measurement.innovation(&predicted.mean, sensor.angle_index());
    let nis = normalized_innovation_squared(&innovation, &s_inv);

    let mean = prediction.belief.mean + gain.correct(&innovation);
    let mut covariance = CtrvCovariance::from_matrix(
        prediction.belief.covariance.as_matrix()
            - gain.covariance_reduction(&predicted.covariance).as_matrix(),
    );
    if symmetrize {
        covariance = covariance.symmetrized();
    }

    let sensor_kind = S::KIND;
    trace!(sensor = %sensor_kind, nis = ?nis, "corrected belief");

    Ok(Correction {
        belief: Belief::new(mean, covariance),
        innovation,
        nis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PositionSensor, ProcessNoise, RangeSensor};
    use crate::types::belief::{PX, PY, SPEED};
    use nalgebra::vector;
    use std::f64::consts::PI;

    fn model() -> CtrvModel<f64> {
        CtrvModel::new(ProcessNoise::default())
    }

    fn moving_east() -> Belief<f64> {
        Belief::with_diagonal_covariance(
            CtrvState::from_array([0.0, 0.0, 2.0, 0.0, 0.0]),
            &vector![1.0, 1.0, 1.0, 0.1, 0.1],
        )
    }

    #[test]
    fn test_predict_moves_along_heading() {
        let weights = SigmaWeights::standard();
        let prediction = predict(&moving_east(), &model(), &weights, 1.0).unwrap();

        let p = prediction.belief.position();
        assert!((p[0] - 2.0).abs() < 0.3, "x = {}", p[0]);
        assert!(p[1].abs() < 0.2, "y = {}", p[1]);

        // Uncertainty grows without a measurement
        let before = moving_east().covariance.as_matrix()[(PX, PX)];
        assert!(prediction.belief.covariance.as_matrix()[(PX, PX)] > before);
        assert!(prediction.belief.is_symmetric(1e-9));
    }

    #[test]
    fn test_predict_zero_dt_keeps_moments() {
        let weights = SigmaWeights::standard();
        let belief = moving_east();
        let prediction = predict(&belief, &model(), &weights, 0.0).unwrap();

        assert!((prediction.belief.mean.as_svector() - belief.mean.as_svector()).norm() < 1e-9);
        assert!(
            (prediction.belief.covariance.as_matrix() - belief.covariance.as_matrix()).norm()
                < 1e-9
        );
    }

    #[test]
    fn test_position_correction_pulls_toward_measurement() {
        let weights = SigmaWeights::standard();
        let prediction = predict(&moving_east(), &model(), &weights, 1.0).unwrap();

        let z = Measurement::from_array([3.0, 0.5]);
        let corrected =
            correct(&prediction, &PositionSensor::default(), &z, &weights, false).unwrap();

        let before = prediction.belief.position();
        let after = corrected.belief.position();
        assert!((after[0] - 3.0).abs() < (before[0] - 3.0).abs());
        assert!((after[1] - 0.5).abs() < (before[1] - 0.5).abs());
        assert!(
            corrected.belief.covariance.as_matrix()[(PX, PX)]
                < prediction.belief.covariance.as_matrix()[(PX, PX)]
        );
        assert!(corrected.nis >= 0.0);
    }

    #[test]
    fn test_range_rate_updates_speed() {
        let weights = SigmaWeights::standard();
        let belief = Belief::with_diagonal_covariance(
            CtrvState::from_array([5.0, 0.0, 0.0, 0.0, 0.0]),
            &vector![1.0, 1.0, 10.0, 50.0, 3.0],
        );
        let prediction = predict(&belief, &model(), &weights, 1.0).unwrap();

        let z = Measurement::from_array([5.0, 0.0, 1.0]);
        let corrected = correct(&prediction, &RangeSensor::default(), &z, &weights, false).unwrap();

        let [vx, _] = corrected.belief.velocity();
        assert!(vx > 0.0, "vx = {}", vx);
        assert!(corrected.belief.mean.index(SPEED).is_finite());
    }

    #[test]
    fn test_bearing_residual_is_wrapped() {
        // Target behind the sensor, bearing just under π
        let weights = SigmaWeights::standard();
        let belief = Belief::with_diagonal_covariance(
            CtrvState::from_array([-10.0, 1.0, 1.0, PI, 0.0]),
            &vector![0.05, 0.05, 0.1, 0.01, 0.01],
        );
        let prediction = predict(&belief, &model(), &weights, 0.1).unwrap();
        let sensor = RangeSensor::default();

        let bearing = 1.0_f64.atan2(-10.0);
        let near = Measurement::from_array([10.05, bearing, -1.0]);
        let far = Measurement::from_array([10.05, bearing - 2.0 * PI, -1.0]);

        let a = correct(&prediction, &sensor, &near, &weights, false).unwrap();
        let b = correct(&prediction, &sensor, &far, &weights, false).unwrap();

        assert!((a.belief.mean.as_svector() - b.belief.mean.as_svector()).norm() < 1e-9);
        assert!(b.innovation.index(1).abs() < 0.1);
        assert!((b.belief.position()[1] - 1.0).abs() < 0.5);
        assert!(b.belief.mean.index(PY).is_finite());
    }

    #[test]
    fn test_symmetrization_flag() {
        let weights = SigmaWeights::standard();
        let prediction = predict(&moving_east(), &model(), &weights, 0.5).unwrap();
        let z = Measurement::from_array([10.0, 0.3, 2.0]);

        let corrected = correct(&prediction, &RangeSensor::default(), &z, &weights, true).unwrap();
        assert!(corrected.belief.is_symmetric(0.0));
    }
}
