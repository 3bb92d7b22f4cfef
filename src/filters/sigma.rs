//! Sigma points of the augmented unscented transform
//!
//! The augmented state `[px, py, v, yaw, yaw_rate, nu_a, nu_yawdd]` is
//! sampled with 2·n_aug + 1 symmetric sigma points:
//! - χ₀ = μ
//! - χᵢ = μ + √(λ + n_aug)·Lᵢ for i = 1...n_aug
//! - χᵢ₊ₙ = μ − √(λ + n_aug)·Lᵢ for i = 1...n_aug
//!
//! where L is a square root of the augmented covariance and λ = 3 − n_aug.
//! The same weights recover mean and covariance, so a point set is fully
//! described by one weight vector.

use nalgebra::{Cholesky, RealField, SMatrix, SVector, SymmetricEigen};
use num_traits::Float;

use crate::models::{CtrvModel, AUG_DIM};
use crate::types::angle::normalize_angle;
use crate::types::belief::Belief;
use crate::{FilterError, Result};

/// Number of sigma points, 2·n_aug + 1.
pub const SIGMA_COUNT: usize = 2 * AUG_DIM + 1;

/// Sigma points stored column-wise, one row per vector component.
pub type SigmaMatrix<T, const D: usize> = SMatrix<T, D, SIGMA_COUNT>;

/// Relative eigenvalue tolerance accepted as semi-definite.
const PSD_TOLERANCE: f64 = 1e-9;

// ============================================================================
// Weights
// ============================================================================

/// Weights of the symmetric sigma point set.
///
/// - w₀ = λ / (λ + n_aug)
/// - wᵢ = 1 / (2(λ + n_aug)) for i ≥ 1
///
/// They sum to one. With λ = 3 − n_aug the central weight is negative.
#[derive(Debug, Clone, PartialEq)]
pub struct SigmaWeights<T: RealField> {
    lambda: T,
    weights: SVector<T, SIGMA_COUNT>,
}

impl<T: RealField + Float + Copy> SigmaWeights<T> {
    /// Weights for λ = 3 − n_aug.
    pub fn standard() -> Self {
        let n_aug: T = nalgebra::convert(AUG_DIM as f64);
        let lambda = nalgebra::convert::<f64, T>(3.0) - n_aug;
        let denom = lambda + n_aug;

        let half = nalgebra::convert::<f64, T>(0.5);
        let mut weights = SVector::<T, SIGMA_COUNT>::from_element(half / denom);
        weights[0] = lambda / denom;

        Self { lambda, weights }
    }

    /// The spreading parameter λ.
    #[inline]
    pub fn lambda(&self) -> T {
        self.lambda
    }

    /// Scale applied to the covariance square root, √(λ + n_aug).
    #[inline]
    pub fn spread(&self) -> T {
        let n_aug: T = nalgebra::convert(AUG_DIM as f64);
        Float::sqrt(self.lambda + n_aug)
    }

    /// Weight of sigma point `i`.
    ///
    /// # Panics
    /// Panics if `i >= SIGMA_COUNT`.
    #[inline]
    pub fn get(&self, i: usize) -> T {
        self.weights[i]
    }

    /// All weights as a vector.
    #[inline]
    pub fn as_svector(&self) -> &SVector<T, SIGMA_COUNT> {
        &self.weights
    }
}

impl<T: RealField + Float + Copy> Default for SigmaWeights<T> {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Matrix square root
// ============================================================================

/// Computes a square root `L` with `L·Lᵀ = m` of a symmetric matrix.
///
/// Positive definite matrices use the Cholesky factor. Positive
/// semi-definite ones (a zero variance somewhere) fall back to `U·√Λ` of the
/// symmetric eigendecomposition, clamping eigenvalues within tolerance of
/// zero.
///
/// # Errors
/// Returns [`FilterError::NotPositiveDefinite`] if `m` has non-finite
/// entries or a clearly negative eigenvalue.
pub fn matrix_sqrt<T: RealField + Float + Copy>(
    m: &SMatrix<T, AUG_DIM, AUG_DIM>,
) -> Result<SMatrix<T, AUG_DIM, AUG_DIM>> {
    if !m.iter().all(|v| Float::is_finite(*v)) {
        return Err(FilterError::NotPositiveDefinite);
    }

    if let Some(chol) = Cholesky::new(*m) {
        return Ok(chol.l());
    }

    let scale = m.iter().fold(T::one(), |acc, v| Float::max(acc, Float::abs(*v)));
    let tolerance = nalgebra::convert::<f64, T>(PSD_TOLERANCE) * scale;

    let eigen = SymmetricEigen::new(*m);
    if eigen.eigenvalues.iter().any(|l| *l < -tolerance) {
        return Err(FilterError::NotPositiveDefinite);
    }

    let roots = eigen
        .eigenvalues
        .map(|l| Float::sqrt(Float::max(l, T::zero())));
    Ok(eigen.eigenvectors * SMatrix::<T, AUG_DIM, AUG_DIM>::from_diagonal(&roots))
}

// ============================================================================
// Sigma point generation
// ============================================================================

/// Generates the augmented sigma points of a belief.
///
/// # Errors
/// Returns [`FilterError::NotPositiveDefinite`] if the augmented covariance
/// has no square root.
pub fn augmented_sigma_points<T: RealField + Float + Copy>(
    belief: &Belief<T>,
    model: &CtrvModel<T>,
    weights: &SigmaWeights<T>,
) -> Result<SigmaMatrix<T, AUG_DIM>> {
    let (mean, cov) = model.augment(belief);
    let sqrt = matrix_sqrt(&cov)?.scale(weights.spread());

    let mut points = SigmaMatrix::<T, AUG_DIM>::zeros();
    points.set_column(0, &mean);
    for i in 0..AUG_DIM {
        let offset = sqrt.column(i);
        points.set_column(i + 1, &(mean + offset));
        points.set_column(i + 1 + AUG_DIM, &(mean - offset));
    }

    Ok(points)
}

// ============================================================================
// Weighted recovery
// ============================================================================

/// Residual `point − mean`, wrapping the component at `angle_index`.
#[inline]
pub fn residual<T: RealField + Float + Copy, const D: usize>(
    point: &SVector<T, D>,
    mean: &SVector<T, D>,
    angle_index: Option<usize>,
) -> SVector<T, D> {
    let mut diff = point - mean;
    if let Some(i) = angle_index {
        diff[i] = normalize_angle(diff[i]);
    }
    diff
}

/// Recovers the weighted mean and covariance of a sigma point set.
///
/// Used identically for the predicted state and for both sensors'
/// predicted measurements. The mean itself is not wrapped, only the
/// residuals entering the covariance are.
pub fn recover_moments<T: RealField + Float + Copy, const D: usize>(
    points: &SigmaMatrix<T, D>,
    weights: &SigmaWeights<T>,
    angle_index: Option<usize>,
) -> (SVector<T, D>, SMatrix<T, D, D>) {
    let mean = points * weights.as_svector();

    let mut cov = SMatrix::<T, D, D>::zeros();
    for i in 0..SIGMA_COUNT {
        let diff = residual(&points.column(i).into_owned(), &mean, angle_index);
        cov += (diff * diff.transpose()).scale(weights.get(i));
    }

    (mean, cov)
}

/// Weighted cross-covariance of two sigma point sets.
///
/// Tc = Σ wᵢ (xᵢ − x̄)(zᵢ − z̄)ᵀ
pub fn cross_covariance<T: RealField + Float + Copy, const N: usize, const M: usize>(
    state_points: &SigmaMatrix<T, N>,
    state_mean: &SVector<T, N>,
    state_angle: Option<usize>,
    measurement_points: &SigmaMatrix<T, M>,
    measurement_mean: &SVector<T, M>,
    measurement_angle: Option<usize>,
    weights: &SigmaWeights<T>,
) -> SMatrix<T, N, M> {
    let mut tc = SMatrix::<T, N, M>::zeros();
    for i in 0..SIGMA_COUNT {
        let x_diff = residual(&state_points.column(i).into_owned(), state_mean, state_angle);
        let z_diff = residual(
            &measurement_points.column(i).into_owned(),
            measurement_mean,
            measurement_angle,
        );
        tc += (x_diff * z_diff.transpose()).scale(weights.get(i));
    }
    tc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessNoise;
    use crate::types::belief::{CtrvCovariance, CtrvState, STATE_DIM, YAW};
    use nalgebra::vector;

    fn model() -> CtrvModel<f64> {
        CtrvModel::new(ProcessNoise::default())
    }

    #[test]
    fn test_weights_sum_to_one() {
        let w = SigmaWeights::<f64>::standard();
        assert!((w.lambda() + 4.0).abs() < 1e-12);
        assert!((w.get(0) - (-4.0 / 3.0)).abs() < 1e-12);
        assert!((w.get(1) - 1.0 / 6.0).abs() < 1e-12);
        assert!((w.as_svector().sum() - 1.0).abs() < 1e-12);
        assert!((w.spread() - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sqrt_of_positive_definite() {
        let mut m = SMatrix::<f64, AUG_DIM, AUG_DIM>::identity() * 2.0;
        m[(0, 1)] = 0.5;
        m[(1, 0)] = 0.5;

        let l = matrix_sqrt(&m).unwrap();
        assert!((l * l.transpose() - m).norm() < 1e-10);
    }

    #[test]
    fn test_sqrt_of_semi_definite() {
        let m = SMatrix::<f64, AUG_DIM, AUG_DIM>::from_diagonal(&SVector::from([
            0.0, 0.0, 0.0, 0.0, 0.0, 0.49, 0.81,
        ]));

        let l = matrix_sqrt(&m).unwrap();
        assert!((l * l.transpose() - m).norm() < 1e-10);
    }

    #[test]
    fn test_sqrt_rejects_indefinite() {
        let mut m = SMatrix::<f64, AUG_DIM, AUG_DIM>::identity();
        m[(2, 2)] = -1.0;
        assert_eq!(matrix_sqrt(&m), Err(FilterError::NotPositiveDefinite));

        let mut m = SMatrix::<f64, AUG_DIM, AUG_DIM>::identity();
        m[(0, 0)] = f64::NAN;
        assert_eq!(matrix_sqrt(&m), Err(FilterError::NotPositiveDefinite));
    }

    #[test]
    fn test_zero_covariance_collapses_state_part() {
        let mean = CtrvState::from_array([1.0, -2.0, 3.0, 0.4, 0.1]);
        let belief = Belief::new(mean, CtrvCovariance::zeros());
        let weights = SigmaWeights::standard();

        let points = augmented_sigma_points(&belief, &model(), &weights).unwrap();
        for i in 0..SIGMA_COUNT {
            for r in 0..STATE_DIM {
                assert!(
                    (points[(r, i)] - mean.index(r)).abs() < 1e-9,
                    "point {} row {}: {}",
                    i,
                    r,
                    points[(r, i)]
                );
            }
        }
    }

    #[test]
    fn test_recovery_is_left_inverse_of_generation() {
        let mean = CtrvState::from_array([5.0, 1.0, 2.0, 0.3, 0.05]);
        let belief = Belief::with_diagonal_covariance(mean, &vector![0.01, 0.02, 0.03, 0.01, 0.005]);
        let weights = SigmaWeights::standard();
        let m = model();

        // At dt = 0 the motion law returns the state part unchanged
        let aug = augmented_sigma_points(&belief, &m, &weights).unwrap();
        let predicted = m.predict_sigma_points(&aug, 0.0);
        let (x, p) = recover_moments(&predicted, &weights, Some(YAW));

        assert!((x - mean.as_svector()).norm() < 1e-9);
        assert!((p - belief.covariance.as_matrix()).norm() < 1e-9);
    }

    #[test]
    fn test_recovery_wraps_heading_residuals() {
        // Residuals of ±3.5 rad are 2π − 3.5 away on the circle
        let weights = SigmaWeights::<f64>::standard();
        let mut points = SigmaMatrix::<f64, 1>::zeros();
        for i in 1..SIGMA_COUNT {
            points[(0, i)] = if i % 2 == 0 { 3.5 } else { -3.5 };
        }

        let (mean, wrapped) = recover_moments(&points, &weights, Some(0));
        let (_, raw) = recover_moments(&points, &weights, None);
        assert!(mean[0].abs() < 1e-12);

        // The outer weights sum to 1 - w0
        let outer = 1.0 - weights.get(0);
        let short = 2.0 * std::f64::consts::PI - 3.5;
        assert!((wrapped[(0, 0)] - outer * short * short).abs() < 1e-9);
        assert!((raw[(0, 0)] - outer * 3.5 * 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_cross_covariance_of_identity_projection() {
        let weights = SigmaWeights::<f64>::standard();
        let mut points = SigmaMatrix::<f64, 2>::zeros();
        for i in 1..SIGMA_COUNT {
            points[(0, i)] = if i % 2 == 0 { 1.0 } else { -1.0 };
            points[(1, i)] = 0.5 * points[(0, i)];
        }

        let (mean, cov) = recover_moments(&points, &weights, None);
        let tc = cross_covariance(&points, &mean, None, &points, &mean, None, &weights);
        assert!((tc - cov).norm() < 1e-12);
    }
}
