//! Typed transformation matrices
//!
//! Matrices that transform vectors between spaces, with type-level
//! encoding of source and target spaces.

use ::core::marker::PhantomData;
use nalgebra::{RealField, SMatrix, Scalar};

use super::spaces::{
    Innovation, InnovationSpace, MeasurementCovariance, StateCovariance, StateSpace, StateVector,
};

/// A transformation matrix that maps vectors from one space to another.
///
/// # Type Parameters
///
/// - `T`: Scalar type
/// - `ROWS`: Number of rows (dimension of target space)
/// - `COLS`: Number of columns (dimension of source space)
/// - `To`: Target space marker
/// - `From`: Source space marker
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq)]
pub struct Transform<T: Scalar, const ROWS: usize, const COLS: usize, To, From> {
    inner: SMatrix<T, ROWS, COLS>,
    _marker: PhantomData<(To, From)>,
}

impl<T: Scalar, const ROWS: usize, const COLS: usize, To, From> Transform<T, ROWS, COLS, To, From> {
    /// Creates a transform from a raw matrix.
    #[inline]
    pub fn from_matrix(inner: SMatrix<T, ROWS, COLS>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the underlying matrix.
    #[inline]
    pub fn as_matrix(&self) -> &SMatrix<T, ROWS, COLS> {
        &self.inner
    }
}

/// Kalman gain: InnovationSpace -> StateSpace
pub type KalmanGain<T, const N: usize, const M: usize> =
    Transform<T, N, M, StateSpace, InnovationSpace>;

impl<T: RealField + Copy, const N: usize, const M: usize> KalmanGain<T, N, M> {
    /// Computes the gain from the state/measurement cross-covariance.
    ///
    /// K = Tc * S^{-1}
    #[inline]
    pub fn from_cross_covariance(
        cross_covariance: &SMatrix<T, N, M>,
        innovation_cov_inv: &SMatrix<T, M, M>,
    ) -> Self {
        Self::from_matrix(cross_covariance * innovation_cov_inv)
    }

    /// Applies the Kalman gain to an innovation vector.
    #[inline]
    pub fn correct(&self, innovation: &Innovation<T, M>) -> StateVector<T, N> {
        StateVector::from_svector(self.inner * innovation.as_svector())
    }

    /// Covariance reduction of the update step: K * S * K^T.
    #[inline]
    pub fn covariance_reduction(
        &self,
        innovation_cov: &MeasurementCovariance<T, M>,
    ) -> StateCovariance<T, N> {
        StateCovariance::from_matrix(self.inner * innovation_cov.as_matrix() * self.inner.transpose())
    }
}

/// Inverts an innovation covariance S.
///
/// Returns `None` if S is singular.
#[inline]
pub fn invert_innovation_covariance<T: RealField + Copy, const M: usize>(
    innovation_cov: &MeasurementCovariance<T, M>,
) -> Option<SMatrix<T, M, M>> {
    innovation_cov.as_matrix().try_inverse()
}

/// Normalized innovation squared: y^T * S^{-1} * y
#[inline]
pub fn normalized_innovation_squared<T: RealField + Copy, const M: usize>(
    innovation: &Innovation<T, M>,
    innovation_cov_inv: &SMatrix<T, M, M>,
) -> T {
    let y = innovation.as_svector();
    (y.transpose() * innovation_cov_inv * y)[(0, 0)]
}
