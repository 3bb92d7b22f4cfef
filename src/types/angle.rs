//! Angle normalization
//!
//! Heading and bearing residuals must be wrapped before they enter any
//! outer product, otherwise two angles that are close on the circle but on
//! opposite sides of ±π look almost 2π apart.

use nalgebra::RealField;
use num_traits::Float;

/// Wraps an angle into the half-open interval (-π, π].
///
/// Non-finite input is returned unchanged.
#[inline]
pub fn normalize_angle<T: RealField + Float + Copy>(angle: T) -> T {
    if !Float::is_finite(angle) {
        return angle;
    }

    let pi = T::pi();
    let two_pi = T::two_pi();

    // The remainder is exact, leaving at most one turn to fix up at the cut
    let mut a = angle % two_pi;
    while a > pi {
        a -= two_pi;
    }
    while a <= -pi {
        a += two_pi;
    }
    a
}

/// Difference `a - b` of two angles, wrapped into (-π, π].
#[inline]
pub fn angle_difference<T: RealField + Float + Copy>(a: T, b: T) -> T {
    normalize_angle(a - b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_angles_across_the_cut_are_close() {
        // 3.0 and -3.0 are ~0.28 rad apart through ±π
        let d = angle_difference(3.0_f64, -3.0);
        assert!(d.abs() < 0.3, "difference: {}", d);
        assert!((d - (6.0 - 2.0 * PI)).abs() < 1e-12);

        let d = angle_difference(-3.0_f64, 3.0);
        assert!((d - (2.0 * PI - 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_range_is_half_open() {
        assert!((normalize_angle(PI) - PI).abs() < 1e-15);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-15);
        assert!(normalize_angle(0.0_f64).abs() < 1e-15);
    }

    #[test]
    fn test_multiple_turns_unwrap() {
        let a = normalize_angle(0.5_f64 + 6.0 * PI);
        assert!((a - 0.5).abs() < 1e-9);

        let a = normalize_angle(-0.5_f64 - 10.0 * PI);
        assert!((a + 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_huge_angles_terminate() {
        for angle in [1e17_f64, -1e17, 1e300, -3.0e22] {
            let a = normalize_angle(angle);
            assert!(a > -PI && a <= PI, "{} -> {}", angle, a);
        }
    }

    #[test]
    fn test_non_finite_passthrough() {
        assert!(normalize_angle(f64::NAN).is_nan());
        assert!(normalize_angle(f64::INFINITY).is_infinite());
    }
}
