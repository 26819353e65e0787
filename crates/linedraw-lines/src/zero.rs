//! Zero crossings of a scalar field along a mesh edge.
//!
//! Both solvers return the parameter `t ∈ [0, 1]` at which the field
//! vanishes between `p0` (`t = 0`) and `p1` (`t = 1`). Callers only ask
//! when the end values have opposite signs or one of them is zero.

use linedraw_math::{Point3, Vec3};

/// Newton iterations for the Hermite solver.
const HERMITE_ITERATIONS: usize = 10;

/// Root of the linear interpolant between `val0` and `val1`.
///
/// Equal values (no crossing) return `0.5`. Numerical overshoot is clamped.
#[inline]
pub fn find_zero_linear(val0: f64, val1: f64) -> f64 {
    let denom = val0 - val1;
    if denom == 0.0 {
        return 0.5;
    }
    clamp_unit(val0 / denom)
}

/// Root of the cubic Hermite interpolant along the edge `p0 → p1`.
///
/// The end slopes are the field gradients projected on the edge. When
/// both gradients vanish the slopes fall back to the chord `val1 - val0`,
/// which makes the cubic linear and the result equal to
/// [`find_zero_linear`].
///
/// The root closest to the linear estimate is refined with Newton steps
/// kept inside a bisection bracket, so the result never leaves `[0, 1]`.
pub fn find_zero_hermite(
    p0: &Point3,
    p1: &Point3,
    val0: f64,
    val1: f64,
    grad0: &Vec3,
    grad1: &Vec3,
) -> f64 {
    if val0 == val1 {
        return 0.5;
    }
    let linear = find_zero_linear(val0, val1);
    if val0 == 0.0 || val1 == 0.0 {
        return linear;
    }

    let edge = p1 - p0;
    let (d0, d1) = if grad0.iter().all(|&g| g == 0.0) && grad1.iter().all(|&g| g == 0.0) {
        (val1 - val0, val1 - val0)
    } else {
        (edge.dot(grad0), edge.dot(grad1))
    };

    let a = 2.0 * (val0 - val1) + d0 + d1;
    let b = 3.0 * (val1 - val0) - 2.0 * d0 - d1;
    let c = d0;
    let d = val0;
    let eval = |t: f64| ((a * t + b) * t + c) * t + d;
    let slope = |t: f64| (3.0 * a * t + 2.0 * b) * t + c;

    // Bracket: the cubic matches val0 at 0 and val1 at 1, which have
    // opposite signs here.
    let (mut lo, mut hi) = (0.0, 1.0);
    let lo_sign = val0 > 0.0;
    let mut t = linear;

    for _ in 0..HERMITE_ITERATIONS {
        let f = eval(t);
        if f == 0.0 {
            return t;
        }
        if (f > 0.0) == lo_sign {
            lo = t;
        } else {
            hi = t;
        }
        let df = slope(t);
        let newton = if df != 0.0 { t - f / df } else { f64::NAN };
        t = if newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
    }

    clamp_unit(t)
}

#[inline]
fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() {
        0.5
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Point at parameter `t` on `p0 → p1`.
#[inline]
pub(crate) fn lerp_point(p0: &Point3, p1: &Point3, t: f64) -> Point3 {
    p0 + (p1 - p0) * t
}

/// Value at parameter `t` between `v0` and `v1`.
#[inline]
pub(crate) fn lerp(v0: f64, v1: f64, t: f64) -> f64 {
    v0 + (v1 - v0) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_symmetric() {
        for v in [1e-6, 0.3, 1.0, 42.0] {
            assert_eq!(find_zero_linear(v, -v), 0.5);
            assert_eq!(find_zero_linear(-v, v), 0.5);
        }
    }

    #[test]
    fn test_linear_endpoints() {
        for v in [-3.0, -0.1, 0.1, 7.0] {
            assert_eq!(find_zero_linear(0.0, v), 0.0);
            assert_eq!(find_zero_linear(v, 0.0), 1.0);
        }
    }

    #[test]
    fn test_linear_strictly_inside() {
        for (a, b) in [(1.0, -1e-9), (1e-9, -1.0), (0.25, -3.0), (100.0, -0.5)] {
            let t = find_zero_linear(a, b);
            assert!(t > 0.0 && t < 1.0, "t = {t} for ({a}, {b})");
            assert_relative_eq!(lerp(a, b, t), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_linear_clamps_same_sign() {
        // Not a valid call, but the result must stay on the edge.
        let t = find_zero_linear(1.0, 2.0);
        assert!((0.0..=1.0).contains(&t));
        assert_eq!(find_zero_linear(2.0, 2.0), 0.5);
    }

    #[test]
    fn test_hermite_zero_gradients_is_linear() {
        let p0 = Point3::new(0.0, 0.0, 0.0);
        let p1 = Point3::new(2.0, 1.0, 0.0);
        let z = Vec3::zeros();
        for (a, b) in [(1.0, -1.0), (0.2, -3.0), (-5.0, 0.5), (0.0, 1.0), (1.0, 0.0)] {
            assert_relative_eq!(
                find_zero_hermite(&p0, &p1, a, b, &z, &z),
                find_zero_linear(a, b),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_hermite_exact_for_linear_field() {
        // f(x) = 1 - 4x, grad = (-4, 0, 0): root at x = 0.25, t = 0.25.
        let p0 = Point3::origin();
        let p1 = Point3::new(1.0, 0.0, 0.0);
        let g = Vec3::new(-4.0, 0.0, 0.0);
        let t = find_zero_hermite(&p0, &p1, 1.0, -3.0, &g, &g);
        assert_relative_eq!(t, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_hermite_quadratic_field() {
        // f(x) = x² - 0.5 on [0, 1]: root at sqrt(0.5).
        let p0 = Point3::origin();
        let p1 = Point3::new(1.0, 0.0, 0.0);
        let g0 = Vec3::zeros();
        let g1 = Vec3::new(2.0, 0.0, 0.0);
        let t = find_zero_hermite(&p0, &p1, -0.5, 0.5, &g0, &g1);
        assert_relative_eq!(t, 0.5_f64.sqrt(), epsilon = 1e-9);
        // Linear would give the midpoint.
        assert!((t - find_zero_linear(-0.5, 0.5)).abs() > 0.1);
    }

    #[test]
    fn test_hermite_stays_in_range_for_wild_gradients() {
        let p0 = Point3::origin();
        let p1 = Point3::new(1.0, 0.0, 0.0);
        let g0 = Vec3::new(1e6, 0.0, 0.0);
        let g1 = Vec3::new(-1e6, 0.0, 0.0);
        let t = find_zero_hermite(&p0, &p1, 1.0, -1.0, &g0, &g1);
        assert!((0.0..=1.0).contains(&t));
    }

    #[test]
    fn test_hermite_equal_values() {
        let p = Point3::origin();
        let z = Vec3::zeros();
        assert_eq!(find_zero_hermite(&p, &p, 0.0, 0.0, &z, &z), 0.5);
    }
}
