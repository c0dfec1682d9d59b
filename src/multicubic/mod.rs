//! Cubic spline interpolation.
//!
//! Splines here are interpolating cubic splines with not-a-knot end conditions:
//! the third derivative is continuous across the second and second-to-last nodes,
//! so the first and last two intervals each share one cubic. This is the same
//! function space a tensor-product B-spline of degree 3 with no smoothing spans
//! when its interior knots are placed on the data, so a 2D spline can be built by
//! successive one-dimensional fits.
//!
//! Each interval is evaluated in Hermite form from the node values and the node
//! slopes produced by the spline solve. Outside the grid, the first or last
//! interval's cubic is continued.
use num_traits::Float;

use crate::interp::InterpError;

pub mod spline2d;

pub use spline2d::SplineF2D;

/// Minimum number of nodes for a not-a-knot cubic spline.
pub const MIN_SPLINE_POINTS: usize = 4;

/// Evaluate a hermite spline function on an interval from x0 to x1,
/// with imposed slopes k0 and k1 at the endpoints, and normalized
/// coordinate t = (x - x0) / (x1 - x0).
#[inline]
pub(crate) fn normalized_hermite_spline<T: Float>(t: T, y0: T, dy: T, k0: T, k1: T) -> T {
    // `a` and `b` are the difference between this function and a linear one going
    // forward or backward with the imposed slopes.
    let a = k0 - dy;
    let b = -k1 + dy;

    let t2 = t * t;
    let t3 = t.powi(3);

    let c1 = dy + a;
    let c2 = b - (a + a);
    let c3 = a - b;

    y0 + (c1 * t) + (c2 * t2) + (c3 * t3)
}

/// Node slopes of the not-a-knot cubic spline through `(x, y)`.
///
/// The slope system is tridiagonal; it is solved with the Thomas algorithm.
/// `x` must be strictly increasing with at least [`MIN_SPLINE_POINTS`] entries.
///
/// # Errors
/// * If the lengths of `x`, `y` and `out` differ, or there are too few nodes
/// * If a pivot vanishes during elimination
pub(crate) fn not_a_knot_slopes<T: Float>(x: &[T], y: &[T], out: &mut [T]) -> Result<(), InterpError> {
    let n = x.len();
    if y.len() != n || out.len() != n || n < MIN_SPLINE_POINTS {
        return Err(InterpError::DimensionMismatch);
    }

    let two = T::one() + T::one();
    let three = two + T::one();

    let dx: Vec<T> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let slope: Vec<T> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / dx[i]).collect();

    // Lower, main and upper diagonals, right-hand side
    let mut lower = vec![T::zero(); n];
    let mut diag = vec![T::zero(); n];
    let mut upper = vec![T::zero(); n];
    let mut rhs = vec![T::zero(); n];

    let d0 = x[2] - x[0];
    diag[0] = dx[1];
    upper[0] = d0;
    rhs[0] = ((dx[0] + two * d0) * dx[1] * slope[0] + dx[0] * dx[0] * slope[1]) / d0;

    for i in 1..n - 1 {
        lower[i] = dx[i];
        diag[i] = two * (dx[i - 1] + dx[i]);
        upper[i] = dx[i - 1];
        rhs[i] = three * (dx[i] * slope[i - 1] + dx[i - 1] * slope[i]);
    }

    let dn = x[n - 1] - x[n - 3];
    lower[n - 1] = dn;
    diag[n - 1] = dx[n - 3];
    rhs[n - 1] = (dx[n - 2] * dx[n - 2] * slope[n - 3]
        + (two * dn + dx[n - 2]) * dx[n - 3] * slope[n - 2])
        / dn;

    // Forward sweep
    for i in 1..n {
        if diag[i - 1] == T::zero() {
            return Err(InterpError::SingularSpline);
        }
        let m = lower[i] / diag[i - 1];
        diag[i] = diag[i] - m * upper[i - 1];
        rhs[i] = rhs[i] - m * rhs[i - 1];
    }
    if diag[n - 1] == T::zero() {
        return Err(InterpError::SingularSpline);
    }

    // Back substitution
    out[n - 1] = rhs[n - 1] / diag[n - 1];
    for i in (0..n - 1).rev() {
        out[i] = (rhs[i] - upper[i] * out[i + 1]) / diag[i];
    }

    Ok(())
}

/// Evaluate a 1D spline given its nodes and node slopes, continuing the
/// edge cubics outside the grid.
#[inline]
pub(crate) fn eval_spline<T: Float>(x: &[T], y: &[T], slopes: &[T], v: T) -> T {
    let i = crate::lower_corner(x, v);
    let h = x[i + 1] - x[i];
    let t = (v - x[i]) / h;
    normalized_hermite_spline(t, y[i], y[i + 1] - y[i], slopes[i] * h, slopes[i + 1] * h)
}
