//! Grid interpolation entry point used by tabular models.
//!
//! [`interpn`] validates a rectilinear grid and its values, applies the bounds policy,
//! and dispatches to one of the method-specific interpolators.
//!
//! ```rust
//! use ndarray::array;
//! use tabular_model::interp::{interpn, Method};
//!
//! let x = [1.0_f64, 2.0, 3.0];
//! let y = [1.0_f64, 2.0, 3.0];
//! let z = array![[3.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 0.0]].into_dyn();
//!
//! let obs = [0.0, 1.0, 1.5, 2.72, 3.14];
//! let out = interpn(&[&x[..], &y[..]], z.view(), &[&obs[..], &obs[..]], Method::Nearest, false, None).unwrap();
//! assert_eq!(out, vec![3.0, 3.0, 3.0, 0.0, 0.0]);
//! ```
use std::fmt;
use std::str::FromStr;

use ndarray::ArrayViewD;
use num_traits::Float;
use thiserror::Error;

/// Errors raised by grid interpolation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpError {
    /// Coordinate inputs, grids, or outputs disagree on dimensionality or length.
    #[error("dimension mismatch")]
    DimensionMismatch,

    #[error("there are {points} points and {values} values in dimension {dim}")]
    GridShape {
        dim: usize,
        points: usize,
        values: usize,
    },

    #[error("grid in dimension {dim} must have at least 2 points")]
    DegenerateGrid { dim: usize },

    #[error("points in dimension {dim} must be strictly ascending")]
    UnsortedGrid { dim: usize },

    /// A requested point lies outside the grid while bounds errors are enabled.
    #[error("one of the requested xi is out of bounds in dimension {dim}")]
    OutOfBounds { dim: usize },

    #[error("the method splinef2d can only be used for 2-dimensional input data, got {ndims}")]
    SplineDimension { ndims: usize },

    #[error("the method splinef2d needs at least 4 points in dimension {dim}")]
    SplineTooFewPoints { dim: usize },

    #[error("the method splinef2d does not support extrapolation")]
    SplineExtrapolation,

    #[error("spline system is singular")]
    SingularSpline,

    #[error("method '{0}' is not defined")]
    UnknownMethod(String),

    #[error("interpolation backend is not available; enable the `interp` feature")]
    Unavailable,
}

/// Interpolation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Multilinear interpolation, extrapolating the edge cells.
    #[default]
    Linear,
    /// Value of the nearest grid node.
    Nearest,
    /// Bicubic spline; two dimensions only, no extrapolation.
    SplineF2D,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Linear => "linear",
            Method::Nearest => "nearest",
            Method::SplineF2D => "splinef2d",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = InterpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Method::Linear),
            "nearest" => Ok(Method::Nearest),
            "splinef2d" => Ok(Method::SplineF2D),
            other => Err(InterpError::UnknownMethod(other.to_string())),
        }
    }
}

/// Whether the built-in interpolation backend is compiled in.
pub const fn available() -> bool {
    cfg!(feature = "interp")
}

/// Find the first dimension on which any observation point falls outside the grid.
/// NaN coordinates count as outside.
///
/// Assumes each grid is sorted ascending and non-empty.
///
/// # Errors
/// * If the dimensionality of the grid does not match the dimensionality of the observation points
pub fn check_bounds<T: Float>(grids: &[&[T]], obs: &[&[T]]) -> Result<Option<usize>, InterpError> {
    if obs.len() != grids.len() {
        return Err(InterpError::DimensionMismatch);
    }
    for (dim, (grid, xs)) in grids.iter().zip(obs.iter()).enumerate() {
        let (lo, hi) = match (grid.first(), grid.last()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => return Err(InterpError::DegenerateGrid { dim }),
        };
        if xs.iter().any(|&x| !(x >= lo && x <= hi)) {
            return Ok(Some(dim));
        }
    }
    Ok(None)
}

/// Validate grids against the shape of the values they index.
fn check_grids<T: Float>(grids: &[&[T]], shape: &[usize]) -> Result<(), InterpError> {
    if grids.is_empty() || grids.len() != shape.len() {
        return Err(InterpError::DimensionMismatch);
    }
    for (dim, (grid, &n)) in grids.iter().zip(shape.iter()).enumerate() {
        if grid.len() != n {
            return Err(InterpError::GridShape {
                dim,
                points: grid.len(),
                values: n,
            });
        }
        if grid.len() < 2 {
            return Err(InterpError::DegenerateGrid { dim });
        }
        if !grid.windows(2).all(|w| w[0] < w[1]) {
            return Err(InterpError::UnsortedGrid { dim });
        }
    }
    Ok(())
}

#[cfg(feature = "interp")]
fn dispatch<T: Float>(method: Method, grids: &[&[T]], vals: &[T], xi: &[&[T]], out: &mut [T]) -> Result<(), InterpError> {
    match method {
        Method::Linear => crate::multilinear::MultilinearRectilinear::new(grids, vals)?.interp(xi, out),
        Method::Nearest => crate::nearest::NearestRectilinear::new(grids, vals)?.interp(xi, out),
        Method::SplineF2D => crate::multicubic::SplineF2D::new(grids, vals)?.interp(xi, out),
    }
}

#[cfg(not(feature = "interp"))]
fn dispatch<T: Float>(_: Method, _: &[&[T]], _: &[T], _: &[&[T]], _: &mut [T]) -> Result<(), InterpError> {
    Err(InterpError::Unavailable)
}

/// Interpolate `values`, sampled on the rectilinear grid `grids`, at the points `xi`.
///
/// `xi` holds one coordinate slice per dimension, all of the same length; the result
/// has that length too.
///
/// Points outside the grid are handled as follows:
/// * `bounds_error` set: the call fails with [`InterpError::OutOfBounds`].
/// * `fill_value` given: those points take `fill_value`.
/// * otherwise: they are extrapolated (not supported by [`Method::SplineF2D`]).
///
/// A NaN coordinate is outside the grid on its axis; extrapolating it gives NaN.
///
/// # Errors
/// * If the grids are not strictly ascending, have fewer than two points, or do not
///   match the shape of `values`
/// * If `xi` does not have one equally-long slice per dimension
/// * If the method is not usable with this grid, or the bounds policy is violated
/// * If the crate was built without the `interp` feature
pub fn interpn<T: Float>(
    grids: &[&[T]],
    values: ArrayViewD<'_, T>,
    xi: &[&[T]],
    method: Method,
    bounds_error: bool,
    fill_value: Option<T>,
) -> Result<Vec<T>, InterpError> {
    check_grids(grids, values.shape())?;
    let ndims = grids.len();
    if xi.len() != ndims {
        return Err(InterpError::DimensionMismatch);
    }
    let n = xi[0].len();
    if xi.iter().any(|x| x.len() != n) {
        return Err(InterpError::DimensionMismatch);
    }

    if method == Method::SplineF2D {
        if ndims != 2 {
            return Err(InterpError::SplineDimension { ndims });
        }
        if !bounds_error && fill_value.is_none() {
            return Err(InterpError::SplineExtrapolation);
        }
    }

    if bounds_error {
        if let Some(dim) = check_bounds(grids, xi)? {
            return Err(InterpError::OutOfBounds { dim });
        }
    }

    // Kernels index the flat C-ordered buffer directly
    let values = values.as_standard_layout();
    let vals = values.as_slice().ok_or(InterpError::DimensionMismatch)?;

    let mut out = vec![T::zero(); n];
    dispatch(method, grids, vals, xi, &mut out)?;

    if let Some(fill) = fill_value {
        for (i, o) in out.iter_mut().enumerate() {
            let outside = grids
                .iter()
                .zip(xi.iter())
                .any(|(g, x)| !(x[i] >= g[0] && x[i] <= g[g.len() - 1]));
            if outside {
                *o = fill;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn table() -> ndarray::ArrayD<f64> {
        array![[3.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 0.0]].into_dyn()
    }

    #[test]
    fn test_method_names() {
        for m in [Method::Linear, Method::Nearest, Method::SplineF2D] {
            assert_eq!(m.to_string().parse::<Method>().unwrap(), m);
        }
        assert_eq!(
            "cubic".parse::<Method>(),
            Err(InterpError::UnknownMethod("cubic".into()))
        );
    }

    #[test]
    #[cfg(feature = "interp")]
    fn test_bounds_error_reports_dimension() {
        let g = [1.0_f64, 2.0, 3.0];
        let z = table();
        let x = [1.5, 2.0];
        let y = [1.5, 3.5];
        let err = interpn(&[&g[..], &g[..]], z.view(), &[&x[..], &y[..]], Method::Linear, true, None).unwrap_err();
        assert_eq!(err, InterpError::OutOfBounds { dim: 1 });
    }

    #[test]
    #[cfg(feature = "interp")]
    fn test_fill_outside_linear_inside() {
        let g = [1.0_f64, 2.0, 3.0];
        let z = table();
        let x = [0.0, 1.5, 3.0];
        let out = interpn(&[&g[..], &g[..]], z.view(), &[&x[..], &x[..]], Method::Linear, false, Some(-1.0)).unwrap();
        assert_eq!(out[0], -1.0);
        // Center of the first cell: mean of 3, 0, 0, 2
        assert_abs_diff_eq!(out[1], 1.25, epsilon = 1e-12);
        // Upper edge is inside
        assert_abs_diff_eq!(out[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    #[cfg(feature = "interp")]
    fn test_nan_fill_by_default_policy() {
        let g = [0.0_f64, 1.0];
        let z = array![1.0, 2.0].into_dyn();
        let x = [2.0];
        let out = interpn(&[&g[..]], z.view(), &[&x[..]], Method::Linear, false, Some(f64::NAN)).unwrap();
        assert!(out[0].is_nan());

        // Extrapolates when no fill is given
        let out = interpn(&[&g[..]], z.view(), &[&x[..]], Method::Linear, false, None).unwrap();
        assert_abs_diff_eq!(out[0], 3.0, epsilon = 1e-12);
    }

    #[test]
    #[cfg(feature = "interp")]
    fn test_nan_coordinates_are_out_of_bounds() {
        let g = [1.0_f64, 2.0, 3.0];
        let z = array![10.0, 20.0, 30.0].into_dyn();
        let x = [2.0, f64::NAN];

        for method in [Method::Linear, Method::Nearest] {
            assert_eq!(
                interpn(&[&g[..]], z.view(), &[&x[..]], method, true, None),
                Err(InterpError::OutOfBounds { dim: 0 })
            );

            let out = interpn(&[&g[..]], z.view(), &[&x[..]], method, false, Some(-1.0)).unwrap();
            assert_eq!(out, vec![20.0, -1.0]);

            let out = interpn(&[&g[..]], z.view(), &[&x[..]], method, false, None).unwrap();
            assert_eq!(out[0], 20.0);
            assert!(out[1].is_nan());
        }
        assert_eq!(check_bounds(&[&g[..]], &[&x[..]]), Ok(Some(0)));
    }

    #[test]
    fn test_grid_validation() {
        let z = table();
        let g = [1.0_f64, 2.0, 3.0];
        let bad = [1.0_f64, 3.0, 2.0];
        let short = [1.0_f64, 2.0];
        let x = [1.5];
        assert_eq!(
            interpn(&[&g[..], &bad[..]], z.view(), &[&x[..], &x[..]], Method::Linear, true, None),
            Err(InterpError::UnsortedGrid { dim: 1 })
        );
        assert_eq!(
            interpn(&[&short[..], &g[..]], z.view(), &[&x[..], &x[..]], Method::Linear, true, None),
            Err(InterpError::GridShape {
                dim: 0,
                points: 2,
                values: 3
            })
        );
        assert_eq!(
            interpn(&[&g[..]], z.view(), &[&x[..]], Method::Linear, true, None),
            Err(InterpError::DimensionMismatch)
        );
    }

    #[test]
    #[cfg(feature = "interp")]
    fn test_spline_policy() {
        let g = [0.0_f64, 1.0, 2.0, 3.0];
        let z = Array2::<f64>::from_shape_fn((4, 4), |(i, j)| (i * j) as f64).into_dyn();
        let x = [0.5, 4.0];

        assert_eq!(
            interpn(&[&g[..], &g[..]], z.view(), &[&x[..], &x[..]], Method::SplineF2D, false, None),
            Err(InterpError::SplineExtrapolation)
        );

        let out = interpn(&[&g[..], &g[..]], z.view(), &[&x[..], &x[..]], Method::SplineF2D, false, Some(f64::NAN)).unwrap();
        assert_abs_diff_eq!(out[0], 0.25, epsilon = 1e-12);
        assert!(out[1].is_nan());

        let z1 = ndarray::Array1::<f64>::zeros(4).into_dyn();
        assert_eq!(
            interpn(&[&g[..]], z1.view(), &[&x[..]], Method::SplineF2D, true, None),
            Err(InterpError::SplineDimension { ndims: 1 })
        );
    }

    #[test]
    #[cfg(feature = "interp")]
    fn test_non_standard_layout() {
        // Transposed view is not C-contiguous
        let g0 = [0.0_f64, 1.0, 2.0];
        let g1 = [0.0_f64, 1.0];
        let z = array![[0.0, 1.0, 2.0], [10.0, 11.0, 12.0]];
        let zt = z.t().into_dyn();
        let x0 = [2.0];
        let x1 = [1.0];
        let out = interpn(&[&g0[..], &g1[..]], zt, &[&x0[..], &x1[..]], Method::Linear, true, None).unwrap();
        assert_abs_diff_eq!(out[0], 12.0, epsilon = 1e-12);
    }

    #[test]
    #[cfg(feature = "interp")]
    fn test_backend_present() {
        assert!(available());
    }

    #[test]
    #[cfg(not(feature = "interp"))]
    fn test_backend_absent() {
        let g = [0.0_f64, 1.0];
        let z = array![1.0, 2.0].into_dyn();
        let x = [0.5];
        assert!(!available());
        assert_eq!(
            interpn(&[&g[..]], z.view(), &[&x[..]], Method::Linear, false, None),
            Err(InterpError::Unavailable)
        );
    }
}
