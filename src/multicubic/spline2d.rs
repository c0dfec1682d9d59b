//! Bicubic spline interpolation on a 2D rectilinear grid.
//!
//! ```rust
//! use tabular_model::multicubic::SplineF2D;
//!
//! let x = [0.0_f64, 1.0, 2.0, 3.0];
//! let y = [0.0_f64, 0.5, 1.5, 2.0, 4.0];
//! let grids = [&x[..], &y[..]];
//!
//! // z = x^2 * y
//! let z: Vec<f64> = x
//!     .iter()
//!     .flat_map(|xi| y.iter().map(move |yi| xi * xi * yi))
//!     .collect();
//!
//! let spline = SplineF2D::new(&grids, &z).unwrap();
//! let v = spline.interp_one(1.5, 1.0).unwrap();
//! assert!((v - 2.25).abs() < 1e-9);
//! ```
use super::{eval_spline, not_a_knot_slopes, MIN_SPLINE_POINTS};
use crate::interp::InterpError;
use num_traits::Float;

/// Tensor-product not-a-knot cubic spline through a 2D table.
///
/// Assumes C-style ordering of vals (z(x0, y0), z(x0, y1), ..., z(x0, yn), z(x1, y0), ...).
///
/// Row slopes along the second axis are solved once at construction. Each evaluation
/// interpolates every row at the requested `y`, then fits and evaluates one spline
/// along the first axis through those row values.
///
/// Operation Complexity
/// * O(nx * ny) at construction
/// * O(nx + log2(ny)) per evaluation
pub struct SplineF2D<'a, T: Float> {
    x: &'a [T],
    y: &'a [T],
    vals: &'a [T],

    /// Node slopes along `y` for each row, same layout as `vals`
    row_slopes: Vec<T>,
}

impl<'a, T: Float> SplineF2D<'a, T> {
    /// Fit the row splines.
    ///
    /// # Errors
    /// * If there are not exactly two grids
    /// * If the number of values does not match the grid sizes
    /// * If either axis has fewer than four nodes
    pub fn new(grids: &'a [&'a [T]], vals: &'a [T]) -> Result<Self, InterpError> {
        if grids.len() != 2 {
            return Err(InterpError::SplineDimension { ndims: grids.len() });
        }
        let (x, y) = (grids[0], grids[1]);
        let (nx, ny) = (x.len(), y.len());
        if vals.len() != nx * ny {
            return Err(InterpError::DimensionMismatch);
        }
        if let Some(dim) = [nx, ny].iter().position(|&n| n < MIN_SPLINE_POINTS) {
            return Err(InterpError::SplineTooFewPoints { dim });
        }

        let mut row_slopes = vec![T::zero(); nx * ny];
        for (row, slopes) in vals.chunks_exact(ny).zip(row_slopes.chunks_exact_mut(ny)) {
            not_a_knot_slopes(y, row, slopes)?;
        }

        Ok(Self {
            x,
            y,
            vals,
            row_slopes,
        })
    }

    /// Interpolate on a contiguous list of observation points.
    ///
    /// # Errors
    ///   * If there are not two coordinate slices matching the output length
    pub fn interp(&self, obs: &[&[T]], out: &mut [T]) -> Result<(), InterpError> {
        if obs.len() != 2 || obs.iter().any(|o| o.len() != out.len()) {
            return Err(InterpError::DimensionMismatch);
        }

        let nx = self.x.len();
        let mut column = vec![T::zero(); nx];
        let mut column_slopes = vec![T::zero(); nx];
        for (i, o) in out.iter_mut().enumerate() {
            *o = self.eval(obs[0][i], obs[1][i], &mut column, &mut column_slopes)?;
        }
        Ok(())
    }

    /// Interpolate the value at a single point.
    pub fn interp_one(&self, xv: T, yv: T) -> Result<T, InterpError> {
        let nx = self.x.len();
        let mut column = vec![T::zero(); nx];
        let mut column_slopes = vec![T::zero(); nx];
        self.eval(xv, yv, &mut column, &mut column_slopes)
    }

    fn eval(&self, xv: T, yv: T, column: &mut [T], column_slopes: &mut [T]) -> Result<T, InterpError> {
        let ny = self.y.len();
        for (i, c) in column.iter_mut().enumerate() {
            let row = &self.vals[i * ny..(i + 1) * ny];
            let slopes = &self.row_slopes[i * ny..(i + 1) * ny];
            *c = eval_spline(self.y, row, slopes, yv);
        }
        not_a_knot_slopes(self.x, column, column_slopes)?;
        Ok(eval_spline(self.x, column, column_slopes, xv))
    }
}
