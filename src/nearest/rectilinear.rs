//! Nearest-neighbor interpolation/extrapolation on a rectilinear grid.
//!
//! ```rust
//! use tabular_model::nearest::NearestRectilinear;
//!
//! let x = [1.0_f64, 2.0, 3.0];
//! let y = [1.0_f64, 2.0, 3.0];
//! let grids = [&x[..], &y[..]];
//! let z = [3.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0];
//!
//! let obs = [0.0_f64, 1.5, 2.72];
//! let mut out = [0.0; 3];
//! NearestRectilinear::new(&grids, &z)
//!     .unwrap()
//!     .interp(&[&obs[..], &obs[..]], &mut out)
//!     .unwrap();
//! assert_eq!(out, [3.0, 3.0, 0.0]);
//! ```
use crate::interp::InterpError;
use crate::{dimprod, index_arr, lower_corner};
use num_traits::Float;

/// An arbitrary-dimensional nearest-neighbor interpolator / extrapolator on a rectilinear grid.
///
/// Assumes C-style ordering of vals (z(x0, y0), z(x0, y1), ..., z(x0, yn), z(x1, y0), ...).
///
/// On each axis the lower node of the containing cell is selected when the point is
/// at or before the cell midpoint, and the upper node otherwise. Outside the grid this
/// selects the nearest edge node. A point with any NaN coordinate has no nearest node
/// and evaluates to NaN.
pub struct NearestRectilinear<'a, T: Float> {
    /// x, y, ... coordinate grids, each entry of size dims[i]
    grids: &'a [&'a [T]],

    /// Cumulative product of higher dimensions, used for indexing
    dimprod: Vec<usize>,

    /// Values at each point, size prod(dims)
    vals: &'a [T],
}

impl<'a, T: Float> NearestRectilinear<'a, T> {
    /// Build a new interpolator, using O(ndims) calculations and storage.
    ///
    /// # Errors
    /// * If there are no grids, or the number of values does not match the grid sizes
    /// * If any grid has fewer than 2 entries
    pub fn new(grids: &'a [&'a [T]], vals: &'a [T]) -> Result<Self, InterpError> {
        let dims: Vec<usize> = grids.iter().map(|g| g.len()).collect();
        let nvals: usize = dims.iter().product();
        if dims.is_empty() || vals.len() != nvals {
            return Err(InterpError::DimensionMismatch);
        }
        if let Some(dim) = dims.iter().position(|&n| n < 2) {
            return Err(InterpError::DegenerateGrid { dim });
        }

        Ok(Self {
            grids,
            dimprod: dimprod(&dims),
            vals,
        })
    }

    /// Interpolate on a contiguous list of observation points, one slice per dimension.
    ///
    /// # Errors
    ///   * If the number of coordinate slices does not match the grid
    ///   * If any coordinate slice length does not match the output length
    pub fn interp(&self, x: &[&[T]], out: &mut [T]) -> Result<(), InterpError> {
        let ndims = self.grids.len();
        if x.len() != ndims || x.iter().any(|xx| xx.len() != out.len()) {
            return Err(InterpError::DimensionMismatch);
        }

        let mut loc = vec![0_usize; ndims];
        for (i, o) in out.iter_mut().enumerate() {
            if x.iter().any(|xx| xx[i].is_nan()) {
                *o = T::nan();
                continue;
            }
            for (j, l) in loc.iter_mut().enumerate() {
                *l = self.nearest_index(x[j][i], j);
            }
            *o = index_arr(&loc, &self.dimprod, self.vals);
        }

        Ok(())
    }

    /// Interpolate the value at a single point.
    ///
    /// # Errors
    ///   * If the dimensionality of the point does not match the grid
    pub fn interp_one(&self, x: &[T]) -> Result<T, InterpError> {
        if x.len() != self.grids.len() {
            return Err(InterpError::DimensionMismatch);
        }
        if x.iter().any(|v| v.is_nan()) {
            return Ok(T::nan());
        }
        let loc: Vec<usize> = x
            .iter()
            .enumerate()
            .map(|(j, &v)| self.nearest_index(v, j))
            .collect();
        Ok(index_arr(&loc, &self.dimprod, self.vals))
    }

    #[inline]
    fn nearest_index(&self, v: T, dim: usize) -> usize {
        let grid = self.grids[dim];
        let origin = lower_corner(grid, v);
        let x0 = grid[origin];
        let x1 = grid[origin + 1];
        let dt = (v - x0) / (x1 - x0);

        let half = T::one() / (T::one() + T::one());
        if dt <= half {
            origin
        } else {
            origin + 1
        }
    }
}
