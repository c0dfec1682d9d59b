//! Multilinear interpolation/extrapolation on a rectilinear grid of any dimensionality.
//!
//! ```rust
//! use tabular_model::multilinear::MultilinearRectilinear;
//!
//! // Define a grid
//! let x = [1.0_f64, 1.2, 2.0];
//! let y = [1.0_f64, 1.3, 1.5];
//! let grids = [&x[..], &y[..]];
//!
//! // Values at grid points
//! let z = [2.0; 9];
//!
//! // Points to interpolate/extrapolate
//! let xobs = [0.0_f64, 5.0];
//! let yobs = [-1.0, 3.0];
//! let obs = [&xobs[..], &yobs[..]];
//!
//! let mut out = [0.0; 2];
//! MultilinearRectilinear::new(&grids, &z)
//!     .unwrap()
//!     .interp(&obs, &mut out)
//!     .unwrap();
//! assert_eq!(out, [2.0, 2.0]);
//! ```
//!
//! References
//! * https://en.wikipedia.org/wiki/Bilinear_interpolation#Repeated_linear_interpolation
use crate::interp::InterpError;
use crate::{dimprod, index_arr, lower_corner};
use num_traits::Float;

/// An arbitrary-dimensional multilinear interpolator / extrapolator on a rectilinear grid.
///
/// Assumes C-style ordering of vals (z(x0, y0), z(x0, y1), ..., z(x0, yn), z(x1, y0), ...).
/// Assumes grids are strictly increasing; that check is made once by [`crate::interp::interpn`]
/// rather than on every construction.
///
/// Outside the grid, the edge cell on each saturated axis is extended, which gives the
/// tensor-product (not the corner-clipped) extrapolation.
///
/// Operation Complexity
/// * O(2^ndims) for interpolation and extrapolation in all regions,
///   plus a bisection search of O(log2(gridsize)) per axis.
///
/// Memory Complexity
/// * O(ndims) scratch per call to [`MultilinearRectilinear::interp`], reused for every point.
/// * While evaluation is recursive, the recursion has max depth of ndims.
pub struct MultilinearRectilinear<'a, T: Float> {
    /// x, y, ... coordinate grids, each entry of size dims[i]
    grids: &'a [&'a [T]],

    /// Size of each dimension
    dims: Vec<usize>,

    /// Cumulative product of higher dimensions, used for indexing
    dimprod: Vec<usize>,

    /// Values at each point, size prod(dims)
    vals: &'a [T],
}

impl<'a, T: Float> MultilinearRectilinear<'a, T> {
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
        let dimprod = dimprod(&dims);

        Ok(Self {
            grids,
            dims,
            dimprod,
            vals,
        })
    }

    pub fn ndims(&self) -> usize {
        self.dims.len()
    }

    /// Interpolate on a contiguous list of observation points, one slice per dimension.
    ///
    /// # Errors
    ///   * If the number of coordinate slices does not match the grid
    ///   * If any coordinate slice length does not match the output length
    pub fn interp(&self, x: &[&[T]], out: &mut [T]) -> Result<(), InterpError> {
        let ndims = self.ndims();
        if x.len() != ndims || x.iter().any(|xx| xx.len() != out.len()) {
            return Err(InterpError::DimensionMismatch);
        }

        let mut scratch = Scratch::new(ndims);
        let mut tmp = vec![T::zero(); ndims];
        for (i, o) in out.iter_mut().enumerate() {
            (0..ndims).for_each(|j| tmp[j] = x[j][i]);
            *o = self.interp_with(&tmp, &mut scratch);
        }

        Ok(())
    }

    /// Interpolate the value at a single point.
    ///
    /// # Errors
    ///   * If the dimensionality of the point does not match the grid
    pub fn interp_one(&self, x: &[T]) -> Result<T, InterpError> {
        if x.len() != self.ndims() {
            return Err(InterpError::DimensionMismatch);
        }
        let mut scratch = Scratch::new(self.ndims());
        Ok(self.interp_with(x, &mut scratch))
    }

    fn interp_with(&self, x: &[T], scratch: &mut Scratch<T>) -> T {
        let ndims = self.ndims();
        let Scratch { origin, loc, dts } = scratch;

        // Lower corner of the containing (or nearest edge) cell and
        // normalized location inside it; outside the grid, dts leaves [0, 1]
        for i in 0..ndims {
            let grid = self.grids[i];
            origin[i] = lower_corner(grid, x[i]);
            let x0 = grid[origin[i]];
            let x1 = grid[origin[i] + 1];
            dts[i] = (x[i] - x0) / (x1 - x0);
        }

        // Recursive interpolation of one dependency tree at a time,
        // starting from the last dimension and recursing back to zero
        loc.copy_from_slice(&origin[..]);
        self.populate(ndims, &origin[..], &mut loc[..], &dts[..])
    }

    /// Recursive evaluation of interpolant on each dimension
    fn populate(&self, dim: usize, origin: &[usize], loc: &mut [usize], dts: &[T]) -> T {
        match dim {
            // If we have arrived at a leaf, index into data
            0 => index_arr(loc, &self.dimprod, self.vals),

            // Otherwise, continue recursion
            _ => {
                let next_dim = dim - 1;

                let mut vals = [T::zero(); 2];
                for (i, v) in vals.iter_mut().enumerate() {
                    loc[next_dim] = origin[next_dim] + i;
                    *v = self.populate(next_dim, origin, loc, dts);
                }
                loc[next_dim] = origin[next_dim]; // Reset for next usage

                let y0 = vals[0];
                let dy = vals[1] - vals[0];
                let t = dts[next_dim];
                y0 + t * dy
            }
        }
    }
}

/// Per-call intermediate storage
struct Scratch<T> {
    origin: Vec<usize>,
    loc: Vec<usize>,
    dts: Vec<T>,
}

impl<T: Float> Scratch<T> {
    fn new(ndims: usize) -> Self {
        Self {
            origin: vec![0; ndims],
            loc: vec![0; ndims],
            dts: vec![T::zero(); ndims],
        }
    }
}

#[cfg(test)]
mod test {
    use super::MultilinearRectilinear;
    use crate::interp::InterpError;
    use crate::testing::*;
    use crate::utils::*;
    use approx::assert_abs_diff_eq;

    /// Iterate from 1 to 6 dimensions, making a minimum-sized, noisy grid for each one
    /// to traverse every combination of interpolating or extrapolating high or low on each dimension.
    #[test]
    fn test_interp_extrap_1d_to_6d() {
        let mut rng = rng_fixed_seed();

        for ndims in 1..=6 {
            let xs: Vec<Vec<f64>> = (0..ndims)
                .map(|i| {
                    // Make a linear grid and add noise
                    let mut x = linspace(-5.0 * (i as f64), 5.0 * ((i + 1) as f64), 2);
                    let dx = randn::<f64>(&mut rng, x.len());
                    (0..x.len()).for_each(|i| x[i] += (dx[i] - 0.5) / 10.0);
                    (0..x.len() - 1).for_each(|i| assert!(x[i + 1] > x[i]));
                    x
                })
                .collect();

            let grids: Vec<&[f64]> = xs.iter().map(|x| &x[..]).collect();
            let grid = meshgrid((0..ndims).map(|i| &xs[i]).collect());
            let u: Vec<f64> = grid.iter().map(|x| x.iter().sum()).collect(); // sum is linear in every direction

            // Observation points
            let xobs: Vec<Vec<f64>> = (0..ndims)
                .map(|i| linspace(-7.0 * (i as f64), 7.0 * ((i + 1) as f64), 3))
                .collect();
            let gridobs = meshgrid((0..ndims).map(|i| &xobs[i]).collect());
            let gridobs_t: Vec<Vec<f64>> = (0..ndims)
                .map(|i| gridobs.iter().map(|x| x[i]).collect())
                .collect(); // transpose
            let xobsslice: Vec<&[f64]> = gridobs_t.iter().map(|x| &x[..]).collect();
            let uobs: Vec<f64> = gridobs.iter().map(|x| x.iter().sum()).collect();
            let mut out = vec![0.0; uobs.len()];

            MultilinearRectilinear::new(&grids, &u)
                .unwrap()
                .interp(&xobsslice, &mut out)
                .unwrap();

            (0..uobs.len()).for_each(|i| assert_abs_diff_eq!(out[i], uobs[i], epsilon = 1e-10));
        }
    }

    /// Interpolate on a hat-shaped function to make sure that the grid cell indexing is aligned properly
    #[test]
    fn test_interp_hat_func() {
        fn hat_func(x: f64) -> f64 {
            if x <= 1.0 { x } else { 2.0 - x }
        }

        let x = (0..3).map(|x| x as f64).collect::<Vec<f64>>();
        let grids = [&x[..]];
        let y = (0..3).map(|x| hat_func(x as f64)).collect::<Vec<f64>>();
        let obs = linspace(-2.0, 4.0, 100);

        let interpolator = MultilinearRectilinear::new(&grids, &y).unwrap();

        (0..obs.len()).for_each(|i| {
            let v = interpolator.interp_one(&[obs[i]]).unwrap();
            assert_abs_diff_eq!(hat_func(obs[i]), v, epsilon = 1e-12);
        })
    }

    /// Bilinear corner extrapolation keeps the cross term of the edge cell
    #[test]
    fn test_extrap_corner_is_tensor_product() {
        let x = [0.0_f64, 1.0];
        let y = [0.0_f64, 1.0];
        let grids = [&x[..], &y[..]];
        // z = x * y
        let z = [0.0, 0.0, 0.0, 1.0];
        let interpolator = MultilinearRectilinear::new(&grids, &z).unwrap();
        assert_abs_diff_eq!(interpolator.interp_one(&[2.0, 3.0]).unwrap(), 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(interpolator.interp_one(&[-1.0, -1.0]).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        let x = [0.0_f64, 1.0, 2.0];
        let grids = [&x[..]];
        assert!(matches!(
            MultilinearRectilinear::new(&grids, &[1.0, 2.0]),
            Err(InterpError::DimensionMismatch)
        ));

        let lone = [0.0_f64];
        let grids = [&lone[..]];
        assert!(matches!(
            MultilinearRectilinear::new(&grids, &[1.0]),
            Err(InterpError::DegenerateGrid { dim: 0 })
        ));
    }
}
