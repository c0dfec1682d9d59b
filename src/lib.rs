//! N-dimensional lookup-table models: a rectilinear grid of sample points and the values
//! sampled on it, evaluated anywhere by interpolation, extrapolation, or a fill value.
//!
//! A [`TabularType`] fixes the dimensionality of a family of models and names its
//! inputs (`x0`, `x1`, ...) and its single output (`y`). Building an instance from a
//! type validates the grid, the table, and their units eagerly; evaluation is a pure
//! function of the instance and the query coordinates.
//!
//! | Method      | Dimensions | Extrapolation             | Cost per point                  |
//! |-------------|------------|---------------------------|---------------------------------|
//! | `linear`    | any        | edge cells extended       | O(2^ndims) + log2(gridsize)     |
//! | `nearest`   | any        | edge nodes held           | O(ndims) + log2(gridsize)       |
//! | `splinef2d` | 2          | not supported             | O(nx) + log2(ny)                |
//!
//! # Example: 2D nearest-neighbor table with extrapolation
//! ```rust
//! use ndarray::array;
//! use tabular_model::{Fill, Method, TABULAR_2D};
//!
//! let table = array![[3.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 0.0]];
//! let model = TABULAR_2D
//!     .builder()
//!     .lookup_table(table)
//!     .points(vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]])
//!     .method(Method::Nearest)
//!     .bounds_error(false)
//!     .fill_value(Fill::Extrapolate)
//!     .build()
//!     .unwrap();
//!
//! let x = array![0.0, 1.0, 1.5, 2.72, 3.14].into_dyn();
//! let y = model.evaluate(&[x.view(), x.view()]).unwrap();
//! assert_eq!(y.array.as_slice().unwrap(), &[3.0, 3.0, 3.0, 0.0, 0.0]);
//! ```
//!
//! # Example: 1D table and its inverse
//! ```rust
//! use ndarray::array;
//! use tabular_model::{Axis, TABULAR_1D};
//!
//! let model = TABULAR_1D
//!     .builder()
//!     .lookup_table(array![10.0, 20.0, 30.0])
//!     .points(Axis::from(vec![1.0, 2.0, 3.0]))
//!     .build()
//!     .unwrap();
//!
//! let inverse = model.inverse().unwrap();
//! let x = inverse.evaluate(&[array![25.0_f64].into_dyn().view()]).unwrap();
//! assert!((x.array[[0]] - 2.5).abs() < 1e-12);
//! ```
// These "needless" range loops read more clearly next to the index math
#![allow(clippy::needless_range_loop)]

pub mod error;
pub use error::TabularError;

pub mod interp;
pub use interp::{InterpError, Method};

pub mod model;
pub use model::{Model, ModelError};

#[cfg(feature = "interp")]
pub mod multicubic;
#[cfg(feature = "interp")]
pub mod multilinear;
#[cfg(feature = "interp")]
pub mod nearest;

pub mod tabular;
pub use tabular::{
    tabular_model, BoundingBox, Fill, Points, Tabular, TabularBuilder, TabularFactory,
    TabularType, TABULAR_1D, TABULAR_2D,
};

pub mod units;
pub use units::{Axis, Quantity, Unit, Values};

pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

/// Index a single value from a C-ordered array
#[inline]
#[cfg_attr(not(feature = "interp"), allow(dead_code))]
pub(crate) fn index_arr<T: Copy>(loc: &[usize], dimprod: &[usize], data: &[T]) -> T {
    let mut i = 0;
    for j in 0..dimprod.len() {
        i += loc[j] * dimprod[j];
    }

    data[i]
}

/// Cumulative product of higher dimensions for indexing.
///
/// Each entry is the cumulative product of the size of dimensions
/// higher than this one, which is the stride between blocks
/// relating to a given index along each dimension.
#[cfg_attr(not(feature = "interp"), allow(dead_code))]
pub(crate) fn dimprod(dims: &[usize]) -> Vec<usize> {
    let ndims = dims.len();
    let mut dimprod = vec![1_usize; ndims];
    let mut acc = 1;
    for i in 0..ndims {
        dimprod[ndims - i - 1] = acc;
        acc *= dims[ndims - i - 1];
    }
    dimprod
}

/// Get the lower-corner index of the grid cell where `v` is found,
/// saturating to the edge cells outside the grid.
///
/// The grid must have at least two entries.
#[inline]
#[cfg_attr(not(feature = "interp"), allow(dead_code))]
pub(crate) fn lower_corner<T: num_traits::Float>(grid: &[T], v: T) -> usize {
    // Bisection search to find location on the grid.
    //
    // The search will return `0` if the point is outside-low,
    // and will return `grid.len()` if outside-high.
    let iloc: isize = grid.partition_point(|x| *x < v) as isize - 1;

    let dimmax = grid.len().saturating_sub(2) as isize; // maximum index for lower corner
    iloc.max(0).min(dimmax) as usize // unsigned integer loc clipped to interior
}
