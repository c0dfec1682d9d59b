//! Convenience methods for constructing grids in a way that echoes,
//! but does not exactly match, methods common in scripting languages.
use itertools::Itertools;
use num_traits::Float;

/// Generates evenly spaced values from start to stop,
/// including the endpoint.
pub fn linspace<T>(start: T, stop: T, n: usize) -> Vec<T>
where
    T: Float,
{
    if n < 2 {
        return (0..n).map(|_| start).collect();
    }
    let dx: T = (stop - start) / T::from(n - 1).unwrap_or_else(T::nan);
    (0..n)
        .map(|i| start + T::from(i).unwrap_or_else(T::nan) * dx)
        .collect()
}

/// Generates `0, 1, ..., n - 1` in the value type, the default grid axis
/// for a table dimension of size `n`.
pub fn arange<T>(n: usize) -> Vec<T>
where
    T: Float,
{
    (0..n).map(|i| T::from(i).unwrap_or_else(T::nan)).collect()
}

/// Generates a meshgrid in C ordering (x0, y0, z0, x0, y0, z1, ..., x0, yn, zn)
pub fn meshgrid<T>(x: Vec<&Vec<T>>) -> Vec<Vec<T>>
where
    T: Float,
{
    x.into_iter()
        .multi_cartesian_product()
        .map(|xx| xx.iter().map(|y| **y).collect())
        .collect()
}

/// True when every consecutive pair satisfies `cmp`; vacuously true for fewer
/// than two values.
pub fn pairwise_all<T, F>(values: impl IntoIterator<Item = T>, cmp: F) -> bool
where
    T: Copy,
    F: Fn(T, T) -> bool,
{
    values.into_iter().tuple_windows().all(|(a, b)| cmp(a, b))
}
