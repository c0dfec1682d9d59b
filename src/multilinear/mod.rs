//! Multilinear interpolation and extrapolation.

pub mod rectilinear;

pub use rectilinear::MultilinearRectilinear;
