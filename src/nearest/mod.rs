//! Nearest-neighbor interpolation and extrapolation.

pub mod rectilinear;

pub use rectilinear::NearestRectilinear;
