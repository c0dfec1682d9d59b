use thiserror::Error;

use crate::interp::InterpError;
use crate::model::ModelError;
use crate::units::{Unit, UnitError};

/// Errors from building, evaluating, or inverting a tabular model.
///
/// Construction errors are raised eagerly by [`crate::TabularBuilder::build`].
/// Backend availability and bounds violations only surface at evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TabularError {
    #[error("lookup table must have at least one dimension")]
    InvalidDimension,

    #[error("only n_models=1 is supported, got {0}")]
    UnsupportedMultiModel(usize),

    #[error("must provide a lookup table")]
    MissingTable,

    #[error("lookup_table should be an array with {expected} dimensions, got {got}")]
    RankMismatch { expected: usize, got: usize },

    #[error("expected grid points in {expected} directions, got {got}")]
    PointCountMismatch { expected: usize, got: usize },

    #[error("points must all have the same unit, found {} and {}", describe(.first), describe(.other))]
    InconsistentUnits {
        first: Option<Unit>,
        other: Option<Unit>,
    },

    #[error("fill value is in '{fill}' but expected to be {}", describe(.table))]
    IncompatibleFillUnit { fill: Unit, table: Option<Unit> },

    /// The crate was built without an interpolation backend.
    #[error("interpolation backend is not available; enable the `interp` feature")]
    InterpolationUnavailable,

    #[error("an analytical inverse transform has not been implemented for {dim}-dimensional tables")]
    NoAnalyticInverse { dim: usize },

    /// The 1D lookup table is not strictly ascending or strictly descending.
    #[error("lookup table is not strictly monotonic and cannot be inverted")]
    NonInvertible,

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Raised by the interpolation backend, including bounds violations.
    #[error(transparent)]
    Interp(#[from] InterpError),

    #[error(transparent)]
    Units(#[from] UnitError),
}

fn describe(unit: &Option<Unit>) -> String {
    match unit {
        Some(u) => format!("'{u}'"),
        None => "unitless".to_string(),
    }
}
