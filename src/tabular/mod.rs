//! Tabular models: a lookup table sampled on a rectilinear grid, evaluated anywhere
//! by interpolation.
//!
//! Instances are immutable once built. Evaluation and inversion never modify the
//! instance, so a built model can be shared freely between threads.
use std::fmt;

use itertools::Itertools;
use ndarray::{ArrayD, ArrayViewD, IxDyn};
use num_traits::Float;
use tracing::{debug, trace};

use crate::error::TabularError;
use crate::interp::{self, InterpError, Method};
use crate::model::{Model, ModelError};
use crate::units::{Axis, Quantity, Unit, Values};
use crate::utils::pairwise_all;

mod builder;
mod factory;

pub use builder::TabularBuilder;
pub use factory::{tabular_model, TabularFactory, TabularType, TABULAR_1D, TABULAR_2D};

/// Grid coordinates handed to a builder.
///
/// A single axis is accepted as shorthand for the only axis of a 1D table.
#[derive(Debug, Clone, PartialEq)]
pub enum Points<T> {
    Single(Axis<T>),
    Axes(Vec<Axis<T>>),
}

impl<T: Float> From<Axis<T>> for Points<T> {
    fn from(axis: Axis<T>) -> Self {
        Points::Single(axis)
    }
}

impl<T: Float> From<Vec<Axis<T>>> for Points<T> {
    fn from(axes: Vec<Axis<T>>) -> Self {
        Points::Axes(axes)
    }
}

impl<T: Float> From<Vec<Vec<T>>> for Points<T> {
    fn from(axes: Vec<Vec<T>>) -> Self {
        Points::Axes(axes.into_iter().map(Axis::new).collect())
    }
}

/// Policy for coordinates outside the grid when bounds errors are off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill<T> {
    /// Use this value.
    Value(T),
    /// Use this quantity, converted to the lookup table's unit.
    Quantity(Quantity<T>),
    /// Extrapolate with the interpolation method.
    Extrapolate,
}

impl<T: Float> Default for Fill<T> {
    fn default() -> Self {
        Fill::Value(T::nan())
    }
}

impl<T: Float> From<Quantity<T>> for Fill<T> {
    fn from(q: Quantity<T>) -> Self {
        Fill::Quantity(q)
    }
}

/// Per-input `(lower, upper)` limits of the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingBox<T> {
    /// Limits of a one-dimensional model.
    Interval(T, T),
    /// Limits of each input, last input first.
    Intervals(Vec<(T, T)>),
}

impl<T: Copy> BoundingBox<T> {
    /// Limits of each input, first input first.
    pub fn by_input(&self) -> Vec<(T, T)> {
        match self {
            BoundingBox::Interval(lo, hi) => vec![(*lo, *hi)],
            BoundingBox::Intervals(v) => v.iter().rev().copied().collect(),
        }
    }
}

/// A lookup table on a rectilinear grid.
///
/// Built with [`TabularType::builder`]. Inputs are the grid coordinates `x0, x1, ...`
/// and the single output `y` is the table interpolated at those coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Tabular<T> {
    kind: TabularType,
    name: Option<String>,
    points: Vec<Axis<T>>,
    lookup_table: Values<T>,
    method: Method,
    bounds_error: bool,
    /// `None` means extrapolate
    fill_value: Option<T>,
}

impl<T: Float> Tabular<T> {
    /// The type this instance was built from.
    pub fn kind(&self) -> &TabularType {
        &self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn points(&self) -> &[Axis<T>] {
        &self.points
    }

    pub fn lookup_table(&self) -> &Values<T> {
        &self.lookup_table
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn bounds_error(&self) -> bool {
        self.bounds_error
    }

    /// Value used outside the grid, in the lookup table's unit;
    /// `None` when out-of-grid points are extrapolated.
    pub fn fill_value(&self) -> Option<T> {
        self.fill_value
    }

    pub fn dimensionality(&self) -> usize {
        self.kind.dimensionality()
    }

    pub fn separable(&self) -> bool {
        self.kind.separable()
    }

    /// Tabular models have no free parameters.
    pub fn fittable(&self) -> bool {
        false
    }

    pub fn linear(&self) -> bool {
        false
    }

    /// Each input takes the first axis's unit, when it has one.
    pub fn input_units(&self) -> Option<Vec<(String, Unit)>> {
        let unit = self.points.first()?.unit?;
        Some(self.kind.inputs().iter().map(|name| (name.clone(), unit)).collect())
    }

    /// The output takes the lookup table's unit, when it has one.
    pub fn return_units(&self) -> Option<Vec<(String, Unit)>> {
        let unit = self.lookup_table.unit?;
        Some(self.kind.outputs().iter().map(|name| (name.clone(), unit)).collect())
    }

    /// Minimum and maximum of each axis, in reverse input order.
    ///
    /// NaN coordinates are ignored; an empty axis yields NaN limits.
    pub fn bounding_box(&self) -> BoundingBox<T> {
        let mut limits: Vec<(T, T)> = self
            .points
            .iter()
            .rev()
            .map(|p| p.extent().unwrap_or((T::nan(), T::nan())))
            .collect();
        match limits.len() {
            1 => {
                let (lo, hi) = limits.remove(0);
                BoundingBox::Interval(lo, hi)
            }
            _ => BoundingBox::Intervals(limits),
        }
    }

    /// Interpolate the table at the given coordinates.
    ///
    /// Takes one coordinate array per input, all of the same shape, and returns an
    /// array of that shape. The result takes the table's unit only when the grid is
    /// unitless; otherwise units are left to [`Model::call`].
    ///
    /// # Errors
    /// * If the number or shapes of the coordinate arrays are wrong
    /// * If the crate was built without an interpolation backend
    /// * If the grid does not match the table, or is not strictly ascending
    /// * If a coordinate is out of bounds while bounds errors are on
    /// * If the method cannot be used with this table or fill policy
    pub fn evaluate(&self, inputs: &[ArrayViewD<'_, T>]) -> Result<Values<T>, TabularError> {
        let dim = self.dimensionality();
        if inputs.len() != dim {
            return Err(ModelError::InputCount {
                expected: dim,
                got: inputs.len(),
            }
            .into());
        }
        let shape = inputs[0].shape().to_vec();
        if inputs.iter().any(|x| x.shape() != shape.as_slice()) {
            let shapes = inputs.iter().map(|x| x.shape().to_vec()).collect();
            return Err(ModelError::ShapeMismatch(shapes).into());
        }
        if !interp::available() {
            return Err(TabularError::InterpolationUnavailable);
        }

        let flat: Vec<Vec<T>> = inputs.iter().map(|x| x.iter().copied().collect()).collect();
        let xi: Vec<&[T]> = flat.iter().map(|x| &x[..]).collect();
        let grids: Vec<&[T]> = self.points.iter().map(|p| &p.values[..]).collect();

        trace!(
            kind = %self.kind.name(),
            npoints = flat[0].len(),
            method = %self.method,
            "evaluating tabular model"
        );
        let out = interp::interpn(
            &grids,
            self.lookup_table.array.view(),
            &xi,
            self.method,
            self.bounds_error,
            self.fill_value,
        )?;

        let array = ArrayD::from_shape_vec(IxDyn(&shape), out).map_err(|_| InterpError::DimensionMismatch)?;
        let unit = match self.points[0].unit {
            None => self.lookup_table.unit,
            Some(_) => None,
        };
        Ok(Values { array, unit })
    }

    /// The 1D model that maps table values back to grid coordinates.
    ///
    /// The table must be strictly ascending or strictly descending; a descending table
    /// is reversed together with its grid. The inverse is a fresh `Tabular1D` with
    /// default settings, so its interpolation method, bounds policy, fill value and
    /// name are not carried over.
    ///
    /// # Errors
    /// * If the model is not one-dimensional
    /// * If the table is not strictly monotonic
    pub fn inverse(&self) -> Result<Tabular<T>, TabularError> {
        let dim = self.dimensionality();
        if dim != 1 {
            return Err(TabularError::NoAnalyticInverse { dim });
        }

        let table = Axis {
            values: self.lookup_table.array.iter().copied().collect(),
            unit: self.lookup_table.unit,
        };
        let grid = &self.points[0];
        let (points, lookup_table) = if pairwise_all(table.values.iter().copied(), |a, b| a < b) {
            (table, grid.clone())
        } else if pairwise_all(table.values.iter().copied(), |a, b| a > b) {
            (table.reversed(), grid.reversed())
        } else {
            return Err(TabularError::NonInvertible);
        };

        debug!(kind = %self.kind.name(), npoints = points.len(), "inverting tabular model");
        let lookup_table = Values {
            array: ndarray::Array1::from(lookup_table.values).into_dyn(),
            unit: lookup_table.unit,
        };
        TABULAR_1D.builder().points(points).lookup_table(lookup_table).build()
    }
}

impl<T: Float + fmt::Display> Tabular<T> {
    /// Short constructor-style description: `<Tabular2D(points=..., lookup_table=...)>`.
    pub fn repr(&self) -> String {
        format!(
            "<{}(points={}, lookup_table={})>",
            self.kind.name(),
            format_points(&self.points),
            format_values(&self.lookup_table)
        )
    }
}

fn format_axis<T: fmt::Display>(axis: &Axis<T>) -> String {
    let body = format!("[{}]", axis.values.iter().join(", "));
    match axis.unit {
        Some(unit) => format!("{body} {unit}"),
        None => body,
    }
}

fn format_points<T: fmt::Display>(points: &[Axis<T>]) -> String {
    format!("({})", points.iter().map(format_axis).join(", "))
}

fn format_values<T: fmt::Display>(values: &Values<T>) -> String {
    match values.unit {
        Some(unit) => format!("{} {unit}", values.array),
        None => format!("{}", values.array),
    }
}

impl<T: Float + fmt::Display> fmt::Display for Tabular<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: {}", self.kind.name())?;
        if let Some(name) = &self.name {
            writeln!(f, "Name: {name}")?;
        }
        writeln!(f, "Inputs: ({})", self.kind.inputs().iter().join(", "))?;
        writeln!(f, "Outputs: ({})", self.kind.outputs().iter().join(", "))?;
        writeln!(f, "Parameters: ")?;
        writeln!(f, "  points: {}", format_points(&self.points))?;
        writeln!(f, "  lookup_table: {}", format_values(&self.lookup_table))?;
        writeln!(f, "  method: {}", self.method)?;
        if let Some(fill) = self.fill_value {
            writeln!(f, "  fill_value: {fill}")?;
        }
        write!(f, "  bounds_error: {}", self.bounds_error)
    }
}

impl<T: Float> Model<T> for Tabular<T> {
    type Error = TabularError;

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn inputs(&self) -> &[String] {
        self.kind.inputs()
    }

    fn outputs(&self) -> &[String] {
        self.kind.outputs()
    }

    fn input_units(&self) -> Option<Vec<(String, Unit)>> {
        Tabular::input_units(self)
    }

    fn return_units(&self) -> Option<Vec<(String, Unit)>> {
        Tabular::return_units(self)
    }

    fn evaluate(&self, inputs: &[ArrayViewD<'_, T>]) -> Result<Values<T>, TabularError> {
        Tabular::evaluate(self, inputs)
    }
}
