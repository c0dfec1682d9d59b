use num_traits::Float;
use tracing::debug;

use super::{Fill, Points, Tabular, TabularType};
use crate::error::TabularError;
use crate::interp::Method;
use crate::units::{Axis, Values};
use crate::utils::arange;

/// Collects the settings of a [`Tabular`] instance and validates them together.
///
/// Defaults: grid `0..n` on every axis, [`Method::Linear`], bounds errors on,
/// NaN fill, one model. Only the lookup table is required.
#[derive(Debug, Clone)]
pub struct TabularBuilder<T> {
    kind: TabularType,
    name: Option<String>,
    points: Option<Points<T>>,
    lookup_table: Option<Values<T>>,
    method: Method,
    bounds_error: bool,
    fill_value: Fill<T>,
    n_models: usize,
}

impl<T: Float> TabularBuilder<T> {
    pub(crate) fn new(kind: TabularType) -> Self {
        Self {
            kind,
            name: None,
            points: None,
            lookup_table: None,
            method: Method::default(),
            bounds_error: true,
            fill_value: Fill::default(),
            n_models: 1,
        }
    }

    /// Instance name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Grid coordinates, one axis per table dimension.
    pub fn points(mut self, points: impl Into<Points<T>>) -> Self {
        self.points = Some(points.into());
        self
    }

    /// Values sampled at every grid node, optionally with a unit.
    pub fn lookup_table(mut self, lookup_table: impl Into<Values<T>>) -> Self {
        self.lookup_table = Some(lookup_table.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Fail evaluation when any coordinate is outside the grid.
    pub fn bounds_error(mut self, bounds_error: bool) -> Self {
        self.bounds_error = bounds_error;
        self
    }

    /// Value for coordinates outside the grid when bounds errors are off.
    pub fn fill_value(mut self, fill_value: Fill<T>) -> Self {
        self.fill_value = fill_value;
        self
    }

    /// Number of model sets; only 1 is supported.
    pub fn n_models(mut self, n_models: usize) -> Self {
        self.n_models = n_models;
        self
    }

    /// Validate the settings and build the instance.
    ///
    /// Grid shape, sortedness, and method applicability are not checked here;
    /// they surface from [`Tabular::evaluate`].
    ///
    /// # Errors
    /// * If more than one model is requested
    /// * If no lookup table was given
    /// * If the table's rank differs from the type's dimensionality
    /// * If the number of axes differs from the table's rank
    /// * If the axes carry inconsistent units
    /// * If a fill quantity cannot be expressed in the table's unit
    pub fn build(self) -> Result<Tabular<T>, TabularError> {
        if self.n_models > 1 {
            return Err(TabularError::UnsupportedMultiModel(self.n_models));
        }
        let lookup_table = self.lookup_table.ok_or(TabularError::MissingTable)?;

        let dim = self.kind.dimensionality();
        let ndim = lookup_table.array.ndim();
        if ndim != dim {
            return Err(TabularError::RankMismatch { expected: dim, got: ndim });
        }

        let points: Vec<Axis<T>> = match self.points {
            None => lookup_table
                .array
                .shape()
                .iter()
                .map(|&n| Axis::new(arange(n)))
                .collect(),
            Some(Points::Single(axis)) => vec![axis],
            Some(Points::Axes(axes)) => axes,
        };
        if points.len() != ndim {
            return Err(TabularError::PointCountMismatch {
                expected: ndim,
                got: points.len(),
            });
        }
        check_units(&points)?;

        let fill_value = match self.fill_value {
            Fill::Value(v) => Some(v),
            Fill::Extrapolate => None,
            Fill::Quantity(q) => {
                let incompatible = TabularError::IncompatibleFillUnit {
                    fill: q.unit,
                    table: lookup_table.unit,
                };
                let unit = lookup_table.unit.ok_or_else(|| incompatible.clone())?;
                Some(q.to(unit).map_err(|_| incompatible)?.value)
            }
        };

        // Evaluation indexes the table in C order
        let lookup_table = Values {
            array: lookup_table.array.as_standard_layout().into_owned(),
            unit: lookup_table.unit,
        };

        debug!(
            kind = %self.kind.name(),
            name = ?self.name,
            shape = ?lookup_table.array.shape(),
            method = %self.method,
            bounds_error = self.bounds_error,
            "built tabular model"
        );

        Ok(Tabular {
            kind: self.kind,
            name: self.name,
            points,
            lookup_table,
            method: self.method,
            bounds_error: self.bounds_error,
            fill_value,
        })
    }
}

/// When the first axis has a unit, every axis must have that unit.
/// Otherwise any axes that do have units must agree with each other.
fn check_units<T>(points: &[Axis<T>]) -> Result<(), TabularError> {
    let mismatch = |first, other| TabularError::InconsistentUnits { first, other };
    match points.first().and_then(|p| p.unit) {
        Some(first) => match points.iter().find(|p| p.unit != Some(first)) {
            Some(p) => Err(mismatch(Some(first), p.unit)),
            None => Ok(()),
        },
        None => {
            let mut units = points.iter().filter_map(|p| p.unit);
            match units.next() {
                Some(first) => match units.find(|u| *u != first) {
                    Some(other) => Err(mismatch(Some(first), Some(other))),
                    None => Ok(()),
                },
                None => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::units::{Quantity, CENTIMETER, KELVIN, METER, SECOND};
    use crate::TABULAR_2D;
    use ndarray::{array, Array2};

    fn table() -> Array2<f64> {
        array![[3.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 0.0]]
    }

    #[test]
    fn test_defaults() {
        let model = TABULAR_2D.builder().lookup_table(table()).build().unwrap();
        assert_eq!(model.points()[0].values, vec![0.0, 1.0, 2.0]);
        assert_eq!(model.points()[1].values, vec![0.0, 1.0, 2.0]);
        assert_eq!(model.method(), Method::Linear);
        assert!(model.bounds_error());
        assert!(model.fill_value().is_some_and(f64::is_nan));
        assert_eq!(model.name(), None);
    }

    #[test]
    fn test_check_order() {
        // Multi-model is rejected before the missing table
        assert_eq!(
            TABULAR_2D.builder::<f64>().n_models(2).build().unwrap_err(),
            TabularError::UnsupportedMultiModel(2)
        );
        assert_eq!(
            TABULAR_2D.builder::<f64>().build().unwrap_err(),
            TabularError::MissingTable
        );
        assert_eq!(
            TABULAR_2D
                .builder()
                .lookup_table(vec![1.0, 2.0])
                .build()
                .unwrap_err(),
            TabularError::RankMismatch { expected: 2, got: 1 }
        );
        assert_eq!(
            TABULAR_2D
                .builder()
                .lookup_table(table())
                .points(vec![vec![1.0, 2.0, 3.0]])
                .build()
                .unwrap_err(),
            TabularError::PointCountMismatch { expected: 2, got: 1 }
        );
    }

    #[test]
    fn test_units_must_agree() {
        let x = Axis::with_unit(vec![1.0, 2.0, 3.0], METER);
        let err = TABULAR_2D
            .builder()
            .lookup_table(table())
            .points(vec![x.clone(), Axis::new(vec![1.0, 2.0, 3.0])])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TabularError::InconsistentUnits {
                first: Some(METER),
                other: None
            }
        );

        // A different spelling of the same dimension still differs
        let err = TABULAR_2D
            .builder()
            .lookup_table(table())
            .points(vec![x.clone(), Axis::with_unit(vec![1.0, 2.0, 3.0], CENTIMETER)])
            .build()
            .unwrap_err();
        assert!(matches!(err, TabularError::InconsistentUnits { .. }));

        // Unitless first axis tolerates later axes with units, as long as they agree
        let y = Axis::new(vec![1.0, 2.0, 3.0]);
        assert!(TABULAR_2D
            .builder()
            .lookup_table(table())
            .points(vec![y, x])
            .build()
            .is_ok());
    }

    #[test]
    fn test_fill_quantity() {
        let metered = || crate::Values::with_unit(table().into_dyn(), METER);

        let model = TABULAR_2D
            .builder()
            .lookup_table(metered())
            .fill_value(Fill::Quantity(Quantity::new(50.0, CENTIMETER)))
            .build()
            .unwrap();
        assert_eq!(model.fill_value(), Some(0.5));

        assert_eq!(
            TABULAR_2D
                .builder()
                .lookup_table(metered())
                .fill_value(Fill::Quantity(Quantity::new(1.0, SECOND)))
                .build()
                .unwrap_err(),
            TabularError::IncompatibleFillUnit {
                fill: SECOND,
                table: Some(METER)
            }
        );

        // Unitless table cannot absorb a fill with units
        assert_eq!(
            TABULAR_2D
                .builder()
                .lookup_table(table())
                .fill_value(Fill::Quantity(Quantity::new(1.0, KELVIN)))
                .build()
                .unwrap_err(),
            TabularError::IncompatibleFillUnit {
                fill: KELVIN,
                table: None
            }
        );
    }

    #[test]
    fn test_table_stored_in_standard_layout() {
        let t = table();
        let model = TABULAR_2D
            .builder()
            .lookup_table(t.t().to_owned())
            .build()
            .unwrap();
        assert!(model.lookup_table().array.is_standard_layout());
    }
}
