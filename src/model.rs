//! The slice of a model framework that tabular models plug into.
//!
//! A [`Model`] declares ordered input and output names, optional units for them, and
//! an [`evaluate`](Model::evaluate) hook that receives already-broadcast, unitless
//! coordinate arrays. [`call`](Model::call) is the user-facing entry point that
//! handles units and broadcasting before dispatching to `evaluate`.
use std::borrow::Cow;

use ndarray::{ArrayD, ArrayViewD, IxDyn};
use num_traits::Float;
use thiserror::Error;

use crate::units::{Unit, UnitError, Values};

/// Errors from the generic call pathway.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("expected {expected} inputs, got {got}")]
    InputCount { expected: usize, got: usize },

    #[error("inputs with shapes {0:?} cannot be broadcast together")]
    Broadcast(Vec<Vec<usize>>),

    /// Inputs handed to `evaluate` must already share one shape.
    #[error("input coordinate arrays have different shapes: {0:?}")]
    ShapeMismatch(Vec<Vec<usize>>),

    #[error(transparent)]
    Units(#[from] UnitError),
}

/// A deterministic function from named inputs to named outputs.
pub trait Model<T: Float> {
    type Error: std::error::Error + From<ModelError> + Send + Sync + 'static;

    /// Instance name, if one was given.
    fn name(&self) -> Option<&str>;

    fn inputs(&self) -> &[String];

    fn outputs(&self) -> &[String];

    fn n_inputs(&self) -> usize {
        self.inputs().len()
    }

    fn n_outputs(&self) -> usize {
        self.outputs().len()
    }

    /// Units each input is expected in, keyed by input name, in input order.
    fn input_units(&self) -> Option<Vec<(String, Unit)>> {
        None
    }

    /// Units of each output, keyed by output name, in output order.
    fn return_units(&self) -> Option<Vec<(String, Unit)>> {
        None
    }

    /// Evaluate on unitless coordinate arrays that all have the same shape.
    fn evaluate(&self, inputs: &[ArrayViewD<'_, T>]) -> Result<Values<T>, Self::Error>;

    /// Evaluate on user inputs.
    ///
    /// When every input carries a unit and the model declares input units, each input
    /// is converted into its declared unit; otherwise units are dropped. Inputs are then
    /// broadcast to a common shape and passed to [`evaluate`](Model::evaluate). A
    /// unitless result takes the model's first return unit, if it has one.
    ///
    /// # Errors
    /// * If the number of inputs does not match the model
    /// * If an input cannot be converted to its declared unit
    /// * If the inputs cannot be broadcast together
    /// * Any error raised by `evaluate`
    fn call(&self, inputs: &[Values<T>]) -> Result<Values<T>, Self::Error> {
        if inputs.len() != self.n_inputs() {
            return Err(ModelError::InputCount {
                expected: self.n_inputs(),
                got: inputs.len(),
            }
            .into());
        }

        let arrays: Vec<Cow<'_, ArrayD<T>>> = match self.input_units() {
            Some(units) if inputs.iter().all(Values::is_quantity) => inputs
                .iter()
                .zip(units.iter())
                .map(|(v, (_, unit))| Ok(Cow::Owned(v.to(*unit)?.array)))
                .collect::<Result<_, ModelError>>()?,
            _ => inputs.iter().map(|v| Cow::Borrowed(&v.array)).collect(),
        };

        let shapes: Vec<Vec<usize>> = arrays.iter().map(|a| a.shape().to_vec()).collect();
        let shape = broadcast_shape(&shapes)?;
        let views = arrays
            .iter()
            .map(|a| a.broadcast(IxDyn(&shape)))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ModelError::Broadcast(shapes.clone()))?;

        let mut result = self.evaluate(&views)?;
        if result.unit.is_none() {
            if let Some((_, unit)) = self.return_units().and_then(|u| u.into_iter().next()) {
                result.unit = Some(unit);
            }
        }
        Ok(result)
    }
}

/// Common shape of several arrays under numpy broadcasting rules:
/// shapes are aligned at their trailing axes, and each axis must either
/// agree or have length one.
///
/// # Errors
/// * If two shapes disagree on an axis where neither has length one
pub fn broadcast_shape(shapes: &[Vec<usize>]) -> Result<Vec<usize>, ModelError> {
    let ndim = shapes.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = vec![1_usize; ndim];
    for shape in shapes {
        let offset = ndim - shape.len();
        for (i, &n) in shape.iter().enumerate() {
            let o = &mut out[offset + i];
            if *o == 1 {
                *o = n;
            } else if n != 1 && n != *o {
                return Err(ModelError::Broadcast(shapes.to_vec()));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::units::{CENTIMETER, METER};
    use ndarray::{arr1, arr2};

    /// Sum of inputs, with inputs in meters and outputs in seconds
    struct Sum {
        inputs: Vec<String>,
        outputs: Vec<String>,
    }

    impl Sum {
        fn new() -> Self {
            Self {
                inputs: vec!["a".into(), "b".into()],
                outputs: vec!["y".into()],
            }
        }
    }

    impl Model<f64> for Sum {
        type Error = ModelError;

        fn name(&self) -> Option<&str> {
            None
        }

        fn inputs(&self) -> &[String] {
            &self.inputs
        }

        fn outputs(&self) -> &[String] {
            &self.outputs
        }

        fn input_units(&self) -> Option<Vec<(String, Unit)>> {
            Some(self.inputs.iter().map(|n| (n.clone(), METER)).collect())
        }

        fn return_units(&self) -> Option<Vec<(String, Unit)>> {
            Some(vec![("y".into(), crate::units::SECOND)])
        }

        fn evaluate(&self, inputs: &[ArrayViewD<'_, f64>]) -> Result<Values<f64>, ModelError> {
            Ok(Values::new(&inputs[0] + &inputs[1]))
        }
    }

    #[test]
    fn test_broadcast_shape() {
        assert_eq!(broadcast_shape(&[vec![3, 1], vec![4]]).unwrap(), vec![3, 4]);
        assert_eq!(broadcast_shape(&[vec![], vec![2]]).unwrap(), vec![2]);
        assert!(broadcast_shape(&[vec![3], vec![4]]).is_err());
    }

    #[test]
    fn test_call_broadcasts_and_converts() {
        let m = Sum::new();
        let a = Values::with_unit(arr2(&[[100.0], [200.0]]).into_dyn(), CENTIMETER);
        let b = Values::with_unit(arr1(&[1.0, 2.0, 3.0]).into_dyn(), METER);
        let y = m.call(&[a, b]).unwrap();
        assert_eq!(y.array.shape(), &[2, 3]);
        assert_eq!(y.array[[1, 2]], 5.0);
        assert_eq!(y.unit, Some(crate::units::SECOND));
    }

    #[test]
    fn test_call_strips_mixed_units() {
        // Only one input carries a unit, so none are converted
        let m = Sum::new();
        let a = Values::with_unit(arr1(&[100.0]).into_dyn(), CENTIMETER);
        let b = Values::from(vec![1.0]);
        let y = m.call(&[a, b]).unwrap();
        assert_eq!(y.array[[0]], 101.0);
    }

    #[test]
    fn test_call_input_count() {
        let m = Sum::new();
        let err = m.call(&[Values::scalar(1.0)]).unwrap_err();
        assert_eq!(err, ModelError::InputCount { expected: 2, got: 1 });
    }
}
