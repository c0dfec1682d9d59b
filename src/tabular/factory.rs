//! Dimension-specialized tabular model types.
//!
//! A [`TabularType`] is created once per dimensionality and name, and then used to
//! build any number of [`Tabular`](super::Tabular) instances. Unnamed types get a
//! name from a process-wide counter, `Tabular0`, `Tabular1`, ...; the two predefined
//! types [`TABULAR_1D`] and [`TABULAR_2D`] do not draw from it.
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;

use itertools::Itertools;
use ndarray::{ArrayD, IxDyn};
use num_traits::Float;
use tracing::debug;

use super::TabularBuilder;
use crate::error::TabularError;

/// Predefined one-dimensional tabular type, named `Tabular1D`.
pub static TABULAR_1D: LazyLock<TabularType> = LazyLock::new(|| TabularType::new(1, "Tabular1D".into()));

/// Predefined two-dimensional tabular type, named `Tabular2D`.
pub static TABULAR_2D: LazyLock<TabularType> = LazyLock::new(|| TabularType::new(2, "Tabular2D".into()));

/// A tabular model family of fixed dimensionality.
///
/// Holds the input names `x0 .. x{dim-1}` and the single output name `y`.
/// Models of one dimension are separable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TabularType {
    name: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl TabularType {
    /// `dim` must be at least 1; the factory checks this.
    pub(crate) fn new(dim: usize, name: String) -> Self {
        Self {
            name,
            inputs: (0..dim).map(|i| format!("x{i}")).collect(),
            outputs: vec!["y".to_string()],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensionality(&self) -> usize {
        self.inputs.len()
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn n_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn n_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn separable(&self) -> bool {
        self.dimensionality() == 1
    }

    /// A zero-filled table of shape `(2,) * dim`.
    ///
    /// Only its rank matters; builders check supplied tables against
    /// [`dimensionality`](Self::dimensionality) directly rather than allocating this.
    pub fn placeholder_table(&self) -> ArrayD<f64> {
        ArrayD::zeros(IxDyn(&vec![2; self.dimensionality()]))
    }

    /// Start building an instance of this type.
    pub fn builder<T: Float>(&self) -> TabularBuilder<T> {
        TabularBuilder::new(self.clone())
    }
}

impl fmt::Display for TabularType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "N_inputs: {}", self.n_inputs())?;
        writeln!(f, "N_outputs: {}", self.n_outputs())?;
        writeln!(f, "Inputs: ({})", self.inputs.iter().join(", "))?;
        write!(f, "Outputs: ({})", self.outputs.iter().join(", "))
    }
}

/// Issues [`TabularType`]s, numbering the unnamed ones.
///
/// Numbering is monotonic and unique per factory, including under concurrent use.
#[derive(Debug, Default)]
pub struct TabularFactory {
    next_id: AtomicUsize,
}

static GLOBAL_FACTORY: TabularFactory = TabularFactory::new();

impl TabularFactory {
    pub const fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(0),
        }
    }

    /// The process-wide factory used by [`tabular_model`].
    pub fn global() -> &'static TabularFactory {
        &GLOBAL_FACTORY
    }

    /// Create a tabular type of dimensionality `dim`.
    ///
    /// Without a name, the type is called `Tabular{id}` with the next counter value.
    /// A rejected call does not consume an id.
    ///
    /// # Errors
    /// * If `dim` is zero
    pub fn create(&self, dim: usize, name: Option<&str>) -> Result<TabularType, TabularError> {
        if dim < 1 {
            return Err(TabularError::InvalidDimension);
        }
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Tabular{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
        };
        debug!(name = %name, dim, "created tabular model type");
        Ok(TabularType::new(dim, name))
    }

    /// Number of automatic names issued so far.
    pub fn issued(&self) -> usize {
        self.next_id.load(Ordering::Relaxed)
    }
}

/// Create a tabular type from the process-wide factory.
///
/// ```rust
/// use tabular_model::tabular_model;
///
/// let kind = tabular_model(3, Some("Cube")).unwrap();
/// assert_eq!(kind.name(), "Cube");
/// assert_eq!(kind.inputs(), ["x0", "x1", "x2"]);
/// assert!(!kind.separable());
/// assert!(tabular_model(0, None).is_err());
/// ```
///
/// # Errors
/// * If `dim` is zero
pub fn tabular_model(dim: usize, name: Option<&str>) -> Result<TabularType, TabularError> {
    TabularFactory::global().create(dim, name)
}
