//! Minimal runtime unit system for lookup tables and their grids.
//!
//! Units are compared and converted at runtime because a table's grid and its
//! values may or may not carry a unit, and that is only known once a model is
//! built. Every unit is a scale factor onto the coherent SI unit of its
//! [`Dimension`], so conversion between two units of the same dimension is a
//! single multiplication.
//!
//! ```rust
//! use tabular_model::units::{Quantity, CENTIMETER, METER};
//!
//! let q = Quantity::new(250.0_f64, CENTIMETER);
//! let q = q.to(METER).unwrap();
//! assert!((q.value - 2.5).abs() < 1e-12);
//! ```
use std::fmt;

use ndarray::ArrayD;
use num_traits::{Float, NumCast};
use thiserror::Error;

/// Errors from unit comparison and conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// The two units measure different physical dimensions.
    #[error("'{from}' ({from_dim}) and '{to}' ({to_dim}) are not convertible")]
    Incompatible {
        from: &'static str,
        to: &'static str,
        from_dim: Dimension,
        to_dim: Dimension,
    },

    /// The conversion factor does not fit the value type.
    #[error("conversion factor {0} is not representable")]
    Unrepresentable(f64),
}

/// Exponents over the SI base dimensions, in the order
/// length, mass, time, current, temperature, amount, luminous intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension(pub [i8; 7]);

impl Dimension {
    pub const NONE: Self = Self([0; 7]);
    pub const LENGTH: Self = Self([1, 0, 0, 0, 0, 0, 0]);
    pub const MASS: Self = Self([0, 1, 0, 0, 0, 0, 0]);
    pub const TIME: Self = Self([0, 0, 1, 0, 0, 0, 0]);
    pub const TEMPERATURE: Self = Self([0, 0, 0, 0, 1, 0, 0]);
    pub const ENERGY: Self = Self([2, 1, -2, 0, 0, 0, 0]);
    pub const FREQUENCY: Self = Self([0, 0, -1, 0, 0, 0, 0]);
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SYMBOLS: [&str; 7] = ["L", "M", "T", "I", "Θ", "N", "J"];
        if *self == Self::NONE {
            return write!(f, "dimensionless");
        }
        let mut first = true;
        for (sym, &exp) in SYMBOLS.iter().zip(self.0.iter()) {
            if exp == 0 {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            first = false;
            match exp {
                1 => write!(f, "{sym}")?,
                _ => write!(f, "{sym}^{exp}")?,
            }
        }
        Ok(())
    }
}

/// A physical unit: a symbol, a scale onto the SI unit of its dimension,
/// and the dimension itself.
///
/// Two units are identical when all three parts match; they are convertible
/// when their dimensions match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    symbol: &'static str,
    scale: f64,
    dimension: Dimension,
}

impl Unit {
    pub const fn new(symbol: &'static str, scale: f64, dimension: Dimension) -> Self {
        Self {
            symbol,
            scale,
            dimension,
        }
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Size of this unit in coherent SI units of the same dimension.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn is_convertible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Factor `k` such that a value `v` in `self` equals `k * v` in `other`.
    ///
    /// # Errors
    /// * If the units measure different dimensions
    pub fn conversion_factor(&self, other: &Unit) -> Result<f64, UnitError> {
        if !self.is_convertible(other) {
            return Err(UnitError::Incompatible {
                from: self.symbol,
                to: other.symbol,
                from_dim: self.dimension,
                to_dim: other.dimension,
            });
        }
        Ok(self.scale / other.scale)
    }

    /// Conversion factor cast into the value type.
    pub(crate) fn factor_as<T: Float>(&self, other: &Unit) -> Result<T, UnitError> {
        let k = self.conversion_factor(other)?;
        <T as NumCast>::from(k).ok_or(UnitError::Unrepresentable(k))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

pub const DIMENSIONLESS: Unit = Unit::new("", 1.0, Dimension::NONE);

pub const METER: Unit = Unit::new("m", 1.0, Dimension::LENGTH);
pub const KILOMETER: Unit = Unit::new("km", 1e3, Dimension::LENGTH);
pub const CENTIMETER: Unit = Unit::new("cm", 1e-2, Dimension::LENGTH);
pub const MILLIMETER: Unit = Unit::new("mm", 1e-3, Dimension::LENGTH);
pub const MICRON: Unit = Unit::new("micron", 1e-6, Dimension::LENGTH);
pub const NANOMETER: Unit = Unit::new("nm", 1e-9, Dimension::LENGTH);
pub const ANGSTROM: Unit = Unit::new("Angstrom", 1e-10, Dimension::LENGTH);

pub const SECOND: Unit = Unit::new("s", 1.0, Dimension::TIME);
pub const MILLISECOND: Unit = Unit::new("ms", 1e-3, Dimension::TIME);
pub const MINUTE: Unit = Unit::new("min", 60.0, Dimension::TIME);
pub const HOUR: Unit = Unit::new("h", 3600.0, Dimension::TIME);

pub const KILOGRAM: Unit = Unit::new("kg", 1.0, Dimension::MASS);
pub const GRAM: Unit = Unit::new("g", 1e-3, Dimension::MASS);

pub const KELVIN: Unit = Unit::new("K", 1.0, Dimension::TEMPERATURE);

pub const JOULE: Unit = Unit::new("J", 1.0, Dimension::ENERGY);
pub const ERG: Unit = Unit::new("erg", 1e-7, Dimension::ENERGY);

pub const HERTZ: Unit = Unit::new("Hz", 1.0, Dimension::FREQUENCY);

/// A scalar value carrying a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity<T> {
    pub value: T,
    pub unit: Unit,
}

impl<T: Float> Quantity<T> {
    pub fn new(value: T, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Express this quantity in another unit of the same dimension.
    pub fn to(&self, unit: Unit) -> Result<Self, UnitError> {
        let k: T = self.unit.factor_as(&unit)?;
        Ok(Self::new(self.value * k, unit))
    }
}

impl<T: fmt::Display> fmt::Display for Quantity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// An array of values that may carry a unit.
///
/// Used for lookup tables, model inputs and model outputs alike.
#[derive(Debug, Clone, PartialEq)]
pub struct Values<T> {
    pub array: ArrayD<T>,
    pub unit: Option<Unit>,
}

impl<T: Float> Values<T> {
    pub fn new(array: ArrayD<T>) -> Self {
        Self { array, unit: None }
    }

    pub fn with_unit(array: ArrayD<T>, unit: Unit) -> Self {
        Self {
            array,
            unit: Some(unit),
        }
    }

    /// Build a unitless 0-dimensional array from a scalar.
    pub fn scalar(value: T) -> Self {
        Self::new(ndarray::arr0(value).into_dyn())
    }

    pub fn is_quantity(&self) -> bool {
        self.unit.is_some()
    }

    /// Express these values in another unit.
    ///
    /// # Errors
    /// * If the values carry no unit and `unit` is not dimensionless
    /// * If the units measure different dimensions
    pub fn to(&self, unit: Unit) -> Result<Self, UnitError> {
        let from = self.unit.unwrap_or(DIMENSIONLESS);
        let k: T = from.factor_as(&unit)?;
        Ok(Self::with_unit(self.array.mapv(|v| v * k), unit))
    }
}

impl<T, D> From<ndarray::Array<T, D>> for Values<T>
where
    T: Float,
    D: ndarray::Dimension,
{
    fn from(array: ndarray::Array<T, D>) -> Self {
        Self::new(array.into_dyn())
    }
}

impl<T: Float> From<Vec<T>> for Values<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(ndarray::Array1::from(values).into_dyn())
    }
}

/// One coordinate axis of a grid, optionally carrying a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis<T> {
    pub values: Vec<T>,
    pub unit: Option<Unit>,
}

impl<T: Float> Axis<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values, unit: None }
    }

    pub fn with_unit(values: Vec<T>, unit: Unit) -> Self {
        Self {
            values,
            unit: Some(unit),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smallest and largest coordinate, ignoring NaN.
    pub fn extent(&self) -> Option<(T, T)> {
        let mut it = self.values.iter().copied().filter(|v| !v.is_nan());
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// The same coordinates in reverse order, keeping the unit.
    pub fn reversed(&self) -> Self {
        Self {
            values: self.values.iter().rev().copied().collect(),
            unit: self.unit,
        }
    }
}

impl<T: Float> From<Vec<T>> for Axis<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}

impl<T: Float> From<&[T]> for Axis<T> {
    fn from(values: &[T]) -> Self {
        Self::new(values.to_vec())
    }
}

impl<T: Float, const N: usize> From<[T; N]> for Axis<T> {
    fn from(values: [T; N]) -> Self {
        Self::new(values.to_vec())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_conversion_same_dimension() {
        let k = KILOMETER.conversion_factor(&METER).unwrap();
        assert_relative_eq!(k, 1e3);
        let q = Quantity::new(5000.0_f64, ANGSTROM).to(NANOMETER).unwrap();
        assert_relative_eq!(q.value, 500.0, max_relative = 1e-12);
        assert_eq!(q.unit, NANOMETER);
    }

    #[test]
    fn test_conversion_rejects_other_dimension() {
        let err = Quantity::new(1.0_f64, SECOND).to(METER).unwrap_err();
        assert!(matches!(err, UnitError::Incompatible { from: "s", to: "m", .. }));
        assert!(!KELVIN.is_convertible(&JOULE));
    }

    #[test]
    fn test_values_to() {
        let v = Values::with_unit(ndarray::arr1(&[1.0_f64, 2.0]).into_dyn(), METER);
        let cm = v.to(CENTIMETER).unwrap();
        assert_eq!(cm.unit, Some(CENTIMETER));
        assert_relative_eq!(cm.array[[1]], 200.0, max_relative = 1e-12);

        // Unitless values are only convertible to dimensionless units
        let bare = Values::from(vec![1.0_f64]);
        assert!(bare.to(METER).is_err());
        assert!(bare.to(DIMENSIONLESS).is_ok());
    }

    #[test]
    fn test_axis_extent_and_reverse() {
        let ax = Axis::with_unit(vec![3.0_f64, 1.0, f64::NAN, 2.0], SECOND);
        assert_eq!(ax.extent(), Some((1.0, 3.0)));
        assert!(Axis::<f64>::new(vec![]).extent().is_none());

        let rev = Axis::with_unit(vec![1.0_f64, 2.0, 3.0], SECOND).reversed();
        assert_eq!(rev.values, vec![3.0, 2.0, 1.0]);
        assert_eq!(rev.unit, Some(SECOND));
    }

    #[test]
    fn test_dimension_display() {
        assert_eq!(Dimension::ENERGY.to_string(), "L^2 M T^-2");
        assert_eq!(Dimension::NONE.to_string(), "dimensionless");
    }
}
