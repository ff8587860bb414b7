//! Independent physical properties: the unit-tagged values that make up
//! operating conditions.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::ops::{Add, Deref, Div, Mul, Sub};

use crate::errors::{MatError, MatResult};
use crate::units::{Quantity, Unit};
use crate::value::Value;

/// The independent variables a dependent property can be evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Temperature,
    Pressure,
    MagneticField,
    Strain,
    NeutronDamage,
    NeutronFluence,
}

impl Condition {
    pub const ALL: [Condition; 6] = [
        Condition::Temperature,
        Condition::Pressure,
        Condition::MagneticField,
        Condition::Strain,
        Condition::NeutronDamage,
        Condition::NeutronFluence,
    ];

    /// Snake-case name used in documents and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Condition::Temperature => "temperature",
            Condition::Pressure => "pressure",
            Condition::MagneticField => "magnetic_field",
            Condition::Strain => "strain",
            Condition::NeutronDamage => "neutron_damage",
            Condition::NeutronFluence => "neutron_fluence",
        }
    }

    /// Unit every value of this condition is normalised to
    pub fn canonical_unit(&self) -> &'static str {
        match self {
            Condition::Temperature => "K",
            Condition::Pressure => "Pa",
            Condition::MagneticField => "T",
            Condition::Strain => "",
            Condition::NeutronDamage => "dpa",
            Condition::NeutronFluence => "1/m^2",
        }
    }

    /// Look up a condition by its snake-case name
    pub fn from_name(name: &str) -> MatResult<Condition> {
        Condition::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| {
                MatError::invalid_input("condition", name, "not a known operating condition")
            })
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A unit-tagged value for one [`Condition`].
///
/// Constructed values are always normalised to the condition's canonical unit.
/// [`PhysicalProperty::expressed_in`] produces a re-expressed copy for
/// functions that work in another unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalProperty {
    condition: Condition,
    value: Value,
    unit: Unit,
}

impl PhysicalProperty {
    /// Create from a value and optional unit, converting to the canonical unit
    pub fn new(condition: Condition, input: impl Into<Quantity>) -> MatResult<Self> {
        let canonical = Unit::parse(condition.canonical_unit())?;
        let value = input.into().to_unit(&canonical)?;
        if value.any(|x| !x.is_finite()) {
            return Err(MatError::invalid_input(
                condition.name(),
                value.to_string(),
                "Condition values must be finite",
            ));
        }
        if condition == Condition::Temperature && value.any(|t| t < 0.0) {
            return Err(MatError::invalid_input(
                "temperature",
                value.to_string(),
                "Temperature cannot be below 0 K",
            ));
        }
        Ok(PhysicalProperty {
            condition,
            value,
            unit: canonical,
        })
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// The value converted to another unit
    pub fn value_as(&self, unit: &str) -> MatResult<Value> {
        self.unit.convert(&self.value, &Unit::parse(unit)?)
    }

    /// A copy of this property whose value is expressed in `unit`
    pub fn expressed_in(&self, unit: &Unit) -> MatResult<PhysicalProperty> {
        Ok(PhysicalProperty {
            condition: self.condition,
            value: self.unit.convert(&self.value, unit)?,
            unit: unit.clone(),
        })
    }

    pub(crate) fn with_value(&self, value: Value) -> PhysicalProperty {
        PhysicalProperty {
            condition: self.condition,
            value,
            unit: self.unit.clone(),
        }
    }
}

impl PartialEq for PhysicalProperty {
    fn eq(&self, other: &Self) -> bool {
        self.condition == other.condition
            && self.unit == other.unit
            && self.value.allclose(&other.value)
    }
}

impl Hash for PhysicalProperty {
    // closeness-based equality only allows hashing the discrete parts
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.condition.hash(state);
        self.unit.dimension().hash(state);
        self.value.len().hash(state);
    }
}

impl Deref for PhysicalProperty {
    type Target = Value;
    fn deref(&self) -> &Value {
        &self.value
    }
}

impl std::fmt::Display for PhysicalProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.unit.symbol().is_empty() {
            write!(f, "{}={}", self.condition, self.value)
        } else {
            write!(f, "{}={} {}", self.condition, self.value, self.unit)
        }
    }
}

macro_rules! impl_property_op {
    ($trait:ident, $method:ident) => {
        impl $trait<f64> for &PhysicalProperty {
            type Output = Value;
            fn $method(self, rhs: f64) -> Value {
                $trait::$method(&self.value, rhs)
            }
        }

        impl $trait<&Value> for &PhysicalProperty {
            type Output = Value;
            fn $method(self, rhs: &Value) -> Value {
                $trait::$method(&self.value, rhs)
            }
        }

        impl $trait<&PhysicalProperty> for f64 {
            type Output = Value;
            fn $method(self, rhs: &PhysicalProperty) -> Value {
                $trait::$method(self, &rhs.value)
            }
        }
    };
}

impl_property_op!(Add, add);
impl_property_op!(Sub, sub);
impl_property_op!(Mul, mul);
impl_property_op!(Div, div);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalised_to_canonical_unit() {
        let t = PhysicalProperty::new(Condition::Temperature, (20.0, "degC")).unwrap();
        assert_eq!(t.unit().symbol(), "K");
        assert!(t.value().allclose(&Value::from(293.15)));

        let p = PhysicalProperty::new(Condition::Pressure, (1.0, "bar")).unwrap();
        assert!(p.value().allclose(&Value::from(1e5)));
    }

    #[test]
    fn test_negative_temperature_rejected() {
        let err = PhysicalProperty::new(Condition::Temperature, -1.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(PhysicalProperty::new(Condition::Temperature, (-300.0, "degC")).is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let err = PhysicalProperty::new(Condition::Temperature, f64::NAN).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(PhysicalProperty::new(Condition::Pressure, vec![1e5, f64::INFINITY]).is_err());
    }

    #[test]
    fn test_incompatible_unit_rejected() {
        let err = PhysicalProperty::new(Condition::MagneticField, (1.0, "K")).unwrap_err();
        assert_eq!(err.error_code(), "UNIT_CONVERSION");
    }

    #[test]
    fn test_value_as_and_expressed_in() {
        let t = PhysicalProperty::new(Condition::Temperature, 300.0).unwrap();
        assert!(t.value_as("degC").unwrap().allclose(&Value::from(26.85)));
        let c = t.expressed_in(&Unit::parse("degC").unwrap()).unwrap();
        assert_eq!(c.unit().symbol(), "degC");
    }

    #[test]
    fn test_equality_and_arithmetic() {
        let a = PhysicalProperty::new(Condition::Temperature, 300.0).unwrap();
        let b = PhysicalProperty::new(Condition::Temperature, (26.85, "degC")).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a * 2.0, Value::from(600.0));
        assert_eq!(1.0 + &a, Value::from(301.0));
        assert_ne!(a, PhysicalProperty::new(Condition::Temperature, 301.0).unwrap());
    }

    #[test]
    fn test_condition_names() {
        assert_eq!(Condition::from_name("magnetic_field").unwrap(), Condition::MagneticField);
        assert!(Condition::from_name("humidity").is_err());
        assert_eq!(serde_json::to_string(&Condition::NeutronDamage).unwrap(), "\"neutron_damage\"");
    }
}
