//! # Operating Conditions
//!
//! The independent variables (temperature, pressure, field, strain, neutron
//! damage and fluence) a dependent property is evaluated against, and the
//! validity domain a property declares over them.
//!
//! ## Broadcasting
//!
//! Conditions are either all scalar or all arrays of one common length:
//! - a single array-valued entry sets the length, every scalar is repeated
//! - two arrays of different lengths (both longer than 1) are rejected
//!
//! ## Example
//!
//! ```rust
//! use matprop_core::conditions::OperationalConditions;
//!
//! let cond = OperationalConditions::new(vec![300.0, 400.0])
//!     .unwrap()
//!     .with_pressure((1.0, "bar"))
//!     .unwrap();
//! assert_eq!(cond.len(), 2);
//! assert_eq!(cond.pressure().unwrap().to_vec(), vec![1e5, 1e5]);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{MatError, MatResult};
use crate::properties::independent::{Condition, PhysicalProperty};
use crate::units::{Quantity, Unit};
use crate::value::Value;

// ============================================================================
// OperationalConditions
// ============================================================================

/// Operating conditions of a material; temperature is always present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Condition, PhysicalProperty>",
    into = "BTreeMap<Condition, PhysicalProperty>"
)]
pub struct OperationalConditions {
    entries: BTreeMap<Condition, PhysicalProperty>,
}

impl OperationalConditions {
    /// Conditions at the given temperature (bare numbers are kelvin)
    pub fn new(temperature: impl Into<Quantity>) -> MatResult<Self> {
        let mut entries = BTreeMap::new();
        entries.insert(
            Condition::Temperature,
            PhysicalProperty::new(Condition::Temperature, temperature)?,
        );
        Ok(OperationalConditions { entries })
    }

    /// IUPAC standard temperature and pressure (273.15 K, 100 kPa)
    pub fn stp() -> MatResult<Self> {
        OperationalConditions::new(273.15)?.with_pressure((100.0, "kPa"))
    }

    /// Build from `name -> quantity` pairs; `temperature` is required
    pub fn from_map<I, S, Q>(map: I) -> MatResult<Self>
    where
        I: IntoIterator<Item = (S, Q)>,
        S: AsRef<str>,
        Q: Into<Quantity>,
    {
        let mut entries = BTreeMap::new();
        for (name, quantity) in map {
            let condition = Condition::from_name(name.as_ref())?;
            entries.insert(condition, PhysicalProperty::new(condition, quantity)?);
        }
        OperationalConditions::from_entries(entries)
    }

    fn from_entries(entries: BTreeMap<Condition, PhysicalProperty>) -> MatResult<Self> {
        if !entries.contains_key(&Condition::Temperature) {
            return Err(MatError::invalid_input(
                "temperature",
                "missing",
                "Operating conditions require a temperature",
            ));
        }
        let mut cond = OperationalConditions { entries };
        cond.broadcast()?;
        Ok(cond)
    }

    /// Set (or replace) one condition
    pub fn with(mut self, condition: Condition, quantity: impl Into<Quantity>) -> MatResult<Self> {
        self.entries
            .insert(condition, PhysicalProperty::new(condition, quantity)?);
        self.broadcast()?;
        Ok(self)
    }

    pub fn with_pressure(self, pressure: impl Into<Quantity>) -> MatResult<Self> {
        self.with(Condition::Pressure, pressure)
    }

    pub fn with_magnetic_field(self, field: impl Into<Quantity>) -> MatResult<Self> {
        self.with(Condition::MagneticField, field)
    }

    pub fn with_strain(self, strain: impl Into<Quantity>) -> MatResult<Self> {
        self.with(Condition::Strain, strain)
    }

    pub fn with_neutron_damage(self, damage: impl Into<Quantity>) -> MatResult<Self> {
        self.with(Condition::NeutronDamage, damage)
    }

    pub fn with_neutron_fluence(self, fluence: impl Into<Quantity>) -> MatResult<Self> {
        self.with(Condition::NeutronFluence, fluence)
    }

    /// Make every entry the same length, or fail if two arrays disagree
    fn broadcast(&mut self) -> MatResult<()> {
        let mut length: Option<usize> = None;
        for prop in self.entries.values() {
            if let Value::Array(v) = prop.value() {
                match length {
                    None | Some(1) => length = Some(v.len()),
                    Some(n) if v.len() == n || v.len() == 1 => {}
                    Some(n) => {
                        return Err(MatError::invalid_input(
                            prop.condition().name(),
                            format!("array of length {} (expected {})", v.len(), n),
                            "All values must be of equal size or a singular value",
                        ));
                    }
                }
            }
        }
        if let Some(n) = length {
            for prop in self.entries.values_mut() {
                if prop.value().len() != n || !prop.value().is_array() {
                    *prop = prop.with_value(prop.value().broadcast_to(n)?);
                }
            }
        }
        Ok(())
    }

    /// Temperature in the unit it is currently expressed in
    pub fn temperature(&self) -> &Value {
        // temperature is inserted by every constructor
        self.entries
            .get(&Condition::Temperature)
            .map(|p| p.value())
            .unwrap_or(&ZERO)
    }

    pub fn pressure(&self) -> Option<&Value> {
        self.value(Condition::Pressure)
    }

    pub fn magnetic_field(&self) -> Option<&Value> {
        self.value(Condition::MagneticField)
    }

    pub fn strain(&self) -> Option<&Value> {
        self.value(Condition::Strain)
    }

    pub fn neutron_damage(&self) -> Option<&Value> {
        self.value(Condition::NeutronDamage)
    }

    pub fn neutron_fluence(&self) -> Option<&Value> {
        self.value(Condition::NeutronFluence)
    }

    /// Full unit-tagged entry for a condition
    pub fn get(&self, condition: Condition) -> Option<&PhysicalProperty> {
        self.entries.get(&condition)
    }

    /// Value of a condition, if present
    pub fn value(&self, condition: Condition) -> Option<&Value> {
        self.entries.get(&condition).map(|p| p.value())
    }

    /// Value of a condition a property function cannot do without
    pub fn require(&self, condition: Condition) -> MatResult<&Value> {
        self.value(condition).ok_or_else(|| {
            MatError::invalid_input(
                condition.name(),
                "missing",
                "Operating condition required for this property",
            )
        })
    }

    /// Number of evaluated states (1 when all conditions are scalar)
    pub fn len(&self) -> usize {
        self.temperature().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// True when conditions are array-valued
    pub fn is_array(&self) -> bool {
        self.temperature().is_array()
    }

    /// Iterate over the present conditions
    pub fn iter(&self) -> impl Iterator<Item = &PhysicalProperty> {
        self.entries.values()
    }

    /// Copy with every configured condition re-expressed in the configured unit
    pub fn expressed_in(&self, config: &ConditionConfig) -> MatResult<OperationalConditions> {
        let mut entries = BTreeMap::new();
        for (condition, prop) in &self.entries {
            let converted = match config.bounds.get(condition) {
                Some(b) if !b.unit.is_equivalent(prop.unit()) => {
                    tracing::debug!(
                        condition = condition.name(),
                        from = prop.unit().symbol(),
                        to = b.unit.symbol(),
                        "Converting operating condition for property domain"
                    );
                    prop.expressed_in(&b.unit)?
                }
                _ => prop.clone(),
            };
            entries.insert(*condition, converted);
        }
        Ok(OperationalConditions { entries })
    }
}

static ZERO: Value = Value::Scalar(0.0);

impl TryFrom<BTreeMap<Condition, PhysicalProperty>> for OperationalConditions {
    type Error = MatError;
    fn try_from(entries: BTreeMap<Condition, PhysicalProperty>) -> MatResult<Self> {
        // revalidate through the canonical constructor
        let mut checked = BTreeMap::new();
        for (condition, prop) in entries {
            let q = Quantity::new(prop.value().clone(), prop.unit().symbol());
            checked.insert(condition, PhysicalProperty::new(condition, q)?);
        }
        OperationalConditions::from_entries(checked)
    }
}

impl From<OperationalConditions> for BTreeMap<Condition, PhysicalProperty> {
    fn from(c: OperationalConditions) -> Self {
        c.entries
    }
}

impl std::fmt::Display for OperationalConditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.entries.values().map(|p| p.to_string()).collect();
        write!(f, "OperationalConditions({})", parts.join(", "))
    }
}

// ============================================================================
// Validity domain
// ============================================================================

/// Validity bounds of one condition, in a declared unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub unit: Unit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

/// Shorthand input for [`Bounds`]
#[derive(Debug, Clone, Default)]
pub struct BoundsSpec {
    pub unit: Option<String>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl From<(f64, f64)> for BoundsSpec {
    fn from((lower, upper): (f64, f64)) -> Self {
        BoundsSpec {
            unit: None,
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

impl From<(&str, f64)> for BoundsSpec {
    fn from((unit, lower): (&str, f64)) -> Self {
        BoundsSpec {
            unit: Some(unit.to_string()),
            lower: Some(lower),
            upper: None,
        }
    }
}

impl From<(&str, f64, f64)> for BoundsSpec {
    fn from((unit, lower, upper): (&str, f64, f64)) -> Self {
        BoundsSpec {
            unit: Some(unit.to_string()),
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

impl From<&str> for BoundsSpec {
    fn from(unit: &str) -> Self {
        BoundsSpec {
            unit: Some(unit.to_string()),
            ..Default::default()
        }
    }
}

/// Validity domain of a dependent property.
///
/// Conditions without an entry are unconstrained and stay in their
/// canonical unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionConfig {
    bounds: BTreeMap<Condition, Bounds>,
}

impl ConditionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add bounds for a condition. The unit defaults to the canonical one
    /// and must match the condition's dimensionality.
    pub fn with(mut self, condition: Condition, spec: impl Into<BoundsSpec>) -> MatResult<Self> {
        let spec = spec.into();
        let canonical = Unit::parse(condition.canonical_unit())?;
        let unit = match spec.unit {
            Some(u) => Unit::parse(&u)?,
            None => canonical.clone(),
        };
        if !unit.is_compatible(&canonical) {
            return Err(MatError::invalid_input(
                condition.name(),
                unit.symbol(),
                format!("unit is not a valid unit for {}", condition.name()),
            ));
        }
        if let (Some(lo), Some(hi)) = (spec.lower, spec.upper) {
            if lo > hi {
                return Err(MatError::invalid_input(
                    condition.name(),
                    format!("({}, {})", lo, hi),
                    "lower bound exceeds upper bound",
                ));
            }
        }
        self.bounds.insert(
            condition,
            Bounds {
                unit,
                lower: spec.lower,
                upper: spec.upper,
            },
        );
        Ok(self)
    }

    /// Temperature bounds in kelvin
    pub fn temperature(self, lower: f64, upper: f64) -> MatResult<Self> {
        self.with(Condition::Temperature, (lower, upper))
    }

    pub fn get(&self, condition: Condition) -> Option<&Bounds> {
        self.bounds.get(&condition)
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Condition, &Bounds)> {
        self.bounds.iter()
    }

    /// Check conditions against every configured bound.
    ///
    /// Any violating entry of an array-valued condition fails the check.
    pub fn check(&self, conditions: &OperationalConditions) -> MatResult<()> {
        for (condition, bounds) in &self.bounds {
            let Some(prop) = conditions.get(*condition) else {
                continue;
            };
            let value = prop.unit().convert(prop.value(), &bounds.unit)?;
            if let Some(lower) = bounds.lower {
                if let Some(v) = value.iter().find(|v| *v < lower) {
                    let unit = &bounds.unit;
                    return Err(out_of_range(*condition, v, "lower than lower", lower, unit));
                }
            }
            if let Some(upper) = bounds.upper {
                if let Some(v) = value.iter().find(|v| *v > upper) {
                    let unit = &bounds.unit;
                    return Err(out_of_range(*condition, v, "higher than upper", upper, unit));
                }
            }
        }
        Ok(())
    }
}

fn out_of_range(
    condition: Condition,
    value: f64,
    bound: &str,
    limit: f64,
    unit: &Unit,
) -> MatError {
    MatError::OutOfRange {
        condition: condition.name().to_string(),
        value,
        bound: bound.to_string(),
        limit,
        unit: unit.symbol().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conditions_stay_scalar() {
        let cond = OperationalConditions::new(300.0).unwrap().with_pressure(1e5).unwrap();
        assert_eq!(cond.len(), 1);
        assert!(!cond.is_array());
        assert_eq!(cond.pressure(), Some(&Value::Scalar(1e5)));
    }

    #[test]
    fn test_scalars_broadcast_to_array_length() {
        let cond = OperationalConditions::new(300.0)
            .unwrap()
            .with_magnetic_field(vec![1.0, 2.0, 3.0])
            .unwrap();
        assert_eq!(cond.temperature(), &Value::Array(vec![300.0; 3]));
        assert_eq!(cond.len(), 3);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let err = OperationalConditions::new(vec![300.0, 400.0])
            .unwrap()
            .with_pressure(vec![1.0, 2.0, 3.0])
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.to_string().contains("equal size"));
    }

    #[test]
    fn test_from_map() {
        let cond = OperationalConditions::from_map([
            ("temperature", Quantity::new(20.0, "degC")),
            ("strain", Quantity::from(0.01)),
        ])
        .unwrap();
        assert!(cond.temperature().allclose(&Value::from(293.15)));
        assert_eq!(cond.strain(), Some(&Value::Scalar(0.01)));

        let missing = OperationalConditions::from_map([("pressure", 1e5)]);
        assert!(missing.is_err());
        assert!(OperationalConditions::from_map([("altitude", 1.0)]).is_err());
    }

    #[test]
    fn test_stp() {
        let stp = OperationalConditions::stp().unwrap();
        assert_eq!(stp.temperature(), &Value::Scalar(273.15));
        assert_eq!(stp.pressure(), Some(&Value::Scalar(1e5)));
    }

    #[test]
    fn test_non_finite_conditions_rejected() {
        let err = OperationalConditions::new(f64::NAN).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        let err = OperationalConditions::new(300.0)
            .unwrap()
            .with_pressure(f64::INFINITY)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_domain_check() {
        let config = ConditionConfig::new().temperature(300.0, 1600.0).unwrap();
        let at = |t: f64| OperationalConditions::new(t).unwrap();

        assert!(config.check(&at(1000.0)).is_ok());
        match config.check(&at(250.0)).unwrap_err() {
            MatError::OutOfRange { condition, value, bound, limit, .. } => {
                assert_eq!(condition, "temperature");
                assert_eq!(value, 250.0);
                assert_eq!(bound, "lower than lower");
                assert_eq!(limit, 300.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            config.check(&at(1700.0)),
            Err(MatError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_any_array_element_out_of_range_fails() {
        let config = ConditionConfig::new().temperature(300.0, 1600.0).unwrap();
        let cond = OperationalConditions::new(vec![400.0, 1700.0]).unwrap();
        assert!(config.check(&cond).is_err());
    }

    #[test]
    fn test_domain_in_other_unit() {
        let config = ConditionConfig::new()
            .with(Condition::Temperature, ("degC", 0.0, 100.0))
            .unwrap();
        assert!(config.check(&OperationalConditions::new(300.0).unwrap()).is_ok());
        assert!(config.check(&OperationalConditions::new(400.0).unwrap()).is_err());

        let expressed = OperationalConditions::new(300.0).unwrap().expressed_in(&config).unwrap();
        assert!(expressed.temperature().allclose(&Value::from(26.85)));
    }

    #[test]
    fn test_domain_unit_must_match_condition() {
        assert!(ConditionConfig::new().with(Condition::Pressure, ("K", 0.0)).is_err());
        assert!(ConditionConfig::new().temperature(500.0, 300.0).is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let cond = OperationalConditions::new(vec![289.0, 459.0])
            .unwrap()
            .with_pressure(1e5)
            .unwrap();
        let json = serde_json::to_string(&cond).unwrap();
        let back: OperationalConditions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cond);

        let config = ConditionConfig::new().temperature(300.0, 1600.0).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: ConditionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
