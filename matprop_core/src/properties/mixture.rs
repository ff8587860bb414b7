//! # Mixture Properties
//!
//! A fraction-weighted combination of the same property on several
//! constituent materials. Nothing is precomputed: every evaluation calls each
//! constituent's property with the supplied conditions and sums
//! `fraction_i * value_i` in the first constituent's unit.
//!
//! ## Array lengths
//!
//! Constituent results may be scalars or arrays. Length-1 results broadcast
//! against the rest; two different lengths above 1 cannot be mixed.

use std::sync::Arc;

use crate::conditions::OperationalConditions;
use crate::errors::{MatError, MatResult};
use crate::material::Material;
use crate::properties::dependent::DependentPhysicalProperty;
use crate::properties::PropertyKind;
use crate::units::Unit;
use crate::value::Value;

/// Weighted mixture of one property across constituents
#[derive(Clone)]
pub struct Mixture {
    kind: PropertyKind,
    components: Vec<(Arc<Material>, DependentPhysicalProperty)>,
    fractions: Vec<f64>,
    unit: Unit,
    mixed_units: bool,
}

impl Mixture {
    /// Combine `components` with matching `fractions`.
    ///
    /// Declared units that differ between constituents are tolerated; the
    /// result is reported in the first constituent's unit and a warning is
    /// logged once here.
    pub fn new(
        kind: PropertyKind,
        components: Vec<(Arc<Material>, DependentPhysicalProperty)>,
        fractions: Vec<f64>,
    ) -> MatResult<Self> {
        if components.len() != fractions.len() {
            return Err(MatError::invalid_input(
                kind.name(),
                format!("{} properties, {} fractions", components.len(), fractions.len()),
                "every mixed property needs exactly one fraction",
            ));
        }
        let Some((_, first)) = components.first() else {
            return Err(MatError::composition(format!("no constituents to mix for '{}'", kind)));
        };
        let unit = first.unit().clone();
        let first_source = first.source_unit().clone();
        let mixed_units = components.iter().any(|(_, p)| *p.source_unit() != first_source);
        if mixed_units {
            let units: Vec<&str> =
                components.iter().map(|(_, p)| p.source_unit().symbol()).collect();
            tracing::warn!(
                property = kind.name(),
                units = ?units,
                output = unit.symbol(),
                "Units of mixed properties are not the same, \
                 output will be in the first constituent's unit"
            );
        }
        Ok(Mixture {
            kind,
            components,
            fractions,
            unit,
            mixed_units,
        })
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    /// Constituent materials and their properties, in mixing order
    pub fn components(&self) -> impl Iterator<Item = (&Material, &DependentPhysicalProperty)> {
        self.components.iter().map(|(m, p)| (m.as_ref(), p))
    }

    /// True if the constituents declared different source units
    pub fn has_mixed_units(&self) -> bool {
        self.mixed_units
    }

    /// Evaluate as `sum(fraction_i * value_i)` in [`Mixture::unit`]
    pub fn evaluate(&self, conditions: &OperationalConditions) -> MatResult<Value> {
        let mut values = Vec::with_capacity(self.components.len());
        for (material, property) in &self.components {
            let v = property.evaluate(Some(material.as_ref()), conditions)?;
            values.push(property.unit().convert(&v, &self.unit)?);
        }

        let mut lengths: Vec<usize> = values.iter().map(Value::len).filter(|n| *n != 1).collect();
        lengths.sort_unstable();
        lengths.dedup();
        if lengths.len() > 1 {
            return Err(MatError::composition(format!(
                "Cannot mix independently sized arrays for '{}' (lengths {:?})",
                self.kind, lengths
            )));
        }

        let mut total = Value::Scalar(0.0);
        for (value, fraction) in values.iter().zip(&self.fractions) {
            total = total.try_zip_with(value, |acc, v| acc + fraction * v)?;
        }
        Ok(total)
    }

    /// Evaluate and convert to `unit`
    pub fn value_as(&self, conditions: &OperationalConditions, unit: &str) -> MatResult<Value> {
        let value = self.evaluate(conditions)?;
        self.unit.convert(&value, &Unit::parse(unit)?)
    }
}

impl PartialEq for Mixture {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.unit == other.unit
            && self.fractions == other.fractions
            && self.components.len() == other.components.len()
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|((m1, p1), (m2, p2))| m1.name() == m2.name() && p1 == p2)
    }
}

impl std::fmt::Debug for Mixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.components.iter().map(|(m, _)| m.name()).collect();
        f.debug_struct("Mixture")
            .field("kind", &self.kind)
            .field("materials", &names)
            .field("fractions", &self.fractions)
            .field("unit", &self.unit.symbol())
            .finish()
    }
}

impl std::fmt::Display for Mixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .components
            .iter()
            .zip(&self.fractions)
            .map(|((m, _), x)| format!("{}*{}", x, m.name()))
            .collect();
        write!(f, "{}({})", self.kind, parts.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::material;
    use crate::properties::{props, PropertySource};
    use approx::assert_relative_eq;

    fn constituent(
        name: &str,
        density: impl Into<crate::properties::PropertyInput>,
    ) -> Arc<Material> {
        Arc::new(
            material(name)
                .elements("H")
                .properties(props().density(density).build().unwrap())
                .build()
                .unwrap()
                .instantiate(),
        )
    }

    fn density_of(m: &Arc<Material>) -> DependentPhysicalProperty {
        m.properties().defined(&PropertyKind::Density).unwrap().clone()
    }

    #[test]
    fn test_weighted_sum() {
        let a = constituent("A", 1000.0);
        let b = constituent("B", 3000.0);
        let mix = Mixture::new(
            PropertyKind::Density,
            vec![(a.clone(), density_of(&a)), (b.clone(), density_of(&b))],
            vec![0.25, 0.75],
        )
        .unwrap();
        let cond = OperationalConditions::new(300.0).unwrap();
        assert_relative_eq!(mix.evaluate(&cond).unwrap().as_scalar().unwrap(), 2500.0);
        assert_relative_eq!(
            mix.value_as(&cond, "g/cm^3").unwrap().as_scalar().unwrap(),
            2.5,
            max_relative = 1e-12
        );
        assert!(!mix.has_mixed_units());
    }

    #[test]
    fn test_scalar_broadcasts_against_array() {
        let a = constituent("A", 1000.0);
        let b = constituent("B", PropertySource::function(|c| Ok(c.temperature() * 1.0)));
        let mix = Mixture::new(
            PropertyKind::Density,
            vec![(a.clone(), density_of(&a)), (b.clone(), density_of(&b))],
            vec![0.5, 0.5],
        )
        .unwrap();
        let cond = OperationalConditions::new(vec![200.0, 400.0]).unwrap();
        assert_eq!(mix.evaluate(&cond).unwrap(), Value::Array(vec![600.0, 700.0]));
    }

    #[test]
    fn test_independently_sized_arrays_rejected() {
        let a = constituent("A", vec![1.0, 2.0]);
        let b = constituent("B", vec![1.0, 2.0, 3.0]);
        let mix = Mixture::new(
            PropertyKind::Density,
            vec![(a.clone(), density_of(&a)), (b.clone(), density_of(&b))],
            vec![0.5, 0.5],
        )
        .unwrap();
        let err = mix.evaluate(&OperationalConditions::new(300.0).unwrap()).unwrap_err();
        assert_eq!(err.error_code(), "COMPOSITION_ERROR");
        assert!(err.to_string().contains("Cannot mix independently sized arrays"));
    }

    #[test]
    fn test_fraction_count_must_match() {
        let a = constituent("A", 1.0);
        let components = vec![(a.clone(), density_of(&a))];
        assert!(Mixture::new(PropertyKind::Density, components, vec![0.5, 0.5]).is_err());
    }
}
