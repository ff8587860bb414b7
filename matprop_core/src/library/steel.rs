//! Stainless steels.
//!
//! SS316L correlations are from Choong (1975), valid from 300 K up to
//! 1600 K (1170 K for specific heat). SS316LN density is tabulated in
//! degrees Celsius.

use crate::conditions::ConditionConfig;
use crate::elements::FractionType;
use crate::errors::MatResult;
use crate::library::references;
use crate::material::{material, MaterialType};
use crate::properties::{props, Condition, DependentPhysicalProperty, PropertyKind, PropertySource};

/// SS316LN density, (degC, kg/m^3)
const SS316LN_DENSITY: [(f64, f64); 17] = [
    (20.0, 7930.0),
    (50.0, 7919.0),
    (100.0, 7899.0),
    (150.0, 7879.0),
    (200.0, 7858.0),
    (250.0, 7837.0),
    (300.0, 7815.0),
    (350.0, 7793.0),
    (400.0, 7770.0),
    (450.0, 7747.0),
    (500.0, 7724.0),
    (550.0, 7701.0),
    (600.0, 7677.0),
    (650.0, 7654.0),
    (700.0, 7630.0),
    (750.0, 7606.0),
    (800.0, 7582.0),
];

fn choong(
    kind: PropertyKind,
    source: PropertySource,
    unit: &str,
    upper: f64,
    equation: &str,
) -> MatResult<DependentPhysicalProperty> {
    Ok(DependentPhysicalProperty::with_unit(kind, source, unit)?
        .with_domain(ConditionConfig::new().temperature(300.0, upper)?)
        .with_reference(references::choong_1975().annotate(equation)))
}

/// Stainless steel 316L
pub fn ss316l() -> MatResult<MaterialType> {
    let density = choong(
        PropertyKind::Density,
        PropertySource::function(|c| {
            let t = c.temperature();
            Ok(8084.2 - t * 4.2086e-1 - t.powi(2) * 3.8942e-5)
        }),
        "kg/m^3",
        1600.0,
        "Equation 18",
    )?;
    // published in calories, converted with 4.184 J/cal
    let specific_heat = choong(
        PropertyKind::SpecificHeatCapacity,
        PropertySource::function(|c| Ok((c.temperature() * 3.174e-5 + 0.1097) * 4.184)),
        "J/(g*K)",
        1170.0,
        "Equation 7",
    )?;
    let expansion = choong(
        PropertyKind::CoefficientThermalExpansion,
        PropertySource::function(|c| {
            let t = c.temperature();
            Ok(t * 2.3977e-9 + t.powi(2) * 3.2692e-13 + 1.7887e-5)
        }),
        "1/K",
        1600.0,
        "Equation 24",
    )?;
    let conductivity = choong(
        PropertyKind::ThermalConductivity,
        PropertySource::function(|c| Ok(c.temperature() * 1.571e-2 + 9.248)),
        "W/(m*K)",
        1600.0,
        "Equation 30",
    )?;

    material("SS316L")
        .elements((
            [("Fe", 0.70345), ("C", 0.0003), ("Cr", 0.17), ("Ni", 0.105), ("Mo", 0.02125)],
            FractionType::Mass,
        ))
        .properties(
            props()
                .density(density)
                .specific_heat_capacity(specific_heat)
                .coefficient_thermal_expansion(expansion)
                .thermal_conductivity(conductivity)
                .build()?,
        )
        .reference(references::choong_1975())
        .build()
}

/// SS316LN density over 20-800 degC
pub fn ss316ln_density() -> MatResult<DependentPhysicalProperty> {
    Ok(DependentPhysicalProperty::new(
        PropertyKind::Density,
        PropertySource::table(Condition::Temperature, SS316LN_DENSITY.to_vec())?,
    )?
    .with_domain(ConditionConfig::new().with(Condition::Temperature, ("degC", 20.0, 800.0))?)
    .with_reference(references::iter_ss316_density()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::OperationalConditions;
    use approx::assert_relative_eq;

    fn cond(t: f64) -> OperationalConditions {
        OperationalConditions::new(t).unwrap()
    }

    #[test]
    fn test_ss316l_density() {
        let steel = ss316l().unwrap().instantiate();
        assert_relative_eq!(
            steel.density(&cond(300.0)).unwrap().as_scalar().unwrap(),
            7954.43722,
            max_relative = 1e-9
        );
        assert_eq!(steel.density(&cond(250.0)).unwrap_err().error_code(), "OUT_OF_RANGE");
    }

    #[test]
    fn test_ss316l_specific_heat_in_canonical_unit() {
        let steel = ss316l().unwrap().instantiate();
        // 4.184 * (0.1097 + 3.174e-5 * 500) J/(g*K) -> J/(kg*K)
        assert_relative_eq!(
            steel.specific_heat_capacity(&cond(500.0)).unwrap().as_scalar().unwrap(),
            4.184 * (0.1097 + 3.174e-5 * 500.0) * 1000.0,
            max_relative = 1e-9
        );
        assert_eq!(
            steel.specific_heat_capacity(&cond(1200.0)).unwrap_err().error_code(),
            "OUT_OF_RANGE"
        );
        // density is still valid there
        assert!(steel.density(&cond(1200.0)).is_ok());
    }

    #[test]
    fn test_ss316l_array_conditions() {
        let steel = ss316l().unwrap().instantiate();
        let k = steel
            .thermal_conductivity(&OperationalConditions::new(vec![300.0, 1000.0]).unwrap())
            .unwrap();
        assert_relative_eq!(k.get(0).unwrap(), 9.248 + 1.571e-2 * 300.0, max_relative = 1e-12);
        assert_relative_eq!(k.get(1).unwrap(), 9.248 + 1.571e-2 * 1000.0, max_relative = 1e-12);

        // any out-of-range element rejects the whole call
        assert!(steel
            .thermal_conductivity(&OperationalConditions::new(vec![300.0, 2000.0]).unwrap())
            .is_err());
    }

    #[test]
    fn test_ss316l_composition_and_reference() {
        let steel = ss316l().unwrap().instantiate();
        assert_relative_eq!(steel.elements().mass_fractions()["Cr"], 0.17, max_relative = 1e-9);
        let refs = steel.reference().unwrap();
        assert!(refs.get("choong1975").is_some());
        let k = steel.properties().defined(&PropertyKind::ThermalConductivity).unwrap();
        let cited = k.reference().unwrap().get("choong1975").unwrap();
        assert!(cited.annote.as_deref().unwrap().contains("Equation 30"));
    }

    #[test]
    fn test_ss316ln_density_in_celsius() {
        let rho = ss316ln_density().unwrap();
        let at = |t: f64| rho.evaluate(None, &cond(t)).unwrap().as_scalar().unwrap();
        assert_relative_eq!(at(300.0), 7930.0 - 11.0 * 6.85 / 30.0, max_relative = 1e-9);
        // 75 degC, halfway between the 50 and 100 degC entries
        assert_relative_eq!(at(348.15), 7909.0, max_relative = 1e-9);
        assert!(rho.evaluate(None, &cond(273.15)).is_err());
    }
}
