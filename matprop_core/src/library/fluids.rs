//! Fluid materials: fusion plasmas, water and void.

use crate::conditions::ConditionConfig;
use crate::converters::neutronics::N_AVOGADRO;
use crate::converters::SerpentConverter;
use crate::elements::{Elements, FractionType};
use crate::errors::MatResult;
use crate::library::references;
use crate::material::{material, MaterialType};
use crate::properties::{props, Condition, DependentPhysicalProperty, PropertyKind, PropertySource};

/// Saturated liquid water density, (K, kg/m^3)
const WATER_DENSITY: [(f64, f64); 24] = [
    (273.16, 999.79),
    (283.15, 999.65),
    (293.15, 998.16),
    (298.15, 997.00),
    (303.15, 995.61),
    (313.15, 992.18),
    (323.15, 987.96),
    (333.15, 983.16),
    (343.15, 977.73),
    (353.15, 971.77),
    (363.15, 965.30),
    (373.15, 958.35),
    (393.15, 943.11),
    (413.15, 926.13),
    (433.15, 907.45),
    (453.15, 887.00),
    (473.15, 864.66),
    (493.15, 840.22),
    (513.15, 813.37),
    (533.15, 783.63),
    (553.15, 750.28),
    (573.15, 712.14),
    (593.15, 667.09),
    (600.00, 649.41),
];

fn plasma(name: &str, elements: Elements) -> MatResult<MaterialType> {
    material(name)
        .elements(elements)
        .properties(
            props()
                .density((1e-6, "g/cm^3"))
                .youngs_modulus(0.0)
                .poissons_ratio(0.0)
                .build()?,
        )
        .converter(SerpentConverter::new())
        .build()
}

/// Pure deuterium plasma
pub fn dd_plasma() -> MatResult<MaterialType> {
    plasma("DDPlasma", Elements::from_fractions([("H2", 1.0)], FractionType::Atomic)?)
}

/// 50/50 deuterium-tritium plasma
pub fn dt_plasma() -> MatResult<MaterialType> {
    plasma(
        "DTPlasma",
        Elements::from_fractions([("H2", 0.5), ("H3", 0.5)], FractionType::Atomic)?,
    )
}

/// Saturated liquid water density over 273.16-600 K
pub fn water_density() -> MatResult<DependentPhysicalProperty> {
    Ok(DependentPhysicalProperty::new(
        PropertyKind::Density,
        PropertySource::table(Condition::Temperature, WATER_DENSITY.to_vec())?,
    )?
    .with_domain(ConditionConfig::new().temperature(273.16, 600.0)?)
    .with_reference(references::iapws_if97()))
}

/// Liquid water.
///
/// Density is tabulated from the triple point (273.16 K), so STP at
/// 273.15 K is out of range. Volume mixtures containing water need
/// `volume_conditions` inside the table.
pub fn water() -> MatResult<MaterialType> {
    material("H2O")
        .elements("H2O")
        .properties(
            props()
                .density(water_density()?)
                .youngs_modulus(0.0)
                .poissons_ratio(0.0)
                .build()?,
        )
        .build()
}

/// Near-empty space: one hydrogen atom per cubic centimetre
pub fn void() -> MatResult<MaterialType> {
    let elements = Elements::from_formula("H")?;
    let atoms_per_cm3 = 1.0;
    let rho = atoms_per_cm3 * elements.mean_atomic_mass() / N_AVOGADRO;
    material("Void")
        .elements(elements)
        .properties(props().density((rho, "g/cm^3")).build()?)
        .converter(SerpentConverter::new())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::OperationalConditions;
    use crate::material::mixture;
    use crate::value::Value;
    use approx::assert_relative_eq;

    #[test]
    fn test_plasma_density() {
        let dt = dt_plasma().unwrap().instantiate();
        let cond = OperationalConditions::new(1e8).unwrap();
        let rho = dt.density(&cond).unwrap().as_scalar().unwrap();
        assert_relative_eq!(rho, 1e-3, max_relative = 1e-12);
        assert_relative_eq!(dt.elements().fraction("H3"), 0.5);
    }

    #[test]
    fn test_water_table() {
        let w = water().unwrap().instantiate();
        let at = |t: f64| OperationalConditions::new(t).and_then(|c| w.density(&c));
        assert_relative_eq!(at(298.15).unwrap().as_scalar().unwrap(), 997.0, max_relative = 1e-12);
        // halfway between 293.15 K and 298.15 K
        assert_relative_eq!(at(295.65).unwrap().as_scalar().unwrap(), 997.58, max_relative = 1e-9);
        assert_eq!(at(650.0).unwrap_err().error_code(), "OUT_OF_RANGE");
        assert_eq!(at(273.15).unwrap_err().error_code(), "OUT_OF_RANGE");
        // never reaches the table lookup
        assert_eq!(at(f64::NAN).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_void_density() {
        let v = void().unwrap().instantiate();
        let rho = v
            .property(PropertyKind::Density)
            .unwrap()
            .value_as(&OperationalConditions::new(300.0).unwrap(), "g/cm^3")
            .unwrap();
        assert_relative_eq!(rho.as_scalar().unwrap(), 1.008 / N_AVOGADRO, max_relative = 1e-3);
    }

    #[test]
    fn test_plasma_water_mixture() {
        let dd = dd_plasma().unwrap().instantiate();
        let dt = dt_plasma().unwrap().instantiate();
        let h2o = water().unwrap().instantiate();
        let mix = mixture(
            "PlasmaWater",
            [(dd.clone(), 0.4), (dt.clone(), 0.4), (h2o.clone(), 0.2)],
            FractionType::Atomic,
        )
        .build()
        .unwrap();

        let cond = OperationalConditions::new(vec![289.0, 459.0]).unwrap();
        let rho = mix.density(&cond).unwrap();
        let dd_part = &dd.density(&cond).unwrap() * 0.4;
        let dt_part = &dt.density(&cond).unwrap() * 0.4;
        let h2o_part = &h2o.density(&cond).unwrap() * 0.2;
        let expected = &(&dd_part + &dt_part) + &h2o_part;
        assert_eq!(rho.len(), 2);
        assert!(rho.allclose(&expected));

        assert_eq!(mix.youngs_modulus(&cond).unwrap(), Value::Scalar(0.0));
        let el = mix.elements();
        assert_relative_eq!(el.fraction("H2"), 0.6, max_relative = 1e-9);
        assert_relative_eq!(el.fraction("H3"), 0.2, max_relative = 1e-9);
        assert_relative_eq!(el.fraction("O"), 0.2 / 3.0, max_relative = 1e-9);
    }

    #[test]
    fn test_plasma_water_volume_mixture_needs_liquid_conditions() {
        let make = || {
            [
                (dd_plasma().unwrap().instantiate(), 0.5),
                (water().unwrap().instantiate(), 0.5),
            ]
        };
        // STP lies below the water table
        let err = mixture("Wet", make(), FractionType::Volume).build().unwrap_err();
        assert_eq!(err.error_code(), "COMPOSITION_ERROR");

        let warm = OperationalConditions::new(300.0).unwrap();
        let mix = mixture("Wet", make(), FractionType::Volume)
            .volume_conditions(warm)
            .build()
            .unwrap();
        // plasma mass is negligible next to the water
        assert!(mix.elements().fraction("H2") < 1e-5);
    }
}
