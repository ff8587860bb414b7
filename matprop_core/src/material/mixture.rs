//! # Mixtures
//!
//! A mixture is a [`Material`] built from weighted constituents. Each property
//! slot present on any constituent becomes one of:
//!
//! - the caller's override, if one was given
//! - a [`Mixture`] property evaluated lazily from the constituents
//! - an [`UndefinedProperty`] naming the constituent that lacked it
//!
//! Construction never evaluates properties except densities for volume-basis
//! composition, so a missing property only fails when it is called.
//!
//! ## Composition
//!
//! | Basis  | Combined element fractions                                  |
//! |--------|-------------------------------------------------------------|
//! | atomic | `sum_i f_i * x_i(el)`                                       |
//! | mass   | `sum_i f_i * w_i(el)`, converted to atomic                  |
//! | volume | mass weights `f_i * rho_i` at `volume_conditions`, then mass |
//!
//! ## Example
//!
//! ```rust
//! use matprop_core::conditions::OperationalConditions;
//! use matprop_core::elements::FractionType;
//! use matprop_core::material::{material, mixture};
//! use matprop_core::properties::props;
//!
//! let make = |name: &str, formula: &str, rho: f64| {
//!     material(name)
//!         .elements(formula)
//!         .properties(props().density((rho, "g/cm^3")).build().unwrap())
//!         .build()
//!         .unwrap()
//!         .instantiate()
//! };
//! let parts = [(make("A", "H2O", 1.0), 0.5), (make("B", "C", 2.0), 0.5)];
//! let mix = mixture("Blend", parts, FractionType::Mass).build().unwrap();
//!
//! let cond = OperationalConditions::new(300.0).unwrap();
//! assert!((mix.density(&cond).unwrap().as_scalar().unwrap() - 1500.0).abs() < 1e-9);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::conditions::OperationalConditions;
use crate::converters::Converters;
use crate::elements::{Elements, FractionType};
use crate::errors::{MatError, MatResult};
use crate::properties::{
    Mixture, Properties, Property, PropertyInput, PropertyKind, Superconductor, UndefinedProperty,
};
use crate::references::References;

use super::Material;

/// Constituents of a mixture and how they were combined
#[derive(Debug, Clone)]
pub struct MixtureComposition {
    pub(crate) fractions: Vec<(Arc<Material>, f64)>,
    fraction_type: FractionType,
    volume_conditions: Option<OperationalConditions>,
    overrides: Vec<PropertyKind>,
}

impl MixtureComposition {
    /// Constituents with their fractions as given (after normalisation for
    /// atomic and mass bases)
    pub fn fractions(&self) -> &[(Arc<Material>, f64)] {
        &self.fractions
    }

    pub fn fraction_type(&self) -> FractionType {
        self.fraction_type
    }

    pub fn volume_conditions(&self) -> Option<&OperationalConditions> {
        self.volume_conditions.as_ref()
    }

    /// Slots the caller set explicitly instead of mixing
    pub fn overrides(&self) -> &[PropertyKind] {
        &self.overrides
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Start a mixture of `(material, fraction)` pairs
pub fn mixture<I, M>(
    name: impl Into<String>,
    materials: I,
    fraction_type: FractionType,
) -> MixtureBuilder
where
    I: IntoIterator<Item = (M, f64)>,
    M: Into<Arc<Material>>,
{
    MixtureBuilder {
        name: name.into(),
        materials: materials.into_iter().map(|(m, f)| (m.into(), f)).collect(),
        fraction_type,
        converters: Converters::new(),
        reference: None,
        volume_conditions: None,
        overrides: Vec::new(),
        superconductor: None,
    }
}

/// Collects the parts of a mixture
#[derive(Debug)]
pub struct MixtureBuilder {
    name: String,
    materials: Vec<(Arc<Material>, f64)>,
    fraction_type: FractionType,
    converters: Converters,
    reference: Option<References>,
    volume_conditions: Option<OperationalConditions>,
    overrides: Vec<(PropertyKind, PropertyInput)>,
    superconductor: Option<Superconductor>,
}

impl MixtureBuilder {
    pub fn converters(mut self, converters: Converters) -> Self {
        self.converters = converters;
        self
    }

    pub fn reference(mut self, reference: impl Into<References>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Conditions at which constituent densities are taken for volume mixing.
    /// Defaults to STP.
    pub fn volume_conditions(mut self, conditions: OperationalConditions) -> Self {
        self.volume_conditions = Some(conditions);
        self
    }

    /// Use `input` for `kind` instead of mixing the constituents
    pub fn override_property(
        mut self,
        kind: impl Into<PropertyKind>,
        input: impl Into<PropertyInput>,
    ) -> Self {
        let kind = kind.into();
        self.overrides.retain(|(k, _)| *k != kind);
        self.overrides.push((kind, input.into()));
        self
    }

    pub fn superconducting_parameterisation(mut self, sc: impl Into<Superconductor>) -> Self {
        self.superconductor = Some(sc.into());
        self
    }

    pub fn build(self) -> MatResult<Material> {
        let MixtureBuilder {
            name,
            materials,
            fraction_type,
            converters,
            reference,
            volume_conditions,
            overrides,
            superconductor,
        } = self;

        validate_constituents(&name, &materials)?;
        let materials = normalise_fractions(&name, materials, fraction_type);

        let override_kinds: Vec<PropertyKind> = overrides.iter().map(|(k, _)| k.clone()).collect();
        let mut properties = mix_properties(&materials, overrides)?;
        properties.set_superconductor(match superconductor {
            Some(sc) => Some(sc),
            None if materials.iter().any(|(m, _)| m.properties().superconductor().is_some()) => {
                Some(Superconductor::Undefined)
            }
            None => None,
        });

        let elements = match fraction_type {
            FractionType::Atomic => mix_atomic(&materials)?,
            FractionType::Mass => mix_mass(&materials)?,
            FractionType::Volume => {
                let at = match &volume_conditions {
                    Some(c) => c.clone(),
                    None => OperationalConditions::stp()?,
                };
                mix_volume(&materials, &at)?
            }
        };

        tracing::debug!(
            mixture = %name,
            constituents = materials.len(),
            fraction_type = %fraction_type,
            "Built mixture"
        );

        let composition = MixtureComposition {
            fractions: materials,
            fraction_type,
            volume_conditions,
            overrides: override_kinds,
        };
        Ok(Material::from_parts(
            name,
            elements,
            properties,
            converters,
            reference,
            Some(composition),
        ))
    }
}

// ============================================================================
// Fractions
// ============================================================================

fn validate_constituents(name: &str, materials: &[(Arc<Material>, f64)]) -> MatResult<()> {
    if materials.is_empty() {
        return Err(MatError::invalid_input(name, "[]", "a mixture needs at least one constituent"));
    }
    for (material, fraction) in materials {
        if *fraction < 0.0 || !fraction.is_finite() {
            return Err(MatError::invalid_input(
                material.name(),
                fraction.to_string(),
                "mixture fractions must be non-negative",
            ));
        }
        if material.is_mixture() {
            return Err(MatError::not_implemented(format!(
                "mixing '{}', which is itself a mixture",
                material.name()
            )));
        }
    }
    Ok(())
}

fn normalise_fractions(
    name: &str,
    materials: Vec<(Arc<Material>, f64)>,
    fraction_type: FractionType,
) -> Vec<(Arc<Material>, f64)> {
    let total: f64 = materials.iter().map(|(_, f)| f).sum();
    if (total - 1.0).abs() <= 1e-8 + 1e-5 {
        return materials;
    }
    if fraction_type == FractionType::Volume && total < 1.0 {
        tracing::info!(mixture = %name, "Void fraction of {:.2}", 1.0 - total);
        return materials;
    }
    tracing::warn!(mixture = %name, total, "Mixture fractions do not sum to 1, normalising");
    if total <= 0.0 {
        return materials;
    }
    materials.into_iter().map(|(m, f)| (m, f / total)).collect()
}

// ============================================================================
// Properties
// ============================================================================

fn mix_properties(
    materials: &[(Arc<Material>, f64)],
    overrides: Vec<(PropertyKind, PropertyInput)>,
) -> MatResult<Properties> {
    let mut kinds: BTreeSet<PropertyKind> = materials
        .iter()
        .flat_map(|(m, _)| m.properties().kinds().cloned())
        .collect();
    let mut overridden = BTreeMap::new();
    for (kind, input) in overrides {
        kinds.insert(kind.clone());
        overridden.insert(kind, input);
    }

    let mut properties = Properties::new();
    for kind in kinds {
        let property = match overridden.remove(&kind) {
            Some(input) => input.into_property(&kind)?,
            None => mix_slot(&kind, materials)?,
        };
        properties.insert(kind, property);
    }
    Ok(properties)
}

fn mix_slot(kind: &PropertyKind, materials: &[(Arc<Material>, f64)]) -> MatResult<Property> {
    let mut components = Vec::with_capacity(materials.len());
    let mut fractions = Vec::with_capacity(materials.len());
    for (material, fraction) in materials {
        let Some(dpp) = material.properties().defined(kind) else {
            tracing::debug!(
                property = kind.name(),
                constituent = material.name(),
                "Mixed property is undefined"
            );
            return Ok(Property::Undefined(UndefinedProperty::with_message(format!(
                "{} is undefined on {}",
                kind,
                material.name()
            ))));
        };
        components.push((material.clone(), dpp.clone()));
        fractions.push(*fraction);
    }
    Ok(Property::Mixture(Mixture::new(kind.clone(), components, fractions)?))
}

// ============================================================================
// Elements
// ============================================================================

fn combine(
    materials: &[(Arc<Material>, f64)],
    weights: &[f64],
    view: impl Fn(&Elements) -> BTreeMap<String, f64>,
) -> BTreeMap<String, f64> {
    let mut combined: BTreeMap<String, f64> = BTreeMap::new();
    for ((material, _), weight) in materials.iter().zip(weights) {
        for (el, x) in view(material.elements()) {
            *combined.entry(el).or_insert(0.0) += weight * x;
        }
    }
    combined.retain(|_, x| *x > 0.0);
    combined
}

fn mix_atomic(materials: &[(Arc<Material>, f64)]) -> MatResult<Elements> {
    let weights: Vec<f64> = materials.iter().map(|(_, f)| *f).collect();
    let combined = combine(materials, &weights, Elements::atomic_fractions);
    if combined.is_empty() {
        return Ok(Elements::default());
    }
    Elements::from_atomic_map(combined)
}

fn mix_mass(materials: &[(Arc<Material>, f64)]) -> MatResult<Elements> {
    let weights: Vec<f64> = materials.iter().map(|(_, f)| *f).collect();
    mass_weighted(materials, &weights)
}

fn mass_weighted(materials: &[(Arc<Material>, f64)], weights: &[f64]) -> MatResult<Elements> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Ok(Elements::default());
    }
    let weights: Vec<f64> = weights.iter().map(|w| w / total).collect();
    let combined = combine(materials, &weights, Elements::mass_fractions);
    if combined.is_empty() {
        return Ok(Elements::default());
    }
    Elements::from_fractions(combined, FractionType::Mass)
}

fn mix_volume(
    materials: &[(Arc<Material>, f64)],
    at: &OperationalConditions,
) -> MatResult<Elements> {
    let mut weights = Vec::with_capacity(materials.len());
    for (material, fraction) in materials {
        let rho = constituent_density(material, at)?;
        weights.push(fraction * rho);
    }
    mass_weighted(materials, &weights)
}

fn constituent_density(material: &Material, at: &OperationalConditions) -> MatResult<f64> {
    let missing = |detail: String| {
        MatError::composition(format!(
            "density required for volume mixing: constituent '{}' {}",
            material.name(),
            detail
        ))
    };
    let density = material
        .density(at)
        .map_err(|e| missing(format!("has no usable density ({})", e)))?;
    density
        .as_scalar()
        .ok_or_else(|| missing(format!("has an array density at {}", at)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::material;
    use crate::properties::superconduction::SuperconductingParameterisation;
    use crate::properties::{props, Listing, PropertySource};
    use crate::value::Value;
    use approx::assert_relative_eq;

    fn simple(name: &str, formula: &str, density: impl Into<PropertyInput>) -> Material {
        material(name)
            .elements(formula)
            .properties(props().density(density).build().unwrap())
            .build()
            .unwrap()
            .instantiate()
    }

    fn cond(t: f64) -> OperationalConditions {
        OperationalConditions::new(t).unwrap()
    }

    #[test]
    fn test_atomic_composition() {
        let water = simple("Water", "H2O", (1.0, "g/cm^3"));
        let carbon = simple("Carbon", "C", (2.0, "g/cm^3"));
        let oxygen = simple("Oxygen", "O", (1.0, "g/cm^3"));
        let mix = mixture(
            "Mix",
            [(water, 0.3), (carbon, 0.16), (oxygen, 0.54)],
            FractionType::Atomic,
        )
        .build()
        .unwrap();
        let el = mix.elements();
        assert_relative_eq!(el.fraction("H"), 0.2, max_relative = 1e-9);
        assert_relative_eq!(el.fraction("O"), 0.64, max_relative = 1e-9);
        assert_relative_eq!(el.fraction("C"), 0.16, max_relative = 1e-9);
        assert_eq!(mix.mixture_composition().unwrap().fraction_type(), FractionType::Atomic);
    }

    #[test]
    fn test_atomic_composition_of_fraction_maps() {
        let make = |name: &str, elements: [(&str, f64); 2]| {
            material(name)
                .elements(elements)
                .properties(props().density(1.0).build().unwrap())
                .build()
                .unwrap()
                .instantiate()
        };
        let ho = make("HO", [("H", 0.5), ("O", 0.5)]);
        let co = make("CO", [("C", 0.2), ("O", 0.8)]);
        let mix = mixture("Mix", [(ho, 0.2), (co, 0.8)], FractionType::Atomic).build().unwrap();
        let el = mix.elements();
        assert_relative_eq!(el.fraction("H"), 0.1, max_relative = 1e-12);
        assert_relative_eq!(el.fraction("O"), 0.74, max_relative = 1e-12);
        assert_relative_eq!(el.fraction("C"), 0.16, max_relative = 1e-12);
    }

    #[test]
    fn test_mass_composition() {
        let water = simple("Water", "H2O", (1.0, "g/cm^3"));
        let carbon = simple("Carbon", "C", (1.0, "g/cm^3"));
        let mix = mixture("Mix", [(water.clone(), 0.5), (carbon.clone(), 0.5)], FractionType::Mass)
            .build()
            .unwrap();
        let w = mix.elements().mass_fractions();
        let w_water = water.elements().mass_fractions();
        assert_relative_eq!(w["H"], 0.5 * w_water["H"], max_relative = 1e-9);
        assert_relative_eq!(w["O"], 0.5 * w_water["O"], max_relative = 1e-9);
        assert_relative_eq!(w["C"], 0.5, max_relative = 1e-9);
    }

    #[test]
    fn test_volume_with_equal_densities_matches_mass() {
        let make = || {
            (
                simple("Water", "H2O", (1.0, "g/cm^3")),
                simple("Carbon", "C", (1.0, "g/cm^3")),
            )
        };
        let (w1, c1) = make();
        let (w2, c2) = make();
        let by_mass = mixture("M", [(w1, 0.4), (c1, 0.6)], FractionType::Mass).build().unwrap();
        let by_volume = mixture("V", [(w2, 0.4), (c2, 0.6)], FractionType::Volume).build().unwrap();
        for (el, x) in by_mass.elements().atomic_fractions() {
            assert_relative_eq!(by_volume.elements().fraction(&el), x, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_volume_weights_by_density() {
        let light = simple("Light", "H", (1.0, "g/cm^3"));
        let heavy = simple("Heavy", "H2", (3.0, "g/cm^3"));
        // Equal volumes carry three times the mass of the heavy constituent
        let mix = mixture("V", [(light, 0.5), (heavy, 0.5)], FractionType::Volume)
            .build()
            .unwrap();
        // "H2" as a formula is plain hydrogen, so only H remains
        assert_relative_eq!(mix.elements().fraction("H"), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_volume_requires_density() {
        let water = simple("Water", "H2O", (1.0, "g/cm^3"));
        let bare = material("Bare").elements("C").build().unwrap().instantiate();
        let err = mixture("V", [(water, 0.5), (bare, 0.5)], FractionType::Volume)
            .build()
            .unwrap_err();
        assert_eq!(err.error_code(), "COMPOSITION_ERROR");
        let msg = err.to_string();
        assert!(msg.contains("density required for volume mixing"));
        assert!(msg.contains("Bare"));
    }

    #[test]
    fn test_volume_void_fraction_kept() {
        let water = simple("Water", "H2O", (1.0, "g/cm^3"));
        let mix = mixture("Wet", [(water, 0.6)], FractionType::Volume).build().unwrap();
        assert_eq!(mix.mixture_fraction().unwrap()[0].1, 0.6);
        assert_relative_eq!(mix.elements().fraction("O"), 1.0 / 3.0, max_relative = 1e-9);
    }

    #[test]
    fn test_atomic_fractions_normalised() {
        let a = simple("A", "H", 1.0);
        let b = simple("B", "C", 1.0);
        let mix = mixture("N", [(a, 1.0), (b, 3.0)], FractionType::Atomic).build().unwrap();
        let fractions: Vec<f64> = mix.mixture_fraction().unwrap().iter().map(|(_, f)| *f).collect();
        assert_eq!(fractions, vec![0.25, 0.75]);
    }

    #[test]
    fn test_weight_law() {
        let m1 = simple("M1", "H", PropertySource::function(|c| Ok(c.temperature() * 2.0)));
        let m2 = simple("M2", "C", PropertySource::function(|c| Ok(c.temperature().powi(2))));
        let mix = mixture("Mix", [(m1.clone(), 0.3), (m2.clone(), 0.7)], FractionType::Atomic)
            .build()
            .unwrap();
        let c = OperationalConditions::new(vec![300.0, 500.0]).unwrap();
        let expected = &(&m1.density(&c).unwrap() * 0.3) + &(&m2.density(&c).unwrap() * 0.7);
        assert!(mix.density(&c).unwrap().allclose(&expected));
    }

    #[test]
    fn test_single_constituent() {
        let water = simple("Water", "H2O", (1.0, "g/cm^3"));
        let mix = mixture("Only", [(water, 1.0)], FractionType::Atomic).build().unwrap();
        let original = mix.mixture_fraction().unwrap()[0].0.elements().clone();
        for (el, x) in original.atomic_fractions() {
            assert_relative_eq!(mix.elements().fraction(&el), x, max_relative = 1e-12);
        }
        assert_relative_eq!(
            mix.density(&cond(300.0)).unwrap().as_scalar().unwrap(),
            1000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_undefined_propagates() {
        let a = material("A")
            .elements("H")
            .properties(props().density(1.0).thermal_conductivity(10.0).build().unwrap())
            .build()
            .unwrap()
            .instantiate();
        let b = material("B")
            .elements("C")
            .properties(props().density(2.0).build().unwrap())
            .build()
            .unwrap()
            .instantiate();
        let mix = mixture("Mix", [(a, 0.5), (b, 0.5)], FractionType::Atomic).build().unwrap();
        assert!(mix.list_properties(Listing::Defined).contains(&"density".to_string()));
        assert_eq!(
            mix.list_properties(Listing::Undefined),
            vec!["thermal_conductivity".to_string()],
        );

        let err = mix.thermal_conductivity(&cond(300.0)).unwrap_err();
        assert_eq!(err.error_code(), "UNDEFINED_PROPERTY");
        let msg = err.to_string();
        assert!(msg.contains("thermal_conductivity"));
        assert!(msg.contains("B"));
    }

    #[test]
    fn test_override_wins() {
        let a = simple("A", "H", 1.0);
        let b = material("B").elements("C").build().unwrap().instantiate();
        let mix = mixture("Mix", [(a, 0.5), (b, 0.5)], FractionType::Atomic)
            .override_property(PropertyKind::Density, 6.0)
            .build()
            .unwrap();
        assert_eq!(mix.density(&cond(300.0)).unwrap(), Value::Scalar(6.0));
        assert_eq!(mix.mixture_composition().unwrap().overrides(), &[PropertyKind::Density]);
    }

    #[test]
    fn test_cross_unit_mixing() {
        let m1 = simple(
            "M1",
            "H",
            (PropertySource::function(|c| Ok(c.temperature().powi(2))), "kg/m^3"),
        );
        let m2 = simple(
            "M2",
            "C",
            (
                PropertySource::function(|c| {
                    Ok(c.require(crate::properties::Condition::Pressure)?.powi(-2))
                }),
                "g/cm^3",
            ),
        );
        let mix = mixture("Mix", [(m1, 0.2), (m2, 0.8)], FractionType::Atomic).build().unwrap();
        match mix.properties().get(&PropertyKind::Density) {
            Some(Property::Mixture(m)) => assert!(m.has_mixed_units()),
            other => panic!("expected a mixed density, got {:?}", other),
        }
        let c = OperationalConditions::new(vec![298.0, 400.0])
            .unwrap()
            .with_pressure((1.0, "Pa"))
            .unwrap();
        // 0.2 * T^2 + 0.8 * 1 g/cm^3 = 0.2 * T^2 + 800 kg/m^3
        let rho = mix.density(&c).unwrap();
        assert_relative_eq!(rho.get(0).unwrap(), 0.2 * 298.0 * 298.0 + 800.0, max_relative = 1e-9);
        assert_relative_eq!(rho.get(1).unwrap(), 0.2 * 400.0 * 400.0 + 800.0, max_relative = 1e-9);
    }

    #[test]
    fn test_negative_fraction_rejected() {
        let a = simple("A", "H", 1.0);
        let err = mixture("Bad", [(a, -0.1)], FractionType::Atomic).build().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_mixture_of_mixtures_not_implemented() {
        let a = simple("A", "H", 1.0);
        let inner = mixture("Inner", [(a, 1.0)], FractionType::Atomic).build().unwrap();
        let err = mixture("Outer", [(inner, 1.0)], FractionType::Atomic).build().unwrap_err();
        assert_eq!(err.error_code(), "NOT_IMPLEMENTED");
    }

    #[test]
    fn test_superconductor_never_blended() {
        let sc = material("Nb3Sn")
            .elements("Nb3Sn")
            .properties(
                props()
                    .superconducting_parameterisation(SuperconductingParameterisation::new(
                        "fit",
                        [("t_c0max", 16.34)],
                    ))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
            .instantiate();
        let cu = simple("Cu", "Cu", 8.96);
        let mix = mixture("Strand", [(sc.clone(), 0.5), (cu.clone(), 0.5)], FractionType::Atomic)
            .build()
            .unwrap();
        assert_eq!(
            mix.superconducting_parameter("t_c0max").unwrap_err().error_code(),
            "UNDEFINED_PROPERTY",
        );

        let with = mixture("Strand", [(sc, 0.5), (cu, 0.5)], FractionType::Atomic)
            .superconducting_parameterisation(SuperconductingParameterisation::new(
                "fit",
                [("t_c0max", 15.0)],
            ))
            .build()
            .unwrap();
        assert_eq!(with.superconducting_parameter("t_c0max").unwrap(), 15.0);
    }
}
