//! # Materials
//!
//! A material is a name, a chemical composition, a table of property slots,
//! a set of converters and an optional reference.
//!
//! ## Construction
//!
//! Materials are never built directly. [`material`] returns a builder whose
//! [`MaterialBuilder::build`] produces a [`MaterialType`]: the validated
//! schema of one kind of material. Each [`MaterialType::instantiate`] call
//! hands out an independent [`Material`] with its own copy of every slot, so
//! overriding a property on one instance never touches another.
//!
//! [`mixture`] builds a material from weighted constituents instead.
//!
//! ## Example
//!
//! ```rust
//! use matprop_core::conditions::OperationalConditions;
//! use matprop_core::material::material;
//! use matprop_core::properties::{props, PropertySource};
//!
//! let steel = material("Steel")
//!     .elements([("Fe", 0.98), ("C", 0.02)])
//!     .properties(
//!         props()
//!             .density((7.85, "g/cm^3"))
//!             .thermal_conductivity(PropertySource::function(|c| {
//!                 Ok(60.0 - c.temperature() * 0.03)
//!             }))
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap()
//!     .instantiate();
//!
//! let cond = OperationalConditions::new(400.0).unwrap();
//! assert!((steel.thermal_conductivity(&cond).unwrap().as_scalar().unwrap() - 48.0).abs() < 1e-9);
//! ```

pub mod document;
pub mod mixture;

pub use document::{MaterialDocument, MaterialExport, PropertyExport};
pub use mixture::{mixture, MixtureBuilder, MixtureComposition};

use std::sync::Arc;

use crate::conditions::OperationalConditions;
use crate::converters::{ConvertedMaterial, Converter, Converters};
use crate::elements::{Elements, ElementsInput};
use crate::errors::{MatError, MatResult};
use crate::properties::{Listing, Properties, Property, PropertyInput, PropertyKind};
use crate::references::{self, References};
use crate::units::Unit;
use crate::value::Value;

// ============================================================================
// Builder
// ============================================================================

/// Start defining a material type
pub fn material(name: impl Into<String>) -> MaterialBuilder {
    MaterialBuilder {
        name: name.into(),
        elements: None,
        properties: None,
        converters: Converters::new(),
        reference: None,
        custom: Vec::new(),
    }
}

/// Collects the parts of a material type
#[derive(Debug)]
pub struct MaterialBuilder {
    name: String,
    elements: Option<ElementsInput>,
    properties: Option<Properties>,
    converters: Converters,
    reference: Option<References>,
    custom: Vec<(PropertyKind, PropertyInput)>,
}

impl MaterialBuilder {
    /// Composition: a formula, a symbol list, a fraction map or [`Elements`]
    pub fn elements(mut self, elements: impl Into<ElementsInput>) -> Self {
        self.elements = Some(elements.into());
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converters.add(converter);
        self
    }

    pub fn converters(mut self, converters: Converters) -> Self {
        self.converters = converters.merged(&self.converters);
        self
    }

    pub fn reference(mut self, reference: impl Into<References>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// A property slot outside the property group; custom names need a unit
    pub fn custom_property(mut self, name: &str, input: impl Into<PropertyInput>) -> Self {
        self.custom.push((PropertyKind::from_name(name), input.into()));
        self
    }

    pub fn build(self) -> MatResult<MaterialType> {
        let elements = match self.elements {
            Some(input) => input.resolve()?,
            None => Elements::default(),
        };
        let mut properties = self.properties.unwrap_or_default();
        for (kind, input) in self.custom {
            let property = input.into_property(&kind)?;
            properties.insert(kind, property);
        }
        let reference = references::merge(self.reference, properties.reference());
        Ok(MaterialType {
            name: self.name,
            elements,
            properties,
            converters: self.converters,
            reference,
        })
    }
}

// ============================================================================
// MaterialType
// ============================================================================

/// Validated schema of one kind of material
#[derive(Debug, Clone)]
pub struct MaterialType {
    name: String,
    elements: Elements,
    properties: Properties,
    converters: Converters,
    reference: Option<References>,
}

impl MaterialType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// A new, independent material of this type
    pub fn instantiate(&self) -> Material {
        Material {
            name: self.name.clone(),
            elements: self.elements.clone(),
            properties: self.properties.clone(),
            converters: self.converters.clone(),
            reference: self.reference.clone(),
            mixture: None,
        }
    }
}

// ============================================================================
// Material
// ============================================================================

/// One material instance
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    elements: Elements,
    properties: Properties,
    converters: Converters,
    reference: Option<References>,
    mixture: Option<MixtureComposition>,
}

macro_rules! property_shorthands {
    ($($method:ident => $kind:ident),* $(,)?) => {
        impl Material {
            $(
                #[doc = concat!("Evaluate `", stringify!($method), "`")]
                pub fn $method(&self, conditions: &OperationalConditions) -> MatResult<Value> {
                    self.evaluate(&PropertyKind::$kind, conditions)
                }
            )*
        }
    };
}

property_shorthands! {
    density => Density,
    poissons_ratio => PoissonsRatio,
    residual_resistance_ratio => ResidualResistanceRatio,
    thermal_conductivity => ThermalConductivity,
    youngs_modulus => YoungsModulus,
    shear_modulus => ShearModulus,
    bulk_modulus => BulkModulus,
    coefficient_thermal_expansion => CoefficientThermalExpansion,
    specific_heat_capacity => SpecificHeatCapacity,
    electrical_resistivity => ElectricalResistivity,
    magnetic_saturation => MagneticSaturation,
    magnetic_susceptibility => MagneticSusceptibility,
    viscous_remanent_magnetisation => ViscousRemanentMagnetisation,
    coercive_field => CoerciveField,
    minimum_yield_stress => MinimumYieldStress,
    average_yield_stress => AverageYieldStress,
    minimum_ultimate_tensile_stress => MinimumUltimateTensileStress,
    average_ultimate_tensile_stress => AverageUltimateTensileStress,
}

impl Material {
    pub(crate) fn from_parts(
        name: String,
        elements: Elements,
        properties: Properties,
        converters: Converters,
        reference: Option<References>,
        mixture: Option<MixtureComposition>,
    ) -> Material {
        Material {
            name,
            elements,
            properties,
            converters,
            reference,
            mixture,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn converters(&self) -> &Converters {
        &self.converters
    }

    pub fn reference(&self) -> Option<&References> {
        self.reference.as_ref()
    }

    /// Constituents and fractions, if this material is a mixture
    pub fn mixture_fraction(&self) -> Option<&[(Arc<Material>, f64)]> {
        self.mixture.as_ref().map(|m| m.fractions.as_slice())
    }

    pub fn mixture_composition(&self) -> Option<&MixtureComposition> {
        self.mixture.as_ref()
    }

    pub fn is_mixture(&self) -> bool {
        self.mixture.is_some()
    }

    /// A property slot bound to this material
    pub fn property(&self, kind: impl Into<PropertyKind>) -> MatResult<BoundProperty<'_>> {
        let kind = kind.into();
        let property = self
            .properties
            .get(&kind)
            .ok_or_else(|| MatError::missing_property(kind.name(), &self.name))?;
        Ok(BoundProperty {
            owner: self,
            kind,
            property,
        })
    }

    /// Evaluate any slot by kind
    pub fn evaluate(
        &self,
        kind: &PropertyKind,
        conditions: &OperationalConditions,
    ) -> MatResult<Value> {
        self.property(kind.clone())?.call(conditions)
    }

    /// Replace an existing slot (validated like construction)
    pub fn set_property(
        &mut self,
        kind: impl Into<PropertyKind>,
        input: impl Into<PropertyInput>,
    ) -> MatResult<()> {
        self.properties.set(&kind.into(), input, &self.name)
    }

    pub fn list_properties(&self, listing: Listing) -> Vec<String> {
        self.properties.list(listing)
    }

    /// Forward a lookup to the superconducting parameterisation
    pub fn superconducting_parameter(&self, name: &str) -> MatResult<f64> {
        match self.properties.superconductor() {
            Some(sc) => sc.parameter(name, &self.name),
            None => Err(MatError::missing_property("superconducting_parameterisation", &self.name)),
        }
    }

    /// Run the named converter
    pub fn convert(
        &self,
        converter: &str,
        conditions: &OperationalConditions,
    ) -> MatResult<ConvertedMaterial> {
        let c = self.converters.get(converter).ok_or_else(|| MatError::ConverterNotFound {
            name: converter.to_string(),
            material: self.name.clone(),
        })?;
        c.convert(self, conditions)
    }

    /// Name, composition and every defined property evaluated at `conditions`
    pub fn export(&self, conditions: &OperationalConditions) -> MatResult<MaterialExport> {
        let mut properties = std::collections::BTreeMap::new();
        for (kind, property) in self.properties.iter() {
            let Some(unit) = property.unit() else {
                continue;
            };
            let value = property.evaluate(Some(self), &self.name, kind, conditions)?;
            properties.insert(
                kind.name().to_string(),
                PropertyExport {
                    value,
                    unit: unit.symbol().to_string(),
                },
            );
        }
        Ok(MaterialExport {
            name: self.name.clone(),
            elements: self.elements.clone(),
            properties,
            reference: self.reference.clone(),
        })
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}", self.name, self.elements)?;
        let defined = self.list_properties(Listing::Defined);
        if !defined.is_empty() {
            write!(f, ", properties: [{}]", defined.join(", "))?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// BoundProperty
// ============================================================================

/// A property slot together with the material that owns it
#[derive(Debug, Clone)]
pub struct BoundProperty<'a> {
    owner: &'a Material,
    kind: PropertyKind,
    property: &'a Property,
}

impl<'a> BoundProperty<'a> {
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn property(&self) -> &'a Property {
        self.property
    }

    pub fn is_defined(&self) -> bool {
        self.property.is_defined()
    }

    /// Output unit, `None` for an undefined slot
    pub fn unit(&self) -> Option<&'a Unit> {
        self.property.unit()
    }

    /// Evaluate in the output unit
    pub fn call(&self, conditions: &OperationalConditions) -> MatResult<Value> {
        self.property
            .evaluate(Some(self.owner), self.owner.name(), &self.kind, conditions)
    }

    /// Evaluate and convert to `unit`
    pub fn value_as(&self, conditions: &OperationalConditions, unit: &str) -> MatResult<Value> {
        let value = self.call(conditions)?;
        match self.unit() {
            Some(from) => from.convert(&value, &Unit::parse(unit)?),
            None => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::ConditionConfig;
    use crate::converters::McnpConverter;
    use crate::properties::superconduction::SuperconductingParameterisation;
    use crate::properties::{props, DependentPhysicalProperty, PropertySource};
    use crate::references::Reference;
    use approx::assert_relative_eq;

    /// Specific heat defined through the owner's density
    fn test_material() -> MaterialType {
        let cp = DependentPhysicalProperty::with_unit(
            PropertyKind::SpecificHeatCapacity,
            PropertySource::with_owner(|m, c| Ok(&m.density(c)? * c.temperature())),
            "J/g/K",
        )
        .unwrap()
        .with_domain(ConditionConfig::new().temperature(100.0, 300.0).unwrap());

        material("Test")
            .elements("H2O")
            .properties(
                props()
                    .density((5.0, "g/cm^3"))
                    .specific_heat_capacity(cp)
                    .undefined(PropertyKind::ThermalConductivity)
                    .reference(Reference::new("props", "article"))
                    .build()
                    .unwrap(),
            )
            .reference(Reference::new("mat", "book"))
            .converter(McnpConverter::new().material_id(3))
            .build()
            .unwrap()
    }

    #[test]
    fn test_density_normalised() {
        let m = test_material().instantiate();
        let cond = OperationalConditions::new(300.0).unwrap();
        assert_relative_eq!(
            m.density(&cond).unwrap().as_scalar().unwrap(),
            5000.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            m.property(PropertyKind::Density)
                .unwrap()
                .value_as(&cond, "g/cm^3")
                .unwrap()
                .as_scalar()
                .unwrap(),
            5.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_owner_bound_property() {
        let m = test_material().instantiate();
        let cond = OperationalConditions::new(200.0).unwrap();
        // 5000 * 200 J/g/K -> J/kg/K
        assert_relative_eq!(
            m.specific_heat_capacity(&cond).unwrap().as_scalar().unwrap(),
            5000.0 * 200.0 * 1000.0,
            max_relative = 1e-9
        );
        let hot = OperationalConditions::new(400.0).unwrap();
        assert_eq!(m.specific_heat_capacity(&hot).unwrap_err().error_code(), "OUT_OF_RANGE");
    }

    #[test]
    fn test_undefined_and_missing() {
        let m = test_material().instantiate();
        let cond = OperationalConditions::new(200.0).unwrap();
        let err = m.thermal_conductivity(&cond).unwrap_err();
        assert_eq!(err.error_code(), "UNDEFINED_PROPERTY");
        assert!(err.to_string().contains("thermal_conductivity"));
        assert_eq!(m.youngs_modulus(&cond).unwrap_err().error_code(), "MISSING_PROPERTY");
    }

    #[test]
    fn test_listing() {
        let m = test_material().instantiate();
        assert_eq!(
            m.list_properties(Listing::Defined),
            vec!["density".to_string(), "specific_heat_capacity".to_string()]
        );
        assert_eq!(m.list_properties(Listing::Undefined), vec!["thermal_conductivity".to_string()]);
    }

    #[test]
    fn test_instances_are_independent() {
        let t = test_material();
        let mut a = t.instantiate();
        let b = t.instantiate();
        a.set_property(PropertyKind::Density, (1.0, "g/cm^3")).unwrap();
        let cond = OperationalConditions::new(200.0).unwrap();
        assert_relative_eq!(
            a.density(&cond).unwrap().as_scalar().unwrap(),
            1000.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            b.density(&cond).unwrap().as_scalar().unwrap(),
            5000.0,
            max_relative = 1e-12
        );
        assert!(a.set_property(PropertyKind::Density, (1.0, "m")).is_err());
    }

    #[test]
    fn test_references_merged() {
        let m = test_material().instantiate();
        let refs = m.reference().unwrap();
        assert!(refs.get("mat").is_some());
        assert!(refs.get("props").is_some());
    }

    #[test]
    fn test_custom_property() {
        let m = material("Custom")
            .custom_property("critical_temperature", (9.2, "K"))
            .build()
            .unwrap()
            .instantiate();
        let cond = OperationalConditions::new(4.0).unwrap();
        let tc = m.property("critical_temperature").unwrap();
        assert_eq!(tc.unit().unwrap().symbol(), "K");
        assert_eq!(tc.call(&cond).unwrap(), Value::Scalar(9.2));

        assert!(material("Bad").custom_property("critical_current", 10.0).build().is_err());
    }

    #[test]
    fn test_superconducting_forwarding() {
        let m = material("Nb3Sn")
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
        assert_eq!(m.superconducting_parameter("t_c0max").unwrap(), 16.34);
        let plain = test_material().instantiate();
        assert_eq!(
            plain.superconducting_parameter("t_c0max").unwrap_err().error_code(),
            "MISSING_PROPERTY",
        );
    }

    #[test]
    fn test_convert_dispatch() {
        let m = test_material().instantiate();
        let cond = OperationalConditions::new(200.0).unwrap();
        let card = m.convert("mcnp", &cond).unwrap();
        assert!(card.as_card().unwrap().contains("M3 "));
        assert_eq!(m.convert("openmc", &cond).unwrap_err().error_code(), "CONVERTER_NOT_FOUND");
    }

    #[test]
    fn test_display() {
        let m = test_material().instantiate();
        let text = m.to_string();
        assert!(text.starts_with("Test(Elements("));
        assert!(text.contains("density"));
    }
}
