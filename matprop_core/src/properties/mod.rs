//! # Properties
//!
//! Everything a material can be asked for.
//!
//! - [`independent`]: unit-tagged operating-condition values
//! - [`dependent`]: properties evaluated against operating conditions
//! - [`mixture`]: fraction-weighted combinations of constituent properties
//! - [`group`]: the per-material property table and the `props()` builder
//! - [`superconduction`]: superconducting parameterisations

pub mod dependent;
pub mod group;
pub mod independent;
pub mod mixture;
pub mod superconduction;

pub use dependent::{
    DependentPhysicalProperty, PropertyDocument, PropertyFn, PropertyInput, PropertySource,
    UndefinedProperty,
};
pub use group::{props, Listing, Properties, PropsBuilder, Property};
pub use independent::{Condition, PhysicalProperty};
pub use mixture::Mixture;
pub use superconduction::{SuperconductingParameterisation, Superconductor};

use serde::{Deserialize, Serialize};

/// Names of the dependent properties a material can carry.
///
/// The fixed vocabulary each has a canonical unit; [`PropertyKind::Custom`]
/// properties carry whatever unit they are declared with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyKind {
    Density,
    PoissonsRatio,
    ResidualResistanceRatio,
    ThermalConductivity,
    YoungsModulus,
    ShearModulus,
    BulkModulus,
    CoefficientThermalExpansion,
    SpecificHeatCapacity,
    ElectricalResistivity,
    MagneticSaturation,
    MagneticSusceptibility,
    ViscousRemanentMagnetisation,
    CoerciveField,
    MinimumYieldStress,
    AverageYieldStress,
    MinimumUltimateTensileStress,
    AverageUltimateTensileStress,
    Custom(String),
}

impl PropertyKind {
    pub const VOCABULARY: [PropertyKind; 18] = [
        PropertyKind::Density,
        PropertyKind::PoissonsRatio,
        PropertyKind::ResidualResistanceRatio,
        PropertyKind::ThermalConductivity,
        PropertyKind::YoungsModulus,
        PropertyKind::ShearModulus,
        PropertyKind::BulkModulus,
        PropertyKind::CoefficientThermalExpansion,
        PropertyKind::SpecificHeatCapacity,
        PropertyKind::ElectricalResistivity,
        PropertyKind::MagneticSaturation,
        PropertyKind::MagneticSusceptibility,
        PropertyKind::ViscousRemanentMagnetisation,
        PropertyKind::CoerciveField,
        PropertyKind::MinimumYieldStress,
        PropertyKind::AverageYieldStress,
        PropertyKind::MinimumUltimateTensileStress,
        PropertyKind::AverageUltimateTensileStress,
    ];

    /// Snake-case name
    pub fn name(&self) -> &str {
        match self {
            PropertyKind::Density => "density",
            PropertyKind::PoissonsRatio => "poissons_ratio",
            PropertyKind::ResidualResistanceRatio => "residual_resistance_ratio",
            PropertyKind::ThermalConductivity => "thermal_conductivity",
            PropertyKind::YoungsModulus => "youngs_modulus",
            PropertyKind::ShearModulus => "shear_modulus",
            PropertyKind::BulkModulus => "bulk_modulus",
            PropertyKind::CoefficientThermalExpansion => "coefficient_thermal_expansion",
            PropertyKind::SpecificHeatCapacity => "specific_heat_capacity",
            PropertyKind::ElectricalResistivity => "electrical_resistivity",
            PropertyKind::MagneticSaturation => "magnetic_saturation",
            PropertyKind::MagneticSusceptibility => "magnetic_susceptibility",
            PropertyKind::ViscousRemanentMagnetisation => "viscous_remanent_magnetisation",
            PropertyKind::CoerciveField => "coercive_field",
            PropertyKind::MinimumYieldStress => "minimum_yield_stress",
            PropertyKind::AverageYieldStress => "average_yield_stress",
            PropertyKind::MinimumUltimateTensileStress => "minimum_ultimate_tensile_stress",
            PropertyKind::AverageUltimateTensileStress => "average_ultimate_tensile_stress",
            PropertyKind::Custom(name) => name,
        }
    }

    /// Vocabulary entry for `name`, or a custom kind
    pub fn from_name(name: &str) -> PropertyKind {
        PropertyKind::VOCABULARY
            .into_iter()
            .find(|k| k.name() == name)
            .unwrap_or_else(|| PropertyKind::Custom(name.to_string()))
    }

    /// Canonical unit of a vocabulary entry; `None` for custom kinds
    pub fn canonical_unit(&self) -> Option<&'static str> {
        Some(match self {
            PropertyKind::Density => "kg/m^3",
            PropertyKind::PoissonsRatio => "",
            PropertyKind::ResidualResistanceRatio => "",
            PropertyKind::ThermalConductivity => "W/(m*K)",
            PropertyKind::YoungsModulus
            | PropertyKind::ShearModulus
            | PropertyKind::BulkModulus => "Pa",
            PropertyKind::CoefficientThermalExpansion => "1/K",
            PropertyKind::SpecificHeatCapacity => "J/(kg*K)",
            PropertyKind::ElectricalResistivity => "ohm*m",
            PropertyKind::MagneticSaturation => "A/m",
            PropertyKind::MagneticSusceptibility => "",
            PropertyKind::ViscousRemanentMagnetisation => "A/m",
            PropertyKind::CoerciveField => "A/m",
            PropertyKind::MinimumYieldStress
            | PropertyKind::AverageYieldStress
            | PropertyKind::MinimumUltimateTensileStress
            | PropertyKind::AverageUltimateTensileStress => "Pa",
            PropertyKind::Custom(_) => return None,
        })
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, PropertyKind::Custom(_))
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<String> for PropertyKind {
    fn from(name: String) -> Self {
        PropertyKind::from_name(&name)
    }
}

impl From<&str> for PropertyKind {
    fn from(name: &str) -> Self {
        PropertyKind::from_name(name)
    }
}

impl From<PropertyKind> for String {
    fn from(kind: PropertyKind) -> String {
        kind.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;

    #[test]
    fn test_names_roundtrip() {
        for kind in PropertyKind::VOCABULARY {
            assert_eq!(PropertyKind::from_name(kind.name()), kind);
        }
        assert_eq!(
            PropertyKind::from_name("critical_current"),
            PropertyKind::Custom("critical_current".into())
        );
    }

    #[test]
    fn test_canonical_units_parse() {
        for kind in PropertyKind::VOCABULARY {
            let unit = kind.canonical_unit().unwrap();
            assert!(Unit::parse(unit).is_ok(), "{} has bad unit {}", kind, unit);
        }
        assert!(PropertyKind::Custom("x".into()).canonical_unit().is_none());
    }

    #[test]
    fn test_serializes_as_name() {
        let json = serde_json::to_string(&PropertyKind::ThermalConductivity).unwrap();
        assert_eq!(json, "\"thermal_conductivity\"");
        let back: PropertyKind = serde_json::from_str("\"my_thing\"").unwrap();
        assert_eq!(back, PropertyKind::Custom("my_thing".into()));
    }
}
