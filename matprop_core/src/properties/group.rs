//! # Property Groups
//!
//! The per-material table of property slots and the `props()` builder that
//! fills it.
//!
//! A slot is either present or absent. A present slot holds a defined
//! property, a mixture of constituent properties, or an explicit
//! [`UndefinedProperty`] marker. An absent slot is not part of the
//! material's schema at all, so asking for it is a
//! [`MatError::MissingProperty`] rather than an undefined-property error.
//!
//! ## Example
//!
//! ```rust
//! use matprop_core::properties::{props, Listing, PropertyKind};
//!
//! let group = props()
//!     .density((7.9, "g/cm^3"))
//!     .poissons_ratio(0.3)
//!     .undefined(PropertyKind::ThermalConductivity)
//!     .extra("critical_temperature", (9.2, "K"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(group.list(Listing::Defined).len(), 3);
//! assert_eq!(group.list(Listing::Undefined), vec!["thermal_conductivity".to_string()]);
//! ```

use std::collections::BTreeMap;

use crate::conditions::OperationalConditions;
use crate::errors::{MatError, MatResult};
use crate::material::Material;
use crate::properties::dependent::{DependentPhysicalProperty, PropertyInput, UndefinedProperty};
use crate::properties::mixture::Mixture;
use crate::properties::superconduction::Superconductor;
use crate::properties::PropertyKind;
use crate::references::References;
use crate::units::Unit;
use crate::value::Value;

/// Contents of a present property slot
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Defined(DependentPhysicalProperty),
    Mixture(Mixture),
    Undefined(UndefinedProperty),
}

impl Property {
    pub fn is_defined(&self) -> bool {
        !matches!(self, Property::Undefined(_))
    }

    /// Output unit, if the slot has a value
    pub fn unit(&self) -> Option<&Unit> {
        match self {
            Property::Defined(p) => Some(p.unit()),
            Property::Mixture(m) => Some(m.unit()),
            Property::Undefined(_) => None,
        }
    }

    /// Evaluate the slot for `kind` on the named material
    pub fn evaluate(
        &self,
        owner: Option<&Material>,
        material: &str,
        kind: &PropertyKind,
        conditions: &OperationalConditions,
    ) -> MatResult<Value> {
        match self {
            Property::Defined(p) => p.evaluate(owner, conditions),
            Property::Mixture(m) => m.evaluate(conditions),
            Property::Undefined(u) => u.evaluate(kind, material),
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Property::Defined(p) => write!(f, "{}", p),
            Property::Mixture(m) => write!(f, "{}", m),
            Property::Undefined(_) => write!(f, "undefined"),
        }
    }
}

impl PropertyInput {
    /// Resolve into the slot contents for `kind`
    pub fn into_property(self, kind: &PropertyKind) -> MatResult<Property> {
        if let PropertyInput::Undefined(u) = self {
            return Ok(Property::Undefined(u));
        }
        Ok(match self.into_dependent(kind)? {
            Some(dpp) => Property::Defined(dpp),
            None => Property::Undefined(UndefinedProperty::new()),
        })
    }
}

/// Which slots [`Properties::list`] reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Defined,
    Undefined,
    All,
}

impl Listing {
    fn accepts(self, defined: bool) -> bool {
        match self {
            Listing::Defined => defined,
            Listing::Undefined => !defined,
            Listing::All => true,
        }
    }
}

/// A material's property table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties {
    slots: BTreeMap<PropertyKind, Property>,
    /// `None` means the material has no superconducting slot
    superconductor: Option<Superconductor>,
    reference: Option<References>,
}

impl Properties {
    /// An empty group (no slots at all)
    pub fn new() -> Self {
        Self::default()
    }

    /// Every vocabulary slot present and undefined
    pub fn default_properties() -> Self {
        Properties {
            slots: PropertyKind::VOCABULARY
                .into_iter()
                .map(|k| (k, Property::Undefined(UndefinedProperty::new())))
                .collect(),
            superconductor: Some(Superconductor::Undefined),
            reference: None,
        }
    }

    pub fn get(&self, kind: &PropertyKind) -> Option<&Property> {
        self.slots.get(kind)
    }

    /// The slot's property if it is a plain defined property
    pub fn defined(&self, kind: &PropertyKind) -> Option<&DependentPhysicalProperty> {
        match self.slots.get(kind) {
            Some(Property::Defined(p)) => Some(p),
            _ => None,
        }
    }

    pub fn contains(&self, kind: &PropertyKind) -> bool {
        self.slots.contains_key(kind)
    }

    /// Replace the contents of an existing slot, validating the new value
    pub fn set(
        &mut self,
        kind: &PropertyKind,
        input: impl Into<PropertyInput>,
        material: &str,
    ) -> MatResult<()> {
        if !self.slots.contains_key(kind) {
            return Err(MatError::missing_property(kind.name(), material));
        }
        let property = input.into().into_property(kind)?;
        self.slots.insert(kind.clone(), property);
        Ok(())
    }

    pub(crate) fn insert(&mut self, kind: PropertyKind, property: Property) {
        self.slots.insert(kind, property);
    }

    /// Slot names (plus `superconducting_parameterisation`) matching `listing`
    pub fn list(&self, listing: Listing) -> Vec<String> {
        let mut names: Vec<String> = self
            .slots
            .iter()
            .filter(|(_, p)| listing.accepts(p.is_defined()))
            .map(|(k, _)| k.name().to_string())
            .collect();
        if let Some(sc) = &self.superconductor {
            if listing.accepts(sc.is_defined()) {
                names.push("superconducting_parameterisation".to_string());
            }
        }
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKind, &Property)> {
        self.slots.iter()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &PropertyKind> {
        self.slots.keys()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.superconductor.is_none()
    }

    pub fn superconductor(&self) -> Option<&Superconductor> {
        self.superconductor.as_ref()
    }

    pub(crate) fn set_superconductor(&mut self, sc: Option<Superconductor>) {
        self.superconductor = sc;
    }

    pub fn reference(&self) -> Option<&References> {
        self.reference.as_ref()
    }
}

// ============================================================================
// props() builder
// ============================================================================

/// Start building a property group
pub fn props() -> PropsBuilder {
    PropsBuilder::default()
}

/// Collects property inputs; nothing is validated until [`PropsBuilder::build`]
#[derive(Debug, Default)]
pub struct PropsBuilder {
    inputs: Vec<(PropertyKind, PropertyInput)>,
    superconductor: Option<Superconductor>,
    reference: Option<References>,
}

macro_rules! vocabulary_setters {
    ($($method:ident => $kind:ident),* $(,)?) => {
        impl PropsBuilder {
            $(
                pub fn $method(self, input: impl Into<PropertyInput>) -> Self {
                    self.property(PropertyKind::$kind, input)
                }
            )*
        }
    };
}

vocabulary_setters! {
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

impl PropsBuilder {
    /// Set any slot by kind
    pub fn property(mut self, kind: PropertyKind, input: impl Into<PropertyInput>) -> Self {
        self.inputs.retain(|(k, _)| *k != kind);
        self.inputs.push((kind, input.into()));
        self
    }

    /// A property outside the fixed vocabulary; its unit must be given
    pub fn extra(self, name: &str, input: impl Into<PropertyInput>) -> Self {
        self.property(PropertyKind::from_name(name), input)
    }

    /// A present but undefined slot
    pub fn undefined(self, kind: PropertyKind) -> Self {
        self.property(kind, UndefinedProperty::new())
    }

    pub fn superconducting_parameterisation(mut self, sc: impl Into<Superconductor>) -> Self {
        self.superconductor = Some(sc.into());
        self
    }

    pub fn reference(mut self, reference: impl Into<References>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn build(self) -> MatResult<Properties> {
        let mut slots = BTreeMap::new();
        for (kind, input) in self.inputs {
            let property = input.into_property(&kind)?;
            slots.insert(kind, property);
        }
        Ok(Properties {
            slots,
            superconductor: self.superconductor,
            reference: self.reference,
        })
    }
}
