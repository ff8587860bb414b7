//! # Material Documents
//!
//! Two serializable views of a material:
//!
//! - [`MaterialExport`]: evaluated values at one set of conditions, the output
//!   of the `json` converter. [`MaterialType::from_export`] turns it back into
//!   a material with constant properties.
//! - [`MaterialDocument`]: the full definition (constant and tabulated
//!   sources, validity domains, undefined slots, converter configuration and
//!   mixture constituents). Function-valued properties have no document form.
//!
//! Mixture slots are not stored as values. A mixture document keeps its
//! constituents, fractions and overrides and is rebuilt through
//! [`mixture`](super::mixture) on load.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conditions::OperationalConditions;
use crate::converters::ConverterRegistry;
use crate::elements::{Elements, FractionType};
use crate::errors::{MatError, MatResult};
use crate::properties::{
    Properties, Property, PropertyDocument, PropertyInput, PropertyKind, Superconductor,
    UndefinedProperty,
};
use crate::references::References;
use crate::units::Quantity;
use crate::value::Value;

use super::{mixture, Material, MaterialType};

/// Current schema version for saved material documents
pub const SCHEMA_VERSION: &str = "0.1.0";

// ============================================================================
// Evaluated export
// ============================================================================

/// One evaluated property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyExport {
    pub value: Value,
    pub unit: String,
}

/// A material evaluated at one set of conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialExport {
    pub name: String,
    #[serde(default, skip_serializing_if = "Elements::is_empty")]
    pub elements: Elements,
    pub properties: BTreeMap<String, PropertyExport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<References>,
}

impl MaterialType {
    /// A material type whose properties are the exported constants
    pub fn from_export(export: MaterialExport) -> MatResult<MaterialType> {
        let mut properties = Properties::new();
        for (name, p) in export.properties {
            let kind = PropertyKind::from_name(&name);
            let input = PropertyInput::Constant(Quantity::new(p.value, p.unit));
            properties.insert(kind.clone(), input.into_property(&kind)?);
        }
        Ok(MaterialType {
            name: export.name,
            elements: export.elements,
            properties,
            converters: Default::default(),
            reference: export.reference,
        })
    }
}

// ============================================================================
// Full definition
// ============================================================================

/// Stored contents of one property slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlotDocument {
    Defined(PropertyDocument),
    Undefined {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Recomputed from the constituents on load
    Mixed,
}

/// A constituent of a stored mixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentDocument {
    pub material: MaterialDocument,
    pub fraction: f64,
}

/// How a stored mixture was combined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixtureDocument {
    pub constituents: Vec<ConstituentDocument>,
    pub fraction_type: FractionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_conditions: Option<OperationalConditions>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, SlotDocument>,
}

/// Serialized material definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDocument {
    /// Schema version the document was written with
    pub version: String,
    pub saved_at: DateTime<Utc>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Elements::is_empty")]
    pub elements: Elements,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SlotDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superconductor: Option<Superconductor>,
    /// Converter configurations keyed by converter name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub converters: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<References>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixture: Option<MixtureDocument>,
}

fn slot_document(kind: &PropertyKind, property: &Property) -> MatResult<SlotDocument> {
    Ok(match property {
        Property::Defined(p) => SlotDocument::Defined(p.to_document()?),
        Property::Undefined(u) => SlotDocument::Undefined {
            message: u.message.clone(),
        },
        Property::Mixture(_) => {
            tracing::debug!(
                property = kind.name(),
                "Storing mixed slot by reference to constituents"
            );
            SlotDocument::Mixed
        }
    })
}

fn slot_input(kind: &PropertyKind, slot: SlotDocument) -> MatResult<PropertyInput> {
    match slot {
        SlotDocument::Defined(doc) => {
            Ok(PropertyInput::Dependent(doc.into_property(kind.clone())?))
        }
        SlotDocument::Undefined { message } => {
            Ok(PropertyInput::Undefined(UndefinedProperty { message }))
        }
        SlotDocument::Mixed => Err(MatError::composition(format!(
            "'{}' is stored as a mixed property but the document has no constituents",
            kind
        ))),
    }
}

impl Material {
    /// Full serializable definition.
    ///
    /// Fails with `NotImplemented` if any property (including those of
    /// mixture constituents) is function-valued.
    pub fn to_document(&self) -> MatResult<MaterialDocument> {
        let mut properties = BTreeMap::new();
        for (kind, property) in self.properties.iter() {
            properties.insert(kind.name().to_string(), slot_document(kind, property)?);
        }

        let mixture = match &self.mixture {
            None => None,
            Some(composition) => {
                let mut constituents = Vec::with_capacity(composition.fractions.len());
                for (material, fraction) in &composition.fractions {
                    constituents.push(ConstituentDocument {
                        material: material.to_document()?,
                        fraction: *fraction,
                    });
                }
                let mut overrides = BTreeMap::new();
                for kind in composition.overrides() {
                    if let Some(slot) = properties.remove(kind.name()) {
                        overrides.insert(kind.name().to_string(), slot);
                    }
                }
                Some(MixtureDocument {
                    constituents,
                    fraction_type: composition.fraction_type(),
                    volume_conditions: composition.volume_conditions().cloned(),
                    overrides,
                })
            }
        };

        Ok(MaterialDocument {
            version: SCHEMA_VERSION.to_string(),
            saved_at: Utc::now(),
            name: self.name.clone(),
            elements: self.elements.clone(),
            properties,
            superconductor: self.properties.superconductor().cloned(),
            converters: self.converters.configs(),
            reference: self.reference.clone(),
            mixture,
        })
    }
}

impl MaterialDocument {
    /// Rebuild the material, restoring converters through `registry`
    pub fn into_material(self, registry: &ConverterRegistry) -> MatResult<Material> {
        let converters = registry.build_all(&self.converters)?;

        let Some(mix) = self.mixture else {
            let mut properties = Properties::new();
            for (name, slot) in self.properties {
                let kind = PropertyKind::from_name(&name);
                let property = slot_input(&kind, slot)?.into_property(&kind)?;
                properties.insert(kind, property);
            }
            properties.set_superconductor(self.superconductor);
            return Ok(Material::from_parts(
                self.name,
                self.elements,
                properties,
                converters,
                self.reference,
                None,
            ));
        };

        let mut constituents = Vec::with_capacity(mix.constituents.len());
        for c in mix.constituents {
            constituents.push((c.material.into_material(registry)?, c.fraction));
        }
        let mut builder =
            mixture(self.name, constituents, mix.fraction_type).converters(converters);
        if let Some(reference) = self.reference {
            builder = builder.reference(reference);
        }
        if let Some(conditions) = mix.volume_conditions {
            builder = builder.volume_conditions(conditions);
        }
        for (name, slot) in mix.overrides {
            let kind = PropertyKind::from_name(&name);
            let input = slot_input(&kind, slot)?;
            builder = builder.override_property(kind, input);
        }
        // Parameterisations are never blended, so a defined one was an override
        if let Some(sc @ Superconductor::Defined(_)) = self.superconductor {
            builder = builder.superconducting_parameterisation(sc);
        }
        builder.build()
    }

    pub fn to_json(&self) -> MatResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> MatResult<MaterialDocument> {
        Ok(serde_json::from_str(json)?)
    }
}
