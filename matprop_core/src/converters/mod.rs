//! # Converters
//!
//! Pluggable exporters from a [`Material`] to some external representation
//! (neutronics material cards, JSON documents, ...).
//!
//! A material carries a [`Converters`] map keyed by converter name and
//! dispatches [`Material::convert`] to the matching entry. New formats only
//! need a type implementing [`Converter`]; materials and mixtures never
//! change.
//!
//! ## Persistence
//!
//! Each converter reports its configuration as JSON through
//! [`Converter::config`]. A [`ConverterRegistry`] maps converter names back to
//! factories so saved materials can rebuild their converters.
//!
//! ## Material ids
//!
//! MCNP cards need a material number. When none is configured the converter
//! draws one from a [`MaterialIdSequence`], an explicit counter that callers
//! share or reset as they need.

pub mod neutronics;

pub use neutronics::{FispactConverter, McnpConverter, PercentType, SerpentConverter};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::conditions::OperationalConditions;
use crate::errors::{MatError, MatResult};
use crate::material::Material;

/// Output of a converter
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedMaterial {
    /// Text material card
    Card(String),
    /// Structured document
    Document(serde_json::Value),
}

impl ConvertedMaterial {
    pub fn as_card(&self) -> Option<&str> {
        match self {
            ConvertedMaterial::Card(s) => Some(s),
            ConvertedMaterial::Document(_) => None,
        }
    }

    pub fn as_document(&self) -> Option<&serde_json::Value> {
        match self {
            ConvertedMaterial::Document(d) => Some(d),
            ConvertedMaterial::Card(_) => None,
        }
    }
}

/// Exports a material to an external representation
pub trait Converter: std::fmt::Debug + Send + Sync {
    /// Key this converter is registered under
    fn name(&self) -> &str;

    fn convert(
        &self,
        material: &Material,
        conditions: &OperationalConditions,
    ) -> MatResult<ConvertedMaterial>;

    /// Serializable configuration, restored by a [`ConverterRegistry`] factory
    fn config(&self) -> serde_json::Value;
}

/// A material's converters, keyed by name
#[derive(Clone, Default)]
pub struct Converters {
    entries: BTreeMap<String, Arc<dyn Converter>>,
}

impl Converters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a converter, replacing any with the same name
    pub fn add(&mut self, converter: impl Converter + 'static) {
        self.add_shared(Arc::new(converter));
    }

    pub fn add_shared(&mut self, converter: Arc<dyn Converter>) {
        self.entries.insert(converter.name().to_string(), converter);
    }

    pub fn with(mut self, converter: impl Converter + 'static) -> Self {
        self.add(converter);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Converter>> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every converter's configuration, keyed by name
    pub fn configs(&self) -> BTreeMap<String, serde_json::Value> {
        self.entries.iter().map(|(k, c)| (k.clone(), c.config())).collect()
    }

    /// Union of both maps; entries already present win
    pub fn merged(mut self, other: &Converters) -> Converters {
        for (name, c) in &other.entries {
            self.entries.entry(name.clone()).or_insert_with(|| c.clone());
        }
        self
    }
}

impl std::fmt::Debug for Converters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.values()).finish()
    }
}

impl<C: Converter + 'static> From<C> for Converters {
    fn from(converter: C) -> Self {
        Converters::new().with(converter)
    }
}

// ============================================================================
// Material id sequence
// ============================================================================

/// Shared counter handing out fallback material ids, starting at 1
#[derive(Debug, Clone)]
pub struct MaterialIdSequence(Arc<AtomicU32>);

impl MaterialIdSequence {
    pub fn new() -> Self {
        MaterialIdSequence(Arc::new(AtomicU32::new(1)))
    }

    /// Take the next id
    pub fn next_id(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    /// The id the next call will return
    pub fn peek(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(1, Ordering::SeqCst);
    }
}

impl Default for MaterialIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Registry
// ============================================================================

type ConverterFactory =
    Box<dyn Fn(&serde_json::Value) -> MatResult<Arc<dyn Converter>> + Send + Sync>;

/// Named factories rebuilding converters from their configuration
pub struct ConverterRegistry {
    factories: BTreeMap<String, ConverterFactory>,
}

impl ConverterRegistry {
    /// A registry with no factories
    pub fn empty() -> Self {
        ConverterRegistry {
            factories: BTreeMap::new(),
        }
    }

    /// The built-in converters; MCNP converters draw ids from `sequence`
    pub fn with_builtins(sequence: MaterialIdSequence) -> Self {
        let mut registry = Self::empty();
        registry.register("mcnp", move |config| {
            let c: McnpConverter = serde_json::from_value(config.clone())?;
            Ok(Arc::new(c.with_sequence(sequence.clone())) as Arc<dyn Converter>)
        });
        registry.register("serpent", |config| {
            let c: SerpentConverter = serde_json::from_value(config.clone())?;
            Ok(Arc::new(c) as Arc<dyn Converter>)
        });
        registry.register("fispact", |config| {
            let c: FispactConverter = serde_json::from_value(config.clone())?;
            Ok(Arc::new(c) as Arc<dyn Converter>)
        });
        registry.register("json", |_| Ok(Arc::new(JsonExportConverter) as Arc<dyn Converter>));
        registry
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&serde_json::Value) -> MatResult<Arc<dyn Converter>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn build(&self, name: &str, config: &serde_json::Value) -> MatResult<Arc<dyn Converter>> {
        let factory = self.factories.get(name).ok_or_else(|| MatError::ConverterNotFound {
            name: name.to_string(),
            material: "<registry>".to_string(),
        })?;
        factory(config)
    }

    /// Rebuild a whole converter map
    pub fn build_all(
        &self,
        configs: &BTreeMap<String, serde_json::Value>,
    ) -> MatResult<Converters> {
        let mut converters = Converters::new();
        for (name, config) in configs {
            converters.add_shared(self.build(name, config)?);
        }
        Ok(converters)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins(MaterialIdSequence::new())
    }
}

// ============================================================================
// JSON export
// ============================================================================

/// Exports the evaluated material as a [`MaterialExport`](crate::material::MaterialExport) document
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExportConverter;

impl Converter for JsonExportConverter {
    fn name(&self) -> &str {
        "json"
    }

    fn convert(
        &self,
        material: &Material,
        conditions: &OperationalConditions,
    ) -> MatResult<ConvertedMaterial> {
        let export = material.export(conditions)?;
        Ok(ConvertedMaterial::Document(serde_json::to_value(export)?))
    }

    fn config(&self) -> serde_json::Value {
        serde_json::Value::Object(serde_json::Map::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::material;
    use crate::properties::props;

    #[test]
    fn test_sequence() {
        let seq = MaterialIdSequence::new();
        assert_eq!(seq.next_id(), 1);
        assert_eq!(seq.next_id(), 2);
        let shared = seq.clone();
        assert_eq!(shared.next_id(), 3);
        assert_eq!(seq.peek(), 4);
        seq.reset();
        assert_eq!(shared.next_id(), 1);
    }

    #[test]
    fn test_registry_roundtrip() {
        let converters = Converters::new()
            .with(McnpConverter::new().material_id(21).zaid_suffix(".80c"))
            .with(JsonExportConverter);
        let configs = converters.configs();
        let rebuilt = ConverterRegistry::default().build_all(&configs).unwrap();
        assert_eq!(rebuilt.names().collect::<Vec<_>>(), vec!["json", "mcnp"]);
        assert_eq!(rebuilt.configs(), configs);
    }

    #[test]
    fn test_unknown_converter() {
        let registry = ConverterRegistry::empty();
        assert_eq!(
            registry.build("openmc", &serde_json::Value::Null).unwrap_err().error_code(),
            "CONVERTER_NOT_FOUND"
        );
    }

    #[test]
    fn test_json_export() {
        let water = material("Water")
            .elements("H2O")
            .properties(props().density((1.0, "g/cm^3")).build().unwrap())
            .converter(JsonExportConverter)
            .build()
            .unwrap()
            .instantiate();
        let cond = OperationalConditions::new(300.0).unwrap();
        let doc = water.convert("json", &cond).unwrap();
        let doc = doc.as_document().unwrap();
        assert_eq!(doc["name"], "Water");
        assert_eq!(doc["properties"]["density"]["unit"], "kg/m^3");
    }
}
