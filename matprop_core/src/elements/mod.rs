//! # Elements
//!
//! Chemical composition of a material: nuclides and their fractions.
//!
//! Compositions are always stored as **atomic** fractions. Mass-fraction
//! input is converted on construction, and mass or volume views are computed
//! on demand.
//!
//! ## Naming
//!
//! Keys are element symbols (`Fe`) for natural elements and symbol plus mass
//! number (`Li6`, `H2`) for isotopes. A string passed where a composition is
//! expected is a chemical formula, so `"H2"` there means two hydrogen atoms,
//! while the key `"H2"` in a fraction map means deuterium.
//!
//! ## Example
//!
//! ```rust
//! use matprop_core::elements::{Elements, FractionType};
//!
//! let water = Elements::from_formula("H2O").unwrap();
//! assert!((water.fraction("H") - 2.0 / 3.0).abs() < 1e-12);
//!
//! let steel = [("Fe", 0.7), ("Cr", 0.2), ("Ni", 0.1)];
//! let steel = Elements::from_fractions(steel, FractionType::Mass).unwrap();
//! assert!((steel.mass_fractions()["Fe"] - 0.7).abs() < 1e-12);
//! ```

pub mod formula;
pub mod periodic_table;

pub use formula::parse_formula;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{MatError, MatResult};

/// Basis in which fractions are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractionType {
    Atomic,
    Mass,
    Volume,
}

impl std::fmt::Display for FractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FractionType::Atomic => "atomic",
            FractionType::Mass => "mass",
            FractionType::Volume => "volume",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Nuclide
// ============================================================================

/// A natural element or a specific isotope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nuclide {
    symbol: String,
    z: u32,
    mass_number: Option<u32>,
}

impl Nuclide {
    /// Parse `Fe`, `H2`, `Li6`, `U235`
    pub fn parse(name: &str) -> MatResult<Nuclide> {
        let name = name.trim();
        let split = name.find(|c: char| c.is_ascii_digit()).unwrap_or(name.len());
        let (symbol, digits) = name.split_at(split);
        let z = periodic_table::atomic_number(symbol)
            .ok_or_else(|| MatError::invalid_input("element", name, "unknown element symbol"))?;
        let mass_number = if digits.is_empty() {
            None
        } else {
            match digits.parse::<u32>() {
                Ok(a) if a >= z => Some(a),
                _ => return Err(MatError::invalid_input("element", name, "invalid mass number")),
            }
        };
        Ok(Nuclide {
            symbol: symbol.to_string(),
            z,
            mass_number,
        })
    }

    fn isotope(symbol: &str, z: u32, mass_number: u32) -> Nuclide {
        Nuclide {
            symbol: symbol.to_string(),
            z,
            mass_number: Some(mass_number),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn z(&self) -> u32 {
        self.z
    }

    pub fn mass_number(&self) -> Option<u32> {
        self.mass_number
    }

    pub fn is_isotope(&self) -> bool {
        self.mass_number.is_some()
    }

    /// Key used in compositions
    pub fn name(&self) -> String {
        match self.mass_number {
            Some(a) => format!("{}{}", self.symbol, a),
            None => self.symbol.clone(),
        }
    }

    /// Isotope mass, or standard atomic weight for a natural element (amu)
    pub fn atomic_mass(&self) -> f64 {
        match self.mass_number {
            Some(a) => periodic_table::isotope_mass(&self.symbol, a),
            None => periodic_table::standard_weight(&self.symbol).unwrap_or(self.z as f64),
        }
    }

    /// ZZZAAA identifier, with AAA = 000 for a natural element
    pub fn zaid(&self) -> String {
        format!("{:03}{:03}", self.z, self.mass_number.unwrap_or(0))
    }
}

impl std::fmt::Display for Nuclide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One nuclide with its atomic fraction
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFraction {
    pub nuclide: Nuclide,
    pub fraction: f64,
}

impl ElementFraction {
    pub fn new(element: &str, fraction: f64) -> MatResult<Self> {
        Ok(ElementFraction {
            nuclide: Nuclide::parse(element)?,
            fraction,
        })
    }
}

// ============================================================================
// Elements
// ============================================================================

/// Atomic-fraction composition keyed by nuclide name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct Elements {
    entries: BTreeMap<String, ElementFraction>,
}

impl Elements {
    /// Composition from a chemical formula
    pub fn from_formula(formula: &str) -> MatResult<Elements> {
        let counts = parse_formula(formula)?;
        let total: f64 = counts.values().sum();
        Elements::from_fractions(
            counts.into_iter().map(|(k, n)| (k, n / total)),
            FractionType::Atomic,
        )
    }

    /// Equal atomic fractions of each named nuclide
    pub fn from_symbols<I, S>(symbols: I) -> MatResult<Elements>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = symbols.into_iter().map(|s| s.as_ref().to_string()).collect();
        let n = names.len() as f64;
        Elements::from_fractions(names.into_iter().map(|s| (s, 1.0 / n)), FractionType::Atomic)
    }

    /// Composition from `(nuclide, fraction)` pairs on an atomic or mass basis
    pub fn from_fractions<I, S>(fractions: I, fraction_type: FractionType) -> MatResult<Elements>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        for (name, fraction) in fractions {
            entries.push(ElementFraction::new(name.as_ref(), fraction)?);
        }
        validate_fractions(&entries)?;
        match fraction_type {
            FractionType::Atomic => Elements::from_element_fractions(entries),
            FractionType::Mass => {
                let total: f64 = entries.iter().map(|e| e.fraction).sum();
                if !is_close_to_one(total) {
                    tracing::warn!(total, "Mass fractions do not sum to 1, normalising");
                }
                let moles: Vec<ElementFraction> = entries
                    .into_iter()
                    .map(|e| ElementFraction {
                        fraction: e.fraction / e.nuclide.atomic_mass(),
                        nuclide: e.nuclide,
                    })
                    .collect();
                Ok(Elements::normalised(moles))
            }
            FractionType::Volume => Err(MatError::invalid_input(
                "fraction_type",
                "volume",
                "volume fractions need element densities, \
                 use volume_fraction_to_mass_fraction first",
            )),
        }
    }

    /// Composition from atomic element fractions, renormalised with a warning
    /// if they do not sum to 1
    pub fn from_element_fractions(entries: Vec<ElementFraction>) -> MatResult<Elements> {
        validate_fractions(&entries)?;
        let total: f64 = entries.iter().map(|e| e.fraction).sum();
        if !is_close_to_one(total) {
            tracing::warn!(total, "Element fractions do not sum to 1, normalising");
        }
        Ok(Elements::normalised(entries))
    }

    /// Normalise without validation or logging; duplicate names are summed
    pub(crate) fn normalised(entries: impl IntoIterator<Item = ElementFraction>) -> Elements {
        let mut merged: BTreeMap<String, ElementFraction> = BTreeMap::new();
        for e in entries {
            merged
                .entry(e.nuclide.name())
                .and_modify(|existing| existing.fraction += e.fraction)
                .or_insert(e);
        }
        let total: f64 = merged.values().map(|e| e.fraction).sum();
        if total > 0.0 && total != 1.0 {
            for e in merged.values_mut() {
                e.fraction /= total;
            }
        }
        Elements { entries: merged }
    }

    /// Build from an atomic-fraction map of trusted names
    pub(crate) fn from_atomic_map(map: BTreeMap<String, f64>) -> MatResult<Elements> {
        let mut entries = Vec::with_capacity(map.len());
        for (name, fraction) in map {
            entries.push(ElementFraction::new(&name, fraction)?);
        }
        Ok(Elements::normalised(entries))
    }

    pub fn get(&self, name: &str) -> Option<&ElementFraction> {
        self.entries.get(name)
    }

    /// Atomic fraction of `name` (0 if absent)
    pub fn fraction(&self, name: &str) -> f64 {
        self.entries.get(name).map(|e| e.fraction).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElementFraction)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn atomic_fractions(&self) -> BTreeMap<String, f64> {
        self.entries.iter().map(|(k, e)| (k.clone(), e.fraction)).collect()
    }

    /// Mean atomic mass (amu)
    pub fn mean_atomic_mass(&self) -> f64 {
        self.entries.values().map(|e| e.fraction * e.nuclide.atomic_mass()).sum()
    }

    pub fn mass_fractions(&self) -> BTreeMap<String, f64> {
        let total = self.mean_atomic_mass();
        self.entries
            .iter()
            .map(|(k, e)| (k.clone(), e.fraction * e.nuclide.atomic_mass() / total))
            .collect()
    }

    /// Natural elements expanded into their isotopes.
    ///
    /// Elements without tabulated abundances stay as natural elements.
    pub fn nuclides(&self) -> Elements {
        let mut expanded = Vec::new();
        for e in self.entries.values() {
            let isotopes = periodic_table::natural_isotopes(e.nuclide.symbol());
            if e.nuclide.is_isotope() || isotopes.is_empty() {
                expanded.push(e.clone());
                continue;
            }
            for iso in isotopes {
                expanded.push(ElementFraction {
                    nuclide: Nuclide::isotope(e.nuclide.symbol(), e.nuclide.z(), iso.mass_number),
                    fraction: e.fraction * iso.abundance,
                });
            }
        }
        Elements::normalised(expanded)
    }

    /// Volume fractions given per-element densities (any consistent unit)
    pub fn volume_fractions(
        &self,
        densities: &BTreeMap<String, f64>,
    ) -> MatResult<BTreeMap<String, f64>> {
        mass_fraction_to_volume_fraction(&self.mass_fractions(), densities)
    }
}

fn is_close_to_one(total: f64) -> bool {
    (total - 1.0).abs() <= 1e-8 + 1e-5
}

fn validate_fractions(entries: &[ElementFraction]) -> MatResult<()> {
    for e in entries {
        if e.fraction > 1.0 {
            return Err(MatError::invalid_input(
                e.nuclide.name(),
                e.fraction.to_string(),
                "Element fraction greater than 1",
            ));
        }
        if e.fraction < 0.0 || !e.fraction.is_finite() {
            return Err(MatError::invalid_input(
                e.nuclide.name(),
                e.fraction.to_string(),
                "Element fraction must be non-negative",
            ));
        }
    }
    if entries.is_empty() {
        return Err(MatError::invalid_input("elements", "[]", "composition has no elements"));
    }
    Ok(())
}

/// `vf_i = (w_i / rho_i) / sum_j (w_j / rho_j)`
pub fn mass_fraction_to_volume_fraction(
    mass_fractions: &BTreeMap<String, f64>,
    densities: &BTreeMap<String, f64>,
) -> MatResult<BTreeMap<String, f64>> {
    reweight(mass_fractions, densities, |w, rho| w / rho)
}

/// `w_i = (vf_i * rho_i) / sum_j (vf_j * rho_j)`
pub fn volume_fraction_to_mass_fraction(
    volume_fractions: &BTreeMap<String, f64>,
    densities: &BTreeMap<String, f64>,
) -> MatResult<BTreeMap<String, f64>> {
    reweight(volume_fractions, densities, |vf, rho| vf * rho)
}

fn reweight(
    fractions: &BTreeMap<String, f64>,
    densities: &BTreeMap<String, f64>,
    f: impl Fn(f64, f64) -> f64,
) -> MatResult<BTreeMap<String, f64>> {
    let mut weighted = BTreeMap::new();
    for (name, fraction) in fractions {
        let rho = densities
            .get(name)
            .copied()
            .filter(|rho| *rho > 0.0)
            .ok_or_else(|| {
                MatError::invalid_input(
                    name,
                    "no density",
                    "a positive density is required per element",
                )
            })?;
        weighted.insert(name.clone(), f(*fraction, rho));
    }
    let total: f64 = weighted.values().sum();
    Ok(weighted.into_iter().map(|(k, v)| (k, v / total)).collect())
}

impl TryFrom<BTreeMap<String, f64>> for Elements {
    type Error = MatError;
    fn try_from(map: BTreeMap<String, f64>) -> MatResult<Self> {
        Elements::from_fractions(map, FractionType::Atomic)
    }
}

impl From<Elements> for BTreeMap<String, f64> {
    fn from(e: Elements) -> Self {
        e.atomic_fractions()
    }
}

impl std::fmt::Display for Elements {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(k, e)| format!("{}: {}", k, e.fraction))
            .collect();
        write!(f, "Elements({})", parts.join(", "))
    }
}

// ============================================================================
// Builder input
// ============================================================================

/// The accepted ways of describing a composition
#[derive(Debug, Clone)]
pub enum ElementsInput {
    Formula(String),
    Symbols(Vec<String>),
    Fractions(Vec<(String, f64)>, FractionType),
    Elements(Elements),
}

impl ElementsInput {
    pub fn resolve(self) -> MatResult<Elements> {
        match self {
            ElementsInput::Formula(f) => Elements::from_formula(&f),
            ElementsInput::Symbols(s) => Elements::from_symbols(s),
            ElementsInput::Fractions(f, fraction_type) => {
                Elements::from_fractions(f, fraction_type)
            }
            ElementsInput::Elements(e) => Ok(e),
        }
    }
}

impl From<&str> for ElementsInput {
    fn from(formula: &str) -> Self {
        ElementsInput::Formula(formula.to_string())
    }
}

impl From<Vec<&str>> for ElementsInput {
    fn from(symbols: Vec<&str>) -> Self {
        ElementsInput::Symbols(symbols.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[(&str, f64); N]> for ElementsInput {
    fn from(fractions: [(&str, f64); N]) -> Self {
        ElementsInput::Fractions(
            fractions.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            FractionType::Atomic,
        )
    }
}

impl<const N: usize> From<([(&str, f64); N], FractionType)> for ElementsInput {
    fn from((fractions, fraction_type): ([(&str, f64); N], FractionType)) -> Self {
        ElementsInput::Fractions(
            fractions.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            fraction_type,
        )
    }
}

impl From<Elements> for ElementsInput {
    fn from(e: Elements) -> Self {
        ElementsInput::Elements(e)
    }
}

impl From<ElementFraction> for ElementsInput {
    fn from(e: ElementFraction) -> Self {
        ElementsInput::Elements(Elements::normalised([e]))
    }
}
