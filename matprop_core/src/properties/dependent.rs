//! # Dependent Physical Properties
//!
//! A dependent property is a value that is a function of operating
//! conditions: a constant, a lookup table over one condition, or a closure.
//!
//! ## Evaluation
//!
//! Every call runs the same steps:
//! 1. Check the conditions against the validity domain
//! 2. Re-express the conditions in the domain's units
//! 3. Evaluate the source, passing the owning material when the source asks for it
//! 4. Convert the result from the declared unit to the output unit
//!
//! The output unit is the kind's canonical unit for vocabulary properties
//! and the declared unit for custom ones. Constants are converted once, at
//! construction.
//!
//! ## Example
//!
//! ```rust
//! use matprop_core::conditions::OperationalConditions;
//! use matprop_core::properties::{DependentPhysicalProperty, PropertyKind, PropertySource};
//!
//! let rho = DependentPhysicalProperty::with_unit(PropertyKind::Density, 5.0, "g/cm^3").unwrap();
//! let cond = OperationalConditions::new(300.0).unwrap();
//! let value = rho.evaluate(None, &cond).unwrap();
//! assert!((value.as_scalar().unwrap() - 5000.0).abs() < 1e-9);
//!
//! let k = DependentPhysicalProperty::new(
//!     PropertyKind::ThermalConductivity,
//!     PropertySource::function(|c| Ok(9.248 + c.temperature() * 1.571e-2)),
//! )
//! .unwrap();
//! assert!(k.evaluate(None, &cond).is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::conditions::{ConditionConfig, OperationalConditions};
use crate::errors::{MatError, MatResult};
use crate::material::Material;
use crate::properties::independent::Condition;
use crate::properties::PropertyKind;
use crate::references::References;
use crate::units::{Quantity, Unit};
use crate::value::Value;

/// Uniform signature of every property function: `(owner, conditions)`
pub type PropertyFn =
    Arc<dyn Fn(Option<&Material>, &OperationalConditions) -> MatResult<Value> + Send + Sync>;

// ============================================================================
// Sources
// ============================================================================

/// Where a dependent property's value comes from
#[derive(Clone)]
pub enum PropertySource {
    Constant(Value),
    /// Piecewise-linear table over one condition, clamped at both ends
    Table {
        condition: Condition,
        points: Vec<(f64, f64)>,
    },
    Function {
        f: PropertyFn,
        /// Pass the owning material as the first argument
        needs_owner: bool,
    },
}

impl PropertySource {
    /// A function of the operating conditions only
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&OperationalConditions) -> MatResult<Value> + Send + Sync + 'static,
    {
        PropertySource::Function {
            f: Arc::new(move |_, cond| f(cond)),
            needs_owner: false,
        }
    }

    /// A function of the owning material and the operating conditions
    pub fn with_owner<F>(f: F) -> Self
    where
        F: Fn(&Material, &OperationalConditions) -> MatResult<Value> + Send + Sync + 'static,
    {
        PropertySource::Function {
            f: Arc::new(move |owner, cond| match owner {
                Some(m) => f(m, cond),
                None => Err(MatError::invalid_input(
                    "owner",
                    "none",
                    "property function requires its owning material",
                )),
            }),
            needs_owner: true,
        }
    }

    /// A lookup table; `x` values must be strictly increasing
    pub fn table(condition: Condition, points: Vec<(f64, f64)>) -> MatResult<Self> {
        if points.is_empty() {
            return Err(MatError::invalid_input("table", "[]", "table needs at least one point"));
        }
        if points.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(MatError::invalid_input(
                "table",
                format!("{} points", points.len()),
                "table x values must be strictly increasing",
            ));
        }
        Ok(PropertySource::Table { condition, points })
    }

    pub fn is_function(&self) -> bool {
        matches!(self, PropertySource::Function { .. })
    }
}

impl std::fmt::Debug for PropertySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertySource::Constant(v) => write!(f, "Constant({})", v),
            PropertySource::Table { condition, points } => {
                write!(f, "Table({}, {} points)", condition, points.len())
            }
            PropertySource::Function { needs_owner, .. } => {
                write!(f, "Function(needs_owner={})", needs_owner)
            }
        }
    }
}

impl From<f64> for PropertySource {
    fn from(v: f64) -> Self {
        PropertySource::Constant(v.into())
    }
}

impl From<Vec<f64>> for PropertySource {
    fn from(v: Vec<f64>) -> Self {
        PropertySource::Constant(v.into())
    }
}

impl From<Value> for PropertySource {
    fn from(v: Value) -> Self {
        PropertySource::Constant(v)
    }
}

fn interpolate(points: &[(f64, f64)], x: f64) -> f64 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return f64::NAN,
    };
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }
    if x.is_nan() {
        return f64::NAN;
    }
    let i = points.partition_point(|p| p.0 <= x).clamp(1, points.len() - 1);
    let (x0, y0) = points[i - 1];
    let (x1, y1) = points[i];
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Stored data (constants, tables) moves to `to`; functions keep `from` and convert on evaluation
fn rebase(source: PropertySource, from: Unit, to: &Unit) -> MatResult<(PropertySource, Unit)> {
    match source {
        PropertySource::Constant(v) => {
            Ok((PropertySource::Constant(from.convert(&v, to)?), to.clone()))
        }
        PropertySource::Table { condition, points } => {
            let y = Value::Array(points.iter().map(|p| p.1).collect());
            let y = from.convert(&y, to)?;
            let points = points.iter().zip(y.iter()).map(|(p, y)| (p.0, y)).collect();
            Ok((PropertySource::table(condition, points)?, to.clone()))
        }
        other => Ok((other, from)),
    }
}

// ============================================================================
// DependentPhysicalProperty
// ============================================================================

/// A named, unit-tagged property evaluated against operating conditions
#[derive(Debug, Clone)]
pub struct DependentPhysicalProperty {
    kind: PropertyKind,
    source: PropertySource,
    /// Unit the source produces
    unit: Unit,
    /// Unit every evaluation is returned in
    output_unit: Unit,
    domain: ConditionConfig,
    reference: Option<References>,
}

impl DependentPhysicalProperty {
    /// Property whose source produces the kind's canonical unit.
    ///
    /// Custom kinds have no canonical unit and must use [`Self::with_unit`].
    pub fn new(kind: PropertyKind, source: impl Into<PropertySource>) -> MatResult<Self> {
        let unit = kind.canonical_unit().ok_or_else(|| {
            MatError::invalid_input(
                kind.name(),
                "no unit",
                format!("No unit provided for extra property '{}'", kind.name()),
            )
        })?;
        Self::with_unit(kind, source, unit)
    }

    /// Property whose source produces values in `unit`
    pub fn with_unit(
        kind: PropertyKind,
        source: impl Into<PropertySource>,
        unit: &str,
    ) -> MatResult<Self> {
        let unit = Unit::parse(unit)?;
        let output_unit = match kind.canonical_unit() {
            Some(canonical) => {
                let canonical = Unit::parse(canonical)?;
                if !unit.is_compatible(&canonical) {
                    return Err(MatError::invalid_input(
                        kind.name(),
                        unit.symbol(),
                        format!(
                            "unit is not compatible with '{}' ({})",
                            canonical.symbol(),
                            canonical.dimension()
                        ),
                    ));
                }
                canonical
            }
            None => unit.clone(),
        };
        let (source, unit) = rebase(source.into(), unit, &output_unit)?;
        Ok(DependentPhysicalProperty {
            kind,
            source,
            unit,
            output_unit,
            domain: ConditionConfig::default(),
            reference: None,
        })
    }

    /// Set the validity domain
    pub fn with_domain(mut self, domain: ConditionConfig) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<References>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn source(&self) -> &PropertySource {
        &self.source
    }

    /// Unit the source produces
    pub fn source_unit(&self) -> &Unit {
        &self.unit
    }

    /// Unit evaluations are returned in
    pub fn unit(&self) -> &Unit {
        &self.output_unit
    }

    pub fn domain(&self) -> &ConditionConfig {
        &self.domain
    }

    pub fn reference(&self) -> Option<&References> {
        self.reference.as_ref()
    }

    /// True if evaluation passes the owning material to the source
    pub fn needs_owner(&self) -> bool {
        matches!(self.source, PropertySource::Function { needs_owner: true, .. })
    }

    /// The same property under another name (unit family must match)
    pub(crate) fn retag(mut self, kind: PropertyKind) -> MatResult<Self> {
        if self.kind == kind {
            return Ok(self);
        }
        if let Some(canonical) = kind.canonical_unit() {
            let canonical = Unit::parse(canonical)?;
            if !canonical.is_compatible(&self.output_unit) {
                return Err(MatError::invalid_input(
                    kind.name(),
                    self.output_unit.symbol(),
                    format!("property of kind '{}' cannot be used as '{}'", self.kind, kind),
                ));
            }
            let placeholder = PropertySource::Constant(Value::default());
            let source = std::mem::replace(&mut self.source, placeholder);
            let (source, unit) = rebase(source, self.unit.clone(), &canonical)?;
            self.source = source;
            self.unit = unit;
            self.output_unit = canonical;
        }
        self.kind = kind;
        Ok(self)
    }

    /// Evaluate in the output unit
    pub fn evaluate(
        &self,
        owner: Option<&Material>,
        conditions: &OperationalConditions,
    ) -> MatResult<Value> {
        self.domain.check(conditions)?;
        let raw = match &self.source {
            PropertySource::Constant(v) => return Ok(v.clone()),
            PropertySource::Table { condition, points } => {
                let local = conditions.expressed_in(&self.domain)?;
                let x = local.require(*condition)?;
                if x.any(f64::is_nan) {
                    return Err(MatError::invalid_input(
                        condition.name(),
                        x.to_string(),
                        "table lookup needs a numeric condition value",
                    ));
                }
                x.map(|x| interpolate(points, x))
            }
            PropertySource::Function { f, needs_owner } => {
                let local = conditions.expressed_in(&self.domain)?;
                f(if *needs_owner { owner } else { None }, &local)?
            }
        };
        self.unit.convert(&raw, &self.output_unit)
    }

    /// Evaluate and convert to `unit`
    pub fn value_as(
        &self,
        owner: Option<&Material>,
        conditions: &OperationalConditions,
        unit: &str,
    ) -> MatResult<Value> {
        let value = self.evaluate(owner, conditions)?;
        self.output_unit.convert(&value, &Unit::parse(unit)?)
    }

    /// Serializable form; function-valued properties have none
    pub fn to_document(&self) -> MatResult<PropertyDocument> {
        let source = match &self.source {
            PropertySource::Constant(v) => SourceDocument::Constant { value: v.clone() },
            PropertySource::Table { condition, points } => SourceDocument::Table {
                condition: *condition,
                points: points.clone(),
            },
            PropertySource::Function { .. } => {
                return Err(MatError::not_implemented(format!(
                    "serialisation of function-valued property '{}'",
                    self.kind
                )));
            }
        };
        Ok(PropertyDocument {
            unit: self.unit.clone(),
            source,
            domain: self.domain.clone(),
            reference: self.reference.clone(),
        })
    }
}

impl PartialEq for DependentPhysicalProperty {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind
            || self.output_unit != other.output_unit
            || self.domain != other.domain
        {
            return false;
        }
        match (&self.source, &other.source) {
            (PropertySource::Constant(a), PropertySource::Constant(b)) => a.allclose(b),
            (
                PropertySource::Table { condition: c1, points: p1 },
                PropertySource::Table { condition: c2, points: p2 },
            ) => c1 == c2 && p1 == p2,
            (PropertySource::Function { f: f1, .. }, PropertySource::Function { f: f2, .. }) => {
                Arc::ptr_eq(f1, f2)
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for DependentPhysicalProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            PropertySource::Constant(v) => write!(f, "{}({} {})", self.kind, v, self.output_unit),
            _ => write!(f, "{}({:?} -> {})", self.kind, self.source, self.output_unit),
        }
    }
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDocument {
    Constant { value: Value },
    Table { condition: Condition, points: Vec<(f64, f64)> },
}

/// Serialized form of a constant or tabulated dependent property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDocument {
    pub unit: Unit,
    pub source: SourceDocument,
    #[serde(default, skip_serializing_if = "ConditionConfig::is_empty")]
    pub domain: ConditionConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<References>,
}

impl PropertyDocument {
    /// Rebuild the property under `kind`
    pub fn into_property(self, kind: PropertyKind) -> MatResult<DependentPhysicalProperty> {
        let source = match self.source {
            SourceDocument::Constant { value } => PropertySource::Constant(value),
            SourceDocument::Table { condition, points } => {
                PropertySource::table(condition, points)?
            }
        };
        let mut dpp = DependentPhysicalProperty::with_unit(kind, source, self.unit.symbol())?
            .with_domain(self.domain);
        dpp.reference = self.reference;
        Ok(dpp)
    }
}

// ============================================================================
// Undefined sentinel
// ============================================================================

/// Marks a property slot that exists on a material but has no value.
///
/// The optional message says why (e.g. which mixture constituent lacked it).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndefinedProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UndefinedProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        UndefinedProperty {
            message: Some(message.into()),
        }
    }

    /// Evaluating an undefined property always fails
    pub fn evaluate(&self, kind: &PropertyKind, material: &str) -> MatResult<Value> {
        Err(MatError::undefined_property(kind.name(), material, self.message.clone()))
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Anything that can be installed into a property slot
#[derive(Debug, Clone)]
pub enum PropertyInput {
    Dependent(DependentPhysicalProperty),
    Constant(Quantity),
    Source(PropertySource),
    SourceWithUnit(PropertySource, String),
    Undefined(UndefinedProperty),
}

impl PropertyInput {
    /// Resolve into a property of `kind`
    pub fn into_dependent(
        self,
        kind: &PropertyKind,
    ) -> MatResult<Option<DependentPhysicalProperty>> {
        let no_unit = || {
            MatError::invalid_input(
                kind.name(),
                "no unit",
                format!("No unit provided for extra property '{}'", kind.name()),
            )
        };
        Ok(Some(match self {
            PropertyInput::Undefined(_) => return Ok(None),
            PropertyInput::Dependent(d) => d.retag(kind.clone())?,
            PropertyInput::Constant(q) => match (&q.unit, kind.canonical_unit()) {
                (Some(u), _) => DependentPhysicalProperty::with_unit(kind.clone(), q.value, u)?,
                (None, Some(_)) => DependentPhysicalProperty::new(kind.clone(), q.value)?,
                (None, None) => return Err(no_unit()),
            },
            PropertyInput::Source(s) => {
                if kind.is_custom() {
                    return Err(no_unit());
                }
                DependentPhysicalProperty::new(kind.clone(), s)?
            }
            PropertyInput::SourceWithUnit(s, u) => {
                DependentPhysicalProperty::with_unit(kind.clone(), s, &u)?
            }
        }))
    }
}

impl From<DependentPhysicalProperty> for PropertyInput {
    fn from(d: DependentPhysicalProperty) -> Self {
        PropertyInput::Dependent(d)
    }
}

impl From<UndefinedProperty> for PropertyInput {
    fn from(u: UndefinedProperty) -> Self {
        PropertyInput::Undefined(u)
    }
}

impl From<PropertySource> for PropertyInput {
    fn from(s: PropertySource) -> Self {
        PropertyInput::Source(s)
    }
}

impl From<(PropertySource, &str)> for PropertyInput {
    fn from((s, unit): (PropertySource, &str)) -> Self {
        PropertyInput::SourceWithUnit(s, unit.to_string())
    }
}

impl From<Quantity> for PropertyInput {
    fn from(q: Quantity) -> Self {
        PropertyInput::Constant(q)
    }
}

impl From<f64> for PropertyInput {
    fn from(v: f64) -> Self {
        PropertyInput::Constant(v.into())
    }
}

impl From<Vec<f64>> for PropertyInput {
    fn from(v: Vec<f64>) -> Self {
        PropertyInput::Constant(v.into())
    }
}

impl From<(f64, &str)> for PropertyInput {
    fn from(q: (f64, &str)) -> Self {
        PropertyInput::Constant(q.into())
    }
}

impl From<(Vec<f64>, &str)> for PropertyInput {
    fn from(q: (Vec<f64>, &str)) -> Self {
        PropertyInput::Constant(q.into())
    }
}
