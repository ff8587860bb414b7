//! # Unit Service
//!
//! Parses unit expressions such as `"kg/m^3"`, `"J/g/K"` or `"W/(m*K)"` and
//! converts values between dimensionally compatible units.
//!
//! ## Design Philosophy
//!
//! We use a small hand-written unit table rather than a full units library because:
//! - Material data uses a bounded set of units (SI plus a few engineering ones)
//! - Units arrive as strings from data files and must round-trip as strings
//! - Conversion is a single scale (plus an offset for °C/°F), nothing more
//!
//! Every unit is described by a [`Dimension`] over six base quantities
//! (length, mass, time, temperature, current, amount) and a scale factor to
//! the SI base units. Offset units (`degC`, `degF`) only keep their offset
//! when used alone; inside compound units they act as temperature differences.
//!
//! ## Example
//!
//! ```rust
//! use matprop_core::units::convert_scalar;
//!
//! let rho = convert_scalar(5.0, "g/cm^3", "kg/m^3").unwrap();
//! assert!((rho - 5000.0).abs() < 1e-9);
//!
//! assert!(convert_scalar(1.0, "K", "Pa").is_err());
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{MatError, MatResult};
use crate::value::Value;

// ============================================================================
// Dimensions
// ============================================================================

const BASE_NAMES: [&str; 6] = ["length", "mass", "time", "temperature", "current", "substance"];

/// Exponents of the base quantities [length, mass, time, temperature, current, amount]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension(pub [i8; 6]);

impl Dimension {
    pub const NONE: Dimension = Dimension([0; 6]);

    fn pow(self, n: i8) -> Dimension {
        let mut out = self.0;
        for e in out.iter_mut() {
            *e *= n;
        }
        Dimension(out)
    }

    fn mul(self, other: Dimension) -> Dimension {
        let mut out = self.0;
        for (e, o) in out.iter_mut().zip(other.0) {
            *e += o;
        }
        Dimension(out)
    }

    /// True for a dimensionless quantity
    pub fn is_dimensionless(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }
        let part = |e: i8, name: &str| {
            if e == 1 {
                format!("[{}]", name)
            } else {
                format!("[{}]^{}", name, e)
            }
        };
        let num: Vec<String> = self
            .0
            .iter()
            .zip(BASE_NAMES)
            .filter(|(e, _)| **e > 0)
            .map(|(e, n)| part(*e, n))
            .collect();
        let den: Vec<String> = self
            .0
            .iter()
            .zip(BASE_NAMES)
            .filter(|(e, _)| **e < 0)
            .map(|(e, n)| part(-*e, n))
            .collect();
        let num = if num.is_empty() { "1".to_string() } else { num.join(" * ") };
        if den.is_empty() {
            write!(f, "{}", num)
        } else {
            write!(f, "{} / {}", num, den.join(" / "))
        }
    }
}

// ============================================================================
// Unit table
// ============================================================================

const L: Dimension = Dimension([1, 0, 0, 0, 0, 0]);
const M: Dimension = Dimension([0, 1, 0, 0, 0, 0]);
const TM: Dimension = Dimension([0, 0, 1, 0, 0, 0]);
const TH: Dimension = Dimension([0, 0, 0, 1, 0, 0]);
const I: Dimension = Dimension([0, 0, 0, 0, 1, 0]);
const N: Dimension = Dimension([0, 0, 0, 0, 0, 1]);
const AREA: Dimension = Dimension([2, 0, 0, 0, 0, 0]);
const VOLUME: Dimension = Dimension([3, 0, 0, 0, 0, 0]);
const FORCE: Dimension = Dimension([1, 1, -2, 0, 0, 0]);
const PRESSURE: Dimension = Dimension([-1, 1, -2, 0, 0, 0]);
const ENERGY: Dimension = Dimension([2, 1, -2, 0, 0, 0]);
const POWER: Dimension = Dimension([2, 1, -3, 0, 0, 0]);
const VOLTAGE: Dimension = Dimension([2, 1, -3, 0, -1, 0]);
const RESISTANCE: Dimension = Dimension([2, 1, -3, 0, -2, 0]);
const CHARGE: Dimension = Dimension([0, 0, 1, 0, 1, 0]);
const FLUX_DENSITY: Dimension = Dimension([0, 1, -2, 0, -1, 0]);
const FREQUENCY: Dimension = Dimension([0, 0, -1, 0, 0, 0]);

#[derive(Debug, Clone, Copy)]
struct UnitDef {
    dimension: Dimension,
    scale: f64,
    offset: f64,
}

const fn def(dimension: Dimension, scale: f64) -> UnitDef {
    UnitDef {
        dimension,
        scale,
        offset: 0.0,
    }
}

static UNIT_TABLE: Lazy<HashMap<&'static str, UnitDef>> = Lazy::new(|| {
    let mut t = HashMap::new();

    // Length
    t.insert("m", def(L, 1.0));
    t.insert("km", def(L, 1e3));
    t.insert("cm", def(L, 1e-2));
    t.insert("mm", def(L, 1e-3));
    t.insert("um", def(L, 1e-6));
    t.insert("µm", def(L, 1e-6));
    t.insert("nm", def(L, 1e-9));
    t.insert("angstrom", def(L, 1e-10));
    t.insert("in", def(L, 0.0254));
    t.insert("ft", def(L, 0.3048));

    // Mass
    t.insert("kg", def(M, 1.0));
    t.insert("g", def(M, 1e-3));
    t.insert("mg", def(M, 1e-6));
    t.insert("t", def(M, 1e3));
    t.insert("tonne", def(M, 1e3));
    t.insert("lb", def(M, 0.45359237));
    t.insert("amu", def(M, 1.660_539_066_60e-27));
    t.insert("u", def(M, 1.660_539_066_60e-27));
    t.insert("Da", def(M, 1.660_539_066_60e-27));

    // Time
    t.insert("s", def(TM, 1.0));
    t.insert("ms", def(TM, 1e-3));
    t.insert("us", def(TM, 1e-6));
    t.insert("min", def(TM, 60.0));
    t.insert("h", def(TM, 3600.0));
    t.insert("hr", def(TM, 3600.0));
    t.insert("day", def(TM, 86400.0));
    t.insert("year", def(TM, 3.155_76e7));

    // Temperature
    t.insert("K", def(TH, 1.0));
    t.insert("degK", def(TH, 1.0));
    t.insert("kelvin", def(TH, 1.0));
    t.insert("degR", def(TH, 5.0 / 9.0));
    t.insert(
        "degC",
        UnitDef {
            dimension: TH,
            scale: 1.0,
            offset: 273.15,
        },
    );
    t.insert(
        "celsius",
        UnitDef {
            dimension: TH,
            scale: 1.0,
            offset: 273.15,
        },
    );
    t.insert(
        "degF",
        UnitDef {
            dimension: TH,
            scale: 5.0 / 9.0,
            offset: 273.15 - 32.0 * 5.0 / 9.0,
        },
    );

    // Current and amount
    t.insert("A", def(I, 1.0));
    t.insert("mA", def(I, 1e-3));
    t.insert("kA", def(I, 1e3));
    t.insert("mol", def(N, 1.0));
    t.insert("kmol", def(N, 1e3));

    // Area and volume
    t.insert("barn", def(AREA, 1e-28));
    t.insert("L", def(VOLUME, 1e-3));
    t.insert("l", def(VOLUME, 1e-3));
    t.insert("mL", def(VOLUME, 1e-6));

    // Force and pressure
    t.insert("N", def(FORCE, 1.0));
    t.insert("kN", def(FORCE, 1e3));
    t.insert("MN", def(FORCE, 1e6));
    t.insert("Pa", def(PRESSURE, 1.0));
    t.insert("kPa", def(PRESSURE, 1e3));
    t.insert("MPa", def(PRESSURE, 1e6));
    t.insert("GPa", def(PRESSURE, 1e9));
    t.insert("bar", def(PRESSURE, 1e5));
    t.insert("mbar", def(PRESSURE, 1e2));
    t.insert("atm", def(PRESSURE, 101_325.0));
    t.insert("torr", def(PRESSURE, 101_325.0 / 760.0));
    t.insert("psi", def(PRESSURE, 6_894.757_293_168));
    t.insert("ksi", def(PRESSURE, 6_894_757.293_168));

    // Energy and power
    t.insert("J", def(ENERGY, 1.0));
    t.insert("kJ", def(ENERGY, 1e3));
    t.insert("MJ", def(ENERGY, 1e6));
    t.insert("cal", def(ENERGY, 4.184));
    t.insert("kcal", def(ENERGY, 4184.0));
    t.insert("eV", def(ENERGY, 1.602_176_634e-19));
    t.insert("keV", def(ENERGY, 1.602_176_634e-16));
    t.insert("MeV", def(ENERGY, 1.602_176_634e-13));
    t.insert("W", def(POWER, 1.0));
    t.insert("kW", def(POWER, 1e3));
    t.insert("MW", def(POWER, 1e6));

    // Electromagnetic
    t.insert("C", def(CHARGE, 1.0));
    t.insert("V", def(VOLTAGE, 1.0));
    t.insert("ohm", def(RESISTANCE, 1.0));
    t.insert("Ω", def(RESISTANCE, 1.0));
    t.insert("T", def(FLUX_DENSITY, 1.0));
    t.insert("mT", def(FLUX_DENSITY, 1e-3));
    t.insert("G", def(FLUX_DENSITY, 1e-4));
    t.insert("Hz", def(FREQUENCY, 1.0));

    // Dimensionless
    t.insert("dimensionless", def(Dimension::NONE, 1.0));
    t.insert("dpa", def(Dimension::NONE, 1.0));
    t.insert("count", def(Dimension::NONE, 1.0));
    t.insert("percent", def(Dimension::NONE, 0.01));
    t.insert("%", def(Dimension::NONE, 0.01));
    t.insert("ppm", def(Dimension::NONE, 1e-6));

    t
});

// ============================================================================
// Unit
// ============================================================================

/// A parsed unit: its original symbol, dimension and conversion to SI base units.
///
/// Serializes as its symbol string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Unit {
    symbol: String,
    dimension: Dimension,
    scale: f64,
    offset: f64,
}

impl Unit {
    /// Parse a unit expression
    pub fn parse(symbol: &str) -> MatResult<Unit> {
        let trimmed = symbol.trim();
        if trimmed.is_empty() {
            return Ok(Unit::dimensionless());
        }
        let tokens = tokenize(trimmed)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            source: trimmed,
        };
        let parsed = parser.expr()?;
        if parser.pos != tokens.len() {
            return Err(MatError::unknown_unit(trimmed, "unexpected trailing input"));
        }
        // offsets only survive for a lone offset unit like "degC"
        let offset = match (tokens.as_slice(), parsed.single) {
            ([Token::Ident(_)], Some(d)) => d.offset,
            _ => 0.0,
        };
        Ok(Unit {
            symbol: trimmed.to_string(),
            dimension: parsed.dimension,
            scale: parsed.scale,
            offset,
        })
    }

    /// The dimensionless unit
    pub fn dimensionless() -> Unit {
        Unit {
            symbol: String::new(),
            dimension: Dimension::NONE,
            scale: 1.0,
            offset: 0.0,
        }
    }

    /// The symbol this unit was parsed from
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Dimension of this unit
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// True if values can be converted between the two units
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// True if both units describe the same scale (e.g. "kg/m^3" and "g/L")
    pub fn is_equivalent(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
            && ((self.scale - other.scale).abs() <= 1e-12 * self.scale.abs().max(other.scale.abs()))
            && (self.offset - other.offset).abs() < 1e-12
    }

    /// Convert a value expressed in `self` into `to`
    pub fn convert(&self, value: &Value, to: &Unit) -> MatResult<Value> {
        if !self.is_compatible(to) {
            return Err(MatError::UnitConversion {
                from: self.display_symbol().to_string(),
                to: to.display_symbol().to_string(),
                from_dimension: self.dimension.to_string(),
                to_dimension: to.dimension.to_string(),
            });
        }
        if self.is_equivalent(to) {
            return Ok(value.clone());
        }
        let (s1, o1, s2, o2) = (self.scale, self.offset, to.scale, to.offset);
        Ok(value.map(|x| (x * s1 + o1 - o2) / s2))
    }

    fn display_symbol(&self) -> &str {
        if self.symbol.is_empty() {
            "dimensionless"
        } else {
            &self.symbol
        }
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.is_equivalent(other)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl TryFrom<String> for Unit {
    type Error = MatError;
    fn try_from(s: String) -> MatResult<Self> {
        Unit::parse(&s)
    }
}

impl From<Unit> for String {
    fn from(u: Unit) -> String {
        u.symbol
    }
}

impl std::str::FromStr for Unit {
    type Err = MatError;
    fn from_str(s: &str) -> MatResult<Self> {
        Unit::parse(s)
    }
}

/// Convert `value` from one unit expression to another
pub fn convert(value: impl Into<Value>, from: &str, to: &str) -> MatResult<Value> {
    Unit::parse(from)?.convert(&value.into(), &Unit::parse(to)?)
}

/// Convert a single number from one unit expression to another
pub fn convert_scalar(value: f64, from: &str, to: &str) -> MatResult<f64> {
    let out = convert(value, from, to)?;
    out.as_scalar()
        .ok_or_else(|| MatError::invalid_input("value", out.to_string(), "expected a scalar"))
}

// ============================================================================
// Quantity input
// ============================================================================

/// A value with an optional unit, as supplied by callers.
///
/// A missing unit means "already in the canonical unit" of whatever the
/// quantity is assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Quantity {
    /// Create a quantity with an explicit unit
    pub fn new(value: impl Into<Value>, unit: impl Into<String>) -> Self {
        Quantity {
            value: value.into(),
            unit: Some(unit.into()),
        }
    }

    /// Convert to `target`, treating a missing unit as `target` itself
    pub fn to_unit(&self, target: &Unit) -> MatResult<Value> {
        match &self.unit {
            None => Ok(self.value.clone()),
            Some(u) => Unit::parse(u)?.convert(&self.value, target),
        }
    }
}

impl From<Value> for Quantity {
    fn from(value: Value) -> Self {
        Quantity { value, unit: None }
    }
}

impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        Quantity {
            value: value.into(),
            unit: None,
        }
    }
}

impl From<Vec<f64>> for Quantity {
    fn from(value: Vec<f64>) -> Self {
        Quantity {
            value: value.into(),
            unit: None,
        }
    }
}

impl<const K: usize> From<[f64; K]> for Quantity {
    fn from(value: [f64; K]) -> Self {
        Quantity {
            value: value.into(),
            unit: None,
        }
    }
}

impl From<(f64, &str)> for Quantity {
    fn from((value, unit): (f64, &str)) -> Self {
        Quantity::new(value, unit)
    }
}

impl From<(Vec<f64>, &str)> for Quantity {
    fn from((value, unit): (Vec<f64>, &str)) -> Self {
        Quantity::new(value, unit)
    }
}

impl<const K: usize> From<([f64; K], &str)> for Quantity {
    fn from((value, unit): ([f64; K], &str)) -> Self {
        Quantity::new(value, unit)
    }
}

// ============================================================================
// Parser
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Mul,
    Div,
    Pow,
    LParen,
    RParen,
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '%' | '°' | 'µ' | 'Ω')
}

fn tokenize(s: &str) -> MatResult<Vec<Token>> {
    let chars: Vec<char> = s.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' => {
                // whitespace between two operands is an implicit product
                let after_operand = matches!(
                    tokens.last(),
                    Some(Token::Ident(_) | Token::Number(_) | Token::RParen)
                );
                if after_operand {
                    let mut j = i;
                    while j < chars.len() && chars[j] == ' ' {
                        j += 1;
                    }
                    if j < chars.len() && (chars[j].is_alphabetic() || chars[j] == '(') {
                        tokens.push(Token::Mul);
                    }
                    i = j;
                    continue;
                }
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Pow);
                i += 2;
            }
            '*' | '·' | '.' => {
                tokens.push(Token::Mul);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Div);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Pow);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| MatError::unknown_unit(s, format!("bad number '{}'", text)))?;
                tokens.push(Token::Number(n));
            }
            c if is_symbol_char(c) => {
                let start = i;
                while i < chars.len() && is_symbol_char(chars[i]) {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => {
                return Err(MatError::unknown_unit(s, format!("unexpected character '{}'", other)));
            }
        }
    }
    Ok(tokens)
}

struct Parsed {
    dimension: Dimension,
    scale: f64,
    /// The unit definition when the expression is a single symbol
    single: Option<UnitDef>,
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expr(&mut self) -> MatResult<Parsed> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Mul) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = Parsed {
                        dimension: acc.dimension.mul(rhs.dimension),
                        scale: acc.scale * rhs.scale,
                        single: None,
                    };
                }
                Some(Token::Div) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = Parsed {
                        dimension: acc.dimension.mul(rhs.dimension.pow(-1)),
                        scale: acc.scale / rhs.scale,
                        single: None,
                    };
                }
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> MatResult<Parsed> {
        let base = self.factor()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            let exp = match self.peek() {
                Some(Token::Number(n)) if n.fract() == 0.0 => *n as i8,
                _ => {
                    return Err(MatError::unknown_unit(self.source, "exponent must be an integer"));
                }
            };
            self.pos += 1;
            return Ok(Parsed {
                dimension: base.dimension.pow(exp),
                scale: base.scale.powi(exp as i32),
                single: None,
            });
        }
        Ok(base)
    }

    fn factor(&mut self) -> MatResult<Parsed> {
        match self.peek().cloned() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                let d = UNIT_TABLE
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| {
                        MatError::unknown_unit(self.source, format!("unknown symbol '{}'", name))
                    })?;
                Ok(Parsed {
                    dimension: d.dimension,
                    scale: d.scale,
                    single: Some(d),
                })
            }
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(Parsed {
                    dimension: Dimension::NONE,
                    scale: n,
                    single: None,
                })
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.expr()?;
                if self.peek() != Some(&Token::RParen) {
                    return Err(MatError::unknown_unit(self.source, "unbalanced parentheses"));
                }
                self.pos += 1;
                Ok(Parsed { single: None, ..inner })
            }
            _ => Err(MatError::unknown_unit(self.source, "expected a unit symbol")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_density_conversion() {
        assert_relative_eq!(
            convert_scalar(5.0, "g/cm^3", "kg/m^3").unwrap(),
            5000.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            convert_scalar(1.0, "kg/m^3", "g/cm^3").unwrap(),
            1e-3,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_compound_division_chain() {
        // J/g/K == J/(g*K)
        assert_relative_eq!(
            convert_scalar(1.0, "J/g/K", "J/(kg*K)").unwrap(),
            1000.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            convert_scalar(1.0, "J/g/K", "J kg^-1 K^-1").unwrap(),
            1000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_temperature_offsets() {
        assert_relative_eq!(
            convert_scalar(20.0, "degC", "K").unwrap(),
            293.15,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            convert_scalar(373.15, "K", "degC").unwrap(),
            100.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            convert_scalar(212.0, "degF", "degC").unwrap(),
            100.0,
            max_relative = 1e-9
        );
        // compound temperature units are differences
        assert_relative_eq!(
            convert_scalar(1.0, "1/degC", "1/K").unwrap(),
            1.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_incompatible_units() {
        let err = convert_scalar(1.0, "K", "Pa").unwrap_err();
        match err {
            MatError::UnitConversion { from_dimension, to_dimension, .. } => {
                assert_eq!(from_dimension, "[temperature]");
                assert_eq!(to_dimension, "[mass] / [length] / [time]^2");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unknown_symbol() {
        assert!(matches!(Unit::parse("furlong"), Err(MatError::UnknownUnit { .. })));
        assert!(matches!(Unit::parse("kg/(m"), Err(MatError::UnknownUnit { .. })));
    }

    #[test]
    fn test_dimensionless() {
        let u = Unit::parse("").unwrap();
        assert!(u.dimension().is_dimensionless());
        assert_eq!(Unit::parse("dpa").unwrap(), u);
        assert_relative_eq!(convert_scalar(50.0, "percent", "").unwrap(), 0.5);
    }

    #[test]
    fn test_pressure_and_field() {
        assert_relative_eq!(convert_scalar(1.0, "atm", "Pa").unwrap(), 101_325.0);
        assert_relative_eq!(convert_scalar(100.0, "kPa", "Pa").unwrap(), 1e5);
        assert_relative_eq!(convert_scalar(1e4, "G", "T").unwrap(), 1.0);
        assert_relative_eq!(convert_scalar(1.0, "1/cm^2", "1/m^2").unwrap(), 1e4);
    }

    #[test]
    fn test_equivalence() {
        assert_eq!(Unit::parse("kg/m^3").unwrap(), Unit::parse("g/L").unwrap());
        assert_eq!(Unit::parse("W/(m*K)").unwrap(), Unit::parse("W m^-1 K^-1").unwrap());
        assert_ne!(Unit::parse("kg/m^3").unwrap(), Unit::parse("g/cm^3").unwrap());
    }

    #[test]
    fn test_serialization() {
        let u = Unit::parse("kg/m^3").unwrap();
        let json = serde_json::to_string(&u).unwrap();
        assert_eq!(json, "\"kg/m^3\"");
        let back: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, u);
    }

    #[test]
    fn test_array_conversion() {
        let v = convert(vec![0.0, 100.0], "degC", "K").unwrap();
        assert_eq!(v, Value::Array(vec![273.15, 373.15]));
    }
}
