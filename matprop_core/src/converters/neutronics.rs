//! Neutronics material cards: MCNP6, Serpent and Fispact.
//!
//! Every card expands natural elements into isotopes and reports density in
//! g/cm^3. Numbers are written in scientific notation with a signed,
//! two-digit exponent (`6.66666667e-01`), as the transport codes expect.

use serde::{Deserialize, Serialize};

use crate::conditions::OperationalConditions;
use crate::converters::{ConvertedMaterial, Converter, MaterialIdSequence};
use crate::elements::Elements;
use crate::errors::{MatError, MatResult};
use crate::material::Material;
use crate::properties::PropertyKind;
use crate::units::{Quantity, Unit};

/// Avogadro constant (1/mol)
pub const N_AVOGADRO: f64 = 6.02214076e23;

/// Basis of the fractions written into a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentType {
    #[default]
    Atomic,
    Mass,
}

impl PercentType {
    /// Separator before a fraction; MCNP and Serpent mark mass fractions negative
    fn prefix(self) -> &'static str {
        match self {
            PercentType::Atomic => "  ",
            PercentType::Mass => " -",
        }
    }
}

fn default_decimal_places() -> usize {
    8
}

/// Scientific notation with a sign and at least two exponent digits
pub fn format_exponent(value: f64, decimal_places: usize, uppercase: bool) -> String {
    let raw = format!("{:.*e}", decimal_places, value);
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(d) => ('-', d),
        None => ('+', exponent),
    };
    let e = if uppercase { 'E' } else { 'e' };
    format!("{}{}{}{:0>2}", mantissa, e, sign, digits)
}

fn mass_density(
    material: &Material,
    conditions: &OperationalConditions,
    converter: &str,
) -> MatResult<f64> {
    let rho = material
        .property(PropertyKind::Density)?
        .value_as(conditions, "g/cm^3")?;
    rho.as_scalar().ok_or_else(|| {
        MatError::conversion(
            converter,
            "Material cards need a single density, evaluate at scalar conditions",
        )
    })
}

/// (zaid, fraction) pairs of the material's isotopes
fn nuclide_fractions(elements: &Elements, percent_type: PercentType) -> Vec<(String, f64)> {
    let nuclides = elements.nuclides();
    let fractions = match percent_type {
        PercentType::Atomic => nuclides.atomic_fractions(),
        PercentType::Mass => nuclides.mass_fractions(),
    };
    nuclides
        .iter()
        .map(|(name, e)| (e.nuclide.zaid(), fractions.get(name).copied().unwrap_or(0.0)))
        .collect()
}

fn isotope_entry(
    zaid: &str,
    fraction: f64,
    suffix: &str,
    percent_type: PercentType,
    places: usize,
) -> String {
    format!(
        "{}{}{}{}",
        zaid,
        suffix,
        percent_type.prefix(),
        format_exponent(fraction, places, false)
    )
}

fn finish_card(mut lines: Vec<String>, additional_end_lines: &[String]) -> String {
    lines.extend(additional_end_lines.iter().cloned());
    let mut card = lines.join("\n");
    card.push('\n');
    card
}

// ============================================================================
// MCNP
// ============================================================================

/// MCNP6 material card writer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McnpConverter {
    /// Card number; drawn from the id sequence when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<u32>,
    /// Nuclear data library suffix, e.g. `.31c`
    #[serde(default)]
    pub zaid_suffix: String,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,
    #[serde(default)]
    pub percent_type: PercentType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_end_lines: Vec<String>,
    #[serde(skip)]
    sequence: MaterialIdSequence,
}

impl McnpConverter {
    /// Converter with its own id sequence starting at 1.
    ///
    /// Without [`Self::material_id`] every converter built this way writes
    /// `M1`; give materials that share an input deck one sequence through
    /// [`Self::with_sequence`].
    pub fn new() -> Self {
        McnpConverter {
            material_id: None,
            zaid_suffix: String::new(),
            decimal_places: default_decimal_places(),
            percent_type: PercentType::Atomic,
            additional_end_lines: Vec::new(),
            sequence: MaterialIdSequence::new(),
        }
    }

    pub fn material_id(mut self, id: u32) -> Self {
        self.material_id = Some(id);
        self
    }

    pub fn zaid_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.zaid_suffix = suffix.into();
        self
    }

    pub fn percent_type(mut self, percent_type: PercentType) -> Self {
        self.percent_type = percent_type;
        self
    }

    pub fn additional_end_lines(mut self, lines: Vec<String>) -> Self {
        self.additional_end_lines = lines;
        self
    }

    /// Draw fallback ids from a shared sequence
    pub fn with_sequence(mut self, sequence: MaterialIdSequence) -> Self {
        self.sequence = sequence;
        self
    }
}

impl Default for McnpConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter for McnpConverter {
    fn name(&self) -> &str {
        "mcnp"
    }

    fn convert(
        &self,
        material: &Material,
        conditions: &OperationalConditions,
    ) -> MatResult<ConvertedMaterial> {
        let rho = mass_density(material, conditions, self.name())?;
        let nuclides = nuclide_fractions(material.elements(), self.percent_type);
        let Some(((first_zaid, first_fraction), rest)) = nuclides.split_first() else {
            return Err(MatError::conversion(
                self.name(),
                format!("'{}' has no elements", material.name()),
            ));
        };
        let id = self.material_id.unwrap_or_else(|| self.sequence.next_id());
        let places = self.decimal_places;

        let entry = |zaid: &str, fraction: f64| {
            isotope_entry(zaid, fraction, &self.zaid_suffix, self.percent_type, places)
        };

        let mut lines = vec![
            format!(
                "c     {} density {} g/cm3",
                material.name(),
                format_exponent(rho, places, false)
            ),
            format!("M{:<5}{}", id, entry(first_zaid, *first_fraction)),
        ];
        lines.extend(
            rest.iter()
                .map(|(zaid, fraction)| format!("      {}", entry(zaid, *fraction))),
        );
        Ok(ConvertedMaterial::Card(finish_card(lines, &self.additional_end_lines)))
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// ============================================================================
// Serpent
// ============================================================================

/// Serpent `mat` card writer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerpentConverter {
    #[serde(default)]
    pub zaid_suffix: String,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,
    #[serde(default)]
    pub percent_type: PercentType,
    /// Write the evaluation temperature as `tmp`
    #[serde(default)]
    pub temperature_to_neutronics_code: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_end_lines: Vec<String>,
}

impl SerpentConverter {
    pub fn new() -> Self {
        SerpentConverter {
            decimal_places: default_decimal_places(),
            ..Default::default()
        }
    }

    pub fn zaid_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.zaid_suffix = suffix.into();
        self
    }

    pub fn percent_type(mut self, percent_type: PercentType) -> Self {
        self.percent_type = percent_type;
        self
    }

    pub fn with_temperature(mut self) -> Self {
        self.temperature_to_neutronics_code = true;
        self
    }
}

impl Converter for SerpentConverter {
    fn name(&self) -> &str {
        "serpent"
    }

    fn convert(
        &self,
        material: &Material,
        conditions: &OperationalConditions,
    ) -> MatResult<ConvertedMaterial> {
        let rho = mass_density(material, conditions, self.name())?;
        let places = self.decimal_places;
        let mut header = format!(
            "mat {} -{}",
            material.name(),
            format_exponent(rho.abs(), places, false)
        );
        if self.temperature_to_neutronics_code {
            let t = conditions.temperature();
            if t.is_array() && t.len() != 1 {
                return Err(MatError::conversion(
                    self.name(),
                    "Only singular temperature value can be passed into neutronics material",
                ));
            }
            if let Some(t) = t.as_scalar() {
                header.push_str(&format!(" tmp {:?}", t));
            }
        }
        let mut lines = vec![header];
        lines.extend(
            nuclide_fractions(material.elements(), self.percent_type)
                .iter()
                .map(|(zaid, fraction)| {
                    format!(
                        "      {}",
                        isotope_entry(zaid, *fraction, &self.zaid_suffix, self.percent_type, places)
                    )
                }),
        );
        Ok(ConvertedMaterial::Card(finish_card(lines, &self.additional_end_lines)))
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// ============================================================================
// Fispact
// ============================================================================

/// Fispact `DENSITY` / `FUEL` card writer for a given material volume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FispactConverter {
    /// Material volume (m^3)
    pub volume: f64,
    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_end_lines: Vec<String>,
}

impl FispactConverter {
    /// Converter for `volume` (bare numbers are m^3)
    pub fn new(volume: impl Into<Quantity>) -> MatResult<Self> {
        let volume = volume
            .into()
            .to_unit(&Unit::parse("m^3")?)?
            .as_scalar()
            .ok_or_else(|| {
                MatError::invalid_input("volume", "array", "volume must be a single value")
            })?;
        Ok(FispactConverter {
            volume,
            decimal_places: default_decimal_places(),
            additional_end_lines: Vec::new(),
        })
    }
}

impl Converter for FispactConverter {
    fn name(&self) -> &str {
        "fispact"
    }

    fn convert(
        &self,
        material: &Material,
        conditions: &OperationalConditions,
    ) -> MatResult<ConvertedMaterial> {
        let rho = mass_density(material, conditions, self.name())?;
        let volume_cm3 = crate::units::convert_scalar(self.volume, "m^3", "cm^3")?;
        let nuclides = material.elements().nuclides();
        // atoms per cm^3 of the whole material
        let atoms_cm3 = N_AVOGADRO * rho / nuclides.mean_atomic_mass();
        let places = self.decimal_places;

        let mut lines = vec![
            format!("DENSITY {}", format_exponent(rho, places, true)),
            format!("FUEL {}", nuclides.len()),
        ];
        lines.extend(nuclides.iter().map(|(name, e)| {
            format!(
                "{}  {}",
                name,
                format_exponent(volume_cm3 * atoms_cm3 * e.fraction, places, true)
            )
        }));
        Ok(ConvertedMaterial::Card(finish_card(lines, &self.additional_end_lines)))
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::material;
    use crate::properties::props;
    use approx::assert_relative_eq;

    fn water() -> Material {
        material("Water")
            .elements("H2O")
            .properties(props().density((1.0, "g/cm^3")).build().unwrap())
            .build()
            .unwrap()
            .instantiate()
    }

    fn cond() -> OperationalConditions {
        OperationalConditions::new(300.0).unwrap()
    }

    fn card(converter: &dyn Converter, m: &Material) -> String {
        converter.convert(m, &cond()).unwrap().as_card().unwrap().to_string()
    }

    #[test]
    fn test_format_exponent() {
        assert_eq!(format_exponent(0.66657, 8, false), "6.66570000e-01");
        assert_eq!(format_exponent(1.0, 8, false), "1.00000000e+00");
        assert_eq!(format_exponent(1.5e23, 3, true), "1.500E+23");
        assert_eq!(format_exponent(2.0e-120, 2, false), "2.00e-120");
    }

    #[test]
    fn test_mcnp_card() {
        let mcnp = McnpConverter::new().material_id(21).zaid_suffix(".80c");
        let text = card(&mcnp, &water());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "c     Water density 1.00000000e+00 g/cm3");
        assert!(lines[1].starts_with("M21   001001.80c  "));
        assert_eq!(lines.len(), 2 + 4);
        assert!(text.ends_with('\n'));

        let o16 = lines.iter().find(|l| l.trim_start().starts_with("008016")).unwrap();
        let fraction: f64 = o16.split_whitespace().last().unwrap().parse().unwrap();
        assert_relative_eq!(fraction, 0.3325238, max_relative = 1e-6);
    }

    #[test]
    fn test_mcnp_mass_fractions_are_negative() {
        let mcnp = McnpConverter::new().material_id(1).percent_type(PercentType::Mass);
        let text = card(&mcnp, &water());
        assert!(text.lines().nth(1).unwrap().starts_with("M1    001001 -"));
    }

    #[test]
    fn test_mcnp_ids_from_sequence() {
        let seq = MaterialIdSequence::new();
        let mcnp = McnpConverter::new().with_sequence(seq.clone());
        let w = water();
        assert!(card(&mcnp, &w).lines().nth(1).unwrap().starts_with("M1 "));
        assert!(card(&mcnp, &w).lines().nth(1).unwrap().starts_with("M2 "));
        seq.reset();
        assert!(card(&mcnp, &w).lines().nth(1).unwrap().starts_with("M1 "));
    }

    #[test]
    fn test_mcnp_converters_share_ids_only_through_a_sequence() {
        let w = water();
        let id_line = |c: &McnpConverter| card(c, &w).lines().nth(1).unwrap().to_string();
        let (a, b) = (McnpConverter::new(), McnpConverter::new());
        assert!(id_line(&a).starts_with("M1 "));
        assert!(id_line(&b).starts_with("M1 "));

        let seq = MaterialIdSequence::new();
        let a = McnpConverter::new().with_sequence(seq.clone());
        let b = McnpConverter::new().with_sequence(seq);
        assert!(id_line(&a).starts_with("M1 "));
        assert!(id_line(&b).starts_with("M2 "));
    }

    #[test]
    fn test_serpent_card() {
        let serpent = SerpentConverter::new().with_temperature();
        let text = card(&serpent, &water());
        assert_eq!(text.lines().next().unwrap(), "mat Water -1.00000000e+00 tmp 300.0");

        let arrays = OperationalConditions::new(vec![300.0, 400.0]).unwrap();
        let err = serpent.convert(&water(), &arrays).unwrap_err();
        assert_eq!(err.error_code(), "CONVERSION_ERROR");
    }

    #[test]
    fn test_fispact_card() {
        let fispact = FispactConverter::new((1.0, "cm^3")).unwrap();
        let text = card(&fispact, &water());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "DENSITY 1.00000000E+00");
        assert_eq!(lines[1], "FUEL 5");

        let total: f64 = lines[2..]
            .iter()
            .map(|l| l.split_whitespace().last().unwrap().parse::<f64>().unwrap())
            .sum();
        let molecules = N_AVOGADRO / (2.0 * 1.00794 + 15.9994);
        assert_relative_eq!(total, 3.0 * molecules, max_relative = 1e-4);
    }

    #[test]
    fn test_missing_density() {
        let m = material("Bare").elements("Fe").build().unwrap().instantiate();
        let err = McnpConverter::new().convert(&m, &cond()).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_PROPERTY");
    }
}
