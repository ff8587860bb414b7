//! Superconducting parameterisations.
//!
//! A parameterisation is a named set of fit constants (critical field,
//! critical temperature, strain exponents, ...) taken from the literature.
//! Materials forward lookups to it through
//! [`Material::superconducting_parameter`](crate::material::Material::superconducting_parameter).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{MatError, MatResult};
use crate::references::References;

/// Named fit constants of a critical-surface parameterisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuperconductingParameterisation {
    pub name: String,
    pub parameters: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<References>,
}

impl SuperconductingParameterisation {
    pub fn new<I, S>(name: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        SuperconductingParameterisation {
            name: name.into(),
            parameters: parameters.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<References>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Bottura-Nb3Sn strain-dependent scaling constants
    #[allow(clippy::too_many_arguments)]
    pub fn bottura_nb3sn(
        constant: f64,
        p: f64,
        q: f64,
        c_a1: f64,
        c_a2: f64,
        eps_0a: f64,
        eps_m: f64,
        b_c20m: f64,
        t_c0max: f64,
    ) -> Self {
        Self::new(
            "bottura_nb3sn",
            [
                ("constant", constant),
                ("p", p),
                ("q", q),
                ("c_a1", c_a1),
                ("c_a2", c_a2),
                ("eps_0a", eps_0a),
                ("eps_m", eps_m),
                ("b_c20m", b_c20m),
                ("t_c0max", t_c0max),
            ],
        )
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    /// Names that can be forwarded from a material
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }
}

/// Superconducting slot of a property group
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Superconductor {
    #[default]
    Undefined,
    Defined(SuperconductingParameterisation),
}

impl Superconductor {
    pub fn is_defined(&self) -> bool {
        matches!(self, Superconductor::Defined(_))
    }

    pub fn parameterisation(&self) -> Option<&SuperconductingParameterisation> {
        match self {
            Superconductor::Defined(p) => Some(p),
            Superconductor::Undefined => None,
        }
    }

    /// Look up one parameter, failing if the slot is undefined or the name unknown
    pub fn parameter(&self, name: &str, material: &str) -> MatResult<f64> {
        match self {
            Superconductor::Undefined => Err(MatError::undefined_property(
                "superconducting_parameterisation",
                material,
                None,
            )),
            Superconductor::Defined(p) => p.parameter(name).ok_or_else(|| {
                let path = format!("superconducting_parameterisation.{}", name);
                MatError::missing_property(path, material)
            }),
        }
    }
}

impl From<SuperconductingParameterisation> for Superconductor {
    fn from(p: SuperconductingParameterisation) -> Self {
        Superconductor::Defined(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nb3sn() -> SuperconductingParameterisation {
        SuperconductingParameterisation::bottura_nb3sn(
            1.0e10, 0.593, 2.156, 50.06, 0.0, 0.00312, 0.00095, 33.24, 16.34,
        )
    }

    #[test]
    fn test_parameter_lookup() {
        let sc = Superconductor::from(nb3sn());
        assert_eq!(sc.parameter("t_c0max", "Nb3Sn").unwrap(), 16.34);
        assert_eq!(sc.parameter("b_c0", "Nb3Sn").unwrap_err().error_code(), "MISSING_PROPERTY");
        assert_eq!(
            Superconductor::Undefined.parameter("p", "Copper").unwrap_err().error_code(),
            "UNDEFINED_PROPERTY"
        );
    }

    #[test]
    fn test_parameter_names() {
        let p = nb3sn();
        let names: Vec<&str> = p.parameter_names().collect();
        assert_eq!(names.len(), 9);
        assert!(names.contains(&"eps_m"));
    }

    #[test]
    fn test_serialization() {
        let sc = Superconductor::from(nb3sn());
        let json = serde_json::to_string(&sc).unwrap();
        let back: Superconductor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sc);
        let undefined = serde_json::to_string(&Superconductor::Undefined).unwrap();
        assert_eq!(undefined, r#"{"state":"undefined"}"#);
    }
}
