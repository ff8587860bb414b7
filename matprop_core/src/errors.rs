//! # Error Types
//!
//! Structured error types for matprop_core. Every failure names the thing that
//! went wrong (the property, the condition, the unit, the material) so that a
//! caller can report it or act on it programmatically.
//!
//! ## Example
//!
//! ```rust
//! use matprop_core::errors::{MatError, MatResult};
//!
//! fn validate_fraction(fraction: f64) -> MatResult<()> {
//!     if fraction < 0.0 {
//!         return Err(MatError::invalid_input(
//!             "fraction",
//!             fraction.to_string(),
//!             "Fraction must be non-negative",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for matprop_core operations
pub type MatResult<T> = Result<T, MatError>;

/// Structured error type for material operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum MatError {
    /// An input value is malformed (fraction out of range, mismatched array lengths, ...)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A unit symbol is not known to the unit service
    #[error("Unknown unit '{unit}': {reason}")]
    UnknownUnit { unit: String, reason: String },

    /// Two units are dimensionally incompatible
    #[error("Cannot convert from '{from}' ({from_dimension}) to '{to}' ({to_dimension})")]
    UnitConversion {
        from: String,
        to: String,
        from_dimension: String,
        to_dimension: String,
    },

    /// An operating condition lies outside a property's validity domain
    #[error("Operating condition '{condition}' ({value} {unit}) {bound} bound {limit} {unit}")]
    OutOfRange {
        condition: String,
        value: f64,
        /// "lower than lower" or "higher than upper"
        bound: String,
        limit: f64,
        unit: String,
    },

    /// A property exists on the material schema but has no value
    #[error(
        "Property '{property}' is undefined on material '{material}'{}",
        detail_suffix(.detail)
    )]
    UndefinedProperty {
        property: String,
        material: String,
        detail: Option<String>,
    },

    /// A property is not part of the material schema at all
    #[error("Material '{material}' has no property '{property}'")]
    MissingProperty { property: String, material: String },

    /// Mixture composition could not be resolved
    #[error("Composition error: {reason}")]
    Composition { reason: String },

    /// Deliberate gap in functionality
    #[error("Not implemented: {feature}")]
    NotImplemented { feature: String },

    /// No converter registered under the requested name
    #[error("Converter '{name}' not found on material '{material}'")]
    ConverterNotFound { name: String, material: String },

    /// A converter failed to produce its representation
    #[error("Conversion with '{converter}' failed: {reason}")]
    Conversion { converter: String, reason: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(" ({})", d),
        None => String::new(),
    }
}

impl MatError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        MatError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownUnit error
    pub fn unknown_unit(unit: impl Into<String>, reason: impl Into<String>) -> Self {
        MatError::UnknownUnit {
            unit: unit.into(),
            reason: reason.into(),
        }
    }

    /// Create an UndefinedProperty error
    pub fn undefined_property(
        property: impl Into<String>,
        material: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        MatError::UndefinedProperty {
            property: property.into(),
            material: material.into(),
            detail,
        }
    }

    /// Create a MissingProperty error
    pub fn missing_property(property: impl Into<String>, material: impl Into<String>) -> Self {
        MatError::MissingProperty {
            property: property.into(),
            material: material.into(),
        }
    }

    /// Create a Composition error
    pub fn composition(reason: impl Into<String>) -> Self {
        MatError::Composition {
            reason: reason.into(),
        }
    }

    /// Create a NotImplemented error
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        MatError::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Create a Conversion error
    pub fn conversion(converter: impl Into<String>, reason: impl Into<String>) -> Self {
        MatError::Conversion {
            converter: converter.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        MatError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        MatError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            MatError::InvalidInput { .. } => "INVALID_INPUT",
            MatError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            MatError::UnitConversion { .. } => "UNIT_CONVERSION",
            MatError::OutOfRange { .. } => "OUT_OF_RANGE",
            MatError::UndefinedProperty { .. } => "UNDEFINED_PROPERTY",
            MatError::MissingProperty { .. } => "MISSING_PROPERTY",
            MatError::Composition { .. } => "COMPOSITION_ERROR",
            MatError::NotImplemented { .. } => "NOT_IMPLEMENTED",
            MatError::ConverterNotFound { .. } => "CONVERTER_NOT_FOUND",
            MatError::Conversion { .. } => "CONVERSION_ERROR",
            MatError::SerializationError { .. } => "SERIALIZATION_ERROR",
            MatError::FileError { .. } => "FILE_ERROR",
            MatError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for MatError {
    fn from(e: serde_json::Error) -> Self {
        MatError::serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = MatError::invalid_input("fraction", "-0.5", "Fraction must be non-negative");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: MatError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(MatError::composition("x").error_code(), "COMPOSITION_ERROR");
        assert_eq!(
            MatError::undefined_property("density", "Steel", None).error_code(),
            "UNDEFINED_PROPERTY"
        );
    }

    #[test]
    fn test_undefined_message_names_property_and_material() {
        let err = MatError::undefined_property("density", "Water", Some("not set on 'Ice'".into()));
        let msg = err.to_string();
        assert!(msg.contains("density"));
        assert!(msg.contains("Water"));
        assert!(msg.contains("not set on 'Ice'"));
    }

    #[test]
    fn test_out_of_range_message() {
        let err = MatError::OutOfRange {
            condition: "temperature".into(),
            value: 250.0,
            bound: "lower than lower".into(),
            limit: 300.0,
            unit: "K".into(),
        };
        assert_eq!(
            err.to_string(),
            "Operating condition 'temperature' (250 K) lower than lower bound 300 K"
        );
    }
}
