//! # matprop_core - Material Property Modelling Engine
//!
//! `matprop_core` describes engineering materials as bundles of physical
//! properties evaluated against operating conditions (temperature, pressure,
//! magnetic field, strain, neutron damage and fluence), and combines
//! materials into weighted mixtures whose properties and chemical
//! composition follow from their constituents.
//!
//! ## Design Philosophy
//!
//! - **Unit-aware**: Every property has a canonical unit; compatible inputs are converted
//! - **Range-checked**: Properties declare a validity domain and refuse conditions outside it
//! - **Lazy mixtures**: Mixed properties evaluate the constituents on each call
//! - **Fail late**: Undefined properties are placeholders that only fail when called
//! - **Rich Errors**: Structured, serializable error types with stable codes
//!
//! ## Quick Start
//!
//! ```rust
//! use matprop_core::conditions::OperationalConditions;
//! use matprop_core::elements::FractionType;
//! use matprop_core::material::{material, mixture};
//! use matprop_core::properties::{props, PropertySource};
//!
//! let copper = material("Copper")
//!     .elements("Cu")
//!     .properties(
//!         props()
//!             .density((8.96, "g/cm^3"))
//!             .thermal_conductivity(PropertySource::function(|c| {
//!                 Ok(420.0 - c.temperature() * 0.07)
//!             }))
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap()
//!     .instantiate();
//!
//! let cond = OperationalConditions::new(vec![300.0, 400.0]).unwrap();
//! let k = copper.thermal_conductivity(&cond).unwrap();
//! assert_eq!(k.len(), 2);
//!
//! let water = material("Water")
//!     .elements("H2O")
//!     .properties(props().density((1.0, "g/cm^3")).build().unwrap())
//!     .build()
//!     .unwrap()
//!     .instantiate();
//!
//! let cooled = mixture("CooledCopper", [(copper, 0.9), (water, 0.1)], FractionType::Volume)
//!     .volume_conditions(OperationalConditions::new(300.0).unwrap())
//!     .build()
//!     .unwrap();
//! let rho = cooled.density(&OperationalConditions::new(300.0).unwrap()).unwrap();
//! assert!((rho.as_scalar().unwrap() - 8164.0).abs() < 1e-6);
//! ```
//!
//! ## Modules
//!
//! - [`value`] - Scalar or array numeric values with broadcasting arithmetic
//! - [`units`] - Unit parsing and conversion
//! - [`conditions`] - Operating conditions and property validity domains
//! - [`properties`] - Dependent, mixed and undefined properties, property groups
//! - [`elements`] - Chemical composition, formula parsing, periodic table
//! - [`material`] - Material builder, instances, mixtures and documents
//! - [`converters`] - Pluggable exporters (MCNP, Serpent, Fispact, JSON)
//! - [`references`] - Citations attached to materials and properties
//! - [`library`] - Ready-made materials
//! - [`errors`] - Structured error types
//! - [`file_io`] - Atomic saves and version-checked loads

pub mod conditions;
pub mod converters;
pub mod elements;
pub mod errors;
pub mod file_io;
pub mod library;
pub mod material;
pub mod properties;
pub mod references;
pub mod units;
pub mod value;

// Re-export commonly used types at crate root for convenience
pub use conditions::{ConditionConfig, OperationalConditions};
pub use elements::{Elements, FractionType};
pub use errors::{MatError, MatResult};
pub use file_io::{load_material, save_material};
pub use material::{material, mixture, Material, MaterialType};
pub use properties::{props, Listing, PropertyKind, PropertySource};
pub use value::Value;
