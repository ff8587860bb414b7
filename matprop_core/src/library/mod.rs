//! # Material Library
//!
//! Ready-made material types built with the public builders.
//!
//! ## Materials
//!
//! - **Fluids**: D-D and D-T plasmas, saturated liquid water, void
//! - **Steel**: SS316L (Choong 1975 correlations), SS316LN density table
//!
//! ## Example
//!
//! ```rust
//! use matprop_core::conditions::OperationalConditions;
//! use matprop_core::library::steel;
//!
//! let steel = steel::ss316l().unwrap().instantiate();
//! let cond = OperationalConditions::new(500.0).unwrap();
//! let k = steel.thermal_conductivity(&cond).unwrap();
//! assert!((k.as_scalar().unwrap() - 17.103).abs() < 1e-9);
//! ```

pub mod fluids;
pub mod references;
pub mod steel;

pub use fluids::{dd_plasma, dt_plasma, void, water};
pub use steel::{ss316l, ss316ln_density};
