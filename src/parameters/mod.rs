//! # Parameter System
//!
//! Named real-valued fit parameters and the canonical collection a model owns.
//!
//! ## Core Components
//!
//! - [`Parameter`]: name, value, uncertainty, fixed flag and optional bounds
//! - [`Parameters`]: the authoritative name -> parameter map of a model
//! - [`Bounds`]: closed interval constraining a parameter
//!
//! ## Example Usage
//!
//! ```rust
//! use dalitz_rs::parameters::{Parameter, Parameters};
//!
//! let mut params = Parameters::new();
//! params.add_param("rho_mass", 0.775).unwrap();
//! params.add_param_with_bounds("rho_width", 0.149, 0.0, 1.0).unwrap();
//! params.add(Parameter::fixed("f0_mass", 0.98)).unwrap();
//!
//! // Only free parameters are handed to the minimiser
//! assert_eq!(params.free_names(), vec!["rho_mass", "rho_width"]);
//! ```

pub mod bounds;
pub mod parameter;
pub mod parameters;


// Re-export key types
pub use bounds::{Bounds, BoundsError};
pub use parameter::{Parameter, ParameterError};
pub use parameters::{Parameters, SerializationError};
