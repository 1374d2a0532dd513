//! # dalitz-rs
//!
//! `dalitz-rs` builds closed-form three-body decay amplitudes out of named
//! parameters, complex coefficients and resonance propagators, and evaluates
//! them fast enough to sit inside a likelihood fit.
//!
//! The library provides:
//! - Expressions written with ordinary operators and stored as flat postfix
//!   token streams, evaluated with a single stack pass
//! - Propagation of parameter values from a canonical map into every copy held
//!   by the expressions
//! - A normalization cache that recomputes the phase-space integral only where
//!   a free shape parameter can have changed it
//! - A negative log-likelihood objective for an external minimiser, and toy
//!   event generation
//!
//! ## Basic Usage
//!
//! ```
//! use dalitz_rs::coefficient::Coefficient;
//! use dalitz_rs::kinematics::{Channel, DalitzKinematics};
//! use dalitz_rs::model::DalitzModel;
//! use dalitz_rs::normalization::{NormalizationCache, NormalizationConfig};
//! use dalitz_rs::resonance::{BreitWigner, NonResonant, Resonance};
//!
//! let kin = DalitzKinematics::new(1.86484, [0.497611, 0.13957, 0.13957]).unwrap();
//! let mut model = DalitzModel::new(kin);
//! let rho = Resonance::from(BreitWigner::new("rho", 0.775, 0.149, Channel::M23));
//! model.add_term("rho", Coefficient::polar("c_rho", 1.0, 0.0), rho).unwrap();
//! model.add_term("nr", Coefficient::cartesian("c_nr", 0.3, 0.1), NonResonant::new("nr")).unwrap();
//!
//! let mut cache = NormalizationCache::new(&model, NormalizationConfig::new().with_bins(50)).unwrap();
//! let norm = cache.refresh(&model).unwrap();
//! assert!(norm > 0.0);
//! ```

pub mod error;

pub mod parameters;

pub mod coefficient;
pub mod expression;
pub mod kinematics;
pub mod resonance;

pub mod model;
pub mod normalization;
pub mod propagation;

pub mod events;
pub mod session;

#[cfg(feature = "toy")]
pub mod toy;

// Re-exports for convenience
pub use error::{DalitzError, Result};

pub use coefficient::Coefficient;
pub use expression::{AmplitudeExpression, ComplexExpression, Operation, RealExpression};
pub use kinematics::{Channel, DalitzKinematics, DalitzPoint};
pub use model::{ConjugateRule, DalitzModel};
pub use normalization::{CacheState, NormalizationCache, NormalizationConfig};
pub use parameters::{Parameter, Parameters};
pub use propagation::{ParameterSource, Propagate};
pub use resonance::{BreitWigner, NonResonant, Resonance};
pub use session::{FitSession, NllObjective, Objective, SessionConfig};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
