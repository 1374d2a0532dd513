//! Postfix expressions over parameters, coefficients and resonances
//!
//! Expressions are linearised into a [`TokenStream`] while they are built with
//! ordinary arithmetic operators, and evaluated afterwards with one stack pass.
//!
//! ```
//! use dalitz_rs::coefficient::Coefficient;
//! use dalitz_rs::kinematics::{Channel, DalitzKinematics};
//! use dalitz_rs::resonance::{BreitWigner, Resonance};
//!
//! let kin = DalitzKinematics::new(1.86484, [0.497611, 0.13957, 0.13957]).unwrap();
//! let rho = Resonance::from(BreitWigner::new("rho", 0.775, 0.149, Channel::M23));
//! let amp = Coefficient::polar("c_rho", 1.0, 0.0) * rho;
//!
//! let value = amp.evaluate(&kin.point(1.2, 1.4)).unwrap();
//! assert!(value.norm() > 0.0);
//! ```

pub mod builder;
pub mod evaluator;
pub(crate) mod parse;
pub mod token;

pub use builder::{
    Amplitude, AmplitudeExpression, Complex, ComplexExpression, Expression, ExpressionKind, Real,
    RealExpression,
};
pub use evaluator::{evaluate, evaluate_traced, Scalar, StackTrace};
pub use token::{Arity, Operation, Token, TokenStream};
