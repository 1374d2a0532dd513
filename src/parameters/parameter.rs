//! Parameter definition and implementation
//!
//! A `Parameter` is a named real number the minimiser may vary. Expressions keep
//! private copies of the parameters they reference; the owning model keeps the
//! canonical copy and broadcasts new values into every private copy.

use crate::parameters::bounds::{Bounds, BoundsError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Bounds error: {0}")]
    BoundsError(#[from] BoundsError),

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },

    #[error("Parameter '{name}' already exists")]
    DuplicateParameter { name: String },

    #[error("Expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// A named fit parameter
///
/// # Examples
///
/// ```
/// use dalitz_rs::parameters::Parameter;
///
/// let mut mass = Parameter::new("rho_mass", 0.775);
/// assert!(!mass.is_fixed());
///
/// mass.fix();
/// assert!(mass.is_fixed());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,

    value: f64,

    /// Value at construction, restored by `reset`
    init_value: f64,

    /// Uncertainty on the value (step size before a fit, error after it)
    error: f64,

    fixed: bool,

    bounds: Option<Bounds>,
}

impl Parameter {
    /// Create a free, unbounded parameter
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            init_value: value,
            error: 0.0,
            fixed: false,
            bounds: None,
        }
    }

    /// Create a parameter that is fixed from the start
    pub fn fixed(name: &str, value: f64) -> Self {
        let mut param = Self::new(name, value);
        param.fixed = true;
        param
    }

    /// Create a bounded parameter; the value is clamped into the interval
    ///
    /// ```
    /// use dalitz_rs::parameters::Parameter;
    ///
    /// let width = Parameter::with_bounds("rho_width", 0.5, 0.0, 0.3).unwrap();
    /// assert_eq!(width.value(), 0.3);
    /// ```
    pub fn with_bounds(name: &str, value: f64, lower: f64, upper: f64) -> Result<Self, ParameterError> {
        let bounds = Bounds::new(lower, upper)?;
        let value = bounds.clamp(value);

        Ok(Self {
            name: name.to_string(),
            value,
            init_value: value,
            error: 0.0,
            fixed: false,
            bounds: Some(bounds),
        })
    }

    /// Builder style uncertainty setter
    pub fn with_error(mut self, error: f64) -> Self {
        self.error = error;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value, checking it against the bounds
    pub fn set_value(&mut self, value: f64) -> Result<(), ParameterError> {
        if let Some(bounds) = &self.bounds {
            bounds.check(value)?;
        }
        self.value = value;
        Ok(())
    }

    /// Overwrite the value without a bounds check.
    ///
    /// Used by propagation: the minimiser owns the bound handling for the
    /// values it proposes.
    pub(crate) fn assign(&mut self, value: f64) {
        self.value = value;
    }

    pub fn init_value(&self) -> f64 {
        self.init_value
    }

    /// Restore the construction value
    pub fn reset(&mut self) {
        self.value = match &self.bounds {
            Some(bounds) => bounds.clamp(self.init_value),
            None => self.init_value,
        };
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn set_error(&mut self, error: f64) {
        self.error = error;
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Exclude the parameter from minimiser variation
    pub fn fix(&mut self) {
        self.fixed = true;
    }

    /// Let the minimiser vary the parameter again
    pub fn release(&mut self) {
        self.fixed = false;
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Set or replace the bounds; the current value is clamped into them
    pub fn set_bounds(&mut self, lower: f64, upper: f64) -> Result<(), ParameterError> {
        let bounds = Bounds::new(lower, upper)?;
        self.value = bounds.clamp(self.value);
        self.bounds = Some(bounds);
        Ok(())
    }

    pub fn clear_bounds(&mut self) {
        self.bounds = None;
    }
}
