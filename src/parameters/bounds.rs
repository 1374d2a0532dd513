//! Parameter bounds
//!
//! A bounded parameter carries a closed `[lower, upper]` interval. Values set
//! through the public API are checked against it; values broadcast during
//! propagation are taken as supplied by the minimiser.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: lower ({lower}) must not exceed upper ({upper})")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("Parameter value {value} is outside bounds: [{lower}, {upper}]")]
    ValueOutsideBounds { value: f64, lower: f64, upper: f64 },

    #[error("Bounds must not contain NaN")]
    NotANumber,
}

/// Closed interval constraining a parameter value
///
/// An infinite end is written as `null` in JSON and read back as infinity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lowest allowed value
    pub lower: f64,

    /// Highest allowed value
    pub upper: f64,
}

/// Wire form of [`Bounds`]
#[derive(Serialize, Deserialize)]
struct BoundsRepr {
    #[serde(default)]
    lower: Option<f64>,
    #[serde(default)]
    upper: Option<f64>,
}

impl Serialize for Bounds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BoundsRepr {
            lower: Some(self.lower).filter(|v| v.is_finite()),
            upper: Some(self.upper).filter(|v| v.is_finite()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bounds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = BoundsRepr::deserialize(deserializer)?;
        Bounds::new(
            repr.lower.unwrap_or(f64::NEG_INFINITY),
            repr.upper.unwrap_or(f64::INFINITY),
        )
        .map_err(serde::de::Error::custom)
    }
}

impl Bounds {
    /// Create a new interval
    ///
    /// # Examples
    ///
    /// ```
    /// use dalitz_rs::parameters::bounds::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.lower, 0.0);
    /// assert!(Bounds::new(1.0, 0.0).is_err());
    /// ```
    pub fn new(lower: f64, upper: f64) -> Result<Self, BoundsError> {
        if lower.is_nan() || upper.is_nan() {
            return Err(BoundsError::NotANumber);
        }
        if lower > upper {
            return Err(BoundsError::InvalidBounds { lower, upper });
        }

        Ok(Self { lower, upper })
    }

    /// Check whether `value` lies inside the interval
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Clamp `value` into the interval
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }

    /// Width of the interval
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Verify `value`, producing the error the parameter layer reports
    pub fn check(&self, value: f64) -> Result<(), BoundsError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(BoundsError::ValueOutsideBounds {
                value,
                lower: self.lower,
                upper: self.upper,
            })
        }
    }
}
