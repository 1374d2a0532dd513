//! Configuration of the normalization integral

use crate::error::{DalitzError, Result};
use serde::{Deserialize, Serialize};

/// Settings for the phase-space quadrature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Number of bins along each of the m12^2 and m13^2 axes. Default: 200
    pub bins: usize,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self { bins: 200 }
    }
}

impl NormalizationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grid resolution
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.bins == 0 {
            return Err(DalitzError::OutOfRange(
                "normalization grid needs at least one bin per axis".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NormalizationConfig::default();
        assert_eq!(config.bins, 200);
        assert!(config.validate().is_ok());
        assert!(NormalizationConfig::new().with_bins(0).validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: NormalizationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, NormalizationConfig::default());

        let config: NormalizationConfig = serde_json::from_str(r#"{ "bins": 50 }"#).unwrap();
        assert_eq!(config.bins, 50);
    }
}
