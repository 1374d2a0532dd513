//! Parameters collection implementation
//!
//! `Parameters` is the canonical name -> `Parameter` map owned by a model. It
//! is the authoritative source when new values are broadcast into the private
//! parameter copies held by expressions.

use crate::parameters::parameter::{Parameter, ParameterError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A collection of uniquely named parameters, kept in registration order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameters {
    /// Map of parameter names to Parameter objects
    params: HashMap<String, Parameter>,

    /// Registration order of the names in `params`
    order: Vec<String>,
}

impl Parameters {
    /// Create a new empty parameters collection
    ///
    /// # Examples
    ///
    /// ```
    /// use dalitz_rs::parameters::Parameters;
    ///
    /// let params = Parameters::new();
    /// assert!(params.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, failing if the name is already registered
    ///
    /// # Examples
    ///
    /// ```
    /// use dalitz_rs::parameters::{Parameter, Parameters};
    ///
    /// let mut params = Parameters::new();
    /// params.add(Parameter::new("rho_mass", 0.775)).unwrap();
    /// assert!(params.add(Parameter::new("rho_mass", 0.7)).is_err());
    /// ```
    pub fn add(&mut self, param: Parameter) -> Result<(), ParameterError> {
        if self.params.contains_key(param.name()) {
            return Err(ParameterError::DuplicateParameter {
                name: param.name().to_string(),
            });
        }
        self.order.push(param.name().to_string());
        self.params.insert(param.name().to_string(), param);
        Ok(())
    }

    /// Add a free parameter with the given name and value
    pub fn add_param(&mut self, name: &str, value: f64) -> Result<(), ParameterError> {
        self.add(Parameter::new(name, value))
    }

    /// Add a bounded parameter
    pub fn add_param_with_bounds(
        &mut self,
        name: &str,
        value: f64,
        lower: f64,
        upper: f64,
    ) -> Result<(), ParameterError> {
        self.add(Parameter::with_bounds(name, value, lower, upper)?)
    }

    /// Register `param` unless a parameter of that name already exists.
    ///
    /// Returns `true` when the parameter was inserted. The existing entry is
    /// authoritative, so a later copy with a different value is ignored.
    pub fn merge(&mut self, param: &Parameter) -> bool {
        if self.params.contains_key(param.name()) {
            return false;
        }
        self.order.push(param.name().to_string());
        self.params.insert(param.name().to_string(), param.clone());
        true
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.get_mut(name)
    }

    /// Look up a parameter, reporting a missing name as an error
    pub fn require(&self, name: &str) -> Result<&Parameter, ParameterError> {
        self.params
            .get(name)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Remove a parameter from the collection
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        let param = self.params.remove(name)?;
        self.order.retain(|n| n != name);
        Some(param)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Names in registration order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Iterate over the parameters in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.order.iter().filter_map(move |name| self.params.get(name))
    }

    /// Snapshot of every value keyed by name
    pub fn values_map(&self) -> HashMap<String, f64> {
        self.params
            .iter()
            .map(|(name, p)| (name.clone(), p.value()))
            .collect()
    }

    /// Parameters the minimiser may vary
    pub fn free(&self) -> Vec<&Parameter> {
        self.iter().filter(|p| !p.is_fixed()).collect()
    }

    /// Parameters excluded from variation
    pub fn fixed(&self) -> Vec<&Parameter> {
        self.iter().filter(|p| p.is_fixed()).collect()
    }

    /// Names of the free parameters, in registration order
    pub fn free_names(&self) -> Vec<String> {
        self.free().into_iter().map(|p| p.name().to_string()).collect()
    }

    /// Write `values[i]` into the parameter called `names[i]`
    ///
    /// Bounds are not checked; this is the path the minimiser's proposals take.
    ///
    /// ```
    /// use dalitz_rs::parameters::Parameters;
    ///
    /// let mut params = Parameters::new();
    /// params.add_param("a", 1.0).unwrap();
    /// params.add_param("b", 2.0).unwrap();
    ///
    /// let names = vec!["b".to_string()];
    /// params.update_from_slice(&names, &[5.0]).unwrap();
    /// assert_eq!(params.get("b").unwrap().value(), 5.0);
    /// ```
    pub fn update_from_slice(&mut self, names: &[String], values: &[f64]) -> Result<(), ParameterError> {
        if names.len() != values.len() {
            return Err(ParameterError::LengthMismatch {
                expected: names.len(),
                actual: values.len(),
            });
        }
        // Resolve every name before touching any value
        if let Some(name) = names.iter().find(|name| !self.params.contains_key(*name)) {
            return Err(ParameterError::ParameterNotFound { name: name.clone() });
        }

        for (name, &value) in names.iter().zip(values) {
            if let Some(param) = self.params.get_mut(name) {
                param.assign(value);
            }
        }
        Ok(())
    }

    /// Reset all parameters to their initial values
    pub fn reset(&mut self) {
        for param in self.params.values_mut() {
            param.reset();
        }
    }
}

/// Error that can occur during serialization/deserialization
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Inconsistent parameter file: {0}")]
    Inconsistent(String),
}

impl Parameters {
    /// Save parameters to a JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), SerializationError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Save parameters to a JSON string
    pub fn to_json(&self) -> Result<String, SerializationError> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    /// Load parameters from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, SerializationError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    /// Load parameters from a JSON string
    ///
    /// The registration order and the map must describe the same names.
    pub fn from_json(json: &str) -> Result<Self, SerializationError> {
        let params: Parameters = serde_json::from_str(json)?;

        if params.order.len() != params.params.len()
            || params.order.iter().any(|name| !params.params.contains_key(name))
        {
            return Err(SerializationError::Inconsistent(
                "order list does not match parameter map".to_string(),
            ));
        }
        if let Some((key, p)) = params.params.iter().find(|(key, p)| key.as_str() != p.name()) {
            return Err(SerializationError::Inconsistent(format!(
                "key '{}' holds parameter '{}'",
                key,
                p.name()
            )));
        }

        Ok(params)
    }
}
