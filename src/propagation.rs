//! Broadcasting parameter values into expressions
//!
//! Expressions own private copies of every parameter they reference. A
//! propagation pass looks up each copy by name in a [`ParameterSource`] and
//! overwrites its value. Every copy is rewritten on every pass; there is no
//! change tracking at this level.
//!
//! Names are resolved before anything is written, so a pass that fails on a
//! missing name leaves the target unchanged.

use crate::coefficient::Coefficient;
use crate::error::{DalitzError, Result};
use crate::expression::{Expression, ExpressionKind, TokenStream};
use crate::parameters::{Parameter, Parameters};
use crate::resonance::Resonance;
use std::collections::HashMap;

/// Name-to-value lookup used as the origin of a propagation pass
pub trait ParameterSource {
    /// Value of `name`, `MissingParameter` if absent
    fn value_of(&self, name: &str) -> Result<f64>;

    fn contains(&self, name: &str) -> bool;
}

impl ParameterSource for HashMap<String, f64> {
    fn value_of(&self, name: &str) -> Result<f64> {
        self.get(name).copied().ok_or_else(|| DalitzError::missing(name))
    }

    fn contains(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl ParameterSource for Parameters {
    fn value_of(&self, name: &str) -> Result<f64> {
        Ok(self.require(name)?.value())
    }

    fn contains(&self, name: &str) -> bool {
        Parameters::contains(self, name)
    }
}

/// Anything holding parameter copies that can be refreshed from a source
pub trait Propagate {
    fn propagate(&mut self, source: &dyn ParameterSource) -> Result<()>;
}

fn resolve_all<'a>(
    params: impl IntoIterator<Item = &'a Parameter>,
    source: &dyn ParameterSource,
) -> Result<()> {
    for p in params {
        if !source.contains(p.name()) {
            return Err(DalitzError::missing(p.name()));
        }
    }
    Ok(())
}

impl Propagate for Parameter {
    fn propagate(&mut self, source: &dyn ParameterSource) -> Result<()> {
        let value = source.value_of(self.name())?;
        self.assign(value);
        Ok(())
    }
}

impl Propagate for Coefficient {
    fn propagate(&mut self, source: &dyn ParameterSource) -> Result<()> {
        resolve_all(self.parameters(), source)?;
        for p in self.parameters_mut() {
            p.propagate(source)?;
        }
        Ok(())
    }
}

impl Propagate for Resonance {
    fn propagate(&mut self, source: &dyn ParameterSource) -> Result<()> {
        resolve_all(self.parameters(), source)?;
        for p in self.parameters_mut() {
            p.propagate(source)?;
        }
        Ok(())
    }
}

impl Propagate for TokenStream {
    fn propagate(&mut self, source: &dyn ParameterSource) -> Result<()> {
        resolve_all(self.all_parameters(), source)?;
        for p in self.parameters_mut() {
            p.propagate(source)?;
        }
        for c in self.coefficients_mut() {
            c.propagate(source)?;
        }
        for r in self.resonances_mut() {
            r.propagate(source)?;
        }
        Ok(())
    }
}

impl<K: ExpressionKind> Propagate for Expression<K> {
    fn propagate(&mut self, source: &dyn ParameterSource) -> Result<()> {
        self.stream_mut().propagate(source)
    }
}
