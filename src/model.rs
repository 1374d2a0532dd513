//! Coherent sums of amplitude terms
//!
//! A [`DalitzModel`] is `A(p) = sum_i c_i * R_i(p)`: each [`AmplitudeTerm`]
//! pairs a complex coefficient expression `c_i` with a shape `R_i`, an
//! amplitude expression of the phase-space point. A shape may instead be
//! declared as a fixed transformation of an earlier term's shape (for example
//! the charge conjugate of a resonance), which lets the normalization skip
//! evaluating it.
//!
//! The model owns the canonical [`Parameters`] map. Every parameter copy inside
//! the terms is registered there when the term is added, and later updates are
//! broadcast from it.

use crate::error::{DalitzError, Result};
use crate::expression::{AmplitudeExpression, ComplexExpression};
use crate::kinematics::{DalitzKinematics, DalitzPoint};
use crate::parameters::Parameters;
use crate::propagation::{ParameterSource, Propagate};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Relation between a conjugate term's shape and its source shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConjugateRule {
    /// `R_j = R_i`
    Identical,
    /// `R_j = -R_i`
    Negated,
    /// `R_j = conj(R_i)`
    Conjugated,
    /// `R_j = -conj(R_i)`
    NegatedConjugate,
}

impl ConjugateRule {
    pub fn apply(self, value: Complex64) -> Complex64 {
        match self {
            ConjugateRule::Identical => value,
            ConjugateRule::Negated => -value,
            ConjugateRule::Conjugated => value.conj(),
            ConjugateRule::NegatedConjugate => -value.conj(),
        }
    }
}

/// Shape of one term
#[derive(Debug, Clone, PartialEq)]
pub enum TermShape {
    /// Evaluated directly
    Expression(AmplitudeExpression),
    /// Derived from the shape of term `source`
    ConjugateOf { source: usize, rule: ConjugateRule },
}

/// One coherent contribution `c * R`
#[derive(Debug, Clone, PartialEq)]
pub struct AmplitudeTerm {
    name: String,
    coefficient: ComplexExpression,
    shape: TermShape,
}

impl AmplitudeTerm {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coefficient(&self) -> &ComplexExpression {
        &self.coefficient
    }

    pub fn shape(&self) -> &TermShape {
        &self.shape
    }

    /// Whether the shape is derived from another term
    pub fn is_conjugate(&self) -> bool {
        matches!(self.shape, TermShape::ConjugateOf { .. })
    }

    fn propagate(&mut self, source: &dyn ParameterSource) -> Result<()> {
        self.coefficient.propagate(source)?;
        if let TermShape::Expression(shape) = &mut self.shape {
            shape.propagate(source)?;
        }
        Ok(())
    }
}

/// A coherent amplitude model over a Dalitz plot
#[derive(Debug, Clone)]
pub struct DalitzModel {
    kinematics: DalitzKinematics,
    terms: Vec<AmplitudeTerm>,
    parameters: Parameters,
}

impl DalitzModel {
    pub fn new(kinematics: DalitzKinematics) -> Self {
        Self {
            kinematics,
            terms: Vec::new(),
            parameters: Parameters::new(),
        }
    }

    /// Append a term with its own shape and return its index
    ///
    /// Parameters not yet known to the model are registered with the value and
    /// fixed flag of their first copy. Copies of already registered parameters
    /// take the canonical value.
    ///
    /// ```
    /// use dalitz_rs::coefficient::Coefficient;
    /// use dalitz_rs::kinematics::{Channel, DalitzKinematics};
    /// use dalitz_rs::model::DalitzModel;
    /// use dalitz_rs::resonance::{BreitWigner, NonResonant, Resonance};
    ///
    /// let kin = DalitzKinematics::new(1.86484, [0.497611, 0.13957, 0.13957]).unwrap();
    /// let mut model = DalitzModel::new(kin);
    ///
    /// let rho = Resonance::from(BreitWigner::new("rho", 0.775, 0.149, Channel::M23));
    /// model.add_term("rho", Coefficient::fixed("c_rho", 1.0.into()), rho).unwrap();
    /// model
    ///     .add_term("nr", Coefficient::cartesian("c_nr", 0.5, 0.0), NonResonant::new("nr"))
    ///     .unwrap();
    ///
    /// assert_eq!(model.len(), 2);
    /// assert_eq!(model.parameters().free_names(), vec!["rho_mass", "rho_width", "c_nr_re", "c_nr_im"]);
    /// ```
    pub fn add_term(
        &mut self,
        name: &str,
        coefficient: impl Into<ComplexExpression>,
        shape: impl Into<AmplitudeExpression>,
    ) -> Result<usize> {
        let term = AmplitudeTerm {
            name: name.to_string(),
            coefficient: coefficient.into(),
            shape: TermShape::Expression(shape.into()),
        };
        self.push(term)
    }

    /// Append a term whose shape is `rule` applied to the shape of term `source`
    ///
    /// The source must be an earlier term with a shape of its own.
    pub fn add_conjugate_term(
        &mut self,
        name: &str,
        coefficient: impl Into<ComplexExpression>,
        source: usize,
        rule: ConjugateRule,
    ) -> Result<usize> {
        let origin = self.terms.get(source).ok_or_else(|| {
            DalitzError::OutOfRange(format!(
                "conjugate source {} out of range for {} terms",
                source,
                self.terms.len()
            ))
        })?;
        if origin.is_conjugate() {
            return Err(DalitzError::InvalidExpression(format!(
                "term '{}' is itself a conjugate and cannot be a source",
                origin.name
            )));
        }
        let term = AmplitudeTerm {
            name: name.to_string(),
            coefficient: coefficient.into(),
            shape: TermShape::ConjugateOf { source, rule },
        };
        self.push(term)
    }

    fn push(&mut self, mut term: AmplitudeTerm) -> Result<usize> {
        if self.terms.iter().any(|t| t.name == term.name) {
            return Err(DalitzError::InvalidExpression(format!(
                "duplicate term name '{}'",
                term.name
            )));
        }
        term.coefficient.check()?;
        if let TermShape::Expression(shape) = &term.shape {
            shape.check()?;
        }

        for p in term.coefficient.stream().all_parameters() {
            self.parameters.merge(p);
        }
        if let TermShape::Expression(shape) = &term.shape {
            for p in shape.stream().all_parameters() {
                self.parameters.merge(p);
            }
        }
        term.propagate(&self.parameters)?;

        self.terms.push(term);
        Ok(self.terms.len() - 1)
    }

    pub fn kinematics(&self) -> &DalitzKinematics {
        &self.kinematics
    }

    pub fn terms(&self) -> &[AmplitudeTerm] {
        &self.terms
    }

    pub fn term(&self, index: usize) -> Option<&AmplitudeTerm> {
        self.terms.get(index)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Canonical parameter map
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Mutable canonical map. Call [`sync`](Self::sync) after changing values
    /// here, and reclassify any normalization cache after changing fixed flags.
    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    /// Fix a canonical parameter
    pub fn fix_parameter(&mut self, name: &str) -> Result<()> {
        self.parameters
            .get_mut(name)
            .ok_or_else(|| DalitzError::missing(name))?
            .fix();
        Ok(())
    }

    /// Release a canonical parameter
    pub fn release_parameter(&mut self, name: &str) -> Result<()> {
        self.parameters
            .get_mut(name)
            .ok_or_else(|| DalitzError::missing(name))?
            .release();
        Ok(())
    }

    /// Broadcast the canonical values into every term
    pub fn sync(&mut self) -> Result<()> {
        let Self {
            terms, parameters, ..
        } = self;
        for term in terms.iter_mut() {
            term.propagate(&*parameters)?;
        }
        Ok(())
    }

    /// Names of the parameters the shape of term `index` depends on
    ///
    /// A conjugate term reports the names of its source shape.
    pub fn shape_parameter_names(&self, index: usize) -> Result<Vec<String>> {
        let term = self.terms.get(index).ok_or_else(|| {
            DalitzError::OutOfRange(format!(
                "term {} out of range for {} terms",
                index,
                self.terms.len()
            ))
        })?;
        match &term.shape {
            TermShape::Expression(shape) => Ok(shape.parameter_names()),
            TermShape::ConjugateOf { source, .. } => self.shape_parameter_names(*source),
        }
    }

    /// Shape values `R_i(point)` for every term, conjugates derived from their source
    pub fn shape_values(&self, point: &DalitzPoint) -> Result<Vec<Complex64>> {
        let mut values = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            let value = match &term.shape {
                TermShape::Expression(shape) => shape.evaluate(point)?,
                TermShape::ConjugateOf { source, rule } => rule.apply(values[*source]),
            };
            values.push(value);
        }
        Ok(values)
    }

    /// Current coefficient values `c_i`
    pub fn coefficients(&self) -> Result<Vec<Complex64>> {
        self.terms.iter().map(|t| t.coefficient.evaluate()).collect()
    }

    /// `A(point) = sum_i c_i R_i(point)`
    pub fn amplitude(&self, point: &DalitzPoint) -> Result<Complex64> {
        let shapes = self.shape_values(point)?;
        let coefficients = self.coefficients()?;
        Ok(coefficients
            .iter()
            .zip(&shapes)
            .map(|(c, r)| c * r)
            .sum())
    }

    /// `|A(point)|^2`
    pub fn intensity(&self, point: &DalitzPoint) -> Result<f64> {
        Ok(self.amplitude(point)?.norm_sqr())
    }
}

impl Propagate for DalitzModel {
    /// Write every canonical parameter from `source`, then broadcast into the terms
    ///
    /// Fails with `MissingParameter` before changing anything if `source` lacks
    /// any model parameter.
    fn propagate(&mut self, source: &dyn ParameterSource) -> Result<()> {
        if let Some(name) = self.parameters.names().iter().find(|n| !source.contains(n)) {
            return Err(DalitzError::missing(name));
        }
        let names = self.parameters.names().to_vec();
        let values = names
            .iter()
            .map(|n| source.value_of(n))
            .collect::<Result<Vec<f64>>>()?;
        self.parameters.update_from_slice(&names, &values)?;
        self.sync()
    }
}
