//! Resonance propagators
//!
//! The closed set of sub-models an amplitude expression can pool. Each variant
//! owns its parameters by value, so appending a resonance to an expression is
//! an ordinary move and cloning an expression deep-copies its sub-models.

mod breit_wigner;
mod non_resonant;

pub use breit_wigner::BreitWigner;
pub use non_resonant::NonResonant;

use crate::kinematics::DalitzPoint;
use crate::parameters::Parameter;
use num_complex::Complex64;

/// A propagator evaluated at a Dalitz-plot point
#[derive(Debug, Clone, PartialEq)]
pub enum Resonance {
    BreitWigner(BreitWigner),
    NonResonant(NonResonant),
}

impl Resonance {
    pub fn name(&self) -> &str {
        match self {
            Resonance::BreitWigner(r) => r.name(),
            Resonance::NonResonant(r) => r.name(),
        }
    }

    /// Bare line shape at `point`
    pub fn propagator(&self, point: &DalitzPoint) -> Complex64 {
        match self {
            Resonance::BreitWigner(r) => r.propagator(point),
            Resonance::NonResonant(r) => r.propagator(point),
        }
    }

    /// Full contribution at `point`: propagator times angular and barrier factors
    pub fn evaluate(&self, point: &DalitzPoint) -> Complex64 {
        match self {
            Resonance::BreitWigner(r) => r.evaluate(point),
            Resonance::NonResonant(r) => r.propagator(point),
        }
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        match self {
            Resonance::BreitWigner(r) => vec![r.mass(), r.width()],
            Resonance::NonResonant(_) => Vec::new(),
        }
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Parameter> {
        match self {
            Resonance::BreitWigner(r) => {
                let (mass, width) = r.parameters_mut();
                vec![mass, width]
            }
            Resonance::NonResonant(_) => Vec::new(),
        }
    }
}

impl From<BreitWigner> for Resonance {
    fn from(r: BreitWigner) -> Self {
        Resonance::BreitWigner(r)
    }
}

impl From<NonResonant> for Resonance {
    fn from(r: NonResonant) -> Self {
        Resonance::NonResonant(r)
    }
}
