use crate::kinematics::DalitzPoint;
use num_complex::Complex64;

/// Flat non-resonant contribution, constant over the Dalitz plot
#[derive(Debug, Clone, PartialEq)]
pub struct NonResonant {
    name: String,
    value: Complex64,
}

impl NonResonant {
    /// Unit-valued non-resonant term
    pub fn new(name: &str) -> Self {
        Self::with_value(name, Complex64::new(1.0, 0.0))
    }

    pub fn with_value(name: &str, value: Complex64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn propagator(&self, _point: &DalitzPoint) -> Complex64 {
        self.value
    }
}
