//! Complex fit coefficients
//!
//! A coefficient is a complex number built from two real parameters, either in
//! cartesian `(re, im)` or polar `(magnitude, phase)` form. Coefficients are
//! operands of complex and amplitude expressions.

use crate::parameters::Parameter;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Parametrisation of a coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoefficientForm {
    Cartesian { re: Parameter, im: Parameter },
    Polar { magnitude: Parameter, phase: Parameter },
}

/// A named complex coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    name: String,
    form: CoefficientForm,
}

impl Coefficient {
    /// Cartesian coefficient with free parameters `<name>_re` and `<name>_im`
    ///
    /// ```
    /// use dalitz_rs::coefficient::Coefficient;
    /// use num_complex::Complex64;
    ///
    /// let c = Coefficient::cartesian("c_rho", 0.5, 0.5);
    /// assert_eq!(c.value(), Complex64::new(0.5, 0.5));
    /// assert_eq!(c.parameters()[0].name(), "c_rho_re");
    /// ```
    pub fn cartesian(name: &str, re: f64, im: f64) -> Self {
        Self {
            name: name.to_string(),
            form: CoefficientForm::Cartesian {
                re: Parameter::new(&format!("{}_re", name), re),
                im: Parameter::new(&format!("{}_im", name), im),
            },
        }
    }

    /// Polar coefficient with free parameters `<name>_mag` and `<name>_phase`
    pub fn polar(name: &str, magnitude: f64, phase: f64) -> Self {
        Self {
            name: name.to_string(),
            form: CoefficientForm::Polar {
                magnitude: Parameter::new(&format!("{}_mag", name), magnitude),
                phase: Parameter::new(&format!("{}_phase", name), phase),
            },
        }
    }

    /// Coefficient from explicitly constructed parameters
    pub fn from_form(name: &str, form: CoefficientForm) -> Self {
        Self {
            name: name.to_string(),
            form,
        }
    }

    /// Cartesian coefficient whose two parameters are fixed
    pub fn fixed(name: &str, value: Complex64) -> Self {
        let mut coefficient = Self::cartesian(name, value.re, value.im);
        coefficient.fix();
        coefficient
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn form(&self) -> &CoefficientForm {
        &self.form
    }

    /// Current complex value
    pub fn value(&self) -> Complex64 {
        match &self.form {
            CoefficientForm::Cartesian { re, im } => Complex64::new(re.value(), im.value()),
            CoefficientForm::Polar { magnitude, phase } => {
                Complex64::from_polar(magnitude.value(), phase.value())
            }
        }
    }

    /// The two underlying parameters
    pub fn parameters(&self) -> [&Parameter; 2] {
        match &self.form {
            CoefficientForm::Cartesian { re, im } => [re, im],
            CoefficientForm::Polar { magnitude, phase } => [magnitude, phase],
        }
    }

    pub fn parameters_mut(&mut self) -> [&mut Parameter; 2] {
        match &mut self.form {
            CoefficientForm::Cartesian { re, im } => [re, im],
            CoefficientForm::Polar { magnitude, phase } => [magnitude, phase],
        }
    }

    /// Fix both parameters
    pub fn fix(&mut self) {
        for p in self.parameters_mut() {
            p.fix();
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.parameters().iter().all(|p| p.is_fixed())
    }
}
