use crate::kinematics::{Channel, DalitzPoint};
use crate::parameters::Parameter;
use num_complex::Complex64;

/// Constant-width relativistic Breit-Wigner for a scalar resonance
///
/// `BW(s) = 1 / (m0^2 - s - i m0 G0)` with `s` the squared invariant mass of
/// the resonance channel. Scalar decays carry unit angular and barrier factors.
#[derive(Debug, Clone, PartialEq)]
pub struct BreitWigner {
    name: String,
    mass: Parameter,
    width: Parameter,
    channel: Channel,
}

impl BreitWigner {
    /// Resonance with free parameters `<name>_mass` and `<name>_width`
    ///
    /// ```
    /// use dalitz_rs::kinematics::Channel;
    /// use dalitz_rs::resonance::BreitWigner;
    ///
    /// let rho = BreitWigner::new("rho", 0.775, 0.149, Channel::M23);
    /// assert_eq!(rho.mass().name(), "rho_mass");
    /// ```
    pub fn new(name: &str, mass: f64, width: f64, channel: Channel) -> Self {
        Self::with_parameters(
            name,
            Parameter::new(&format!("{}_mass", name), mass),
            Parameter::new(&format!("{}_width", name), width),
            channel,
        )
    }

    /// Resonance built from caller-supplied parameters (shared names, bounds, fixed flags)
    pub fn with_parameters(name: &str, mass: Parameter, width: Parameter, channel: Channel) -> Self {
        Self {
            name: name.to_string(),
            mass,
            width,
            channel,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass(&self) -> &Parameter {
        &self.mass
    }

    pub fn width(&self) -> &Parameter {
        &self.width
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub(crate) fn parameters_mut(&mut self) -> (&mut Parameter, &mut Parameter) {
        (&mut self.mass, &mut self.width)
    }

    pub fn propagator(&self, point: &DalitzPoint) -> Complex64 {
        let m0 = self.mass.value();
        let s = point.s(self.channel);
        Complex64::new(m0 * m0 - s, -m0 * self.width.value()).inv()
    }

    pub fn evaluate(&self, point: &DalitzPoint) -> Complex64 {
        self.propagator(point)
    }
}
