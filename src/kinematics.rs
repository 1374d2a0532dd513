//! Three-body decay kinematics
//!
//! A decay `P -> 1 2 3` is described on the Dalitz plot by the pair of squared
//! invariant masses `(m12^2, m13^2)`; `m23^2` follows from energy conservation.
//! The kinematically allowed region is non-rectangular inside the box spanned
//! by the single-axis limits.

use crate::error::{DalitzError, Result};
use serde::{Deserialize, Serialize};

/// Two-body subsystem whose invariant mass a resonance depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Daughters 1 and 2
    M12,
    /// Daughters 1 and 3
    M13,
    /// Daughters 2 and 3
    M23,
}

/// A point on the Dalitz plot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DalitzPoint {
    pub m12sq: f64,
    pub m13sq: f64,
    pub m23sq: f64,
}

impl DalitzPoint {
    /// Squared invariant mass of the given channel
    pub fn s(&self, channel: Channel) -> f64 {
        match channel {
            Channel::M12 => self.m12sq,
            Channel::M13 => self.m13sq,
            Channel::M23 => self.m23sq,
        }
    }
}

/// Masses of the parent and the three daughters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DalitzKinematics {
    parent: f64,
    daughters: [f64; 3],
}

impl DalitzKinematics {
    /// Create the kinematics of `parent -> daughters[0] daughters[1] daughters[2]`
    ///
    /// ```
    /// use dalitz_rs::kinematics::DalitzKinematics;
    ///
    /// // D0 -> K0S pi+ pi-
    /// let kin = DalitzKinematics::new(1.86484, [0.497611, 0.13957, 0.13957]).unwrap();
    /// let (lo, hi) = kin.m12_range();
    /// assert!(lo < hi);
    /// ```
    pub fn new(parent: f64, daughters: [f64; 3]) -> Result<Self> {
        if daughters.iter().any(|&m| !(m >= 0.0)) {
            return Err(DalitzError::OutOfRange(format!(
                "daughter masses must be non-negative, got {:?}",
                daughters
            )));
        }
        let threshold: f64 = daughters.iter().sum();
        if !(parent > threshold) {
            return Err(DalitzError::OutOfRange(format!(
                "parent mass {} is below the three-body threshold {}",
                parent, threshold
            )));
        }
        Ok(Self { parent, daughters })
    }

    pub fn parent_mass(&self) -> f64 {
        self.parent
    }

    pub fn daughter_masses(&self) -> [f64; 3] {
        self.daughters
    }

    /// Sum of the four squared masses, `m12^2 + m13^2 + m23^2`
    pub fn mass_sum(&self) -> f64 {
        self.parent * self.parent + self.daughters.iter().map(|m| m * m).sum::<f64>()
    }

    /// Full range of `m12^2`
    pub fn m12_range(&self) -> (f64, f64) {
        let [m1, m2, m3] = self.daughters;
        ((m1 + m2).powi(2), (self.parent - m3).powi(2))
    }

    /// Full range of `m13^2`
    pub fn m13_range(&self) -> (f64, f64) {
        let [m1, m2, m3] = self.daughters;
        ((m1 + m3).powi(2), (self.parent - m2).powi(2))
    }

    /// Full range of `m23^2`
    pub fn m23_range(&self) -> (f64, f64) {
        let [m1, m2, m3] = self.daughters;
        ((m2 + m3).powi(2), (self.parent - m1).powi(2))
    }

    /// Build a point, deriving `m23^2`. The point is not checked against the boundary.
    pub fn point(&self, m12sq: f64, m13sq: f64) -> DalitzPoint {
        DalitzPoint {
            m12sq,
            m13sq,
            m23sq: self.mass_sum() - m12sq - m13sq,
        }
    }

    /// Allowed `m13^2` interval at fixed `m12^2`, `None` outside the `m12^2` range
    pub fn m13_limits(&self, m12sq: f64) -> Option<(f64, f64)> {
        let (lo, hi) = self.m12_range();
        if !(m12sq >= lo && m12sq <= hi) || m12sq <= 0.0 {
            return None;
        }
        let [m1, m2, m3] = self.daughters;
        let m12 = m12sq.sqrt();

        // Energies of daughters 1 and 3 in the (12) rest frame
        let e1 = (m12sq - m2 * m2 + m1 * m1) / (2.0 * m12);
        let e3 = (self.parent * self.parent - m12sq - m3 * m3) / (2.0 * m12);
        let p1 = (e1 * e1 - m1 * m1).max(0.0).sqrt();
        let p3 = (e3 * e3 - m3 * m3).max(0.0).sqrt();

        let sum = (e1 + e3).powi(2);
        Some((sum - (p1 + p3).powi(2), sum - (p1 - p3).powi(2)))
    }

    /// Whether `(m12^2, m13^2)` lies inside the kinematically allowed region
    pub fn contains(&self, m12sq: f64, m13sq: f64) -> bool {
        match self.m13_limits(m12sq) {
            Some((lo, hi)) => m13sq >= lo && m13sq <= hi,
            None => false,
        }
    }

    /// Convenience wrapper around [`contains`](Self::contains) for a built point
    pub fn contains_point(&self, point: &DalitzPoint) -> bool {
        self.contains(point.m12sq, point.m13sq)
    }
}
