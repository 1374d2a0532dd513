//! Midpoint grid over the Dalitz plot
//!
//! The grid spans the rectangular box of the single-axis limits of m12^2 and
//! m13^2 with `bins x bins` equal cells. Each cell is represented by its centre;
//! cells whose centre lies outside the kinematic boundary contribute nothing.

use crate::error::{DalitzError, Result};
use crate::kinematics::{DalitzKinematics, DalitzPoint};

#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationGrid {
    kinematics: DalitzKinematics,
    bins: usize,
    m12_range: (f64, f64),
    m13_range: (f64, f64),
    m12_step: f64,
    m13_step: f64,
}

impl IntegrationGrid {
    pub fn new(kinematics: &DalitzKinematics, bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(DalitzError::OutOfRange(
                "integration grid needs at least one bin per axis".to_string(),
            ));
        }
        let m12_range = kinematics.m12_range();
        let m13_range = kinematics.m13_range();
        Ok(Self {
            kinematics: *kinematics,
            bins,
            m12_range,
            m13_range,
            m12_step: (m12_range.1 - m12_range.0) / bins as f64,
            m13_step: (m13_range.1 - m13_range.0) / bins as f64,
        })
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn m12_range(&self) -> (f64, f64) {
        self.m12_range
    }

    pub fn m13_range(&self) -> (f64, f64) {
        self.m13_range
    }

    /// Area of one cell in (m12^2, m13^2)
    pub fn cell_area(&self) -> f64 {
        self.m12_step * self.m13_step
    }

    /// Centre of cell `(ix, iy)`, ix along m12^2 and iy along m13^2
    pub fn cell(&self, ix: usize, iy: usize) -> Result<DalitzPoint> {
        for index in [ix, iy] {
            if index >= self.bins {
                return Err(DalitzError::InvalidBinIndex {
                    index,
                    bins: self.bins,
                });
            }
        }
        let m12sq = self.m12_range.0 + (ix as f64 + 0.5) * self.m12_step;
        let m13sq = self.m13_range.0 + (iy as f64 + 0.5) * self.m13_step;
        Ok(self.kinematics.point(m12sq, m13sq))
    }

    /// Whether the centre of cell `(ix, iy)` is kinematically allowed
    pub fn is_allowed(&self, ix: usize, iy: usize) -> Result<bool> {
        let point = self.cell(ix, iy)?;
        Ok(self.kinematics.contains_point(&point))
    }

    /// Centres of every allowed cell, m12^2 major
    pub fn allowed_points(&self) -> Vec<DalitzPoint> {
        let mut points = Vec::new();
        for ix in 0..self.bins {
            let m12sq = self.m12_range.0 + (ix as f64 + 0.5) * self.m12_step;
            let Some((lo, hi)) = self.kinematics.m13_limits(m12sq) else {
                continue;
            };
            for iy in 0..self.bins {
                let m13sq = self.m13_range.0 + (iy as f64 + 0.5) * self.m13_step;
                if m13sq >= lo && m13sq <= hi {
                    points.push(self.kinematics.point(m12sq, m13sq));
                }
            }
        }
        points
    }
}
