//! Dependency-aware cache of the normalization integral
//!
//! The normalization of `A = sum_i c_i R_i` is
//!
//! ```text
//! N = Re sum_ij c_i conj(c_j) M_ij,   M_ij = integral R_i conj(R_j) dm12^2 dm13^2
//! ```
//!
//! `M` depends only on the term shapes, so it is cached and rebuilt only where
//! a shape can have changed. A term is *dirty* when any parameter of its shape
//! is free; entry `(i, j)` is recomputed when either term is dirty and reused
//! verbatim otherwise. Coefficients enter only through the final contraction.

use crate::error::{DalitzError, Result};
use crate::kinematics::DalitzPoint;
use crate::model::{DalitzModel, TermShape};
use crate::normalization::config::NormalizationConfig;
use crate::normalization::grid::IntegrationGrid;
use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, trace};

/// Reuse class of a model, derived from the fixed flags of its shape parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No shape can change; the integral is computed once
    AllFixed,
    /// Some shapes can change; only entries touching them are recomputed
    PartiallyFixed,
    /// Every shape can change; the whole matrix is recomputed
    AllFree,
}

#[derive(Debug, Clone)]
pub struct NormalizationCache {
    config: NormalizationConfig,
    grid: IntegrationGrid,
    points: Vec<DalitzPoint>,
    state: CacheState,
    dirty: Vec<bool>,
    /// Cross-term matrix `M`
    matrix: Array2<Complex64>,
    /// Shape values, one row per term and one column per allowed grid point
    values: Array2<Complex64>,
    filled: bool,
    grid_evaluations: usize,
    recomputed_pairs: usize,
}

impl NormalizationCache {
    /// Classify `model` and compute the full integral once
    #[tracing::instrument(level = "debug", skip_all, fields(terms = model.len(), bins = config.bins))]
    pub fn new(model: &DalitzModel, config: NormalizationConfig) -> Result<Self> {
        config.validate()?;
        let grid = IntegrationGrid::new(model.kinematics(), config.bins)?;
        let points = grid.allowed_points();
        let (state, dirty) = Self::classify(model)?;
        let n = model.len();

        debug!(points = points.len(), ?state, "normalization grid built");

        let mut cache = Self {
            config,
            grid,
            state,
            dirty,
            matrix: Array2::zeros((n, n)),
            values: Array2::zeros((n, points.len())),
            points,
            filled: false,
            grid_evaluations: 0,
            recomputed_pairs: 0,
        };
        cache.cache(model)?;
        Ok(cache)
    }

    /// Derive the cache state and per-term dirty bits from the canonical fixed flags
    pub fn classify(model: &DalitzModel) -> Result<(CacheState, Vec<bool>)> {
        let params = model.parameters();
        let mut dirty = Vec::with_capacity(model.len());
        for index in 0..model.len() {
            let names = model.shape_parameter_names(index)?;
            dirty.push(
                names
                    .iter()
                    .any(|name| params.get(name).map_or(true, |p| !p.is_fixed())),
            );
        }

        let state = if dirty.iter().all(|d| !d) {
            CacheState::AllFixed
        } else if dirty.iter().all(|d| *d) {
            CacheState::AllFree
        } else {
            CacheState::PartiallyFixed
        };
        Ok((state, dirty))
    }

    /// Classify again after fixed flags changed; the next [`cache`](Self::cache)
    /// recomputes everything
    pub fn reclassify(&mut self, model: &DalitzModel) -> Result<()> {
        let (state, dirty) = Self::classify(model)?;
        let n = model.len();
        if n != self.dirty.len() {
            self.matrix = Array2::zeros((n, n));
            self.values = Array2::zeros((n, self.points.len()));
        }
        debug!(?state, dirty = dirty.iter().filter(|d| **d).count(), "normalization cache reclassified");
        self.state = state;
        self.dirty = dirty;
        self.filled = false;
        Ok(())
    }

    /// Bring the cross-term matrix up to date with the current shape values
    pub fn cache(&mut self, model: &DalitzModel) -> Result<()> {
        let n = self.dirty.len();
        if model.len() != n {
            return Err(DalitzError::InvalidState(format!(
                "cache classified {} terms but the model has {}",
                n,
                model.len()
            )));
        }
        if self.filled && self.state == CacheState::AllFixed {
            self.recomputed_pairs = 0;
            trace!("all shapes fixed, normalization reused");
            return Ok(());
        }

        let refresh: Vec<bool> = self.dirty.iter().map(|d| !self.filled || *d).collect();
        let evaluations_before = self.grid_evaluations;
        self.evaluate_shapes(model, &refresh)?;

        // Upper triangle, half weight on the diagonal
        let area = self.grid.cell_area();
        let mut upper = Array2::<Complex64>::zeros((n, n));
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in i..n {
                if !(refresh[i] || refresh[j]) {
                    continue;
                }
                let weight = if i == j { 0.5 } else { 1.0 };
                let sum: Complex64 = self
                    .values
                    .row(i)
                    .iter()
                    .zip(self.values.row(j).iter())
                    .map(|(a, b)| a * b.conj())
                    .sum();
                upper[[i, j]] = sum * (weight * area);
                pairs.push((i, j));
            }
        }

        // Adding the conjugate transpose fills the lower triangle and restores the diagonal
        let full = &upper + &upper.t().mapv(|z| z.conj());
        for &(i, j) in &pairs {
            self.matrix[[i, j]] = full[[i, j]];
            self.matrix[[j, i]] = full[[j, i]];
        }

        self.recomputed_pairs = pairs.len();
        self.filled = true;
        debug!(
            pairs = pairs.len(),
            evaluations = self.grid_evaluations - evaluations_before,
            state = ?self.state,
            "normalization cache updated"
        );
        Ok(())
    }

    fn evaluate_shapes(&mut self, model: &DalitzModel, refresh: &[bool]) -> Result<()> {
        for (k, point) in self.points.iter().enumerate() {
            for (i, term) in model.terms().iter().enumerate() {
                if !refresh[i] {
                    continue;
                }
                let value = match term.shape() {
                    TermShape::Expression(shape) => {
                        self.grid_evaluations += 1;
                        shape.evaluate(point)?
                    }
                    // Sources precede their conjugates, so column k is already current
                    TermShape::ConjugateOf { source, rule } => rule.apply(self.values[[*source, k]]),
                };
                self.values[[i, k]] = value;
            }
        }
        Ok(())
    }

    /// `Re sum_ij c_i conj(c_j) M_ij` with the current coefficient values
    pub fn normalization(&self, model: &DalitzModel) -> Result<f64> {
        if !self.filled {
            return Err(DalitzError::InvalidState(
                "normalization requested before the cache was filled".to_string(),
            ));
        }
        let coefficients = model.coefficients()?;
        if coefficients.len() != self.dirty.len() {
            return Err(DalitzError::InvalidState(format!(
                "cache holds {} terms but the model has {}",
                self.dirty.len(),
                coefficients.len()
            )));
        }

        let mut total = Complex64::new(0.0, 0.0);
        for (i, ci) in coefficients.iter().enumerate() {
            for (j, cj) in coefficients.iter().enumerate() {
                total += ci * cj.conj() * self.matrix[[i, j]];
            }
        }
        Ok(total.re)
    }

    /// [`cache`](Self::cache) followed by [`normalization`](Self::normalization)
    pub fn refresh(&mut self, model: &DalitzModel) -> Result<f64> {
        self.cache(model)?;
        self.normalization(model)
    }

    /// Cached `M_ij`
    pub fn cross_term(&self, i: usize, j: usize) -> Result<Complex64> {
        let n = self.dirty.len();
        if i >= n || j >= n {
            return Err(DalitzError::OutOfRange(format!(
                "cross term ({}, {}) outside a {} term model",
                i, j, n
            )));
        }
        Ok(self.matrix[[i, j]])
    }

    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Per-term dirty bits
    pub fn dirty(&self) -> &[bool] {
        &self.dirty
    }

    /// Shape evaluations at grid points since construction
    pub fn grid_evaluations(&self) -> usize {
        self.grid_evaluations
    }

    /// Matrix entries (upper triangle) rebuilt by the last [`cache`](Self::cache) call
    pub fn recomputed_pairs(&self) -> usize {
        self.recomputed_pairs
    }

    pub fn grid(&self) -> &IntegrationGrid {
        &self.grid
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    /// Allowed grid points used by the quadrature
    pub fn points(&self) -> &[DalitzPoint] {
        &self.points
    }
}
