//! Fit sessions and the likelihood objective
//!
//! A [`FitSession`] owns the state one fit run shares between its objectives:
//! the counter that hands out [`CacheSlot`]s and the [`EventCache`] the slots
//! index. Nothing here is global; two sessions never see each other's slots.
//!
//! [`NllObjective`] is the callback an external minimiser drives. Each call
//! propagates the proposed free-parameter values into the model, brings the
//! normalization cache up to date and sums the negative log-likelihood over
//! the events.

use crate::error::{DalitzError, Result};
use crate::events::EventSource;
use crate::kinematics::DalitzPoint;
use crate::model::{DalitzModel, TermShape};
use crate::normalization::{NormalizationCache, NormalizationConfig};
use crate::parameters::ParameterError;
use crate::propagation::Propagate;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Settings of a fit session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Event field holding m12^2. Default: "m12sq"
    pub m12_field: String,

    /// Event field holding m13^2. Default: "m13sq"
    pub m13_field: String,

    /// Quadrature settings for the objectives of this session
    pub normalization: NormalizationConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            m12_field: "m12sq".to_string(),
            m13_field: "m13sq".to_string(),
            normalization: NormalizationConfig::default(),
        }
    }
}

/// Handle to one column of per-event cached values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheSlot(usize);

impl CacheSlot {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Per-event values stored by slot
#[derive(Debug, Clone, Default)]
pub struct EventCache {
    columns: HashMap<CacheSlot, Vec<Complex64>>,
}

impl EventCache {
    pub fn store(&mut self, slot: CacheSlot, values: Vec<Complex64>) {
        self.columns.insert(slot, values);
    }

    /// Remove the column of `slot`, returning it if one was stored
    pub fn release(&mut self, slot: CacheSlot) -> Option<Vec<Complex64>> {
        self.columns.remove(&slot)
    }

    pub fn get(&self, slot: CacheSlot) -> Option<&[Complex64]> {
        self.columns.get(&slot).map(Vec::as_slice)
    }

    /// Cached value of `slot` at `row`
    pub fn value(&self, slot: CacheSlot, row: usize) -> Result<Complex64> {
        let column = self.get(slot).ok_or_else(|| {
            DalitzError::InvalidState(format!("cache slot {} holds no values", slot.index()))
        })?;
        column.get(row).copied().ok_or_else(|| {
            DalitzError::OutOfRange(format!(
                "row {} outside cache slot {} of {} rows",
                row,
                slot.index(),
                column.len()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }
}

/// State shared by the objectives of one fit run
#[derive(Debug, Clone, Default)]
pub struct FitSession {
    config: SessionConfig,
    next_slot: usize,
    cache: EventCache,
}

impl FitSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            next_slot: 0,
            cache: EventCache::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Hand out the next unused slot
    pub fn allocate_slot(&mut self) -> CacheSlot {
        let slot = CacheSlot(self.next_slot);
        self.next_slot += 1;
        trace!(slot = slot.index(), "cache slot allocated");
        slot
    }

    /// Number of slots handed out so far
    pub fn allocated_slots(&self) -> usize {
        self.next_slot
    }

    pub fn event_cache(&self) -> &EventCache {
        &self.cache
    }

    pub fn event_cache_mut(&mut self) -> &mut EventCache {
        &mut self.cache
    }

    /// Drop every cached column and restart slot numbering
    pub fn reset(&mut self) {
        debug!(slots = self.next_slot, "fit session reset");
        self.cache.clear();
        self.next_slot = 0;
    }
}

/// Callback contract of an external minimiser
pub trait Objective {
    /// Names of the parameters, in the order `value` expects them
    fn parameter_names(&self) -> &[String];

    /// Objective at the proposed parameter vector
    fn value(&mut self, parameters: &[f64]) -> Result<f64>;
}

/// Unbinned negative log-likelihood `-sum_k ln(|A(p_k)|^2 / N)`
///
/// The per-event columns an objective stores in its session are released
/// when the objective is dropped. Slot numbers are never reused within a
/// session.
pub struct NllObjective<'a, E: EventSource> {
    session: &'a mut FitSession,
    events: &'a E,
    model: DalitzModel,
    normalization: NormalizationCache,
    points: Vec<DalitzPoint>,
    slots: Vec<Option<CacheSlot>>,
    free_names: Vec<String>,
    calls: usize,
}

impl<'a, E: EventSource> NllObjective<'a, E> {
    /// Build the objective for `model` over `events`
    ///
    /// Every term whose shape is fully fixed gets a cache slot holding its value
    /// at each event, so per-call work is limited to the free shapes.
    #[tracing::instrument(level = "debug", skip_all, fields(events = events.len(), terms = model.len()))]
    pub fn new(session: &'a mut FitSession, model: DalitzModel, events: &'a E) -> Result<Self> {
        let config = session.config().clone();
        let mut points = Vec::with_capacity(events.len());
        for row in 0..events.len() {
            let m12sq = events.value(&config.m12_field, row)?;
            let m13sq = events.value(&config.m13_field, row)?;
            points.push(model.kinematics().point(m12sq, m13sq));
        }

        let normalization = NormalizationCache::new(&model, config.normalization.clone())?;

        let mut slots = Vec::with_capacity(model.len());
        for (i, term) in model.terms().iter().enumerate() {
            let slot = match term.shape() {
                TermShape::Expression(shape) if !normalization.dirty()[i] => {
                    let values = points
                        .iter()
                        .map(|p| shape.evaluate(p))
                        .collect::<Result<Vec<Complex64>>>()?;
                    let slot = session.allocate_slot();
                    session.event_cache_mut().store(slot, values);
                    Some(slot)
                }
                _ => None,
            };
            slots.push(slot);
        }

        let free_names = model.parameters().free_names();
        debug!(
            cached = slots.iter().filter(|s| s.is_some()).count(),
            free = free_names.len(),
            state = ?normalization.state(),
            "likelihood objective built"
        );

        Ok(Self {
            session,
            events,
            model,
            normalization,
            points,
            slots,
            free_names,
            calls: 0,
        })
    }

    pub fn model(&self) -> &DalitzModel {
        &self.model
    }

    pub fn normalization(&self) -> &NormalizationCache {
        &self.normalization
    }

    pub fn events(&self) -> &E {
        self.events
    }

    /// Slot of each term, `None` for shapes evaluated per call
    pub fn slots(&self) -> &[Option<CacheSlot>] {
        &self.slots
    }

    /// Number of completed `value` calls
    pub fn calls(&self) -> usize {
        self.calls
    }

    fn shape_values(&self, row: usize, point: &DalitzPoint, out: &mut Vec<Complex64>) -> Result<()> {
        out.clear();
        for (term, slot) in self.model.terms().iter().zip(&self.slots) {
            let value = match (slot, term.shape()) {
                (Some(slot), _) => self.session.event_cache().value(*slot, row)?,
                (None, TermShape::Expression(shape)) => shape.evaluate(point)?,
                (None, TermShape::ConjugateOf { source, rule }) => rule.apply(out[*source]),
            };
            out.push(value);
        }
        Ok(())
    }
}

impl<'a, E: EventSource> Drop for NllObjective<'a, E> {
    fn drop(&mut self) {
        let cache = self.session.event_cache_mut();
        let released = self
            .slots
            .iter()
            .flatten()
            .filter(|slot| cache.release(**slot).is_some())
            .count();
        trace!(released, "likelihood objective slots released");
    }
}

impl<'a, E: EventSource> Objective for NllObjective<'a, E> {
    fn parameter_names(&self) -> &[String] {
        &self.free_names
    }

    fn value(&mut self, parameters: &[f64]) -> Result<f64> {
        if parameters.len() != self.free_names.len() {
            return Err(ParameterError::LengthMismatch {
                expected: self.free_names.len(),
                actual: parameters.len(),
            }
            .into());
        }

        let mut values = self.model.parameters().values_map();
        for (name, &value) in self.free_names.iter().zip(parameters) {
            values.insert(name.clone(), value);
        }
        self.model.propagate(&values)?;

        let norm = self.normalization.refresh(&self.model)?;
        let coefficients = self.model.coefficients()?;

        let mut shapes = Vec::with_capacity(coefficients.len());
        let mut nll = 0.0;
        for (row, point) in self.points.iter().enumerate() {
            self.shape_values(row, point, &mut shapes)?;
            let amplitude: Complex64 = coefficients.iter().zip(&shapes).map(|(c, r)| c * r).sum();
            nll -= (amplitude.norm_sqr() / norm).ln();
        }

        self.calls += 1;
        trace!(call = self.calls, nll, norm, "likelihood evaluated");
        Ok(nll)
    }
}
