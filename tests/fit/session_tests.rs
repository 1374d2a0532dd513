//! Likelihood objective driven the way a minimiser would

use crate::test_helpers::{init_tracing, three_term_model};
use dalitz_rs::error::DalitzError;
use dalitz_rs::events::EventTable;
use dalitz_rs::model::DalitzModel;
use dalitz_rs::normalization::{IntegrationGrid, NormalizationCache, NormalizationConfig};
use dalitz_rs::propagation::Propagate;
use dalitz_rs::session::{FitSession, NllObjective, Objective, SessionConfig};
use approx::assert_relative_eq;

fn session() -> FitSession {
    FitSession::new(SessionConfig {
        normalization: NormalizationConfig::new().with_bins(30),
        ..SessionConfig::default()
    })
}

/// Every allowed cell centre of a coarse grid, as an event table
fn grid_events(model: &DalitzModel) -> EventTable {
    let grid = IntegrationGrid::new(model.kinematics(), 12).unwrap();
    let rows: Vec<Vec<f64>> = grid
        .allowed_points()
        .iter()
        .map(|p| vec![p.m12sq, p.m13sq])
        .collect();
    EventTable::from_rows(&["m12sq", "m13sq"], &rows).unwrap()
}

fn free_values(model: &DalitzModel) -> Vec<f64> {
    model.parameters().free().iter().map(|p| p.value()).collect()
}

fn reference_nll(model: &DalitzModel, events: &EventTable, bins: usize) -> f64 {
    let cache = NormalizationCache::new(model, NormalizationConfig::new().with_bins(bins)).unwrap();
    let norm = cache.normalization(model).unwrap();
    events
        .data()
        .rows()
        .into_iter()
        .map(|row| {
            let point = model.kinematics().point(row[0], row[1]);
            -(model.intensity(&point).unwrap() / norm).ln()
        })
        .sum()
}

#[test]
fn test_nll_matches_direct_sum() {
    init_tracing();
    let model = three_term_model();
    let events = grid_events(&model);
    let expected = reference_nll(&model, &events, 30);

    let mut session = session();
    let mut objective = NllObjective::new(&mut session, model.clone(), &events).unwrap();
    let nll = objective.value(&free_values(&model)).unwrap();

    assert!(nll.is_finite());
    assert_relative_eq!(nll, expected, max_relative = 1e-10);
    assert_eq!(objective.calls(), 1);
}

#[test]
fn test_nll_follows_proposed_values() {
    let model = three_term_model();
    let events = grid_events(&model);

    let mut session = session();
    let mut objective = NllObjective::new(&mut session, model.clone(), &events).unwrap();
    let names = objective.parameter_names().to_vec();
    let mut proposal = free_values(&model);
    let index = names.iter().position(|n| n == "rho_mass").unwrap();
    proposal[index] = 0.82;

    let nll = objective.value(&proposal).unwrap();
    assert_eq!(
        objective.model().parameters().get("rho_mass").unwrap().value(),
        0.82
    );

    let mut moved = model;
    let mut values = moved.parameters().values_map();
    values.insert("rho_mass".to_string(), 0.82);
    moved.propagate(&values).unwrap();
    assert_relative_eq!(nll, reference_nll(&moved, &events, 30), max_relative = 1e-10);
}

#[test]
fn test_slots_cover_clean_terms() {
    let model = three_term_model();
    let events = grid_events(&model);
    let mut session = session();

    {
        let objective = NllObjective::new(&mut session, model, &events).unwrap();
        let slots = objective.slots();
        assert!(slots[0].is_some());
        assert!(slots[1].is_none());
        assert!(slots[2].is_some());
        assert_ne!(slots[0], slots[2]);
    }
    // Dropping the objective frees its columns but not its slot numbers
    assert_eq!(session.allocated_slots(), 2);
    assert!(session.event_cache().is_empty());
}

#[test]
fn test_rebuilt_objectives_do_not_accumulate_columns() {
    let model = three_term_model();
    let events = grid_events(&model);
    let mut session = session();

    let mut last = Vec::new();
    for _ in 0..3 {
        let mut objective = NllObjective::new(&mut session, model.clone(), &events).unwrap();
        objective.value(&free_values(&model)).unwrap();
        last.push(objective.value(&free_values(&model)).unwrap());
    }
    assert!(session.event_cache().is_empty());
    assert_eq!(session.allocated_slots(), 6);
    assert_eq!(last[0], last[2]);

    // Columns of a live objective stay until it goes away
    let objective = NllObjective::new(&mut session, model, &events).unwrap();
    assert_eq!(objective.slots().iter().flatten().count(), 2);
    drop(objective);
    assert!(session.event_cache().is_empty());
}

#[test]
fn test_parameter_vector_length_is_checked() {
    let model = three_term_model();
    let events = grid_events(&model);
    let mut session = session();
    let mut objective = NllObjective::new(&mut session, model, &events).unwrap();

    assert!(matches!(objective.value(&[1.0]), Err(DalitzError::Parameter(_))));
    assert_eq!(objective.calls(), 0);
}

#[test]
fn test_missing_event_field() {
    let model = three_term_model();
    let events = EventTable::from_rows(&["m12sq", "other"], &[vec![1.0, 1.0]]).unwrap();
    let mut session = session();
    assert!(matches!(
        NllObjective::new(&mut session, model, &events),
        Err(DalitzError::OutOfRange(_))
    ));
}
