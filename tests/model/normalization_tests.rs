//! Reuse behaviour of the normalization cache on a mixed model

use crate::test_helpers::{init_tracing, d0_kinematics, fixed_breit_wigner, three_term_model};
use dalitz_rs::coefficient::Coefficient;
use dalitz_rs::error::DalitzError;
use dalitz_rs::kinematics::Channel;
use dalitz_rs::model::DalitzModel;
use dalitz_rs::normalization::{CacheState, NormalizationCache, NormalizationConfig};
use dalitz_rs::propagation::Propagate;
use approx::assert_relative_eq;

fn config() -> NormalizationConfig {
    NormalizationConfig::new().with_bins(40)
}

#[test]
fn test_partially_fixed_recomputes_dirty_entries_only() {
    init_tracing();
    let mut model = three_term_model();
    let mut cache = NormalizationCache::new(&model, config()).unwrap();
    assert_eq!(cache.state(), CacheState::PartiallyFixed);
    assert_eq!(cache.dirty(), &[false, true, false]);

    let before = cache.matrix().clone();
    let evaluations = cache.grid_evaluations();

    let mut values = model.parameters().values_map();
    values.insert("rho_mass".to_string(), 0.8);
    model.propagate(&values).unwrap();
    cache.cache(&model).unwrap();

    assert_eq!(cache.recomputed_pairs(), 3);
    // Only the rho row was evaluated again
    assert_eq!(cache.grid_evaluations() - evaluations, cache.points().len());

    for (i, j) in [(0, 0), (0, 2), (2, 0), (2, 2)] {
        assert_eq!(cache.cross_term(i, j).unwrap(), before[[i, j]]);
    }
    for (i, j) in [(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)] {
        assert_ne!(cache.cross_term(i, j).unwrap(), before[[i, j]]);
    }
}

#[test]
fn test_partial_update_matches_fresh_cache() {
    let mut model = three_term_model();
    let mut cache = NormalizationCache::new(&model, config()).unwrap();

    let mut values = model.parameters().values_map();
    values.insert("rho_width".to_string(), 0.12);
    values.insert("c_nr_re".to_string(), 0.5);
    model.propagate(&values).unwrap();
    let updated = cache.refresh(&model).unwrap();

    let fresh = NormalizationCache::new(&model, config()).unwrap();
    assert_relative_eq!(updated, fresh.normalization(&model).unwrap(), max_relative = 1e-12);
}

#[test]
fn test_all_fixed_second_call_is_free() {
    let mut model = DalitzModel::new(d0_kinematics());
    model
        .add_term(
            "kstar",
            Coefficient::polar("c_kstar", 1.0, 0.0),
            fixed_breit_wigner("kstar", 0.8917, 0.0508, Channel::M12),
        )
        .unwrap();
    model
        .add_term(
            "rho",
            Coefficient::polar("c_rho", 0.5, 1.0),
            fixed_breit_wigner("rho", 0.775, 0.149, Channel::M23),
        )
        .unwrap();

    let mut cache = NormalizationCache::new(&model, config()).unwrap();
    assert_eq!(cache.state(), CacheState::AllFixed);
    let evaluations = cache.grid_evaluations();
    let first = cache.normalization(&model).unwrap();

    // Coefficients are free and still enter the contraction
    let mut values = model.parameters().values_map();
    values.insert("c_rho_mag".to_string(), 0.0);
    model.propagate(&values).unwrap();
    let second = cache.refresh(&model).unwrap();

    assert_eq!(cache.grid_evaluations(), evaluations);
    assert_eq!(cache.recomputed_pairs(), 0);
    assert_relative_eq!(second, cache.cross_term(0, 0).unwrap().re, max_relative = 1e-12);
    assert_ne!(first, second);
}

#[test]
fn test_fixing_a_parameter_needs_reclassification() {
    let mut model = three_term_model();
    let mut cache = NormalizationCache::new(&model, config()).unwrap();

    model.fix_parameter("rho_mass").unwrap();
    model.fix_parameter("rho_width").unwrap();
    cache.reclassify(&model).unwrap();
    assert_eq!(cache.state(), CacheState::AllFixed);
    assert!(matches!(
        cache.normalization(&model),
        Err(DalitzError::InvalidState(_))
    ));

    let norm = cache.refresh(&model).unwrap();
    assert!(norm > 0.0);
}

#[test]
fn test_matrix_is_hermitian() {
    let model = three_term_model();
    let cache = NormalizationCache::new(&model, config()).unwrap();
    let n = model.len();
    for i in 0..n {
        assert!(cache.cross_term(i, i).unwrap().im.abs() < 1e-12);
        for j in 0..n {
            let a = cache.cross_term(i, j).unwrap();
            let b = cache.cross_term(j, i).unwrap();
            assert!((a - b.conj()).norm() < 1e-12);
        }
    }
    assert!(cache.cross_term(0, 3).is_err());
}
