//! Toy samples generated from a model and fitted back

use crate::test_helpers::{init_tracing, three_term_model};
use dalitz_rs::events::EventSource;
use dalitz_rs::normalization::{NormalizationCache, NormalizationConfig};
use dalitz_rs::session::{FitSession, NllObjective, Objective, SessionConfig};
use dalitz_rs::toy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn test_toy_sample_is_reproducible() {
    let model = three_term_model();
    let cache = NormalizationCache::new(&model, NormalizationConfig::new().with_bins(30)).unwrap();

    let a = toy::generate(&model, &cache, 100, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
    let b = toy::generate(&model, &cache, 100, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.fields(), &toy::FIELDS);

    for row in 0..a.len() {
        let m12 = a.value("m12sq", row).unwrap();
        let m13 = a.value("m13sq", row).unwrap();
        let m23 = a.value("m23sq", row).unwrap();
        let point = model.kinematics().point(m12, m13);
        assert!(model.kinematics().contains_point(&point));
        assert!((point.m23sq - m23).abs() < 1e-12);
    }
}

#[test]
fn test_true_values_are_preferred() {
    init_tracing();
    let model = three_term_model();
    let cache = NormalizationCache::new(&model, NormalizationConfig::new().with_bins(40)).unwrap();
    let events = toy::generate(&model, &cache, 1000, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();

    let mut session = FitSession::new(SessionConfig {
        normalization: NormalizationConfig::new().with_bins(40),
        ..SessionConfig::default()
    });
    let mut objective = NllObjective::new(&mut session, model.clone(), &events).unwrap();

    let names = objective.parameter_names().to_vec();
    let truth: Vec<f64> = names
        .iter()
        .map(|n| model.parameters().get(n).unwrap().value())
        .collect();
    let mut shifted = truth.clone();
    let index = names.iter().position(|n| n == "rho_mass").unwrap();
    shifted[index] = 1.1;

    let at_truth = objective.value(&truth).unwrap();
    let off = objective.value(&shifted).unwrap();
    assert!(at_truth < off, "nll {} at truth vs {} off", at_truth, off);
    assert_eq!(objective.calls(), 2);
}
