//! Integration tests for the Parameters collection

use dalitz_rs::error::DalitzError;
use dalitz_rs::parameters::{Parameter, Parameters};
use std::f64::INFINITY;

#[test]
fn test_parameters_basic_operations() {
    let mut params = Parameters::new();
    assert!(params.is_empty());

    params.add(Parameter::new("rho_mass", 0.775)).unwrap();
    params.add_param("rho_width", 0.149).unwrap();
    params
        .add_param_with_bounds("c_rho_mag", 1.0, 0.0, 10.0)
        .unwrap();
    assert_eq!(params.len(), 3);

    // Bounded values are checked on the public setter
    let mag = params.get_mut("c_rho_mag").unwrap();
    assert!(mag.set_value(11.0).is_err());
    mag.set_value(2.0).unwrap();

    assert_eq!(params.get("c_rho_mag").unwrap().value(), 2.0);
    assert!(params.get("nonexistent").is_none());
}

#[test]
fn test_missing_parameter_converts_to_crate_error() {
    let params = Parameters::new();
    let err: DalitzError = params.require("kstar_mass").unwrap_err().into();
    match err {
        DalitzError::MissingParameter { name } => assert_eq!(name, "kstar_mass"),
        other => panic!("Expected MissingParameter, got {:?}", other),
    }
}

#[test]
fn test_fix_release_listing() {
    let mut params = Parameters::new();
    params.add_param("a", 1.0).unwrap();
    params.add_param("b", 2.0).unwrap();
    params.add_param("c", 3.0).unwrap();

    params.get_mut("b").unwrap().fix();
    assert_eq!(params.free_names(), vec!["a", "c"]);

    params.get_mut("b").unwrap().release();
    params.get_mut("a").unwrap().fix();
    assert_eq!(params.free_names(), vec!["b", "c"]);
}

#[test]
fn test_json_with_unbounded_side() {
    let mut params = Parameters::new();
    params
        .add_param_with_bounds("width", 0.1, 0.0, INFINITY)
        .unwrap();
    params.add(Parameter::fixed("mass", 0.98)).unwrap();

    let json = params.to_json().unwrap();
    let loaded = Parameters::from_json(&json).unwrap();

    let width = loaded.get("width").unwrap();
    assert_eq!(width.bounds().unwrap().upper, INFINITY);
    assert!(loaded.get("mass").unwrap().is_fixed());
    assert_eq!(loaded.names(), params.names());
}
