//! Propagation of parameter values through a model

use crate::test_helpers::three_term_model;
use dalitz_rs::error::DalitzError;
use dalitz_rs::model::TermShape;
use dalitz_rs::propagation::Propagate;
use std::collections::HashMap;

fn rho_mass_copy(model: &dalitz_rs::model::DalitzModel) -> f64 {
    match model.terms()[1].shape() {
        TermShape::Expression(shape) => shape.stream().resonances()[0].parameters()[0].value(),
        _ => panic!("Expected an expression shape"),
    }
}

#[test]
fn test_propagate_reaches_every_copy() {
    let mut model = three_term_model();
    let point = model.kinematics().point(1.2, 1.5);
    let before = model.amplitude(&point).unwrap();

    let mut values = model.parameters().values_map();
    values.insert("rho_mass".to_string(), 0.8);
    values.insert("c_rho_phase".to_string(), 1.0);
    model.propagate(&values).unwrap();

    assert_eq!(model.parameters().get("rho_mass").unwrap().value(), 0.8);
    assert_eq!(rho_mass_copy(&model), 0.8);
    assert_ne!(model.amplitude(&point).unwrap(), before);
}

#[test]
fn test_missing_name_leaves_model_untouched() {
    let mut model = three_term_model();
    let mut values = model.parameters().values_map();
    values.insert("rho_mass".to_string(), 0.8);
    values.remove("c_nr_im");

    assert!(matches!(
        model.propagate(&values),
        Err(DalitzError::MissingParameter { name }) if name == "c_nr_im"
    ));
    assert_eq!(model.parameters().get("rho_mass").unwrap().value(), 0.775);
    assert_eq!(rho_mass_copy(&model), 0.775);
}

#[test]
fn test_extra_names_are_ignored() {
    let mut model = three_term_model();
    let mut values: HashMap<String, f64> = model.parameters().values_map();
    values.insert("unrelated".to_string(), 42.0);
    model.propagate(&values).unwrap();
    assert!(!model.parameters().contains("unrelated"));
}

#[test]
fn test_parameters_as_source() {
    let mut model = three_term_model();
    let mut canonical = model.parameters().clone();
    canonical.get_mut("rho_width").unwrap().set_value(0.2).unwrap();

    model.propagate(&canonical).unwrap();
    match model.terms()[1].shape() {
        TermShape::Expression(shape) => {
            assert_eq!(shape.stream().resonances()[0].parameters()[1].value(), 0.2)
        }
        _ => panic!("Expected an expression shape"),
    }
}
