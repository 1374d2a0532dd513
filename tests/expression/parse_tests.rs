//! Formula parsing against a parameter collection

use dalitz_rs::error::DalitzError;
use dalitz_rs::expression::RealExpression;
use dalitz_rs::parameters::Parameters;
use dalitz_rs::propagation::Propagate;
use approx::assert_relative_eq;
use std::collections::HashMap;

fn params() -> Parameters {
    let mut params = Parameters::new();
    params.add_param("m0", 0.775).unwrap();
    params.add_param("g0", 0.149).unwrap();
    params.add_param("s", 0.6).unwrap();
    params
}

#[test]
fn test_parse_matches_builder() {
    let p = params();
    let parsed = RealExpression::parse("(m0^2 - s) / (m0 * g0)", &p).unwrap();

    let m0 = p.get("m0").unwrap().clone();
    let g0 = p.get("g0").unwrap().clone();
    let s = p.get("s").unwrap().clone();
    let built: RealExpression =
        (RealExpression::from(m0.clone()).pow(2.0) - s) / (m0 * g0);

    assert_eq!(parsed.stream().tokens(), built.stream().tokens());
    assert_relative_eq!(parsed.evaluate().unwrap(), built.evaluate().unwrap());
}

#[test]
fn test_parsed_expression_follows_propagation() {
    let mut e = RealExpression::parse("2 * s + exp(-s)", &params()).unwrap();
    assert_relative_eq!(e.evaluate().unwrap(), 1.2 + (-0.6f64).exp(), epsilon = 1e-12);

    let mut values = HashMap::new();
    values.insert("s".to_string(), 0.0);
    e.propagate(&values).unwrap();
    assert_relative_eq!(e.evaluate().unwrap(), 1.0, epsilon = 1e-12);
}

#[test]
fn test_parse_errors() {
    let p = params();
    assert!(matches!(
        RealExpression::parse("m0 + q", &p),
        Err(DalitzError::MissingParameter { .. })
    ));
    assert!(matches!(
        RealExpression::parse("m0 +* s", &p),
        Err(DalitzError::Parse(_))
    ));
    assert!(matches!(
        RealExpression::parse("atan(s)", &p),
        Err(DalitzError::Parse(_))
    ));
}

#[test]
fn test_deep_nesting_is_a_parse_error() {
    let p = params();
    let formula = format!("{}s{}", "(".repeat(50_000), ")".repeat(50_000));
    assert!(matches!(
        RealExpression::parse(&formula, &p),
        Err(DalitzError::Parse(message)) if message.contains("nested too deeply")
    ));

    // Moderate nesting still parses
    let formula = format!("{}s{}", "(".repeat(20), ")".repeat(20));
    assert_relative_eq!(RealExpression::parse(&formula, &p).unwrap().evaluate().unwrap(), 0.6);
}
