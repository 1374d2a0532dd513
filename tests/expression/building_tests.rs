//! Token layout produced by operator composition

use dalitz_rs::coefficient::Coefficient;
use dalitz_rs::error::DalitzError;
use dalitz_rs::expression::{
    AmplitudeExpression, ComplexExpression, Operation, RealExpression, Token,
};
use dalitz_rs::parameters::Parameter;
use dalitz_rs::propagation::Propagate;
use dalitz_rs::resonance::{NonResonant, Resonance};
use approx::assert_relative_eq;
use num_complex::Complex64;
use std::collections::HashMap;

#[test]
fn test_composition_is_concatenation() {
    let a = Parameter::new("a", 1.0);
    let b = Parameter::new("b", 2.0);
    let c = Parameter::new("c", 3.0);

    // (a + b) * c
    let left: RealExpression = a + b;
    let e: RealExpression = left.clone() * c;

    let mut expected = left.stream().tokens().to_vec();
    expected.push(Token::Parameter);
    expected.push(Token::Binary);
    assert_eq!(e.stream().tokens(), expected.as_slice());
    assert_eq!(e.stream().operations(), &[Operation::Add, Operation::Mul]);
    assert!(e.stream().is_consistent());
    assert_eq!(e.evaluate().unwrap(), 9.0);
}

#[test]
fn test_token_count_invariant() {
    let e: ComplexExpression = (Parameter::new("x", 0.5) * 2.0 - 1.0).exp()
        * Coefficient::polar("c", 1.0, 0.5)
        + Complex64::new(0.0, 1.0);

    let stream = e.stream();
    assert_eq!(stream.len(), stream.operand_count() + stream.operator_count());
    assert!(stream.is_consistent());
}

#[test]
fn test_right_nested_composition() {
    // a - (b - c) is not (a - b) - c
    let a = Parameter::new("a", 10.0);
    let b = Parameter::new("b", 4.0);
    let c = Parameter::new("c", 1.0);

    let nested: RealExpression = a.clone() - (b.clone() - c.clone());
    let flat: RealExpression = (a - b) - c;
    assert_eq!(nested.evaluate().unwrap(), 7.0);
    assert_eq!(flat.evaluate().unwrap(), 5.0);
}

#[test]
fn test_accumulate_builds_sum_of_terms() {
    let mut amp = AmplitudeExpression::new();
    for (i, phase) in [0.0, 1.0, 2.0].iter().enumerate() {
        let c = Coefficient::polar(&format!("c{}", i), 1.0, *phase);
        let r = Resonance::from(NonResonant::new(&format!("nr{}", i)));
        amp.accumulate(Operation::Add, c * r).unwrap();
    }
    // Two additions for three terms
    let adds = amp
        .stream()
        .operations()
        .iter()
        .filter(|op| **op == Operation::Add)
        .count();
    assert_eq!(adds, 2);
    assert_eq!(amp.stream().coefficients().len(), 3);
    assert_eq!(amp.stream().resonances().len(), 3);
}

#[test]
fn test_clone_is_independent() {
    let e: RealExpression = Parameter::new("a", 1.0) + 1.0;
    let mut copy = e.clone();
    copy.accumulate(Operation::Mul, 5.0).unwrap();

    assert_eq!(e.evaluate().unwrap(), 2.0);
    assert_eq!(copy.evaluate().unwrap(), 10.0);
}

#[test]
fn test_grouping_changes_layout_not_value() {
    let a = Parameter::new("a", 1.0);
    let b = Parameter::new("b", 2.0);
    let c = Parameter::new("c", 3.0);

    let mut left: RealExpression = (a.clone() + b.clone()) + c.clone();
    let mut right: RealExpression = a + (b + c);

    assert_eq!(
        left.stream().tokens(),
        &[Token::Parameter, Token::Parameter, Token::Binary, Token::Parameter, Token::Binary]
    );
    assert_eq!(
        right.stream().tokens(),
        &[Token::Parameter, Token::Parameter, Token::Parameter, Token::Binary, Token::Binary]
    );
    assert_ne!(left.stream().tokens(), right.stream().tokens());
    assert_eq!(left.stream().operations(), right.stream().operations());

    for (va, vb, vc) in [(1.0, 2.0, 3.0), (-0.5, 1e3, 2.25), (1e-8, -7.0, 0.125), (0.0, 0.0, -4.0)] {
        let mut values = HashMap::new();
        values.insert("a".to_string(), va);
        values.insert("b".to_string(), vb);
        values.insert("c".to_string(), vc);
        left.propagate(&values).unwrap();
        right.propagate(&values).unwrap();

        assert_relative_eq!(
            left.evaluate().unwrap(),
            right.evaluate().unwrap(),
            epsilon = 1e-12,
            max_relative = 1e-12
        );
    }
}

#[test]
fn test_leading_subtraction_fails_at_construction() {
    let p = Parameter::new("a", 4.0);

    let sub = RealExpression::new() - p.clone();
    assert!(matches!(sub.check(), Err(DalitzError::InvalidExpression(_))));
    assert!(matches!(sub.evaluate(), Err(DalitzError::InvalidExpression(_))));

    let div = RealExpression::new() / 2.0;
    assert!(matches!(div.evaluate(), Err(DalitzError::InvalidExpression(_))));

    // Identity sides stay valid
    let sum = RealExpression::new() + p.clone();
    assert!(sum.check().is_ok());
    assert_eq!(sum.evaluate().unwrap(), 4.0);

    let amp: AmplitudeExpression = AmplitudeExpression::new() - Resonance::from(NonResonant::new("nr"));
    let point = crate::test_helpers::d0_kinematics().point(1.0, 1.2);
    assert!(matches!(amp.evaluate(&point), Err(DalitzError::InvalidExpression(_))));
}
