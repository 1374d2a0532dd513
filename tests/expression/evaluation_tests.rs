//! Evaluation semantics of built expressions

use crate::test_helpers::{complex_approx_eq, d0_kinematics};
use dalitz_rs::coefficient::Coefficient;
use dalitz_rs::error::DalitzError;
use dalitz_rs::expression::{evaluate, AmplitudeExpression, Operation, RealExpression, TokenStream};
use dalitz_rs::kinematics::Channel;
use dalitz_rs::parameters::Parameter;
use dalitz_rs::resonance::{BreitWigner, NonResonant, Resonance};
use num_complex::Complex64;

#[test]
fn test_two_term_stub_amplitude() {
    let r1 = Resonance::from(NonResonant::new("r1"));
    let r2 = Resonance::from(NonResonant::with_value("r2", Complex64::new(0.0, 1.0)));
    let c1 = Coefficient::cartesian("c1", 1.0, 0.0);
    let c2 = Coefficient::cartesian("c2", 0.5, 0.5);

    let amp: AmplitudeExpression = c1 * r1 + c2 * r2;
    let point = d0_kinematics().point(1.0, 1.2);
    let value = amp.evaluate(&point).unwrap();
    assert!(complex_approx_eq(value, Complex64::new(0.5, 0.5), 1e-12));
}

#[test]
fn test_extra_binary_token_is_an_error() {
    let mut stream = TokenStream::new();
    stream.push_parameter(Parameter::new("a", 1.0));
    stream.push_parameter(Parameter::new("b", 2.0));
    stream.push_operation(Operation::Add);
    stream.push_operation(Operation::Sub);

    let e = RealExpression::from_stream(stream);
    assert!(matches!(
        e.evaluate(),
        Err(DalitzError::EvaluationStack { position: 3, .. })
    ));
}

#[test]
fn test_operand_count_matches_pushes() {
    let rho = Resonance::from(BreitWigner::new("rho", 0.775, 0.149, Channel::M23));
    let amp: AmplitudeExpression =
        (Coefficient::polar("c", 1.0, 0.2) * rho) * (Parameter::new("s", 2.0) + 1.0);

    let point = d0_kinematics().point(1.0, 1.2);
    let (_, trace) = amp.evaluate_traced(&point).unwrap();
    assert_eq!(trace.pushes, amp.stream().operand_count());
    assert_eq!(trace.reductions, amp.stream().operator_count());
}

#[test]
fn test_real_domain_rejects_complex_operands() {
    let mut stream = TokenStream::new();
    stream.push_complex_constant(Complex64::new(1.0, 1.0));
    assert!(evaluate::<f64>(&stream, None).is_err());
    assert_eq!(
        evaluate::<Complex64>(&stream, None).unwrap(),
        Complex64::new(1.0, 1.0)
    );
}

#[test]
fn test_ieee_values_propagate() {
    let zero = Parameter::new("z", 0.0);
    let e: RealExpression = RealExpression::from(1.0) / zero.clone();
    assert_eq!(e.evaluate().unwrap(), f64::INFINITY);

    let e = RealExpression::from(zero).ln();
    assert_eq!(e.evaluate().unwrap(), f64::NEG_INFINITY);

    let e = RealExpression::from(-1.0).sqrt();
    assert!(e.evaluate().unwrap().is_nan());
}

#[test]
fn test_complex_functions() {
    // exp(i*pi) = -1
    let e = dalitz_rs::expression::ComplexExpression::from(Complex64::new(0.0, std::f64::consts::PI)).exp();
    assert!(complex_approx_eq(e.evaluate().unwrap(), Complex64::new(-1.0, 0.0), 1e-12));

    // sqrt(-4) = 2i in the complex domain
    let e = dalitz_rs::expression::ComplexExpression::from(-4.0).sqrt();
    assert!(complex_approx_eq(e.evaluate().unwrap(), Complex64::new(0.0, 2.0), 1e-12));
}
