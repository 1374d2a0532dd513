//! Typed expression construction
//!
//! `Expression<K>` wraps a [`TokenStream`] with a zero-sized kind marker that
//! records the value domain: [`Real`] evaluates to `f64`, [`Complex`] to
//! `Complex64` and [`Amplitude`] to `Complex64` at a Dalitz-plot point.
//! Arithmetic between operands of different kinds yields the wider kind.

use crate::coefficient::Coefficient;
use crate::error::{DalitzError, Result};
use crate::expression::evaluator::{self, StackTrace};
use crate::expression::token::{Arity, Operation, TokenStream};
use crate::kinematics::DalitzPoint;
use crate::parameters::{Parameter, Parameters};
use crate::resonance::{BreitWigner, NonResonant, Resonance};
use num_complex::Complex64;
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Neg, Sub};

mod sealed {
    pub trait Sealed {}
}

/// Value domain of an expression
pub trait ExpressionKind: sealed::Sealed + Copy + Debug + Default + PartialEq + 'static {
    const NAME: &'static str;
}

/// Evaluates to `f64`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Real;

/// Evaluates to `Complex64` without kinematic input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Complex;

/// Evaluates to `Complex64` at a Dalitz-plot point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Amplitude;

impl sealed::Sealed for Real {}
impl sealed::Sealed for Complex {}
impl sealed::Sealed for Amplitude {}

impl ExpressionKind for Real {
    const NAME: &'static str = "real";
}

impl ExpressionKind for Complex {
    const NAME: &'static str = "complex";
}

impl ExpressionKind for Amplitude {
    const NAME: &'static str = "amplitude";
}

/// A postfix program of kind `K`
#[derive(Debug, Clone, PartialEq)]
pub struct Expression<K> {
    stream: TokenStream,
    /// First construction error met by operator composition
    invalid: Option<String>,
    kind: PhantomData<K>,
}

pub type RealExpression = Expression<Real>;
pub type ComplexExpression = Expression<Complex>;
pub type AmplitudeExpression = Expression<Amplitude>;

impl<K: ExpressionKind> Default for Expression<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ExpressionKind> Expression<K> {
    /// Empty expression, the starting point for [`accumulate`](Self::accumulate)
    pub fn new() -> Self {
        Self::from_stream(TokenStream::new())
    }

    /// Wrap an already built stream. The stream is not validated.
    pub fn from_stream(stream: TokenStream) -> Self {
        Self {
            stream,
            invalid: None,
            kind: PhantomData,
        }
    }

    /// `InvalidExpression` if operator composition put this expression together
    /// from an empty operand it cannot absorb
    ///
    /// ```
    /// use dalitz_rs::expression::RealExpression;
    /// use dalitz_rs::parameters::Parameter;
    ///
    /// let e = RealExpression::new() - Parameter::new("a", 1.0);
    /// assert!(e.check().is_err());
    /// assert!(e.evaluate().is_err());
    /// ```
    pub fn check(&self) -> Result<()> {
        match &self.invalid {
            Some(message) => Err(DalitzError::InvalidExpression(message.clone())),
            None => Ok(()),
        }
    }

    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }

    pub(crate) fn stream_mut(&mut self) -> &mut TokenStream {
        &mut self.stream
    }

    pub fn into_stream(self) -> TokenStream {
        self.stream
    }

    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stream.len()
    }

    /// Names of every parameter the expression depends on
    pub fn parameter_names(&self) -> Vec<String> {
        self.stream.parameter_names()
    }

    /// `left op right`: left content, right content, then a binary marker
    ///
    /// ```
    /// use dalitz_rs::expression::{Operation, RealExpression};
    /// use dalitz_rs::parameters::Parameter;
    ///
    /// let a = RealExpression::from(Parameter::new("a", 6.0));
    /// let b = RealExpression::from(2.0);
    /// let e = RealExpression::binary(a, b, Operation::Div).unwrap();
    /// assert_eq!(e.evaluate().unwrap(), 3.0);
    /// ```
    pub fn binary(left: Self, right: Self, op: Operation) -> Result<Self> {
        if op.arity() != Arity::Binary {
            return Err(DalitzError::InvalidExpression(format!(
                "'{}' is not a binary operation",
                op
            )));
        }
        left.check()?;
        right.check()?;
        if left.is_empty() || right.is_empty() {
            return Err(DalitzError::InvalidExpression(format!(
                "'{}' needs two non-empty operands",
                op
            )));
        }
        Ok(Self::join(left, right, op))
    }

    /// `op(operand)`: operand content followed by a unary marker
    pub fn unary(operand: Self, op: Operation) -> Result<Self> {
        if op.arity() != Arity::Unary {
            return Err(DalitzError::InvalidExpression(format!(
                "'{}' is not a unary operation",
                op
            )));
        }
        operand.check()?;
        if operand.is_empty() {
            return Err(DalitzError::InvalidExpression(format!(
                "'{}' applied to an empty expression",
                op
            )));
        }
        Ok(operand.apply(op))
    }

    /// In-place `self = self op operand`
    ///
    /// On an empty expression `Add` and `Mul` take the operand as the whole
    /// value; any other operation has no left operand and fails.
    ///
    /// ```
    /// use dalitz_rs::expression::{Operation, RealExpression};
    ///
    /// let mut sum = RealExpression::new();
    /// for x in [1.0, 2.0, 3.0] {
    ///     sum.accumulate(Operation::Add, x).unwrap();
    /// }
    /// assert_eq!(sum.evaluate().unwrap(), 6.0);
    ///
    /// let mut diff = RealExpression::new();
    /// assert!(diff.accumulate(Operation::Sub, 1.0).is_err());
    /// ```
    pub fn accumulate(&mut self, op: Operation, operand: impl Into<Self>) -> Result<()> {
        let operand = operand.into();
        operand.check()?;
        if self.is_empty() {
            return match op {
                Operation::Add | Operation::Mul if !operand.is_empty() => {
                    *self = operand;
                    Ok(())
                }
                _ => Err(DalitzError::InvalidExpression(format!(
                    "'{}' on an empty {} expression has no left operand",
                    op,
                    K::NAME
                ))),
            };
        }
        let left = std::mem::take(self);
        *self = Self::binary(left, operand, op)?;
        Ok(())
    }

    /// Operator-overload composition. An empty side of `+` or `*` is the
    /// identity; any other empty composition marks the result invalid.
    pub(crate) fn combine(left: Self, right: Self, op: Operation) -> Self {
        match op {
            Operation::Add | Operation::Mul if left.is_empty() => right,
            Operation::Add | Operation::Mul if right.is_empty() => left,
            _ => Self::join(left, right, op),
        }
    }

    fn join(mut left: Self, right: Self, op: Operation) -> Self {
        if left.invalid.is_none() && (left.is_empty() || right.is_empty()) {
            left.invalid = Some(format!(
                "'{}' on an empty {} expression has no {} operand",
                op,
                K::NAME,
                if left.is_empty() { "left" } else { "right" }
            ));
        }
        left.invalid = left.invalid.or(right.invalid);
        left.stream.splice(right.stream);
        left.stream.push_operation(op);
        left
    }

    fn apply(mut self, op: Operation) -> Self {
        if self.invalid.is_none() && self.is_empty() {
            self.invalid = Some(format!("'{}' applied to an empty {} expression", op, K::NAME));
        }
        self.stream.push_operation(op);
        self
    }

    /// Same stream and construction state under another kind
    fn promote<T: ExpressionKind>(self) -> Expression<T> {
        Expression {
            stream: self.stream,
            invalid: self.invalid,
            kind: PhantomData,
        }
    }

    pub fn pow(self, exponent: impl Into<Self>) -> Self {
        Self::join(self, exponent.into(), Operation::Pow)
    }

    pub fn exp(self) -> Self {
        self.apply(Operation::Exp)
    }

    /// Natural logarithm
    pub fn ln(self) -> Self {
        self.apply(Operation::Log)
    }

    pub fn sin(self) -> Self {
        self.apply(Operation::Sin)
    }

    pub fn cos(self) -> Self {
        self.apply(Operation::Cos)
    }

    pub fn tan(self) -> Self {
        self.apply(Operation::Tan)
    }

    pub fn sqrt(self) -> Self {
        self.apply(Operation::Sqrt)
    }
}

impl RealExpression {
    pub fn evaluate(&self) -> Result<f64> {
        self.check()?;
        evaluator::evaluate(&self.stream, None)
    }

    pub fn evaluate_traced(&self) -> Result<(f64, StackTrace)> {
        self.check()?;
        evaluator::evaluate_traced(&self.stream, None)
    }

    /// Build an expression from a formula such as `"2 * a^2 - exp(-b)"`
    ///
    /// Identifiers are resolved against `params`; each occurrence pools a copy.
    pub fn parse(formula: &str, params: &Parameters) -> Result<Self> {
        crate::expression::parse::parse_formula(formula, params)
    }
}

impl ComplexExpression {
    pub fn evaluate(&self) -> Result<Complex64> {
        self.check()?;
        evaluator::evaluate(&self.stream, None)
    }

    pub fn evaluate_traced(&self) -> Result<(Complex64, StackTrace)> {
        self.check()?;
        evaluator::evaluate_traced(&self.stream, None)
    }
}

impl AmplitudeExpression {
    pub fn evaluate(&self, point: &DalitzPoint) -> Result<Complex64> {
        self.check()?;
        evaluator::evaluate(&self.stream, Some(point))
    }

    pub fn evaluate_traced(&self, point: &DalitzPoint) -> Result<(Complex64, StackTrace)> {
        self.check()?;
        evaluator::evaluate_traced(&self.stream, Some(point))
    }
}

// Promotion keeps the stream; values are widened during evaluation

impl From<RealExpression> for ComplexExpression {
    fn from(e: RealExpression) -> Self {
        e.promote()
    }
}

impl From<RealExpression> for AmplitudeExpression {
    fn from(e: RealExpression) -> Self {
        e.promote()
    }
}

impl From<ComplexExpression> for AmplitudeExpression {
    fn from(e: ComplexExpression) -> Self {
        e.promote()
    }
}

/// Single-operand streams
trait Leaf {
    fn push_onto(self, stream: &mut TokenStream);
}

impl Leaf for f64 {
    fn push_onto(self, stream: &mut TokenStream) {
        stream.push_constant(self);
    }
}

impl Leaf for Complex64 {
    fn push_onto(self, stream: &mut TokenStream) {
        stream.push_complex_constant(self);
    }
}

impl Leaf for Parameter {
    fn push_onto(self, stream: &mut TokenStream) {
        stream.push_parameter(self);
    }
}

impl Leaf for Coefficient {
    fn push_onto(self, stream: &mut TokenStream) {
        stream.push_coefficient(self);
    }
}

impl Leaf for Resonance {
    fn push_onto(self, stream: &mut TokenStream) {
        stream.push_resonance(self);
    }
}

impl Leaf for BreitWigner {
    fn push_onto(self, stream: &mut TokenStream) {
        stream.push_resonance(self.into());
    }
}

impl Leaf for NonResonant {
    fn push_onto(self, stream: &mut TokenStream) {
        stream.push_resonance(self.into());
    }
}

macro_rules! impl_leaf_from {
    ($leaf:ty => $($kind:ty),+) => {
        $(
            impl From<$leaf> for Expression<$kind> {
                fn from(leaf: $leaf) -> Self {
                    let mut stream = TokenStream::new();
                    leaf.push_onto(&mut stream);
                    Expression::from_stream(stream)
                }
            }
        )+
    };
}

impl_leaf_from!(f64 => Real, Complex, Amplitude);
impl_leaf_from!(Parameter => Real, Complex, Amplitude);
impl_leaf_from!(Complex64 => Complex, Amplitude);
impl_leaf_from!(Coefficient => Complex, Amplitude);
impl_leaf_from!(Resonance => Amplitude);
impl_leaf_from!(BreitWigner => Amplitude);
impl_leaf_from!(NonResonant => Amplitude);

macro_rules! impl_binary_ops {
    (@op $kind:ty; $lhs:ty; $rhs:ty; $trait:ident, $method:ident, $op:expr) => {
        impl $trait<$rhs> for $lhs {
            type Output = Expression<$kind>;

            fn $method(self, rhs: $rhs) -> Expression<$kind> {
                Expression::<$kind>::combine(self.into(), rhs.into(), $op)
            }
        }
    };
    (@pair $kind:ty; $lhs:ty; $rhs:ty) => {
        impl_binary_ops!(@op $kind; $lhs; $rhs; Add, add, Operation::Add);
        impl_binary_ops!(@op $kind; $lhs; $rhs; Sub, sub, Operation::Sub);
        impl_binary_ops!(@op $kind; $lhs; $rhs; Mul, mul, Operation::Mul);
        impl_binary_ops!(@op $kind; $lhs; $rhs; Div, div, Operation::Div);
    };
    (@row $kind:ty; $lhs:ty; [$($rhs:ty),+]) => {
        $( impl_binary_ops!(@pair $kind; $lhs; $rhs); )+
    };
    ($kind:ty; [$($lhs:ty),+] x $rhs:tt) => {
        $( impl_binary_ops!(@row $kind; $lhs; $rhs); )+
    };
}

impl_binary_ops!(Real; [f64, Parameter, RealExpression] x [Parameter, RealExpression]);
impl_binary_ops!(Real; [Parameter, RealExpression] x [f64]);

impl_binary_ops!(Complex; [Parameter, RealExpression, Coefficient, ComplexExpression]
    x [Complex64, Coefficient, ComplexExpression]);
impl_binary_ops!(Complex; [f64, Complex64] x [Coefficient, ComplexExpression]);
impl_binary_ops!(Complex; [Coefficient, ComplexExpression] x [f64, Parameter, RealExpression]);
impl_binary_ops!(Complex; [Complex64] x [Parameter, RealExpression]);

impl_binary_ops!(Amplitude; [f64, Complex64, Parameter, RealExpression, Coefficient,
    ComplexExpression, Resonance, AmplitudeExpression] x [Resonance, AmplitudeExpression]);
impl_binary_ops!(Amplitude; [Resonance, AmplitudeExpression]
    x [f64, Complex64, Parameter, RealExpression, Coefficient, ComplexExpression]);

macro_rules! impl_neg {
    ($($operand:ty => $kind:ty),+ $(,)?) => {
        $(
            impl Neg for $operand {
                type Output = Expression<$kind>;

                fn neg(self) -> Expression<$kind> {
                    Expression::<$kind>::from(self).apply(Operation::Neg)
                }
            }
        )+
    };
}

impl_neg!(
    Parameter => Real,
    RealExpression => Real,
    Coefficient => Complex,
    ComplexExpression => Complex,
    Resonance => Amplitude,
    AmplitudeExpression => Amplitude,
);
