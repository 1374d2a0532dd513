//! Stack evaluation of token streams
//!
//! One left-to-right pass over the postfix program with a single stack of the
//! expression's value type. Numerical degeneracies (division by zero, log of
//! zero, ...) are not special-cased: they propagate as IEEE infinities and NaN.

use crate::error::{DalitzError, Result};
use crate::expression::token::{Arity, Operation, Token, TokenStream};
use crate::kinematics::DalitzPoint;
use num_complex::Complex64;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Value type an expression evaluates to
///
/// Real operands are promoted into the value type with [`Scalar::from_real`].
/// Complex operands can only enter a complex value type: `from_complex`
/// returns `None` for `f64`, so a complex operand in a real evaluation fails
/// rather than being truncated.
pub trait Scalar:
    Copy
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Human readable name of the domain, used in error messages
    const DOMAIN: &'static str;

    fn from_real(value: f64) -> Self;

    fn from_complex(value: Complex64) -> Option<Self>;

    fn pow(self, exponent: Self) -> Self;

    fn exp(self) -> Self;

    fn ln(self) -> Self;

    fn sin(self) -> Self;

    fn cos(self) -> Self;

    fn tan(self) -> Self;

    fn sqrt(self) -> Self;
}

impl Scalar for f64 {
    const DOMAIN: &'static str = "real";

    fn from_real(value: f64) -> Self {
        value
    }

    fn from_complex(_value: Complex64) -> Option<Self> {
        None
    }

    fn pow(self, exponent: Self) -> Self {
        self.powf(exponent)
    }

    fn exp(self) -> Self {
        f64::exp(self)
    }

    fn ln(self) -> Self {
        f64::ln(self)
    }

    fn sin(self) -> Self {
        f64::sin(self)
    }

    fn cos(self) -> Self {
        f64::cos(self)
    }

    fn tan(self) -> Self {
        f64::tan(self)
    }

    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
}

impl Scalar for Complex64 {
    const DOMAIN: &'static str = "complex";

    fn from_real(value: f64) -> Self {
        Complex64::new(value, 0.0)
    }

    fn from_complex(value: Complex64) -> Option<Self> {
        Some(value)
    }

    fn pow(self, exponent: Self) -> Self {
        self.powc(exponent)
    }

    fn exp(self) -> Self {
        Complex64::exp(self)
    }

    fn ln(self) -> Self {
        Complex64::ln(self)
    }

    fn sin(self) -> Self {
        Complex64::sin(self)
    }

    fn cos(self) -> Self {
        Complex64::cos(self)
    }

    fn tan(self) -> Self {
        Complex64::tan(self)
    }

    fn sqrt(self) -> Self {
        Complex64::sqrt(self)
    }
}

impl Operation {
    /// Apply a binary opcode; `None` for unary opcodes
    pub fn apply_binary<V: Scalar>(self, x: V, y: V) -> Option<V> {
        let value = match self {
            Operation::Add => x + y,
            Operation::Sub => x - y,
            Operation::Mul => x * y,
            Operation::Div => x / y,
            Operation::Pow => x.pow(y),
            _ => return None,
        };
        Some(value)
    }

    /// Apply a unary opcode; `None` for binary opcodes
    pub fn apply_unary<V: Scalar>(self, x: V) -> Option<V> {
        let value = match self {
            Operation::Neg => -x,
            Operation::Exp => x.exp(),
            Operation::Log => x.ln(),
            Operation::Sin => x.sin(),
            Operation::Cos => x.cos(),
            Operation::Tan => x.tan(),
            Operation::Sqrt => x.sqrt(),
            _ => return None,
        };
        Some(value)
    }
}

/// Stack activity recorded during one evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StackTrace {
    /// Operand pushes
    pub pushes: usize,
    /// Operator applications (pop, apply, push back)
    pub reductions: usize,
    /// Deepest stack seen
    pub max_depth: usize,
}

/// In-order reader over one operand pool
struct Pool<'a, T> {
    items: &'a [T],
    next: usize,
    what: &'static str,
}

impl<'a, T> Pool<'a, T> {
    fn new(items: &'a [T], what: &'static str) -> Self {
        Self { items, next: 0, what }
    }

    fn take(&mut self, position: usize) -> Result<&'a T> {
        let item = self.items.get(self.next).ok_or_else(|| {
            DalitzError::stack(position, format!("{} pool exhausted", self.what))
        })?;
        self.next += 1;
        Ok(item)
    }

    fn exhausted(&self) -> bool {
        self.next == self.items.len()
    }
}

/// Evaluate `stream` in the value domain `V`
///
/// `point` is required only when the stream pools resonances.
pub fn evaluate<V: Scalar>(stream: &TokenStream, point: Option<&DalitzPoint>) -> Result<V> {
    run(stream, point, None)
}

/// Evaluate `stream`, also reporting the stack activity
pub fn evaluate_traced<V: Scalar>(
    stream: &TokenStream,
    point: Option<&DalitzPoint>,
) -> Result<(V, StackTrace)> {
    let mut trace = StackTrace::default();
    let value = run(stream, point, Some(&mut trace))?;
    Ok((value, trace))
}

fn run<V: Scalar>(
    stream: &TokenStream,
    point: Option<&DalitzPoint>,
    mut trace: Option<&mut StackTrace>,
) -> Result<V> {
    let mut constants = Pool::new(stream.constants(), "constant");
    let mut complex_constants = Pool::new(stream.complex_constants(), "complex constant");
    let mut parameters = Pool::new(stream.parameters(), "parameter");
    let mut coefficients = Pool::new(stream.coefficients(), "coefficient");
    let mut resonances = Pool::new(stream.resonances(), "resonance");
    let mut operations = Pool::new(stream.operations(), "operation");

    let mut stack: Vec<V> = Vec::with_capacity(stream.len() / 2 + 1);

    let complex_operand = |value: Complex64, position: usize| {
        V::from_complex(value).ok_or_else(|| {
            DalitzError::stack(
                position,
                format!("complex operand in a {} expression", V::DOMAIN),
            )
        })
    };

    for (position, token) in stream.tokens().iter().enumerate() {
        match token {
            Token::Constant => stack.push(V::from_real(*constants.take(position)?)),
            Token::ComplexConstant => {
                let value = *complex_constants.take(position)?;
                stack.push(complex_operand(value, position)?);
            }
            Token::Parameter => stack.push(V::from_real(parameters.take(position)?.value())),
            Token::Coefficient => {
                let value = coefficients.take(position)?.value();
                stack.push(complex_operand(value, position)?);
            }
            Token::SubModel => {
                let resonance = resonances.take(position)?;
                let point = point.ok_or_else(|| {
                    DalitzError::stack(
                        position,
                        format!("resonance '{}' needs a phase-space point", resonance.name()),
                    )
                })?;
                stack.push(complex_operand(resonance.evaluate(point), position)?);
            }
            Token::Binary => {
                let op = *operations.take(position)?;
                if op.arity() != Arity::Binary {
                    return Err(DalitzError::stack(
                        position,
                        format!("binary marker holds unary operation '{}'", op),
                    ));
                }
                let depth = stack.len();
                // Right operand was appended last
                let (Some(y), Some(x)) = (stack.pop(), stack.pop()) else {
                    return Err(DalitzError::stack(
                        position,
                        format!("'{}' needs 2 operands, found {}", op, depth),
                    ));
                };
                let value = op
                    .apply_binary(x, y)
                    .ok_or_else(|| DalitzError::stack(position, "unary opcode in binary slot"))?;
                stack.push(value);
                if let Some(trace) = trace.as_deref_mut() {
                    trace.reductions += 1;
                }
                continue;
            }
            Token::Unary => {
                let op = *operations.take(position)?;
                if op.arity() != Arity::Unary {
                    return Err(DalitzError::stack(
                        position,
                        format!("unary marker holds binary operation '{}'", op),
                    ));
                }
                let x = stack.pop().ok_or_else(|| {
                    DalitzError::stack(position, format!("'{}' needs 1 operand, found 0", op))
                })?;
                let value = op
                    .apply_unary(x)
                    .ok_or_else(|| DalitzError::stack(position, "binary opcode in unary slot"))?;
                stack.push(value);
                if let Some(trace) = trace.as_deref_mut() {
                    trace.reductions += 1;
                }
                continue;
            }
        }

        // Operand tokens fall through to here
        if let Some(trace) = trace.as_deref_mut() {
            trace.pushes += 1;
            trace.max_depth = trace.max_depth.max(stack.len());
        }
    }

    let end = stream.len();
    let all_consumed = constants.exhausted()
        && complex_constants.exhausted()
        && parameters.exhausted()
        && coefficients.exhausted()
        && resonances.exhausted()
        && operations.exhausted();
    if !all_consumed {
        return Err(DalitzError::stack(end, "operand pools not fully consumed"));
    }

    match stack.as_slice() {
        [value] => Ok(*value),
        other => Err(DalitzError::stack(
            end,
            format!("expected exactly one value on the stack, found {}", other.len()),
        )),
    }
}
