//! Token streams and operand pools
//!
//! A built expression is a flat postfix program: one `Token` per operand or
//! operator, in construction order, plus one pool per operand tag. Pools carry
//! no indices into the token sequence; the evaluator consumes each pool in
//! order as it meets the matching tag.

use crate::coefficient::Coefficient;
use crate::parameters::Parameter;
use crate::resonance::Resonance;
use num_complex::Complex64;
use std::fmt;

/// Tag of one entry of a postfix program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Next entry of the real constant pool
    Constant,
    /// Next entry of the complex constant pool
    ComplexConstant,
    /// Next entry of the parameter pool
    Parameter,
    /// Next entry of the coefficient pool
    Coefficient,
    /// Next entry of the resonance pool, evaluated at the current point
    SubModel,
    /// Apply the next operation to the two topmost values
    Binary,
    /// Apply the next operation to the topmost value
    Unary,
}

impl Token {
    /// Whether the token pushes a pooled operand
    pub fn is_operand(self) -> bool {
        !matches!(self, Token::Binary | Token::Unary)
    }
}

/// Number of operands an operation consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Unary,
    Binary,
}

/// Opcode applied by the stack evaluator to real or complex operands alike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Neg,
    Exp,
    Log,
    Sin,
    Cos,
    Tan,
    Sqrt,
}

impl Operation {
    pub fn arity(self) -> Arity {
        match self {
            Operation::Add | Operation::Sub | Operation::Mul | Operation::Div | Operation::Pow => {
                Arity::Binary
            }
            _ => Arity::Unary,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "*",
            Operation::Div => "/",
            Operation::Pow => "^",
            Operation::Neg => "neg",
            Operation::Exp => "exp",
            Operation::Log => "log",
            Operation::Sin => "sin",
            Operation::Cos => "cos",
            Operation::Tan => "tan",
            Operation::Sqrt => "sqrt",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Postfix program with its operand pools
///
/// Append-only while an expression is built. Afterwards only parameter values
/// change, through [`Propagate`](crate::propagation::Propagate).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
    constants: Vec<f64>,
    complex_constants: Vec<Complex64>,
    parameters: Vec<Parameter>,
    coefficients: Vec<Coefficient>,
    resonances: Vec<Resonance>,
    operations: Vec<Operation>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn constants(&self) -> &[f64] {
        &self.constants
    }

    pub fn complex_constants(&self) -> &[Complex64] {
        &self.complex_constants
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    pub fn resonances(&self) -> &[Resonance] {
        &self.resonances
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub(crate) fn parameters_mut(&mut self) -> &mut [Parameter] {
        &mut self.parameters
    }

    pub(crate) fn coefficients_mut(&mut self) -> &mut [Coefficient] {
        &mut self.coefficients
    }

    pub(crate) fn resonances_mut(&mut self) -> &mut [Resonance] {
        &mut self.resonances
    }

    pub fn push_constant(&mut self, value: f64) {
        self.tokens.push(Token::Constant);
        self.constants.push(value);
    }

    pub fn push_complex_constant(&mut self, value: Complex64) {
        self.tokens.push(Token::ComplexConstant);
        self.complex_constants.push(value);
    }

    pub fn push_parameter(&mut self, parameter: Parameter) {
        self.tokens.push(Token::Parameter);
        self.parameters.push(parameter);
    }

    pub fn push_coefficient(&mut self, coefficient: Coefficient) {
        self.tokens.push(Token::Coefficient);
        self.coefficients.push(coefficient);
    }

    pub fn push_resonance(&mut self, resonance: Resonance) {
        self.tokens.push(Token::SubModel);
        self.resonances.push(resonance);
    }

    /// Append an operator marker matching the arity of `op`
    pub fn push_operation(&mut self, op: Operation) {
        self.tokens.push(match op.arity() {
            Arity::Binary => Token::Binary,
            Arity::Unary => Token::Unary,
        });
        self.operations.push(op);
    }

    /// Append the whole content of `other`, tokens and pools in order
    pub fn splice(&mut self, other: TokenStream) {
        let TokenStream {
            tokens,
            constants,
            complex_constants,
            parameters,
            coefficients,
            resonances,
            operations,
        } = other;
        self.tokens.extend(tokens);
        self.constants.extend(constants);
        self.complex_constants.extend(complex_constants);
        self.parameters.extend(parameters);
        self.coefficients.extend(coefficients);
        self.resonances.extend(resonances);
        self.operations.extend(operations);
    }

    /// Replace the tag of the last operator marker, leaving the operation pool alone
    #[cfg(test)]
    pub(crate) fn corrupt_last_marker(&mut self, marker: Token) {
        if let Some(last) = self.tokens.iter_mut().rev().find(|t| !t.is_operand()) {
            *last = marker;
        }
    }

    /// Total size of the operand pools
    pub fn operand_count(&self) -> usize {
        self.constants.len()
            + self.complex_constants.len()
            + self.parameters.len()
            + self.coefficients.len()
            + self.resonances.len()
    }

    /// Number of operator markers
    pub fn operator_count(&self) -> usize {
        self.operations.len()
    }

    /// Check that every tag has a pool entry and every marker an operation
    pub fn is_consistent(&self) -> bool {
        let count = |tag: Token| self.tokens.iter().filter(|&&t| t == tag).count();
        let markers_match = self
            .operations
            .iter()
            .map(|op| op.arity())
            .eq(self
                .tokens
                .iter()
                .filter(|t| !t.is_operand())
                .map(|t| if *t == Token::Binary { Arity::Binary } else { Arity::Unary }));

        self.tokens.len() == self.operand_count() + self.operator_count()
            && count(Token::Constant) == self.constants.len()
            && count(Token::ComplexConstant) == self.complex_constants.len()
            && count(Token::Parameter) == self.parameters.len()
            && count(Token::Coefficient) == self.coefficients.len()
            && count(Token::SubModel) == self.resonances.len()
            && markers_match
    }

    /// Names of every parameter the stream depends on, first occurrence first.
    ///
    /// Includes the parameters inside coefficients and resonances.
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        };
        for p in &self.parameters {
            push(p.name());
        }
        for c in &self.coefficients {
            for p in c.parameters() {
                push(p.name());
            }
        }
        for r in &self.resonances {
            for p in r.parameters() {
                push(p.name());
            }
        }
        names
    }

    /// Every parameter copy held by the stream, including nested ones
    pub fn all_parameters(&self) -> Vec<&Parameter> {
        let mut params: Vec<&Parameter> = self.parameters.iter().collect();
        for c in &self.coefficients {
            params.extend(c.parameters());
        }
        for r in &self.resonances {
            params.extend(r.parameters());
        }
        params
    }
}
