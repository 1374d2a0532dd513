//! Formula strings to real expressions
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := factor (('*' | '/') factor)*
//! factor  := '-' factor | power
//! power   := primary ('^' factor)?
//! primary := number | name '(' expr ')' | name | '(' expr ')'
//! ```
//!
//! `+ - * /` associate to the left, `^` to the right. Parsing builds a small
//! syntax tree which is then lowered through the expression builder, so parsed
//! and hand-built expressions share one token layout.
//!
//! Nesting is bounded: past [`MAX_DEPTH`] levels of grouping, calls, unary
//! minus or powers, or a tree taller than [`MAX_HEIGHT`], parsing fails with
//! `Parse` instead of exhausting the stack.

use crate::error::{DalitzError, Result};
use crate::expression::builder::RealExpression;
use crate::expression::token::Operation;
use crate::parameters::Parameters;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::{Error, ErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

type ParseResult<'a, T> = IResult<&'a str, T>;

/// Deepest accepted nesting of parentheses, calls, unary minus and powers
pub(crate) const MAX_DEPTH: usize = 64;

/// Tallest accepted syntax tree, which also bounds long operator chains
pub(crate) const MAX_HEIGHT: usize = 512;

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    Number(f64),
    Name(String),
    Neg(Box<Node>),
    Binary(Operation, Box<Node>, Box<Node>),
    Call(String, Box<Node>),
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    kind: Kind,
    /// Height of the subtree rooted here
    depth: usize,
}

impl Node {
    fn leaf(kind: Kind) -> Node {
        Node { kind, depth: 1 }
    }

    fn neg(inner: Node) -> Node {
        let depth = inner.depth + 1;
        Node {
            kind: Kind::Neg(Box::new(inner)),
            depth,
        }
    }

    fn call(name: &str, argument: Node) -> Node {
        let depth = argument.depth + 1;
        Node {
            kind: Kind::Call(name.to_string(), Box::new(argument)),
            depth,
        }
    }

    fn binary(op: Operation, left: Node, right: Node) -> Node {
        let depth = left.depth.max(right.depth) + 1;
        Node {
            kind: Kind::Binary(op, Box::new(left), Box::new(right)),
            depth,
        }
    }
}

/// Build a [`RealExpression`] from `formula`, resolving names against `params`
pub(crate) fn parse_formula(formula: &str, params: &Parameters) -> Result<RealExpression> {
    let node = parse_tree(formula)?;
    lower(&node, params)
}

fn parse_tree(formula: &str) -> Result<Node> {
    match all_consuming(|i| expr(i, 0)).parse(formula) {
        Ok((_, node)) => Ok(node),
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => Err(DalitzError::Parse(
            format!("formula nested too deeply (limits {} / {})", MAX_DEPTH, MAX_HEIGHT),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = formula.len() - e.input.len();
            Err(DalitzError::Parse(format!(
                "unexpected input at offset {} in '{}'",
                offset, formula
            )))
        }
        Err(nom::Err::Incomplete(_)) => {
            Err(DalitzError::Parse(format!("incomplete formula '{}'", formula)))
        }
    }
}

fn lower(node: &Node, params: &Parameters) -> Result<RealExpression> {
    let expression = match &node.kind {
        Kind::Number(value) => RealExpression::from(*value),
        Kind::Name(name) => RealExpression::from(params.require(name)?.clone()),
        Kind::Neg(inner) => -lower(inner, params)?,
        Kind::Binary(op, left, right) => {
            RealExpression::binary(lower(left, params)?, lower(right, params)?, *op)?
        }
        Kind::Call(name, argument) => {
            RealExpression::unary(lower(argument, params)?, function(name)?)?
        }
    };
    Ok(expression)
}

fn function(name: &str) -> Result<Operation> {
    match name {
        "exp" => Ok(Operation::Exp),
        "log" | "ln" => Ok(Operation::Log),
        "sin" => Ok(Operation::Sin),
        "cos" => Ok(Operation::Cos),
        "tan" => Ok(Operation::Tan),
        "sqrt" => Ok(Operation::Sqrt),
        other => Err(DalitzError::Parse(format!("unknown function '{}'", other))),
    }
}

fn too_deep(input: &str) -> nom::Err<Error<&str>> {
    nom::Err::Failure(Error::new(input, ErrorKind::TooLarge))
}

/// Fail hard once `level` passes [`MAX_DEPTH`] or `node` is taller than [`MAX_HEIGHT`]
fn bounded(input: &str, level: usize, node: Node) -> ParseResult<'_, Node> {
    if level > MAX_DEPTH || node.depth > MAX_HEIGHT {
        return Err(too_deep(input));
    }
    Ok((input, node))
}

/// A single character surrounded by optional whitespace
fn symbol<'a>(c: char) -> impl FnMut(&'a str) -> ParseResult<'a, char> {
    move |input| delimited(multispace0, char(c), multispace0).parse(input)
}

fn identifier(input: &str) -> ParseResult<'_, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// Unsigned decimal literal with optional exponent; signs belong to `factor`
fn number(input: &str) -> ParseResult<'_, Node> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ));
    let exponent = opt((one_of("eE"), opt(one_of("+-")), digit1));
    map_res(recognize(pair(mantissa, exponent)), |text: &str| {
        text.parse::<f64>().map(|value| Node::leaf(Kind::Number(value)))
    })
    .parse(input)
}

fn call(input: &str, level: usize) -> ParseResult<'_, Node> {
    let (input, name) = identifier(input)?;
    let (input, argument) =
        delimited(symbol('('), |i| expr(i, level + 1), symbol(')')).parse(input)?;
    bounded(input, level, Node::call(name, argument))
}

fn primary(input: &str, level: usize) -> ParseResult<'_, Node> {
    let name = map(identifier, |name: &str| Node::leaf(Kind::Name(name.to_string())));
    let group = delimited(symbol('('), |i| expr(i, level + 1), symbol(')'));
    delimited(
        multispace0,
        alt((number, |i| call(i, level), name, group)),
        multispace0,
    )
    .parse(input)
}

fn power(input: &str, level: usize) -> ParseResult<'_, Node> {
    let (input, base) = primary(input, level)?;
    let (input, exponent) = opt(preceded(symbol('^'), |i| factor(i, level + 1))).parse(input)?;
    match exponent {
        Some(exponent) => bounded(input, level, Node::binary(Operation::Pow, base, exponent)),
        None => Ok((input, base)),
    }
}

fn factor(input: &str, level: usize) -> ParseResult<'_, Node> {
    if level > MAX_DEPTH {
        return Err(too_deep(input));
    }
    let (input, negated) = opt(preceded(symbol('-'), |i| factor(i, level + 1))).parse(input)?;
    match negated {
        Some(inner) => bounded(input, level, Node::neg(inner)),
        None => power(input, level),
    }
}

/// Left-associative chain `first (op operand)*`, folded without recursion
fn chain<'a>(
    input: &'a str,
    level: usize,
    first: Node,
    rest: Vec<(char, Node)>,
    op_of: fn(char) -> Operation,
) -> ParseResult<'a, Node> {
    let mut acc = first;
    for (op, rhs) in rest {
        acc = Node::binary(op_of(op), acc, rhs);
        if acc.depth > MAX_HEIGHT {
            return Err(too_deep(input));
        }
    }
    bounded(input, level, acc)
}

fn term(input: &str, level: usize) -> ParseResult<'_, Node> {
    let (input, first) = factor(input, level)?;
    let (input, rest) =
        many0(pair(alt((symbol('*'), symbol('/'))), |i| factor(i, level))).parse(input)?;
    chain(input, level, first, rest, |op| {
        if op == '*' {
            Operation::Mul
        } else {
            Operation::Div
        }
    })
}

fn expr(input: &str, level: usize) -> ParseResult<'_, Node> {
    if level > MAX_DEPTH {
        return Err(too_deep(input));
    }
    let (input, first) = term(input, level)?;
    let (input, rest) =
        many0(pair(alt((symbol('+'), symbol('-'))), |i| term(i, level))).parse(input)?;
    chain(input, level, first, rest, |op| {
        if op == '+' {
            Operation::Add
        } else {
            Operation::Sub
        }
    })
}
