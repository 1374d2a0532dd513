//! Integration tests for expressions
//!
//! Construction layout, evaluation semantics and the formula parser.

mod building_tests;
mod evaluation_tests;
mod parse_tests;
