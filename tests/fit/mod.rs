//! Integration tests for fitting
//!
//! The likelihood objective over fixed event tables and over generated toys.

mod session_tests;

#[cfg(feature = "toy")]
mod toy_tests;
