//! Integration tests on whole models
//!
//! Propagation of canonical values into terms and the reuse behaviour of the
//! normalization cache.

mod normalization_tests;
mod propagation_tests;
