//! Normalization of amplitude models over the Dalitz plot
//!
//! The integral of `|A|^2` over the kinematically allowed region is computed by
//! midpoint quadrature on an [`IntegrationGrid`] and cached per model by a
//! [`NormalizationCache`], which recomputes only what a free shape parameter
//! can invalidate.

mod cache;
pub mod config;
pub mod grid;

pub use cache::{CacheState, NormalizationCache};
pub use config::NormalizationConfig;
pub use grid::IntegrationGrid;
