//! tc-core: stable foundation for turbocycle.
//!
//! Contains:
//! - numeric (Real + float helpers)
//! - dimension (order contracts for state/residual vectors)

pub mod dimension;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use dimension::{DimensionContract, DimensionMismatch, VectorRole};
pub use numeric::*;
