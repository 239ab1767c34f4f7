//! Nonlinear equation solver for cyclically coupled engine models.
//!
//! A cycle model supplies a [`Residual`] function over a fixed number of
//! unknowns (pressures, temperatures, flows, ...). Wrapping it in an
//! [`EquationSystem`] pins the order; a [`NewtonSolver`] then drives the
//! residual to zero with finite-difference Jacobians and dense LU solves.

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod residual;
pub mod system;

pub use error::{BoxError, SolverError, SolverResult};
pub use jacobian::{CentralDifference, ForwardDifference, JacobianScheme};
pub use newton::{IterationEvent, NewtonSolution, NewtonSolver, SolveOptions};
pub use residual::Residual;
pub use system::EquationSystem;
pub use tc_core::{DimensionContract, DimensionMismatch, VectorRole};
