//! Error types for solver operations.

use tc_core::dimension::DimensionMismatch;
use thiserror::Error;

/// Opaque failure raised by a residual function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while evaluating or solving an equation system.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error(transparent)]
    Dimension(#[from] DimensionMismatch),

    #[error("Invalid finite-difference step at index {index}: {value}")]
    InvalidStep { index: usize, value: f64 },

    #[error("Residual evaluation failed: {0}")]
    Residual(#[source] BoxError),

    #[error("Jacobian solve failed at iteration {iteration} (reciprocal condition {rcond:e})")]
    LinearSolve { iteration: usize, rcond: f64 },

    #[error("Non-finite residual at iteration {iteration}")]
    NonFinite { iteration: usize },

    #[error("Convergence failed after {iterations} iterations, residual = {residual_norm}")]
    ConvergenceFailed {
        iterations: usize,
        residual_norm: f64,
    },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// True when the iteration failed to settle: either the budget ran out or
    /// a Newton step carried the residual to NaN or infinity. Retrying with a
    /// larger limit, looser precision or another initial guess may succeed.
    ///
    /// A non-finite residual at the initial guess is not a convergence
    /// failure; the starting point itself is bad.
    pub fn is_convergence_failure(&self) -> bool {
        match self {
            SolverError::ConvergenceFailed { .. } => true,
            SolverError::NonFinite { iteration } => *iteration > 0,
            _ => false,
        }
    }

    /// The residual function's own error, if that is what aborted the solve.
    pub fn residual_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            SolverError::Residual(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("burner outlet temperature above limit")]
    struct OverTemperature;

    #[test]
    fn residual_source_is_downcastable() {
        let err = SolverError::Residual(Box::new(OverTemperature));
        let source = err.residual_source().unwrap();
        assert!(source.downcast_ref::<OverTemperature>().is_some());
        assert!(err.to_string().contains("burner outlet"));
    }

    #[test]
    fn exhaustion_and_divergence_are_convergence_failures() {
        let exhausted = SolverError::ConvergenceFailed {
            iterations: 10,
            residual_norm: 1.0,
        };
        assert!(exhausted.is_convergence_failure());
        assert!(SolverError::NonFinite { iteration: 3 }.is_convergence_failure());

        assert!(!SolverError::NonFinite { iteration: 0 }.is_convergence_failure());
        let singular = SolverError::LinearSolve {
            iteration: 1,
            rcond: 0.0,
        };
        assert!(!singular.is_convergence_failure());
    }
}
