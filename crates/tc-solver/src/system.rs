//! Fixed-order equation systems.

use crate::error::{SolverError, SolverResult};
use crate::residual::Residual;
use nalgebra::DVector;
use tc_core::{DimensionContract, VectorRole};

/// A residual function bound to a fixed order.
///
/// Every evaluation checks that both the state handed in and the residual
/// handed back have exactly `order` entries. The system is immutable and can
/// be shared read-only by any number of solvers.
pub struct EquationSystem<R> {
    contract: DimensionContract,
    residual: R,
}

impl<R: Residual> EquationSystem<R> {
    /// Bind `residual` to `order` unknowns.
    ///
    /// # Errors
    /// Returns [`SolverError::ProblemSetup`] if `order` is zero.
    pub fn new(order: usize, residual: R) -> SolverResult<Self> {
        if order == 0 {
            return Err(SolverError::ProblemSetup {
                what: "equation system order must be positive".to_string(),
            });
        }
        Ok(Self {
            contract: DimensionContract::new(order),
            residual,
        })
    }

    pub fn order(&self) -> usize {
        self.contract.order()
    }

    pub fn contract(&self) -> DimensionContract {
        self.contract
    }

    /// Evaluate the residual vector at `x`.
    ///
    /// The input length is checked before the residual function runs and the
    /// output length after it returns. Failures of the residual function are
    /// passed through as [`SolverError::Residual`].
    pub fn residuals(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        self.contract.check(VectorRole::Input, x.len())?;
        let y = self
            .residual
            .evaluate(x)
            .map_err(|e| SolverError::Residual(Box::new(e)))?;
        self.contract.check(VectorRole::Output, y.len())?;
        Ok(y)
    }
}

impl<R> std::fmt::Debug for EquationSystem<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquationSystem")
            .field("order", &self.contract.order())
            .finish_non_exhaustive()
    }
}
