//! Finite difference Jacobian computation.

use crate::error::SolverResult;
use crate::residual::Residual;
use crate::system::EquationSystem;
use nalgebra::{DMatrix, DVector};
use tc_core::{DimensionContract, VectorRole};

/// Strategy for estimating the Jacobian of a system at a point.
///
/// `fx` is the residual already evaluated at `x`; schemes that need it reuse
/// it instead of evaluating again.
pub trait JacobianScheme {
    fn jacobian<R: Residual>(
        &self,
        system: &EquationSystem<R>,
        x: &DVector<f64>,
        fx: &DVector<f64>,
        steps: &DVector<f64>,
    ) -> SolverResult<DMatrix<f64>>;

    /// Residual evaluations spent on one Jacobian of a system of `order`.
    fn evaluations_per_jacobian(&self, order: usize) -> usize;
}

/// First-order forward differences with fixed per-axis steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardDifference;

/// Second-order central differences. Twice the evaluations of
/// [`ForwardDifference`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CentralDifference;

impl JacobianScheme for ForwardDifference {
    fn jacobian<R: Residual>(
        &self,
        system: &EquationSystem<R>,
        x: &DVector<f64>,
        fx: &DVector<f64>,
        steps: &DVector<f64>,
    ) -> SolverResult<DMatrix<f64>> {
        forward_difference_jacobian(x, fx, |p| system.residuals(p), steps)
    }

    fn evaluations_per_jacobian(&self, order: usize) -> usize {
        order
    }
}

impl JacobianScheme for CentralDifference {
    fn jacobian<R: Residual>(
        &self,
        system: &EquationSystem<R>,
        x: &DVector<f64>,
        _fx: &DVector<f64>,
        steps: &DVector<f64>,
    ) -> SolverResult<DMatrix<f64>> {
        central_difference_jacobian(x, |p| system.residuals(p), steps)
    }

    fn evaluations_per_jacobian(&self, order: usize) -> usize {
        2 * order
    }
}

/// Compute Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by steps[j] and computes
/// (f(x+e) - f(x))/steps[j].
pub(crate) fn forward_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: F,
    steps: &DVector<f64>,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let contract = DimensionContract::new(x.len());
    contract.check(VectorRole::Steps, steps.len())?;
    contract.check(VectorRole::Output, f_x.len())?;

    let n = x.len();
    let mut jac = DMatrix::zeros(n, n);
    let mut x_perturbed = x.clone();

    for j in 0..n {
        let dx = steps[j];
        x_perturbed[j] = x[j] + dx;
        tracing::trace!(column = j, step = dx, "forward difference evaluation");

        let f_perturbed = f(&x_perturbed)?;
        contract.check(VectorRole::Output, f_perturbed.len())?;
        jac.set_column(j, &((f_perturbed - f_x) / dx));

        x_perturbed[j] = x[j];
    }

    Ok(jac)
}

/// Compute Jacobian using central finite differences (more accurate but 2x cost).
pub(crate) fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    steps: &DVector<f64>,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let contract = DimensionContract::new(x.len());
    contract.check(VectorRole::Steps, steps.len())?;

    let n = x.len();
    let mut columns = Vec::with_capacity(n);

    for j in 0..n {
        let dx = steps[j];
        tracing::trace!(column = j, step = dx, "central difference evaluation");

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;
        contract.check(VectorRole::Output, f_plus.len())?;
        contract.check(VectorRole::Output, f_minus.len())?;

        columns.push((f_plus - f_minus) / (2.0 * dx));
    }

    Ok(DMatrix::from_columns(&columns))
}
