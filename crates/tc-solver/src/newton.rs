//! Newton-Raphson solver with finite-difference Jacobians.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::{ForwardDifference, JacobianScheme};
use crate::residual::Residual;
use crate::system::EquationSystem;
use nalgebra::{DMatrix, DVector};
use tc_core::{VectorRole, all_finite};

/// Newton solver configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolveOptions {
    /// Largest accepted L2 norm of the residual vector
    pub precision: f64,
    /// Maximum Newton steps before giving up
    pub iter_limit: usize,
    /// Smallest accepted reciprocal condition number of the Jacobian
    /// (smallest over largest singular value). Finite-difference noise keeps
    /// a truly singular Jacobian well above `f64::EPSILON`, so the bound sits
    /// between that noise and genuinely stiff cycle models.
    pub min_rcond: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            precision: 1e-6,
            iter_limit: 50,
            min_rcond: 1e-10,
        }
    }
}

/// Converged operating point.
#[derive(Clone, Debug)]
pub struct NewtonSolution {
    /// State vector at convergence
    pub x: DVector<f64>,
    /// Residual norm at `x`
    pub residual_norm: f64,
    /// Newton steps taken
    pub iterations: usize,
    /// Residual evaluations performed, Jacobian columns included
    pub evaluations: usize,
}

/// Progress reported while a solve runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IterationEvent {
    Started {
        iter_limit: usize,
        residual_norm: f64,
    },
    Step {
        iteration: usize,
        residual_norm: f64,
        step_norm: f64,
    },
    Converged {
        iterations: usize,
        residual_norm: f64,
    },
}

/// Multivariate Newton-Raphson solver.
///
/// Each iteration estimates the Jacobian with the configured
/// [`JacobianScheme`], solves `J dx = -r` by LU decomposition and takes the
/// full step. There is no damping, line search or step adaptation, so the
/// quality of the finite-difference steps is entirely up to the caller.
///
/// The solver borrows its [`EquationSystem`]; several solvers may share one.
/// Every call to [`solve`](Self::solve) restarts from the initial guess.
pub struct NewtonSolver<'a, R, J = ForwardDifference> {
    system: &'a EquationSystem<R>,
    initial: DVector<f64>,
    steps: DVector<f64>,
    scheme: J,
}

impl<'a, R: Residual> NewtonSolver<'a, R> {
    /// Create a solver with explicit per-dimension steps.
    ///
    /// # Errors
    /// - [`SolverError::Dimension`] if `initial` or `steps` does not match
    ///   the system order
    /// - [`SolverError::InvalidStep`] if a step is zero or non-finite
    pub fn new(
        system: &'a EquationSystem<R>,
        initial: DVector<f64>,
        steps: DVector<f64>,
    ) -> SolverResult<Self> {
        let contract = system.contract();
        contract.check(VectorRole::InitialGuess, initial.len())?;
        contract.check(VectorRole::Steps, steps.len())?;

        if let Some((index, &value)) = steps
            .iter()
            .enumerate()
            .find(|(_, h)| **h == 0.0 || !h.is_finite())
        {
            return Err(SolverError::InvalidStep { index, value });
        }

        Ok(Self {
            system,
            initial,
            steps,
            scheme: ForwardDifference,
        })
    }

    /// Create a solver using the same step in every dimension.
    pub fn with_uniform_step(
        system: &'a EquationSystem<R>,
        initial: DVector<f64>,
        step: f64,
    ) -> SolverResult<Self> {
        let steps = DVector::from_element(system.order(), step);
        Self::new(system, initial, steps)
    }
}

impl<'a, R: Residual, J: JacobianScheme> NewtonSolver<'a, R, J> {
    /// Swap the finite-difference scheme.
    pub fn with_scheme<K: JacobianScheme>(self, scheme: K) -> NewtonSolver<'a, R, K> {
        NewtonSolver {
            system: self.system,
            initial: self.initial,
            steps: self.steps,
            scheme,
        }
    }

    pub fn system(&self) -> &'a EquationSystem<R> {
        self.system
    }

    pub fn initial(&self) -> &DVector<f64> {
        &self.initial
    }

    pub fn steps(&self) -> &DVector<f64> {
        &self.steps
    }

    /// Drive the residual norm to `precision` or below within `iter_limit`
    /// Newton steps.
    pub fn solve(&self, precision: f64, iter_limit: usize) -> SolverResult<NewtonSolution> {
        self.solve_with(&SolveOptions {
            precision,
            iter_limit,
            ..SolveOptions::default()
        })
    }

    pub fn solve_with(&self, options: &SolveOptions) -> SolverResult<NewtonSolution> {
        self.solve_with_progress(options, &mut |_| {})
    }

    /// Solve, reporting every step to `progress`.
    ///
    /// # Errors
    /// - [`SolverError::ProblemSetup`] for a negative or non-finite precision
    /// - [`SolverError::Residual`] / [`SolverError::Dimension`] from any
    ///   residual evaluation, baseline or perturbed
    /// - [`SolverError::LinearSolve`] for a singular Jacobian
    /// - [`SolverError::NonFinite`] if the residual becomes NaN or infinite
    /// - [`SolverError::ConvergenceFailed`] when `iter_limit` runs out
    pub fn solve_with_progress(
        &self,
        options: &SolveOptions,
        progress: &mut dyn FnMut(IterationEvent),
    ) -> SolverResult<NewtonSolution> {
        let SolveOptions {
            precision,
            iter_limit,
            min_rcond,
        } = *options;
        if !precision.is_finite() || precision < 0.0 {
            return Err(SolverError::ProblemSetup {
                what: format!("precision must be finite and non-negative, got {precision}"),
            });
        }
        if !(0.0..1.0).contains(&min_rcond) {
            return Err(SolverError::ProblemSetup {
                what: format!("min_rcond must lie in [0, 1), got {min_rcond}"),
            });
        }

        let order = self.system.order();
        let mut x = self.initial.clone();
        let mut r = self.system.residuals(&x)?;
        let mut evaluations = 1;
        ensure_finite_residual(&r, 0)?;
        let mut r_norm = r.norm();

        progress(IterationEvent::Started {
            iter_limit,
            residual_norm: r_norm,
        });

        for iter in 1..=iter_limit {
            let jac = self.scheme.jacobian(self.system, &x, &r, &self.steps)?;
            evaluations += self.scheme.evaluations_per_jacobian(order);

            let rcond = reciprocal_condition(&jac);
            let singular = |rcond: f64| {
                tracing::warn!(iteration = iter, rcond, "singular Jacobian");
                SolverError::LinearSolve {
                    iteration: iter,
                    rcond,
                }
            };
            if rcond <= min_rcond {
                return Err(singular(rcond));
            }

            // Solve J * dx = -r
            let dx = jac
                .lu()
                .solve(&(-r.clone()))
                .filter(|dx| all_finite(dx.iter()))
                .ok_or_else(|| singular(rcond))?;

            x += &dx;
            r = self.system.residuals(&x)?;
            evaluations += 1;
            ensure_finite_residual(&r, iter)?;
            r_norm = r.norm();

            let step_norm = dx.norm();
            tracing::debug!(iteration = iter, residual_norm = r_norm, step_norm, "newton step");
            progress(IterationEvent::Step {
                iteration: iter,
                residual_norm: r_norm,
                step_norm,
            });

            if r_norm <= precision {
                progress(IterationEvent::Converged {
                    iterations: iter,
                    residual_norm: r_norm,
                });
                return Ok(NewtonSolution {
                    x,
                    residual_norm: r_norm,
                    iterations: iter,
                    evaluations,
                });
            }
        }

        tracing::warn!(
            iter_limit,
            residual_norm = r_norm,
            precision,
            "newton iteration limit reached"
        );
        Err(SolverError::ConvergenceFailed {
            iterations: iter_limit,
            residual_norm: r_norm,
        })
    }
}

/// Smallest over largest singular value; 0 for a zero, non-finite or
/// unresolvable matrix.
fn reciprocal_condition(jac: &DMatrix<f64>) -> f64 {
    if !all_finite(jac.iter()) {
        return 0.0;
    }
    let Some(svd) = jac.clone().try_svd(false, false, f64::EPSILON, 200) else {
        return 0.0;
    };
    let largest = svd.singular_values.max();
    if largest <= 0.0 {
        return 0.0;
    }
    svd.singular_values.min() / largest
}

fn ensure_finite_residual(r: &DVector<f64>, iteration: usize) -> SolverResult<()> {
    if all_finite(r.iter()) {
        Ok(())
    } else {
        Err(SolverError::NonFinite { iteration })
    }
}
