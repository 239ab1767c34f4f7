//! Order contracts for state and residual vectors.
//!
//! Every boundary that accepts a vector (system construction, solver
//! construction, each residual evaluation) checks it against the same
//! [`DimensionContract`] rather than comparing lengths ad hoc.

use core::fmt;
use thiserror::Error;

/// Which vector a length check was applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VectorRole {
    /// State vector handed to a residual function
    Input,
    /// Residual vector produced by a residual function
    Output,
    /// Starting point of an iteration
    InitialGuess,
    /// Per-dimension finite-difference increments
    Steps,
}

impl fmt::Display for VectorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VectorRole::Input => "input",
            VectorRole::Output => "output",
            VectorRole::InitialGuess => "initial guess",
            VectorRole::Steps => "steps",
        };
        f.write_str(name)
    }
}

/// A vector length disagreed with the declared order.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Dimension mismatch on {role} vector: expected {expected}, got {actual}")]
pub struct DimensionMismatch {
    pub role: VectorRole,
    pub expected: usize,
    pub actual: usize,
}

/// Fixed dimensionality shared by the state and residual vectors of a system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DimensionContract {
    order: usize,
}

impl DimensionContract {
    pub const fn new(order: usize) -> Self {
        Self { order }
    }

    pub const fn order(self) -> usize {
        self.order
    }

    /// Check that a vector playing `role` has exactly `order` entries.
    pub fn check(self, role: VectorRole, len: usize) -> Result<(), DimensionMismatch> {
        if len == self.order {
            Ok(())
        } else {
            Err(DimensionMismatch {
                role,
                expected: self.order,
                actual: len,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_length_passes() {
        let contract = DimensionContract::new(3);
        assert_eq!(contract.order(), 3);
        assert!(contract.check(VectorRole::Input, 3).is_ok());
    }

    #[test]
    fn mismatch_names_role_and_lengths() {
        let err = DimensionContract::new(3)
            .check(VectorRole::Output, 2)
            .unwrap_err();
        assert_eq!(err.role, VectorRole::Output);
        assert_eq!(err.expected, 3);
        assert_eq!(err.actual, 2);

        let msg = err.to_string();
        assert!(msg.contains("output"));
        assert!(msg.contains("expected 3, got 2"));
    }
}
