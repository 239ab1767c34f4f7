//! Residual functions supplied by the model layer.

use nalgebra::DVector;

/// A residual function: maps a state vector to the mismatch of the equations
/// it must satisfy, zero at a solution.
///
/// Implemented by cycle models, test harnesses or synthetic equations. Any
/// closure `Fn(&DVector<f64>) -> Result<DVector<f64>, E>` qualifies.
///
/// Implementations should be pure: the same state must give the same residual.
pub trait Residual {
    /// Domain failure (e.g. an unphysical property lookup).
    type Error: std::error::Error + Send + Sync + 'static;

    fn evaluate(&self, state: &DVector<f64>) -> Result<DVector<f64>, Self::Error>;
}

impl<F, E> Residual for F
where
    F: Fn(&DVector<f64>) -> Result<DVector<f64>, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn evaluate(&self, state: &DVector<f64>) -> Result<DVector<f64>, E> {
        self(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    struct Offset {
        target: DVector<f64>,
    }

    impl Residual for Offset {
        type Error = Infallible;

        fn evaluate(&self, state: &DVector<f64>) -> Result<DVector<f64>, Infallible> {
            Ok(state - &self.target)
        }
    }

    #[test]
    fn closures_are_residuals() {
        let double = |x: &DVector<f64>| -> Result<DVector<f64>, Infallible> { Ok(x * 2.0) };
        let r = double.evaluate(&DVector::from_vec(vec![1.0, -2.0])).unwrap();
        assert_eq!(r.as_slice(), &[2.0, -4.0]);
    }

    #[test]
    fn structs_are_residuals() {
        let offset = Offset {
            target: DVector::from_vec(vec![3.0, 4.0]),
        };
        let r = offset.evaluate(&DVector::zeros(2)).unwrap();
        assert_eq!(r.as_slice(), &[-3.0, -4.0]);
    }
}
