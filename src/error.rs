#![allow(non_snake_case)]

//! Estimation errors.
//!
//! Numerical failures are fatal and never retried. Construction errors are caller fixable.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// Innovation covariance S is not positive definite, S is included for diagnosis.
    InnovationNotPD { S: String },
    /// Predicted covariance used by the smoother gain is not positive definite.
    SmootherNotPD { t: usize, R: String },
    /// A covariance is not positive semi-definite.
    NotPSD(&'static str),
    /// A covariance is not symmetric.
    NotSymmetric(&'static str),
    /// Dimensions inconsistent with the state or measurement size.
    Dimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A derived Jacobian column is not finite.
    NotDifferentiable { column: usize },
    /// Sequence lengths of a trajectory do not match.
    TrajectoryLength {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    EmptyTrajectory,
}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateError::InnovationNotPD { S } => write!(
                f,
                "Cholesky factorization of innovation covariance failed, got S = {}",
                S
            ),
            EstimateError::SmootherNotPD { t, R } => write!(
                f,
                "predicted covariance at step {} not PD in smooth, got R = {}",
                t, R
            ),
            EstimateError::NotPSD(what) => write!(f, "{} not PSD", what),
            EstimateError::NotSymmetric(what) => write!(f, "{} not symmetric", what),
            EstimateError::Dimension {
                what,
                expected,
                found,
            } => write!(f, "{} has dimension {}, expected {}", what, found, expected),
            EstimateError::NotDifferentiable { column } => write!(
                f,
                "function not differentiable at linearisation point, column {} not finite",
                column
            ),
            EstimateError::TrajectoryLength {
                what,
                expected,
                found,
            } => write!(f, "{} has length {}, expected {}", what, found, expected),
            EstimateError::EmptyTrajectory => write!(f, "trajectory is empty"),
        }
    }
}

impl std::error::Error for EstimateError {}
