//! Linear algebra for covariance matrices.

pub mod cholesky;
