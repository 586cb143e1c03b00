#![allow(non_snake_case)]

//! Matrix helpers shared by the estimators.
//!
//! Covariance symmetrisation and checks, and formatting of matrices for diagnostics.

use na::storage::{Storage, StorageMut};
use na::{Dim, Matrix, RealField, SquareMatrix};
use nalgebra as na;

use crate::error::EstimateError;

/// Relative tolerance used when checking covariances are symmetric.
pub const SYMMETRY_TOLERANCE: f64 = 1e-10;

/// Makes a square matrix exactly symmetric, in place, by averaging it with its transpose.
///
/// Removes the floating point drift which accumulates in covariance products.
pub fn symmetrize<N: RealField, D: Dim, S: StorageMut<N, D, D>>(M: &mut SquareMatrix<N, D, S>) {
    let half = N::one() / (N::one() + N::one());
    let n = M.nrows();
    for j in 1..n {
        for i in 0..j {
            let m = (M[(i, j)] + M[(j, i)]) * half;
            M[(i, j)] = m;
            M[(j, i)] = m;
        }
    }
}

/// Checks symmetry to within a relative tolerance.
pub fn is_symmetric<N: RealField, D: Dim, S: Storage<N, D, D>>(M: &SquareMatrix<N, D, S>, tolerance: N) -> bool {
    let n = M.nrows();
    for j in 1..n {
        for i in 0..j {
            let scale = M[(i, j)].abs().max(M[(j, i)].abs()).max(N::one());
            if (M[(i, j)] - M[(j, i)]).abs() > tolerance * scale {
                return false;
            }
        }
    }
    true
}

/// True for values which are neither infinite nor NaN.
///
/// IEC 559 inf - inf and NaN - NaN are NaN, which never compares equal.
pub fn is_finite<N: RealField>(v: N) -> bool {
    v - v == N::zero()
}

/// Formats a matrix as rows separated by ';', for diagnostics.
pub fn format_matrix<N: RealField, R: Dim, C: Dim, S: Storage<N, R, C>>(M: &Matrix<N, R, C, S>) -> String {
    let rows: Vec<String> = (0..M.nrows())
        .map(|i| {
            let row: Vec<String> = (0..M.ncols()).map(|j| format!("{}", M[(i, j)])).collect();
            row.join(" ")
        })
        .collect();
    format!("[{}]", rows.join("; "))
}

/// Checks the reciprocal condition number is >= 0.
///
/// IEC 559 NaN values are never true
pub fn check_non_negativ<N: RealField>(rcond: N, what: &'static str) -> Result<N, EstimateError> {
    if rcond >= N::zero() {
        Ok(rcond)
    } else {
        Err(EstimateError::NotPSD(what))
    }
}
