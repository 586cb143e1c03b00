#![allow(non_snake_case)]

//! Cholesky factorisation of positive semi-definite matrices.
//!
//! nalgebra's Cholesky requires a positive definite matrix. Sampling from zero or degenerate noise
//! and checking supplied covariances requires the semi-definite case as well. Here
//! UC is upper triangular and M = UC.UC'
//!
//! Storage:
//! upper_triangle(M) = UC, strict_lower_triangle(M) zeroed

use na::storage::StorageMut;
use na::{Dim, RealField, SquareMatrix};
use nalgebra as na;

/// Reciprocal condition number of the PSD matrix UC.UC', estimated from the diagonal of UC.
///
/// The norm of the diagonal is taken as its largest element and the norm of its inverse as the smallest.
/// The result is squared. It is 0 for an empty or semi-definite factor and negative when
/// any diagonal element is negative or NaN.
pub fn UCrcond<N: RealField, D: Dim, S: StorageMut<N, D, D>>(UC: &SquareMatrix<N, D, S>) -> N {
    let n = UC.nrows();
    if n == 0 {
        return N::zero();
    }
    let mut mind = UC[(0, 0)];
    let mut maxd = mind;
    for i in 0..n {
        let d = UC[(i, i)];
        if !(d >= N::zero()) {
            return -N::one();
        }
        mind = mind.min(d);
        maxd = maxd.max(d);
    }

    let rcond = mind / maxd;
    // 0/0 and inf/inf
    if rcond != rcond {
        N::zero()
    } else {
        rcond * rcond
    }
}

/// In place upper triangular Cholesky factor of a Positive definite or semi-definite matrix M.
///
/// Reference: A+G p.218
///
/// Pivots within 4.n.eps.max(diag(M)) of zero are taken as zero, so rank deficient matrices with
/// rounding residue factor as semi-definite.
///
/// Input: M, Strict lower triangle of M is ignored in computation
///
/// Output: M as UC*UC' factor, upper_triangle(M) = UC, strict_lower_triangle(M) = 0
///
/// Return: reciprocal condition number, -1 if negative, 0 if semi-definite (including zero)
pub fn UCfactor<N: RealField, D: Dim, S: StorageMut<N, D, D>>(M: &mut SquareMatrix<N, D, S>) -> N {
    let n = M.nrows();
    let mut maxd = N::zero();
    for i in 0..n {
        maxd = maxd.max(M[(i, i)].abs());
    }
    let n_eps: N = na::convert(4. * n as f64 * f64::EPSILON);
    let tol = n_eps * maxd;
    // Off diagonal bound of a semi-definite column, |M(i,j)|^2 <= M(i,i).M(j,j)
    let off_tol = n_eps.sqrt() * maxd;

    for j in (0..n).rev() {
        let mut d = M[(j, j)];

        // Diagonal element
        if d > tol {
            // Positive definite
            d = N::sqrt(d);
            M[(j, j)] = d;
            d = N::one() / d;

            for i in 0..j {
                let e = d * M[(i, j)];
                M[(i, j)] = e;
                for k in 0..=i {
                    let t = e * M[(k, j)];
                    M[(k, i)] -= t;
                }
            }
        } else if d.abs() <= tol {
            // Possibly semi-definite, check not negative
            for i in 0..j {
                if !(M[(i, j)].abs() <= off_tol) {
                    return -N::one();
                }
            }
            for i in 0..=j {
                M[(i, j)] = N::zero();
            }
        } else {
            // Negative or NaN
            return -N::one();
        }
    }

    // Zero strict lower triangle
    for j in 0..n {
        for i in j + 1..n {
            M[(i, j)] = N::zero();
        }
    }

    // Estimate the reciprocal condition number
    UCrcond(M)
}
