#![allow(non_snake_case)]

//! Filter construction options.

use na::RealField;
use nalgebra as na;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options of an [`ExtendedKalmanFilter`].
///
/// [`ExtendedKalmanFilter`]: ../estimators/extended/struct.ExtendedKalmanFilter.html
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FilterOptions<N: RealField> {
    /// Number of control inputs
    pub nu: usize,
    /// Sampling period
    pub Ts: N,
    /// Covariance inflation factor applied in predict, 1 for none
    pub alpha: N,
    /// Check dimensions, symmetry and definiteness of noises and prior on construction
    pub check: bool,
}

impl<N: RealField> Default for FilterOptions<N> {
    fn default() -> Self {
        FilterOptions {
            nu: 0,
            Ts: N::one(),
            alpha: N::one(),
            check: true,
        }
    }
}
