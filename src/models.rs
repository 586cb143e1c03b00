#![allow(non_snake_case)]

//! Bayesian estimation models.
//!
//! State representations are modeled as structs.
//! Common Bayesian discrete system estimation operations are defined as traits.

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, MatrixN, VectorN};
use na::{Cholesky, RealField};
use nalgebra as na;

use crate::error::EstimateError;
use crate::estimators::kalman::KalmanFilter;
use crate::noise::CorrelatedNoise;

/// Kalman State.
///
/// Linear representation as a state vector and the state covariance (symmetric positive semi-definite) matrix.
#[derive(PartialEq, Clone)]
pub struct KalmanState<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// State vector
    pub x: VectorN<N, D>,
    /// State covariance matrix (symmetric positive semi-definite)
    pub X: MatrixN<N, D>,
}

/// A state estimator.
///
pub trait Estimator<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D>,
{
    /// The estimator's estimate of the system's state.
    fn state(&self) -> Result<VectorN<N, D>, EstimateError>;
}

/// A Kalman estimator.
///
/// The linear Kalman state representation x,X is used to represent the system.
pub trait KalmanEstimator<N: RealField, D: Dim>: Estimator<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Initialise the estimator with a KalmanState.
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N, EstimateError>;

    /// The estimator's estimate of the system's KalmanState.
    fn kalman_state(&self) -> Result<(N, KalmanState<N, D>), EstimateError>;
}

/// A extended linear predictor.
///
/// Uses a non-linear state prediction with linearised state transition matrix and additive noise.
pub trait ExtendedLinearPredictor<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Predict with the predicted state `x_pred` and the linearised transition `Fx`.
    ///
    /// The propagated covariance is inflated by `alpha`.
    fn predict(
        &mut self,
        x_pred: &VectorN<N, D>,
        Fx: &MatrixN<N, D>,
        noise: &CorrelatedNoise<N, D>,
        alpha: N,
    ) -> Result<(), EstimateError>;
}

/// A extended linear observer with correlated observation noise.
///
/// Uses a non-linear state observation with linearised observation matrix and additive noise.
pub trait ExtendedLinearObserver<N: RealField, D: Dim, ZD: Dim>
where
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, ZD, ZD>
        + Allocator<N, ZD, D>
        + Allocator<N, D, ZD>
        + Allocator<N, D>
        + Allocator<N, ZD>,
{
    /// Observe with innovation `s`, the difference between observed and predicted observation.
    ///
    /// Nothing is modified when the innovation covariance is not positive definite.
    fn observe_innovation(
        &mut self,
        s: &VectorN<N, ZD>,
        Hx: &MatrixMN<N, ZD, D>,
        noise: &CorrelatedNoise<N, ZD>,
    ) -> Result<Innovation<N, D, ZD>, EstimateError>;
}

/// Fit diagnostics of an observation.
pub struct Innovation<N: RealField, D: Dim, ZD: Dim>
where
    DefaultAllocator: Allocator<N, ZD, ZD> + Allocator<N, D, ZD> + Allocator<N, ZD>,
{
    /// Log-likelihood of the innovation under N(0, S)
    pub ll: N,
    /// Innovation
    pub e: VectorN<N, ZD>,
    /// Innovation covariance
    pub S: MatrixN<N, ZD>,
    /// Cholesky factor of S
    pub Sc: Cholesky<N, ZD>,
    /// Kalman gain
    pub K: MatrixMN<N, D, ZD>,
}

/// A linear filter.
///
/// Access to the belief, time index, sampling period and parameters of a filter. Filters built on
/// a [`KalmanFilter`] implement `filter` and `filter_mut`, all other operations act on it.
///
/// [`KalmanFilter`]: ../estimators/kalman/struct.KalmanFilter.html
pub trait LinearFilter<N: RealField, D: Dim, P>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn filter(&self) -> &KalmanFilter<N, D, P>;

    fn filter_mut(&mut self) -> &mut KalmanFilter<N, D, P>;

    /// State mean x.
    fn mean<'a>(&'a self) -> &'a VectorN<N, D>
    where
        P: 'a,
    {
        &self.filter().state.x
    }

    /// State covariance X.
    fn covariance<'a>(&'a self) -> &'a MatrixN<N, D>
    where
        P: 'a,
    {
        &self.filter().state.X
    }

    fn set_mean(&mut self, x: VectorN<N, D>) {
        self.filter_mut().state.x = x;
    }

    fn set_covariance(&mut self, X: MatrixN<N, D>) {
        self.filter_mut().state.X = X;
    }

    /// Time index.
    fn index(&self) -> usize {
        self.filter().t
    }

    fn set_index(&mut self, t: usize) {
        self.filter_mut().t = t;
    }

    /// Sampling period.
    fn Ts(&self) -> N {
        self.filter().Ts
    }

    /// Continuous time of the current index, t * Ts.
    fn time(&self) -> N {
        let t: N = na::convert(self.filter().t as f64);
        t * self.filter().Ts
    }

    fn parameters(&self) -> &P {
        &self.filter().p
    }

    fn set_parameters(&mut self, p: P) {
        self.filter_mut().p = p;
    }

    fn prior<'a>(&'a self) -> &'a KalmanState<N, D>
    where
        P: 'a,
    {
        &self.filter().prior
    }

    /// Reset to the prior mean and covariance and index 0.
    fn reset(&mut self) {
        self.filter_mut().reset();
    }
}
