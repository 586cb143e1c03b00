#![allow(non_snake_case)]

//! Linear filter state.
//!
//! [`KalmanFilter`] holds the belief of a filter: the Kalman state x,X and the time index `t`,
//! together with the sampling period `Ts`, the parameters passed to user functions and the
//! prior the filter is reset to.
//!
//! [`KalmanFilter`]: struct.KalmanFilter.html

use na::{allocator::Allocator, DefaultAllocator, Dim, RealField, VectorN};
use nalgebra as na;
use tracing::debug;

use crate::error::EstimateError;
use crate::models::{Estimator, KalmanEstimator, KalmanState, LinearFilter};

pub struct KalmanFilter<N: RealField, D: Dim, P>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Current belief
    pub state: KalmanState<N, D>,
    /// Time index, continuous time is t * Ts
    pub t: usize,
    /// Sampling period
    pub Ts: N,
    /// Parameters passed unchanged to all user functions
    pub p: P,
    /// Initial state distribution
    pub prior: KalmanState<N, D>,
}

impl<N: RealField, D: Dim, P> KalmanFilter<N, D, P>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// A filter starting from `prior` at index 0.
    pub fn new(prior: KalmanState<N, D>, Ts: N, p: P) -> Self {
        KalmanFilter {
            state: prior.clone(),
            t: 0,
            Ts,
            p,
            prior,
        }
    }
}

impl<N: RealField, D: Dim, P> LinearFilter<N, D, P> for KalmanFilter<N, D, P>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn filter(&self) -> &KalmanFilter<N, D, P> {
        self
    }

    fn filter_mut(&mut self) -> &mut KalmanFilter<N, D, P> {
        self
    }

    fn reset(&mut self) {
        self.state = self.prior.clone();
        self.t = 0;
        debug!(dim = self.state.x.nrows(), "reset to prior");
    }
}

impl<N: RealField, D: Dim, P> Estimator<N, D> for KalmanFilter<N, D, P>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn state(&self) -> Result<VectorN<N, D>, EstimateError> {
        Ok(self.state.x.clone())
    }
}

impl<N: RealField, D: Dim, P> KalmanEstimator<N, D> for KalmanFilter<N, D, P>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N, EstimateError> {
        self.state.init(state)
    }

    fn kalman_state(&self) -> Result<(N, KalmanState<N, D>), EstimateError> {
        self.state.kalman_state()
    }
}
