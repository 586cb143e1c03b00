#![allow(non_snake_case)]

//! Forward pass and simulation of an extended Kalman filter over a sequence of inputs.
//!
//! The forward pass corrects then predicts at each step and records the belief before and after
//! each correction. The record is what the smoother consumes.

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField, VectorN};
use nalgebra as na;
use rand_core::RngCore;
use tracing::debug;

use crate::error::EstimateError;
use crate::estimators::extended::ExtendedKalmanFilter;
use crate::models::LinearFilter;

/// Record of a forward pass.
///
/// `x[t], R[t]` is the belief before the correction of step `t` and `xt[t], Rt[t]` after it.
#[derive(Clone)]
pub struct ForwardTrajectory<N: RealField, D: Dim, ZD: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, ZD>,
{
    pub x: Vec<VectorN<N, D>>,
    pub xt: Vec<VectorN<N, D>>,
    pub R: Vec<MatrixN<N, D>>,
    pub Rt: Vec<MatrixN<N, D>>,
    /// Innovations
    pub e: Vec<VectorN<N, ZD>>,
    /// Sum of the log-likelihoods of all corrections
    pub ll: N,
}

impl<N: RealField, D: Dim, ZD: Dim> ForwardTrajectory<N, D, ZD>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, ZD>,
{
    pub fn with_capacity(T: usize) -> Self {
        ForwardTrajectory {
            x: Vec::with_capacity(T),
            xt: Vec::with_capacity(T),
            R: Vec::with_capacity(T),
            Rt: Vec::with_capacity(T),
            e: Vec::with_capacity(T),
            ll: N::zero(),
        }
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Check all sequences have the same length.
    pub fn check_lengths(&self) -> Result<(), EstimateError> {
        let T = self.len();
        for &(what, found) in &[("xt", self.xt.len()), ("R", self.R.len()), ("Rt", self.Rt.len())] {
            if found != T {
                return Err(EstimateError::TrajectoryLength {
                    what,
                    expected: T,
                    found,
                });
            }
        }
        Ok(())
    }
}

impl<N: RealField, D: Dim, ZD: Dim, U, P> ExtendedKalmanFilter<N, D, ZD, U, P>
where
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, ZD, ZD>
        + Allocator<N, ZD, D>
        + Allocator<N, D, ZD>
        + Allocator<N, D>
        + Allocator<N, ZD>,
{
    /// Reset to the prior and run correct then predict for each input `u[t]` and measurement `y[t]`.
    ///
    /// Step `t` is at time `t * Ts`.
    pub fn forward_trajectory(
        &mut self,
        u: &[U],
        y: &[VectorN<N, ZD>],
    ) -> Result<ForwardTrajectory<N, D, ZD>, EstimateError> {
        if y.len() != u.len() {
            return Err(EstimateError::TrajectoryLength {
                what: "y",
                expected: u.len(),
                found: y.len(),
            });
        }
        self.reset();
        let Ts = self.Ts();
        let mut sol = ForwardTrajectory::with_capacity(u.len());

        for (t, (ut, yt)) in u.iter().zip(y).enumerate() {
            let ti = na::convert::<f64, N>(t as f64) * Ts;
            sol.x.push(self.mean().clone());
            sol.R.push(self.covariance().clone());

            let innovation = self.correct_with(ut, yt, None, Some(ti), None)?;
            sol.ll += innovation.ll;
            sol.e.push(innovation.e);
            sol.xt.push(self.mean().clone());
            sol.Rt.push(self.covariance().clone());

            self.predict_with(ut, None, Some(ti), None, None)?;
        }

        debug!(steps = sol.len(), ll = %sol.ll, "forward trajectory");
        Ok(sol)
    }

    /// Simulate states and measurements for inputs `u`, starting from a sample of the prior.
    ///
    /// Without `noise` this is the deterministic rollout from the prior mean.
    pub fn simulate(
        &self,
        u: &[U],
        noise: bool,
        rng: &mut dyn RngCore,
    ) -> Result<(Vec<VectorN<N, D>>, Vec<VectorN<N, ZD>>), EstimateError> {
        let p = self.parameters();
        let Ts = self.Ts();
        let mut xs = Vec::with_capacity(u.len());
        let mut ys = Vec::with_capacity(u.len());

        let mut x = self.sample_initial_state(noise, rng)?;
        for (t, ut) in u.iter().enumerate() {
            let ti = na::convert::<f64, N>(t as f64) * Ts;
            ys.push(self.sample_measurement(&x, ut, p, ti, noise, rng)?);
            let x_next = self.sample_state(&x, ut, p, ti, noise, rng)?;
            xs.push(x);
            x = x_next;
        }

        Ok((xs, ys))
    }
}
