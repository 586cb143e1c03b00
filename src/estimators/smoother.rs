#![allow(non_snake_case)]

//! Rauch-Tung-Striebel smoother.
//!
//! Backward recursion over a [`ForwardTrajectory`] of an [`ExtendedKalmanFilter`]. The dynamics are
//! re-linearised at the smoothed state of the following step.
//!
//! [`ForwardTrajectory`]: ../../trajectory/struct.ForwardTrajectory.html
//! [`ExtendedKalmanFilter`]: ../extended/struct.ExtendedKalmanFilter.html

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField, VectorN};
use na::Cholesky;
use nalgebra as na;
use tracing::debug;

use crate::error::EstimateError;
use crate::estimators::covariance::factor_is_pd;
use crate::estimators::extended::ExtendedKalmanFilter;
use crate::matrix::{format_matrix, symmetrize};
use crate::trajectory::ForwardTrajectory;

/// Smoothed means and covariances of every step.
#[derive(Clone)]
pub struct SmoothedTrajectory<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    pub xT: Vec<VectorN<N, D>>,
    pub RT: Vec<MatrixN<N, D>>,
    /// Log-likelihood of the forward pass
    pub ll: N,
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
    /// Smooth the forward trajectory `sol` produced with inputs `u`.
    pub fn smooth(
        &mut self,
        sol: &ForwardTrajectory<N, D, ZD>,
        u: &[U],
    ) -> Result<SmoothedTrajectory<N, D>, EstimateError> {
        self.smooth_with(sol, u, None)
    }

    /// Smooth with parameters `p`, defaulting to the filter parameters.
    pub fn smooth_with(
        &mut self,
        sol: &ForwardTrajectory<N, D, ZD>,
        u: &[U],
        p: Option<&P>,
    ) -> Result<SmoothedTrajectory<N, D>, EstimateError> {
        let T = sol.len();
        if T == 0 {
            return Err(EstimateError::EmptyTrajectory);
        }
        sol.check_lengths()?;
        if u.len() != T {
            return Err(EstimateError::TrajectoryLength {
                what: "u",
                expected: T,
                found: u.len(),
            });
        }

        let p = p.unwrap_or(&self.kf.p);
        let Ts = self.kf.Ts;
        let mut xT = sol.xt.clone();
        let mut RT = sol.Rt.clone();

        for t in (0..T - 1).rev() {
            let tf: N = na::convert((t + 1) as f64);
            let A = self.Ajac.jacobian(&self.dynamics, &xT[t + 1], &u[t + 1], p, tf * Ts)?;

            let Rc = match Cholesky::new(sol.R[t + 1].clone()) {
                Some(Rc) if factor_is_pd(&Rc) => Rc,
                _ => {
                    return Err(EstimateError::SmootherNotPD {
                        t: t + 1,
                        R: format_matrix(&sol.R[t + 1]),
                    })
                }
            };
            // G = Rt.A'.inv(R), solved as inv(R).A.Rt with R and Rt symmetric
            let G = Rc.solve(&(&A * &sol.Rt[t])).transpose();

            xT[t] = &sol.xt[t] + &G * (&xT[t + 1] - &sol.x[t + 1]);
            let mut dR = &G * (&RT[t + 1] - &sol.R[t + 1]) * G.transpose();
            symmetrize(&mut dR);
            RT[t] = &sol.Rt[t] + dR;
        }

        debug!(steps = T, ll = %sol.ll, "smoothed trajectory");
        Ok(SmoothedTrajectory { xT, RT, ll: sol.ll })
    }

    /// Reset to the prior, filter inputs `u` and measurements `y`, then smooth.
    pub fn forward_smooth(
        &mut self,
        u: &[U],
        y: &[VectorN<N, ZD>],
    ) -> Result<SmoothedTrajectory<N, D>, EstimateError> {
        let sol = self.forward_trajectory(u, y)?;
        self.smooth(&sol, u)
    }
}
