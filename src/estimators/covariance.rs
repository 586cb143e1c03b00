#![allow(non_snake_case)]

//! Covariance state estimation.
//!
//! A discrete Bayesian estimator that uses a Kalman state representation [`KalmanState`] of the system for estimation.
//! The Kalman state is simply the x,X pair the dimensions of both are the dimensions of the system.
//!
//! The linear Kalman state representation is used for non-linear systems by using linearised forms of the system model.
//! Covariances are re-symmetrised after every update to cancel floating point drift.
//!
//! [`KalmanState`]: ../../models/struct.KalmanState.html

use na::storage::Storage;
use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, MatrixN, RealField, VectorN, U1};
use na::Cholesky;
use nalgebra as na;
use rand_core::RngCore;

use crate::error::EstimateError;
use crate::linalg::cholesky;
use crate::matrix::{check_non_negativ, format_matrix, is_finite, symmetrize};
use crate::models::{
    Estimator, ExtendedLinearObserver, ExtendedLinearPredictor, Innovation, KalmanEstimator, KalmanState,
};
use crate::noise::{sample_zero_mean, CorrelatedNoise};

impl<N: RealField, D: Dim> KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    pub fn new_zero(d: D) -> KalmanState<N, D> {
        KalmanState {
            x: VectorN::zeros_generic(d, U1),
            X: MatrixN::zeros_generic(d, d),
        }
    }

    /// Draw a sample from the Gaussian N(x, X).
    pub fn sample(&self, rng: &mut dyn RngCore) -> Result<VectorN<N, D>, EstimateError> {
        Ok(&self.x + sample_zero_mean(&self.X, "X", rng)?)
    }
}

impl<N: RealField, D: Dim> Estimator<N, D> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn state(&self) -> Result<VectorN<N, D>, EstimateError> {
        Ok(self.x.clone())
    }
}

impl<N: RealField, D: Dim> KalmanEstimator<N, D> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N, EstimateError> {
        let mut UC = state.X.clone();
        let rcond = cholesky::UCfactor(&mut UC);
        check_non_negativ(rcond, "X")?;

        self.x = state.x.clone();
        self.X = state.X.clone();

        Ok(rcond)
    }

    fn kalman_state(&self) -> Result<(N, KalmanState<N, D>), EstimateError> {
        Ok((N::one(), self.clone()))
    }
}

impl<N: RealField, D: Dim> ExtendedLinearPredictor<N, D> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    fn predict(
        &mut self,
        x_pred: &VectorN<N, D>,
        Fx: &MatrixN<N, D>,
        noise: &CorrelatedNoise<N, D>,
        alpha: N,
    ) -> Result<(), EstimateError> {
        self.x.copy_from(x_pred);
        // X = alpha.Fx.X.Fx' + Q
        self.X.quadform_tr(alpha, Fx, &self.X.clone(), N::zero());
        symmetrize(&mut self.X);
        self.X += &noise.Q;

        Ok(())
    }
}

impl<N: RealField, D: Dim, ZD: Dim> ExtendedLinearObserver<N, D, ZD> for KalmanState<N, D>
where
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, ZD, ZD>
        + Allocator<N, ZD, D>
        + Allocator<N, D, ZD>
        + Allocator<N, D>
        + Allocator<N, ZD>,
{
    fn observe_innovation(
        &mut self,
        s: &VectorN<N, ZD>,
        Hx: &MatrixMN<N, ZD, D>,
        noise: &CorrelatedNoise<N, ZD>,
    ) -> Result<Innovation<N, D, ZD>, EstimateError> {
        let XHt = &self.X * Hx.transpose();
        // S = Hx.X.Hx' + Q
        let mut S = Hx * &XHt;
        symmetrize(&mut S);
        S += &noise.Q;

        // Factorise innovation covariance, no state is modified until S is known to be PD
        let Sc = match Cholesky::new(S.clone()) {
            Some(Sc) if factor_is_pd(&Sc) => Sc,
            _ => return Err(EstimateError::InnovationNotPD { S: format_matrix(&S) }),
        };

        // Kalman gain, X.Hx'.inv(S), solved as inv(S).Hx.X
        let W = Sc.solve(&XHt.transpose()).transpose();

        // State update
        self.x += &W * s;
        // X = (I - W.Hx).X
        let d = self.x.data.shape().0;
        let IWH = MatrixN::<N, D>::identity_generic(d, d) - &W * Hx;
        self.X = IWH * &self.X;
        symmetrize(&mut self.X);

        let ll = log_likelihood(&Sc, s);
        Ok(Innovation {
            ll,
            e: s.clone(),
            S,
            Sc,
            K: W,
        })
    }
}

/// The factor has a strictly positive and finite diagonal.
///
/// Cholesky::new accepts zero pivots, which are semi-definite.
pub(crate) fn factor_is_pd<N: RealField, D: Dim>(Sc: &Cholesky<N, D>) -> bool
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let L = Sc.l_dirty();
    (0..L.nrows()).all(|i| L[(i, i)] > N::zero() && is_finite(L[(i, i)]))
}

/// Log density of `e` under N(0, S) given the Cholesky factor of S.
pub fn log_likelihood<N: RealField, ZD: Dim>(Sc: &Cholesky<N, ZD>, e: &VectorN<N, ZD>) -> N
where
    DefaultAllocator: Allocator<N, ZD, ZD> + Allocator<N, ZD>,
{
    let two = N::one() + N::one();
    let L = Sc.l_dirty();
    // log(det(S)) = 2 * sum(log(diag(L)))
    let mut logdet = N::zero();
    for i in 0..e.nrows() {
        logdet += L[(i, i)].ln();
    }
    logdet *= two;
    let ny: N = na::convert(e.nrows() as f64);
    let mahalanobis = e.dot(&Sc.solve(e));

    -(ny * N::two_pi().ln() + logdet + mahalanobis) / two
}
