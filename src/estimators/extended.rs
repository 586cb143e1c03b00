#![allow(non_snake_case)]

//! Extended Kalman filter.
//!
//! [`ExtendedKalmanFilter`] linearises non-linear dynamics and measurement functions at the current
//! state and applies the linear covariance predict and observe of [`KalmanState`].
//!
//! The filter owns an inner [`KalmanFilter`] holding the belief, time index, sampling period and
//! parameters. These are accessed with the [`LinearFilter`] trait.
//!
//! [`ExtendedKalmanFilter`]: struct.ExtendedKalmanFilter.html
//! [`KalmanState`]: ../../models/struct.KalmanState.html
//! [`KalmanFilter`]: ../kalman/struct.KalmanFilter.html
//! [`LinearFilter`]: ../../models/trait.LinearFilter.html

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixN, RealField, VectorN};
use nalgebra as na;
use rand_core::RngCore;
use tracing::warn;

use crate::error::EstimateError;
use crate::estimators::kalman::KalmanFilter;
use crate::functions::StateFunction;
use crate::jacobian::{ForwardDifference, Linearization};
use crate::linalg::cholesky;
use crate::matrix::{check_non_negativ, is_symmetric, SYMMETRY_TOLERANCE};
use crate::models::{
    Estimator, ExtendedLinearObserver, ExtendedLinearPredictor, Innovation, KalmanEstimator, KalmanState,
    LinearFilter,
};
use crate::noise::{CorrelatedNoise, NoiseModel};
use crate::options::FilterOptions;

/// Extended Kalman filter with state dimension `D` and measurement dimension `ZD`.
///
/// `U` is the input type and `P` the parameters passed to all user functions.
pub struct ExtendedKalmanFilter<N: RealField, D: Dim, ZD: Dim, U, P>
where
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, ZD, ZD>
        + Allocator<N, ZD, D>
        + Allocator<N, D, ZD>
        + Allocator<N, D>
        + Allocator<N, ZD>,
{
    pub(crate) kf: KalmanFilter<N, D, P>,
    pub(crate) dynamics: StateFunction<N, D, D, U, P>,
    pub(crate) measurement: StateFunction<N, D, ZD, U, P>,
    pub(crate) R1: NoiseModel<N, D, D, U, P>,
    pub(crate) R2: NoiseModel<N, D, ZD, U, P>,
    pub(crate) Ajac: Linearization<N, D, D, U, P>,
    pub(crate) Cjac: Linearization<N, D, ZD, U, P>,
    alpha: N,
    nu: usize,
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
    /// Construct a filter starting from `prior`.
    ///
    /// Jacobians are derived by forward differences unless supplied with [`with_dynamics_jacobian`]
    /// or [`with_measurement_jacobian`]. When `options.check` is set the prior and fixed noises are
    /// checked for dimensions, symmetry and positive semi-definiteness.
    ///
    /// [`with_dynamics_jacobian`]: #method.with_dynamics_jacobian
    /// [`with_measurement_jacobian`]: #method.with_measurement_jacobian
    pub fn new(
        dynamics: StateFunction<N, D, D, U, P>,
        measurement: StateFunction<N, D, ZD, U, P>,
        R1: NoiseModel<N, D, D, U, P>,
        R2: NoiseModel<N, D, ZD, U, P>,
        prior: KalmanState<N, D>,
        p: P,
        options: FilterOptions<N>,
    ) -> Result<Self, EstimateError> {
        let d = dynamics.dim();
        let zd = measurement.dim();

        if options.check {
            let nx = d.value();
            check_dimension(prior.x.nrows(), nx, "prior mean")?;
            check_covariance(&prior.X, nx, "prior covariance")?;
            if let NoiseModel::Fixed(noise) = &R1 {
                check_covariance(&noise.Q, nx, "R1")?;
            }
            if let NoiseModel::Fixed(noise) = &R2 {
                check_covariance(&noise.Q, zd.value(), "R2")?;
            }
        }
        if options.alpha < N::one() {
            warn!(alpha = %options.alpha, "alpha below one shrinks the predicted covariance");
        }

        Ok(ExtendedKalmanFilter {
            kf: KalmanFilter::new(prior, options.Ts, p),
            dynamics,
            measurement,
            R1,
            R2,
            Ajac: Linearization::derived(ForwardDifference, d, d),
            Cjac: Linearization::derived(ForwardDifference, d, zd),
            alpha: options.alpha,
            nu: options.nu,
        })
    }

    /// Use `Ajac` to linearise the dynamics.
    pub fn with_dynamics_jacobian(mut self, Ajac: Linearization<N, D, D, U, P>) -> Self {
        self.Ajac = Ajac;
        self
    }

    /// Use `Cjac` to linearise the measurement.
    pub fn with_measurement_jacobian(mut self, Cjac: Linearization<N, D, ZD, U, P>) -> Self {
        self.Cjac = Cjac;
        self
    }

    /// Number of control inputs.
    pub fn nu(&self) -> usize {
        self.nu
    }

    /// Covariance inflation factor.
    pub fn alpha(&self) -> N {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: N) {
        self.alpha = alpha;
    }

    pub fn dynamics(&self) -> &StateFunction<N, D, D, U, P> {
        &self.dynamics
    }

    pub fn measurement(&self) -> &StateFunction<N, D, ZD, U, P> {
        &self.measurement
    }

    /// Predict with input `u` at the current time.
    pub fn predict(&mut self, u: &U) -> Result<(), EstimateError> {
        self.predict_with(u, None, None, None, None)
    }

    /// Predict with input `u`.
    ///
    /// `p` and `t` default to the filter parameters and current time. `noise` overrides the process
    /// noise R1 and `alpha` the filter's inflation factor. The time index is incremented.
    pub fn predict_with(
        &mut self,
        u: &U,
        p: Option<&P>,
        t: Option<N>,
        noise: Option<&CorrelatedNoise<N, D>>,
        alpha: Option<N>,
    ) -> Result<(), EstimateError> {
        let t = t.unwrap_or_else(|| self.time());
        let alpha = alpha.unwrap_or(self.alpha);
        let p = p.unwrap_or(&self.kf.p);
        let x = &self.kf.state.x;

        let A = self.Ajac.jacobian(&self.dynamics, x, u, p, t)?;
        let x_pred = self.dynamics.call(x, u, p, t);
        let evaluated;
        let R1 = match noise {
            Some(noise) => noise,
            None => {
                evaluated = self.R1.evaluate(x, u, p, t);
                &evaluated
            }
        };

        self.kf.state.predict(&x_pred, &A, R1, alpha)?;
        self.kf.t += 1;
        Ok(())
    }

    /// Correct with input `u` and measurement `y` at the current index.
    pub fn correct(&mut self, u: &U, y: &VectorN<N, ZD>) -> Result<Innovation<N, D, ZD>, EstimateError> {
        self.correct_with(u, y, None, None, None)
    }

    /// Correct with input `u` and measurement `y`.
    ///
    /// `p` defaults to the filter parameters and `t` to the current index, `noise` overrides the
    /// measurement noise R2. On failure the belief is unchanged.
    pub fn correct_with(
        &mut self,
        u: &U,
        y: &VectorN<N, ZD>,
        p: Option<&P>,
        t: Option<N>,
        noise: Option<&CorrelatedNoise<N, ZD>>,
    ) -> Result<Innovation<N, D, ZD>, EstimateError> {
        let index = self.kf.t;
        let t = t.unwrap_or_else(|| na::convert(index as f64));
        let p = p.unwrap_or(&self.kf.p);
        let x = &self.kf.state.x;

        let C = self.Cjac.jacobian(&self.measurement, x, u, p, t)?;
        let e = y - self.measurement.call(x, u, p, t);
        let evaluated;
        let R2 = match noise {
            Some(noise) => noise,
            None => {
                evaluated = self.R2.evaluate(x, u, p, t);
                &evaluated
            }
        };

        match self.kf.state.observe_innovation(&e, &C, R2) {
            Ok(innovation) => Ok(innovation),
            Err(err) => {
                warn!(index, error = %err, "correct failed");
                Err(err)
            }
        }
    }

    /// A sample of the initial state, the prior mean when `noise` is false.
    pub fn sample_initial_state(&self, noise: bool, rng: &mut dyn RngCore) -> Result<VectorN<N, D>, EstimateError> {
        if noise {
            self.kf.prior.sample(rng)
        } else {
            Ok(self.kf.prior.x.clone())
        }
    }

    /// A sample of the state following `x`, adding process noise when `noise` is true.
    pub fn sample_state(
        &self,
        x: &VectorN<N, D>,
        u: &U,
        p: &P,
        t: N,
        noise: bool,
        rng: &mut dyn RngCore,
    ) -> Result<VectorN<N, D>, EstimateError> {
        let mut xp = self.dynamics.call(x, u, p, t);
        if noise {
            xp += self.R1.evaluate(x, u, p, t).sample(rng)?;
        }
        Ok(xp)
    }

    /// A sample of the measurement of `x`, adding measurement noise when `noise` is true.
    pub fn sample_measurement(
        &self,
        x: &VectorN<N, D>,
        u: &U,
        p: &P,
        t: N,
        noise: bool,
        rng: &mut dyn RngCore,
    ) -> Result<VectorN<N, ZD>, EstimateError> {
        let mut y = self.measurement.call(x, u, p, t);
        if noise {
            y += self.R2.evaluate(x, u, p, t).sample(rng)?;
        }
        Ok(y)
    }
}

fn check_dimension(found: usize, expected: usize, what: &'static str) -> Result<(), EstimateError> {
    if found == expected {
        Ok(())
    } else {
        Err(EstimateError::Dimension { what, expected, found })
    }
}

/// Check `Q` is an n by n symmetric PSD matrix.
fn check_covariance<N: RealField, D: Dim>(Q: &MatrixN<N, D>, n: usize, what: &'static str) -> Result<(), EstimateError>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    check_dimension(Q.nrows(), n, what)?;
    check_dimension(Q.ncols(), n, what)?;
    if !is_symmetric(Q, na::convert(SYMMETRY_TOLERANCE)) {
        return Err(EstimateError::NotSymmetric(what));
    }
    let mut UC = Q.clone();
    check_non_negativ(cholesky::UCfactor(&mut UC), what)?;
    Ok(())
}

impl<N: RealField, D: Dim, ZD: Dim, U, P> LinearFilter<N, D, P> for ExtendedKalmanFilter<N, D, ZD, U, P>
where
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, ZD, ZD>
        + Allocator<N, ZD, D>
        + Allocator<N, D, ZD>
        + Allocator<N, D>
        + Allocator<N, ZD>,
{
    fn filter(&self) -> &KalmanFilter<N, D, P> {
        &self.kf
    }

    fn filter_mut(&mut self) -> &mut KalmanFilter<N, D, P> {
        &mut self.kf
    }
}

impl<N: RealField, D: Dim, ZD: Dim, U, P> Estimator<N, D> for ExtendedKalmanFilter<N, D, ZD, U, P>
where
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, ZD, ZD>
        + Allocator<N, ZD, D>
        + Allocator<N, D, ZD>
        + Allocator<N, D>
        + Allocator<N, ZD>,
{
    fn state(&self) -> Result<VectorN<N, D>, EstimateError> {
        self.kf.state()
    }
}

impl<N: RealField, D: Dim, ZD: Dim, U, P> KalmanEstimator<N, D> for ExtendedKalmanFilter<N, D, ZD, U, P>
where
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, ZD, ZD>
        + Allocator<N, ZD, D>
        + Allocator<N, D, ZD>
        + Allocator<N, D>
        + Allocator<N, ZD>,
{
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N, EstimateError> {
        self.kf.init(state)
    }

    fn kalman_state(&self) -> Result<(N, KalmanState<N, D>), EstimateError> {
        self.kf.kalman_state()
    }
}
