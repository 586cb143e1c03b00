#![allow(non_snake_case)]

//! Additive noise models.
//!
//! Fixed Gaussian noises are structs, a covariance matrix or a variance vector with optional coupling.
//! Noise which depends on the state, input, parameters or time is a [`NoiseModel`] function, evaluated
//! each time the noise is needed.
//!
//! [`NoiseModel`]: enum.NoiseModel.html

use na::storage::Storage;
use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, MatrixN, VectorN};
use na::{RealField, U1};
use nalgebra as na;
use rand_core::RngCore;
use rand_distr::{Distribution, StandardNormal};

use crate::error::EstimateError;
use crate::linalg::cholesky;
use crate::matrix::{check_non_negativ, symmetrize};

/// Uncorrelated noise, the diagonal of the covariance.
pub struct UncorrelatedNoise<N: RealField, QD: Dim>
where
    DefaultAllocator: Allocator<N, QD>,
{
    /// Noise variances
    pub q: VectorN<N, QD>,
}

/// Correlated noise with covariance `Q`.
#[derive(PartialEq, Clone)]
pub struct CorrelatedNoise<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    /// Noise covariance
    pub Q: MatrixN<N, D>,
}

/// Noise variances `q` coupled into the state by `G`, with covariance G.diag(q).G'.
pub struct CoupledNoise<N: RealField, D: Dim, QD: Dim>
where
    DefaultAllocator: Allocator<N, D, QD> + Allocator<N, QD>,
{
    /// Noise variances
    pub q: VectorN<N, QD>,
    /// Noise coupling
    pub G: MatrixMN<N, D, QD>,
}

impl<N: RealField, D: Dim> CorrelatedNoise<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    pub fn from_coupled<QD: Dim>(coupled: &CoupledNoise<N, D, QD>) -> Self
    where
        DefaultAllocator: Allocator<N, QD, QD> + Allocator<N, D, QD> + Allocator<N, QD> + Allocator<N, QD, D>,
    {
        let mut Q = &coupled.G * MatrixN::from_diagonal(&coupled.q) * coupled.G.transpose();
        symmetrize(&mut Q);
        CorrelatedNoise { Q }
    }

    pub fn from_uncorrelated(uncorrelated: &UncorrelatedNoise<N, D>) -> Self {
        CorrelatedNoise {
            Q: MatrixN::from_diagonal(&uncorrelated.q),
        }
    }

    /// Draw a sample of the zero mean noise.
    ///
    /// The covariance must be PSD, zero and degenerate noises are allowed.
    pub fn sample(&self, rng: &mut dyn RngCore) -> Result<VectorN<N, D>, EstimateError> {
        sample_zero_mean(&self.Q, "Q", rng)
    }
}

/// Draw from N(0, X) using the UC factor of X.
pub(crate) fn sample_zero_mean<N: RealField, D: Dim>(
    X: &MatrixN<N, D>,
    what: &'static str,
    rng: &mut dyn RngCore,
) -> Result<VectorN<N, D>, EstimateError>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    let mut UC = X.clone();
    let rcond = cholesky::UCfactor(&mut UC);
    check_non_negativ(rcond, what)?;

    let z = VectorN::<N, D>::from_fn_generic(X.data.shape().0, U1, |_, _| {
        let v: f64 = StandardNormal.sample(&mut *rng);
        na::convert(v)
    });
    Ok(UC * z)
}

/// Additive noise model.
///
/// The noise covariance is either fixed or a function of the state, input `U`, parameters `P` and time.
/// A function is evaluated fresh each time the noise is used.
pub enum NoiseModel<N: RealField, D: Dim, QD: Dim, U, P>
where
    DefaultAllocator: Allocator<N, QD, QD> + Allocator<N, D>,
{
    Fixed(CorrelatedNoise<N, QD>),
    Function(Box<dyn Fn(&VectorN<N, D>, &U, &P, N) -> MatrixN<N, QD>>),
}

impl<N: RealField, D: Dim, QD: Dim, U, P> NoiseModel<N, D, QD, U, P>
where
    DefaultAllocator: Allocator<N, QD, QD> + Allocator<N, D>,
{
    /// Fixed noise with covariance `Q`.
    pub fn fixed(Q: MatrixN<N, QD>) -> Self {
        NoiseModel::Fixed(CorrelatedNoise { Q })
    }

    /// Noise covariance computed by `f(x, u, p, t)`.
    pub fn function(f: impl Fn(&VectorN<N, D>, &U, &P, N) -> MatrixN<N, QD> + 'static) -> Self {
        NoiseModel::Function(Box::new(f))
    }

    /// The noise at `(x, u, p, t)`.
    pub fn evaluate(&self, x: &VectorN<N, D>, u: &U, p: &P, t: N) -> CorrelatedNoise<N, QD> {
        match self {
            NoiseModel::Fixed(noise) => noise.clone(),
            NoiseModel::Function(f) => CorrelatedNoise { Q: f(x, u, p, t) },
        }
    }
}

impl<N: RealField, D: Dim, QD: Dim, U, P> From<CorrelatedNoise<N, QD>> for NoiseModel<N, D, QD, U, P>
where
    DefaultAllocator: Allocator<N, QD, QD> + Allocator<N, D>,
{
    fn from(noise: CorrelatedNoise<N, QD>) -> Self {
        NoiseModel::Fixed(noise)
    }
}
