#![allow(non_snake_case)]

//! Linearisation of dynamics and measurement functions.
//!
//! A [`Linearization`] provides the Jacobian of a [`StateFunction`] with respect to the state `x`,
//! holding the input, parameters and time fixed. The Jacobian is either supplied by the user or
//! derived by a [`Differentiator`] backend. Backends always differentiate a function which writes
//! into an output buffer. The buffers are allocated once and reused for every linearisation.
//!
//! [`Linearization`]: enum.Linearization.html
//! [`StateFunction`]: ../functions/enum.StateFunction.html
//! [`Differentiator`]: trait.Differentiator.html

use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, RealField, VectorN, U1};
use nalgebra as na;

use crate::error::EstimateError;
use crate::functions::StateFunction;
use crate::matrix::is_finite;

/// Preallocated buffers for derived Jacobians.
pub struct JacobianScratch<N: RealField, D: Dim, R: Dim>
where
    DefaultAllocator: Allocator<N, D> + Allocator<N, R> + Allocator<N, R, D>,
{
    /// f(x)
    pub fx: VectorN<N, R>,
    /// f(x) at a stepped x
    pub fx_step: VectorN<N, R>,
    /// Stepped x
    pub x_step: VectorN<N, D>,
    /// The Jacobian
    pub jac: MatrixMN<N, R, D>,
}

impl<N: RealField, D: Dim, R: Dim> JacobianScratch<N, D, R>
where
    DefaultAllocator: Allocator<N, D> + Allocator<N, R> + Allocator<N, R, D>,
{
    pub fn new_zero(d: D, r: R) -> Self {
        JacobianScratch {
            fx: VectorN::zeros_generic(r, U1),
            fx_step: VectorN::zeros_generic(r, U1),
            x_step: VectorN::zeros_generic(d, U1),
            jac: MatrixMN::zeros_generic(r, d),
        }
    }
}

/// A differentiation backend.
///
/// Computes the Jacobian of `f` at `x` into `scratch.jac`. `f(out, x)` writes its value into `out`.
pub trait Differentiator<N: RealField, D: Dim, R: Dim>
where
    DefaultAllocator: Allocator<N, D> + Allocator<N, R> + Allocator<N, R, D>,
{
    fn jacobian(
        &self,
        f: &mut dyn FnMut(&mut VectorN<N, R>, &VectorN<N, D>),
        x: &VectorN<N, D>,
        scratch: &mut JacobianScratch<N, D, R>,
    ) -> Result<(), EstimateError>;
}

/// Forward finite differences.
///
/// Uses step size `h_j = sqrt(ε) * max(|x_j|, 1)`, requiring `n + 1` function evaluations.
#[derive(Clone, Copy, Default)]
pub struct ForwardDifference;

/// Central finite differences.
///
/// Uses step size `h_j = cbrt(ε) * max(|x_j|, 1)`, requiring `2n` function evaluations.
#[derive(Clone, Copy, Default)]
pub struct CentralDifference;

impl<N: RealField, D: Dim, R: Dim> Differentiator<N, D, R> for ForwardDifference
where
    DefaultAllocator: Allocator<N, D> + Allocator<N, R> + Allocator<N, R, D>,
{
    fn jacobian(
        &self,
        f: &mut dyn FnMut(&mut VectorN<N, R>, &VectorN<N, D>),
        x: &VectorN<N, D>,
        scratch: &mut JacobianScratch<N, D, R>,
    ) -> Result<(), EstimateError> {
        let sqrt_eps = N::sqrt(na::convert(f64::EPSILON));
        f(&mut scratch.fx, x);
        scratch.x_step.copy_from(x);

        for j in 0..x.nrows() {
            let xj = x[j];
            let h = sqrt_eps * xj.abs().max(N::one());
            scratch.x_step[j] = xj + h;
            f(&mut scratch.fx_step, &scratch.x_step);
            scratch.x_step[j] = xj;

            for i in 0..scratch.fx.nrows() {
                let d = (scratch.fx_step[i] - scratch.fx[i]) / h;
                if !is_finite(d) {
                    return Err(EstimateError::NotDifferentiable { column: j });
                }
                scratch.jac[(i, j)] = d;
            }
        }

        Ok(())
    }
}

impl<N: RealField, D: Dim, R: Dim> Differentiator<N, D, R> for CentralDifference
where
    DefaultAllocator: Allocator<N, D> + Allocator<N, R> + Allocator<N, R, D>,
{
    fn jacobian(
        &self,
        f: &mut dyn FnMut(&mut VectorN<N, R>, &VectorN<N, D>),
        x: &VectorN<N, D>,
        scratch: &mut JacobianScratch<N, D, R>,
    ) -> Result<(), EstimateError> {
        let cbrt_eps = N::cbrt(na::convert(f64::EPSILON));
        let two = N::one() + N::one();
        scratch.x_step.copy_from(x);

        for j in 0..x.nrows() {
            let xj = x[j];
            let h = cbrt_eps * xj.abs().max(N::one());
            scratch.x_step[j] = xj + h;
            f(&mut scratch.fx_step, &scratch.x_step);
            scratch.x_step[j] = xj - h;
            f(&mut scratch.fx, &scratch.x_step);
            scratch.x_step[j] = xj;

            for i in 0..scratch.fx.nrows() {
                let d = (scratch.fx_step[i] - scratch.fx[i]) / (two * h);
                if !is_finite(d) {
                    return Err(EstimateError::NotDifferentiable { column: j });
                }
                scratch.jac[(i, j)] = d;
            }
        }

        Ok(())
    }
}

/// Jacobian provider of a function with output dimension `R`.
pub enum Linearization<N: RealField, D: Dim, R: Dim, U, P>
where
    DefaultAllocator: Allocator<N, D> + Allocator<N, R> + Allocator<N, R, D>,
{
    /// User supplied Jacobian `J(x, u, p, t)`.
    Supplied(Box<dyn Fn(&VectorN<N, D>, &U, &P, N) -> MatrixMN<N, R, D>>),
    /// Jacobian derived from the function by a differentiation backend.
    Derived {
        backend: Box<dyn Differentiator<N, D, R>>,
        scratch: JacobianScratch<N, D, R>,
    },
}

impl<N: RealField, D: Dim, R: Dim, U, P> Linearization<N, D, R, U, P>
where
    DefaultAllocator: Allocator<N, D> + Allocator<N, R> + Allocator<N, R, D>,
{
    pub fn supplied(J: impl Fn(&VectorN<N, D>, &U, &P, N) -> MatrixMN<N, R, D> + 'static) -> Self {
        Linearization::Supplied(Box::new(J))
    }

    /// Derive Jacobians with `backend` for a function from dimension `d` to `r`.
    pub fn derived(backend: impl Differentiator<N, D, R> + 'static, d: D, r: R) -> Self {
        Linearization::Derived {
            backend: Box::new(backend),
            scratch: JacobianScratch::new_zero(d, r),
        }
    }

    /// The Jacobian of `f` at `(x, u, p, t)` with respect to `x`.
    pub fn jacobian(
        &mut self,
        f: &StateFunction<N, D, R, U, P>,
        x: &VectorN<N, D>,
        u: &U,
        p: &P,
        t: N,
    ) -> Result<MatrixMN<N, R, D>, EstimateError> {
        match self {
            Linearization::Supplied(J) => Ok(J(x, u, p, t)),
            Linearization::Derived { backend, scratch } => {
                let mut fx = |out: &mut VectorN<N, R>, xs: &VectorN<N, D>| f.call_into(out, xs, u, p, t);
                backend.jacobian(&mut fx, x, scratch)?;
                Ok(scratch.jac.clone())
            }
        }
    }
}
