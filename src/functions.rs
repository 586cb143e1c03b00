//! Dynamics and measurement functions.
//!
//! A user function maps a state `x`, input `U`, parameters `P` and time `t` to an output vector.
//! It either returns a new vector or writes its result into a caller supplied buffer. The calling
//! convention is chosen when the function is constructed and is fixed for the life of a filter.

use na::{allocator::Allocator, DefaultAllocator, Dim, RealField, VectorN, U1};
use nalgebra as na;

/// A function of `(x, u, p, t)` with output dimension `R`.
pub enum StateFunction<N: RealField, D: Dim, R: Dim, U, P>
where
    DefaultAllocator: Allocator<N, D> + Allocator<N, R>,
{
    /// `f(x, u, p, t)` returns the output.
    Returning {
        f: Box<dyn Fn(&VectorN<N, D>, &U, &P, N) -> VectorN<N, R>>,
        dim: R,
    },
    /// `f(out, x, u, p, t)` writes the output into `out`.
    InPlace {
        f: Box<dyn Fn(&mut VectorN<N, R>, &VectorN<N, D>, &U, &P, N)>,
        dim: R,
    },
}

impl<N: RealField, D: Dim, R: Dim, U, P> StateFunction<N, D, R, U, P>
where
    DefaultAllocator: Allocator<N, D> + Allocator<N, R>,
{
    pub fn returning(dim: R, f: impl Fn(&VectorN<N, D>, &U, &P, N) -> VectorN<N, R> + 'static) -> Self {
        StateFunction::Returning { f: Box::new(f), dim }
    }

    pub fn in_place(dim: R, f: impl Fn(&mut VectorN<N, R>, &VectorN<N, D>, &U, &P, N) + 'static) -> Self {
        StateFunction::InPlace { f: Box::new(f), dim }
    }

    /// Output dimension.
    pub fn dim(&self) -> R {
        match self {
            StateFunction::Returning { dim, .. } => *dim,
            StateFunction::InPlace { dim, .. } => *dim,
        }
    }

    pub fn is_in_place(&self) -> bool {
        match self {
            StateFunction::Returning { .. } => false,
            StateFunction::InPlace { .. } => true,
        }
    }

    /// Evaluate, allocating the output.
    pub fn call(&self, x: &VectorN<N, D>, u: &U, p: &P, t: N) -> VectorN<N, R> {
        match self {
            StateFunction::Returning { f, .. } => f(x, u, p, t),
            StateFunction::InPlace { f, dim } => {
                let mut out = VectorN::zeros_generic(*dim, U1);
                f(&mut out, x, u, p, t);
                out
            }
        }
    }

    /// Evaluate into `out`.
    pub fn call_into(&self, out: &mut VectorN<N, R>, x: &VectorN<N, D>, u: &U, p: &P, t: N) {
        match self {
            StateFunction::Returning { f, .. } => {
                let y = f(x, u, p, t);
                debug_assert_eq!(y.nrows(), out.nrows());
                out.copy_from(&y);
            }
            StateFunction::InPlace { f, .. } => f(out, x, u, p, t),
        }
    }
}
