//! Models shared by the extended Kalman filter tests.
//!
//! A linear constant velocity model with position measurements and a non-linear pendulum with
//! measurements of the sine of its angle. Both have two states and are generic in the state dimension
//! type so they are tested with fixed and Dynamic matrices.

#![allow(non_snake_case, dead_code)]

use na::storage::Storage;
use na::{allocator::Allocator, DefaultAllocator, Dim, MatrixMN, MatrixN, Vector1, VectorN, U1};
use nalgebra as na;

use bayes_ekf::{
    ExtendedKalmanFilter, FilterOptions, KalmanState, Linearization, NoiseModel, StateFunction,
};

/// Pendulum step and gravity.
pub const DT: f64 = 0.1;
pub const G: f64 = 9.81;

pub fn vector<D: Dim>(d: D, v: &[f64]) -> VectorN<f64, D>
where
    DefaultAllocator: Allocator<f64, D>,
{
    VectorN::from_row_slice_generic(d, U1, v)
}

pub fn matrix<D: Dim>(d: D, rows: &[f64]) -> MatrixN<f64, D>
where
    DefaultAllocator: Allocator<f64, D, D>,
{
    MatrixN::from_row_slice_generic(d, d, rows)
}

/// Constant velocity transition, the input accelerates.
pub fn cv_transition<D: Dim>(d: D) -> MatrixN<f64, D>
where
    DefaultAllocator: Allocator<f64, D, D>,
{
    matrix(d, &[1., 1., 0., 1.])
}

/// Position measurement.
pub fn cv_observation<D: Dim>(d: D) -> MatrixMN<f64, U1, D>
where
    DefaultAllocator: Allocator<f64, U1, D>,
{
    MatrixMN::from_row_slice_generic(U1, d, &[1., 0.])
}

/// Constant velocity filter with process noise `q * I`, measurement noise `r` and prior N(x0, X0).
///
/// Jacobians are supplied.
pub fn cv_filter<D: Dim>(d: D, q: f64, r: f64, x0: &[f64], X0: &[f64]) -> ExtendedKalmanFilter<f64, D, U1, f64, ()>
where
    DefaultAllocator: Allocator<f64, D, D>
        + Allocator<f64, U1, U1>
        + Allocator<f64, U1, D>
        + Allocator<f64, D, U1>
        + Allocator<f64, D>
        + Allocator<f64, U1>,
{
    let F = cv_transition(d);
    let H = cv_observation(d);
    let (Fj, Hj) = (F.clone(), H.clone());

    let dynamics = StateFunction::returning(d, move |x: &VectorN<f64, D>, u: &f64, _: &(), _: f64| {
        let mut xn = &F * x;
        xn[1] += *u;
        xn
    });
    let measurement =
        StateFunction::returning(U1, move |x: &VectorN<f64, D>, _: &f64, _: &(), _: f64| &H * x);

    ExtendedKalmanFilter::new(
        dynamics,
        measurement,
        NoiseModel::fixed(MatrixN::identity_generic(d, d) * q),
        NoiseModel::fixed(na::Matrix1::new(r)),
        KalmanState {
            x: vector(d, x0),
            X: matrix(d, X0),
        },
        (),
        FilterOptions::default(),
    )
    .unwrap()
    .with_dynamics_jacobian(Linearization::supplied(move |_: &VectorN<f64, D>, _: &f64, _: &(), _: f64| {
        Fj.clone()
    }))
    .with_measurement_jacobian(Linearization::supplied(move |_: &VectorN<f64, D>, _: &f64, _: &(), _: f64| {
        Hj.clone()
    }))
}

pub fn pendulum<D: Dim>(x: &VectorN<f64, D>) -> VectorN<f64, D>
where
    DefaultAllocator: Allocator<f64, D>,
{
    let mut xn = x.clone();
    xn[0] = x[0] + DT * x[1];
    xn[1] = x[1] - DT * G * x[0].sin();
    xn
}

pub fn pendulum_jacobian<D: Dim>(x: &VectorN<f64, D>) -> MatrixN<f64, D>
where
    DefaultAllocator: Allocator<f64, D, D> + Allocator<f64, D>,
{
    let d = x.data.shape().0;
    matrix(d, &[1., DT, -DT * G * x[0].cos(), 1.])
}

pub fn sine_measurement<D: Dim>(x: &VectorN<f64, D>) -> Vector1<f64>
where
    DefaultAllocator: Allocator<f64, D>,
{
    Vector1::new(x[0].sin())
}

pub fn sine_measurement_jacobian<D: Dim>(x: &VectorN<f64, D>) -> MatrixMN<f64, U1, D>
where
    DefaultAllocator: Allocator<f64, U1, D> + Allocator<f64, D>,
{
    let d = x.data.shape().0;
    MatrixMN::from_row_slice_generic(U1, d, &[x[0].cos(), 0.])
}

/// Pendulum filter with derived Jacobians.
///
/// `in_place` selects the calling convention of the dynamics and measurement functions.
pub fn pendulum_filter<D: Dim>(d: D, in_place: bool) -> ExtendedKalmanFilter<f64, D, U1, (), ()>
where
    DefaultAllocator: Allocator<f64, D, D>
        + Allocator<f64, U1, U1>
        + Allocator<f64, U1, D>
        + Allocator<f64, D, U1>
        + Allocator<f64, D>
        + Allocator<f64, U1>,
{
    let (dynamics, measurement) = if in_place {
        (
            StateFunction::in_place(d, |out: &mut VectorN<f64, D>, x: &VectorN<f64, D>, _: &(), _: &(), _: f64| {
                out.copy_from(&pendulum(x))
            }),
            StateFunction::in_place(U1, |out: &mut Vector1<f64>, x: &VectorN<f64, D>, _: &(), _: &(), _: f64| {
                out[0] = x[0].sin()
            }),
        )
    } else {
        (
            StateFunction::returning(d, |x: &VectorN<f64, D>, _: &(), _: &(), _: f64| pendulum(x)),
            StateFunction::returning(U1, |x: &VectorN<f64, D>, _: &(), _: &(), _: f64| sine_measurement(x)),
        )
    };

    ExtendedKalmanFilter::new(
        dynamics,
        measurement,
        NoiseModel::fixed(MatrixN::identity_generic(d, d) * 0.01),
        NoiseModel::fixed(na::Matrix1::new(0.05)),
        KalmanState {
            x: vector(d, &[0.5, 0.]),
            X: matrix(d, &[0.1, 0., 0., 0.1]),
        },
        (),
        FilterOptions {
            Ts: DT,
            ..FilterOptions::default()
        },
    )
    .unwrap()
}
