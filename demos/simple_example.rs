//! Operation of an extended Kalman filter in a simple example.
//!
//! A pendulum with two states, angle and angular velocity, observed through the sine of its angle.

use na::{Matrix1, Matrix2, Vector1, Vector2, U1, U2};
use nalgebra as na;
use rand::{rngs::StdRng, SeedableRng};

use bayes_ekf::models::{KalmanState, LinearFilter};
use bayes_ekf::noise::NoiseModel;
use bayes_ekf::{ExtendedKalmanFilter, FilterOptions, StateFunction};

const DT: f64 = 0.05;

fn main() {
    // Non-linear prediction and observation models
    let dynamics = StateFunction::returning(U2, |x: &Vector2<f64>, _: &(), g: &f64, _: f64| {
        Vector2::new(x[0] + DT * x[1], x[1] - DT * g * x[0].sin())
    });
    let measurement = StateFunction::returning(U1, |x: &Vector2<f64>, _: &(), _: &f64, _: f64| {
        Vector1::new(x[0].sin())
    });

    // Initialy at 1 radian, at rest, with some uncertainty
    let prior = KalmanState {
        x: Vector2::new(1., 0.),
        X: Matrix2::new(0.1, 0., 0., 0.1),
    };
    let options = FilterOptions {
        Ts: DT,
        ..FilterOptions::default()
    };
    let mut ekf = ExtendedKalmanFilter::new(
        dynamics,
        measurement,
        NoiseModel::fixed(Matrix2::new(1e-4, 0., 0., 1e-3)),
        NoiseModel::fixed(Matrix1::new(0.01)),
        prior,
        9.81, // gravity as parameter
        options,
    )
    .unwrap();
    println!("Initial x{:.3} X{:.4}", ekf.mean(), ekf.covariance());

    // Simulate a trajectory of the system
    let mut rng = StdRng::seed_from_u64(1);
    let u = vec![(); 100];
    let (truth, y) = ekf.simulate(&u, true, &mut rng).unwrap();

    // Filter it
    let sol = ekf.forward_trajectory(&u, &y).unwrap();
    println!("Filtered x{:.3} truth{:.3}", sol.xt[99], truth[99]);
    println!("log-likelihood {:.2}", sol.ll);

    // And smooth it
    let smoothed = ekf.smooth(&sol, &u).unwrap();
    println!("Smoothed start x{:.3} truth{:.3}", smoothed.xT[0], truth[0]);
}
