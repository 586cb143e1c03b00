//! Extended Kalman filter estimators.

pub mod covariance;
pub mod extended;
pub mod kalman;
pub mod smoother;
