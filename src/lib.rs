///
/// Bayes+Estimate extended Kalman filter and smoother.
/// Copyright (c) 2020 Michael Stevens
///
/// An extended Kalman filter (EKF) estimates the state of a system whose dynamics and measurements are non-linear but differentiable.
/// The belief about the state is a Gaussian, a mean and a covariance. At each step the non-linear functions are linearised at the
/// current mean and the linear Kalman predict and observe are applied to the covariance.
///
/// The library provides the filter, a Rauch-Tung-Striebel smoother over the record of a forward pass, and sampling utilities to
/// simulate the system. Jacobians are either supplied or derived by a pluggable differentiation backend.
/// Innovation covariances are factorised with a Cholesky decomposition, which both detects numerical failure before the belief is
/// modified and gives the log-likelihood of each observation.
///
/// Prediction and observation models are represented by a hierarchy of traits that define the estimation operations for different models.
/// State represention are definied by structs.
//
/// # Licensing
///
/// All Bayes++ source code files are copyright with the license conditions as given here. The copyright notice is that of the MIT license.
///  This in no way restricts any commercial use you may wish to make using our source code.
///  As long as you respect the copyright and license conditions, Michael Stevens is happy to for you to use it in any way you wish.
///
/// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction,
/// including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software,
/// and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
///
/// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
///
/// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
/// FITNESS FOR A PARTICULAR PURPOSE AND NON INFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY,
/// WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

pub mod models;
pub mod noise;
pub mod error;
pub mod functions;
pub mod jacobian;
pub mod options;
pub mod estimators;
pub mod trajectory;
pub mod linalg;
pub mod matrix;

pub use error::EstimateError;
pub use estimators::extended::ExtendedKalmanFilter;
pub use estimators::kalman::KalmanFilter;
pub use estimators::smoother::SmoothedTrajectory;
pub use functions::StateFunction;
pub use jacobian::{CentralDifference, Differentiator, ForwardDifference, Linearization};
pub use models::{KalmanState, LinearFilter};
pub use noise::{CorrelatedNoise, NoiseModel};
pub use options::FilterOptions;
pub use trajectory::ForwardTrajectory;
