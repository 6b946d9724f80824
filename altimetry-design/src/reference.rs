//! Floating-point steady-state Kalman filter
//!
//! Ground truth for the fixed-point recursion: constant gain, full `F`
//! prediction, no covariance propagation at run time.

use crate::{
    errors::DesignResult,
    matrix::{matvec, Matrix3, Vector3},
    model::StateSpaceModel,
    steady_state::{covariance_step, SteadyCovariance},
};

/// Constant-gain Kalman filter in `f64`.
#[derive(Debug, Clone)]
pub struct SteadyStateKalman {
    transition: Matrix3,
    measurement: Vector3,
    gain: Vector3,
    state: Vector3,
}

impl SteadyStateKalman {
    /// Gain from the predicted covariance `F·P·Fᵀ + Q` of the steady posterior
    pub fn new(model: &StateSpaceModel, covariance: &SteadyCovariance) -> DesignResult<Self> {
        model.validate()?;
        let step = covariance_step(model, &covariance.to_matrix());
        Ok(Self {
            transition: model.transition,
            measurement: model.measurement,
            gain: step.gain,
            state: [0.0; 3],
        })
    }

    pub fn gain(&self) -> Vector3 {
        self.gain
    }

    /// Current `[position, velocity, acceleration]`
    pub fn state(&self) -> Vector3 {
        self.state
    }

    /// Predict, then correct with `measurement`
    pub fn step(&mut self, measurement: f64) -> Vector3 {
        let predicted = matvec(&self.transition, &self.state);
        let expected: f64 = (0..3).map(|i| self.measurement[i] * predicted[i]).sum();
        let innovation = measurement - expected;
        for i in 0..3 {
            self.state[i] = predicted[i] + self.gain[i] * innovation;
        }
        self.state
    }

    pub fn reset(&mut self) {
        self.state = [0.0; 3];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::KalmanParams,
        steady_state::{solve_steady_state_covariance, DEFAULT_THRESHOLD},
    };
    use approx::assert_relative_eq;

    fn reference() -> SteadyStateKalman {
        let model = StateSpaceModel::constant_acceleration(&KalmanParams::default()).unwrap();
        let p = solve_steady_state_covariance(&model, DEFAULT_THRESHOLD).unwrap();
        SteadyStateKalman::new(&model, &p).unwrap()
    }

    #[test]
    fn test_converges_to_constant() {
        let mut kf = reference();
        for _ in 0..2000 {
            kf.step(250.0);
        }
        let [position, velocity, acceleration] = kf.state();
        assert_relative_eq!(position, 250.0, epsilon = 1e-6);
        assert_relative_eq!(velocity, 0.0, epsilon = 1e-6);
        assert_relative_eq!(acceleration, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tracks_ramp_velocity() {
        let mut kf = reference();
        let ts = 0.025;
        for i in 0..4000 {
            kf.step(30.0 * i as f64 * ts);
        }
        assert_relative_eq!(kf.state()[1], 30.0, epsilon = 1e-3);
    }

    #[test]
    fn test_reset() {
        let mut kf = reference();
        kf.step(10.0);
        kf.reset();
        assert_eq!(kf.state(), [0.0; 3]);
    }
}
