//! Constant-acceleration state-space model
//!
//! State `x = [position, velocity, acceleration]`, sampled every `ts`:
//!
//! ```text
//! F = | 1  ts  ts²/2 |      G = | ts³/6 |      Q = G·Gᵀ·σa²
//!     | 0  1   ts    |          | ts²/2 |
//!     | 0  0   1     |          | ts    |
//!
//! H = [1 0 0]                R = σz²
//! ```
//!
//! Acceleration is driven by white jerk of variance `σa²`; only position is
//! measured, with variance `σz²`.

use altimetry_core::constants::filter::{
    REFERENCE_ACCEL_NOISE_STDDEV, REFERENCE_ALTITUDE_NOISE_STDDEV, REFERENCE_SAMPLE_RATE_HZ,
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{DesignError, DesignResult},
    matrix::{outer, scale, Matrix3, Vector3},
};

/// Filter tuning for one vehicle/flight-computer build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KalmanParams {
    /// Sample period (s)
    pub timestep: f64,
    /// Variance of the jerk driving acceleration, σa²
    pub accel_variance: f64,
    /// Variance of one altitude measurement, σz²
    pub altitude_variance: f64,
}

impl Default for KalmanParams {
    fn default() -> Self {
        Self {
            timestep: 1.0 / REFERENCE_SAMPLE_RATE_HZ as f64,
            accel_variance: REFERENCE_ACCEL_NOISE_STDDEV * REFERENCE_ACCEL_NOISE_STDDEV,
            altitude_variance: REFERENCE_ALTITUDE_NOISE_STDDEV * REFERENCE_ALTITUDE_NOISE_STDDEV,
        }
    }
}

impl KalmanParams {
    /// Set the sample period
    pub fn with_timestep(mut self, timestep: f64) -> Self {
        self.timestep = timestep;
        self
    }

    /// Set the jerk noise from its standard deviation
    pub fn with_accel_noise(mut self, stddev: f64) -> Self {
        self.accel_variance = stddev * stddev;
        self
    }

    /// Set the measurement noise from its standard deviation
    pub fn with_altitude_noise(mut self, stddev: f64) -> Self {
        self.altitude_variance = stddev * stddev;
        self
    }

    pub fn validate(&self) -> DesignResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.timestep) {
            return Err(DesignError::InvalidModel(format!(
                "timestep {} must be positive",
                self.timestep
            )));
        }
        if !self.accel_variance.is_finite() || self.accel_variance < 0.0 {
            return Err(DesignError::InvalidModel(format!(
                "acceleration variance {} must be non-negative",
                self.accel_variance
            )));
        }
        if !positive(self.altitude_variance) {
            return Err(DesignError::InvalidModel(format!(
                "altitude variance {} must be positive",
                self.altitude_variance
            )));
        }
        Ok(())
    }
}

/// Linear model `(F, H, Q, R)` with a scalar measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSpaceModel {
    /// State transition `F`
    pub transition: Matrix3,
    /// Measurement row `H`
    pub measurement: Vector3,
    /// Process noise covariance `Q`
    pub process_noise: Matrix3,
    /// Measurement noise variance `R`
    pub measurement_noise: f64,
}

impl StateSpaceModel {
    /// Position/velocity/acceleration model driven by white jerk
    pub fn constant_acceleration(params: &KalmanParams) -> DesignResult<Self> {
        params.validate()?;
        let ts = params.timestep;
        let transition = [
            [1.0, ts, ts * ts / 2.0],
            [0.0, 1.0, ts],
            [0.0, 0.0, 1.0],
        ];
        let coupling = [ts * ts * ts / 6.0, ts * ts / 2.0, ts];
        Ok(Self {
            transition,
            measurement: [1.0, 0.0, 0.0],
            process_noise: scale(&outer(&coupling, &coupling), params.accel_variance),
            measurement_noise: params.altitude_variance,
        })
    }

    /// Reject models the covariance recursion cannot handle
    pub fn validate(&self) -> DesignResult<()> {
        if !self.measurement_noise.is_finite() || self.measurement_noise <= 0.0 {
            return Err(DesignError::InvalidModel(format!(
                "measurement noise {} must be positive",
                self.measurement_noise
            )));
        }
        let finite = |m: &Matrix3| m.iter().flatten().all(|v| v.is_finite());
        if !finite(&self.transition)
            || !finite(&self.process_noise)
            || !self.measurement.iter().all(|v| v.is_finite())
        {
            return Err(DesignError::InvalidModel("non-finite model entry".into()));
        }
        if (0..3).any(|i| self.process_noise[i][i] < 0.0) {
            return Err(DesignError::InvalidModel(
                "process noise has a negative variance".into(),
            ));
        }
        Ok(())
    }
}
