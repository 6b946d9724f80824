//! Filter coefficient derivation
//!
//! Collapses the steady-state Kalman predict/update into seven constant
//! multipliers. Velocity and acceleration run in sixteenths on the target,
//! which is where the `16` factors come from.

use altimetry_core::{
    constants::filter::{FILTER_DIVIDER_BITS, STATE_SCALE},
    Divider, FilterDividers,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{DesignError, DesignResult},
    model::KalmanParams,
    steady_state::SteadyCovariance,
};

/// Coefficients of the reduced filter recursion.
///
/// With `e = position - zk`:
///
/// ```text
/// position'     = zk + x0_x1·velocity + x0_x0zk·e
/// velocity'     = x1_x2·acceleration + x1_x1·velocity - x1_x0zk·e
/// acceleration' = acceleration - x2_x1·velocity - x2_x0zk·e
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterCoefficients {
    pub x0_x1: f64,
    pub x0_x0zk: f64,
    pub x1_x2: f64,
    pub x1_x1: f64,
    pub x1_x0zk: f64,
    pub x2_x1: f64,
    pub x2_x0zk: f64,
}

impl FilterCoefficients {
    /// Derive from the steady-state posterior covariance
    pub fn derive(params: &KalmanParams, covariance: &SteadyCovariance) -> DesignResult<Self> {
        params.validate()?;
        let ts = params.timestep;
        let sz2 = params.altitude_variance;
        let scale = STATE_SCALE as f64;

        let p00 = covariance.get(0, 0);
        let p01 = covariance.get(0, 1);
        let p02 = covariance.get(0, 2);
        let p11 = covariance.get(1, 1);
        let p12 = covariance.get(1, 2);

        let inv = 1.0 / (2.0 * p01 * ts + p00 + sz2);
        let smoothing = inv * sz2;

        let coefficients = Self {
            x0_x1: ts / scale * smoothing,
            x0_x0zk: smoothing,
            x1_x2: ts,
            x1_x1: 1.0 - p01 * ts * inv,
            x1_x0zk: ((p11 + p02) * ts + p01) * scale * inv,
            x2_x1: p02 * ts * inv,
            x2_x0zk: (p12 * ts + p02) * scale * inv,
        };

        for (name, value) in coefficients.named() {
            if !value.is_finite() || value <= 0.0 {
                return Err(DesignError::InvalidCoefficient { name, value });
            }
            debug!("{} = {:.10}", name, value);
        }
        Ok(coefficients)
    }

    /// Coefficients in runtime application order
    pub fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("x0_x1", self.x0_x1),
            ("x0_x0zk", self.x0_x0zk),
            ("x1_x2", self.x1_x2),
            ("x1_x1", self.x1_x1),
            ("x1_x0zk", self.x1_x0zk),
            ("x2_x1", self.x2_x1),
            ("x2_x0zk", self.x2_x0zk),
        ]
    }

    /// Synthesize a 16-bit divider by `1/c` for every coefficient
    pub fn dividers(&self) -> DesignResult<FilterDividers> {
        let divider = |name: &'static str, c: f64| -> DesignResult<Divider> {
            let divider = Divider::synthesize(1.0 / c, FILTER_DIVIDER_BITS)?;
            let effective = 1.0 / divider.divisor_estimate();
            if ((effective - c) / c).abs() > 1e-3 {
                warn!(
                    "{} realised as {:.10}, requested {:.10}",
                    name, effective, c
                );
            }
            Ok(divider)
        };

        Ok(FilterDividers {
            position_from_velocity: divider("x0_x1", self.x0_x1)?,
            position_from_residual: divider("x0_x0zk", self.x0_x0zk)?,
            velocity_from_acceleration: divider("x1_x2", self.x1_x2)?,
            velocity_from_velocity: divider("x1_x1", self.x1_x1)?,
            velocity_from_residual: divider("x1_x0zk", self.x1_x0zk)?,
            acceleration_from_velocity: divider("x2_x1", self.x2_x1)?,
            acceleration_from_residual: divider("x2_x0zk", self.x2_x0zk)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::StateSpaceModel, steady_state::solve_steady_state_covariance};
    use approx::assert_relative_eq;

    fn reference() -> FilterCoefficients {
        let params = KalmanParams::default();
        let model = StateSpaceModel::constant_acceleration(&params).unwrap();
        let p = solve_steady_state_covariance(&model, 1.0 / 65536.0).unwrap();
        FilterCoefficients::derive(&params, &p).unwrap()
    }

    #[test]
    fn test_reference_coefficients() {
        let c = reference();
        let expected = [
            0.001_443_630_680_5,
            0.923_923_635_5,
            0.025,
            0.997_203_327_8,
            1.933_337_105,
            0.002_219_870_19,
            1.535_715_458,
        ];
        for ((name, actual), expected) in c.named().iter().zip(expected.iter()) {
            assert!(
                ((actual - expected) / expected).abs() < 1e-3,
                "{}: {} vs {}",
                name,
                actual,
                expected
            );
        }
        assert_relative_eq!(c.x1_x2, 0.025);
    }

    #[test]
    fn test_reference_dividers() {
        let d = reference().dividers().unwrap();
        assert_eq!(
            d.velocity_from_acceleration,
            Divider::from_parts(39322, 6, 0, 16)
        );

        let close = |d: Divider, multiplier: u64, shift: u32, prescale: u32| {
            assert_eq!((d.shift(), d.prescale()), (shift, prescale), "{:?}", d);
            assert!(d.multiplier().abs_diff(multiplier) <= 2, "{:?}", d);
        };
        close(d.position_from_velocity, 31345, 10, 0);
        close(d.position_from_residual, 55565, 1, 0);
        close(d.velocity_from_velocity, 65170, 1, 0);
        close(d.velocity_from_residual, 122_335, 1, 1);
        close(d.acceleration_from_velocity, 8951, 9, 0);
        close(d.acceleration_from_residual, 70218, 1, 1);
    }

    #[test]
    fn test_rejects_negative_coefficient() {
        let params = KalmanParams::default();
        // negative innovation variance
        let p = SteadyCovariance([1.0, -1000.0, 1.0, 1.0, 1.0, 1.0]);
        assert!(matches!(
            FilterCoefficients::derive(&params, &p),
            Err(DesignError::InvalidCoefficient { .. })
        ));
    }
}
