//! Common test utilities for altimetry integration tests
//!
//! This module provides:
//! - A deterministic xorshift generator for sensor noise
//! - Reference filter dividers for the 40 Hz tuning
//! - A boost/coast/descent flight profile and its pressure and ADC readings

#![allow(dead_code)]

use altimetry_core::{AtmosphereModel, Divider, FilterDividers, SensorCalibration};

/// Deterministic test RNG
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        // Xorshift algorithm
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    /// Uniform integer noise in `[-amplitude, amplitude]`
    pub fn noise(&mut self, amplitude: u32) -> i64 {
        ((self.next_u32() >> 8) % (2 * amplitude + 1)) as i64 - amplitude as i64
    }
}

/// Dividers for 40 Hz, σa = 20 m/s³, σz = 5 m
pub fn reference_dividers() -> FilterDividers {
    let divider = |c: f64| Divider::synthesize(1.0 / c, 16).unwrap();
    FilterDividers {
        position_from_velocity: divider(0.001_443_630_68),
        position_from_residual: divider(0.923_923_635_5),
        velocity_from_acceleration: divider(0.025),
        velocity_from_velocity: divider(0.997_203_327_8),
        velocity_from_residual: divider(1.933_337_105),
        acceleration_from_velocity: divider(0.002_219_870_19),
        acceleration_from_residual: divider(1.535_715_458),
    }
}

/// Altitude above the pad sampled at 40 Hz for one minute.
///
/// 2 s on the pad, 3 s boost at 50 m/s², coast at -10 m/s² to apogee
/// (1350 m), then descent under parachute at 20 m/s.
pub fn flight_profile() -> Vec<f64> {
    let ts = 1.0 / 40.0;
    let (mut height, mut velocity) = (0.0f64, 0.0f64);
    let mut profile = Vec::with_capacity(2400);
    for i in 0..2400 {
        let t = i as f64 * ts;
        let accel = if t < 2.0 {
            0.0
        } else if t < 5.0 {
            50.0
        } else if t < 20.0 || velocity > -20.0 {
            -10.0
        } else {
            velocity = -20.0;
            0.0
        };
        velocity += accel * ts;
        height += velocity * ts;
        if height < 0.0 {
            height = 0.0;
        }
        profile.push(height);
    }
    profile
}

/// Pressure (Pa) at `altitude` meters above the reference level
pub fn pressure_at(model: &AtmosphereModel, reference: f64, altitude: f64) -> f64 {
    reference * (1.0 - model.lapse_rate * altitude / model.temperature).powf(model.exponent)
}

/// Raw ADC code for `pressure`
pub fn code_for(calibration: &SensorCalibration, pressure: f64) -> u32 {
    (calibration.code_min as f64
        + (pressure - calibration.pressure_min as f64) * calibration.counts_per_pascal()) as u32
}
