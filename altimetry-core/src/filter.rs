//! Fixed-Coefficient Altitude Filter
//!
//! ## Overview
//!
//! A three-state (position, velocity, acceleration) Kalman filter with a
//! constant timestep and constant noise converges to a steady-state
//! covariance, and with it a constant gain. Folding the prediction and the
//! update into one step leaves a fixed linear map from the previous state
//! and the new measurement to the next state:
//!
//! ```text
//! e   = x0 - zk
//! x0' = zk + c01·x1 + c00·e
//! x1' = c12·x2 + c11·x1 - c10·e
//! x2' = x2 - c21·x1 - c20·e
//! ```
//!
//! Each `c` is a positive build-time constant, applied as a [`Divider`] by
//! `1/c`, so one step costs exactly seven multiply-shift operations.
//!
//! ## State Layout
//!
//! ```text
//! position       i16   whole meters
//! velocity       i16   Q11.4, m/s · 16
//! acceleration   i16   Q11.4, m/s² · 16
//! ```
//!
//! Coefficients touching velocity or acceleration carry the factor of 16,
//! see `altimetry_design::coefficients`.
//!
//! ## Overflow
//!
//! The runtime has no overflow path. Parameters are only accepted after the
//! recursion has been run over a representative flight trace in wide
//! arithmetic without leaving `i16`. Debug builds additionally assert every
//! intermediate value.

#[cfg(feature = "fixed")]
use fixed::types::I12F4;

use crate::{constants::filter::STATE_SCALE, divider::Divider};

/// Position, velocity and acceleration estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterState {
    /// Altitude (m)
    pub position: i16,
    /// Vertical velocity (m/s, Q11.4)
    pub velocity: i16,
    /// Vertical acceleration (m/s², Q11.4)
    pub acceleration: i16,
}

impl FilterState {
    /// Filter start state
    pub const ZERO: Self = Self {
        position: 0,
        velocity: 0,
        acceleration: 0,
    };

    /// Velocity in m/s
    pub fn velocity_mps(&self) -> f32 {
        self.velocity as f32 / STATE_SCALE as f32
    }

    /// Acceleration in m/s²
    pub fn acceleration_mps2(&self) -> f32 {
        self.acceleration as f32 / STATE_SCALE as f32
    }

    /// Velocity as a fixed-point number
    #[cfg(feature = "fixed")]
    pub fn velocity_fixed(&self) -> I12F4 {
        I12F4::from_bits(self.velocity)
    }

    /// Acceleration as a fixed-point number
    #[cfg(feature = "fixed")]
    pub fn acceleration_fixed(&self) -> I12F4 {
        I12F4::from_bits(self.acceleration)
    }

    /// Widen to `[position, velocity, acceleration]`
    pub const fn to_wide(&self) -> [i32; 3] {
        [
            self.position as i32,
            self.velocity as i32,
            self.acceleration as i32,
        ]
    }

    /// Narrow from wide values, wrapping like the target's 16-bit registers
    pub const fn from_wide(wide: [i32; 3]) -> Self {
        Self {
            position: wide[0] as i16,
            velocity: wide[1] as i16,
            acceleration: wide[2] as i16,
        }
    }
}

/// The seven constant multiplications of one filter step.
///
/// "residual" is `position - measurement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterDividers {
    /// Weight of previous velocity in position
    pub position_from_velocity: Divider,
    /// Weight of the residual in position
    pub position_from_residual: Divider,
    /// Weight of previous acceleration in velocity (timestep)
    pub velocity_from_acceleration: Divider,
    /// Weight of previous velocity in velocity
    pub velocity_from_velocity: Divider,
    /// Weight of the residual in velocity
    pub velocity_from_residual: Divider,
    /// Weight of previous velocity in acceleration
    pub acceleration_from_velocity: Divider,
    /// Weight of the residual in acceleration
    pub acceleration_from_residual: Divider,
}

impl FilterDividers {
    /// All seven dividers in step order
    pub const fn as_array(&self) -> [Divider; 7] {
        [
            self.position_from_velocity,
            self.position_from_residual,
            self.velocity_from_acceleration,
            self.velocity_from_velocity,
            self.velocity_from_residual,
            self.acceleration_from_velocity,
            self.acceleration_from_residual,
        ]
    }
}

/// One step computed without narrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WideStep {
    /// `position - measurement` before the update
    pub residual: i32,
    /// Next `[position, velocity, acceleration]`
    pub next: [i32; 3],
}

impl WideStep {
    /// Largest magnitude among the residual and the next state
    pub fn peak(&self) -> i32 {
        self.next
            .iter()
            .fold(self.residual.abs(), |peak, value| peak.max(value.abs()))
    }

    /// Whether every value fits the 16-bit state registers
    pub fn fits_i16(&self) -> bool {
        let fits = |v: i32| v >= i16::MIN as i32 && v <= i16::MAX as i32;
        fits(self.residual) && self.next.iter().all(|&v| fits(v))
    }
}

/// One filter step in 32-bit arithmetic.
///
/// Used by the runtime step and by design-time overflow verification.
#[inline]
pub fn filter_step_wide(dividers: &FilterDividers, state: [i32; 3], measurement: i32) -> WideStep {
    let [position, velocity, acceleration] = state;
    let residual = position - measurement;
    let (velocity, acceleration, e) = (velocity as i64, acceleration as i64, residual as i64);

    let position = measurement as i64
        + dividers.position_from_velocity.divide_signed(velocity)
        + dividers.position_from_residual.divide_signed(e);
    let next_velocity = dividers.velocity_from_acceleration.divide_signed(acceleration)
        + dividers.velocity_from_velocity.divide_signed(velocity)
        - dividers.velocity_from_residual.divide_signed(e);
    let next_acceleration = acceleration
        - dividers.acceleration_from_velocity.divide_signed(velocity)
        - dividers.acceleration_from_residual.divide_signed(e);

    WideStep {
        residual,
        next: [position as i32, next_velocity as i32, next_acceleration as i32],
    }
}

/// Advance `state` by one measurement (whole meters).
#[inline]
pub fn filter_step(dividers: &FilterDividers, state: FilterState, measurement: i16) -> FilterState {
    let step = filter_step_wide(dividers, state.to_wide(), measurement as i32);
    debug_assert!(
        step.fits_i16(),
        "filter overflow: residual={} next={:?}",
        step.residual,
        step.next
    );
    FilterState::from_wide(step.next)
}

/// Runtime altitude filter owning its state.
#[derive(Debug, Clone)]
pub struct AltitudeFilter {
    dividers: FilterDividers,
    state: FilterState,
}

impl AltitudeFilter {
    /// Create a filter at rest
    pub const fn new(dividers: FilterDividers) -> Self {
        Self {
            dividers,
            state: FilterState::ZERO,
        }
    }

    /// Feed one altitude measurement and return the new estimate
    #[inline]
    pub fn step(&mut self, measurement: i16) -> FilterState {
        self.state = filter_step(&self.dividers, self.state, measurement);
        self.state
    }

    /// Current estimate
    pub const fn state(&self) -> FilterState {
        self.state
    }

    /// Dividers in use
    pub const fn dividers(&self) -> &FilterDividers {
        &self.dividers
    }

    /// Return to the zero state
    pub fn reset(&mut self) {
        self.state = FilterState::ZERO;
    }
}
