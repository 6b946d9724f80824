//! Flight Phase Detection
//!
//! ## State Machine
//!
//! ```text
//! Ready ──v > liftoff──► Boost ──v > 0, a < 0──► Coast ──v < 0──► Descent
//!                                                                   │
//!                                                          h < main altitude
//!                                                                   ▼
//!                                  Landed ◄──|v| < landing rate── Main
//! ```
//!
//! Each transition fires only after its condition has held for a number of
//! consecutive samples. A single sample that breaks the condition restarts
//! the window, so one noisy estimate never advances the phase.
//!
//! The detector reads the filter estimate directly: position in meters,
//! velocity and acceleration in Q11.4.

use crate::{
    constants::{
        filter::STATE_SCALE,
        flight::{
            APOGEE_SAMPLES, BURNOUT_SAMPLES, LANDING_RATE_MPS, LANDING_SAMPLES,
            LIFTOFF_RATE_MPS, LIFTOFF_SAMPLES, MAIN_DEPLOY_ALTITUDE_M, MAIN_SAMPLES,
        },
    },
    filter::FilterState,
};

/// Phase of flight, in the only order phases can occur.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlightPhase {
    /// On the pad, waiting for liftoff
    #[default]
    Ready,
    /// Motor burning
    Boost,
    /// Climbing unpowered
    Coast,
    /// Past apogee, under drogue
    Descent,
    /// Below the main deploy altitude
    Main,
    /// At rest on the ground
    Landed,
}

/// Detection thresholds and debounce windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlightThresholds {
    /// Vertical speed that starts boost (m/s)
    pub liftoff_rate: u16,
    /// Vertical speed under which the vehicle is at rest (m/s)
    pub landing_rate: u16,
    /// Altitude above the pad that starts the main phase (m)
    pub main_altitude: u16,
    /// Samples before Ready → Boost
    pub liftoff_samples: u16,
    /// Samples before Boost → Coast
    pub burnout_samples: u16,
    /// Samples before Coast → Descent
    pub apogee_samples: u16,
    /// Samples before Descent → Main
    pub main_samples: u16,
    /// Samples before Main → Landed
    pub landing_samples: u16,
}

impl FlightThresholds {
    /// Defaults for the 40 Hz loop
    pub const REFERENCE: Self = Self {
        liftoff_rate: LIFTOFF_RATE_MPS,
        landing_rate: LANDING_RATE_MPS,
        main_altitude: MAIN_DEPLOY_ALTITUDE_M,
        liftoff_samples: LIFTOFF_SAMPLES,
        burnout_samples: BURNOUT_SAMPLES,
        apogee_samples: APOGEE_SAMPLES,
        main_samples: MAIN_SAMPLES,
        landing_samples: LANDING_SAMPLES,
    };

    /// Debounce window guarding the exit from `phase`
    pub const fn window(&self, phase: FlightPhase) -> u16 {
        match phase {
            FlightPhase::Ready => self.liftoff_samples,
            FlightPhase::Boost => self.burnout_samples,
            FlightPhase::Coast => self.apogee_samples,
            FlightPhase::Descent => self.main_samples,
            FlightPhase::Main => self.landing_samples,
            FlightPhase::Landed => 0,
        }
    }

    /// Whether `state` satisfies the exit condition of `phase`
    pub fn exit_condition(&self, phase: FlightPhase, state: &FilterState) -> bool {
        let velocity = state.velocity as i32;
        let acceleration = state.acceleration as i32;
        match phase {
            FlightPhase::Ready => velocity > self.liftoff_rate as i32 * STATE_SCALE,
            FlightPhase::Boost => velocity > 0 && acceleration < 0,
            FlightPhase::Coast => velocity < 0,
            FlightPhase::Descent => (state.position as i32) < self.main_altitude as i32,
            FlightPhase::Main => velocity.abs() < self.landing_rate as i32 * STATE_SCALE,
            FlightPhase::Landed => false,
        }
    }
}

impl Default for FlightThresholds {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Debounced flight phase tracker fed once per filter step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightDetector {
    thresholds: FlightThresholds,
    phase: FlightPhase,
    remaining: u16,
}

impl FlightDetector {
    /// Start in [`FlightPhase::Ready`]
    pub const fn new(thresholds: FlightThresholds) -> Self {
        Self {
            thresholds,
            phase: FlightPhase::Ready,
            remaining: thresholds.liftoff_samples,
        }
    }

    /// Advance with one filter estimate and return the current phase
    pub fn update(&mut self, state: &FilterState) -> FlightPhase {
        if self.phase == FlightPhase::Landed {
            return self.phase;
        }
        if !self.thresholds.exit_condition(self.phase, state) {
            self.remaining = self.thresholds.window(self.phase);
            return self.phase;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            let next = match self.phase {
                FlightPhase::Ready => FlightPhase::Boost,
                FlightPhase::Boost => FlightPhase::Coast,
                FlightPhase::Coast => FlightPhase::Descent,
                FlightPhase::Descent => FlightPhase::Main,
                FlightPhase::Main | FlightPhase::Landed => FlightPhase::Landed,
            };
            log_debug!("flight phase {:?} -> {:?} at {:?}", self.phase, next, state);
            self.phase = next;
            self.remaining = self.thresholds.window(next);
        }
        self.phase
    }

    /// Current phase
    pub const fn phase(&self) -> FlightPhase {
        self.phase
    }

    /// Samples the current exit condition still has to hold
    pub const fn remaining(&self) -> u16 {
        self.remaining
    }

    /// Thresholds in use
    pub const fn thresholds(&self) -> &FlightThresholds {
        &self.thresholds
    }

    /// Back to the pad
    pub fn reset(&mut self) {
        *self = Self::new(self.thresholds);
    }
}

impl Default for FlightDetector {
    fn default() -> Self {
        Self::new(FlightThresholds::REFERENCE)
    }
}
