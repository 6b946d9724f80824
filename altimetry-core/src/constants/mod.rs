//! Constants for Altimetry Core
//!
//! Centralized numeric constants used by the runtime converters and the
//! design-time generator. Each value documents its unit and source.
//!
//! ## Organization
//!
//! - **Atmosphere**: International Standard Atmosphere constants for the
//!   troposphere barometric formula
//! - **Sensors**: ADC transfer endpoints of supported pressure sensors
//! - **Filter**: Fixed-point layout and reference noise model of the altitude filter
//! - **Flight**: Phase detection thresholds and debounce windows

/// International Standard Atmosphere constants.
pub mod atmosphere;

/// Pressure sensor transfer functions.
pub mod sensors;

/// Altitude filter layout and reference tuning.
pub mod filter;

/// Flight phase detection defaults.
pub mod flight;

pub use atmosphere::{
    BAROMETRIC_EXPONENT, SEA_LEVEL_PRESSURE_PA, STANDARD_LAPSE_RATE_K_PER_M,
    STANDARD_TEMPERATURE_K,
};

pub use filter::{
    CALIBRATION_SAMPLES, FILTER_DIVIDER_BITS, REFERENCE_ACCEL_NOISE_STDDEV,
    REFERENCE_ALTITUDE_NOISE_STDDEV, REFERENCE_SAMPLE_RATE_HZ, STATE_FRACTION_BITS,
    STATE_SCALE,
};

pub use flight::{
    APOGEE_SAMPLES, BURNOUT_SAMPLES, LANDING_RATE_MPS, LANDING_SAMPLES, LIFTOFF_RATE_MPS,
    LIFTOFF_SAMPLES, MAIN_DEPLOY_ALTITUDE_M, MAIN_SAMPLES,
};
