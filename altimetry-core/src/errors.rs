//! Error Types for the Runtime Altimetry Path
//!
//! ## Design Philosophy
//!
//! Errors here are raised in two places: while constructing the runtime
//! components (divider synthesis, calibration checks) and at the sample
//! boundary (a pressure or ADC code that cannot be converted).
//!
//! 1. **No Heap Allocation**: All error data is inline, only `&'static str`
//!    for messages, so errors can be returned from the sampling loop.
//!
//! 2. **Copy Semantics**: Errors implement `Copy` for cheap propagation with `?`.
//!
//! 3. **No Runtime Overflow Errors**: Fixed-point overflow inside the filter is
//!    a design-time defect. It is checked when parameters are generated and by
//!    debug assertions, never reported through this type.
//!
//! ## Error Categories
//!
//! ### Construction
//! - `InvalidDivisor`: Divider requested for a zero, negative or non-finite constant
//! - `UnsupportedWidth`: Divider width cannot hold the requested constant
//! - `InvalidCalibration`: ADC endpoints do not describe an increasing line
//! - `InvalidModel`: Atmosphere constants are not physical
//!
//! ### Sample Boundary
//! - `InvalidPressure`: Zero pressure reading
//! - `AdcOutOfRange`: ADC code outside the calibrated span
//!
//! ```rust
//! use altimetry_core::{AltimetryError, Divider};
//!
//! match Divider::synthesize(-3.0, 16) {
//!     Err(AltimetryError::InvalidDivisor { .. }) => {}
//!     _ => unreachable!(),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for runtime altimetry operations
pub type AltimetryResult<T> = Result<T, AltimetryError>;

/// Altimetry errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum AltimetryError {
    /// Divisor is zero, negative, NaN or infinite
    #[error("Invalid divisor {divisor}: must be finite and positive")]
    InvalidDivisor {
        /// The rejected divisor
        divisor: f64,
    },

    /// Requested width cannot represent the divider
    #[error("Unsupported divider width {bits} for divisor {divisor}")]
    UnsupportedWidth {
        /// Requested input width in bits
        bits: u32,
        /// Divisor the width was requested for
        divisor: f64,
    },

    /// Pressure reading is not usable
    #[error("Invalid pressure reading: {pressure} Pa")]
    InvalidPressure {
        /// The rejected reading
        pressure: u32,
    },

    /// ADC code outside the calibrated range
    #[error("ADC code {code} outside calibrated range [{min}, {max}]")]
    AdcOutOfRange {
        /// Raw ADC code
        code: u32,
        /// Lowest calibrated code
        min: u32,
        /// Highest calibrated code
        max: u32,
    },

    /// Sensor calibration endpoints are inconsistent
    #[error("Invalid sensor calibration: {reason}")]
    InvalidCalibration {
        /// Which endpoint check failed
        reason: &'static str,
    },

    /// Atmosphere model constants are not physical
    #[error("Invalid atmosphere model: {reason}")]
    InvalidModel {
        /// Which constant is out of range
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for AltimetryError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidDivisor { divisor } =>
                defmt::write!(fmt, "Invalid divisor {}", divisor),
            Self::UnsupportedWidth { bits, divisor } =>
                defmt::write!(fmt, "Width {} unsupported for divisor {}", bits, divisor),
            Self::InvalidPressure { pressure } =>
                defmt::write!(fmt, "Invalid pressure {} Pa", pressure),
            Self::AdcOutOfRange { code, min, max } =>
                defmt::write!(fmt, "ADC code {} outside [{}, {}]", code, min, max),
            Self::InvalidCalibration { reason } =>
                defmt::write!(fmt, "Invalid calibration: {}", reason),
            Self::InvalidModel { reason } =>
                defmt::write!(fmt, "Invalid model: {}", reason),
        }
    }
}
