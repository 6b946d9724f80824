//! Fixed-point barometric altimetry for FPU-less flight computers
//!
//! Converts raw barometer readings into a filtered altitude, velocity and
//! acceleration estimate using only integer multiplies and shifts, and
//! tracks the flight phase from that estimate.
//!
//! Key constraints:
//! - 16-bit target, no hardware divider, no FPU
//! - No heap allocation, bounded work per sample
//! - Every division is by a constant fixed when parameters are generated
//!
//! Parameters (divider magic numbers, series term counts, filter
//! coefficients) are derived offline by `altimetry-design` and embedded
//! with the `const` constructors of this crate.
//!
//! ```rust
//! use altimetry_core::{generated, AltitudeFilter};
//!
//! let mut filter = AltitudeFilter::new(generated::FILTER_DIVIDERS);
//!
//! // Sampling loop
//! let pressure = generated::ADC.pressure_from_adc(12_000_000);
//! let altitude = generated::BAROMETRIC.altitude(pressure)?;
//! let estimate = filter.step(altitude as i16);
//! # let _ = estimate;
//! # Ok::<(), altimetry_core::AltimetryError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod adc;
pub mod altimeter;
pub mod barometric;
pub mod calibration;
pub mod constants;
pub mod divider;
pub mod errors;
pub mod filter;
pub mod flight;
/// Reference parameters: standard atmosphere, GZP6816D, 40 Hz filter
#[rustfmt::skip]
pub mod generated;
pub mod series;

// Public API
pub use adc::{AdcConverter, SensorCalibration};
pub use altimeter::{Altimeter, AltimeterOutput};
pub use barometric::{AtmosphereModel, BarometricConverter};
pub use calibration::GroundCalibrator;
pub use divider::Divider;
pub use errors::{AltimetryError, AltimetryResult};
pub use filter::{filter_step, filter_step_wide, AltitudeFilter, FilterDividers, FilterState, WideStep};
pub use flight::{FlightDetector, FlightPhase, FlightThresholds};
pub use series::{exp_approx, ln_approx, SeriesSpec};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
