//! Altitude Filter Constants
//!
//! Fixed-point layout of the filter state and the reference noise model the
//! default parameters are derived from.

/// Fractional bits of filter velocity and acceleration (Q11.4).
///
/// Position is kept in whole meters; velocity and acceleration carry
/// four fractional bits.
pub const STATE_FRACTION_BITS: u32 = 4;

/// Scale factor of the fractional state components (`1 << STATE_FRACTION_BITS`).
pub const STATE_SCALE: i32 = 1 << STATE_FRACTION_BITS;

/// Input width of every filter divider (bits).
///
/// State values are 16-bit signed, so the magnitudes fed to the dividers
/// fit 16 unsigned bits.
pub const FILTER_DIVIDER_BITS: u32 = 16;

/// Reference sample rate of the barometer loop (Hz).
pub const REFERENCE_SAMPLE_RATE_HZ: u32 = 40;

/// Reference standard deviation of the random jerk driving acceleration (m/s³).
pub const REFERENCE_ACCEL_NOISE_STDDEV: f64 = 20.0;

/// Reference standard deviation of a barometric altitude measurement (m).
pub const REFERENCE_ALTITUDE_NOISE_STDDEV: f64 = 5.0;

/// Number of samples averaged into the ground altitude before tracking.
pub const CALIBRATION_SAMPLES: usize = 40;
