//! Atmosphere Constants
//!
//! Troposphere layer (0-11 km) of the International Standard Atmosphere.
//! The barometric formula for a layer with constant lapse rate is
//!
//! ```text
//! h = Tb / Lb · (1 - (P / Pb)^(1/K)),   K = g·M / (R·Lb)
//! ```

/// Standard temperature at the base of the troposphere (K).
///
/// Source: ISO 2533:1975, International Standard Atmosphere
pub const STANDARD_TEMPERATURE_K: f64 = 288.15;

/// Standard temperature lapse rate in the troposphere (K/m).
///
/// Temperature drops by 6.5 K per kilometer up to the tropopause.
///
/// Source: ISO 2533:1975
pub const STANDARD_LAPSE_RATE_K_PER_M: f64 = 0.0065;

/// Barometric exponent `K = g·M / (R·Lb)` (dimensionless).
///
/// With g = 9.80665 m/s², M = 0.0289644 kg/mol, R = 8.3144598 J/(mol·K)
/// and Lb = 0.0065 K/m.
///
/// Source: U.S. Standard Atmosphere 1976
pub const BAROMETRIC_EXPONENT: f64 = 5.25588;

/// Standard sea-level pressure (Pa).
///
/// Default reference pressure for the altitude conversion.
///
/// Source: ISO 2533:1975
pub const SEA_LEVEL_PRESSURE_PA: u32 = 101_325;
