//! Pressure Sensor Transfer Functions
//!
//! Digital pressure sensors report a raw code that is linear in pressure
//! between two calibrated endpoints.

/// GZP6816D lowest calibrated pressure (Pa).
///
/// Source: GZP6816D datasheet, 30-110 kPa absolute range
pub const GZP6816D_PRESSURE_MIN_PA: u32 = 30_000;

/// GZP6816D highest calibrated pressure (Pa).
///
/// Source: GZP6816D datasheet
pub const GZP6816D_PRESSURE_MAX_PA: u32 = 110_000;

/// GZP6816D code at the lowest calibrated pressure (10% of 2^24).
///
/// Source: GZP6816D datasheet, output transfer function
pub const GZP6816D_CODE_MIN: u32 = 1_677_722;

/// GZP6816D code at the highest calibrated pressure (90% of 2^24).
///
/// Source: GZP6816D datasheet, output transfer function
pub const GZP6816D_CODE_MAX: u32 = 15_099_494;
