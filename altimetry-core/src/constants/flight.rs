//! Flight Phase Detection Constants
//!
//! Debounce windows are in samples at the reference 40 Hz loop. Rates are
//! whole m/s and are compared against the Q11.4 filter velocity.

/// Consecutive samples above the liftoff rate before boost (0.5 s).
pub const LIFTOFF_SAMPLES: u16 = 20;

/// Consecutive climbing, decelerating samples before coast (0.5 s).
pub const BURNOUT_SAMPLES: u16 = 20;

/// Consecutive descending samples before apogee is declared (1 s).
pub const APOGEE_SAMPLES: u16 = 40;

/// Consecutive samples below the main deploy altitude (1 s).
pub const MAIN_SAMPLES: u16 = 40;

/// Consecutive near-still samples before landing (5 s).
pub const LANDING_SAMPLES: u16 = 200;

/// Vertical speed that counts as liftoff (m/s).
pub const LIFTOFF_RATE_MPS: u16 = 10;

/// Vertical speed below which the vehicle counts as landed (m/s).
pub const LANDING_RATE_MPS: u16 = 1;

/// Main parachute deploy altitude above the pad (m).
pub const MAIN_DEPLOY_ALTITUDE_M: u16 = 150;
