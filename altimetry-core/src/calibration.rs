//! Ground Altitude Calibration
//!
//! Before launch the barometric altitude of the pad is averaged over a fixed
//! number of samples. Afterwards the filter is fed altitudes relative to
//! that ground level, keeping values small enough for the 16-bit state.

use crate::constants::filter::CALIBRATION_SAMPLES;

/// Averages the first `N` altitude samples into a ground level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroundCalibrator<const N: usize = CALIBRATION_SAMPLES> {
    sum: i64,
    count: usize,
    ground: Option<i32>,
}

impl<const N: usize> GroundCalibrator<N> {
    /// Create an empty calibrator
    pub const fn new() -> Self {
        Self {
            sum: 0,
            count: 0,
            ground: None,
        }
    }

    /// Accumulate one absolute altitude.
    ///
    /// Returns the ground altitude once `N` samples have been seen; samples
    /// after that are ignored.
    pub fn push(&mut self, altitude: i32) -> Option<i32> {
        if self.ground.is_none() {
            self.sum += altitude as i64;
            self.count += 1;
            if self.count >= N {
                let ground = (self.sum / N.max(1) as i64) as i32;
                log_debug!("ground altitude {} m from {} samples", ground, N);
                self.ground = Some(ground);
            }
        }
        self.ground
    }

    /// Ground altitude, once calibrated
    pub const fn ground(&self) -> Option<i32> {
        self.ground
    }

    /// Whether calibration has finished
    pub const fn is_complete(&self) -> bool {
        self.ground.is_some()
    }

    /// Samples still needed
    pub const fn remaining(&self) -> usize {
        N.saturating_sub(self.count)
    }

    /// Altitude relative to ground, once calibrated
    pub fn relative(&self, altitude: i32) -> Option<i32> {
        self.ground.map(|ground| altitude - ground)
    }

    /// Discard all samples
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl<const N: usize> Default for GroundCalibrator<N> {
    fn default() -> Self {
        Self::new()
    }
}
