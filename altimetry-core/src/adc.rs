//! ADC Code to Pressure Conversion
//!
//! Digital barometers report a code linear in pressure between two
//! calibration points:
//!
//! ```text
//! P = Pmin + (code - Dmin) / ((Dmax - Dmin) / (Pmax - Pmin))
//! ```
//!
//! The slope is a per-part constant, so the division is a [`Divider`].

use crate::{
    constants::sensors::{
        GZP6816D_CODE_MAX, GZP6816D_CODE_MIN, GZP6816D_PRESSURE_MAX_PA,
        GZP6816D_PRESSURE_MIN_PA,
    },
    divider::Divider,
    errors::{AltimetryError, AltimetryResult},
};

/// Linear ADC transfer endpoints of a pressure sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorCalibration {
    /// Pressure at `code_min` (Pa)
    pub pressure_min: u32,
    /// Pressure at `code_max` (Pa)
    pub pressure_max: u32,
    /// Lowest calibrated code
    pub code_min: u32,
    /// Highest calibrated code
    pub code_max: u32,
}

impl SensorCalibration {
    /// GZP6816D, 24-bit output over 30-110 kPa
    pub const GZP6816D: Self = Self {
        pressure_min: GZP6816D_PRESSURE_MIN_PA,
        pressure_max: GZP6816D_PRESSURE_MAX_PA,
        code_min: GZP6816D_CODE_MIN,
        code_max: GZP6816D_CODE_MAX,
    };

    /// Check the endpoints describe an increasing line
    pub fn validate(&self) -> AltimetryResult<()> {
        if self.pressure_max <= self.pressure_min {
            return Err(AltimetryError::InvalidCalibration {
                reason: "pressure range is empty",
            });
        }
        if self.code_max <= self.code_min {
            return Err(AltimetryError::InvalidCalibration {
                reason: "code range is empty",
            });
        }
        Ok(())
    }

    /// ADC counts per Pascal
    pub fn counts_per_pascal(&self) -> f64 {
        (self.code_max - self.code_min) as f64 / (self.pressure_max - self.pressure_min) as f64
    }

    /// Whether `code` lies inside the calibrated span
    pub const fn contains(&self, code: u32) -> bool {
        code >= self.code_min && code <= self.code_max
    }
}

impl Default for SensorCalibration {
    fn default() -> Self {
        Self::GZP6816D
    }
}

/// Converts raw ADC codes to Pascals.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdcConverter {
    calibration: SensorCalibration,
    slope: Divider,
}

impl AdcConverter {
    /// Validate `calibration` and synthesize its slope divider
    pub fn new(calibration: SensorCalibration) -> AltimetryResult<Self> {
        calibration.validate()?;
        let slope = Divider::synthesize(calibration.counts_per_pascal(), 32)?;
        Ok(Self { calibration, slope })
    }

    /// Rebuild from generated parts
    pub const fn from_parts(calibration: SensorCalibration, slope: Divider) -> Self {
        Self { calibration, slope }
    }

    /// Calibration in use
    pub const fn calibration(&self) -> &SensorCalibration {
        &self.calibration
    }

    /// Slope divider
    pub const fn slope(&self) -> Divider {
        self.slope
    }

    /// Pressure in Pascals for `code`.
    ///
    /// Codes outside the calibrated span saturate to the nearest end of the
    /// pressure range.
    #[inline]
    pub fn pressure_from_adc(&self, code: u32) -> u32 {
        let calibration = &self.calibration;
        let code = code.max(calibration.code_min).min(calibration.code_max);
        let offset = self.slope.divide(code.saturating_sub(calibration.code_min) as u64);
        calibration.pressure_min.saturating_add(offset as u32)
    }

    /// Like [`pressure_from_adc`](Self::pressure_from_adc) but rejects codes
    /// outside the calibrated span.
    pub fn checked_pressure_from_adc(&self, code: u32) -> AltimetryResult<u32> {
        if !self.calibration.contains(code) {
            return Err(AltimetryError::AdcOutOfRange {
                code,
                min: self.calibration.code_min,
                max: self.calibration.code_max,
            });
        }
        Ok(self.pressure_from_adc(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> AdcConverter {
        AdcConverter::new(SensorCalibration::GZP6816D).unwrap()
    }

    #[test]
    fn test_endpoints() {
        let adc = converter();
        assert_eq!(adc.pressure_from_adc(GZP6816D_CODE_MIN), GZP6816D_PRESSURE_MIN_PA);
        let top = adc.pressure_from_adc(GZP6816D_CODE_MAX) as i64;
        assert!((top - GZP6816D_PRESSURE_MAX_PA as i64).abs() <= 1, "top={}", top);
    }

    #[test]
    fn test_affine_within_rounding() {
        let adc = converter();
        let cal = SensorCalibration::GZP6816D;
        let span_codes = (cal.code_max - cal.code_min) as u64;
        let span_pa = (cal.pressure_max - cal.pressure_min) as u64;
        for code in (cal.code_min..=cal.code_max).step_by(4_099) {
            let offset = (code - cal.code_min) as u64;
            let exact = cal.pressure_min as i64 + (offset * span_pa / span_codes) as i64;
            let actual = adc.pressure_from_adc(code) as i64;
            assert!((actual - exact).abs() <= 1, "code={} exact={} actual={}", code, exact, actual);
        }
    }

    #[test]
    fn test_below_range_saturates() {
        let adc = converter();
        assert_eq!(adc.pressure_from_adc(0), GZP6816D_PRESSURE_MIN_PA);
    }

    #[test]
    fn test_above_range_saturates() {
        let adc = converter();
        let top = adc.pressure_from_adc(GZP6816D_CODE_MAX);
        assert_eq!(adc.pressure_from_adc(GZP6816D_CODE_MAX + 1), top);
        assert_eq!(adc.pressure_from_adc(u32::MAX), top);
    }

    #[test]
    fn test_coarse_sensor_saturates() {
        // fewer than one count per pascal
        let coarse = SensorCalibration {
            pressure_min: 0,
            pressure_max: 100_000,
            code_min: 0,
            code_max: 1_000,
        };
        let adc = AdcConverter::new(coarse).unwrap();
        assert!(adc.slope().prescale() > 0);
        let mid = adc.pressure_from_adc(500) as i64;
        assert!((mid - 50_000).abs() <= 1, "mid={}", mid);
        let top = adc.pressure_from_adc(u32::MAX) as i64;
        assert!((top - 100_000).abs() <= 1, "top={}", top);
        assert_eq!(adc.pressure_from_adc(1_001), adc.pressure_from_adc(1_000));
    }

    #[test]
    fn test_checked_rejects_out_of_range() {
        let adc = converter();
        assert!(matches!(
            adc.checked_pressure_from_adc(GZP6816D_CODE_MAX + 1),
            Err(AltimetryError::AdcOutOfRange { .. })
        ));
        assert!(adc.checked_pressure_from_adc(GZP6816D_CODE_MIN - 1).is_err());
        assert!(adc.checked_pressure_from_adc(8_000_000).is_ok());
    }

    #[test]
    fn test_invalid_calibration() {
        let flat = SensorCalibration {
            pressure_max: 30_000,
            ..SensorCalibration::GZP6816D
        };
        assert!(matches!(
            AdcConverter::new(flat),
            Err(AltimetryError::InvalidCalibration { .. })
        ));
        let inverted = SensorCalibration {
            code_min: 20_000_000,
            ..SensorCalibration::GZP6816D
        };
        assert!(AdcConverter::new(inverted).is_err());
    }
}
