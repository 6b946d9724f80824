//! Barometric Pressure to Altitude Conversion
//!
//! ## Formula
//!
//! Within a layer of constant temperature lapse rate:
//!
//! ```text
//! h = Tb / Lb · (1 - exp(ln(P / Pb) / K))
//! ```
//!
//! ## Fixed-Point Evaluation
//!
//! ```text
//! ratio  = (P << 32) / Pb                 divider, Q0.32
//! l      = -ln(ratio)                     ln series, Q32.32
//! l / K                                   divider, Q0.32
//! q      = exp(-l / K)                    exp series, Q0.32
//! h      = (1 - q) / (2^32 · Lb / Tb)     divider, whole meters
//! ```
//!
//! Only the reference pressure, `K` and `Lb / Tb` are divided by, and all
//! three are fixed when the converter is built, so the sample path is
//! multiplies, shifts and the small-integer divisions inside the series.
//!
//! Accuracy depends on [`SeriesSpec`]: with [`SeriesSpec::REFERENCE`] the
//! error stays under 3 m from 30 kPa to 100 kPa against 101325 Pa.

use crate::{
    constants::atmosphere::{
        BAROMETRIC_EXPONENT, SEA_LEVEL_PRESSURE_PA, STANDARD_LAPSE_RATE_K_PER_M,
        STANDARD_TEMPERATURE_K,
    },
    divider::Divider,
    errors::{AltimetryError, AltimetryResult},
    series::{exp_approx, ln_approx, SeriesSpec},
};

/// Atmosphere layer constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtmosphereModel {
    /// Base temperature `Tb` (K)
    pub temperature: f64,
    /// Temperature lapse rate `Lb` (K/m)
    pub lapse_rate: f64,
    /// Barometric exponent `K`
    pub exponent: f64,
}

impl AtmosphereModel {
    /// ISA troposphere
    pub const STANDARD: Self = Self {
        temperature: STANDARD_TEMPERATURE_K,
        lapse_rate: STANDARD_LAPSE_RATE_K_PER_M,
        exponent: BAROMETRIC_EXPONENT,
    };

    /// Check every constant is finite and positive
    pub fn validate(&self) -> AltimetryResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.temperature) {
            return Err(AltimetryError::InvalidModel { reason: "temperature must be positive" });
        }
        if !positive(self.lapse_rate) {
            return Err(AltimetryError::InvalidModel { reason: "lapse rate must be positive" });
        }
        if !positive(self.exponent) {
            return Err(AltimetryError::InvalidModel { reason: "exponent must be positive" });
        }
        Ok(())
    }

    /// Altitude in meters from the exact formula in `f64`.
    ///
    /// Ground truth for the fixed-point converter.
    pub fn altitude_exact(&self, pressure: f64, reference: f64) -> f64 {
        self.temperature / self.lapse_rate
            * (1.0 - libm::pow(pressure / reference, 1.0 / self.exponent))
    }

    /// Divisor turning a Q0.32 value of `1 - q` into meters, `2^32 · Lb / Tb`
    pub fn lapse_divisor(&self) -> f64 {
        libm::ldexp(self.lapse_rate / self.temperature, 32)
    }
}

impl Default for AtmosphereModel {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Fixed-point barometric altitude converter.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarometricConverter {
    reference: u32,
    series: SeriesSpec,
    ratio: Divider,
    exponent: Divider,
    lapse: Divider,
}

impl BarometricConverter {
    /// Build a converter for `reference` pressure (Pa).
    pub fn new(
        model: &AtmosphereModel,
        reference: u32,
        series: SeriesSpec,
    ) -> AltimetryResult<Self> {
        model.validate()?;
        if reference == 0 {
            return Err(AltimetryError::InvalidPressure { pressure: reference });
        }
        Ok(Self {
            reference,
            series,
            ratio: Divider::synthesize(reference as f64, 64)?,
            exponent: Divider::synthesize(model.exponent, 64)?,
            lapse: Divider::synthesize(model.lapse_divisor(), 32)?,
        })
    }

    /// Standard atmosphere at sea-level reference with reference term counts
    pub fn standard() -> AltimetryResult<Self> {
        Self::new(
            &AtmosphereModel::STANDARD,
            SEA_LEVEL_PRESSURE_PA,
            SeriesSpec::REFERENCE,
        )
    }

    /// Rebuild from generated parts
    pub const fn from_parts(
        reference: u32,
        series: SeriesSpec,
        ratio: Divider,
        exponent: Divider,
        lapse: Divider,
    ) -> Self {
        Self {
            reference,
            series,
            ratio,
            exponent,
            lapse,
        }
    }

    /// Reference pressure (Pa)
    pub const fn reference(&self) -> u32 {
        self.reference
    }

    /// Series term counts in use
    pub const fn series(&self) -> SeriesSpec {
        self.series
    }

    /// Ratio, exponent and lapse dividers, in evaluation order
    pub const fn dividers(&self) -> [Divider; 3] {
        [self.ratio, self.exponent, self.lapse]
    }

    /// Altitude above the reference pressure level, in whole meters.
    ///
    /// Pressures above the reference are clamped to it and read as zero.
    pub fn altitude(&self, pressure: u32) -> AltimetryResult<i32> {
        if pressure == 0 {
            return Err(AltimetryError::InvalidPressure { pressure });
        }
        let pressure = self.clamp(pressure, self.reference);
        let ratio = self.ratio.divide((pressure as u64) << 32) as u32;
        Ok(self.altitude_from_ratio(ratio))
    }

    /// Altitude against a reference measured at runtime.
    ///
    /// The ratio is formed by an integer division instead of the synthesized
    /// divider, for firmware that samples its base pressure on the pad.
    pub fn altitude_relative_to(&self, pressure: u32, reference: u32) -> AltimetryResult<i32> {
        if reference == 0 {
            return Err(AltimetryError::InvalidPressure { pressure: reference });
        }
        if pressure == 0 {
            return Err(AltimetryError::InvalidPressure { pressure });
        }
        let pressure = self.clamp(pressure, reference);
        let ratio = (((pressure as u64) << 32) / reference as u64) as u32;
        Ok(self.altitude_from_ratio(ratio))
    }

    fn clamp(&self, pressure: u32, reference: u32) -> u32 {
        if pressure > reference {
            log_debug!("pressure {} Pa above reference {} Pa, clamped", pressure, reference);
            reference
        } else {
            pressure
        }
    }

    fn altitude_from_ratio(&self, ratio: u32) -> i32 {
        let log = ln_approx(ratio, self.series.log_terms);
        // saturates only below ~530 Pa, far above the troposphere
        let scaled = self.exponent.divide(log).min(u32::MAX as u64) as u32;
        let q = exp_approx(scaled, self.series.exp_terms);
        self.lapse.divide(q.wrapping_neg() as u64) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_pressure_is_zero_altitude() {
        let converter = BarometricConverter::standard().unwrap();
        assert_eq!(converter.altitude(SEA_LEVEL_PRESSURE_PA).unwrap(), 0);

        let converter =
            BarometricConverter::new(&AtmosphereModel::STANDARD, 97_000, SeriesSpec::REFERENCE)
                .unwrap();
        assert_eq!(converter.altitude(97_000).unwrap(), 0);
    }

    #[test]
    fn test_above_reference_is_clamped() {
        let converter = BarometricConverter::standard().unwrap();
        assert_eq!(converter.altitude(103_000).unwrap(), 0);
        assert_eq!(converter.altitude(u32::MAX).unwrap(), 0);
    }

    #[test]
    fn test_zero_pressure_rejected() {
        let converter = BarometricConverter::standard().unwrap();
        assert_eq!(
            converter.altitude(0),
            Err(AltimetryError::InvalidPressure { pressure: 0 })
        );
        assert!(converter.altitude_relative_to(90_000, 0).is_err());
    }

    #[test]
    fn test_known_altitude() {
        // ISA: 1000 m at 89874.6 Pa
        let converter = BarometricConverter::standard().unwrap();
        let altitude = converter.altitude(89_875).unwrap();
        assert!((altitude - 1000).abs() <= 3, "altitude={}", altitude);
    }

    #[test]
    fn test_within_tolerance_over_operating_range() {
        let model = AtmosphereModel::STANDARD;
        let converter = BarometricConverter::standard().unwrap();
        for pressure in 30_000..=100_000u32 {
            let approx = converter.altitude(pressure).unwrap() as f64;
            let exact = model.altitude_exact(pressure as f64, 101_325.0);
            assert!(
                (approx - exact).abs() < 3.0,
                "pressure={} approx={} exact={}",
                pressure,
                approx,
                exact
            );
        }
    }

    #[test]
    fn test_monotonic_in_pressure() {
        let converter = BarometricConverter::standard().unwrap();
        let mut previous = converter.altitude(30_000).unwrap();
        for pressure in 30_001..=SEA_LEVEL_PRESSURE_PA {
            let altitude = converter.altitude(pressure).unwrap();
            assert!(altitude <= previous, "pressure={}", pressure);
            previous = altitude;
        }
    }

    #[test]
    fn test_runtime_reference_matches_divider() {
        let converter = BarometricConverter::standard().unwrap();
        for pressure in (30_000..=101_325u32).step_by(997) {
            assert_eq!(
                converter.altitude(pressure).unwrap(),
                converter.altitude_relative_to(pressure, SEA_LEVEL_PRESSURE_PA).unwrap()
            );
        }
    }

    #[test]
    fn test_invalid_model_rejected() {
        let model = AtmosphereModel {
            lapse_rate: 0.0,
            ..AtmosphereModel::STANDARD
        };
        assert!(matches!(
            BarometricConverter::new(&model, SEA_LEVEL_PRESSURE_PA, SeriesSpec::REFERENCE),
            Err(AltimetryError::InvalidModel { .. })
        ));
    }

    #[test]
    fn test_exact_formula() {
        let model = AtmosphereModel::STANDARD;
        assert_eq!(model.altitude_exact(101_325.0, 101_325.0), 0.0);
        assert!((model.altitude_exact(89_874.6, 101_325.0) - 1000.0).abs() < 0.5);
    }
}
