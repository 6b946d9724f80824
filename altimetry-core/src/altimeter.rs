//! Sample Pipeline from ADC Code to Filtered Altitude
//!
//! ## Architecture
//!
//! ```text
//! ADC code → AdcConverter → Pa → BarometricConverter → m (absolute)
//!                                                        ↓
//!                                     GroundCalibrator → m (above pad)
//!                                                        ↓
//!                                        AltitudeFilter → FilterState
//!                                                        ↓
//!                                        FlightDetector → FlightPhase
//! ```
//!
//! The first `N` samples only feed the ground calibration. The sample that
//! completes it is not filtered; tracking starts with the next one.
//!
//! ```rust
//! use altimetry_core::{generated, Altimeter, AltimeterOutput};
//!
//! let mut altimeter = Altimeter::<40>::new(
//!     generated::ADC,
//!     generated::BAROMETRIC,
//!     generated::FILTER_DIVIDERS,
//! );
//!
//! match altimeter.process(12_000_000)? {
//!     AltimeterOutput::Calibrating { remaining } => assert_eq!(remaining, 39),
//!     AltimeterOutput::Tracking { .. } => unreachable!(),
//! }
//! # Ok::<(), altimetry_core::AltimetryError>(())
//! ```

use crate::{
    adc::AdcConverter,
    barometric::BarometricConverter,
    calibration::GroundCalibrator,
    constants::filter::CALIBRATION_SAMPLES,
    errors::AltimetryResult,
    filter::{AltitudeFilter, FilterDividers, FilterState},
    flight::{FlightDetector, FlightPhase, FlightThresholds},
};

/// Result of processing one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltimeterOutput {
    /// Still averaging the ground altitude
    Calibrating {
        /// Samples left before tracking starts
        remaining: usize,
    },
    /// Filtered estimate relative to ground
    Tracking {
        /// Filter output
        state: FilterState,
        /// Phase after this sample
        phase: FlightPhase,
    },
}

/// End-to-end runtime altimeter.
#[derive(Debug, Clone)]
pub struct Altimeter<const N: usize = CALIBRATION_SAMPLES> {
    adc: AdcConverter,
    barometric: BarometricConverter,
    calibrator: GroundCalibrator<N>,
    filter: AltitudeFilter,
    detector: FlightDetector,
}

impl<const N: usize> Altimeter<N> {
    /// Assemble the pipeline
    pub const fn new(
        adc: AdcConverter,
        barometric: BarometricConverter,
        dividers: FilterDividers,
    ) -> Self {
        Self {
            adc,
            barometric,
            calibrator: GroundCalibrator::new(),
            filter: AltitudeFilter::new(dividers),
            detector: FlightDetector::new(FlightThresholds::REFERENCE),
        }
    }

    /// Replace the flight phase thresholds
    pub fn with_thresholds(mut self, thresholds: FlightThresholds) -> Self {
        self.detector = FlightDetector::new(thresholds);
        self
    }

    /// Process one raw ADC code
    pub fn process(&mut self, code: u32) -> AltimetryResult<AltimeterOutput> {
        let pressure = self.adc.pressure_from_adc(code);
        self.process_pressure(pressure)
    }

    /// Process one pressure reading (Pa)
    pub fn process_pressure(&mut self, pressure: u32) -> AltimetryResult<AltimeterOutput> {
        let altitude = self.barometric.altitude(pressure)?;

        let Some(ground) = self.calibrator.ground() else {
            self.calibrator.push(altitude);
            return Ok(AltimeterOutput::Calibrating {
                remaining: self.calibrator.remaining(),
            });
        };

        let relative = altitude - ground;
        let measurement = if relative > i16::MAX as i32 || relative < i16::MIN as i32 {
            log_warn!("relative altitude {} m outside filter range", relative);
            relative.clamp(i16::MIN as i32, i16::MAX as i32) as i16
        } else {
            relative as i16
        };
        let state = self.filter.step(measurement);
        let phase = self.detector.update(&state);
        Ok(AltimeterOutput::Tracking { state, phase })
    }

    /// Ground altitude above the reference level, once calibrated
    pub const fn ground_altitude(&self) -> Option<i32> {
        self.calibrator.ground()
    }

    /// Latest filter estimate
    pub const fn state(&self) -> FilterState {
        self.filter.state()
    }

    /// Current flight phase
    pub const fn phase(&self) -> FlightPhase {
        self.detector.phase()
    }

    /// Restart calibration, zero the filter and return to the pad
    pub fn reset(&mut self) {
        self.calibrator.reset();
        self.filter.reset();
        self.detector.reset();
    }
}
