//! Parameter generation pipeline
//!
//! ```text
//! DesignConfig ─┬─► term search ──────► BarometricConverter
//!               ├─► ADC calibration ──► AdcConverter
//!               └─► Riccati solve ────► coefficients ──► FilterDividers
//!                                                         │
//!            every divider verified exactly ◄─────────────┤
//!            trace replay against float Kalman ◄──────────┘
//! ```
//!
//! The result is a [`ParameterSet`]: everything firmware needs, plus the
//! evidence that it is correct, serializable as JSON.

use std::path::Path;

use altimetry_core::{
    constants::atmosphere::SEA_LEVEL_PRESSURE_PA, AdcConverter, AtmosphereModel,
    BarometricConverter, Divider, FilterDividers, SensorCalibration,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    coefficients::FilterCoefficients,
    errors::DesignResult,
    model::{KalmanParams, StateSpaceModel},
    reference::SteadyStateKalman,
    search::{choose_term_counts, PressureSweep, SearchLimits, SearchReporter, SeriesChoice},
    steady_state::{SteadyCovariance, SteadyStateSolver, DEFAULT_MAX_ITERATIONS, DEFAULT_THRESHOLD},
    trace::{FlightTrace, FlightTraceKind},
    verification::{verify_divider_within, DividerCheck, InputRange, EXHAUSTIVE_BITS},
    verify::{verify_filter, FilterReport},
};

/// Default altitude tolerance for the term search (m)
pub const DEFAULT_TOLERANCE_M: f64 = 3.0;

/// Inputs to parameter generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    pub atmosphere: AtmosphereModel,
    /// Pressure read as zero altitude (Pa)
    pub reference_pressure: u32,
    /// Worst acceptable altitude error over the sweep (m)
    pub tolerance: f64,
    pub calibration: SensorCalibration,
    pub kalman: KalmanParams,
    /// Relative-change threshold for the Riccati iteration
    pub threshold: f64,
    pub max_iterations: usize,
    pub search: SearchLimits,
    /// Trace used when no recorded flight is supplied
    pub trace: FlightTraceKind,
    /// Widest divider verified on every input
    pub exhaustive_bits: u32,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            atmosphere: AtmosphereModel::STANDARD,
            reference_pressure: SEA_LEVEL_PRESSURE_PA,
            tolerance: DEFAULT_TOLERANCE_M,
            calibration: SensorCalibration::GZP6816D,
            kalman: KalmanParams::default(),
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            search: SearchLimits::default(),
            trace: FlightTraceKind::default(),
            exhaustive_bits: EXHAUSTIVE_BITS,
        }
    }
}

impl DesignConfig {
    pub fn with_reference_pressure(mut self, pressure: u32) -> Self {
        self.reference_pressure = pressure;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_kalman(mut self, kalman: KalmanParams) -> Self {
        self.kalman = kalman;
        self
    }

    pub fn with_calibration(mut self, calibration: SensorCalibration) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_trace(mut self, trace: FlightTraceKind) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_exhaustive_bits(mut self, bits: u32) -> Self {
        self.exhaustive_bits = bits;
        self
    }

    /// Read a configuration file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> DesignResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// A divider together with its verification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedDivider {
    pub name: String,
    /// Exact divisor the divider approximates
    pub divisor: f64,
    pub divider: Divider,
    pub check: DividerCheck,
}

/// Generated firmware parameters with their verification evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub config: DesignConfig,
    pub series: SeriesChoice,
    pub adc: AdcConverter,
    pub barometric: BarometricConverter,
    pub covariance: SteadyCovariance,
    pub coefficients: FilterCoefficients,
    pub dividers: FilterDividers,
    pub divider_checks: Vec<VerifiedDivider>,
    pub filter_report: FilterReport,
}

impl ParameterSet {
    /// Run the whole pipeline for `config`, replaying `trace` at the end.
    pub fn generate<R: SearchReporter + ?Sized>(
        config: &DesignConfig,
        trace: &FlightTrace,
        reporter: &mut R,
    ) -> DesignResult<Self> {
        info!(
            "Generating parameters: reference {} Pa, tolerance {} m, timestep {} s",
            config.reference_pressure, config.tolerance, config.kalman.timestep
        );

        let sweep = PressureSweep::standard(&config.atmosphere, config.reference_pressure);
        let series = choose_term_counts(
            &sweep,
            &config.atmosphere,
            config.tolerance,
            config.search,
            reporter,
        )?;
        let barometric =
            BarometricConverter::new(&config.atmosphere, config.reference_pressure, series.spec)?;
        let adc = AdcConverter::new(config.calibration)?;

        let model = StateSpaceModel::constant_acceleration(&config.kalman)?;
        let covariance = SteadyStateSolver::new()
            .with_threshold(config.threshold)
            .with_max_iterations(config.max_iterations)
            .solve(&model)?;
        let coefficients = FilterCoefficients::derive(&config.kalman, &covariance)?;
        let dividers = coefficients.dividers()?;

        let divider_checks = verify_all(config, &barometric, &adc, &coefficients, &dividers)?;
        info!("Verified {} dividers", divider_checks.len());

        let reference = SteadyStateKalman::new(&model, &covariance)?;
        let filter_report = verify_filter(&dividers, trace, &reference)?;

        Ok(Self {
            config: config.clone(),
            series,
            adc,
            barometric,
            covariance,
            coefficients,
            dividers,
            divider_checks,
            filter_report,
        })
    }

    pub fn to_json(&self) -> DesignResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> DesignResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn verify_all(
    config: &DesignConfig,
    barometric: &BarometricConverter,
    adc: &AdcConverter,
    coefficients: &FilterCoefficients,
    dividers: &FilterDividers,
) -> DesignResult<Vec<VerifiedDivider>> {
    let [ratio, exponent, lapse] = barometric.dividers();
    let mut pending = vec![
        (
            "reference_pressure",
            config.reference_pressure as f64,
            ratio,
            InputRange::Unsigned,
        ),
        (
            "barometric_exponent",
            config.atmosphere.exponent,
            exponent,
            InputRange::Unsigned,
        ),
        (
            "lapse",
            config.atmosphere.lapse_divisor(),
            lapse,
            InputRange::Unsigned,
        ),
        (
            "adc_slope",
            config.calibration.counts_per_pascal(),
            adc.slope(),
            InputRange::Unsigned,
        ),
    ];
    for ((name, c), divider) in coefficients.named().into_iter().zip(dividers.as_array()) {
        pending.push((name, 1.0 / c, divider, InputRange::Signed));
    }

    pending
        .into_iter()
        .map(|(name, divisor, divider, range)| {
            let check = verify_divider_within(&divider, divisor, range, config.exhaustive_bits)?;
            Ok(VerifiedDivider {
                name: name.to_string(),
                divisor,
                divider,
                check,
            })
        })
        .collect()
}
