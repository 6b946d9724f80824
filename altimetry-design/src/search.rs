//! Series Term-Count Search
//!
//! Picks the cheapest `(log_terms, exp_terms)` pair whose fixed-point
//! altitude stays within tolerance of the exact barometric formula over a
//! pressure sweep.
//!
//! ## Strategy
//!
//! ```text
//! round 0: exp ∈ [1, 5)   log ∈ [1, 50)
//! round 1: exp ∈ [1, 10)  log ∈ [1, 100)
//! ...
//! ```
//!
//! Each candidate runs the full runtime composition (ratio divider, log
//! series, exponent divider, exp series, lapse divider) so the error
//! measured is the error the target will see. Cost is `exp² + log²`; ties
//! keep the first pair found, iterating exp-major.

use altimetry_core::{
    constants::atmosphere::SEA_LEVEL_PRESSURE_PA, AtmosphereModel, BarometricConverter,
    SeriesSpec,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, DesignResult};

/// Lowest pressure in the standard sweep (Pa)
pub const SWEEP_MIN_PA: u32 = 30_000;

/// Highest pressure in the standard sweep (Pa)
pub const SWEEP_MAX_PA: u32 = 100_000;

/// Spacing of the standard sweep (Pa)
pub const SWEEP_STEP_PA: u32 = 1_000;

/// Test pressures paired with their exact altitudes
#[derive(Debug, Clone, PartialEq)]
pub struct PressureSweep {
    reference: u32,
    points: Vec<(u32, f64)>,
}

impl PressureSweep {
    /// Sweep arbitrary pressures against `reference`
    pub fn new(
        model: &AtmosphereModel,
        reference: u32,
        pressures: impl IntoIterator<Item = u32>,
    ) -> Self {
        let points = pressures
            .into_iter()
            .map(|p| (p, model.altitude_exact(p as f64, reference as f64)))
            .collect();
        Self { reference, points }
    }

    /// 30-100 kPa every 1 kPa, stopping at the reference pressure
    pub fn standard(model: &AtmosphereModel, reference: u32) -> Self {
        Self::new(
            model,
            reference,
            (SWEEP_MIN_PA..=SWEEP_MAX_PA.min(reference)).step_by(SWEEP_STEP_PA as usize),
        )
    }

    pub fn reference(&self) -> u32 {
        self.reference
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(pressure, exact altitude)` pairs
    pub fn points(&self) -> &[(u32, f64)] {
        &self.points
    }

    /// Worst absolute error of `converter` over the sweep (m)
    pub fn max_error(&self, converter: &BarometricConverter) -> DesignResult<f64> {
        let mut worst = 0.0f64;
        for &(pressure, exact) in &self.points {
            let altitude = converter.altitude(pressure)? as f64;
            worst = worst.max((altitude - exact).abs());
        }
        Ok(worst)
    }
}

impl Default for PressureSweep {
    fn default() -> Self {
        Self::standard(&AtmosphereModel::STANDARD, SEA_LEVEL_PRESSURE_PA)
    }
}

/// Initial bounds and retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Exclusive bound on exp terms in the first round
    pub exp_terms: u16,
    /// Exclusive bound on log terms in the first round
    pub log_terms: u16,
    /// Rounds before giving up; bounds double each round
    pub max_rounds: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            exp_terms: 5,
            log_terms: 50,
            max_rounds: 4,
        }
    }
}

/// Selected term counts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesChoice {
    pub spec: SeriesSpec,
    /// Worst absolute error over the sweep (m)
    pub max_error: f64,
}

/// Progress sink for [`choose_term_counts`]
///
/// The search never prints; callers decide where progress goes. All
/// methods default to no-ops.
pub trait SearchReporter {
    /// A round starts with exclusive bounds `exp_bound` and `log_bound`
    fn round_started(&mut self, _round: u32, _exp_bound: u16, _log_bound: u16) {}

    /// A candidate beat the previous best
    fn improved(&mut self, _choice: &SeriesChoice) {}

    /// A round ended without any candidate under tolerance
    fn round_failed(&mut self, _round: u32, _best_error: f64) {}

    /// The search finished
    fn finished(&mut self, _choice: &SeriesChoice) {}
}

/// Reports through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl SearchReporter for LogReporter {
    fn round_started(&mut self, round: u32, exp_bound: u16, log_bound: u16) {
        debug!(
            "Term search round {}: exp < {}, log < {}",
            round, exp_bound, log_bound
        );
    }

    fn improved(&mut self, choice: &SeriesChoice) {
        debug!(
            "  log={} exp={} cost={} error={:.3} m",
            choice.spec.log_terms,
            choice.spec.exp_terms,
            choice.spec.cost(),
            choice.max_error
        );
    }

    fn round_failed(&mut self, round: u32, best_error: f64) {
        warn!(
            "Term search round {} found nothing under tolerance (best {:.3} m)",
            round, best_error
        );
    }

    fn finished(&mut self, choice: &SeriesChoice) {
        info!(
            "Selected {} log terms, {} exp terms, max error {:.3} m",
            choice.spec.log_terms, choice.spec.exp_terms, choice.max_error
        );
    }
}

/// Discards all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl SearchReporter for NullReporter {}

/// Find the cheapest term counts with max error under `tolerance` meters.
///
/// ## Errors
///
/// - [`DesignError::InvalidModel`] for a non-positive tolerance or empty sweep
/// - [`DesignError::Core`] if the converter dividers cannot be synthesized
/// - [`DesignError::TermSearchExhausted`] after `limits.max_rounds` rounds
pub fn choose_term_counts<R: SearchReporter + ?Sized>(
    sweep: &PressureSweep,
    model: &AtmosphereModel,
    tolerance: f64,
    limits: SearchLimits,
    reporter: &mut R,
) -> DesignResult<SeriesChoice> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(DesignError::InvalidModel(format!(
            "tolerance {} must be positive",
            tolerance
        )));
    }
    if sweep.is_empty() {
        return Err(DesignError::InvalidModel("empty pressure sweep".into()));
    }

    // dividers do not depend on the term counts
    let base = BarometricConverter::new(model, sweep.reference(), SeriesSpec::REFERENCE)?;
    let [ratio, exponent, lapse] = base.dividers();
    let converter = |spec| BarometricConverter::from_parts(sweep.reference(), spec, ratio, exponent, lapse);

    let mut exp_bound = limits.exp_terms;
    let mut log_bound = limits.log_terms;
    for round in 0..limits.max_rounds {
        reporter.round_started(round, exp_bound, log_bound);

        let mut best: Option<SeriesChoice> = None;
        let mut closest = f64::INFINITY;
        for exp_terms in 1..exp_bound {
            for log_terms in 1..log_bound {
                let spec = SeriesSpec::new(log_terms, exp_terms);
                if best.is_some_and(|b| spec.cost() >= b.spec.cost()) {
                    continue;
                }
                let max_error = sweep.max_error(&converter(spec))?;
                closest = closest.min(max_error);
                if max_error < tolerance {
                    let choice = SeriesChoice { spec, max_error };
                    reporter.improved(&choice);
                    best = Some(choice);
                }
            }
        }

        if let Some(choice) = best {
            reporter.finished(&choice);
            return Ok(choice);
        }
        reporter.round_failed(round, closest);
        exp_bound = exp_bound.saturating_mul(2);
        log_bound = log_bound.saturating_mul(2);
    }

    Err(DesignError::TermSearchExhausted {
        tolerance,
        rounds: limits.max_rounds,
        log_terms: log_bound,
        exp_terms: exp_bound,
    })
}
