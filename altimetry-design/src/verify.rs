//! Fixed-point filter verification
//!
//! Replays a flight trace through the integer recursion and the
//! floating-point steady-state Kalman filter side by side. The integer run
//! uses the same wide step as firmware, so any value that would not fit a
//! 16-bit register is caught here rather than on the target.

use altimetry_core::{filter_step_wide, FilterDividers};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{DesignError, DesignResult},
    reference::SteadyStateKalman,
    trace::FlightTrace,
};

/// Headroom below `i16::MAX` that triggers a warning
const PEAK_WARNING: i32 = i16::MAX as i32 / 2;

/// Position agreement between the fixed-point and reference filters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    /// RMS position deviation (m)
    pub rms: f64,
    /// Largest absolute position deviation (m)
    pub max_deviation: f64,
    /// Largest magnitude of any register value
    pub peak: i32,
    pub samples: usize,
}

/// Run both filters over `trace`, starting each from rest.
///
/// ## Errors
///
/// [`DesignError::Overflow`] if a measurement or any intermediate register
/// leaves the `i16` range; [`DesignError::InvalidTrace`] for an empty trace.
pub fn verify_filter(
    dividers: &FilterDividers,
    trace: &FlightTrace,
    reference: &SteadyStateKalman,
) -> DesignResult<FilterReport> {
    if trace.is_empty() {
        return Err(DesignError::InvalidTrace("no samples to verify".into()));
    }

    let mut reference = reference.clone();
    reference.reset();
    let mut state = [0i32; 3];
    let mut squares = 0.0;
    let mut max_deviation = 0.0f64;
    let mut peak = 0i32;

    for (sample, &altitude) in trace.altitudes().iter().enumerate() {
        let measurement = altitude.round();
        if measurement < i16::MIN as f64 || measurement > i16::MAX as f64 {
            return Err(DesignError::Overflow {
                sample,
                value: measurement as i64,
            });
        }
        let measurement = measurement as i32;

        let step = filter_step_wide(dividers, state, measurement);
        peak = peak.max(step.peak());
        if !step.fits_i16() {
            return Err(DesignError::Overflow {
                sample,
                value: step.peak() as i64,
            });
        }
        state = step.next;

        let expected = reference.step(measurement as f64);
        let deviation = state[0] as f64 - expected[0];
        squares += deviation * deviation;
        max_deviation = max_deviation.max(deviation.abs());
    }

    let report = FilterReport {
        rms: (squares / trace.len() as f64).sqrt(),
        max_deviation,
        peak,
        samples: trace.len(),
    };
    if peak > PEAK_WARNING {
        warn!(
            "Filter registers reached {} of {} on this trace",
            peak,
            i16::MAX
        );
    }
    info!(
        "Filter verified over {} samples: rms {:.3} m, max {:.3} m, peak {}",
        report.samples, report.rms, report.max_deviation, report.peak
    );
    Ok(report)
}
