//! Flight traces for filter verification
//!
//! A trace is a sequence of barometric altitude samples relative to the
//! pad. Recorded flights are loaded from CSV with at least `time` (s) and
//! `baro_altitude` (m) columns; other columns are ignored.

use std::{io, path::Path};

use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, DesignResult};

/// Samples in the built-in stationary trace
pub const STATIONARY_SAMPLES: usize = 1000;

/// Length of the built-in synthetic flight (s)
pub const SYNTHETIC_DURATION: f64 = 60.0;

/// Noise seed of the built-in synthetic flight
pub const SYNTHETIC_SEED: u32 = 12_345;

#[derive(Debug, Serialize, Deserialize)]
struct TraceRecord {
    time: f64,
    baro_altitude: f64,
}

/// Timestamped altitude samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightTrace {
    times: Vec<f64>,
    altitudes: Vec<f64>,
}

impl FlightTrace {
    /// Pair up times and altitudes; lengths must match
    pub fn new(times: Vec<f64>, altitudes: Vec<f64>) -> DesignResult<Self> {
        if times.len() != altitudes.len() {
            return Err(DesignError::InvalidTrace(format!(
                "{} timestamps for {} altitudes",
                times.len(),
                altitudes.len()
            )));
        }
        if let Some(bad) = altitudes.iter().position(|a| !a.is_finite()) {
            return Err(DesignError::InvalidTrace(format!(
                "non-finite altitude at sample {}",
                bad
            )));
        }
        Ok(Self { times, altitudes })
    }

    /// `n` samples of zero altitude spaced `timestep` apart
    pub fn stationary(samples: usize, timestep: f64) -> Self {
        Self {
            times: (0..samples).map(|i| i as f64 * timestep).collect(),
            altitudes: vec![0.0; samples],
        }
    }

    /// Deterministic boost, coast and descent with quantized noise.
    ///
    /// ```text
    /// t < 2 s        pad
    /// t < 5 s        +50 m/s²
    /// t < 20 s       -10 m/s²
    /// until -20 m/s  -10 m/s², then constant descent to the ground
    /// ```
    ///
    /// Altitudes are whole meters plus uniform noise in `[-5, 5]` from a
    /// linear congruential generator seeded with `seed`.
    pub fn synthetic_flight(duration: f64, sample_rate: u32, seed: u32) -> Self {
        Self::synthetic_flight_at(duration, 1.0 / sample_rate as f64, seed)
    }

    /// [`FlightTrace::synthetic_flight`] sampled every `timestep` seconds.
    ///
    /// Empty unless `timestep` is positive and finite.
    pub fn synthetic_flight_at(duration: f64, timestep: f64, seed: u32) -> Self {
        if !(timestep.is_finite() && timestep > 0.0) {
            return Self::default();
        }
        let samples = (duration / timestep).round() as usize;
        let mut state = seed as u64 & 0x7fff_ffff;
        let (mut height, mut velocity) = (0.0f64, 0.0f64);

        let mut times = Vec::with_capacity(samples);
        let mut altitudes = Vec::with_capacity(samples);
        for i in 0..samples {
            let t = i as f64 * timestep;
            let accel = if t < 2.0 {
                0.0
            } else if t < 5.0 {
                50.0
            } else if t < 20.0 || velocity > -20.0 {
                -10.0
            } else {
                velocity = -20.0;
                0.0
            };
            velocity += accel * timestep;
            height = (height + velocity * timestep).max(0.0);

            state = (state * 1_103_515_245 + 12_345) % (1 << 31);
            let noise = ((state >> 8) % 11) as f64 - 5.0;
            times.push(t);
            altitudes.push(height.round() + noise);
        }
        Self { times, altitudes }
    }

    /// Load a recorded flight
    pub fn from_csv(path: impl AsRef<Path>) -> DesignResult<Self> {
        let path = path.as_ref();
        let trace = Self::from_reader(std::fs::File::open(path)?)?;
        info!("Loaded {} samples from {}", trace.len(), path.display());
        Ok(trace)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> DesignResult<Self> {
        let mut times = Vec::new();
        let mut altitudes = Vec::new();
        for record in csv::Reader::from_reader(reader).deserialize() {
            let record: TraceRecord = record?;
            times.push(record.time);
            altitudes.push(record.baro_altitude);
        }
        if times.is_empty() {
            return Err(DesignError::InvalidTrace("no samples".into()));
        }
        Self::new(times, altitudes)
    }

    /// Write `time,baro_altitude` CSV
    pub fn to_csv(&self, path: impl AsRef<Path>) -> DesignResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for (&time, &baro_altitude) in self.times.iter().zip(&self.altitudes) {
            writer.serialize(TraceRecord {
                time,
                baro_altitude,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.altitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.altitudes.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn altitudes(&self) -> &[f64] {
        &self.altitudes
    }

    /// Geometric mean of the sample spacing.
    ///
    /// Robust to the occasional long gap in logged data.
    pub fn geometric_mean_timestep(&self) -> DesignResult<f64> {
        if self.times.len() < 2 {
            return Err(DesignError::InvalidTrace(
                "need at least two samples for a timestep".into(),
            ));
        }
        let mut log_sum = 0.0;
        for (i, pair) in self.times.windows(2).enumerate() {
            let dt = pair[1] - pair[0];
            if dt.is_nan() || dt <= 0.0 {
                return Err(DesignError::InvalidTrace(format!(
                    "non-increasing time at sample {}",
                    i + 1
                )));
            }
            log_sum += dt.ln();
        }
        Ok((log_sum / (self.times.len() - 1) as f64).exp())
    }
}

/// Built-in traces selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightTraceKind {
    /// One minute of [`FlightTrace::synthetic_flight`]
    #[default]
    Synthetic,
    /// [`STATIONARY_SAMPLES`] zeros
    Stationary,
}

impl FlightTraceKind {
    /// Build the trace sampled every `timestep` seconds, the spacing of the
    /// filter it will check.
    pub fn build(self, timestep: f64) -> FlightTrace {
        match self {
            Self::Synthetic => {
                FlightTrace::synthetic_flight_at(SYNTHETIC_DURATION, timestep, SYNTHETIC_SEED)
            }
            Self::Stationary => FlightTrace::stationary(STATIONARY_SAMPLES, timestep),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stationary() {
        let trace = FlightTrace::stationary(1000, 0.025);
        assert_eq!(trace.len(), 1000);
        assert!(trace.altitudes().iter().all(|&a| a == 0.0));
        assert_relative_eq!(trace.geometric_mean_timestep().unwrap(), 0.025, epsilon = 1e-12);
    }

    #[test]
    fn test_synthetic_flight_shape() {
        let trace = FlightTrace::synthetic_flight(60.0, 40, 12_345);
        assert_eq!(trace.len(), 2400);
        let apogee = trace.altitudes().iter().cloned().fold(f64::MIN, f64::max);
        assert!(apogee > 1300.0 && apogee < 1400.0, "apogee={}", apogee);
        // noise is bounded and integral
        assert!(trace.altitudes()[..80].iter().all(|&a| a.abs() <= 5.0 && a.fract() == 0.0));
        assert_eq!(trace, FlightTrace::synthetic_flight(60.0, 40, 12_345));
    }

    #[test]
    fn test_builtin_traces_follow_timestep() {
        let trace = FlightTraceKind::Synthetic.build(0.01);
        assert_eq!(trace.len(), 6000);
        assert_relative_eq!(trace.geometric_mean_timestep().unwrap(), 0.01, epsilon = 1e-9);
        let apogee = trace.altitudes().iter().cloned().fold(f64::MIN, f64::max);
        assert!(apogee > 1300.0 && apogee < 1400.0, "apogee={}", apogee);

        let trace = FlightTraceKind::Stationary.build(0.01);
        assert_eq!(trace.len(), STATIONARY_SAMPLES);
        assert_relative_eq!(trace.geometric_mean_timestep().unwrap(), 0.01, epsilon = 1e-9);

        assert!(FlightTraceKind::Synthetic.build(0.0).is_empty());
    }

    #[test]
    fn test_default_builtin_is_reference_flight() {
        assert_eq!(FlightTraceKind::default(), FlightTraceKind::Synthetic);
        assert_eq!(
            FlightTraceKind::default().build(0.025),
            FlightTrace::synthetic_flight(60.0, 40, 12_345)
        );
    }

    #[test]
    fn test_csv_reader() {
        let data = "time,pressure,baro_altitude\n0.0,101325,0.5\n0.025,101300,1.5\n0.05,101290,2.0\n";
        let trace = FlightTrace::from_reader(data.as_bytes()).unwrap();
        assert_eq!(trace.altitudes(), &[0.5, 1.5, 2.0]);
        assert_relative_eq!(trace.geometric_mean_timestep().unwrap(), 0.025, epsilon = 1e-12);
    }

    #[test]
    fn test_csv_errors() {
        assert!(FlightTrace::from_reader("time,baro_altitude\n".as_bytes()).is_err());
        assert!(FlightTrace::from_reader("time\n0.0\n".as_bytes()).is_err());
    }

    #[test]
    fn test_timestep_rejects_non_increasing() {
        let trace = FlightTrace::new(vec![0.0, 0.1, 0.1], vec![0.0; 3]).unwrap();
        assert!(matches!(
            trace.geometric_mean_timestep(),
            Err(DesignError::InvalidTrace(_))
        ));
        assert!(FlightTrace::new(vec![0.0], vec![]).is_err());
    }
}
