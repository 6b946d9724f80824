//! Common fixtures for design integration tests
//!
//! This module provides:
//! - The reference model, covariance and dividers for the 40 Hz tuning
//! - Scratch directories for CSV and JSON round trips

#![allow(dead_code)]

use std::path::PathBuf;

use altimetry_core::FilterDividers;
use altimetry_design::{
    solve_steady_state_covariance, steady_state::DEFAULT_THRESHOLD, FilterCoefficients,
    KalmanParams, StateSpaceModel, SteadyCovariance, SteadyStateKalman,
};
use tempfile::TempDir;

pub struct ReferenceDesign {
    pub params: KalmanParams,
    pub model: StateSpaceModel,
    pub covariance: SteadyCovariance,
    pub coefficients: FilterCoefficients,
    pub dividers: FilterDividers,
}

impl ReferenceDesign {
    pub fn new(params: KalmanParams) -> Self {
        let model = StateSpaceModel::constant_acceleration(&params).unwrap();
        let covariance = solve_steady_state_covariance(&model, DEFAULT_THRESHOLD).unwrap();
        let coefficients = FilterCoefficients::derive(&params, &covariance).unwrap();
        let dividers = coefficients.dividers().unwrap();
        Self {
            params,
            model,
            covariance,
            coefficients,
            dividers,
        }
    }

    pub fn kalman(&self) -> SteadyStateKalman {
        SteadyStateKalman::new(&self.model, &self.covariance).unwrap()
    }
}

impl Default for ReferenceDesign {
    fn default() -> Self {
        Self::new(KalmanParams::default())
    }
}

/// Temporary directory removed on drop
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
