//! Steady-State Covariance Solver
//!
//! Iterates the discrete Riccati recursion
//!
//! ```text
//! P⁻ = F·P·Fᵀ + Q
//! K  = P⁻·Hᵀ / (H·P⁻·Hᵀ + R)
//! P' = (I - K·H)·P⁻
//! ```
//!
//! from `P = 0` until every distinct entry stops moving relative to its
//! previous value. The result is the posterior covariance the runtime
//! filter coefficients are derived from.
//!
//! The iterate is re-symmetrized after every step so the packed
//! upper-triangular form stays exact.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{DesignError, DesignResult},
    matrix::{
        add, dot, is_finite, make_symmetric, matvec, multiply, outer, scale, symmetric_index,
        transpose,
        Matrix3, Vector3, IDENTITY, SYMMETRIC_LEN, ZERO,
    },
    model::StateSpaceModel,
};

/// Default relative-change threshold (one Q16.16 unit)
pub const DEFAULT_THRESHOLD: f64 = 1.0 / 65536.0;

/// Default iteration cap
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Symmetric 3×3 covariance in packed upper-triangular order.
///
/// Index mapping: (0,0)→0, (0,1)→1, (0,2)→2, (1,1)→3, (1,2)→4, (2,2)→5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteadyCovariance(pub [f64; SYMMETRIC_LEN]);

impl SteadyCovariance {
    /// Entry at `(row, col)`; symmetric, so order does not matter
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.0[symmetric_index(row, col)]
    }

    pub fn to_matrix(&self) -> Matrix3 {
        let mut out = ZERO;
        for (i, row) in out.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = self.get(i, j);
            }
        }
        out
    }

    /// Pack the upper triangle of `m`
    pub fn from_matrix(m: &Matrix3) -> Self {
        let mut packed = [0.0; SYMMETRIC_LEN];
        for i in 0..3 {
            for j in i..3 {
                packed[symmetric_index(i, j)] = m[i][j];
            }
        }
        Self(packed)
    }

    /// Packed entries
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// One Riccati step: predicted covariance, gain and updated covariance
#[derive(Debug, Clone, Copy)]
pub struct CovarianceStep {
    /// `F·P·Fᵀ + Q`
    pub predicted: Matrix3,
    /// Kalman gain `K`
    pub gain: Vector3,
    /// `(I - K·H)·P⁻`
    pub updated: Matrix3,
}

/// Advance `covariance` by one predict/update cycle
pub fn covariance_step(model: &StateSpaceModel, covariance: &Matrix3) -> CovarianceStep {
    let f = &model.transition;
    let predicted = add(&multiply(&multiply(f, covariance), &transpose(f)), &model.process_noise);
    let gain = gain(model, &predicted);
    let correction = add(&IDENTITY, &scale(&outer(&gain, &model.measurement), -1.0));
    let mut updated = multiply(&correction, &predicted);
    make_symmetric(&mut updated);
    CovarianceStep {
        predicted,
        gain,
        updated,
    }
}

/// Kalman gain for a predicted covariance
pub fn gain(model: &StateSpaceModel, predicted: &Matrix3) -> Vector3 {
    let h = &model.measurement;
    let ph = matvec(predicted, h);
    let innovation = dot(h, &ph) + model.measurement_noise;
    ph.map(|v| v / innovation)
}

/// Largest relative deviation of one Riccati step from `covariance`.
///
/// Zero at an exact fixed point. Entries that are zero in `covariance`
/// contribute their absolute change instead.
pub fn residual(model: &StateSpaceModel, covariance: &SteadyCovariance) -> f64 {
    let next = SteadyCovariance::from_matrix(&covariance_step(model, &covariance.to_matrix()).updated);
    covariance
        .0
        .iter()
        .zip(next.0.iter())
        .map(|(&prev, &next)| {
            if prev == 0.0 {
                next.abs()
            } else {
                ((next - prev) / prev).abs()
            }
        })
        .fold(0.0, f64::max)
}

/// Riccati iteration with a configurable stopping rule.
#[derive(Debug, Clone, Copy)]
pub struct SteadyStateSolver {
    threshold: f64,
    max_iterations: usize,
}

impl Default for SteadyStateSolver {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SteadyStateSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative-change threshold every entry must fall below
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Iterate from `P = 0` to the steady-state posterior covariance
    pub fn solve(&self, model: &StateSpaceModel) -> DesignResult<SteadyCovariance> {
        model.validate()?;
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(DesignError::InvalidModel(format!(
                "convergence threshold {} must be positive",
                self.threshold
            )));
        }

        let mut current = ZERO;
        for iteration in 1..=self.max_iterations {
            let next = covariance_step(model, &current).updated;
            if !is_finite(&next) {
                return Err(DesignError::Diverged {
                    iterations: iteration,
                });
            }

            let prev = SteadyCovariance::from_matrix(&current);
            let packed = SteadyCovariance::from_matrix(&next);
            let converged = prev
                .0
                .iter()
                .zip(packed.0.iter())
                .all(|(&p, &n)| entry_converged(p, n, self.threshold));
            current = next;

            if converged {
                info!(
                    "Steady-state covariance converged after {} iterations",
                    iteration
                );
                return Ok(packed);
            }
            if iteration % 1000 == 0 {
                debug!("Riccati iteration {}: P = {:?}", iteration, packed.0);
            }
        }

        Err(DesignError::NotConverged {
            iterations: self.max_iterations,
        })
    }
}

fn entry_converged(prev: f64, next: f64, threshold: f64) -> bool {
    if prev == next {
        return true;
    }
    prev != 0.0 && ((next - prev) / prev).abs() < threshold
}

/// Solve with the default iteration cap
pub fn solve_steady_state_covariance(
    model: &StateSpaceModel,
    threshold: f64,
) -> DesignResult<SteadyCovariance> {
    SteadyStateSolver::new()
        .with_threshold(threshold)
        .solve(model)
}
