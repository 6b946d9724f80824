//! Design-time errors
//!
//! Every failure here stops parameter generation. None of them can be
//! recovered by retrying with the same inputs; the operator has to change the
//! tolerance, the noise model, or the fixed-point layout.

use altimetry_core::AltimetryError;
use thiserror::Error;

/// Result type for design-time operations
pub type DesignResult<T> = Result<T, DesignError>;

/// Parameter generation errors
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("Runtime component rejected parameters: {0}")]
    Core(#[from] AltimetryError),

    #[error("Invalid Kalman model: {0}")]
    InvalidModel(String),

    #[error("Steady-state covariance diverged after {iterations} iterations")]
    Diverged { iterations: usize },

    #[error("Steady-state covariance did not converge within {iterations} iterations")]
    NotConverged { iterations: usize },

    #[error("Filter coefficient {name} = {value} is not positive")]
    InvalidCoefficient { name: &'static str, value: f64 },

    #[error("No term counts within {log_terms} log / {exp_terms} exp terms meet {tolerance} m after {rounds} rounds")]
    TermSearchExhausted {
        tolerance: f64,
        rounds: u32,
        log_terms: u16,
        exp_terms: u16,
    },

    #[error("Divider for {divisor} returned {actual} for {n}, expected {expected}")]
    DividerMismatch {
        divisor: f64,
        n: i64,
        expected: i64,
        actual: i64,
    },

    #[error("Filter value {value} at sample {sample} exceeds 16-bit range")]
    Overflow { sample: usize, value: i64 },

    #[error("Invalid flight trace: {0}")]
    InvalidTrace(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Source formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}
