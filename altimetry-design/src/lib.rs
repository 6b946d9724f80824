//! Design-time parameter generation for `altimetry-core`
//!
//! Everything that needs floating point or search happens here, on the
//! host, once per sensor and tuning:
//!
//! - [`search`]: cheapest series term counts meeting an altitude tolerance
//! - [`steady_state`]: steady-state covariance of the constant-acceleration model
//! - [`coefficients`]: seven filter coefficients and their dividers
//! - [`verification`]: exact check of every divider against true division
//! - [`verify`]: fixed-point filter replayed against a floating-point Kalman filter
//! - [`params`] and [`codegen`]: the combined parameter set, as JSON or Rust
//!
//! ```no_run
//! use altimetry_design::{
//!     codegen::render_rust, params::{DesignConfig, ParameterSet}, search::LogReporter,
//!     trace::FlightTrace,
//! };
//!
//! let config = DesignConfig::default();
//! let trace = FlightTrace::from_csv("flight.csv")?;
//! let params = ParameterSet::generate(&config, &trace, &mut LogReporter)?;
//! println!("{}", render_rust(&params)?);
//! # Ok::<(), altimetry_design::DesignError>(())
//! ```

pub mod codegen;
pub mod coefficients;
pub mod errors;
pub mod matrix;
pub mod model;
pub mod params;
pub mod reference;
pub mod search;
pub mod steady_state;
pub mod trace;
pub mod verification;
pub mod verify;

pub use coefficients::FilterCoefficients;
pub use errors::{DesignError, DesignResult};
pub use model::{KalmanParams, StateSpaceModel};
pub use params::{DesignConfig, ParameterSet};
pub use reference::SteadyStateKalman;
pub use search::{choose_term_counts, LogReporter, NullReporter, PressureSweep, SearchLimits, SearchReporter, SeriesChoice};
pub use steady_state::{residual, solve_steady_state_covariance, SteadyCovariance, SteadyStateSolver};
pub use trace::FlightTrace;
pub use verification::{verify_divider, verify_divider_within, DividerCheck, InputRange};
pub use verify::{verify_filter, FilterReport};
