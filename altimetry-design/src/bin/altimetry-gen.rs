//! Generate firmware parameters for altimetry-core
//!
//! ```text
//! altimetry-gen --trace flight.csv --json params.json --output generated.rs
//! ```

use std::path::PathBuf;

use altimetry_design::{
    codegen::render_rust_in,
    params::{DesignConfig, ParameterSet},
    search::LogReporter,
    trace::{FlightTrace, FlightTraceKind},
};
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

#[derive(Parser, Debug)]
#[command(name = "altimetry-gen")]
#[command(about = "Generate fixed-point altimeter parameters")]
pub struct Cli {
    #[arg(long, help = "JSON design configuration; flags override it")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "recorded flight CSV with time and baro_altitude columns")]
    pub trace: Option<PathBuf>,

    #[arg(long, value_enum, help = "built-in trace when no CSV is given")]
    pub builtin: Option<TraceArg>,

    #[arg(long, help = "maximum altitude error over 30-100 kPa (m)")]
    pub tolerance: Option<f64>,

    #[arg(long, help = "reference pressure read as zero altitude (Pa)")]
    pub reference: Option<u32>,

    #[arg(long, help = "sample period (s); defaults to the trace's mean spacing")]
    pub timestep: Option<f64>,

    #[arg(long, help = "acceleration noise standard deviation")]
    pub accel_noise: Option<f64>,

    #[arg(long, help = "altitude noise standard deviation (m)")]
    pub altitude_noise: Option<f64>,

    #[arg(long, help = "widest divider checked on every input (bits)")]
    pub exhaustive_bits: Option<u32>,

    #[arg(long, help = "write the full parameter set as JSON")]
    pub json: Option<PathBuf>,

    #[arg(long, short, help = "write Rust constants; stdout if omitted")]
    pub output: Option<PathBuf>,

    #[arg(long, default_value = "altimetry_core", help = "crate path used in the generated imports")]
    pub crate_path: String,

    #[arg(short, long, action = clap::ArgAction::Count, help = "-v info, -vv debug")]
    pub verbose: u8,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum TraceArg {
    Stationary,
    Synthetic,
}

impl From<TraceArg> for FlightTraceKind {
    fn from(arg: TraceArg) -> Self {
        match arg {
            TraceArg::Stationary => FlightTraceKind::Stationary,
            TraceArg::Synthetic => FlightTraceKind::Synthetic,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::builder()
        .filter_level(level)
        .try_init()
        .context("failed to initialise logging")?;

    let mut config = match &cli.config {
        Some(path) => DesignConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => DesignConfig::default(),
    };
    if let Some(kind) = cli.builtin {
        config.trace = kind.into();
    }
    if let Some(tolerance) = cli.tolerance {
        config.tolerance = tolerance;
    }
    if let Some(reference) = cli.reference {
        config.reference_pressure = reference;
    }
    if let Some(stddev) = cli.accel_noise {
        config.kalman = config.kalman.with_accel_noise(stddev);
    }
    if let Some(stddev) = cli.altitude_noise {
        config.kalman = config.kalman.with_altitude_noise(stddev);
    }
    if let Some(bits) = cli.exhaustive_bits {
        config.exhaustive_bits = bits;
    }
    if let Some(timestep) = cli.timestep {
        config.kalman.timestep = timestep;
    }

    let trace = match &cli.trace {
        Some(path) => {
            let trace = FlightTrace::from_csv(path)
                .with_context(|| format!("loading trace {}", path.display()))?;
            if cli.timestep.is_none() {
                config.kalman.timestep = trace
                    .geometric_mean_timestep()
                    .context("estimating the sample period")?;
                info!("Using sample period {:.6} s from the trace", config.kalman.timestep);
            }
            trace
        }
        None => config.trace.build(config.kalman.timestep),
    };

    let params = ParameterSet::generate(&config, &trace, &mut LogReporter)
        .context("parameter generation failed")?;

    if let Some(path) = &cli.json {
        params
            .write_json(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {}", path.display());
    }

    let source = render_rust_in(&params, &cli.crate_path).context("rendering Rust source")?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, source).with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => print!("{}", source),
    }
    Ok(())
}
