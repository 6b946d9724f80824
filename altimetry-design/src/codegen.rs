//! Rust source emission for firmware
//!
//! Renders a [`ParameterSet`] as `pub const` items built from the `const`
//! constructors of `altimetry-core`, so firmware embeds the parameters with
//! no runtime synthesis and no floating point.

use std::fmt::Write;

use altimetry_core::Divider;

use crate::{errors::DesignResult, params::ParameterSet};

/// Render with `altimetry_core` as the crate path
pub fn render_rust(params: &ParameterSet) -> DesignResult<String> {
    render_rust_in(params, "altimetry_core")
}

/// Render against `crate_path`, e.g. `crate` inside `altimetry-core` itself
pub fn render_rust_in(params: &ParameterSet, crate_path: &str) -> DesignResult<String> {
    let mut out = String::new();
    write_items(&mut out, params, crate_path)?;
    Ok(out)
}

fn write_items<W: Write>(out: &mut W, params: &ParameterSet, crate_path: &str) -> std::fmt::Result {
    let config = &params.config;
    let series = &params.series;
    let report = &params.filter_report;
    let calibration = params.adc.calibration();
    let [ratio, exponent, lapse] = params.barometric.dividers();

    writeln!(out, "// Auto-generated by altimetry-gen {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        out,
        "// Reference pressure: {} Pa, sample period: {} s",
        config.reference_pressure, config.kalman.timestep
    )?;
    writeln!(
        out,
        "// Noise: acceleration variance {}, altitude variance {}",
        config.kalman.accel_variance, config.kalman.altitude_variance
    )?;
    writeln!(
        out,
        "// Series: {} log terms, {} exp terms, max error {:.3} m",
        series.spec.log_terms, series.spec.exp_terms, series.max_error
    )?;
    writeln!(
        out,
        "// Filter: rms {:.3} m, max {:.3} m over {} samples, peak register {}",
        report.rms, report.max_deviation, report.samples, report.peak
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "use {}::{{AdcConverter, BarometricConverter, Divider, FilterDividers, SensorCalibration, SeriesSpec}};",
        crate_path
    )?;
    writeln!(out)?;

    writeln!(out, "/// Series term counts")?;
    writeln!(
        out,
        "pub const SERIES: SeriesSpec = SeriesSpec::new({}, {});",
        series.spec.log_terms, series.spec.exp_terms
    )?;
    writeln!(out)?;

    writeln!(out, "/// Pressure sensor transfer function")?;
    writeln!(out, "pub const ADC: AdcConverter = AdcConverter::from_parts(")?;
    writeln!(out, "    SensorCalibration {{")?;
    writeln!(out, "        pressure_min: {},", calibration.pressure_min)?;
    writeln!(out, "        pressure_max: {},", calibration.pressure_max)?;
    writeln!(out, "        code_min: {},", calibration.code_min)?;
    writeln!(out, "        code_max: {},", calibration.code_max)?;
    writeln!(out, "    }},")?;
    writeln!(out, "    {},", divider_expr(&params.adc.slope()))?;
    writeln!(out, ");")?;
    writeln!(out)?;

    writeln!(out, "/// Barometric altitude converter")?;
    writeln!(
        out,
        "pub const BAROMETRIC: BarometricConverter = BarometricConverter::from_parts("
    )?;
    writeln!(out, "    {},", params.barometric.reference())?;
    writeln!(out, "    SERIES,")?;
    for divider in [ratio, exponent, lapse] {
        writeln!(out, "    {},", divider_expr(&divider))?;
    }
    writeln!(out, ");")?;
    writeln!(out)?;

    writeln!(out, "/// Altitude filter coefficients as dividers")?;
    writeln!(out, "pub const FILTER_DIVIDERS: FilterDividers = FilterDividers {{")?;
    let d = &params.dividers;
    let fields = [
        ("position_from_velocity", d.position_from_velocity),
        ("position_from_residual", d.position_from_residual),
        ("velocity_from_acceleration", d.velocity_from_acceleration),
        ("velocity_from_velocity", d.velocity_from_velocity),
        ("velocity_from_residual", d.velocity_from_residual),
        ("acceleration_from_velocity", d.acceleration_from_velocity),
        ("acceleration_from_residual", d.acceleration_from_residual),
    ];
    for ((field, divider), (name, c)) in fields.iter().zip(params.coefficients.named()) {
        writeln!(out, "    // {} = {:.10}", name, c)?;
        writeln!(out, "    {}: {},", field, divider_expr(divider))?;
    }
    writeln!(out, "}};")?;
    Ok(())
}

fn divider_expr(divider: &Divider) -> String {
    format!(
        "Divider::from_parts({:#x}, {}, {}, {})",
        divider.multiplier(),
        divider.shift(),
        divider.prescale(),
        divider.bits()
    )
}
