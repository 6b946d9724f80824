// Auto-generated by altimetry-gen 0.1.0
// Reference pressure: 101325 Pa, sample period: 0.025 s
// Noise: acceleration variance 400, altitude variance 25
// Series: 14 log terms, 4 exp terms, max error 1.951 m
// Filter: rms 2.066 m, max 7.966 m over 2400 samples, peak register 3081

use crate::{AdcConverter, BarometricConverter, Divider, FilterDividers, SensorCalibration, SeriesSpec};

/// Series term counts
pub const SERIES: SeriesSpec = SeriesSpec::new(14, 4);

/// Pressure sensor transfer function
pub const ADC: AdcConverter = AdcConverter::from_parts(
    SensorCalibration {
        pressure_min: 30000,
        pressure_max: 110000,
        code_min: 1677722,
        code_max: 15099494,
    },
    Divider::from_parts(0x86a00187, 8, 0, 32),
);

/// Barometric altitude converter
pub const BAROMETRIC: BarometricConverter = BarometricConverter::from_parts(
    101325,
    SERIES,
    Divider::from_parts(0x4b28102648299ded, 17, 0, 64),
    Divider::from_parts(0x85a8a8711438a329, 3, 0, 64),
    Divider::from_parts(0x5a5589d9, 17, 0, 32),
);

/// Altitude filter coefficients as dividers
pub const FILTER_DIVIDERS: FilterDividers = FilterDividers {
    // x0_x1 = 0.0014436307
    position_from_velocity: Divider::from_parts(0x7a71, 10, 0, 16),
    // x0_x0zk = 0.9239236355
    position_from_residual: Divider::from_parts(0xd90d, 1, 0, 16),
    // x1_x2 = 0.0250000000
    velocity_from_acceleration: Divider::from_parts(0x999a, 6, 0, 16),
    // x1_x1 = 0.9972033278
    velocity_from_velocity: Divider::from_parts(0xfe92, 1, 0, 16),
    // x1_x0zk = 1.9333371050
    velocity_from_residual: Divider::from_parts(0x1dddf, 1, 1, 16),
    // x2_x1 = 0.0022198702
    acceleration_from_velocity: Divider::from_parts(0x22f7, 9, 0, 16),
    // x2_x0zk = 1.5357154581
    acceleration_from_residual: Divider::from_parts(0x1124a, 1, 1, 16),
};
