//! Integration tests for the runtime pipeline
//!
//! Drives the altimeter with ADC codes synthesized from a simulated flight
//! and checks the filtered altitude against the flown profile.

mod common;

use altimetry_core::{
    AdcConverter, Altimeter, AltimeterOutput, AtmosphereModel, BarometricConverter,
    FilterState, FlightPhase, SensorCalibration,
};

use common::{code_for, flight_profile, pressure_at, reference_dividers, TestRng};

const PAD_ALTITUDE: f64 = 100.0;

#[test]
fn test_simulated_flight_from_adc_codes() {
    let model = AtmosphereModel::STANDARD;
    let calibration = SensorCalibration::GZP6816D;
    let mut altimeter = Altimeter::<40>::new(
        AdcConverter::new(calibration).unwrap(),
        BarometricConverter::standard().unwrap(),
        reference_dividers(),
    );
    let mut rng = TestRng::new(42);
    let profile = flight_profile();

    let read = |height: f64, rng: &mut TestRng| {
        let pressure = pressure_at(&model, 101_325.0, PAD_ALTITUDE + height);
        code_for(&calibration, pressure + rng.noise(12) as f64)
    };

    for _ in 0..40 {
        let code = read(0.0, &mut rng);
        assert!(matches!(
            altimeter.process(code).unwrap(),
            AltimeterOutput::Calibrating { .. }
        ));
    }
    let ground = altimeter.ground_altitude().unwrap();
    assert!((ground - PAD_ALTITUDE as i32).abs() <= 3, "ground={}", ground);

    let mut highest = i16::MIN;
    let mut worst = 0.0f64;
    let mut state = FilterState::ZERO;
    let mut phases = vec![FlightPhase::Ready];
    for &height in &profile {
        let code = read(height, &mut rng);
        let phase = match altimeter.process(code).unwrap() {
            AltimeterOutput::Tracking { state: next, phase } => {
                state = next;
                phase
            }
            other => panic!("expected tracking, got {:?}", other),
        };
        if phases.last() != Some(&phase) {
            phases.push(phase);
        }
        highest = highest.max(state.position);
        worst = worst.max((state.position as f64 - height).abs());
    }

    let apogee = profile.iter().cloned().fold(f64::MIN, f64::max);
    assert!((highest as f64 - apogee).abs() < 20.0, "highest={} apogee={}", highest, apogee);
    assert!(worst < 30.0, "worst tracking error {}", worst);
    assert!(state.velocity < 0, "descending at end: {:?}", state);
    // still above the main deploy altitude when the profile ends
    assert_eq!(
        phases,
        [
            FlightPhase::Ready,
            FlightPhase::Boost,
            FlightPhase::Coast,
            FlightPhase::Descent
        ]
    );
}

#[test]
fn test_pad_noise_stays_near_zero() {
    let model = AtmosphereModel::STANDARD;
    let calibration = SensorCalibration::GZP6816D;
    let mut altimeter = Altimeter::<40>::new(
        AdcConverter::new(calibration).unwrap(),
        BarometricConverter::standard().unwrap(),
        reference_dividers(),
    );
    let mut rng = TestRng::new(7);
    let pressure = pressure_at(&model, 101_325.0, PAD_ALTITUDE);

    for i in 0..1000 {
        let code = code_for(&calibration, pressure + rng.noise(12) as f64);
        if let AltimeterOutput::Tracking { state, phase } = altimeter.process(code).unwrap() {
            assert!(state.position.abs() <= 10, "sample {}: {:?}", i, state);
            assert_eq!(phase, FlightPhase::Ready, "sample {}: {:?}", i, state);
        }
    }
}
