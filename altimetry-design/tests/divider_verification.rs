//! Randomized divider synthesis checked by the exhaustive verifier

use altimetry_core::Divider;
use altimetry_design::{verify_divider, DividerCheck, InputRange};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn integer_divisors_verify_exactly(d in 1u32..=5_000, bits in 13u32..=16) {
        let divider = Divider::synthesize(d as f64, bits).unwrap();
        let check = verify_divider(&divider, d as f64, InputRange::Signed).unwrap();
        prop_assert!(check.exhaustive);
        prop_assert_eq!(check.rounded_up, 0);
    }

    #[test]
    fn filter_range_coefficients_verify(c in 0.001f64..4.0) {
        let divisor = 1.0 / c;
        let divider = Divider::synthesize(divisor, 16).unwrap();
        let check: DividerCheck = verify_divider(&divider, divisor, InputRange::Signed).unwrap();
        prop_assert_eq!(check.checked, 1 << 16);
    }

    #[test]
    fn wide_divisors_verify_on_stride(d in 2.0f64..1.0e6) {
        let divider = Divider::synthesize(d, 40).unwrap();
        let check = verify_divider(&divider, d, InputRange::Unsigned).unwrap();
        prop_assert!(!check.exhaustive);
    }
}
