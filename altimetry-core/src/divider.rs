//! Constant Division by Multiply-and-Shift
//!
//! ## Motivation
//!
//! The flight computer has no hardware divider and no FPU. Every division the
//! runtime needs is by a constant known when parameters are generated, so each
//! one is replaced by a multiplication with a precomputed "magic" number and a
//! couple of shifts (Granlund & Montgomery, "Division by Invariant Integers
//! using Multiplication", 1994).
//!
//! ## Algorithm
//!
//! For an `N`-bit numerator `n` and a divisor `d >= 1`:
//!
//! ```text
//! p  = ceil(log2 d)
//! m' = ceil(2^(N+p) / d)          (an N+1 bit number, 2^N <= m' <= 2^(N+1))
//! m  = m' - 2^N                    (stored multiplier, fits N bits)
//!
//! q  = (m · n) >> N
//! t  = (((n - q) >> 1) + q) >> (p - 1)      = floor(n · m' / 2^(N+p))
//! ```
//!
//! The `(n - q) >> 1` step keeps the implicit top bit of `m'` from overflowing
//! the `N`-bit register. For integer `d` the result equals `floor(n / d)` for
//! every `n < 2^N`. For a non-integer `d` the result is `floor(n / d)`, or one
//! more when `n / d` lies within `2^-p` of the next integer.
//!
//! Divisors below one (multiplication by a constant greater than one) are
//! doubled `k` times until they reach one; the numerator is then shifted left
//! by `k` before the multiply, which costs `k` extra bits of register width.
//!
//! ## Signed Inputs
//!
//! Signed division truncates toward zero like two's-complement `/`. The
//! magnitude is divided and the sign restored, which is the integer form of
//! the usual `n + d - 1` correction applied before an arithmetic shift.
//!
//! ```rust
//! use altimetry_core::Divider;
//!
//! let by_seven = Divider::synthesize(7.0, 16)?;
//! assert_eq!(by_seven.divide(1000), 142);
//! assert_eq!(by_seven.divide_signed(-1000), -142);
//! # Ok::<(), altimetry_core::AltimetryError>(())
//! ```

use crate::errors::{AltimetryError, AltimetryResult};

/// Multiply-shift replacement for division by a build-time constant.
///
/// Created once by [`Divider::synthesize`] (or embedded by generated code via
/// [`Divider::from_parts`]) and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Divider {
    multiplier: u64,
    shift: u32,
    prescale: u32,
    bits: u32,
}

impl Divider {
    /// Rebuild a divider from previously synthesized parts.
    ///
    /// No validation happens here; parts must come from [`Divider::synthesize`].
    pub const fn from_parts(multiplier: u64, shift: u32, prescale: u32, bits: u32) -> Self {
        Self {
            multiplier,
            shift,
            prescale,
            bits,
        }
    }

    /// Synthesize a divider for `divisor` with `bits`-wide unsigned inputs.
    ///
    /// The magic number is computed exactly from the binary expansion of
    /// `divisor`, so the same `f64` always yields the same divider.
    pub fn synthesize(divisor: f64, bits: u32) -> AltimetryResult<Self> {
        let (mantissa, mut exponent) =
            dyadic_parts(divisor).ok_or(AltimetryError::InvalidDivisor { divisor })?;
        if bits == 0 || bits > 64 {
            return Err(AltimetryError::UnsupportedWidth { bits, divisor });
        }

        // divisor lies in [2^(len-1+exponent), 2^(len+exponent))
        let len = 64 - mantissa.leading_zeros() as i32;
        let prescale = (1 - len - exponent).max(0) as u32;
        exponent += prescale as i32;

        let width = bits + prescale;
        if width > 64 {
            return Err(AltimetryError::UnsupportedWidth { bits, divisor });
        }

        let power_of_two = mantissa == 1;
        let shift = if power_of_two { exponent } else { len + exponent } as u32;
        if shift > width {
            return Err(AltimetryError::UnsupportedWidth { bits, divisor });
        }

        // m' = ceil(2^(width+shift) / (mantissa * 2^exponent))
        let scale = (width as i32 + shift as i32 - exponent) as u32;
        let numerator = 1u128 << scale;
        let mantissa = mantissa as u128;
        let magic = (numerator + mantissa - 1) / mantissa;

        let implicit = 1u128 << width;
        let (multiplier, shift) = if magic >= implicit << 1 {
            (0, shift - 1)
        } else {
            ((magic - implicit) as u64, shift)
        };

        log_debug!(
            "divider for {}: multiplier={:#x} shift={} prescale={} bits={}",
            divisor,
            multiplier,
            shift,
            prescale,
            bits
        );

        Ok(Self {
            multiplier,
            shift,
            prescale,
            bits,
        })
    }

    /// Stored multiplier, the low `bits + prescale` bits of `m'`
    pub const fn multiplier(&self) -> u64 {
        self.multiplier
    }

    /// Final shift `p`
    pub const fn shift(&self) -> u32 {
        self.shift
    }

    /// Number of doublings applied to a divisor below one
    pub const fn prescale(&self) -> u32 {
        self.prescale
    }

    /// Declared input width
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Largest accepted input magnitude
    pub const fn input_limit(&self) -> u64 {
        if self.bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }

    /// Effective divisor `2^(N+p) / m'`, for diagnostics.
    pub fn divisor_estimate(&self) -> f64 {
        let width = self.bits + self.prescale;
        let magic = self.multiplier as f64 + libm::ldexp(1.0, width as i32);
        libm::ldexp(1.0, (width + self.shift) as i32 - self.prescale as i32) / magic
    }

    /// Divide an unsigned value, `n < 2^bits`.
    #[inline]
    pub fn divide(&self, n: u64) -> u64 {
        debug_assert!(
            n <= self.input_limit(),
            "divider input {} exceeds {} bits",
            n,
            self.bits
        );
        let n = n << self.prescale;
        if self.shift == 0 {
            return n;
        }
        let q = self.high_product(n);
        let t = ((n - q) >> 1) + q;
        t >> (self.shift - 1)
    }

    /// `(m * n) >> N` for a pre-scaled `n < 2^N`
    #[inline]
    fn high_product(&self, n: u64) -> u64 {
        let width = self.bits + self.prescale;
        if width <= 32 {
            // both factors are below 2^32
            (self.multiplier * n) >> width
        } else {
            ((self.multiplier as u128 * n as u128) >> width) as u64
        }
    }

    /// Divide a signed value, truncating toward zero, `|n| < 2^bits`.
    #[inline]
    pub fn divide_signed(&self, n: i64) -> i64 {
        let magnitude = self.divide(n.unsigned_abs()) as i64;
        if n < 0 {
            magnitude.wrapping_neg()
        } else {
            magnitude
        }
    }
}

/// Split a finite positive `f64` into `(mantissa, exponent)` with an odd
/// mantissa and `value == mantissa * 2^exponent` exactly.
///
/// Returns `None` for zero, negative, NaN and infinite values.
pub fn dyadic_parts(value: f64) -> Option<(u64, i32)> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    let raw = value.to_bits();
    let biased = ((raw >> 52) & 0x7ff) as i32;
    let fraction = raw & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    let zeros = mantissa.trailing_zeros();
    Some((mantissa >> zeros, exponent + zeros as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// floor(n / d) computed exactly from the dyadic expansion of d
    fn exact_floor(n: u64, d: f64) -> u64 {
        let (mantissa, exponent) = dyadic_parts(d).unwrap();
        if exponent >= 0 {
            ((n as u128) / ((mantissa as u128) << exponent)) as u64
        } else {
            (((n as u128) << (-exponent) as u32) / mantissa as u128) as u64
        }
    }

    /// `(m * n) >> N` always in 128 bits
    fn wide_product(divider: &Divider, n: u64) -> u64 {
        let width = divider.bits() + divider.prescale();
        ((divider.multiplier() as u128 * n as u128) >> width) as u64
    }

    #[test]
    fn test_narrow_product_matches_wide() {
        let dividers = [
            Divider::from_parts(0x7a71, 10, 0, 16),
            Divider::from_parts(0x1dddf, 1, 1, 16),
            Divider::from_parts(0x1124a, 1, 1, 16),
            Divider::synthesize(0.3, 30).unwrap(),
            Divider::synthesize(12.5, 31).unwrap(),
            Divider::from_parts(0x5a5589d9, 17, 0, 32),
            Divider::from_parts(0x86a00187, 8, 0, 32),
        ];
        for divider in dividers {
            let width = divider.bits() + divider.prescale();
            assert!(width <= 32);
            let top = (1u64 << width) - 1;
            let step = (top / 4093).max(1);
            for n in (0..=top).step_by(step as usize).chain([top]) {
                assert_eq!(divider.high_product(n), wide_product(&divider, n), "{:?} n={}", divider, n);
            }
        }
    }

    #[test]
    fn test_dyadic_parts() {
        assert_eq!(dyadic_parts(1.0), Some((1, 0)));
        assert_eq!(dyadic_parts(6.0), Some((3, 1)));
        assert_eq!(dyadic_parts(0.375), Some((3, -3)));
        assert_eq!(dyadic_parts(0.0), None);
        assert_eq!(dyadic_parts(-2.0), None);
        assert_eq!(dyadic_parts(f64::NAN), None);
        assert_eq!(dyadic_parts(f64::INFINITY), None);
    }

    #[test]
    fn test_integer_divisors_exhaustive_u16() {
        for d in 1..=200u64 {
            let divider = Divider::synthesize(d as f64, 16).unwrap();
            for n in 0..=u16::MAX as u64 {
                assert_eq!(divider.divide(n), n / d, "n={} d={}", n, d);
            }
        }
    }

    #[test]
    fn test_integer_divisors_exhaustive_i16() {
        for d in 1..=100i64 {
            let divider = Divider::synthesize(d as f64, 16).unwrap();
            for n in i16::MIN as i64..=i16::MAX as i64 {
                assert_eq!(divider.divide_signed(n), n / d, "n={} d={}", n, d);
            }
        }
    }

    #[test]
    fn test_large_integer_divisors() {
        for d in [1000u64, 4096, 32767, 32768, 65535] {
            let divider = Divider::synthesize(d as f64, 16).unwrap();
            for n in (0..=u16::MAX as u64).step_by(3) {
                assert_eq!(divider.divide(n), n / d, "n={} d={}", n, d);
            }
        }
    }

    #[test]
    fn test_power_of_two_is_plain_shift() {
        let divider = Divider::synthesize(64.0, 16).unwrap();
        assert_eq!(divider.multiplier(), 0);
        assert_eq!(divider.shift(), 6);
        assert_eq!(divider.divide(1000), 1000 >> 6);

        let identity = Divider::synthesize(1.0, 16).unwrap();
        assert_eq!(identity.shift(), 0);
        assert_eq!(identity.divide(12345), 12345);
    }

    #[test]
    fn test_divisor_below_one_scales_up() {
        let times_four = Divider::synthesize(0.25, 16).unwrap();
        assert_eq!(times_four.prescale(), 2);
        assert_eq!(times_four.divide(1000), 4000);
        assert_eq!(times_four.divide_signed(-1000), -4000);

        // multiply by ~1.93 as in the filter velocity update
        let d = 1.0 / 1.933_337_105;
        let divider = Divider::synthesize(d, 16).unwrap();
        assert_eq!(divider.prescale(), 1);
        for n in 0..=u16::MAX as u64 {
            let expected = exact_floor(n, d);
            let actual = divider.divide(n);
            assert!(actual == expected || actual == expected + 1, "n={}", n);
        }
    }

    #[test]
    fn test_rational_divisor_within_one_unit() {
        for &d in &[5.25588, 167.772_155, 96_879.6, 1.083_33, 1.000_1] {
            let divider = Divider::synthesize(d, 32).unwrap();
            for n in (0..=u32::MAX as u64).step_by(65_521) {
                let expected = exact_floor(n, d);
                let actual = divider.divide(n);
                assert!(
                    actual == expected || actual == expected + 1,
                    "d={} n={} expected={} actual={}",
                    d,
                    n,
                    expected,
                    actual
                );
            }
        }
    }

    #[test]
    fn test_sixty_four_bit_width() {
        let divider = Divider::synthesize(101_325.0, 64).unwrap();
        for n in [0u64, 1, 101_324, 101_325, 1 << 40, u64::MAX / 3, u64::MAX] {
            assert_eq!(divider.divide(n), n / 101_325, "n={}", n);
        }
    }

    #[test]
    fn test_rejects_invalid_divisors() {
        assert!(matches!(
            Divider::synthesize(0.0, 16),
            Err(AltimetryError::InvalidDivisor { .. })
        ));
        assert!(matches!(
            Divider::synthesize(-7.0, 16),
            Err(AltimetryError::InvalidDivisor { .. })
        ));
        assert!(matches!(
            Divider::synthesize(f64::NAN, 16),
            Err(AltimetryError::InvalidDivisor { .. })
        ));
        assert!(matches!(
            Divider::synthesize(3.0, 0),
            Err(AltimetryError::UnsupportedWidth { .. })
        ));
        assert!(matches!(
            Divider::synthesize(3.0, 65),
            Err(AltimetryError::UnsupportedWidth { .. })
        ));
        assert!(matches!(
            Divider::synthesize(1.0e9, 16),
            Err(AltimetryError::UnsupportedWidth { .. })
        ));
        // 64-bit input cannot be widened for a prescale
        assert!(matches!(
            Divider::synthesize(0.5, 64),
            Err(AltimetryError::UnsupportedWidth { .. })
        ));
    }

    #[test]
    fn test_from_parts_round_trips() {
        let divider = Divider::synthesize(13.0, 16).unwrap();
        let rebuilt = Divider::from_parts(
            divider.multiplier(),
            divider.shift(),
            divider.prescale(),
            divider.bits(),
        );
        assert_eq!(divider, rebuilt);
    }

    #[test]
    fn test_divisor_estimate() {
        let divider = Divider::synthesize(5.25588, 32).unwrap();
        assert!((divider.divisor_estimate() - 5.25588).abs() < 1e-6);

        let divider = Divider::synthesize(0.1, 16).unwrap();
        assert!((divider.divisor_estimate() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let a = Divider::synthesize(96_879.6, 32).unwrap();
        let b = Divider::synthesize(96_879.6, 32).unwrap();
        assert_eq!(a, b);
    }
}
