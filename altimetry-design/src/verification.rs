//! Exhaustive divider verification
//!
//! Every divider embedded in firmware is checked against the exact quotient
//! before it is emitted. Widths up to [`EXHAUSTIVE_BITS`] are enumerated in
//! full; wider dividers are checked on a deterministic stride plus the
//! inputs either side of each quotient step, where a bad multiplier fails
//! first.
//!
//! Expected quotients come from the exact dyadic expansion of the divisor,
//! never from floating division. The exhaustive walk steps the expected
//! quotient at each exact boundary, so a 32-bit divider costs one divider
//! application per input.

use altimetry_core::{divider::dyadic_parts, Divider};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, DesignResult};

/// Widest divider checked input by input
pub const EXHAUSTIVE_BITS: u32 = 32;

/// Sample count for wider dividers
pub const STRIDE_SAMPLES: u64 = 1 << 20;

/// Input domain to verify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputRange {
    /// `0 ..= 2^bits - 1` through [`Divider::divide`]
    Unsigned,
    /// `-(2^bits - 1) ..= 2^bits - 1` through [`Divider::divide_signed`]
    Signed,
}

/// Outcome of a successful verification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividerCheck {
    /// Inputs evaluated
    pub checked: u64,
    /// Inputs whose magnitude came out one above `floor(|n|/d)`
    pub rounded_up: u64,
    /// Whether every representable input was evaluated
    pub exhaustive: bool,
}

/// Exact `floor(n / d)` for the dyadic `d = mantissa·2^exponent`
#[derive(Debug, Clone, Copy)]
struct ExactDivisor {
    mantissa: u128,
    exponent: i32,
    integral: bool,
}

impl ExactDivisor {
    fn new(divisor: f64, bits: u32) -> DesignResult<Self> {
        let (mantissa, exponent) = dyadic_parts(divisor).ok_or(DesignError::Core(
            altimetry_core::AltimetryError::InvalidDivisor { divisor },
        ))?;
        // n << -exponent must fit in u128
        if exponent < 0 && bits as i64 - exponent as i64 > 127 {
            return Err(DesignError::InvalidModel(format!(
                "divisor {} too fine to verify at {} bits",
                divisor, bits
            )));
        }
        if exponent > 64 {
            return Err(DesignError::InvalidModel(format!(
                "divisor {} too large to verify",
                divisor
            )));
        }
        Ok(Self {
            mantissa: mantissa as u128,
            exponent,
            integral: exponent >= 0,
        })
    }

    /// `(numerator, denominator)` with `n / d == numerator / denominator`
    fn fraction(&self, n: u64) -> (u128, u128) {
        if self.exponent >= 0 {
            (n as u128, self.mantissa << self.exponent)
        } else {
            ((n as u128) << (-self.exponent) as u32, self.mantissa)
        }
    }

    fn floor(&self, n: u64) -> u64 {
        let (num, den) = self.fraction(n);
        (num / den) as u64
    }

    /// Smallest input whose quotient is `q`, if representable
    fn first_with_quotient(&self, q: u64) -> Option<u64> {
        // ceil(q·d)
        let q = q as u128;
        let value = if self.exponent >= 0 {
            q.checked_mul(self.mantissa << self.exponent)?
        } else {
            let scaled = q.checked_mul(self.mantissa)?;
            let unit = 1u128 << (-self.exponent) as u32;
            scaled.div_ceil(unit)
        };
        u64::try_from(value).ok()
    }
}

/// Check `divider` against exact division by `divisor` over `range`,
/// enumerating every input up to [`EXHAUSTIVE_BITS`].
///
/// Integer divisors must match `n / d` exactly. Non-integer divisors may
/// return one more than `floor(|n|/d)`, never less and never more.
pub fn verify_divider(
    divider: &Divider,
    divisor: f64,
    range: InputRange,
) -> DesignResult<DividerCheck> {
    verify_divider_within(divider, divisor, range, EXHAUSTIVE_BITS)
}

/// [`verify_divider`] with an explicit exhaustive width limit
pub fn verify_divider_within(
    divider: &Divider,
    divisor: f64,
    range: InputRange,
    exhaustive_bits: u32,
) -> DesignResult<DividerCheck> {
    let bits = divider.bits();
    let exact = ExactDivisor::new(divisor, bits)?;
    let limit = divider.input_limit();
    if range == InputRange::Signed && limit > i64::MAX as u64 {
        return Err(DesignError::InvalidModel(format!(
            "signed verification needs at most 63 bits, divider has {}",
            bits
        )));
    }
    let exhaustive = bits <= exhaustive_bits;
    let mut check = DividerCheck {
        exhaustive,
        ..DividerCheck::default()
    };

    let mut verify = |n: u64, expected: u64| -> DesignResult<()> {
        let (actual, signed_n) = match range {
            InputRange::Unsigned => (divider.divide(n), n as i64),
            InputRange::Signed => {
                let positive = divider.divide_signed(n as i64);
                let negated = divider.divide_signed(-(n as i64));
                if negated != -positive {
                    return Err(mismatch(divisor, -(n as i64), -(expected as i64), negated));
                }
                (positive as u64, n as i64)
            }
        };
        check.checked += 1;
        if actual == expected {
            return Ok(());
        }
        if !exact.integral && actual == expected + 1 {
            check.rounded_up += 1;
            return Ok(());
        }
        Err(mismatch(divisor, signed_n, expected as i64, actual as i64))
    };

    if exhaustive {
        let mut quotient = 0u64;
        let mut next_edge = exact.first_with_quotient(1);
        for n in 0..=limit {
            while matches!(next_edge, Some(edge) if edge <= n) {
                quotient += 1;
                next_edge = exact.first_with_quotient(quotient + 1);
            }
            verify(n, quotient)?;
        }
    } else {
        let step = (limit / STRIDE_SAMPLES).max(1);
        let mut n = 0u64;
        loop {
            let quotient = exact.floor(n);
            verify(n, quotient)?;
            if let Some(edge) = exact.first_with_quotient(quotient + 1) {
                for candidate in [edge.saturating_sub(1), edge] {
                    if candidate <= limit {
                        verify(candidate, exact.floor(candidate))?;
                    }
                }
            }
            match n.checked_add(step) {
                Some(next) if next <= limit => n = next,
                _ => break,
            }
        }
        verify(limit, exact.floor(limit))?;
    }

    debug!(
        "divider for {} verified over {} inputs ({} rounded up, exhaustive={})",
        divisor, check.checked, check.rounded_up, check.exhaustive
    );
    Ok(check)
}

fn mismatch(divisor: f64, n: i64, expected: i64, actual: i64) -> DesignError {
    DesignError::DividerMismatch {
        divisor,
        n,
        expected,
        actual,
    }
}
