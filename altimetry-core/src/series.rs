//! Truncated Series for Logarithm and Exponential
//!
//! ## Fixed-Point Layout
//!
//! ```text
//! Quantity        Type  Format   Range
//! --------------  ----  -------  ---------------------------
//! ratio, exp      u32   Q0.32    (0, 1], 1.0 wraps to 0
//! -ln(ratio)      u64   Q32.32   [0, ~22] for ratios > 2^-32
//! ```
//!
//! Every operand is non-negative, so all products are plain unsigned
//! `u32 × u32 -> u64` multiplies followed by a 32-bit shift.
//!
//! ## Logarithm
//!
//! For a ratio `r` in `(0, 1]`, with `y = 1 - r`:
//!
//! ```text
//! -ln(r) = -ln(1 - y) = Σ_{i=1..∞} y^i / i
//! ```
//!
//! All terms are positive, so the magnitude is accumulated and the caller
//! treats the result as negative.
//!
//! ## Exponential
//!
//! For `x >= 0`:
//!
//! ```text
//! exp(-x) = Σ_{i=0..∞} (-1)^i x^i / i!
//! ```
//!
//! The sign alternation is applied by adding even terms and subtracting odd
//! ones in wrapping arithmetic instead of multiplying signed fixed-point
//! values. The `i = 0` term is `1.0`, which is `0` modulo `2^32`, so the sum
//! starts at zero.

/// Term counts for the logarithm and exponential series.
///
/// Chosen offline as the cheapest pair that keeps the altitude error under
/// tolerance; see `altimetry_design::search`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesSpec {
    /// Terms summed in the logarithm series
    pub log_terms: u16,
    /// Terms summed in the exponential series, including the constant term
    pub exp_terms: u16,
}

impl SeriesSpec {
    /// Term counts that hold 3 m over 30-100 kPa against 101325 Pa.
    pub const REFERENCE: Self = Self::new(14, 4);

    /// Create a term-count pair
    pub const fn new(log_terms: u16, exp_terms: u16) -> Self {
        Self {
            log_terms,
            exp_terms,
        }
    }

    /// Multiplication cost proxy, `exp² + log²`
    pub const fn cost(&self) -> u32 {
        let log = self.log_terms as u32;
        let exp = self.exp_terms as u32;
        exp * exp + log * log
    }
}

impl Default for SeriesSpec {
    fn default() -> Self {
        Self::REFERENCE
    }
}

/// Magnitude of `ln(ratio)` for a Q0.32 ratio in `(0, 1]` (`1.0` is `0`).
///
/// Returns `Σ_{i=1..terms} (1 - ratio)^i / i` as Q32.32.
#[inline]
pub fn ln_approx(ratio: u32, terms: u16) -> u64 {
    let complement = ratio.wrapping_neg() as u64;
    let mut power = complement;
    let mut sum = 0u64;
    for i in 1..=terms as u64 {
        sum += power / i;
        power = (power * complement) >> 32;
    }
    sum
}

/// `exp(-x)` for a Q0.32 magnitude `x`, as Q0.32 with `1.0` wrapped to `0`.
///
/// Sums the first `terms` terms of the Taylor series. Factorials saturate,
/// and a saturated factorial contributes nothing.
#[inline]
pub fn exp_approx(x: u32, terms: u16) -> u32 {
    let x = x as u64;
    let mut power = x;
    let mut factorial = 1u64;
    let mut sum = 0u32;
    for i in 1..terms as u64 {
        factorial = factorial.saturating_mul(i);
        let term = (power / factorial) as u32;
        power = (power * x) >> 32;
        if i & 1 == 0 {
            sum = sum.wrapping_add(term);
        } else {
            sum = sum.wrapping_sub(term);
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: f64 = 4_294_967_296.0;

    fn to_q32(value: f64) -> u32 {
        (value * ONE) as u32
    }

    #[test]
    fn test_ln_of_one_is_zero() {
        assert_eq!(ln_approx(0, 20), 0);
    }

    #[test]
    fn test_ln_converges() {
        for &r in &[0.9, 0.75, 0.5] {
            let approx = ln_approx(to_q32(r), 40) as f64 / ONE;
            let exact = -libm::log(r);
            assert!((approx - exact).abs() < 1e-7, "r={} approx={} exact={}", r, approx, exact);
        }
    }

    #[test]
    fn test_ln_truncation_underestimates() {
        // every dropped term is positive
        let r = to_q32(0.3);
        let few = ln_approx(r, 5);
        let many = ln_approx(r, 30);
        assert!(few < many);
        assert!((many as f64 / ONE) <= -libm::log(0.3));
    }

    #[test]
    fn test_exp_converges() {
        for &x in &[0.01, 0.1, 0.25, 0.5] {
            let approx = exp_approx(to_q32(x), 10) as f64 / ONE;
            let exact = libm::exp(-x);
            assert!((approx - exact).abs() < 1e-8, "x={} approx={} exact={}", x, approx, exact);
        }
    }

    #[test]
    fn test_exp_of_zero_wraps_to_zero() {
        assert_eq!(exp_approx(0, 6), 0);
        assert_eq!(exp_approx(to_q32(0.2), 0), 0);
        assert_eq!(exp_approx(to_q32(0.2), 1), 0);
    }

    #[test]
    fn test_exp_two_terms_is_linear() {
        let x = to_q32(0.125);
        assert_eq!(exp_approx(x, 2), x.wrapping_neg());
    }

    #[test]
    fn test_exp_saturated_factorial_adds_nothing() {
        let x = to_q32(0.5);
        assert_eq!(exp_approx(x, 30), exp_approx(x, 40));
    }

    #[test]
    fn test_series_spec_cost() {
        assert_eq!(SeriesSpec::REFERENCE.cost(), 4 * 4 + 14 * 14);
        assert_eq!(SeriesSpec::new(0, 0).cost(), 0);
        assert_eq!(SeriesSpec::default(), SeriesSpec::REFERENCE);
    }
}
