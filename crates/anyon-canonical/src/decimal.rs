//! Exact decimal view of binary64 values and the rounding primitive built on it.
//!
//! Every finite `f64` is a dyadic rational `m * 2^e`, which always has a finite
//! decimal expansion (`m * 5^k / 10^k` when `e = -k`). Rounding is performed on
//! that expansion, so a tie is a tie only when the float really sits halfway
//! between two decimals.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::policy::RoundHalf;

const MANTISSA_BITS: u32 = 52;
const EXPONENT_BIAS: i64 = 1075;

/// A signed decimal `coefficient * 10^(-scale)` with an arbitrary-precision coefficient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactDecimal {
    negative: bool,
    coefficient: BigUint,
    scale: i64,
}

impl ExactDecimal {
    /// Exact decimal expansion of a finite float. Returns `None` for NaN and infinities.
    pub fn from_f64(x: f64) -> Option<Self> {
        if !x.is_finite() {
            return None;
        }
        let bits = x.to_bits();
        let negative = bits >> 63 == 1;
        let exp_bits = ((bits >> MANTISSA_BITS) & 0x7ff) as i64;
        let fraction = bits & ((1u64 << MANTISSA_BITS) - 1);

        let (mut mantissa, mut exponent) = if exp_bits == 0 {
            (fraction, 1 - EXPONENT_BIAS)
        } else {
            (fraction | (1u64 << MANTISSA_BITS), exp_bits - EXPONENT_BIAS)
        };

        if mantissa == 0 {
            return Some(Self {
                negative,
                coefficient: BigUint::zero(),
                scale: 0,
            });
        }

        let trailing = mantissa.trailing_zeros() as i64;
        if exponent < 0 {
            let strip = trailing.min(-exponent);
            mantissa >>= strip;
            exponent += strip;
        }

        let coefficient = BigUint::from(mantissa);
        let decimal = if exponent >= 0 {
            Self {
                negative,
                coefficient: coefficient << (exponent as u64),
                scale: 0,
            }
        } else {
            let k = -exponent;
            Self {
                negative,
                coefficient: coefficient * BigUint::from(5u32).pow(k as u32),
                scale: k,
            }
        };
        Some(decimal)
    }

    /// True when the value is zero (of either sign).
    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    /// True when the value is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.negative && !self.is_zero()
    }

    /// Decimal exponent of the most significant digit, i.e. `floor(log10(|x|))`.
    ///
    /// Zero reports `0`.
    pub fn adjusted(&self) -> i64 {
        if self.is_zero() {
            return 0;
        }
        digit_count(&self.coefficient) - 1 - self.scale
    }

    /// Rounds to a multiple of `10^(-places)`; `places` may be negative.
    ///
    /// Values that already fit are returned unchanged.
    pub fn round_to_places(&self, places: i64, mode: RoundHalf) -> Self {
        if self.scale <= places {
            return self.clone();
        }
        let divisor = pow10((self.scale - places) as u64);
        let mut quotient = &self.coefficient / &divisor;
        let remainder = &self.coefficient % &divisor;

        let round_up = match (remainder << 1u32).cmp(&divisor) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match mode {
                RoundHalf::Even => is_odd(&quotient),
                RoundHalf::Away => true,
            },
        };
        if round_up {
            quotient += BigUint::one();
        }

        let negative = self.negative && !quotient.is_zero();
        Self {
            negative,
            coefficient: quotient,
            scale: places,
        }
    }

    /// Rounds to `digits` significant digits.
    ///
    /// Returns the rounded value and its decimal exponent. When rounding
    /// carries into a new leading digit (`9.99…` becoming `10`), the exponent
    /// is shifted up by one so the mantissa stays in `[1, 10)`.
    pub fn round_significant(&self, digits: u32, mode: RoundHalf) -> (Self, i64) {
        let mut exponent = self.adjusted();
        let rounded = self.round_to_places(digits as i64 - 1 - exponent, mode);
        if rounded.is_zero() {
            return (rounded, 0);
        }
        if rounded.adjusted() > exponent {
            exponent += 1;
        }
        (rounded, exponent)
    }

    /// Formats with exactly `places` digits after the decimal point.
    ///
    /// The value is rounded first; a result of zero never carries a sign.
    pub fn to_fixed(&self, places: u32, mode: RoundHalf) -> String {
        let rounded = self.round_to_places(places as i64, mode);
        let widened = &rounded.coefficient * pow10((places as i64 - rounded.scale) as u64);
        let mut digits = widened.to_string();

        let places = places as usize;
        if places > 0 {
            if digits.len() <= places {
                let pad = places + 1 - digits.len();
                digits.insert_str(0, &"0".repeat(pad));
            }
            digits.insert(digits.len() - places, '.');
        }
        if rounded.is_negative() {
            digits.insert(0, '-');
        }
        digits
    }

    /// Significant digits with trailing zeros removed (`"0"` for zero).
    pub fn significant_digits(&self) -> String {
        let digits = self.coefficient.to_string();
        let trimmed = digits.trim_end_matches('0');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Nearest binary64 value, or `None` if it lies outside the finite range.
    pub fn to_f64(&self) -> Option<f64> {
        self.to_string()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

impl fmt::Display for ExactDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}{}e{}", sign, self.coefficient, -self.scale)
    }
}

fn pow10(exp: u64) -> BigUint {
    BigUint::from(10u32).pow(exp as u32)
}

fn is_odd(value: &BigUint) -> bool {
    value.bit(0)
}

fn digit_count(value: &BigUint) -> i64 {
    value.to_string().len() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(x: f64) -> ExactDecimal {
        ExactDecimal::from_f64(x).unwrap()
    }

    #[test]
    fn expansion_is_exact() {
        assert_eq!(
            exact(0.1).to_fixed(55, RoundHalf::Even),
            "0.1000000000000000055511151231257827021181583404541015625"
        );
        assert_eq!(exact(1.25).to_fixed(2, RoundHalf::Even), "1.25");
        assert_eq!(exact(1e16).to_fixed(0, RoundHalf::Even), "10000000000000000");
        assert!(ExactDecimal::from_f64(f64::NAN).is_none());
        assert!(ExactDecimal::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn subnormals_expand() {
        let tiny = exact(f64::from_bits(1));
        assert_eq!(tiny.adjusted(), -324);
        assert_eq!(tiny.to_f64(), Some(f64::from_bits(1)));
    }

    #[test]
    fn adjusted_matches_floor_log10() {
        assert_eq!(exact(1.0).adjusted(), 0);
        assert_eq!(exact(9.99).adjusted(), 0);
        assert_eq!(exact(10.0).adjusted(), 1);
        assert_eq!(exact(0.001).adjusted(), -3);
        assert_eq!(exact(123456.0).adjusted(), 5);
        assert_eq!(exact(0.0).adjusted(), 0);
    }

    #[test]
    fn exact_ties_follow_mode() {
        assert_eq!(exact(1.25).to_fixed(1, RoundHalf::Even), "1.2");
        assert_eq!(exact(1.25).to_fixed(1, RoundHalf::Away), "1.3");
        assert_eq!(exact(-1.25).to_fixed(1, RoundHalf::Even), "-1.2");
        assert_eq!(exact(-1.25).to_fixed(1, RoundHalf::Away), "-1.3");
        assert_eq!(exact(2.5).to_fixed(0, RoundHalf::Even), "2");
        assert_eq!(exact(3.5).to_fixed(0, RoundHalf::Even), "4");
        assert_eq!(exact(2.5).to_fixed(0, RoundHalf::Away), "3");
        assert_eq!(exact(0.125).to_fixed(2, RoundHalf::Even), "0.12");
        assert_eq!(exact(0.125).to_fixed(2, RoundHalf::Away), "0.13");
    }

    #[test]
    fn near_ties_are_not_ties() {
        // 0.35 and 2.675 sit just below the midpoint in binary.
        assert_eq!(exact(0.35).to_fixed(1, RoundHalf::Away), "0.3");
        assert_eq!(exact(2.675).to_fixed(2, RoundHalf::Away), "2.67");
        // 1.9995 sits just above it.
        assert_eq!(exact(1.9995).to_fixed(3, RoundHalf::Even), "2.000");
    }

    #[test]
    fn zero_results_drop_sign() {
        assert_eq!(exact(-0.0004).to_fixed(3, RoundHalf::Even), "0.000");
        assert_eq!(exact(-0.0).to_fixed(2, RoundHalf::Even), "0.00");
        assert_eq!(exact(0.04).to_fixed(1, RoundHalf::Even), "0.0");
    }

    #[test]
    fn negative_places_round_integers() {
        let rounded = exact(1234567.0).round_to_places(-4, RoundHalf::Even);
        assert_eq!(rounded.to_f64(), Some(1230000.0));
        let tie = exact(125.0).round_to_places(-1, RoundHalf::Even);
        assert_eq!(tie.to_f64(), Some(120.0));
    }

    #[test]
    fn significant_rounding_carries_into_exponent() {
        let (m, e) = exact(9.9999996).round_significant(6, RoundHalf::Even);
        assert_eq!(e, 1);
        assert_eq!(m.significant_digits(), "1");
        assert_eq!(m.to_f64(), Some(10.0));

        let (m, e) = exact(9.99999949).round_significant(7, RoundHalf::Away);
        assert_eq!(e, 0);
        assert_eq!(m.significant_digits(), "9999999");
    }

    #[test]
    fn significant_rounding_uses_exact_expansion() {
        // 1.2345 is 1.23449999… in binary, so it is not a tie.
        let (m, _) = exact(1.2345).round_significant(4, RoundHalf::Away);
        assert_eq!(m.significant_digits(), "1234");

        // 999999.9999995 is 999999.99999949999…, so twelve digits round down.
        let (m, e) = exact(999999.9999995).round_significant(12, RoundHalf::Even);
        assert_eq!(e, 5);
        assert_eq!(m.significant_digits(), "999999999999");
        let (m, _) = exact(9.9999995).round_significant(6, RoundHalf::Away);
        assert_eq!(m.significant_digits(), "999999");
    }

    #[test]
    fn significant_rounding_small_values() {
        let (m, e) = exact(3.21e-9).round_significant(4, RoundHalf::Even);
        assert_eq!(e, -9);
        assert_eq!(m.significant_digits(), "321");
        assert_eq!(m.to_f64(), Some(3.21e-9));
    }

    #[test]
    fn overflow_is_reported_as_none() {
        let (rounded, e) = exact(f64::MAX).round_significant(1, RoundHalf::Even);
        assert_eq!(e, 308);
        assert_eq!(rounded.to_f64(), None);
    }
}
