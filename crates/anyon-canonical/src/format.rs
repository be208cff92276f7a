//! Decimal formatting and rounding of single floats under a [`NumericPolicy`].
//!
//! The same rounding decisions back both [`NumericPolicy::format_float`] (text)
//! and the quantizer (binary float), so a quantized float always prints as the
//! formatted string would.

use crate::decimal::ExactDecimal;
use crate::float::{normalize_at, NumericFieldError};
use crate::path::JsonPath;
use crate::policy::{FloatFormat, NumericPolicy};

/// Lower bound (inclusive) of the magnitudes `auto` renders in fixed point.
pub const AUTO_FIXED_MIN: f64 = 1e-4;
/// Upper bound (exclusive) of the magnitudes `auto` renders in fixed point.
pub const AUTO_FIXED_MAX: f64 = 1e6;

impl NumericPolicy {
    /// Renders `x` as text according to `fmt`, `precision` and `round_half`.
    ///
    /// ```rust
    /// use anyon_canonical::{FloatFormat, NumericPolicy, PolicySettings, RoundHalf};
    ///
    /// let policy = NumericPolicy::new(PolicySettings {
    ///     fmt: FloatFormat::Fixed,
    ///     precision: 1,
    ///     round_half: RoundHalf::Even,
    ///     ..Default::default()
    /// })?;
    /// assert_eq!(policy.format_float(1.25)?, "1.2");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`NumericFieldError`] for NaN or infinite input.
    pub fn format_float(&self, x: f64) -> Result<String, NumericFieldError> {
        let x = self.clip_at(x, "value")?;
        let exact = exact_at(x, "value")?;

        let text = match self.fmt() {
            FloatFormat::Fixed => exact.to_fixed(self.precision(), self.round_half()),
            FloatFormat::Scientific => self.format_scientific(&exact),
            FloatFormat::Auto => {
                if exact.is_zero() {
                    "0".to_string()
                } else if let Some(places) = self.auto_places(x, &exact) {
                    exact.to_fixed(places, self.round_half())
                } else {
                    self.format_scientific(&exact)
                }
            }
        };
        Ok(text)
    }

    /// Clips and rounds `x` to the decimal grid selected by the policy, then
    /// converts back to the nearest binary float.
    pub(crate) fn quantize_float(&self, x: f64, at: &JsonPath<'_>) -> Result<f64, NumericFieldError> {
        let x = self.clip_at(x, at)?;
        if x == 0.0 {
            return Ok(0.0);
        }
        let exact = exact_at(x, at)?;

        let rounded = match self.fmt() {
            FloatFormat::Fixed => exact.round_to_places(self.precision() as i64, self.round_half()),
            FloatFormat::Scientific => self.round_significant(&exact).0,
            FloatFormat::Auto => match self.auto_places(x, &exact) {
                Some(places) => exact.round_to_places(places as i64, self.round_half()),
                None => self.round_significant(&exact).0,
            },
        };

        let value = rounded.to_f64().ok_or_else(|| NumericFieldError::Overflow {
            at: at.to_string(),
            value: rounded.to_string(),
        })?;
        normalize_at(value, at)
    }

    /// Decimal places used by `auto` inside the fixed-point band, `None` outside it.
    fn auto_places(&self, x: f64, exact: &ExactDecimal) -> Option<u32> {
        if !(AUTO_FIXED_MIN..AUTO_FIXED_MAX).contains(&x.abs()) {
            return None;
        }
        let places = (self.precision() as i64 - 1 - exact.adjusted()).max(0);
        Some(places as u32)
    }

    /// Rounds the exact expansion to `precision` significant digits in one step.
    fn round_significant(&self, exact: &ExactDecimal) -> (ExactDecimal, i64) {
        exact.round_significant(self.precision(), self.round_half())
    }

    fn format_scientific(&self, exact: &ExactDecimal) -> String {
        if exact.is_zero() {
            return "0e+0".to_string();
        }
        let (mantissa, exponent) = self.round_significant(exact);
        let digits = mantissa.significant_digits();
        let (lead, rest) = digits.split_at(1);

        let mut out = String::with_capacity(digits.len() + 8);
        if mantissa.is_negative() {
            out.push('-');
        }
        out.push_str(lead);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push_str(&format!("e{:+}", exponent));
        out
    }
}

fn exact_at(x: f64, at: impl std::fmt::Display) -> Result<ExactDecimal, NumericFieldError> {
    ExactDecimal::from_f64(x).ok_or_else(|| NumericFieldError::NonFinite {
        at: at.to_string(),
        value: x,
    })
}
