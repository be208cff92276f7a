use std::fmt;

/// Error raised when a float is, or would become, non-finite.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NumericFieldError {
    /// NaN or an infinity was encountered.
    #[error("non-finite float at {at}: {value}")]
    NonFinite {
        /// Location of the offending value (JSON path or operand label).
        at: String,
        /// Offending value.
        value: f64,
    },
    /// Decimal rounding produced a value outside the binary64 range.
    #[error("quantization overflow at {at}: {value}")]
    Overflow {
        /// JSON path of the float being quantized.
        at: String,
        /// Rounded decimal that failed to convert back.
        value: String,
    },
}

/// Returns `true` unless `x` is NaN or an infinity.
#[inline]
pub fn is_finite(x: f64) -> bool {
    x.is_finite()
}

/// Detects IEEE-754 negative zero.
#[inline]
pub fn is_negative_zero(x: f64) -> bool {
    x == 0.0 && x.is_sign_negative()
}

/// Rejects non-finite input and maps `-0.0` to `+0.0`.
pub fn normalize_float(x: f64) -> Result<f64, NumericFieldError> {
    normalize_at(x, "value")
}

pub(crate) fn normalize_at(x: f64, at: impl fmt::Display) -> Result<f64, NumericFieldError> {
    if !x.is_finite() {
        return Err(NumericFieldError::NonFinite {
            at: at.to_string(),
            value: x,
        });
    }
    if is_negative_zero(x) {
        return Ok(0.0);
    }
    Ok(x)
}

/// Neumaier compensated summation.
///
/// Tracks the low-order bits lost by each addition in a separate accumulator
/// and folds them back in at the end, which keeps results such as
/// `1e16 + 1 - 1e16` exact where naive summation returns `0`.
///
/// # Errors
///
/// Returns [`NumericFieldError::NonFinite`] if any term is NaN or infinite.
pub fn compensated_sum<I>(xs: I) -> Result<f64, NumericFieldError>
where
    I: IntoIterator<Item = f64>,
{
    let mut s = 0.0_f64;
    let mut c = 0.0_f64;
    for (idx, raw) in xs.into_iter().enumerate() {
        let x = normalize_at(raw, format_args!("sum term [{}]", idx))?;
        let t = s + x;
        if s.abs() >= x.abs() {
            c += (s - t) + x;
        } else {
            c += (x - t) + s;
        }
        s = t;
    }
    normalize_at(s + c, "sum")
}

/// Euclidean norm computed as `m * sqrt(sum((v_i / m)^2))` with `m = max |v_i|`.
///
/// Scaling keeps the squares in range for components near the limits of
/// binary64. Empty and all-zero vectors yield `0.0`.
///
/// # Errors
///
/// Returns [`NumericFieldError::NonFinite`] if any component is NaN or infinite.
pub fn scaled_norm2(v: &[f64]) -> Result<f64, NumericFieldError> {
    let mut m = 0.0_f64;
    for (idx, &raw) in v.iter().enumerate() {
        let x = normalize_at(raw, format_args!("vector entry [{}]", idx))?;
        m = m.max(x.abs());
    }
    if m == 0.0 {
        return Ok(0.0);
    }

    let inv = 1.0 / m;
    let squares = compensated_sum(v.iter().map(|&x| {
        let scaled = x * inv;
        scaled * scaled
    }))?;
    normalize_at(m * squares.sqrt(), "norm")
}
