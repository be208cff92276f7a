use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::float::{normalize_at, NumericFieldError};
use crate::path::JsonPath;
use crate::value::{cmp_numbers, Value};

/// Largest accepted precision: enough decimal places to hold the exact
/// expansion of any binary64 value (the smallest subnormal is `2^-1074`).
pub const MAX_PRECISION: i64 = 1074;

/// Error returned when a numeric policy is constructed with an out-of-range field.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// A field failed validation.
    #[error("invalid numeric policy: {field} = {value:?} ({reason})")]
    InvalidPolicy {
        /// Name of the offending field.
        field: &'static str,
        /// Offending value, rendered as text.
        value: String,
        /// What the field must satisfy.
        reason: &'static str,
    },
}

impl PolicyError {
    pub(crate) fn invalid(field: &'static str, value: impl fmt::Display, reason: &'static str) -> Self {
        PolicyError::InvalidPolicy {
            field,
            value: value.to_string(),
            reason,
        }
    }
}

/// Numeric backend. Only binary64 floats are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericMode {
    /// IEEE-754 binary64.
    #[default]
    Float,
}

/// How floats are rendered and rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatFormat {
    /// Fixed-point in `[1e-4, 1e6)`, scientific elsewhere.
    #[default]
    Auto,
    /// Exactly `precision` decimal places.
    Fixed,
    /// `precision` significant digits with a decimal exponent.
    Scientific,
}

/// Tie-break rule for values exactly halfway between two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundHalf {
    /// Round half to even (banker's rounding).
    #[default]
    Even,
    /// Round half away from zero.
    Away,
}

macro_rules! keyword_enum {
    ($name:ident, $field:literal, $reason:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Configuration keyword for this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = PolicyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(PolicyError::invalid($field, other, $reason)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum!(NumericMode, "mode", "only 'float' is supported", { Float => "float" });
keyword_enum!(FloatFormat, "fmt", "must be 'auto', 'fixed' or 'scientific'", {
    Auto => "auto",
    Fixed => "fixed",
    Scientific => "scientific",
});
keyword_enum!(RoundHalf, "round_half", "must be 'even' or 'away'", {
    Even => "even",
    Away => "away",
});

/// Unvalidated inputs for [`NumericPolicy::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Numeric backend.
    pub mode: NumericMode,
    /// Absolute tolerance (finite, `>= 0`).
    pub tol_abs: f64,
    /// Relative tolerance (finite, `>= 0`).
    pub tol_rel: f64,
    /// Output format.
    pub fmt: FloatFormat,
    /// Significant digits (`auto`/`scientific`) or decimal places (`fixed`);
    /// in `1..=MAX_PRECISION`.
    pub precision: i64,
    /// Tie-break rule.
    pub round_half: RoundHalf,
    /// Sort flat numeric arrays.
    pub array_reorder: bool,
    /// Snap magnitudes below `10^-(precision+1)` to zero.
    pub clip_small: bool,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            mode: NumericMode::Float,
            tol_abs: 1e-10,
            tol_rel: 1e-10,
            fmt: FloatFormat::Auto,
            precision: 12,
            round_half: RoundHalf::Even,
            array_reorder: false,
            clip_small: true,
        }
    }
}

/// Immutable numeric configuration shared by the quantizer, formatter and
/// tolerant comparisons.
///
/// Instances only come out of [`NumericPolicy::new`] (or `Default`), so every
/// policy in circulation satisfies the field invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericPolicy {
    mode: NumericMode,
    tol_abs: f64,
    tol_rel: f64,
    fmt: FloatFormat,
    precision: u32,
    round_half: RoundHalf,
    array_reorder: bool,
    clip_small: bool,
}

/// Flat, serializable view of a policy for provenance records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicySnapshot {
    /// Numeric backend.
    pub mode: NumericMode,
    /// Absolute tolerance.
    pub tol_abs: f64,
    /// Relative tolerance.
    pub tol_rel: f64,
    /// Output format.
    pub fmt: FloatFormat,
    /// Precision.
    pub precision: u32,
    /// Tie-break rule.
    pub round_half: RoundHalf,
    /// Flat numeric array reordering.
    pub array_reorder: bool,
    /// Small-magnitude clipping.
    pub clip_small: bool,
}

impl NumericPolicy {
    /// Validates `settings` and freezes them into a policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidPolicy`] naming the first offending field.
    pub fn new(settings: PolicySettings) -> Result<Self, PolicyError> {
        if settings.precision <= 0 {
            return Err(PolicyError::invalid(
                "precision",
                settings.precision,
                "must be positive",
            ));
        }
        if settings.precision > MAX_PRECISION {
            return Err(PolicyError::invalid(
                "precision",
                settings.precision,
                "must be at most 1074",
            ));
        }
        let precision = settings.precision as u32;
        if !(settings.tol_abs.is_finite() && settings.tol_abs >= 0.0) {
            return Err(PolicyError::invalid(
                "tol_abs",
                settings.tol_abs,
                "must be finite and >= 0",
            ));
        }
        if !(settings.tol_rel.is_finite() && settings.tol_rel >= 0.0) {
            return Err(PolicyError::invalid(
                "tol_rel",
                settings.tol_rel,
                "must be finite and >= 0",
            ));
        }

        Ok(Self {
            mode: settings.mode,
            tol_abs: settings.tol_abs,
            tol_rel: settings.tol_rel,
            fmt: settings.fmt,
            precision,
            round_half: settings.round_half,
            array_reorder: settings.array_reorder,
            clip_small: settings.clip_small,
        })
    }

    /// Numeric backend.
    pub fn mode(&self) -> NumericMode {
        self.mode
    }

    /// Absolute tolerance.
    pub fn tol_abs(&self) -> f64 {
        self.tol_abs
    }

    /// Relative tolerance.
    pub fn tol_rel(&self) -> f64 {
        self.tol_rel
    }

    /// Output format.
    pub fn fmt(&self) -> FloatFormat {
        self.fmt
    }

    /// Significant digits or decimal places, depending on [`Self::fmt`].
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Tie-break rule.
    pub fn round_half(&self) -> RoundHalf {
        self.round_half
    }

    /// Whether flat numeric arrays are sorted.
    pub fn array_reorder(&self) -> bool {
        self.array_reorder
    }

    /// Whether tiny magnitudes are snapped to zero.
    pub fn clips_small(&self) -> bool {
        self.clip_small
    }

    /// The settings this policy was built from.
    pub fn settings(&self) -> PolicySettings {
        PolicySettings {
            mode: self.mode,
            tol_abs: self.tol_abs,
            tol_rel: self.tol_rel,
            fmt: self.fmt,
            precision: self.precision as i64,
            round_half: self.round_half,
            array_reorder: self.array_reorder,
            clip_small: self.clip_small,
        }
    }

    /// Copy of every field, with nothing derived.
    pub fn snapshot(&self) -> PolicySnapshot {
        PolicySnapshot {
            mode: self.mode,
            tol_abs: self.tol_abs,
            tol_rel: self.tol_rel,
            fmt: self.fmt,
            precision: self.precision,
            round_half: self.round_half,
            array_reorder: self.array_reorder,
            clip_small: self.clip_small,
        }
    }

    /// Magnitudes strictly below this are clipped to zero.
    pub fn clip_threshold(&self) -> f64 {
        10f64.powf(-(self.precision as f64 + 1.0))
    }

    /// Normalizes `x` and, when clipping is enabled, snaps `|x| < 10^-(precision+1)` to `+0.0`.
    ///
    /// # Errors
    ///
    /// Returns [`NumericFieldError`] for NaN or infinite input.
    pub fn clip_small(&self, x: f64) -> Result<f64, NumericFieldError> {
        self.clip_at(x, "value")
    }

    pub(crate) fn clip_at(&self, x: f64, at: impl fmt::Display) -> Result<f64, NumericFieldError> {
        let x = normalize_at(x, at)?;
        if self.clip_small && x.abs() < self.clip_threshold() {
            return Ok(0.0);
        }
        Ok(x)
    }

    /// `|a - b| <= max(tol_abs, tol_rel * max(|a|, |b|))` after clipping both operands.
    ///
    /// The test is symmetric in `a` and `b`.
    pub fn approx_equal(&self, a: f64, b: f64) -> Result<bool, NumericFieldError> {
        let a = self.clip_at(a, "lhs")?;
        let b = self.clip_at(b, "rhs")?;
        let diff = (a - b).abs();
        let eps = self.tol_abs.max(self.tol_rel * a.abs().max(b.abs()));
        Ok(diff <= eps)
    }

    /// Clips every float of a scalar array and, when reordering is enabled and
    /// every element is a number, sorts it ascending.
    ///
    /// Arrays holding anything other than numbers (booleans included) keep
    /// their order; only their floats are clipped. Numeric arrays come back as
    /// all-float arrays.
    pub fn reorder_scalar_array(&self, items: &[Value]) -> Result<Vec<Value>, NumericFieldError> {
        let path = JsonPath::root();
        if !items.iter().all(Value::is_number) {
            return items
                .iter()
                .enumerate()
                .map(|(idx, item)| match item {
                    Value::Float(f) => self.clip_at(*f, path.push_index(idx)).map(Value::Float),
                    other => Ok(other.clone()),
                })
                .collect();
        }

        let mut processed = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let x = item.as_f64().unwrap_or_default();
            processed.push(Value::Float(self.clip_at(x, path.push_index(idx))?));
        }
        if self.array_reorder {
            processed.sort_by(cmp_numbers);
        }
        Ok(processed)
    }
}

impl Default for NumericPolicy {
    fn default() -> Self {
        let defaults = PolicySettings::default();
        Self {
            mode: defaults.mode,
            tol_abs: defaults.tol_abs,
            tol_rel: defaults.tol_rel,
            fmt: defaults.fmt,
            precision: defaults.precision as u32,
            round_half: defaults.round_half,
            array_reorder: defaults.array_reorder,
            clip_small: defaults.clip_small,
        }
    }
}

impl PolicySnapshot {
    /// The snapshot as a value tree, ready for canonicalization or hashing.
    pub fn to_value(&self) -> Value {
        Value::object([
            ("mode", Value::from(self.mode.as_str())),
            ("tol_abs", Value::Float(self.tol_abs)),
            ("tol_rel", Value::Float(self.tol_rel)),
            ("fmt", Value::from(self.fmt.as_str())),
            ("precision", Value::from(self.precision)),
            ("round_half", Value::from(self.round_half.as_str())),
            ("array_reorder", Value::Bool(self.array_reorder)),
            ("clip_small", Value::Bool(self.clip_small)),
        ])
    }
}
