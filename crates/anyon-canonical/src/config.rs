//! Policy resolution: defaults, then environment variables, then explicit overrides.
//!
//! | Variable           | Field           | Notes                                  |
//! |--------------------|-----------------|----------------------------------------|
//! | `AC_NUMERIC_FMT`   | `fmt`           | ignored when empty                     |
//! | `AC_NUMERIC_PREC`  | `precision`     | integer, ignored when empty            |
//! | `AC_TOL_ABS`       | `tol_abs`       | float, ignored when empty              |
//! | `AC_TOL_REL`       | `tol_rel`       | float, ignored when empty              |
//! | `AC_ROUND_HALF`    | `round_half`    | ignored when empty                     |
//! | `AC_ARRAY_REORDER` | `array_reorder` | `1`, `true`, `yes`, `on` mean true     |
//! | `AC_CLIP_SMALL`    | `clip_small`    | `1`, `true`, `yes`, `on` mean true     |

use std::collections::HashMap;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::policy::{FloatFormat, NumericMode, NumericPolicy, PolicyError, PolicySettings, RoundHalf};

/// Environment variable selecting the output format.
pub const ENV_FMT: &str = "AC_NUMERIC_FMT";
/// Environment variable selecting the precision.
pub const ENV_PRECISION: &str = "AC_NUMERIC_PREC";
/// Environment variable selecting the absolute tolerance.
pub const ENV_TOL_ABS: &str = "AC_TOL_ABS";
/// Environment variable selecting the relative tolerance.
pub const ENV_TOL_REL: &str = "AC_TOL_REL";
/// Environment variable selecting the tie-break rule.
pub const ENV_ROUND_HALF: &str = "AC_ROUND_HALF";
/// Environment variable toggling array reordering.
pub const ENV_ARRAY_REORDER: &str = "AC_ARRAY_REORDER";
/// Environment variable toggling small-magnitude clipping.
pub const ENV_CLIP_SMALL: &str = "AC_CLIP_SMALL";

const TRUTHY: [&str; 4] = ["1", "true", "yes", "on"];

/// Explicit per-field overrides, applied after the environment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOverrides {
    /// Numeric backend.
    pub mode: Option<NumericMode>,
    /// Absolute tolerance.
    pub tol_abs: Option<f64>,
    /// Relative tolerance.
    pub tol_rel: Option<f64>,
    /// Output format.
    pub fmt: Option<FloatFormat>,
    /// Precision.
    pub precision: Option<i64>,
    /// Tie-break rule.
    pub round_half: Option<RoundHalf>,
    /// Array reordering.
    pub array_reorder: Option<bool>,
    /// Small-magnitude clipping.
    pub clip_small: Option<bool>,
}

impl PolicyOverrides {
    /// Writes every set field into `settings`.
    pub fn apply(&self, settings: &mut PolicySettings) {
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(tol_abs) = self.tol_abs {
            settings.tol_abs = tol_abs;
        }
        if let Some(tol_rel) = self.tol_rel {
            settings.tol_rel = tol_rel;
        }
        if let Some(fmt) = self.fmt {
            settings.fmt = fmt;
        }
        if let Some(precision) = self.precision {
            settings.precision = precision;
        }
        if let Some(round_half) = self.round_half {
            settings.round_half = round_half;
        }
        if let Some(array_reorder) = self.array_reorder {
            settings.array_reorder = array_reorder;
        }
        if let Some(clip_small) = self.clip_small {
            settings.clip_small = clip_small;
        }
    }
}

/// Resolves a policy from `env` and `overrides` on top of the defaults.
///
/// ```rust
/// use std::collections::HashMap;
/// use anyon_canonical::config::{policy_from_env, PolicyOverrides};
/// use anyon_canonical::FloatFormat;
///
/// let env = HashMap::from([("AC_NUMERIC_FMT".to_string(), "fixed".to_string())]);
/// let overrides = PolicyOverrides { precision: Some(4), ..Default::default() };
/// let policy = policy_from_env(&env, &overrides)?;
/// assert_eq!(policy.fmt(), FloatFormat::Fixed);
/// assert_eq!(policy.precision(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// Returns [`PolicyError::InvalidPolicy`] when a variable does not parse or the
/// resolved settings are out of range.
pub fn policy_from_env(
    env: &HashMap<String, String>,
    overrides: &PolicyOverrides,
) -> Result<NumericPolicy, PolicyError> {
    let mut settings = PolicySettings::default();
    merge_env(&mut settings, env)?;
    overrides.apply(&mut settings);
    let policy = NumericPolicy::new(settings)?;
    debug!(
        fmt = %policy.fmt(),
        precision = policy.precision(),
        round_half = %policy.round_half(),
        array_reorder = policy.array_reorder(),
        clip_small = policy.clips_small(),
        "resolved numeric policy"
    );
    Ok(policy)
}

/// [`policy_from_env`] over the current process environment.
pub fn policy_from_process_env(overrides: &PolicyOverrides) -> Result<NumericPolicy, PolicyError> {
    let env: HashMap<String, String> = std::env::vars().collect();
    policy_from_env(&env, overrides)
}

fn merge_env(settings: &mut PolicySettings, env: &HashMap<String, String>) -> Result<(), PolicyError> {
    if let Some(raw) = non_empty(env, ENV_FMT) {
        settings.fmt = FloatFormat::from_str(raw)?;
    }
    if let Some(raw) = non_empty(env, ENV_PRECISION) {
        settings.precision = raw
            .trim()
            .parse()
            .map_err(|_| PolicyError::invalid("precision", raw, "must be an integer"))?;
    }
    if let Some(raw) = non_empty(env, ENV_TOL_ABS) {
        settings.tol_abs = parse_float("tol_abs", raw)?;
    }
    if let Some(raw) = non_empty(env, ENV_TOL_REL) {
        settings.tol_rel = parse_float("tol_rel", raw)?;
    }
    if let Some(raw) = non_empty(env, ENV_ROUND_HALF) {
        settings.round_half = RoundHalf::from_str(raw)?;
    }
    if let Some(raw) = env.get(ENV_ARRAY_REORDER) {
        settings.array_reorder = truthy(raw);
    }
    if let Some(raw) = env.get(ENV_CLIP_SMALL) {
        settings.clip_small = truthy(raw);
    }
    Ok(())
}

fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(String::as_str).filter(|raw| !raw.is_empty())
}

fn parse_float(field: &'static str, raw: &str) -> Result<f64, PolicyError> {
    raw.trim()
        .parse()
        .map_err(|_| PolicyError::invalid(field, raw, "must be a number"))
}

fn truthy(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    TRUTHY.contains(&lowered.as_str())
}
