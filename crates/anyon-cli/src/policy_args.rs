//! Policy override flags shared by the subcommands.

use anyon_canonical::{
    policy_from_process_env, FloatFormat, NumericPolicy, PolicyError, PolicyOverrides, RoundHalf,
};
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct PolicyArgs {
    /// Override fmt (auto, fixed, scientific)
    #[arg(long)]
    fmt: Option<FloatFormat>,
    /// Override precision
    #[arg(long, allow_negative_numbers = true)]
    precision: Option<i64>,
    /// Override absolute tolerance
    #[arg(long, allow_negative_numbers = true)]
    tol_abs: Option<f64>,
    /// Override relative tolerance
    #[arg(long, allow_negative_numbers = true)]
    tol_rel: Option<f64>,
    /// Override rounding mode (even, away)
    #[arg(long)]
    round_half: Option<RoundHalf>,
    /// Enable array reordering
    #[arg(long, overrides_with = "no_array_reorder")]
    array_reorder: bool,
    /// Disable array reordering
    #[arg(long, overrides_with = "array_reorder")]
    no_array_reorder: bool,
    /// Enable clipping of small values
    #[arg(long, overrides_with = "no_clip_small")]
    clip_small: bool,
    /// Disable clipping of small values
    #[arg(long, overrides_with = "clip_small")]
    no_clip_small: bool,
}

impl PolicyArgs {
    pub fn overrides(&self) -> PolicyOverrides {
        PolicyOverrides {
            fmt: self.fmt,
            precision: self.precision,
            tol_abs: self.tol_abs,
            tol_rel: self.tol_rel,
            round_half: self.round_half,
            array_reorder: flag(self.array_reorder, self.no_array_reorder),
            clip_small: flag(self.clip_small, self.no_clip_small),
            ..Default::default()
        }
    }

    /// Defaults, then `AC_*` environment variables, then these flags.
    pub fn resolve(&self) -> Result<NumericPolicy, PolicyError> {
        policy_from_process_env(&self.overrides())
    }
}

fn flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
