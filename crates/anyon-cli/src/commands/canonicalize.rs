//! Canonicalize command implementation.

use anyon_canonical::{quantize, Canonicalizer};

use crate::input;
use crate::policy_args::PolicyArgs;

pub fn run(
    input: Option<String>,
    normalize: bool,
    reorder_arrays: bool,
    args: &PolicyArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut value = input::read_value(input)?;

    if normalize {
        let policy = args.resolve()?;
        value = quantize(&value, &policy)?;
    }

    let canonical = Canonicalizer::new()
        .reorder_arrays(reorder_arrays)
        .canonicalize(&value)
        .map_err(|e| format!("Canonicalization failed: {}", e))?;

    println!("{}", canonical);
    Ok(())
}
