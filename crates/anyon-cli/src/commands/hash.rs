//! Hash command implementation.

use anyon_canonical::{content_address, hash_normalized, hash_payload, quantize, Value};

use crate::input;
use crate::policy_args::PolicyArgs;

pub fn run(
    input: Option<String>,
    normalize: bool,
    kind: Option<String>,
    args: &PolicyArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let value = Value::Object(input::read_object(input)?);

    let digest = match (normalize, kind) {
        (true, None) => hash_normalized(&value, &args.resolve()?)?,
        (true, Some(kind)) => {
            let normalized = quantize(&value, &args.resolve()?)?;
            content_address(&normalized, &kind)?
        }
        (false, None) => hash_payload(&value)?,
        (false, Some(kind)) => content_address(&value, &kind)?,
    };

    println!("{}", digest);
    Ok(())
}
