//! Hash-attach command implementation.

use anyon_canonical::{attach_hashes, canonical_json_dump, Value};
use tracing::info;

use crate::input;

pub fn run(input: Option<String>, fields: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut payload = input::read_object(input)?;

    let selected: Vec<&str> = fields.iter().map(String::as_str).collect();
    let filled = attach_hashes(&mut payload, (!selected.is_empty()).then_some(selected.as_slice()))?;
    info!(fields = ?filled, "hashes attached");

    println!("{}", canonical_json_dump(&Value::Object(payload))?);
    Ok(())
}
