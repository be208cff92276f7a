//! Reading JSON input from a file or stdin.

use std::io::{self, Read};

use anyon_canonical::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read file {path}: {source}")]
    File { path: String, source: io::Error },
    #[error("Failed to read stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a JSON object at top level, found {0}")]
    NotAnObject(&'static str),
}

/// Parses JSON from `path`, or from stdin when no path is given.
pub fn read_value(path: Option<String>) -> Result<Value, InputError> {
    let text = match path {
        Some(path) => std::fs::read_to_string(&path).map_err(|source| InputError::File { path, source })?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(InputError::Stdin)?;
            buffer
        }
    };
    Ok(Value::from_json_str(&text)?)
}

pub fn read_object(path: Option<String>) -> Result<Map, InputError> {
    match read_value(path)? {
        Value::Object(map) => Ok(map),
        other => Err(InputError::NotAnObject(other.kind())),
    }
}
