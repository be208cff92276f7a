use std::cmp::Ordering;

use tracing::debug;

use crate::path::JsonPath;
use crate::value::Value;
use crate::writer::write_value;

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CanonicalizationError {
    /// Non-finite number (NaN/Infinity) detected.
    #[error("non-finite number detected at {path}: {value}")]
    NonFiniteNumber {
        /// JSON path of the offending float.
        path: String,
        /// Offending value.
        value: f64,
    },
    /// The document root is not an object.
    #[error("top-level value must be a JSON object, found {found}")]
    NonObjectRoot {
        /// Kind of the value found at the root.
        found: &'static str,
    },
    /// Generic serializer failure.
    #[error("JSON serialization error: {0}")]
    Other(String),
}

/// Canonicalizer that emits one deterministic string per document.
///
/// Floats are checked for finiteness and negative zero is folded into
/// positive zero. With array reordering enabled, every array whose elements
/// are all scalars is sorted by type rank (`null < bool < int < float <
/// string`) and then by value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Canonicalizer {
    reorder_arrays: bool,
}

impl Canonicalizer {
    /// Creates a canonicalizer that preserves array order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the scalar-array reorder pass.
    pub fn reorder_arrays(mut self, enabled: bool) -> Self {
        self.reorder_arrays = enabled;
        self
    }

    /// Produces the canonical string for a document.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::NonObjectRoot`] when `value` is not an
    /// object and [`CanonicalizationError::NonFiniteNumber`] for NaN or
    /// infinite floats anywhere in the tree.
    pub fn canonicalize(&self, value: &Value) -> Result<String, CanonicalizationError> {
        let normalized = self.normalize(value)?;
        let mut out = String::new();
        write_value(&normalized, &JsonPath::root(), &mut out)?;
        debug!(
            bytes = out.len(),
            reorder_arrays = self.reorder_arrays,
            "canonicalized document"
        );
        Ok(out)
    }

    /// Returns the normalized tree that [`Self::canonicalize`] serializes.
    pub fn normalize(&self, value: &Value) -> Result<Value, CanonicalizationError> {
        if !matches!(value, Value::Object(_)) {
            return Err(CanonicalizationError::NonObjectRoot {
                found: value.kind(),
            });
        }
        self.normalize_node(value, &JsonPath::root())
    }

    fn normalize_node(&self, value: &Value, path: &JsonPath<'_>) -> Result<Value, CanonicalizationError> {
        match value {
            Value::Object(map) => {
                let mut normalized = crate::value::Map::new();
                for (key, child) in map {
                    normalized.insert(key.clone(), self.normalize_node(child, &path.push_field(key))?);
                }
                Ok(Value::Object(normalized))
            }
            Value::Array(items) => {
                let mut normalized = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| self.normalize_node(item, &path.push_index(idx)))
                    .collect::<Result<Vec<_>, _>>()?;
                if self.reorder_arrays && normalized.iter().all(Value::is_scalar) {
                    normalized.sort_by(cmp_scalars);
                }
                Ok(Value::Array(normalized))
            }
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(CanonicalizationError::NonFiniteNumber {
                        path: path.to_string(),
                        value: *f,
                    });
                }
                Ok(Value::Float(if *f == 0.0 { 0.0 } else { *f }))
            }
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::String(_) => Ok(value.clone()),
        }
    }
}

/// Canonical string of `payload` with array order preserved.
pub fn canonical_json_dump(payload: &Value) -> Result<String, CanonicalizationError> {
    Canonicalizer::new().canonicalize(payload)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Int(_) => 2,
        Value::Float(_) => 3,
        Value::String(_) => 4,
        Value::Array(_) | Value::Object(_) => 5,
    }
}

fn cmp_scalars(a: &Value, b: &Value) -> Ordering {
    type_rank(a).cmp(&type_rank(b)).then_with(|| match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    })
}
