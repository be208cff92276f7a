//! Content hashing on top of the canonical serializer.
//!
//! Every structured digest is `sha256(utf8(canonical_json_dump(wrapper)))`,
//! where `wrapper` is the payload itself for objects and `{"_": value}` for
//! anything else. Digests render as `sha256:<hex>`, optionally prefixed with a
//! kind (`<kind>:sha256:<hex>`).

use thiserror::Error;
use tracing::{debug, trace};

use crate::canonicalizer::{canonical_json_dump, CanonicalizationError};
use crate::digest::Digest;
use crate::errors::Error;
use crate::policy::NumericPolicy;
use crate::quantize::quantize;
use crate::value::{Map, Value};

/// Member name used to wrap non-object values before hashing.
pub const WRAPPER_KEY: &str = "_";

/// Payload member that receives per-field hashes.
pub const HASHES_KEY: &str = "hashes";

/// Fields hashed by [`attach_hashes`] when the caller does not choose.
pub const DEFAULT_HASH_FIELDS: [&str; 6] = ["objects", "qdim", "global_dim", "twist", "S", "T"];

/// Error returned by the hashing layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HashingError {
    /// The wrapped value could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    /// A matrix cell is neither a number nor a string.
    #[error("unsupported matrix element at [{row}][{col}]: {found}")]
    UnsupportedMatrixElement {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// Kind of the offending element.
        found: &'static str,
    },
    /// A top-level object was required.
    #[error("expected a JSON object at top level, found {found}")]
    NotAnObject {
        /// Kind of the value supplied.
        found: &'static str,
    },
}

/// Input accepted by [`content_address`].
#[derive(Debug, Clone, Copy)]
pub enum Content<'a> {
    /// Raw bytes, hashed as-is.
    Bytes(&'a [u8]),
    /// Text, hashed as its UTF-8 encoding.
    Text(&'a str),
    /// A tree, canonicalized first.
    Value(&'a Value),
}

impl<'a> From<&'a [u8]> for Content<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Content::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for Content<'a> {
    fn from(text: &'a str) -> Self {
        Content::Text(text)
    }
}

impl<'a> From<&'a Value> for Content<'a> {
    fn from(value: &'a Value) -> Self {
        Content::Value(value)
    }
}

/// Digest of any value, wrapped as `{"_": value}`.
///
/// ```rust
/// use anyon_canonical::{hash_value, Value};
///
/// let a = hash_value(&Value::from(vec![Value::from(1.0), Value::from(-0.0)]))?;
/// let b = hash_value(&Value::from(vec![Value::from(1.0), Value::from(0.0)]))?;
/// assert_eq!(a, b);
/// assert!(a.to_string().starts_with("sha256:"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn hash_value(value: &Value) -> Result<Digest, HashingError> {
    hash_canonical(&wrap(value.clone()))
}

/// Digest of a top-level object.
pub fn hash_payload(payload: &Value) -> Result<Digest, HashingError> {
    if !matches!(payload, Value::Object(_)) {
        return Err(HashingError::NotAnObject {
            found: payload.kind(),
        });
    }
    hash_canonical(payload)
}

/// Digest of a matrix of numbers or strings, hashed as `{"matrix": rows}`.
///
/// Rows may differ in length.
pub fn hash_matrix(rows: &[Vec<Value>]) -> Result<Digest, HashingError> {
    for (row, cells) in rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if !matches!(cell, Value::Int(_) | Value::Float(_) | Value::String(_)) {
                return Err(HashingError::UnsupportedMatrixElement {
                    row,
                    col,
                    found: cell.kind(),
                });
            }
        }
    }
    let matrix = Value::Array(rows.iter().cloned().map(Value::Array).collect());
    hash_canonical(&Value::object([("matrix", matrix)]))
}

/// Kind-prefixed digest: `<kind>:sha256:<hex>`.
///
/// Bytes and text are hashed directly. Objects are canonicalized as they are;
/// every other value is wrapped as `{"_": value}` first. `:` in `kind` becomes
/// `-`, and an empty kind becomes `blob`.
pub fn content_address<'a>(content: impl Into<Content<'a>>, kind: &str) -> Result<Digest, HashingError> {
    let digest = match content.into() {
        Content::Bytes(bytes) => Digest::sha256(bytes),
        Content::Text(text) => Digest::sha256(text.as_bytes()),
        Content::Value(value) if matches!(value, Value::Object(_)) => hash_canonical(value)?,
        Content::Value(value) => hash_canonical(&wrap(value.clone()))?,
    };
    Ok(digest.with_kind(kind))
}

/// Quantizes `payload` under `policy` and hashes the canonical result.
///
/// Payloads that differ only by representational noise below the policy's
/// resolution share a digest.
pub fn hash_normalized(payload: &Value, policy: &NumericPolicy) -> Result<Digest, Error> {
    let normalized = quantize(payload, policy)?;
    Ok(hash_payload(&normalized)?)
}

/// Fills `payload["hashes"][field]` with [`hash_value`] of `payload[field]`.
///
/// Uses [`DEFAULT_HASH_FIELDS`] when `fields` is `None`. Absent fields and
/// fields that already have an entry are skipped. A missing or non-object
/// `hashes` member is replaced by an empty object. All digests are computed
/// before the payload is touched, so a failure leaves it unchanged.
///
/// Returns the names of the fields that were filled.
pub fn attach_hashes(payload: &mut Map, fields: Option<&[&str]>) -> Result<Vec<String>, HashingError> {
    let fields = fields.unwrap_or(&DEFAULT_HASH_FIELDS);
    let existing = match payload.get(HASHES_KEY) {
        Some(Value::Object(hashes)) => Some(hashes),
        _ => None,
    };

    let mut pending: Vec<(String, Digest)> = Vec::new();
    for field in fields {
        let Some(value) = payload.get(*field) else {
            continue;
        };
        if existing.is_some_and(|hashes| hashes.contains_key(*field)) {
            trace!(field = *field, "hash already present");
            continue;
        }
        if pending.iter().any(|(name, _)| name.as_str() == *field) {
            continue;
        }
        pending.push((field.to_string(), hash_value(value)?));
    }

    let slot = payload
        .entry(HASHES_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !matches!(slot, Value::Object(_)) {
        *slot = Value::Object(Map::new());
    }

    let mut filled = Vec::with_capacity(pending.len());
    if let Value::Object(hashes) = slot {
        for (field, digest) in pending {
            hashes.insert(field.clone(), Value::String(digest.to_string()));
            filled.push(field);
        }
    }
    debug!(filled = filled.len(), "attached hashes");
    Ok(filled)
}

fn wrap(value: Value) -> Value {
    Value::object([(WRAPPER_KEY, value)])
}

fn hash_canonical(value: &Value) -> Result<Digest, HashingError> {
    let canonical = canonical_json_dump(value)?;
    let digest = Digest::sha256(canonical.as_bytes());
    trace!(bytes = canonical.len(), digest = %digest, "hashed canonical form");
    Ok(digest)
}
