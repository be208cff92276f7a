//! Numeric canonicalization and content addressing for JSON-shaped scientific data.
//!
//! Payloads that are numerically equivalent but bit-different (float noise,
//! negative zero, `1e-12` versus `0.000000000001`) are brought onto a common
//! decimal grid by a [`NumericPolicy`], serialized to one canonical string and
//! hashed to one content address.
//!
//! ```rust
//! use anyon_canonical::{hash_normalized, NumericPolicy, Value};
//!
//! let policy = NumericPolicy::default();
//! let a = Value::from_json_str(r#"{"S": [[0.7071067811865476]], "t": -0.0}"#)?;
//! let b = Value::from_json_str(r#"{"t": 0.0, "S": [[0.7071067811865475]]}"#)?;
//! assert_eq!(hash_normalized(&a, &policy)?, hash_normalized(&b, &policy)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
#![deny(missing_docs)]

/// Canonical serialization of value trees.
pub mod canonicalizer;
/// Tolerant comparison of scalars, vectors and matrices.
pub mod compare;
/// Policy resolution from the environment and explicit overrides.
pub mod config;
/// Exact decimal expansion and rounding of binary64 values.
pub mod decimal;
/// Digest primitives.
pub mod digest;
/// Crate-wide error type.
pub mod errors;
/// Float primitives.
pub mod float;
mod format;
/// Content hashing.
pub mod hashing;
mod path;
/// Numeric policy.
pub mod policy;
/// Deep numeric normalization.
pub mod quantize;
/// Validation helpers for textual identifiers.
pub mod validation;
/// The JSON-shaped value tree.
pub mod value;
mod writer;

pub use canonicalizer::{canonical_json_dump, CanonicalizationError, Canonicalizer};
pub use compare::{
    approx_equal_matrices, approx_equal_number, approx_equal_vectors, max_abs_diff, Complex, Scalar,
};
pub use config::{policy_from_env, policy_from_process_env, PolicyOverrides};
pub use digest::{Digest, DigestAlg};
pub use errors::Error;
pub use float::{
    compensated_sum, is_finite, is_negative_zero, normalize_float, scaled_norm2, NumericFieldError,
};
pub use format::{AUTO_FIXED_MAX, AUTO_FIXED_MIN};
pub use hashing::{
    attach_hashes, content_address, hash_matrix, hash_normalized, hash_payload, hash_value, Content,
    HashingError, DEFAULT_HASH_FIELDS,
};
pub use policy::{
    FloatFormat, NumericMode, NumericPolicy, PolicyError, PolicySettings, PolicySnapshot, RoundHalf,
    MAX_PRECISION,
};
pub use quantize::{normalized_canonical_dump, quantize};
pub use validation::ValidationError;
pub use value::{Map, Value};
pub use writer::float_repr;
