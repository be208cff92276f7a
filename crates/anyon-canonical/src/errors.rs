use thiserror::Error;

use crate::canonicalizer::CanonicalizationError;
use crate::float::NumericFieldError;
use crate::hashing::HashingError;
use crate::policy::PolicyError;
use crate::validation::ValidationError;

/// Any error raised by this crate.
///
/// Operations that cross module boundaries (quantize then hash, parse then
/// canonicalize) return this type; single-step operations return their own
/// module error, which converts with `?`.
#[derive(Debug, Error)]
pub enum Error {
    /// Policy construction or configuration failed.
    #[error(transparent)]
    Policy(#[from] PolicyError),
    /// A float was non-finite or overflowed during quantization.
    #[error(transparent)]
    Numeric(#[from] NumericFieldError),
    /// The tree could not be canonicalized.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),
    /// Hashing rejected its input.
    #[error(transparent)]
    Hashing(#[from] HashingError),
    /// A digest string was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Input text was not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
