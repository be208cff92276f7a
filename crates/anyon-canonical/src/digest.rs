use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};

use crate::validation::ValidationError;

/// Kind used by [`Digest::with_kind`] when the caller passes an empty string.
pub const DEFAULT_KIND: &str = "blob";

const DIGEST_PATTERN: &str = r"^(?:([^:]+):)?sha256:([0-9a-f]{64})$";

fn digest_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DIGEST_PATTERN).expect("invalid regex"))
}

/// Supported digest algorithms for content addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DigestAlg {
    /// SHA-256, the only algorithm emitted by this crate.
    #[default]
    Sha256,
}

impl DigestAlg {
    /// Prefix spelling used in digest strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlg::Sha256 => "sha256",
        }
    }
}

/// A content digest of the form `[<kind>:]sha256:<64 lowercase hex>`.
///
/// Serializes as its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest {
    kind: Option<String>,
    alg: DigestAlg,
    hex: String,
}

impl Digest {
    /// SHA-256 of raw bytes, without a kind prefix.
    pub fn sha256(bytes: impl AsRef<[u8]>) -> Self {
        let hash = Sha256::digest(bytes.as_ref());
        Digest {
            kind: None,
            alg: DigestAlg::Sha256,
            hex: hex::encode(hash),
        }
    }

    /// Attaches a kind prefix. `:` in `kind` becomes `-` and an empty kind
    /// becomes [`DEFAULT_KIND`].
    pub fn with_kind(mut self, kind: &str) -> Self {
        let kind = if kind.is_empty() { DEFAULT_KIND } else { kind };
        self.kind = Some(kind.replace(':', "-"));
        self
    }

    /// Parses a validated digest string.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let Some(caps) = digest_regex().captures(&s) else {
            return Err(ValidationError::PatternMismatch {
                field: "digest",
                value: s,
            });
        };
        let kind = caps.get(1).map(|m| m.as_str().to_string());
        let hex = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        Ok(Digest {
            kind,
            alg: DigestAlg::Sha256,
            hex,
        })
    }

    /// Kind prefix, if any.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Digest algorithm.
    pub fn alg(&self) -> DigestAlg {
        self.alg
    }

    /// Lowercase hex of the hash bytes.
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = &self.kind {
            write!(f, "{kind}:")?;
        }
        write!(f, "{}:{}", self.alg.as_str(), self.hex)
    }
}

impl FromStr for Digest {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest::parse(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Digest::parse(value)
    }
}

impl From<Digest> for String {
    fn from(value: Digest) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn sha256_of_empty_input() {
        let digest = Digest::sha256(b"");
        assert_eq!(digest.hex(), EMPTY_SHA256);
        assert_eq!(digest.to_string(), format!("sha256:{EMPTY_SHA256}"));
        assert_eq!(digest.kind(), None);
    }

    #[test]
    fn kind_is_sanitized() {
        assert!(Digest::sha256(b"")
            .with_kind("a:b")
            .to_string()
            .starts_with("a-b:sha256:"));
        assert_eq!(Digest::sha256(b"").with_kind("").kind(), Some("blob"));
    }

    #[test]
    fn parse_round_trips_display() {
        let text = format!("matrix-S:sha256:{EMPTY_SHA256}");
        let digest = Digest::parse(text.clone()).unwrap();
        assert_eq!(digest.kind(), Some("matrix-S"));
        assert_eq!(digest.to_string(), text);

        let bare: Digest = format!("sha256:{EMPTY_SHA256}").parse().unwrap();
        assert_eq!(bare.kind(), None);
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in [
            "sha256:abc".to_string(),
            format!("sha256:{}", EMPTY_SHA256.to_uppercase()),
            format!("md5:{EMPTY_SHA256}"),
            format!("a:b:sha256:{EMPTY_SHA256}"),
        ] {
            assert!(matches!(
                Digest::parse(bad),
                Err(ValidationError::PatternMismatch { field: "digest", .. })
            ));
        }
    }

    #[test]
    fn serde_uses_string_form() {
        let digest = Digest::sha256(b"").with_kind("blob");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"blob:sha256:{EMPTY_SHA256}\""));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
        assert!(serde_json::from_str::<Digest>("\"nope\"").is_err());
    }
}
