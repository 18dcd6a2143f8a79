//! Verification verdicts and RS256 signature validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use rsa::RsaPublicKey;
use rsa::traits::PublicKeyParts;
use serde_json::Value;

use crate::core::describe_jwt_error;
use crate::error::AzJwtError;

/// The final judgement on a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The applicable policy accepted the token.
    Valid,
    /// The token was judged and rejected.
    Invalid {
        /// Human-readable reason for the failure.
        reason: String,
    },
    /// The tool cannot judge this token.
    Indeterminate {
        /// Human-readable reason no judgement was possible.
        reason: String,
    },
}

impl Verdict {
    /// Verdict for a pipeline that stopped with `err`. Never `Valid`.
    pub fn from_error(err: &AzJwtError) -> Self {
        let reason = err.to_string();
        if err.kind().is_indeterminate() {
            Self::Indeterminate { reason }
        } else {
            Self::Invalid { reason }
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Short lowercase name: `valid`, `invalid`, or `indeterminate`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid { .. } => "invalid",
            Self::Indeterminate { .. } => "indeterminate",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { reason } | Self::Indeterminate { reason } => Some(reason),
        }
    }
}

/// Verify an RS256 token against `key`.
///
/// Checks the signature over the exact header and payload bytes of the
/// compact token, then requires `aud` to equal `audience`, `iss` to
/// equal `issuer`, and `exp` to lie in the future (default leeway).
///
/// # Errors
///
/// Returns [`AzJwtError::SignatureInvalid`] with a sanitized reason if
/// any check fails.
pub fn verify_rs256(
    token: &str,
    key: &RsaPublicKey,
    audience: &str,
    issuer: &str,
) -> Result<(), AzJwtError> {
    let decoding_key =
        DecodingKey::from_rsa_raw_components(&key.n().to_bytes_be(), &key.e().to_bytes_be());

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);

    decode::<Value>(token, &decoding_key, &validation)
        .map(|_| ())
        .map_err(|e| AzJwtError::SignatureInvalid {
            reason: describe_jwt_error(e.kind()),
        })
}
