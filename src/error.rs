//! Domain error types for azjwt.
//!
//! All pipeline errors are defined here using `thiserror`. Each variant
//! belongs to one [`FailureKind`], which decides how the CLI reports it:
//! as a definite invalid verdict or as "cannot judge this token".

use thiserror::Error;

/// Coarse failure classes reported by the verification pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MalformedToken,
    UnsupportedIssuer,
    KeySetFetchError,
    KeyNotFound,
    KeyBuildError,
    UnrecognizedAudience,
    SignatureInvalid,
    StructuralInvalid,
}

impl FailureKind {
    /// Whether this failure means the tool cannot judge the token, as
    /// opposed to having judged it invalid.
    pub fn is_indeterminate(self) -> bool {
        matches!(
            self,
            Self::UnsupportedIssuer | Self::KeyNotFound | Self::UnrecognizedAudience
        )
    }
}

/// Errors that can occur while inspecting or verifying a token.
#[derive(Debug, Error)]
pub enum AzJwtError {
    /// The provided token does not have the expected three-part structure.
    #[error("invalid token format: expected 'header.payload.signature' structure")]
    InvalidTokenFormat,

    /// Failed to decode a base64url-encoded token segment.
    #[error("failed to decode {segment}: invalid base64url encoding")]
    Base64DecodeError {
        /// Which segment failed to decode ("header" or "payload").
        segment: String,
    },

    /// Decoded segment is not a JSON object.
    #[error("failed to parse {segment} as JSON: {reason}")]
    JsonParseError {
        /// Which segment failed to parse ("header" or "payload").
        segment: String,
        /// Description of the parsing failure.
        reason: String,
    },

    /// No issuer policy knows where this issuer publishes its keys.
    #[error("unsupported issuer '{issuer}': no key discovery rule matches")]
    UnsupportedIssuer {
        /// The sanitized `iss` claim, or `<missing>`.
        issuer: String,
    },

    /// Fetching or parsing the key set document failed.
    #[error("failed to fetch key set from '{url}': {reason}")]
    KeySetFetchError {
        /// The discovery URL, stripped of credentials and query.
        url: String,
        /// Description of the fetch failure.
        reason: String,
    },

    /// The token header has no `kid`.
    #[error("token header carries no 'kid': cannot select a signing key")]
    MissingKeyId,

    /// No key in the fetched set matches the token's `kid`.
    #[error("no matching key found in key set for kid '{kid}'")]
    KeyNotFound {
        /// The key ID from the token header.
        kid: String,
    },

    /// The matching key entry could not be turned into an RSA public key.
    #[error("unusable key for kid '{kid}': {reason}")]
    KeyBuildError {
        /// The key ID of the offending entry.
        kid: String,
        /// Description of the failure.
        reason: String,
    },

    /// The `aud` claim selects no known verification policy.
    #[error("unrecognized audience '{audience}': no verification policy applies")]
    UnrecognizedAudience {
        /// The sanitized `aud` claim, or `<missing>`.
        audience: String,
    },

    /// Cryptographic or claim verification failed.
    #[error("signature validation failed: {reason}")]
    SignatureInvalid {
        /// Description of why validation failed.
        reason: String,
    },

    /// The issuer/tenant structure check failed.
    #[error("issuer structure check failed: {stage}")]
    StructuralInvalid {
        /// Which rule of the structural check failed.
        stage: String,
    },
}

impl AzJwtError {
    /// The failure class this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidTokenFormat | Self::Base64DecodeError { .. } | Self::JsonParseError { .. } => {
                FailureKind::MalformedToken
            }
            Self::UnsupportedIssuer { .. } => FailureKind::UnsupportedIssuer,
            Self::KeySetFetchError { .. } => FailureKind::KeySetFetchError,
            Self::MissingKeyId | Self::KeyNotFound { .. } => FailureKind::KeyNotFound,
            Self::KeyBuildError { .. } => FailureKind::KeyBuildError,
            Self::UnrecognizedAudience { .. } => FailureKind::UnrecognizedAudience,
            Self::SignatureInvalid { .. } => FailureKind::SignatureInvalid,
            Self::StructuralInvalid { .. } => FailureKind::StructuralInvalid,
        }
    }
}
