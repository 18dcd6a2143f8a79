//! Core business logic for token verification.
//!
//! This module contains the domain logic separated from CLI concerns.
//! All types and functions here are testable without the CLI layer.

pub mod decoder;
pub mod issuer;
pub mod jwks;
pub mod keys;
pub mod policy;
pub mod validator;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

use jsonwebtoken::errors::ErrorKind;

/// Maximum length in bytes of an untrusted value echoed in messages.
const MAX_DISPLAY_LEN: usize = 128;

/// Sanitize an untrusted token value for inclusion in messages.
///
/// Replaces control characters (including ANSI escape sequences) with
/// the Unicode replacement character to prevent terminal injection,
/// then truncates to 128 bytes on a character boundary.
pub(crate) fn sanitize_for_display(value: &str) -> String {
    let clean: String = value
        .chars()
        .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
        .collect();
    if clean.len() > MAX_DISPLAY_LEN {
        let end = clean.floor_char_boundary(MAX_DISPLAY_LEN);
        format!("{}...(truncated)", &clean[..end])
    } else {
        clean
    }
}

/// Map a `jsonwebtoken` error kind to a short, stable reason string.
///
/// Raw library messages are not forwarded.
pub(crate) fn describe_jwt_error(kind: &ErrorKind) -> String {
    match kind {
        ErrorKind::InvalidSignature => "signature does not match the published key",
        ErrorKind::InvalidAlgorithm => "token algorithm is not RS256",
        ErrorKind::ExpiredSignature => "token has expired",
        ErrorKind::ImmatureSignature => "token is not valid yet",
        ErrorKind::InvalidIssuer => "issuer claim does not match",
        ErrorKind::InvalidAudience => "audience claim does not match",
        ErrorKind::MissingRequiredClaim(_) => "a required claim is missing",
        ErrorKind::InvalidToken => "invalid token structure",
        ErrorKind::Base64(_) => "invalid base64url encoding",
        ErrorKind::Json(_) => "invalid JSON in token",
        _ => "unexpected validation error",
    }
    .to_string()
}
