//! Compact token decoding.
//!
//! Handles splitting a raw JWT string into its three parts (header,
//! payload, signature), base64url-decoding each segment, and parsing
//! the header and payload as JSON objects.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde_json::{Map, Value};

use crate::error::AzJwtError;

/// A decoded JSON object segment (header or claims), in token order.
pub type JsonObject = Map<String, Value>;

/// The decoded parts of a JWT.
///
/// Implements a custom `Debug` that redacts `claims` and `signature`
/// to prevent accidental leakage of sensitive claim data.
#[derive(Clone)]
pub struct DecodedToken {
    /// The parsed JWT header (typically `typ`, `alg`, `kid`).
    pub header: JsonObject,
    /// The parsed JWT payload.
    pub claims: JsonObject,
    /// The raw base64url-encoded signature segment.
    pub signature: String,
}

impl DecodedToken {
    /// The header's `kid`, if present as a string.
    pub fn kid(&self) -> Option<&str> {
        self.header.get("kid").and_then(Value::as_str)
    }

    /// A string claim by name.
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }
}

/// Custom `Debug` that redacts claims and signature to prevent
/// accidental leakage through debug formatting or error chains.
impl fmt::Debug for DecodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedToken")
            .field("header", &self.header)
            .field("claims", &"[REDACTED]")
            .field("signature", &"[REDACTED]")
            .finish()
    }
}

/// Decode a raw JWT string into its constituent parts.
///
/// Splits the token on `.` separators, base64url-decodes the header
/// and payload segments, and parses them as JSON objects. The signature
/// is kept as its raw base64url-encoded string.
///
/// # Errors
///
/// Returns an error if the token doesn't have exactly three non-empty
/// parts, if base64url decoding fails, or if JSON parsing fails.
pub fn decode_token(token: &str) -> Result<DecodedToken, AzJwtError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(AzJwtError::InvalidTokenFormat);
    }

    let header = decode_segment(parts[0], "header")?;
    let claims = decode_segment(parts[1], "payload")?;
    let signature = parts[2].to_string();

    Ok(DecodedToken {
        header,
        claims,
        signature,
    })
}

/// Decode base64url text whose trailing padding may have been stripped.
///
/// The input is right-padded with `=` up to the next multiple of four
/// and then decoded with the padded URL-safe alphabet. Token segments
/// and RSA modulus/exponent values both go through here.
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let missing = (4 - input.len() % 4) % 4;
    let mut padded = String::with_capacity(input.len() + missing);
    padded.push_str(input);
    padded.extend(std::iter::repeat_n('=', missing));
    URL_SAFE.decode(padded)
}

/// Base64url-decode a segment and parse it as a JSON object.
fn decode_segment(encoded: &str, segment_name: &str) -> Result<JsonObject, AzJwtError> {
    let bytes = decode_base64url(encoded).map_err(|_| AzJwtError::Base64DecodeError {
        segment: segment_name.to_string(),
    })?;

    serde_json::from_slice(&bytes).map_err(|e| AzJwtError::JsonParseError {
        segment: segment_name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    // Header: {"typ":"JWT","alg":"RS256","kid":"abc"}
    // Payload: {"aud":"https://graph.microsoft.com","tid":"t1"}
    const GRAPH_TOKEN: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzI1NiIsImtpZCI6ImFiYyJ9.\
                               eyJhdWQiOiJodHRwczovL2dyYXBoLm1pY3Jvc29mdC5jb20iLCJ0aWQiOiJ0MSJ9.\
                               c2lnbmF0dXJl";

    #[test]
    fn test_decoded_token_debug_redacts_sensitive_fields() {
        let decoded = decode_token(GRAPH_TOKEN).unwrap();
        let debug_output = format!("{:?}", decoded);

        assert!(debug_output.contains("RS256"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("graph.microsoft.com"));
        assert!(!debug_output.contains("c2lnbmF0dXJl"));
    }

    #[test]
    fn test_decode_valid_token() {
        let decoded = decode_token(GRAPH_TOKEN).unwrap();

        assert_eq!(decoded.header["alg"], "RS256");
        assert_eq!(decoded.kid(), Some("abc"));
        assert_eq!(decoded.claim_str("aud"), Some("https://graph.microsoft.com"));
        assert_eq!(decoded.claim_str("tid"), Some("t1"));
        assert_eq!(decoded.signature, "c2lnbmF0dXJl");
    }

    #[test]
    fn test_decode_preserves_header_field_order() {
        let decoded = decode_token(GRAPH_TOKEN).unwrap();
        let keys: Vec<&str> = decoded.header.keys().map(String::as_str).collect();
        assert_eq!(keys, ["typ", "alg", "kid"]);
    }

    #[test]
    fn test_decode_token_with_two_parts_fails() {
        let err = decode_token("eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiIxMjM0In0").unwrap_err();
        assert!(matches!(err, AzJwtError::InvalidTokenFormat));
    }

    #[test]
    fn test_decode_token_with_four_parts_fails() {
        let err = decode_token("a.b.c.d").unwrap_err();
        assert!(matches!(err, AzJwtError::InvalidTokenFormat));
    }

    #[test]
    fn test_decode_token_empty_string_fails() {
        let err = decode_token("").unwrap_err();
        assert!(matches!(err, AzJwtError::InvalidTokenFormat));
    }

    #[test]
    fn test_decode_token_with_empty_signature_fails() {
        let err = decode_token("eyJhbGciOiJub25lIn0.e30.").unwrap_err();
        assert!(matches!(err, AzJwtError::InvalidTokenFormat));
    }

    #[test]
    fn test_decode_token_invalid_base64_header_fails() {
        let err = decode_token("!!!invalid!!!.eyJzdWIiOiIxMjM0In0.sig").unwrap_err();
        assert!(matches!(
            err,
            AzJwtError::Base64DecodeError { segment } if segment == "header"
        ));
    }

    #[test]
    fn test_decode_token_invalid_base64_payload_fails() {
        let err = decode_token("eyJhbGciOiJIUzI1NiJ9.!!!invalid!!!.sig").unwrap_err();
        assert!(matches!(
            err,
            AzJwtError::Base64DecodeError { segment } if segment == "payload"
        ));
    }

    #[test]
    fn test_decode_token_invalid_json_header_fails() {
        // base64url("not json") = "bm90IGpzb24"
        let err = decode_token("bm90IGpzb24.eyJzdWIiOiIxMjM0In0.sig").unwrap_err();
        assert!(matches!(
            err,
            AzJwtError::JsonParseError { segment, .. } if segment == "header"
        ));
    }

    #[test]
    fn test_decode_token_non_object_payload_fails() {
        // base64url("[1,2]") = "WzEsMl0"
        let err = decode_token("eyJhbGciOiJIUzI1NiJ9.WzEsMl0.sig").unwrap_err();
        assert!(matches!(
            err,
            AzJwtError::JsonParseError { segment, .. } if segment == "payload"
        ));
    }

    #[test]
    fn test_decode_base64url_tolerates_missing_padding() {
        // "{}" encodes to "e30=" with padding.
        assert_eq!(decode_base64url("e30").unwrap(), b"{}");
        assert_eq!(decode_base64url("e30=").unwrap(), b"{}");
    }

    #[test]
    fn test_decode_base64url_uses_url_safe_alphabet() {
        // 0xfb 0xff encodes to "-_8" in the URL-safe alphabet.
        assert_eq!(decode_base64url("-_8").unwrap(), vec![0xfb, 0xff]);
        assert!(decode_base64url("+/8").is_err());
    }

    #[test]
    fn test_decode_base64url_rejects_impossible_length() {
        assert!(decode_base64url("abcde").is_err());
    }

    #[test]
    fn test_segments_round_trip_independent_of_padding() {
        let parts: Vec<&str> = GRAPH_TOKEN.split('.').collect();
        for part in &parts {
            let bytes = decode_base64url(part).unwrap();
            assert_eq!(URL_SAFE_NO_PAD.encode(&bytes), *part);

            let padded = URL_SAFE.encode(&bytes);
            assert_eq!(decode_base64url(&padded).unwrap(), bytes);
        }
    }
}
