//! Shared fixtures for the CLI integration tests.
//!
//! Tokens here never reach a supported issuer, so no test touches the
//! network.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

/// A token with only two segments.
pub const MALFORMED_TOKEN_TWO_PARTS: &str = "eyJhbGciOiJSUzI1NiJ9.eyJzdWIiOiIxMjM0NTY3ODkwIn0";

/// A completely invalid token string.
pub const INVALID_TOKEN: &str = "not-a-valid-jwt";

/// A v2.0 issuer, which has no key discovery rule.
pub const V2_ISSUER: &str =
    "https://login.microsoftonline.com/72f988bf-86f1-41af-91ab-2d7cd011db47/v2.0";

/// Build a token from JSON header and claims with a placeholder signature.
pub fn unsigned_token(header: &Value, claims: &Value) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode(b"placeholder-signature")
    )
}

/// A management token issued by the v2.0 endpoint.
pub fn v2_issuer_token() -> String {
    unsigned_token(
        &json!({"typ": "JWT", "alg": "RS256", "kid": "cert-key"}),
        &json!({
            "aud": "https://management.azure.com",
            "iss": V2_ISSUER,
            "tid": "72f988bf-86f1-41af-91ab-2d7cd011db47",
            "exp": 1_705_329_000,
        }),
    )
}
