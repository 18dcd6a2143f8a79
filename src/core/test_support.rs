//! Shared fixtures for unit tests.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use rsa::RsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use serde_json::{Value, json};

use crate::core::jwks::KeySetDocument;

pub const PRIVATE_KEY_PEM: &str = include_str!("../../tests/fixtures/rsa_private.pem");
pub const OTHER_PRIVATE_KEY_PEM: &str = include_str!("../../tests/fixtures/rsa_other_private.pem");
pub const PUBLIC_KEY_PEM: &str = include_str!("../../tests/fixtures/rsa_public.pem");
pub const JWKS_JSON: &str = include_str!("../../tests/fixtures/azure_jwks.json");

pub const TENANT: &str = "72f988bf-86f1-41af-91ab-2d7cd011db47";

pub fn azure_issuer() -> String {
    format!("https://sts.windows.net/{TENANT}/")
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn key_set() -> KeySetDocument {
    serde_json::from_str(JWKS_JSON).unwrap()
}

pub fn fixture_public_key() -> RsaPublicKey {
    RsaPublicKey::from_public_key_pem(PUBLIC_KEY_PEM).unwrap()
}

fn claims_for(audience: &str) -> Value {
    let now = now();
    json!({
        "aud": audience,
        "iss": azure_issuer(),
        "iat": now - 60,
        "nbf": now - 60,
        "exp": now + 3600,
        "tid": TENANT,
        "oid": "5f1b2b8e-0000-4000-8000-000000000001",
        "ver": "1.0",
    })
}

pub fn management_claims() -> Value {
    claims_for("https://management.azure.com")
}

pub fn graph_claims() -> Value {
    claims_for("https://graph.microsoft.com")
}

/// Sign `claims` as an RS256 token with the given PEM key and `kid`.
pub fn sign_rs256(kid: &str, claims: &Value, private_key_pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// Flip the lowest bit of the first signature byte.
pub fn flip_signature_bit(token: &str) -> String {
    let (signed, signature) = token.rsplit_once('.').unwrap();
    let mut bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();
    bytes[0] ^= 0x01;
    format!("{signed}.{}", URL_SAFE_NO_PAD.encode(bytes))
}
