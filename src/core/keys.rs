//! Key entry selection and RSA public key reconstruction.
//!
//! A key set entry publishes its key either as an X.509 certificate
//! chain (`x5c`) or as raw modulus/exponent components (`n`, `e`). The
//! representation is resolved once, when the entry is deserialized, into
//! a [`KeyMaterial`] variant.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rsa::{BigUint, RsaPublicKey};
use serde::Deserialize;
use serde_json::{Map, Value};
use x509_parser::parse_x509_certificate;
use x509_parser::public_key::PublicKey;

use crate::core::decoder::decode_base64url;
use crate::core::sanitize_for_display;
use crate::error::AzJwtError;

/// One entry of a key set document.
///
/// Entries without a `kid` are kept but can never be selected.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyEntry {
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(flatten)]
    pub material: KeyMaterial,
}

/// The published form of an entry's key.
///
/// A non-empty certificate chain wins over `n`/`e`. An empty `x5c`
/// array counts as absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "KeyFields")]
pub enum KeyMaterial {
    /// Base64 (standard alphabet) DER certificates, leaf first.
    Certificate { x5c: Vec<String> },
    /// Base64url big-endian modulus and exponent.
    Components { n: String, e: String },
    /// Any other shape, kept so one odd entry does not reject the set.
    Unsupported(Map<String, Value>),
}

/// Key fields as they appear on the wire.
#[derive(Deserialize)]
struct KeyFields {
    x5c: Option<Vec<String>>,
    n: Option<String>,
    e: Option<String>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl From<KeyFields> for KeyMaterial {
    fn from(fields: KeyFields) -> Self {
        match fields {
            KeyFields { x5c: Some(x5c), .. } if !x5c.is_empty() => Self::Certificate { x5c },
            KeyFields {
                n: Some(n),
                e: Some(e),
                ..
            } => Self::Components { n, e },
            KeyFields { x5c: Some(x5c), .. } => Self::Certificate { x5c },
            KeyFields { other, .. } => Self::Unsupported(other),
        }
    }
}

/// Find the entry whose `kid` equals `kid` exactly.
pub fn find_key_entry<'a>(entries: &'a [KeyEntry], kid: &str) -> Option<&'a KeyEntry> {
    entries
        .iter()
        .find(|entry| entry.kid.as_deref() == Some(kid))
}

/// Reconstruct the RSA public key an entry publishes.
///
/// # Errors
///
/// Returns [`AzJwtError::KeyBuildError`] if the certificate or components
/// cannot be decoded, or do not describe a valid RSA key.
pub fn build_public_key(entry: &KeyEntry) -> Result<RsaPublicKey, AzJwtError> {
    let result = match &entry.material {
        KeyMaterial::Certificate { x5c } => key_from_certificate_chain(x5c),
        KeyMaterial::Components { n, e } => key_from_components(n, e),
        KeyMaterial::Unsupported(fields) => Err(match fields.get("kty").and_then(Value::as_str) {
            Some(kty) => format!(
                "key type '{}' has neither x5c nor n/e",
                sanitize_for_display(kty)
            ),
            None => "entry has neither x5c nor n/e".to_string(),
        }),
    };

    result.map_err(|reason| AzJwtError::KeyBuildError {
        kid: sanitize_for_display(entry.kid.as_deref().unwrap_or_default()),
        reason,
    })
}

/// Extract the RSA key from the first certificate of an `x5c` chain.
fn key_from_certificate_chain(x5c: &[String]) -> Result<RsaPublicKey, String> {
    let leaf = x5c
        .first()
        .ok_or_else(|| "x5c certificate chain is empty".to_string())?;
    let der = STANDARD
        .decode(leaf)
        .map_err(|_| "x5c certificate is not valid base64".to_string())?;
    let (_, cert) =
        parse_x509_certificate(&der).map_err(|_| "x5c certificate is not valid DER".to_string())?;

    match cert.public_key().parsed() {
        Ok(PublicKey::RSA(rsa)) => rsa_key(rsa.modulus, rsa.exponent),
        Ok(_) => Err("x5c certificate does not carry an RSA key".to_string()),
        Err(_) => Err("x5c certificate public key cannot be parsed".to_string()),
    }
}

/// Build an RSA key from base64url modulus and exponent.
fn key_from_components(n: &str, e: &str) -> Result<RsaPublicKey, String> {
    let modulus = decode_base64url(n).map_err(|_| "modulus is not valid base64url".to_string())?;
    let exponent =
        decode_base64url(e).map_err(|_| "exponent is not valid base64url".to_string())?;
    rsa_key(&modulus, &exponent)
}

fn rsa_key(modulus: &[u8], exponent: &[u8]) -> Result<RsaPublicKey, String> {
    RsaPublicKey::new(
        BigUint::from_bytes_be(modulus),
        BigUint::from_bytes_be(exponent),
    )
    .map_err(|e| format!("invalid RSA key: {e}"))
}
