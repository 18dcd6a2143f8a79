//! Key set discovery and fetching.
//!
//! Maps a token issuer to the URL where it publishes its signing keys
//! (through an explicit policy table), and fetches that key set document
//! over HTTPS.

use std::io::Read;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::core::keys::KeyEntry;
use crate::core::sanitize_for_display;
use crate::error::AzJwtError;

/// Maximum key set response body size in bytes (1 MB).
const JWKS_MAX_RESPONSE_SIZE: u64 = 1_048_576;

/// Default HTTP request timeout for key set endpoints in seconds.
pub const JWKS_TIMEOUT_SECS: u64 = 10;

/// Path Azure AD v1 issuers serve their key set under.
const AZURE_DISCOVERY_KEYS_PATH: &str = "/discovery/v2.0/keys";

/// A published key set: `{"keys": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeySetDocument {
    pub keys: Vec<KeyEntry>,
}

impl KeySetDocument {
    /// Key ids in document order, for diagnostics.
    pub fn key_ids(&self) -> Vec<&str> {
        self.keys.iter().filter_map(|k| k.kid.as_deref()).collect()
    }
}

/// How a matching issuer's key set URL is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryRule {
    /// Strip trailing slashes from the issuer and append a fixed path.
    AppendPath(&'static str),
}

impl DiscoveryRule {
    fn apply(self, issuer: &str) -> String {
        match self {
            Self::AppendPath(path) => format!("{}{}", issuer.trim_end_matches('/'), path),
        }
    }
}

/// One row of the issuer table: a substring pattern and its URL rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuerPolicy {
    pub pattern: &'static str,
    pub rule: DiscoveryRule,
}

/// Ordered table of known issuer families. First match wins.
#[derive(Debug, Clone)]
pub struct IssuerPolicies {
    policies: Vec<IssuerPolicy>,
}

impl Default for IssuerPolicies {
    /// Azure AD v1 issuers only (`https://sts.windows.net/<tenant>/`).
    fn default() -> Self {
        Self::new(vec![IssuerPolicy {
            pattern: "sts.windows.net",
            rule: DiscoveryRule::AppendPath(AZURE_DISCOVERY_KEYS_PATH),
        }])
    }
}

impl IssuerPolicies {
    pub fn new(policies: Vec<IssuerPolicy>) -> Self {
        Self { policies }
    }

    /// Derive the key set URL for an issuer.
    ///
    /// # Errors
    ///
    /// Returns [`AzJwtError::UnsupportedIssuer`] if the issuer is missing,
    /// empty, or matches no row of the table.
    pub fn resolve_discovery_url(&self, issuer: Option<&str>) -> Result<String, AzJwtError> {
        let issuer = issuer
            .filter(|iss| !iss.is_empty())
            .ok_or_else(|| AzJwtError::UnsupportedIssuer {
                issuer: "<missing>".to_string(),
            })?;

        self.policies
            .iter()
            .find(|p| issuer.contains(p.pattern))
            .map(|p| p.rule.apply(issuer))
            .ok_or_else(|| AzJwtError::UnsupportedIssuer {
                issuer: sanitize_for_display(issuer),
            })
    }
}

/// Anything that can hand back a key set document for a URL.
pub trait KeySetSource {
    /// Retrieve the key set published at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`AzJwtError::KeySetFetchError`] if the document cannot be
    /// retrieved or parsed.
    fn fetch_key_set(&self, url: &str) -> Result<KeySetDocument, AzJwtError>;
}

impl<T: KeySetSource + ?Sized> KeySetSource for &T {
    fn fetch_key_set(&self, url: &str) -> Result<KeySetDocument, AzJwtError> {
        (**self).fetch_key_set(url)
    }
}

/// Blocking HTTPS client for key set discovery endpoints.
///
/// The URL comes from the token's own `iss` claim. Only `https` is
/// accepted, redirects are not followed, and both the wait and the body
/// size are capped. Error messages carry the URL without credentials or
/// query.
#[derive(Debug, Clone)]
pub struct HttpKeySetFetcher {
    timeout: Duration,
}

impl Default for HttpKeySetFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(JWKS_TIMEOUT_SECS))
    }
}

impl HttpKeySetFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl KeySetSource for HttpKeySetFetcher {
    fn fetch_key_set(&self, url: &str) -> Result<KeySetDocument, AzJwtError> {
        let shown_url = require_https(url)?;
        debug!(url = %shown_url, timeout = ?self.timeout, "fetching key set");
        download_key_set(url, &shown_url, self.timeout)
    }
}

/// Parse `url` and accept it only with the `https` scheme.
///
/// Returns the URL in its displayable form.
fn require_https(url: &str) -> Result<String, AzJwtError> {
    let parsed = reqwest::Url::parse(url).map_err(|_| AzJwtError::KeySetFetchError {
        url: sanitize_for_display(url),
        reason: "invalid URL for key set endpoint".to_string(),
    })?;
    let shown_url = displayable_url(&parsed);

    if parsed.scheme() != "https" {
        return Err(AzJwtError::KeySetFetchError {
            url: shown_url,
            reason: format!(
                "only HTTPS URLs are accepted for key set endpoints (got scheme '{}')",
                parsed.scheme()
            ),
        });
    }
    Ok(shown_url)
}

/// One GET, no retry. `shown_url` is what error messages report.
fn download_key_set(
    url: &str,
    shown_url: &str,
    timeout: Duration,
) -> Result<KeySetDocument, AzJwtError> {
    let failed = |reason: String| AzJwtError::KeySetFetchError {
        url: shown_url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| failed(transport_failure(&e)))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| failed(transport_failure(&e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("server returned HTTP {}", status.as_u16())));
    }

    let body = read_capped_body(response).map_err(failed)?;
    serde_json::from_slice::<KeySetDocument>(&body)
        .map_err(|_| failed("response is not a valid key set document".to_string()))
}

/// Read at most `JWKS_MAX_RESPONSE_SIZE` bytes of the key set body.
fn read_capped_body(response: reqwest::blocking::Response) -> Result<Vec<u8>, String> {
    let mut body = Vec::new();
    response
        .take(JWKS_MAX_RESPONSE_SIZE + 1)
        .read_to_end(&mut body)
        .map_err(|e| {
            if io_timed_out(&e) {
                "connection timed out".to_string()
            } else {
                "failed to read response body".to_string()
            }
        })?;

    if body.len() as u64 > JWKS_MAX_RESPONSE_SIZE {
        return Err(format!(
            "response exceeds maximum size of {JWKS_MAX_RESPONSE_SIZE} bytes"
        ));
    }
    Ok(body)
}

/// The body reader reports client timeouts as wrapped I/O errors.
fn io_timed_out(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::TimedOut
        || err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
            .is_some_and(reqwest::Error::is_timeout)
}

/// Short reason for a failed request. Never echoes the library message.
fn transport_failure(err: &reqwest::Error) -> String {
    let reason = if err.is_timeout() {
        "connection timed out"
    } else if err.is_connect() {
        "failed to connect to server"
    } else if err.is_redirect() {
        "too many redirects"
    } else {
        "request failed"
    };
    reason.to_string()
}

/// `url` reduced to scheme, host, port and path.
fn displayable_url(url: &reqwest::Url) -> String {
    let mut shown = url.clone();
    let _ = shown.set_username("");
    let _ = shown.set_password(None);
    shown.set_query(None);
    shown.set_fragment(None);
    shown.to_string()
}
