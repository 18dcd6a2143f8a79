//! Issuer/tenant structural consistency check.
//!
//! Graph API tokens cannot be signature-checked by a third party, so
//! they are judged on whether the `iss` claim is structurally plausible
//! for the `tid` (tenant id) claim.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::core::decoder::JsonObject;

const TENANT_PLACEHOLDER: &str = "{tenantid}";

/// The first rule of the structural check that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IssuerCheck {
    #[error("missing 'tid' or 'iss' claim")]
    MissingClaims,
    #[error("templated issuer does not match tenant id")]
    TemplateMismatch,
    #[error("issuer does not contain tenant id")]
    TenantNotInIssuer,
    #[error("issuer path does not start with tenant id")]
    PathMismatch,
}

/// Whether `iss` and `tid` are structurally consistent.
pub fn is_issuer_consistent(claims: &JsonObject) -> bool {
    check_issuer_structure(claims).is_ok()
}

/// Run the structural rules in order, stopping at the first failure.
///
/// 1. `tid` and `iss` are present, non-empty strings.
/// 2. If `iss` contains the `{tenantid}` placeholder, substituting `tid`
///    must leave `iss` unchanged (case-insensitive).
/// 3. `tid` is a substring of `iss` (case-insensitive).
/// 4. The first non-empty path segment of `iss` equals `tid`
///    (case-insensitive).
///
/// Rule 2 compares the substituted issuer with the original one, so a
/// templated issuer only passes when `tid` is literally `{tenantid}`.
/// The observed behavior is kept as is.
pub fn check_issuer_structure(claims: &JsonObject) -> Result<(), IssuerCheck> {
    let string_claim = |name: &str| {
        claims
            .get(name)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    };
    let (Some(tid), Some(iss)) = (string_claim("tid"), string_claim("iss")) else {
        return Err(IssuerCheck::MissingClaims);
    };

    let tid_lower = tid.to_lowercase();
    let iss_lower = iss.to_lowercase();

    if iss_lower.contains(TENANT_PLACEHOLDER)
        && iss_lower.replace(TENANT_PLACEHOLDER, &tid_lower) != iss_lower
    {
        return Err(IssuerCheck::TemplateMismatch);
    }

    if !iss_lower.contains(&tid_lower) {
        return Err(IssuerCheck::TenantNotInIssuer);
    }

    let first_segment = reqwest::Url::parse(iss).ok().and_then(|url| {
        url.path_segments()?
            .find(|segment| !segment.is_empty())
            .map(str::to_lowercase)
    });
    if first_segment.as_deref() != Some(tid_lower.as_str()) {
        debug!(segment = ?first_segment, "issuer path segment mismatch");
        return Err(IssuerCheck::PathMismatch);
    }

    Ok(())
}
