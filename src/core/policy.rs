//! Audience-selected verification policies.
//!
//! Management-plane tokens get a full RS256 check. Graph tokens carry a
//! header nonce that makes their signature unverifiable outside Microsoft
//! Graph, so they are judged on issuer/tenant structure only.

use std::fmt;

use rsa::RsaPublicKey;

use crate::core::decoder::DecodedToken;
use crate::core::issuer::check_issuer_structure;
use crate::core::sanitize_for_display;
use crate::core::validator::{Verdict, verify_rs256};
use crate::error::AzJwtError;

pub const GRAPH_AUDIENCE: &str = "https://graph.microsoft.com";
pub const MANAGEMENT_AUDIENCE: &str = "https://management.azure.com";

/// Audience lookup table, matched on exact string equality.
const AUDIENCE_POLICIES: &[(&str, AudiencePolicy)] = &[
    (GRAPH_AUDIENCE, AudiencePolicy::GraphStructural),
    (MANAGEMENT_AUDIENCE, AudiencePolicy::ManagementSignature),
];

/// How a token of a given audience is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudiencePolicy {
    /// Issuer/tenant structure check, signature not verified.
    GraphStructural,
    /// Full RS256 signature and claim verification.
    ManagementSignature,
}

impl AudiencePolicy {
    /// Select the policy for an `aud` claim.
    ///
    /// # Errors
    ///
    /// Returns [`AzJwtError::UnrecognizedAudience`] if the audience is
    /// missing, not a string, or not in the table.
    pub fn for_audience(audience: Option<&str>) -> Result<Self, AzJwtError> {
        let audience = audience.ok_or_else(|| AzJwtError::UnrecognizedAudience {
            audience: "<missing>".to_string(),
        })?;
        AUDIENCE_POLICIES
            .iter()
            .find(|(aud, _)| *aud == audience)
            .map(|(_, policy)| *policy)
            .ok_or_else(|| AzJwtError::UnrecognizedAudience {
                audience: sanitize_for_display(audience),
            })
    }

    /// Judge a decoded token. `token` is the original compact string.
    pub fn evaluate(self, token: &str, decoded: &DecodedToken, key: &RsaPublicKey) -> Verdict {
        let result = match self {
            Self::GraphStructural => {
                check_issuer_structure(&decoded.claims).map_err(|stage| {
                    AzJwtError::StructuralInvalid {
                        stage: stage.to_string(),
                    }
                })
            }
            Self::ManagementSignature => verify_rs256(
                token,
                key,
                MANAGEMENT_AUDIENCE,
                decoded.claim_str("iss").unwrap_or_default(),
            ),
        };

        match result {
            Ok(()) => Verdict::Valid,
            Err(err) => Verdict::Invalid {
                reason: err.to_string(),
            },
        }
    }

    /// Comment shown next to a passing verdict.
    pub fn pass_note(self) -> &'static str {
        match self {
            Self::GraphStructural => {
                "Token PASSED iss/tid structure verification. Note, it's not signature verification."
            }
            Self::ManagementSignature => "Token PASSED signature verification",
        }
    }

    /// Comment shown next to a failing verdict.
    pub fn fail_note(self) -> &'static str {
        match self {
            Self::GraphStructural => "Token FAILED iss/tid structure verification",
            Self::ManagementSignature => "Token FAILED signature verification",
        }
    }
}

impl fmt::Display for AudiencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GraphStructural => "graph-structural",
            Self::ManagementSignature => "management-signature",
        })
    }
}
