//! The verification pipeline.
//!
//! Decode → fetch key set → resolve key → audience policy. Each stage
//! fails fast with a specific error; the decoded token is kept whenever
//! decoding succeeded so the caller can still display it.

use std::fmt;

use rsa::RsaPublicKey;
use tracing::debug;

use crate::core::decoder::{DecodedToken, decode_token};
use crate::core::issuer::is_issuer_consistent;
use crate::core::jwks::{IssuerPolicies, KeySetSource};
use crate::core::keys::{KeyEntry, build_public_key, find_key_entry};
use crate::core::policy::AudiencePolicy;
use crate::core::sanitize_for_display;
use crate::core::validator::Verdict;
use crate::error::AzJwtError;

/// Pipeline stages, in order. Records how far an inspection got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    Decoded,
    KeySetFetched,
    KeyResolved,
    Verified,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Decoded => "decoded",
            Self::KeySetFetched => "key-set-fetched",
            Self::KeyResolved => "key-resolved",
            Self::Verified => "verified",
        })
    }
}

/// Everything known about a token after running the pipeline.
#[derive(Debug)]
pub struct Inspection {
    /// The decoded token, if decoding succeeded.
    pub decoded: Option<DecodedToken>,
    /// Last stage completed.
    pub stage: Stage,
    /// The policy applied, once the key was resolved and `aud` known.
    pub policy: Option<AudiencePolicy>,
    /// The policy's verdict, or the error that stopped the pipeline.
    pub outcome: Result<Verdict, AzJwtError>,
}

impl Inspection {
    /// The overall verdict. Only a policy can produce `Valid`.
    pub fn verdict(&self) -> Verdict {
        match &self.outcome {
            Ok(verdict) => verdict.clone(),
            Err(err) => Verdict::from_error(err),
        }
    }

    /// The error that stopped the pipeline, if any.
    pub fn failure(&self) -> Option<&AzJwtError> {
        self.outcome.as_ref().err()
    }
}

/// Runs the verification pipeline against a key set source.
#[derive(Debug)]
pub struct Verifier<S> {
    source: S,
    issuers: IssuerPolicies,
}

impl<S: KeySetSource> Verifier<S> {
    /// A verifier for Azure AD v1 issuers.
    pub fn new(source: S) -> Self {
        Self::with_issuer_policies(source, IssuerPolicies::default())
    }

    /// A verifier with its own issuer discovery table.
    pub fn with_issuer_policies(source: S, issuers: IssuerPolicies) -> Self {
        Self { source, issuers }
    }

    /// Decode, resolve the signing key for, and judge `token`.
    ///
    /// Exactly one key set fetch happens per call, once decoding succeeds
    /// and the issuer is supported.
    pub fn inspect(&self, token: &str) -> Inspection {
        let decoded = match decode_token(token) {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!(error = %err, "token could not be decoded");
                return Inspection {
                    decoded: None,
                    stage: Stage::Start,
                    policy: None,
                    outcome: Err(err),
                };
            }
        };

        debug!(
            issuer_consistent = is_issuer_consistent(&decoded.claims),
            "token decoded"
        );
        let mut stage = Stage::Decoded;
        let mut policy = None;
        let outcome = self.judge(token, &decoded, &mut stage, &mut policy);
        if let Err(err) = &outcome {
            debug!(?stage, error = %err, "verification stopped");
        }

        Inspection {
            decoded: Some(decoded),
            stage,
            policy,
            outcome,
        }
    }

    fn judge(
        &self,
        token: &str,
        decoded: &DecodedToken,
        stage: &mut Stage,
        policy: &mut Option<AudiencePolicy>,
    ) -> Result<Verdict, AzJwtError> {
        let url = self
            .issuers
            .resolve_discovery_url(decoded.claim_str("iss"))?;
        let key_set = self.source.fetch_key_set(&url)?;
        debug!(kids = ?key_set.key_ids(), "available key ids");
        *stage = Stage::KeySetFetched;

        let key = resolve_key(decoded, &key_set.keys)?;
        *stage = Stage::KeyResolved;

        let selected = AudiencePolicy::for_audience(decoded.claim_str("aud"))?;
        *policy = Some(selected);
        debug!(policy = %selected, "applying audience policy");

        let verdict = selected.evaluate(token, decoded, &key);
        *stage = Stage::Verified;
        Ok(verdict)
    }
}

/// Select the entry for the token's `kid` and build its key.
fn resolve_key(decoded: &DecodedToken, entries: &[KeyEntry]) -> Result<RsaPublicKey, AzJwtError> {
    let kid = decoded.kid().ok_or(AzJwtError::MissingKeyId)?;
    let entry = find_key_entry(entries, kid).ok_or_else(|| AzJwtError::KeyNotFound {
        kid: sanitize_for_display(kid),
    })?;
    build_public_key(entry)
}
