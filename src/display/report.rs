//! Plain-text report of a token and its verdict.

use std::fmt::Write;

use serde_json::Value;

use crate::core::decoder::{DecodedToken, JsonObject};
use crate::core::policy::AudiencePolicy;
use crate::core::validator::Verdict;
use crate::display::timestamps;

const ACCESS_TOKEN_DOCS: &str =
    "https://learn.microsoft.com/en-us/entra/identity-platform/access-tokens";

/// Render header, claims, signature and status as text.
///
/// String values are written verbatim; other values as compact JSON.
pub fn render_report(
    decoded: &DecodedToken,
    policy: Option<AudiencePolicy>,
    verdict: &Verdict,
) -> String {
    let mut out = String::new();

    out.push_str("header:\n");
    write_fields(&mut out, &decoded.header, false);
    out.push_str("claims:\n");
    write_fields(&mut out, &decoded.claims, true);
    let _ = writeln!(out, "signature: {}  # In base64 format", decoded.signature);

    out.push_str("status:\n");
    match policy {
        Some(policy) => {
            let _ = writeln!(out, "  policy: {policy}");
            if policy == AudiencePolicy::GraphStructural {
                let _ = writeln!(out, "  # See {ACCESS_TOKEN_DOCS}");
            }
        }
        None => out.push_str("  policy: none\n"),
    }
    let _ = writeln!(
        out,
        "  valid: {}  # {}",
        verdict.is_valid(),
        status_note(policy, verdict)
    );

    out
}

/// Short comment explaining the verdict.
pub fn status_note(policy: Option<AudiencePolicy>, verdict: &Verdict) -> String {
    match (verdict, policy) {
        (Verdict::Valid, Some(policy)) => policy.pass_note().to_string(),
        (Verdict::Valid, None) => "Token PASSED verification".to_string(),
        (Verdict::Invalid { reason }, Some(policy)) => format!("{}: {reason}", policy.fail_note()),
        (Verdict::Invalid { reason }, None) => format!("Token FAILED verification: {reason}"),
        (Verdict::Indeterminate { reason }, _) => format!("Token NOT JUDGED: {reason}"),
    }
}

fn write_fields(out: &mut String, fields: &JsonObject, annotate_times: bool) {
    for (key, value) in fields {
        let _ = write!(out, "  {key}: {}", display_value(value));
        if let Some(note) = annotate_times
            .then(|| timestamps::annotate(key, value))
            .flatten()
        {
            let _ = write!(out, "  # {note}");
        }
        out.push('\n');
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
