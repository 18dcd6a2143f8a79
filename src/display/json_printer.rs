//! Machine-readable JSON output.

use serde_json::{Value, json};

use crate::core::verifier::Inspection;

/// Render an inspection as pretty-printed JSON.
///
/// Fields: `header`, `claims`, `signature` (null when the token could
/// not be decoded), `valid`, `verdict`, `reason`, `policy`, and the last
/// completed `stage`.
pub fn render_json(inspection: &Inspection) -> String {
    let verdict = inspection.verdict();
    let decoded = inspection.decoded.as_ref();

    let value = json!({
        "header": decoded.map(|d| Value::Object(d.header.clone())),
        "claims": decoded.map(|d| Value::Object(d.claims.clone())),
        "signature": decoded.map(|d| d.signature.clone()),
        "valid": verdict.is_valid(),
        "verdict": verdict.label(),
        "reason": verdict.reason(),
        "policy": inspection.policy.map(|p| p.to_string()),
        "stage": inspection.stage.to_string(),
    });

    // Serializing a `Value` cannot fail.
    serde_json::to_string_pretty(&value).unwrap_or_default()
}
