//! Human-readable annotations for temporal claims.

use chrono::DateTime;
use serde_json::Value;

/// Label for claims that carry a Unix timestamp.
fn timestamp_label(claim: &str) -> Option<&'static str> {
    match claim {
        "exp" => Some("Expires"),
        "nbf" => Some("Not before"),
        "iat" => Some("Issued at"),
        "xms_tcdt" => Some("Token creation time"),
        _ => None,
    }
}

/// Format Unix seconds as `2024-Jan-15 14:30:00 UTC`.
pub fn format_unix(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%b-%d %H:%M:%S UTC").to_string())
}

/// Annotation for a temporal claim, e.g. `2024-Jan-15 14:30:00 UTC <= Expires`.
///
/// Returns `None` for other claims and for values that are not numbers.
pub fn annotate(claim: &str, value: &Value) -> Option<String> {
    let label = timestamp_label(claim)?;
    let secs = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))?;
    Some(format!("{} <= {label}", format_unix(secs)?))
}
