//! Integration tests for the azjwt CLI.
//!
//! Tests argument parsing, help text, version output, report rendering
//! and exit codes for inputs that never require a key set fetch.

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

fn cmd() -> assert_cmd::Command {
    cargo_bin_cmd!("azjwt")
}

// --- Help and Version ---

#[test]
fn test_no_args_shows_usage_hint() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_help_flag_shows_description() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Azure AD"))
        .stdout(predicate::str::contains("--timeout"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("azjwt"))
        .stdout(predicate::str::contains("0.1.0"));
}

// --- Argument validation ---

#[test]
fn test_extra_positional_argument_is_rejected() {
    cmd()
        .args(["a.b.c", "d.e.f"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn test_timeout_out_of_range_is_rejected() {
    cmd()
        .args(["--timeout", "0", "a.b.c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout"));
}

// --- Malformed tokens ---

#[test]
fn test_malformed_token_fails() {
    cmd()
        .arg(common::INVALID_TOKEN)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("invalid token format"));
}

#[test]
fn test_two_part_token_fails() {
    cmd()
        .arg(common::MALFORMED_TOKEN_TWO_PARTS)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid token format"));
}

#[test]
fn test_bad_base64_payload_reports_segment() {
    cmd()
        .arg("eyJhbGciOiJSUzI1NiJ9.!!!.c2ln")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("payload"));
}

// --- Unsupported issuer ---

#[test]
fn test_unsupported_issuer_is_indeterminate() {
    cmd()
        .arg(common::v2_issuer_token())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("header:"))
        .stdout(predicate::str::contains("  kid: cert-key"))
        .stdout(predicate::str::contains("claims:"))
        .stdout(predicate::str::contains("2024-Jan-15 14:30:00 UTC <= Expires"))
        .stdout(predicate::str::contains("# In base64 format"))
        .stdout(predicate::str::contains("  valid: false  # Token NOT JUDGED"))
        .stderr(predicate::str::contains("unsupported issuer"))
        .stderr(predicate::str::contains("stopped after stage: decoded"));
}

#[test]
fn test_surrounding_whitespace_is_ignored() {
    cmd()
        .arg(format!("  {}\n", common::v2_issuer_token()))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported issuer"));
}

#[test]
fn test_missing_issuer_is_indeterminate() {
    let token = common::unsigned_token(
        &serde_json::json!({"alg": "RS256", "kid": "k1"}),
        &serde_json::json!({"aud": "https://graph.microsoft.com"}),
    );
    cmd()
        .arg(token)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<missing>"));
}

// --- JSON output ---

#[test]
fn test_json_output_for_unsupported_issuer() {
    let output = cmd()
        .arg("--json")
        .arg(common::v2_issuer_token())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));

    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["header"]["kid"], "cert-key");
    assert_eq!(parsed["claims"]["iss"], common::V2_ISSUER);
    assert_eq!(parsed["valid"], false);
    assert_eq!(parsed["verdict"], "indeterminate");
    assert!(parsed["policy"].is_null());
    assert_eq!(parsed["stage"], "decoded");
}

#[test]
fn test_json_output_for_malformed_token() {
    let output = cmd()
        .args(["--json", common::INVALID_TOKEN])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let parsed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed["header"].is_null());
    assert_eq!(parsed["verdict"], "invalid");
    assert_eq!(parsed["stage"], "start");
}

// --- Logging ---

#[test]
fn test_verbose_logs_go_to_stderr() {
    let output = cmd()
        .args(["--verbose", "--json"])
        .arg(common::v2_issuer_token())
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DEBUG"));
    assert!(serde_json::from_slice::<Value>(&output.stdout).is_ok());
}
