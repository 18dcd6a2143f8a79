//! Handler for inspecting and verifying a token.
//!
//! Runs the verification pipeline with an HTTPS key set fetcher, prints
//! the report to stdout and any failure diagnostic to stderr.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;

use crate::cli::Cli;
use crate::core::jwks::HttpKeySetFetcher;
use crate::core::validator::Verdict;
use crate::core::verifier::{Inspection, Verifier};
use crate::display::json_printer::render_json;
use crate::display::report::render_report;
use crate::error::AzJwtError;

/// Exit code when the tool cannot judge the token.
const EXIT_INDETERMINATE: u8 = 2;

/// Execute the inspection with the given arguments.
pub fn execute(args: &Cli) -> Result<ExitCode> {
    let fetcher = HttpKeySetFetcher::new(Duration::from_secs(args.timeout));
    let inspection = Verifier::new(fetcher).inspect(args.token.trim());

    if let Some(output) = render(&inspection, args.json) {
        println!("{output}");
    }
    if let Some(err) = inspection.failure() {
        eprintln!("Error: {}", failure_message(&inspection, err));
    }

    Ok(exit_code(&inspection.verdict()))
}

fn render(inspection: &Inspection, json: bool) -> Option<String> {
    if json {
        return Some(render_json(inspection));
    }
    let decoded = inspection.decoded.as_ref()?;
    let text = render_report(decoded, inspection.policy, &inspection.verdict());
    Some(text.trim_end().to_string())
}

/// The error plus how far the pipeline got before it stopped.
fn failure_message(inspection: &Inspection, err: &AzJwtError) -> String {
    format!("{err} (stopped after stage: {})", inspection.stage)
}

/// 0 for a valid token, 1 for an invalid one, 2 when no verdict was possible.
fn exit_code(verdict: &Verdict) -> ExitCode {
    match verdict {
        Verdict::Valid => ExitCode::SUCCESS,
        Verdict::Invalid { .. } => ExitCode::FAILURE,
        Verdict::Indeterminate { .. } => ExitCode::from(EXIT_INDETERMINATE),
    }
}
