//! CLI argument definitions for azjwt.
//!
//! Uses `clap` derive macros to define the command-line interface.
//!
//! # Security
//!
//! `Cli` implements a custom `Debug` that redacts the token to prevent
//! accidental leakage through debug formatting, error chains, or logging.

use std::fmt;

use clap::Parser;
use zeroize::Zeroizing;

use crate::core::jwks::JWKS_TIMEOUT_SECS;

/// Inspect an Azure AD access token and verify it against the key set
/// published by its issuer.
///
/// Management tokens (aud https://management.azure.com) get a full RS256
/// signature check. Graph tokens (aud https://graph.microsoft.com) get an
/// issuer/tenant structure check only.
#[derive(Parser)]
#[command(name = "azjwt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The compact JWT to inspect.
    #[arg(value_name = "TOKEN", value_parser = parse_zeroizing_string)]
    pub token: Zeroizing<String>,

    /// Output raw JSON (machine-readable).
    #[arg(long)]
    pub json: bool,

    /// Timeout in seconds for fetching the issuer's key set.
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = JWKS_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..=120)
    )]
    pub timeout: u64,

    /// Log pipeline steps to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse a string into a `Zeroizing<String>` for secure CLI arguments.
fn parse_zeroizing_string(s: &str) -> Result<Zeroizing<String>, std::convert::Infallible> {
    Ok(Zeroizing::new(s.to_string()))
}

/// Custom `Debug` that redacts the token field.
impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("token", &"[REDACTED]")
            .field("json", &self.json)
            .field("timeout", &self.timeout)
            .field("verbose", &self.verbose)
            .finish()
    }
}
