//! Feature-info URL validation.
//!
//! # Responsibilities
//! - Bound candidate length before parsing
//! - Restrict scheme to http/https
//! - Pin the origin to the configured upstream (SSRF defense)
//! - Pin the path to the configured prefix after dot-segment resolution
//! - Restrict the query to a single WMS operation
//!
//! # Design Decisions
//! - Checks run in a fixed order; first failure wins
//! - Pure function: no I/O, no state, no rewriting of the candidate
//! - Path comparison uses the parser's normalized path, so `..` segments
//!   cannot walk out of the prefix

use std::fmt;

use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;

use crate::gateway::policy::AllowlistPolicy;

/// Maximum candidate length in characters.
pub const MAX_URL_CHARS: usize = 8000;

/// The only WMS operation the gateway forwards.
const ALLOWED_OPERATION: &str = "getfeatureinfo";

/// Why a candidate URL was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("FeatureInfo URL is too long.")]
    TooLong,

    #[error("Only http/https FeatureInfo URLs are allowed.")]
    BadScheme,

    #[error("FeatureInfo URL host must match configured WMS_BASE_URL.")]
    OriginMismatch,

    #[error("FeatureInfo URL path must match configured WMS_BASE_URL.")]
    PathMismatch,

    #[error("URL must be a WMS GetFeatureInfo request.")]
    WrongOperation,
}

impl Rejection {
    /// Short stable tag for logs and metrics.
    pub fn tag(&self) -> &'static str {
        match self {
            Rejection::TooLong => "too_long",
            Rejection::BadScheme => "bad_scheme",
            Rejection::OriginMismatch => "origin_mismatch",
            Rejection::PathMismatch => "path_mismatch",
            Rejection::WrongOperation => "wrong_operation",
        }
    }
}

/// A candidate URL that passed every check.
///
/// Holds the caller's string unchanged. Only [`validate`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl(String);

impl ValidatedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A check over a parsed candidate.
type Step = fn(&Url, &AllowlistPolicy) -> Result<(), Rejection>;

/// Checks that run after the candidate parsed as http(s), in order.
const STEPS: &[Step] = &[check_origin, check_path_prefix, check_operation];

/// Validate `candidate` against `policy`.
pub fn validate(candidate: &str, policy: &AllowlistPolicy) -> Result<ValidatedUrl, Rejection> {
    check_length(candidate)?;
    let parsed = parse_http(candidate)?;

    for step in STEPS {
        step(&parsed, policy)?;
    }

    Ok(ValidatedUrl(candidate.to_string()))
}

fn check_length(candidate: &str) -> Result<(), Rejection> {
    // Byte length bounds char count from above.
    if candidate.len() > MAX_URL_CHARS && candidate.chars().count() > MAX_URL_CHARS {
        return Err(Rejection::TooLong);
    }
    Ok(())
}

fn parse_http(candidate: &str) -> Result<Url, Rejection> {
    let parsed = Url::parse(candidate).map_err(|_| Rejection::BadScheme)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(Rejection::BadScheme),
    }
}

fn check_origin(url: &Url, policy: &AllowlistPolicy) -> Result<(), Rejection> {
    if !url.username().is_empty() || url.password().is_some() {
        return Err(Rejection::OriginMismatch);
    }
    if url.origin() != *policy.origin() {
        return Err(Rejection::OriginMismatch);
    }
    Ok(())
}

fn check_path_prefix(url: &Url, policy: &AllowlistPolicy) -> Result<(), Rejection> {
    let prefix = policy.path_prefix();
    if prefix.is_empty() {
        return Ok(());
    }
    if !url.path().starts_with(prefix) || has_encoded_traversal(url.path()) {
        return Err(Rejection::PathMismatch);
    }
    Ok(())
}

/// The parser resolves literal and `%2e` dot segments but leaves `%2f`/`%5c`
/// alone; upstreams that decode those before routing would still climb out.
fn has_encoded_traversal(path: &str) -> bool {
    percent_decode_str(path)
        .decode_utf8_lossy()
        .split(['/', '\\'])
        .any(|segment| segment == "..")
}

fn check_operation(url: &Url, _policy: &AllowlistPolicy) -> Result<(), Rejection> {
    let operation = url
        .query_pairs()
        .find(|(key, _)| key.eq_ignore_ascii_case("request"))
        .map(|(_, value)| value.to_lowercase())
        .unwrap_or_default();

    if operation != ALLOWED_OPERATION {
        return Err(Rejection::WrongOperation);
    }
    Ok(())
}
