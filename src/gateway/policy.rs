//! Allowlist policy derived from the configured WMS base URL.

use thiserror::Error;
use url::{Origin, Url};

/// Error building the policy from a configured base URL.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("WMS base URL is not a valid URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("WMS base URL must use http or https, got '{0}'")]
    Scheme(String),

    #[error("WMS base URL has no host")]
    MissingHost,

    #[error("WMS base URL must not carry credentials")]
    Credentials,
}

/// The single upstream origin and path prefix the gateway may contact.
///
/// Built once at startup and shared read-only across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowlistPolicy {
    origin: Origin,
    path_prefix: String,
}

impl AllowlistPolicy {
    /// Derive the policy from the configured upstream base URL.
    ///
    /// A bare `/` path means any path on the origin is allowed. Query and
    /// fragment are ignored.
    pub fn from_base_url(base_url: &str) -> Result<Self, PolicyError> {
        let url = Url::parse(base_url.trim())?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PolicyError::Scheme(url.scheme().to_string()));
        }
        if url.host().is_none() {
            return Err(PolicyError::MissingHost);
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(PolicyError::Credentials);
        }

        let path_prefix = match url.path() {
            "/" => String::new(),
            path => path.to_string(),
        };

        Ok(Self {
            origin: url.origin(),
            path_prefix,
        })
    }

    /// Scheme, host and effective port of the upstream.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Required path prefix, empty when any path is allowed.
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }
}
