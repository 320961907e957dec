//! Bounded upstream fetching.
//!
//! # Responsibilities
//! - Issue one GET per validated URL
//! - Bound the whole exchange with a wall-clock timeout
//! - Cap the number of body bytes read
//! - Report the declared content type and the decoded body
//!
//! # Design Decisions
//! - Redirects are never followed; an upstream 3xx is an error
//! - Oversized bodies are an error, never silently truncated
//! - Body decoding is lossy so malformed upstream bytes cannot fail a request
//! - No retries: the caller re-issues on failure

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{redirect, Client, StatusCode};
use thiserror::Error;

use crate::config::FetchConfig;
use crate::gateway::validator::ValidatedUrl;

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Upstream or network failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("response too large (limit {limit} bytes)")]
    TooLarge { limit: usize },

    #[error("upstream responded with HTTP {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// Short stable tag for logs and metrics.
    pub fn tag(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::TooLarge { .. } => "too_large",
            FetchError::Status(_) => "upstream_status",
            FetchError::Transport(e) if e.is_connect() => "connect",
            FetchError::Transport(_) => "transport",
        }
    }
}

/// Decoded upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub body: String,
    /// Lowercased media type without parameters.
    pub content_type: String,
}

/// Outbound client enforcing timeout and size limits.
#[derive(Debug, Clone)]
pub struct BoundedFetcher {
    client: Client,
    timeout: Duration,
    max_bytes: usize,
}

impl BoundedFetcher {
    /// Build the fetcher and its shared HTTP client.
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            timeout,
            max_bytes: config.max_bytes,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Fetch `url`, bounded by the configured timeout and byte cap.
    pub async fn fetch(&self, url: &ValidatedUrl) -> Result<FetchResult, FetchError> {
        tokio::time::timeout(self.timeout, self.fetch_unbounded(url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))?
    }

    async fn fetch_unbounded(&self, url: &ValidatedUrl) -> Result<FetchResult, FetchError> {
        let mut response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let content_type = media_type(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );

        if let Some(len) = response.content_length() {
            if len > self.max_bytes as u64 {
                return Err(FetchError::TooLarge { limit: self.max_bytes });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge { limit: self.max_bytes });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchResult {
            body: String::from_utf8_lossy(&body).into_owned(),
            content_type,
        })
    }
}

/// Strip parameters from a `Content-Type` value and lowercase it.
fn media_type(header: Option<&str>) -> String {
    let media = header
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if media.is_empty() {
        DEFAULT_CONTENT_TYPE.to_string()
    } else {
        media
    }
}
