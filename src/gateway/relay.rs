//! Content-type-aware response relay.
//!
//! JSON bodies are passed through as structured data. Anything else, and
//! JSON that fails to parse, is wrapped as `{"raw", "content_type"}`.

use serde_json::{json, Value};

use crate::gateway::fetcher::FetchResult;

/// Turn an upstream result into the response body. Never fails.
pub fn relay(result: FetchResult) -> Value {
    if is_json(&result.content_type) {
        match serde_json::from_str::<Value>(&result.body) {
            Ok(value) => return value,
            Err(e) => {
                tracing::debug!(
                    content_type = %result.content_type,
                    error = %e,
                    "Upstream declared JSON but body did not parse; relaying raw text"
                );
            }
        }
    }

    json!({
        "raw": result.body,
        "content_type": result.content_type,
    })
}

fn is_json(content_type: &str) -> bool {
    content_type.starts_with("application/json") || content_type.ends_with("+json")
}
