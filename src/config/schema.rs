//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream WMS service the gateway may contact.
    pub wms: WmsConfig,

    /// Outbound fetch limits.
    pub fetch: FetchConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Session gate settings.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
        }
    }
}

/// Upstream WMS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WmsConfig {
    /// Base URL; its origin and path form the allowlist policy.
    pub base_url: String,

    /// Default layer shown on the map.
    pub layer: String,

    /// Server flavour tag (e.g. "geoserver", "mapserver").
    pub server_type: String,
}

impl Default for WmsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/geoserver/wms".to_string(),
            layer: "topp:states".to_string(),
            server_type: "geoserver".to_string(),
        }
    }
}

/// Outbound fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Wall-clock limit for one upstream exchange in seconds.
    pub timeout_secs: u64,

    /// Maximum response body size in bytes.
    pub max_bytes: usize,

    /// User-Agent sent upstream.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 12,
            max_bytes: 1_000_000,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Inbound timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time for handling one inbound request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Session gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Require a session for protected routes.
    pub enabled: bool,

    /// Accepted session tokens (Bearer header or `session` cookie).
    pub session_tokens: Vec<String>,

    /// Where unauthenticated browsers are sent.
    pub login_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session_tokens: Vec::new(),
            login_path: "/login".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
