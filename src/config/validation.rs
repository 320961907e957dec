//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the WMS base URL can form an allowlist policy
//! - Validate value ranges (timeouts > 0, size cap > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::gateway::AllowlistPolicy;

/// A single semantic problem with the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("wms.base_url: {0}")]
    BaseUrl(#[from] crate::gateway::PolicyError),

    #[error("fetch.timeout_secs must be greater than zero")]
    FetchTimeout,

    #[error("fetch.max_bytes must be greater than zero")]
    MaxBytes,

    #[error("timeouts.request_secs ({request}) must exceed fetch.timeout_secs ({fetch})")]
    RequestTimeout { request: u64, fetch: u64 },

    #[error("auth.login_path must start with '/'")]
    LoginPath,

    #[error("auth.session_tokens must not contain empty tokens")]
    EmptyToken,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check `config` for semantic problems, collecting every one found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if let Err(e) = AllowlistPolicy::from_base_url(&config.wms.base_url) {
        errors.push(e.into());
    }

    if config.fetch.timeout_secs == 0 {
        errors.push(ValidationError::FetchTimeout);
    }
    if config.fetch.max_bytes == 0 {
        errors.push(ValidationError::MaxBytes);
    }
    if config.timeouts.request_secs <= config.fetch.timeout_secs {
        errors.push(ValidationError::RequestTimeout {
            request: config.timeouts.request_secs,
            fetch: config.fetch.timeout_secs,
        });
    }

    if !config.auth.login_path.starts_with('/') {
        errors.push(ValidationError::LoginPath);
    }
    if config.auth.session_tokens.iter().any(|t| t.trim().is_empty()) {
        errors.push(ValidationError::EmptyToken);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "localhost".into();
        config.wms.base_url = "ftp://maps.example.org/wms".into();
        config.fetch.max_bytes = 0;
        config.auth.login_path = "login".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::BindAddress(_)));
        assert!(matches!(errors[1], ValidationError::BaseUrl(_)));
        assert!(matches!(errors[2], ValidationError::MaxBytes));
        assert!(matches!(errors[3], ValidationError::LoginPath));
    }

    #[test]
    fn test_inbound_timeout_must_cover_fetch() {
        let mut config = GatewayConfig::default();
        config.timeouts.request_secs = config.fetch.timeout_secs;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::RequestTimeout { .. }));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
