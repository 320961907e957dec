//! Authenticated-session gate.
//!
//! Login, registration and session storage live outside this service. The
//! gateway only needs a yes/no answer per request, which the
//! [`Authenticator`] trait provides.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::config::AuthConfig;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Answers whether a request belongs to an authenticated session.
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool;
}

/// Passthrough used when auth is disabled (local development).
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl Authenticator for AllowAll {
    fn is_authenticated(&self, _headers: &HeaderMap) -> bool {
        true
    }
}

/// Accepts a fixed set of session tokens issued by the login service.
///
/// The token may arrive as `Authorization: Bearer <token>` or as the
/// `session` cookie.
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    tokens: HashSet<String>,
}

impl TokenAuthenticator {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    fn bearer<'a>(headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
    }

    fn cookies<'a>(headers: &'a HeaderMap) -> impl Iterator<Item = &'a str> + 'a {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value)
    }
}

impl Authenticator for TokenAuthenticator {
    fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        if let Some(token) = Self::bearer(headers) {
            if self.tokens.contains(token) {
                return true;
            }
        }
        Self::cookies(headers).any(|token| self.tokens.contains(token))
    }
}

/// State for the [`require_session`] middleware.
#[derive(Debug, Clone)]
pub struct SessionGate {
    authenticator: Arc<dyn Authenticator>,
    login_path: Arc<str>,
}

impl SessionGate {
    pub fn new(authenticator: Arc<dyn Authenticator>, login_path: impl Into<Arc<str>>) -> Self {
        Self {
            authenticator,
            login_path: login_path.into(),
        }
    }

    /// Build the gate described by the auth config.
    pub fn from_config(config: &AuthConfig) -> Self {
        let authenticator: Arc<dyn Authenticator> = if config.enabled {
            Arc::new(TokenAuthenticator::new(config.session_tokens.iter().cloned()))
        } else {
            tracing::warn!("Session gate disabled; feature-info gateway is open to all clients");
            Arc::new(AllowAll)
        };
        Self::new(authenticator, config.login_path.as_str())
    }

    fn login_redirect(&self, next: &str) -> Redirect {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("next", next)
            .finish();
        Redirect::to(&format!("{}?{}", self.login_path, query))
    }
}

/// Send requests without an authenticated session to the login page.
pub async fn require_session(
    State(gate): State<SessionGate>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if gate.authenticator.is_authenticated(req.headers()) {
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();
    tracing::debug!(path = %path, "No authenticated session; redirecting to login");
    gate.login_redirect(&path).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        let auth = TokenAuthenticator::new(["s3cret"]);
        assert!(auth.is_authenticated(&headers(header::AUTHORIZATION, "Bearer s3cret")));
        assert!(!auth.is_authenticated(&headers(header::AUTHORIZATION, "Bearer other")));
        assert!(!auth.is_authenticated(&headers(header::AUTHORIZATION, "Basic s3cret")));
    }

    #[test]
    fn test_session_cookie() {
        let auth = TokenAuthenticator::new(["s3cret"]);
        assert!(auth.is_authenticated(&headers(header::COOKIE, "theme=dark; session=s3cret")));
        assert!(!auth.is_authenticated(&headers(header::COOKIE, "session_id=s3cret")));
        assert!(!auth.is_authenticated(&headers(header::COOKIE, "session=nope")));
    }

    #[test]
    fn test_no_credentials() {
        let auth = TokenAuthenticator::new(Vec::<String>::new());
        assert!(!auth.is_authenticated(&HeaderMap::new()));
        assert!(AllowAll.is_authenticated(&HeaderMap::new()));
    }

    #[test]
    fn test_disabled_auth_allows_all() {
        let config = AuthConfig {
            enabled: false,
            ..AuthConfig::default()
        };
        let gate = SessionGate::from_config(&config);
        assert!(gate.authenticator.is_authenticated(&HeaderMap::new()));
    }

    #[test]
    fn test_login_redirect_encodes_next() {
        let gate = SessionGate::new(Arc::new(AllowAll), "/login");
        let response = gate.login_redirect("/api/feature-info").into_response();
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?next=%2Fapi%2Ffeature-info"
        );
    }
}
