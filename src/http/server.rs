//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Build the allowlist policy and upstream fetcher once
//! - Wire up middleware (tracing, timeout, request ID, session gate,
//!   security headers, panic handling)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{GatewayConfig, WmsConfig};
use crate::gateway::{AllowlistPolicy, BoundedFetcher, PolicyError};
use crate::http::{handlers, response::panic_response};
use crate::lifecycle::Shutdown;
use crate::security::{headers::with_security_headers, require_session, SessionGate};

/// Error constructing the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid allowlist policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<AllowlistPolicy>,
    pub fetcher: BoundedFetcher,
    pub wms: Arc<WmsConfig>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let gate = SessionGate::from_config(&config.auth);
        Self::with_session_gate(config, gate)
    }

    /// Create a server whose protected routes use `gate`.
    pub fn with_session_gate(config: GatewayConfig, gate: SessionGate) -> Result<Self, ServerError> {
        let state = AppState {
            policy: Arc::new(AllowlistPolicy::from_base_url(&config.wms.base_url)?),
            fetcher: BoundedFetcher::new(&config.fetch)?,
            wms: Arc::new(config.wms.clone()),
        };

        let router = Self::build_router(&config, state, gate);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState, gate: SessionGate) -> Router {
        let protected = Router::new()
            .route("/api/feature-info", get(handlers::feature_info))
            .route("/api/map-config", get(handlers::map_config))
            .route_layer(middleware::from_fn_with_state(gate, require_session));

        let router = Router::new()
            .route("/health", get(handlers::health))
            .merge(protected)
            .fallback(handlers::not_found)
            .with_state(state);

        with_middleware(router, Duration::from_secs(config.timeouts.request_secs))
    }

    /// Run the server until `shutdown` is triggered.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.triggered().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Wrap `router` in the shared middleware stack, outermost last.
#[allow(deprecated)]
fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    // Security headers wrap the panic and timeout layers so their 500/408
    // responses carry them too.
    let router = router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::new(request_timeout));

    with_security_headers(router)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            let request_id = req
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "request",
                method = %req.method(),
                path = %req.uri().path(),
                request_id = %request_id,
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::AllowAll;
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let config = GatewayConfig::default();
        let gate = SessionGate::new(Arc::new(AllowAll), "/login");
        HttpServer::with_session_gate(config, gate).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = server().router().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_rejection_never_reaches_upstream() {
        let uri = "/api/feature-info?url=http%3A%2F%2Fevil.example%2Fgeoserver%2Fwms%3FREQUEST%3DGetFeatureInfo";
        let response = server().router().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_protected_routes_require_session() {
        let config = GatewayConfig::default();
        let response = HttpServer::new(config)
            .unwrap()
            .router()
            .oneshot(get("/api/map-config"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login?next=%2Fapi%2Fmap-config");
    }

    #[tokio::test]
    async fn test_repeated_url_key_answers_json() {
        let uri = "/api/feature-info?url=http%3A%2F%2Fevil.example%2F&url=x";
        let response = server().router().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    async fn handler_panics() -> &'static str {
        panic!("handler failed")
    }

    async fn handler_stalls() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "late"
    }

    fn assert_hardened(response: &axum::response::Response) {
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_panic_response_carries_security_headers() {
        let router = with_middleware(
            Router::new().route("/boom", axum::routing::get(handler_panics)),
            Duration::from_secs(5),
        );
        let response = router.oneshot(get("/boom")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_hardened(&response);
    }

    #[tokio::test]
    async fn test_timeout_response_carries_security_headers() {
        let router = with_middleware(
            Router::new().route("/slow", axum::routing::get(handler_stalls)),
            Duration::from_millis(50),
        );
        let response = router.oneshot(get("/slow")).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_hardened(&response);
    }

    #[test]
    fn test_invalid_base_url_fails_construction() {
        let mut config = GatewayConfig::default();
        config.wms.base_url = "gopher://localhost/wms".into();
        assert!(matches!(HttpServer::new(config), Err(ServerError::Policy(_))));
    }
}
