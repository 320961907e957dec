//! WebGIS feature-info gateway library.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use gateway::{validate, AllowlistPolicy, BoundedFetcher, Rejection, ValidatedUrl};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
