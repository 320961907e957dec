//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → security::session (protected routes only)
//!     → handlers.rs (query extraction, gateway pipeline)
//!     → response.rs (error → status + JSON body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::{AppState, HttpServer, ServerError};
