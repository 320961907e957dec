//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → session.rs (authenticated-session gate for protected routes)
//!     → gateway (URL allowlist, bounded fetch)
//!     → headers.rs (hardening headers on every response)
//! ```
//!
//! # Design Decisions
//! - Session mechanics are opaque: the gate only asks a boolean question
//! - Fail closed: no session means no gateway access
//! - No trust in client input

pub mod headers;
pub mod session;

pub use session::{require_session, AllowAll, Authenticator, SessionGate, TokenAuthenticator};
