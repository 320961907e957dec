//! Feature-info gateway.
//!
//! # Data Flow
//! ```text
//! candidate URL (from browser)
//!     → validator.rs (length, scheme, origin, path, operation)
//!     → ValidatedUrl
//!     → fetcher.rs (single GET, timeout, size cap)
//!     → FetchResult { body, content_type }
//!     → relay.rs (JSON or raw text wrapper)
//!     → response body
//! ```
//!
//! # Design Decisions
//! - The allowlist policy is built once from config and never mutated
//! - Validation does no I/O and never rewrites the candidate
//! - Only the validator can construct a `ValidatedUrl`
//! - Rejections and fetch errors are separate types

pub mod fetcher;
pub mod policy;
pub mod relay;
pub mod validator;

pub use fetcher::{BoundedFetcher, FetchError, FetchResult};
pub use policy::{AllowlistPolicy, PolicyError};
pub use relay::relay;
pub use validator::{validate, Rejection, ValidatedUrl};
