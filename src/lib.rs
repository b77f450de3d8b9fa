//! StackIt API client library.
//!
//! A resilient HTTP client for the StackIt Q&A backend: bearer credentials,
//! single-flight token refresh on 401, linear-backoff retries for transient
//! failures, and one normalized error shape for every failure.

pub mod api;
pub mod config;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod session;

pub use config::ClientConfig;
pub use http::{ApiClient, ApiError, ErrorKind, RequestDescriptor};
pub use session::{AuthTokens, Session, SessionEvent, SessionStore};
