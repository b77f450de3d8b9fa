//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! ApiClient produces:
//!     → tracing events inside an `api_request` span (method, path, request_id)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr, pretty or JSON)
//!     → whatever metrics recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every attempt and the `X-Request-ID` header
//! - Tokens and bodies are never logged

pub mod logging;
pub mod metrics;
