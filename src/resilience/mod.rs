//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to API:
//!     → per-attempt timeout (reqwest client deadline)
//!     → 401: refresh.rs (single-flight token refresh, replay once)
//!     → network / 5xx: retries.rs (check if retryable, sleep backoff.rs delay)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every dispatch has a deadline
//! - Retry budget is per logical request, counted in dispatches
//! - Backoff is linear and deterministic

pub mod backoff;
pub mod refresh;
pub mod retries;

pub use refresh::{RefreshGate, RefreshOutcome};
pub use retries::RetryPolicy;
