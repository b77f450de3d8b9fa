//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! caller → RequestDescriptor (request.rs)
//!     → ApiClient (client.rs): credential injection, dispatch, refresh, retry
//!     → response.rs (envelope | bare → T)
//!     → error.rs (any failure → ApiError)
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod response;

pub use client::ApiClient;
pub use error::{ApiError, ErrorKind, FieldErrors, NETWORK_ERROR_MESSAGE};
pub use request::{AttemptContext, RequestDescriptor};
pub use response::{Envelope, ResponseShape};
