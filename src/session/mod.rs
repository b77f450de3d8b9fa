//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! login / register  → SessionStore::set_tokens   → SessionEvent::LoggedIn
//! 401 + refresh ok  → SessionStore::set_access_token → SessionEvent::Refreshed
//! refresh failure   → SessionStore::clear        → SessionEvent::Expired
//! logout            → SessionStore::clear        → SessionEvent::LoggedOut
//!
//! every request     → SessionStore::access_token (credential injection)
//! ```
//!
//! # Design Decisions
//! - The store is injected into the client, never a global
//! - Every mutation replaces the whole snapshot; readers never see half an update
//! - Persistence failures keep the in-memory state and are reported to the caller

pub mod file;
pub mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::FileSessionStore;
pub use store::{MemorySessionStore, SessionStore};

/// Persisted token pair. Field names double as the storage keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn from_tokens(tokens: AuthTokens) -> Self {
        Self {
            access_token: Some(tokens.access),
            refresh_token: Some(tokens.refresh),
        }
    }

    /// A non-empty access token means requests go out authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Token pair as issued by login, registration and (optionally) refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    Refreshed,
    /// Refresh failed and tokens were cleared; the user must sign in again.
    Expired,
    LoggedOut,
}

/// Errors raised by session persistence.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
