//! Single-flight session refresh.
//!
//! # Responsibilities
//! - Allow one refresh call in flight at a time
//! - Let concurrent 401s reuse a token another request already obtained
//!
//! # State Transitions
//! ```text
//! waiter acquires gate
//!     → stored access token differs from the one that got the 401 → Shared
//!     → otherwise run the refresh call → Refreshed | error
//! ```
//! The refresh closure persists the new token before the gate is released,
//! so a replay never races ahead of the store.

use std::future::Future;

use tokio::sync::Mutex;

use crate::session::SessionStore;

/// How a waiter obtained its replacement access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// This waiter ran the refresh call.
    Refreshed(String),
    /// Another request refreshed while this one was waiting.
    Shared(String),
}

impl RefreshOutcome {
    pub fn token(&self) -> &str {
        match self {
            Self::Refreshed(token) | Self::Shared(token) => token,
        }
    }
}

#[derive(Debug, Default)]
pub struct RefreshGate {
    lock: Mutex<()>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a fresh access token.
    ///
    /// `stale` is the token the failed request was sent with (`None` when it
    /// went out unauthenticated).
    pub async fn run<F, Fut, E>(
        &self,
        session: &dyn SessionStore,
        stale: Option<&str>,
        refresh: F,
    ) -> Result<RefreshOutcome, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let _guard = self.lock.lock().await;

        if let Some(current) = session.access_token() {
            if stale != Some(current.as_str()) {
                tracing::debug!("Access token already refreshed by a concurrent request");
                return Ok(RefreshOutcome::Shared(current));
            }
        }

        refresh().await.map(RefreshOutcome::Refreshed)
    }
}
