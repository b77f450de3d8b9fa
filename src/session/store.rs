//! Session store trait and the in-memory implementation.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::session::{AuthTokens, Session, SessionError};

/// Owner of the access/refresh token pair.
///
/// Readers take a consistent snapshot; writers replace it wholesale.
pub trait SessionStore: Send + Sync {
    /// Current snapshot of both tokens.
    fn snapshot(&self) -> Session;

    /// Replace the access token, keeping the refresh token.
    fn set_access_token(&self, token: String) -> Result<(), SessionError>;

    /// Replace both tokens.
    fn set_tokens(&self, tokens: AuthTokens) -> Result<(), SessionError>;

    /// Drop both tokens.
    fn clear(&self) -> Result<(), SessionError>;

    fn access_token(&self) -> Option<String> {
        self.snapshot().access_token.filter(|t| !t.is_empty())
    }

    fn refresh_token(&self) -> Option<String> {
        self.snapshot().refresh_token.filter(|t| !t.is_empty())
    }

    fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    current: ArcSwap<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: ArcSwap::from_pointee(session),
        }
    }

    pub fn with_tokens(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self::with_session(Session {
            access_token: Some(access.into()),
            refresh_token: Some(refresh.into()),
        })
    }

    pub(crate) fn replace(&self, session: Session) {
        self.current.store(Arc::new(session));
    }
}

impl SessionStore for MemorySessionStore {
    fn snapshot(&self) -> Session {
        self.current.load().as_ref().clone()
    }

    fn set_access_token(&self, token: String) -> Result<(), SessionError> {
        self.current.rcu(|current| Session {
            access_token: Some(token.clone()),
            refresh_token: current.refresh_token.clone(),
        });
        Ok(())
    }

    fn set_tokens(&self, tokens: AuthTokens) -> Result<(), SessionError> {
        self.replace(Session::from_tokens(tokens));
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.replace(Session::default());
        Ok(())
    }
}
