//! Authentication service: the only writer of the session besides refresh.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::routes::auth as routes;
use crate::api::types::{AuthResponse, LoginCredentials, PasswordChange, PasswordReset, RegisterData};
use crate::http::{ApiClient, ApiError};
use crate::session::{Session, SessionEvent};

#[derive(Serialize)]
struct LogoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh: Option<String>,
}

/// Borrowed view of the client scoped to `/auth/`.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and store the issued tokens. `U` is the caller's user shape.
    pub async fn login<U: DeserializeOwned>(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<AuthResponse<U>, ApiError> {
        let response: AuthResponse<U> = self.client.post(routes::LOGIN, credentials).await?;
        self.client.store_tokens(response.tokens.clone());
        tracing::info!(username = %credentials.username, "Logged in");
        Ok(response)
    }

    /// Create an account; the server signs the new user in immediately.
    pub async fn register<U: DeserializeOwned>(
        &self,
        data: &RegisterData,
    ) -> Result<AuthResponse<U>, ApiError> {
        let response: AuthResponse<U> = self.client.post(routes::REGISTER, data).await?;
        self.client.store_tokens(response.tokens.clone());
        tracing::info!(username = %data.username, "Registered");
        Ok(response)
    }

    /// Invalidate the refresh token remotely if possible, then always clear locally.
    pub async fn logout(&self) {
        let body = LogoutRequest {
            refresh: self.client.session().refresh_token(),
        };
        if let Err(e) = self.client.post::<Value, _>(routes::LOGOUT, &body).await {
            tracing::warn!(error = %e, status_code = e.status_code(), "Logout call failed, clearing local session anyway");
        }
        self.client.clear_session(SessionEvent::LoggedOut);
    }

    pub async fn profile<U: DeserializeOwned>(&self) -> Result<U, ApiError> {
        self.client.get(routes::PROFILE).await
    }

    /// Partial profile update; `changes` is serialized as-is.
    pub async fn update_profile<U, B>(&self, changes: &B) -> Result<U, ApiError>
    where
        U: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.client.patch(routes::UPDATE_PROFILE, changes).await
    }

    pub async fn change_password(&self, data: &PasswordChange) -> Result<(), ApiError> {
        self.client.post::<Value, _>(routes::PASSWORD_CHANGE, data).await?;
        Ok(())
    }

    pub async fn request_password_reset(&self, data: &PasswordReset) -> Result<(), ApiError> {
        self.client.post::<Value, _>(routes::PASSWORD_RESET, data).await?;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    /// Currently held tokens.
    pub fn tokens(&self) -> Session {
        self.client.session().snapshot()
    }
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }
}
