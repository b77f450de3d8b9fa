//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{ClientConfig, SessionStorage};
use crate::config::validation::{validate_config, ValidationError};
use crate::session::SessionError;

/// Overrides the API base URL.
pub const ENV_BASE_URL: &str = "STACKIT_API_BASE_URL";
/// Overrides the per-attempt timeout, in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "STACKIT_API_TIMEOUT_MS";
/// Switches session storage to the given token file.
pub const ENV_SESSION_FILE: &str = "STACKIT_SESSION_FILE";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Session store unavailable: {0}")]
    Session(#[from] SessionError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, then apply environment overrides.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: ClientConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Build configuration from defaults plus environment overrides only.
pub fn from_env() -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from a variable lookup. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.api.base_url = base_url;
    }

    if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
        config.api.timeout_ms = raw.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_TIMEOUT_MS,
            value: raw.clone(),
        })?;
    }

    if let Some(path) = lookup(ENV_SESSION_FILE) {
        config.session.storage = SessionStorage::File;
        config.session.path = path.into();
    }

    Ok(())
}
