//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, at least one attempt)
//! - Check the base URL is an absolute http(s) URL
//!
//! Returns all validation errors, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("api.base_url '{url}' is not a valid URL: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("api.base_url must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("api.refresh_path must start with '/', got '{0}'")]
    InvalidRefreshPath(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Validate a configuration. Pure: `ClientConfig → Result<(), Vec<ValidationError>>`.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.api.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if !config.api.refresh_path.starts_with('/') {
        errors.push(ValidationError::InvalidRefreshPath(config.api.refresh_path.clone()));
    }
    if config.api.timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("api.timeout_ms"));
    }
    if config.api.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("api.connect_timeout_ms"));
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::ZeroValue("retries.max_attempts"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://files.example".into();
        config.api.timeout_ms = 0;
        config.retries.max_attempts = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::UnsupportedScheme("ftp".into())));
        assert!(errors.contains(&ValidationError::ZeroValue("api.timeout_ms")));
        assert!(errors.contains(&ValidationError::ZeroValue("retries.max_attempts")));
    }

    #[test]
    fn rejects_relative_base_url() {
        let mut config = ClientConfig::default();
        config.api.base_url = "/api/v1".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidBaseUrl { .. }));
    }
}
