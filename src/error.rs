//! Error types for client configuration.
//!
//! This module contains the error type returned while building a
//! [`PassaporteConfig`](crate::PassaporteConfig) or one of its validated
//! newtypes, and the error returned by the
//! [`PassaporteWeb`](crate::PassaporteWeb) convenience constructor.
//!
//! # Example
//!
//! ```rust
//! use passaporte_web::{AppToken, ConfigError};
//!
//! let result = AppToken::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyToken)));
//! ```

use thiserror::Error;

use crate::clients::HttpError;

/// Errors that can occur during client configuration.
///
/// Each variant carries a message that says what to fix.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Application token cannot be empty.
    #[error("Application token cannot be empty. Please provide the token issued by Passaporte Web.")]
    EmptyToken,

    /// Application secret cannot be empty.
    #[error("Application secret cannot be empty. Please provide the secret issued by Passaporte Web.")]
    EmptySecret,

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// Host URL is invalid.
    #[error("Invalid host URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://app.passaporteweb.com.br').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },
}

/// Errors that can occur while setting up a [`PassaporteWeb`](crate::PassaporteWeb).
#[derive(Debug, Error)]
pub enum SetupError {
    /// The host, token or secret was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP transport could not be built.
    #[error(transparent)]
    Http(#[from] HttpError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_error_message() {
        let message = ConfigError::EmptyToken.to_string();
        assert!(message.contains("token cannot be empty"));
    }

    #[test]
    fn test_invalid_host_url_error_message() {
        let error = ConfigError::InvalidHostUrl {
            url: "not a url".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("not a url"));
        assert!(message.contains("scheme"));
    }

    #[test]
    fn test_missing_required_field_error_message() {
        let error = ConfigError::MissingRequiredField { field: "secret" };
        let message = error.to_string();
        assert!(message.contains("secret"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_setup_error_wraps_config_error() {
        let error: SetupError = ConfigError::EmptyToken.into();
        assert!(matches!(error, SetupError::Config(ConfigError::EmptyToken)));
        assert_eq!(error.to_string(), ConfigError::EmptyToken.to_string());
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptySecret;
        let _: &dyn std::error::Error = &error;
    }
}
