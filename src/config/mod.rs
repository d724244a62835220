//! Configuration types for the Passaporte Web client.
//!
//! # Overview
//!
//! - [`PassaporteConfig`]: host and application credentials
//! - [`PassaporteConfigBuilder`]: a builder for [`PassaporteConfig`]
//! - [`AppToken`] / [`AppSecret`]: validated credential halves
//! - [`HostUrl`]: a validated absolute URL
//!
//! # Example
//!
//! ```rust
//! use passaporte_web::{PassaporteConfig, AppToken, AppSecret, HostUrl};
//!
//! let config = PassaporteConfig::builder()
//!     .host(HostUrl::new("http://sandbox.app.passaporteweb.com.br").unwrap())
//!     .token(AppToken::new("qxRSNcIdeA").unwrap())
//!     .secret(AppSecret::new("1f0AVCZPJbRndF9FNSGMOWMfH9KMUDaX").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.host().origin(), "http://sandbox.app.passaporteweb.com.br");
//! ```

mod newtypes;

pub use newtypes::{AppSecret, AppToken, HostUrl};

use crate::auth::{Credentials, Session};
use crate::error::ConfigError;

/// Configuration for the Passaporte Web client.
///
/// `PassaporteConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct PassaporteConfig {
    host: HostUrl,
    token: AppToken,
    secret: AppSecret,
    user_agent_prefix: Option<String>,
}

impl PassaporteConfig {
    /// Creates a new builder for constructing a `PassaporteConfig`.
    #[must_use]
    pub fn builder() -> PassaporteConfigBuilder {
        PassaporteConfigBuilder::new()
    }

    /// Returns the platform host.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        &self.host
    }

    /// Returns the application token.
    #[must_use]
    pub const fn token(&self) -> &AppToken {
        &self.token
    }

    /// Returns the application secret.
    #[must_use]
    pub const fn secret(&self) -> &AppSecret {
        &self.secret
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the application-level session described by this configuration.
    #[must_use]
    pub fn session(&self) -> Session {
        Session::new(
            self.host.clone(),
            Credentials::application(self.token.clone(), self.secret.clone()),
        )
    }
}

// Verify PassaporteConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PassaporteConfig>();
};

/// Builder for constructing [`PassaporteConfig`] instances.
///
/// `host`, `token` and `secret` are required.
#[derive(Debug, Default)]
pub struct PassaporteConfigBuilder {
    host: Option<HostUrl>,
    token: Option<AppToken>,
    secret: Option<AppSecret>,
    user_agent_prefix: Option<String>,
}

impl PassaporteConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the platform host (required).
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the application token (required).
    #[must_use]
    pub fn token(mut self, token: AppToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the application secret (required).
    #[must_use]
    pub fn secret(mut self, secret: AppSecret) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`PassaporteConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `host`, `token` or
    /// `secret` is not set.
    pub fn build(self) -> Result<PassaporteConfig, ConfigError> {
        let host = self
            .host
            .ok_or(ConfigError::MissingRequiredField { field: "host" })?;
        let token = self
            .token
            .ok_or(ConfigError::MissingRequiredField { field: "token" })?;
        let secret = self
            .secret
            .ok_or(ConfigError::MissingRequiredField { field: "secret" })?;

        Ok(PassaporteConfig {
            host,
            token,
            secret,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
