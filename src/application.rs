//! The application facade.
//!
//! [`PassaporteWeb`] is where every interaction starts: it binds a host and
//! the application's credentials, and exposes the two top-level
//! collections an application works with.

use std::sync::Arc;

use crate::clients::{HttpClient, HttpError};
use crate::config::{AppSecret, AppToken, HostUrl, PassaporteConfig};
use crate::error::SetupError;
use crate::rest::resources::{Account, Identity};
use crate::rest::{Collection, ACCOUNTS_PATH, APPLICATION_ACCOUNTS, APPLICATION_USERS, USERS_PATH};

/// An application registered on the platform.
///
/// # Example
///
/// ```rust
/// use passaporte_web::PassaporteWeb;
///
/// let app = PassaporteWeb::new("http://sandbox.app.passaporteweb.com.br", "qxRSNcIdeA", "1f0AVCZP")
///     .unwrap();
///
/// assert_eq!(
///     app.accounts().url(),
///     "http://sandbox.app.passaporteweb.com.br/organizations/api/accounts/"
/// );
/// assert!(!app.accounts().can_create());
/// assert!(!app.users().can_list());
/// ```
#[derive(Debug, Clone)]
pub struct PassaporteWeb {
    client: Arc<HttpClient>,
    accounts: Collection<Account>,
    users: Collection<Identity>,
}

impl PassaporteWeb {
    /// Creates the facade from a host and the application's credentials.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Config`] if the host is not an absolute URL or
    /// the token or secret is empty, and [`SetupError::Http`] if the
    /// transport cannot be built.
    pub fn new(host: &str, token: &str, secret: &str) -> Result<Self, SetupError> {
        let config = PassaporteConfig::builder()
            .host(HostUrl::new(host)?)
            .token(AppToken::new(token)?)
            .secret(AppSecret::new(secret)?)
            .build()?;

        Ok(Self::from_config(&config)?)
    }

    /// Creates the facade from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the transport cannot be built.
    pub fn from_config(config: &PassaporteConfig) -> Result<Self, HttpError> {
        let client = Arc::new(HttpClient::new(config.session(), Some(config))?);
        let base = client.base_uri().to_string();

        let accounts = Collection::new(
            format!("{base}{ACCOUNTS_PATH}"),
            Arc::clone(&client),
            APPLICATION_ACCOUNTS,
        );
        let users = Collection::new(
            format!("{base}{USERS_PATH}"),
            Arc::clone(&client),
            APPLICATION_USERS,
        );

        tracing::debug!(host = %config.host(), "Created Passaporte Web application client");

        Ok(Self {
            client,
            accounts,
            users,
        })
    }

    /// Returns the accounts the application can see. Listing only.
    #[must_use]
    pub const fn accounts(&self) -> &Collection<Account> {
        &self.accounts
    }

    /// Returns the application's users. Creation, lookup and
    /// authentication only.
    #[must_use]
    pub const fn users(&self) -> &Collection<Identity> {
        &self.users
    }

    /// Returns the application's client.
    #[must_use]
    pub const fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_collections_bound_to_host() {
        let app = PassaporteWeb::new("http://localhost:8000/ignored/path", "token", "secret").unwrap();

        assert_eq!(
            app.accounts().url(),
            "http://localhost:8000/organizations/api/accounts/"
        );
        assert_eq!(app.users().url(), "http://localhost:8000/accounts/api/create/");
        assert!(Arc::ptr_eq(app.users().client(), app.client()));
        assert!(app.client().session().credentials().is_application());
    }

    #[test]
    fn test_new_rejects_empty_credentials() {
        assert!(matches!(
            PassaporteWeb::new("http://localhost:8000", "", "secret"),
            Err(SetupError::Config(ConfigError::EmptyToken))
        ));
        assert!(matches!(
            PassaporteWeb::new("http://localhost:8000", "token", ""),
            Err(SetupError::Config(ConfigError::EmptySecret))
        ));
        assert!(matches!(
            PassaporteWeb::new("localhost", "token", "secret"),
            Err(SetupError::Config(ConfigError::InvalidHostUrl { .. }))
        ));
    }
}
