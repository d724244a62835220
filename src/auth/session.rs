//! Session state for Passaporte Web API calls.
//!
//! A [`Session`] pairs the platform host with the credentials presented on
//! every request. The transport built from it lives in
//! [`HttpClient`](crate::clients::HttpClient).

use crate::auth::Credentials;
use crate::config::HostUrl;

/// The host and credentials used for API calls.
///
/// Sessions are immutable. Changing credentials means building a new
/// session (see [`Session::with_credentials`]) and rebinding the objects
/// that should use it.
///
/// # Example
///
/// ```rust
/// use passaporte_web::{AppSecret, AppToken, Credentials, HostUrl, Session};
///
/// let session = Session::new(
///     HostUrl::new("http://sandbox.app.passaporteweb.com.br").unwrap(),
///     Credentials::application(
///         AppToken::new("token").unwrap(),
///         AppSecret::new("secret").unwrap(),
///     ),
/// );
///
/// assert!(session.credentials().is_application());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    host: HostUrl,
    credentials: Credentials,
}

impl Session {
    /// Creates a new session.
    #[must_use]
    pub const fn new(host: HostUrl, credentials: Credentials) -> Self {
        Self { host, credentials }
    }

    /// Returns the platform host.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        &self.host
    }

    /// Returns the credentials presented on every request.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns a session for the same host with other credentials.
    #[must_use]
    pub fn with_credentials(&self, credentials: Credentials) -> Self {
        Self {
            host: self.host.clone(),
            credentials,
        }
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppSecret, AppToken};

    fn app_session() -> Session {
        Session::new(
            HostUrl::new("http://localhost:8000").unwrap(),
            Credentials::application(
                AppToken::new("token").unwrap(),
                AppSecret::new("secret").unwrap(),
            ),
        )
    }

    #[test]
    fn test_with_credentials_keeps_host_and_original() {
        let session = app_session();
        let user = session.with_credentials(Credentials::IdToken("tok".to_string()));

        assert_eq!(user.host(), session.host());
        assert_eq!(user.credentials().basic_auth(), ("", Some("tok")));
        assert!(session.credentials().is_application());
    }

    #[test]
    fn test_session_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Session>();
    }
}
