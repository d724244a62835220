//! Credentials presented to the platform over HTTP Basic auth.

use std::fmt;

use crate::config::{AppSecret, AppToken};

/// A credential pair resolved into HTTP Basic auth parameters.
///
/// The platform accepts three shapes:
///
/// - application credentials: `(token, secret)`
/// - end-user credentials: `(email, password)`
/// - an opaque identity token: `("", id_token)`
///
/// End-user credentials only ever appear transiently, during
/// [`Collection::authenticate`](crate::rest::Collection::authenticate).
///
/// # Security
///
/// `Debug` output never contains a secret, password or token.
///
/// # Example
///
/// ```rust
/// use passaporte_web::{AppSecret, AppToken, Credentials};
///
/// let credentials = Credentials::application(
///     AppToken::new("token").unwrap(),
///     AppSecret::new("secret").unwrap(),
/// );
/// assert_eq!(credentials.basic_auth(), ("token", Some("secret")));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Application-level credentials.
    Application {
        /// The application token.
        token: AppToken,
        /// The application secret.
        secret: AppSecret,
    },
    /// End-user email and password.
    User {
        /// The user's email.
        email: String,
        /// The user's password.
        password: String,
    },
    /// An identity token issued by the platform, sent with a blank username.
    IdToken(String),
}

impl Credentials {
    /// Creates application credentials.
    #[must_use]
    pub const fn application(token: AppToken, secret: AppSecret) -> Self {
        Self::Application { token, secret }
    }

    /// Returns the `(username, password)` pair for HTTP Basic auth.
    #[must_use]
    pub fn basic_auth(&self) -> (&str, Option<&str>) {
        match self {
            Self::Application { token, secret } => (token.as_ref(), Some(secret.as_ref())),
            Self::User { email, password } => (email.as_str(), Some(password.as_str())),
            Self::IdToken(token) => ("", Some(token.as_str())),
        }
    }

    /// Returns `true` for application-level credentials.
    #[must_use]
    pub const fn is_application(&self) -> bool {
        matches!(self, Self::Application { .. })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application { token, .. } => f
                .debug_struct("Application")
                .field("token", &token.as_ref())
                .field("secret", &"*****")
                .finish(),
            Self::User { email, .. } => f
                .debug_struct("User")
                .field("email", email)
                .field("password", &"*****")
                .finish(),
            Self::IdToken(_) => f.write_str("IdToken(*****)"),
        }
    }
}

/// End-user credentials exchanged for an identity by the authenticate flow.
///
/// # Example
///
/// ```rust
/// use passaporte_web::AuthRequest;
///
/// let request = AuthRequest::password("user@example.com", "s3cret");
/// assert!(request.validate().is_ok());
///
/// let request = AuthRequest::id_token("");
/// assert!(request.validate().is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub enum AuthRequest {
    /// Email and password.
    Password {
        /// The user's email.
        email: String,
        /// The user's password.
        password: String,
    },
    /// An opaque exchange token.
    IdToken(String),
}

impl AuthRequest {
    /// Creates an email/password request.
    #[must_use]
    pub fn password(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Creates an identity token request.
    #[must_use]
    pub fn id_token(token: impl Into<String>) -> Self {
        Self::IdToken(token.into())
    }

    /// Checks that every required value is present.
    ///
    /// # Errors
    ///
    /// Returns the name of the first empty argument.
    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Self::Password { email, .. } if email.is_empty() => Err("email"),
            Self::Password { password, .. } if password.is_empty() => Err("password"),
            Self::IdToken(token) if token.is_empty() => Err("id_token"),
            _ => Ok(()),
        }
    }

    /// Converts the request into transient credentials.
    #[must_use]
    pub fn into_credentials(self) -> Credentials {
        match self {
            Self::Password { email, password } => Credentials::User { email, password },
            Self::IdToken(token) => Credentials::IdToken(token),
        }
    }
}

impl fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .field("password", &"*****")
                .finish(),
            Self::IdToken(_) => f.write_str("IdToken(*****)"),
        }
    }
}
