//! # Passaporte Web Rust Client
//!
//! A Rust client for the Passaporte Web identity and account platform,
//! mapping its REST resources onto typed local objects.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`PassaporteConfig`] and [`PassaporteConfigBuilder`]
//! - Validated newtypes for application credentials and the host URL
//! - HTTP Basic authentication with application or end-user credentials
//! - A resource layer whose mutable fields are discovered from the platform
//! - Lazily paginated collections with lookups, creation and inline seeds
//! - Typed identities, profiles, accounts, members and notifications
//!
//! ## Quick Start
//!
//! ```rust
//! use passaporte_web::PassaporteWeb;
//!
//! let app = PassaporteWeb::new(
//!     "http://sandbox.app.passaporteweb.com.br",
//!     "qxRSNcIdeA",
//!     "1f0AVCZPJbRndF9FNSGMOWMfH9KMUDaX",
//! )
//! .unwrap();
//!
//! assert!(app.client().session().credentials().is_application());
//! ```
//!
//! ## Working with users
//!
//! ```rust,ignore
//! use passaporte_web::{AuthRequest, PassaporteWeb};
//! use passaporte_web::rest::{Lookup, RemoteEntity};
//! use passaporte_web::rest::resources::{AccountLike, NotificationOptions};
//!
//! let app = PassaporteWeb::new(host, token, secret)?;
//!
//! // Exchange end-user credentials for the identity; the identity keeps
//! // talking with the application's credentials afterwards.
//! let mut user = app
//!     .users()
//!     .authenticate(AuthRequest::password("user@example.com", "s3cret"))
//!     .await?;
//!
//! if let Some(profile) = user.profile().await? {
//!     profile.set("nickname", "bob");
//!     profile.save().await?;
//! }
//!
//! for account in user.accounts().unwrap().from_seed() {
//!     println!("{:?} (mutable: {})", account.name(), account.is_mutable());
//! }
//!
//! user.send_notification("Welcome!", NotificationOptions::default()).await?;
//! ```
//!
//! ## Errors
//!
//! Resource operations return [`rest::ResourceError`], which separates
//! calls rejected locally (no request sent) from errors reported by the
//! platform, whose status and body are preserved. Nothing is retried.
//!
//! ## Logging
//!
//! Requests, pagination steps and credential swaps are reported through
//! [`tracing`]. The crate never installs a subscriber.

pub mod application;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use application::PassaporteWeb;
pub use auth::{AuthRequest, Credentials, Session};
pub use config::{AppSecret, AppToken, HostUrl, PassaporteConfig, PassaporteConfigBuilder};
pub use error::{ConfigError, SetupError};

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, HttpResponseError,
    InvalidHttpRequestError,
};

// Re-export resource layer types
pub use rest::resources::{
    Account, AccountLike, AccountMember, AccountRef, Identity, Notification, NotificationOptions,
    Profile, ServiceAccount,
};
pub use rest::{Collection, ListParams, Lookup, Pager, RemoteEntity, Resource, ResourceError};
