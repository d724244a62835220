//! The resource and collection layer.
//!
//! This module maps the platform's REST endpoints onto local objects:
//!
//! - **[`Resource`]**: one remote entity, with its payload, the mutable
//!   field set discovered by a metadata probe and the methods the platform
//!   allows on it
//! - **[`RemoteEntity`]**: the interface typed variants implement; load,
//!   probe, save and delete come for free
//! - **[`Collection<T>`]**: a listing endpoint with lazy pagination
//!   ([`Pager<T>`]), lookups and creation
//! - **[`ResourceKind`] / [`CollectionSpec`]**: per-kind behavior tables
//! - **[`ResourceError`]**: usage, precondition, protocol and remote errors
//!
//! Typed variants live in [`resources`].
//!
//! # Example
//!
//! ```rust,ignore
//! use passaporte_web::PassaporteWeb;
//! use passaporte_web::rest::{ListParams, Lookup, RemoteEntity};
//! use passaporte_web::rest::resources::AccountLike;
//!
//! let app = PassaporteWeb::new("http://sandbox.app.passaporteweb.com.br", "token", "secret")?;
//!
//! let user = app.users().get(Lookup::uuid("c3769912-baa9-4a0c-9856-395a706c7d57")).await?;
//! for account in user.accounts().unwrap().from_seed() {
//!     println!("{:?} mutable={}", account.name(), account.is_mutable());
//! }
//!
//! let mut pager = app.accounts().all(ListParams::default());
//! while let Some(account) = pager.try_next().await? {
//!     println!("{:?}", account.uuid());
//! }
//! ```

mod collection;
mod errors;
mod kinds;
mod resource;

pub mod resources;

// Public exports
pub use collection::{Collection, ListParams, Lookup, Pager};
pub use errors::ResourceError;
pub use kinds::{
    build_path, CollectionSpec, KindSpec, LookupStyle, ResourceKind, ResourceOperation,
    ACCOUNTS_PATH, ACCOUNT_HISTORY, ACCOUNT_MEMBERS, ACCOUNT_NOTIFICATIONS, APPLICATION_ACCOUNTS,
    APPLICATION_USERS, AUTH_PATH, IDENTITIES_PATH, IDENTITY_ACCOUNTS, IDENTITY_ACCOUNTS_PATH,
    IDENTITY_PATH, NOTIFICATIONS_PATH, USERS_PATH,
};
pub use resource::{FromPayload, LoadOptions, RemoteEntity, Resource, ResourceMeta};

/// Application client against a host nothing listens on, for tests that
/// never reach the network.
#[cfg(test)]
pub(crate) fn resource_test_client() -> std::sync::Arc<crate::clients::HttpClient> {
    use crate::auth::{Credentials, Session};
    use crate::config::{AppSecret, AppToken, HostUrl};

    let session = Session::new(
        HostUrl::new("http://localhost:8000").unwrap(),
        Credentials::application(
            AppToken::new("token").unwrap(),
            AppSecret::new("secret").unwrap(),
        ),
    );
    std::sync::Arc::new(crate::clients::HttpClient::new(session, None).unwrap())
}
