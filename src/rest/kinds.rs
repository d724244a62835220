//! Per-kind behavior tables for resources and collections.
//!
//! Instead of overriding behavior in each resource type, every kind of
//! entity is described by a [`KindSpec`] (what its resources may do) and
//! every kind of listing by a [`CollectionSpec`] (what the collection may
//! do and how item lookups are addressed). The generic [`Resource`] and
//! [`Collection`] consult these tables.
//!
//! # Example
//!
//! ```rust
//! use passaporte_web::rest::{build_path, ResourceKind, IDENTITY_ACCOUNTS_PATH};
//!
//! assert!(!ResourceKind::Account.spec().savable);
//! assert_eq!(ResourceKind::ServiceAccount.spec().date_fields, &["expiration"]);
//!
//! let url = build_path(IDENTITY_ACCOUNTS_PATH, &[("uuid", "c3769912-baa9")]);
//! assert_eq!(url, "/organizations/api/identities/c3769912-baa9/accounts/");
//! ```
//!
//! [`Resource`]: crate::rest::Resource
//! [`Collection`]: crate::rest::Collection

use std::fmt;

use crate::config::HostUrl;

/// Listing of accounts visible to the application.
pub const ACCOUNTS_PATH: &str = "/organizations/api/accounts/";
/// User creation endpoint, the application's view of its users.
pub const USERS_PATH: &str = "/accounts/api/create/";
/// Credential exchange endpoint used by `authenticate`.
pub const AUTH_PATH: &str = "/accounts/api/auth/";
/// Identity lookup base path.
pub const IDENTITIES_PATH: &str = "/accounts/api/identities/";
/// A single identity.
pub const IDENTITY_PATH: &str = "/accounts/api/identities/{uuid}/";
/// Accounts an identity belongs to.
pub const IDENTITY_ACCOUNTS_PATH: &str = "/organizations/api/identities/{uuid}/accounts/";
/// Notification creation endpoint.
pub const NOTIFICATIONS_PATH: &str = "/notifications/api/";

/// Operations that can be performed on a resource or a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOperation {
    /// Fetch a single resource (GET).
    Load,
    /// Metadata probe (OPTIONS).
    Probe,
    /// Update mutable fields (PUT).
    Save,
    /// Remove the resource (DELETE).
    Delete,
    /// Enumerate a listing (GET, paginated).
    All,
    /// Look up a single item of a collection.
    Get,
    /// Create an item of a collection (POST).
    Create,
    /// Exchange end-user credentials for an identity.
    Authenticate,
    /// Send a notification to the entity.
    Notify,
}

impl ResourceOperation {
    /// Returns the operation name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Probe => "load_options",
            Self::Save => "save",
            Self::Delete => "delete",
            Self::All => "all",
            Self::Get => "get",
            Self::Create => "create",
            Self::Authenticate => "authenticate",
            Self::Notify => "send_notification",
        }
    }
}

impl fmt::Display for ResourceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kinds of entity the platform exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// An untyped resource (e.g. an account history entry).
    Resource,
    /// A user identity.
    Identity,
    /// A user's profile.
    Profile,
    /// An account owned by the calling application, fully addressable.
    ServiceAccount,
    /// A read-only account stub, possibly owned by another application.
    Account,
    /// A membership of an identity in an account.
    AccountMember,
    /// A notification sent to an identity or an account.
    Notification,
}

impl ResourceKind {
    /// Returns the behavior table for this kind.
    #[must_use]
    pub const fn spec(self) -> KindSpec {
        match self {
            Self::Resource => KindSpec::new(self, "Resource"),
            Self::Identity => KindSpec::new(self, "Identity"),
            Self::Profile => KindSpec::new(self, "Profile"),
            Self::ServiceAccount => KindSpec {
                deletable: false,
                date_fields: &["expiration"],
                ..KindSpec::new(self, "ServiceAccount")
            },
            Self::Account => KindSpec {
                savable: false,
                deletable: false,
                ..KindSpec::new(self, "Account")
            },
            Self::AccountMember => KindSpec::new(self, "AccountMember"),
            Self::Notification => KindSpec::new(self, "Notification"),
        }
    }

    /// Returns the display name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.spec().name
    }
}

/// What resources of one kind are allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    /// The kind described.
    pub kind: ResourceKind,
    /// Name used in errors and logs.
    pub name: &'static str,
    /// Payload key holding the resource's own locator.
    pub url_key: &'static str,
    /// Whether `save()` may ever be attempted.
    pub savable: bool,
    /// Whether `delete()` may ever be attempted.
    pub deletable: bool,
    /// Fields sent as `YYYY-MM-DD` even when the platform returns datetimes.
    pub date_fields: &'static [&'static str],
}

impl KindSpec {
    /// Creates a spec with the generic rules: savable, deletable when the
    /// platform allows it, no date fields.
    #[must_use]
    pub const fn new(kind: ResourceKind, name: &'static str) -> Self {
        Self {
            kind,
            name,
            url_key: "url",
            savable: true,
            deletable: true,
            date_fields: &[],
        }
    }
}

/// How a collection addresses a single item in `get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStyle {
    /// Items live under the identities endpoint rather than the listing path.
    Identities,
    /// Items live directly under the collection URL.
    Nested,
}

/// What a collection of one kind is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Name used in errors and logs.
    pub name: &'static str,
    /// Kind of the items.
    pub item: ResourceKind,
    /// Whether `all()` may be used.
    pub can_list: bool,
    /// Whether `create()` may be used.
    pub can_create: bool,
    /// How `get()` addresses an item.
    pub lookup: LookupStyle,
}

/// The accounts an application can see. Listing only.
pub const APPLICATION_ACCOUNTS: CollectionSpec = CollectionSpec {
    name: "ApplicationAccounts",
    item: ResourceKind::Account,
    can_list: true,
    can_create: false,
    lookup: LookupStyle::Nested,
};

/// The users of an application. Creation and lookup only.
pub const APPLICATION_USERS: CollectionSpec = CollectionSpec {
    name: "ApplicationUsers",
    item: ResourceKind::Identity,
    can_list: false,
    can_create: true,
    lookup: LookupStyle::Identities,
};

/// The accounts an identity belongs to.
pub const IDENTITY_ACCOUNTS: CollectionSpec = CollectionSpec {
    name: "IdentityAccounts",
    item: ResourceKind::ServiceAccount,
    can_list: true,
    can_create: true,
    lookup: LookupStyle::Nested,
};

/// The members of a service account.
pub const ACCOUNT_MEMBERS: CollectionSpec = CollectionSpec {
    name: "AccountMembers",
    item: ResourceKind::AccountMember,
    can_list: true,
    can_create: true,
    lookup: LookupStyle::Nested,
};

/// The notifications of a service account.
pub const ACCOUNT_NOTIFICATIONS: CollectionSpec = CollectionSpec {
    name: "Notifications",
    item: ResourceKind::Notification,
    can_list: true,
    can_create: false,
    lookup: LookupStyle::Nested,
};

/// The history entries of a service account.
pub const ACCOUNT_HISTORY: CollectionSpec = CollectionSpec {
    name: "AccountHistory",
    item: ResourceKind::Resource,
    can_list: true,
    can_create: false,
    lookup: LookupStyle::Nested,
};

/// Builds a URL from a template by interpolating values.
///
/// Replaces `{name}` placeholders in the template with the URL-encoded
/// value paired with `name`.
///
/// # Example
///
/// ```rust
/// use passaporte_web::rest::build_path;
///
/// let url = build_path("/accounts/api/identities/{uuid}/", &[("uuid", "a b")]);
/// assert_eq!(url, "/accounts/api/identities/a%20b/");
/// ```
#[must_use]
pub fn build_path(template: &str, values: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in values {
        let placeholder = format!("{{{key}}}");
        result = result.replace(&placeholder, &urlencoding::encode(value));
    }

    result
}

/// Returns `scheme://host[:port]` of an absolute locator.
///
/// Relative locators yield an empty string, so a path appended to the
/// result still resolves against the client host.
#[must_use]
pub(crate) fn origin_of(locator: &str) -> String {
    HostUrl::new(locator)
        .map(|url| url.origin().to_string())
        .unwrap_or_default()
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceOperation>();
    assert_send_sync::<KindSpec>();
    assert_send_sync::<CollectionSpec>();
};
