//! Accounts, in both of the shapes the platform renders them.
//!
//! An account owned by the calling application comes back as a full
//! resource with its own `url` and mutable fields: a [`ServiceAccount`].
//! An account owned by another application comes back as a bare
//! `{name, uuid}` pair, or wrapped in `account_data`, with no locator: an
//! [`Account`] stub that can be read but never written.
//!
//! Listings that mix both shapes yield [`AccountRef`], which picks the
//! variant once by looking at the payload's keys.
//!
//! # Example
//!
//! ```rust,ignore
//! use passaporte_web::rest::resources::{AccountLike, AccountRef};
//!
//! for account in identity.accounts().unwrap().from_seed() {
//!     println!("{:?} {:?} mutable={}", account.name(), account.uuid(), account.is_mutable());
//!     if let AccountRef::Service(service) = account {
//!         let members = service.members();
//!     }
//! }
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::clients::HttpClient;
use crate::rest::resources::{AccountMember, Notification, NotificationOptions};
use crate::rest::{
    Collection, FromPayload, RemoteEntity, Resource, ResourceError, ResourceKind,
    ACCOUNT_HISTORY, ACCOUNT_MEMBERS, ACCOUNT_NOTIFICATIONS,
};

/// What every account shape can answer.
pub trait AccountLike {
    /// Returns the account name.
    fn name(&self) -> Option<&str>;

    /// Returns the account uuid.
    fn uuid(&self) -> Option<&str>;

    /// Returns `true` if the account can be saved through this client.
    fn is_mutable(&self) -> bool;
}

/// Reads `key` from the payload, falling back to `account_data`.
fn account_field<'a>(resource: &'a Resource, key: &str) -> Option<&'a str> {
    resource.get_str(key).or_else(|| {
        resource
            .get("account_data")
            .and_then(|data| data.get(key))
            .and_then(Value::as_str)
    })
}

/// An account owned by the calling application.
///
/// Related collections are attached only when the payload links to them.
#[derive(Debug, Clone)]
pub struct ServiceAccount {
    resource: Resource,
    history: Option<Collection<Resource>>,
    notifications: Option<Collection<Notification>>,
    members: Option<Collection<AccountMember>>,
}

impl RemoteEntity for ServiceAccount {
    const KIND: ResourceKind = ResourceKind::ServiceAccount;

    fn from_resource(resource: Resource) -> Self {
        let client = resource.client();

        let history = resource
            .get_str("history_url")
            .map(|url| Collection::new(url, Arc::clone(client), ACCOUNT_HISTORY));

        let notifications = resource
            .get_str("notifications_url")
            .map(|url| Collection::new(url, Arc::clone(client), ACCOUNT_NOTIFICATIONS));

        let members = resource
            .get_str("members_url")
            .or_else(|| resource.get_str("add_member_url"))
            .map(|url| {
                let seed = resource
                    .get("members_data")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(Value::as_object).cloned().collect())
                    .unwrap_or_default();
                Collection::new(url, Arc::clone(client), ACCOUNT_MEMBERS).with_seed(seed)
            });

        Self {
            resource,
            history,
            notifications,
            members,
        }
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

impl ServiceAccount {
    /// Returns the roles the identity holds in this account.
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        self.resource
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| roles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the slug of the account's plan.
    #[must_use]
    pub fn plan_slug(&self) -> Option<&str> {
        account_field(&self.resource, "plan_slug")
    }

    /// Returns the expiration as sent by the platform.
    #[must_use]
    pub fn expiration(&self) -> Option<&str> {
        account_field(&self.resource, "expiration")
    }

    /// Returns the date component of the expiration.
    #[must_use]
    pub fn expiration_date(&self) -> Option<NaiveDate> {
        self.expiration()
            .and_then(|text| text.get(..10))
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
    }

    /// Returns the account's change history, if the payload links to it.
    #[must_use]
    pub const fn history(&self) -> Option<&Collection<Resource>> {
        self.history.as_ref()
    }

    /// Returns the account's notifications, if the payload links to them.
    #[must_use]
    pub const fn notifications(&self) -> Option<&Collection<Notification>> {
        self.notifications.as_ref()
    }

    /// Returns the account's members, if the payload links to them.
    ///
    /// Seeded from `members_data` when the payload carries it.
    #[must_use]
    pub const fn members(&self) -> Option<&Collection<AccountMember>> {
        self.members.as_ref()
    }

    /// Sends a notification to this account.
    ///
    /// The destination is always this account's uuid.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArguments`] if the account has no
    /// uuid, or [`ResourceError::Http`] if the platform rejects it.
    pub async fn send_notification(
        &self,
        body: &str,
        options: NotificationOptions,
    ) -> Result<Notification, ResourceError> {
        super::notification::send(&self.resource, self.uuid(), body, options).await
    }

    /// Moves the account onto another client.
    ///
    /// The history, notifications and members collections are rebuilt
    /// against the new client.
    pub fn rebind_session(&mut self, client: Arc<HttpClient>) {
        self.resource.rebind(client);
        *self = Self::from_resource(self.resource.clone());
    }
}

impl AccountLike for ServiceAccount {
    fn name(&self) -> Option<&str> {
        account_field(&self.resource, "name")
    }

    fn uuid(&self) -> Option<&str> {
        account_field(&self.resource, "uuid")
    }

    fn is_mutable(&self) -> bool {
        true
    }
}

/// A read-only account stub.
///
/// Saving and deleting fail locally without a request.
#[derive(Debug, Clone)]
pub struct Account {
    resource: Resource,
}

impl RemoteEntity for Account {
    const KIND: ResourceKind = ResourceKind::Account;

    fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

impl AccountLike for Account {
    fn name(&self) -> Option<&str> {
        account_field(&self.resource, "name")
    }

    fn uuid(&self) -> Option<&str> {
        account_field(&self.resource, "uuid")
    }

    fn is_mutable(&self) -> bool {
        false
    }
}

/// An account in either shape.
#[derive(Debug, Clone)]
pub enum AccountRef {
    /// An account owned by the calling application.
    Service(ServiceAccount),
    /// An account stub owned by another application.
    External(Account),
}

impl AccountRef {
    /// Builds the variant the payload's shape calls for.
    #[must_use]
    pub fn from_seed(data: Map<String, Value>, client: Arc<HttpClient>) -> Self {
        Self::from_payload(data, client, None)
    }

    /// Moves the account onto another client.
    pub fn rebind_session(&mut self, client: Arc<HttpClient>) {
        match self {
            Self::Service(account) => account.rebind_session(client),
            Self::External(account) => account.resource_mut().rebind(client),
        }
    }

    /// Returns `true` if `data` describes a stub.
    ///
    /// A stub has no `url` and carries either `account_data` or both
    /// `name` and `uuid`.
    #[must_use]
    pub fn is_stub_payload(data: &Map<String, Value>) -> bool {
        !data.contains_key("url")
            && (data.contains_key("account_data")
                || (data.contains_key("name") && data.contains_key("uuid")))
    }

    /// Returns `true` for the stub variant.
    #[must_use]
    pub const fn is_stub(&self) -> bool {
        matches!(self, Self::External(_))
    }

    /// Returns the service account, if this is one.
    #[must_use]
    pub const fn as_service(&self) -> Option<&ServiceAccount> {
        match self {
            Self::Service(account) => Some(account),
            Self::External(_) => None,
        }
    }

    /// Returns the service account mutably, if this is one.
    pub fn as_service_mut(&mut self) -> Option<&mut ServiceAccount> {
        match self {
            Self::Service(account) => Some(account),
            Self::External(_) => None,
        }
    }

    /// Consumes the reference, returning the service account if this is one.
    #[must_use]
    pub fn into_service(self) -> Option<ServiceAccount> {
        match self {
            Self::Service(account) => Some(account),
            Self::External(_) => None,
        }
    }

    /// Returns the underlying resource.
    #[must_use]
    pub fn resource(&self) -> &Resource {
        match self {
            Self::Service(account) => account.resource(),
            Self::External(account) => account.resource(),
        }
    }

    /// Saves the account.
    ///
    /// # Errors
    ///
    /// Stubs always fail with [`ResourceError::OperationNotAllowed`]. See
    /// [`Resource::save`] for service accounts.
    pub async fn save(&self) -> Result<Self, ResourceError> {
        match self {
            Self::Service(account) => account.save().await.map(Self::Service),
            Self::External(account) => account.save().await.map(Self::External),
        }
    }

    /// Deletes the account.
    ///
    /// # Errors
    ///
    /// Accounts cannot be deleted through this client: both shapes fail
    /// with [`ResourceError::OperationNotAllowed`] without a request.
    pub async fn delete(&self) -> Result<(), ResourceError> {
        match self {
            Self::Service(account) => account.delete().await,
            Self::External(account) => account.delete().await,
        }
    }
}

impl FromPayload for AccountRef {
    fn from_payload(
        data: Map<String, Value>,
        client: Arc<HttpClient>,
        response_url: Option<String>,
    ) -> Self {
        if Self::is_stub_payload(&data) {
            Self::External(Account::from_payload(data, client, response_url))
        } else {
            Self::Service(ServiceAccount::from_payload(data, client, response_url))
        }
    }

    fn backing_resource_mut(&mut self) -> Option<&mut Resource> {
        self.as_service_mut().map(RemoteEntity::resource_mut)
    }
}

impl AccountLike for AccountRef {
    fn name(&self) -> Option<&str> {
        match self {
            Self::Service(account) => account.name(),
            Self::External(account) => account.name(),
        }
    }

    fn uuid(&self) -> Option<&str> {
        match self {
            Self::Service(account) => account.uuid(),
            Self::External(account) => account.uuid(),
        }
    }

    fn is_mutable(&self) -> bool {
        match self {
            Self::Service(account) => account.is_mutable(),
            Self::External(account) => account.is_mutable(),
        }
    }
}

// Verify account types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ServiceAccount>();
    assert_send_sync::<AccountRef>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn account_ref(value: Value) -> AccountRef {
        AccountRef::from_seed(object(value), crate::rest::resource_test_client())
    }

    #[test]
    fn test_classification_by_key_set() {
        assert!(account_ref(json!({"name": "Conta", "uuid": "u-1"})).is_stub());
        assert!(account_ref(json!({
            "account_data": {"name": "Conta", "uuid": "u-1"},
            "roles": ["owner"]
        }))
        .is_stub());
        assert!(!account_ref(json!({
            "name": "Conta",
            "uuid": "u-1",
            "url": "http://localhost:8000/organizations/api/accounts/u-1/"
        }))
        .is_stub());
        assert!(!account_ref(json!({"name": "Only a name"})).is_stub());
    }

    #[test]
    fn test_name_and_uuid_readable_in_both_shapes() {
        let stub = account_ref(json!({"account_data": {"name": "Externa", "uuid": "e-1"}}));
        let full = account_ref(json!({
            "account_data": {"name": "Interna", "uuid": "i-1"},
            "url": "http://localhost:8000/organizations/api/accounts/i-1/"
        }));

        assert_eq!(stub.name(), Some("Externa"));
        assert_eq!(stub.uuid(), Some("e-1"));
        assert!(!stub.is_mutable());

        assert_eq!(full.name(), Some("Interna"));
        assert_eq!(full.uuid(), Some("i-1"));
        assert!(full.is_mutable());
    }

    #[test]
    fn test_service_account_links_and_seeded_members() {
        let account = account_ref(json!({
            "name": "Conta",
            "uuid": "a-1",
            "url": "http://localhost:8000/organizations/api/accounts/a-1/",
            "history_url": "http://localhost:8000/organizations/api/accounts/a-1/history/",
            "add_member_url": "http://localhost:8000/organizations/api/accounts/a-1/members/",
            "members_data": [
                {"identity": {"uuid": "m-1"}, "roles": ["owner"]},
                {"identity": {"uuid": "m-2"}, "roles": ["user"]}
            ],
            "plan_slug": "unittest",
            "expiration": "2013-07-25 23:59:59"
        }))
        .into_service()
        .unwrap();

        assert!(account.history().is_some());
        assert!(account.notifications().is_none());
        let members = account.members().unwrap();
        assert_eq!(
            members.url(),
            "http://localhost:8000/organizations/api/accounts/a-1/members/"
        );
        let seeded: Vec<AccountMember> = members.from_seed().collect();
        assert_eq!(seeded.len(), 2);
        assert_eq!(seeded[0].roles(), vec!["owner"]);

        assert_eq!(account.plan_slug(), Some("unittest"));
        assert_eq!(
            account.expiration_date(),
            NaiveDate::from_ymd_opt(2013, 7, 25)
        );
    }

    #[test]
    fn test_pending_account_has_no_members() {
        let account = account_ref(json!({
            "url": "http://localhost:8000/organizations/api/accounts/a-1/"
        }))
        .into_service()
        .unwrap();
        assert!(account.members().is_none());
        assert!(account.roles().is_empty());
        assert_eq!(account.expiration_date(), None);
    }

    #[tokio::test]
    async fn test_stub_save_and_delete_are_rejected_locally() {
        let stub = account_ref(json!({"name": "Externa", "uuid": "e-1"}));

        let error = stub.delete().await.unwrap_err();
        assert!(matches!(
            error,
            ResourceError::OperationNotAllowed {
                resource: "Account",
                operation: "delete"
            }
        ));
        assert!(stub.save().await.unwrap_err().is_usage_error());
    }

    #[test]
    fn test_rebind_session_moves_related_collections() {
        let mut account = account_ref(json!({
            "name": "Conta",
            "uuid": "a-1",
            "url": "http://localhost:8000/organizations/api/accounts/a-1/",
            "history_url": "http://localhost:8000/organizations/api/accounts/a-1/history/",
            "notifications_url": "http://localhost:8000/organizations/api/accounts/a-1/notifications/",
            "members_url": "http://localhost:8000/organizations/api/accounts/a-1/members/",
            "members_data": [{"identity": {"uuid": "m-1"}, "roles": ["owner"]}]
        }));
        let other = crate::rest::resource_test_client();

        account.rebind_session(Arc::clone(&other));

        let account = account.as_service().unwrap();
        assert!(Arc::ptr_eq(account.resource().client(), &other));
        assert!(Arc::ptr_eq(account.history().unwrap().client(), &other));
        assert!(Arc::ptr_eq(account.notifications().unwrap().client(), &other));
        let members = account.members().unwrap();
        assert!(Arc::ptr_eq(members.client(), &other));
        assert_eq!(members.seed().len(), 1);
    }
}
