//! User identities and the authenticate flow.

use std::sync::Arc;

use serde_json::Value;

use crate::auth::AuthRequest;
use crate::clients::HttpClient;
use crate::rest::kinds::{origin_of, AUTH_PATH};
use crate::rest::resources::{AccountRef, Notification, NotificationOptions, Profile};
use crate::rest::{
    build_path, Collection, RemoteEntity, Resource, ResourceError, ResourceKind,
    ResourceOperation, IDENTITY_ACCOUNTS, IDENTITY_ACCOUNTS_PATH, IDENTITY_PATH,
};

/// A user identity.
///
/// The accounts an identity belongs to are available right away from the
/// inline `accounts` list, without a request; [`Collection::all`] re-fetches
/// them. The profile is fetched on first access and then kept.
///
/// # Example
///
/// ```rust,ignore
/// use passaporte_web::rest::{ListParams, Lookup, RemoteEntity};
///
/// let mut user = app.users().get(Lookup::email("user@example.com")).await?;
///
/// if let Some(profile) = user.profile().await? {
///     profile.set("nickname", "bob");
///     profile.save().await?;
/// }
///
/// let owned = user
///     .accounts()
///     .unwrap()
///     .all(ListParams { role: Some("owner".into()), ..ListParams::default() })
///     .collect_all()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    resource: Resource,
    accounts: Option<Collection<AccountRef>>,
    profile: Option<Profile>,
}

impl RemoteEntity for Identity {
    const KIND: ResourceKind = ResourceKind::Identity;

    fn from_resource(resource: Resource) -> Self {
        let accounts = accounts_of(&resource);
        Self {
            resource,
            accounts,
            profile: None,
        }
    }

    fn resource(&self) -> &Resource {
        &self.resource
    }

    fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }
}

/// Builds the accounts collection of an identity payload.
///
/// The URL is derived from the identity's own URL and uuid; the seed is
/// the inline `accounts` list.
fn accounts_of(resource: &Resource) -> Option<Collection<AccountRef>> {
    let uuid = resource.get_str("uuid")?;
    let url = format!(
        "{}{}",
        resource.url().map(origin_of).unwrap_or_default(),
        build_path(IDENTITY_ACCOUNTS_PATH, &[("uuid", uuid)])
    );
    let seed = resource
        .get("accounts")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).cloned().collect())
        .unwrap_or_default();

    Some(Collection::new(url, Arc::clone(resource.client()), IDENTITY_ACCOUNTS).with_seed(seed))
}

impl Identity {
    /// Returns the identity's uuid.
    #[must_use]
    pub fn uuid(&self) -> Option<&str> {
        self.resource.get_str("uuid")
    }

    /// Returns the identity's email.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.resource.get_str("email")
    }

    /// Returns the accounts the identity belongs to.
    ///
    /// `None` when the payload has no uuid to derive the URL from.
    #[must_use]
    pub const fn accounts(&self) -> Option<&Collection<AccountRef>> {
        self.accounts.as_ref()
    }

    /// Returns the profile, fetching it on first access.
    ///
    /// Returns `Ok(None)` when the payload has no `profile_url`. Later calls
    /// return the same profile without a request.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] if the first fetch fails. Nothing is
    /// cached in that case.
    pub async fn profile(&mut self) -> Result<Option<&mut Profile>, ResourceError> {
        if self.profile.is_none() {
            let Some(url) = self.resource.get_str("profile_url").map(ToString::to_string) else {
                return Ok(None);
            };
            let profile = Profile::load(&url, Arc::clone(self.resource.client())).await?;
            self.profile = Some(profile);
        }

        Ok(self.profile.as_mut())
    }

    /// Returns the profile if it has already been fetched.
    #[must_use]
    pub const fn cached_profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Sends a notification to this identity.
    ///
    /// The destination is always this identity's uuid.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArguments`] if the identity has no
    /// uuid, or [`ResourceError::Http`] if the platform rejects it.
    pub async fn send_notification(
        &self,
        body: &str,
        options: NotificationOptions,
    ) -> Result<Notification, ResourceError> {
        super::notification::send(&self.resource, self.uuid(), body, options).await
    }

    /// Moves the identity onto another client.
    ///
    /// The accounts collection is rebuilt against the new client and a
    /// cached profile, bound to the old one, is dropped.
    pub fn rebind_session(&mut self, client: Arc<HttpClient>) {
        self.resource.rebind(client);
        self.accounts = accounts_of(&self.resource);
        self.profile = None;
    }
}

impl Collection<Identity> {
    /// Exchanges end-user credentials for the identity they belong to.
    ///
    /// The end-user credentials are used for this one request only. The
    /// returned identity, and everything reached through it, talks through
    /// this collection's application client.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::InvalidArguments`] if the credentials are incomplete
    /// - [`ResourceError::UnexpectedBody`] if the answer is not an object
    /// - [`ResourceError::Http`] if the platform rejects the credentials
    pub async fn authenticate(&self, request: AuthRequest) -> Result<Identity, ResourceError> {
        request
            .validate()
            .map_err(|reason| ResourceError::InvalidArguments {
                resource: self.spec().name,
                operation: ResourceOperation::Authenticate.as_str(),
                reason: format!("'{reason}' is required"),
            })?;

        let app_client = Arc::clone(self.client());
        let user_client = Arc::new(app_client.with_credentials(request.into_credentials()));

        let url = format!("{}{AUTH_PATH}", origin_of(self.url()));
        let response = user_client.get(&url, None).await?;

        let data = match response.body {
            Value::Object(data) => data,
            other => {
                return Err(ResourceError::UnexpectedBody {
                    resource: Identity::KIND.name(),
                    reason: format!("expected an object, got {other}"),
                })
            }
        };

        let locator = data.get("uuid").and_then(Value::as_str).map(|uuid| {
            format!(
                "{}{}",
                origin_of(&response.url),
                build_path(IDENTITY_PATH, &[("uuid", uuid)])
            )
        });

        let mut identity = Identity::from_resource(Resource::from_parts(
            Identity::KIND,
            data,
            user_client,
            None,
            locator,
        ));
        identity.rebind_session(app_client);

        tracing::debug!(
            identity = identity.uuid().unwrap_or_default(),
            "Replaced end-user credentials with application credentials"
        );

        Ok(identity)
    }
}

// Verify Identity is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Identity>();
};
