//! Single remote entities and the traits typed variants build on.
//!
//! A [`Resource`] is one entity the platform exposes. It keeps:
//!
//! - the raw payload, in the order the platform sent it
//! - the mutable field set, discovered by a metadata probe (`OPTIONS`)
//! - the methods the probe said are allowed (its `Allow` header)
//! - the shared [`HttpClient`] it talks through
//!
//! Nothing about which fields are writable is hardcoded: until a probe has
//! run, [`Resource::save`] refuses to send anything.
//!
//! # Example
//!
//! ```rust,ignore
//! use passaporte_web::rest::{Resource, ResourceKind};
//!
//! let mut profile = Resource::load(&profile_url, client, ResourceKind::Profile).await?;
//! profile.set("nickname", "bob");
//!
//! // Only fields reported by the probe are sent.
//! let updated = profile.save().await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

use crate::clients::{HttpClient, HttpMethod, HttpResponse};
use crate::rest::{KindSpec, ResourceError, ResourceKind, ResourceOperation};

/// What a metadata probe reported about a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMeta {
    fields: Option<Vec<String>>,
    allowed_methods: Vec<HttpMethod>,
}

impl ResourceMeta {
    /// Creates metadata from explicit values.
    #[must_use]
    pub const fn new(fields: Option<Vec<String>>, allowed_methods: Vec<HttpMethod>) -> Self {
        Self {
            fields,
            allowed_methods,
        }
    }

    /// Reads a probe response.
    ///
    /// `fields` are the keys of the body's `fields` map, in server order,
    /// or `None` when the map is absent.
    #[must_use]
    pub fn from_probe(response: &HttpResponse) -> Self {
        let fields = response
            .body
            .get("fields")
            .and_then(Value::as_object)
            .map(|map| map.keys().cloned().collect());

        Self {
            fields,
            allowed_methods: response.allowed_methods(),
        }
    }

    /// Returns the names of the fields that may be written.
    #[must_use]
    pub fn fields(&self) -> Option<&[String]> {
        self.fields.as_deref()
    }

    /// Returns the methods the platform allows on the resource.
    #[must_use]
    pub fn allowed_methods(&self) -> &[HttpMethod] {
        &self.allowed_methods
    }

    /// Returns `true` if the platform allows `method` on the resource.
    #[must_use]
    pub fn allows(&self, method: HttpMethod) -> bool {
        self.allowed_methods.contains(&method)
    }
}

/// Options for [`Resource::load_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Run the metadata probe right after the GET.
    pub probe: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { probe: true }
    }
}

impl LoadOptions {
    /// Options for read-only access: no metadata probe.
    #[must_use]
    pub const fn read_only() -> Self {
        Self { probe: false }
    }
}

/// One remote entity.
///
/// Cloning a resource clones its payload and shares its client.
#[derive(Debug, Clone)]
pub struct Resource {
    kind: ResourceKind,
    data: Map<String, Value>,
    meta: Option<ResourceMeta>,
    locator: Option<String>,
    response_url: Option<String>,
    client: Arc<HttpClient>,
}

impl Resource {
    /// Synthesizes a resource from an inline payload, without a request.
    #[must_use]
    pub fn from_seed(kind: ResourceKind, data: Map<String, Value>, client: Arc<HttpClient>) -> Self {
        Self::from_parts(kind, data, client, None, None)
    }

    pub(crate) fn from_parts(
        kind: ResourceKind,
        data: Map<String, Value>,
        client: Arc<HttpClient>,
        response_url: Option<String>,
        locator: Option<String>,
    ) -> Self {
        Self {
            kind,
            data,
            meta: None,
            locator,
            response_url,
            client,
        }
    }

    /// Builds a resource from a response whose body is a JSON object.
    pub(crate) fn from_response(
        kind: ResourceKind,
        response: HttpResponse,
        client: Arc<HttpClient>,
        locator: Option<String>,
    ) -> Result<Self, ResourceError> {
        match response.body {
            Value::Object(data) => Ok(Self::from_parts(
                kind,
                data,
                client,
                Some(response.url),
                locator,
            )),
            other => Err(ResourceError::UnexpectedBody {
                resource: kind.name(),
                reason: format!("expected an object, got {other}"),
            }),
        }
    }

    /// Fetches a resource and probes its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] if either request fails, and
    /// [`ResourceError::UnexpectedBody`] if the body is not an object.
    pub async fn load(
        url: &str,
        client: Arc<HttpClient>,
        kind: ResourceKind,
    ) -> Result<Self, ResourceError> {
        Self::load_with(url, client, kind, LoadOptions::default()).await
    }

    /// Fetches a resource, probing its metadata only if `options` say so.
    ///
    /// # Errors
    ///
    /// See [`Resource::load`].
    pub async fn load_with(
        url: &str,
        client: Arc<HttpClient>,
        kind: ResourceKind,
        options: LoadOptions,
    ) -> Result<Self, ResourceError> {
        let response = client.get(url, None).await?;
        let mut resource = Self::from_response(kind, response, client, Some(url.to_string()))?;

        if options.probe {
            resource.load_options().await?;
        }

        Ok(resource)
    }

    /// Runs the metadata probe and stores what it reported.
    ///
    /// A probe without a `fields` map leaves the resource immutable.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingUrl`] if the resource has no URL, or
    /// [`ResourceError::Http`] if the probe fails.
    pub async fn load_options(&mut self) -> Result<&ResourceMeta, ResourceError> {
        let url = self.require_url(ResourceOperation::Probe)?;
        let response = self.client.options(&url).await?;
        let meta = ResourceMeta::from_probe(&response);

        if meta.fields().is_none() {
            tracing::warn!(
                resource = self.kind.name(),
                url = %url,
                "Metadata probe reported no mutable fields"
            );
        }

        Ok(self.meta.insert(meta))
    }

    /// Sends the mutable fields and returns the resource the platform
    /// answers with.
    ///
    /// Only keys reported by the last probe are sent. Date fields of the
    /// kind are truncated to `YYYY-MM-DD`. The returned resource has not
    /// been probed.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::OperationNotAllowed`] if the kind is never savable
    /// - [`ResourceError::FieldsNotLoaded`] if no probe reported fields
    /// - [`ResourceError::MissingUrl`] if the resource has no URL
    /// - [`ResourceError::Http`] if the platform rejects the update
    pub async fn save(&self) -> Result<Self, ResourceError> {
        let spec = self.spec();
        if !spec.savable {
            return Err(self.not_allowed(ResourceOperation::Save));
        }

        let payload = self.mutable_payload()?;
        let url = self.require_url(ResourceOperation::Save)?;

        let response = self.client.put(&url, Value::Object(payload)).await?;
        Self::from_response(self.kind, response, Arc::clone(&self.client), Some(url))
    }

    /// Deletes the resource.
    ///
    /// Requires a probe whose `Allow` header lists `DELETE`.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::OperationNotAllowed`] if the kind is never
    ///   deletable, or the probe did not allow DELETE (or never ran)
    /// - [`ResourceError::MissingUrl`] if the resource has no URL
    /// - [`ResourceError::Http`] if the platform rejects the deletion
    pub async fn delete(&self) -> Result<(), ResourceError> {
        let allowed = self.spec().deletable
            && self
                .meta
                .as_ref()
                .is_some_and(|meta| meta.allows(HttpMethod::Delete));
        if !allowed {
            return Err(self.not_allowed(ResourceOperation::Delete));
        }

        let url = self.require_url(ResourceOperation::Delete)?;
        self.client.delete(&url).await?;
        Ok(())
    }

    /// Returns the payload subset a save would send.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::FieldsNotLoaded`] if no probe reported fields.
    pub fn mutable_payload(&self) -> Result<Map<String, Value>, ResourceError> {
        let fields = self
            .fields()
            .ok_or(ResourceError::FieldsNotLoaded {
                resource: self.kind.name(),
            })?;
        let date_fields = self.spec().date_fields;

        let mut payload = Map::new();
        for field in fields {
            if let Some(value) = self.data.get(field) {
                let value = if date_fields.contains(&field.as_str()) {
                    truncate_to_date(value)
                } else {
                    value.clone()
                };
                payload.insert(field.clone(), value);
            }
        }
        Ok(payload)
    }

    /// Returns the resource's URL.
    ///
    /// The payload's own locator wins; then the URL of the response that
    /// produced the payload; then the locator it was loaded from.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.data
            .get(self.spec().url_key)
            .and_then(Value::as_str)
            .or(self.response_url.as_deref())
            .or(self.locator.as_deref())
    }

    /// Returns the kind of this resource.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the behavior table of this resource's kind.
    #[must_use]
    pub const fn spec(&self) -> KindSpec {
        self.kind.spec()
    }

    /// Returns the raw payload.
    #[must_use]
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Consumes the resource, returning its payload.
    #[must_use]
    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    /// Returns a payload value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Returns a payload value if it is a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// Sets a payload value locally. Only mutable fields are ever sent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(name.into(), value.into());
    }

    /// Returns the mutable fields, if a probe has reported them.
    #[must_use]
    pub fn fields(&self) -> Option<&[String]> {
        self.meta.as_ref().and_then(ResourceMeta::fields)
    }

    /// Returns what the last probe reported.
    #[must_use]
    pub const fn meta(&self) -> Option<&ResourceMeta> {
        self.meta.as_ref()
    }

    /// Returns the client this resource talks through.
    #[must_use]
    pub const fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Replaces the client this resource talks through.
    ///
    /// Typed variants holding related collections rebuild them through
    /// their own `rebind_session`.
    pub(crate) fn rebind(&mut self, client: Arc<HttpClient>) {
        self.client = client;
    }

    fn require_url(&self, operation: ResourceOperation) -> Result<String, ResourceError> {
        self.url()
            .map(ToString::to_string)
            .ok_or(ResourceError::MissingUrl {
                resource: self.kind.name(),
                operation: operation.as_str(),
            })
    }

    const fn not_allowed(&self, operation: ResourceOperation) -> ResourceError {
        ResourceError::OperationNotAllowed {
            resource: self.kind.name(),
            operation: operation.as_str(),
        }
    }
}

/// Truncates a datetime string to its date component.
///
/// Values that are not datetimes are returned unchanged.
fn truncate_to_date(value: &Value) -> Value {
    let Some(text) = value.as_str() else {
        return value.clone();
    };

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Value::String(datetime.date_naive().format("%Y-%m-%d").to_string());
    }

    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Value::String(datetime.date().format("%Y-%m-%d").to_string());
        }
    }

    value.clone()
}

/// A typed view over a [`Resource`].
///
/// Implementors only say how to wrap and unwrap a resource; loading,
/// probing, saving and deleting are provided.
#[allow(async_fn_in_trait)]
pub trait RemoteEntity: Sized {
    /// The kind of resource this type wraps.
    const KIND: ResourceKind;

    /// Wraps a resource of [`Self::KIND`].
    fn from_resource(resource: Resource) -> Self;

    /// Returns the wrapped resource.
    fn resource(&self) -> &Resource;

    /// Returns the wrapped resource mutably.
    fn resource_mut(&mut self) -> &mut Resource;

    /// Returns the entity's URL.
    fn url(&self) -> Option<&str> {
        self.resource().url()
    }

    /// Returns a payload value.
    fn get(&self, name: &str) -> Option<&Value> {
        self.resource().get(name)
    }

    /// Sets a payload value locally.
    fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.resource_mut().set(name, value);
    }

    /// Fetches the entity at `url` and probes its metadata.
    ///
    /// # Errors
    ///
    /// See [`Resource::load`].
    async fn load(url: &str, client: Arc<HttpClient>) -> Result<Self, ResourceError> {
        Resource::load(url, client, Self::KIND)
            .await
            .map(Self::from_resource)
    }

    /// Fetches the entity at `url` with explicit options.
    ///
    /// # Errors
    ///
    /// See [`Resource::load`].
    async fn load_with(
        url: &str,
        client: Arc<HttpClient>,
        options: LoadOptions,
    ) -> Result<Self, ResourceError> {
        Resource::load_with(url, client, Self::KIND, options)
            .await
            .map(Self::from_resource)
    }

    /// Runs the metadata probe.
    ///
    /// # Errors
    ///
    /// See [`Resource::load_options`].
    async fn load_options(&mut self) -> Result<(), ResourceError> {
        self.resource_mut().load_options().await.map(|_| ())
    }

    /// Sends the mutable fields and wraps the platform's answer.
    ///
    /// # Errors
    ///
    /// See [`Resource::save`].
    async fn save(&self) -> Result<Self, ResourceError> {
        self.resource().save().await.map(Self::from_resource)
    }

    /// Deletes the entity.
    ///
    /// # Errors
    ///
    /// See [`Resource::delete`].
    async fn delete(&self) -> Result<(), ResourceError> {
        self.resource().delete().await
    }
}

/// Builds collection items from listing payloads.
pub trait FromPayload: Sized {
    /// Builds an item from one payload object.
    ///
    /// `response_url` is set when the payload was the whole body of a
    /// response addressed to the item itself.
    fn from_payload(
        data: Map<String, Value>,
        client: Arc<HttpClient>,
        response_url: Option<String>,
    ) -> Self;

    /// Returns the resource a single-item lookup probes, if the item has one.
    fn backing_resource_mut(&mut self) -> Option<&mut Resource>;
}

impl<T: RemoteEntity> FromPayload for T {
    fn from_payload(
        data: Map<String, Value>,
        client: Arc<HttpClient>,
        response_url: Option<String>,
    ) -> Self {
        Self::from_resource(Resource::from_parts(
            T::KIND,
            data,
            client,
            response_url,
            None,
        ))
    }

    fn backing_resource_mut(&mut self) -> Option<&mut Resource> {
        Some(self.resource_mut())
    }
}

impl FromPayload for Resource {
    fn from_payload(
        data: Map<String, Value>,
        client: Arc<HttpClient>,
        response_url: Option<String>,
    ) -> Self {
        Self::from_parts(ResourceKind::Resource, data, client, response_url, None)
    }

    fn backing_resource_mut(&mut self) -> Option<&mut Resource> {
        Some(self)
    }
}

// Verify Resource is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Resource>();
    assert_send_sync::<ResourceMeta>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credentials, Session};
    use crate::config::{AppSecret, AppToken, HostUrl};
    use serde_json::json;
    use std::collections::HashMap;

    fn client() -> Arc<HttpClient> {
        let session = Session::new(
            HostUrl::new("http://localhost:8000").unwrap(),
            Credentials::application(
                AppToken::new("token").unwrap(),
                AppSecret::new("secret").unwrap(),
            ),
        );
        Arc::new(HttpClient::new(session, None).unwrap())
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn probe(body: Value, allow: Option<&str>) -> HttpResponse {
        let mut headers = HashMap::new();
        if let Some(allow) = allow {
            headers.insert("allow".to_string(), vec![allow.to_string()]);
        }
        HttpResponse::new(200, headers, body, "http://localhost:8000/x/")
    }

    #[test]
    fn test_meta_from_probe_keeps_server_order() {
        let meta = ResourceMeta::from_probe(&probe(
            json!({"fields": {"plan_slug": {}, "expiration": {}}}),
            Some("GET, PUT, OPTIONS"),
        ));

        assert_eq!(
            meta.fields(),
            Some(&["plan_slug".to_string(), "expiration".to_string()][..])
        );
        assert!(meta.allows(HttpMethod::Put));
        assert!(!meta.allows(HttpMethod::Delete));
    }

    #[test]
    fn test_meta_without_fields_is_immutable() {
        let meta = ResourceMeta::from_probe(&probe(json!({"name": "Profile"}), None));
        assert!(meta.fields().is_none());
        assert!(meta.allowed_methods().is_empty());
    }

    #[test]
    fn test_url_prefers_payload_then_response_then_locator() {
        let with_key = Resource::from_parts(
            ResourceKind::Profile,
            object(json!({"url": "http://localhost:8000/own/"})),
            client(),
            Some("http://localhost:8000/response/".to_string()),
            Some("/locator/".to_string()),
        );
        assert_eq!(with_key.url(), Some("http://localhost:8000/own/"));

        let from_response = Resource::from_parts(
            ResourceKind::AccountMember,
            object(json!({"roles": ["admin"]})),
            client(),
            Some("http://localhost:8000/response/".to_string()),
            Some("/locator/".to_string()),
        );
        assert_eq!(from_response.url(), Some("http://localhost:8000/response/"));

        let from_locator = Resource::from_parts(
            ResourceKind::Resource,
            Map::new(),
            client(),
            None,
            Some("/locator/".to_string()),
        );
        assert_eq!(from_locator.url(), Some("/locator/"));

        let seed = Resource::from_seed(ResourceKind::Account, Map::new(), client());
        assert_eq!(seed.url(), None);
    }

    #[test]
    fn test_mutable_payload_requires_probe() {
        let resource = Resource::from_seed(
            ResourceKind::Profile,
            object(json!({"nickname": "bob"})),
            client(),
        );
        assert!(matches!(
            resource.mutable_payload(),
            Err(ResourceError::FieldsNotLoaded { resource: "Profile" })
        ));
    }

    #[test]
    fn test_mutable_payload_sends_only_fields_and_truncates_dates() {
        let mut resource = Resource::from_seed(
            ResourceKind::ServiceAccount,
            object(json!({
                "name": "Conta",
                "plan_slug": "unittest",
                "expiration": "2013-07-25 23:59:59",
                "url": "http://localhost:8000/organizations/api/accounts/1/"
            })),
            client(),
        );
        resource.meta = Some(ResourceMeta::new(
            Some(vec!["plan_slug".to_string(), "expiration".to_string()]),
            vec![],
        ));

        let payload = resource.mutable_payload().unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({"plan_slug": "unittest", "expiration": "2013-07-25"})
        );
    }

    #[test]
    fn test_truncate_to_date_formats() {
        assert_eq!(
            truncate_to_date(&json!("2014-01-31T10:11:12Z")),
            json!("2014-01-31")
        );
        assert_eq!(
            truncate_to_date(&json!("2014-01-31T23:00:00-03:00")),
            json!("2014-01-31")
        );
        assert_eq!(
            truncate_to_date(&json!("2014-01-31 10:11:12.123456")),
            json!("2014-01-31")
        );
        assert_eq!(truncate_to_date(&json!("2014-01-31")), json!("2014-01-31"));
        assert_eq!(truncate_to_date(&Value::Null), Value::Null);
    }

    #[test]
    fn test_set_and_get() {
        let mut resource = Resource::from_seed(ResourceKind::Identity, Map::new(), client());
        resource.set("first_name", "Ana");
        assert_eq!(resource.get_str("first_name"), Some("Ana"));
        assert_eq!(resource.get("missing"), None);
        assert!(resource.fields().is_none());
    }

    #[tokio::test]
    async fn test_delete_without_probe_sends_nothing() {
        let resource = Resource::from_seed(
            ResourceKind::Notification,
            object(json!({"url": "http://127.0.0.1:1/notifications/api/1/"})),
            client(),
        );
        assert!(matches!(
            resource.delete().await,
            Err(ResourceError::OperationNotAllowed {
                resource: "Notification",
                operation: "delete"
            })
        ));
    }

    #[tokio::test]
    async fn test_save_on_read_only_kind_is_rejected() {
        let resource = Resource::from_seed(
            ResourceKind::Account,
            object(json!({"name": "Conta", "uuid": "u-1"})),
            client(),
        );
        let error = resource.save().await.unwrap_err();
        assert!(error.is_usage_error());
    }
}
