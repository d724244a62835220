//! Notifications sent to identities and service accounts.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::clients::HttpClient;
use crate::rest::kinds::{origin_of, NOTIFICATIONS_PATH};
use crate::rest::{RemoteEntity, Resource, ResourceError, ResourceKind, ResourceOperation};

/// Optional parameters of `send_notification`.
///
/// The destination is never an option: it is always the entity the
/// notification is sent from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationOptions {
    /// Link the notification points to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    /// When to deliver, in the platform's `YYYY-MM-DD HH:MM:SS` format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_to: Option<String>,
    /// Free-form tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A notification.
///
/// Scheduled notifications can be deleted once a probe allows it.
#[derive(Debug, Clone)]
pub struct Notification {
    resource: Resource,
}

impl RemoteEntity for Notification {
    const KIND: ResourceKind = ResourceKind::Notification;

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

impl Notification {
    /// Returns the notification text.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.resource.get_str("body")
    }

    /// Returns the link the notification points to.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        self.resource.get_str("target_url")
    }

    /// Returns when the notification is delivered.
    #[must_use]
    pub fn scheduled_to(&self) -> Option<&str> {
        self.resource.get_str("scheduled_to")
    }

    /// Returns the tags.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        self.resource
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the uuid of the recipient.
    ///
    /// Read from `destination_data` when present, else from `destination`.
    #[must_use]
    pub fn destination_uuid(&self) -> Option<&str> {
        self.resource
            .get("destination_data")
            .and_then(|data| data.get("uuid"))
            .and_then(Value::as_str)
            .or_else(|| self.resource.get_str("destination"))
    }
}

/// Posts a notification addressed to `destination`.
///
/// `sender` is the resource the notification is sent from; its URL decides
/// which host receives the request.
pub(crate) async fn send(
    sender: &Resource,
    destination: Option<&str>,
    body: &str,
    options: NotificationOptions,
) -> Result<Notification, ResourceError> {
    let destination = destination.ok_or_else(|| ResourceError::InvalidArguments {
        resource: sender.kind().name(),
        operation: ResourceOperation::Notify.as_str(),
        reason: "the sender has no uuid".to_string(),
    })?;

    let mut payload = object_payload(&options, sender.kind())?;
    payload.insert("body".to_string(), Value::from(body));
    payload.insert("destination".to_string(), Value::from(destination));

    let url = format!(
        "{}{NOTIFICATIONS_PATH}",
        sender.url().map(origin_of).unwrap_or_default()
    );
    let client: Arc<HttpClient> = Arc::clone(sender.client());
    let response = client.post(&url, Value::Object(payload)).await?;

    let response_url = response.header("location").map(ToString::to_string);
    match response.body {
        Value::Object(data) => Ok(Notification::from_resource(Resource::from_parts(
            ResourceKind::Notification,
            data,
            client,
            response_url,
            None,
        ))),
        other => Err(ResourceError::UnexpectedBody {
            resource: ResourceKind::Notification.name(),
            reason: format!("expected an object, got {other}"),
        }),
    }
}

/// Serializes notification parameters into a JSON object.
fn object_payload<T: Serialize>(
    params: &T,
    sender: ResourceKind,
) -> Result<Map<String, Value>, ResourceError> {
    let invalid = |reason: String| ResourceError::InvalidArguments {
        resource: sender.name(),
        operation: ResourceOperation::Notify.as_str(),
        reason,
    };

    match serde_json::to_value(params) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(invalid(format!(
            "notification options must serialize to an object, got {other}"
        ))),
        Err(e) => Err(invalid(format!("Failed to serialize notification options: {e}"))),
    }
}
