//! Memberships of identities in service accounts.

use serde_json::{Map, Value};

use crate::rest::{RemoteEntity, Resource, ResourceKind};

/// A membership of an identity in a service account.
///
/// Member payloads carry no locator of their own; their URL is the URL of
/// the response that produced them.
#[derive(Debug, Clone)]
pub struct AccountMember {
    resource: Resource,
}

impl RemoteEntity for AccountMember {
    const KIND: ResourceKind = ResourceKind::AccountMember;

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

impl AccountMember {
    /// Returns the member's roles.
    ///
    /// An empty list sent on creation is stored as `["user"]` by the platform.
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        self.resource
            .get("roles")
            .and_then(Value::as_array)
            .map(|roles| roles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the member's identity summary.
    #[must_use]
    pub fn identity(&self) -> Option<&Map<String, Value>> {
        self.resource.get("identity").and_then(Value::as_object)
    }

    /// Returns the uuid of the member's identity.
    #[must_use]
    pub fn identity_uuid(&self) -> Option<&str> {
        self.identity()
            .and_then(|identity| identity.get("uuid"))
            .and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::FromPayload;
    use serde_json::json;

    fn member(data: Value, response_url: Option<&str>) -> AccountMember {
        let Value::Object(data) = data else {
            panic!("expected object")
        };
        AccountMember::from_payload(
            data,
            crate::rest::resource_test_client(),
            response_url.map(ToString::to_string),
        )
    }

    #[test]
    fn test_roles_and_identity() {
        let member = member(
            json!({
                "identity": {"uuid": "bedcd531", "email": "user@example.com"},
                "roles": ["admin", "user"]
            }),
            None,
        );

        assert_eq!(member.roles(), vec!["admin", "user"]);
        assert_eq!(member.identity_uuid(), Some("bedcd531"));
        assert_eq!(member.url(), None);
    }

    #[test]
    fn test_url_falls_back_to_response_url() {
        let member = member(
            json!({"roles": ["user"]}),
            Some("http://localhost:8000/organizations/api/accounts/a1/members/bedcd531/"),
        );

        assert_eq!(
            member.url(),
            Some("http://localhost:8000/organizations/api/accounts/a1/members/bedcd531/")
        );
        assert!(member.identity().is_none());
    }
}
