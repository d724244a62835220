//! User profiles.

use crate::rest::{RemoteEntity, Resource, ResourceKind};

/// A user's profile.
///
/// Reached through [`Identity::profile`](super::Identity::profile). Which
/// fields can be changed is decided by the platform's metadata probe.
#[derive(Debug, Clone)]
pub struct Profile {
    resource: Resource,
}

impl RemoteEntity for Profile {
    const KIND: ResourceKind = ResourceKind::Profile;

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
