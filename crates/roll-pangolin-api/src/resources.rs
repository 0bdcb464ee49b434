// Resource, target and access-control endpoints
//
// Listing and creation are organization-scoped; everything keyed by a
// resource id lives under `resource/{id}`.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{PangolinClient, require_data};
use crate::error::Error;
use crate::models::{
    CreatedResource, NewResource, NewTarget, RemoteId, ResourceList, ResourceSummary,
};

/// Path segment used when the owning site could not be resolved.
const UNRESOLVED_SITE: &str = "null";

impl PangolinClient {
    /// List every resource of the organization.
    ///
    /// `GET org/{org}/resources`
    pub async fn list_resources(&self) -> Result<Vec<ResourceSummary>, Error> {
        let url = self.org_url(&["resources"]);
        debug!("listing resources");
        let list: Option<ResourceList> = self.get(url).await?;
        Ok(list.unwrap_or_default().resources)
    }

    /// Delete a resource.
    ///
    /// `DELETE resource/{id}`
    pub async fn delete_resource(&self, id: &RemoteId) -> Result<(), Error> {
        let id = id.to_string();
        let url = self.api_url(&["resource", &id]);
        debug!(resource_id = %id, "deleting resource");
        let _: Option<serde_json::Value> = self.delete(url).await?;
        Ok(())
    }

    /// Create a resource on a site.
    ///
    /// `PUT org/{org}/site/{siteId}/resource/`. An unresolved site is
    /// submitted as `null`; the control plane rejects or accepts it.
    pub async fn create_resource(
        &self,
        site_id: Option<&RemoteId>,
        resource: &NewResource,
    ) -> Result<CreatedResource, Error> {
        let site = site_id.map_or_else(|| UNRESOLVED_SITE.to_owned(), ToString::to_string);
        let url = self.org_url(&["site", &site, "resource", ""]);
        debug!(name = %resource.name, site = %site, "creating resource");
        let created: Option<CreatedResource> = self.put(url, resource).await?;
        require_data(created, "create resource")
    }

    /// Attach a target to a resource.
    ///
    /// `PUT resource/{id}/target`
    pub async fn set_target(&self, id: &RemoteId, target: &NewTarget) -> Result<(), Error> {
        let id = id.to_string();
        let url = self.api_url(&["resource", &id, "target"]);
        debug!(resource_id = %id, ip = %target.ip, port = target.port, "adding target");
        let _: Option<serde_json::Value> = self.put(url, target).await?;
        Ok(())
    }

    /// Protect a resource with a password.
    ///
    /// `POST resource/{id}/password` with `{"password": "..."}`
    pub async fn set_password(&self, id: &RemoteId, password: &SecretString) -> Result<(), Error> {
        let id = id.to_string();
        let url = self.api_url(&["resource", &id, "password"]);
        debug!(resource_id = %id, "setting resource password");
        let _: Option<serde_json::Value> = self
            .post(url, &json!({ "password": password.expose_secret() }))
            .await?;
        Ok(())
    }

    /// Protect a resource with a PIN code.
    ///
    /// `POST resource/{id}/pincode` with `{"pincode": "..."}`
    pub async fn set_pincode(&self, id: &RemoteId, pincode: &SecretString) -> Result<(), Error> {
        let id = id.to_string();
        let url = self.api_url(&["resource", &id, "pincode"]);
        debug!(resource_id = %id, "setting resource pincode");
        let _: Option<serde_json::Value> = self
            .post(url, &json!({ "pincode": pincode.expose_secret() }))
            .await?;
        Ok(())
    }

    /// Turn platform SSO off for a resource.
    ///
    /// `POST resource/{id}` with `{"sso": false}` (the resource update call).
    pub async fn disable_sso(&self, id: &RemoteId) -> Result<(), Error> {
        let id = id.to_string();
        let url = self.api_url(&["resource", &id]);
        debug!(resource_id = %id, "disabling SSO");
        let _: Option<serde_json::Value> = self.post(url, &json!({ "sso": false })).await?;
        Ok(())
    }
}
