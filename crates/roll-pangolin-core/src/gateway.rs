// ── Remote collaborators ──
//
// The reconciler and the run pipeline talk to the control plane and the
// container runtime through these two traits. `PangolinClient` and
// `DockerClient` are the production implementations; tests plug in fakes.

use std::future::Future;

use roll_pangolin_api::{
    CreatedResource, DockerClient, DomainSummary, NewResource, NewTarget, PangolinClient,
    RemoteId, ResourceSummary, SiteDetail,
};
use secrecy::SecretString;

use crate::error::CoreError;
use crate::model::ContainerLabels;

/// Control-plane operations used by a reconciliation pass.
pub trait ControlPlane: Sync {
    fn list_resources(&self) -> impl Future<Output = Result<Vec<ResourceSummary>, CoreError>> + Send;

    fn delete_resource(&self, id: &RemoteId) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn list_domains(&self) -> impl Future<Output = Result<Vec<DomainSummary>, CoreError>> + Send;

    fn get_site(&self, name: &str) -> impl Future<Output = Result<SiteDetail, CoreError>> + Send;

    fn create_resource(
        &self,
        site_id: Option<&RemoteId>,
        resource: &NewResource,
    ) -> impl Future<Output = Result<CreatedResource, CoreError>> + Send;

    fn set_target(
        &self,
        id: &RemoteId,
        target: &NewTarget,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn set_password(
        &self,
        id: &RemoteId,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn set_pincode(
        &self,
        id: &RemoteId,
        pincode: &SecretString,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn disable_sso(&self, id: &RemoteId) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl ControlPlane for PangolinClient {
    async fn list_resources(&self) -> Result<Vec<ResourceSummary>, CoreError> {
        Ok(PangolinClient::list_resources(self).await?)
    }

    async fn delete_resource(&self, id: &RemoteId) -> Result<(), CoreError> {
        Ok(PangolinClient::delete_resource(self, id).await?)
    }

    async fn list_domains(&self) -> Result<Vec<DomainSummary>, CoreError> {
        Ok(PangolinClient::list_domains(self).await?)
    }

    async fn get_site(&self, name: &str) -> Result<SiteDetail, CoreError> {
        Ok(PangolinClient::get_site(self, name).await?)
    }

    async fn create_resource(
        &self,
        site_id: Option<&RemoteId>,
        resource: &NewResource,
    ) -> Result<CreatedResource, CoreError> {
        Ok(PangolinClient::create_resource(self, site_id, resource).await?)
    }

    async fn set_target(&self, id: &RemoteId, target: &NewTarget) -> Result<(), CoreError> {
        Ok(PangolinClient::set_target(self, id, target).await?)
    }

    async fn set_password(&self, id: &RemoteId, password: &SecretString) -> Result<(), CoreError> {
        Ok(PangolinClient::set_password(self, id, password).await?)
    }

    async fn set_pincode(&self, id: &RemoteId, pincode: &SecretString) -> Result<(), CoreError> {
        Ok(PangolinClient::set_pincode(self, id, pincode).await?)
    }

    async fn disable_sso(&self, id: &RemoteId) -> Result<(), CoreError> {
        Ok(PangolinClient::disable_sso(self, id).await?)
    }
}

/// Where container declarations come from.
pub trait ContainerSource: Sync {
    fn list_containers(&self) -> impl Future<Output = Result<Vec<ContainerLabels>, CoreError>> + Send;
}

impl ContainerSource for DockerClient {
    async fn list_containers(&self) -> Result<Vec<ContainerLabels>, CoreError> {
        let containers = DockerClient::list_containers(self).await?;
        Ok(containers
            .into_iter()
            .map(|c| ContainerLabels {
                name: c
                    .names
                    .first()
                    .map(|n| n.trim_start_matches('/').to_owned())
                    .unwrap_or_default(),
                id: c.id,
                labels: c.labels,
            })
            .collect())
    }
}

/// A fixed, already-listed set of containers.
impl ContainerSource for Vec<ContainerLabels> {
    async fn list_containers(&self) -> Result<Vec<ContainerLabels>, CoreError> {
        Ok(self.clone())
    }
}
