// ── Reconciler ──
//
// Drives the control plane towards the desired state in three steps:
//
//   1. deletion pass (redeploy only): every existing resource whose full
//      domain is one of the declared hosts is deleted, concurrently;
//   2. registry resolution: domain list plus one lookup per distinct site
//      name, concurrently;
//   3. creation: per desired resource, in order, create → target → auth.
//
// Unresolved domain or site ids are submitted as null; the control plane
// decides whether to accept them. Every failure is confined to the one
// deletion, lookup or resource it belongs to and recorded in the report.

use std::collections::{BTreeSet, HashMap, HashSet};

use futures_util::future::join_all;
use indexmap::IndexSet;
use roll_pangolin_api::{NewTarget, RemoteId, ResourceSummary};
use tracing::{debug, info, warn};

use crate::desired::DesiredState;
use crate::gateway::ControlPlane;
use crate::model::DesiredResource;
use crate::report::{DeletionOutcome, Outcome, ResourceOutcome, RunReport, Stage};

/// Remote state fetched for one pass.
#[derive(Debug, Clone, Default)]
pub struct RemoteSnapshot {
    /// Existing resources; only fetched when redeploying.
    pub existing: Vec<ResourceSummary>,
    /// Base domain → domain id.
    pub domains: HashMap<String, RemoteId>,
    /// Site name → site id, successful lookups only.
    pub sites: HashMap<String, RemoteId>,
}

/// A resource scheduled for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDeletion {
    pub resource_id: RemoteId,
    pub host: String,
}

/// Existing resources whose full domain is one of `hosts`, each id once.
pub fn plan_deletions(existing: &[ResourceSummary], hosts: &BTreeSet<String>) -> Vec<PlannedDeletion> {
    let mut seen = HashSet::new();
    existing
        .iter()
        .filter_map(|r| {
            let host = r.full_domain.as_deref()?;
            (hosts.contains(host) && seen.insert(r.resource_id.clone())).then(|| PlannedDeletion {
                resource_id: r.resource_id.clone(),
                host: host.to_owned(),
            })
        })
        .collect()
}

pub struct Reconciler<'a, P> {
    plane: &'a P,
    redeploy: bool,
}

impl<'a, P: ControlPlane> Reconciler<'a, P> {
    pub fn new(plane: &'a P, redeploy: bool) -> Self {
        Self { plane, redeploy }
    }

    /// Run one pass. Never fails as a whole; see the report for outcomes.
    pub async fn reconcile(&self, desired: &DesiredState) -> RunReport {
        let mut warnings = Vec::new();

        let existing = if self.redeploy {
            self.existing_resources(&mut warnings).await
        } else {
            Vec::new()
        };
        let deletions = self
            .delete_all(plan_deletions(&existing, &desired.exposed_hosts))
            .await;

        let snapshot = RemoteSnapshot {
            existing,
            domains: self.domain_registry(&mut warnings).await,
            sites: self.site_registry(&desired.resources, &mut warnings).await,
        };

        let mut resources = Vec::with_capacity(desired.resources.len());
        for resource in &desired.resources {
            resources.push(self.apply(resource, &snapshot).await);
        }

        RunReport {
            skipped: desired.skipped.clone(),
            deletions,
            resources,
            warnings,
        }
    }

    async fn existing_resources(&self, warnings: &mut Vec<String>) -> Vec<ResourceSummary> {
        match self.plane.list_resources().await {
            Ok(list) => {
                debug!(count = list.len(), "fetched existing resources");
                list
            }
            Err(e) => {
                warn!(error = %e, "cannot list existing resources; skipping deletion pass");
                warnings.push(format!("listing resources failed: {e}"));
                Vec::new()
            }
        }
    }

    async fn delete_all(&self, planned: Vec<PlannedDeletion>) -> Vec<DeletionOutcome> {
        let deletions = planned.into_iter().map(|p| async move {
            let result = self.plane.delete_resource(&p.resource_id).await;
            match &result {
                Ok(()) => info!(resource_id = %p.resource_id, host = %p.host, "deleted resource"),
                Err(e) => warn!(
                    resource_id = %p.resource_id,
                    host = %p.host,
                    error = %e,
                    "failed to delete resource"
                ),
            }
            DeletionOutcome {
                resource_id: p.resource_id,
                host: p.host,
                error: result.err().map(|e| e.to_string()),
            }
        });
        join_all(deletions).await
    }

    async fn domain_registry(&self, warnings: &mut Vec<String>) -> HashMap<String, RemoteId> {
        match self.plane.list_domains().await {
            Ok(domains) => domains
                .into_iter()
                .map(|d| (d.base_domain, d.domain_id))
                .collect(),
            Err(e) => {
                warn!(error = %e, "cannot list domains; resources will be submitted without one");
                warnings.push(format!("listing domains failed: {e}"));
                HashMap::new()
            }
        }
    }

    async fn site_registry(
        &self,
        resources: &[DesiredResource],
        warnings: &mut Vec<String>,
    ) -> HashMap<String, RemoteId> {
        let names: IndexSet<&str> = resources.iter().map(|r| r.site.as_str()).collect();
        let lookups = names.into_iter().map(|name| async move {
            (name, self.plane.get_site(name).await)
        });

        let mut sites = HashMap::new();
        for (name, result) in join_all(lookups).await {
            match result {
                Ok(site) => {
                    debug!(site = name, site_id = %site.site_id, "resolved site");
                    sites.insert(name.to_owned(), site.site_id);
                }
                Err(e) => {
                    warn!(site = name, error = %e, "site not resolved");
                    warnings.push(format!("site '{name}' not resolved: {e}"));
                }
            }
        }
        sites
    }

    async fn apply(&self, resource: &DesiredResource, snapshot: &RemoteSnapshot) -> ResourceOutcome {
        let name = resource.resource.name.as_str();
        let site_id = snapshot.sites.get(&resource.site);
        let domain_id = snapshot.domains.get(&resource.base_domain);

        if site_id.is_none() {
            warn!(resource = name, site = %resource.site, "submitting with unresolved site");
        }
        if domain_id.is_none() {
            warn!(resource = name, domain = %resource.base_domain, "submitting with unresolved domain");
        }

        let request = resource
            .resource
            .to_request(domain_id.cloned(), site_id.cloned());

        let outcome = match self.plane.create_resource(site_id, &request).await {
            Ok(created) => {
                info!(
                    resource = name,
                    resource_id = %created.resource_id,
                    host = %resource.exposed_host,
                    "created resource"
                );
                self.finish(resource, created.resource_id).await
            }
            Err(e) => failed(name, Stage::Create, &e),
        };

        ResourceOutcome {
            name: name.to_owned(),
            host: resource.exposed_host.clone(),
            site: resource.site.clone(),
            outcome,
        }
    }

    /// Target and auth calls for a freshly created resource.
    async fn finish(&self, resource: &DesiredResource, id: RemoteId) -> Outcome {
        let name = resource.resource.name.as_str();
        let target = NewTarget::from(&resource.target);

        if let Err(e) = self.plane.set_target(&id, &target).await {
            return failed(name, Stage::Target, &e);
        }
        debug!(resource = name, ip = %target.ip, port = target.port, "target attached");

        let auth = &resource.auth;
        let mut errors = Vec::new();

        if let Some(password) = &auth.password {
            if let Err(e) = self.plane.set_password(&id, password).await {
                errors.push(format!("password: {e}"));
            }
        }
        if let Some(pincode) = &auth.pincode {
            if let Err(e) = self.plane.set_pincode(&id, pincode).await {
                errors.push(format!("pincode: {e}"));
            }
        }
        if auth.disables_sso() {
            if let Err(e) = self.plane.disable_sso(&id).await {
                errors.push(format!("sso: {e}"));
            }
        }

        if errors.is_empty() {
            Outcome::Created { resource_id: id }
        } else {
            let reason = errors.join("; ");
            warn!(resource = name, resource_id = %id, "auth settings failed: {reason}");
            Outcome::Failed {
                stage: Stage::Auth,
                reason,
            }
        }
    }
}

fn failed(name: &str, stage: Stage, error: &impl std::fmt::Display) -> Outcome {
    warn!(resource = name, %stage, error = %error, "resource failed");
    Outcome::Failed {
        stage,
        reason: error.to_string(),
    }
}
