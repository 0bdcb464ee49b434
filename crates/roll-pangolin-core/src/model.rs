// ── Domain types for one reconciliation pass ──

use std::collections::HashMap;
use std::fmt;

use roll_pangolin_api::{NewResource, NewTarget, RemoteId};
use secrecy::SecretString;
use serde::{Serialize, Serializer};

/// One container as seen by the builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerLabels {
    pub id: String,
    /// Container name without the runtime's leading `/`.
    pub name: String,
    pub labels: HashMap<String, String>,
}

impl ContainerLabels {
    /// Name if known, otherwise the short id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.get(..12).unwrap_or(&self.id)
        } else {
            &self.name
        }
    }
}

/// How the control plane proxies a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Http,
    Tcp,
}

impl TransportKind {
    /// `http`/`https` exposed paths are proxied as HTTP, anything else raw.
    pub fn for_scheme(scheme: &str) -> Self {
        match scheme {
            "http" | "https" => Self::Http,
            _ => Self::Tcp,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "http",
            Self::Tcp => "tcp",
        })
    }
}

/// Resource definition; domain and site ids are resolved by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSpec {
    pub name: String,
    pub subdomain: Option<String>,
    pub transport: TransportKind,
}

impl ResourceSpec {
    /// Wire body for resource creation.
    pub fn to_request(&self, domain_id: Option<RemoteId>, site_id: Option<RemoteId>) -> NewResource {
        NewResource {
            name: self.name.clone(),
            subdomain: self.subdomain.clone(),
            http: self.transport == TransportKind::Http,
            protocol: "tcp".into(),
            domain_id,
            site_id,
        }
    }
}

/// Backend endpoint the proxy forwards to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSpec {
    pub ip: String,
    pub port: u16,
    pub method: String,
    pub enabled: bool,
}

impl From<&TargetSpec> for NewTarget {
    fn from(t: &TargetSpec) -> Self {
        Self {
            ip: t.ip.clone(),
            port: t.port,
            method: t.method.clone(),
            enabled: t.enabled,
        }
    }
}

/// Optional access control declared on a container.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthSettings {
    pub sso_enabled: Option<bool>,
    #[serde(serialize_with = "redacted")]
    pub password: Option<SecretString>,
    #[serde(serialize_with = "redacted")]
    pub pincode: Option<SecretString>,
}

impl AuthSettings {
    pub fn is_empty(&self) -> bool {
        self.sso_enabled.is_none() && self.password.is_none() && self.pincode.is_none()
    }

    /// SSO is only touched when explicitly switched off.
    pub fn disables_sso(&self) -> bool {
        self.sso_enabled == Some(false)
    }
}

#[allow(clippy::ref_option)]
fn redacted<S: Serializer>(value: &Option<SecretString>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => s.serialize_str("********"),
        None => s.serialize_none(),
    }
}

/// A fully validated intent to expose one container.
#[derive(Debug, Clone, Serialize)]
pub struct DesiredResource {
    /// Container the declaration came from.
    pub container: String,
    pub site: String,
    pub base_domain: String,
    /// Full exposed host name, matched against existing resources.
    pub exposed_host: String,
    pub resource: ResourceSpec,
    pub target: TargetSpec,
    pub auth: AuthSettings,
}
