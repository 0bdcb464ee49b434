// Pangolin API request and response types
//
// Every response is wrapped in the `ApiResponse<T>` envelope. Listing types
// use `#[serde(default)]` for fields the control plane omits on older
// releases; unknown fields are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard Pangolin response envelope.
///
/// ```json
/// { "data": {...}, "success": true, "error": false, "message": "...", "status": 200 }
/// ```
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Identifiers ──────────────────────────────────────────────────────

/// Identifier of a remote object.
///
/// Resources and sites are numbered, domains use opaque strings. Both
/// round-trip through serde in their original JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for RemoteId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RemoteId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for RemoteId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

// ── Login ────────────────────────────────────────────────────────────

/// Login body for `POST auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Data returned by a login call. Both flags mean "no session issued".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginData {
    #[serde(default)]
    pub code_requested: bool,
    #[serde(default)]
    pub two_factor_setup_required: bool,
}

// ── Resources ────────────────────────────────────────────────────────

/// One row of `GET org/{org}/resources`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub resource_id: RemoteId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_domain: Option<String>,
    #[serde(default)]
    pub site_id: Option<RemoteId>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResourceList {
    #[serde(default)]
    pub resources: Vec<ResourceSummary>,
}

/// Body of `PUT org/{org}/site/{siteId}/resource/`.
///
/// `site_id` and `domain_id` are sent as `null` when unresolved; the control
/// plane decides whether to accept the resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub name: String,
    pub subdomain: Option<String>,
    pub http: bool,
    pub protocol: String,
    pub domain_id: Option<RemoteId>,
    pub site_id: Option<RemoteId>,
}

/// Data returned by a resource creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResource {
    pub resource_id: RemoteId,
    #[serde(default)]
    pub full_domain: Option<String>,
}

// ── Targets ──────────────────────────────────────────────────────────

/// Body of `PUT resource/{id}/target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTarget {
    pub ip: String,
    pub port: u16,
    pub method: String,
    pub enabled: bool,
}

// ── Domains ──────────────────────────────────────────────────────────

/// One row of `GET org/{org}/domains`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSummary {
    pub domain_id: RemoteId,
    pub base_domain: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DomainList {
    #[serde(default)]
    pub domains: Vec<DomainSummary>,
}

// ── Sites ────────────────────────────────────────────────────────────

/// Data of `GET org/{org}/site/{siteName}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDetail {
    pub site_id: RemoteId,
    #[serde(default)]
    pub nice_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
