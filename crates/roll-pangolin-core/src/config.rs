// ── Runtime run configuration ──
//
// These types describe *what* one reconciliation pass should do and *how*
// to reach the control plane. They carry credential data but never touch
// disk: the binary builds a `RunConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Namespace prefix of the label surface.
pub const DEFAULT_NAMESPACE: &str = "roll-pangolin";

/// How to obtain a control-plane session.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
    /// Pre-issued session cookie (`name=value`); skips the login call.
    pub session_token: Option<SecretString>,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed control planes).
    DangerAcceptInvalid,
}

/// Settings that shape the desired state, independent of any remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderSettings {
    /// Label namespace, e.g. `roll-pangolin`.
    pub namespace: String,
    /// Site used when a container does not name one.
    pub default_site: Option<String>,
    /// When set, only containers carrying a `grouping` label are eligible.
    pub grouping: Option<String>,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.into(),
            default_site: None,
            grouping: None,
        }
    }
}

/// Everything a single reconciliation pass needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// API root, e.g. `https://pangolin.example.com/api/v1/`.
    pub api_url: Url,
    /// Organization identifier.
    pub organization: String,
    pub credentials: Credentials,
    pub builder: BuilderSettings,
    /// Delete existing resources for declared hostnames before recreating.
    pub redeploy: bool,
    /// Container runtime socket.
    pub docker_socket: PathBuf,
    pub tls: TlsVerification,
    pub timeout: Duration,
}
