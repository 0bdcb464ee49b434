//! Configuration for roll-pangolin.
//!
//! Layered with figment: built-in defaults, an optional TOML file, the bare
//! environment names used by existing deployments (`EMAIL`, `HOST`, ...),
//! then `ROLL_PANGOLIN_*` overrides. [`Config::into_run_config`] validates
//! the result and translates it into `roll_pangolin_core::RunConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use roll_pangolin_core::{
    BuilderSettings, Credentials, DEFAULT_NAMESPACE, RunConfig, TlsVerification,
};

/// Environment names read without a prefix.
const BARE_ENV: &[&str] = &[
    "EMAIL",
    "PASSWORD",
    "HOST",
    "ORGANIZATION",
    "DEFAULT_SITE",
    "FORCE_REDEPLOY",
    "GROUPING",
    "SESSION_TOKEN",
];

/// Settings whose environment values are taken verbatim instead of being
/// type-guessed (`PASSWORD=0123456` must not become `123456`).
const VERBATIM_KEYS: &[&str] = &[
    "email",
    "password",
    "host",
    "organization",
    "default_site",
    "force_redeploy",
    "grouping",
    "session_token",
];

/// Prefix of the explicit environment overrides.
pub const ENV_PREFIX: &str = "ROLL_PANGOLIN_";

const DEFAULT_SOCKET: &str = "/var/run/docker.sock";
const API_PATH: &str = "/api/v1/";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required settings: {}", .fields.join(", "))]
    Missing { fields: Vec<&'static str> },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config ──────────────────────────────────────────────────────────

/// Raw settings as loaded; see [`Config::into_run_config`] for validation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,

    /// Plaintext as loaded; wrapped in a `SecretString` on validation.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing)]
    pub password: Option<String>,

    /// Control-plane host name, or a full URL whose origin is used.
    #[serde(default, deserialize_with = "lenient_string")]
    pub host: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub organization: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub default_site: Option<String>,

    /// Only the exact string `true` enables it from the environment.
    #[serde(default = "default_true", deserialize_with = "redeploy_flag")]
    pub force_redeploy: bool,

    #[serde(default, deserialize_with = "lenient_string")]
    pub grouping: Option<String>,

    /// Pre-issued session cookie (`name=value`); skips login.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing)]
    pub session_token: Option<String>,

    #[serde(default = "default_label_prefix")]
    pub label_prefix: String,

    #[serde(default = "default_socket")]
    pub docker_socket: PathBuf,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub insecure: bool,

    /// Custom CA certificate for the control plane.
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            host: None,
            organization: None,
            default_site: None,
            force_redeploy: true,
            grouping: None,
            session_token: None,
            label_prefix: default_label_prefix(),
            docker_socket: default_socket(),
            timeout_secs: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_label_prefix() -> String {
    DEFAULT_NAMESPACE.into()
}
fn default_socket() -> PathBuf {
    PathBuf::from(DEFAULT_SOCKET)
}
fn default_timeout() -> u64 {
    30
}

// TOML scalars and type-guessed prefixed extras (`ROLL_PANGOLIN_INSECURE=1`)
// are accepted loosely.

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.map(|s| match s {
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Str(s) => s,
    }))
}

fn redeploy_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Scalar::deserialize(d)? {
        Scalar::Bool(b) => b,
        Scalar::Str(s) => s == "true",
        Scalar::Int(_) | Scalar::Float(_) => false,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match Scalar::deserialize(d)? {
        Scalar::Bool(b) => Ok(b),
        Scalar::Int(i) => Ok(i != 0),
        Scalar::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, got '{other}'"
            ))),
        },
        Scalar::Float(_) => Err(serde::de::Error::custom("expected a boolean")),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config file location (`~/.config/roll-pangolin/config.toml`).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "roll-pangolin", "roll-pangolin").map_or_else(
        || PathBuf::from(".roll-pangolin.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load settings. An explicit `path` must exist; the platform default is
/// optional.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) if !p.is_file() => {
            return Err(ConfigError::Validation {
                field: "config".into(),
                reason: format!("config file {} not found", p.display()),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    let bare = Env::raw().only(BARE_ENV);
    let prefixed = Env::prefixed(ENV_PREFIX);
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&file))
        .merge(verbatim(&bare))
        .merge(prefixed.clone().ignore(VERBATIM_KEYS))
        .merge(verbatim(&prefixed))
        .extract()?;
    Ok(config)
}

/// The string settings of `env`, exactly as the environment holds them.
fn verbatim(env: &Env) -> Serialized<BTreeMap<String, String>> {
    let values = env
        .iter()
        .map(|(key, value)| (key.as_str().to_ascii_lowercase(), value))
        .filter(|(key, _)| VERBATIM_KEYS.contains(&key.as_str()))
        .collect();
    Serialized::defaults(values)
}

// ── Validation ──────────────────────────────────────────────────────

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Label settings; all a `plan` needs.
    pub fn builder_settings(&self) -> Result<BuilderSettings, ConfigError> {
        let namespace = self.label_prefix.trim();
        if namespace.is_empty() {
            return Err(ConfigError::Validation {
                field: "label_prefix".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(BuilderSettings {
            namespace: namespace.to_owned(),
            default_site: present(self.default_site.clone()),
            grouping: present(self.grouping.clone()),
        })
    }

    /// Validate and convert into the core run configuration.
    ///
    /// All missing required settings are reported at once.
    pub fn into_run_config(self) -> Result<RunConfig, ConfigError> {
        let builder = self.builder_settings()?;
        let email = present(self.email);
        let password = present(self.password);
        let host = present(self.host);
        let organization = present(self.organization);

        let missing: Vec<&'static str> = [
            ("EMAIL", email.is_none()),
            ("PASSWORD", password.is_none()),
            ("HOST", host.is_none()),
            ("ORGANIZATION", organization.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(email), Some(password), Some(host), Some(organization)) =
            (email, password, host, organization)
        else {
            return Err(ConfigError::Missing { fields: missing });
        };

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ca) = self.ca_cert {
            TlsVerification::CustomCa(ca)
        } else {
            TlsVerification::SystemDefaults
        };

        Ok(RunConfig {
            api_url: api_url(&host)?,
            organization,
            credentials: Credentials {
                email,
                password: SecretString::from(password),
                session_token: present(self.session_token).map(SecretString::from),
            },
            builder,
            redeploy: self.force_redeploy,
            docker_socket: self.docker_socket,
            tls,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// API root for `host`: `https://{host}/api/v1/`, or the origin of a full
/// URL with `/api/v1/` appended.
pub fn api_url(host: &str) -> Result<Url, ConfigError> {
    let host = host.trim();
    let invalid = |reason: String| ConfigError::Validation {
        field: "host".into(),
        reason,
    };

    let mut url = if host.contains("://") {
        Url::parse(host).map_err(|e| invalid(format!("'{host}': {e}")))?
    } else {
        let bare = host.trim_end_matches('/');
        Url::parse(&format!("https://{bare}")).map_err(|e| invalid(format!("'{host}': {e}")))?
    };

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid(format!("'{host}' has no host")));
    }
    url.set_path(API_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
