//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text
//! and a stable exit code. Per-resource failures never reach this type: they
//! live in the run report and the process still exits 0.

use miette::Diagnostic;
use thiserror::Error;

use roll_pangolin_config::ConfigError;
use roll_pangolin_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Missing required settings: {}", .fields.join(", "))]
    #[diagnostic(
        code(roll_pangolin::missing_config),
        help(
            "Set them in the environment (EMAIL, PASSWORD, HOST, ORGANIZATION),\n\
             with the ROLL_PANGOLIN_ prefix, or in the config file at {path}"
        )
    )]
    MissingConfig {
        fields: Vec<&'static str>,
        path: String,
    },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(roll_pangolin::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(roll_pangolin::config))]
    Config(Box<figment::Error>),

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(roll_pangolin::auth_failed),
        help(
            "Check EMAIL and PASSWORD. Accounts with two-factor authentication\n\
             need a pre-issued SESSION_TOKEN (the `name=value` session cookie)."
        )
    )]
    AuthFailed { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}: {reason}")]
    #[diagnostic(
        code(roll_pangolin::connection_failed),
        help("Check HOST and that the Pangolin API is reachable from here.")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(roll_pangolin::timeout),
        help("Raise timeout_secs or check the control plane's responsiveness.")
    )]
    Timeout,

    #[error("Docker engine unavailable: {message}")]
    #[diagnostic(
        code(roll_pangolin::runtime_unavailable),
        help(
            "Check that the Docker socket is mounted and readable.\n\
             Set docker_socket (ROLL_PANGOLIN_DOCKER_SOCKET) if it is not at the default path."
        )
    )]
    RuntimeUnavailable { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Control plane error: {message}")]
    #[diagnostic(code(roll_pangolin::api_error))]
    Api { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(roll_pangolin::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingConfig { .. } | Self::Validation { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } | Self::Timeout | Self::RuntimeUnavailable { .. } => {
                exit_code::CONNECTION
            }
            Self::Api { .. } | Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ──────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { fields } => CliError::MissingConfig {
                fields,
                path: roll_pangolin_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(e) => CliError::Config(e),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::RuntimeUnavailable { message } => CliError::RuntimeUnavailable { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::NotFound { message }
            | CoreError::Rejected { message, .. }
            | CoreError::UnexpectedResponse { message } => CliError::Api { message },
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}
