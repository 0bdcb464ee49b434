// ── Core error types ──
//
// User-facing errors from roll-pangolin-core. Consumers never see HTTP
// status codes or JSON parse failures directly: the
// `From<roll_pangolin_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Container runtime ────────────────────────────────────────────
    #[error("Container runtime unavailable: {message}")]
    RuntimeUnavailable { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Rejected by control plane: {message}")]
    Rejected { message: String, status: u16 },

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<roll_pangolin_api::Error> for CoreError {
    fn from(err: roll_pangolin_api::Error) -> Self {
        use roll_pangolin_api::Error as ApiError;

        match err {
            ApiError::Authentication { message } => CoreError::AuthenticationFailed { message },
            ApiError::TwoFactorRequired => CoreError::AuthenticationFailed {
                message: "the account requires two-factor authentication; \
                          supply a pre-issued session token instead"
                    .into(),
            },
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::UnexpectedResponse {
                        message: e.to_string(),
                    }
                }
            }
            ApiError::InvalidBaseUrl(url) => CoreError::Config {
                message: format!("Invalid API base URL: {url}"),
            },
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::Api { status: 404, message } => CoreError::NotFound { message },
            ApiError::Api { status, message } => CoreError::Rejected { message, status },
            ApiError::Runtime { message } => CoreError::RuntimeUnavailable { message },
            ApiError::Deserialization { message, body: _ } => {
                CoreError::UnexpectedResponse { message }
            }
        }
    }
}
