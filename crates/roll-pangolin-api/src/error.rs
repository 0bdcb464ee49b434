use thiserror::Error;

/// Top-level error type for the `roll-pangolin-api` crate.
///
/// Covers every failure mode across both remote surfaces: the Pangolin
/// control-plane API and the local container runtime socket.
/// `roll-pangolin-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The account requires a second factor, which a headless run cannot supply.
    #[error("Two-factor authentication required")]
    TwoFactorRequired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Control plane ───────────────────────────────────────────────
    /// The control plane answered with an error status or `success: false`.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Container runtime ───────────────────────────────────────────
    /// The container runtime socket could not be reached or answered badly.
    #[error("Container runtime error: {message}")]
    Runtime { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }
}
