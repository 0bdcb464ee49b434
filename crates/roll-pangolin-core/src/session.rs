// ── Session bootstrap ──
//
// A pre-issued session token is installed as-is; otherwise the account
// credentials are exchanged for one. Either failure ends the run before
// any container is looked at.

use roll_pangolin_api::{Error as ApiError, PangolinClient};
use tracing::{debug, info};

use crate::config::Credentials;
use crate::error::CoreError;

/// How the session was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    PreIssued,
    Login,
}

pub async fn establish(
    client: &mut PangolinClient,
    credentials: &Credentials,
) -> Result<SessionSource, CoreError> {
    if let Some(token) = &credentials.session_token {
        debug!("using pre-issued session token");
        client.use_session(token).map_err(auth_failure)?;
        return Ok(SessionSource::PreIssued);
    }

    client
        .login(&credentials.email, &credentials.password)
        .await
        .map_err(auth_failure)?;
    info!(email = %credentials.email, "logged in");
    Ok(SessionSource::Login)
}

/// Everything except an unreachable server is reported as an auth failure.
fn auth_failure(err: ApiError) -> CoreError {
    match CoreError::from(err) {
        e @ (CoreError::ConnectionFailed { .. }
        | CoreError::Timeout
        | CoreError::AuthenticationFailed { .. }) => e,
        other => CoreError::AuthenticationFailed {
            message: other.to_string(),
        },
    }
}
