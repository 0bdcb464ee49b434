// Control-plane authentication
//
// Cookie-based session login. Pangolin answers `POST auth/login` with a
// `Set-Cookie` header; the first `name=value` pair is the session token and
// is replayed as a `Cookie` header on every subsequent call.

use reqwest::header::SET_COOKIE;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{PangolinClient, parse_envelope};
use crate::error::Error;
use crate::models::{LoginData, LoginRequest};

impl PangolinClient {
    /// Authenticate with email/password and install the issued session.
    ///
    /// Returns the session token so callers can report or reuse it.
    pub async fn login(
        &mut self,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, Error> {
        let url = self.api_url(&["auth", "login"]);
        debug!("logging in at {}", url);

        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let cookie = session_cookie(resp.headers());

        let data: Option<LoginData> = parse_envelope(resp).await.map_err(|e| match e {
            Error::Api { status, message } => Error::Authentication {
                message: format!("login failed (HTTP {status}): {message}"),
            },
            other => other,
        })?;

        if let Some(data) = data {
            if data.code_requested || data.two_factor_setup_required {
                return Err(Error::TwoFactorRequired);
            }
        }

        let token = cookie.ok_or_else(|| Error::Authentication {
            message: "login succeeded but no session cookie was issued".into(),
        })?;
        let token = SecretString::from(token);
        self.use_session(&token)?;

        debug!("login successful");
        Ok(token)
    }
}

/// Extract the first `name=value` pair from the `Set-Cookie` headers.
fn session_cookie(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .find(|pair| !pair.is_empty())
        .map(String::from)
}
