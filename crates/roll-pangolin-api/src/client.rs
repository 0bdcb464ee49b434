// Pangolin API HTTP client
//
// Wraps `reqwest::Client` with organization-scoped URL construction, session
// cookie injection and envelope unwrapping. Endpoint groups (auth, resources,
// domains, sites) are implemented as inherent methods in separate files to
// keep this module focused on transport mechanics.

use reqwest::header::{COOKIE, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ApiResponse;
use crate::transport::TransportConfig;

/// Raw HTTP client for the Pangolin control-plane API.
///
/// Handles the `{ data, success, message }` envelope and the session cookie.
/// All request helpers return the unwrapped `data` payload; the envelope is
/// stripped before the caller sees it.
pub struct PangolinClient {
    http: reqwest::Client,
    base_url: Url,
    org: String,
    /// `Cookie` header value (`name=value`) once a session is established.
    session: Option<HeaderValue>,
}

impl PangolinClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root including the version segment, e.g.
    /// `https://pangolin.example.com/api/v1/`.
    pub fn new(base_url: Url, org: String, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, org)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, org: String) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            org,
            session: None,
        })
    }

    /// The organization all scoped calls target.
    pub fn org(&self) -> &str {
        &self.org
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Whether a session cookie is installed.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Install a session token (`name=value` cookie pair).
    ///
    /// Used both for pre-issued tokens and after a successful login.
    pub fn use_session(&mut self, token: &SecretString) -> Result<(), Error> {
        let mut value =
            HeaderValue::from_str(token.expose_secret()).map_err(|_| Error::Authentication {
                message: "session token contains characters not allowed in a cookie".into(),
            })?;
        value.set_sensitive(true);
        self.session = Some(value);
        debug!("session token installed");
        Ok(())
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a URL below the API root from raw path segments.
    ///
    /// Segments are percent-encoded; an empty final segment yields a
    /// trailing slash.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Cannot fail: `with_client` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build an organization-scoped URL: `{base}org/{org}/{segments..}`
    pub(crate) fn org_url(&self, segments: &[&str]) -> Url {
        let mut all = Vec::with_capacity(segments.len() + 2);
        all.push("org");
        all.push(self.org.as_str());
        all.extend_from_slice(segments);
        self.api_url(&all)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session {
            Some(cookie) => builder.header(COOKIE, cookie.clone()),
            None => builder,
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, Error> {
        debug!("GET {}", url);

        let resp = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_envelope(resp).await
    }

    /// Send a POST request with JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        debug!("POST {}", url);

        let resp = self
            .authorize(self.http.post(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_envelope(resp).await
    }

    /// Send a PUT request with JSON body and unwrap the envelope.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        debug!("PUT {}", url);

        let resp = self
            .authorize(self.http.put(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_envelope(resp).await
    }

    /// Send a DELETE request and unwrap the envelope.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, Error> {
        debug!("DELETE {}", url);

        let resp = self
            .authorize(self.http.delete(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_envelope(resp).await
    }
}

/// Require a `data` payload that the endpoint always returns on success.
pub(crate) fn require_data<T>(data: Option<T>, what: &str) -> Result<T, Error> {
    data.ok_or_else(|| Error::Deserialization {
        message: format!("{what} response has no data"),
        body: String::new(),
    })
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Parse the `{ data, success, message }` envelope.
///
/// HTTP 401 maps to `Error::Authentication`, any other failure status or a
/// `success: false` body to `Error::Api` carrying the envelope message.
pub(crate) async fn parse_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<Option<T>, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;
    trace!(%status, body = preview(&body), "response");

    if !status.is_success() {
        let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| preview(&body).to_owned());

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication { message });
        }
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    if body.trim().is_empty() {
        return Ok(None);
    }

    let envelope: ApiResponse<T> =
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

    if envelope.success == Some(false) {
        return Err(Error::Api {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| "request was not successful".into()),
        });
    }

    Ok(envelope.data)
}
