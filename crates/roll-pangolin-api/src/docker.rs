// Docker Engine API client (container listing only)
//
// Speaks HTTP/1.1 over the engine's unix socket with a one-shot hyper
// connection per request. Only `GET /containers/json` is needed: labels are
// the whole declarative surface.

use std::collections::HashMap;
use std::path::PathBuf;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::rt::TokioIo;
use serde::{Deserialize, Deserializer};
use tokio::net::UnixStream;
use tracing::{debug, error};

use crate::error::Error;

/// Default engine socket on Linux hosts.
pub const DEFAULT_SOCKET: &str = "/var/run/docker.sock";

/// One entry of `GET /containers/json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub names: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: HashMap<String, String>,
}

/// The engine reports `null` instead of an empty list/map on some versions.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Minimal Docker Engine API client bound to a unix socket.
#[derive(Debug, Clone)]
pub struct DockerClient {
    socket: PathBuf,
}

impl Default for DockerClient {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET)
    }
}

impl DockerClient {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    /// List all containers, running or stopped, with their labels.
    ///
    /// `GET /containers/json?all=true`
    pub async fn list_containers(&self) -> Result<Vec<ContainerSummary>, Error> {
        let body = self.get("/containers/json?all=true").await?;
        serde_json::from_slice(&body).map_err(|e| Error::Deserialization {
            message: format!("container list: {e}"),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    async fn get(&self, path: &str) -> Result<Bytes, Error> {
        debug!(socket = %self.socket.display(), "GET {}", path);

        let stream = UnixStream::connect(&self.socket)
            .await
            .map_err(|e| Error::Runtime {
                message: format!("failed to connect to {}: {e}", self.socket.display()),
            })?;

        let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| Error::Runtime {
                message: format!("handshake failed: {e}"),
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                error!(error = %e, "container runtime connection error");
            }
        });

        let request = hyper::Request::builder()
            .method(hyper::Method::GET)
            .uri(path)
            .header(hyper::header::HOST, "localhost")
            .body(Empty::<Bytes>::new())
            .map_err(|e| Error::Runtime {
                message: format!("failed to build request: {e}"),
            })?;

        let response = sender
            .send_request(request)
            .await
            .map_err(|e| Error::Runtime {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::Runtime {
                message: format!("failed to read response body: {e}"),
            })?
            .to_bytes();

        if !status.is_success() {
            return Err(Error::Runtime {
                message: format!(
                    "HTTP {status}: {}",
                    String::from_utf8_lossy(&body[..body.len().min(200)])
                ),
            });
        }

        Ok(body)
    }
}
