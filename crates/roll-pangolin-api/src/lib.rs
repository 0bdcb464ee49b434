// roll-pangolin-api: Async clients for the Pangolin control plane and the Docker engine

pub mod auth;
pub mod client;
pub mod docker;
pub mod error;
pub mod models;
pub mod resources;
pub mod sites;
pub mod transport;

pub use client::PangolinClient;
pub use docker::{ContainerSummary, DockerClient};
pub use error::Error;
pub use models::{
    CreatedResource, DomainSummary, NewResource, NewTarget, RemoteId, ResourceSummary, SiteDetail,
};
pub use transport::{TlsMode, TransportConfig};
