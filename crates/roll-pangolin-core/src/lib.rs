//! Declarative container exposure for the Pangolin reverse proxy.
//!
//! Containers declare what they want exposed through namespaced labels
//! (`roll-pangolin.destination`, `roll-pangolin.exposed-path`, ...). One pass
//! turns those labels into resources on the control plane:
//!
//! - **[`LabelCompiler`]** rebuilds the nested configuration from the flat
//!   dotted/bracketed keys.
//! - **[`ParsedEndpoint`]** classifies declared URLs into host, port and
//!   base domain / subdomain.
//! - **[`DesiredStateBuilder`]** keeps complete, enabled declarations and
//!   produces [`DesiredResource`]s plus the set of exposed hosts.
//! - **[`Reconciler`]** deletes stale resources, resolves domain and site
//!   ids and creates resources, targets and access control, isolating
//!   failures per item into a [`RunReport`].
//!
//! The control plane and the container runtime sit behind the
//! [`ControlPlane`] and [`ContainerSource`] traits.

pub mod config;
pub mod desired;
pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod labels;
pub mod model;
pub mod pass;
pub mod reconcile;
pub mod report;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{BuilderSettings, Credentials, DEFAULT_NAMESPACE, RunConfig, TlsVerification};
pub use desired::{DesiredState, DesiredStateBuilder, SkipReason, SkippedContainer};
pub use endpoint::{EndpointError, ParsedEndpoint, Port};
pub use error::CoreError;
pub use gateway::{ContainerSource, ControlPlane};
pub use labels::{Compilation, LabelCompiler, LabelError, LabelTree};
pub use model::{
    AuthSettings, ContainerLabels, DesiredResource, ResourceSpec, TargetSpec, TransportKind,
};
pub use pass::{PassSettings, control_plane, plan, run_pass, sync};
pub use reconcile::{PlannedDeletion, Reconciler, RemoteSnapshot, plan_deletions};
pub use report::{DeletionOutcome, Outcome, ResourceOutcome, RunReport, Stage, Summary};
pub use session::{SessionSource, establish};
