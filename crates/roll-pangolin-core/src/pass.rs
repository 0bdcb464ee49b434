// ── Reconciliation pass ──
//
// One stateless run: authenticate, list containers, build the desired
// state, reconcile. Only setup failures (auth, runtime unreachable) return
// `Err`; everything after that ends up in the `RunReport`.

use roll_pangolin_api::{DockerClient, PangolinClient, TlsMode, TransportConfig};
use tracing::{debug, info};

use crate::config::{BuilderSettings, RunConfig, TlsVerification};
use crate::desired::{DesiredState, DesiredStateBuilder};
use crate::error::CoreError;
use crate::gateway::{ContainerSource, ControlPlane};
use crate::reconcile::Reconciler;
use crate::report::RunReport;
use crate::session;

/// What a pass should do, independent of where it talks to.
#[derive(Debug, Clone)]
pub struct PassSettings {
    pub builder: BuilderSettings,
    pub redeploy: bool,
}

/// List containers and compile them into the desired state.
pub async fn plan(
    source: &impl ContainerSource,
    builder: &BuilderSettings,
) -> Result<DesiredState, CoreError> {
    let containers = source.list_containers().await?;
    debug!(count = containers.len(), "listed containers");
    Ok(DesiredStateBuilder::new(builder).build(&containers))
}

/// Plan, then reconcile against an already authenticated control plane.
pub async fn run_pass(
    source: &impl ContainerSource,
    plane: &impl ControlPlane,
    settings: &PassSettings,
) -> Result<RunReport, CoreError> {
    let desired = plan(source, &settings.builder).await?;
    info!(
        resources = desired.resources.len(),
        skipped = desired.skipped.len(),
        redeploy = settings.redeploy,
        "reconciling"
    );

    let report = Reconciler::new(plane, settings.redeploy)
        .reconcile(&desired)
        .await;
    info!("pass finished: {}", report.summary());
    Ok(report)
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Control-plane client for `config`, not yet authenticated.
pub fn control_plane(config: &RunConfig) -> Result<PangolinClient, CoreError> {
    let transport = TransportConfig::default()
        .with_tls(TlsMode::from(&config.tls))
        .with_timeout(config.timeout);
    Ok(PangolinClient::new(
        config.api_url.clone(),
        config.organization.clone(),
        &transport,
    )?)
}

/// Full pass against the real control plane and the local Docker engine.
pub async fn sync(config: &RunConfig) -> Result<RunReport, CoreError> {
    let mut client = control_plane(config)?;
    let source = session::establish(&mut client, &config.credentials).await?;
    debug!(?source, "session established");

    let docker = DockerClient::new(&config.docker_socket);
    let settings = PassSettings {
        builder: config.builder.clone(),
        redeploy: config.redeploy,
    };
    run_pass(&docker, &client, &settings).await
}
