// ── Desired-state builder ──
//
// Compiles each container's labels, checks the declaration is complete,
// classifies both endpoints and emits one `DesiredResource` per eligible
// container. Nothing here fails the run: incomplete or malformed
// declarations are recorded as skipped and the next container is tried.

use std::collections::BTreeSet;
use std::fmt;

use secrecy::SecretString;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::BuilderSettings;
use crate::endpoint::{EndpointError, ParsedEndpoint};
use crate::labels::{LabelCompiler, LabelError, LabelTree};
use crate::model::{
    AuthSettings, ContainerLabels, DesiredResource, ResourceSpec, TargetSpec, TransportKind,
};

/// Why a container that uses the namespace produced no resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("no usable labels ({})", join(.0))]
    InvalidLabels(Vec<LabelError>),

    #[error("missing '{0}' label")]
    MissingField(&'static str),

    #[error("not enabled (enabled = {0:?})")]
    NotEnabled(Option<String>),

    #[error("bad '{field}' endpoint: {error}")]
    BadEndpoint {
        field: &'static str,
        error: EndpointError,
    },
}

fn join(errors: &[LabelError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A container that declared intent but was not turned into a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedContainer {
    pub container: String,
    #[serde(serialize_with = "as_display")]
    pub reason: SkipReason,
}

fn as_display<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

/// Output of the builder.
#[derive(Debug, Default, Serialize)]
pub struct DesiredState {
    /// Eligible resources, in container order.
    pub resources: Vec<DesiredResource>,
    /// Every exposed host name across `resources`.
    pub exposed_hosts: BTreeSet<String>,
    pub skipped: Vec<SkippedContainer>,
}

/// Builds the desired state from container labels.
#[derive(Debug, Clone)]
pub struct DesiredStateBuilder {
    compiler: LabelCompiler,
    default_site: Option<String>,
    grouping: Option<String>,
}

impl DesiredStateBuilder {
    pub fn new(settings: &BuilderSettings) -> Self {
        Self {
            compiler: LabelCompiler::new(settings.namespace.clone()),
            default_site: non_empty(settings.default_site.as_deref()).map(str::to_owned),
            grouping: non_empty(settings.grouping.as_deref()).map(str::to_owned),
        }
    }

    pub fn build(&self, containers: &[ContainerLabels]) -> DesiredState {
        let mut state = DesiredState::default();

        for container in containers {
            let name = container.display_name();
            let compiled = self.compiler.compile(&container.labels);

            for rejected in &compiled.rejected {
                warn!(container = name, "ignoring label: {rejected}");
            }

            let Some(config) = compiled.config else {
                if compiled.rejected.is_empty() {
                    debug!(container = name, "no {} labels", self.compiler.namespace());
                } else {
                    state.skip(container, SkipReason::InvalidLabels(compiled.rejected));
                }
                continue;
            };

            match self.resolve(container, &config) {
                Ok(resource) => {
                    debug!(
                        container = name,
                        host = %resource.exposed_host,
                        site = %resource.site,
                        "declared resource"
                    );
                    state.exposed_hosts.insert(resource.exposed_host.clone());
                    state.resources.push(resource);
                }
                Err(reason) => state.skip(container, reason),
            }
        }

        state
    }

    fn resolve(
        &self,
        container: &ContainerLabels,
        config: &LabelTree,
    ) -> Result<DesiredResource, SkipReason> {
        let field = |name: &str| non_empty(config.str_at(&[name]));

        let destination = field("destination").ok_or(SkipReason::MissingField("destination"))?;
        let exposed = field("exposedPath").ok_or(SkipReason::MissingField("exposed-path"))?;

        match config.str_at(&["enabled"]) {
            Some("true") => {}
            other => return Err(SkipReason::NotEnabled(other.map(str::to_owned))),
        }

        let name = field("name")
            .or_else(|| non_empty(Some(container.name.as_str())))
            .ok_or(SkipReason::MissingField("name"))?;

        // A configured default site pins every container to it.
        let site = self
            .default_site
            .as_deref()
            .or_else(|| field("site"))
            .ok_or(SkipReason::MissingField("site"))?;

        if self.grouping.is_some() && field("grouping").is_none() {
            return Err(SkipReason::MissingField("grouping"));
        }

        let backend = ParsedEndpoint::parse(destination).map_err(|error| {
            SkipReason::BadEndpoint {
                field: "destination",
                error,
            }
        })?;
        let front = ParsedEndpoint::parse(exposed).map_err(|error| SkipReason::BadEndpoint {
            field: "exposed-path",
            error,
        })?;

        Ok(DesiredResource {
            container: container.display_name().to_owned(),
            site: site.to_owned(),
            base_domain: front.base_domain.clone(),
            exposed_host: front.host.clone(),
            resource: ResourceSpec {
                name: name.to_owned(),
                subdomain: front.subdomain.clone(),
                transport: TransportKind::for_scheme(&front.protocol),
            },
            target: TargetSpec {
                port: backend.effective_port(),
                ip: backend.host,
                method: backend.protocol,
                enabled: true,
            },
            auth: auth_settings(container.display_name(), config),
        })
    }
}

impl DesiredState {
    fn skip(&mut self, container: &ContainerLabels, reason: SkipReason) {
        warn!(container = container.display_name(), "skipping container: {reason}");
        self.skipped.push(SkippedContainer {
            container: container.display_name().to_owned(),
            reason,
        });
    }
}

fn auth_settings(container: &str, config: &LabelTree) -> AuthSettings {
    let secret = |key: &str| {
        non_empty(config.str_at(&["auth", key])).map(|v| SecretString::from(v.to_owned()))
    };

    let sso_enabled = config
        .str_at(&["auth", "ssoEnabled"])
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => {
                warn!(container, value = raw, "ignoring non-boolean auth.sso-enabled");
                None
            }
        });

    AuthSettings {
        sso_enabled,
        password: secret("password"),
        pincode: secret("pincode"),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn container(name: &str, labels: &[(&str, &str)]) -> ContainerLabels {
        ContainerLabels {
            id: format!("{name}-0123456789abcdef"),
            name: name.into(),
            labels: labels
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        }
    }

    fn complete(name: &str) -> ContainerLabels {
        container(
            name,
            &[
                ("roll-pangolin.destination", "tcp://10.0.0.5:8080"),
                ("roll-pangolin.exposed-path", "https://app.sub.example.com"),
                ("roll-pangolin.enabled", "true"),
                ("roll-pangolin.name", "svc"),
                ("roll-pangolin.site", "office"),
            ],
        )
    }

    fn builder() -> DesiredStateBuilder {
        DesiredStateBuilder::new(&BuilderSettings::default())
    }

    fn with_label(mut c: ContainerLabels, key: &str, value: &str) -> ContainerLabels {
        c.labels.insert(format!("roll-pangolin.{key}"), value.into());
        c
    }

    fn without_label(mut c: ContainerLabels, key: &str) -> ContainerLabels {
        c.labels.remove(&format!("roll-pangolin.{key}"));
        c
    }

    #[test]
    fn complete_declaration_builds_resource() {
        let state = builder().build(&[complete("web")]);
        assert!(state.skipped.is_empty());
        let r = &state.resources[0];

        assert_eq!(r.site, "office");
        assert_eq!(r.base_domain, "example.com");
        assert_eq!(r.exposed_host, "app.sub.example.com");
        assert_eq!(
            r.resource,
            ResourceSpec {
                name: "svc".into(),
                subdomain: Some("app.sub".into()),
                transport: TransportKind::Http,
            }
        );
        assert_eq!(
            r.target,
            TargetSpec {
                ip: "10.0.0.5".into(),
                port: 8080,
                method: "tcp".into(),
                enabled: true,
            }
        );
        assert!(r.auth.is_empty());
        assert_eq!(
            state.exposed_hosts.iter().collect::<Vec<_>>(),
            vec!["app.sub.example.com"]
        );
    }

    #[test]
    fn target_port_defaults_follow_destination_scheme() {
        let https = with_label(complete("a"), "destination", "https://backend.lan");
        let http = with_label(complete("b"), "destination", "http://10.0.0.9");
        let state = builder().build(&[https, http]);

        assert_eq!(state.resources[0].target.port, 443);
        assert_eq!(state.resources[0].target.ip, "backend.lan");
        assert_eq!(state.resources[1].target.port, 80);
    }

    #[test]
    fn tcp_exposed_path_is_not_http() {
        let c = with_label(complete("db"), "exposed-path", "tcp://db.example.com:5432");
        let state = builder().build(&[c]);
        let spec = &state.resources[0].resource;
        assert_eq!(spec.transport, TransportKind::Tcp);
        assert_eq!(spec.subdomain.as_deref(), Some("db"));
        assert!(!spec.to_request(None, None).http);
    }

    #[test]
    fn unlabelled_containers_are_ignored_silently() {
        let state = builder().build(&[container("plain", &[("maintainer", "me")])]);
        assert!(state.resources.is_empty());
        assert!(state.skipped.is_empty());
    }

    #[test]
    fn incomplete_declarations_are_skipped() {
        let cases = [
            (without_label(complete("a"), "destination"), SkipReason::MissingField("destination")),
            (with_label(complete("b"), "destination", " "), SkipReason::MissingField("destination")),
            (without_label(complete("c"), "exposed-path"), SkipReason::MissingField("exposed-path")),
            (without_label(complete("d"), "enabled"), SkipReason::NotEnabled(None)),
            (
                with_label(complete("e"), "enabled", "TRUE"),
                SkipReason::NotEnabled(Some("TRUE".into())),
            ),
            (without_label(complete("f"), "site"), SkipReason::MissingField("site")),
        ];

        for (c, expected) in cases {
            let state = builder().build(std::slice::from_ref(&c));
            assert!(state.resources.is_empty(), "{}", c.name);
            assert_eq!(state.skipped[0].reason, expected, "{}", c.name);
        }
    }

    #[test]
    fn name_falls_back_to_container_name() {
        let state = builder().build(&[without_label(complete("grafana"), "name")]);
        assert_eq!(state.resources[0].resource.name, "grafana");

        let mut nameless = without_label(complete(""), "name");
        nameless.name.clear();
        let state = builder().build(&[nameless]);
        assert_eq!(state.skipped[0].reason, SkipReason::MissingField("name"));
    }

    #[test]
    fn default_site_overrides_the_label() {
        let settings = BuilderSettings {
            default_site: Some("home".into()),
            ..BuilderSettings::default()
        };
        let b = DesiredStateBuilder::new(&settings);
        let state = b.build(&[complete("a"), without_label(complete("b"), "site")]);

        assert_eq!(state.resources[0].site, "home");
        assert_eq!(state.resources[1].site, "home");
    }

    #[test]
    fn site_label_is_used_without_a_default() {
        let state = builder().build(&[complete("a"), without_label(complete("b"), "site")]);

        assert_eq!(state.resources.len(), 1);
        assert_eq!(state.resources[0].site, "office");
        assert_eq!(state.skipped[0].reason, SkipReason::MissingField("site"));
    }

    #[test]
    fn grouping_requires_the_label() {
        let settings = BuilderSettings {
            grouping: Some("edge".into()),
            ..BuilderSettings::default()
        };
        let b = DesiredStateBuilder::new(&settings);
        let state = b.build(&[complete("a"), with_label(complete("b"), "grouping", "edge")]);

        assert_eq!(state.resources.len(), 1);
        assert_eq!(state.resources[0].container, "b");
        assert_eq!(state.skipped[0].reason, SkipReason::MissingField("grouping"));
    }

    #[test]
    fn malformed_endpoint_skips_only_that_container() {
        let bad = with_label(complete("bad"), "destination", "not a url");
        let state = builder().build(&[bad, complete("good")]);

        assert_eq!(state.resources.len(), 1);
        assert_eq!(state.resources[0].container, "good");
        assert!(matches!(
            state.skipped[0].reason,
            SkipReason::BadEndpoint { field: "destination", .. }
        ));
        // Hosts of skipped containers are never deletion candidates.
        assert_eq!(state.exposed_hosts.len(), 1);
    }

    #[test]
    fn auth_labels_pass_through() {
        let c = with_label(complete("a"), "auth.password", "hunter2");
        let c = with_label(c, "auth.pincode", "123456");
        let c = with_label(c, "auth.sso-enabled", "false");
        let state = builder().build(&[c]);
        let auth = &state.resources[0].auth;

        assert_eq!(auth.sso_enabled, Some(false));
        assert!(auth.disables_sso());
        assert_eq!(auth.password.as_ref().unwrap().expose_secret(), "hunter2");
        assert_eq!(auth.pincode.as_ref().unwrap().expose_secret(), "123456");
    }

    #[test]
    fn secrets_are_redacted_when_serialized() {
        let c = with_label(complete("a"), "auth.password", "hunter2");
        let state = builder().build(&[c]);
        let json = serde_json::to_string(&state.resources[0]).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("********"));
    }

    #[test]
    fn fully_rejected_labels_are_reported() {
        let c = container("odd", &[("roll-pangolin.0", "x")]);
        let state = builder().build(&[c]);
        assert!(matches!(state.skipped[0].reason, SkipReason::InvalidLabels(_)));
    }
}
