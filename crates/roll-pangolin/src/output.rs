//! Output formatting: table, JSON, YAML.
//!
//! Tables use `tabled`; structured formats serialize the core types directly.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use roll_pangolin_core::{DesiredResource, DesiredState, Outcome, RunReport, SkippedContainer};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Rows ─────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Auth")]
    auth: String,
}

impl From<&DesiredResource> for PlanRow {
    fn from(r: &DesiredResource) -> Self {
        let mut auth = Vec::new();
        if r.auth.password.is_some() {
            auth.push("password");
        }
        if r.auth.pincode.is_some() {
            auth.push("pincode");
        }
        if r.auth.disables_sso() {
            auth.push("no-sso");
        }
        Self {
            container: r.container.clone(),
            name: r.resource.name.clone(),
            host: r.exposed_host.clone(),
            site: r.site.clone(),
            kind: r.resource.transport.to_string(),
            target: format!("{}://{}:{}", r.target.method, r.target.ip, r.target.port),
            auth: auth.join(", "),
        }
    }
}

#[derive(Tabled)]
struct SkipRow {
    #[tabled(rename = "Skipped")]
    container: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl From<&SkippedContainer> for SkipRow {
    fn from(s: &SkippedContainer) -> Self {
        Self {
            container: s.container.clone(),
            reason: s.reason.to_string(),
        }
    }
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

// ── Renderers ────────────────────────────────────────────────────────

/// Desired resources and skipped containers.
pub fn render_plan(format: OutputFormat, state: &DesiredState) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let mut out = if state.resources.is_empty() {
                "No resources declared.".to_owned()
            } else {
                table(state.resources.iter().map(PlanRow::from))
            };
            if !state.skipped.is_empty() {
                out.push('\n');
                out.push_str(&table(state.skipped.iter().map(SkipRow::from)));
            }
            Ok(out)
        }
        other => structured(other, state),
    }
}

/// Deletions, per-resource outcomes and the summary line of a sync.
pub fn render_report(
    format: OutputFormat,
    report: &RunReport,
    color: bool,
) -> Result<String, CliError> {
    if !matches!(format, OutputFormat::Table) {
        return structured(format, report);
    }

    let paint = |ok: bool, text: &str| match (color, ok) {
        (false, _) => text.to_owned(),
        (true, true) => text.green().to_string(),
        (true, false) => text.red().to_string(),
    };

    let deletions = report.deletions.iter().map(|d| ResultRow {
        action: "delete".into(),
        name: d.resource_id.to_string(),
        host: d.host.clone(),
        status: paint(d.error.is_none(), if d.error.is_none() { "deleted" } else { "failed" }),
        detail: d.error.clone().unwrap_or_default(),
    });
    let resources = report.resources.iter().map(|r| {
        let (status, detail) = match &r.outcome {
            Outcome::Created { resource_id } => (paint(true, "created"), format!("id {resource_id}")),
            Outcome::Failed { stage, reason } => {
                (paint(false, &format!("failed ({stage})")), reason.clone())
            }
        };
        ResultRow {
            action: "create".into(),
            name: r.name.clone(),
            host: r.host.clone(),
            status,
            detail,
        }
    });
    let rows: Vec<ResultRow> = deletions.chain(resources).collect();

    let mut out = if rows.is_empty() {
        "Nothing to do.".to_owned()
    } else {
        table(rows)
    };
    if !report.skipped.is_empty() {
        out.push('\n');
        out.push_str(&table(report.skipped.iter().map(SkipRow::from)));
    }
    for warning in &report.warnings {
        out.push('\n');
        let line = format!("warning: {warning}");
        out.push_str(&if color { line.yellow().to_string() } else { line });
    }
    out.push('\n');
    out.push_str(&report.summary().to_string());
    Ok(out)
}

/// Print rendered output to stdout.
pub fn print_output(output: &str) -> Result<(), CliError> {
    if output.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

fn table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn structured<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Json | OutputFormat::Table => serde_json::to_string_pretty(data)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use roll_pangolin_api::RemoteId;
    use roll_pangolin_core::{DeletionOutcome, ResourceOutcome, Stage};

    use super::*;

    fn report() -> RunReport {
        RunReport {
            deletions: vec![DeletionOutcome {
                resource_id: RemoteId::Number(5),
                host: "app.example.com".into(),
                error: None,
            }],
            resources: vec![
                ResourceOutcome {
                    name: "app".into(),
                    host: "app.example.com".into(),
                    site: "office".into(),
                    outcome: Outcome::Created {
                        resource_id: RemoteId::Number(42),
                    },
                },
                ResourceOutcome {
                    name: "db".into(),
                    host: "db.example.com".into(),
                    site: "office".into(),
                    outcome: Outcome::Failed {
                        stage: Stage::Target,
                        reason: "refused".into(),
                    },
                },
            ],
            warnings: vec!["site 'lab' not resolved".into()],
            ..RunReport::default()
        }
    }

    #[test]
    fn report_table_lists_every_item() {
        let out = render_report(OutputFormat::Table, &report(), false).unwrap();
        assert!(out.contains("deleted"));
        assert!(out.contains("id 42"));
        assert!(out.contains("failed (target)"));
        assert!(out.contains("warning: site 'lab' not resolved"));
        assert!(out.ends_with("1 created, 1 failed, 1 deleted, 0 delete failures, 0 skipped"));
    }

    #[test]
    fn report_json_is_tagged() {
        let out = render_report(OutputFormat::Json, &report(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["resources"][0]["outcome"]["status"], "created");
        assert_eq!(value["resources"][0]["outcome"]["resource_id"], 42);
        assert_eq!(value["resources"][1]["outcome"]["stage"], "target");
    }

    #[test]
    fn empty_plan() {
        let out = render_plan(OutputFormat::Table, &DesiredState::default()).unwrap();
        assert_eq!(out, "No resources declared.");
    }
}
