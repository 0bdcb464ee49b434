// ── Run report ──
//
// Per-item outcomes of one reconciliation pass. Individual failures never
// fail the run; they are collected here and summarized at the end.

use std::fmt;

use roll_pangolin_api::RemoteId;
use serde::Serialize;

use crate::desired::SkippedContainer;

/// Step of a resource's creation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Create,
    Target,
    Auth,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Target => "target",
            Self::Auth => "auth",
        })
    }
}

/// Outcome of one desired resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Created { resource_id: RemoteId },
    Failed { stage: Stage, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceOutcome {
    pub name: String,
    pub host: String,
    pub site: String,
    pub outcome: Outcome,
}

impl ResourceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Created { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    pub resource_id: RemoteId,
    pub host: String,
    /// `None` when the deletion succeeded.
    pub error: Option<String>,
}

/// Everything one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub skipped: Vec<SkippedContainer>,
    pub deletions: Vec<DeletionOutcome>,
    pub resources: Vec<ResourceOutcome>,
    /// Problems fetching the remote snapshot (listing, site lookups).
    pub warnings: Vec<String>,
}

/// Aggregate counts of a `RunReport`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub created: usize,
    pub failed: usize,
    pub deleted: usize,
    pub delete_failed: usize,
    pub skipped: usize,
    pub warnings: usize,
}

impl RunReport {
    pub fn summary(&self) -> Summary {
        let created = self.resources.iter().filter(|r| r.is_success()).count();
        let deleted = self.deletions.iter().filter(|d| d.error.is_none()).count();
        Summary {
            created,
            failed: self.resources.len() - created,
            deleted,
            delete_failed: self.deletions.len() - deleted,
            skipped: self.skipped.len(),
            warnings: self.warnings.len(),
        }
    }
}

impl Summary {
    /// Whether any item of the pass failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.delete_failed > 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} failed, {} deleted, {} delete failures, {} skipped",
            self.created, self.failed, self.deleted, self.delete_failed, self.skipped
        )
    }
}
