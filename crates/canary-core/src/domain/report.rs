//! Cycle report: per-stage result of one create → read → delete run.
//!
//! `ProbeCycle::run_once` never returns `Err`. Instead it aggregates each
//! stage into a `StageOutcome` so callers (worker loop, tests) can see what
//! happened without the failure crossing the cycle boundary.

use chrono::{DateTime, Utc};

use super::errors::{GatewayError, Stage};
use super::ids::ArtifactId;

/// Result of one stage.
#[derive(Debug)]
pub enum StageOutcome {
    Succeeded,
    Failed(GatewayError),
}

impl StageOutcome {
    pub fn from_result(result: Result<(), GatewayError>) -> Self {
        match result {
            Ok(()) => StageOutcome::Succeeded,
            Err(err) => StageOutcome::Failed(err),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StageOutcome::Succeeded)
    }

    pub fn error(&self) -> Option<&GatewayError> {
        match self {
            StageOutcome::Succeeded => None,
            StageOutcome::Failed(err) => Some(err),
        }
    }
}

#[derive(Debug)]
pub struct CycleReport {
    pub artifact_id: ArtifactId,
    pub started_at: DateTime<Utc>,
    pub create: StageOutcome,
    pub read: StageOutcome,
    pub delete: StageOutcome,
}

impl CycleReport {
    /// true when every stage succeeded.
    pub fn is_clean(&self) -> bool {
        self.create.is_success() && self.read.is_success() && self.delete.is_success()
    }

    /// Stages that failed, in execution order.
    pub fn failed_stages(&self) -> Vec<Stage> {
        [
            (Stage::Create, &self.create),
            (Stage::Read, &self.read),
            (Stage::Delete, &self.delete),
        ]
        .into_iter()
        .filter(|(_, outcome)| !outcome.is_success())
        .map(|(stage, _)| stage)
        .collect()
    }
}
