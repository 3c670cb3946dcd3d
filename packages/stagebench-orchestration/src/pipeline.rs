use crate::stage::{StageId, StageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a run was asked to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunKind {
    /// One terminal stage and its closure
    Terminal { requested: StageId },
    /// All five stages, with user input delivered before Generate
    Full { user_input: String },
}

/// Results of one orchestration run, in execution order.
///
/// Built fresh for every user action and never merged with earlier runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: Uuid,
    pub kind: RunKind,
    pub started_at: DateTime<Utc>,
    pub results: Vec<StageResult>,
    /// Wall clock from first stage start to last stage end
    pub total_elapsed_ms: f64,
}

impl PipelineRun {
    pub(crate) fn new(kind: RunKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            started_at: Utc::now(),
            results: Vec::new(),
            total_elapsed_ms: 0.0,
        }
    }

    /// The stage whose surface ends up active
    pub fn terminal_stage(&self) -> StageId {
        match self.kind {
            RunKind::Terminal { requested } => requested,
            RunKind::Full { .. } => StageId::Generate,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self.kind, RunKind::Full { .. })
    }

    pub fn result(&self, stage: StageId) -> Option<&StageResult> {
        self.results.iter().find(|r| r.stage == stage)
    }

    pub fn stages(&self) -> Vec<StageId> {
        self.results.iter().map(|r| r.stage).collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.succeeded)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        serde_json::to_string_pretty(self).map_err(crate::error::OrchestratorError::serialization)
    }
}
