//! The in-memory record of one pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::event::Stage;
use super::provider::ProviderInput;
use crate::pipeline::log::RunLog;
use crate::pipeline::progress::ProgressTracker;

/// Unique run identifier.
pub type RunId = Uuid;

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// A single timestamped log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Latest payload of each stage. A later payload replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<Value>,
    /// Captured alongside the directory payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_report: Option<Value>,
    /// When the directory payload was observed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl StageResults {
    pub fn get(&self, stage: Stage) -> Option<&Value> {
        match stage {
            Stage::Validation => self.validation.as_ref(),
            Stage::Enrichment => self.enrichment.as_ref(),
            Stage::Quality => self.quality.as_ref(),
            Stage::Directory => self.directory.as_ref(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.directory.is_some()
    }
}

/// One end-to-end execution of the pipeline as observed by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: RunId,
    pub input: ProviderInput,
    pub stage_results: StageResults,
    pub progress: ProgressTracker,
    pub log: RunLog,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    pub fn new(input: ProviderInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            input,
            stage_results: StageResults::default(),
            progress: ProgressTracker::new(),
            log: RunLog::new(),
            status: RunStatus::Idle,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// 0 = not started, 1 = running, 2..=5 = stages complete.
    pub fn current_step(&self) -> u8 {
        self.progress.step()
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
