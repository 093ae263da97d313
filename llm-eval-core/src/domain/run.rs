use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{EvalNameId, EvalRunId};
use crate::error::CoreError;

// ===== Run Status =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RunStatus::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(CoreError::Validation(format!("unknown run status: {}", other))),
        }
    }
}

// ===== Eval Run =====

/// Persisted lifecycle record of one `evaluate()` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalRun {
    pub id: EvalRunId,
    pub eval_name_id: EvalNameId,
    pub status: RunStatus,
    pub max_concurrency: u32,
    pub total_items: u32,
    pub completed_items: u32,
    pub output_dir: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

impl EvalRun {
    /// Materialize a freshly created run: status `running`, nothing completed yet.
    pub fn start(new_run: NewEvalRun) -> Self {
        Self {
            id: EvalRunId::new(),
            eval_name_id: new_run.eval_name_id,
            status: RunStatus::Running,
            max_concurrency: new_run.max_concurrency,
            total_items: new_run.total_items,
            completed_items: 0,
            output_dir: new_run.output_dir,
            started_at: Utc::now(),
            completed_at: None,
            metadata: None,
        }
    }

    /// Record progress; the count is clamped to `total_items`.
    pub fn record_progress(&mut self, completed_items: u32) {
        self.completed_items = completed_items.min(self.total_items);
    }

    /// Move to a terminal status, stamping `completed_at`.
    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.completed_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewEvalRun {
    pub eval_name_id: EvalNameId,
    pub max_concurrency: u32,
    pub total_items: u32,
    pub output_dir: Option<String>,
}

// ===== Queries =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunOrder {
    #[default]
    Newest,
    Oldest,
}

/// Filter and paging for listing the runs of an eval name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunQuery {
    pub limit: i64,
    pub offset: i64,
    pub status: Option<RunStatus>,
    pub order: RunOrder,
}

impl Default for RunQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            status: None,
            order: RunOrder::Newest,
        }
    }
}

impl RunQuery {
    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_order(mut self, order: RunOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}
