//! Run outcome models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Overall status of one runner invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Nothing has happened yet
    Pending,
    /// The execution plan is being computed
    Resolving,
    /// Operations are executing in plan order
    Executing,
    /// Every planned operation succeeded
    Completed,
    /// At least one operation failed
    Failed,
    /// The run was cancelled before finishing
    Cancelled,
}

/// Why an operation was skipped rather than attempted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// An earlier operation in the plan failed
    FailedPredecessor { failed: String },
    /// Cancellation was requested before this operation started
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FailedPredecessor { failed } => {
                write!(f, "skipped after failure of '{}'", failed)
            }
            SkipReason::Cancelled => write!(f, "skipped due to cancellation"),
        }
    }
}

/// Outcome of a single operation within one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationOutcome {
    Succeeded { duration_ms: u64 },
    Failed { error: String, duration_ms: u64 },
    Skipped { reason: SkipReason },
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Succeeded { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, OperationOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, OperationOutcome::Skipped { .. })
    }
}

/// Per-operation record in a [`RunReport`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub name: String,
    pub outcome: OperationOutcome,
}

/// The record of one runner invocation
///
/// Lives only for the duration of the invocation; persistence, if any, is a
/// caller's concern.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub results: Vec<RunResult>,
}

impl RunReport {
    /// Start a fresh report in the `Executing` state
    pub fn begin() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Executing,
            started_at: Utc::now(),
            completed_at: None,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, outcome: OperationOutcome) {
        self.results.push(RunResult {
            name: name.into(),
            outcome,
        });
    }

    /// Close the report, deriving the terminal status
    pub fn finish(&mut self, cancelled: bool) {
        self.completed_at = Some(Utc::now());
        self.status = if self.results.iter().any(|r| r.outcome.is_failure()) {
            RunStatus::Failed
        } else if cancelled {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };
    }

    pub fn result(&self, name: &str) -> Option<&RunResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_skipped()).count()
    }

    /// True only when the run completed with every operation succeeding
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }
}
