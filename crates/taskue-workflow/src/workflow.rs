use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::WorkflowStatus;
use crate::task::TaskSummary;

/// A workflow as stored under `taskue:workflow:{uid}`.
///
/// `stages[i][j]` summarizes the task with stage index `i` and task index
/// `j`. The stage structure is fixed at submission; runners update
/// `status` and the optional progress fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  pub uid: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  pub status: WorkflowStatus,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub stages: Vec<Vec<TaskSummary>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub started_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub done_at: Option<DateTime<Utc>>,
  /// Stage the runners are currently working on.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub current_stage: Option<usize>,
}

impl Workflow {
  pub fn is_done(&self) -> bool {
    self.status.is_done()
  }

  /// Every task summary in stage order, then task order.
  pub fn summaries(&self) -> impl Iterator<Item = &TaskSummary> {
    self.stages.iter().flatten()
  }

  /// Uids of every task the workflow owns, in stage order, then task order.
  pub fn task_uids(&self) -> impl Iterator<Item = &str> {
    self.summaries().map(|summary| summary.uid.as_str())
  }

  pub fn task_count(&self) -> usize {
    self.stages.iter().map(Vec::len).sum()
  }
}
