use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskue_config::TaskDef;

use crate::status::TaskStatus;

/// A task as stored under `taskue:task:{uid}`.
///
/// Created by the client at submission; every field after `definition` is
/// written by the runner executing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
  pub uid: String,
  /// Index within the owning stage, starting at 0.
  pub tid: usize,
  /// Index of the owning stage, starting at 0.
  pub stage: usize,
  /// Owning workflow uid.
  pub workflow: String,
  pub status: TaskStatus,
  /// Shared with the owning workflow.
  pub created_at: DateTime<Utc>,
  #[serde(flatten)]
  pub definition: TaskDef,
  /// Name of the runner that picked the task up.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub runner: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub started_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub done_at: Option<DateTime<Utc>>,
  /// Output reported by the runner.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub result: Option<serde_json::Value>,
}

impl Task {
  pub fn is_done(&self) -> bool {
    self.status.is_done()
  }

  /// The summary the owning workflow embeds for this task.
  pub fn summary(&self) -> TaskSummary {
    TaskSummary {
      uid: self.uid.clone(),
      stage: self.stage,
      tid: self.tid,
      status: self.status,
    }
  }
}

/// Cached view of a task embedded in its workflow.
///
/// The identity fields never change after submission. `status` is a
/// snapshot and may lag behind the task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
  pub uid: String,
  pub stage: usize,
  pub tid: usize,
  pub status: TaskStatus,
}
