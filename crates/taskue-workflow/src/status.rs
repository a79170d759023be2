use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
  Created,
  Pending,
  Running,
  Passed,
  Failed,
  Errored,
  Timedout,
  Skipped,
  Terminated,
}

impl TaskStatus {
  /// Terminal statuses. A task in one of these never changes again.
  pub const DONE: [TaskStatus; 6] = [
    TaskStatus::Passed,
    TaskStatus::Failed,
    TaskStatus::Errored,
    TaskStatus::Timedout,
    TaskStatus::Skipped,
    TaskStatus::Terminated,
  ];

  pub fn is_done(self) -> bool {
    Self::DONE.contains(&self)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      TaskStatus::Created => "created",
      TaskStatus::Pending => "pending",
      TaskStatus::Running => "running",
      TaskStatus::Passed => "passed",
      TaskStatus::Failed => "failed",
      TaskStatus::Errored => "errored",
      TaskStatus::Timedout => "timedout",
      TaskStatus::Skipped => "skipped",
      TaskStatus::Terminated => "terminated",
    }
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Status of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
  Created,
  Pending,
  Running,
  Passed,
  Failed,
  Terminated,
}

impl WorkflowStatus {
  /// Terminal statuses. Only workflows in one of these may be deleted.
  pub const DONE: [WorkflowStatus; 3] = [
    WorkflowStatus::Passed,
    WorkflowStatus::Failed,
    WorkflowStatus::Terminated,
  ];

  pub fn is_done(self) -> bool {
    Self::DONE.contains(&self)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      WorkflowStatus::Created => "created",
      WorkflowStatus::Pending => "pending",
      WorkflowStatus::Running => "running",
      WorkflowStatus::Passed => "passed",
      WorkflowStatus::Failed => "failed",
      WorkflowStatus::Terminated => "terminated",
    }
  }
}

impl fmt::Display for WorkflowStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
