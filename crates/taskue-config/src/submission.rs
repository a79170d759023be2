use serde::{Deserialize, Serialize};

use crate::task::TaskDef;

/// An ordered batch of tasks meant to run concurrently.
pub type StageDef = Vec<TaskDef>;

/// A complete workflow submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDef {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  /// Stages in execution order.
  pub stages: Vec<StageDef>,
}

/// Accepted on-disk shapes: a full submission object, or just its stages.
#[derive(Deserialize)]
#[serde(untagged)]
enum SubmissionFile {
  Full(SubmissionDef),
  Stages(Vec<StageDef>),
}

impl SubmissionDef {
  pub fn new(stages: Vec<StageDef>) -> Self {
    Self {
      title: None,
      stages,
    }
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = Some(title.into());
    self
  }

  /// Parse a submission from JSON, accepting either
  /// `{"title": ..., "stages": [[...]]}` or a bare `[[...]]`.
  pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
    let file: SubmissionFile = serde_json::from_str(input)?;
    Ok(match file {
      SubmissionFile::Full(def) => def,
      SubmissionFile::Stages(stages) => Self::new(stages),
    })
  }

  /// Total number of tasks across every stage.
  pub fn task_count(&self) -> usize {
    self.stages.iter().map(Vec::len).sum()
  }
}
