use serde::{Deserialize, Serialize};

/// Definition of a single task within a stage.
///
/// The `action` is opaque to taskue. It is stored verbatim and interpreted
/// only by the runner that picks the task up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
  /// Payload describing the work, handed to the runner as-is.
  pub action: serde_json::Value,
  /// Human readable label.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  /// Restricts the task to runners advertising this tag.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tag: Option<String>,
  /// Execution time limit enforced by the runner.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timeout_secs: Option<u64>,
  /// Extra attempts the runner may make after a failure.
  #[serde(default)]
  pub retries: u32,
  /// A failure of this task does not fail its workflow.
  #[serde(default)]
  pub allow_failure: bool,
}

impl TaskDef {
  pub fn new(action: serde_json::Value) -> Self {
    Self {
      action,
      title: None,
      tag: None,
      timeout_secs: None,
      retries: 0,
      allow_failure: false,
    }
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = Some(title.into());
    self
  }

  pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
    self.tag = Some(tag.into());
    self
  }

  pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
    self.timeout_secs = Some(timeout_secs);
    self
  }

  pub fn with_retries(mut self, retries: u32) -> Self {
    self.retries = retries;
    self
  }

  pub fn allowing_failure(mut self) -> Self {
    self.allow_failure = true;
    self
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_minimal_definition_uses_defaults() {
    let def: TaskDef = serde_json::from_value(json!({ "action": { "cmd": "echo hi" } })).unwrap();

    assert_eq!(def, TaskDef::new(json!({ "cmd": "echo hi" })));
  }

  #[test]
  fn test_optional_fields_are_omitted() {
    let def = TaskDef::new(json!("build"));
    let value = serde_json::to_value(&def).unwrap();

    assert_eq!(
      value,
      json!({ "action": "build", "retries": 0, "allow_failure": false })
    );
  }

  #[test]
  fn test_builder_sets_fields() {
    let def = TaskDef::new(json!("deploy"))
      .with_title("deploy")
      .with_tag("linux")
      .with_timeout_secs(30)
      .with_retries(2)
      .allowing_failure();

    assert_eq!(def.tag.as_deref(), Some("linux"));
    assert_eq!(def.timeout_secs, Some(30));
    assert_eq!(def.retries, 2);
    assert!(def.allow_failure);
  }
}
