//! Atomic workflow submission.

use std::sync::atomic::Ordering;

use chrono::{DateTime, Utc};
use taskue_config::{StageDef, SubmissionDef};
use taskue_store::{Batch, Store};
use taskue_workflow::{Task, TaskStatus, Workflow, WorkflowStatus, keys};
use tracing::{info, instrument};

use crate::client::{Taskue, encode_record};
use crate::error::TaskueError;

impl<S: Store> Taskue<S> {
  /// Submit a workflow and return its uid.
  ///
  /// The workflow record, every task record and the index entry are written
  /// in one atomic batch: readers see the whole workflow or none of it.
  #[instrument(skip(self, stages), fields(stages = stages.len()))]
  pub async fn submit(
    &self,
    stages: Vec<StageDef>,
    title: Option<String>,
  ) -> Result<String, TaskueError> {
    let (workflow, tasks) = build_records(stages, title, self.next_created_at());

    let mut batch = Batch::new();
    for task in &tasks {
      let key = keys::task(&task.uid);
      let blob = encode_record(&key, task)?;
      batch.set(key, blob);
    }

    let key = keys::workflow(&workflow.uid);
    let blob = encode_record(&key, &workflow)?;
    batch
      .set(key, blob)
      .zadd(keys::WORKFLOWS, workflow.uid.clone(), rank_score(&workflow.created_at));

    self.store.execute(batch).await?;

    info!(workflow = %workflow.uid, tasks = tasks.len(), "workflow submitted");
    Ok(workflow.uid)
  }

  /// The current time, bumped past the previous submission from this client
  /// so the ranked index keeps submission order.
  fn next_created_at(&self) -> DateTime<Utc> {
    let now = Utc::now();
    let micros = now.timestamp_micros();
    let previous = self
      .last_created
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
        Some(micros.max(last.saturating_add(1)))
      })
      .unwrap_or_else(|last| last);

    DateTime::from_timestamp_micros(micros.max(previous.saturating_add(1))).unwrap_or(now)
  }

  /// Submit a parsed [`SubmissionDef`].
  pub async fn submit_def(&self, def: SubmissionDef) -> Result<String, TaskueError> {
    self.submit(def.stages, def.title).await
  }
}

/// Build the workflow and task records for a submission.
///
/// Stage `i`, task `j` becomes a task with `stage = i`, `tid = j`, status
/// `created` and the workflow's creation time; the workflow embeds a summary
/// of it at `stages[i][j]` and starts out `pending`.
pub(crate) fn build_records(
  stages: Vec<StageDef>,
  title: Option<String>,
  created_at: DateTime<Utc>,
) -> (Workflow, Vec<Task>) {
  let mut workflow = Workflow {
    uid: new_uid(),
    title,
    status: WorkflowStatus::Pending,
    created_at,
    stages: Vec::with_capacity(stages.len()),
    started_at: None,
    done_at: None,
    current_stage: None,
  };
  let mut tasks = Vec::new();

  for (stage, defs) in stages.into_iter().enumerate() {
    let mut summaries = Vec::with_capacity(defs.len());
    for (tid, definition) in defs.into_iter().enumerate() {
      let task = Task {
        uid: new_uid(),
        tid,
        stage,
        workflow: workflow.uid.clone(),
        status: TaskStatus::Created,
        created_at,
        definition,
        runner: None,
        started_at: None,
        done_at: None,
        result: None,
      };
      summaries.push(task.summary());
      tasks.push(task);
    }
    workflow.stages.push(summaries);
  }

  (workflow, tasks)
}

fn new_uid() -> String {
  uuid::Uuid::new_v4().to_string()
}

/// Score in the ranked index: creation time in Unix microseconds, exact in
/// an `f64` for any date this side of the year 2255.
fn rank_score(created_at: &DateTime<Utc>) -> f64 {
  created_at.timestamp_micros() as f64
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use serde_json::json;
  use taskue_config::TaskDef;

  use super::*;

  fn defs(actions: &[&str]) -> StageDef {
    actions.iter().map(|a| TaskDef::new(json!(a))).collect()
  }

  #[test]
  fn test_build_records_assigns_positions() {
    let now = Utc::now();
    let (workflow, tasks) = build_records(
      vec![defs(&["a", "b"]), defs(&["c"])],
      Some("demo".to_string()),
      now,
    );

    assert_eq!(workflow.status, WorkflowStatus::Pending);
    assert_eq!(workflow.title.as_deref(), Some("demo"));
    assert_eq!(workflow.stages.len(), 2);
    assert_eq!(workflow.stages[0].len(), 2);
    assert_eq!(workflow.stages[1].len(), 1);

    let positions: Vec<(usize, usize)> = tasks.iter().map(|t| (t.stage, t.tid)).collect();
    assert_eq!(positions, [(0, 0), (0, 1), (1, 0)]);

    for task in &tasks {
      assert_eq!(task.workflow, workflow.uid);
      assert_eq!(task.status, TaskStatus::Created);
      assert_eq!(task.created_at, now);
      assert_eq!(workflow.stages[task.stage][task.tid], task.summary());
    }

    assert_eq!(tasks[2].definition.action, json!("c"));
  }

  #[test]
  fn test_build_records_uids_are_unique() {
    let (workflow, tasks) = build_records(vec![defs(&["a"; 20]), defs(&["b"; 20])], None, Utc::now());

    let mut uids: HashSet<&str> = tasks.iter().map(|t| t.uid.as_str()).collect();
    uids.insert(&workflow.uid);
    assert_eq!(uids.len(), 41);
  }

  #[test]
  fn test_build_records_keeps_empty_stages() {
    let (workflow, tasks) = build_records(vec![vec![], defs(&["a"])], None, Utc::now());

    assert_eq!(workflow.stages.len(), 2);
    assert!(workflow.stages[0].is_empty());
    assert_eq!(tasks[0].stage, 1);
    assert_eq!(tasks[0].tid, 0);
  }

  #[test]
  fn test_next_created_at_strictly_increases() {
    let client = Taskue::new(taskue_store::MemoryStore::new());

    let stamps: Vec<DateTime<Utc>> = (0..1000).map(|_| client.next_created_at()).collect();
    for pair in stamps.windows(2) {
      assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
      assert!(rank_score(&pair[0]) < rank_score(&pair[1]));
    }
  }

  #[test]
  fn test_rank_score_keeps_microseconds() {
    let created_at = DateTime::from_timestamp_micros(1_700_000_000_123_457).unwrap();
    assert_eq!(rank_score(&created_at), 1_700_000_000_123_457.0);
  }
}
