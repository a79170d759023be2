//! Helpers shared by the client integration tests.
//!
//! Tests play the runner by rewriting records through the public codec,
//! the same way a runner process would.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::json;
use taskue_client::{ClientConfig, StageDef, TaskDef, TaskStatus, Taskue, WorkflowStatus};
use taskue_store::{MemoryStore, Store};
use taskue_workflow::{Task, Workflow, codec, keys};

pub fn task(action: &str) -> TaskDef {
  TaskDef::new(json!({ "run": action }))
}

pub fn stage(actions: &[&str]) -> StageDef {
  actions.iter().map(|action| task(action)).collect()
}

/// A client over a fresh memory store, polling every 10ms.
pub fn memory_client() -> (Taskue<MemoryStore>, MemoryStore) {
  let store = MemoryStore::new();
  let config = ClientConfig {
    poll_interval: Duration::from_millis(10),
    ..ClientConfig::default()
  };
  (Taskue::with_config(store.clone(), config), store)
}

pub async fn set_workflow_status<S: Store>(store: &S, uid: &str, status: WorkflowStatus) {
  let key = keys::workflow(uid);
  let blob = store
    .get(&key)
    .await
    .expect("store read failed")
    .expect("workflow missing");
  let mut workflow: Workflow = codec::decode(&blob).expect("workflow blob unreadable");
  workflow.status = status;
  store
    .set(&key, codec::encode(&workflow).expect("encode failed"))
    .await
    .expect("store write failed");
}

pub async fn set_task_status<S: Store>(store: &S, uid: &str, status: TaskStatus) {
  let key = keys::task(uid);
  let blob = store
    .get(&key)
    .await
    .expect("store read failed")
    .expect("task missing");
  let mut task: Task = codec::decode(&blob).expect("task blob unreadable");
  task.status = status;
  store
    .set(&key, codec::encode(&task).expect("encode failed"))
    .await
    .expect("store write failed");
}
