//! Taskue Client
//!
//! This crate is the client side of taskue: it submits staged workflows to a
//! shared store, tracks their progress and cleans them up once they finish.
//! Runner processes execute the tasks and write status changes back to the
//! same store; the client only reads what they write.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Taskue<S>                             │
//! │  - submit(stages, title) → uid     (one atomic batch)        │
//! │  - get_workflow / get_task / list_workflows                  │
//! │  - wait_workflow / wait_task       (poll until done)         │
//! │  - delete_workflow                 (atomic cascade)          │
//! │  - runners and namespaces                                    │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    S: taskue_store::Store                    │
//! │  - blobs, hashes, sorted sets, atomic batches                │
//! │  - MemoryStore / SqliteStore                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use taskue_client::{Taskue, WaitOptions};
//! use taskue_config::TaskDef;
//! use taskue_store::MemoryStore;
//!
//! let client = Taskue::new(MemoryStore::new());
//! let uid = client
//!   .submit(vec![vec![TaskDef::new(json!("a")), TaskDef::new(json!("b"))]], Some("demo".into()))
//!   .await?;
//!
//! let options = WaitOptions::new(Duration::from_millis(200)).with_timeout(Duration::from_secs(60));
//! let workflow = client.wait_workflow_with(&uid, &options).await?;
//! ```

mod client;
mod config;
mod delete;
mod error;
mod submit;
mod wait;

pub use client::Taskue;
pub use config::ClientConfig;
pub use error::TaskueError;
pub use wait::WaitOptions;

pub use taskue_config::{StageDef, SubmissionDef, TaskDef};
pub use taskue_workflow::{
  Namespace, Runner, Task, TaskStatus, TaskSummary, Workflow, WorkflowStatus,
};
