//! Taskue Workflow
//!
//! This crate provides the records that taskue clients and runner processes
//! exchange through the shared store.
//!
//! - [`Workflow`] and [`Task`] are written together at submission, then
//!   mutated only by runners.
//! - [`TaskStatus`] and [`WorkflowStatus`] are closed sets, each with a
//!   "done" subset of terminal outcomes.
//! - [`keys`] names every record. These strings are shared with runners and
//!   must not change.
//! - [`codec`] turns records into versioned blobs and back.

pub mod codec;
pub mod keys;

mod error;
mod registry;
mod status;
mod task;
mod workflow;

pub use codec::Record;
pub use error::CodecError;
pub use registry::{Namespace, Runner};
pub use status::{TaskStatus, WorkflowStatus};
pub use task::{Task, TaskSummary};
pub use workflow::Workflow;
