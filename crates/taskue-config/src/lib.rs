//! Taskue Config
//!
//! This crate contains the serializable submission types for taskue. They
//! describe a workflow before it is submitted: an ordered list of stages,
//! each an ordered list of task definitions.
//!
//! Definitions can be loaded from:
//! - JSON files (via `taskue submit stages.json`)
//! - Values built in code with [`TaskDef::new`]
//!
//! The client assigns identities, stage and task indices when it turns a
//! definition into stored records.

mod submission;
mod task;

pub use submission::{StageDef, SubmissionDef};
pub use task::TaskDef;
