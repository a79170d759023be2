//! Store key scheme.
//!
//! | Record | Key |
//! |---|---|
//! | Runner | `taskue:runner:{name}` |
//! | Workflow | `taskue:workflow:{uid}` |
//! | Task | `taskue:task:{uid}` |
//! | Ranked workflow index | `taskue:workflows` |
//! | Namespace map | `taskue:namespaces` |
//!
//! Runner processes read and write the same keys, so these strings are part
//! of the wire format.

/// Sorted set of workflow uids, scored by creation time in microseconds.
pub const WORKFLOWS: &str = "taskue:workflows";

/// Hash of namespace name to last-seen Unix timestamp.
pub const NAMESPACES: &str = "taskue:namespaces";

const RUNNER_PREFIX: &str = "taskue:runner:";
const WORKFLOW_PREFIX: &str = "taskue:workflow:";
const TASK_PREFIX: &str = "taskue:task:";

pub fn runner(name: &str) -> String {
  format!("{RUNNER_PREFIX}{name}")
}

pub fn workflow(uid: &str) -> String {
  format!("{WORKFLOW_PREFIX}{uid}")
}

pub fn task(uid: &str) -> String {
  format!("{TASK_PREFIX}{uid}")
}

/// Glob matching every runner key.
pub fn runner_pattern() -> String {
  format!("{RUNNER_PREFIX}*")
}

/// Runner name from a runner key, or `None` for any other key.
pub fn runner_name(key: &str) -> Option<&str> {
  key.strip_prefix(RUNNER_PREFIX)
}
