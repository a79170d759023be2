//! Client error types.

use taskue_store::StoreError;
use taskue_workflow::CodecError;

/// Errors returned by [`Taskue`](crate::Taskue) operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskueError {
  #[error("workflow '{uid}' not found")]
  WorkflowNotFound { uid: String },

  #[error("task '{uid}' not found")]
  TaskNotFound { uid: String },

  #[error("runner '{name}' not found")]
  RunnerNotFound { name: String },

  /// The operation is not allowed in the record's current state.
  #[error("precondition failed: {message}")]
  PreconditionFailed { message: String },

  /// The store could not be reached or rejected the operation.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[from] StoreError),

  /// A stored record could not be decoded.
  #[error("failed to decode '{key}': {source}")]
  Deserialization {
    key: String,
    #[source]
    source: CodecError,
  },

  /// A record could not be encoded for storage.
  #[error("failed to encode '{key}': {source}")]
  Serialization {
    key: String,
    #[source]
    source: CodecError,
  },

  #[error("invalid argument: {message}")]
  InvalidArgument { message: String },

  /// A bounded wait ran out before the record reached a done status.
  #[error("timed out waiting for '{uid}'")]
  Timeout { uid: String },

  /// A wait was cancelled by its token.
  #[error("wait cancelled")]
  Cancelled,
}

impl TaskueError {
  /// True for the workflow, task and runner not-found variants.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::WorkflowNotFound { .. } | Self::TaskNotFound { .. } | Self::RunnerNotFound { .. }
    )
  }

  pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
    Self::InvalidArgument {
      message: message.into(),
    }
  }
}
