//! Cascading workflow deletion.

use taskue_store::{Batch, Store};
use taskue_workflow::keys;
use tracing::{info, instrument};

use crate::client::Taskue;
use crate::error::TaskueError;

impl<S: Store> Taskue<S> {
  /// Delete a finished workflow together with its index entry and every
  /// task it owns.
  ///
  /// Fails with [`TaskueError::PreconditionFailed`] and changes nothing when
  /// the workflow is not done. The cascade is a single atomic batch.
  #[instrument(skip(self))]
  pub async fn delete_workflow(&self, uid: &str) -> Result<(), TaskueError> {
    let workflow = self.get_workflow_cached(uid).await?;
    if !workflow.is_done() {
      return Err(TaskueError::PreconditionFailed {
        message: format!(
          "workflow '{}' is {}; only finished workflows can be deleted",
          uid, workflow.status
        ),
      });
    }

    let mut batch = Batch::new();
    batch
      .delete([keys::workflow(uid)])
      .zrem(keys::WORKFLOWS, uid)
      .delete(workflow.task_uids().map(keys::task));

    self.store.execute(batch).await?;

    info!(tasks = workflow.task_count(), "workflow deleted");
    Ok(())
  }
}
