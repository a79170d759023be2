//! Blocking waits for workflows and tasks to finish.
//!
//! A wait polls the record until its status enters the done subset. The
//! default waits poll forever at [`ClientConfig::poll_interval`]; the `_with`
//! variants take [`WaitOptions`] to bound the wait with a deadline, a
//! cancellation token, or both.
//!
//! [`ClientConfig::poll_interval`]: crate::ClientConfig::poll_interval

use std::future::Future;
use std::time::Duration;

use taskue_store::Store;
use taskue_workflow::{Task, Workflow};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::client::Taskue;
use crate::error::TaskueError;

/// How long and how often to poll.
#[derive(Debug, Clone)]
pub struct WaitOptions {
  /// Delay between status checks.
  pub interval: Duration,
  /// Give up with [`TaskueError::Timeout`] after this long.
  pub timeout: Option<Duration>,
  /// Give up with [`TaskueError::Cancelled`] once this token fires.
  pub cancel: Option<CancellationToken>,
}

impl WaitOptions {
  pub fn new(interval: Duration) -> Self {
    Self {
      interval,
      timeout: None,
      cancel: None,
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
    self.cancel = Some(cancel);
    self
  }
}

impl Default for WaitOptions {
  fn default() -> Self {
    Self::new(Duration::from_secs(1))
  }
}

impl<S: Store> Taskue<S> {
  /// Block until the workflow reaches a done status, then return it.
  pub async fn wait_workflow(&self, uid: &str) -> Result<Workflow, TaskueError> {
    let options = WaitOptions::new(self.config.poll_interval);
    self.wait_workflow_with(uid, &options).await
  }

  #[instrument(skip(self, options), fields(interval = ?options.interval, timeout = ?options.timeout))]
  pub async fn wait_workflow_with(
    &self,
    uid: &str,
    options: &WaitOptions,
  ) -> Result<Workflow, TaskueError> {
    poll_until_done(uid, options, || self.get_workflow(uid), Workflow::is_done).await
  }

  /// Block until the task reaches a done status, then return it.
  pub async fn wait_task(&self, uid: &str) -> Result<Task, TaskueError> {
    let options = WaitOptions::new(self.config.poll_interval);
    self.wait_task_with(uid, &options).await
  }

  #[instrument(skip(self, options), fields(interval = ?options.interval, timeout = ?options.timeout))]
  pub async fn wait_task_with(&self, uid: &str, options: &WaitOptions) -> Result<Task, TaskueError> {
    poll_until_done(uid, options, || self.get_task(uid), Task::is_done).await
  }
}

/// Fetch until `is_done` holds, sleeping `options.interval` between fetches.
///
/// Fetch errors end the wait immediately; only "not done yet" is retried.
async fn poll_until_done<T, F, Fut>(
  uid: &str,
  options: &WaitOptions,
  mut fetch: F,
  is_done: fn(&T) -> bool,
) -> Result<T, TaskueError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, TaskueError>>,
{
  let deadline = options.timeout.map(|timeout| Instant::now() + timeout);

  loop {
    if options.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
      return Err(TaskueError::Cancelled);
    }

    let snapshot = fetch().await?;
    if is_done(&snapshot) {
      return Ok(snapshot);
    }

    let mut pause = options.interval;
    if let Some(deadline) = deadline {
      let now = Instant::now();
      if now >= deadline {
        return Err(TaskueError::Timeout {
          uid: uid.to_string(),
        });
      }
      // Wake at the deadline for one last check rather than oversleeping it.
      pause = pause.min(deadline - now);
    }

    debug!(?pause, "not done yet");

    match &options.cancel {
      Some(cancel) => {
        tokio::select! {
          _ = sleep(pause) => {}
          _ = cancel.cancelled() => return Err(TaskueError::Cancelled),
        }
      }
      None => sleep(pause).await,
    }
  }
}
