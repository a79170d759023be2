//! The taskue client and its read-side operations.

use std::sync::atomic::AtomicI64;

use futures::{Stream, StreamExt};
use taskue_store::Store;
use taskue_workflow::{Namespace, Record, Runner, Task, Workflow, codec, keys};
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::TaskueError;

/// Client for submitting and tracking workflows in a shared store.
///
/// The client holds no state of its own beyond the injected store handle,
/// so any number of clients in any number of processes can work against
/// the same store concurrently.
///
/// # Usage
///
/// ```ignore
/// let store = SqliteStore::open("taskue.db").await?;
/// let client = Taskue::new(store);
///
/// let uid = client
///   .submit(vec![vec![TaskDef::new(json!("build"))], vec![TaskDef::new(json!("test"))]], None)
///   .await?;
///
/// let workflow = client.wait_workflow(&uid).await?;
/// client.delete_workflow(&uid).await?;
/// ```
pub struct Taskue<S> {
  pub(crate) store: S,
  pub(crate) config: ClientConfig,
  /// Creation time of the latest submission, in Unix microseconds.
  pub(crate) last_created: AtomicI64,
}

impl<S: Store> Taskue<S> {
  /// Create a client with the default configuration.
  pub fn new(store: S) -> Self {
    Self::with_config(store, ClientConfig::default())
  }

  pub fn with_config(store: S, config: ClientConfig) -> Self {
    Self {
      store,
      config,
      last_created: AtomicI64::new(i64::MIN),
    }
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn config(&self) -> &ClientConfig {
    &self.config
  }

  /// Fetch a workflow with every task summary refreshed from its task record.
  #[instrument(skip(self))]
  pub async fn get_workflow(&self, uid: &str) -> Result<Workflow, TaskueError> {
    let mut workflow = self.get_workflow_cached(uid).await?;
    self.refresh_summaries(&mut workflow).await?;
    Ok(workflow)
  }

  /// Fetch a workflow exactly as stored, summaries included.
  pub async fn get_workflow_cached(&self, uid: &str) -> Result<Workflow, TaskueError> {
    let key = keys::workflow(uid);
    match self.store.get(&key).await? {
      Some(blob) => decode_record(&key, &blob),
      None => Err(TaskueError::WorkflowNotFound {
        uid: uid.to_string(),
      }),
    }
  }

  #[instrument(skip(self))]
  pub async fn get_task(&self, uid: &str) -> Result<Task, TaskueError> {
    let key = keys::task(uid);
    match self.store.get(&key).await? {
      Some(blob) => decode_record(&key, &blob),
      None => Err(TaskueError::TaskNotFound {
        uid: uid.to_string(),
      }),
    }
  }

  /// Workflow uids on a page of the ranked index, oldest first.
  ///
  /// Page `p` covers ranks `(p-1)*limit ..= p*limit-1`, so consecutive pages
  /// neither overlap nor skip entries.
  #[instrument(skip(self))]
  pub async fn list_workflows(&self, page: usize, limit: usize) -> Result<Vec<String>, TaskueError> {
    let (start, stop) = page_window(page, limit)?;
    Ok(self.store.zrange(keys::WORKFLOWS, start, stop).await?)
  }

  /// Like [`list_workflows`](Self::list_workflows), keeping only finished
  /// workflows. A page may hold fewer than `limit` entries.
  #[instrument(skip(self))]
  pub async fn list_done_workflows(
    &self,
    page: usize,
    limit: usize,
  ) -> Result<Vec<String>, TaskueError> {
    let mut done = Vec::new();
    for uid in self.list_workflows(page, limit).await? {
      match self.get_workflow_cached(&uid).await {
        Ok(workflow) if workflow.is_done() => done.push(uid),
        Ok(_) => {}
        // Deleted between the index read and the record read.
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e),
      }
    }
    Ok(done)
  }

  /// Stream every namespace with its last-seen timestamp, in no particular
  /// order. Records are read lazily as the stream is polled.
  pub fn list_namespaces(&self) -> impl Stream<Item = Result<Namespace, TaskueError>> + Send + '_ {
    self.store.hscan(keys::NAMESPACES).map(|entry| {
      let (name, value) = entry?;
      Namespace::parse(name, &value).map_err(|source| TaskueError::Deserialization {
        key: keys::NAMESPACES.to_string(),
        source,
      })
    })
  }

  /// Remove a namespace. Removing an unknown namespace succeeds.
  #[instrument(skip(self))]
  pub async fn delete_namespace(&self, name: &str) -> Result<(), TaskueError> {
    let removed = self.store.hdel(keys::NAMESPACES, name).await?;
    debug!(removed, "namespace delete");
    Ok(())
  }

  /// Names of every registered runner, sorted.
  #[instrument(skip(self))]
  pub async fn list_runners(&self) -> Result<Vec<String>, TaskueError> {
    let runner_keys = self.store.keys(&keys::runner_pattern()).await?;
    let mut names: Vec<String> = runner_keys
      .iter()
      .filter_map(|key| keys::runner_name(key))
      .map(str::to_string)
      .collect();
    names.sort();
    Ok(names)
  }

  #[instrument(skip(self))]
  pub async fn get_runner(&self, name: &str) -> Result<Runner, TaskueError> {
    let fields = self.store.hget_all(&keys::runner(name)).await?;
    if fields.is_empty() {
      return Err(TaskueError::RunnerNotFound {
        name: name.to_string(),
      });
    }

    Ok(Runner {
      name: name.to_string(),
      fields: fields.into_iter().collect(),
    })
  }

  /// Overwrite each summary status with the status of its task record.
  ///
  /// Runners update task records first; summaries may lag, so reads take
  /// the task record as authoritative. A task record that is missing or
  /// unreadable leaves the cached status in place.
  async fn refresh_summaries(&self, workflow: &mut Workflow) -> Result<(), TaskueError> {
    let task_keys: Vec<String> = workflow.task_uids().map(keys::task).collect();
    if task_keys.is_empty() {
      return Ok(());
    }

    let blobs = self.store.get_many(&task_keys).await?;
    let workflow_uid = workflow.uid.clone();
    let summaries = workflow.stages.iter_mut().flatten();

    for ((summary, key), blob) in summaries.zip(&task_keys).zip(blobs) {
      let Some(blob) = blob else {
        warn!(workflow = %workflow_uid, task = %summary.uid, "task record missing, keeping cached status");
        continue;
      };

      match codec::decode::<Task>(&blob) {
        Ok(task) => summary.status = task.status,
        Err(e) => {
          warn!(workflow = %workflow_uid, key = %key, error = %e, "unreadable task record, keeping cached status");
        }
      }
    }

    Ok(())
  }
}

pub(crate) fn decode_record<T: Record>(key: &str, blob: &[u8]) -> Result<T, TaskueError> {
  codec::decode(blob).map_err(|source| TaskueError::Deserialization {
    key: key.to_string(),
    source,
  })
}

pub(crate) fn encode_record<T: Record>(key: &str, record: &T) -> Result<Vec<u8>, TaskueError> {
  codec::encode(record).map_err(|source| TaskueError::Serialization {
    key: key.to_string(),
    source,
  })
}

/// Inclusive rank bounds for a 1-based page.
fn page_window(page: usize, limit: usize) -> Result<(i64, i64), TaskueError> {
  if page == 0 {
    return Err(TaskueError::invalid_argument("page numbers start at 1"));
  }
  if limit == 0 {
    return Err(TaskueError::invalid_argument("limit must be at least 1"));
  }

  let start = (page - 1)
    .checked_mul(limit)
    .and_then(|start| i64::try_from(start).ok());
  let stop = page
    .checked_mul(limit)
    .and_then(|end| i64::try_from(end - 1).ok());

  match (start, stop) {
    (Some(start), Some(stop)) => Ok((start, stop)),
    _ => Err(TaskueError::invalid_argument(format!(
      "page {} with limit {} is out of range",
      page, limit
    ))),
  }
}
