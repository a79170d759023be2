mod common;

use std::time::Duration;

use common::{memory_client, set_task_status, set_workflow_status, stage};
use taskue_client::{TaskStatus, TaskueError, WaitOptions, WorkflowStatus};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn quick() -> WaitOptions {
  WaitOptions::new(Duration::from_millis(10))
}

#[tokio::test]
async fn test_wait_returns_immediately_when_done() {
  let (client, store) = memory_client();
  let uid = client.submit(vec![stage(&["a"])], None).await.unwrap();
  set_workflow_status(&store, &uid, WorkflowStatus::Failed).await;

  let workflow = client.wait_workflow(&uid).await.unwrap();
  assert_eq!(workflow.status, WorkflowStatus::Failed);
}

#[tokio::test]
async fn test_wait_workflow_sees_runner_finish() {
  let (client, store) = memory_client();
  let uid = client.submit(vec![stage(&["a"])], None).await.unwrap();

  let runner = {
    let store = store.clone();
    let uid = uid.clone();
    tokio::spawn(async move {
      tokio::time::sleep(Duration::from_millis(30)).await;
      set_workflow_status(&store, &uid, WorkflowStatus::Running).await;
      tokio::time::sleep(Duration::from_millis(30)).await;
      set_workflow_status(&store, &uid, WorkflowStatus::Passed).await;
      Instant::now()
    })
  };

  let workflow = client.wait_workflow(&uid).await.unwrap();
  let returned = Instant::now();
  assert_eq!(workflow.status, WorkflowStatus::Passed);

  // Back within one poll interval of the status change, plus scheduling slack.
  let finished = runner.await.unwrap();
  let lag = returned.saturating_duration_since(finished);
  assert!(
    lag <= client.config().poll_interval + Duration::from_millis(100),
    "wait returned {lag:?} after the workflow finished"
  );
}

#[tokio::test]
async fn test_wait_task_sees_runner_finish() {
  let (client, store) = memory_client();
  let uid = client.submit(vec![stage(&["a", "b"])], None).await.unwrap();
  let workflow = client.get_workflow(&uid).await.unwrap();
  let task_uid = workflow.stages[0][1].uid.clone();

  let runner = {
    let store = store.clone();
    let task_uid = task_uid.clone();
    tokio::spawn(async move {
      set_task_status(&store, &task_uid, TaskStatus::Running).await;
      tokio::time::sleep(Duration::from_millis(30)).await;
      set_task_status(&store, &task_uid, TaskStatus::Timedout).await;
    })
  };

  let task = client.wait_task_with(&task_uid, &quick()).await.unwrap();
  assert_eq!(task.status, TaskStatus::Timedout);
  runner.await.unwrap();
}

#[tokio::test]
async fn test_wait_times_out() {
  let (client, _store) = memory_client();
  let uid = client.submit(vec![stage(&["a"])], None).await.unwrap();

  let started = Instant::now();
  let options = quick().with_timeout(Duration::from_millis(50));
  let err = client.wait_workflow_with(&uid, &options).await.unwrap_err();

  assert!(matches!(err, TaskueError::Timeout { uid: ref u } if *u == uid));
  assert!(started.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_wait_timeout_shorter_than_interval() {
  let (client, _store) = memory_client();
  let uid = client.submit(vec![stage(&["a"])], None).await.unwrap();

  let started = Instant::now();
  let options = WaitOptions::new(Duration::from_secs(30)).with_timeout(Duration::from_millis(20));
  let err = client.wait_workflow_with(&uid, &options).await.unwrap_err();

  assert!(matches!(err, TaskueError::Timeout { .. }));
  assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_wait_cancelled() {
  let (client, _store) = memory_client();
  let uid = client.submit(vec![stage(&["a"])], None).await.unwrap();

  let cancel = CancellationToken::new();
  let trigger = cancel.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(30)).await;
    trigger.cancel();
  });

  let options = WaitOptions::new(Duration::from_secs(30)).with_cancel(cancel);
  let err = client.wait_workflow_with(&uid, &options).await.unwrap_err();
  assert!(matches!(err, TaskueError::Cancelled));
}

#[tokio::test]
async fn test_wait_already_cancelled() {
  let (client, store) = memory_client();
  let uid = client.submit(vec![stage(&["a"])], None).await.unwrap();
  set_workflow_status(&store, &uid, WorkflowStatus::Passed).await;

  let cancel = CancellationToken::new();
  cancel.cancel();

  let options = quick().with_cancel(cancel);
  assert!(matches!(
    client.wait_workflow_with(&uid, &options).await,
    Err(TaskueError::Cancelled)
  ));
}

#[tokio::test]
async fn test_wait_unknown_records() {
  let (client, _store) = memory_client();

  assert!(matches!(
    client.wait_workflow("missing").await,
    Err(TaskueError::WorkflowNotFound { .. })
  ));
  assert!(matches!(
    client.wait_task("missing").await,
    Err(TaskueError::TaskNotFound { .. })
  ));
}

#[tokio::test]
async fn test_wait_stops_on_store_error() {
  let (client, store) = memory_client();
  let uid = client.submit(vec![stage(&["a"])], None).await.unwrap();

  store.set_unavailable(true);
  assert!(matches!(
    client.wait_workflow_with(&uid, &quick()).await,
    Err(TaskueError::StoreUnavailable(_))
  ));
}

#[tokio::test]
async fn test_get_workflow_reports_task_statuses() {
  let (client, store) = memory_client();
  let uid = client.submit(vec![stage(&["a", "b"])], None).await.unwrap();
  let submitted = client.get_workflow(&uid).await.unwrap();
  let first = submitted.stages[0][0].uid.clone();

  // Runners move the task record; the embedded summary lags behind.
  set_task_status(&store, &first, TaskStatus::Passed).await;

  let fresh = client.get_workflow(&uid).await.unwrap();
  assert_eq!(fresh.stages[0][0].status, TaskStatus::Passed);
  assert_eq!(fresh.stages[0][1].status, TaskStatus::Created);

  let cached = client.get_workflow_cached(&uid).await.unwrap();
  assert_eq!(cached.stages[0][0].status, TaskStatus::Created);
}
