mod common;

use common::{memory_client, set_workflow_status, stage};
use taskue_client::{TaskueError, WorkflowStatus};
use taskue_store::{Batch, Store};
use taskue_workflow::keys;

#[tokio::test]
async fn test_delete_unfinished_workflow_is_refused() {
  let (client, store) = memory_client();
  let uid = client.submit(vec![stage(&["a", "b"])], None).await.unwrap();
  let before = store.keys("*").await.unwrap();

  for status in [WorkflowStatus::Pending, WorkflowStatus::Running] {
    set_workflow_status(&store, &uid, status).await;

    let result = client.delete_workflow(&uid).await;
    assert!(
      matches!(result, Err(TaskueError::PreconditionFailed { .. })),
      "expected PreconditionFailed for {status}, got {result:?}"
    );
  }

  assert_eq!(store.keys("*").await.unwrap(), before);
  assert_eq!(client.list_workflows(1, 25).await.unwrap(), [uid]);
}

#[tokio::test]
async fn test_delete_finished_workflow_removes_everything() {
  for status in [WorkflowStatus::Passed, WorkflowStatus::Failed, WorkflowStatus::Terminated] {
    let (client, store) = memory_client();
    let uid = client
      .submit(vec![stage(&["a", "b"]), stage(&["c"])], Some("doomed".to_string()))
      .await
      .unwrap();
    let workflow = client.get_workflow(&uid).await.unwrap();
    set_workflow_status(&store, &uid, status).await;

    client.delete_workflow(&uid).await.unwrap();

    assert!(store.keys("taskue:*").await.unwrap().is_empty());
    assert!(client.list_workflows(1, 25).await.unwrap().is_empty());
    assert!(matches!(
      client.get_workflow(&uid).await,
      Err(TaskueError::WorkflowNotFound { .. })
    ));
    for summary in workflow.summaries() {
      assert!(matches!(
        client.get_task(&summary.uid).await,
        Err(TaskueError::TaskNotFound { .. })
      ));
    }
  }
}

#[tokio::test]
async fn test_delete_leaves_other_workflows_alone() {
  let (client, store) = memory_client();
  let doomed = client.submit(vec![stage(&["a"])], None).await.unwrap();
  let kept = client.submit(vec![stage(&["b", "c"])], None).await.unwrap();
  set_workflow_status(&store, &doomed, WorkflowStatus::Passed).await;

  client.delete_workflow(&doomed).await.unwrap();

  assert_eq!(client.list_workflows(1, 25).await.unwrap(), [kept.clone()]);
  let workflow = client.get_workflow(&kept).await.unwrap();
  for summary in workflow.summaries() {
    client.get_task(&summary.uid).await.unwrap();
  }
  // The kept workflow, its two tasks and the index.
  assert_eq!(store.keys("taskue:*").await.unwrap().len(), 4);
  assert!(store.get(&keys::workflow(&doomed)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_unknown_workflow() {
  let (client, _store) = memory_client();

  let err = client.delete_workflow("no-such-workflow").await.unwrap_err();
  assert!(matches!(err, TaskueError::WorkflowNotFound { ref uid } if uid == "no-such-workflow"));
  assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_on_unavailable_store() {
  let (client, store) = memory_client();
  let uid = client.submit(vec![stage(&["a"])], None).await.unwrap();
  set_workflow_status(&store, &uid, WorkflowStatus::Passed).await;

  store.set_unavailable(true);
  assert!(matches!(
    client.delete_workflow(&uid).await,
    Err(TaskueError::StoreUnavailable(_))
  ));

  store.set_unavailable(false);
  client.get_workflow(&uid).await.unwrap();
}

#[tokio::test]
async fn test_delete_uses_requested_uid() {
  let (client, store) = memory_client();
  let original = client.submit(vec![stage(&["a"])], None).await.unwrap();
  set_workflow_status(&store, &original, WorkflowStatus::Passed).await;

  // A copy of the record stored and indexed under a different uid.
  let blob = store.get(&keys::workflow(&original)).await.unwrap().unwrap();
  let mut batch = Batch::new();
  batch
    .set(keys::workflow("copy"), blob)
    .zadd(keys::WORKFLOWS, "copy", f64::MAX);
  store.execute(batch).await.unwrap();

  client.delete_workflow("copy").await.unwrap();

  assert!(store.get(&keys::workflow("copy")).await.unwrap().is_none());
  assert!(store.get(&keys::workflow(&original)).await.unwrap().is_some());
  assert_eq!(client.list_workflows(1, 25).await.unwrap(), [original]);
}
