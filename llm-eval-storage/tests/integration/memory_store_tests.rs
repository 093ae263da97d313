use llm_eval_core::domain::{EvalRunId, ResultQuery, RunOrder, RunQuery, RunStatus};
use llm_eval_core::{CoreError, EvalStore};
use llm_eval_storage::{InMemoryEvalStore, RunEvent};
use pretty_assertions::assert_eq;

use crate::common::{new_run, result_rows, unique_test_name};

// ===== Context Tests =====

#[tokio::test]
async fn test_context_requires_existing_project() {
    let store = InMemoryEvalStore::new();

    let err = store
        .find_or_create_context("missing", "eval", None)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("\"missing\""));
}

#[tokio::test]
async fn test_context_creates_eval_name_once() {
    let store = InMemoryEvalStore::new();
    let project = store.create_project("demo", None).await.unwrap();

    let first = store
        .find_or_create_context("demo", "qa", Some("question answering"))
        .await
        .unwrap();
    let second = store.find_or_create_context("demo", "qa", None).await.unwrap();

    assert_eq!(first.project.id, project.id);
    assert_eq!(first.eval_name.id, second.eval_name.id);
    assert_eq!(first.eval_name.description.as_deref(), Some("question answering"));
    assert_eq!(store.eval_names().await.len(), 1);
}

#[tokio::test]
async fn test_duplicate_project_rejected() {
    let store = InMemoryEvalStore::new();
    let name = unique_test_name("project");
    store.create_project(&name, None).await.unwrap();

    let err = store.create_project(&name, None).await.unwrap_err();
    assert!(matches!(err, CoreError::AlreadyExists(_)));
}

// ===== Run Lifecycle Tests =====

#[tokio::test]
async fn test_run_lifecycle() {
    let store = InMemoryEvalStore::new();
    store.create_project("demo", None).await.unwrap();
    let context = store.find_or_create_context("demo", "qa", None).await.unwrap();

    let run = store.create_run(new_run(context.eval_name.id, 3)).await.unwrap();
    assert_eq!(run.status, RunStatus::Running);
    assert_eq!(run.total_items, 3);
    assert_eq!(run.completed_items, 0);

    let run = store.update_run_progress(run.id, 2).await.unwrap();
    assert_eq!(run.completed_items, 2);

    let run = store.complete_run(run.id).await.unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.completed_at.is_some());

    assert_eq!(
        store.run_events(run.id).await,
        vec![RunEvent::Created, RunEvent::Progress(2), RunEvent::Completed]
    );
}

#[tokio::test]
async fn test_progress_never_exceeds_total() {
    let store = InMemoryEvalStore::new();
    store.create_project("demo", None).await.unwrap();
    let context = store.find_or_create_context("demo", "qa", None).await.unwrap();
    let run = store.create_run(new_run(context.eval_name.id, 2)).await.unwrap();

    let run = store.update_run_progress(run.id, 5).await.unwrap();
    assert_eq!(run.completed_items, 2);
}

#[tokio::test]
async fn test_terminal_status_is_set_once() {
    let store = InMemoryEvalStore::new();
    store.create_project("demo", None).await.unwrap();
    let context = store.find_or_create_context("demo", "qa", None).await.unwrap();
    let run = store.create_run(new_run(context.eval_name.id, 1)).await.unwrap();

    store.fail_run(run.id).await.unwrap();
    let err = store.complete_run(run.id).await.unwrap_err();

    assert!(matches!(err, CoreError::InvalidState(_)));
    assert_eq!(store.get_run(run.id).await.unwrap().status, RunStatus::Failed);
}

#[tokio::test]
async fn test_unknown_run_is_not_found() {
    let store = InMemoryEvalStore::new();

    assert!(store.fail_run(EvalRunId::new()).await.unwrap_err().is_not_found());
    assert!(store
        .update_run_progress(EvalRunId::new(), 1)
        .await
        .unwrap_err()
        .is_not_found());
}

// ===== Result Tests =====

#[tokio::test]
async fn test_bulk_create_and_list_results() {
    let store = InMemoryEvalStore::new();
    store.create_project("demo", None).await.unwrap();
    let context = store.find_or_create_context("demo", "qa", None).await.unwrap();
    let run = store.create_run(new_run(context.eval_name.id, 4)).await.unwrap();

    let created = store
        .bulk_create_results(result_rows(run.id, [3, 1, 0, 2]))
        .await
        .unwrap();
    assert_eq!(created.len(), 4);

    let listed = store.list_results(run.id, &ResultQuery::default()).await;
    let indices: Vec<u32> = listed.iter().map(|result| result.item_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);

    let page = store
        .list_results(run.id, &ResultQuery { limit: 2, offset: 1 })
        .await;
    let indices: Vec<u32> = page.iter().map(|result| result.item_index).collect();
    assert_eq!(indices, vec![1, 2]);
}

#[tokio::test]
async fn test_bulk_create_empty_is_noop() {
    let store = InMemoryEvalStore::new();
    let created = store.bulk_create_results(Vec::new()).await.unwrap();
    assert!(created.is_empty());
}

#[tokio::test]
async fn test_bulk_create_unknown_run_fails() {
    let store = InMemoryEvalStore::new();
    let err = store
        .bulk_create_results(result_rows(EvalRunId::new(), [0]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_runs_filters_and_orders() {
    let store = InMemoryEvalStore::new();
    store.create_project("demo", None).await.unwrap();
    let context = store.find_or_create_context("demo", "qa", None).await.unwrap();

    let first = store.create_run(new_run(context.eval_name.id, 1)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = store.create_run(new_run(context.eval_name.id, 1)).await.unwrap();
    store.complete_run(first.id).await.unwrap();

    let newest = store.list_runs(context.eval_name.id, &RunQuery::default()).await;
    assert_eq!(newest.iter().map(|run| run.id).collect::<Vec<_>>(), vec![second.id, first.id]);

    let oldest = store
        .list_runs(context.eval_name.id, &RunQuery::default().with_order(RunOrder::Oldest))
        .await;
    assert_eq!(oldest[0].id, first.id);

    let completed = store
        .list_runs(
            context.eval_name.id,
            &RunQuery::default().with_status(RunStatus::Completed),
        )
        .await;
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, first.id);
}
