mod common;

use catalog_sync::shared::config::CommitMode;
use catalog_sync::usecases::u508_sync_catalog::{
    AnalyzeOptions, ChangeFilter, SyncError, WatchOutcome,
};
use common::{feed, wait_until, StubService, StubState, POLL_INTERVAL};
use contracts::usecases::u508_sync_catalog::{JobStatus, SyncProgress};
use std::sync::{Arc, Mutex};

async fn service() -> StubService {
    StubService::start(StubState {
        snapshot: common::catalog(),
        ..Default::default()
    })
    .await
}

fn collector() -> (
    Arc<Mutex<Vec<SyncProgress>>>,
    impl FnMut(SyncProgress) + Send + 'static,
) {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    (updates, move |p: SyncProgress| sink.lock().unwrap().push(p))
}

#[tokio::test]
async fn test_client_driven_commit_runs_job_to_completion() {
    let stub = service().await;
    let executor = stub.executor(CommitMode::ClientDriven);

    let analysis = executor
        .analyze(&feed(), &AnalyzeOptions::default())
        .await
        .unwrap();
    assert_eq!(analysis.summary.to_update, 5);
    assert_eq!(analysis.summary.unchanged, 1);
    assert_eq!(analysis.summary.not_found, 1);

    let changes = ChangeFilter::All.select(&analysis);
    let (updates, on_update) = collector();
    let report = executor.commit(&changes, on_update).await.unwrap();

    assert_eq!(report.job.job_id, "J1");
    match &report.outcome {
        WatchOutcome::Completed(status) => {
            assert_eq!((status.completed_batches, status.total_batches), (3, 3));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(stub.chunk_calls().len(), 3);

    let updates = updates.lock().unwrap().clone();
    let last = updates.last().unwrap();
    assert_eq!(last.status, JobStatus::Completed);
    assert_eq!(last.percent, 100.0);
    assert_eq!(updates.iter().filter(|p| p.is_terminal()).count(), 1);

    // polling stops right after the completed status
    let calls = stub.status_calls();
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(stub.status_calls(), calls);
}

#[tokio::test]
async fn test_server_driven_commit_only_polls() {
    let stub = service().await;
    stub.with_state(|s| s.auto_advance = true);
    let executor = stub.executor(CommitMode::ServerDriven);

    let analysis = executor
        .analyze(&feed(), &AnalyzeOptions::default())
        .await
        .unwrap();
    let report = executor
        .commit(&ChangeFilter::All.select(&analysis), |_| {})
        .await
        .unwrap();

    assert!(matches!(report.outcome, WatchOutcome::Completed(_)));
    assert!(stub.chunk_calls().is_empty());
    // each status call advances one batch: three polls reach completed
    assert_eq!(stub.status_calls(), 3);
}

#[tokio::test]
async fn test_filtered_commit_sends_only_selected_changes() {
    let stub = service().await;
    let executor = stub.executor(CommitMode::ClientDriven);

    let analysis = executor
        .analyze(&feed(), &AnalyzeOptions::default())
        .await
        .unwrap();
    let price_changes = ChangeFilter::Price.select(&analysis);
    assert_eq!(price_changes.len(), 3);

    executor.commit(&price_changes, |_| {}).await.unwrap();

    let created = stub.with_state(|s| s.created_rows[0].clone());
    let ids: Vec<&str> = created.iter().map(|r| r.article_id.as_str()).collect();
    assert_eq!(ids, vec!["1001", "1003", "1005"]);
}

#[tokio::test]
async fn test_commit_chunk_failure_stops_watch() {
    let stub = service().await;
    stub.with_state(|s| s.fail_chunk = Some(2));
    let executor = stub.executor(CommitMode::ClientDriven);

    let analysis = executor
        .analyze(&feed(), &AnalyzeOptions::default())
        .await
        .unwrap();
    let err = executor
        .commit(&ChangeFilter::All.select(&analysis), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::ChunkFailed {
            batch_number: 2,
            completed_batches: 2,
            ..
        }
    ));

    tokio::time::sleep(POLL_INTERVAL * 2).await;
    let calls = stub.status_calls();
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(stub.status_calls(), calls);

    // retry later: resume applies the remaining batch
    stub.with_state(|s| s.fail_chunk = None);
    let outcome = executor.resume("J1", |_| {}).await.unwrap();
    assert!(matches!(outcome, WatchOutcome::Completed(_)));
    assert_eq!(stub.job("J1").unwrap().applied.len(), 3);
}

#[tokio::test]
async fn test_empty_change_set_never_reaches_service() {
    let stub = service().await;
    let executor = stub.executor(CommitMode::ClientDriven);

    let err = executor.commit(&[], |_| {}).await.unwrap_err();

    assert!(matches!(err, SyncError::JobCreation { source: None, .. }));
    assert!(stub.with_state(|s| s.created_rows.is_empty()));
    assert_eq!(stub.status_calls(), 0);
}

#[tokio::test]
async fn test_watch_cancel_stops_polling() {
    let stub = service().await;
    stub.insert_job("J3", 4, &[1], JobStatus::Processing);
    let executor = stub.executor(CommitMode::ServerDriven);

    let (updates, on_update) = collector();
    let handle = executor.watch("J3", on_update);
    wait_until(|| stub.status_calls() >= 2).await;

    handle.cancel();
    let outcome = handle.finished().await.unwrap();

    assert_eq!(outcome, WatchOutcome::Cancelled);
    let calls = stub.status_calls();
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(stub.status_calls(), calls);
    assert!(updates.lock().unwrap().iter().all(|p| !p.is_terminal()));
}

#[tokio::test]
async fn test_watch_surfaces_failed_job() {
    let stub = service().await;
    stub.insert_job("J4", 2, &[0], JobStatus::Processing);
    let executor = stub.executor(CommitMode::ServerDriven);

    let (updates, on_update) = collector();
    let handle = executor.watch("J4", on_update);
    wait_until(|| stub.status_calls() >= 1).await;
    stub.with_state(|s| {
        if let Some(job) = s.jobs.get_mut("J4") {
            job.status = JobStatus::Failed;
            job.error = Some("price list archived".to_string());
        }
    });

    let err = handle.finished().await.unwrap_err();

    assert!(matches!(err, SyncError::JobFailed { ref job_id, .. } if job_id == "J4"));
    let updates = updates.lock().unwrap();
    assert_eq!(updates.iter().filter(|p| p.is_terminal()).count(), 1);
    assert_eq!(
        updates.last().unwrap().error.as_deref(),
        Some("price list archived")
    );
}
