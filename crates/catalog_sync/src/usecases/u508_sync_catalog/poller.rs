//! Опрос статуса задания импорта до терминального состояния.
//!
//! Один цикл: запрос статуса -> обновление UI -> пауза -> следующий запрос.
//! Запросы не перекрываются, интервал постоянный (без backoff).

use async_trait::async_trait;
use contracts::usecases::u508_sync_catalog::{JobStatus, JobStatusSnapshot, SyncProgress};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::error::SyncError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Источник статуса задания (в проде - HTTP-клиент сервиса каталога)
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn get_status(&self, job_id: &str) -> Result<JobStatusSnapshot, SyncError>;
}

/// Ожидание между циклами опроса; в тестах подменяется, чтобы не ждать реальное время
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Чем закончилось наблюдение за заданием
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Completed(JobStatusSnapshot),
    Cancelled,
}

/// Handle of a running watch; `cancel` stops polling before the next request.
/// Dropping the handle cancels the watch as well.
pub struct WatchHandle {
    job_id: String,
    cancel: CancellationToken,
    task: JoinHandle<Result<WatchOutcome, SyncError>>,
    _cancel_on_drop: DropGuard,
}

impl WatchHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn finished(self) -> Result<WatchOutcome, SyncError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(SyncError::Watcher {
                job_id: self.job_id,
                message: e.to_string(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct ProgressPoller {
    source: Arc<dyn JobStatusSource>,
    scheduler: Arc<dyn Scheduler>,
    interval: Duration,
}

impl ProgressPoller {
    pub fn new(
        source: Arc<dyn JobStatusSource>,
        scheduler: Arc<dyn Scheduler>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            scheduler,
            interval,
        }
    }

    pub fn with_tokio(source: Arc<dyn JobStatusSource>, interval: Duration) -> Self {
        Self::new(source, Arc::new(TokioScheduler), interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Запускает фоновый опрос; `on_update` получает каждый наблюдаемый статус,
    /// терминальный - ровно один раз.
    pub fn watch<F>(&self, job_id: impl Into<String>, on_update: F) -> WatchHandle
    where
        F: FnMut(SyncProgress) + Send + 'static,
    {
        let job_id = job_id.into();
        let cancel = CancellationToken::new();

        let poller = self.clone();
        let task_job_id = job_id.clone();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            poller.run(&task_job_id, &task_cancel, on_update).await
        });

        WatchHandle {
            job_id,
            _cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
            task,
        }
    }

    /// Цикл опроса в текущей задаче
    pub async fn run<F>(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
        mut on_update: F,
    ) -> Result<WatchOutcome, SyncError>
    where
        F: FnMut(SyncProgress) + Send,
    {
        let mut last: Option<JobStatusSnapshot> = None;
        let mut polls = 0u32;

        loop {
            if cancel.is_cancelled() {
                tracing::info!("Watch of job {} cancelled after {} polls", job_id, polls);
                return Ok(WatchOutcome::Cancelled);
            }

            let snapshot = match self.source.get_status(job_id).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::error!("Status poll for job {} failed: {}", job_id, e);
                    return Err(e);
                }
            };
            polls += 1;

            if cancel.is_cancelled() {
                tracing::info!(
                    "Watch of job {} cancelled while a poll was in flight, response discarded",
                    job_id
                );
                return Ok(WatchOutcome::Cancelled);
            }

            warn_on_irregular_transition(job_id, last.as_ref(), &snapshot);
            on_update(SyncProgress::from_snapshot(job_id, &snapshot));

            match snapshot.status {
                JobStatus::Completed => {
                    tracing::info!(
                        "Job {} completed: {}/{} batches, {} polls",
                        job_id,
                        snapshot.completed_batches,
                        snapshot.total_batches,
                        polls
                    );
                    return Ok(WatchOutcome::Completed(snapshot));
                }
                JobStatus::Failed => {
                    let message = snapshot.error.clone().unwrap_or_default();
                    tracing::error!("Job {} failed: {}", job_id, message);
                    return Err(SyncError::JobFailed {
                        job_id: job_id.to_string(),
                        message,
                        completed_batches: snapshot.completed_batches,
                        total_batches: snapshot.total_batches,
                    });
                }
                JobStatus::Created | JobStatus::Processing => {}
            }

            last = Some(snapshot);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Watch of job {} cancelled after {} polls", job_id, polls);
                    return Ok(WatchOutcome::Cancelled);
                }
                _ = self.scheduler.sleep(self.interval) => {}
            }
        }
    }
}

fn warn_on_irregular_transition(
    job_id: &str,
    previous: Option<&JobStatusSnapshot>,
    current: &JobStatusSnapshot,
) {
    let Some(previous) = previous else {
        return;
    };
    if !previous.status.can_transition_to(current.status) {
        tracing::warn!(
            "Job {}: unexpected status transition {} -> {}",
            job_id,
            previous.status,
            current.status
        );
    }
    if current.completed_batches < previous.completed_batches {
        tracing::warn!(
            "Job {}: completedBatches went backwards ({} -> {})",
            job_id,
            previous.completed_batches,
            current.completed_batches
        );
    }
}
