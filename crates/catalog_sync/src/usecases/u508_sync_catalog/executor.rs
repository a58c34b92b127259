use super::{
    error::SyncError,
    orchestrator::BatchJobOrchestrator,
    poller::{ProgressPoller, WatchHandle, WatchOutcome},
    reconciliation::{self, AnalyzeOptions},
};
use crate::shared::config::{CommitMode, SyncConfig};
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u508_sync_catalog::{
    AnalysisResult, ImportRow, JobHandle, JobStatusSnapshot, SyncCatalog, SyncProgress, UpdateItem,
};
use std::sync::Arc;
use uuid::Uuid;

/// Какие изменения из корзины "к обновлению" применять
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ChangeFilter {
    #[default]
    All,
    Price,
    Stock,
}

impl ChangeFilter {
    pub fn matches(self, item: &UpdateItem) -> bool {
        match self {
            ChangeFilter::All => true,
            ChangeFilter::Price => item.changes.price.is_some(),
            ChangeFilter::Stock => item.changes.stock.is_some(),
        }
    }

    /// Оставляет в строке только выбранное изменение; второе поле возвращается
    /// к значению каталога, чтобы задание его не трогало.
    pub fn apply(self, item: &UpdateItem) -> Option<UpdateItem> {
        if !self.matches(item) {
            return None;
        }
        let mut item = item.clone();
        match self {
            ChangeFilter::All => {}
            ChangeFilter::Price => {
                if let Some(delta) = item.changes.stock.take() {
                    item.stock = delta.from;
                }
            }
            ChangeFilter::Stock => {
                if let Some(delta) = item.changes.price.take() {
                    item.list_price = delta.from;
                }
            }
        }
        Some(item)
    }

    pub fn select(self, analysis: &AnalysisResult) -> Vec<UpdateItem> {
        analysis
            .to_update
            .iter()
            .filter_map(|item| self.apply(item))
            .collect()
    }
}

/// Итог применения изменений
#[derive(Debug)]
pub struct CommitReport {
    pub session_id: String,
    pub job: JobHandle,
    pub outcome: WatchOutcome,
}

/// Executor для UseCase синхронизации каталога
pub struct SyncExecutor {
    orchestrator: Arc<BatchJobOrchestrator>,
    poller: ProgressPoller,
    commit_mode: CommitMode,
}

impl SyncExecutor {
    pub fn new(orchestrator: Arc<BatchJobOrchestrator>, sync: &SyncConfig) -> Self {
        let poller = ProgressPoller::with_tokio(orchestrator.clone(), sync.poll_interval());
        Self::with_poller(orchestrator, poller, sync.commit_mode)
    }

    pub fn with_poller(
        orchestrator: Arc<BatchJobOrchestrator>,
        poller: ProgressPoller,
        commit_mode: CommitMode,
    ) -> Self {
        Self {
            orchestrator,
            poller,
            commit_mode,
        }
    }

    pub fn orchestrator(&self) -> &BatchJobOrchestrator {
        &self.orchestrator
    }

    pub fn commit_mode(&self) -> CommitMode {
        self.commit_mode
    }

    /// Загрузить снимок каталога и сверить с ним выгрузку
    pub async fn analyze(
        &self,
        rows: &[ImportRow],
        options: &AnalyzeOptions,
    ) -> Result<AnalysisResult, SyncError> {
        let session_id = Uuid::new_v4().to_string();
        tracing::info!(
            "{} analysis session {}: {} rows",
            SyncCatalog::banner(),
            session_id,
            rows.len()
        );

        let snapshot = self.orchestrator.fetch_snapshot().await?;
        tracing::info!(
            "Session {}: catalog snapshot has {} entries",
            session_id,
            snapshot.len()
        );

        Ok(reconciliation::analyze_with(rows, &snapshot, options))
    }

    /// Создать задание импорта и довести его до терминального статуса
    pub async fn commit<F>(
        &self,
        changes: &[UpdateItem],
        on_update: F,
    ) -> Result<CommitReport, SyncError>
    where
        F: FnMut(SyncProgress) + Send + 'static,
    {
        let session_id = Uuid::new_v4().to_string();
        tracing::info!(
            "{} commit session {}: {} rows, mode {:?}",
            SyncCatalog::banner(),
            session_id,
            changes.len(),
            self.commit_mode
        );

        let job = self.orchestrator.create_job(changes).await?;
        let watch = self.poller.watch(job.job_id.clone(), on_update);

        if self.commit_mode == CommitMode::ClientDriven {
            self.drive_or_cancel(&job, 0, &watch).await?;
        }

        let outcome = watch.finished().await?;
        tracing::info!("Session {}: job {} finished: {:?}", session_id, job.job_id, outcome);

        Ok(CommitReport {
            session_id,
            job,
            outcome,
        })
    }

    /// Наблюдать за уже созданным заданием
    pub fn watch<F>(&self, job_id: &str, on_update: F) -> WatchHandle
    where
        F: FnMut(SyncProgress) + Send + 'static,
    {
        self.poller.watch(job_id, on_update)
    }

    pub async fn status(&self, job_id: &str) -> Result<JobStatusSnapshot, SyncError> {
        self.orchestrator.get_status(job_id).await
    }

    /// Продолжить прерванное задание с первого непримененного пакета
    pub async fn resume<F>(&self, job_id: &str, on_update: F) -> Result<WatchOutcome, SyncError>
    where
        F: FnMut(SyncProgress) + Send + 'static,
    {
        let watch = self.poller.watch(job_id, on_update);

        if self.commit_mode == CommitMode::ClientDriven {
            if let Err(e) = self.orchestrator.resume(job_id).await {
                watch.cancel();
                let _ = watch.finished().await;
                return Err(e);
            }
        }

        watch.finished().await
    }

    async fn drive_or_cancel(
        &self,
        job: &JobHandle,
        start_batch: u32,
        watch: &WatchHandle,
    ) -> Result<(), SyncError> {
        match self.orchestrator.drive_chunks(job, start_batch).await {
            Ok(completed) => {
                tracing::debug!("Job {}: {} batches driven", job.job_id, completed);
                Ok(())
            }
            Err(e) => {
                watch.cancel();
                Err(e)
            }
        }
    }
}
