use async_trait::async_trait;
use contracts::usecases::u508_sync_catalog::progress::{JobStatus, JobStatusResponse};
use contracts::usecases::u508_sync_catalog::response::ErrorResponse;
use contracts::usecases::u508_sync_catalog::snapshot::SnapshotResponse;
use contracts::usecases::u508_sync_catalog::{
    CatalogSnapshotEntry, ChunkResult, CreateJobResponse, ImportRow, JobHandle, JobStatusSnapshot,
    ProcessChunkRequest, UpdateItem,
};
use serde::de::DeserializeOwned;

use super::error::{SyncError, TransportError};
use super::poller::JobStatusSource;
use crate::shared::config::CatalogServiceConfig;

const OP_SNAPSHOT: &str = "GET catalog snapshot";
const OP_CREATE_JOB: &str = "POST create import job";
const OP_PROCESS_CHUNK: &str = "POST process chunk";
const OP_JOB_STATUS: &str = "GET job status";

/// Сколько символов тела ответа попадает в текст ошибки
const MAX_ERROR_BODY: usize = 500;

/// HTTP-клиент сервиса каталога: создание задания импорта, применение пакетов, статус.
///
/// Каждый экземпляр несёт свой адрес сервиса; глобального состояния нет.
pub struct BatchJobOrchestrator {
    client: reqwest::Client,
    config: CatalogServiceConfig,
}

impl BatchJobOrchestrator {
    pub fn new(config: CatalogServiceConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .no_proxy()
            .build()
            .map_err(|e| SyncError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CatalogServiceConfig {
        &self.config
    }

    /// Снимок каталога, читается один раз на анализ
    pub async fn fetch_snapshot(&self) -> Result<Vec<CatalogSnapshotEntry>, SyncError> {
        let url = self.config.url(&self.config.snapshot_path);
        tracing::info!("Catalog API: GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| network_error(OP_SNAPSHOT, &url, e))?;

        let body: SnapshotResponse = read_json(OP_SNAPSHOT, &url, response).await?;
        if !body.success {
            return Err(TransportError::Unsuccessful {
                operation: OP_SNAPSHOT,
                url,
            }
            .into());
        }

        tracing::info!("Catalog API: got {} snapshot entries", body.data.len());
        Ok(body.data)
    }

    /// Создаёт задание импорта из принятых изменений. Повторно не вызывается.
    pub async fn create_job(&self, changes: &[UpdateItem]) -> Result<JobHandle, SyncError> {
        if changes.is_empty() {
            return Err(SyncError::JobCreation {
                reason: "change set is empty".to_string(),
                source: None,
            });
        }
        if changes.len() > self.config.max_job_rows {
            return Err(SyncError::JobCreation {
                reason: format!(
                    "change set has {} rows, limit is {}",
                    changes.len(),
                    self.config.max_job_rows
                ),
                source: None,
            });
        }

        let rows: Vec<ImportRow> = changes.iter().map(UpdateItem::to_import_row).collect();
        let url = self.config.url(&self.config.create_job_path);
        tracing::info!("Catalog API: POST {} ({} rows)", url, rows.len());

        let response = self
            .client
            .post(&url)
            .json(&rows)
            .send()
            .await
            .map_err(|e| SyncError::job_creation(network_error(OP_CREATE_JOB, &url, e)))?;

        let created: CreateJobResponse = read_json(OP_CREATE_JOB, &url, response)
            .await
            .map_err(SyncError::job_creation)?;

        if created.job_id.trim().is_empty() {
            return Err(SyncError::job_creation(TransportError::MalformedBody {
                operation: OP_CREATE_JOB,
                url,
                message: "empty jobId".to_string(),
            }));
        }

        tracing::info!(
            "Import job {} created: {} batches",
            created.job_id,
            created.total_batches
        );
        Ok(created.into())
    }

    /// Применяет один пакет. Повторный вызов для той же пары (job, batch) допустим:
    /// идемпотентность обеспечивает сервис.
    pub async fn process_chunk(
        &self,
        job_id: &str,
        batch_number: u32,
    ) -> Result<ChunkResult, SyncError> {
        Ok(self.send_chunk(job_id, batch_number).await?)
    }

    pub async fn get_status(&self, job_id: &str) -> Result<JobStatusSnapshot, SyncError> {
        let url = format!(
            "{}?jobId={}",
            self.config.url(&self.config.job_status_path),
            urlencoding::encode(job_id)
        );
        tracing::debug!("Catalog API: GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| network_error(OP_JOB_STATUS, &url, e))?;

        let body: JobStatusResponse = read_json(OP_JOB_STATUS, &url, response).await?;
        Ok(body.job)
    }

    /// Последовательно отправляет пакеты `start_batch..total_batches`.
    /// Возвращает число завершённых пакетов; на первом сбое останавливается.
    pub async fn drive_chunks(&self, handle: &JobHandle, start_batch: u32) -> Result<u32, SyncError> {
        let mut completed = start_batch.min(handle.total_batches);

        for batch_number in start_batch..handle.total_batches {
            match self.send_chunk(&handle.job_id, batch_number).await {
                Ok(result) => {
                    completed += 1;
                    if result.already_applied {
                        tracing::debug!(
                            "Job {} batch {} was already applied",
                            handle.job_id,
                            batch_number
                        );
                    }
                    tracing::info!(
                        "Job {}: batch {}/{} applied",
                        handle.job_id,
                        completed,
                        handle.total_batches
                    );
                }
                Err(source) => {
                    tracing::error!(
                        "Job {}: batch {} failed: {}",
                        handle.job_id,
                        batch_number,
                        source
                    );
                    return Err(SyncError::ChunkFailed {
                        job_id: handle.job_id.clone(),
                        batch_number,
                        completed_batches: completed,
                        source,
                    });
                }
            }
        }

        Ok(completed)
    }

    /// Продолжает прерванное задание с пакета `completedBatches`, который сообщает сервис.
    pub async fn resume(&self, job_id: &str) -> Result<JobStatusSnapshot, SyncError> {
        let status = self.get_status(job_id).await?;

        match status.status {
            JobStatus::Completed => {
                tracing::info!("Job {} is already completed", job_id);
                return Ok(status);
            }
            JobStatus::Failed => {
                return Err(SyncError::JobFailed {
                    job_id: job_id.to_string(),
                    message: status.error.clone().unwrap_or_default(),
                    completed_batches: status.completed_batches,
                    total_batches: status.total_batches,
                });
            }
            JobStatus::Created | JobStatus::Processing => {}
        }

        tracing::info!(
            "Resuming job {} from batch {} of {}",
            job_id,
            status.completed_batches,
            status.total_batches
        );
        let handle = JobHandle {
            job_id: job_id.to_string(),
            total_batches: status.total_batches,
        };
        self.drive_chunks(&handle, status.completed_batches).await?;

        let status = self.get_status(job_id).await?;
        if status.status.is_terminal() {
            return Ok(status);
        }

        // completedBatches is a count, not a prefix: an earlier batch may still be
        // missing. Chunks are idempotent, so one full pass closes any gap.
        tracing::warn!(
            "Job {} is still {} ({}/{} batches) after resume, re-sending all batches",
            job_id,
            status.status,
            status.completed_batches,
            status.total_batches
        );
        self.drive_chunks(&handle, 0).await?;

        let status = self.get_status(job_id).await?;
        if !status.status.is_terminal() {
            tracing::warn!(
                "Job {} is still {} after a full pass ({}/{} batches)",
                job_id,
                status.status,
                status.completed_batches,
                status.total_batches
            );
        }
        Ok(status)
    }

    async fn send_chunk(&self, job_id: &str, batch_number: u32) -> Result<ChunkResult, TransportError> {
        let url = self.config.url(&self.config.process_chunk_path);
        let request = ProcessChunkRequest {
            job_id: job_id.to_string(),
            batch_number,
        };
        tracing::debug!("Catalog API: POST {} (job {}, batch {})", url, job_id, batch_number);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| network_error(OP_PROCESS_CHUNK, &url, e))?;

        read_json(OP_PROCESS_CHUNK, &url, response).await
    }
}

#[async_trait]
impl JobStatusSource for BatchJobOrchestrator {
    async fn get_status(&self, job_id: &str) -> Result<JobStatusSnapshot, SyncError> {
        BatchJobOrchestrator::get_status(self, job_id).await
    }
}

fn network_error(operation: &'static str, url: &str, e: reqwest::Error) -> TransportError {
    TransportError::Network {
        operation,
        url: url.to_string(),
        message: e.to_string(),
    }
}

/// Non-2xx -> `Status` (with `{message}` when the body has one), bad JSON -> `MalformedBody`.
async fn read_json<T: DeserializeOwned>(
    operation: &'static str,
    url: &str,
    response: reqwest::Response,
) -> Result<T, TransportError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| network_error(operation, url, e))?;

    if !status.is_success() {
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error) => error.message,
            Err(_) if body.trim().is_empty() => {
                status.canonical_reason().unwrap_or("no response body").to_string()
            }
            Err(_) => truncate(&body, MAX_ERROR_BODY),
        };
        return Err(TransportError::Status {
            operation,
            url: url.to_string(),
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| TransportError::MalformedBody {
        operation,
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
