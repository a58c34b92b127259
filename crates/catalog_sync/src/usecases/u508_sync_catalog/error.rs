use thiserror::Error;

/// Ошибки обмена с сервисом каталога
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("network error on {operation} ({url}): {message}")]
    Network {
        operation: &'static str,
        url: String,
        message: String,
    },

    #[error("HTTP {status} on {operation} ({url}): {message}")]
    Status {
        operation: &'static str,
        url: String,
        status: u16,
        message: String,
    },

    #[error("unexpected response body on {operation} ({url}): {message}")]
    MalformedBody {
        operation: &'static str,
        url: String,
        message: String,
    },

    #[error("{operation} ({url}) reported success=false")]
    Unsuccessful { operation: &'static str, url: String },
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// Задание не создано: пустой/слишком большой набор или отказ сервиса.
    /// До создания задания пакеты не отправляются.
    #[error("import job was not created: {reason}")]
    JobCreation {
        reason: String,
        #[source]
        source: Option<TransportError>,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Пакет не применён; `completed_batches` - сколько пакетов прошло до сбоя
    #[error(
        "batch {batch_number} of import job {job_id} failed ({completed_batches} batches completed)"
    )]
    ChunkFailed {
        job_id: String,
        batch_number: u32,
        completed_batches: u32,
        #[source]
        source: TransportError,
    },

    /// Сервис перевёл задание в статус failed
    #[error("import job {job_id} failed: {message}")]
    JobFailed {
        job_id: String,
        message: String,
        completed_batches: u32,
        total_batches: u32,
    },

    #[error("cannot build HTTP client: {0}")]
    Client(String),

    #[error("status watcher for job {job_id} stopped unexpectedly: {message}")]
    Watcher { job_id: String, message: String },
}

impl SyncError {
    pub(crate) fn job_creation(source: TransportError) -> Self {
        SyncError::JobCreation {
            reason: "catalog service request failed".to_string(),
            source: Some(source),
        }
    }
}
