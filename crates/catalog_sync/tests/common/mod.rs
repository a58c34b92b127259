#![allow(dead_code)]

//! In-process stub of the catalog service import-job API.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use catalog_sync::shared::config::{CatalogServiceConfig, CommitMode};
use catalog_sync::usecases::u508_sync_catalog::{BatchJobOrchestrator, ProgressPoller, SyncExecutor};
use contracts::usecases::u508_sync_catalog::progress::JobStatusResponse;
use contracts::usecases::u508_sync_catalog::response::ErrorResponse;
use contracts::usecases::u508_sync_catalog::snapshot::SnapshotResponse;
use contracts::usecases::u508_sync_catalog::{
    CatalogSnapshotEntry, ChunkResult, CreateJobResponse, ImportRow, JobStatus, JobStatusSnapshot,
    ProcessChunkRequest,
};
use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct StubJob {
    pub total_batches: u32,
    pub applied: BTreeSet<u32>,
    pub status: JobStatus,
    pub error: Option<String>,
}

impl StubJob {
    fn snapshot(&self) -> JobStatusSnapshot {
        JobStatusSnapshot {
            status: self.status,
            completed_batches: self.applied.len() as u32,
            total_batches: self.total_batches,
            error: self.error.clone(),
        }
    }

    fn apply(&mut self, batch_number: u32) -> bool {
        let fresh = self.applied.insert(batch_number);
        self.status = if self.applied.len() as u32 >= self.total_batches {
            JobStatus::Completed
        } else {
            JobStatus::Processing
        };
        fresh
    }
}

#[derive(Debug)]
pub struct StubState {
    pub snapshot: Vec<CatalogSnapshotEntry>,
    pub snapshot_success: bool,
    /// Raw 200 body returned by the snapshot endpoint instead of the catalog
    pub snapshot_body: Option<String>,
    pub batch_size: usize,
    pub jobs: HashMap<String, StubJob>,
    pub next_job: u32,
    /// (status, raw body) returned by the create endpoint
    pub fail_create: Option<(u16, String)>,
    /// Batch that answers 500 on process-chunk
    pub fail_chunk: Option<u32>,
    pub malformed_status: bool,
    /// Each status request applies the next batch (server-driven jobs)
    pub auto_advance: bool,
    pub created_rows: Vec<Vec<ImportRow>>,
    pub chunk_calls: Vec<(String, u32)>,
    pub status_calls: usize,
}

impl Default for StubState {
    fn default() -> Self {
        Self {
            snapshot: Vec::new(),
            snapshot_success: true,
            snapshot_body: None,
            batch_size: 2,
            jobs: HashMap::new(),
            next_job: 1,
            fail_create: None,
            fail_chunk: None,
            malformed_status: false,
            auto_advance: false,
            created_rows: Vec::new(),
            chunk_calls: Vec::new(),
            status_calls: 0,
        }
    }
}

type Shared = Arc<Mutex<StubState>>;

pub struct StubService {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl StubService {
    pub async fn start(state: StubState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = Router::new()
            .route("/api/catalog/snapshot", get(snapshot))
            .route("/api/catalog/import-jobs", post(create_job))
            .route("/api/catalog/import-jobs/process-chunk", post(process_chunk))
            .route("/api/catalog/import-jobs/status", get(job_status))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> CatalogServiceConfig {
        CatalogServiceConfig::with_base_url(self.base_url())
    }

    pub fn orchestrator(&self) -> Arc<BatchJobOrchestrator> {
        Arc::new(BatchJobOrchestrator::new(self.config()).unwrap())
    }

    pub fn executor(&self, commit_mode: CommitMode) -> SyncExecutor {
        let orchestrator = self.orchestrator();
        let poller = ProgressPoller::with_tokio(orchestrator.clone(), POLL_INTERVAL);
        SyncExecutor::with_poller(orchestrator, poller, commit_mode)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut StubState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn status_calls(&self) -> usize {
        self.with_state(|s| s.status_calls)
    }

    pub fn chunk_calls(&self) -> Vec<(String, u32)> {
        self.with_state(|s| s.chunk_calls.clone())
    }

    pub fn job(&self, job_id: &str) -> Option<StubJob> {
        self.with_state(|s| s.jobs.get(job_id).cloned())
    }

    /// Registers a job directly, bypassing the create endpoint.
    pub fn insert_job(&self, job_id: &str, total_batches: u32, applied: &[u32], status: JobStatus) {
        self.with_state(|s| {
            s.jobs.insert(
                job_id.to_string(),
                StubJob {
                    total_batches,
                    applied: applied.iter().copied().collect(),
                    status,
                    error: None,
                },
            );
        });
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

async fn snapshot(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    if let Some(body) = state.snapshot_body.clone() {
        return (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response();
    }
    Json(SnapshotResponse {
        success: state.snapshot_success,
        data: state.snapshot.clone(),
    })
    .into_response()
}

async fn create_job(State(state): State<Shared>, Json(rows): Json<Vec<ImportRow>>) -> Response {
    let mut state = state.lock().unwrap();

    if let Some((status, body)) = state.fail_create.clone() {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, body).into_response();
    }
    if rows.is_empty() {
        return error(StatusCode::BAD_REQUEST, "no rows");
    }

    let job_id = format!("J{}", state.next_job);
    state.next_job += 1;
    let total_batches = rows.len().div_ceil(state.batch_size) as u32;

    state.jobs.insert(
        job_id.clone(),
        StubJob {
            total_batches,
            applied: BTreeSet::new(),
            status: JobStatus::Created,
            error: None,
        },
    );
    state.created_rows.push(rows);

    Json(CreateJobResponse {
        job_id,
        total_batches,
    })
    .into_response()
}

async fn process_chunk(
    State(state): State<Shared>,
    Json(request): Json<ProcessChunkRequest>,
) -> Response {
    let mut state = state.lock().unwrap();
    state
        .chunk_calls
        .push((request.job_id.clone(), request.batch_number));

    if state.fail_chunk == Some(request.batch_number) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "database is locked");
    }

    let Some(job) = state.jobs.get_mut(&request.job_id) else {
        return error(StatusCode::NOT_FOUND, "job not found");
    };
    if request.batch_number >= job.total_batches {
        return error(StatusCode::BAD_REQUEST, "batch out of range");
    }

    let fresh = job.apply(request.batch_number);
    Json(ChunkResult {
        batch_number: Some(request.batch_number),
        processed: Some(2),
        already_applied: !fresh,
        message: None,
    })
    .into_response()
}

async fn job_status(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.status_calls += 1;

    if state.malformed_status {
        return (StatusCode::OK, "<html>gateway</html>").into_response();
    }

    let auto_advance = state.auto_advance;
    let job_id = params.get("jobId").cloned().unwrap_or_default();
    let Some(job) = state.jobs.get_mut(&job_id) else {
        return error(StatusCode::NOT_FOUND, "job not found");
    };

    if auto_advance && !job.status.is_terminal() {
        let next = (0..job.total_batches).find(|b| !job.applied.contains(b));
        if let Some(next) = next {
            job.apply(next);
        }
    }

    Json(JobStatusResponse { job: job.snapshot() }).into_response()
}

pub fn catalog() -> Vec<CatalogSnapshotEntry> {
    vec![
        CatalogSnapshotEntry::new("1001", "1", 100.0, 5i64),
        CatalogSnapshotEntry::new("1002", "1", 200.0, 0i64),
        CatalogSnapshotEntry::new("1003", "1", 300.0, 7i64),
        CatalogSnapshotEntry::new("1004", "1", 400.0, 1i64),
        CatalogSnapshotEntry::new("1005", "1", 500.0, 3i64),
        CatalogSnapshotEntry::new("1006", "1", 600.0, 9i64),
    ]
}

/// Five changed rows, one unchanged, one unknown article
pub fn feed() -> Vec<ImportRow> {
    vec![
        ImportRow::new("1001", "1", "110,00", 5i64),
        ImportRow::new("1002", "1", 200.0, 4i64),
        ImportRow::new("1003", "1", 350.0, 8i64),
        ImportRow::new("1004", "1", "400", 2i64),
        ImportRow::new("1005", "1", 450.0, 3i64),
        ImportRow::new("1006", "1", 600.0, 9i64),
        ImportRow::new("9999", "1", 1.0, 1i64),
    ]
}

/// Waits (real time) until `cond` holds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
