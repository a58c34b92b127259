use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog_service: CatalogServiceConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Адрес и параметры сервиса каталога, выполняющего задания импорта
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogServiceConfig {
    pub base_url: String,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    #[serde(default = "default_create_job_path")]
    pub create_job_path: String,
    #[serde(default = "default_process_chunk_path")]
    pub process_chunk_path: String,
    #[serde(default = "default_job_status_path")]
    pub job_status_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Максимум строк в одном задании; больше - отказ до отправки запроса
    #[serde(default = "default_max_job_rows")]
    pub max_job_rows: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub commit_mode: CommitMode,
    #[serde(default)]
    pub ignore_case: bool,
}

/// Кто продвигает пакеты задания
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Клиент последовательно вызывает process-chunk
    #[default]
    ClientDriven,
    /// Сервис обрабатывает пакеты сам, клиент только опрашивает статус
    ServerDriven,
}

fn default_snapshot_path() -> String {
    "/api/catalog/snapshot".to_string()
}

fn default_create_job_path() -> String {
    "/api/catalog/import-jobs".to_string()
}

fn default_process_chunk_path() -> String {
    "/api/catalog/import-jobs/process-chunk".to_string()
}

fn default_job_status_path() -> String {
    "/api/catalog/import-jobs/status".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_max_job_rows() -> usize {
    50_000
}

fn default_poll_interval_secs() -> u64 {
    5
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            commit_mode: CommitMode::default(),
            ignore_case: false,
        }
    }
}

impl CatalogServiceConfig {
    /// Config pointing at `base_url` with default paths and limits.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            snapshot_path: default_snapshot_path(),
            create_job_path: default_create_job_path(),
            process_chunk_path: default_process_chunk_path(),
            job_status_path: default_job_status_path(),
            request_timeout_secs: default_request_timeout_secs(),
            max_job_rows: default_max_job_rows(),
        }
    }

    /// Полный URL для пути эндпоинта
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[catalog_service]
base_url = "http://localhost:3000"

[sync]
poll_interval_secs = 5
commit_mode = "client_driven"
"#;

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    Ok(config)
}

/// Load configuration from config.toml
///
/// Search order:
/// 1. Explicit path (error if it does not exist)
/// 2. Next to the executable
/// 3. Current working directory
/// 4. Embedded default config
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        tracing::info!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        return parse_config(&contents)
            .with_context(|| format!("invalid config {}", path.display()));
    }

    for candidate in candidate_paths() {
        if candidate.exists() {
            tracing::info!("Loading config from: {}", candidate.display());
            let contents = std::fs::read_to_string(&candidate)
                .with_context(|| format!("cannot read config {}", candidate.display()))?;
            return parse_config(&contents)
                .with_context(|| format!("invalid config {}", candidate.display()));
        }
        tracing::debug!("config.toml not found at: {}", candidate.display());
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            paths.push(exe_dir.join("config.toml"));
        }
    }
    paths.push(PathBuf::from("config.toml"));
    paths
}
