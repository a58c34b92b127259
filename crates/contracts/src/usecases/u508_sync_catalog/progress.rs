use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Статус задания импорта на сервере
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Задание создано, пакеты ещё не обрабатывались
    Created,
    /// Идёт обработка пакетов
    Processing,
    /// Все пакеты применены
    Completed,
    /// Задание провалено
    Failed,
}

impl JobStatus {
    /// Терминальные статусы больше не меняются
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// created -> processing -> completed | failed; processing re-entrant.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Created, Created | Processing)
                | (Processing, Processing | Completed | Failed)
                | (Completed, Completed)
                | (Failed, Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Created => "created",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Состояние задания, как его отдаёт сервис
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusSnapshot {
    pub status: JobStatus,
    pub completed_batches: u32,
    pub total_batches: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ответ GET статуса задания
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job: JobStatusSnapshot,
}

/// Прогресс применения для отображения в UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgress {
    pub job_id: String,
    pub status: JobStatus,
    pub completed_batches: u32,
    pub total_batches: u32,
    /// 0..=100
    pub percent: f64,
    pub error: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl SyncProgress {
    pub fn from_snapshot(job_id: &str, snapshot: &JobStatusSnapshot) -> Self {
        let percent = if snapshot.total_batches == 0 {
            if snapshot.status == JobStatus::Completed {
                100.0
            } else {
                0.0
            }
        } else {
            let done = snapshot.completed_batches.min(snapshot.total_batches);
            f64::from(done) * 100.0 / f64::from(snapshot.total_batches)
        };

        Self {
            job_id: job_id.to_string(),
            status: snapshot.status,
            completed_batches: snapshot.completed_batches,
            total_batches: snapshot.total_batches,
            percent,
            error: snapshot.error.clone(),
            observed_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
