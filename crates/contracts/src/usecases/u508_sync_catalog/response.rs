use serde::{Deserialize, Serialize};

/// Ответ сервиса на создание задания импорта
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobResponse {
    pub job_id: String,
    pub total_batches: u32,
}

/// Созданное задание импорта, с которым дальше работает клиент
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub job_id: String,
    pub total_batches: u32,
}

impl From<CreateJobResponse> for JobHandle {
    fn from(response: CreateJobResponse) -> Self {
        Self {
            job_id: response.job_id,
            total_batches: response.total_batches,
        }
    }
}

/// Результат обработки пакета. Формат определяет сервис, поэтому все поля необязательны.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkResult {
    #[serde(default)]
    pub batch_number: Option<u32>,
    /// Сколько строк пакета применено
    #[serde(default)]
    pub processed: Option<u32>,
    /// Пакет уже был применён ранее (повторный вызов)
    #[serde(default)]
    pub already_applied: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Тело ответа с ошибкой (не-2xx)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
