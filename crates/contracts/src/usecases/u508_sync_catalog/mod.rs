pub mod analysis;
pub mod progress;
pub mod request;
pub mod response;
pub mod snapshot;

pub use analysis::{AnalysisResult, AnalysisSummary, MatchKey, RowOutcome, UpdateItem};
pub use progress::{JobStatus, JobStatusSnapshot, SyncProgress};
pub use request::{ImportRow, ProcessChunkRequest, RawNumeric};
pub use response::{ChunkResult, CreateJobResponse, JobHandle};
pub use snapshot::CatalogSnapshotEntry;

use crate::usecases::common::UseCaseMetadata;

pub struct SyncCatalog;

impl UseCaseMetadata for SyncCatalog {
    fn usecase_index() -> &'static str {
        "u508"
    }

    fn usecase_name() -> &'static str {
        "sync_catalog"
    }

    fn display_name() -> &'static str {
        "Синхронизация цен и остатков каталога"
    }

    fn description() -> &'static str {
        "Сверка загруженной выгрузки цен/остатков с каталогом и пакетное применение изменений"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_names() {
        assert_eq!(SyncCatalog::full_name(), "u508_sync_catalog");
        assert!(SyncCatalog::banner().starts_with("[u508] "));
    }
}
