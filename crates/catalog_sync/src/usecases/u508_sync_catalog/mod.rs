pub mod error;
pub mod executor;
pub mod feed_reader;
pub mod normalizer;
pub mod orchestrator;
pub mod poller;
pub mod reconciliation;

pub use error::{SyncError, TransportError};
pub use executor::{ChangeFilter, CommitReport, SyncExecutor};
pub use orchestrator::BatchJobOrchestrator;
pub use poller::{JobStatusSource, ProgressPoller, Scheduler, TokioScheduler, WatchHandle, WatchOutcome};
pub use reconciliation::{analyze, analyze_with, AnalyzeOptions};
