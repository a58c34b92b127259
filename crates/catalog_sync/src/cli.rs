use catalog_sync::usecases::u508_sync_catalog::ChangeFilter;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Catalog price/stock synchronization", long_about = None)]
pub struct Cli {
    /// Path to config.toml (default: next to the executable, then the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override catalog_service.base_url from the config
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare a rows file with the current catalog snapshot
    Analyze {
        #[arg(long)]
        rows: PathBuf,
        /// Write the full analysis result as JSON
        #[arg(long)]
        out: Option<PathBuf>,
        /// Match article ids case-insensitively
        #[arg(long)]
        ignore_case: bool,
    },
    /// Analyze a rows file and apply the changes through an import job
    Commit {
        #[arg(long)]
        rows: PathBuf,
        #[arg(long, value_enum, default_value_t = ChangeFilter::All)]
        only: ChangeFilter,
        #[arg(long)]
        ignore_case: bool,
    },
    /// Print the current status of an import job
    Status {
        #[arg(long)]
        job_id: String,
    },
    /// Poll an import job until it completes (Ctrl+C stops watching)
    Watch {
        #[arg(long)]
        job_id: String,
    },
    /// Apply the remaining batches of an interrupted import job
    Resume {
        #[arg(long)]
        job_id: String,
    },
}
