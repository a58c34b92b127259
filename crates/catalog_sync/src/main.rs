mod cli;

use anyhow::Context;
use catalog_sync::shared::config::load_config;
use catalog_sync::shared::format::{
    format_number, format_price_delta, format_stock_delta,
};
use catalog_sync::system;
use catalog_sync::usecases::u508_sync_catalog::{
    feed_reader, AnalyzeOptions, BatchJobOrchestrator, SyncExecutor, WatchOutcome,
};
use clap::Parser;
use cli::{Cli, Commands};
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u508_sync_catalog::{AnalysisResult, SyncCatalog, SyncProgress};
use std::sync::Arc;

/// Сколько строк "к обновлению" показывать в сводке
const PREVIEW_ROWS: usize = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = system::tracing::initialize()?;
    tracing::info!("{} started, log file: {}", SyncCatalog::banner(), log_file.display());

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.catalog_service.base_url = base_url;
    }
    tracing::info!("Catalog service: {}", config.catalog_service.base_url);

    let orchestrator = Arc::new(BatchJobOrchestrator::new(config.catalog_service.clone())?);
    let executor = SyncExecutor::new(orchestrator, &config.sync);

    match cli.command {
        Commands::Analyze {
            rows,
            out,
            ignore_case,
        } => {
            let rows = feed_reader::read_rows(&rows)?;
            let options = AnalyzeOptions {
                ignore_case: ignore_case || config.sync.ignore_case,
            };
            let analysis = executor.analyze(&rows, &options).await?;
            print_summary(&analysis);

            if let Some(out) = out {
                let json = serde_json::to_string_pretty(&analysis)?;
                std::fs::write(&out, json)
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                println!("Analysis written to {}", out.display());
            }
        }
        Commands::Commit {
            rows,
            only,
            ignore_case,
        } => {
            let rows = feed_reader::read_rows(&rows)?;
            let options = AnalyzeOptions {
                ignore_case: ignore_case || config.sync.ignore_case,
            };
            let analysis = executor.analyze(&rows, &options).await?;
            print_summary(&analysis);

            let changes = only.select(&analysis);
            if changes.is_empty() {
                println!("Nothing to commit");
                return Ok(());
            }
            println!("Committing {} rows ({:?})", format_number(changes.len()), only);

            let report = executor.commit(&changes, print_progress).await?;
            print_outcome(&report.job.job_id, &report.outcome);
        }
        Commands::Status { job_id } => {
            let status = executor.status(&job_id).await?;
            println!(
                "Job {}: {} ({}/{} batches){}",
                job_id,
                status.status,
                status.completed_batches,
                status.total_batches,
                status
                    .error
                    .map(|e| format!(", error: {}", e))
                    .unwrap_or_default()
            );
        }
        Commands::Watch { job_id } => {
            let handle = executor.watch(&job_id, print_progress);

            let cancel = handle.cancellation_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });

            let outcome = handle.finished().await?;
            print_outcome(&job_id, &outcome);
        }
        Commands::Resume { job_id } => {
            let outcome = executor.resume(&job_id, print_progress).await?;
            print_outcome(&job_id, &outcome);
        }
    }

    Ok(())
}

fn print_summary(analysis: &AnalysisResult) {
    let summary = &analysis.summary;
    println!("{}", SyncCatalog::banner());
    println!("  Total rows:     {}", format_number(summary.total_items));
    println!(
        "  To update:      {} (price: {}, stock: {})",
        format_number(summary.to_update),
        format_number(summary.price_changes),
        format_number(summary.stock_changes)
    );
    println!("  Unchanged:      {}", format_number(summary.unchanged));
    println!("  Not found:      {}", format_number(summary.not_found));
    println!("  Rejected:       {}", format_number(summary.rejected));

    for item in analysis.to_update.iter().take(PREVIEW_ROWS) {
        let mut parts = Vec::new();
        if let Some(price) = &item.changes.price {
            parts.push(format!("price {}", format_price_delta(price)));
        }
        if let Some(stock) = &item.changes.stock {
            parts.push(format!("stock {}", format_stock_delta(stock)));
        }
        println!("    #{} {}: {}", item.row_index + 1, item.key, parts.join(", "));
    }
    if analysis.to_update.len() > PREVIEW_ROWS {
        println!(
            "    ... and {} more",
            format_number(analysis.to_update.len() - PREVIEW_ROWS)
        );
    }

    for item in &analysis.rejected {
        println!("  ! row #{} {}: {}", item.row_index + 1, item.key, item.reason);
    }
}

fn print_progress(progress: SyncProgress) {
    println!(
        "[{}] job {}: {} {}/{} ({:.0}%)",
        progress.observed_at.format("%H:%M:%S"),
        progress.job_id,
        progress.status,
        progress.completed_batches,
        progress.total_batches,
        progress.percent
    );
}

fn print_outcome(job_id: &str, outcome: &WatchOutcome) {
    match outcome {
        WatchOutcome::Completed(status) => println!(
            "Job {} completed: {}/{} batches",
            job_id, status.completed_batches, status.total_batches
        ),
        WatchOutcome::Cancelled => println!("Stopped watching job {}", job_id),
    }
}
