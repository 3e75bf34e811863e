//! Multi-date backfill over a process-level worker pool.
//!
//! Each date runs as an independent `nutrilog <date>` child process, so a
//! worker gets the same session handling, diagnostics, and file output as a
//! normal single-day run; the pool only bounds how many run at once. One
//! failed date is reported and costs the batch its zero exit code, but
//! never stops the other dates.

use std::future::Future;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};

use nutrilog_core::AppConfig;

/// Outcome summary of one batch.
#[derive(Debug)]
pub(crate) struct BatchReport {
    pub succeeded: usize,
    pub failed: Vec<(NaiveDate, String)>,
}

pub(crate) async fn run(
    config: &AppConfig,
    from: NaiveDate,
    to: NaiveDate,
    workers: Option<usize>,
) -> anyhow::Result<()> {
    if to < from {
        anyhow::bail!("--to {to} precedes --from {from}");
    }
    let dates = date_span(from, to);
    let width = workers.unwrap_or(config.batch_workers).max(1);
    tracing::info!(count = dates.len(), width, %from, %to, "starting backfill");

    let total = dates.len();
    let report = run_batch(dates, width, spawn_date_worker).await;
    for (date, reason) in &report.failed {
        tracing::error!(%date, %reason, "date failed");
    }
    println!(
        "backfill complete: {} succeeded, {} failed",
        report.succeeded,
        report.failed.len()
    );
    if !report.failed.is_empty() {
        anyhow::bail!("{} of {total} dates failed", report.failed.len());
    }
    Ok(())
}

/// Run every date through `runner`, at most `width` at a time. Generic over
/// the runner so the pool logic is testable without spawning processes;
/// every date is attempted exactly once regardless of other dates' results.
pub(crate) async fn run_batch<R, Fut>(dates: Vec<NaiveDate>, width: usize, runner: R) -> BatchReport
where
    R: Fn(NaiveDate) -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    let outcomes: Vec<(NaiveDate, Result<(), String>)> = stream::iter(dates)
        .map(|date| {
            let work = runner(date);
            async move { (date, work.await) }
        })
        .buffer_unordered(width)
        .collect()
        .await;

    let mut report = BatchReport {
        succeeded: 0,
        failed: Vec::new(),
    };
    for (date, outcome) in outcomes {
        match outcome {
            Ok(()) => report.succeeded += 1,
            Err(reason) => report.failed.push((date, reason)),
        }
    }
    report.failed.sort_by_key(|(date, _)| *date);
    report
}

/// Every date from `from` through `to`, inclusive.
fn date_span(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = from;
    while current <= to {
        dates.push(current);
        let Some(next) = current.succ_opt() else {
            break;
        };
        current = next;
    }
    dates
}

/// Production runner: re-invoke this binary for a single date.
async fn spawn_date_worker(date: NaiveDate) -> Result<(), String> {
    let exe = std::env::current_exe().map_err(|err| format!("cannot locate own binary: {err}"))?;
    let output = tokio::process::Command::new(exe)
        .arg(date.to_string())
        .output()
        .await
        .map_err(|err| format!("cannot launch worker: {err}"))?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let last_line = stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no error output")
        .trim();
    Err(format!("worker exited with {}: {last_line}", output.status))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
