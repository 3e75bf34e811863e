//! Single-date scrape driver and forced login.

use std::fs;
use std::io::{self, Write};

use anyhow::Context;
use chrono::NaiveDate;

use nutrilog_core::{AppConfig, DayResult};
use nutrilog_scraper::{Pipeline, SessionManager};

/// Run one date through the pipeline, print the payload on stdout, and
/// persist it under the days directory.
pub(crate) async fn scrape_single(config: &AppConfig, date: NaiveDate) -> anyhow::Result<()> {
    let config = resolve_credentials(config)?;
    let pipeline = Pipeline::from_config(&config)?;
    let result = pipeline
        .run(date)
        .await
        .with_context(|| format!("scrape failed for {date}"))?;
    emit(&config, &result)
}

/// `nutrilog login`: drive a fresh login regardless of snapshot freshness.
pub(crate) async fn force_login(config: &AppConfig) -> anyhow::Result<()> {
    let config = resolve_credentials(config)?;
    let manager = SessionManager::from_config(&config)?;
    manager.login().await.context("login failed")?;
    println!(
        "login confirmed; session snapshot saved to {}",
        config.session_path().display()
    );
    Ok(())
}

fn emit(config: &AppConfig, result: &DayResult) -> anyhow::Result<()> {
    let payload = serde_json::to_string_pretty(result)?;
    println!("{payload}");

    let days_dir = config.days_dir();
    fs::create_dir_all(&days_dir)
        .with_context(|| format!("cannot create {}", days_dir.display()))?;
    let path = days_dir.join(format!("{}.json", result.date));
    fs::write(&path, format!("{payload}\n"))
        .with_context(|| format!("cannot write {}", path.display()))?;
    tracing::info!(path = %path.display(), items = result.items.len(), "day payload written");
    Ok(())
}

/// Attended runs may prompt for whichever credential the environment is
/// missing; headless runs never prompt and let the scraper fail fast
/// instead.
fn resolve_credentials(config: &AppConfig) -> anyhow::Result<AppConfig> {
    if config.headless || (config.account.is_some() && config.password.is_some()) {
        return Ok(config.clone());
    }
    let mut resolved = config.clone();
    if resolved.account.is_none() {
        resolved.account = Some(prompt("account: ")?);
    }
    if resolved.password.is_none() {
        resolved.password = Some(prompt("password: ")?);
    }
    Ok(resolved)
}

/// Prompt on stderr so stdout stays reserved for the day payload.
fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{label}");
    io::stderr().flush().context("cannot flush stderr")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("cannot read from stdin")?;
    Ok(line.trim().to_owned())
}
