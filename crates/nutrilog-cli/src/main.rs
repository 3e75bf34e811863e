//! nutrilog command line interface.
//!
//! Bare invocation scrapes one diary day (today by the diary's own
//! day-boundary rule, or an explicit date); subcommands cover forced login
//! and multi-date backfill.

mod backfill;
mod run;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nutrilog")]
#[command(about = "Scrape daily nutrition records from the meal-diary service")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Target date (YYYY-MM-DD). Defaults to the current diary day, which
    /// rolls over at the configured early-morning boundary, not midnight.
    date: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in now and persist a confirmed session snapshot.
    Login,
    /// Scrape a span of dates with a fixed-width pool of worker processes.
    Backfill {
        /// First date of the span, inclusive.
        #[arg(long)]
        from: NaiveDate,
        /// Last date of the span, inclusive.
        #[arg(long)]
        to: NaiveDate,
        /// Worker-pool width; defaults to the configured batch width.
        #[arg(long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = nutrilog_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Login) => run::force_login(&config).await,
        Some(Commands::Backfill { from, to, workers }) => {
            backfill::run(&config, from, to, workers).await
        }
        None => {
            let date = cli
                .date
                .unwrap_or_else(|| nutrilog_core::effective_date(Local::now(), config.day_boundary_hour));
            run::scrape_single(&config, date).await
        }
    }
}
