use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use escrutinio::{analysis, Orchestrator, RemoteApiAccessor, ResultStore, ScraperConfig};

#[derive(Parser)]
#[command(name = "escrutinio", about = "Election-night scrutiny watcher", version)]
struct Cli {
    /// Directory holding the cache, markers and historical log.
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the acquisition loop until interrupted.
    Run {
        /// Results-presentation page URL.
        #[arg(long)]
        base_url: Option<String>,

        /// Seconds between acquisition cycles.
        #[arg(long)]
        interval: Option<u64>,

        /// Per-region retry budget.
        #[arg(long)]
        max_attempts: Option<u32>,
    },

    /// Show statistics over the historical log.
    Stats,

    /// Export a per-candidate summary CSV from the historical log.
    Export,

    /// Rewrite the historical log's percentage columns with 2 decimals.
    Reformat,

    /// Ask a running instance to start its next cycle immediately.
    Trigger,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ScraperConfig::default().with_data_dir(&cli.data_dir);

    match cli.command {
        Command::Run {
            base_url,
            interval,
            max_attempts,
        } => {
            if let Some(url) = base_url {
                config = config.with_base_url(url);
            }
            if let Some(secs) = interval {
                config = config.with_check_interval_secs(secs);
            }
            if let Some(attempts) = max_attempts {
                config = config.with_max_attempts(attempts);
            }
            run_loop(config).await
        }
        Command::Stats => {
            let samples = ResultStore::new(&config)
                .read_history()
                .context("could not read the historical log")?;
            match analysis::statistics(&samples) {
                Some(stats) => print!("{}", analysis::render_statistics(&stats)),
                None => println!("No historical samples yet. Run the watcher first."),
            }
            Ok(())
        }
        Command::Export => {
            let samples = ResultStore::new(&config)
                .read_history()
                .context("could not read the historical log")?;
            let path = analysis::export_summary(&samples, &cli.data_dir)
                .context("could not write the summary")?;
            println!("Summary exported: {}", path.display());
            Ok(())
        }
        Command::Reformat => {
            let rewritten = ResultStore::new(&config)
                .reformat_history_decimals()
                .context("could not reformat the historical log")?;
            println!("Reformatted {rewritten} records.");
            Ok(())
        }
        Command::Trigger => {
            ResultStore::new(&config)
                .request_rescrape()
                .context("could not write the trigger marker")?;
            println!("Re-scrape requested.");
            Ok(())
        }
    }
}

async fn run_loop(config: ScraperConfig) -> Result<()> {
    let page = RemoteApiAccessor::new(&config).context("could not build the probe backend")?;
    let cancel = CancellationToken::new();

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, finishing current cycle bookkeeping");
            signal_cancel.cancel();
        }
    });

    Orchestrator::new(page, config, cancel).run().await;
    println!("Watcher stopped.");
    Ok(())
}
