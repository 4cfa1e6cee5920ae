//! sqlgauge - read metrics from Microsoft SQL Server using custom queries
//!
//! Usage:
//!   sqlgauge run [--once]        collect on an interval, line protocol on stdout
//!   sqlgauge sample-config       print a commented configuration file

mod config;
mod logging;
mod output;
mod schedule;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlgauge_collector::{ChannelSink, Collector};
use sqlgauge_driver_mssql::MssqlProvider;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use config::GaugeConfig;

const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(
    name = "sqlgauge",
    about = "Read metrics from Microsoft SQL Server using custom queries",
    version
)]
struct Cli {
    /// Configuration file (default: <config dir>/sqlgauge/sqlgauge.toml)
    #[arg(long, env = "SQLGAUGE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect metrics until interrupted
    Run {
        /// Run a single cycle and exit; fails if every query failed
        #[arg(long)]
        once: bool,
    },
    /// Print a commented sample configuration
    SampleConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::SampleConfig => {
            print!("{}", config::SAMPLE_CONFIG);
            Ok(())
        }
        Command::Run { once } => run(cli.config, &cli.log_level, once).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config_path: Option<PathBuf>, log_level: &str, once: bool) -> Result<()> {
    logging::init(log_level)?;

    let config = GaugeConfig::load_or_default(config_path.as_deref())?;
    if config.queries.is_empty() {
        tracing::warn!("no queries configured");
    }

    let (sink, receiver) = ChannelSink::bounded(config.metric_buffer_limit);
    let writer = output::spawn_stdout_writer(receiver);
    let collector = Collector::new(
        config.collector_config(),
        Arc::new(MssqlProvider::new()),
        Arc::new(sink),
    );

    let outcome = if once {
        let report = collector.collect().await;
        if report.all_failed() {
            Err(anyhow::Error::new(report.errors).context("every query failed"))
        } else {
            Ok(())
        }
    } else {
        let period = Duration::from_secs(config.interval_secs);
        schedule::collect_until_shutdown(&collector, period, tokio::signal::ctrl_c()).await
    };

    // Dropping the collector drops its sender; tasks abandoned on shutdown
    // may still hold one, so the wait is bounded.
    drop(collector);
    match tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, writer).await {
        Ok(joined) => {
            let written = joined?;
            tracing::debug!(written, "metric output closed");
        }
        Err(_) => tracing::warn!("metric output still busy at exit, pending records dropped"),
    }

    outcome
}
