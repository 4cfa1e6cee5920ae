//! Interval collection loop

use anyhow::{Context, Result};
use sqlgauge_collector::Collector;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;


/// Run a collection cycle every `period` until `shutdown` resolves.
///
/// `shutdown` is polled during cycles too; a cycle still in flight when it
/// fires is abandoned.
pub async fn collect_until_shutdown<F>(
    collector: &Collector,
    period: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    tracing::info!(period_secs = period.as_secs(), "collection started");
    loop {
        tokio::select! {
            signal = &mut shutdown => return stopped(signal),
            _ = interval.tick() => {}
        }

        tokio::select! {
            signal = &mut shutdown => {
                tracing::warn!("abandoning collection cycle in flight");
                return stopped(signal);
            }
            _ = collector.collect() => {}
        }
    }
}

fn stopped(signal: std::io::Result<()>) -> Result<()> {
    signal.context("Failed to listen for shutdown signal")?;
    tracing::info!("interrupted, stopping");
    Ok(())
}
