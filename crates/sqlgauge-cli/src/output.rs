//! Metric output
//!
//! Drains the collector's channel and writes line protocol to stdout.

use sqlgauge_collector::{LineProtocolSink, MetricRecord, MetricSink};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Spawn the writer task. It ends once every sender is dropped and the
/// channel is empty.
pub fn spawn_stdout_writer(mut receiver: mpsc::Receiver<MetricRecord>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let sink = LineProtocolSink::new(std::io::stdout());
        let mut written = 0;
        while let Some(record) = receiver.recv().await {
            match sink.emit(record) {
                Ok(()) => written += 1,
                Err(e) => tracing::warn!(error = %e, "dropping metric"),
            }
        }
        written
    })
}
