//! Bounded channel sink

use sqlgauge_core::{GaugeError, Result};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::MetricSink;
use crate::MetricRecord;

/// Forwards records into a bounded tokio channel.
///
/// Emission never blocks: when the buffer is full the record is rejected
/// with a sink error.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<MetricRecord>,
    capacity: usize,
}

impl ChannelSink {
    /// Create a sink and the receiver draining it. A capacity of zero is
    /// raised to one.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<MetricRecord>) {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender, capacity }, receiver)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl MetricSink for ChannelSink {
    fn emit(&self, record: MetricRecord) -> Result<()> {
        self.sender.try_send(record).map_err(|e| match e {
            TrySendError::Full(_) => GaugeError::Sink(format!(
                "metric buffer full ({} records)",
                self.capacity
            )),
            TrySendError::Closed(_) => GaugeError::Sink("metric receiver closed".to_string()),
        })
    }
}
