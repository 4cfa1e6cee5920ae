//! Metric sinks
//!
//! A sink receives every record the runner produces. Emission is
//! synchronous; a sink that cannot accept a record returns
//! [`GaugeError::Sink`](sqlgauge_core::GaugeError::Sink) and the task that
//! produced it stops.

mod channel;
pub mod line_protocol;


pub use channel::ChannelSink;
pub use line_protocol::LineProtocolSink;

use crate::MetricRecord;
use sqlgauge_core::Result;

/// Destination for metric records.
///
/// Shared by every concurrent task of a cycle.
pub trait MetricSink: Send + Sync {
    /// Accept one record
    fn emit(&self, record: MetricRecord) -> Result<()>;
}
