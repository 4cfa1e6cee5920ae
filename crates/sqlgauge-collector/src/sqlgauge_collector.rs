//! sqlgauge collector - turns SQL result rows into metrics
//!
//! This crate provides the collection pipeline:
//! - `QuerySet` - the configured queries, built once and reused every cycle
//! - `RowMapper` - classifies a row's columns into measurement, tags and fields
//! - `ServerQueryRunner` - executes one query against one server
//! - `Collector` - fans out every (server, query) pair and gathers failures
//! - `MetricSink` implementations and InfluxDB line protocol encoding

pub mod execution;
pub mod mapping;
mod metric;
mod query_set;
pub mod sink;

#[cfg(test)]
mod test_helpers;

pub use execution::*;
pub use mapping::*;
pub use metric::MetricRecord;
pub use query_set::*;
pub use sink::*;
