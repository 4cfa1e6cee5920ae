//! sqlgauge core - shared abstractions for the query-to-metrics collector
//!
//! This crate defines the pieces every other sqlgauge crate builds on:
//!
//! - `Value` - a dynamically typed scalar produced by a row scan
//! - `GaugeError` - the error taxonomy of a collection task
//! - `ConnectionProvider`, `Connection`, `RowCursor`, `Scanner` - the seams
//!   between the collector and a concrete database driver

mod connection;
mod error;
mod types;

pub use connection::*;
pub use error::*;
pub use types::*;
