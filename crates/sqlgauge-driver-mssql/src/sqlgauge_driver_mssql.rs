//! MS SQL Server driver for sqlgauge
//!
//! Provides a [`sqlgauge_core::ConnectionProvider`] that opens TDS connections
//! with tiberius from ADO.NET-style connection strings and streams the first
//! result set of each query.

mod connection;
mod driver;

#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod driver_tests;

pub use connection::{MssqlConnection, MssqlConnectionError, MssqlRowCursor};
pub use driver::{DEFAULT_SERVER, MSSQL_PREAMBLE, MssqlProvider};
