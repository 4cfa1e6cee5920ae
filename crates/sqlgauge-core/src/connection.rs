//! Connection, cursor and scanner traits
//!
//! These are the only seams between the collector and a database driver.
//! A driver hands out connections for an opaque connection-string target;
//! each connection runs a script and exposes its first result set as a
//! forward-only cursor.

use crate::{Result, Value};
use async_trait::async_trait;


const REDACTED: &str = "********";

/// Fills positional destination slots with the current row's values.
pub trait Scanner {
    /// Populate `dest` with the current row.
    ///
    /// `dest[i]` receives the value of the i-th column in the order reported
    /// by [`RowCursor::columns`]. Fails with [`crate::GaugeError::Scan`] when
    /// the slot count does not match the column count or a value cannot be
    /// decoded.
    fn scan(&self, dest: &mut [Value]) -> Result<()>;
}

/// Forward-only cursor over the rows of one result set
#[async_trait]
pub trait RowCursor: Scanner + Send {
    /// Column names in their physical order
    fn columns(&self) -> Result<Vec<String>>;

    /// Move to the next row. Returns `false` once the result set is exhausted.
    async fn advance(&mut self) -> Result<bool>;
}

/// An open database connection
#[async_trait]
pub trait Connection: Send {
    /// Get the driver name (e.g., "mssql")
    fn driver_name(&self) -> &str;

    /// Execute a script and return a cursor over its first result set.
    ///
    /// The cursor borrows the connection; it must be dropped before the
    /// connection is closed.
    async fn query<'a>(&'a mut self, sql: &'a str) -> Result<Box<dyn RowCursor + 'a>>;

    /// Close the connection
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens connections from a connection-string-shaped target
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Driver name, used for logging
    fn name(&self) -> &str;

    /// Open a new connection to `target`
    async fn connect(&self, target: &str) -> Result<Box<dyn Connection>>;
}

/// Mask credential values in a connection-string target so it can be logged.
///
/// Entries are `;`-separated `key=value` pairs; the values of `password` and
/// `pwd` keys (case-insensitive) are replaced.
pub fn redact_target(target: &str) -> String {
    target
        .split(';')
        .map(|entry| match entry.split_once('=') {
            Some((key, _)) if is_secret_key(key) => format!("{}={}", key, REDACTED),
            _ => entry.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn is_secret_key(key: &str) -> bool {
    let key = key.trim();
    key.eq_ignore_ascii_case("password") || key.eq_ignore_ascii_case("pwd")
}
