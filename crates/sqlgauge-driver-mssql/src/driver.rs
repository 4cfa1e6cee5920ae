//! MS SQL Server connection provider

use crate::connection::MssqlConnection;
use async_trait::async_trait;
use sqlgauge_core::{Connection, ConnectionProvider, Result};

/// Target used when no servers are configured
pub const DEFAULT_SERVER: &str = "Server=localhost;Application Name=sqlgauge;";

/// Statements prepended to every collection query.
///
/// Monitoring queries yield to user workloads on deadlock, suppress row-count
/// messages and never take shared locks.
pub const MSSQL_PREAMBLE: &str = "SET DEADLOCK_PRIORITY -10;
SET NOCOUNT ON;
SET TRANSACTION ISOLATION LEVEL READ UNCOMMITTED;
";

/// MS SQL Server connection provider
pub struct MssqlProvider;

impl MssqlProvider {
    /// Create a new MS SQL Server provider instance
    pub fn new() -> Self {
        tracing::debug!("MS SQL Server provider initialized");
        Self
    }
}

impl Default for MssqlProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionProvider for MssqlProvider {
    fn name(&self) -> &str {
        "mssql"
    }

    async fn connect(&self, target: &str) -> Result<Box<dyn Connection>> {
        let connection = MssqlConnection::connect(target).await?;
        Ok(Box::new(connection))
    }
}
