//! Single (server, query) execution

use sqlgauge_core::{Connection, ConnectionProvider, Result, redact_target};

use crate::{MetricSink, Query, RowMapper};

/// Outcome of one successful query execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Target the query ran against
    pub server: String,
    /// Identifier of the query
    pub query_id: String,
    /// Column order reported by this execution's result set
    pub columns: Vec<String>,
    /// Rows emitted to the sink
    pub rows: usize,
}

/// Executes one query against one server and emits a record per row.
pub struct ServerQueryRunner<'a> {
    provider: &'a dyn ConnectionProvider,
    sink: &'a dyn MetricSink,
}

impl<'a> ServerQueryRunner<'a> {
    pub fn new(provider: &'a dyn ConnectionProvider, sink: &'a dyn MetricSink) -> Self {
        Self { provider, sink }
    }

    /// Connect, execute, stream every row through the mapper into the sink,
    /// and close the connection.
    ///
    /// Stops at the first error. Records emitted before the error stay
    /// emitted. The connection is closed on every path once it is open.
    pub async fn run(&self, server: &str, query: &Query) -> Result<Execution> {
        let mut conn = self.provider.connect(server).await?;
        tracing::debug!(
            server = %redact_target(server),
            query_id = query.id(),
            driver = conn.driver_name(),
            "connected"
        );

        let outcome = self.drain(conn.as_mut(), query).await;

        if let Err(e) = conn.close().await {
            tracing::debug!(
                server = %redact_target(server),
                query_id = query.id(),
                error = %e,
                "closing connection failed"
            );
        }

        let (mapper, rows) = outcome?;
        Ok(Execution {
            server: server.to_string(),
            query_id: query.id().to_string(),
            columns: mapper.into_columns(),
            rows,
        })
    }

    async fn drain(&self, conn: &mut dyn Connection, query: &Query) -> Result<(RowMapper, usize)> {
        let mut cursor = conn.query(query.script()).await?;
        let mapper = RowMapper::new(cursor.columns()?, query.emit_mode());

        let mut rows = 0;
        while cursor.advance().await? {
            let record = mapper.scan(&*cursor)?;
            self.sink.emit(record)?;
            rows += 1;
        }

        Ok((mapper, rows))
    }
}
