//! MS SQL Server connection implementation using tiberius

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures::TryStreamExt;
use sqlgauge_core::{Connection, GaugeError, Result, RowCursor, Scanner, Value};
use tiberius::{Client, ColumnData, Config, QueryItem, QueryStream, Row as TiberiusRow};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// MS SQL Server connection errors
#[derive(Debug, thiserror::Error)]
pub enum MssqlConnectionError {
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Result metadata unavailable: {0}")]
    MetadataFailed(String),

    #[error("Reading row failed: {0}")]
    RowFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MssqlConnectionError> for GaugeError {
    fn from(err: MssqlConnectionError) -> Self {
        match err {
            MssqlConnectionError::InvalidConnectionString(_) => {
                GaugeError::Configuration(err.to_string())
            }
            MssqlConnectionError::ConnectionFailed(_) | MssqlConnectionError::Io(_) => {
                GaugeError::Connection(err.to_string())
            }
            MssqlConnectionError::QueryFailed(_) => GaugeError::Query(err.to_string()),
            MssqlConnectionError::MetadataFailed(_) => GaugeError::Metadata(err.to_string()),
            MssqlConnectionError::RowFailed(_) => GaugeError::Scan(err.to_string()),
        }
    }
}

type MssqlClient = Client<Compat<TcpStream>>;

/// MS SQL Server connection using tiberius
pub struct MssqlConnection {
    client: MssqlClient,
    addr: String,
}

impl MssqlConnection {
    /// Open a connection from an ADO.NET-style connection string
    /// (`Server=host,port;User Id=...;Password=...`).
    #[tracing::instrument(skip(target), fields(target = %sqlgauge_core::redact_target(target)))]
    pub async fn connect(target: &str) -> std::result::Result<Self, MssqlConnectionError> {
        let config = Config::from_ado_string(target)
            .map_err(|e| MssqlConnectionError::InvalidConnectionString(e.to_string()))?;
        let addr = config.get_addr();

        tracing::debug!(addr = %addr, "connecting to MS SQL Server");

        let client = match Self::handshake(config.clone()).await {
            Ok(client) => client,
            // Azure gateways answer the first login with a redirect to the real node.
            Err(tiberius::error::Error::Routing { host, port }) => {
                tracing::debug!(host = %host, port, "following server redirect");
                let mut config = config;
                config.host(&host);
                config.port(port);
                Self::handshake(config)
                    .await
                    .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?
            }
            Err(e) => return Err(MssqlConnectionError::ConnectionFailed(e.to_string())),
        };

        tracing::debug!(addr = %addr, "successfully connected to MS SQL Server");

        Ok(Self { client, addr })
    }

    async fn handshake(config: Config) -> tiberius::Result<MssqlClient> {
        let tcp = TcpStream::connect(config.get_addr()).await?;
        tcp.set_nodelay(true)?;
        Client::connect(config, tcp.compat_write()).await
    }
}

#[async_trait]
impl Connection for MssqlConnection {
    fn driver_name(&self) -> &str {
        "mssql"
    }

    async fn query<'a>(&'a mut self, sql: &'a str) -> Result<Box<dyn RowCursor + 'a>> {
        let mut stream = self
            .client
            .simple_query(sql)
            .await
            .map_err(|e| MssqlConnectionError::QueryFailed(e.to_string()))?;

        let columns: Vec<String> = stream
            .columns()
            .await
            .map_err(|e| MssqlConnectionError::MetadataFailed(e.to_string()))?
            .map(|cols| cols.iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        Ok(Box::new(MssqlRowCursor {
            stream,
            columns,
            current: None,
            finished: false,
        }))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let MssqlConnection { client, addr } = *self;
        client
            .close()
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;
        tracing::debug!(addr = %addr, "MS SQL Server connection closed");
        Ok(())
    }
}

impl std::fmt::Debug for MssqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlConnection")
            .field("addr", &self.addr)
            .finish()
    }
}

/// Cursor over the first result set of a tiberius query stream.
///
/// Rows of later result sets are skipped, but the stream is read to its end
/// once the first result set is exhausted, so a server error raised by a
/// later statement fails the cursor with a query error.
pub struct MssqlRowCursor<'a> {
    stream: QueryStream<'a>,
    columns: Vec<String>,
    current: Option<TiberiusRow>,
    finished: bool,
}

impl<'a> Scanner for MssqlRowCursor<'a> {
    fn scan(&self, dest: &mut [Value]) -> Result<()> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| GaugeError::Scan("no current row; call advance first".to_string()))?;
        scan_row(row, dest)
    }
}

#[async_trait]
impl<'a> RowCursor for MssqlRowCursor<'a> {
    fn columns(&self) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }

    async fn advance(&mut self) -> Result<bool> {
        self.current = None;
        if self.finished {
            return Ok(false);
        }

        loop {
            let item = self
                .stream
                .try_next()
                .await
                .map_err(|e| MssqlConnectionError::RowFailed(e.to_string()))?;

            match item {
                Some(QueryItem::Row(row)) if row.result_index() == 0 => {
                    self.current = Some(row);
                    return Ok(true);
                }
                Some(QueryItem::Metadata(meta)) if meta.result_index() == 0 => continue,
                Some(_) => {
                    self.finished = true;
                    self.drain_remaining().await?;
                    return Ok(false);
                }
                None => {
                    self.finished = true;
                    return Ok(false);
                }
            }
        }
    }
}

impl<'a> MssqlRowCursor<'a> {
    /// Read and discard everything after the first result set so that an
    /// error raised by a later statement in the batch is still reported.
    async fn drain_remaining(&mut self) -> Result<()> {
        while self
            .stream
            .try_next()
            .await
            .map_err(|e| MssqlConnectionError::QueryFailed(e.to_string()))?
            .is_some()
        {}
        Ok(())
    }
}

/// Copy a row's cells into positional destination slots
pub(crate) fn scan_row(row: &TiberiusRow, dest: &mut [Value]) -> Result<()> {
    if dest.len() != row.len() {
        return Err(GaugeError::Scan(format!(
            "expected {} destination slots, got {}",
            row.len(),
            dest.len()
        )));
    }

    for (slot, (_, data)) in dest.iter_mut().zip(row.cells()) {
        *slot = column_data_to_value(data.clone())?;
    }
    Ok(())
}

/// Convert tiberius ColumnData to a sqlgauge Value
pub(crate) fn column_data_to_value(col_data: ColumnData<'static>) -> Result<Value> {
    let value = match col_data {
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::U8(v) => v.map(|v| Value::Int16(v as i16)),
        ColumnData::I16(v) => v.map(Value::Int16),
        ColumnData::I32(v) => v.map(Value::Int32),
        ColumnData::I64(v) => v.map(Value::Int64),
        ColumnData::F32(v) => v.map(Value::Float32),
        ColumnData::F64(v) => v.map(Value::Float64),
        ColumnData::String(v) => v.map(|v| Value::String(v.into_owned())),
        ColumnData::Guid(v) => v.map(Value::Uuid),
        ColumnData::Binary(v) => v.map(|v| Value::Bytes(v.into_owned())),
        ColumnData::Numeric(v) => v.map(|v| Value::Decimal(v.to_string())),
        ColumnData::Xml(v) => v.map(|v| Value::String(v.into_owned().into_string())),
        ColumnData::DateTime(None)
        | ColumnData::SmallDateTime(None)
        | ColumnData::DateTime2(None)
        | ColumnData::DateTimeOffset(None)
        | ColumnData::Date(None)
        | ColumnData::Time(None) => None,
        ColumnData::DateTime(Some(v)) => {
            // 1/300 second ticks since midnight
            let ticks = v.seconds_fragments() as u64;
            let time = time_of_day(ticks / 300, (ticks % 300) * 1_000_000_000 / 300)?;
            let date = days_since(1900, v.days() as i64)?;
            Some(Value::DateTime(NaiveDateTime::new(date, time)))
        }
        ColumnData::SmallDateTime(Some(v)) => {
            let time = time_of_day(v.seconds_fragments() as u64 * 60, 0)?;
            let date = days_since(1900, v.days() as i64)?;
            Some(Value::DateTime(NaiveDateTime::new(date, time)))
        }
        ColumnData::DateTime2(Some(v)) => Some(Value::DateTime(datetime2_to_naive(&v)?)),
        ColumnData::DateTimeOffset(Some(v)) => {
            // The wire value is already UTC; the offset only records the original zone.
            let naive = datetime2_to_naive(&v.datetime2())?;
            Some(Value::DateTimeUtc(naive.and_utc()))
        }
        ColumnData::Date(Some(v)) => Some(Value::Date(days_since(1, v.days() as i64)?)),
        ColumnData::Time(Some(v)) => Some(Value::Time(time_from_increments(&v)?)),
    };

    Ok(value.unwrap_or(Value::Null))
}

fn datetime2_to_naive(v: &tiberius::time::DateTime2) -> Result<NaiveDateTime> {
    let date = days_since(1, v.date().days() as i64)?;
    let time = time_from_increments(&v.time())?;
    Ok(NaiveDateTime::new(date, time))
}

fn time_from_increments(v: &tiberius::time::Time) -> Result<NaiveTime> {
    // Increments are 10^-scale seconds
    let scale = 10u64.pow(v.scale() as u32);
    let increments = v.increments();
    let nanos = (increments % scale) * (1_000_000_000 / scale);
    time_of_day(increments / scale, nanos)
}

fn time_of_day(secs: u64, nanos: u64) -> Result<NaiveTime> {
    NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, nanos as u32)
        .ok_or_else(|| {
            GaugeError::Scan(format!("time of day out of range: {}s {}ns", secs, nanos))
        })
}

fn days_since(base_year: i32, days: i64) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(base_year, 1, 1)
        .and_then(|base| base.checked_add_signed(chrono::Duration::days(days)))
        .ok_or_else(|| {
            GaugeError::Scan(format!(
                "date out of range: {} days after {}-01-01",
                days, base_year
            ))
        })
}
