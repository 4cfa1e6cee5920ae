//! Mock connections and sinks shared by the collector tests

use async_trait::async_trait;
use parking_lot::Mutex;
use sqlgauge_core::{
    Connection, ConnectionProvider, GaugeError, Result, RowCursor, Scanner, Value,
};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Barrier;

use crate::{MetricRecord, MetricSink};

/// What a mock connection does with a script
#[derive(Debug, Clone)]
pub enum ScriptOutcome {
    /// A result set with the given columns and rows
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// The server rejects the script
    QueryError(String),
    /// The column list cannot be read
    MetadataError(String),
    /// Rows are produced, then reading the next one fails
    RowError {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        message: String,
    },
}

impl ScriptOutcome {
    pub fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        ScriptOutcome::Rows {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }
}

#[derive(Default)]
struct MockState {
    unreachable: HashSet<String>,
    panicking: HashSet<String>,
    barrier: Option<Arc<Barrier>>,
    scripts: Vec<(String, ScriptOutcome)>,
    targets: Vec<String>,
}

/// Provider whose connections answer scripts from a fixed table.
///
/// A script is matched by the first registered key it contains; scripts
/// that match nothing return an empty result set.
#[derive(Clone, Default)]
pub struct MockProvider {
    state: Arc<Mutex<MockState>>,
    connects: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: make connecting to `target` fail
    pub fn with_unreachable(self, target: &str) -> Self {
        self.state.lock().unreachable.insert(target.to_string());
        self
    }

    /// Builder method: make connecting to `target` panic
    pub fn with_panic(self, target: &str) -> Self {
        self.state.lock().panicking.insert(target.to_string());
        self
    }

    /// Builder method: every connect waits on `barrier` before succeeding
    pub fn with_barrier(self, barrier: Arc<Barrier>) -> Self {
        self.state.lock().barrier = Some(barrier);
        self
    }

    /// Builder method: answer scripts containing `key` with `outcome`
    pub fn with_script(self, key: &str, outcome: ScriptOutcome) -> Self {
        self.state.lock().scripts.push((key.to_string(), outcome));
        self
    }

    /// Successful connections opened so far
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Connections closed so far
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Every target a connection was attempted against
    pub fn targets(&self) -> Vec<String> {
        self.state.lock().targets.clone()
    }
}

#[async_trait]
impl ConnectionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self, target: &str) -> Result<Box<dyn Connection>> {
        let (scripts, panics, barrier) = {
            let mut state = self.state.lock();
            state.targets.push(target.to_string());
            if state.unreachable.contains(target) {
                return Err(GaugeError::Connection(format!("cannot reach {}", target)));
            }
            (
                state.scripts.clone(),
                state.panicking.contains(target),
                state.barrier.clone(),
            )
        };
        if panics {
            panic!("mock driver crashed for {}", target);
        }
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            scripts,
            closes: self.closes.clone(),
        }))
    }
}

/// Connection handed out by [`MockProvider`]
pub struct MockConnection {
    scripts: Vec<(String, ScriptOutcome)>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    async fn query<'a>(&'a mut self, sql: &'a str) -> Result<Box<dyn RowCursor + 'a>> {
        let outcome = self
            .scripts
            .iter()
            .find(|(key, _)| sql.contains(key.as_str()))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or(ScriptOutcome::Rows {
                columns: Vec::new(),
                rows: Vec::new(),
            });

        let cursor = match outcome {
            ScriptOutcome::QueryError(message) => return Err(GaugeError::Query(message)),
            ScriptOutcome::MetadataError(message) => MockCursor {
                columns: Err(message),
                rows: VecDeque::new(),
                current: None,
                row_error: None,
            },
            ScriptOutcome::Rows { columns, rows } => MockCursor {
                columns: Ok(columns),
                rows: rows.into(),
                current: None,
                row_error: None,
            },
            ScriptOutcome::RowError {
                columns,
                rows,
                message,
            } => MockCursor {
                columns: Ok(columns),
                rows: rows.into(),
                current: None,
                row_error: Some(message),
            },
        };
        Ok(Box::new(cursor))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Cursor over canned rows
pub struct MockCursor {
    columns: std::result::Result<Vec<String>, String>,
    rows: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
    row_error: Option<String>,
}

impl Scanner for MockCursor {
    fn scan(&self, dest: &mut [Value]) -> Result<()> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| GaugeError::Scan("no current row".to_string()))?;
        if row.len() != dest.len() {
            return Err(GaugeError::Scan(format!(
                "expected {} destination slots, got {}",
                row.len(),
                dest.len()
            )));
        }
        dest.clone_from_slice(row);
        Ok(())
    }
}

#[async_trait]
impl RowCursor for MockCursor {
    fn columns(&self) -> Result<Vec<String>> {
        self.columns.clone().map_err(GaugeError::Metadata)
    }

    async fn advance(&mut self) -> Result<bool> {
        self.current = self.rows.pop_front();
        if self.current.is_some() {
            return Ok(true);
        }
        match self.row_error.take() {
            Some(message) => Err(GaugeError::Scan(message)),
            None => Ok(false),
        }
    }
}

/// Sink that keeps every record in memory
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<MetricRecord>>,
    limit: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that rejects records once it holds `limit` of them
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            limit: Some(limit),
        }
    }

    pub fn records(&self) -> Vec<MetricRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }
}

impl MetricSink for MemorySink {
    fn emit(&self, record: MetricRecord) -> Result<()> {
        let mut records = self.records.lock();
        if self.limit.is_some_and(|limit| records.len() >= limit) {
            return Err(GaugeError::Sink("memory sink full".to_string()));
        }
        records.push(record);
        Ok(())
    }
}
