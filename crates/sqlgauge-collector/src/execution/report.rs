//! Cycle reports

use sqlgauge_core::{GaugeError, redact_target};
use std::fmt;
use std::time::Duration;

use super::Execution;

/// Failure of a single (server, query) task
#[derive(Debug)]
pub struct TaskFailure {
    pub server: String,
    pub query_id: String,
    pub error: GaugeError,
}

impl TaskFailure {
    pub fn new(server: impl Into<String>, query_id: impl Into<String>, error: GaugeError) -> Self {
        Self {
            server: server.into(),
            query_id: query_id.into(),
            error,
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {}",
            redact_target(&self.server),
            self.query_id,
            self.error
        )
    }
}

/// Every task failure of one cycle, in task order
#[derive(Debug, Default)]
pub struct ErrorReport {
    failures: Vec<TaskFailure>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failure: TaskFailure) {
        self.failures.push(failure);
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskFailure> {
        self.failures.iter()
    }

    pub fn into_failures(self) -> Vec<TaskFailure> {
        self.failures
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorReport {}

/// Result of one collection cycle
#[derive(Debug, Default)]
pub struct CycleReport {
    /// Successful executions, in task order
    pub executions: Vec<Execution>,
    /// Failed tasks, in task order
    pub errors: ErrorReport,
    /// Wall-clock time of the cycle
    pub duration: Duration,
}

impl CycleReport {
    /// Number of tasks run this cycle
    pub fn task_count(&self) -> usize {
        self.executions.len() + self.errors.len()
    }

    /// Rows emitted by successful tasks
    pub fn rows(&self) -> usize {
        self.executions.iter().map(|e| e.rows).sum()
    }

    /// Whether at least one task ran and none succeeded
    pub fn all_failed(&self) -> bool {
        self.executions.is_empty() && !self.errors.is_empty()
    }
}
