//! Collection cycle scheduling
//!
//! Every cycle runs each configured query against each configured server
//! concurrently, one task per pair. A failing task never affects its
//! siblings; its error is collected into the cycle report.

use sqlgauge_core::{ConnectionProvider, GaugeError, redact_target};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use super::{CycleReport, ServerQueryRunner, TaskFailure};
use crate::{EmitMode, MetricSink, QuerySet};

/// Servers, queries and query options of a collector
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    default_server: String,
    servers: Vec<String>,
    queries: Vec<String>,
    emit_mode: EmitMode,
    preamble: String,
}

impl CollectorConfig {
    /// Create a configuration with no servers or queries.
    ///
    /// `default_server` is used when the server list is empty.
    pub fn new(default_server: impl Into<String>) -> Self {
        Self {
            default_server: default_server.into(),
            servers: Vec::new(),
            queries: Vec::new(),
            emit_mode: EmitMode::default(),
            preamble: String::new(),
        }
    }

    /// Builder method: set the target servers
    pub fn with_servers(mut self, servers: Vec<String>) -> Self {
        self.servers = servers;
        self
    }

    /// Builder method: set the raw query texts
    pub fn with_queries(mut self, queries: Vec<String>) -> Self {
        self.queries = queries;
        self
    }

    /// Builder method: set the emit mode shared by every query
    pub fn with_emit_mode(mut self, emit_mode: EmitMode) -> Self {
        self.emit_mode = emit_mode;
        self
    }

    /// Builder method: set the statements prepended to every query
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn default_server(&self) -> &str {
        &self.default_server
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn emit_mode(&self) -> EmitMode {
        self.emit_mode
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Servers to collect from; the default server when none are configured
    pub fn servers(&self) -> Vec<String> {
        if self.servers.is_empty() {
            vec![self.default_server.clone()]
        } else {
            self.servers.clone()
        }
    }
}

/// Runs collection cycles over every (server, query) pair
pub struct Collector {
    config: CollectorConfig,
    provider: Arc<dyn ConnectionProvider>,
    sink: Arc<dyn MetricSink>,
    query_set: OnceLock<Arc<QuerySet>>,
}

impl Collector {
    pub fn new(
        config: CollectorConfig,
        provider: Arc<dyn ConnectionProvider>,
        sink: Arc<dyn MetricSink>,
    ) -> Self {
        Self {
            config,
            provider,
            sink,
            query_set: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// The query set, built from configuration on first use
    pub fn query_set(&self) -> Arc<QuerySet> {
        self.query_set
            .get_or_init(|| {
                let query_set = QuerySet::build(
                    self.config.preamble(),
                    self.config.queries(),
                    self.config.emit_mode(),
                );
                tracing::debug!(
                    queries = query_set.len(),
                    emit_mode = %self.config.emit_mode(),
                    "built query set"
                );
                Arc::new(query_set)
            })
            .clone()
    }

    /// Run one collection cycle.
    ///
    /// Spawns a task per (server, query) pair and waits for all of them.
    /// Always returns; failures are carried in the report.
    pub async fn collect(&self) -> CycleReport {
        let start = Instant::now();
        let query_set = self.query_set();
        let servers = self.config.servers();

        let mut handles = Vec::with_capacity(servers.len() * query_set.len());
        for server in &servers {
            for query in query_set.iter() {
                let key = (server.clone(), query.id().to_string());
                let provider = self.provider.clone();
                let sink = self.sink.clone();
                let server = server.clone();
                let query = query.clone();

                let handle = tokio::spawn(async move {
                    tracing::debug!(
                        server = %redact_target(&server),
                        query_id = query.id(),
                        "running query"
                    );
                    let runner = ServerQueryRunner::new(provider.as_ref(), sink.as_ref());
                    runner.run(&server, &query).await
                });

                handles.push((key, handle));
            }
        }

        let mut report = CycleReport::default();
        for ((server, query_id), handle) in handles {
            let outcome = match handle.await {
                Ok(result) => result,
                // Task panicked or was cancelled
                Err(e) => Err(GaugeError::Task(e.to_string())),
            };

            match outcome {
                Ok(execution) => {
                    tracing::debug!(
                        server = %redact_target(&server),
                        query_id = %query_id,
                        rows = execution.rows,
                        "query finished"
                    );
                    report.executions.push(execution);
                }
                Err(error) => {
                    tracing::warn!(
                        server = %redact_target(&server),
                        query_id = %query_id,
                        error_kind = error.kind(),
                        error = %error,
                        "query failed"
                    );
                    report.errors.push(TaskFailure::new(server, query_id, error));
                }
            }
        }

        report.duration = start.elapsed();
        tracing::info!(
            tasks = report.task_count(),
            succeeded = report.executions.len(),
            failed = report.errors.len(),
            rows = report.rows(),
            duration_ms = report.duration.as_millis() as u64,
            "collection cycle finished"
        );

        report
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("config", &self.config)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}
