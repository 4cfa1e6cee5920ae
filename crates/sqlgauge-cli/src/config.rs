//! Configuration file loading

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use sqlgauge_collector::{CollectorConfig, EmitMode};
use sqlgauge_driver_mssql::{DEFAULT_SERVER, MSSQL_PREAMBLE};
use std::path::{Path, PathBuf};


/// Commented sample configuration printed by `sqlgauge sample-config`
pub const SAMPLE_CONFIG: &str = indoc::indoc! {r#"
    ## Specify instances to monitor with a list of connection strings.
    ## All connection parameters are optional.
    ## By default, the host is localhost, listening on default port, TCP 1433.
    ## Connection strings use the ADO.NET form; TLS can be requested like so:
    ##   "Server=<host>;User Id=<user>;Password=<pw>;Encrypt=true;TrustServerCertificate=false"
    # servers = [
    #   "Server=192.168.1.10,1433;User Id=<user>;Password=<pw>;Application Name=sqlgauge;",
    # ]

    ## Queries to run against every server. Textual columns become tags,
    ## a textual `measurement` column names the series.
    # queries = [
    #   "select 'measurement_name' as measurement, some_data as value FROM your_table",
    #   "add one more query",
    # ]

    ## Emit one metric per row with the `value` column as its only field.
    ## When false, every `field_<name>` column becomes a field named <name>.
    # result_by_row = false

    ## Seconds between collection cycles.
    # interval_secs = 10

    ## Records buffered between the collector and the output.
    # metric_buffer_limit = 10000

    ## Statements prepended to every query. Defaults to a low deadlock
    ## priority, NOCOUNT and READ UNCOMMITTED isolation.
    # preamble = "SET NOCOUNT ON;\n"
"#};

/// Configuration file contents
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    /// Connection strings of the servers to query
    pub servers: Vec<String>,
    /// Query texts, run against every server
    pub queries: Vec<String>,
    /// Emit one metric per row keyed by the `value` column
    pub result_by_row: bool,
    /// Seconds between collection cycles
    pub interval_secs: u64,
    /// Capacity of the buffer between collector and output
    pub metric_buffer_limit: usize,
    /// Statements prepended to every query
    pub preamble: Option<String>,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            queries: Vec::new(),
            result_by_row: false,
            interval_secs: 10,
            metric_buffer_limit: 10_000,
            preamble: None,
        }
    }
}

impl GaugeConfig {
    /// Parse and validate TOML configuration text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GaugeConfig = toml::from_str(text).context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&text).with_context(|| format!("Failed to load {:?}", path))
    }

    /// Load the explicitly given file, or the default file if it exists,
    /// or fall back to defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let path = default_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::info!(path = %path.display(), "no config file found, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            bail!("interval_secs must be greater than 0");
        }
        if self.metric_buffer_limit == 0 {
            bail!("metric_buffer_limit must be greater than 0");
        }
        Ok(())
    }

    pub fn emit_mode(&self) -> EmitMode {
        EmitMode::from_result_by_row(self.result_by_row)
    }

    /// Collector settings for the SQL Server driver
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig::new(DEFAULT_SERVER)
            .with_servers(self.servers.clone())
            .with_queries(self.queries.clone())
            .with_emit_mode(self.emit_mode())
            .with_preamble(self.preamble.as_deref().unwrap_or(MSSQL_PREAMBLE))
    }
}

/// `<config dir>/sqlgauge/sqlgauge.toml`
pub fn default_path() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("sqlgauge").join("sqlgauge.toml"))
}
