//! Row mapper
//!
//! Column classification rules:
//! - `measurement` with a textual, non-empty value names the series,
//!   otherwise [`DEFAULT_MEASUREMENT`] is used
//! - any other textual column not prefixed `field_` becomes a tag
//! - `field_<name>[_...]` columns become fields keyed by `<name>` in
//!   aggregate mode
//! - `value` is the single field in row mode

use chrono::{DateTime, Utc};
use sqlgauge_core::{Result, Scanner, Value};
use std::collections::BTreeMap;

use crate::{EmitMode, MetricRecord};

/// Measurement name used when a row has no textual `measurement` column
pub const DEFAULT_MEASUREMENT: &str = "sqlserver_extended";

/// Column that supplies the measurement name
pub const MEASUREMENT_COLUMN: &str = "measurement";

/// Column that supplies the field in row mode
pub const VALUE_COLUMN: &str = "value";

/// Prefix marking a column as a field in aggregate mode
pub const FIELD_PREFIX: &str = "field_";

/// Output key for a `field_` column.
///
/// Only the first `_`-delimited segment after the prefix is kept, so
/// `field_cpu_usage` maps to `cpu`. Consumers depend on these keys, so the
/// truncation is kept as is.
pub fn field_key(column: &str) -> Option<&str> {
    column
        .strip_prefix(FIELD_PREFIX)
        .map(|rest| rest.split_once('_').map_or(rest, |(head, _)| head))
}

/// Maps rows of one query execution to metric records.
///
/// Holds the column order reported by that execution's result set; it is
/// never shared between executions.
#[derive(Debug, Clone)]
pub struct RowMapper {
    columns: Vec<String>,
    emit_mode: EmitMode,
}

impl RowMapper {
    pub fn new(columns: Vec<String>, emit_mode: EmitMode) -> Self {
        Self { columns, emit_mode }
    }

    /// Column names in result-set order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<String> {
        self.columns
    }

    pub fn emit_mode(&self) -> EmitMode {
        self.emit_mode
    }

    /// Scan the scanner's current row and map it, stamped with the current time
    pub fn scan<S: Scanner + ?Sized>(&self, scanner: &S) -> Result<MetricRecord> {
        let mut slots = vec![Value::Null; self.columns.len()];
        scanner.scan(&mut slots)?;
        Ok(self.map(slots, Utc::now()))
    }

    /// Map positional values to a metric record.
    ///
    /// `values[i]` belongs to `columns()[i]`; surplus values on either side
    /// are ignored. When two `field_` columns truncate to the same key the
    /// later column wins.
    pub fn map(&self, values: Vec<Value>, timestamp: DateTime<Utc>) -> MetricRecord {
        let mut measurement = None;
        let mut tags = BTreeMap::new();
        let mut fields = BTreeMap::new();
        let mut row_value = Value::Null;

        for (column, value) in self.columns.iter().zip(values) {
            if value.is_textual() {
                let text = value.to_string();
                if column == MEASUREMENT_COLUMN {
                    measurement = Some(text);
                } else if !column.starts_with(FIELD_PREFIX) {
                    tags.insert(column.clone(), text);
                }
            }

            match self.emit_mode {
                EmitMode::Row if column == VALUE_COLUMN => row_value = value,
                EmitMode::Row => {}
                EmitMode::Aggregate => {
                    if let Some(key) = field_key(column) {
                        fields.insert(key.to_string(), value);
                    }
                }
            }
        }

        if self.emit_mode == EmitMode::Row {
            fields.insert(VALUE_COLUMN.to_string(), row_value);
        }

        MetricRecord {
            measurement: measurement
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_MEASUREMENT.to_string()),
            tags,
            fields,
            timestamp,
        }
    }
}
