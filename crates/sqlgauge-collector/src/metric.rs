//! Metric record emitted for each result row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlgauge_core::Value;
use std::collections::BTreeMap;

/// One timestamped, tagged metric produced from a result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Series name
    pub measurement: String,
    /// Dimension tags
    pub tags: BTreeMap<String, String>,
    /// Measured values
    pub fields: BTreeMap<String, Value>,
    /// Wall-clock time the row was read
    pub timestamp: DateTime<Utc>,
}

impl MetricRecord {
    /// Create a record with no tags or fields
    pub fn new(measurement: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    /// Builder method: add a tag
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Builder method: add a field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}
