//! InfluxDB line protocol encoding
//!
//! `measurement[,tag=value...] field=value[,field=value...] timestamp_ns`

use parking_lot::Mutex;
use sqlgauge_core::{GaugeError, Result, Value};
use std::fmt::Write as _;
use std::io::Write;

use super::MetricSink;
use crate::MetricRecord;

/// Encode a record as one line of line protocol, without a trailing newline.
///
/// Null fields, non-finite floats, empty keys and empty tag values are
/// dropped. Newlines, carriage returns and tabs are escaped everywhere so a
/// value can never start a new line. Returns `None` when no field is left,
/// since such a line cannot be written.
pub fn encode(record: &MetricRecord) -> Option<String> {
    let fields: Vec<String> = record
        .fields
        .iter()
        .filter(|(key, value)| !key.is_empty() && !value.is_null())
        .filter_map(|(key, value)| {
            encode_field_value(value).map(|v| format!("{}={}", escape_key(key), v))
        })
        .collect();

    if fields.is_empty() {
        return None;
    }

    let mut line = escape_measurement(&record.measurement);
    for (key, value) in &record.tags {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        let _ = write!(line, ",{}={}", escape_key(key), escape_key(value));
    }
    line.push(' ');
    line.push_str(&fields.join(","));

    if let Some(nanos) = record.timestamp.timestamp_nanos_opt() {
        let _ = write!(line, " {}", nanos);
    }

    Some(line)
}

fn encode_field_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(_) => value.as_bool().map(|v| v.to_string()),
        Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_) => {
            value.as_i64().map(|v| format!("{}i", v))
        }
        Value::Float32(_) | Value::Float64(_) => finite(value).map(|v| v.to_string()),
        // Decimals go out as floats unless they cannot be represented as one
        Value::Decimal(text) => {
            Some(finite(value).map_or_else(|| quote(text), |v| v.to_string()))
        }
        Value::String(v) => Some(quote(v)),
        Value::Bytes(v) => Some(quote(&hex::encode(v))),
        Value::Uuid(v) => Some(quote(&v.to_string())),
        Value::Date(v) => Some(quote(&v.to_string())),
        Value::Time(v) => Some(quote(&v.to_string())),
        Value::DateTime(v) => Some(quote(&v.to_string())),
        Value::DateTimeUtc(v) => Some(quote(&v.to_rfc3339())),
    }
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// Backslash-escape `special`, and write control whitespace as `\n`, `\r`, `\t`
fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if special.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

fn quote(s: &str) -> String {
    format!("\"{}\"", escape(s, &['"', '\\']))
}

fn escape_measurement(s: &str) -> String {
    escape(s, &[',', ' '])
}

fn escape_key(s: &str) -> String {
    escape(s, &[',', '=', ' '])
}

/// Writes each record as a line of line protocol to a writer.
pub struct LineProtocolSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> LineProtocolSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> MetricSink for LineProtocolSink<W> {
    fn emit(&self, record: MetricRecord) -> Result<()> {
        let Some(line) = encode(&record) else {
            tracing::debug!(measurement = %record.measurement, "skipping record with no fields");
            return Ok(());
        };

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|e| GaugeError::Sink(format!("write failed: {}", e)))
    }
}

impl<W: Write + Send> std::fmt::Debug for LineProtocolSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineProtocolSink").finish_non_exhaustive()
    }
}
