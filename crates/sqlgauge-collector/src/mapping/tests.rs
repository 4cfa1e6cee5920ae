//! Unit tests for row mapping

use super::*;
use crate::{EmitMode, MetricRecord};
use chrono::{TimeZone, Utc};
use sqlgauge_core::{GaugeError, Scanner, Value};
use std::collections::BTreeMap;

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn ts() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

mod field_key_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_segment() {
        assert_eq!(field_key("field_cpu"), Some("cpu"));
    }

    #[test]
    fn test_only_second_segment_is_kept() {
        assert_eq!(field_key("field_mem_used"), Some("mem"));
        assert_eq!(field_key("field_cpu_usage_pct"), Some("cpu"));
    }

    #[test]
    fn test_degenerate_names() {
        assert_eq!(field_key("field_"), Some(""));
        assert_eq!(field_key("field__x"), Some(""));
    }

    #[test]
    fn test_non_field_columns() {
        assert_eq!(field_key("value"), None);
        assert_eq!(field_key("fields"), None);
        assert_eq!(field_key("Field_cpu"), None);
        assert_eq!(field_key("my_field_cpu"), None);
    }
}

mod measurement_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_measurement_without_column() {
        let mapper = RowMapper::new(columns(&["host", "field_cpu"]), EmitMode::Aggregate);
        let record = mapper.map(vec!["db01".into(), Value::Int32(3)], ts());
        assert_eq!(record.measurement, DEFAULT_MEASUREMENT);
    }

    #[test]
    fn test_textual_measurement_column() {
        let mapper = RowMapper::new(columns(&["measurement", "value"]), EmitMode::Row);
        let record = mapper.map(vec!["foo".into(), Value::Int32(1)], ts());
        assert_eq!(record.measurement, "foo");
        assert!(!record.tags.contains_key("measurement"));
    }

    #[test]
    fn test_non_textual_measurement_falls_back() {
        let mapper = RowMapper::new(columns(&["measurement", "value"]), EmitMode::Row);

        let record = mapper.map(vec![Value::Int32(5), Value::Int32(1)], ts());
        assert_eq!(record.measurement, DEFAULT_MEASUREMENT);

        let record = mapper.map(vec![Value::Null, Value::Int32(1)], ts());
        assert_eq!(record.measurement, DEFAULT_MEASUREMENT);
    }

    #[test]
    fn test_empty_measurement_falls_back() {
        let mapper = RowMapper::new(columns(&["measurement"]), EmitMode::Aggregate);
        let record = mapper.map(vec!["".into()], ts());
        assert_eq!(record.measurement, DEFAULT_MEASUREMENT);
    }
}

mod tag_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_textual_columns_become_tags() {
        let mapper = RowMapper::new(
            columns(&["measurement", "host", "db", "field_size", "rows"]),
            EmitMode::Aggregate,
        );
        let record = mapper.map(
            vec![
                "disk".into(),
                "db01".into(),
                "master".into(),
                "big".into(),
                Value::Int64(10),
            ],
            ts(),
        );

        let expected: BTreeMap<String, String> = [("db", "master"), ("host", "db01")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(record.tags, expected);
    }

    #[test]
    fn test_non_textual_columns_never_become_tags() {
        let mapper = RowMapper::new(
            columns(&["count", "ratio", "flag", "amount", "nothing"]),
            EmitMode::Aggregate,
        );
        let record = mapper.map(
            vec![
                Value::Int32(1),
                Value::Float64(0.5),
                Value::Bool(true),
                Value::Decimal("1.25".to_string()),
                Value::Null,
            ],
            ts(),
        );
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_textual_value_column_is_also_a_tag() {
        let mapper = RowMapper::new(columns(&["value"]), EmitMode::Row);
        let record = mapper.map(vec!["ok".into()], ts());

        assert_eq!(record.tags.get("value").map(String::as_str), Some("ok"));
        assert_eq!(record.fields.get("value"), Some(&Value::from("ok")));
    }
}

mod aggregate_mode_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_columns_are_truncated_to_second_segment() {
        let mapper = RowMapper::new(
            columns(&["field_cpu", "field_mem_used"]),
            EmitMode::Aggregate,
        );
        let record = mapper.map(vec![Value::Int32(10), Value::Int32(20)], ts());

        let expected = MetricRecord::new(DEFAULT_MEASUREMENT, ts())
            .with_field("cpu", Value::Int32(10))
            .with_field("mem", Value::Int32(20));
        assert_eq!(record, expected);
    }

    #[test]
    fn test_value_column_is_not_a_field() {
        let mapper = RowMapper::new(columns(&["value", "field_io"]), EmitMode::Aggregate);
        let record = mapper.map(vec![Value::Float64(1.0), Value::Int64(7)], ts());

        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.fields.get("io"), Some(&Value::Int64(7)));
    }

    #[test]
    fn test_colliding_keys_keep_later_column() {
        let mapper = RowMapper::new(
            columns(&["field_mem_used", "field_mem_free"]),
            EmitMode::Aggregate,
        );
        let record = mapper.map(vec![Value::Int32(1), Value::Int32(2)], ts());
        assert_eq!(record.fields.get("mem"), Some(&Value::Int32(2)));
    }

    #[test]
    fn test_null_fields_are_kept() {
        let mapper = RowMapper::new(columns(&["field_wait"]), EmitMode::Aggregate);
        let record = mapper.map(vec![Value::Null], ts());
        assert_eq!(record.fields.get("wait"), Some(&Value::Null));
    }

    #[test]
    fn test_no_field_columns_gives_empty_fields() {
        let mapper = RowMapper::new(columns(&["host"]), EmitMode::Aggregate);
        let record = mapper.map(vec!["db01".into()], ts());
        assert!(record.fields.is_empty());
        assert_eq!(record.tags.len(), 1);
    }
}

mod row_mode_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_value_field() {
        let mapper = RowMapper::new(columns(&["value"]), EmitMode::Row);
        let record = mapper.map(vec![Value::Float64(42.5)], ts());

        let expected = MetricRecord::new(DEFAULT_MEASUREMENT, ts()).with_field("value", 42.5);
        assert_eq!(record, expected);
    }

    #[test]
    fn test_field_columns_are_ignored() {
        let mapper = RowMapper::new(
            columns(&["measurement", "field_cpu", "value"]),
            EmitMode::Row,
        );
        let record = mapper.map(
            vec!["sessions".into(), Value::Int32(3), Value::Int64(12)],
            ts(),
        );

        assert_eq!(record.measurement, "sessions");
        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.fields.get("value"), Some(&Value::Int64(12)));
    }

    #[test]
    fn test_missing_value_column_yields_null() {
        let mapper = RowMapper::new(columns(&["host"]), EmitMode::Row);
        let record = mapper.map(vec!["db01".into()], ts());
        assert_eq!(record.fields.get("value"), Some(&Value::Null));
    }
}

mod scan_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FixedRow(Vec<Value>);

    impl Scanner for FixedRow {
        fn scan(&self, dest: &mut [Value]) -> sqlgauge_core::Result<()> {
            if dest.len() != self.0.len() {
                return Err(GaugeError::Scan("slot count mismatch".to_string()));
            }
            dest.clone_from_slice(&self.0);
            Ok(())
        }
    }

    #[test]
    fn test_scan_aligns_slots_with_column_order() {
        let mapper = RowMapper::new(columns(&["host", "field_cpu"]), EmitMode::Aggregate);
        let row = FixedRow(vec!["db02".into(), Value::Int32(99)]);

        let record = mapper.scan(&row).unwrap();
        assert_eq!(record.tags.get("host").map(String::as_str), Some("db02"));
        assert_eq!(record.fields.get("cpu"), Some(&Value::Int32(99)));
    }

    #[test]
    fn test_scan_error_is_propagated() {
        let mapper = RowMapper::new(columns(&["a", "b", "c"]), EmitMode::Aggregate);
        let row = FixedRow(vec![Value::Null]);

        let err = mapper.scan(&row).unwrap_err();
        assert_eq!(err.kind(), "scan");
    }
}
