//! Tests for MS SQL Server connection module

use crate::connection::{MssqlConnectionError, column_data_to_value};
use std::borrow::Cow;
use tiberius::ColumnData;
use tiberius::numeric::Numeric;
use tiberius::time::{Date, DateTime, DateTime2, DateTimeOffset, SmallDateTime, Time};
use sqlgauge_core::{GaugeError, Value};

// Column data conversion tests

#[test]
fn test_column_data_to_value_nulls() {
    let nulls = vec![
        ColumnData::Bit(None),
        ColumnData::U8(None),
        ColumnData::I16(None),
        ColumnData::I32(None),
        ColumnData::I64(None),
        ColumnData::F32(None),
        ColumnData::F64(None),
        ColumnData::String(None),
        ColumnData::Guid(None),
        ColumnData::Binary(None),
        ColumnData::Numeric(None),
        ColumnData::DateTime(None),
        ColumnData::SmallDateTime(None),
        ColumnData::DateTime2(None),
        ColumnData::DateTimeOffset(None),
        ColumnData::Date(None),
        ColumnData::Time(None),
    ];

    for data in nulls {
        assert_eq!(column_data_to_value(data).unwrap(), Value::Null);
    }
}

#[test]
fn test_column_data_to_value_integers() {
    assert_eq!(
        column_data_to_value(ColumnData::U8(Some(255))).unwrap(),
        Value::Int16(255)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I16(Some(-7))).unwrap(),
        Value::Int16(-7)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I32(Some(42))).unwrap(),
        Value::Int32(42)
    );
    assert_eq!(
        column_data_to_value(ColumnData::I64(Some(9_999_999_999))).unwrap(),
        Value::Int64(9_999_999_999)
    );
}

#[test]
fn test_column_data_to_value_floats_and_bits() {
    assert_eq!(
        column_data_to_value(ColumnData::F32(Some(1.5))).unwrap(),
        Value::Float32(1.5)
    );
    assert_eq!(
        column_data_to_value(ColumnData::F64(Some(42.5))).unwrap(),
        Value::Float64(42.5)
    );
    assert_eq!(
        column_data_to_value(ColumnData::Bit(Some(true))).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_column_data_to_value_string_is_textual() {
    let value = column_data_to_value(ColumnData::String(Some(Cow::Borrowed("db01")))).unwrap();
    assert_eq!(value, Value::String("db01".to_string()));
    assert!(value.is_textual());
}

#[test]
fn test_column_data_to_value_numeric_is_not_textual() {
    let numeric = Numeric::new_with_scale(12345, 2);
    let value = column_data_to_value(ColumnData::Numeric(Some(numeric))).unwrap();
    assert_eq!(value, Value::Decimal("123.45".to_string()));
    assert!(!value.is_textual());
}

#[test]
fn test_column_data_to_value_guid_and_binary() {
    let id = uuid::Uuid::new_v4();
    assert_eq!(
        column_data_to_value(ColumnData::Guid(Some(id))).unwrap(),
        Value::Uuid(id)
    );
    assert_eq!(
        column_data_to_value(ColumnData::Binary(Some(Cow::Owned(vec![1, 2, 3])))).unwrap(),
        Value::Bytes(vec![1, 2, 3])
    );
}

#[test]
fn test_column_data_to_value_date() {
    // 738_899 days after 0001-01-01
    let value = column_data_to_value(ColumnData::Date(Some(Date::new(738_899)))).unwrap();
    assert_eq!(
        value,
        Value::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    );
}

#[test]
fn test_column_data_to_value_time_with_scale() {
    // 14:30:00.5 at scale 7 (100ns increments)
    let increments = (14 * 3600 + 30 * 60) * 10_000_000 + 5_000_000;
    let value = column_data_to_value(ColumnData::Time(Some(Time::new(increments, 7)))).unwrap();
    assert_eq!(
        value,
        Value::Time(chrono::NaiveTime::from_hms_milli_opt(14, 30, 0, 500).unwrap())
    );
}

#[test]
fn test_column_data_to_value_legacy_datetime() {
    // 1900-01-02 00:00:01 = 1 day, 300 ticks
    let value = column_data_to_value(ColumnData::DateTime(Some(DateTime::new(1, 300)))).unwrap();
    let expected = chrono::NaiveDate::from_ymd_opt(1900, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 1)
        .unwrap();
    assert_eq!(value, Value::DateTime(expected));
}

#[test]
fn test_column_data_to_value_small_datetime() {
    // 1900-01-01 01:30 = 0 days, 90 minutes
    let value =
        column_data_to_value(ColumnData::SmallDateTime(Some(SmallDateTime::new(0, 90)))).unwrap();
    let expected = chrono::NaiveDate::from_ymd_opt(1900, 1, 1)
        .unwrap()
        .and_hms_opt(1, 30, 0)
        .unwrap();
    assert_eq!(value, Value::DateTime(expected));
}

#[test]
fn test_column_data_to_value_datetime_offset_is_utc() {
    let dt2 = DateTime2::new(Date::new(738_899), Time::new(0, 7));
    let value =
        column_data_to_value(ColumnData::DateTimeOffset(Some(DateTimeOffset::new(dt2, 120))))
            .unwrap();
    let expected = chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc();
    assert_eq!(value, Value::DateTimeUtc(expected));
}

// Error conversion tests

#[test]
fn test_error_conversion_taxonomy() {
    let cases: Vec<(MssqlConnectionError, &str)> = vec![
        (
            MssqlConnectionError::ConnectionFailed("refused".into()),
            "connection",
        ),
        (MssqlConnectionError::QueryFailed("syntax".into()), "query"),
        (
            MssqlConnectionError::MetadataFailed("gone".into()),
            "metadata",
        ),
        (MssqlConnectionError::RowFailed("decode".into()), "scan"),
        (
            MssqlConnectionError::InvalidConnectionString("bad".into()),
            "configuration",
        ),
    ];

    for (err, kind) in cases {
        let gauge: GaugeError = err.into();
        assert_eq!(gauge.kind(), kind);
    }
}

#[test]
fn test_error_display_keeps_driver_message() {
    let gauge: GaugeError = MssqlConnectionError::QueryFailed("Invalid object name 'x'".into()).into();
    assert_eq!(
        gauge.to_string(),
        "Query error: Query execution failed: Invalid object name 'x'"
    );
}
