//! Unit tests for the value model

use super::*;

mod textual_tests {
    use super::*;

    #[test]
    fn test_only_strings_are_textual() {
        assert!(Value::String("disk".to_string()).is_textual());
        assert!(Value::String(String::new()).is_textual());

        assert!(!Value::Null.is_textual());
        assert!(!Value::Bool(true).is_textual());
        assert!(!Value::Int32(7).is_textual());
        assert!(!Value::Float64(1.5).is_textual());
        assert!(!Value::Decimal("12.50".to_string()).is_textual());
        assert!(!Value::Bytes(b"abc".to_vec()).is_textual());
        assert!(!Value::Uuid(Uuid::nil()).is_textual());
    }

    #[test]
    fn test_textual_display_is_raw_text() {
        assert_eq!(Value::from("host 01").to_string(), "host 01");
    }
}

mod conversion_tests {
    use super::*;

    #[test]
    fn test_as_i64_widens_integers() {
        assert_eq!(Value::Int8(-3).as_i64(), Some(-3));
        assert_eq!(Value::Int16(300).as_i64(), Some(300));
        assert_eq!(Value::Int32(70_000).as_i64(), Some(70_000));
        assert_eq!(Value::Int64(1 << 40).as_i64(), Some(1 << 40));
        assert_eq!(Value::Float64(1.0).as_i64(), None);
    }

    #[test]
    fn test_as_f64_parses_decimals() {
        assert_eq!(Value::Float32(0.5).as_f64(), Some(0.5));
        assert_eq!(Value::Decimal("42.25".to_string()).as_f64(), Some(42.25));
        assert_eq!(Value::Decimal("not a number".to_string()).as_f64(), None);
        assert_eq!(Value::String("1.0".to_string()).as_f64(), None);
    }

    #[test]
    fn test_default_is_null() {
        assert!(Value::default().is_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int32(5).to_string(), "5");
        assert_eq!(Value::Bytes(vec![1, 2, 3]).to_string(), "<3 bytes>");
        assert_eq!(Value::from("cpu").to_string(), "cpu");
    }

    #[test]
    fn test_value_serialization() {
        let json = serde_json::to_string(&Value::Int64(42)).unwrap();
        assert_eq!(json, "{\"Int64\":42}");

        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Int64(42));
    }
}
