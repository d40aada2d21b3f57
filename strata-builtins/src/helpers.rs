//! Helper functions for builtin implementations
//!
//! Common utilities for extracting and validating arguments.

use strata_core::ops::{self, MAX_SEQUENCE_LEN};
use strata_core::{Integer, StrataError, StrataResult, Value};

/// Extract an integer (bools count) or fail the way index arguments do
pub fn require_int(value: &Value) -> StrataResult<Integer> {
    value.to_integer().ok_or_else(|| {
        StrataError::type_mismatch(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })
}

/// Extract an integer that must fit an `i64`
pub fn require_i64(value: &Value, func: &str, arg: &str) -> StrataResult<i64> {
    require_int(value)?.to_i64().ok_or_else(|| {
        StrataError::invalid_value(format!("{}(): {} is too large", func, arg))
    })
}

/// Extract text
pub fn require_text<'a>(value: &'a Value, func: &str) -> StrataResult<&'a str> {
    value.as_str().ok_or_else(|| {
        StrataError::type_mismatch(format!(
            "{}() argument must be str, not {}",
            func,
            value.type_name()
        ))
    })
}

/// Elements of an iterable argument
pub fn elements(value: &Value) -> StrataResult<Vec<Value>> {
    ops::iterate(value)
}

/// Fail when a materialized result would exceed the sequence bound
pub fn check_len(func: &str, len: usize) -> StrataResult<()> {
    if len > MAX_SEQUENCE_LEN {
        return Err(StrataError::invalid_value(format!(
            "{}() result has {} elements, more than the limit of {}",
            func, len, MAX_SEQUENCE_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ErrorKind;

    #[test]
    fn test_require_int() {
        assert_eq!(require_int(&Value::Bool(true)).unwrap().to_i64(), Some(1));
        let err = require_int(&Value::Float(1.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert!(err.message.contains("'float'"));
    }

    #[test]
    fn test_require_i64_overflow() {
        let big = Value::Int(Integer::parse("1_000_000_000_000_000_000_000", 10).unwrap());
        let err = require_i64(&big, "chr", "i").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_check_len() {
        assert!(check_len("range", 10).is_ok());
        assert!(check_len("range", MAX_SEQUENCE_LEN + 1).is_err());
    }
}
