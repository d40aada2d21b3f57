//! Strata Core - Fundamental types
//!
//! This crate provides the core types used throughout Strata:
//! - `Integer`: Arbitrary precision integers
//! - `Value`: Runtime values (numbers, strings, containers)
//! - operator enums and their semantics (`ops`)
//! - `StrataError`: Structured errors

mod integer;
mod value;
mod error;
mod operator;
pub mod ops;

pub use integer::{Integer, IntegerError};
pub use value::{Value, float_repr, str_repr};
pub use error::{StrataError, StrataResult, ErrorKind, ErrorContext, codes};
pub use operator::{UnaryOp, BinaryOp, BoolOp, CompareOp};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Integer, Value, StrataError, StrataResult, ErrorKind};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Value {
        Value::int(n)
    }

    mod integer_tests {
        use super::*;

        #[test]
        fn test_parse_decimal_and_prefixes() {
            assert_eq!(Integer::parse("123", 10).unwrap().to_i64(), Some(123));
            assert_eq!(Integer::parse(" -1_000 ", 10).unwrap().to_i64(), Some(-1000));
            assert_eq!(Integer::parse("0x1f", 0).unwrap().to_i64(), Some(31));
            assert_eq!(Integer::parse("0o17", 0).unwrap().to_i64(), Some(15));
            assert_eq!(Integer::parse("0b101", 0).unwrap().to_i64(), Some(5));
            assert_eq!(Integer::parse("ff", 16).unwrap().to_i64(), Some(255));
        }

        #[test]
        fn test_parse_rejects_garbage() {
            assert!(Integer::parse("12a", 10).is_err());
            assert!(Integer::parse("", 10).is_err());
            assert!(Integer::parse("1__0", 10).is_err());
            assert!(Integer::parse("_1", 10).is_err());
            assert!(Integer::parse("0x", 0).is_err());
        }

        #[test]
        fn test_big_values_stay_exact() {
            let two = Integer::from_i64(2);
            let big = two.pow(&Integer::from_i64(100)).unwrap();
            assert_eq!(big.to_string(), "1267650600228229401496703205376");
            assert_eq!(big.to_i64(), None);
        }

        #[test]
        fn test_floor_semantics() {
            let a = Integer::from_i64(-7);
            let b = Integer::from_i64(2);
            assert_eq!(a.floor_div(&b).unwrap().to_i64(), Some(-4));
            assert_eq!(a.modulo(&b).unwrap().to_i64(), Some(1));
            let c = Integer::from_i64(7);
            let d = Integer::from_i64(-2);
            assert_eq!(c.floor_div(&d).unwrap().to_i64(), Some(-4));
            assert_eq!(c.modulo(&d).unwrap().to_i64(), Some(-1));
            assert_eq!(c.floor_div(&Integer::zero()), Err(IntegerError::DivisionByZero));
        }

        #[test]
        fn test_shifts_and_bits() {
            let x = Integer::from_i64(-9);
            assert_eq!(x.shr(&Integer::from_i64(1)).unwrap().to_i64(), Some(-5));
            assert_eq!(x.shr(&Integer::from_i64(100)).unwrap().to_i64(), Some(-1));
            assert_eq!(Integer::from_i64(3).shl(&Integer::from_i64(4)).unwrap().to_i64(), Some(48));
            assert_eq!(x.shl(&Integer::from_i64(-1)), Err(IntegerError::NegativeShift));
            assert_eq!(Integer::from_i64(5).invert().to_i64(), Some(-6));
            assert_eq!(Integer::from_i64(6).bit_and(&Integer::from_i64(3)).to_i64(), Some(2));
        }

        #[test]
        fn test_oversized_results_are_rejected() {
            let one = Integer::from_i64(1);
            let huge = Integer::parse("4611686018427387904", 10).unwrap();
            assert!(matches!(one.shl(&huge), Err(IntegerError::Overflow(_))));
            let two = Integer::from_i64(2);
            assert!(matches!(two.pow(&huge), Err(IntegerError::Overflow(_))));
            assert!(matches!(two.pow(&Integer::from_i64(1 << 30)), Err(IntegerError::Overflow(_))));

            // trivial bases and zero shifts stay cheap
            assert_eq!(Integer::zero().shl(&huge).unwrap(), Integer::zero());
            assert_eq!(one.pow(&huge).unwrap().to_i64(), Some(1));
            assert_eq!(Integer::from_i64(-1).pow(&huge).unwrap().to_i64(), Some(1));
            assert_eq!(Integer::zero().pow(&Integer::zero()).unwrap().to_i64(), Some(1));

            let err = ops::binary(BinaryOp::LShift, &int(1), &Value::Int(huge.clone())).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidValue);
            let err = ops::binary(BinaryOp::Pow, &int(2), &Value::Int(huge)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidValue);
        }

        #[test]
        fn test_pow_mod() {
            let r = Integer::from_i64(3)
                .pow_mod(&Integer::from_i64(200), &Integer::from_i64(13))
                .unwrap();
            assert_eq!(r.to_i64(), Some(9));
        }

        #[test]
        fn test_radix_rendering() {
            assert_eq!(Integer::from_i64(255).to_str_radix(16), "ff");
            assert_eq!(Integer::from_i64(-5).to_str_radix(2), "-101");
            assert_eq!(Integer::zero().to_str_radix(8), "0");
        }

        #[test]
        fn test_float_conversion() {
            assert_eq!(Integer::from_f64(-3.9).unwrap().to_i64(), Some(-3));
            assert!(Integer::from_f64(f64::NAN).is_err());
            assert_eq!(Integer::from_f64(1e20).unwrap().to_string(), "100000000000000000000");
        }
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_mixed_numeric_equality() {
            assert_eq!(int(1), Value::Float(1.0));
            assert_eq!(Value::Bool(true), int(1));
            assert_ne!(int(1), Value::Float(1.5));
            assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
            assert_ne!(int(1), Value::from("1"));
        }

        #[test]
        fn test_dict_equality_ignores_order() {
            let a = Value::dict(vec![(int(1), int(2)), (int(3), int(4))]).unwrap();
            let b = Value::dict(vec![(int(3), int(4)), (int(1), int(2))]).unwrap();
            assert_eq!(a, b);
        }

        #[test]
        fn test_dict_rejects_unhashable_key() {
            let err = Value::dict(vec![(Value::List(vec![]), int(1))]).unwrap_err();
            assert_eq!(err.kind, ErrorKind::TypeMismatch);
        }

        #[test]
        fn test_dict_duplicate_key_keeps_position() {
            let d = Value::dict(vec![(int(1), int(2)), (int(3), int(4)), (int(1), int(5))]).unwrap();
            assert_eq!(d.repr(), "{1: 5, 3: 4}");
        }

        #[test]
        fn test_repr() {
            assert_eq!(Value::Tuple(vec![Value::from("a")]).repr(), "('a',)");
            assert_eq!(Value::Tuple(vec![]).repr(), "()");
            assert_eq!(Value::from("it's").repr(), "\"it's\"");
            assert_eq!(Value::from("a\nb").repr(), "'a\\nb'");
            assert_eq!(Value::Set(vec![]).repr(), "set()");
            assert_eq!(Value::Bool(false).repr(), "False");
            assert_eq!(Value::Type("int".into()).repr(), "<class 'int'>");
        }

        #[test]
        fn test_float_repr() {
            assert_eq!(float_repr(3.0), "3.0");
            assert_eq!(float_repr(0.1), "0.1");
            assert_eq!(float_repr(1e16), "1e+16");
            assert_eq!(float_repr(f64::INFINITY), "inf");
        }

        #[test]
        fn test_truthiness() {
            assert!(!Value::None.is_truthy());
            assert!(!int(0).is_truthy());
            assert!(Value::Float(0.5).is_truthy());
            assert!(!Value::from("").is_truthy());
            assert!(Value::Tuple(vec![Value::None]).is_truthy());
        }

        #[test]
        fn test_to_json() {
            let v = Value::dict(vec![(int(1), Value::List(vec![Value::None, Value::Bool(true)]))]).unwrap();
            assert_eq!(v.to_json().to_string(), r#"{"1":[null,true]}"#);
        }
    }

    mod ops_tests {
        use super::*;
        use crate::ops::{binary, compare, contains, iterate, unary};

        #[test]
        fn test_true_division_is_float() {
            let v = binary(BinaryOp::Div, &int(4), &int(2)).unwrap();
            assert!(matches!(v, Value::Float(f) if f == 2.0));
        }

        #[test]
        fn test_floor_division_types() {
            let v = binary(BinaryOp::FloorDiv, &int(1), &Value::Float(2.0)).unwrap();
            assert!(matches!(v, Value::Float(f) if f == 0.0));
            let v = binary(BinaryOp::FloorDiv, &int(-7), &int(2)).unwrap();
            assert_eq!(v, int(-4));
            assert!(matches!(v, Value::Int(_)));
        }

        #[test]
        fn test_float_floor_division_matches_modulo() {
            let q = binary(BinaryOp::FloorDiv, &int(1), &Value::Float(0.1)).unwrap();
            assert!(matches!(q, Value::Float(f) if f == 9.0));
            let r = binary(BinaryOp::Mod, &int(1), &Value::Float(0.1)).unwrap();
            assert!(matches!(r, Value::Float(f) if (f - 0.09999999999999995).abs() < 1e-15));

            let q = binary(BinaryOp::FloorDiv, &Value::Float(-7.5), &int(2)).unwrap();
            assert!(matches!(q, Value::Float(f) if f == -4.0));
            let r = binary(BinaryOp::Mod, &Value::Float(-7.5), &int(2)).unwrap();
            assert!(matches!(r, Value::Float(f) if f == 0.5));

            let r = binary(BinaryOp::Mod, &Value::Float(4.0), &int(-2)).unwrap();
            assert!(matches!(r, Value::Float(f) if f == 0.0 && f.is_sign_negative()));
        }

        #[test]
        fn test_float_pow_overflow() {
            let err = binary(BinaryOp::Pow, &Value::Float(10.0), &int(400)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidValue);
            let v = binary(BinaryOp::Pow, &Value::Float(f64::INFINITY), &int(2)).unwrap();
            assert!(matches!(v, Value::Float(f) if f.is_infinite()));
        }

        #[test]
        fn test_division_by_zero() {
            let err = binary(BinaryOp::Div, &int(1), &int(0)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::DivisionByZero);
            let err = binary(BinaryOp::Mod, &Value::Float(1.0), &int(0)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::DivisionByZero);
        }

        #[test]
        fn test_pow() {
            assert_eq!(binary(BinaryOp::Pow, &int(5 % 2), &int(3)).unwrap(), int(1));
            let v = binary(BinaryOp::Pow, &int(2), &int(-1)).unwrap();
            assert!(matches!(v, Value::Float(f) if f == 0.5));
        }

        #[test]
        fn test_bitwise() {
            assert_eq!(binary(BinaryOp::BitOr, &int(2), &int(4)).unwrap(), int(6));
            assert_eq!(binary(BinaryOp::BitXor, &int(3), &int(1)).unwrap(), int(2));
            assert_eq!(binary(BinaryOp::BitAnd, &int(3), &int(2)).unwrap(), int(2));
            let v = binary(BinaryOp::BitOr, &Value::Bool(true), &Value::Bool(false)).unwrap();
            assert!(matches!(v, Value::Bool(true)));
            let err = binary(BinaryOp::BitOr, &Value::Float(1.0), &int(1)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::TypeMismatch);
        }

        #[test]
        fn test_sequences() {
            let v = binary(BinaryOp::Add, &Value::from("abc"), &Value::from("def")).unwrap();
            assert_eq!(v, Value::from("abcdef"));
            let v = binary(BinaryOp::Mul, &int(2), &Value::List(vec![int(1)])).unwrap();
            assert_eq!(v, Value::List(vec![int(1), int(1)]));
            let v = binary(BinaryOp::Mul, &Value::from("ab"), &int(-1)).unwrap();
            assert_eq!(v, Value::from(""));
        }

        #[test]
        fn test_incompatible_operands() {
            let err = binary(BinaryOp::Add, &int(1), &Value::from("a")).unwrap_err();
            assert_eq!(err.kind, ErrorKind::TypeMismatch);
            assert!(err.message.contains("'int' and 'str'"));
        }

        #[test]
        fn test_unary() {
            assert_eq!(unary(UnaryOp::Neg, &int(34)).unwrap(), int(-34));
            assert_eq!(unary(UnaryOp::Invert, &Value::Bool(true)).unwrap(), int(-2));
            assert!(matches!(unary(UnaryOp::Not, &Value::List(vec![])).unwrap(), Value::Bool(true)));
            assert!(unary(UnaryOp::Neg, &Value::from("x")).is_err());
        }

        #[test]
        fn test_comparisons() {
            assert!(compare(CompareOp::Lt, &int(2), &Value::Float(3.141)).unwrap());
            assert!(!compare(CompareOp::Lt, &int(4), &Value::Float(3.141)).unwrap());
            assert!(compare(CompareOp::LtE, &Value::from("a"), &Value::from("b")).unwrap());
            assert!(compare(CompareOp::Lt, &Value::List(vec![int(1)]), &Value::List(vec![int(1), int(0)])).unwrap());
            assert!(!compare(CompareOp::Lt, &Value::Float(f64::NAN), &int(1)).unwrap());
            assert!(compare(CompareOp::Lt, &int(1), &Value::from("a")).is_err());
        }

        #[test]
        fn test_identity() {
            assert!(compare(CompareOp::Is, &Value::None, &Value::None).unwrap());
            assert!(!compare(CompareOp::Is, &Value::List(vec![]), &Value::List(vec![])).unwrap());
            assert!(!compare(CompareOp::Is, &int(1), &Value::Bool(true)).unwrap());
            assert!(compare(CompareOp::IsNot, &int(1), &Value::None).unwrap());
        }

        #[test]
        fn test_membership() {
            let list = Value::List(vec![Value::Float(3.141), Value::Float(6.282)]);
            assert!(compare(CompareOp::In, &Value::Float(3.141), &list).unwrap());
            assert!(!compare(CompareOp::NotIn, &Value::Float(3.141), &list).unwrap());
            assert!(contains(&Value::from("hello"), &Value::from("ell")).unwrap());
            assert!(contains(&Value::from("hello"), &int(1)).is_err());
            assert!(contains(&int(1), &int(1)).is_err());
        }

        #[test]
        fn test_iterate() {
            let d = Value::dict(vec![(Value::from("a"), int(1))]).unwrap();
            assert_eq!(iterate(&d).unwrap(), vec![Value::from("a")]);
            assert_eq!(iterate(&Value::from("ab")).unwrap().len(), 2);
            assert!(iterate(&int(3)).is_err());
        }

        #[test]
        fn test_set_algebra() {
            let a = Value::set(vec![int(1), int(2)]).unwrap();
            let b = Value::set(vec![int(2), int(3)]).unwrap();
            assert_eq!(binary(BinaryOp::BitAnd, &a, &b).unwrap(), Value::set(vec![int(2)]).unwrap());
            assert_eq!(binary(BinaryOp::Sub, &a, &b).unwrap(), Value::set(vec![int(1)]).unwrap());
            assert!(compare(CompareOp::LtE, &Value::set(vec![int(2)]).unwrap(), &a).unwrap());
        }
    }
}
