//! Numeric functions

use crate::prelude::*;
use strata_core::ops;
use strata_core::BinaryOp;

pub struct Abs;
pub struct Divmod;
pub struct Pow;
pub struct Round;

static ABS_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "int | float", "Value")];
static ABS_EXAMPLES: [&str; 2] = ["abs(-5)", "abs(-2.5)"];
static ABS_RELATED: [&str; 1] = ["round"];

static DIVMOD_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("a", "int | float", "Dividend"),
    ArgMeta::required("b", "int | float", "Divisor"),
];
static DIVMOD_EXAMPLES: [&str; 2] = ["divmod(7, 2)", "divmod(-7, 2)"];
static DIVMOD_RELATED: [&str; 1] = ["pow"];

static POW_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("base", "int | float", "Base value"),
    ArgMeta::required("exp", "int | float", "Exponent"),
    ArgMeta::optional("mod", "int", "Modulus, integers only", "None"),
];
static POW_EXAMPLES: [&str; 3] = ["pow(2, 10)", "pow(2, -1)", "pow(3, 200, 13)"];
static POW_RELATED: [&str; 1] = ["divmod"];

static ROUND_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("number", "int | float", "Value to round"),
    ArgMeta::optional("ndigits", "int", "Decimal digits to keep, may be negative", "None"),
];
static ROUND_KEYWORDS: [&str; 1] = ["ndigits"];
static ROUND_EXAMPLES: [&str; 3] = ["round(2.5)", "round(3.14159, 2)", "round(1234, -2)"];
static ROUND_RELATED: [&str; 1] = ["abs"];

impl BuiltinFunction for Abs {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "abs",
            description: "Absolute value",
            usage: "abs(x)",
            args: &ABS_ARGS,
            keywords: &[],
            returns: "int | float",
            examples: &ABS_EXAMPLES,
            category: "math",
            related: &ABS_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("abs", 1, 1)?;
        match &args.args()[0] {
            Value::Float(f) => Ok(Value::Float(f.abs())),
            other => match other.to_integer() {
                Some(i) => Ok(Value::Int(i.abs())),
                None => Err(StrataError::type_mismatch(format!(
                    "bad operand type for abs(): '{}'",
                    other.type_name()
                ))),
            },
        }
    }
}

impl BuiltinFunction for Divmod {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "divmod",
            description: "Floor quotient and remainder as a pair",
            usage: "divmod(a, b)",
            args: &DIVMOD_ARGS,
            keywords: &[],
            returns: "tuple",
            examples: &DIVMOD_EXAMPLES,
            category: "math",
            related: &DIVMOD_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("divmod", 2, 2)?;
        let (a, b) = (&args.args()[0], &args.args()[1]);
        let quotient = ops::binary(BinaryOp::FloorDiv, a, b)?;
        let remainder = ops::binary(BinaryOp::Mod, a, b)?;
        Ok(Value::Tuple(vec![quotient, remainder]))
    }
}

impl BuiltinFunction for Pow {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "pow",
            description: "Power, optionally modulo an integer",
            usage: "pow(base, exp[, mod])",
            args: &POW_ARGS,
            keywords: &[],
            returns: "int | float",
            examples: &POW_EXAMPLES,
            category: "math",
            related: &POW_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("pow", 2, 3)?;
        let values = args.args();
        match values.get(2).filter(|m| !m.is_none()) {
            None => ops::binary(BinaryOp::Pow, &values[0], &values[1]),
            Some(modulus) => {
                let (base, exp, modulus) = match (
                    values[0].to_integer(),
                    values[1].to_integer(),
                    modulus.to_integer(),
                ) {
                    (Some(b), Some(e), Some(m)) => (b, e, m),
                    _ => {
                        return Err(StrataError::type_mismatch(
                            "pow() 3rd argument not allowed unless all arguments are integers",
                        ))
                    }
                };
                if modulus.is_zero() {
                    return Err(StrataError::invalid_value("pow() 3rd argument cannot be 0"));
                }
                if exp.is_negative() {
                    return Err(StrataError::invalid_value(
                        "pow() negative exponent with a modulus is not supported",
                    ));
                }
                Ok(Value::Int(base.pow_mod(&exp, &modulus)?))
            }
        }
    }
}

impl BuiltinFunction for Round {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "round",
            description: "Round half to even, to an int or to ndigits decimals",
            usage: "round(number[, ndigits])",
            args: &ROUND_ARGS,
            keywords: &ROUND_KEYWORDS,
            returns: "int | float",
            examples: &ROUND_EXAMPLES,
            category: "math",
            related: &ROUND_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("round", 1, 2)?;
        let number = &args.args()[0];
        let ndigits = match args.arg(1).filter(|v| !v.is_none()).or_else(|| args.keyword("ndigits")) {
            Some(n) => Some(require_i64(n, "round", "ndigits")?),
            None => None,
        };
        match (number, ndigits) {
            (Value::Float(f), None) => Ok(Value::Int(Integer::from_f64(f.round_ties_even())?)),
            (Value::Float(f), Some(n)) => Ok(Value::Float(round_float(*f, n))),
            (other, ndigits) => {
                let int = other.to_integer().ok_or_else(|| {
                    StrataError::type_mismatch(format!(
                        "type {} doesn't define __round__ method",
                        other.type_name()
                    ))
                })?;
                match ndigits {
                    Some(n) if n < 0 => Ok(Value::Int(round_integer(&int, n.unsigned_abs())?)),
                    _ => Ok(Value::Int(int)),
                }
            }
        }
    }
}

/// Round a float to `ndigits` decimals, ties to even on the exact binary value
fn round_float(value: f64, ndigits: i64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    if ndigits >= 0 {
        let digits = usize::try_from(ndigits).unwrap_or(usize::MAX).min(340);
        return format!("{:.*}", digits, value).parse().unwrap_or(value);
    }
    let scale = 10f64.powi(i32::try_from(-ndigits).unwrap_or(i32::MAX).min(400));
    if scale.is_infinite() {
        return 0.0 * value;
    }
    (value / scale).round_ties_even() * scale
}

/// Round an integer to a multiple of `10^places`, ties to even
fn round_integer(value: &Integer, places: u64) -> StrataResult<Integer> {
    let exponent = Integer::from(usize::try_from(places).unwrap_or(usize::MAX));
    let unit = Integer::from_i64(10).pow(&exponent)?;
    let (quotient, remainder) = value.div_mod(&unit)?;
    let twice = remainder.add(&remainder);
    let quotient = match twice.cmp(&unit) {
        std::cmp::Ordering::Greater => quotient.add(&Integer::from_i64(1)),
        std::cmp::Ordering::Equal if !quotient.modulo(&Integer::from_i64(2))?.is_zero() => {
            quotient.add(&Integer::from_i64(1))
        }
        _ => quotient,
    };
    Ok(quotient.mul(&unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: &dyn BuiltinFunction, values: Vec<Value>) -> StrataResult<Value> {
        f.call(&CallArgs::positional(values))
    }

    #[test]
    fn test_abs() {
        assert_eq!(call(&Abs, vec![Value::int(-5)]).unwrap(), Value::int(5));
        assert_eq!(call(&Abs, vec![Value::Float(-2.5)]).unwrap(), Value::Float(2.5));
        assert_eq!(call(&Abs, vec![Value::Bool(true)]).unwrap(), Value::int(1));
        let err = call(&Abs, vec![Value::from("x")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_divmod() {
        let result = call(&Divmod, vec![Value::int(-7), Value::int(2)]).unwrap();
        assert_eq!(result, Value::Tuple(vec![Value::int(-4), Value::int(1)]));
        let err = call(&Divmod, vec![Value::int(1), Value::int(0)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        let result = call(&Divmod, vec![Value::int(1), Value::Float(0.1)]).unwrap();
        assert_eq!(
            result,
            Value::Tuple(vec![Value::Float(9.0), Value::Float(0.09999999999999995)])
        );
    }

    #[test]
    fn test_pow() {
        assert_eq!(call(&Pow, vec![Value::int(2), Value::int(10)]).unwrap(), Value::int(1024));
        assert_eq!(call(&Pow, vec![Value::int(2), Value::int(-1)]).unwrap(), Value::Float(0.5));
        assert_eq!(
            call(&Pow, vec![Value::int(3), Value::int(200), Value::int(13)]).unwrap(),
            Value::int(9)
        );
        let err = call(&Pow, vec![Value::int(3), Value::int(2), Value::int(0)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
        let err = call(&Pow, vec![Value::Float(3.0), Value::int(2), Value::int(5)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_round_to_int() {
        let result = call(&Round, vec![Value::Float(2.5)]).unwrap();
        assert!(matches!(result, Value::Int(_)));
        assert_eq!(result, Value::int(2));
        assert_eq!(call(&Round, vec![Value::Float(3.5)]).unwrap(), Value::int(4));
        assert_eq!(call(&Round, vec![Value::Float(-0.5)]).unwrap(), Value::int(0));
        assert_eq!(call(&Round, vec![Value::int(7)]).unwrap(), Value::int(7));
    }

    #[test]
    fn test_round_ndigits() {
        let result = call(&Round, vec![Value::Float(3.14159), Value::int(2)]).unwrap();
        assert_eq!(result, Value::Float(3.14));
        let result = call(&Round, vec![Value::Float(1234.5), Value::int(-2)]).unwrap();
        assert_eq!(result, Value::Float(1200.0));
        let args = CallArgs::positional(vec![Value::Float(2.675)]).with_keyword("ndigits", Value::int(2));
        // 2.675 is stored as 2.67499999...
        assert_eq!(Round.call(&args).unwrap(), Value::Float(2.67));
    }

    #[test]
    fn test_round_integer_negative_ndigits() {
        assert_eq!(call(&Round, vec![Value::int(1250), Value::int(-2)]).unwrap(), Value::int(1200));
        assert_eq!(call(&Round, vec![Value::int(1350), Value::int(-2)]).unwrap(), Value::int(1400));
        assert_eq!(call(&Round, vec![Value::int(-1251), Value::int(-2)]).unwrap(), Value::int(-1300));
        assert_eq!(call(&Round, vec![Value::int(1234), Value::int(2)]).unwrap(), Value::int(1234));
    }

    #[test]
    fn test_round_rejects_strings() {
        let err = call(&Round, vec![Value::from("1.5")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }
}
