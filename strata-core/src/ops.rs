//! Operator semantics
//!
//! `bool` takes part in arithmetic as the integers 0 and 1. Mixing an int
//! with a float promotes to float. True division always yields a float;
//! floor division and modulo round toward negative infinity.

use crate::{BinaryOp, CompareOp, Integer, StrataError, StrataResult, UnaryOp, Value};
use std::cmp::Ordering;

/// Upper bound on sequences built by repetition or `range()`
pub const MAX_SEQUENCE_LEN: usize = 1 << 24;

/// Numeric view of a value
#[derive(Debug, Clone)]
pub(crate) enum Numeric {
    Int(Integer),
    Float(f64),
}

impl Numeric {
    pub(crate) fn of(value: &Value) -> Option<Numeric> {
        match value {
            Value::Bool(b) => Some(Numeric::Int(Integer::from(*b))),
            Value::Int(i) => Some(Numeric::Int(i.clone())),
            Value::Float(f) => Some(Numeric::Float(*f)),
            _ => None,
        }
    }

    fn is_float(&self) -> bool {
        matches!(self, Numeric::Float(_))
    }

    fn to_f64(&self) -> StrataResult<f64> {
        match self {
            Numeric::Int(i) => Ok(i.to_f64()?),
            Numeric::Float(f) => Ok(*f),
        }
    }

    pub(crate) fn num_eq(&self, other: &Numeric) -> bool {
        self.num_cmp(other) == Some(Ordering::Equal)
    }

    /// Exact comparison, `None` when a NaN is involved
    pub(crate) fn num_cmp(&self, other: &Numeric) -> Option<Ordering> {
        match (self, other) {
            (Numeric::Int(a), Numeric::Int(b)) => Some(a.cmp(b)),
            (Numeric::Float(a), Numeric::Float(b)) => a.partial_cmp(b),
            (Numeric::Int(a), Numeric::Float(b)) => int_float_cmp(a, *b),
            (Numeric::Float(a), Numeric::Int(b)) => int_float_cmp(b, *a).map(Ordering::reverse),
        }
    }
}

fn int_float_cmp(int: &Integer, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if float.is_infinite() {
        return Some(if float > 0.0 { Ordering::Less } else { Ordering::Greater });
    }
    let whole = Integer::from_f64(float.trunc()).ok()?;
    match int.cmp(&whole) {
        Ordering::Equal if float.fract() > 0.0 => Some(Ordering::Less),
        Ordering::Equal if float.fract() < 0.0 => Some(Ordering::Greater),
        other => Some(other),
    }
}

// ========== Unary ==========

pub fn unary(op: UnaryOp, operand: &Value) -> StrataResult<Value> {
    if op == UnaryOp::Not {
        return Ok(Value::Bool(!operand.is_truthy()));
    }
    let bad_operand = || {
        StrataError::type_mismatch(format!(
            "bad operand type for unary {}: '{}'",
            op.symbol(),
            operand.type_name()
        ))
    };
    match (op, Numeric::of(operand).ok_or_else(bad_operand)?) {
        (UnaryOp::Neg, Numeric::Int(i)) => Ok(Value::Int(i.neg())),
        (UnaryOp::Neg, Numeric::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Numeric::Int(i)) => Ok(Value::Int(i)),
        (UnaryOp::Pos, Numeric::Float(f)) => Ok(Value::Float(f)),
        (UnaryOp::Invert, Numeric::Int(i)) => Ok(Value::Int(i.invert())),
        _ => Err(bad_operand()),
    }
}

// ========== Binary ==========

pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> StrataResult<Value> {
    if let (Value::Bool(a), Value::Bool(b)) = (left, right) {
        match op {
            BinaryOp::BitAnd => return Ok(Value::Bool(a & b)),
            BinaryOp::BitOr => return Ok(Value::Bool(a | b)),
            BinaryOp::BitXor => return Ok(Value::Bool(a ^ b)),
            _ => {}
        }
    }

    if let (Some(a), Some(b)) = (Numeric::of(left), Numeric::of(right)) {
        if op.is_integral() && (a.is_float() || b.is_float()) {
            return Err(unsupported(op, left, right));
        }
        return match (a, b) {
            (Numeric::Int(x), Numeric::Int(y)) => integer_arithmetic(op, &x, &y),
            (x, y) => float_arithmetic(op, x.to_f64()?, y.to_f64()?),
        };
    }

    if op == BinaryOp::Mul {
        if let Some(result) = repeat(left, right).or_else(|| repeat(right, left)) {
            return result;
        }
    }

    match (op, left, right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
        (BinaryOp::Add, Value::List(a), Value::List(b)) => Ok(Value::List(concat(a, b))),
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => Ok(Value::Tuple(concat(a, b))),
        (BinaryOp::Sub, Value::Set(a), Value::Set(b)) => {
            Ok(Value::Set(a.iter().filter(|x| !b.contains(x)).cloned().collect()))
        }
        (BinaryOp::BitOr, Value::Set(a), Value::Set(b)) => Value::set(concat(a, b)),
        (BinaryOp::BitAnd, Value::Set(a), Value::Set(b)) => {
            Ok(Value::Set(a.iter().filter(|x| b.contains(x)).cloned().collect()))
        }
        (BinaryOp::BitXor, Value::Set(a), Value::Set(b)) => {
            let left_only = a.iter().filter(|x| !b.contains(x));
            let right_only = b.iter().filter(|x| !a.contains(x));
            Ok(Value::Set(left_only.chain(right_only).cloned().collect()))
        }
        (BinaryOp::BitOr, Value::Dict(a), Value::Dict(b)) => {
            Value::dict(a.iter().chain(b.iter()).cloned())
        }
        _ => Err(unsupported(op, left, right)),
    }
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> StrataError {
    StrataError::unsupported_operand(op.symbol(), left.type_name(), right.type_name())
}

fn concat(a: &[Value], b: &[Value]) -> Vec<Value> {
    a.iter().chain(b.iter()).cloned().collect()
}

/// `sequence * count`; `None` when the operand types do not fit
fn repeat(sequence: &Value, count: &Value) -> Option<StrataResult<Value>> {
    let count = match count {
        Value::Int(_) | Value::Bool(_) => count.to_integer()?,
        _ => return None,
    };
    let times = if count.is_negative() { Some(0) } else { count.to_usize() };
    let len = match sequence {
        Value::Str(s) => s.len(),
        Value::List(items) | Value::Tuple(items) => items.len(),
        _ => return None,
    };
    let times = match times {
        Some(times) if len.saturating_mul(times) <= MAX_SEQUENCE_LEN => times,
        _ => return Some(Err(StrataError::invalid_value("repeated sequence too large"))),
    };
    Some(Ok(match sequence {
        Value::Str(s) => Value::Str(s.repeat(times)),
        Value::List(items) => Value::List(cycle(items, times)),
        Value::Tuple(items) => Value::Tuple(cycle(items, times)),
        _ => return None,
    }))
}

fn cycle(items: &[Value], times: usize) -> Vec<Value> {
    items.iter().cycle().take(items.len() * times).cloned().collect()
}

fn integer_arithmetic(op: BinaryOp, a: &Integer, b: &Integer) -> StrataResult<Value> {
    let result = match op {
        BinaryOp::Add => a.add(b),
        BinaryOp::Sub => a.sub(b),
        BinaryOp::Mul => a.mul(b),
        BinaryOp::Div => {
            if b.is_zero() {
                return Err(StrataError::div_zero("division by zero"));
            }
            return Ok(Value::Float(a.to_f64()? / b.to_f64()?));
        }
        BinaryOp::FloorDiv => a.floor_div(b)?,
        BinaryOp::Mod => a.modulo(b)?,
        BinaryOp::Pow if b.is_negative() => {
            return float_arithmetic(BinaryOp::Pow, a.to_f64()?, b.to_f64()?);
        }
        BinaryOp::Pow => a.pow(b)?,
        BinaryOp::LShift => a.shl(b)?,
        BinaryOp::RShift => a.shr(b)?,
        BinaryOp::BitOr => a.bit_or(b),
        BinaryOp::BitXor => a.bit_xor(b),
        BinaryOp::BitAnd => a.bit_and(b),
    };
    Ok(Value::Int(result))
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> StrataResult<Value> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod if b == 0.0 => {
            return Err(StrataError::div_zero(format!("float {} by zero", op.symbol())));
        }
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => float_divmod(a, b).0,
        BinaryOp::Mod => float_divmod(a, b).1,
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(StrataError::div_zero("0.0 cannot be raised to a negative power"));
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err(StrataError::invalid_value(
                    "negative number cannot be raised to a fractional power",
                ));
            }
            let result = a.powf(b);
            if result.is_infinite() && a.is_finite() && b.is_finite() {
                return Err(StrataError::invalid_value("float power result too large"));
            }
            result
        }
        _ => {
            return Err(StrataError::unsupported_operand(op.symbol(), "float", "float"));
        }
    };
    Ok(Value::Float(result))
}

/// Floor quotient and remainder with `a == q * b + r`, the quotient derived
/// from the same `fmod` remainder
fn float_divmod(a: f64, b: f64) -> (f64, f64) {
    let mut rem = a % b;
    let mut div = (a - rem) / b;
    if rem != 0.0 {
        if (b < 0.0) != (rem < 0.0) {
            rem += b;
            div -= 1.0;
        }
    } else {
        rem = 0.0_f64.copysign(b);
    }
    let quotient = if div != 0.0 {
        let floored = div.floor();
        if div - floored > 0.5 {
            floored + 1.0
        } else {
            floored
        }
    } else {
        0.0_f64.copysign(a / b)
    };
    (quotient, rem)
}

// ========== Comparison ==========

pub fn compare(op: CompareOp, left: &Value, right: &Value) -> StrataResult<bool> {
    match op {
        CompareOp::Eq => Ok(left == right),
        CompareOp::NotEq => Ok(left != right),
        CompareOp::Is => Ok(identical(left, right)),
        CompareOp::IsNot => Ok(!identical(left, right)),
        CompareOp::In => contains(right, left),
        CompareOp::NotIn => contains(right, left).map(|found| !found),
        CompareOp::Lt | CompareOp::LtE | CompareOp::Gt | CompareOp::GtE => {
            if let (Value::Set(a), Value::Set(b)) = (left, right) {
                return Ok(set_compare(op, a, b));
            }
            let ordering = ordering(left, right, op.symbol())?;
            Ok(match (op, ordering) {
                (_, None) => false,
                (CompareOp::Lt, Some(o)) => o == Ordering::Less,
                (CompareOp::LtE, Some(o)) => o != Ordering::Greater,
                (CompareOp::Gt, Some(o)) => o == Ordering::Greater,
                (_, Some(o)) => o != Ordering::Less,
            })
        }
    }
}

fn set_compare(op: CompareOp, a: &[Value], b: &[Value]) -> bool {
    let subset = a.iter().all(|x| b.contains(x));
    let superset = b.iter().all(|x| a.contains(x));
    match op {
        CompareOp::Lt => subset && a.len() < b.len(),
        CompareOp::LtE => subset,
        CompareOp::Gt => superset && a.len() > b.len(),
        _ => superset,
    }
}

/// Total order where defined; `Ok(None)` for NaN
pub fn ordering(left: &Value, right: &Value, symbol: &str) -> StrataResult<Option<Ordering>> {
    if let (Some(a), Some(b)) = (Numeric::of(left), Numeric::of(right)) {
        return Ok(a.num_cmp(&b));
    }
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                if x != y {
                    return ordering(x, y, symbol);
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        }
        _ => Err(StrataError::type_mismatch(format!(
            "'{}' not supported between instances of '{}' and '{}'",
            symbol,
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Identity: singletons by value, containers never, other scalars by type and value
fn identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::List(_) | Value::Dict(_) | Value::Set(_), _) => false,
        _ => left.type_name() == right.type_name() && left == right,
    }
}

/// Membership test `item in container`
pub fn contains(container: &Value, item: &Value) -> StrataResult<bool> {
    match container {
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => Ok(items.contains(item)),
        Value::Dict(_) => {
            if !item.is_hashable() {
                return Err(StrataError::unhashable(item.type_name()));
            }
            Ok(container.get(item).is_some())
        }
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(needle.as_str())),
            other => Err(StrataError::type_mismatch(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        other => Err(StrataError::type_mismatch(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// Elements produced by iterating a value; dicts yield their keys
pub fn iterate(value: &Value) -> StrataResult<Vec<Value>> {
    match value {
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => Ok(items.clone()),
        Value::Dict(entries) => Ok(entries.iter().map(|(k, _)| k.clone()).collect()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        other => Err(StrataError::type_mismatch(format!(
            "'{}' object is not iterable",
            other.type_name()
        ))),
    }
}
