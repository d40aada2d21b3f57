//! Runtime values
//!
//! Values mirror the literal and container types a config expression can
//! produce: none, booleans, arbitrary precision integers, floats, strings,
//! lists, tuples, dicts and sets, plus the type objects returned by
//! `type()`. Dicts and sets keep insertion order.

use crate::ops::Numeric;
use crate::{Integer, StrataError, StrataResult};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Runtime value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    None,
    Bool(bool),
    Int(Integer),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Insertion ordered, keys unique and hashable
    Dict(Vec<(Value, Value)>),
    /// Insertion ordered, members unique and hashable
    Set(Vec<Value>),
    /// Result of `type(x)`, holds the type name
    Type(String),
}

impl Value {
    // ========== Checked Constructors ==========

    /// Build a dict; later duplicates overwrite earlier values in place
    pub fn dict(pairs: impl IntoIterator<Item = (Value, Value)>) -> StrataResult<Value> {
        let mut entries: Vec<(Value, Value)> = Vec::new();
        for (key, value) in pairs {
            if !key.is_hashable() {
                return Err(StrataError::unhashable(key.type_name()));
            }
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
        Ok(Value::Dict(entries))
    }

    /// Build a set, dropping duplicates
    pub fn set(items: impl IntoIterator<Item = Value>) -> StrataResult<Value> {
        let mut members: Vec<Value> = Vec::new();
        for item in items {
            if !item.is_hashable() {
                return Err(StrataError::unhashable(item.type_name()));
            }
            if !members.contains(&item) {
                members.push(item);
            }
        }
        Ok(Value::Set(members))
    }

    pub fn int(n: i64) -> Value {
        Value::Int(Integer::from_i64(n))
    }

    // ========== Safe Accessors (never panic) ==========

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of ints and bools
    pub fn to_integer(&self) -> Option<Integer> {
        match self {
            Value::Bool(b) => Some(Integer::from(*b)),
            Value::Int(i) => Some(i.clone()),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Look a key up in a dict
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            Value::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Type name for error messages and `type()`
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Set(_) => "set",
            Value::Type(_) => "type",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => !i.is_zero(),
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => !items.is_empty(),
            Value::Dict(entries) => !entries.is_empty(),
            Value::Type(_) => true,
        }
    }

    /// Whether the value may be a dict key or set member
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Dict(_) | Value::Set(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            _ => true,
        }
    }

    // ========== Display ==========

    /// Source-like representation, strings quoted
    pub fn repr(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => float_repr(*f),
            Value::Str(s) => str_repr(s),
            Value::List(items) => format!("[{}]", join_repr(items)),
            Value::Tuple(items) if items.len() == 1 => format!("({},)", items[0].repr()),
            Value::Tuple(items) => format!("({})", join_repr(items)),
            Value::Dict(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Set(items) if items.is_empty() => "set()".to_string(),
            Value::Set(items) => format!("{{{}}}", join_repr(items)),
            Value::Type(name) => format!("<class '{}'>", name),
        }
    }

    /// Convert to JSON; dict keys become their `str()` form
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::None => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => match i.to_i64() {
                Some(n) => JsonValue::from(n),
                None => JsonValue::String(i.to_string()),
            },
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Str(s) => JsonValue::String(s.clone()),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
                JsonValue::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Dict(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
            Value::Type(_) => JsonValue::String(self.repr()),
        }
    }
}

fn join_repr(items: &[Value]) -> String {
    items.iter().map(Value::repr).collect::<Vec<_>>().join(", ")
}

/// Shortest round-tripping float text, exponent written as `e+16` / `e-05`
pub fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

/// Quote a string for display, escaping whatever the quotes cannot carry
pub fn str_repr(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

impl PartialEq for Value {
    /// Mixed numeric equality (`1 == 1.0 == True`), order-insensitive dicts and sets
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (Numeric::of(self), Numeric::of(other)) {
            return a.num_eq(&b);
        }
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, value)| {
                        b.iter().any(|(other_key, other_value)| key == other_key && value == other_value)
                    })
            }
            (Value::Set(a), Value::Set(b)) => a.len() == b.len() && a.iter().all(|x| b.contains(x)),
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    /// `str()` semantics: strings bare, everything else as `repr()`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.repr()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

// From implementations for convenience
impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(Integer::from_i64(n))
    }
}

impl From<Integer> for Value {
    fn from(i: Integer) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
