//! Type constructors and conversions

use crate::prelude::*;

pub struct Bin;
pub struct Bool;
pub struct Chr;
pub struct Dict;
pub struct Float;
pub struct Hex;
pub struct Int;
pub struct List;
pub struct Oct;
pub struct Ord;
pub struct Set;
pub struct Str;
pub struct Tuple;
pub struct Type;

static INT_VALUE_ARG: [ArgMeta; 1] = [ArgMeta::required("x", "int", "Integer to render")];
static BIN_EXAMPLES: [&str; 2] = ["bin(5)", "bin(-5)"];
static HEX_EXAMPLES: [&str; 2] = ["hex(255)", "hex(-1)"];
static OCT_EXAMPLES: [&str; 1] = ["oct(8)"];
static RADIX_RELATED: [&str; 4] = ["bin", "hex", "oct", "int"];

static ANY_OPTIONAL_ARG: [ArgMeta; 1] = [ArgMeta::optional("x", "any", "Value to convert", "empty")];
static ITERABLE_OPTIONAL_ARG: [ArgMeta; 1] = [ArgMeta::optional("iterable", "iterable", "Elements", "empty")];
static CONTAINER_RELATED: [&str; 4] = ["list", "tuple", "set", "dict"];
static SCALAR_RELATED: [&str; 4] = ["bool", "int", "float", "str"];

static BOOL_EXAMPLES: [&str; 2] = ["bool([])", "bool('x')"];

static CHR_ARGS: [ArgMeta; 1] = [ArgMeta::required("i", "int", "Code point in 0..=0x10ffff")];
static CHR_EXAMPLES: [&str; 1] = ["chr(97)"];
static ORD_ARGS: [ArgMeta; 1] = [ArgMeta::required("c", "str", "Single character")];
static ORD_EXAMPLES: [&str; 1] = ["ord('a')"];
static CHAR_RELATED: [&str; 2] = ["chr", "ord"];

static DICT_ARGS: [ArgMeta; 2] = [
    ArgMeta::optional("mapping", "dict | iterable of pairs", "Initial entries", "empty"),
    ArgMeta::optional("**kwargs", "any", "Entries keyed by keyword name", "none"),
];
static DICT_KEYWORDS: [&str; 1] = ["**"];
static DICT_EXAMPLES: [&str; 3] = ["dict(a=1, b=2)", "dict([('a', 1)])", "dict({'a': 1}, b=2)"];

static FLOAT_EXAMPLES: [&str; 3] = ["float(3)", "float('1e-3')", "float('inf')"];

static INT_ARGS: [ArgMeta; 2] = [
    ArgMeta::optional("x", "int | float | str", "Value to convert", "0"),
    ArgMeta::optional("base", "int", "Radix for string input, 0 infers from prefix", "10"),
];
static INT_KEYWORDS: [&str; 1] = ["base"];
static INT_EXAMPLES: [&str; 3] = ["int(3.9)", "int('ff', 16)", "int('0b101', base=0)"];

static LIST_EXAMPLES: [&str; 2] = ["list('abc')", "list((1, 2))"];
static SET_EXAMPLES: [&str; 1] = ["set([1, 1, 2])"];
static TUPLE_EXAMPLES: [&str; 1] = ["tuple([1, 2])"];
static STR_EXAMPLES: [&str; 2] = ["str(1.5)", "str([1, 'a'])"];

static TYPE_ARGS: [ArgMeta; 1] = [ArgMeta::required("x", "any", "Value to inspect")];
static TYPE_EXAMPLES: [&str; 2] = ["type(1)", "type(1) == type(2)"];

/// `0b`/`0o`/`0x` rendering shared by `bin`, `oct` and `hex`
fn radix_literal(func: &str, args: &CallArgs, radix: u32, prefix: &str) -> StrataResult<Value> {
    args.arity(func, 1, 1)?;
    let value = require_int(&args.args()[0])?;
    let digits = value.abs().to_str_radix(radix);
    let sign = if value.is_negative() { "-" } else { "" };
    Ok(Value::Str(format!("{}{}{}", sign, prefix, digits)))
}

impl BuiltinFunction for Bin {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "bin",
            description: "Binary literal text of an integer",
            usage: "bin(x)",
            args: &INT_VALUE_ARG,
            keywords: &[],
            returns: "str",
            examples: &BIN_EXAMPLES,
            category: "conversion",
            related: &RADIX_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        radix_literal("bin", args, 2, "0b")
    }
}

impl BuiltinFunction for Hex {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "hex",
            description: "Hexadecimal literal text of an integer",
            usage: "hex(x)",
            args: &INT_VALUE_ARG,
            keywords: &[],
            returns: "str",
            examples: &HEX_EXAMPLES,
            category: "conversion",
            related: &RADIX_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        radix_literal("hex", args, 16, "0x")
    }
}

impl BuiltinFunction for Oct {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "oct",
            description: "Octal literal text of an integer",
            usage: "oct(x)",
            args: &INT_VALUE_ARG,
            keywords: &[],
            returns: "str",
            examples: &OCT_EXAMPLES,
            category: "conversion",
            related: &RADIX_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        radix_literal("oct", args, 8, "0o")
    }
}

impl BuiltinFunction for Bool {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "bool",
            description: "Truthiness of a value",
            usage: "bool([x])",
            args: &ANY_OPTIONAL_ARG,
            keywords: &[],
            returns: "bool",
            examples: &BOOL_EXAMPLES,
            category: "conversion",
            related: &SCALAR_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("bool", 0, 1)?;
        Ok(Value::Bool(args.arg(0).map_or(false, Value::is_truthy)))
    }
}

impl BuiltinFunction for Chr {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "chr",
            description: "One character string for a code point",
            usage: "chr(i)",
            args: &CHR_ARGS,
            keywords: &[],
            returns: "str",
            examples: &CHR_EXAMPLES,
            category: "conversion",
            related: &CHAR_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("chr", 1, 1)?;
        let out_of_range = || StrataError::invalid_value("chr() arg not in range(0x110000)");
        let code = require_int(&args.args()[0])?
            .to_i64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(out_of_range)?;
        let c = char::from_u32(code).ok_or_else(out_of_range)?;
        Ok(Value::Str(c.to_string()))
    }
}

impl BuiltinFunction for Ord {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "ord",
            description: "Code point of a one character string",
            usage: "ord(c)",
            args: &ORD_ARGS,
            keywords: &[],
            returns: "int",
            examples: &ORD_EXAMPLES,
            category: "conversion",
            related: &CHAR_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("ord", 1, 1)?;
        let text = match &args.args()[0] {
            Value::Str(s) => s,
            other => {
                return Err(StrataError::type_mismatch(format!(
                    "ord() expected string of length 1, but {} found",
                    other.type_name()
                )))
            }
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Value::Int(Integer::from(c as usize))),
            _ => Err(StrataError::type_mismatch(format!(
                "ord() expected a character, but string of length {} found",
                text.chars().count()
            ))),
        }
    }
}

impl BuiltinFunction for Dict {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "dict",
            description: "Dict from a mapping, an iterable of pairs and keyword entries",
            usage: "dict([mapping], **kwargs)",
            args: &DICT_ARGS,
            keywords: &DICT_KEYWORDS,
            returns: "dict",
            examples: &DICT_EXAMPLES,
            category: "conversion",
            related: &CONTAINER_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("dict", 0, 1)?;
        let mut pairs = Vec::new();
        match args.arg(0) {
            None => {}
            Some(Value::Dict(entries)) => pairs.extend(entries.iter().cloned()),
            Some(iterable) => {
                for (index, item) in elements(iterable)?.into_iter().enumerate() {
                    match item {
                        Value::List(mut pair) | Value::Tuple(mut pair) if pair.len() == 2 => {
                            let value = pair.pop().unwrap_or_default();
                            let key = pair.pop().unwrap_or_default();
                            pairs.push((key, value));
                        }
                        Value::List(pair) | Value::Tuple(pair) => {
                            return Err(StrataError::invalid_value(format!(
                                "dictionary update sequence element #{} has length {}; 2 is required",
                                index,
                                pair.len()
                            )))
                        }
                        other => {
                            return Err(StrataError::type_mismatch(format!(
                                "cannot convert dictionary update sequence element #{} ('{}') to a sequence",
                                index,
                                other.type_name()
                            )))
                        }
                    }
                }
            }
        }
        pairs.extend(
            args.keywords()
                .iter()
                .map(|(k, v)| (Value::Str(k.clone()), v.clone())),
        );
        Value::dict(pairs)
    }
}

impl BuiltinFunction for Float {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "float",
            description: "Float from a number or numeric text",
            usage: "float([x])",
            args: &ANY_OPTIONAL_ARG,
            keywords: &[],
            returns: "float",
            examples: &FLOAT_EXAMPLES,
            category: "conversion",
            related: &SCALAR_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("float", 0, 1)?;
        match args.arg(0) {
            None => Ok(Value::Float(0.0)),
            Some(Value::Float(f)) => Ok(Value::Float(*f)),
            Some(Value::Str(text)) => parse_float(text).map(Value::Float).ok_or_else(|| {
                StrataError::invalid_value(format!("could not convert string to float: '{}'", text))
            }),
            Some(other) => match other.to_integer() {
                Some(i) => Ok(Value::Float(i.to_f64()?)),
                None => Err(StrataError::type_mismatch(format!(
                    "float() argument must be a string or a real number, not '{}'",
                    other.type_name()
                ))),
            },
        }
    }
}

/// Parse float text: optional sign, `inf`/`infinity`/`nan` in any case,
/// `_` allowed only between digits
fn parse_float(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let magnitude = match body.to_ascii_lowercase().as_str() {
        "inf" | "infinity" => f64::INFINITY,
        "nan" => f64::NAN,
        lower => {
            let bytes = lower.as_bytes();
            let misplaced_underscore = bytes.iter().enumerate().any(|(i, b)| {
                *b == b'_'
                    && !(i > 0
                        && bytes[i - 1].is_ascii_digit()
                        && bytes.get(i + 1).map_or(false, u8::is_ascii_digit))
            });
            if misplaced_underscore || !bytes.iter().any(u8::is_ascii_digit) {
                return None;
            }
            let cleaned: String = lower.chars().filter(|c| *c != '_').collect();
            if cleaned.starts_with(['+', '-']) {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
    };
    Some(if negative { -magnitude } else { magnitude })
}

impl BuiltinFunction for Int {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "int",
            description: "Integer from a number (truncating) or from text in a radix",
            usage: "int([x], base=10)",
            args: &INT_ARGS,
            keywords: &INT_KEYWORDS,
            returns: "int",
            examples: &INT_EXAMPLES,
            category: "conversion",
            related: &RADIX_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("int", 0, 2)?;
        let base = match args.arg(1).or_else(|| args.keyword("base")) {
            Some(b) => {
                let radix = require_i64(b, "int", "base")?;
                match u32::try_from(radix) {
                    Ok(r) if r == 0 || (2..=36).contains(&r) => Some(r),
                    _ => {
                        return Err(StrataError::invalid_value(
                            "int() base must be >= 2 and <= 36, or 0",
                        ))
                    }
                }
            }
            None => None,
        };
        match (args.arg(0), base) {
            (None, None) => Ok(Value::int(0)),
            (None, Some(_)) => Err(StrataError::type_mismatch("int() missing string argument")),
            (Some(Value::Str(text)), base) => Ok(Value::Int(Integer::parse(text, base.unwrap_or(10))?)),
            (Some(_), Some(_)) => Err(StrataError::type_mismatch(
                "int() can't convert non-string with explicit base",
            )),
            (Some(Value::Float(f)), None) => Ok(Value::Int(Integer::from_f64(*f)?)),
            (Some(other), None) => other.to_integer().map(Value::Int).ok_or_else(|| {
                StrataError::type_mismatch(format!(
                    "int() argument must be a string or a real number, not '{}'",
                    other.type_name()
                ))
            }),
        }
    }
}

impl BuiltinFunction for List {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "list",
            description: "List of the elements of an iterable",
            usage: "list([iterable])",
            args: &ITERABLE_OPTIONAL_ARG,
            keywords: &[],
            returns: "list",
            examples: &LIST_EXAMPLES,
            category: "conversion",
            related: &CONTAINER_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("list", 0, 1)?;
        match args.arg(0) {
            Some(iterable) => Ok(Value::List(elements(iterable)?)),
            None => Ok(Value::List(Vec::new())),
        }
    }
}

impl BuiltinFunction for Tuple {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "tuple",
            description: "Tuple of the elements of an iterable",
            usage: "tuple([iterable])",
            args: &ITERABLE_OPTIONAL_ARG,
            keywords: &[],
            returns: "tuple",
            examples: &TUPLE_EXAMPLES,
            category: "conversion",
            related: &CONTAINER_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("tuple", 0, 1)?;
        match args.arg(0) {
            Some(iterable) => Ok(Value::Tuple(elements(iterable)?)),
            None => Ok(Value::Tuple(Vec::new())),
        }
    }
}

impl BuiltinFunction for Set {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "set",
            description: "Set of the distinct elements of an iterable",
            usage: "set([iterable])",
            args: &ITERABLE_OPTIONAL_ARG,
            keywords: &[],
            returns: "set",
            examples: &SET_EXAMPLES,
            category: "conversion",
            related: &CONTAINER_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("set", 0, 1)?;
        match args.arg(0) {
            Some(iterable) => Value::set(elements(iterable)?),
            None => Ok(Value::Set(Vec::new())),
        }
    }
}

impl BuiltinFunction for Str {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "str",
            description: "Text form of a value",
            usage: "str([x])",
            args: &ANY_OPTIONAL_ARG,
            keywords: &[],
            returns: "str",
            examples: &STR_EXAMPLES,
            category: "conversion",
            related: &SCALAR_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("str", 0, 1)?;
        Ok(Value::Str(args.arg(0).map(|v| v.to_string()).unwrap_or_default()))
    }
}

impl BuiltinFunction for Type {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "type",
            description: "Type of a value",
            usage: "type(x)",
            args: &TYPE_ARGS,
            keywords: &[],
            returns: "type",
            examples: &TYPE_EXAMPLES,
            category: "conversion",
            related: &SCALAR_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("type", 1, 1)?;
        Ok(Value::Type(args.args()[0].type_name().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: &dyn BuiltinFunction, values: Vec<Value>) -> StrataResult<Value> {
        f.call(&CallArgs::positional(values))
    }

    #[test]
    fn test_radix_literals() {
        assert_eq!(call(&Bin, vec![Value::int(5)]).unwrap(), Value::from("0b101"));
        assert_eq!(call(&Bin, vec![Value::int(-5)]).unwrap(), Value::from("-0b101"));
        assert_eq!(call(&Hex, vec![Value::int(255)]).unwrap(), Value::from("0xff"));
        assert_eq!(call(&Oct, vec![Value::int(8)]).unwrap(), Value::from("0o10"));
        assert_eq!(call(&Hex, vec![Value::int(0)]).unwrap(), Value::from("0x0"));
        assert!(call(&Hex, vec![Value::Float(1.0)]).is_err());
    }

    #[test]
    fn test_bool() {
        assert_eq!(call(&Bool, vec![]).unwrap(), Value::Bool(false));
        assert_eq!(call(&Bool, vec![Value::from("x")]).unwrap(), Value::Bool(true));
        assert_eq!(call(&Bool, vec![Value::Tuple(vec![])]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_chr_ord() {
        assert_eq!(call(&Chr, vec![Value::int(97)]).unwrap(), Value::from("a"));
        assert_eq!(call(&Ord, vec![Value::from("é")]).unwrap(), Value::int(233));
        let err = call(&Chr, vec![Value::int(0x110000)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
        let err = call(&Ord, vec![Value::from("ab")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_dict() {
        let args = CallArgs::default()
            .with_keyword("a", Value::int(1))
            .with_keyword("b", Value::int(2));
        assert_eq!(Dict.call(&args).unwrap().repr(), "{'a': 1, 'b': 2}");

        let pairs = Value::List(vec![Value::Tuple(vec![Value::from("a"), Value::int(1)])]);
        let args = CallArgs::positional(vec![pairs]).with_keyword("a", Value::int(9));
        assert_eq!(Dict.call(&args).unwrap().repr(), "{'a': 9}");

        let bad = Value::List(vec![Value::Tuple(vec![Value::int(1)])]);
        assert_eq!(call(&Dict, vec![bad]).unwrap_err().kind, ErrorKind::InvalidValue);
        let bad = Value::List(vec![Value::int(1)]);
        assert_eq!(call(&Dict, vec![bad]).unwrap_err().kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_float() {
        assert_eq!(call(&Float, vec![Value::int(3)]).unwrap(), Value::Float(3.0));
        assert_eq!(call(&Float, vec![Value::from(" 1e-3 ")]).unwrap(), Value::Float(0.001));
        assert_eq!(call(&Float, vec![Value::from("1_000.5")]).unwrap(), Value::Float(1000.5));
        assert_eq!(call(&Float, vec![Value::from("-Infinity")]).unwrap(), Value::Float(f64::NEG_INFINITY));
        assert!(matches!(call(&Float, vec![Value::from("nan")]).unwrap(), Value::Float(f) if f.is_nan()));
        assert!(call(&Float, vec![Value::from("1__0")]).is_err());
        assert!(call(&Float, vec![Value::from("abc")]).is_err());
        assert!(call(&Float, vec![Value::from("--1")]).is_err());
        assert!(call(&Float, vec![Value::None]).is_err());
    }

    #[test]
    fn test_int() {
        assert_eq!(call(&Int, vec![]).unwrap(), Value::int(0));
        assert_eq!(call(&Int, vec![Value::Float(-3.9)]).unwrap(), Value::int(-3));
        assert_eq!(call(&Int, vec![Value::from("ff"), Value::int(16)]).unwrap(), Value::int(255));
        assert_eq!(call(&Int, vec![Value::Bool(true)]).unwrap(), Value::int(1));
        let args = CallArgs::positional(vec![Value::from("0b101")]).with_keyword("base", Value::int(0));
        assert_eq!(Int.call(&args).unwrap(), Value::int(5));
        assert_eq!(call(&Int, vec![Value::from("0x10")]).unwrap_err().kind, ErrorKind::InvalidValue);
        assert_eq!(call(&Int, vec![Value::int(1), Value::int(16)]).unwrap_err().kind, ErrorKind::TypeMismatch);
        assert_eq!(call(&Int, vec![Value::from("1"), Value::int(1)]).unwrap_err().kind, ErrorKind::InvalidValue);
        assert_eq!(call(&Int, vec![Value::Float(f64::INFINITY)]).unwrap_err().kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_containers() {
        let chars = call(&List, vec![Value::from("ab")]).unwrap();
        assert_eq!(chars, Value::List(vec![Value::from("a"), Value::from("b")]));
        let tuple = call(&Tuple, vec![Value::List(vec![Value::int(1)])]).unwrap();
        assert_eq!(tuple.repr(), "(1,)");
        let set = call(&Set, vec![Value::List(vec![Value::int(1), Value::int(1), Value::int(2)])]).unwrap();
        assert_eq!(set.repr(), "{1, 2}");
        assert_eq!(call(&Set, vec![]).unwrap().repr(), "set()");
        let err = call(&Set, vec![Value::List(vec![Value::List(vec![])])]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_str_and_type() {
        assert_eq!(call(&Str, vec![Value::Float(1.5)]).unwrap(), Value::from("1.5"));
        assert_eq!(call(&Str, vec![Value::from("x")]).unwrap(), Value::from("x"));
        assert_eq!(
            call(&Str, vec![Value::List(vec![Value::int(1), Value::from("a")])]).unwrap(),
            Value::from("[1, 'a']")
        );
        assert_eq!(call(&Type, vec![Value::int(1)]).unwrap(), Value::Type("int".to_string()));
        assert_eq!(call(&Type, vec![Value::None]).unwrap().repr(), "<class 'NoneType'>");
    }
}
