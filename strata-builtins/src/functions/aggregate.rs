//! Aggregate functions over iterables

use crate::prelude::*;
use std::cmp::Ordering;
use strata_core::ops;
use strata_core::BinaryOp;

pub struct All;
pub struct Any;
pub struct Len;
pub struct Max;
pub struct Min;
pub struct Sorted;
pub struct Sum;

static ITERABLE_ARG: [ArgMeta; 1] = [ArgMeta::required("iterable", "iterable", "Values to inspect")];

static ALL_EXAMPLES: [&str; 2] = ["all([1, True, 'x'])", "all([])"];
static ANY_EXAMPLES: [&str; 2] = ["any([0, None, 3])", "any([])"];
static BOOLEAN_RELATED: [&str; 2] = ["all", "any"];

static LEN_ARGS: [ArgMeta; 1] = [ArgMeta::required("s", "str | list | tuple | dict | set", "Sized value")];
static LEN_EXAMPLES: [&str; 2] = ["len('abc')", "len({1: 2})"];
static LEN_RELATED: [&str; 1] = ["range"];

static EXTREMUM_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("values", "iterable | value...", "One iterable or two or more values"),
    ArgMeta::optional("default", "any", "Result for an empty iterable", "error"),
];
static EXTREMUM_KEYWORDS: [&str; 1] = ["default"];
static MAX_EXAMPLES: [&str; 3] = ["max(1, 5, 3)", "max([2.5, 1])", "max([], default=0)"];
static MIN_EXAMPLES: [&str; 3] = ["min(1, 5, 3)", "min('hello')", "min([], default=None)"];
static EXTREMUM_RELATED: [&str; 3] = ["max", "min", "sorted"];

static SORTED_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("iterable", "iterable", "Values to sort"),
    ArgMeta::optional("reverse", "bool", "Sort descending", "False"),
];
static SORTED_KEYWORDS: [&str; 1] = ["reverse"];
static SORTED_EXAMPLES: [&str; 2] = ["sorted([3, 1, 2])", "sorted('cab', reverse=True)"];
static SORTED_RELATED: [&str; 2] = ["reversed", "max"];

static SUM_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("iterable", "iterable", "Values to add"),
    ArgMeta::optional("start", "any", "Initial value", "0"),
];
static SUM_KEYWORDS: [&str; 1] = ["start"];
static SUM_EXAMPLES: [&str; 3] = ["sum([1, 2, 3])", "sum([0.5, 0.25], 1)", "sum([[1], [2]], [])"];
static SUM_RELATED: [&str; 1] = ["len"];

impl BuiltinFunction for All {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "all",
            description: "True when every element is truthy",
            usage: "all(iterable)",
            args: &ITERABLE_ARG,
            keywords: &[],
            returns: "bool",
            examples: &ALL_EXAMPLES,
            category: "aggregate",
            related: &BOOLEAN_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("all", 1, 1)?;
        let items = elements(&args.args()[0])?;
        Ok(Value::Bool(items.iter().all(Value::is_truthy)))
    }
}

impl BuiltinFunction for Any {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "any",
            description: "True when at least one element is truthy",
            usage: "any(iterable)",
            args: &ITERABLE_ARG,
            keywords: &[],
            returns: "bool",
            examples: &ANY_EXAMPLES,
            category: "aggregate",
            related: &BOOLEAN_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("any", 1, 1)?;
        let items = elements(&args.args()[0])?;
        Ok(Value::Bool(items.iter().any(Value::is_truthy)))
    }
}

impl BuiltinFunction for Len {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "len",
            description: "Number of elements (characters for strings)",
            usage: "len(s)",
            args: &LEN_ARGS,
            keywords: &[],
            returns: "int",
            examples: &LEN_EXAMPLES,
            category: "aggregate",
            related: &LEN_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("len", 1, 1)?;
        let len = match &args.args()[0] {
            Value::Str(s) => s.chars().count(),
            Value::List(items) | Value::Tuple(items) | Value::Set(items) => items.len(),
            Value::Dict(entries) => entries.len(),
            other => {
                return Err(StrataError::type_mismatch(format!(
                    "object of type '{}' has no len()",
                    other.type_name()
                )))
            }
        };
        Ok(Value::Int(Integer::from(len)))
    }
}

/// Shared body of `max` and `min`: keeps the first element that no later
/// element beats
fn extremum(func: &str, args: &CallArgs, wanted: Ordering) -> StrataResult<Value> {
    let default = args.keywords().iter().find(|(k, _)| k == "default").map(|(_, v)| v);
    let candidates = match args.args() {
        [] => {
            return Err(StrataError::type_mismatch(format!(
                "{} expected at least 1 argument, got 0",
                func
            )))
        }
        [iterable] => elements(iterable)?,
        values => {
            if default.is_some() {
                return Err(StrataError::type_mismatch(format!(
                    "Cannot specify a default for {}() with multiple positional arguments",
                    func
                )));
            }
            values.to_vec()
        }
    };
    let mut iter = candidates.into_iter();
    let mut best = match iter.next() {
        Some(first) => first,
        None => {
            return default.cloned().ok_or_else(|| {
                StrataError::invalid_value(format!("{}() arg is an empty sequence", func))
            })
        }
    };
    let symbol = if wanted == Ordering::Greater { ">" } else { "<" };
    for item in iter {
        if ops::ordering(&item, &best, symbol)? == Some(wanted) {
            best = item;
        }
    }
    Ok(best)
}

impl BuiltinFunction for Max {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "max",
            description: "Largest element of an iterable or of the arguments",
            usage: "max(iterable, *[, default]) | max(a, b, *rest)",
            args: &EXTREMUM_ARGS,
            keywords: &EXTREMUM_KEYWORDS,
            returns: "any",
            examples: &MAX_EXAMPLES,
            category: "aggregate",
            related: &EXTREMUM_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        extremum("max", args, Ordering::Greater)
    }
}

impl BuiltinFunction for Min {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "min",
            description: "Smallest element of an iterable or of the arguments",
            usage: "min(iterable, *[, default]) | min(a, b, *rest)",
            args: &EXTREMUM_ARGS,
            keywords: &EXTREMUM_KEYWORDS,
            returns: "any",
            examples: &MIN_EXAMPLES,
            category: "aggregate",
            related: &EXTREMUM_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        extremum("min", args, Ordering::Less)
    }
}

impl BuiltinFunction for Sorted {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "sorted",
            description: "New list with the elements in ascending order (stable)",
            usage: "sorted(iterable, *, reverse=False)",
            args: &SORTED_ARGS,
            keywords: &SORTED_KEYWORDS,
            returns: "list",
            examples: &SORTED_EXAMPLES,
            category: "aggregate",
            related: &SORTED_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("sorted", 1, 1)?;
        let reverse = args.keyword("reverse").map_or(false, Value::is_truthy);
        let mut items = elements(&args.args()[0])?;
        let mut failure = None;
        items.sort_by(|a, b| {
            let (left, right) = if reverse { (b, a) } else { (a, b) };
            match ops::ordering(left, right, "<") {
                Ok(ordering) => ordering.unwrap_or(Ordering::Equal),
                Err(e) => {
                    failure.get_or_insert(e);
                    Ordering::Equal
                }
            }
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(Value::List(items)),
        }
    }
}

impl BuiltinFunction for Sum {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "sum",
            description: "Sum of the elements plus start",
            usage: "sum(iterable, start=0)",
            args: &SUM_ARGS,
            keywords: &SUM_KEYWORDS,
            returns: "any",
            examples: &SUM_EXAMPLES,
            category: "aggregate",
            related: &SUM_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("sum", 1, 2)?;
        let start = args
            .arg(1)
            .or_else(|| args.keywords().iter().find(|(k, _)| k == "start").map(|(_, v)| v))
            .cloned()
            .unwrap_or_else(|| Value::int(0));
        if let Value::Str(_) = start {
            return Err(StrataError::type_mismatch(
                "sum() can't sum strings [use ''.join(seq) instead]",
            ));
        }
        let mut total = start;
        for item in elements(&args.args()[0])? {
            total = ops::binary(BinaryOp::Add, &total, &item)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: Vec<Value>) -> Value {
        Value::List(items)
    }

    fn call(f: &dyn BuiltinFunction, values: Vec<Value>) -> StrataResult<Value> {
        f.call(&CallArgs::positional(values))
    }

    #[test]
    fn test_all_any() {
        let values = list(vec![Value::int(1), Value::Bool(true), Value::from("x")]);
        assert_eq!(call(&All, vec![values.clone()]).unwrap(), Value::Bool(true));
        assert_eq!(call(&All, vec![list(vec![])]).unwrap(), Value::Bool(true));
        assert_eq!(call(&Any, vec![list(vec![])]).unwrap(), Value::Bool(false));
        let values = list(vec![Value::int(0), Value::None, Value::int(3)]);
        assert_eq!(call(&Any, vec![values]).unwrap(), Value::Bool(true));
        assert!(call(&All, vec![Value::int(3)]).is_err());
    }

    #[test]
    fn test_len() {
        assert_eq!(call(&Len, vec![Value::from("héllo")]).unwrap(), Value::int(5));
        let dict = Value::dict(vec![(Value::int(1), Value::int(2))]).unwrap();
        assert_eq!(call(&Len, vec![dict]).unwrap(), Value::int(1));
        let err = call(&Len, vec![Value::int(5)]).unwrap_err();
        assert_eq!(err.message, "object of type 'int' has no len()");
    }

    #[test]
    fn test_max_min() {
        let values = vec![Value::int(1), Value::int(5), Value::int(3)];
        assert_eq!(call(&Max, values.clone()).unwrap(), Value::int(5));
        assert_eq!(call(&Min, values).unwrap(), Value::int(1));
        assert_eq!(call(&Max, vec![list(vec![Value::Float(2.5), Value::int(1)])]).unwrap(), Value::Float(2.5));
        assert_eq!(call(&Min, vec![Value::from("hello")]).unwrap(), Value::from("e"));
    }

    #[test]
    fn test_max_keeps_first_of_equals() {
        let result = call(&Max, vec![Value::int(1), Value::Float(1.0)]).unwrap();
        assert!(matches!(result, Value::Int(_)));
    }

    #[test]
    fn test_max_empty() {
        let err = call(&Max, vec![list(vec![])]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
        let args = CallArgs::positional(vec![list(vec![])]).with_keyword("default", Value::None);
        assert_eq!(Max.call(&args).unwrap(), Value::None);
        let args = CallArgs::positional(vec![Value::int(1), Value::int(2)]).with_keyword("default", Value::int(0));
        assert!(Max.call(&args).is_err());
    }

    #[test]
    fn test_max_mixed_types() {
        let err = call(&Max, vec![Value::int(1), Value::from("a")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_sorted() {
        let values = list(vec![Value::int(3), Value::Float(1.5), Value::int(2)]);
        let result = call(&Sorted, vec![values.clone()]).unwrap();
        assert_eq!(result, list(vec![Value::Float(1.5), Value::int(2), Value::int(3)]));
        let args = CallArgs::positional(vec![values]).with_keyword("reverse", Value::Bool(true));
        let result = Sorted.call(&args).unwrap();
        assert_eq!(result, list(vec![Value::int(3), Value::int(2), Value::Float(1.5)]));
        let err = call(&Sorted, vec![list(vec![Value::int(1), Value::None])]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_sum() {
        let values = list(vec![Value::int(1), Value::int(2), Value::int(3)]);
        assert_eq!(call(&Sum, vec![values]).unwrap(), Value::int(6));
        let values = list(vec![Value::Float(0.5), Value::Float(0.25)]);
        assert_eq!(call(&Sum, vec![values, Value::int(1)]).unwrap(), Value::Float(1.75));
        let nested = list(vec![list(vec![Value::int(1)]), list(vec![Value::int(2)])]);
        let args = CallArgs::positional(vec![nested]).with_keyword("start", list(vec![]));
        assert_eq!(Sum.call(&args).unwrap(), list(vec![Value::int(1), Value::int(2)]));
        let err = call(&Sum, vec![list(vec![]), Value::from("")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }
}
