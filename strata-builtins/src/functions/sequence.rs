//! Sequence producers
//!
//! Results are materialized as lists.

use crate::prelude::*;

pub struct Enumerate;
pub struct Range;
pub struct Reversed;
pub struct Zip;

static ENUMERATE_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("iterable", "iterable", "Values to number"),
    ArgMeta::optional("start", "int", "First index", "0"),
];
static ENUMERATE_KEYWORDS: [&str; 1] = ["start"];
static ENUMERATE_EXAMPLES: [&str; 2] = ["enumerate('ab')", "enumerate(['x', 'y'], start=1)"];

static RANGE_ARGS: [ArgMeta; 3] = [
    ArgMeta::optional("start", "int", "First value", "0"),
    ArgMeta::required("stop", "int", "Bound, excluded"),
    ArgMeta::optional("step", "int", "Increment, non-zero", "1"),
];
static RANGE_EXAMPLES: [&str; 3] = ["range(3)", "range(1, 10, 3)", "range(5, 0, -2)"];

static REVERSED_ARGS: [ArgMeta; 1] = [ArgMeta::required("seq", "str | list | tuple | dict", "Ordered values")];
static REVERSED_EXAMPLES: [&str; 1] = ["reversed([1, 2, 3])"];

static ZIP_ARGS: [ArgMeta; 1] = [ArgMeta::optional("*iterables", "iterable...", "Iterables to pair up", "none")];
static ZIP_EXAMPLES: [&str; 2] = ["zip([1, 2], 'ab')", "dict(zip(['a', 'b'], [1, 2]))"];

static SEQUENCE_RELATED: [&str; 4] = ["enumerate", "range", "reversed", "zip"];

impl BuiltinFunction for Enumerate {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "enumerate",
            description: "List of (index, element) pairs",
            usage: "enumerate(iterable, start=0)",
            args: &ENUMERATE_ARGS,
            keywords: &ENUMERATE_KEYWORDS,
            returns: "list",
            examples: &ENUMERATE_EXAMPLES,
            category: "sequence",
            related: &SEQUENCE_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("enumerate", 1, 2)?;
        let start = match args.arg(1).or_else(|| args.keyword("start")) {
            Some(v) => require_int(v)?,
            None => Integer::zero(),
        };
        let pairs = elements(&args.args()[0])?
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let index = start.add(&Integer::from(i));
                Value::Tuple(vec![Value::Int(index), item])
            })
            .collect();
        Ok(Value::List(pairs))
    }
}

impl BuiltinFunction for Range {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "range",
            description: "Arithmetic progression of integers",
            usage: "range(stop) | range(start, stop[, step])",
            args: &RANGE_ARGS,
            keywords: &[],
            returns: "list",
            examples: &RANGE_EXAMPLES,
            category: "sequence",
            related: &SEQUENCE_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("range", 1, 3)?;
        let bounds = args
            .args()
            .iter()
            .map(require_int)
            .collect::<StrataResult<Vec<_>>>()?;
        let (start, stop, step) = match bounds.as_slice() {
            [stop] => (Integer::zero(), stop.clone(), Integer::from_i64(1)),
            [start, stop] => (start.clone(), stop.clone(), Integer::from_i64(1)),
            [start, stop, step] => (start.clone(), stop.clone(), step.clone()),
            _ => return Err(StrataError::type_mismatch("range expected at most 3 arguments")),
        };
        if step.is_zero() {
            return Err(StrataError::invalid_value("range() arg 3 must not be zero"));
        }
        let count = progression_len(&start, &stop, &step)?;
        check_len("range", count)?;
        let mut items = Vec::with_capacity(count);
        let mut current = start;
        for _ in 0..count {
            let next = current.add(&step);
            items.push(Value::Int(current));
            current = next;
        }
        Ok(Value::List(items))
    }
}

/// Number of elements in `range(start, stop, step)`, saturating at `usize::MAX`
fn progression_len(start: &Integer, stop: &Integer, step: &Integer) -> StrataResult<usize> {
    let one = Integer::from_i64(1);
    let (span, stride) = if step.is_negative() {
        (start.sub(stop), step.neg())
    } else {
        (stop.sub(start), step.clone())
    };
    if span.is_negative() || span.is_zero() {
        return Ok(0);
    }
    let count = span.add(&stride).sub(&one).floor_div(&stride)?;
    Ok(count.to_usize().unwrap_or(usize::MAX))
}

impl BuiltinFunction for Reversed {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "reversed",
            description: "Elements of an ordered value, last first",
            usage: "reversed(seq)",
            args: &REVERSED_ARGS,
            keywords: &[],
            returns: "list",
            examples: &REVERSED_EXAMPLES,
            category: "sequence",
            related: &SEQUENCE_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        args.arity("reversed", 1, 1)?;
        let seq = &args.args()[0];
        if !matches!(seq, Value::Str(_) | Value::List(_) | Value::Tuple(_) | Value::Dict(_)) {
            return Err(StrataError::type_mismatch(format!(
                "'{}' object is not reversible",
                seq.type_name()
            )));
        }
        let mut items = elements(seq)?;
        items.reverse();
        Ok(Value::List(items))
    }
}

impl BuiltinFunction for Zip {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "zip",
            description: "Tuples of corresponding elements, as long as the shortest input",
            usage: "zip(*iterables)",
            args: &ZIP_ARGS,
            keywords: &[],
            returns: "list",
            examples: &ZIP_EXAMPLES,
            category: "sequence",
            related: &SEQUENCE_RELATED,
        }
    }

    fn call(&self, args: &CallArgs) -> StrataResult<Value> {
        let columns = args
            .args()
            .iter()
            .map(elements)
            .collect::<StrataResult<Vec<_>>>()?;
        let rows = columns.iter().map(Vec::len).min().unwrap_or(0);
        let tuples = (0..rows)
            .map(|row| Value::Tuple(columns.iter().map(|column| column[row].clone()).collect()))
            .collect();
        Ok(Value::List(tuples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::ops::MAX_SEQUENCE_LEN;

    fn ints(values: &[i64]) -> Value {
        Value::List(values.iter().map(|n| Value::int(*n)).collect())
    }

    fn call(f: &dyn BuiltinFunction, values: Vec<Value>) -> StrataResult<Value> {
        f.call(&CallArgs::positional(values))
    }

    #[test]
    fn test_range() {
        assert_eq!(call(&Range, vec![Value::int(3)]).unwrap(), ints(&[0, 1, 2]));
        assert_eq!(call(&Range, vec![Value::int(1), Value::int(10), Value::int(3)]).unwrap(), ints(&[1, 4, 7]));
        assert_eq!(call(&Range, vec![Value::int(5), Value::int(0), Value::int(-2)]).unwrap(), ints(&[5, 3, 1]));
        assert_eq!(call(&Range, vec![Value::int(5), Value::int(1)]).unwrap(), ints(&[]));
        assert_eq!(call(&Range, vec![Value::int(-3)]).unwrap(), ints(&[]));
    }

    #[test]
    fn test_range_errors() {
        let err = call(&Range, vec![Value::int(0), Value::int(5), Value::int(0)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
        let err = call(&Range, vec![Value::Float(3.0)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        let too_many = Value::int(MAX_SEQUENCE_LEN as i64 + 1);
        assert_eq!(call(&Range, vec![too_many]).unwrap_err().kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_enumerate() {
        let result = call(&Enumerate, vec![Value::from("ab")]).unwrap();
        assert_eq!(result.repr(), "[(0, 'a'), (1, 'b')]");
        let args = CallArgs::positional(vec![Value::from("x")]).with_keyword("start", Value::int(1));
        assert_eq!(Enumerate.call(&args).unwrap().repr(), "[(1, 'x')]");
    }

    #[test]
    fn test_reversed() {
        assert_eq!(call(&Reversed, vec![ints(&[1, 2, 3])]).unwrap(), ints(&[3, 2, 1]));
        let err = call(&Reversed, vec![Value::set(vec![Value::int(1)]).unwrap()]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_zip() {
        let result = call(&Zip, vec![ints(&[1, 2, 3]), Value::from("ab")]).unwrap();
        assert_eq!(result.repr(), "[(1, 'a'), (2, 'b')]");
        assert_eq!(call(&Zip, vec![]).unwrap(), ints(&[]));
        assert!(call(&Zip, vec![Value::int(1)]).is_err());
    }
}
