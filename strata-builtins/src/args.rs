//! Call arguments

use strata_core::{StrataError, StrataResult, Value};

/// Evaluated arguments of one call, positional then keyword
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<Value>,
    keywords: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new(positional: Vec<Value>, keywords: Vec<(String, Value)>) -> Self {
        Self { positional, keywords }
    }

    pub fn positional(values: Vec<Value>) -> Self {
        Self { positional: values, keywords: Vec::new() }
    }

    pub fn with_keyword(mut self, name: impl Into<String>, value: Value) -> Self {
        self.keywords.push((name.into(), value));
        self
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }

    pub fn args(&self) -> &[Value] {
        &self.positional
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn keywords(&self) -> &[(String, Value)] {
        &self.keywords
    }

    /// Keyword value; an explicit `None` counts as absent
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .filter(|v| !v.is_none())
    }

    /// Check the positional argument count
    pub fn arity(&self, func: &str, min: usize, max: usize) -> StrataResult<()> {
        let given = self.positional.len();
        if given >= min && given <= max {
            return Ok(());
        }
        let message = if min == max {
            let plural = if min == 1 { "argument" } else { "arguments" };
            format!("{}() takes exactly {} {} ({} given)", func, min, plural, given)
        } else if given < min {
            format!("{} expected at least {} arguments, got {}", func, min, given)
        } else {
            format!("{} expected at most {} arguments, got {}", func, max, given)
        };
        Err(StrataError::type_mismatch(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_messages() {
        let args = CallArgs::positional(vec![Value::int(1), Value::int(2)]);
        assert!(args.arity("pow", 2, 3).is_ok());
        let err = args.arity("len", 1, 1).unwrap_err();
        assert_eq!(err.message, "len() takes exactly 1 argument (2 given)");
        let err = args.arity("range", 3, 3).unwrap_err();
        assert!(err.message.contains("3 arguments"));
        let err = args.arity("divmod", 0, 1).unwrap_err();
        assert_eq!(err.message, "divmod expected at most 1 arguments, got 2");
    }

    #[test]
    fn test_none_keyword_is_absent() {
        let args = CallArgs::default()
            .with_keyword("ndigits", Value::None)
            .with_keyword("start", Value::int(3));
        assert!(args.keyword("ndigits").is_none());
        assert_eq!(args.keyword("start"), Some(&Value::int(3)));
        assert!(args.keyword("missing").is_none());
    }
}
