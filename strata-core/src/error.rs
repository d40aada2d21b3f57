//! Structured errors
//!
//! Every failure of the evaluator, the resolver, the serializer, the
//! scanner and the tree is reported as a `StrataError`: a machine readable
//! kind/code, a human readable message, an optional suggestion and the
//! option/line it happened at.

use crate::IntegerError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNSUPPORTED_OPERATION: &str = "UNSUPPORTED_OPERATION";
    pub const UNRESOLVED_REFERENCE: &str = "UNRESOLVED_REFERENCE";
    pub const TYPE_MISMATCH: &str = "TYPE_MISMATCH";
    pub const AMBIGUOUS_QUOTING: &str = "AMBIGUOUS_QUOTING";
    pub const DUPLICATE_NAME: &str = "DUPLICATE_NAME";
    pub const CYCLIC_REFERENCE: &str = "CYCLIC_REFERENCE";
    pub const RECURSION_LIMIT: &str = "RECURSION_LIMIT";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const INVALID_VALUE: &str = "INVALID_VALUE";
    pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";
    pub const IO_ERROR: &str = "IO_ERROR";
}

/// Closed set of failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Operator, node kind or call target outside the supported grammar
    UnsupportedOperation,
    /// Dotted path not found in any enclosing scope
    UnresolvedReference,
    /// Operator or function applied to unsuitable operand types
    TypeMismatch,
    /// String literal that no quoting style can represent
    AmbiguousQuoting,
    /// Name already taken among a section's children
    DuplicateName,
    /// Option whose value transitively depends on itself
    CyclicReference,
    /// Nested option evaluation deeper than the configured limit
    RecursionLimit,
    DivisionByZero,
    /// Right type, wrong value (bad literal, negative shift, empty sequence...)
    InvalidValue,
    Syntax,
    Io,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::UnsupportedOperation => codes::UNSUPPORTED_OPERATION,
            ErrorKind::UnresolvedReference => codes::UNRESOLVED_REFERENCE,
            ErrorKind::TypeMismatch => codes::TYPE_MISMATCH,
            ErrorKind::AmbiguousQuoting => codes::AMBIGUOUS_QUOTING,
            ErrorKind::DuplicateName => codes::DUPLICATE_NAME,
            ErrorKind::CyclicReference => codes::CYCLIC_REFERENCE,
            ErrorKind::RecursionLimit => codes::RECURSION_LIMIT,
            ErrorKind::DivisionByZero => codes::DIV_ZERO,
            ErrorKind::InvalidValue => codes::INVALID_VALUE,
            ErrorKind::Syntax => codes::SYNTAX_ERROR,
            ErrorKind::Io => codes::IO_ERROR,
        }
    }
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Dotted path of the option being read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,

    /// Line number in the source document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,

    /// Propagation notes, innermost first
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrataError {
    pub kind: ErrorKind,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
}

pub type StrataResult<T> = Result<T, StrataError>;

impl StrataError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: None,
            context: None,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set option context, keeping the innermost one
    pub fn in_option(mut self, path: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        if ctx.option.is_none() {
            ctx.option = Some(path.into());
        }
        self
    }

    /// Builder: set line context
    pub fn at_line(mut self, line: usize) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.line = Some(line);
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    // ========== Common Error Constructors ==========

    pub fn unsupported(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedOperation, details)
    }

    pub fn unsupported_function(name: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedOperation,
            format!("function '{}' is not callable from a config value", name),
        )
    }

    pub fn unresolved(path: &str) -> Self {
        Self::new(
            ErrorKind::UnresolvedReference,
            format!("cannot resolve reference '{}'", path),
        )
        .with_suggestion(format!("Define '{}' in this section or an enclosing one", path))
    }

    pub fn type_mismatch(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, details)
    }

    pub fn unsupported_operand(op: &str, left: &str, right: &str) -> Self {
        Self::type_mismatch(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op, left, right
        ))
    }

    pub fn unhashable(type_name: &str) -> Self {
        Self::type_mismatch(format!("unhashable type: '{}'", type_name))
    }

    pub fn ambiguous_quoting(text: &str) -> Self {
        Self::new(
            ErrorKind::AmbiguousQuoting,
            format!("could not determine suitable string quotes for >{}<", text),
        )
        .with_suggestion("Avoid mixing single and double quotes in one string")
    }

    pub fn duplicate_name(name: &str, section: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateName,
            format!("duplicate name '{}' in section '{}'", name, section),
        )
    }

    pub fn cyclic(chain: &[String]) -> Self {
        Self::new(
            ErrorKind::CyclicReference,
            format!("cyclic reference: {}", chain.join(" → ")),
        )
        .with_suggestion("Remove circular dependency")
    }

    pub fn recursion_limit(depth: usize) -> Self {
        Self::new(
            ErrorKind::RecursionLimit,
            format!("option evaluation nested deeper than {} levels", depth),
        )
        .with_suggestion("Raise the limit with Strata::with_max_depth")
    }

    pub fn div_zero(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::DivisionByZero, details)
            .with_suggestion("Ensure divisor is not zero")
    }

    pub fn invalid_value(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidValue, details)
    }

    pub fn syntax(line: usize, details: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, details).at_line(line)
    }

    pub fn io(path: &str, err: &std::io::Error) -> Self {
        Self::new(ErrorKind::Io, format!("cannot read '{}': {}", path, err))
    }
}

impl std::fmt::Display for StrataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(ctx) = &self.context {
            if let Some(option) = &ctx.option {
                write!(f, " (in option '{}')", option)?;
            }
            if let Some(line) = ctx.line {
                write!(f, " (line {})", line)?;
            }
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for StrataError {}

impl From<IntegerError> for StrataError {
    fn from(err: IntegerError) -> Self {
        match err {
            IntegerError::DivisionByZero => Self::div_zero(err.to_string()),
            IntegerError::ParseError { .. }
            | IntegerError::NegativeShift
            | IntegerError::NonFinite(_)
            | IntegerError::Overflow(_) => Self::invalid_value(err.to_string()),
        }
    }
}
