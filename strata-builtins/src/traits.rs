//! Builtin function traits

use crate::CallArgs;
use serde::Serialize;
use strata_core::{StrataResult, Value};

/// Metadata about a function argument
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl ArgMeta {
    pub const fn required(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, optional: false, default: None }
    }

    pub const fn optional(name: &'static str, typ: &'static str, description: &'static str, default: &'static str) -> Self {
        Self { name, typ, description, optional: true, default: Some(default) }
    }
}

/// Metadata for a builtin function
#[derive(Debug, Clone, Serialize)]
pub struct FunctionMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub args: &'static [ArgMeta],
    /// Accepted keyword argument names; `**` accepts any keyword
    pub keywords: &'static [&'static str],
    pub returns: &'static str,
    pub examples: &'static [&'static str],
    pub category: &'static str,
    pub related: &'static [&'static str],
}

impl FunctionMeta {
    pub fn accepts_keyword(&self, name: &str) -> bool {
        self.keywords.iter().any(|k| *k == "**" || *k == name)
    }
}

/// Pure function callable from a config expression
pub trait BuiltinFunction: Send + Sync {
    fn meta(&self) -> FunctionMeta;
    fn call(&self, args: &CallArgs) -> StrataResult<Value>;
}
