//! Strata Builtins
//!
//! The functions a config expression may call:
//! - `BuiltinFunction` trait and its `FunctionMeta`
//! - `CallArgs`, the evaluated positional and keyword arguments
//! - `FunctionRegistry`, the closed whitelist

mod traits;
mod args;
mod registry;
pub mod helpers;
pub mod functions;

pub use traits::{BuiltinFunction, FunctionMeta, ArgMeta};
pub use args::CallArgs;
pub use registry::FunctionRegistry;

/// Re-export core types for function implementations
pub mod prelude {
    pub use crate::{BuiltinFunction, FunctionMeta, ArgMeta, CallArgs, FunctionRegistry};
    pub use crate::helpers::*;
    pub use strata_core::prelude::*;
}
