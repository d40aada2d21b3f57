//! Function registry
//!
//! The closed table of functions a config expression may call. Only
//! `FunctionRegistry::standard()` builds one, so the whitelist cannot be
//! extended from outside the crate.

use crate::functions;
use crate::{BuiltinFunction, CallArgs, FunctionMeta};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use strata_core::{StrataError, StrataResult, Value};
use tracing::trace;

/// Dispatch table of whitelisted functions
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: BTreeMap<&'static str, Arc<dyn BuiltinFunction>>,
}

impl FunctionRegistry {
    fn empty() -> Self {
        Self { functions: BTreeMap::new() }
    }

    fn with_function<F: BuiltinFunction + 'static>(mut self, f: F) -> Self {
        let name = f.meta().name;
        self.functions.insert(name, Arc::new(f));
        self
    }

    /// The standard whitelist
    pub fn standard() -> Self {
        Self::empty()
            // math
            .with_function(functions::Abs)
            .with_function(functions::Divmod)
            .with_function(functions::Pow)
            .with_function(functions::Round)
            // aggregate
            .with_function(functions::All)
            .with_function(functions::Any)
            .with_function(functions::Len)
            .with_function(functions::Max)
            .with_function(functions::Min)
            .with_function(functions::Sorted)
            .with_function(functions::Sum)
            // conversion
            .with_function(functions::Bin)
            .with_function(functions::Bool)
            .with_function(functions::Chr)
            .with_function(functions::Dict)
            .with_function(functions::Float)
            .with_function(functions::Hex)
            .with_function(functions::Int)
            .with_function(functions::List)
            .with_function(functions::Oct)
            .with_function(functions::Ord)
            .with_function(functions::Set)
            .with_function(functions::Str)
            .with_function(functions::Tuple)
            .with_function(functions::Type)
            // sequence
            .with_function(functions::Enumerate)
            .with_function(functions::Range)
            .with_function(functions::Reversed)
            .with_function(functions::Zip)
    }

    pub fn get(&self, name: &str) -> Option<&dyn BuiltinFunction> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    /// Call a whitelisted function, validating keyword names first
    pub fn call(&self, name: &str, args: &CallArgs) -> StrataResult<Value> {
        let function = match self.get(name) {
            Some(f) => f,
            None => return Err(self.reject(name)),
        };
        let meta = function.meta();
        let mut seen = HashSet::new();
        for (keyword, _) in args.keywords() {
            if !seen.insert(keyword.as_str()) {
                return Err(StrataError::type_mismatch(format!(
                    "keyword argument repeated: {}",
                    keyword
                )));
            }
            if !meta.accepts_keyword(keyword) {
                return Err(if meta.keywords.is_empty() {
                    StrataError::type_mismatch(format!("{}() takes no keyword arguments", name))
                } else {
                    StrataError::type_mismatch(format!(
                        "{}() got an unexpected keyword argument '{}'",
                        name, keyword
                    ))
                });
            }
        }
        trace!(function = name, args = args.len(), "calling builtin");
        function.call(args)
    }

    /// Error for a call outside the whitelist, with close names as suggestion
    pub fn reject(&self, name: &str) -> StrataError {
        let similar = self.find_similar_functions(name);
        let err = StrataError::unsupported_function(name);
        if similar.is_empty() {
            return err;
        }
        let suggestions: Vec<&str> = similar.iter().take(5).copied().collect();
        err.with_suggestion(format!("Similar: {}", suggestions.join(", ")))
    }

    /// Find function names similar to the given name (for error suggestions)
    fn find_similar_functions(&self, name: &str) -> Vec<&'static str> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(&'static str, usize)> = self
            .functions
            .keys()
            .filter_map(|func_name| {
                let score = Self::similarity_score(&name_lower, func_name);
                if score > 0 {
                    Some((*func_name, score))
                } else {
                    None
                }
            })
            .collect();

        // Sort by similarity score (higher = more similar), stable on name
        matches.sort_by(|a, b| b.1.cmp(&a.1));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    /// Similarity between two names: prefix and substring matches, shared
    /// characters, small length differences
    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        score += common * 2;

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 && score > 0 {
            score += 5 - len_diff;
        }

        // Too little in common to be worth suggesting
        if score < 8 {
            return 0;
        }
        score
    }

    /// Metadata of every function, sorted by name, optionally filtered by category
    pub fn list_functions(&self, category: Option<&str>) -> Vec<FunctionMeta> {
        self.functions
            .values()
            .map(|f| f.meta())
            .filter(|meta| category.map_or(true, |c| meta.category == c))
            .collect()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
